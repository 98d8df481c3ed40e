use std::io::{BufRead, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::time::SystemTime;

use clap::Parser;
use log::{debug, warn, LevelFilter};

mod options;
mod render;
mod session;

use session::{Flow, Session};

#[derive(Parser)]
/// Play a game on the piece ledger from the terminal.
struct ConsoleArgs {
    /// Log level (off, error, warn, info, debug or trace)
    #[clap(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Run the commands in this file before reading from stdin
    #[clap(long)]
    script: Option<PathBuf>,

    /// Only draw the board when asked to
    #[clap(short, long)]
    quiet: bool
}

enum Event {
    Command(String),
    EndOfInput
}

fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

// Lines that are not valid UTF-8 are skipped. Any other read error ends input.
fn read_commands(input: impl BufRead, event_sink: Sender<Event>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) if error.kind() == ErrorKind::InvalidData => {
                warn!("skipped an unreadable input line: {}", error);
                continue;
            }
            Err(error) => {
                warn!("stopped reading input: {}", error);
                break;
            }
        };
        if event_sink.send(Event::Command(line)).is_err() {
            return;
        }
    }
    let _ = event_sink.send(Event::EndOfInput);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ConsoleArgs::parse();
    init_logging(args.log_level)?;

    let mut session = Session::new(args.quiet);
    let mut stdout = std::io::stdout();

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)?;
        debug!("running {} script lines from {}", script.lines().count(), path.display());
        for line in script.lines() {
            writeln!(stdout, "{}{}", session.prompt(), line)?;
            if let Flow::Quit = session.execute(line, &mut stdout)? {
                return Ok(());
            }
        }
    }

    let (event_sink, event_source) = channel();
    std::thread::spawn(move || read_commands(std::io::stdin().lock(), event_sink));

    if !args.quiet {
        session.execute("board", &mut stdout)?;
    }
    loop {
        write!(stdout, "{}", session.prompt())?;
        stdout.flush()?;
        match event_source.recv() {
            Ok(Event::Command(line)) => {
                if let Flow::Quit = session.execute(&line, &mut stdout)? {
                    break;
                }
            }
            Ok(Event::EndOfInput) | Err(_) => {
                writeln!(stdout)?;
                break;
            }
        }
    }
    Ok(())
}
