use std::io::{self, Write};

use cozy_chess::*;
use ledgerboard::*;
use log::info;

use crate::options::ConsoleOptionsHandler;
use crate::render::{apply_promotions, render_board, render_piece};

const HELP: &str = "\
commands:
  board                  draw the board
  pieces                 list every piece
  at <square>            show the piece on a square
  move <id> <square>     move a piece (the word \"move\" may be left out)
  history                list the moves played
  reset                  start a new game
  fen                    show the validator's position
  set <name> <value>     change an option
  options                list the options
  quit                   leave";

pub enum Flow {
    Continue,
    Quit
}

pub struct Session {
    ledger: PieceLedger<StandardValidator>,
    options_handler: ConsoleOptionsHandler,
    quiet: bool
}

impl Session {
    pub fn new(quiet: bool) -> Self {
        let options_handler = ConsoleOptionsHandler::new();
        let ledger = PieceLedger::with_options(
            StandardValidator::new(),
            options_handler.options.ledger.clone()
        );
        Self {
            ledger,
            options_handler,
            quiet
        }
    }

    pub fn ledger(&self) -> &PieceLedger<StandardValidator> {
        &self.ledger
    }

    pub fn prompt(&self) -> String {
        let side = match self.ledger.side_to_move() {
            Color::White => "white",
            Color::Black => "black"
        };
        format!("{} {}> ", self.ledger.journal().len() + 1, side)
    }

    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let tokens: Vec<_> = line.split_ascii_whitespace().collect();
        let (&command, args) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(Flow::Continue)
        };
        match (command, args) {
            ("board", []) => self.print_board(out)?,
            ("pieces", []) => {
                for piece in self.ledger.pieces() {
                    writeln!(out, "{}", render_piece(&piece))?;
                }
            }
            ("at", [square]) => match square.parse::<Square>() {
                Ok(square) => match self.ledger.piece_at(square) {
                    Some(piece) => writeln!(out, "{}", render_piece(&piece))?,
                    None => writeln!(out, "{} is empty", square)?
                },
                Err(_) => writeln!(out, "[WARN] Invalid square {:?}.", square)?
            },
            ("move", [id, target]) => self.move_piece(id, target, out)?,
            ("history", []) => self.print_history(out)?,
            ("reset", []) => {
                self.ledger.reset_board();
                info!("new game");
                if !self.quiet {
                    self.print_board(out)?;
                }
            }
            ("fen", []) => {
                let validator = self.ledger.validator();
                writeln!(out, "{}", validator.fen())?;
                writeln!(out, "status {:?}", validator.status())?;
            }
            ("set", [name, value]) => match self.options_handler.update(name, value) {
                Ok(()) => {
                    self.ledger.set_options(self.options_handler.options.ledger.clone());
                }
                Err(error) => writeln!(out, "[WARN] {}.", error)?
            },
            ("options", []) => {
                for (name, (kind, _)) in &self.options_handler.handlers {
                    writeln!(out, "option name {} type {}", name, kind)?;
                }
            }
            ("help", []) => writeln!(out, "{}", HELP)?,
            ("quit", []) => return Ok(Flow::Quit),
            (id, [target]) if id.parse::<PieceId>().is_ok() => self.move_piece(id, target, out)?,
            _ => writeln!(out, "[WARN] Unknown command {:?} was ignored.", line.trim())?
        }
        Ok(Flow::Continue)
    }

    fn move_piece(&mut self, id: &str, target: &str, out: &mut impl Write) -> io::Result<()> {
        let id = match id.parse::<PieceId>() {
            Ok(id) => id,
            Err(error) => return writeln!(out, "[WARN] {} {:?}.", error, id)
        };
        let target = match target.parse::<Square>() {
            Ok(target) => target,
            Err(_) => return writeln!(out, "[WARN] Invalid square {:?}.", target)
        };
        match self.ledger.move_piece(id, target) {
            Ok(record) => {
                writeln!(out, "{}", record)?;
                if !self.quiet {
                    self.print_board(out)?;
                }
                let status = self.ledger.validator().status();
                if status != GameStatus::Ongoing {
                    info!("game finished: {:?}", status);
                    writeln!(out, "game over: {:?}", status)?;
                }
            }
            Err(error) => writeln!(out, "[WARN] {}.", error)?
        }
        Ok(())
    }

    fn print_board(&self, out: &mut impl Write) -> io::Result<()> {
        let mut pieces = self.ledger.pieces();
        apply_promotions(&mut pieces, &self.ledger.move_history());
        let board = render_board(&pieces, self.options_handler.options.unicode);
        write!(out, "{}", board)
    }

    fn print_history(&self, out: &mut impl Write) -> io::Result<()> {
        let show_timestamps = self.options_handler.options.show_timestamps;
        for (i, record) in self.ledger.move_history().iter().enumerate() {
            if show_timestamps {
                let time = humantime::format_rfc3339_millis(record.timestamp);
                writeln!(out, "{:>3}. {} [{}]", i + 1, record, time)?;
            } else {
                writeln!(out, "{:>3}. {}", i + 1, record)?;
            }
        }
        Ok(())
    }
}
