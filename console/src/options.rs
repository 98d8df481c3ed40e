use std::fmt::{self, Display};

use cozy_chess::Piece;
use indexmap::IndexMap;
use ledgerboard::LedgerOptions;

pub struct ConsoleOptions {
    pub ledger: LedgerOptions,
    pub unicode: bool,
    pub show_timestamps: bool
}

pub enum ConsoleOptionKind {
    Check {
        default: bool
    },
    Combo {
        default: &'static str,
        choices: &'static [&'static str]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    UnknownOption(String),
    InvalidValue {
        name: String,
        value: String
    }
}

impl Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionError::UnknownOption(name) => write!(f, "unknown option {:?}", name),
            OptionError::InvalidValue { name, value } => {
                write!(f, "invalid value {:?} for option {}", value, name)
            }
        }
    }
}

impl std::error::Error for OptionError {}

type Handler = Box<dyn Fn(&mut ConsoleOptions, &str) -> Option<()>>;

const PROMOTIONS: &[&str] = &["queen", "rook", "bishop", "knight"];

fn parse_promotion(value: &str) -> Option<Piece> {
    match value {
        "queen" => Some(Piece::Queen),
        "rook" => Some(Piece::Rook),
        "bishop" => Some(Piece::Bishop),
        "knight" => Some(Piece::Knight),
        _ => None
    }
}

pub struct ConsoleOptionsHandler {
    pub handlers: IndexMap<String, (ConsoleOptionKind, Handler)>,
    pub options: ConsoleOptions
}

impl ConsoleOptionsHandler {
    pub fn new() -> Self {
        let options = ConsoleOptions {
            ledger: LedgerOptions::default(),
            unicode: false,
            show_timestamps: false
        };
        let mut handlers = IndexMap::new();
        macro_rules! add_handlers {
            ($($name:literal: $option:expr => $handler:expr;)*) => {
                $({
                    let handler: Handler = Box::new($handler);
                    handlers.insert($name.to_owned(), ($option, handler));
                })*
            }
        }
        add_handlers! {
            "Promotion": ConsoleOptionKind::Combo {
                default: "queen",
                choices: PROMOTIONS
            } => |options: &mut ConsoleOptions, value: &str| {
                options.ledger.promotion = parse_promotion(value)?;
                Some(())
            };
            "Unicode": ConsoleOptionKind::Check {
                default: options.unicode
            } => |options: &mut ConsoleOptions, value: &str| {
                options.unicode = value.parse::<bool>().ok()?;
                Some(())
            };
            "ShowTimestamps": ConsoleOptionKind::Check {
                default: options.show_timestamps
            } => |options: &mut ConsoleOptions, value: &str| {
                options.show_timestamps = value.parse::<bool>().ok()?;
                Some(())
            };
        }

        Self {
            handlers,
            options
        }
    }

    /// Set an option by case-insensitive name.
    pub fn update(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        let (key, (_, handler)) = self.handlers.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .ok_or_else(|| OptionError::UnknownOption(name.to_owned()))?;
        handler(&mut self.options, &value.to_ascii_lowercase())
            .ok_or_else(|| OptionError::InvalidValue {
                name: key.clone(),
                value: value.to_owned()
            })
    }
}

impl Display for ConsoleOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsoleOptionKind::Check { default } => write!(f, "check default {}", default),
            ConsoleOptionKind::Combo { default, choices } => {
                write!(f, "combo default {}", default)?;
                for choice in choices.iter() {
                    write!(f, " var {}", choice)?;
                }
                Ok(())
            }
        }
    }
}
