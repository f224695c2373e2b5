use std::path::PathBuf;

use thiserror::Error;

/// A choice/range description attached to `InvalidValue`, printed as the
/// "You can choose: ..." helper line from the original tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceHelp {
    Range(f64, f64),
    List(Vec<String>),
}

impl std::fmt::Display for ChoiceHelp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChoiceHelp::Range(min, max) => write!(f, "You can choose: [{min} ~ {max}]"),
            ChoiceHelp::List(choices) => {
                write!(f, "You can choose: {}", choices.join(", "))
            }
        }
    }
}

/// The full, fatal error taxonomy of the tool (spec §7). Every variant carries
/// the `file:line` location it was raised at; the resolver never catches its
/// own errors, so these always propagate to `main`.
#[derive(Debug, Error)]
pub enum LmError {
    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}:{line}: missing 'choice' attribute for symbol '{symbol}'")]
    MissingChoice {
        path: PathBuf,
        line: usize,
        symbol: String,
    },

    #[error("{path}:{line}: value is invalid for symbol '{symbol}'\n{help}")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        symbol: String,
        help: ChoiceHelp,
    },

    #[error("{path}:{line}: invalid depend expression for symbol '{symbol}': {message}")]
    InvalidDepend {
        path: PathBuf,
        line: usize,
        symbol: String,
        message: String,
    },

    #[error("{path}:{line}: {symbol} not found")]
    UndefinedSymbol {
        path: PathBuf,
        line: usize,
        symbol: String,
    },

    #[error("missing file: {path}")]
    MissingFile { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type LmResult<T> = Result<T, LmError>;
