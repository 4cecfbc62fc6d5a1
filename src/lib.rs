//! Turtle BASIC Interpreter
//!
//! A small line-numbered BASIC dialect whose statements steer a 2D turtle.
//! Programs are typed or loaded as numbered lines, executed one statement at a
//! time, and every movement is reported to the host as a drawing delta.

pub mod config;
pub mod evaluator;
pub mod executor;
pub mod filesystem;
pub mod graphics;
pub mod parser;
pub mod program;
pub mod tokenizer;
pub mod variables;

// Re-export core types for convenience
pub use crate::error::{BasicError, ErrorKind, LineError, Result};
pub use config::InterpreterConfig;
pub use executor::{Interpreter, RunReport, Step};
pub use filesystem::{DirectoryStorage, MemoryStorage, ProgramStorage};
pub use graphics::{DrawCommand, Turtle};
pub use parser::{BinaryOperator, Expression, Statement, UnaryOperator};
pub use program::ProgramStore;
pub use tokenizer::{Token, TokenizedLine};
pub use variables::{Value, VariableStore};

/// Core error handling types for the interpreter
pub mod error {
    use std::fmt;

    /// Result type for interpreter operations
    pub type Result<T> = std::result::Result<T, BasicError>;

    /// Every way a line of BASIC can fail
    #[derive(Debug, Clone, PartialEq, thiserror::Error)]
    pub enum BasicError {
        /// Malformed token stream (unterminated string)
        #[error("?LEX ERROR: {0}")]
        Lex(String),
        /// Unrecognised command or malformed statement shape
        #[error("?SYNTAX ERROR: {0}")]
        Syntax(String),
        /// Undefined line, NEXT without FOR, step limit
        #[error("?RUNTIME ERROR: {0}")]
        Runtime(String),
        /// Arithmetic or comparison on Text operands
        #[error("?TYPE MISMATCH: {0}")]
        Type(String),
        /// Division by zero
        #[error("?ARITHMETIC ERROR: {0}")]
        Arithmetic(String),
        /// Bad colour, bad numeric literal, out-of-range argument
        #[error("?VALUE ERROR: {0}")]
        Value(String),
        /// Storage collaborator failure during SAVE, LOAD or DIR
        #[error("?I/O ERROR: {0}")]
        Io(String),
    }

    /// Error class, for hosts that only care which family failed
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ErrorKind {
        Lex,
        Syntax,
        Runtime,
        Type,
        Arithmetic,
        Value,
        Io,
    }

    impl BasicError {
        pub fn syntax(message: impl Into<String>) -> Self {
            BasicError::Syntax(message.into())
        }

        pub fn runtime(message: impl Into<String>) -> Self {
            BasicError::Runtime(message.into())
        }

        pub fn value(message: impl Into<String>) -> Self {
            BasicError::Value(message.into())
        }

        pub fn type_mismatch(message: impl Into<String>) -> Self {
            BasicError::Type(message.into())
        }

        /// Get the class of this error
        pub fn kind(&self) -> ErrorKind {
            match self {
                BasicError::Lex(_) => ErrorKind::Lex,
                BasicError::Syntax(_) => ErrorKind::Syntax,
                BasicError::Runtime(_) => ErrorKind::Runtime,
                BasicError::Type(_) => ErrorKind::Type,
                BasicError::Arithmetic(_) => ErrorKind::Arithmetic,
                BasicError::Value(_) => ErrorKind::Value,
                BasicError::Io(_) => ErrorKind::Io,
            }
        }

        /// The bare message, without the kind prefix
        pub fn message(&self) -> &str {
            match self {
                BasicError::Lex(m)
                | BasicError::Syntax(m)
                | BasicError::Runtime(m)
                | BasicError::Type(m)
                | BasicError::Arithmetic(m)
                | BasicError::Value(m)
                | BasicError::Io(m) => m,
            }
        }

        /// Type mismatches and division by zero are runtime failures too
        pub fn is_runtime(&self) -> bool {
            matches!(
                self.kind(),
                ErrorKind::Runtime | ErrorKind::Type | ErrorKind::Arithmetic
            )
        }
    }

    impl From<std::io::Error> for BasicError {
        fn from(err: std::io::Error) -> Self {
            BasicError::Io(err.to_string())
        }
    }

    /// An error together with the program line that raised it
    #[derive(Debug, Clone, PartialEq)]
    pub struct LineError {
        /// None when the failing statement was typed in immediate mode
        pub line: Option<u32>,
        pub error: BasicError,
    }

    impl LineError {
        pub fn new(line: Option<u32>, error: BasicError) -> Self {
            Self { line, error }
        }

        pub fn kind(&self) -> ErrorKind {
            self.error.kind()
        }
    }

    impl fmt::Display for LineError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.line {
                Some(line) => write!(f, "{} IN {}", self.error, line),
                None => write!(f, "{}", self.error),
            }
        }
    }

    impl std::error::Error for LineError {}

}
