use std::fmt::{self, Debug, Display};

use thiserror::Error;

use crate::{
    interpreter::error::{LogicError, ModuleError},
    parser::error::{LexicalError, SyntaxError},
};

/// `[line, column]`, both 1-based.
pub type Location = [u32; 2];

#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub data: T,
    pub location: Option<Location>,
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some([line, column]) => write!(f, "[line {}, column {}] {}", line, column, self.data),
            None => write!(f, "{}", self.data),
        }
    }
}

impl<T: Display + Debug> std::error::Error for Located<T> {}

pub trait ToLocated {
    fn locate(self, location: Option<Location>) -> Located<Self>
    where
        Self: Sized,
    {
        Located {
            data: self,
            location,
        }
    }

    fn no_locate(self) -> Located<Self>
    where
        Self: Sized,
    {
        Located {
            data: self,
            location: None,
        }
    }
}

/// The error taxonomy exposed to shells, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    SyntaxError,
    NameError,
    TypeKindError,
    IncorrectTypeError,
    TypeNotFound,
    ModuleNotFound,
    CastError,
    ArithmeticError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorData {
    #[error("lexical error: {0}")]
    Lexical(#[from] LexicalError),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Logic(#[from] LogicError),
    #[error("{0}")]
    Module(#[from] ModuleError),
}

impl ToLocated for ErrorData {}

impl ErrorData {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorData::Lexical(_) => ErrorKind::LexError,
            ErrorData::Syntax(_) => ErrorKind::SyntaxError,
            ErrorData::Logic(logic) => logic.kind(),
            ErrorData::Module(ModuleError::NotFound { .. }) => ErrorKind::ModuleNotFound,
            ErrorData::Module(ModuleError::Failed { source, .. }) => source.data.kind(),
        }
    }
}

pub type OsakerError = Located<ErrorData>;

impl OsakerError {
    pub fn kind(&self) -> ErrorKind {
        self.data.kind()
    }
}

pub type Result<T> = std::result::Result<T, OsakerError>;

#[macro_export]
macro_rules! error {
    ($arg:expr) => {
        Err($crate::error::ToLocated::no_locate(
            $crate::error::ErrorData::from($arg),
        ))
    };
}

#[macro_export]
macro_rules! located_error {
    ($arg:expr, $location:expr) => {
        Err($crate::error::ToLocated::locate(
            $crate::error::ErrorData::from($arg),
            $location,
        ))
    };
}

#[test]
fn display_with_location() {
    let error: OsakerError = ErrorData::from(LexicalError::UnexpectedCharacter('@')).locate(Some([2, 5]));
    assert_eq!(
        error.to_string(),
        "[line 2, column 5] lexical error: unexpected character '@'"
    );
    assert_eq!(error.kind(), ErrorKind::LexError);
}

#[test]
fn display_without_location() {
    let error: OsakerError = ErrorData::from(LogicError::UnboundName("x".to_string())).no_locate();
    assert_eq!(error.to_string(), "name 'x' is not defined");
    assert_eq!(error.kind(), ErrorKind::NameError);
}
