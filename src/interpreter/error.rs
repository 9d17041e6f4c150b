use thiserror::Error;

use crate::{
    error::{ErrorKind, OsakerError},
    values::OsakaType,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogicError {
    #[error("name '{0}' is not defined")]
    UnboundName(String),
    #[error("'{0}' is not a namespace")]
    NotANamespace(String),
    #[error("'{name}' is {found} but math only works on ~chiyo")]
    NotAnInteger { name: String, found: OsakaType },
    #[error("'{0}' is a namespace, not a value")]
    NotAValue(String),
    #[error("'{literal}' is {found} but was annotated as {expected}")]
    IncorrectType {
        literal: String,
        expected: OsakaType,
        found: OsakaType,
    },
    #[error("unknown type ~{0}, expected one of ~nyan, ~chiyo, ~tomo")]
    TypeNotFound(String),
    #[error("cannot cast '{text}' to {target}")]
    Cast { text: String, target: OsakaType },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    Overflow(String),
}

impl LogicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogicError::UnboundName(_) | LogicError::NotANamespace(_) => ErrorKind::NameError,
            LogicError::NotAnInteger { .. } | LogicError::NotAValue(_) => ErrorKind::TypeKindError,
            LogicError::IncorrectType { .. } => ErrorKind::IncorrectTypeError,
            LogicError::TypeNotFound(_) => ErrorKind::TypeNotFound,
            LogicError::Cast { .. } => ErrorKind::CastError,
            LogicError::DivisionByZero | LogicError::Overflow(_) => ErrorKind::ArithmeticError,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    #[error("module '{path}' not found: {reason}")]
    NotFound { path: String, reason: String },
    #[error("in module '{path}': {source}")]
    Failed {
        path: String,
        source: Box<OsakerError>,
    },
}
