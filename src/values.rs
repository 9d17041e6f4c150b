use std::fmt;

use crate::{
    interpreter::error::LogicError,
    parser::{
        lexer::{FALSE_WORDS, TRUE_WORDS},
        unquote,
    },
};

/// The closed set of value kinds, each with a canonical annotation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsakaType {
    String,
    Integer,
    Boolean,
}

impl OsakaType {
    pub const ALL: [OsakaType; 3] = [OsakaType::String, OsakaType::Integer, OsakaType::Boolean];

    pub fn name(self) -> &'static str {
        match self {
            OsakaType::String => "nyan",
            OsakaType::Integer => "chiyo",
            OsakaType::Boolean => "tomo",
        }
    }

    pub fn from_annotation(name: &str) -> Result<Self, LogicError> {
        let name = name.strip_prefix('~').unwrap_or(name);
        OsakaType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == name)
            .ok_or_else(|| LogicError::TypeNotFound(name.to_string()))
    }

    /// Numeric text is an integer, a true/false word is a boolean, anything else a string.
    pub fn infer(text: &str) -> Self {
        if is_numeric(text) {
            OsakaType::Integer
        } else if parse_boolean_word(text).is_some() {
            OsakaType::Boolean
        } else {
            OsakaType::String
        }
    }

    pub fn cast(self, text: &str) -> Result<Primitive, LogicError> {
        let cast_error = || LogicError::Cast {
            text: text.to_string(),
            target: self,
        };
        match self {
            OsakaType::String => Ok(Primitive::String(unquote(text).to_string())),
            OsakaType::Integer => text
                .parse::<i64>()
                .map(Primitive::Integer)
                .map_err(|_| cast_error()),
            OsakaType::Boolean => parse_boolean_word(text)
                .or_else(|| text.parse::<bool>().ok())
                .map(Primitive::Boolean)
                .ok_or_else(cast_error),
        }
    }
}

impl fmt::Display for OsakaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.name())
    }
}

fn is_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn parse_boolean_word(text: &str) -> Option<bool> {
    if TRUE_WORDS.contains(&text) {
        Some(true)
    } else if FALSE_WORDS.contains(&text) {
        Some(false)
    } else {
        None
    }
}

/// Native representation of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl Primitive {
    pub fn osaka_type(&self) -> OsakaType {
        match self {
            Primitive::String(_) => OsakaType::String,
            Primitive::Integer(_) => OsakaType::Integer,
            Primitive::Boolean(_) => OsakaType::Boolean,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(inner) if inner.contains('"') => write!(f, "'{}'", inner),
            Primitive::String(inner) => write!(f, "\"{}\"", inner),
            Primitive::Integer(inner) => write!(f, "{}", inner),
            Primitive::Boolean(inner) => {
                write!(f, "{}", if *inner { TRUE_WORDS[0] } else { FALSE_WORDS[0] })
            }
        }
    }
}

/// A runtime value paired with its declared type. The two always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    osaka_type: OsakaType,
    value: Primitive,
}

impl Value {
    pub fn new(osaka_type: OsakaType, value: Primitive) -> Result<Self, LogicError> {
        if value.osaka_type() != osaka_type {
            return Err(LogicError::IncorrectType {
                literal: value.to_string(),
                expected: osaka_type,
                found: value.osaka_type(),
            });
        }
        Ok(Self { osaka_type, value })
    }

    /// Builds a value from literal source text declared as `declared`.
    pub fn from_literal(text: &str, declared: OsakaType) -> Result<Self, LogicError> {
        let inferred = OsakaType::infer(text);
        if inferred != declared {
            return Err(LogicError::IncorrectType {
                literal: text.to_string(),
                expected: declared,
                found: inferred,
            });
        }
        Self::new(declared, declared.cast(text)?)
    }

    pub fn osaka_type(&self) -> OsakaType {
        self.osaka_type
    }

    pub fn value(&self) -> &Primitive {
        &self.value
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Primitive::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Self {
            osaka_type: value.osaka_type(),
            value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.osaka_type)
    }
}

#[test]
fn annotation_names_are_bijective() {
    for t in OsakaType::ALL.iter() {
        assert_eq!(OsakaType::from_annotation(t.name()), Ok(*t));
        assert_eq!(OsakaType::from_annotation(&t.to_string()), Ok(*t));
    }
    assert_eq!(
        OsakaType::from_annotation("osaka"),
        Err(LogicError::TypeNotFound("osaka".to_string()))
    );
}

#[test]
fn strings_render_as_source_literals() {
    let plain = Primitive::String("hi".to_string());
    assert_eq!(plain.to_string(), "\"hi\"");
    let quoted = Primitive::String("say \"hi\"".to_string());
    assert_eq!(quoted.to_string(), "'say \"hi\"'");
    assert_eq!(OsakaType::String.cast(&quoted.to_string()), Ok(quoted));
    let apostrophe = Primitive::String("it's".to_string());
    assert_eq!(apostrophe.to_string(), "\"it's\"");
}

#[test]
fn infer_from_text() {
    assert_eq!(OsakaType::infer("42"), OsakaType::Integer);
    assert_eq!(OsakaType::infer("-7"), OsakaType::Integer);
    assert_eq!(OsakaType::infer("nuhuh"), OsakaType::Boolean);
    assert_eq!(OsakaType::infer("ya"), OsakaType::Boolean);
    assert_eq!(OsakaType::infer("\"5\""), OsakaType::String);
    assert_eq!(OsakaType::infer("'yes'"), OsakaType::String);
    assert_eq!(OsakaType::infer("-"), OsakaType::String);
}

#[test]
fn cast_text() {
    assert_eq!(OsakaType::Integer.cast("-12"), Ok(Primitive::Integer(-12)));
    assert_eq!(OsakaType::Boolean.cast("yaa"), Ok(Primitive::Boolean(true)));
    assert_eq!(OsakaType::Boolean.cast("nuh"), Ok(Primitive::Boolean(false)));
    assert_eq!(OsakaType::Boolean.cast("true"), Ok(Primitive::Boolean(true)));
    assert_eq!(
        OsakaType::String.cast("'hi there'"),
        Ok(Primitive::String("hi there".to_string()))
    );
    assert_eq!(
        OsakaType::Integer.cast("99999999999999999999"),
        Err(LogicError::Cast {
            text: "99999999999999999999".to_string(),
            target: OsakaType::Integer,
        })
    );
    assert!(OsakaType::Boolean.cast("maybe").is_err());
}

#[test]
fn literal_type_mismatch() {
    assert_eq!(
        Value::from_literal("\"5\"", OsakaType::Integer),
        Err(LogicError::IncorrectType {
            literal: "\"5\"".to_string(),
            expected: OsakaType::Integer,
            found: OsakaType::String,
        })
    );
    assert!(Value::new(OsakaType::Boolean, Primitive::Integer(1)).is_err());
}

#[test]
fn display_canonical() -> Result<(), LogicError> {
    assert_eq!(Value::from_literal("yaa", OsakaType::Boolean)?.to_string(), "yes ~tomo");
    assert_eq!(Value::from_literal("nuhuh", OsakaType::Boolean)?.to_string(), "no ~tomo");
    assert_eq!(Value::from_literal("'hey'", OsakaType::String)?.to_string(), "\"hey\" ~nyan");
    assert_eq!(Value::from_literal("-3", OsakaType::Integer)?.to_string(), "-3 ~chiyo");
    Ok(())
}
