use std::{path::PathBuf, rc::Rc};

pub mod error;
pub mod loader;

use self::{
    error::{LogicError, ModuleError},
    loader::ModuleLoader,
};
use crate::{
    environment::{Entry, Environment},
    error::*,
    io::{Formatter, Output, PlainFormatter},
    parser::{
        tokenize, Definition, Import, MathExpression, Operand, Operator, Parser, RValue,
        Statement, StatementBody, Token,
    },
    values::{OsakaType, Primitive, Value},
};

fn located<T>(result: std::result::Result<T, LogicError>, location: Option<Location>) -> Result<T> {
    result.map_err(|e| ErrorData::from(e).locate(location))
}

/// Owns one environment and executes statements against it, one at a time.
///
/// Statements run in order and an error stops the rest; whatever ran before the
/// failing statement keeps its effect.
pub struct Interpreter {
    environment: Environment,
    base_dir: Option<PathBuf>,
    formatter: Rc<dyn Formatter>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
            base_dir: None,
            formatter: Rc::new(PlainFormatter),
        }
    }

    /// Module paths are resolved against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::new()
        }
    }

    pub fn with_formatter(mut self, formatter: Rc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Renders every binding with this interpreter's formatter.
    pub fn dump(&self) -> String {
        self.formatter.environment(&self.environment)
    }

    pub fn into_environment(self) -> Environment {
        self.environment
    }

    pub fn eval(&mut self, source: &str, output: &mut dyn Output) -> Result<()> {
        let tokens = tokenize(source)?;
        self.execute(&tokens, output)
    }

    pub fn execute(&mut self, tokens: &[Token], output: &mut dyn Output) -> Result<()> {
        for statement in Parser::new(tokens) {
            self.execute_statement(statement?, output)?;
        }
        Ok(())
    }

    pub fn execute_statement(&mut self, statement: Statement, output: &mut dyn Output) -> Result<()> {
        log::debug!("executing `{}`", statement.data);
        let location = statement.location;
        match statement.data {
            StatementBody::Define(definition) => self.define(definition, location),
            StatementBody::Delete(name) => {
                located(self.environment.remove_path(&name), location)?;
                Ok(())
            }
            StatementBody::Inspect(name) => {
                match self.environment.resolve(&name) {
                    Some(Entry::Value(value)) => output.emit(&self.formatter.value(&name, value)),
                    Some(Entry::Namespace(namespace)) => {
                        output.emit(&self.formatter.namespace(&name, namespace))
                    }
                    None => log::debug!("nothing to inspect for '{}'", name),
                }
                Ok(())
            }
            StatementBody::Import(import) => self.import(import, location, output),
            StatementBody::Math(math) => {
                let result = self.math(&math)?;
                output.emit(&self.formatter.integer(result));
                Ok(())
            }
        }
    }

    fn define(&mut self, definition: Definition, location: Option<Location>) -> Result<()> {
        let Definition {
            name,
            value,
            annotation,
        } = definition;
        let declared = located(
            OsakaType::from_annotation(&annotation.data),
            annotation.location,
        )?;
        let value = match value.data {
            RValue::Literal(text) => located(Value::from_literal(&text, declared), value.location)?,
            RValue::Reference(reference) => {
                let referenced = located(self.lookup(&reference), value.location)?;
                if referenced.osaka_type() != declared {
                    return located_error!(
                        LogicError::IncorrectType {
                            literal: reference,
                            expected: declared,
                            found: referenced.osaka_type(),
                        },
                        value.location
                    );
                }
                referenced.clone()
            }
            RValue::Math(math) => {
                let result = self.math(&math)?;
                if declared != OsakaType::Integer {
                    return located_error!(
                        LogicError::IncorrectType {
                            literal: math.to_string(),
                            expected: declared,
                            found: OsakaType::Integer,
                        },
                        value.location
                    );
                }
                Value::from(Primitive::Integer(result))
            }
        };
        located(self.environment.define_path(&name, value), location)
    }

    fn lookup(&self, name: &str) -> std::result::Result<&Value, LogicError> {
        match self.environment.resolve(name) {
            Some(Entry::Value(value)) => Ok(value),
            Some(Entry::Namespace(_)) => Err(LogicError::NotAValue(name.to_string())),
            None => Err(LogicError::UnboundName(name.to_string())),
        }
    }

    fn operand(&self, operand: &Located<Operand>) -> Result<i64> {
        let integer = match &operand.data {
            Operand::Number(text) => text.parse::<i64>().map_err(|_| LogicError::Cast {
                text: text.clone(),
                target: OsakaType::Integer,
            }),
            Operand::Reference(name) => self.lookup(name).and_then(|value| {
                value.as_integer().ok_or_else(|| LogicError::NotAnInteger {
                    name: name.clone(),
                    found: value.osaka_type(),
                })
            }),
        };
        located(integer, operand.location)
    }

    fn math(&self, math: &MathExpression) -> Result<i64> {
        let lhs = self.operand(&math.lhs)?;
        let rhs = self.operand(&math.rhs)?;
        let result = match math.operator.data {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Subtract => lhs.checked_sub(rhs),
            Operator::Multiply => lhs.checked_mul(rhs),
            Operator::Divide if rhs == 0 => {
                return located_error!(LogicError::DivisionByZero, math.operator.location)
            }
            Operator::Divide => lhs.checked_div(rhs),
        };
        located(
            result.ok_or_else(|| LogicError::Overflow(math.to_string())),
            math.operator.location,
        )
    }

    fn import(
        &mut self,
        import: Import,
        location: Option<Location>,
        output: &mut dyn Output,
    ) -> Result<()> {
        let loader = ModuleLoader::new(self.base_dir.clone(), self.formatter.clone());
        let namespace = loader.load(&import.path.data, output).map_err(|e| match e.data {
            ErrorData::Module(ModuleError::NotFound { .. }) => e.data.locate(import.path.location),
            _ => e.data.locate(location),
        })?;
        located(
            self.environment.define_path(&import.namespace, namespace),
            location,
        )
    }
}

#[cfg(test)]
use crate::io::BufferOutput;

#[cfg(test)]
fn run(source: &str) -> (Interpreter, BufferOutput, Result<()>) {
    let mut interpreter = Interpreter::new();
    let mut output = BufferOutput::new();
    let result = interpreter.eval(source, &mut output);
    (interpreter, output, result)
}

#[test]
fn define_and_inspect() -> Result<()> {
    let (interpreter, output, result) =
        run(":o name <-- 'Osaka' ~nyan\n:o age <-- 17 ~chiyo\n:o flag <-- yaa ~tomo\n:< name :< age :< flag");
    result?;
    assert_eq!(
        output.lines,
        vec![
            "name <-- \"Osaka\" ~nyan",
            "age <-- 17 ~chiyo",
            "flag <-- yes ~tomo"
        ]
    );
    assert_eq!(
        interpreter.environment().value("flag").map(Value::value),
        Some(&Primitive::Boolean(true))
    );
    Ok(())
}

#[test]
fn redefine_last_write_wins() -> Result<()> {
    let (_, output, result) = run(":o x <-- 1 ~chiyo :o x <-- 'one' ~nyan :< x");
    result?;
    assert_eq!(output.lines, vec!["x <-- \"one\" ~nyan"]);
    Ok(())
}

#[test]
fn define_from_reference_copies() -> Result<()> {
    let (interpreter, _, result) = run(":o a <-- 5 ~chiyo :o b <-- a ~chiyo :3 a");
    result?;
    assert!(interpreter.environment().resolve("a").is_none());
    assert_eq!(
        interpreter.environment().value("b").and_then(Value::as_integer),
        Some(5)
    );
    Ok(())
}

#[test]
fn reference_annotation_must_match() {
    let (_, _, result) = run(":o a <-- 5 ~chiyo :o b <-- a ~nyan");
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::IncorrectTypeError);
    assert_eq!(error.location, Some([1, 28]));
}

#[test]
fn undefined_reference() {
    let (_, _, result) = run(":o b <-- a ~chiyo");
    assert_eq!(
        result,
        Err(ErrorData::from(LogicError::UnboundName("a".to_string())).locate(Some([1, 10])))
    );
}

#[test]
fn unknown_annotation() {
    let (_, _, result) = run(":o b <-- 1 ~osaka");
    assert_eq!(
        result,
        Err(ErrorData::from(LogicError::TypeNotFound("osaka".to_string())).locate(Some([1, 12])))
    );
}

#[test]
fn math_operations() -> Result<()> {
    let (interpreter, output, result) = run(
        ":o a <-- 7 ~chiyo\n:o sum <-- :m a + 1 ~chiyo\n:o diff <-- :m a - 10 ~chiyo\n:o product <-- :m a * a ~chiyo\n:o quotient <-- :m a / 2 ~chiyo\n:o negative <-- :m -7 / 2 ~chiyo\n:m sum * 2",
    );
    result?;
    let env = interpreter.environment();
    let get = |name| env.value(name).and_then(Value::as_integer);
    assert_eq!(get("sum"), Some(8));
    assert_eq!(get("diff"), Some(-3));
    assert_eq!(get("product"), Some(49));
    assert_eq!(get("quotient"), Some(3));
    assert_eq!(get("negative"), Some(-3));
    assert_eq!(output.lines, vec!["16"]);
    Ok(())
}

#[test]
fn math_needs_integers() {
    let (_, _, result) = run(":o s <-- 'x' ~nyan :o r <-- :m s + 1 ~chiyo");
    assert_eq!(
        result,
        Err(ErrorData::from(LogicError::NotAnInteger {
            name: "s".to_string(),
            found: OsakaType::String,
        })
        .locate(Some([1, 32])))
    );
}

#[test]
fn math_result_is_chiyo() {
    let (_, _, result) = run(":o r <-- :m 1 + 1 ~tomo");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::IncorrectTypeError);
}

#[test]
fn arithmetic_errors() {
    let (_, _, result) = run(":o r <-- :m 1 / 0 ~chiyo");
    assert_eq!(
        result,
        Err(ErrorData::from(LogicError::DivisionByZero).locate(Some([1, 15])))
    );
    let (_, _, result) = run(":o r <-- :m 9223372036854775807 + 1 ~chiyo");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ArithmeticError);
}

#[test]
fn delete_and_inspect_missing() -> Result<()> {
    let (mut interpreter, mut output, result) = run(":o x <-- 1 ~chiyo :3 x :< x");
    result?;
    assert!(output.lines.is_empty());
    let error = interpreter.eval(":3 x", &mut output).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NameError);
    assert_eq!(
        error.data,
        ErrorData::from(LogicError::UnboundName("x".to_string()))
    );
    Ok(())
}

#[test]
fn errors_keep_earlier_effects() {
    let (interpreter, _, result) = run(":o a <-- 1 ~chiyo :3 b :o c <-- 2 ~chiyo");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NameError);
    assert!(interpreter.environment().resolve("a").is_some());
    assert!(interpreter.environment().resolve("c").is_none());
}

#[test]
fn syntax_error_after_valid_statement() {
    let (interpreter, _, result) = run(":o a <-- 1 ~chiyo :o b 2 ~chiyo");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::SyntaxError);
    assert!(interpreter.environment().resolve("a").is_some());
}

#[test]
fn missing_module() {
    let (_, _, result) = run(":D utils! <-- 'definitely/not/here.osaka' ~azumanga");
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ModuleNotFound);
    assert_eq!(error.location, Some([1, 15]));
}
