use std::io::Write;

use itertools::Itertools;

use crate::{
    environment::{Entry, Environment},
    parser::statement::MODULE_ANNOTATION,
    values::Value,
};

/// Where inspection text goes.
pub trait Output {
    fn emit(&mut self, text: &str);
}

/// Renders inspection results; shells may decorate the plain form.
pub trait Formatter {
    fn value(&self, name: &str, value: &Value) -> String;

    fn namespace_header(&self, name: &str) -> String;

    fn integer(&self, value: i64) -> String {
        value.to_string()
    }

    fn namespace(&self, name: &str, environment: &Environment) -> String {
        let mut lines = vec![self.namespace_header(name)];
        for (entry_name, entry) in environment.iter() {
            let qualified = format!("{}{}", name, entry_name);
            let rendered = match entry {
                Entry::Value(value) => self.value(&qualified, value),
                Entry::Namespace(inner) => self.namespace(&qualified, inner),
            };
            lines.extend(rendered.lines().map(|line| format!("  {}", line)));
        }
        lines.join("\n")
    }

    /// Every binding, in definition order.
    fn environment(&self, environment: &Environment) -> String {
        environment
            .iter()
            .map(|(name, entry)| match entry {
                Entry::Value(value) => self.value(name, value),
                Entry::Namespace(inner) => self.namespace(name, inner),
            })
            .join("\n")
    }
}

/// `name <-- literal ~type`, no decoration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn value(&self, name: &str, value: &Value) -> String {
        format!("{} <-- {}", name, value)
    }

    fn namespace_header(&self, name: &str) -> String {
        format!("{} <-- ~{}", name, MODULE_ANNOTATION)
    }
}

#[derive(Debug, Default)]
pub struct BufferOutput {
    pub lines: Vec<String>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for BufferOutput {
    fn emit(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

#[derive(Debug, Default)]
pub struct StdOutput;

impl Output for StdOutput {
    fn emit(&mut self, text: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = writeln!(handle, "{}", text) {
            log::warn!("failed to write output: {}", e);
        }
    }
}

#[cfg(test)]
use crate::values::Primitive;

#[test]
fn plain_value() {
    let value = Value::from(Primitive::String("hi".to_string()));
    assert_eq!(PlainFormatter.value("greeting", &value), "greeting <-- \"hi\" ~nyan");
}

#[test]
fn plain_namespace() {
    let mut inner = Environment::new();
    inner.define("flag", Value::from(Primitive::Boolean(false)));
    let mut utils = Environment::new();
    utils.define("count", Value::from(Primitive::Integer(3)));
    utils.define("deep!", inner);
    assert_eq!(
        PlainFormatter.namespace("utils!", &utils),
        "utils! <-- ~azumanga\n  utils!count <-- 3 ~chiyo\n  utils!deep! <-- ~azumanga\n    utils!deep!flag <-- no ~tomo"
    );
}

#[test]
fn plain_environment() {
    let mut env = Environment::new();
    env.define("b", Value::from(Primitive::Integer(1)));
    env.define("a", Value::from(Primitive::String("x".to_string())));
    assert_eq!(
        PlainFormatter.environment(&env),
        "b <-- 1 ~chiyo\na <-- \"x\" ~nyan"
    );
    assert_eq!(PlainFormatter.environment(&Environment::new()), "");
}

#[test]
fn buffer_collects_lines() {
    let mut output = BufferOutput::new();
    output.emit("one");
    output.emit("two");
    assert_eq!(output.lines, vec!["one", "two"]);
}
