use std::collections::HashMap;

use crate::{interpreter::error::LogicError, values::Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Value(Value),
    Namespace(Environment),
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(value)
    }
}

impl From<Environment> for Entry {
    fn from(environment: Environment) -> Self {
        Entry::Namespace(environment)
    }
}

/// Name to value (or imported namespace) bindings of one interpreter instance.
///
/// Names may be path-qualified: `utils!greeting` is `greeting` inside the
/// namespace bound to `utils!`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    entries: HashMap<String, Entry>,
    // insertion order, for dumps
    order: Vec<String>,
}

/// Splits `a!b!c` into `["a!", "b!", "c"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, _) in path.match_indices('!') {
        segments.push(&path[start..=index]);
        start = index + 1;
    }
    if start < path.len() {
        segments.push(&path[start..]);
    }
    segments
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.order
            .iter()
            .filter_map(move |name| self.entries.get(name).map(|entry| (name.as_str(), entry)))
    }

    /// Binds a local name, overwriting any previous binding.
    pub fn define(&mut self, name: impl Into<String>, entry: impl Into<Entry>) {
        let name = name.into();
        if self.entries.insert(name.clone(), entry.into()).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let entry = self.entries.remove(name)?;
        self.order.retain(|n| n != name);
        Some(entry)
    }

    pub fn namespace(&self, name: &str) -> Option<&Environment> {
        match self.entries.get(name) {
            Some(Entry::Namespace(environment)) => Some(environment),
            _ => None,
        }
    }

    pub fn value(&self, path: &str) -> Option<&Value> {
        match self.resolve(path) {
            Some(Entry::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Looks up a possibly path-qualified name.
    pub fn resolve(&self, path: &str) -> Option<&Entry> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;
        let mut current = self;
        for parent in parents {
            current = current.namespace(parent)?;
        }
        current.get(last)
    }

    pub fn define_path(&mut self, path: &str, entry: impl Into<Entry>) -> Result<(), LogicError> {
        let segments = split_path(path);
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| LogicError::UnboundName(path.to_string()))?;
        self.parent_mut(path, parents)?.define(*last, entry);
        Ok(())
    }

    pub fn remove_path(&mut self, path: &str) -> Result<Entry, LogicError> {
        let segments = split_path(path);
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| LogicError::UnboundName(path.to_string()))?;
        self.parent_mut(path, parents)?
            .remove(last)
            .ok_or_else(|| LogicError::UnboundName(path.to_string()))
    }

    fn parent_mut(&mut self, path: &str, parents: &[&str]) -> Result<&mut Environment, LogicError> {
        let mut current = self;
        for parent in parents {
            current = match current.entries.get_mut(*parent) {
                Some(Entry::Namespace(environment)) => environment,
                Some(Entry::Value(_)) => return Err(LogicError::NotANamespace(parent.to_string())),
                None => return Err(LogicError::UnboundName(path.to_string())),
            };
        }
        Ok(current)
    }
}

#[cfg(test)]
use crate::values::Primitive;

#[test]
fn split_paths() {
    assert_eq!(split_path("x"), vec!["x"]);
    assert_eq!(split_path("utils!"), vec!["utils!"]);
    assert_eq!(split_path("utils!greeting"), vec!["utils!", "greeting"]);
    assert_eq!(split_path("a!b!c"), vec!["a!", "b!", "c"]);
    assert!(split_path("").is_empty());
}

#[test]
fn define_overwrites_in_place() {
    let mut env = Environment::new();
    env.define("a", Value::from(Primitive::Integer(1)));
    env.define("b", Value::from(Primitive::Boolean(true)));
    env.define("a", Value::from(Primitive::Integer(2)));
    let names: Vec<_> = env.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(env.value("a").and_then(Value::as_integer), Some(2));
    assert_eq!(env.len(), 2);
}

#[test]
fn remove_then_redefine_moves_to_end() {
    let mut env = Environment::new();
    env.define("a", Value::from(Primitive::Integer(1)));
    env.define("b", Value::from(Primitive::Integer(2)));
    assert!(env.remove("a").is_some());
    assert!(env.remove("a").is_none());
    env.define("a", Value::from(Primitive::Integer(3)));
    let names: Vec<_> = env.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn nested_paths() -> Result<(), LogicError> {
    let mut inner = Environment::new();
    inner.define("greeting", Value::from(Primitive::String("hi".to_string())));
    let mut env = Environment::new();
    env.define("utils!", inner);

    assert_eq!(
        env.value("utils!greeting").map(Value::value),
        Some(&Primitive::String("hi".to_string()))
    );
    assert!(env.resolve("utils!missing").is_none());
    assert!(env.resolve("other!greeting").is_none());

    env.define_path("utils!count", Value::from(Primitive::Integer(1)))?;
    assert_eq!(env.value("utils!count").and_then(Value::as_integer), Some(1));

    env.remove_path("utils!greeting")?;
    assert_eq!(
        env.remove_path("utils!greeting"),
        Err(LogicError::UnboundName("utils!greeting".to_string()))
    );
    assert_eq!(
        env.define_path("nowhere!x", Value::from(Primitive::Integer(1))),
        Err(LogicError::UnboundName("nowhere!x".to_string()))
    );
    Ok(())
}

#[test]
fn value_is_not_a_namespace() {
    let mut env = Environment::new();
    env.define("a!", Value::from(Primitive::Integer(1)));
    assert_eq!(
        env.remove_path("a!b"),
        Err(LogicError::NotANamespace("a!".to_string()))
    );
}
