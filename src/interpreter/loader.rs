use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use super::{error::ModuleError, Interpreter};
use crate::{
    environment::Environment,
    error::*,
    io::{Formatter, Output},
};

/// Runs a script file in a fresh interpreter and hands back its environment.
///
/// Nothing is cached: loading the same path twice reads and executes it twice.
/// There is no cycle detection either, so a script importing itself recurses
/// until the stack runs out.
pub struct ModuleLoader {
    base_dir: Option<PathBuf>,
    formatter: Rc<dyn Formatter>,
}

impl ModuleLoader {
    pub fn new(base_dir: Option<PathBuf>, formatter: Rc<dyn Formatter>) -> Self {
        Self {
            base_dir,
            formatter,
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base_dir) if path.is_relative() => base_dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn load(&self, path: &str, output: &mut dyn Output) -> Result<Environment> {
        let resolved = self.resolve(path);
        let source = fs::read_to_string(&resolved).map_err(|e| {
            ErrorData::from(ModuleError::NotFound {
                path: resolved.display().to_string(),
                reason: e.to_string(),
            })
            .no_locate()
        })?;
        log::debug!("loading module {}", resolved.display());

        let mut child = Interpreter::new().with_formatter(self.formatter.clone());
        child.base_dir = resolved.parent().map(Path::to_path_buf);
        child.eval(&source, output).map_err(|e| {
            ErrorData::from(ModuleError::Failed {
                path: resolved.display().to_string(),
                source: Box::new(e),
            })
            .no_locate()
        })?;
        log::debug!(
            "module {} defined {} names",
            resolved.display(),
            child.environment().len()
        );
        Ok(child.into_environment())
    }
}

#[cfg(test)]
use crate::io::{BufferOutput, PlainFormatter};

#[test]
fn resolve_against_base_dir() {
    let loader = ModuleLoader::new(Some(PathBuf::from("scripts")), Rc::new(PlainFormatter));
    assert_eq!(loader.resolve("utils.osaka"), Path::new("scripts").join("utils.osaka"));
    let loader = ModuleLoader::new(None, Rc::new(PlainFormatter));
    assert_eq!(loader.resolve("utils.osaka"), PathBuf::from("utils.osaka"));
}

#[test]
fn missing_file() {
    let loader = ModuleLoader::new(None, Rc::new(PlainFormatter));
    let error = loader
        .load("no/such/module.osaka", &mut BufferOutput::new())
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ModuleNotFound);
}
