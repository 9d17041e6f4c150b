use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string literal starting with {0}")]
    UnterminatedString(char),
    #[error("'~' must be followed by a type name, e.g. `~chiyo`")]
    EmptyTypeAnnotation,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("expected {expected} but found {found}, e.g. `{example}`")]
    Expected {
        expected: &'static str,
        found: String,
        example: &'static str,
    },
    #[error("import name '{0}' must end with '!', e.g. `:D utils! <-- \"utils.osaka\" ~azumanga`")]
    NamespaceMarker(String),
    #[error("'{0}' ends with '!', which is reserved for imported namespaces, e.g. `:o x <-- 1 ~chiyo`")]
    ReservedNamespaceName(String),
    #[error("expected the module annotation ~azumanga but found {0}, e.g. `:D utils! <-- \"utils.osaka\" ~azumanga`")]
    ModuleAnnotation(String),
}
