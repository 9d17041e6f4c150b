#[macro_use]
pub mod error;
pub mod console;
pub mod environment;
pub mod interpreter;
pub mod io;
pub mod parser;
pub mod repl;
pub mod values;

pub use interpreter::Interpreter;
pub use parser::tokenize;
