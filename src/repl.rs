use rustyline::{error::ReadlineError, Editor};

use crate::{
    console::report_error,
    interpreter::Interpreter,
    io::{Output, StdOutput},
};

const PROMPT: &str = "osaka> ";

/// Line-at-a-time shell over one long-lived interpreter.
pub struct Repl<O: Output = StdOutput> {
    interpreter: Interpreter,
    output: O,
}

impl Repl<StdOutput> {
    pub fn new(interpreter: Interpreter) -> Self {
        Self::with_output(interpreter, StdOutput)
    }
}

impl<O: Output> Repl<O> {
    pub fn with_output(interpreter: Interpreter, output: O) -> Self {
        Self {
            interpreter,
            output,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn run(&mut self) -> rustyline::Result<()> {
        let mut editor = Editor::<()>::new();
        println!(
            "Osaker {} (`.env` lists names, `.exit` or Ctrl-D quits)",
            env!("CARGO_PKG_VERSION")
        );
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    editor.add_history_entry(line.as_str());
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns false once the user asked to leave. Errors are reported, never fatal.
    pub fn handle_line(&mut self, line: &str) -> bool {
        match line.trim() {
            ".exit" => return false,
            ".env" => {
                let dump = self.interpreter.dump();
                if !dump.is_empty() {
                    self.output.emit(&dump);
                }
            }
            "" => (),
            source => {
                if let Err(e) = self.interpreter.eval(source, &mut self.output) {
                    report_error(&e);
                }
            }
        }
        true
    }
}

#[cfg(test)]
use crate::io::BufferOutput;

#[test]
fn keeps_state_between_lines() {
    let mut repl = Repl::with_output(Interpreter::new(), BufferOutput::new());
    assert!(repl.handle_line(":o x <-- 3 ~chiyo"));
    assert!(repl.handle_line(":o y <-- :m x * 2 ~chiyo"));
    assert!(repl.handle_line(":< y"));
    assert_eq!(repl.output().lines, vec!["y <-- 6 ~chiyo"]);
}

#[test]
fn errors_do_not_stop_the_loop() {
    let mut repl = Repl::with_output(Interpreter::new(), BufferOutput::new());
    assert!(repl.handle_line(":3 missing"));
    assert!(repl.handle_line(":o x <-- '5' ~chiyo"));
    assert!(repl.handle_line("@"));
    assert!(repl.interpreter().environment().is_empty());
}

#[test]
fn meta_commands() {
    let mut repl = Repl::with_output(Interpreter::new(), BufferOutput::new());
    assert!(repl.handle_line(".env"));
    assert!(repl.output().lines.is_empty());
    repl.handle_line(":o a <-- nuh ~tomo");
    assert!(repl.handle_line("  .env  "));
    assert_eq!(repl.output().lines, vec!["a <-- no ~tomo"]);
    assert!(!repl.handle_line(".exit"));
}
