use std::{
    io::{self, Write},
    rc::Rc,
};

use ftlog::LoggerGuard;
use log::{Level, LevelFilter};
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{
    error::OsakerError,
    io::{Formatter, PlainFormatter},
    parser::statement::MODULE_ANNOTATION,
    values::Value,
};

/// Plain inspect lines with the name, literal and type painted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorFormatter;

impl ColorFormatter {
    fn paint(parts: &[(Color, &str)]) -> io::Result<String> {
        let mut buffer = Ansi::new(Vec::new());
        for (color, text) in parts {
            buffer.set_color(ColorSpec::new().set_fg(Some(*color)))?;
            write!(buffer, "{}", text)?;
        }
        buffer.reset()?;
        Ok(String::from_utf8_lossy(&buffer.into_inner()).into_owned())
    }
}

impl Formatter for ColorFormatter {
    fn value(&self, name: &str, value: &Value) -> String {
        let literal = value.value().to_string();
        let osaka_type = value.osaka_type().to_string();
        Self::paint(&[
            (Color::Blue, name),
            (Color::White, " <-- "),
            (Color::Green, literal.as_str()),
            (Color::White, " "),
            (Color::Yellow, osaka_type.as_str()),
        ])
        .unwrap_or_else(|_| PlainFormatter.value(name, value))
    }

    fn namespace_header(&self, name: &str) -> String {
        let annotation = format!("~{}", MODULE_ANNOTATION);
        Self::paint(&[
            (Color::Blue, name),
            (Color::White, " <-- "),
            (Color::Magenta, annotation.as_str()),
        ])
        .unwrap_or_else(|_| PlainFormatter.namespace_header(name))
    }

    fn integer(&self, value: i64) -> String {
        let text = value.to_string();
        Self::paint(&[(Color::Green, text.as_str())]).unwrap_or_else(|_| value.to_string())
    }
}

/// Colored formatter when `choice` allows it on stdout, plain otherwise.
pub fn formatter_for(choice: ColorChoice) -> Rc<dyn Formatter> {
    if StandardStream::stdout(choice).supports_color() {
        Rc::new(ColorFormatter)
    } else {
        Rc::new(PlainFormatter)
    }
}

fn error_message(error: &OsakerError) -> String {
    format!("{}: {}", error.kind(), error)
}

/// Logs the error, or prints it to stderr when no logger takes error records.
pub fn report_error(error: &OsakerError) {
    let message = error_message(error);
    if log::log_enabled!(Level::Error) {
        log::error!("{}", message);
    } else {
        eprintln!("{}", message);
    }
}

/// 0 is warnings and errors only; each step adds info, debug, then trace.
pub fn verbosity_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs ftlog as the `log` backend. Records are written by a background
/// thread, so keep the guard alive until the last record is out.
pub fn init_logger(verbosity: u8) -> Result<LoggerGuard, Box<dyn std::error::Error>> {
    ftlog::Builder::new()
        .max_log_level(verbosity_level(verbosity))
        .try_init()
}

#[cfg(test)]
use crate::{
    error::{ErrorData, ToLocated},
    interpreter::error::LogicError,
    values::Primitive,
};

#[test]
fn colored_value_keeps_text() {
    let value = Value::from(Primitive::Integer(3));
    let painted = ColorFormatter.value("count", &value);
    assert!(painted.contains("count"));
    assert!(painted.contains("3"));
    assert!(painted.contains("~chiyo"));
    assert!(painted.contains('\u{1b}'));
    assert_ne!(painted, PlainFormatter.value("count", &value));
}

#[test]
fn no_color_is_plain() {
    let formatter = formatter_for(ColorChoice::Never);
    let value = Value::from(Primitive::Boolean(true));
    assert_eq!(formatter.value("flag", &value), "flag <-- yes ~tomo");
}

#[test]
fn verbosity_levels() {
    assert_eq!(verbosity_level(0), LevelFilter::Warn);
    assert_eq!(verbosity_level(2), LevelFilter::Debug);
    assert_eq!(verbosity_level(9), LevelFilter::Trace);
}

#[test]
fn errors_show_kind_and_location() {
    let error = ErrorData::from(LogicError::UnboundName("ghost".to_string())).locate(Some([3, 4]));
    assert_eq!(
        error_message(&error),
        "NameError: [line 3, column 4] name 'ghost' is not defined"
    );
    // no logger in unit tests, so this goes to stderr
    assert!(!log::log_enabled!(Level::Error));
    report_error(&error);
}
