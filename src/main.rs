use std::{fs, path::Path, process};

use clap::Parser;
use termcolor::ColorChoice;

use osaker::{
    console::{formatter_for, init_logger, report_error},
    io::StdOutput,
    repl::Repl,
    tokenize, Interpreter,
};

/// The Osaker programming language interpreter.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path to the .osaka script. Starts the REPL when omitted.
    file: Option<String>,

    /// Print the token stream of the script instead of running it.
    #[arg(long)]
    tokens: bool,

    /// Never color the output.
    #[arg(long)]
    no_color: bool,

    /// More log output: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let choice = if args.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let guard = match init_logger(args.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("failed to set up logging: {}", e);
            None
        }
    };

    let code = match &args.file {
        Some(file) => run_file(Path::new(file), args.tokens, choice),
        None => {
            if args.tokens {
                log::warn!("--tokens needs a script file, ignoring it");
            }
            let interpreter = Interpreter::new().with_formatter(formatter_for(choice));
            match Repl::new(interpreter).run() {
                Ok(()) => 0,
                Err(e) => {
                    log::error!("{}", e);
                    1
                }
            }
        }
    };
    // flushes the logging thread; process::exit skips destructors
    drop(guard);
    process::exit(code);
}

fn run_file(path: &Path, tokens_only: bool, choice: ColorChoice) -> i32 {
    if path.extension().map_or(true, |extension| extension != "osaka") {
        log::warn!("'{}' does not have the .osaka extension", path.display());
    }
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            log::error!(
                "failed to read '{}', perhaps this file does not exist? ({})",
                path.display(),
                e
            );
            return 1;
        }
    };

    if tokens_only {
        return match tokenize(&source) {
            Ok(tokens) => {
                for token in tokens {
                    println!("{}:{}\t{}", token.line(), token.column(), token.data);
                }
                0
            }
            Err(e) => {
                report_error(&e);
                1
            }
        };
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut interpreter = Interpreter::with_base_dir(base_dir).with_formatter(formatter_for(choice));
    match interpreter.eval(&source, &mut StdOutput) {
        Ok(()) => 0,
        Err(e) => {
            report_error(&e);
            1
        }
    }
}
