use std::fs;

use clap::Parser;
use exprima::interpreter::environment::EvaluationEnvironment;

/// exprima evaluates small, side-effect-free expressions against an
/// environment of variables and functions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treats the input as a path and reads the program from that file.
    #[arg(short, long)]
    file: bool,

    /// The expression to evaluate, or a file path with --file.
    contents: String,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let source = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    match exprima::evaluate(&source, &EvaluationEnvironment::new()) {
        Ok(value) => println!("{value}"),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        },
    }
}
