use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap_stdin::FileOrStdin;
use log::error;

use tacc::codegen::render;
use tacc::error::CompileError;

/// Compiles a block-structured source program into three-address code.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source file, or `-` for standard input
    #[arg(short, long, default_value = "-")]
    input: FileOrStdin,

    /// Write the TAC here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let filename = cli.input.filename().to_string();
    let source = match cli.input.contents() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read '{}': {}", filename, err);
            return ExitCode::FAILURE;
        }
    };

    let result = tacc::compile(&filename, &source).and_then(|statements| {
        let text = render(&statements);
        match &cli.output {
            Some(path) => std::fs::write(path, text).map_err(|source| CompileError::Io {
                path: path.display().to_string(),
                source,
            }),
            None => {
                print!("{}", text);
                Ok(())
            }
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("compilation of '{}' failed", filename);
            eprintln!("{}", err.render(&filename, &source));
            ExitCode::FAILURE
        }
    }
}
