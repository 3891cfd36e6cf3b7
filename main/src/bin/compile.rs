use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use console_asm::compile;
use console_main::{init_logging, io_error_code, read_input, write_output};
use tracing::info;

/// Compiles console assembly into a ROM.
#[derive(Parser, Debug)]
#[command(name = "console-compile", version)]
struct Args {
    /// Source file, or `-` for stdin.
    input: PathBuf,

    /// ROM file to write, or `-` for stdout.
    output: PathBuf,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = match read_input(&args.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: {}: {err}", args.input.display());
            return ExitCode::from(io_error_code(&err));
        }
    };

    let rom = match compile(&source) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = write_output(&args.output, &rom) {
        eprintln!("Error: {}: {err}", args.output.display());
        return ExitCode::from(io_error_code(&err));
    }

    info!(input = %args.input.display(), rom_len = rom.len(), "wrote rom");
    ExitCode::SUCCESS
}
