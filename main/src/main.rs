use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use console_core_emulator::{Console, DEFAULT_FRAME_RATE, FixedRateHost, UnpacedHost};
use console_main::{dump, init_logging, io_error_code, read_input};
use tracing::{info, warn};

/// Runs a compiled console ROM, one frame per tick, until it halts.
#[derive(Parser, Debug)]
#[command(name = "console-run", version)]
struct Args {
    /// ROM file, or `-` for stdin.
    rom: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Stop after this many frames.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    frames: Option<u64>,

    /// Run frames back to back instead of at `--fps`.
    #[arg(long)]
    unpaced: bool,

    /// Print the final machine state to stdout.
    #[arg(long)]
    dump: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let rom = match read_input(&args.rom) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("Error: {}: {err}", args.rom.display());
            return ExitCode::from(io_error_code(&err));
        }
    };

    let mut console = match Console::new_with_rom(rom) {
        Ok(console) => console,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    };

    let outcome = if args.unpaced {
        console.run(&mut UnpacedHost::new(args.frames))
    } else {
        console.run(&mut FixedRateHost::new(args.fps, args.frames))
    };

    if args.dump {
        print!("{}", dump(&console, outcome.status));
    }

    if outcome.status.is_fault() {
        warn!(
            status = ?outcome.status,
            frames = outcome.frames,
            cursor = console.rom_cursor(),
            "console faulted"
        );
        ExitCode::FAILURE
    } else {
        info!(status = ?outcome.status, frames = outcome.frames, "console stopped");
        ExitCode::SUCCESS
    }
}
