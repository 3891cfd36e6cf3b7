//! Plumbing shared by the `console-compile` and `console-run` binaries.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use console_core_emulator::{Console, Status};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// A path argument naming stdin or stdout instead of a file.
pub const STDIO_PATH: &str = "-";

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new(STDIO_PATH) {
        let mut data = vec![];
        io::stdin().lock().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(path)
    }
}

pub fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    if path == Path::new(STDIO_PATH) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()
    } else {
        fs::write(path, data)
    }
}

/// Process exit code for an I/O failure: the OS error number where there is one, else 1.
pub fn io_error_code(err: &io::Error) -> u8 {
    err.raw_os_error()
        .and_then(|code| u8::try_from(code).ok())
        .filter(|&code| code != 0)
        .unwrap_or(1)
}

/// Renders the machine state printed by `console-run --dump`.
pub fn dump(console: &Console, status: Status) -> String {
    let registers = console
        .registers
        .iter()
        .map(|r| format!("{r:02x}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "status: {status:?} ({})\ncursor: {:#06x}\nregisters: {registers}\ncall stack: {}\n",
        status.code(),
        console.rom_cursor(),
        console.call_stack.len(),
    )
}
