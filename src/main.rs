//! veracrypt-mount - Main entry point
//!
//! Mounts a VeraCrypt volume holding a Linux filesystem, natively on Linux
//! or through WSL on Windows.

use tracing_subscriber::EnvFilter;

use veracrypt_mount::cli::Cli;
use veracrypt_mount::launcher::Launcher;
use veracrypt_mount::platform;
use veracrypt_mount::process::SystemRunner;
use veracrypt_mount::process_guard;
use veracrypt_mount::prompt::TerminalPrompter;

/// Initialize the logger with appropriate settings
fn init_logger() {
    // RUST_LOG overrides the default; config values are logged at debug.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse_args();

    init_logger();

    if let Err(e) = process_guard::init_signal_handlers() {
        tracing::warn!("Failed to initialize interrupt handler: {}", e);
    }

    let host = platform::detect();
    let launcher = Launcher::new(host.as_ref(), &SystemRunner, &TerminalPrompter);
    let code = launcher.run(&cli.config);

    std::process::exit(code);
}
