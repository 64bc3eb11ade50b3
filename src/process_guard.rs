//! Interrupt handling while veracrypt owns the terminal
//!
//! veracrypt shares our foreground process group, so a Ctrl-C typed into
//! its prompt reaches both processes. Exiting the launcher at that point
//! would abandon a mount that may still be in progress, so while a
//! [`ForegroundSession`] is alive the interrupt is left to veracrypt and the
//! launcher keeps waiting. Outside a session Ctrl-C exits as usual.
//!
//! The password prompt turns terminal echo off. An interrupt during a
//! [`PasswordEntry`] turns echo back on before exiting, since the prompt's
//! own cleanup never runs once the process exits from the handler thread.
//! On Windows the console mode is left to the console host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code used when interrupted outside a foreground session (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Global count of interactive children currently in the foreground.
/// Using OnceLock for safe lazy initialization
static FOREGROUND: OnceLock<Arc<AtomicUsize>> = OnceLock::new();

fn foreground_sessions() -> Arc<AtomicUsize> {
    FOREGROUND
        .get_or_init(|| Arc::new(AtomicUsize::new(0)))
        .clone()
}

/// Whether an interactive child currently owns the terminal
pub fn in_foreground_session() -> bool {
    foreground_sessions().load(Ordering::SeqCst) > 0
}

/// RAII marker for an interactive child owning the terminal.
#[derive(Debug)]
pub struct ForegroundSession {
    sessions: Arc<AtomicUsize>,
}

impl ForegroundSession {
    /// Mark the start of an interactive session
    pub fn enter() -> Self {
        let sessions = foreground_sessions();
        sessions.fetch_add(1, Ordering::SeqCst);
        Self { sessions }
    }
}

impl Drop for ForegroundSession {
    fn drop(&mut self) {
        self.sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Number of password prompts currently reading with echo disabled.
static PASSWORD_ENTRIES: AtomicUsize = AtomicUsize::new(0);

/// Whether a password prompt currently has echo disabled
pub fn in_password_entry() -> bool {
    PASSWORD_ENTRIES.load(Ordering::SeqCst) > 0
}

/// RAII marker for a password prompt with echo disabled.
#[derive(Debug)]
pub struct PasswordEntry(());

impl PasswordEntry {
    pub fn enter() -> Self {
        PASSWORD_ENTRIES.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Drop for PasswordEntry {
    fn drop(&mut self) {
        PASSWORD_ENTRIES.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Turn echo back on for the controlling terminal.
#[cfg(unix)]
fn restore_terminal_echo() {
    use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg};

    let Ok(tty) = std::fs::File::open("/dev/tty") else {
        return;
    };
    match tcgetattr(&tty) {
        Ok(mut attrs) => {
            attrs.local_flags.insert(LocalFlags::ECHO);
            if let Err(e) = tcsetattr(&tty, SetArg::TCSANOW, &attrs) {
                tracing::debug!("Failed to restore terminal echo: {}", e);
            }
        }
        Err(e) => tracing::debug!("Failed to read terminal attributes: {}", e),
    }
}

#[cfg(not(unix))]
fn restore_terminal_echo() {}

/// Install the Ctrl-C handler. Call once at startup.
pub fn init_signal_handlers() -> Result<(), ctrlc::Error> {
    let sessions = foreground_sessions();
    ctrlc::set_handler(move || {
        if sessions.load(Ordering::SeqCst) > 0 {
            tracing::warn!("Interrupt received; waiting for veracrypt to exit");
            return;
        }
        if in_password_entry() {
            restore_terminal_echo();
            eprintln!();
        }
        tracing::info!("Interrupted");
        std::process::exit(EXIT_INTERRUPTED);
    })
}
