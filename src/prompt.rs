//! Interactive terminal input: masked password entry and the pause shown
//! before exiting on an error.

use std::io::{self, BufRead, Write};

use zeroize::Zeroizing;

use crate::process_guard::PasswordEntry;

/// Prompt shown when the configuration has no password.
pub const PASSWORD_PROMPT: &str = "Enter Volume Password: ";

/// Message shown before exiting on an error.
pub const PAUSE_MESSAGE: &str = "Press any key to exit...";

/// Interactive input used by the launcher.
pub trait Prompter {
    /// Read a password without echoing it.
    fn password(&self, prompt: &str) -> io::Result<Zeroizing<String>>;

    /// Show `message` and wait for the user to acknowledge it.
    fn pause(&self, message: &str);
}

/// [`Prompter`] reading from the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn password(&self, prompt: &str) -> io::Result<Zeroizing<String>> {
        let _entry = PasswordEntry::enter();
        rpassword::prompt_password(prompt).map(Zeroizing::new)
    }

    fn pause(&self, message: &str) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{}", message);
        let _ = stdout.flush();

        let mut line = String::new();
        if let Err(e) = io::stdin().lock().read_line(&mut line) {
            tracing::debug!("Failed to read acknowledgement: {}", e);
        }
    }
}
