//! veracrypt command line construction and execution.
//!
//! # Token layout
//!
//! | Index | Native                   | WSL                         |
//! |-------|--------------------------|-----------------------------|
//! | 0     | `veracrypt`              | `wsl`                       |
//! | 1     | `-t`                     | `veracrypt`                 |
//! | 2     | `--keyfiles=...`         | `-t`                        |
//! | 3     | `-tc` (legacy volumes)   | `-m=nokernelcrypto`         |
//! | n-2   | partition                | partition                   |
//! | n-1   | `/media/veracrypt<slot>` | `/mnt/wsl/PHYSICALDRIVE<n>` |
//!
//! Password, PIM, hidden volume and slot flags sit in between.
//!
//! The password travels as `--password=<value>`, so the tokens must never be
//! logged. [`VeracryptCommand`]'s `Debug` masks it, and the partition and
//! mount point are exposed separately for progress messages.

use std::fmt;

use zeroize::Zeroizing;

use crate::config::{keys, MountConfiguration, DEFAULT_WSL_EXE, PASSWORD_MASK};
use crate::error::{LaunchError, Result};
use crate::platform::{HostKind, HostPlatform};
use crate::process::{CommandRunner, SessionExit};
use crate::process_guard::ForegroundSession;

/// veracrypt executable, resolved through the search path.
pub const VERACRYPT: &str = "veracrypt";

/// Text mode: prompt on the terminal for anything the command line omits.
pub const TEXT_MODE_FLAG: &str = "-t";

/// Mount a legacy TrueCrypt volume.
pub const TRUECRYPT_FLAG: &str = "-tc";

/// WSL has no access to the host's hardware crypto acceleration.
pub const NO_KERNEL_CRYPTO_FLAG: &str = "-m=nokernelcrypto";

/// Position of the legacy and kernel-crypto flags.
pub const MODE_FLAG_INDEX: usize = 3;

const PASSWORD_PREFIX: &str = "--password=";

/// Fully assembled veracrypt invocation.
pub struct VeracryptCommand {
    tokens: Zeroizing<Vec<String>>,
}

impl VeracryptCommand {
    /// Program to execute (`veracrypt`, or the WSL executable on Windows).
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Arguments following the program.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Every token, program first. Contains the password in cleartext.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Partition being mounted (second-to-last token).
    pub fn partition(&self) -> &str {
        &self.tokens[self.tokens.len() - 2]
    }

    /// Mount point (last token).
    pub fn mount_point(&self) -> &str {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Tokens with the password masked, safe to print.
    pub fn redacted(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|token| {
                if token.starts_with(PASSWORD_PREFIX) {
                    format!("{}{}", PASSWORD_PREFIX, PASSWORD_MASK)
                } else {
                    token.clone()
                }
            })
            .collect()
    }

    /// Launch veracrypt on the terminal and wait for it to exit.
    ///
    /// Returning early could abort a mount in progress, so this blocks for
    /// as long as veracrypt runs, interrupts included.
    pub fn execute(&self, runner: &dyn CommandRunner) -> Result<SessionExit> {
        let _session = ForegroundSession::enter();
        Ok(runner.run_interactive(self.program(), self.args())?)
    }
}

impl fmt::Debug for VeracryptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VeracryptCommand")
            .field("tokens", &self.redacted())
            .finish()
    }
}

/// Build the veracrypt command line for a validated configuration.
///
/// Unset pass-through values fall back to veracrypt's own defaults: no
/// keyfiles, the default PIM and no hidden volume protection.
pub fn build_veracrypt_cmdline(
    config: &MountConfiguration,
    platform: &dyn HostPlatform,
) -> Result<VeracryptCommand> {
    let partition = config.get(keys::DRIVE_PARTITION).ok_or_else(|| {
        LaunchError::config(format!(
            "{} is not set!",
            keys::DRIVE_PARTITION.to_ascii_uppercase()
        ))
    })?;
    let slot = config.slot()?;

    let mut tokens = vec![
        VERACRYPT.to_string(),
        TEXT_MODE_FLAG.to_string(),
        format!("--keyfiles={}", config.get_or(keys::KEYFILE_PATH, "")),
        format!("{}{}", PASSWORD_PREFIX, config.password().unwrap_or_default()),
        format!("--pim={}", config.get_or(keys::PIM, "0")),
        format!("--protect-hidden={}", config.get_or(keys::HIDDEN_PARTITION, "no")),
        format!("--slot={}", slot),
        partition.to_string(),
    ];

    if config.use_truecrypt()? {
        tokens.insert(MODE_FLAG_INDEX, TRUECRYPT_FLAG.to_string());
    }

    if platform.kind() == HostKind::Wsl {
        let wsl_exe = config.get_or(keys::WSL_EXE, DEFAULT_WSL_EXE);
        tokens.insert(0, wsl_exe.to_string());
        tokens.insert(MODE_FLAG_INDEX, NO_KERNEL_CRYPTO_FLAG.to_string());
    }

    tokens.push(platform.mount_point(config)?);

    Ok(VeracryptCommand {
        tokens: Zeroizing::new(tokens),
    })
}
