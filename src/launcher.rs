//! Launcher module
//!
//! Chains the mount phases: privilege check, configuration loading and
//! validation, host preparation, and the veracrypt session itself. The
//! launcher's exit code reflects whether veracrypt was launched, not whether
//! the mount succeeded; veracrypt reports its own errors on the terminal.

use std::path::Path;

use crate::config_file::load_config_file;
use crate::error::{LaunchError, Result};
use crate::platform::HostPlatform;
use crate::process::{CommandRunner, SessionExit};
use crate::prompt::{Prompter, PAUSE_MESSAGE};
use crate::validation::validate_config;
use crate::veracrypt::build_veracrypt_cmdline;

/// Summary of a completed launch. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// Partition handed to veracrypt
    pub partition: String,
    /// Where veracrypt was asked to mount it
    pub mount_point: String,
    /// How the veracrypt session ended
    pub session: SessionExit,
}

/// Launcher instance
pub struct Launcher<'a> {
    platform: &'a dyn HostPlatform,
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
}

impl<'a> Launcher<'a> {
    /// Create a new launcher over the given host services
    pub fn new(
        platform: &'a dyn HostPlatform,
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            platform,
            runner,
            prompter,
        }
    }

    /// Mount the volume described by the configuration file at `config_path`.
    pub fn launch(&self, config_path: &Path) -> Result<LaunchReport> {
        if !self.platform.has_admin_rights() {
            return Err(LaunchError::Admin);
        }
        tracing::debug!("Running on {}", self.platform.kind());

        let file_name = config_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| config_path.display().to_string());
        tracing::info!("Loading configuration from config file '{}'...", file_name);

        let mut config = load_config_file(config_path)?;
        config.log_entries();
        validate_config(&mut config, self.platform, self.runner, self.prompter)?;

        self.platform.prepare_mount(&config, self.runner)?;

        // The command carries the password: log only the partition and mount point.
        let command = build_veracrypt_cmdline(&config, self.platform)?;
        drop(config);
        tracing::info!(
            "Mounting Veracrypt volume '{}' to '{}'...",
            command.partition(),
            command.mount_point()
        );

        let session = command.execute(self.runner)?;
        if session.success() {
            tracing::info!("veracrypt finished");
        } else {
            tracing::warn!(
                "veracrypt exited with {:?}; check its output above for details",
                session.exit_code
            );
        }

        Ok(LaunchReport {
            partition: command.partition().to_string(),
            mount_point: command.mount_point().to_string(),
            session,
        })
    }

    /// Run [`Launcher::launch`], report any failure, and return the exit code.
    pub fn run(&self, config_path: &Path) -> i32 {
        match self.launch(config_path) {
            Ok(_) => 0,
            Err(err) => {
                self.report(&err);
                err.exit_code()
            }
        }
    }

    fn report(&self, err: &LaunchError) {
        match err {
            LaunchError::Admin => {
                tracing::error!("This script requires administrative rights to mount volumes.");
                tracing::error!("Please re-run this script as an administrator or as root.");
            }
            LaunchError::Config(msg) => {
                tracing::error!("An error has been detected in the configuration file:");
                tracing::error!("{}", msg);
            }
            other => tracing::error!("{:#}", other),
        }

        if err.needs_acknowledgement() {
            self.prompter.pause(PAUSE_MESSAGE);
        }
    }
}
