//! Configuration validation
//!
//! Runs the host checks first (on WSL they fill in `wsl_exe` and confirm the
//! drive number that partition discovery needs), then partition resolution,
//! then value checks, and finally asks for the password if the file has none.
//! Every failure is a configuration error; where possible the message embeds
//! a live listing of candidate values so the user can fill the gap.

use crate::config::{keys, MountConfiguration};
use crate::error::{LaunchError, Result};
use crate::platform::HostPlatform;
use crate::process::CommandRunner;
use crate::prompt::{Prompter, PASSWORD_PROMPT};

/// Validate `config` in place, filling defaults and prompting for the password.
pub fn validate_config(
    config: &mut MountConfiguration,
    platform: &dyn HostPlatform,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> Result<()> {
    platform.validate_host(config, runner)?;

    if !config.contains(keys::DRIVE_PARTITION) {
        let partitions = platform.list_partitions(config, runner)?;
        return Err(LaunchError::config(format!(
            "{} is not set!\n\
             Please set it to the Linux partition of the Veracrypt volume [e.g. '/dev/sda1'].\n\
             Currently detected Linux partitions:\n{}",
            keys::DRIVE_PARTITION.to_ascii_uppercase(),
            partitions
        )));
    }

    // Reject malformed values before asking for a password.
    config.slot_num()?;
    config.use_truecrypt()?;

    if config.password().is_none() {
        let password = prompter.password(PASSWORD_PROMPT)?;
        config.set_password(password);
    }

    Ok(())
}
