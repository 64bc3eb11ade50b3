//! Windows host using the Windows Subsystem for Linux.
//!
//! Windows cannot hand a Linux filesystem to veracrypt directly, so the
//! physical drive is attached to WSL with `wsl --mount <drive> --bare` and
//! veracrypt runs inside the WSL distribution. The mounted volume then shows
//! up on the Windows side under the distribution's root share
//! (`\\wsl.localhost\<distro>\mnt\wsl\PHYSICALDRIVE<n>`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{keys, MountConfiguration, DEFAULT_WSL_EXE};
use crate::error::{LaunchError, Result};
use crate::platform::{HostKind, HostPlatform};
use crate::process::{diagnostic_listing, CommandOutput, CommandRunner};

/// Directory inside WSL where attached drives are mounted.
pub const WSL_MOUNT_ROOT: &str = "/mnt/wsl";

/// Physical drive listing diagnostic
pub const WMIC: &str = "wmic.exe";

/// Partition listing run inside WSL
pub const LSBLK: &str = "lsblk";

/// Name Windows gives physical drive `drive_num`.
pub fn physical_drive_name(drive_num: u32) -> String {
    format!("PHYSICALDRIVE{}", drive_num)
}

/// Device path of physical drive `drive_num` (`\\.\PHYSICALDRIVE<n>`).
pub fn physical_drive_device(drive_num: u32) -> String {
    format!(r"\\.\{}", physical_drive_name(drive_num))
}

/// Mount point inside WSL for physical drive `drive_num`.
pub fn wsl_mount_point(drive_num: u32) -> String {
    format!("{}/{}", WSL_MOUNT_ROOT, physical_drive_name(drive_num))
}

/// The same mount point as seen from Windows through the root share.
pub fn host_mount_dir(wsl_root: &Path, drive_num: u32) -> PathBuf {
    wsl_root
        .join("mnt")
        .join("wsl")
        .join(physical_drive_name(drive_num))
}

/// Attach physical drive `drive_num` to WSL as a bare disk.
///
/// The captured result is returned as-is; a nonzero exit (for instance
/// because the drive is already attached) is for the caller to judge.
pub fn attach_physical_drive(
    runner: &dyn CommandRunner,
    wsl_exe: &str,
    drive_num: u32,
) -> Result<CommandOutput> {
    let args = [
        "--mount".to_string(),
        physical_drive_device(drive_num),
        "--bare".to_string(),
    ];
    Ok(runner.capture(wsl_exe, &args)?)
}

/// WSL executable configured for this run
fn wsl_exe(config: &MountConfiguration) -> &str {
    config.get_or(keys::WSL_EXE, DEFAULT_WSL_EXE)
}

fn required_drive_num(config: &MountConfiguration) -> Result<u32> {
    config.physical_drive_num()?.ok_or_else(|| {
        LaunchError::config(format!(
            "{} is not set!",
            keys::PHYSICAL_DRIVE_NUM.to_ascii_uppercase()
        ))
    })
}

/// Attach the configured drive, logging rather than failing on a nonzero exit.
fn attach_configured_drive(config: &MountConfiguration, runner: &dyn CommandRunner) -> Result<()> {
    let drive_num = required_drive_num(config)?;
    let output = attach_physical_drive(runner, wsl_exe(config), drive_num)?;
    if output.success {
        tracing::debug!("Attached {} to WSL", physical_drive_name(drive_num));
    } else {
        tracing::warn!(
            "Attaching {} to WSL exited with {:?}: {}",
            physical_drive_name(drive_num),
            output.exit_code,
            output.stderr.trim()
        );
    }
    Ok(())
}

/// Windows host reaching the volume through WSL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wsl;

impl HostPlatform for Wsl {
    fn kind(&self) -> HostKind {
        HostKind::Wsl
    }

    #[cfg(windows)]
    fn has_admin_rights(&self) -> bool {
        // SAFETY: IsUserAnAdmin takes no arguments and only queries the token.
        unsafe { windows::Win32::UI::Shell::IsUserAnAdmin().as_bool() }
    }

    #[cfg(not(windows))]
    fn has_admin_rights(&self) -> bool {
        false
    }

    fn validate_host(
        &self,
        config: &mut MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        if !config.contains(keys::WSL_ROOT) {
            return Err(LaunchError::config(format!(
                "{} is not set!\n\
                 Please set it to WSL's root share path for the current distribution [e.g. '\\\\wsl.localhost\\Ubuntu'].",
                keys::WSL_ROOT.to_ascii_uppercase()
            )));
        }

        let exe = wsl_exe(config).to_string();
        config.set(keys::WSL_EXE, exe.as_str());
        if !runner.locate(&exe) {
            return Err(LaunchError::config(format!(
                "Unable to find Windows Subsystem for Linux executable at '{}'!\n\
                 Please make sure WSL is installed at the path set for {} in the config file.",
                exe,
                keys::WSL_EXE.to_ascii_uppercase()
            )));
        }

        if !config.contains(keys::PHYSICAL_DRIVE_NUM) {
            let drives = diagnostic_listing(
                runner,
                WMIC,
                &["diskdrive".to_string(), "list".to_string(), "brief".to_string()],
            );
            return Err(LaunchError::config(format!(
                "{} is not set!\n\
                 Please set it to the DeviceID for the drive containing the Veracrypt volume. [e.g. '0' for 'PHYSICALDRIVE0'].\n\
                 Currently detected physical drives:\n{}",
                keys::PHYSICAL_DRIVE_NUM.to_ascii_uppercase(),
                drives
            )));
        }
        config.physical_drive_num()?;

        Ok(())
    }

    fn list_partitions(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<String> {
        // lsblk only sees the drive once it is attached.
        attach_configured_drive(config, runner)?;
        Ok(diagnostic_listing(runner, wsl_exe(config), &[LSBLK.to_string()]))
    }

    fn prepare_mount(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        let drive_num = required_drive_num(config)?;
        let wsl_root = config.get(keys::WSL_ROOT).ok_or_else(|| {
            LaunchError::config(format!("{} is not set!", keys::WSL_ROOT.to_ascii_uppercase()))
        })?;

        let mount_dir = host_mount_dir(Path::new(wsl_root), drive_num);
        if !mount_dir.exists() {
            tracing::info!("Creating mount point at '{}'...", mount_dir.display());
            fs::create_dir_all(&mount_dir)?;
        }

        tracing::info!("Mounting Veracrypt drive at drive number '{}'...", drive_num);
        attach_configured_drive(config, runner)
    }

    fn mount_point(&self, config: &MountConfiguration) -> Result<String> {
        Ok(wsl_mount_point(required_drive_num(config)?))
    }
}
