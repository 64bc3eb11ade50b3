//! Native Linux host.

use crate::config::MountConfiguration;
use crate::error::Result;
use crate::platform::{HostKind, HostPlatform};
use crate::process::{diagnostic_listing, CommandRunner};

/// Directory under which veracrypt's numbered mount points live.
pub const MEDIA_ROOT: &str = "/media";

/// Partition listing diagnostic
pub const LSBLK: &str = "lsblk";

/// Mount point veracrypt uses for `slot`.
pub fn slot_mount_point(slot: &str) -> String {
    format!("{}/veracrypt{}", MEDIA_ROOT, slot)
}

/// Check if running as root (EUID 0)
#[cfg(unix)]
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn is_running_as_root() -> bool {
    false
}

/// Linux host with direct block device access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLinux;

impl HostPlatform for NativeLinux {
    fn kind(&self) -> HostKind {
        HostKind::Native
    }

    fn has_admin_rights(&self) -> bool {
        is_running_as_root()
    }

    fn validate_host(
        &self,
        _config: &mut MountConfiguration,
        _runner: &dyn CommandRunner,
    ) -> Result<()> {
        Ok(())
    }

    fn list_partitions(
        &self,
        _config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<String> {
        Ok(diagnostic_listing(runner, LSBLK, &[]))
    }

    fn prepare_mount(
        &self,
        _config: &MountConfiguration,
        _runner: &dyn CommandRunner,
    ) -> Result<()> {
        Ok(())
    }

    fn mount_point(&self, config: &MountConfiguration) -> Result<String> {
        Ok(slot_mount_point(&config.slot()?))
    }
}
