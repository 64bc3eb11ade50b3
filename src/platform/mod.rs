//! Host platform services
//!
//! The launcher supports two hosts that need noticeably different handling:
//!
//! - **Native Linux**: veracrypt sees the block device directly and mounts
//!   under `/media/veracrypt<slot>`.
//! - **Windows + WSL**: the physical drive has to be attached to WSL as a
//!   bare disk first, veracrypt runs inside WSL, and the volume is mounted
//!   under `/mnt/wsl/PHYSICALDRIVE<n>`.
//!
//! Both are expressed through [`HostPlatform`]; the variant is picked once at
//! startup by [`detect`] and the rest of the launcher only sees the trait.

pub mod native;
pub mod wsl;

use strum::Display;

use crate::config::MountConfiguration;
use crate::error::Result;
use crate::process::CommandRunner;

pub use native::NativeLinux;
pub use wsl::Wsl;

/// Which host the launcher is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HostKind {
    /// Linux with direct access to block devices
    #[strum(to_string = "native Linux")]
    Native,
    /// Windows, reaching block devices through WSL
    #[strum(to_string = "Windows (WSL)")]
    Wsl,
}

impl HostKind {
    /// Host kind of the running build.
    pub fn current() -> Self {
        if cfg!(windows) { Self::Wsl } else { Self::Native }
    }
}

/// Operations whose behaviour depends on the host.
pub trait HostPlatform {
    /// Which host this is.
    fn kind(&self) -> HostKind;

    /// Whether the process may attach raw block devices. Side-effect free.
    fn has_admin_rights(&self) -> bool;

    /// Host-specific configuration checks.
    ///
    /// Runs before the partition and password checks, which may depend on
    /// values it fills in.
    fn validate_host(
        &self,
        config: &mut MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()>;

    /// Listing of partitions veracrypt could mount, for error messages.
    fn list_partitions(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<String>;

    /// Make the volume reachable before veracrypt is launched.
    fn prepare_mount(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()>;

    /// Where veracrypt mounts the volume, as seen by veracrypt.
    fn mount_point(&self, config: &MountConfiguration) -> Result<String>;
}

/// Select the platform services for the running host.
pub fn detect() -> Box<dyn HostPlatform> {
    let kind = HostKind::current();
    tracing::debug!("Host platform: {}", kind);
    match kind {
        HostKind::Native => Box::new(NativeLinux),
        HostKind::Wsl => Box::new(Wsl),
    }
}
