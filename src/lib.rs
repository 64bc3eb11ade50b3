//! VeraCrypt volume launcher library
//!
//! Mounts a VeraCrypt volume holding a Linux filesystem, either natively on
//! Linux or on Windows through WSL. The crate only orchestrates: it loads
//! the settings, checks the host, builds veracrypt's command line and waits
//! for veracrypt to finish.

pub mod cli;
pub mod config;
pub mod config_file;
pub mod error;
pub mod launcher;
pub mod platform;
pub mod process;
pub mod process_guard;
pub mod prompt;
pub mod validation;
pub mod veracrypt;

// Re-export main types for convenience
pub use config::MountConfiguration;
pub use config_file::load_config_file;
pub use error::LaunchError;
pub use launcher::{LaunchReport, Launcher};
pub use platform::{HostKind, HostPlatform, NativeLinux, Wsl};
pub use process::{CommandOutput, CommandRunner, SessionExit, SystemRunner};
pub use prompt::{Prompter, TerminalPrompter};
pub use validation::validate_config;
pub use veracrypt::{build_veracrypt_cmdline, VeracryptCommand};
