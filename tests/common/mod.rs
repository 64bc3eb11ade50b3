//! Shared test doubles for the launcher integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use veracrypt_mount::config::MountConfiguration;
use veracrypt_mount::error::Result;
use veracrypt_mount::platform::{HostKind, HostPlatform};
use veracrypt_mount::process::{CommandOutput, CommandRunner, SessionExit};
use veracrypt_mount::prompt::Prompter;
use zeroize::Zeroizing;

/// Runner that records every invocation and replays canned output.
#[derive(Default)]
pub struct RecordingRunner {
    /// Captured invocations, program first.
    pub captured: RefCell<Vec<Vec<String>>>,
    /// Interactive invocations, program first.
    pub interactive: RefCell<Vec<Vec<String>>>,
    outputs: HashMap<String, CommandOutput>,
    missing: Vec<String>,
    session_exit_code: Option<i32>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            session_exit_code: Some(0),
            ..Self::default()
        }
    }

    /// Reply to captures of `program` with `output`.
    pub fn with_output(mut self, program: &str, output: CommandOutput) -> Self {
        self.outputs.insert(program.to_string(), output);
        self
    }

    /// Make `locate(program)` report the program as missing.
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Exit code reported by interactive sessions.
    pub fn with_session_exit(mut self, code: Option<i32>) -> Self {
        self.session_exit_code = code;
        self
    }

    /// Programs captured, in order.
    pub fn captured_programs(&self) -> Vec<String> {
        self.captured.borrow().iter().map(|c| c[0].clone()).collect()
    }

    /// Total number of invocations of any kind.
    pub fn call_count(&self) -> usize {
        self.captured.borrow().len() + self.interactive.borrow().len()
    }
}

fn invocation(program: &str, args: &[String]) -> Vec<String> {
    let mut call = vec![program.to_string()];
    call.extend(args.iter().cloned());
    call
}

impl CommandRunner for RecordingRunner {
    fn capture(&self, program: &str, args: &[String]) -> anyhow::Result<CommandOutput> {
        self.captured.borrow_mut().push(invocation(program, args));
        Ok(self.outputs.get(program).cloned().unwrap_or_default())
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> anyhow::Result<SessionExit> {
        self.interactive.borrow_mut().push(invocation(program, args));
        Ok(SessionExit {
            exit_code: self.session_exit_code,
        })
    }

    fn locate(&self, program: &str) -> bool {
        !self.missing.iter().any(|m| m == program)
    }
}

/// Prompter answering password prompts with a fixed value.
pub struct ScriptedPrompter {
    password: String,
    pub password_prompts: Cell<usize>,
    pub pauses: Cell<usize>,
}

impl ScriptedPrompter {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            password_prompts: Cell::new(0),
            pauses: Cell::new(0),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn password(&self, _prompt: &str) -> io::Result<Zeroizing<String>> {
        self.password_prompts.set(self.password_prompts.get() + 1);
        Ok(Zeroizing::new(self.password.clone()))
    }

    fn pause(&self, _message: &str) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

/// Host wrapper with a fixed answer to the privilege check.
pub struct FakeHost<P> {
    pub inner: P,
    pub admin: bool,
}

impl<P: HostPlatform> FakeHost<P> {
    pub fn admin(inner: P) -> Self {
        Self { inner, admin: true }
    }

    pub fn unprivileged(inner: P) -> Self {
        Self {
            inner,
            admin: false,
        }
    }
}

impl<P: HostPlatform> HostPlatform for FakeHost<P> {
    fn kind(&self) -> HostKind {
        self.inner.kind()
    }

    fn has_admin_rights(&self) -> bool {
        self.admin
    }

    fn validate_host(
        &self,
        config: &mut MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        self.inner.validate_host(config, runner)
    }

    fn list_partitions(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<String> {
        self.inner.list_partitions(config, runner)
    }

    fn prepare_mount(
        &self,
        config: &MountConfiguration,
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        self.inner.prepare_mount(config, runner)
    }

    fn mount_point(&self, config: &MountConfiguration) -> Result<String> {
        self.inner.mount_point(config)
    }
}

/// Write `contents` as `mount.ini` inside `dir`.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("mount.ini");
    fs::write(&path, contents).expect("write config file");
    path
}
