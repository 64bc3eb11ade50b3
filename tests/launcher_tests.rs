//! Tests for the launch flow on both hosts
//!
//! These tests verify:
//! - Exit codes for privilege and configuration errors
//! - Diagnostic listings embedded in configuration errors
//! - Host preparation and drive attachment on WSL
//! - The veracrypt invocation handed to the runner

mod common;

use common::{write_config, FakeHost, RecordingRunner, ScriptedPrompter};
use veracrypt_mount::error::{LaunchError, EXIT_ADMIN, EXIT_CONFIG};
use veracrypt_mount::launcher::Launcher;
use veracrypt_mount::platform::wsl::attach_physical_drive;
use veracrypt_mount::platform::{NativeLinux, Wsl};
use veracrypt_mount::process::CommandOutput;

// =============================================================================
// Native Linux
// =============================================================================

#[test]
fn test_native_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[Veracrypt]\ndrive_partition=/dev/sda1\nvolume_password=hunter2\nslot_num=2\n",
    );
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("unused");

    let report = Launcher::new(&host, &runner, &prompter).launch(&path).unwrap();

    assert_eq!(report.partition, "/dev/sda1");
    assert_eq!(report.mount_point, "/media/veracrypt2");
    assert!(report.session.success());
    assert_eq!(prompter.password_prompts.get(), 0);

    let sessions = runner.interactive.borrow();
    assert_eq!(sessions.len(), 1);
    let tokens = &sessions[0];
    assert_eq!(tokens[0], "veracrypt");
    assert!(tokens.contains(&"--password=hunter2".to_string()));
    assert!(tokens.contains(&"--slot=2".to_string()));
    assert_eq!(&tokens[tokens.len() - 2..], ["/dev/sda1", "/media/veracrypt2"]);
    assert!(runner.captured.borrow().is_empty());
}

#[test]
fn test_no_admin_rights_skips_config_loading() {
    let dir = tempfile::tempdir().unwrap();
    // Missing file: loading it would yield a configuration error instead.
    let path = dir.path().join("does-not-exist.ini");
    let host = FakeHost::unprivileged(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("pw");

    let launcher = Launcher::new(&host, &runner, &prompter);
    assert!(matches!(launcher.launch(&path), Err(LaunchError::Admin)));

    let code = launcher.run(&path);
    assert_eq!(code, EXIT_ADMIN);
    assert_eq!(runner.call_count(), 0);
    assert_eq!(prompter.password_prompts.get(), 0);
    assert_eq!(prompter.pauses.get(), 1);
}

#[test]
fn test_missing_section_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[veracrypt]\ndrive_partition=/dev/sda1\n");
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("pw");

    let code = Launcher::new(&host, &runner, &prompter).run(&path);

    assert_eq!(code, EXIT_CONFIG);
    assert_eq!(prompter.pauses.get(), 1);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_duplicate_partition_key_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[Veracrypt]\ndrive_partition=/dev/sda1\nvolume_password=pw\ndrive_partition=/dev/sdb1\n",
    );
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("pw");

    let launcher = Launcher::new(&host, &runner, &prompter);
    let err = launcher.launch(&path).unwrap_err();
    assert!(err.to_string().contains("Duplicate key 'drive_partition'"));

    assert_eq!(launcher.run(&path), EXIT_CONFIG);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_missing_partition_lists_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[Veracrypt]\nslot_num=1\n");
    let listing = "NAME   MAJ:MIN RM   SIZE RO TYPE MOUNTPOINTS\nsdb      8:16   0 931.5G  0 disk\n`-sdb1   8:17   0 931.5G  0 part\n";
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new().with_output("lsblk", CommandOutput::with_stdout(listing));
    let prompter = ScriptedPrompter::new("pw");

    let err = Launcher::new(&host, &runner, &prompter)
        .launch(&path)
        .unwrap_err();

    assert_eq!(err.exit_code(), EXIT_CONFIG);
    assert!(err.to_string().contains("DRIVE_PARTITION is not set!"));
    assert!(err.to_string().contains(listing));
    assert_eq!(runner.captured_programs(), ["lsblk"]);
    assert!(runner.interactive.borrow().is_empty());
    assert_eq!(prompter.password_prompts.get(), 0);
}

#[test]
fn test_password_prompted_and_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[Veracrypt]\ndrive_partition=/dev/sdb1\n");
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("typed-secret");

    let report = Launcher::new(&host, &runner, &prompter).launch(&path).unwrap();

    assert_eq!(prompter.password_prompts.get(), 1);
    assert_eq!(report.mount_point, "/media/veracrypt1");
    let sessions = runner.interactive.borrow();
    assert!(sessions[0].contains(&"--password=typed-secret".to_string()));
    assert!(!format!("{:?}", report).contains("typed-secret"));
}

#[test]
fn test_failing_veracrypt_still_reports_launch_success() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[Veracrypt]\ndrive_partition=/dev/sda1\nvolume_password=wrong\n",
    );
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new().with_session_exit(Some(1));
    let prompter = ScriptedPrompter::new("pw");

    let launcher = Launcher::new(&host, &runner, &prompter);
    assert_eq!(launcher.run(&path), 0);
    assert_eq!(runner.interactive.borrow().len(), 1);
    assert_eq!(prompter.pauses.get(), 0);
}

#[test]
fn test_legacy_volume_native() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[Veracrypt]\ndrive_partition=/dev/sda1\nvolume_password=pw\nuse_truecrypt=yes\n",
    );
    let host = FakeHost::admin(NativeLinux);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("pw");

    Launcher::new(&host, &runner, &prompter).launch(&path).unwrap();

    let sessions = runner.interactive.borrow();
    assert_eq!(sessions[0][3], "-tc");
    assert!(!sessions[0].contains(&"-m=nokernelcrypto".to_string()));
}

// =============================================================================
// Windows + WSL
// =============================================================================

fn wsl_config(wsl_root: &std::path::Path, extra: &str) -> String {
    format!(
        "[Veracrypt]\nwsl_root={}\n{}",
        wsl_root.display(),
        extra
    )
}

#[test]
fn test_wsl_requires_root_share() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[Veracrypt]\nphysical_drive_num=0\n");
    let host = FakeHost::admin(Wsl);
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new("pw");

    let err = Launcher::new(&host, &runner, &prompter)
        .launch(&path)
        .unwrap_err();
    assert!(err.to_string().starts_with("WSL_ROOT is not set!"));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_wsl_executable_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &wsl_config(dir.path(), "wsl_exe=C:\\missing\\wsl.exe\nphysical_drive_num=0\n"),
    );
    let host = FakeHost::admin(Wsl);
    let runner = RecordingRunner::new().without_program("C:\\missing\\wsl.exe");
    let prompter = ScriptedPrompter::new("pw");

    let err = Launcher::new(&host, &runner, &prompter)
        .launch(&path)
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Unable to find Windows Subsystem for Linux executable at 'C:\\missing\\wsl.exe'"));
}

#[test]
fn test_wsl_missing_drive_number_lists_drives() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &wsl_config(dir.path(), ""));
    let drives = "Caption  DeviceID            Model  Partitions  Size\nDisk A   \\\\.\\PHYSICALDRIVE0  Disk A  3  512105932800\n";
    let host = FakeHost::admin(Wsl);
    let runner = RecordingRunner::new().with_output("wmic.exe", CommandOutput::with_stdout(drives));
    let prompter = ScriptedPrompter::new("pw");

    let err = Launcher::new(&host, &runner, &prompter)
        .launch(&path)
        .unwrap_err();

    assert_eq!(err.exit_code(), EXIT_CONFIG);
    assert!(err.to_string().starts_with("PHYSICAL_DRIVE_NUM is not set!"));
    assert!(err.to_string().contains(drives));
    assert_eq!(
        runner.captured.borrow()[0],
        ["wmic.exe", "diskdrive", "list", "brief"]
    );
}

#[test]
fn test_wsl_missing_partition_attaches_then_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &wsl_config(dir.path(), "physical_drive_num=1\n"));
    let host = FakeHost::admin(Wsl);
    let runner = RecordingRunner::new().with_output("wsl", CommandOutput::with_stdout("sdc 8:32\n"));
    let prompter = ScriptedPrompter::new("pw");

    let err = Launcher::new(&host, &runner, &prompter)
        .launch(&path)
        .unwrap_err();

    assert!(err.to_string().contains("DRIVE_PARTITION is not set!"));
    assert!(err.to_string().contains("sdc 8:32"));
    let captured = runner.captured.borrow();
    assert_eq!(captured[0], ["wsl", "--mount", r"\\.\PHYSICALDRIVE1", "--bare"]);
    assert_eq!(captured[1], ["wsl", "lsblk"]);
}

#[test]
fn test_wsl_full_launch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &wsl_config(
            dir.path(),
            "physical_drive_num=2\ndrive_partition=/dev/sdd1\nvolume_password=hunter2\nslot_num=3\n",
        ),
    );
    let host = FakeHost::admin(Wsl);
    // Attaching an already attached drive fails; the launch carries on.
    let runner = RecordingRunner::new()
        .with_output("wsl", CommandOutput::failed(-1, "The disk is already attached."));
    let prompter = ScriptedPrompter::new("pw");

    let report = Launcher::new(&host, &runner, &prompter).launch(&path).unwrap();

    assert_eq!(report.mount_point, "/mnt/wsl/PHYSICALDRIVE2");
    assert!(dir.path().join("mnt").join("wsl").join("PHYSICALDRIVE2").is_dir());

    assert_eq!(
        runner.captured.borrow().as_slice(),
        [vec![
            "wsl".to_string(),
            "--mount".to_string(),
            r"\\.\PHYSICALDRIVE2".to_string(),
            "--bare".to_string(),
        ]]
    );

    let sessions = runner.interactive.borrow();
    let tokens = &sessions[0];
    assert_eq!(tokens[0], "wsl");
    assert_eq!(tokens[1], "veracrypt");
    assert_eq!(tokens[3], "-m=nokernelcrypto");
    assert!(tokens.contains(&"--slot=3".to_string()));
    assert_eq!(&tokens[tokens.len() - 2..], ["/dev/sdd1", "/mnt/wsl/PHYSICALDRIVE2"]);
}

#[test]
fn test_attach_twice_does_not_fail() {
    let runner = RecordingRunner::new();

    let first = attach_physical_drive(&runner, "wsl", 0).unwrap();
    let second = attach_physical_drive(&runner, "wsl", 0).unwrap();

    assert_eq!(first, second);
    assert_eq!(runner.captured.borrow().len(), 2);
}
