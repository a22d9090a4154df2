#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "windows")]
mod windows;

use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

use crate::daemon::types::SplitTunnelingApplication;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs a helper program to completion, returning whether it succeeded together with
/// its trimmed stdout.
pub fn run_silent_with_output(program: &str, arguments: &[&str]) -> (bool, String) {
    log::debug!("[cmd] {} {}", program, arguments.join(" "));
    let mut command = Command::new(program);
    command
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    match command.output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !output.status.success() {
                log::debug!(
                    "[cmd] {program} exited with {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim(),
                );
            }
            (output.status.success(), stdout)
        }
        Err(error) => {
            log::debug!("[cmd] failed to run {program}: {error}");
            (false, String::new())
        }
    }
}

/// Starts a program without waiting for it.
pub fn launch_detached(program: &str, arguments: &[&str]) -> Result<(), String> {
    log::info!("[launch] {} {}", program, arguments.join(" "));
    let mut command = Command::new(program);
    command
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    command
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to launch {program}: {error}"))
}

pub fn open_url(url: &str) -> Result<(), String> {
    #[cfg(target_os = "linux")]
    let result = launch_detached("xdg-open", &[url]);
    #[cfg(target_os = "macos")]
    let result = launch_detached("open", &[url]);
    #[cfg(target_os = "windows")]
    let result = launch_detached("cmd", &["/C", "start", "", url]);

    if let Err(error) = &result {
        log::warn!("[browser] failed to open {url}: {error}");
    }
    result
}

/// Opens the platform's settings where network and security permissions are granted.
pub fn open_system_settings() -> Result<(), String> {
    #[cfg(target_os = "linux")]
    let result = launch_detached("gnome-control-center", &["network"]);
    #[cfg(target_os = "macos")]
    let result = launch_detached(
        "open",
        &["x-apple.systempreferences:com.apple.preference.security"],
    );
    #[cfg(target_os = "windows")]
    let result = launch_detached("cmd", &["/C", "start", "", "ms-settings:network"]);

    if let Err(error) = &result {
        log::warn!("[system] failed to open system settings: {error}");
    }
    result
}

pub fn open_file_dialog(title: &str, filter_label: &str, filter_glob: &str) -> Option<PathBuf> {
    let zenity_filter = format!("{filter_label} ({filter_glob})|{filter_glob}");
    let (success, output) = run_silent_with_output(
        "zenity",
        &[
            "--file-selection",
            &format!("--title={title}"),
            &format!("--file-filter={zenity_filter}"),
        ],
    );
    let (success, output) = if success {
        (success, output)
    } else {
        run_silent_with_output("kdialog", &["--getopenfilename", ".", filter_glob])
    };

    if !success {
        log::warn!("[dialog] no file selected or no file dialog available (zenity, kdialog)");
        return None;
    }
    (!output.is_empty()).then(|| PathBuf::from(output))
}

/// Applications the user can exclude from the tunnel, sorted by name.
pub fn list_applications() -> Result<Vec<SplitTunnelingApplication>, String> {
    #[cfg(target_os = "linux")]
    let mut applications = linux::desktop_applications();
    #[cfg(target_os = "windows")]
    let mut applications = windows::installed_applications()?;
    #[cfg(target_os = "macos")]
    let mut applications: Vec<SplitTunnelingApplication> = Vec::new();

    applications.sort_by(|lhs, rhs| {
        crate::location::compare_names(&lhs.name, &rhs.name)
    });
    applications.dedup_by(|lhs, rhs| lhs.absolute_path == rhs.absolute_path);
    log::info!("[applications] found {} applications", applications.len());
    Ok(applications)
}
