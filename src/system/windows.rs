use windows_registry::{CURRENT_USER, Key, LOCAL_MACHINE};

use crate::daemon::types::SplitTunnelingApplication;

const UNINSTALL_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

pub fn installed_applications() -> Result<Vec<SplitTunnelingApplication>, String> {
    let mut applications = Vec::new();
    for root in [LOCAL_MACHINE, CURRENT_USER] {
        match root.open(UNINSTALL_KEY) {
            Ok(key) => applications.extend(applications_under(&key)),
            Err(error) => log::debug!("[applications] failed to open uninstall key: {error}"),
        }
    }
    Ok(applications)
}

fn applications_under(uninstall: &Key) -> Vec<SplitTunnelingApplication> {
    let Ok(names) = uninstall.keys() else {
        return Vec::new();
    };
    names
        .filter_map(|name| uninstall.open(&name).ok())
        .filter_map(|entry| {
            let name = entry.get_string("DisplayName").ok()?;
            let icon = entry.get_string("DisplayIcon").ok()?;
            let absolute_path = executable_from_icon(&icon)?;
            Some(SplitTunnelingApplication {
                name,
                absolute_path: absolute_path.clone(),
                icon: Some(absolute_path),
                warning: None,
            })
        })
        .collect()
}

// DisplayIcon is usually `"C:\path\app.exe",0`.
fn executable_from_icon(icon: &str) -> Option<String> {
    let path = icon
        .rsplit_once(',')
        .map(|(path, _)| path)
        .unwrap_or(icon)
        .trim()
        .trim_matches('"');
    path.to_ascii_lowercase()
        .ends_with(".exe")
        .then(|| path.to_string())
}
