use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::daemon::types::SplitTunnelingApplication;

// Browsers hand new windows to an already running instance, which stays in the tunnel.
const SINGLE_INSTANCE_APPLICATIONS: &[&str] = &[
    "firefox",
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "brave-browser",
];

pub fn desktop_applications() -> Vec<SplitTunnelingApplication> {
    application_directories()
        .iter()
        .filter_map(|directory| fs::read_dir(directory).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "desktop"))
        .filter_map(|path| match fs::read_to_string(&path) {
            Ok(content) => parse_desktop_entry(&content),
            Err(error) => {
                log::debug!("[applications] failed to read {}: {error}", path.display());
                None
            }
        })
        .collect()
}

fn application_directories() -> Vec<PathBuf> {
    let mut directories = Vec::new();
    if let Some(data_home) = env::var_os("XDG_DATA_HOME") {
        directories.push(PathBuf::from(data_home));
    } else if let Some(home) = dirs::home_dir() {
        directories.push(home.join(".local/share"));
    }
    let data_dirs =
        env::var("XDG_DATA_DIRS").unwrap_or_else(|_| "/usr/local/share:/usr/share".into());
    directories.extend(
        data_dirs
            .split(':')
            .filter(|directory| !directory.is_empty())
            .map(PathBuf::from),
    );
    directories
        .into_iter()
        .map(|directory| directory.join("applications"))
        .collect()
}

pub fn parse_desktop_entry(content: &str) -> Option<SplitTunnelingApplication> {
    let mut in_entry = false;
    let mut name = None;
    let mut exec = None;
    let mut icon = None;
    let mut application_type = None;

    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "Name" => name = Some(value.trim().to_string()),
            "Exec" => exec = Some(value.trim().to_string()),
            "Icon" => icon = Some(value.trim().to_string()),
            "Type" => application_type = Some(value.trim().to_string()),
            "NoDisplay" | "Hidden" | "Terminal" if value.trim() == "true" => return None,
            _ => {}
        }
    }

    if application_type.as_deref() != Some("Application") {
        return None;
    }

    let program = exec?
        .split_whitespace()
        .find(|token| !token.contains('=') && *token != "env")?
        .trim_matches('"')
        .to_string();
    let absolute_path = resolve_program(&program)?;
    let binary_name = Path::new(&absolute_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let warning = SINGLE_INSTANCE_APPLICATIONS
        .contains(&binary_name.as_str())
        .then(|| "launches-in-existing-process".to_string());

    Some(SplitTunnelingApplication {
        name: name?,
        absolute_path,
        icon,
        warning,
    })
}

fn resolve_program(program: &str) -> Option<String> {
    let path = Path::new(program);
    if path.is_absolute() {
        return Some(program.to_string());
    }
    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path)
        .map(|directory| directory.join(program))
        .find(|candidate| candidate.is_file())
        .map(|candidate| candidate.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn desktop_entry_with_absolute_exec_is_listed() {
        let entry = "[Desktop Entry]\nType=Application\nName=Editor\nExec=/opt/editor/bin/editor %F\nIcon=editor\n";
        assert_eq!(
            parse_desktop_entry(entry),
            Some(SplitTunnelingApplication {
                name: "Editor".into(),
                absolute_path: "/opt/editor/bin/editor".into(),
                icon: Some("editor".into()),
                warning: None,
            })
        );
    }

    #[test]
    fn hidden_and_terminal_entries_are_skipped() {
        let hidden = "[Desktop Entry]\nType=Application\nName=Daemon\nExec=/usr/bin/x\nNoDisplay=true\n";
        let terminal = "[Desktop Entry]\nType=Application\nName=Top\nExec=/usr/bin/top\nTerminal=true\n";
        assert_eq!(parse_desktop_entry(hidden), None);
        assert_eq!(parse_desktop_entry(terminal), None);
    }

    #[test]
    fn browsers_carry_a_warning() {
        let entry = "[Desktop Entry]\nType=Application\nName=Firefox\nExec=/usr/lib/firefox/firefox %u\n";
        let application = parse_desktop_entry(entry).unwrap();
        assert_eq!(
            application.warning.as_deref(),
            Some("launches-in-existing-process")
        );
    }

    #[test]
    fn keys_outside_desktop_entry_section_are_ignored() {
        let entry = "[Desktop Action new]\nName=New Window\nExec=/usr/bin/other\n[Desktop Entry]\nType=Application\nName=Main\nExec=/usr/bin/main\n";
        let application = parse_desktop_entry(entry).unwrap();
        assert_eq!(application.name, "Main");
        assert_eq!(application.absolute_path, "/usr/bin/main");
    }
}
