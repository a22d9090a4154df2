use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Preferences that only concern the GUI and never reach the daemon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuiSettings {
    #[serde(default)]
    pub start_minimized: bool,
    #[serde(default)]
    pub unpinned_window: bool,
    #[serde(default)]
    pub monochromatic_icon: bool,
    #[serde(default = "default_true")]
    pub enable_system_notifications: bool,
    #[serde(default = "default_true")]
    pub auto_hide_scrollbars: bool,
    #[serde(default = "default_locale")]
    pub preferred_locale: String,
    #[serde(default)]
    pub changelog_seen_version: Option<String>,
    #[serde(default)]
    pub browsed_applications: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    SYSTEM_LOCALE.into()
}

pub const SYSTEM_LOCALE: &str = "system";

pub const LOCALES: &[(&str, &str)] = &[
    (SYSTEM_LOCALE, "System default"),
    ("en", "English"),
    ("de", "Deutsch"),
    ("es", "Español"),
    ("fr", "Français"),
    ("sv", "Svenska"),
];

impl Default for GuiSettings {
    fn default() -> Self {
        Self {
            start_minimized: false,
            unpinned_window: false,
            monochromatic_icon: false,
            enable_system_notifications: true,
            auto_hide_scrollbars: true,
            preferred_locale: default_locale(),
            changelog_seen_version: None,
            browsed_applications: Vec::new(),
        }
    }
}

impl GuiSettings {
    pub fn settings_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vpn-client")
            .join("gui-settings.toml")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::settings_file_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    log::info!("[gui_settings] loaded from {}", path.display());
                    settings
                }
                Err(error) => {
                    log::warn!("[gui_settings] failed to parse {}: {error}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "[gui_settings] no settings file at {}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Err(error) = self.save_to(&Self::settings_file_path()) {
            log::warn!("[gui_settings] {error}");
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create settings directory {}: {error}",
                    parent.display()
                )
            })?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|error| format!("Failed to serialize settings: {error}"))?;
        std::fs::write(path, content)
            .map_err(|error| format!("Failed to write {}: {error}", path.display()))
    }

    pub fn locale_label(&self) -> &'static str {
        LOCALES
            .iter()
            .find(|(code, _)| *code == self.preferred_locale)
            .map(|(_, label)| *label)
            .unwrap_or("System default")
    }

    /// Remembers an executable picked through the file dialog so it stays listed.
    pub fn remember_browsed_application(&mut self, path: &str) -> bool {
        if self.browsed_applications.iter().any(|known| known == path) {
            return false;
        }
        self.browsed_applications.push(path.to_string());
        true
    }

    /// The changelog is shown once per version.
    pub fn should_show_changelog(&self, current_version: &str) -> bool {
        self.changelog_seen_version.as_deref() != Some(current_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn settings_survive_a_save_and_load() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("nested").join("gui-settings.toml");
        let mut settings = GuiSettings {
            start_minimized: true,
            preferred_locale: "sv".into(),
            ..Default::default()
        };
        settings.remember_browsed_application("/opt/tool/bin/tool");
        settings.save_to(&path).unwrap();

        assert_eq!(GuiSettings::load_from(&path), settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("gui-settings.toml");
        std::fs::write(&path, "start_minimized = true\n").unwrap();

        let settings = GuiSettings::load_from(&path);
        assert!(settings.start_minimized);
        assert!(settings.enable_system_notifications);
        assert_eq!(settings.preferred_locale, SYSTEM_LOCALE);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("gui-settings.toml");
        std::fs::write(&path, "start_minimized = [").unwrap();
        assert_eq!(GuiSettings::load_from(&path), GuiSettings::default());
    }

    #[test]
    fn browsed_applications_are_not_duplicated() {
        let mut settings = GuiSettings::default();
        assert!(settings.remember_browsed_application("/usr/bin/app"));
        assert!(!settings.remember_browsed_application("/usr/bin/app"));
        assert_eq!(settings.browsed_applications.len(), 1);
    }

    #[test]
    fn changelog_shows_once_per_version() {
        let mut settings = GuiSettings::default();
        assert!(settings.should_show_changelog("2025.2"));
        settings.changelog_seen_version = Some("2025.2".into());
        assert!(!settings.should_show_changelog("2025.2"));
    }
}
