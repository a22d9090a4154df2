use super::SettingsChange;
use crate::{
    daemon::types::Settings,
    gui_settings::{GuiSettings, LOCALES, SYSTEM_LOCALE},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preference {
    AutoConnect,
    AllowLan,
    ShowBetaReleases,
    StartMinimized,
    UnpinnedWindow,
    MonochromaticIcon,
    SystemNotifications,
    AutoHideScrollbars,
}

/// Toggles on the VPN settings page that the daemon owns.
pub const DAEMON_PREFERENCES: &[Preference] = &[Preference::AutoConnect, Preference::AllowLan];

/// Toggles on the user interface settings page, stored in the GUI settings file.
pub const INTERFACE_PREFERENCES: &[Preference] = &[
    Preference::SystemNotifications,
    Preference::MonochromaticIcon,
    Preference::StartMinimized,
    Preference::UnpinnedWindow,
    Preference::AutoHideScrollbars,
];

impl Preference {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AutoConnect => "Auto-connect",
            Self::AllowLan => "Local network sharing",
            Self::ShowBetaReleases => "Beta program",
            Self::StartMinimized => "Start minimized",
            Self::UnpinnedWindow => "Unpin app from taskbar",
            Self::MonochromaticIcon => "Monochromatic tray icon",
            Self::SystemNotifications => "Notifications",
            Self::AutoHideScrollbars => "Auto-hide scrollbars",
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::AutoConnect => Some("Automatically connect to a server when the app launches."),
            Self::AllowLan => Some(
                "Allows access to other devices on the same network for sharing, printing, streaming, etc.",
            ),
            Self::ShowBetaReleases => {
                Some("Enable to get notified when new beta versions of the app are released.")
            }
            Self::StartMinimized => Some("Show only the tray icon when the app starts."),
            Self::UnpinnedWindow => Some("Enable to move the app around as a free-standing window."),
            Self::MonochromaticIcon => {
                Some("Use a monochromatic tray icon instead of a colored one.")
            }
            Self::SystemNotifications => Some(
                "Enable or disable system notifications. The critical notifications will always be displayed.",
            ),
            Self::AutoHideScrollbars => None,
        }
    }

    pub fn is_daemon_setting(&self) -> bool {
        matches!(
            self,
            Self::AutoConnect | Self::AllowLan | Self::ShowBetaReleases
        )
    }

    pub fn value(&self, settings: &Settings, gui_settings: &GuiSettings) -> bool {
        match self {
            Self::AutoConnect => settings.auto_connect,
            Self::AllowLan => settings.allow_lan,
            Self::ShowBetaReleases => settings.show_beta_releases,
            Self::StartMinimized => gui_settings.start_minimized,
            Self::UnpinnedWindow => gui_settings.unpinned_window,
            Self::MonochromaticIcon => gui_settings.monochromatic_icon,
            Self::SystemNotifications => gui_settings.enable_system_notifications,
            Self::AutoHideScrollbars => gui_settings.auto_hide_scrollbars,
        }
    }

    /// Daemon preferences become a setter call; GUI preferences are written into
    /// `gui_settings` and the caller saves the file.
    pub fn set(&self, value: bool, gui_settings: &mut GuiSettings) -> Option<SettingsChange> {
        match self {
            Self::AutoConnect => return Some(SettingsChange::AutoConnect(value)),
            Self::AllowLan => return Some(SettingsChange::AllowLan(value)),
            Self::ShowBetaReleases => return Some(SettingsChange::ShowBetaReleases(value)),
            Self::StartMinimized => gui_settings.start_minimized = value,
            Self::UnpinnedWindow => gui_settings.unpinned_window = value,
            Self::MonochromaticIcon => gui_settings.monochromatic_icon = value,
            Self::SystemNotifications => gui_settings.enable_system_notifications = value,
            Self::AutoHideScrollbars => gui_settings.auto_hide_scrollbars = value,
        }
        None
    }
}

/// Beta builds always receive beta updates, so the toggle is locked on.
pub fn beta_program_locked(current_version: &str) -> bool {
    current_version.contains("beta")
}

pub fn set_locale(gui_settings: &mut GuiSettings, code: &str) -> bool {
    let known = code == SYSTEM_LOCALE || LOCALES.iter().any(|(locale, _)| *locale == code);
    if !known || gui_settings.preferred_locale == code {
        return false;
    }
    gui_settings.preferred_locale = code.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn daemon_preferences_produce_setter_calls() {
        let mut gui_settings = GuiSettings::default();
        assert_eq!(
            Preference::AllowLan.set(true, &mut gui_settings),
            Some(SettingsChange::AllowLan(true))
        );
        assert_eq!(gui_settings, GuiSettings::default());
    }

    #[test]
    fn interface_preferences_stay_local() {
        let mut gui_settings = GuiSettings::default();
        assert_eq!(Preference::StartMinimized.set(true, &mut gui_settings), None);
        assert!(Preference::StartMinimized.value(&Settings::default(), &gui_settings));
        assert!(
            INTERFACE_PREFERENCES
                .iter()
                .all(|preference| !preference.is_daemon_setting())
        );
    }

    #[test]
    fn unknown_locale_is_ignored() {
        let mut gui_settings = GuiSettings::default();
        assert!(!set_locale(&mut gui_settings, "xx"));
        let (code, _) = LOCALES[1];
        assert!(set_locale(&mut gui_settings, code));
        assert!(!set_locale(&mut gui_settings, code));
    }

    #[test]
    fn beta_builds_lock_beta_program() {
        assert!(beta_program_locked("2025.3-beta1"));
        assert!(!beta_program_locked("2025.3"));
    }
}
