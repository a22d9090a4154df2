use std::path::Path;

use super::SettingsChange;
use crate::{
    daemon::{Daemon, types::*},
    gui_settings::GuiSettings,
    location::compare_names,
    system,
};

/// Linux has no persistent exclusion list; applications are launched outside the tunnel.
pub const LEGACY_LAUNCHER: bool = cfg!(target_os = "linux");

const LAUNCHES_ELSEWHERE: &str = "launches-elsewhere";

pub const DISABLED_WARNING: &str = "Split tunneling has been disabled from the CLI and will automatically be enabled when adding or removing applications from the lists below.";

#[cfg(target_os = "windows")]
const EXECUTABLE_FILTER: (&str, &str) = ("Executables", "*.exe *.lnk");
#[cfg(not(target_os = "windows"))]
const EXECUTABLE_FILTER: (&str, &str) = ("Applications", "*");

pub fn includes_search_term(application: &SplitTunnelingApplication, search_term: &str) -> bool {
    application
        .name
        .to_lowercase()
        .contains(&search_term.to_lowercase())
}

/// Excluded paths that the application scan doesn't know about are shown by file name.
pub fn application_for_path(
    path: &str,
    known: &[SplitTunnelingApplication],
) -> SplitTunnelingApplication {
    if let Some(application) = known
        .iter()
        .find(|application| application.absolute_path == path)
    {
        return application.clone();
    }
    let name = Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    SplitTunnelingApplication {
        name,
        absolute_path: path.to_string(),
        icon: None,
        warning: None,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationLists {
    pub excluded: Vec<SplitTunnelingApplication>,
    pub available: Vec<SplitTunnelingApplication>,
}

impl ApplicationLists {
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty() && self.available.is_empty()
    }
}

pub fn application_lists(
    settings: &Settings,
    applications: &[SplitTunnelingApplication],
    search_term: &str,
) -> ApplicationLists {
    let mut excluded: Vec<_> = settings
        .split_tunnel
        .apps_list
        .iter()
        .map(|path| application_for_path(path, applications))
        .filter(|application| includes_search_term(application, search_term))
        .collect();
    excluded.sort_by(|lhs, rhs| compare_names(&lhs.name, &rhs.name));

    let available = applications
        .iter()
        .filter(|application| {
            includes_search_term(application, search_term)
                && !settings
                    .split_tunnel
                    .apps_list
                    .contains(&application.absolute_path)
        })
        .cloned()
        .collect();

    ApplicationLists {
        excluded,
        available,
    }
}

pub fn no_result_text(search_term: &str) -> String {
    format!("No result for {search_term}.")
}

pub fn set_enabled(enabled: bool) -> SettingsChange {
    SettingsChange::SplitTunnelState(enabled)
}

/// Changing the lists while exclusions are off turns them back on first.
pub fn add_application(settings: &Settings, path: &str) -> Vec<SettingsChange> {
    let mut changes = Vec::new();
    if !settings.split_tunnel.enable_exclusions {
        changes.push(set_enabled(true));
    }
    changes.push(SettingsChange::AddSplitTunnelApp(path.to_string()));
    changes
}

pub fn remove_application(settings: &Settings, path: &str) -> Vec<SettingsChange> {
    let mut changes = Vec::new();
    if !settings.split_tunnel.enable_exclusions {
        changes.push(set_enabled(true));
    }
    changes.push(SettingsChange::RemoveSplitTunnelApp(path.to_string()));
    changes
}

pub fn disabled_warning(settings: &Settings, lists: &ApplicationLists) -> Option<&'static str> {
    (!settings.split_tunnel.enable_exclusions && !lists.excluded.is_empty())
        .then_some(DISABLED_WARNING)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchWarning {
    /// The application hands its work to an already running process and cannot be excluded.
    LaunchesElsewhere(String),
    /// The application has to be closed before launching it from here.
    CloseFirst(String),
}

impl LaunchWarning {
    pub fn for_application(application: &SplitTunnelingApplication) -> Option<Self> {
        let name = application.name.clone();
        match application.warning.as_deref() {
            None => None,
            Some(LAUNCHES_ELSEWHERE) => Some(Self::LaunchesElsewhere(name)),
            Some(_) => Some(Self::CloseFirst(name)),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::LaunchesElsewhere(name) => {
                format!("{name} is problematic and can’t be excluded from the VPN tunnel.")
            }
            Self::CloseFirst(name) => format!(
                "If it’s already running, close {name} before launching it from here. Otherwise it might not be excluded from the VPN tunnel."
            ),
        }
    }

    pub fn can_launch(&self) -> bool {
        matches!(self, Self::CloseFirst(_))
    }
}

/// Launches `path` outside the tunnel through the service.
pub fn launch(daemon: &dyn Daemon, application: &SplitTunnelingApplication) -> Result<(), String> {
    if let Some(warning) = LaunchWarning::for_application(application)
        && !warning.can_launch()
    {
        return Err(warning.message());
    }
    log::info!("[split-tunnel] launching {}", application.absolute_path);
    daemon
        .launch_excluded_application(&application.absolute_path)
        .map_err(|error| format!("Unable to launch selection. {}", error.user_message()))
}

/// Applications offered for exclusion: the service's list when it has one, otherwise a
/// local scan, plus anything picked through the file dialog before.
pub fn load_applications(
    daemon: &dyn Daemon,
    gui_settings: &GuiSettings,
) -> Vec<SplitTunnelingApplication> {
    let mut applications = match daemon.get_split_tunneling_applications() {
        Ok(applications) if !applications.is_empty() => applications,
        Ok(_) => system::list_applications().unwrap_or_else(|error| {
            log::warn!("[split-tunnel] failed to list applications: {error}");
            Vec::new()
        }),
        Err(error) => {
            log::warn!("[split-tunnel] service has no application list: {error}");
            system::list_applications().unwrap_or_default()
        }
    };
    merge_browsed(&mut applications, &gui_settings.browsed_applications);
    applications
}

fn merge_browsed(applications: &mut Vec<SplitTunnelingApplication>, browsed: &[String]) {
    for path in browsed {
        if applications
            .iter()
            .all(|application| &application.absolute_path != path)
        {
            applications.push(application_for_path(path, &[]));
        }
    }
    applications.sort_by(|lhs, rhs| compare_names(&lhs.name, &rhs.name));
}

/// Opens the file dialog and remembers the chosen executable.
pub fn browse(gui_settings: &mut GuiSettings) -> Option<String> {
    let (label, glob) = EXECUTABLE_FILTER;
    let path = system::open_file_dialog("Add", label, glob)?;
    let path = path.to_string_lossy().into_owned();
    if gui_settings.remember_browsed_application(&path) {
        gui_settings.save();
    }
    Some(path)
}

/// View state of the split tunneling page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitTunnelingForm {
    /// `None` until the first load finishes.
    pub applications: Option<Vec<SplitTunnelingApplication>>,
    pub search_term: String,
    pub launch_warning: Option<LaunchWarning>,
    pub launch_error: Option<String>,
    /// Application waiting behind the launch warning.
    pending_launch: Option<SplitTunnelingApplication>,
}

impl SplitTunnelingForm {
    pub fn is_loading(&self) -> bool {
        self.applications.is_none()
    }

    pub fn set_applications(&mut self, applications: Vec<SplitTunnelingApplication>) {
        self.applications = Some(applications);
    }

    pub fn set_search_term(&mut self, search_term: &str) {
        self.search_term = search_term.to_string();
    }

    pub fn lists(&self, settings: &Settings) -> ApplicationLists {
        application_lists(
            settings,
            self.applications.as_deref().unwrap_or_default(),
            &self.search_term,
        )
    }

    /// Legacy launcher list, filtered by the search term.
    pub fn launchable(&self) -> Vec<SplitTunnelingApplication> {
        self.applications
            .iter()
            .flatten()
            .filter(|application| includes_search_term(application, &self.search_term))
            .cloned()
            .collect()
    }

    /// Returns the application when it can be launched right away; otherwise a warning
    /// dialog is shown first.
    pub fn select(
        &mut self,
        application: &SplitTunnelingApplication,
    ) -> Option<SplitTunnelingApplication> {
        match LaunchWarning::for_application(application) {
            Some(warning) => {
                self.launch_warning = Some(warning);
                self.pending_launch = Some(application.clone());
                None
            }
            None => Some(application.clone()),
        }
    }

    pub fn dismiss_warning(&mut self) {
        self.launch_warning = None;
        self.pending_launch = None;
    }

    /// The warned-about application, once the user chose to launch it anyway.
    pub fn accept_warning(&mut self) -> Option<SplitTunnelingApplication> {
        let warning = self.launch_warning.take()?;
        let application = self.pending_launch.take()?;
        warning.can_launch().then_some(application)
    }

    pub fn dismiss_error(&mut self) {
        self.launch_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::RecordingDaemon;
    use pretty_assertions::assert_eq;

    fn application(name: &str, path: &str) -> SplitTunnelingApplication {
        SplitTunnelingApplication {
            name: name.into(),
            absolute_path: path.into(),
            icon: None,
            warning: None,
        }
    }

    fn applications() -> Vec<SplitTunnelingApplication> {
        vec![
            application("Firefox", "/usr/bin/firefox"),
            application("Spotify", "/usr/bin/spotify"),
            application("Steam", "/usr/bin/steam"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let settings = Settings::default();
        let lists = application_lists(&settings, &applications(), "ST");
        assert_eq!(
            lists
                .available
                .iter()
                .map(|application| application.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Steam"]
        );
        assert!(application_lists(&settings, &applications(), "zzz").is_empty());
    }

    #[test]
    fn excluded_applications_leave_the_available_list() {
        let mut settings = Settings::default();
        settings.split_tunnel.enable_exclusions = true;
        settings.split_tunnel.apps_list = vec!["/usr/bin/spotify".into(), "/opt/tool/run.exe".into()];
        let lists = application_lists(&settings, &applications(), "");
        assert_eq!(
            lists
                .excluded
                .iter()
                .map(|application| application.name.as_str())
                .collect::<Vec<_>>(),
            vec!["run", "Spotify"]
        );
        assert_eq!(lists.available.len(), 2);
        assert_eq!(disabled_warning(&settings, &lists), None);

        settings.split_tunnel.enable_exclusions = false;
        assert_eq!(disabled_warning(&settings, &lists), Some(DISABLED_WARNING));
    }

    #[test]
    fn adding_while_disabled_enables_exclusions_first() {
        let settings = Settings::default();
        assert_eq!(
            add_application(&settings, "/usr/bin/steam"),
            vec![
                SettingsChange::SplitTunnelState(true),
                SettingsChange::AddSplitTunnelApp("/usr/bin/steam".into()),
            ]
        );

        let daemon = RecordingDaemon::default();
        for change in add_application(&settings, "/usr/bin/steam") {
            change.apply(&daemon).unwrap();
        }
        assert_eq!(
            daemon.calls(),
            vec![
                "set_split_tunnel_state(true)",
                "add_split_tunneling_application(/usr/bin/steam)",
            ]
        );
    }

    #[test]
    fn problematic_applications_are_not_launched() {
        let daemon = RecordingDaemon::default();
        let mut problematic = application("Chrome", "/usr/bin/chrome");
        problematic.warning = Some("launches-elsewhere".into());

        let mut form = SplitTunnelingForm::default();
        assert_eq!(form.select(&problematic), None);
        assert_eq!(
            form.launch_warning,
            Some(LaunchWarning::LaunchesElsewhere("Chrome".into()))
        );
        assert!(launch(&daemon, &problematic).is_err());
        assert!(daemon.calls().is_empty());

        let firefox = application("Firefox", "/usr/bin/firefox");
        assert_eq!(form.select(&firefox), Some(firefox.clone()));
        launch(&daemon, &firefox).unwrap();
        assert_eq!(daemon.calls(), vec!["launch_excluded_application(/usr/bin/firefox)"]);
    }

    #[test]
    fn browsed_applications_are_merged_and_sorted() {
        let daemon = RecordingDaemon::default();
        *daemon.applications.lock().unwrap() = applications();
        let gui_settings = GuiSettings {
            browsed_applications: vec!["/opt/bin/anki".into(), "/usr/bin/steam".into()],
            ..Default::default()
        };
        let loaded = load_applications(&daemon, &gui_settings);
        assert_eq!(
            loaded
                .iter()
                .map(|application| application.name.as_str())
                .collect::<Vec<_>>(),
            vec!["anki", "Firefox", "Spotify", "Steam"]
        );
    }
}
