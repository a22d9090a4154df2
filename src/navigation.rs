/// Every page the window can show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Launch,
    Login,
    TooManyDevices,
    DeviceRevoked,
    Main,
    ExpiredAccount,
    RedeemVoucher,
    TimeAdded,
    SelectLocation,
    Filter,
    Settings,
    Account,
    UserInterfaceSettings,
    VpnSettings,
    WireguardSettings,
    OpenVpnSettings,
    DaitaSettings,
    MultihopSettings,
    SplitTunneling,
    ApiAccessMethods,
    EditApiAccessMethod(Option<String>),
    SettingsImport,
    Support,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Launch => "Connecting to service",
            Self::Login => "Login",
            Self::TooManyDevices => "Too many devices",
            Self::DeviceRevoked => "Device is inactive",
            Self::Main => "VPN",
            Self::ExpiredAccount => "Out of time",
            Self::RedeemVoucher => "Redeem voucher",
            Self::TimeAdded => "Time was added",
            Self::SelectLocation => "Select location",
            Self::Filter => "Filter",
            Self::Settings => "Settings",
            Self::Account => "Account",
            Self::UserInterfaceSettings => "User interface settings",
            Self::VpnSettings => "VPN settings",
            Self::WireguardSettings => "WireGuard settings",
            Self::OpenVpnSettings => "OpenVPN settings",
            Self::DaitaSettings => "DAITA",
            Self::MultihopSettings => "Multihop",
            Self::SplitTunneling => "Split tunneling",
            Self::ApiAccessMethods => "API access",
            Self::EditApiAccessMethod(None) => "Add method",
            Self::EditApiAccessMethod(Some(_)) => "Edit method",
            Self::SettingsImport => "Server IP override",
            Self::Support => "Report a problem",
        }
    }

    /// Pages reached by resetting the history rather than pushing onto it.
    pub fn is_root(&self) -> bool {
        matches!(
            self,
            Self::Launch
                | Self::Login
                | Self::TooManyDevices
                | Self::DeviceRevoked
                | Self::Main
                | Self::ExpiredAccount
        )
    }
}

pub const SEPARATOR_SCROLL_THRESHOLD: f32 = 11.0;
pub const TITLE_SCROLL_THRESHOLD: f32 = 39.0;

/// What the navigation bar shows for the current scroll offset of the page below it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NavigationBarState {
    pub show_separator: bool,
    pub show_title: bool,
}

impl NavigationBarState {
    pub fn for_scroll_offset(offset: f32) -> Self {
        Self {
            show_separator: offset > SEPARATOR_SCROLL_THRESHOLD,
            show_title: offset > TITLE_SCROLL_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Push,
    Pop,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideDirection {
    Left,
    Right,
    None,
}

impl Transition {
    pub fn slide_direction(self) -> SlideDirection {
        match self {
            Self::Push => SlideDirection::Left,
            Self::Pop => SlideDirection::Right,
            Self::Reset => SlideDirection::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct HistoryEntry {
    route: Route,
    scroll_offset: f32,
}

/// Stack of visited pages. Each entry remembers how far its page was scrolled when
/// another page was pushed on top, so popping restores the position.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    last_transition: Transition,
}

impl History {
    pub fn new(root: Route) -> Self {
        Self {
            entries: vec![HistoryEntry {
                route: root,
                scroll_offset: 0.0,
            }],
            last_transition: Transition::Reset,
        }
    }

    pub fn current(&self) -> &Route {
        // The stack never becomes empty: pop refuses to remove the root.
        &self.entries[self.entries.len() - 1].route
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn last_transition(&self) -> Transition {
        self.last_transition
    }

    pub fn push(&mut self, route: Route, current_scroll_offset: f32) {
        if self.current() == &route {
            return;
        }
        if let Some(entry) = self.entries.last_mut() {
            entry.scroll_offset = current_scroll_offset;
        }
        log::debug!("[navigation] push {route:?}");
        self.entries.push(HistoryEntry {
            route,
            scroll_offset: 0.0,
        });
        self.last_transition = Transition::Push;
    }

    /// Returns the scroll offset to restore on the page that is shown again.
    pub fn pop(&mut self) -> Option<f32> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.pop();
        self.last_transition = Transition::Pop;
        let restored = self.entries.last().map(|entry| entry.scroll_offset);
        log::debug!("[navigation] pop to {:?}", self.current());
        restored
    }

    pub fn reset(&mut self, root: Route) {
        log::debug!("[navigation] reset to {root:?}");
        self.entries = vec![HistoryEntry {
            route: root,
            scroll_offset: 0.0,
        }];
        self.last_transition = Transition::Reset;
    }

    /// Drops everything above the first entry, keeping its scroll offset.
    pub fn pop_to_root(&mut self) -> Option<f32> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.truncate(1);
        self.last_transition = Transition::Pop;
        self.entries.first().map(|entry| entry.scroll_offset)
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.entries.iter().any(|entry| &entry.route == route)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EscapeOutcome {
    CloseDialog,
    /// Carries the scroll offset to restore on the page shown again.
    Back(f32),
    Ignored,
}

/// Escape closes an open dialog first and only then navigates back.
pub fn handle_escape(dialog_open: bool, history: &mut History) -> EscapeOutcome {
    if dialog_open {
        return EscapeOutcome::CloseDialog;
    }
    match history.pop() {
        Some(offset) => EscapeOutcome::Back(offset),
        None => EscapeOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pop_restores_the_scroll_offset_of_the_previous_page() {
        let mut history = History::new(Route::Main);
        history.push(Route::Settings, 0.0);
        history.push(Route::VpnSettings, 120.0);
        assert_eq!(history.current(), &Route::VpnSettings);

        assert_eq!(history.pop(), Some(120.0));
        assert_eq!(history.current(), &Route::Settings);
        assert_eq!(history.last_transition().slide_direction(), SlideDirection::Right);
    }

    #[test]
    fn root_cannot_be_popped() {
        let mut history = History::new(Route::Login);
        assert!(!history.can_go_back());
        assert_eq!(history.pop(), None);
        assert_eq!(history.current(), &Route::Login);
    }

    #[test]
    fn pushing_the_current_route_is_ignored() {
        let mut history = History::new(Route::Main);
        history.push(Route::Settings, 0.0);
        history.push(Route::Settings, 0.0);
        history.pop();
        assert!(!history.can_go_back());
    }

    #[test]
    fn reset_replaces_the_whole_stack() {
        let mut history = History::new(Route::Main);
        history.push(Route::Settings, 0.0);
        history.reset(Route::Login);
        assert!(!history.can_go_back());
        assert_eq!(history.last_transition().slide_direction(), SlideDirection::None);
    }

    #[test]
    fn navigation_bar_thresholds() {
        assert_eq!(
            NavigationBarState::for_scroll_offset(11.0),
            NavigationBarState::default()
        );
        assert_eq!(
            NavigationBarState::for_scroll_offset(12.0),
            NavigationBarState {
                show_separator: true,
                show_title: false
            }
        );
        assert!(NavigationBarState::for_scroll_offset(40.0).show_title);
    }

    #[test]
    fn escape_closes_dialog_before_navigating() {
        let mut history = History::new(Route::Main);
        history.push(Route::Settings, 64.0);
        assert_eq!(handle_escape(true, &mut history), EscapeOutcome::CloseDialog);
        assert_eq!(history.current(), &Route::Settings);
        assert_eq!(handle_escape(false, &mut history), EscapeOutcome::Back(64.0));
        assert_eq!(handle_escape(false, &mut history), EscapeOutcome::Ignored);
    }
}
