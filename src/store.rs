use chrono::{DateTime, Utc};

use crate::{
    account::LoginState,
    daemon::types::*,
    navigation::Route,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountSlice {
    pub device_state: DeviceState,
    pub login: LoginState,
    pub expiry: Option<DateTime<Utc>>,
    pub account_history: Option<String>,
    pub devices: Vec<Device>,
    pub new_device_banner: bool,
}

impl AccountSlice {
    pub fn account_number(&self) -> Option<&str> {
        match &self.device_state {
            DeviceState::LoggedIn { account_number, .. } => Some(account_number),
            _ => None,
        }
    }

    pub fn device_name(&self) -> Option<&str> {
        match &self.device_state {
            DeviceState::LoggedIn { device, .. } => Some(&device.name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VersionSlice {
    pub current: String,
    pub gui: String,
    pub info: AppVersionInfo,
}

impl VersionSlice {
    /// GUI and daemon come from the same release; a mismatch means a broken upgrade.
    pub fn consistent(&self) -> bool {
        self.current.is_empty() || self.current == self.gui
    }
}

/// Renderer-side mirror of daemon state. Only `reduce` mutates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppStore {
    pub connected_to_daemon: bool,
    pub tunnel_state: TunnelState,
    pub settings: Settings,
    pub relay_list: RelayList,
    pub version: VersionSlice,
    pub account: AccountSlice,
    pub current_access_method: Option<AccessMethodSetting>,
    pub split_tunneling_applications: Vec<SplitTunnelingApplication>,
}

impl AppStore {
    pub fn new(gui_version: &str) -> Self {
        Self {
            version: VersionSlice {
                gui: gui_version.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn has_excluded_apps(&self) -> bool {
        self.settings.split_tunnel.enable_exclusions
            && !self.settings.split_tunnel.apps_list.is_empty()
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.account.device_state, DeviceState::LoggedIn { .. })
    }

    pub fn account_expired(&self, now: DateTime<Utc>) -> bool {
        self.account
            .expiry
            .is_some_and(|expiry| crate::account::has_expired(expiry, now))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreAction {
    DaemonConnected {
        settings: Box<Settings>,
        tunnel_state: TunnelState,
        relay_list: RelayList,
        device_state: DeviceState,
        current_version: String,
        version_info: AppVersionInfo,
    },
    DaemonDisconnected,
    Event(DaemonEvent),
    LoginStarted,
    AccountCreationStarted,
    LoginFailed(String),
    ResetLoginError,
    AccountExpiry(Option<DateTime<Utc>>),
    AccountHistory(Option<String>),
    Devices(Vec<Device>),
    HideNewDeviceBanner,
    CurrentAccessMethod(AccessMethodSetting),
    SplitTunnelingApplications(Vec<SplitTunnelingApplication>),
}

/// Follow-up work requested by a state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEffect {
    ResetNavigation(Route),
    FetchAccountData(String),
    FetchAccountHistory,
}

pub fn reduce(store: &mut AppStore, action: StoreAction) -> Vec<StoreEffect> {
    match action {
        StoreAction::DaemonConnected {
            settings,
            tunnel_state,
            relay_list,
            device_state,
            current_version,
            version_info,
        } => {
            store.connected_to_daemon = true;
            store.settings = *settings;
            store.tunnel_state = tunnel_state;
            store.relay_list = relay_list;
            store.version.current = current_version;
            store.version.info = version_info;
            let mut effects = vec![StoreEffect::FetchAccountHistory];
            effects.extend(apply_device_state(store, device_state, None));
            effects
        }
        StoreAction::DaemonDisconnected => {
            store.connected_to_daemon = false;
            vec![StoreEffect::ResetNavigation(Route::Launch)]
        }
        StoreAction::Event(event) => reduce_event(store, event),
        StoreAction::LoginStarted => {
            store.account.login = LoginState::LoggingIn;
            Vec::new()
        }
        StoreAction::AccountCreationStarted => {
            store.account.login = LoginState::CreatingAccount;
            Vec::new()
        }
        StoreAction::LoginFailed(message) => {
            store.account.login = LoginState::Failed(message);
            Vec::new()
        }
        StoreAction::ResetLoginError => {
            if matches!(store.account.login, LoginState::Failed(_)) {
                store.account.login = LoginState::Idle;
            }
            Vec::new()
        }
        StoreAction::AccountExpiry(expiry) => {
            store.account.expiry = expiry;
            Vec::new()
        }
        StoreAction::AccountHistory(history) => {
            store.account.account_history = history;
            Vec::new()
        }
        StoreAction::Devices(mut devices) => {
            crate::account::sort_devices(&mut devices);
            store.account.devices = devices;
            Vec::new()
        }
        StoreAction::HideNewDeviceBanner => {
            store.account.new_device_banner = false;
            Vec::new()
        }
        StoreAction::CurrentAccessMethod(method) => {
            store.current_access_method = Some(method);
            Vec::new()
        }
        StoreAction::SplitTunnelingApplications(applications) => {
            store.split_tunneling_applications = applications;
            Vec::new()
        }
    }
}

fn reduce_event(store: &mut AppStore, event: DaemonEvent) -> Vec<StoreEffect> {
    match event {
        DaemonEvent::TunnelState(tunnel_state) => {
            let expired_account = matches!(
                &tunnel_state,
                TunnelState::Error(ErrorState {
                    cause: ErrorStateCause::AuthFailed(AuthFailedError::ExpiredAccount),
                    ..
                })
            );
            store.tunnel_state = tunnel_state;
            match store.account.account_number() {
                Some(account_number) if expired_account => {
                    vec![StoreEffect::FetchAccountData(account_number.to_string())]
                }
                _ => Vec::new(),
            }
        }
        DaemonEvent::Settings(settings) => {
            store.settings = *settings;
            Vec::new()
        }
        DaemonEvent::RelayList(relay_list) => {
            store.relay_list = relay_list;
            Vec::new()
        }
        DaemonEvent::AppVersionInfo(info) => {
            store.version.info = info;
            Vec::new()
        }
        DaemonEvent::Device(DeviceEvent {
            device_state,
            cause,
        }) => apply_device_state(store, device_state, Some(cause)),
        DaemonEvent::DeviceRemoval(mut devices) => {
            crate::account::sort_devices(&mut devices);
            store.account.devices = devices;
            Vec::new()
        }
        DaemonEvent::AccessMethodSetting(method) => {
            store.current_access_method = Some(method);
            Vec::new()
        }
    }
}

fn apply_device_state(
    store: &mut AppStore,
    device_state: DeviceState,
    cause: Option<DeviceEventCause>,
) -> Vec<StoreEffect> {
    let was_logged_in = store.is_logged_in();
    store.account.device_state = device_state;
    match &store.account.device_state {
        DeviceState::LoggedIn { account_number, .. } => {
            let account_number = account_number.clone();
            if cause == Some(DeviceEventCause::LoggedIn) {
                store.account.new_device_banner = true;
            }
            store.account.login = LoginState::Ok;
            let mut effects = vec![StoreEffect::FetchAccountData(account_number)];
            if !was_logged_in {
                effects.push(StoreEffect::ResetNavigation(Route::Main));
            }
            effects
        }
        DeviceState::LoggedOut => {
            store.account.login = LoginState::Idle;
            store.account.expiry = None;
            store.account.devices.clear();
            store.account.new_device_banner = false;
            vec![
                StoreEffect::FetchAccountHistory,
                StoreEffect::ResetNavigation(Route::Login),
            ]
        }
        DeviceState::Revoked => {
            store.account.login = LoginState::Idle;
            store.account.expiry = None;
            vec![StoreEffect::ResetNavigation(Route::DeviceRevoked)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn logged_in() -> DeviceState {
        DeviceState::LoggedIn {
            account_number: "1234567890".into(),
            device: Device {
                id: "device-id".into(),
                name: "happy seal".into(),
                created: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    fn connected_action(device_state: DeviceState) -> StoreAction {
        StoreAction::DaemonConnected {
            settings: Box::default(),
            tunnel_state: TunnelState::default(),
            relay_list: RelayList::default(),
            device_state,
            current_version: "2025.3".into(),
            version_info: AppVersionInfo {
                supported: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn connecting_while_logged_in_opens_main_view() {
        let mut store = AppStore::new("2025.3");
        let effects = reduce(&mut store, connected_action(logged_in()));
        assert_eq!(
            effects,
            vec![
                StoreEffect::FetchAccountHistory,
                StoreEffect::FetchAccountData("1234567890".into()),
                StoreEffect::ResetNavigation(Route::Main),
            ]
        );
        assert!(store.connected_to_daemon);
        assert!(store.version.consistent());
        assert!(!store.account.new_device_banner);
    }

    #[test]
    fn login_event_shows_new_device_banner() {
        let mut store = AppStore::new("2025.3");
        reduce(&mut store, connected_action(DeviceState::LoggedOut));
        reduce(&mut store, StoreAction::LoginStarted);
        reduce(
            &mut store,
            StoreAction::Event(DaemonEvent::Device(DeviceEvent {
                device_state: logged_in(),
                cause: DeviceEventCause::LoggedIn,
            })),
        );
        assert!(store.account.new_device_banner);
        assert_eq!(store.account.login, LoginState::Ok);
        assert_eq!(store.account.device_name(), Some("happy seal"));
    }

    #[test]
    fn revoked_device_navigates_to_revoked_page() {
        let mut store = AppStore::new("2025.3");
        reduce(&mut store, connected_action(logged_in()));
        let effects = reduce(
            &mut store,
            StoreAction::Event(DaemonEvent::Device(DeviceEvent {
                device_state: DeviceState::Revoked,
                cause: DeviceEventCause::Revoked,
            })),
        );
        assert_eq!(effects, vec![StoreEffect::ResetNavigation(Route::DeviceRevoked)]);
    }

    #[test]
    fn expired_account_error_refreshes_expiry() {
        let mut store = AppStore::new("2025.3");
        reduce(&mut store, connected_action(logged_in()));
        let effects = reduce(
            &mut store,
            StoreAction::Event(DaemonEvent::TunnelState(TunnelState::Error(ErrorState {
                cause: ErrorStateCause::AuthFailed(AuthFailedError::ExpiredAccount),
                blocking_error: None,
            }))),
        );
        assert_eq!(
            effects,
            vec![StoreEffect::FetchAccountData("1234567890".into())]
        );
    }

    #[test]
    fn version_mismatch_is_inconsistent() {
        let mut store = AppStore::new("2025.2");
        reduce(&mut store, connected_action(DeviceState::LoggedOut));
        assert!(!store.version.consistent());
    }

    #[test]
    fn login_error_is_cleared_only_when_failed() {
        let mut store = AppStore::new("2025.3");
        reduce(&mut store, StoreAction::LoginStarted);
        reduce(&mut store, StoreAction::ResetLoginError);
        assert_eq!(store.account.login, LoginState::LoggingIn);
        reduce(&mut store, StoreAction::LoginFailed("Invalid account number".into()));
        reduce(&mut store, StoreAction::ResetLoginError);
        assert_eq!(store.account.login, LoginState::Idle);
    }
}
