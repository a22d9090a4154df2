use chrono::{DateTime, Utc};

use crate::{
    account,
    daemon::types::*,
    gui_settings::GuiSettings,
    store::AppStore,
};

pub const ACCOUNT_URL: &str = "https://mullvad.net/account";
pub const DOWNLOAD_URL: &str = "https://mullvad.net/download/vpn/";
pub const BETA_DOWNLOAD_URL: &str = "https://mullvad.net/download/vpn/beta/";

const EXCLUDED_APPS_WARNING: &str =
    "The apps excluded with split tunneling might not work properly right now.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TroubleshootButton {
    OpenSystemSettings,
    DisableSplitTunneling,
}

impl TroubleshootButton {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenSystemSettings => "Open system settings",
            Self::DisableSplitTunneling => "Disable split tunneling",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TroubleshootInfo {
    pub details: String,
    pub steps: Vec<String>,
    pub buttons: Vec<TroubleshootButton>,
}

/// What closing a dismissable banner clears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseTarget {
    NewDeviceBanner,
    Changelog,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationAction {
    OpenUrl { url: String, with_auth: bool },
    Troubleshoot(TroubleshootInfo),
    Close(CloseTarget),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InAppNotification {
    pub indicator: Indicator,
    pub title: String,
    /// Escaped text where `<b>` marks emphasis.
    pub subtitle: Option<String>,
    pub action: Option<NotificationAction>,
}

pub struct NotificationContext<'a> {
    pub store: &'a AppStore,
    pub gui_settings: &'a GuiSettings,
    pub now: DateTime<Utc>,
}

pub trait NotificationProvider {
    fn name(&self) -> &'static str;
    fn may_display(&self, context: &NotificationContext<'_>) -> bool;
    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification>;
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Splits a subtitle into plain and bold runs for rendering.
pub fn subtitle_segments(subtitle: &str) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    let mut rest = subtitle;
    while let Some(start) = rest.find("<b>") {
        if start > 0 {
            segments.push((unescape_html(&rest[..start]), false));
        }
        let after_tag = &rest[start + 3..];
        let Some(end) = after_tag.find("</b>") else {
            segments.push((unescape_html(after_tag), true));
            return segments;
        };
        segments.push((unescape_html(&after_tag[..end]), true));
        rest = &after_tag[end + 4..];
    }
    if !rest.is_empty() {
        segments.push((unescape_html(rest), false));
    }
    segments
}

struct ConnectingProvider;

impl NotificationProvider for ConnectingProvider {
    fn name(&self) -> &'static str {
        "connecting"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        matches!(context.store.tunnel_state, TunnelState::Connecting { .. })
    }

    fn in_app_notification(&self, _context: &NotificationContext<'_>) -> Option<InAppNotification> {
        Some(InAppNotification {
            indicator: Indicator::Success,
            title: "CREATING SECURE CONNECTION".into(),
            subtitle: None,
            action: None,
        })
    }
}

struct ReconnectingProvider;

impl NotificationProvider for ReconnectingProvider {
    fn name(&self) -> &'static str {
        "reconnecting"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        context.store.tunnel_state.is_reconnecting()
    }

    fn in_app_notification(&self, _context: &NotificationContext<'_>) -> Option<InAppNotification> {
        Some(InAppNotification {
            indicator: Indicator::Success,
            title: "CREATING SECURE CONNECTION".into(),
            subtitle: None,
            action: None,
        })
    }
}

struct LockdownProvider;

impl NotificationProvider for LockdownProvider {
    fn name(&self) -> &'static str {
        "lockdown"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        match context.store.tunnel_state {
            TunnelState::Disconnected { .. } => context.store.settings.block_when_disconnected,
            TunnelState::Disconnecting(AfterDisconnect::Block) => true,
            _ => false,
        }
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let mut subtitle = "<b>Lockdown mode</b> is enabled. Disable it to unblock your connection."
            .to_string();
        if context.store.has_excluded_apps() {
            subtitle = format!("{subtitle} {EXCLUDED_APPS_WARNING}");
        }
        Some(InAppNotification {
            indicator: Indicator::Error,
            title: "BLOCKING INTERNET".into(),
            subtitle: Some(subtitle),
            action: None,
        })
    }
}

struct UnsupportedWireguardPortProvider;

impl UnsupportedWireguardPortProvider {
    fn unsupported_port(store: &AppStore) -> Option<u16> {
        let relay_settings = store.settings.normal_relay_settings()?;
        if relay_settings.tunnel_protocol != TunnelProtocol::Wireguard {
            return None;
        }
        let port = *relay_settings.wireguard_constraints.port.lift()?;
        let ranges = &store.relay_list.wireguard.port_ranges;
        if ranges.is_empty() || ranges.iter().any(|(low, high)| (*low..=*high).contains(&port)) {
            return None;
        }
        Some(port)
    }
}

impl NotificationProvider for UnsupportedWireguardPortProvider {
    fn name(&self) -> &'static str {
        "unsupported-wireguard-port"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        matches!(context.store.tunnel_state, TunnelState::Error(_))
            && Self::unsupported_port(context.store).is_some()
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let port = Self::unsupported_port(context.store)?;
        Some(InAppNotification {
            indicator: Indicator::Error,
            title: "BLOCKING INTERNET".into(),
            subtitle: Some(format!(
                "The selected WireGuard port <b>{port}</b> is not supported, please change it under <b>WireGuard settings</b>."
            )),
            action: None,
        })
    }
}

struct ErrorProvider;

impl NotificationProvider for ErrorProvider {
    fn name(&self) -> &'static str {
        "error"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        matches!(context.store.tunnel_state, TunnelState::Error(_))
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let TunnelState::Error(error_state) = &context.store.tunnel_state else {
            return None;
        };
        let mut subtitle = error_message(error_state);
        if error_state.blocking_error.is_none() && context.store.has_excluded_apps() {
            subtitle = format!("{subtitle} {EXCLUDED_APPS_WARNING}");
        }
        Some(InAppNotification {
            indicator: if error_state.cause == ErrorStateCause::IsOffline {
                Indicator::Warning
            } else {
                Indicator::Error
            },
            title: if error_state.blocking_error.is_some() {
                "NETWORK TRAFFIC MIGHT BE LEAKING".into()
            } else {
                "BLOCKING INTERNET".into()
            },
            subtitle: Some(subtitle),
            action: troubleshoot_info(error_state).map(NotificationAction::Troubleshoot),
        })
    }
}

pub fn error_message(error_state: &ErrorState) -> String {
    if error_state.blocking_error.is_some() {
        if matches!(error_state.cause, ErrorStateCause::SetFirewallPolicyError(_)) {
            if cfg!(target_os = "windows") {
                return "Unable to block all network traffic. Try temporarily disabling any third-party antivirus or security software or send a problem report.".into();
            }
            if cfg!(target_os = "linux") {
                return "Unable to block all network traffic. Try updating your kernel or send a problem report.".into();
            }
        }
        return "Unable to block all network traffic. Please troubleshoot or send a problem report."
            .into();
    }

    match &error_state.cause {
        ErrorStateCause::AuthFailed(AuthFailedError::InvalidAccount) => {
            "You are logged in with an invalid account number. Please log out and try another one."
                .into()
        }
        ErrorStateCause::AuthFailed(AuthFailedError::ExpiredAccount) => {
            "Blocking internet: account is out of time".into()
        }
        ErrorStateCause::AuthFailed(AuthFailedError::TooManyConnections) => {
            "Too many simultaneous connections on this account. Disconnect another device or try connecting again shortly.".into()
        }
        ErrorStateCause::AuthFailed(AuthFailedError::Unknown) => {
            "Unable to authenticate account. Please send a problem report.".into()
        }
        ErrorStateCause::Ipv6Unavailable => {
            "Could not configure IPv6. Disable it in the app or enable it on your device.".into()
        }
        ErrorStateCause::SetFirewallPolicyError(_) => {
            if cfg!(target_os = "windows") {
                "Unable to apply firewall rules. Try temporarily disabling any third-party antivirus or security software.".into()
            } else if cfg!(target_os = "linux") {
                "Unable to apply firewall rules. Try updating your kernel.".into()
            } else {
                "Unable to apply firewall rules.".into()
            }
        }
        ErrorStateCause::SetDnsError => {
            "Unable to set system DNS server. Please send a problem report.".into()
        }
        ErrorStateCause::CreateTunnelDeviceError { os_error: Some(4319) } => {
            "Unable to start tunnel connection. This could be because of conflicts with VMware, please troubleshoot.".into()
        }
        ErrorStateCause::StartTunnelError | ErrorStateCause::CreateTunnelDeviceError { .. } => {
            "Unable to start tunnel connection. Please send a problem report.".into()
        }
        ErrorStateCause::TunnelParameterError(error) => tunnel_parameter_message(*error),
        ErrorStateCause::IsOffline => {
            "Your device is offline. The tunnel will automatically connect once your device is back online.".into()
        }
        ErrorStateCause::NeedFullDiskPermissions => "Failed to enable split tunneling.".into(),
        ErrorStateCause::SplitTunnelError => {
            if cfg!(target_os = "macos") {
                "Failed to enable split tunneling. Please try reconnecting or disable split tunneling.".into()
            } else {
                "Unable to communicate with the kernel driver. Try reconnecting or send a problem report.".into()
            }
        }
    }
}

fn tunnel_parameter_message(error: TunnelParameterError) -> String {
    match error {
        TunnelParameterError::NoMatchingRelay | TunnelParameterError::NoMatchingBridgeRelay => {
            "No servers match your settings, try changing server or other settings.".into()
        }
        TunnelParameterError::NoWireguardKey => {
            "Valid WireGuard key is missing. Manage keys under Advanced settings.".into()
        }
        TunnelParameterError::CustomTunnelHostResolutionError => {
            "Unable to resolve host of custom tunnel. Try changing your settings.".into()
        }
        TunnelParameterError::Ipv4Unavailable => {
            "IPv4 is not available, please try changing <b>IP version</b> setting.".into()
        }
        TunnelParameterError::Ipv6Unavailable => {
            "IPv6 is not available, please try changing <b>IP version</b> setting.".into()
        }
    }
}

pub fn troubleshoot_info(error_state: &ErrorState) -> Option<TroubleshootInfo> {
    match &error_state.cause {
        ErrorStateCause::SetFirewallPolicyError(_) if cfg!(target_os = "linux") => {
            Some(TroubleshootInfo {
                details: "This might be caused by an outdated kernel.".into(),
                steps: vec![
                    "Update your kernel.".into(),
                    "Make sure you have NF tables support.".into(),
                ],
                buttons: Vec::new(),
            })
        }
        ErrorStateCause::SetDnsError => {
            let mut steps = Vec::new();
            if cfg!(target_os = "macos") {
                steps.push(
                    "Try to turn Wi-Fi Calling off in the FaceTime app settings and restart the Mac."
                        .to_string(),
                );
            }
            if cfg!(any(target_os = "macos", target_os = "windows")) {
                steps.push(
                    "Uninstall or disable other DNS, networking and ads/website blocking apps."
                        .to_string(),
                );
            }
            Some(TroubleshootInfo {
                details: "This error can happen when something other than the VPN service is actively updating the DNS.".into(),
                steps,
                buttons: Vec::new(),
            })
        }
        ErrorStateCause::NeedFullDiskPermissions => Some(TroubleshootInfo {
            details: "Failed to enable split tunneling. This is because the app is missing system permissions. What you can do:".into(),
            steps: vec![
                "Enable \"Full Disk Access\" for the VPN app in the macOS system settings.".into(),
            ],
            buttons: if cfg!(target_os = "macos") {
                vec![
                    TroubleshootButton::OpenSystemSettings,
                    TroubleshootButton::DisableSplitTunneling,
                ]
            } else {
                Vec::new()
            },
        }),
        ErrorStateCause::SplitTunnelError if cfg!(target_os = "windows") => {
            Some(TroubleshootInfo {
                details: "Unable to communicate with the kernel driver.".into(),
                steps: vec!["Try reconnecting.".into(), "Try restarting your device.".into()],
                buttons: Vec::new(),
            })
        }
        ErrorStateCause::CreateTunnelDeviceError { os_error: Some(4319) } => {
            Some(TroubleshootInfo {
                details: "Unable to start tunnel connection because of a failure when creating the tunnel device. This is often caused by conflicts with the VMware Bridge Protocol.".into(),
                steps: vec![
                    "Try to reinstall VMware.".into(),
                    "Try to uninstall VMware.".into(),
                ],
                buttons: Vec::new(),
            })
        }
        _ => None,
    }
}

struct InconsistentVersionProvider;

impl NotificationProvider for InconsistentVersionProvider {
    fn name(&self) -> &'static str {
        "inconsistent-version"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        !context.store.version.consistent()
    }

    fn in_app_notification(&self, _context: &NotificationContext<'_>) -> Option<InAppNotification> {
        Some(InAppNotification {
            indicator: Indicator::Error,
            title: "INCONSISTENT VERSION".into(),
            subtitle: Some(
                "Inconsistent internal version information, please restart the app.".into(),
            ),
            action: None,
        })
    }
}

fn download_url(info: &AppVersionInfo) -> &'static str {
    if info.suggested_is_beta {
        BETA_DOWNLOAD_URL
    } else {
        DOWNLOAD_URL
    }
}

struct UnsupportedVersionProvider;

impl NotificationProvider for UnsupportedVersionProvider {
    fn name(&self) -> &'static str {
        "unsupported-version"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        let info = &context.store.version.info;
        context.store.connected_to_daemon && !info.supported && info.suggested_upgrade.is_some()
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let info = &context.store.version.info;
        Some(InAppNotification {
            indicator: Indicator::Error,
            title: "UNSUPPORTED VERSION".into(),
            subtitle: Some(
                "Your privacy might be at risk with this unsupported app version. Please update now."
                    .into(),
            ),
            action: Some(NotificationAction::OpenUrl {
                url: download_url(info).into(),
                with_auth: false,
            }),
        })
    }
}

struct CloseToAccountExpiryProvider {
    expiry: DateTime<Utc>,
}

impl NotificationProvider for CloseToAccountExpiryProvider {
    fn name(&self) -> &'static str {
        "close-to-account-expiry"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        account::close_to_expiry(self.expiry, context.now)
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let remaining = account::remaining_duration_text(self.expiry, context.now);
        let mut remaining_sentence = remaining;
        if let Some(first) = remaining_sentence.get(..1) {
            let capitalized = first.to_uppercase();
            remaining_sentence.replace_range(..1, &capitalized);
        }
        Some(InAppNotification {
            indicator: Indicator::Warning,
            title: "ACCOUNT CREDIT EXPIRES SOON".into(),
            subtitle: Some(format!("{remaining_sentence}. Buy more credit.")),
            action: Some(NotificationAction::OpenUrl {
                url: ACCOUNT_URL.into(),
                with_auth: true,
            }),
        })
    }
}

struct NewDeviceProvider;

impl NotificationProvider for NewDeviceProvider {
    fn name(&self) -> &'static str {
        "new-device"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        context.store.account.new_device_banner && context.store.is_logged_in()
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let device_name = context.store.account.device_name()?;
        Some(InAppNotification {
            indicator: Indicator::Success,
            title: "NEW DEVICE CREATED".into(),
            subtitle: Some(format!(
                "This device is now named <b>{}</b>. See more under \"Manage devices\" in Account.",
                escape_html(&account::capitalize_device_name(device_name))
            )),
            action: Some(NotificationAction::Close(CloseTarget::NewDeviceBanner)),
        })
    }
}

struct NewVersionProvider;

impl NotificationProvider for NewVersionProvider {
    fn name(&self) -> &'static str {
        "new-version"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        context.gui_settings.changelog_seen_version.is_some()
            && context
                .gui_settings
                .should_show_changelog(&context.store.version.gui)
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        Some(InAppNotification {
            indicator: Indicator::Success,
            title: "NEW VERSION INSTALLED".into(),
            subtitle: Some(format!(
                "Version <b>{}</b> is installed. See what is new in the changelog.",
                escape_html(&context.store.version.gui)
            )),
            action: Some(NotificationAction::Close(CloseTarget::Changelog)),
        })
    }
}

struct UpdateAvailableProvider;

impl NotificationProvider for UpdateAvailableProvider {
    fn name(&self) -> &'static str {
        "update-available"
    }

    fn may_display(&self, context: &NotificationContext<'_>) -> bool {
        context.store.version.info.suggested_upgrade.is_some()
    }

    fn in_app_notification(&self, context: &NotificationContext<'_>) -> Option<InAppNotification> {
        let info = &context.store.version.info;
        let upgrade = info.suggested_upgrade.as_deref()?;
        let title = if info.suggested_is_beta {
            "BETA UPDATE AVAILABLE"
        } else {
            "UPDATE AVAILABLE"
        };
        Some(InAppNotification {
            indicator: Indicator::Warning,
            title: title.into(),
            subtitle: Some(format!(
                "Install version <b>{}</b> to stay up to date.",
                escape_html(upgrade)
            )),
            action: Some(NotificationAction::OpenUrl {
                url: download_url(info).into(),
                with_auth: false,
            }),
        })
    }
}

/// Providers in priority order.
pub fn providers(store: &AppStore) -> Vec<Box<dyn NotificationProvider>> {
    let mut providers: Vec<Box<dyn NotificationProvider>> = vec![
        Box::new(ConnectingProvider),
        Box::new(ReconnectingProvider),
        Box::new(LockdownProvider),
        Box::new(UnsupportedWireguardPortProvider),
        Box::new(ErrorProvider),
        Box::new(InconsistentVersionProvider),
        Box::new(UnsupportedVersionProvider),
    ];
    if let Some(expiry) = store.account.expiry {
        providers.push(Box::new(CloseToAccountExpiryProvider { expiry }));
    }
    providers.push(Box::new(NewDeviceProvider));
    providers.push(Box::new(NewVersionProvider));
    providers.push(Box::new(UpdateAvailableProvider));
    providers
}

/// The banner to show, if any. Only the first provider that may display is asked.
pub fn select_notification(context: &NotificationContext<'_>) -> Option<InAppNotification> {
    let providers = providers(context.store);
    let provider = providers
        .iter()
        .find(|provider| provider.may_display(context))?;
    let notification = provider.in_app_notification(context);
    if notification.is_none() {
        log::error!(
            "[notifications] provider {} may display but produced no notification",
            provider.name()
        );
    }
    notification
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn store() -> AppStore {
        let mut store = AppStore::new("2025.3");
        store.connected_to_daemon = true;
        store.version.current = "2025.3".into();
        store.version.info.supported = true;
        store
    }

    fn select(store: &AppStore, gui_settings: &GuiSettings) -> Option<InAppNotification> {
        select_notification(&NotificationContext {
            store,
            gui_settings,
            now: now(),
        })
    }

    fn error(cause: ErrorStateCause, blocking_error: Option<FirewallPolicyError>) -> TunnelState {
        TunnelState::Error(ErrorState {
            cause,
            blocking_error,
        })
    }

    #[test]
    fn nothing_to_show_yields_no_banner() {
        assert_eq!(select(&store(), &GuiSettings::default()), None);
    }

    #[test]
    fn connecting_outranks_everything_else() {
        let mut store = store();
        store.tunnel_state = TunnelState::Connecting {
            details: None,
            feature_indicators: Vec::new(),
        };
        store.version.current = "2024.1".into();
        store.version.info.suggested_upgrade = Some("2025.4".into());
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(notification.title, "CREATING SECURE CONNECTION");
    }

    #[test]
    fn lockdown_while_disconnected_blocks() {
        let mut store = store();
        store.settings.block_when_disconnected = true;
        store.settings.split_tunnel.enable_exclusions = true;
        store.settings.split_tunnel.apps_list = vec!["/usr/bin/app".into()];
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(notification.title, "BLOCKING INTERNET");
        assert!(notification.subtitle.unwrap().ends_with(EXCLUDED_APPS_WARNING));
    }

    #[test]
    fn offline_error_is_a_warning() {
        let mut store = store();
        store.tunnel_state = error(ErrorStateCause::IsOffline, None);
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(notification.indicator, Indicator::Warning);
        assert_eq!(notification.title, "BLOCKING INTERNET");
    }

    #[test]
    fn blocking_error_means_traffic_might_leak() {
        let mut store = store();
        store.settings.split_tunnel.enable_exclusions = true;
        store.settings.split_tunnel.apps_list = vec!["/usr/bin/app".into()];
        store.tunnel_state = error(
            ErrorStateCause::StartTunnelError,
            Some(FirewallPolicyError::Generic),
        );
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(notification.indicator, Indicator::Error);
        assert_eq!(notification.title, "NETWORK TRAFFIC MIGHT BE LEAKING");
        assert_eq!(
            notification.subtitle.as_deref(),
            Some("Unable to block all network traffic. Please troubleshoot or send a problem report.")
        );
    }

    #[test]
    fn excluded_apps_warning_is_appended_without_blocking_error() {
        let mut store = store();
        store.settings.split_tunnel.enable_exclusions = true;
        store.settings.split_tunnel.apps_list = vec!["/usr/bin/app".into()];
        store.tunnel_state = error(ErrorStateCause::AuthFailed(AuthFailedError::ExpiredAccount), None);
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(
            notification.subtitle.as_deref(),
            Some(
                "Blocking internet: account is out of time The apps excluded with split tunneling might not work properly right now."
            )
        );
    }

    #[test]
    fn vmware_conflict_offers_troubleshooting() {
        let mut store = store();
        store.tunnel_state = error(
            ErrorStateCause::CreateTunnelDeviceError { os_error: Some(4319) },
            None,
        );
        let notification = select(&store, &GuiSettings::default()).unwrap();
        let Some(NotificationAction::Troubleshoot(info)) = notification.action else {
            panic!("expected troubleshoot action");
        };
        assert_eq!(info.steps.len(), 2);
    }

    #[test]
    fn unsupported_wireguard_port_outranks_generic_error() {
        let mut store = store();
        store.relay_list.wireguard.port_ranges = vec![(51820, 51820), (53, 53)];
        if let RelaySettings::Normal(settings) = &mut store.settings.relay_settings {
            settings.wireguard_constraints.port = Constraint::Only(1234);
        }
        store.tunnel_state = error(
            ErrorStateCause::TunnelParameterError(TunnelParameterError::NoMatchingRelay),
            None,
        );
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert!(notification.subtitle.unwrap().contains("<b>1234</b>"));
    }

    #[test]
    fn close_to_expiry_only_when_expiry_is_known() {
        let mut store = store();
        assert!(
            providers(&store)
                .iter()
                .all(|provider| provider.name() != "close-to-account-expiry")
        );
        store.account.expiry = Some(now() + chrono::Duration::hours(30));
        let notification = select(&store, &GuiSettings::default()).unwrap();
        assert_eq!(notification.title, "ACCOUNT CREDIT EXPIRES SOON");
        assert_eq!(
            notification.subtitle.as_deref(),
            Some("1 day left. Buy more credit.")
        );
        assert_eq!(
            notification.action,
            Some(NotificationAction::OpenUrl {
                url: ACCOUNT_URL.into(),
                with_auth: true,
            })
        );
    }

    #[test]
    fn new_device_name_is_escaped() {
        let mut store = store();
        store.account.device_state = DeviceState::LoggedIn {
            account_number: "1234567890".into(),
            device: Device {
                id: "id".into(),
                name: "<odd> seal".into(),
                created: now(),
            },
        };
        store.account.new_device_banner = true;
        let notification = select(&store, &GuiSettings::default()).unwrap();
        let subtitle = notification.subtitle.unwrap();
        assert!(subtitle.contains("<b>&lt;odd&gt; Seal</b>"));
        assert_eq!(subtitle_segments(&subtitle)[1], ("<odd> Seal".to_string(), true));
    }

    #[test]
    fn changelog_banner_after_upgrade_only() {
        let store = store();
        let fresh_install = GuiSettings::default();
        assert_eq!(select(&store, &fresh_install), None);
        let upgraded = GuiSettings {
            changelog_seen_version: Some("2025.2".into()),
            ..Default::default()
        };
        let notification = select(&store, &upgraded).unwrap();
        assert_eq!(
            notification.action,
            Some(NotificationAction::Close(CloseTarget::Changelog))
        );
    }

    #[test]
    fn update_available_is_lowest_priority() {
        let mut store = store();
        store.version.info.suggested_upgrade = Some("2025.4".into());
        let upgraded = GuiSettings {
            changelog_seen_version: Some("2025.2".into()),
            ..Default::default()
        };
        assert_eq!(select(&store, &upgraded).unwrap().title, "NEW VERSION INSTALLED");
        let seen = GuiSettings {
            changelog_seen_version: Some("2025.3".into()),
            ..Default::default()
        };
        assert_eq!(select(&store, &seen).unwrap().title, "UPDATE AVAILABLE");
    }

    #[test]
    fn subtitle_segments_split_bold_runs() {
        assert_eq!(
            subtitle_segments("a <b>b</b> c"),
            vec![
                ("a ".to_string(), false),
                ("b".to_string(), true),
                (" c".to_string(), false),
            ]
        );
    }
}
