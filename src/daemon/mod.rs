mod rpc;
#[cfg(test)]
pub mod testing;
pub mod types;

use std::fmt;

use futures::channel::mpsc::UnboundedReceiver;

pub use rpc::DaemonRpc;
use types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DaemonError {
    Remote { code: i64, message: String },
    TimedOut(String),
    Transport(String),
    Subscription(String),
    Parse(String),
    InvalidAccount,
    TooManyDevices,
    Communication,
}

impl fmt::Display for DaemonError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { code, message } => {
                write!(formatter, "Remote JSON-RPC error {code}: {message}")
            }
            Self::TimedOut(method) => write!(formatter, "Request {method} timed out"),
            Self::Transport(message) => write!(formatter, "Transport error: {message}"),
            Self::Subscription(message) => write!(formatter, "Subscription failed: {message}"),
            Self::Parse(message) => write!(formatter, "Invalid response: {message}"),
            Self::InvalidAccount => formatter.write_str("Invalid account number"),
            Self::TooManyDevices => formatter.write_str("Too many devices"),
            Self::Communication => {
                formatter.write_str("Failed to communicate with the service")
            }
        }
    }
}

impl std::error::Error for DaemonError {}

impl DaemonError {
    /// Message shown to the user in dialogs and inline errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAccount => "Invalid account number".into(),
            Self::TooManyDevices => "Too many devices".into(),
            Self::TimedOut(_) | Self::Transport(_) | Self::Communication => {
                "Unable to reach the VPN service".into()
            }
            Self::Remote { message, .. } => message.clone(),
            Self::Subscription(_) | Self::Parse(_) => self.to_string(),
        }
    }
}

/// Operations the GUI performs against the background service. Every call blocks, so
/// callers run them on the background executor.
pub trait Daemon: Send + Sync {
    fn subscribe(&self) -> Result<UnboundedReceiver<DaemonEvent>, DaemonError>;

    fn get_settings(&self) -> Result<Settings, DaemonError>;
    fn get_tunnel_state(&self) -> Result<TunnelState, DaemonError>;
    fn get_relay_list(&self) -> Result<RelayList, DaemonError>;
    fn get_version_info(&self) -> Result<AppVersionInfo, DaemonError>;
    fn get_current_version(&self) -> Result<String, DaemonError>;
    fn get_device_state(&self) -> Result<DeviceState, DaemonError>;

    fn connect_tunnel(&self) -> Result<bool, DaemonError>;
    fn disconnect_tunnel(&self) -> Result<bool, DaemonError>;
    fn reconnect_tunnel(&self) -> Result<bool, DaemonError>;

    fn get_account_data(&self, account_number: &str) -> Result<AccountData, DaemonError>;
    fn get_account_history(&self) -> Result<Option<String>, DaemonError>;
    fn clear_account_history(&self) -> Result<(), DaemonError>;
    fn create_new_account(&self) -> Result<String, DaemonError>;
    fn login(&self, account_number: &str) -> Result<(), DaemonError>;
    fn logout(&self) -> Result<(), DaemonError>;
    fn submit_voucher(&self, voucher_code: &str) -> Result<VoucherResponse, DaemonError>;
    fn get_auth_token(&self) -> Result<String, DaemonError>;
    fn list_devices(&self, account_number: &str) -> Result<Vec<Device>, DaemonError>;
    fn remove_device(&self, account_number: &str, device_id: &str) -> Result<(), DaemonError>;

    fn update_relay_settings(&self, update: &RelaySettingsUpdate) -> Result<(), DaemonError>;
    fn set_bridge_state(&self, state: BridgeState) -> Result<(), DaemonError>;
    fn set_bridge_settings(&self, settings: &BridgeSettings) -> Result<(), DaemonError>;
    fn set_dns_options(&self, options: &DnsOptions) -> Result<(), DaemonError>;
    fn set_allow_lan(&self, allow_lan: bool) -> Result<(), DaemonError>;
    fn set_auto_connect(&self, auto_connect: bool) -> Result<(), DaemonError>;
    fn set_block_when_disconnected(&self, block: bool) -> Result<(), DaemonError>;
    fn set_enable_ipv6(&self, enable_ipv6: bool) -> Result<(), DaemonError>;
    fn set_show_beta_releases(&self, show: bool) -> Result<(), DaemonError>;
    fn set_openvpn_mssfix(&self, mssfix: Option<u16>) -> Result<(), DaemonError>;
    fn set_wireguard_mtu(&self, mtu: Option<u16>) -> Result<(), DaemonError>;
    fn set_wireguard_quantum_resistant(&self, enabled: Option<bool>) -> Result<(), DaemonError>;
    fn set_obfuscation_settings(&self, settings: &ObfuscationSettings) -> Result<(), DaemonError>;
    fn set_enable_daita(&self, enable: bool) -> Result<(), DaemonError>;
    fn set_daita_direct_only(&self, direct_only: bool) -> Result<(), DaemonError>;

    fn add_api_access_method(&self, method: &NewAccessMethod) -> Result<String, DaemonError>;
    fn update_api_access_method(&self, method: &AccessMethodSetting) -> Result<(), DaemonError>;
    fn remove_api_access_method(&self, id: &str) -> Result<(), DaemonError>;
    fn set_api_access_method(&self, id: &str) -> Result<(), DaemonError>;
    fn test_api_access_method(&self, id: &str) -> Result<bool, DaemonError>;
    fn test_custom_api_access_method(&self, proxy: &CustomProxy) -> Result<bool, DaemonError>;

    fn get_split_tunneling_applications(
        &self,
    ) -> Result<Vec<SplitTunnelingApplication>, DaemonError>;
    fn set_split_tunnel_state(&self, enabled: bool) -> Result<(), DaemonError>;
    fn add_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError>;
    fn remove_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError>;
    fn launch_excluded_application(&self, path: &str) -> Result<(), DaemonError>;

    fn import_settings(&self, text: &str) -> Result<(), DaemonError>;
    fn collect_problem_report(&self, to_redact: &[String]) -> Result<String, DaemonError>;
    fn send_problem_report(
        &self,
        email: &str,
        message: &str,
        report_path: Option<&str>,
    ) -> Result<(), DaemonError>;
}
