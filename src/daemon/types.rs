use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::RelayLocation;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint<T> {
    #[default]
    Any,
    Only(T),
}

impl<T> Constraint<T> {
    pub fn lift(&self) -> Option<&T> {
        match self {
            Self::Any => None,
            Self::Only(value) => Some(value),
        }
    }

    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Only(value),
            None => Self::Any,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelProtocol {
    #[default]
    Wireguard,
    Openvpn,
}

impl TunnelProtocol {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Wireguard => "WireGuard",
            Self::Openvpn => "OpenVPN",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportProtocol {
    #[default]
    Udp,
    Tcp,
}

impl TransportProtocol {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Udp => "UDP",
            Self::Tcp => "TCP",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    #[default]
    Any,
    MullvadOwned,
    Rented,
}

impl Ownership {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::MullvadOwned => "Owned",
            Self::Rented => "Rented",
        }
    }

    pub fn accepts(&self, owned: bool) -> bool {
        match self {
            Self::Any => true,
            Self::MullvadOwned => owned,
            Self::Rented => !owned,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpVersion {
    Ipv4,
    Ipv6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    Wireguard,
    Openvpn,
    Bridge,
}

// Tunnel state

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelState {
    Disconnected {
        #[serde(default)]
        location: Option<GeoLocation>,
    },
    Connecting {
        #[serde(default)]
        details: Option<TunnelStateDetails>,
        #[serde(default)]
        feature_indicators: Vec<FeatureIndicator>,
    },
    Connected {
        details: TunnelStateDetails,
        #[serde(default)]
        feature_indicators: Vec<FeatureIndicator>,
    },
    Disconnecting(AfterDisconnect),
    Error(ErrorState),
}

impl Default for TunnelState {
    fn default() -> Self {
        Self::Disconnected { location: None }
    }
}

impl TunnelState {
    pub fn details(&self) -> Option<&TunnelStateDetails> {
        match self {
            Self::Connecting { details, .. } => details.as_ref(),
            Self::Connected { details, .. } => Some(details),
            _ => None,
        }
    }

    pub fn feature_indicators(&self) -> &[FeatureIndicator] {
        match self {
            Self::Connecting {
                feature_indicators, ..
            }
            | Self::Connected {
                feature_indicators, ..
            } => feature_indicators,
            _ => &[],
        }
    }

    pub fn is_reconnecting(&self) -> bool {
        matches!(self, Self::Disconnecting(AfterDisconnect::Reconnect))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterDisconnect {
    Nothing,
    Block,
    Reconnect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureIndicator {
    Daita,
    DaitaMultihop,
    QuantumResistance,
    Multihop,
    SplitTunneling,
    LockdownMode,
    Udp2Tcp,
    Shadowsocks,
    LanSharing,
    DnsContentBlockers,
    CustomDns,
    ServerIpOverride,
    CustomMtu,
    CustomMssFix,
    BridgeMode,
}

impl FeatureIndicator {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daita => "DAITA",
            Self::DaitaMultihop => "DAITA: Multihop",
            Self::QuantumResistance => "Quantum resistance",
            Self::Multihop => "Multihop",
            Self::SplitTunneling => "Split tunneling",
            Self::LockdownMode => "Lockdown mode",
            Self::Udp2Tcp | Self::Shadowsocks => "Obfuscation",
            Self::LanSharing => "Local network sharing",
            Self::DnsContentBlockers => "DNS content blockers",
            Self::CustomDns => "Custom DNS",
            Self::ServerIpOverride => "Server IP override",
            Self::CustomMtu => "MTU",
            Self::CustomMssFix => "Mssfix",
            Self::BridgeMode => "Bridge mode",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelStateDetails {
    pub endpoint: TunnelEndpoint,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelEndpoint {
    pub address: String,
    pub protocol: TransportProtocol,
    pub tunnel_type: TunnelProtocol,
    #[serde(default)]
    pub quantum_resistant: bool,
    #[serde(default)]
    pub daita: bool,
    #[serde(default)]
    pub proxy: Option<ProxyEndpoint>,
    #[serde(default)]
    pub obfuscation: Option<ObfuscationEndpoint>,
    #[serde(default)]
    pub entry_endpoint: Option<EntryEndpoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub address: String,
    pub protocol: TransportProtocol,
    pub proxy_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationEndpoint {
    pub address: String,
    pub port: u16,
    pub protocol: TransportProtocol,
    pub obfuscation_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryEndpoint {
    pub address: String,
    pub transport_protocol: TransportProtocol,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub owned_exit_ip: bool,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub entry_hostname: Option<String>,
    #[serde(default)]
    pub obfuscator_hostname: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorState {
    pub cause: ErrorStateCause,
    #[serde(default)]
    pub blocking_error: Option<FirewallPolicyError>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStateCause {
    AuthFailed(AuthFailedError),
    Ipv6Unavailable,
    SetFirewallPolicyError(FirewallPolicyError),
    SetDnsError,
    StartTunnelError,
    CreateTunnelDeviceError {
        #[serde(default)]
        os_error: Option<i32>,
    },
    TunnelParameterError(TunnelParameterError),
    IsOffline,
    SplitTunnelError,
    NeedFullDiskPermissions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailedError {
    Unknown,
    InvalidAccount,
    ExpiredAccount,
    TooManyConnections,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelParameterError {
    NoMatchingRelay,
    NoMatchingBridgeRelay,
    NoWireguardKey,
    CustomTunnelHostResolutionError,
    Ipv4Unavailable,
    Ipv6Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirewallPolicyError {
    Generic,
    Locked {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        pid: Option<u32>,
    },
}

// Settings

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub allow_lan: bool,
    pub auto_connect: bool,
    pub block_when_disconnected: bool,
    pub show_beta_releases: bool,
    pub relay_settings: RelaySettings,
    pub tunnel_options: TunnelOptions,
    pub bridge_settings: BridgeSettings,
    pub bridge_state: BridgeState,
    #[serde(default)]
    pub split_tunnel: SplitTunnelSettings,
    #[serde(default)]
    pub obfuscation_settings: ObfuscationSettings,
    #[serde(default)]
    pub custom_lists: Vec<CustomList>,
    #[serde(default)]
    pub api_access_methods: Vec<AccessMethodSetting>,
}

impl Settings {
    pub fn normal_relay_settings(&self) -> Option<&NormalRelaySettings> {
        match &self.relay_settings {
            RelaySettings::Normal(settings) => Some(settings),
            RelaySettings::CustomTunnelEndpoint { .. } => None,
        }
    }

    pub fn tunnel_protocol(&self) -> TunnelProtocol {
        self.normal_relay_settings()
            .map(|settings| settings.tunnel_protocol)
            .unwrap_or_default()
    }

    pub fn multihop_enabled(&self) -> bool {
        self.normal_relay_settings()
            .is_some_and(|settings| settings.wireguard_constraints.use_multihop)
    }

    pub fn daita_enabled(&self) -> bool {
        self.tunnel_options.wireguard.daita.enable_daita
    }

    pub fn daita_direct_only(&self) -> bool {
        self.tunnel_options.wireguard.daita.direct_only
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaySettings {
    Normal(NormalRelaySettings),
    CustomTunnelEndpoint { host: String, config: String },
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::Normal(NormalRelaySettings::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalRelaySettings {
    pub location: Constraint<RelayLocation>,
    pub tunnel_protocol: TunnelProtocol,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub ownership: Ownership,
    #[serde(default)]
    pub openvpn_constraints: OpenVpnConstraints,
    #[serde(default)]
    pub wireguard_constraints: WireguardConstraints,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenVpnConstraints {
    pub port: Constraint<u16>,
    pub protocol: Constraint<TransportProtocol>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireguardConstraints {
    pub port: Constraint<u16>,
    pub ip_version: Constraint<IpVersion>,
    pub use_multihop: bool,
    pub entry_location: Constraint<RelayLocation>,
}

/// Partial relay settings update; `None` fields keep the daemon's current value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelaySettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Constraint<RelayLocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tunnel_protocol: Option<TunnelProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openvpn_constraints: Option<OpenVpnConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wireguard_constraints: Option<WireguardConstraints>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    #[default]
    Auto,
    On,
    Off,
}

impl BridgeState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Automatic",
            Self::On => "On",
            Self::Off => "Off",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeType {
    #[default]
    Normal,
    Custom,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeSettings {
    #[serde(rename = "type")]
    pub bridge_type: BridgeType,
    pub normal: NormalBridgeSettings,
    #[serde(default)]
    pub custom: Option<CustomProxy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalBridgeSettings {
    pub location: Constraint<RelayLocation>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub ownership: Ownership,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelOptions {
    pub openvpn: OpenVpnTunnelOptions,
    pub wireguard: WireguardTunnelOptions,
    pub generic: GenericTunnelOptions,
    pub dns: DnsOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenVpnTunnelOptions {
    #[serde(default)]
    pub mssfix: Option<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireguardTunnelOptions {
    #[serde(default)]
    pub mtu: Option<u16>,
    #[serde(default)]
    pub quantum_resistant: Option<bool>,
    #[serde(default)]
    pub daita: DaitaSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaitaSettings {
    pub enable_daita: bool,
    pub direct_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericTunnelOptions {
    pub enable_ipv6: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsState {
    #[default]
    Default,
    Custom,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsOptions {
    pub state: DnsState,
    pub default_options: DefaultDnsOptions,
    pub custom_options: CustomDnsOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultDnsOptions {
    pub block_ads: bool,
    pub block_trackers: bool,
    pub block_malware: bool,
    pub block_adult_content: bool,
    pub block_gambling: bool,
    pub block_social_media: bool,
}

impl DefaultDnsOptions {
    pub fn any_enabled(&self) -> bool {
        self.block_ads
            || self.block_trackers
            || self.block_malware
            || self.block_adult_content
            || self.block_gambling
            || self.block_social_media
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDnsOptions {
    pub addresses: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObfuscationType {
    #[default]
    Auto,
    Off,
    Udp2Tcp,
    Shadowsocks,
}

impl ObfuscationType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Automatic",
            Self::Off => "Off",
            Self::Udp2Tcp => "UDP-over-TCP",
            Self::Shadowsocks => "Shadowsocks",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationSettings {
    pub selected: ObfuscationType,
    #[serde(default)]
    pub udp2tcp_port: Constraint<u16>,
    #[serde(default)]
    pub shadowsocks_port: Constraint<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTunnelSettings {
    pub enable_exclusions: bool,
    pub apps_list: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomList {
    pub id: String,
    pub name: String,
    pub locations: Vec<RelayLocation>,
}

// API access

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMethodSetting {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub kind: AccessMethodKind,
}

impl AccessMethodSetting {
    pub fn is_builtin(&self) -> bool {
        !matches!(self.kind, AccessMethodKind::Custom(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMethodKind {
    Direct,
    Bridges,
    EncryptedDnsProxy,
    Custom(CustomProxy),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomProxy {
    Shadowsocks {
        ip: String,
        port: u16,
        password: String,
        cipher: String,
    },
    Socks5Remote {
        ip: String,
        port: u16,
        #[serde(default)]
        authentication: Option<SocksAuthentication>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocksAuthentication {
    pub username: String,
    pub password: String,
}

/// New access method without an id; the daemon assigns one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccessMethod {
    pub name: String,
    pub enabled: bool,
    pub proxy: CustomProxy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMethodTestResult {
    Reachable,
    Unreachable,
}

// Relay list

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayList {
    pub countries: Vec<RelayListCountry>,
    #[serde(default)]
    pub wireguard: WireguardEndpointData,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireguardEndpointData {
    pub port_ranges: Vec<(u16, u16)>,
    #[serde(default)]
    pub udp2tcp_ports: Vec<u16>,
    #[serde(default)]
    pub shadowsocks_port_ranges: Vec<(u16, u16)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayListCountry {
    pub name: String,
    pub code: String,
    pub cities: Vec<RelayListCity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayListCity {
    pub name: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub relays: Vec<Relay>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relay {
    pub hostname: String,
    pub provider: String,
    pub ipv4_addr_in: String,
    #[serde(default = "default_true")]
    pub include_in_country: bool,
    pub active: bool,
    pub weight: u64,
    pub owned: bool,
    pub endpoint_type: EndpointType,
    #[serde(default)]
    pub daita: bool,
}

fn default_true() -> bool {
    true
}

// Account and devices

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    LoggedIn {
        account_number: String,
        device: Device,
    },
    #[default]
    LoggedOut,
    Revoked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceEventCause {
    LoggedIn,
    LoggedOut,
    Revoked,
    Updated,
    RotatedKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub device_state: DeviceState,
    pub cause: DeviceEventCause,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub expiry: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherResponse {
    Success {
        new_expiry: DateTime<Utc>,
        seconds_added: u64,
    },
    Invalid,
    AlreadyUsed,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersionInfo {
    pub supported: bool,
    #[serde(default)]
    pub suggested_upgrade: Option<String>,
    #[serde(default)]
    pub suggested_is_beta: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTunnelingApplication {
    pub name: String,
    pub absolute_path: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonEvent {
    TunnelState(TunnelState),
    Settings(Box<Settings>),
    RelayList(RelayList),
    AppVersionInfo(AppVersionInfo),
    Device(DeviceEvent),
    DeviceRemoval(Vec<Device>),
    AccessMethodSetting(AccessMethodSetting),
}

/// Splits `host:port` at the last colon.
pub fn parse_socket_address(address: &str) -> Option<(String, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() || port.is_empty() || !port.chars().all(|character| character.is_ascii_digit())
    {
        return None;
    }
    let port = port.parse().ok()?;
    Some((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn socket_address_splits_at_last_colon() {
        assert_eq!(
            parse_socket_address("10.64.0.1:51820"),
            Some(("10.64.0.1".to_string(), 51820))
        );
        assert_eq!(
            parse_socket_address("[::1]:53"),
            Some(("[::1]".to_string(), 53))
        );
        assert_eq!(parse_socket_address("10.64.0.1"), None);
        assert_eq!(parse_socket_address(":53"), None);
    }

    #[test]
    fn tunnel_state_deserializes_from_daemon_json() {
        let json = r#"{"error":{"cause":"is_offline","blocking_error":null}}"#;
        let state: TunnelState = serde_json::from_str(json).unwrap();
        assert_eq!(
            state,
            TunnelState::Error(ErrorState {
                cause: ErrorStateCause::IsOffline,
                blocking_error: None,
            })
        );
    }

    #[test]
    fn constraint_lifts_only_values() {
        assert_eq!(Constraint::Only(443u16).lift(), Some(&443));
        assert_eq!(Constraint::<u16>::Any.lift(), None);
        assert_eq!(Constraint::from_option(Some(1)), Constraint::Only(1));
    }

    #[test]
    fn ownership_filter_accepts_matching_relays() {
        assert!(Ownership::Any.accepts(false));
        assert!(Ownership::MullvadOwned.accepts(true));
        assert!(!Ownership::Rented.accepts(true));
    }
}
