pub mod api_access;
pub mod custom_dns;
pub mod daita;
pub mod import;
pub mod openvpn;
pub mod preferences;
pub mod split_tunneling;
pub mod vpn;
pub mod wireguard;

use crate::daemon::{Daemon, DaemonError, types::*};

/// One daemon setter call. Every settings control produces exactly one of these.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsChange {
    RelaySettings(RelaySettingsUpdate),
    BridgeState(BridgeState),
    BridgeSettings(BridgeSettings),
    DnsOptions(DnsOptions),
    AllowLan(bool),
    AutoConnect(bool),
    BlockWhenDisconnected(bool),
    EnableIpv6(bool),
    ShowBetaReleases(bool),
    OpenVpnMssfix(Option<u16>),
    WireguardMtu(Option<u16>),
    QuantumResistant(Option<bool>),
    Obfuscation(ObfuscationSettings),
    EnableDaita(bool),
    DaitaDirectOnly(bool),
    SplitTunnelState(bool),
    AddSplitTunnelApp(String),
    RemoveSplitTunnelApp(String),
}

impl SettingsChange {
    /// Key used to block the originating control while the call is in flight.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RelaySettings(_) => "relay-settings",
            Self::BridgeState(_) => "bridge-state",
            Self::BridgeSettings(_) => "bridge-settings",
            Self::DnsOptions(_) => "dns-options",
            Self::AllowLan(_) => "allow-lan",
            Self::AutoConnect(_) => "auto-connect",
            Self::BlockWhenDisconnected(_) => "block-when-disconnected",
            Self::EnableIpv6(_) => "enable-ipv6",
            Self::ShowBetaReleases(_) => "show-beta-releases",
            Self::OpenVpnMssfix(_) => "openvpn-mssfix",
            Self::WireguardMtu(_) => "wireguard-mtu",
            Self::QuantumResistant(_) => "quantum-resistant",
            Self::Obfuscation(_) => "obfuscation",
            Self::EnableDaita(_) => "enable-daita",
            Self::DaitaDirectOnly(_) => "daita-direct-only",
            Self::SplitTunnelState(_) => "split-tunnel-state",
            Self::AddSplitTunnelApp(_) => "add-split-tunnel-app",
            Self::RemoveSplitTunnelApp(_) => "remove-split-tunnel-app",
        }
    }

    pub fn apply(&self, daemon: &dyn Daemon) -> Result<(), DaemonError> {
        match self {
            Self::RelaySettings(update) => daemon.update_relay_settings(update),
            Self::BridgeState(state) => daemon.set_bridge_state(*state),
            Self::BridgeSettings(settings) => daemon.set_bridge_settings(settings),
            Self::DnsOptions(options) => daemon.set_dns_options(options),
            Self::AllowLan(allow) => daemon.set_allow_lan(*allow),
            Self::AutoConnect(auto_connect) => daemon.set_auto_connect(*auto_connect),
            Self::BlockWhenDisconnected(block) => daemon.set_block_when_disconnected(*block),
            Self::EnableIpv6(enable) => daemon.set_enable_ipv6(*enable),
            Self::ShowBetaReleases(show) => daemon.set_show_beta_releases(*show),
            Self::OpenVpnMssfix(mssfix) => daemon.set_openvpn_mssfix(*mssfix),
            Self::WireguardMtu(mtu) => daemon.set_wireguard_mtu(*mtu),
            Self::QuantumResistant(enabled) => daemon.set_wireguard_quantum_resistant(*enabled),
            Self::Obfuscation(settings) => daemon.set_obfuscation_settings(settings),
            Self::EnableDaita(enable) => daemon.set_enable_daita(*enable),
            Self::DaitaDirectOnly(direct_only) => daemon.set_daita_direct_only(*direct_only),
            Self::SplitTunnelState(enabled) => daemon.set_split_tunnel_state(*enabled),
            Self::AddSplitTunnelApp(path) => daemon.add_split_tunneling_application(path),
            Self::RemoveSplitTunnelApp(path) => daemon.remove_split_tunneling_application(path),
        }
    }
}

// Numeric fields

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumericRange {
    pub min: u16,
    pub max: u16,
}

pub const MSSFIX_RANGE: NumericRange = NumericRange {
    min: 1000,
    max: 1450,
};
pub const MTU_RANGE: NumericRange = NumericRange {
    min: 1280,
    max: 1420,
};

pub fn strip_non_digits(text: &str) -> String {
    text.chars()
        .filter(|character| character.is_ascii_digit())
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericValue {
    /// Empty input, the daemon picks the value.
    Default,
    Valid(u16),
    Invalid,
}

impl NumericValue {
    pub fn parse(text: &str, range: NumericRange) -> Self {
        if text.is_empty() {
            return Self::Default;
        }
        match text.parse::<u16>() {
            Ok(value) if (range.min..=range.max).contains(&value) => Self::Valid(value),
            _ => Self::Invalid,
        }
    }

    pub fn as_setting(self) -> Option<Option<u16>> {
        match self {
            Self::Default => Some(None),
            Self::Valid(value) => Some(Some(value)),
            Self::Invalid => None,
        }
    }
}

/// Text state of an optional numeric setting such as mssfix or MTU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericField {
    pub text: String,
    pub range: NumericRange,
    saved: Option<u16>,
}

impl NumericField {
    pub fn new(range: NumericRange, saved: Option<u16>) -> Self {
        Self {
            text: saved.map(|value| value.to_string()).unwrap_or_default(),
            range,
            saved,
        }
    }

    /// Keystrokes only ever leave digits in the field.
    pub fn set_text(&mut self, text: &str) {
        self.text = strip_non_digits(text);
    }

    pub fn value(&self) -> NumericValue {
        NumericValue::parse(&self.text, self.range)
    }

    pub fn is_valid(&self) -> bool {
        self.value() != NumericValue::Invalid
    }

    /// The value to submit when the field is valid and differs from what the daemon has.
    /// The saved value only moves once the daemon accepted it.
    pub fn commit(&self) -> Option<Option<u16>> {
        let value = self.value().as_setting()?;
        (value != self.saved).then_some(value)
    }

    pub fn mark_saved(&mut self, value: Option<u16>) {
        self.saved = value;
    }

    /// Daemon pushed new settings; show them unless the user is mid-edit. Returns whether
    /// the text changed and the input needs to be refilled.
    pub fn sync(&mut self, saved: Option<u16>, editing: bool) -> bool {
        self.saved = saved;
        if editing {
            return false;
        }
        let text = saved.map(|value| value.to_string()).unwrap_or_default();
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }

    pub fn placeholder(&self) -> String {
        "Default".into()
    }

    pub fn footer(&self) -> String {
        format!("Set value (valid range: {} - {}).", self.range.min, self.range.max)
    }
}

// Confirmation gates

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    LockdownMode,
    Multihop,
    BridgeMode,
    DisableSmartRouting,
}

impl Confirmation {
    pub fn message(&self) -> &'static str {
        match self {
            Self::LockdownMode => {
                "Attention: enabling this will always require a VPN connection in order to reach the internet. The app's built-in kill switch is always on. This setting will additionally block the internet if clicking Disconnect or Quit."
            }
            Self::Multihop => {
                "Multihop routes your traffic into one WireGuard server and out another, making it harder to trace. This results in increased latency but increases anonymity online."
            }
            Self::BridgeMode => {
                "This setting increases latency. Use only if needed. It works by performing an extra hop via a bridge server before reaching the VPN server."
            }
            Self::DisableSmartRouting => {
                "Not all our servers are DAITA-enabled. Without smart routing, DAITA can only be used when connecting directly to a DAITA-enabled server and other servers will be hidden from the location list."
            }
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            Self::LockdownMode | Self::Multihop | Self::BridgeMode => "Enable anyway",
            Self::DisableSmartRouting => "Disable anyway",
        }
    }
}

/// Changes that need an explicit second step before being sent.
pub fn needs_confirmation(change: &SettingsChange, settings: &Settings) -> Option<Confirmation> {
    match change {
        SettingsChange::BlockWhenDisconnected(true) if !settings.block_when_disconnected => {
            Some(Confirmation::LockdownMode)
        }
        SettingsChange::BridgeState(BridgeState::On) if settings.bridge_state != BridgeState::On => {
            Some(Confirmation::BridgeMode)
        }
        SettingsChange::DaitaDirectOnly(true) if !settings.daita_direct_only() => {
            Some(Confirmation::DisableSmartRouting)
        }
        SettingsChange::RelaySettings(RelaySettingsUpdate {
            wireguard_constraints: Some(constraints),
            ..
        }) if constraints.use_multihop && !settings.multihop_enabled() => {
            Some(Confirmation::Multihop)
        }
        _ => None,
    }
}

/// Holds a change back until the user confirms it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfirmationGate {
    pending: Option<(Confirmation, SettingsChange)>,
}

impl ConfirmationGate {
    /// Returns the change to send now, or parks it behind a confirmation dialog.
    pub fn request(&mut self, change: SettingsChange, settings: &Settings) -> Option<SettingsChange> {
        match needs_confirmation(&change, settings) {
            Some(confirmation) => {
                self.pending = Some((confirmation, change));
                None
            }
            None => Some(change),
        }
    }

    pub fn pending(&self) -> Option<Confirmation> {
        self.pending.as_ref().map(|(confirmation, _)| *confirmation)
    }

    pub fn confirm(&mut self) -> Option<SettingsChange> {
        self.pending.take().map(|(_, change)| change)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

// Availability

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    BridgeMode,
    Multihop,
    Daita,
    QuantumResistance,
    Obfuscation,
}

pub fn feature_available(feature: Feature, settings: &Settings) -> bool {
    let wireguard = settings.tunnel_protocol() == TunnelProtocol::Wireguard;
    match feature {
        Feature::BridgeMode => {
            !wireguard
                && settings.normal_relay_settings().is_some_and(|relay_settings| {
                    relay_settings.openvpn_constraints.protocol
                        != Constraint::Only(TransportProtocol::Udp)
                })
        }
        Feature::Multihop
        | Feature::Daita
        | Feature::QuantumResistance
        | Feature::Obfuscation => wireguard,
    }
}

/// Explanation rendered under a control that cannot be used with the current settings.
pub fn unavailable_footer(feature: Feature, settings: &Settings) -> Option<&'static str> {
    if feature_available(feature, settings) {
        return None;
    }
    Some(match feature {
        Feature::BridgeMode if settings.tunnel_protocol() == TunnelProtocol::Wireguard => {
            "Switch to \"OpenVPN\" in \"Tunnel protocol\" to enable bridge mode."
        }
        Feature::BridgeMode => "To activate bridge mode, change \"Transport protocol\" to \"Automatic\" or \"TCP\".",
        Feature::Multihop => "Switch to \"WireGuard\" in \"Tunnel protocol\" to make multihop available.",
        Feature::Daita => "Switch to \"WireGuard\" in \"Tunnel protocol\" to make DAITA available.",
        Feature::QuantumResistance => {
            "Switch to \"WireGuard\" in \"Tunnel protocol\" to make quantum resistance available."
        }
        Feature::Obfuscation => {
            "Switch to \"WireGuard\" in \"Tunnel protocol\" to make obfuscation available."
        }
    })
}

pub(crate) fn relay_settings_or_default(settings: &Settings) -> NormalRelaySettings {
    settings.normal_relay_settings().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::RecordingDaemon;
    use pretty_assertions::assert_eq;

    fn openvpn_settings(protocol: Constraint<TransportProtocol>) -> Settings {
        Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                tunnel_protocol: TunnelProtocol::Openvpn,
                openvpn_constraints: OpenVpnConstraints {
                    port: Constraint::Any,
                    protocol,
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn numeric_input_strips_non_digits_and_checks_range() {
        let mut field = NumericField::new(MTU_RANGE, None);
        field.set_text("13a9x0");
        assert_eq!(field.text, "1390");
        assert_eq!(field.value(), NumericValue::Valid(1390));
        field.set_text("1279");
        assert_eq!(field.value(), NumericValue::Invalid);
        field.set_text("1421");
        assert_eq!(field.value(), NumericValue::Invalid);
        field.set_text("");
        assert_eq!(field.value(), NumericValue::Default);
        field.set_text("99999999");
        assert_eq!(field.value(), NumericValue::Invalid);
    }

    #[test]
    fn unchanged_value_is_not_committed() {
        let mut field = NumericField::new(MSSFIX_RANGE, Some(1400));
        assert_eq!(field.commit(), None);
        field.set_text("");
        assert_eq!(field.commit(), Some(None));
        assert_eq!(field.commit(), Some(None));
        field.mark_saved(None);
        assert_eq!(field.commit(), None);
    }

    #[test]
    fn sync_keeps_text_while_editing() {
        let mut field = NumericField::new(MTU_RANGE, None);
        field.set_text("13");
        assert!(!field.sync(Some(1300), true));
        assert_eq!(field.text, "13");
        assert!(field.sync(Some(1300), false));
        assert_eq!(field.text, "1300");
        assert!(!field.sync(Some(1300), false));
    }

    #[test]
    fn lockdown_waits_for_confirmation() {
        let settings = Settings::default();
        let mut gate = ConfirmationGate::default();
        assert_eq!(
            gate.request(SettingsChange::BlockWhenDisconnected(true), &settings),
            None
        );
        assert_eq!(gate.pending(), Some(Confirmation::LockdownMode));
        assert_eq!(
            gate.confirm(),
            Some(SettingsChange::BlockWhenDisconnected(true))
        );
        assert_eq!(gate.pending(), None);
        assert_eq!(
            gate.request(SettingsChange::BlockWhenDisconnected(false), &settings),
            Some(SettingsChange::BlockWhenDisconnected(false))
        );
    }

    #[test]
    fn cancelled_confirmation_sends_nothing() {
        let mut gate = ConfirmationGate::default();
        gate.request(SettingsChange::BridgeState(BridgeState::On), &Settings::default());
        gate.cancel();
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn enabling_multihop_and_disabling_smart_routing_need_confirmation() {
        let settings = Settings::default();
        let multihop = SettingsChange::RelaySettings(RelaySettingsUpdate {
            wireguard_constraints: Some(WireguardConstraints {
                use_multihop: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            needs_confirmation(&multihop, &settings),
            Some(Confirmation::Multihop)
        );
        assert_eq!(
            needs_confirmation(&SettingsChange::DaitaDirectOnly(true), &settings),
            Some(Confirmation::DisableSmartRouting)
        );
        assert_eq!(
            needs_confirmation(&SettingsChange::DaitaDirectOnly(false), &settings),
            None
        );
    }

    #[test]
    fn bridge_mode_requires_openvpn_without_udp() {
        assert!(!feature_available(Feature::BridgeMode, &Settings::default()));
        assert!(feature_available(
            Feature::BridgeMode,
            &openvpn_settings(Constraint::Any)
        ));
        let udp = openvpn_settings(Constraint::Only(TransportProtocol::Udp));
        assert!(!feature_available(Feature::BridgeMode, &udp));
        assert!(unavailable_footer(Feature::BridgeMode, &udp).is_some());
    }

    #[test]
    fn wireguard_only_features_are_unavailable_for_openvpn() {
        let settings = openvpn_settings(Constraint::Any);
        for feature in [
            Feature::Multihop,
            Feature::Daita,
            Feature::QuantumResistance,
            Feature::Obfuscation,
        ] {
            assert!(!feature_available(feature, &settings));
            assert!(feature_available(feature, &Settings::default()));
        }
    }

    #[test]
    fn each_change_calls_one_setter() {
        let daemon = RecordingDaemon::default();
        SettingsChange::AllowLan(true).apply(&daemon).unwrap();
        SettingsChange::WireguardMtu(Some(1380)).apply(&daemon).unwrap();
        assert_eq!(
            daemon.calls(),
            vec![
                "set_allow_lan(true)".to_string(),
                "set_wireguard_mtu(Some(1380))".to_string(),
            ]
        );
    }
}
