use crate::{
    daemon::{Daemon, DaemonError, types::*},
    theme::{COLOR_GREEN, COLOR_RED, TEXT_WHITE},
};

/// Headline above the location name on the main view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecuredLabel {
    Secured,
    Securing,
    Unsecured,
    Unsecuring,
    Blocked,
    FailedToSecure,
}

impl SecuredLabel {
    pub fn for_state(tunnel_state: &TunnelState, block_when_disconnected: bool) -> Self {
        match tunnel_state {
            TunnelState::Connected { .. } => Self::Secured,
            TunnelState::Connecting { .. } => Self::Securing,
            TunnelState::Disconnecting(AfterDisconnect::Reconnect) => Self::Securing,
            TunnelState::Disconnecting(AfterDisconnect::Block) => Self::Blocked,
            TunnelState::Disconnecting(AfterDisconnect::Nothing) => Self::Unsecuring,
            TunnelState::Disconnected { .. } if block_when_disconnected => Self::Blocked,
            TunnelState::Disconnected { .. } => Self::Unsecured,
            TunnelState::Error(error) if error.blocking_error.is_some() => Self::FailedToSecure,
            TunnelState::Error(_) => Self::Blocked,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Secured => "CONNECTED",
            Self::Securing => "CONNECTING...",
            Self::Unsecured => "DISCONNECTED",
            Self::Unsecuring => "DISCONNECTING...",
            Self::Blocked => "BLOCKED CONNECTION",
            Self::FailedToSecure => "FAILED TO SECURE CONNECTION",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Self::Secured | Self::Blocked => COLOR_GREEN,
            Self::Securing | Self::Unsecuring => TEXT_WHITE,
            Self::Unsecured | Self::FailedToSecure => COLOR_RED,
        }
    }

    /// The map marker shows a secure pin for every state that keeps traffic inside the
    /// tunnel or blocked.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Secured | Self::Blocked)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunnelCommand {
    Connect,
    Disconnect,
    Reconnect,
}

impl TunnelCommand {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Connect => "tunnel-connect",
            Self::Disconnect => "tunnel-disconnect",
            Self::Reconnect => "tunnel-reconnect",
        }
    }

    pub fn run(&self, daemon: &dyn Daemon) -> Result<bool, DaemonError> {
        match self {
            Self::Connect => daemon.connect_tunnel(),
            Self::Disconnect => daemon.disconnect_tunnel(),
            Self::Reconnect => daemon.reconnect_tunnel(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonStyle {
    Success,
    Destructive,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TunnelControls {
    pub primary_label: &'static str,
    pub primary: TunnelCommand,
    pub primary_style: ButtonStyle,
    pub show_reconnect: bool,
    pub switch_location_label: &'static str,
}

impl TunnelControls {
    pub fn for_state(tunnel_state: &TunnelState) -> Self {
        match tunnel_state {
            TunnelState::Disconnected { .. } | TunnelState::Disconnecting(_) => Self {
                primary_label: "Connect",
                primary: TunnelCommand::Connect,
                primary_style: ButtonStyle::Success,
                show_reconnect: false,
                switch_location_label: "Select location",
            },
            TunnelState::Connecting { .. } => Self {
                primary_label: "Cancel",
                primary: TunnelCommand::Disconnect,
                primary_style: ButtonStyle::Destructive,
                show_reconnect: true,
                switch_location_label: "Switch location",
            },
            TunnelState::Connected { .. } => Self {
                primary_label: "Disconnect",
                primary: TunnelCommand::Disconnect,
                primary_style: ButtonStyle::Destructive,
                show_reconnect: true,
                switch_location_label: "Switch location",
            },
            TunnelState::Error(error) => Self {
                primary_label: if error.blocking_error.is_some() {
                    "Dismiss"
                } else {
                    "Cancel"
                },
                primary: TunnelCommand::Disconnect,
                primary_style: ButtonStyle::Destructive,
                show_reconnect: true,
                switch_location_label: "Switch location",
            },
        }
    }
}

/// Feature chips shown under the connection details, de-duplicated by label.
pub fn feature_labels(tunnel_state: &TunnelState) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = Vec::new();
    for indicator in tunnel_state.feature_indicators() {
        let label = indicator.label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

pub fn protocol_line(endpoint: &TunnelEndpoint) -> String {
    let mut line = format!(
        "{} {}",
        endpoint.tunnel_type.label(),
        endpoint.protocol.label()
    );
    if let Some(obfuscation) = &endpoint.obfuscation {
        line.push_str(&format!(" via {}", obfuscation_label(&obfuscation.obfuscation_type)));
    } else if let Some(proxy) = &endpoint.proxy {
        line.push_str(&format!(" via {}", proxy.proxy_type));
    }
    line
}

fn obfuscation_label(obfuscation_type: &str) -> &str {
    match obfuscation_type {
        "udp2tcp" => "UDP-over-TCP",
        "shadowsocks" => "Shadowsocks",
        other => other,
    }
}

/// The address the client actually dials, which is the first hop when traffic is
/// obfuscated, proxied or routed through an entry relay.
pub fn in_address(endpoint: &TunnelEndpoint) -> String {
    if let Some(obfuscation) = &endpoint.obfuscation {
        return format!(
            "{}:{} {}",
            obfuscation.address,
            obfuscation.port,
            obfuscation.protocol.label()
        );
    }
    if let Some(proxy) = &endpoint.proxy {
        return format!("{} {}", proxy.address, proxy.protocol.label());
    }
    if let Some(entry) = &endpoint.entry_endpoint {
        return format!("{} {}", entry.address, entry.transport_protocol.label());
    }
    format!("{} {}", endpoint.address, endpoint.protocol.label())
}

pub fn out_addresses(location: Option<&GeoLocation>) -> Vec<String> {
    let Some(location) = location else {
        return Vec::new();
    };
    location
        .ipv4
        .iter()
        .chain(location.ipv6.iter())
        .cloned()
        .collect()
}

/// "se-got-wg-001 via se-sto-wg-002", listing the entry and obfuscation hops.
pub fn hostname_line(location: &GeoLocation) -> Option<String> {
    let hostname = location.hostname.as_deref()?;
    let via: Vec<&str> = location
        .entry_hostname
        .as_deref()
        .into_iter()
        .chain(location.obfuscator_hostname.as_deref())
        .collect();
    if via.is_empty() {
        Some(hostname.to_string())
    } else {
        Some(format!("{hostname} via {}", via.join(" via ")))
    }
}

pub fn location_line(location: Option<&GeoLocation>) -> String {
    let Some(location) = location else {
        return String::new();
    };
    match &location.city {
        Some(city) => format!("{}, {city}", location.country),
        None => location.country.clone(),
    }
}

/// The geographic position that the view shows, from the tunnel when it has one and
/// otherwise from the disconnected location.
pub fn displayed_location(tunnel_state: &TunnelState) -> Option<&GeoLocation> {
    match tunnel_state {
        TunnelState::Disconnected { location } => location.as_ref(),
        other => other.details().and_then(|details| details.location.as_ref()),
    }
}

/// Rows of the expandable connection panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionPanel {
    pub expanded: bool,
}

impl ConnectionPanel {
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn rows(&self, tunnel_state: &TunnelState) -> Vec<(&'static str, String)> {
        let Some(details) = tunnel_state.details() else {
            return Vec::new();
        };
        let mut rows = vec![("Protocol", protocol_line(&details.endpoint))];
        if !self.expanded {
            return rows;
        }
        rows.push(("In", in_address(&details.endpoint)));
        for address in out_addresses(details.location.as_ref()) {
            rows.push(("Out", address));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn endpoint() -> TunnelEndpoint {
        TunnelEndpoint {
            address: "185.213.154.68:51820".into(),
            protocol: TransportProtocol::Udp,
            tunnel_type: TunnelProtocol::Wireguard,
            ..Default::default()
        }
    }

    fn location() -> GeoLocation {
        GeoLocation {
            ipv4: Some("185.213.154.70".into()),
            ipv6: Some("2a03:1b20::1".into()),
            country: "Sweden".into(),
            city: Some("Gothenburg".into()),
            hostname: Some("se-got-wg-001".into()),
            entry_hostname: Some("de-fra-wg-002".into()),
            ..Default::default()
        }
    }

    fn connected() -> TunnelState {
        TunnelState::Connected {
            details: TunnelStateDetails {
                endpoint: endpoint(),
                location: Some(location()),
            },
            feature_indicators: vec![
                FeatureIndicator::Udp2Tcp,
                FeatureIndicator::Shadowsocks,
                FeatureIndicator::Daita,
            ],
        }
    }

    #[test]
    fn labels_follow_tunnel_state() {
        assert_eq!(SecuredLabel::for_state(&connected(), false), SecuredLabel::Secured);
        assert_eq!(
            SecuredLabel::for_state(&TunnelState::default(), true),
            SecuredLabel::Blocked
        );
        let leaking = TunnelState::Error(ErrorState {
            cause: ErrorStateCause::StartTunnelError,
            blocking_error: Some(FirewallPolicyError::Generic),
        });
        assert_eq!(
            SecuredLabel::for_state(&leaking, false).text(),
            "FAILED TO SECURE CONNECTION"
        );
        assert!(!SecuredLabel::Unsecured.is_secure());
    }

    #[test]
    fn controls_offer_disconnect_while_connected() {
        let controls = TunnelControls::for_state(&connected());
        assert_eq!(controls.primary, TunnelCommand::Disconnect);
        assert!(controls.show_reconnect);
        let controls = TunnelControls::for_state(&TunnelState::default());
        assert_eq!(controls.primary, TunnelCommand::Connect);
        assert!(!controls.show_reconnect);
    }

    #[test]
    fn obfuscation_indicators_share_one_chip() {
        assert_eq!(feature_labels(&connected()), vec!["Obfuscation", "DAITA"]);
    }

    #[test]
    fn protocol_and_addresses() {
        assert_eq!(protocol_line(&endpoint()), "WireGuard UDP");
        assert_eq!(in_address(&endpoint()), "185.213.154.68:51820 UDP");
        let obfuscated = TunnelEndpoint {
            obfuscation: Some(ObfuscationEndpoint {
                address: "185.213.154.68".into(),
                port: 443,
                protocol: TransportProtocol::Tcp,
                obfuscation_type: "udp2tcp".into(),
            }),
            ..endpoint()
        };
        assert_eq!(protocol_line(&obfuscated), "WireGuard UDP via UDP-over-TCP");
        assert_eq!(in_address(&obfuscated), "185.213.154.68:443 TCP");
        assert_eq!(
            out_addresses(Some(&location())),
            vec!["185.213.154.70".to_string(), "2a03:1b20::1".to_string()]
        );
    }

    #[test]
    fn hostname_line_lists_entry_hop() {
        assert_eq!(
            hostname_line(&location()).as_deref(),
            Some("se-got-wg-001 via de-fra-wg-002")
        );
        assert_eq!(location_line(Some(&location())), "Sweden, Gothenburg");
    }

    #[test]
    fn collapsed_panel_shows_only_protocol() {
        let mut panel = ConnectionPanel::default();
        assert_eq!(panel.rows(&connected()).len(), 1);
        panel.toggle();
        assert_eq!(panel.rows(&connected()).len(), 4);
        assert!(panel.rows(&TunnelState::default()).is_empty());
    }

    #[test]
    fn commands_call_the_daemon() {
        let daemon = crate::daemon::testing::RecordingDaemon::default();
        TunnelCommand::Reconnect.run(&daemon).unwrap();
        assert_eq!(daemon.calls(), vec!["reconnect_tunnel".to_string()]);
    }
}
