use super::{MSSFIX_RANGE, NumericField, SettingsChange, relay_settings_or_default};
use crate::daemon::{Daemon, DaemonError, types::*};

pub const UDP_PORTS: &[u16] = &[1194, 1195, 1196, 1197, 1300, 1301, 1302];
pub const TCP_PORTS: &[u16] = &[80, 443];

pub fn port_presets(protocol: TransportProtocol) -> &'static [u16] {
    match protocol {
        TransportProtocol::Udp => UDP_PORTS,
        TransportProtocol::Tcp => TCP_PORTS,
    }
}

/// Port choices shown for the selected transport; none when the transport is automatic.
pub fn port_options(settings: &Settings) -> Vec<Constraint<u16>> {
    let relay_settings = relay_settings_or_default(settings);
    let Some(protocol) = relay_settings.openvpn_constraints.protocol.lift() else {
        return Vec::new();
    };
    std::iter::once(Constraint::Any)
        .chain(port_presets(*protocol).iter().copied().map(Constraint::Only))
        .collect()
}

/// Changing transport resets the port, since presets differ per transport.
pub fn set_transport_protocol(protocol: Constraint<TransportProtocol>) -> SettingsChange {
    SettingsChange::RelaySettings(RelaySettingsUpdate {
        openvpn_constraints: Some(OpenVpnConstraints {
            port: Constraint::Any,
            protocol,
        }),
        ..Default::default()
    })
}

pub fn set_port(settings: &Settings, port: Constraint<u16>) -> SettingsChange {
    let relay_settings = relay_settings_or_default(settings);
    SettingsChange::RelaySettings(RelaySettingsUpdate {
        openvpn_constraints: Some(OpenVpnConstraints {
            port,
            protocol: relay_settings.openvpn_constraints.protocol,
        }),
        ..Default::default()
    })
}

pub fn set_bridge_state(state: BridgeState) -> SettingsChange {
    SettingsChange::BridgeState(state)
}

/// Form state of the OpenVPN settings page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenVpnForm {
    pub mssfix: NumericField,
}

impl OpenVpnForm {
    pub fn new(settings: &Settings) -> Self {
        Self {
            mssfix: NumericField::new(MSSFIX_RANGE, settings.tunnel_options.openvpn.mssfix),
        }
    }

    pub fn set_mssfix_text(&mut self, text: &str) {
        self.mssfix.set_text(text);
    }

    /// The change for the mssfix field, or nothing when the value is invalid or unchanged.
    pub fn mssfix_change(&self) -> Option<SettingsChange> {
        self.mssfix.commit().map(SettingsChange::OpenVpnMssfix)
    }

    /// Validates and submits the mssfix field. Invalid input is never sent, and a rejected
    /// value is sent again on the next submit.
    pub fn submit_mssfix(&mut self, daemon: &dyn Daemon) -> Result<bool, DaemonError> {
        let Some(value) = self.mssfix.commit() else {
            return Ok(false);
        };
        SettingsChange::OpenVpnMssfix(value).apply(daemon)?;
        self.mssfix.mark_saved(value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::RecordingDaemon;
    use crate::settings::NumericValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn out_of_range_mssfix_is_not_submitted() {
        let daemon = RecordingDaemon::default();
        let mut form = OpenVpnForm::new(&Settings::default());
        form.set_mssfix_text("999");
        assert_eq!(form.mssfix.value(), NumericValue::Invalid);
        assert_eq!(form.submit_mssfix(&daemon), Ok(false));
        assert!(daemon.calls().is_empty());
    }

    #[test]
    fn valid_mssfix_calls_the_setter() {
        let daemon = RecordingDaemon::default();
        let mut form = OpenVpnForm::new(&Settings::default());
        form.set_mssfix_text("1450");
        assert!(form.mssfix.is_valid());
        assert_eq!(form.submit_mssfix(&daemon), Ok(true));
        assert_eq!(daemon.calls(), vec!["set_openvpn_mssfix(Some(1450))".to_string()]);
    }

    #[test]
    fn rejected_mssfix_is_retried() {
        let daemon = RecordingDaemon::failing(DaemonError::Communication);
        let mut form = OpenVpnForm::new(&Settings::default());
        form.set_mssfix_text("1400");
        assert_eq!(form.submit_mssfix(&daemon), Err(DaemonError::Communication));

        *daemon.failure.lock().unwrap() = None;
        assert_eq!(form.submit_mssfix(&daemon), Ok(true));
        assert_eq!(
            daemon.calls(),
            vec![
                "set_openvpn_mssfix(Some(1400))".to_string(),
                "set_openvpn_mssfix(Some(1400))".to_string(),
            ]
        );
        assert_eq!(form.submit_mssfix(&daemon), Ok(false));
        assert_eq!(daemon.calls().len(), 2);
    }

    #[test]
    fn port_options_follow_transport() {
        assert!(port_options(&Settings::default()).is_empty());
        let mut settings = Settings::default();
        if let RelaySettings::Normal(relay_settings) = &mut settings.relay_settings {
            relay_settings.openvpn_constraints.protocol = Constraint::Only(TransportProtocol::Tcp);
        }
        assert_eq!(
            port_options(&settings),
            vec![Constraint::Any, Constraint::Only(80), Constraint::Only(443)]
        );
    }

    #[test]
    fn changing_transport_resets_port() {
        assert_eq!(
            set_transport_protocol(Constraint::Only(TransportProtocol::Udp)),
            SettingsChange::RelaySettings(RelaySettingsUpdate {
                openvpn_constraints: Some(OpenVpnConstraints {
                    port: Constraint::Any,
                    protocol: Constraint::Only(TransportProtocol::Udp),
                }),
                ..Default::default()
            })
        );
    }
}
