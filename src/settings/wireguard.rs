use super::{MTU_RANGE, NumericField, SettingsChange, relay_settings_or_default, strip_non_digits};
use crate::daemon::types::*;

pub const PORT_PRESETS: &[u16] = &[51820, 53];
pub const UDP2TCP_PORTS: &[u16] = &[80, 5001];

pub fn port_in_ranges(port: u16, ranges: &[(u16, u16)]) -> bool {
    ranges
        .iter()
        .any(|(low, high)| (*low..=*high).contains(&port))
}

pub fn format_ranges(ranges: &[(u16, u16)]) -> String {
    ranges
        .iter()
        .map(|(low, high)| {
            if low == high {
                low.to_string()
            } else {
                format!("{low}-{high}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text field for a port that must fall inside one of the relay list's ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomPortField {
    pub text: String,
}

impl CustomPortField {
    /// Saved ports that are not presets populate the custom field.
    pub fn new(saved: &Constraint<u16>, presets: &[u16]) -> Self {
        let text = match saved.lift() {
            Some(port) if !presets.contains(port) => port.to_string(),
            _ => String::new(),
        };
        Self { text }
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = strip_non_digits(text);
    }

    pub fn parse(&self, ranges: &[(u16, u16)]) -> Result<u16, String> {
        let Ok(port) = self.text.parse::<u16>() else {
            return Err("Enter a port number".into());
        };
        if !port_in_ranges(port, ranges) {
            return Err(format!("Valid ranges: {}", format_ranges(ranges)));
        }
        Ok(port)
    }
}

fn wireguard_change(
    settings: &Settings,
    update: impl FnOnce(&mut WireguardConstraints),
) -> SettingsChange {
    let mut constraints = relay_settings_or_default(settings).wireguard_constraints;
    update(&mut constraints);
    SettingsChange::RelaySettings(RelaySettingsUpdate {
        wireguard_constraints: Some(constraints),
        ..Default::default()
    })
}

pub fn set_port(settings: &Settings, port: Constraint<u16>) -> SettingsChange {
    wireguard_change(settings, |constraints| constraints.port = port)
}

pub fn set_ip_version(settings: &Settings, ip_version: Constraint<IpVersion>) -> SettingsChange {
    wireguard_change(settings, |constraints| constraints.ip_version = ip_version)
}

pub fn set_multihop(settings: &Settings, enabled: bool) -> SettingsChange {
    wireguard_change(settings, |constraints| constraints.use_multihop = enabled)
}

pub fn set_quantum_resistant(value: Option<bool>) -> SettingsChange {
    SettingsChange::QuantumResistant(value)
}

pub fn quantum_resistant_label(value: Option<bool>) -> &'static str {
    match value {
        None => "Automatic",
        Some(true) => "On",
        Some(false) => "Off",
    }
}

pub fn set_obfuscation(settings: &Settings, selected: ObfuscationType) -> SettingsChange {
    SettingsChange::Obfuscation(ObfuscationSettings {
        selected,
        ..settings.obfuscation_settings.clone()
    })
}

pub fn set_udp2tcp_port(settings: &Settings, port: Constraint<u16>) -> SettingsChange {
    SettingsChange::Obfuscation(ObfuscationSettings {
        udp2tcp_port: port,
        ..settings.obfuscation_settings.clone()
    })
}

pub fn set_shadowsocks_port(settings: &Settings, port: Constraint<u16>) -> SettingsChange {
    SettingsChange::Obfuscation(ObfuscationSettings {
        shadowsocks_port: port,
        ..settings.obfuscation_settings.clone()
    })
}

/// Form state of the WireGuard settings page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireguardForm {
    pub mtu: NumericField,
    pub custom_port: CustomPortField,
    pub custom_port_error: Option<String>,
    pub shadowsocks_port: CustomPortField,
    pub shadowsocks_port_error: Option<String>,
}

impl WireguardForm {
    pub fn new(settings: &Settings) -> Self {
        let relay_settings = relay_settings_or_default(settings);
        Self {
            mtu: NumericField::new(MTU_RANGE, settings.tunnel_options.wireguard.mtu),
            custom_port: CustomPortField::new(
                &relay_settings.wireguard_constraints.port,
                PORT_PRESETS,
            ),
            custom_port_error: None,
            shadowsocks_port: CustomPortField::new(
                &settings.obfuscation_settings.shadowsocks_port,
                &[],
            ),
            shadowsocks_port_error: None,
        }
    }

    pub fn mtu_change(&self) -> Option<SettingsChange> {
        self.mtu.commit().map(SettingsChange::WireguardMtu)
    }

    pub fn custom_port_change(
        &mut self,
        settings: &Settings,
        relay_list: &RelayList,
    ) -> Option<SettingsChange> {
        match self.custom_port.parse(&relay_list.wireguard.port_ranges) {
            Ok(port) => {
                self.custom_port_error = None;
                Some(set_port(settings, Constraint::Only(port)))
            }
            Err(error) => {
                self.custom_port_error = Some(error);
                None
            }
        }
    }

    pub fn shadowsocks_port_change(
        &mut self,
        settings: &Settings,
        relay_list: &RelayList,
    ) -> Option<SettingsChange> {
        match self
            .shadowsocks_port
            .parse(&relay_list.wireguard.shadowsocks_port_ranges)
        {
            Ok(port) => {
                self.shadowsocks_port_error = None;
                Some(set_shadowsocks_port(settings, Constraint::Only(port)))
            }
            Err(error) => {
                self.shadowsocks_port_error = Some(error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn relay_list() -> RelayList {
        RelayList {
            countries: Vec::new(),
            wireguard: WireguardEndpointData {
                port_ranges: vec![(53, 53), (4000, 33433), (51820, 51820)],
                udp2tcp_ports: vec![80, 5001],
                shadowsocks_port_ranges: vec![(51900, 51949)],
            },
        }
    }

    #[test]
    fn custom_port_must_be_in_allowed_ranges() {
        let mut form = WireguardForm::new(&Settings::default());
        form.custom_port.set_text("4001");
        let change = form.custom_port_change(&Settings::default(), &relay_list());
        let Some(SettingsChange::RelaySettings(update)) = change else {
            panic!("expected relay settings change");
        };
        assert_eq!(
            update.wireguard_constraints.map(|constraints| constraints.port),
            Some(Constraint::Only(4001))
        );

        form.custom_port.set_text("100");
        assert_eq!(form.custom_port_change(&Settings::default(), &relay_list()), None);
        assert_eq!(
            form.custom_port_error.as_deref(),
            Some("Valid ranges: 53, 4000-33433, 51820")
        );
    }

    #[test]
    fn preset_ports_do_not_fill_custom_field() {
        assert_eq!(CustomPortField::new(&Constraint::Only(53), PORT_PRESETS).text, "");
        assert_eq!(
            CustomPortField::new(&Constraint::Only(5000), PORT_PRESETS).text,
            "5000"
        );
    }

    #[test]
    fn multihop_change_keeps_other_constraints() {
        let mut settings = Settings::default();
        if let RelaySettings::Normal(relay_settings) = &mut settings.relay_settings {
            relay_settings.wireguard_constraints.port = Constraint::Only(53);
        }
        let SettingsChange::RelaySettings(update) = set_multihop(&settings, true) else {
            panic!("expected relay settings change");
        };
        let constraints = update.wireguard_constraints.unwrap();
        assert!(constraints.use_multihop);
        assert_eq!(constraints.port, Constraint::Only(53));
    }

    #[test]
    fn obfuscation_change_keeps_ports() {
        let mut settings = Settings::default();
        settings.obfuscation_settings.udp2tcp_port = Constraint::Only(80);
        assert_eq!(
            set_obfuscation(&settings, ObfuscationType::Udp2Tcp),
            SettingsChange::Obfuscation(ObfuscationSettings {
                selected: ObfuscationType::Udp2Tcp,
                udp2tcp_port: Constraint::Only(80),
                shadowsocks_port: Constraint::Any,
            })
        );
    }
}
