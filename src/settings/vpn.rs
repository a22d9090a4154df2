use super::SettingsChange;
use crate::daemon::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnsBlocker {
    Ads,
    Trackers,
    Malware,
    Gambling,
    AdultContent,
    SocialMedia,
}

impl DnsBlocker {
    pub const ALL: [DnsBlocker; 6] = [
        Self::Ads,
        Self::Trackers,
        Self::Malware,
        Self::Gambling,
        Self::AdultContent,
        Self::SocialMedia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ads => "Ads",
            Self::Trackers => "Trackers",
            Self::Malware => "Malware",
            Self::Gambling => "Gambling",
            Self::AdultContent => "Adult content",
            Self::SocialMedia => "Social media",
        }
    }

    pub fn is_enabled(&self, options: &DefaultDnsOptions) -> bool {
        match self {
            Self::Ads => options.block_ads,
            Self::Trackers => options.block_trackers,
            Self::Malware => options.block_malware,
            Self::Gambling => options.block_gambling,
            Self::AdultContent => options.block_adult_content,
            Self::SocialMedia => options.block_social_media,
        }
    }

    fn set(&self, options: &mut DefaultDnsOptions, enabled: bool) {
        let flag = match self {
            Self::Ads => &mut options.block_ads,
            Self::Trackers => &mut options.block_trackers,
            Self::Malware => &mut options.block_malware,
            Self::Gambling => &mut options.block_gambling,
            Self::AdultContent => &mut options.block_adult_content,
            Self::SocialMedia => &mut options.block_social_media,
        };
        *flag = enabled;
    }
}

/// Content blockers only apply with the default resolver.
pub fn dns_blockers_available(settings: &Settings) -> bool {
    settings.tunnel_options.dns.state == DnsState::Default
}

pub fn set_dns_blocker(settings: &Settings, blocker: DnsBlocker, enabled: bool) -> SettingsChange {
    let mut options = settings.tunnel_options.dns.clone();
    blocker.set(&mut options.default_options, enabled);
    SettingsChange::DnsOptions(options)
}

pub fn enabled_blocker_count(settings: &Settings) -> usize {
    DnsBlocker::ALL
        .iter()
        .filter(|blocker| blocker.is_enabled(&settings.tunnel_options.dns.default_options))
        .count()
}

pub fn set_tunnel_protocol(protocol: TunnelProtocol) -> SettingsChange {
    SettingsChange::RelaySettings(RelaySettingsUpdate {
        tunnel_protocol: Some(protocol),
        ..Default::default()
    })
}

/// Settings that have to be turned off before OpenVPN can be picked.
pub fn openvpn_blockers(settings: &Settings) -> Vec<&'static str> {
    let mut blockers = Vec::new();
    if settings.multihop_enabled() {
        blockers.push("Multihop");
    }
    if settings.daita_enabled() {
        blockers.push("DAITA");
    }
    if settings.tunnel_options.wireguard.quantum_resistant == Some(true) {
        blockers.push("Quantum-resistant tunnel");
    }
    blockers
}

pub fn openvpn_footer(settings: &Settings) -> Option<String> {
    let blockers = openvpn_blockers(settings);
    if blockers.is_empty() {
        return None;
    }
    Some(format!(
        "To select OpenVPN, please disable these settings: {}.",
        blockers.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blocker_toggle_touches_one_flag() {
        let mut settings = Settings::default();
        settings.tunnel_options.dns.default_options.block_ads = true;
        let SettingsChange::DnsOptions(options) =
            set_dns_blocker(&settings, DnsBlocker::Malware, true)
        else {
            panic!("expected dns options");
        };
        assert!(options.default_options.block_ads);
        assert!(options.default_options.block_malware);
        assert!(!options.default_options.block_trackers);
    }

    #[test]
    fn custom_dns_disables_blockers() {
        let mut settings = Settings::default();
        assert!(dns_blockers_available(&settings));
        settings.tunnel_options.dns.state = DnsState::Custom;
        assert!(!dns_blockers_available(&settings));
    }

    #[test]
    fn openvpn_is_blocked_by_wireguard_features() {
        let mut settings = Settings::default();
        assert_eq!(openvpn_footer(&settings), None);
        settings.tunnel_options.wireguard.daita.enable_daita = true;
        settings.tunnel_options.wireguard.quantum_resistant = Some(true);
        assert_eq!(
            openvpn_footer(&settings).as_deref(),
            Some("To select OpenVPN, please disable these settings: DAITA, Quantum-resistant tunnel.")
        );
    }
}
