use super::{Feature, SettingsChange, feature_available};
use crate::daemon::types::*;

/// Smart routing is the inverse of the daemon's direct-only flag.
pub fn smart_routing_enabled(settings: &Settings) -> bool {
    !settings.daita_direct_only()
}

pub fn set_enabled(enabled: bool) -> SettingsChange {
    SettingsChange::EnableDaita(enabled)
}

pub fn set_smart_routing(enabled: bool) -> SettingsChange {
    SettingsChange::DaitaDirectOnly(!enabled)
}

/// Smart routing is only meaningful while DAITA itself is on.
pub fn smart_routing_editable(settings: &Settings) -> bool {
    feature_available(Feature::Daita, settings) && settings.daita_enabled()
}

pub fn description() -> [&'static str; 2] {
    [
        "DAITA (Defense against AI-guided Traffic Analysis) hides patterns in your encrypted VPN traffic.",
        "By using sophisticated AI it is possible to analyze the traffic of data packets going in and out of your device, even if the traffic is encrypted.",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Confirmation, needs_confirmation};

    #[test]
    fn turning_smart_routing_off_needs_confirmation() {
        let mut settings = Settings::default();
        settings.tunnel_options.wireguard.daita.enable_daita = true;
        assert!(smart_routing_enabled(&settings));
        assert!(smart_routing_editable(&settings));
        let change = set_smart_routing(false);
        assert_eq!(change, SettingsChange::DaitaDirectOnly(true));
        assert_eq!(
            needs_confirmation(&change, &settings),
            Some(Confirmation::DisableSmartRouting)
        );
    }

    #[test]
    fn smart_routing_is_locked_while_daita_is_off() {
        assert!(!smart_routing_editable(&Settings::default()));
    }
}
