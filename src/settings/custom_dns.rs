use std::net::IpAddr;

use super::SettingsChange;
use crate::daemon::types::*;

/// Private addresses only work when the network interfaces are set up for them, which
/// the user has to confirm on these platforms.
pub const CONFIRM_LOCAL_ADDRESSES: bool = cfg!(any(target_os = "windows", target_os = "linux"));

pub const PUBLIC_ADDRESS_WARNING: &str = "The DNS server you want to add is public and will only work with WireGuard. To ensure that it always works, set the \"Tunnel protocol\" (in VPN settings) to WireGuard.";
pub const LOCAL_ADDRESS_WARNING: &str = "The DNS server you want to add is a private IP. You must ensure that your network interfaces are configured to use it.";

pub fn is_local(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(address) => {
            address.is_private() || address.is_loopback() || address.is_link_local()
        }
        IpAddr::V6(address) => {
            let first = address.segments()[0];
            address.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

/// The feature is locked while any default content blocker is on.
pub fn feature_available(settings: &Settings) -> bool {
    let dns = &settings.tunnel_options.dns;
    dns.state == DnsState::Custom || !dns.default_options.any_enabled()
}

pub fn footer(settings: &Settings) -> &'static str {
    if feature_available(settings) {
        "Enable to add at least one DNS server."
    } else {
        "Disable all \"DNS content blockers\" above to activate this setting."
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PendingEdit {
    Add,
    Replace(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingAddress {
    address: String,
    local: bool,
    edit: PendingEdit,
}

/// View state of the custom DNS section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomDnsForm {
    pub input_visible: bool,
    pub input: String,
    pub input_error: Option<String>,
    pub editing: Option<String>,
    pub edit_error: Option<String>,
    pub public_dns_ip_to_confirm: Option<String>,
    pub local_dns_ip_to_confirm: Option<String>,
    pending: Option<PendingAddress>,
}

impl CustomDnsForm {
    pub fn is_enabled(&self, settings: &Settings) -> bool {
        settings.tunnel_options.dns.state == DnsState::Custom || self.input_visible
    }

    pub fn list_expanded(&self, settings: &Settings) -> bool {
        feature_available(settings) && self.is_enabled(settings)
    }

    pub fn confirmation_message(&self) -> Option<&'static str> {
        if self.public_dns_ip_to_confirm.is_some() {
            Some(PUBLIC_ADDRESS_WARNING)
        } else if self.local_dns_ip_to_confirm.is_some() {
            Some(LOCAL_ADDRESS_WARNING)
        } else {
            None
        }
    }

    /// Switching on with no addresses only opens the input row.
    pub fn toggle(&mut self, settings: &Settings, enabled: bool) -> Option<SettingsChange> {
        let dns = &settings.tunnel_options.dns;
        if !enabled {
            self.input_visible = false;
            self.input_error = None;
        }
        if dns.custom_options.addresses.is_empty() {
            if enabled {
                self.input_visible = true;
            }
            return None;
        }
        Some(SettingsChange::DnsOptions(DnsOptions {
            state: if enabled {
                DnsState::Custom
            } else {
                DnsState::Default
            },
            ..dns.clone()
        }))
    }

    pub fn show_input(&mut self) {
        self.input_visible = true;
        self.input.clear();
        self.input_error = None;
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.trim().to_string();
        self.input_error = None;
    }

    /// Adds the typed address, or parks it for confirmation when it needs one.
    pub fn submit(&mut self, settings: &Settings) -> Option<SettingsChange> {
        let address = self.input.clone();
        let addresses = &settings.tunnel_options.dns.custom_options.addresses;
        if addresses.contains(&address) {
            self.input_error = Some("This address has already been entered".into());
            return None;
        }
        let Ok(parsed) = address.parse::<IpAddr>() else {
            self.input_error = Some("Invalid IP address".into());
            return None;
        };
        self.stage(
            settings,
            PendingAddress {
                address,
                local: is_local(&parsed),
                edit: PendingEdit::Add,
            },
        )
    }

    pub fn start_editing(&mut self, address: &str) {
        self.editing = Some(address.to_string());
        self.edit_error = None;
    }

    pub fn stop_editing(&mut self) {
        self.editing = None;
        self.edit_error = None;
    }

    /// Replaces the address being edited. Submitting the same text just closes the editor.
    pub fn submit_edit(&mut self, settings: &Settings, new_address: &str) -> Option<SettingsChange> {
        let old_address = self.editing.clone()?;
        let new_address = new_address.trim().to_string();
        if new_address == old_address {
            self.stop_editing();
            return None;
        }
        let addresses = &settings.tunnel_options.dns.custom_options.addresses;
        if addresses.contains(&new_address) {
            self.edit_error = Some("This address has already been entered".into());
            return None;
        }
        let Ok(parsed) = new_address.parse::<IpAddr>() else {
            self.edit_error = Some("Invalid IP address".into());
            return None;
        };
        self.stage(
            settings,
            PendingAddress {
                address: new_address,
                local: is_local(&parsed),
                edit: PendingEdit::Replace(old_address),
            },
        )
    }

    fn stage(&mut self, settings: &Settings, pending: PendingAddress) -> Option<SettingsChange> {
        if pending.local && !CONFIRM_LOCAL_ADDRESSES {
            return Some(self.commit(settings, pending));
        }
        if pending.local {
            self.local_dns_ip_to_confirm = Some(pending.address.clone());
        } else {
            self.public_dns_ip_to_confirm = Some(pending.address.clone());
        }
        self.pending = Some(pending);
        None
    }

    pub fn confirm(&mut self, settings: &Settings) -> Option<SettingsChange> {
        self.public_dns_ip_to_confirm = None;
        self.local_dns_ip_to_confirm = None;
        let pending = self.pending.take()?;
        Some(self.commit(settings, pending))
    }

    pub fn abort(&mut self) {
        self.public_dns_ip_to_confirm = None;
        self.local_dns_ip_to_confirm = None;
        self.pending = None;
    }

    fn commit(&mut self, settings: &Settings, pending: PendingAddress) -> SettingsChange {
        let dns = &settings.tunnel_options.dns;
        let mut addresses = dns.custom_options.addresses.clone();
        let state = match &pending.edit {
            PendingEdit::Add => {
                addresses.push(pending.address);
                let state = if dns.state == DnsState::Custom || self.input_visible {
                    DnsState::Custom
                } else {
                    DnsState::Default
                };
                self.input_visible = false;
                self.input.clear();
                state
            }
            PendingEdit::Replace(old_address) => {
                for address in addresses.iter_mut() {
                    if address == old_address {
                        *address = pending.address.clone();
                    }
                }
                self.stop_editing();
                dns.state
            }
        };
        SettingsChange::DnsOptions(DnsOptions {
            state,
            default_options: dns.default_options.clone(),
            custom_options: CustomDnsOptions { addresses },
        })
    }

    /// Removing the last address falls back to the default resolver.
    pub fn remove(&mut self, settings: &Settings, address: &str) -> SettingsChange {
        let dns = &settings.tunnel_options.dns;
        let addresses: Vec<String> = dns
            .custom_options
            .addresses
            .iter()
            .filter(|item| item.as_str() != address)
            .cloned()
            .collect();
        let state = if !addresses.is_empty() && dns.state == DnsState::Custom {
            DnsState::Custom
        } else {
            DnsState::Default
        };
        SettingsChange::DnsOptions(DnsOptions {
            state,
            default_options: dns.default_options.clone(),
            custom_options: CustomDnsOptions { addresses },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::RecordingDaemon;
    use pretty_assertions::assert_eq;

    fn custom(addresses: &[&str]) -> Settings {
        let mut settings = Settings::default();
        settings.tunnel_options.dns.state = DnsState::Custom;
        settings.tunnel_options.dns.custom_options.addresses =
            addresses.iter().map(|address| address.to_string()).collect();
        settings
    }

    #[test]
    fn public_address_waits_for_confirmation() {
        let daemon = RecordingDaemon::default();
        let settings = Settings::default();
        let mut form = CustomDnsForm::default();
        assert_eq!(form.toggle(&settings, true), None);
        assert!(form.input_visible);

        form.set_input("8.8.8.8");
        assert_eq!(form.submit(&settings), None);
        assert_eq!(form.public_dns_ip_to_confirm.as_deref(), Some("8.8.8.8"));
        assert!(daemon.calls().is_empty());

        let change = form.confirm(&settings).unwrap();
        assert_eq!(form.public_dns_ip_to_confirm, None);
        assert_eq!(
            change,
            SettingsChange::DnsOptions(DnsOptions {
                state: DnsState::Custom,
                default_options: DefaultDnsOptions::default(),
                custom_options: CustomDnsOptions {
                    addresses: vec!["8.8.8.8".into()],
                },
            })
        );
        change.apply(&daemon).unwrap();
        assert_eq!(daemon.calls().len(), 1);
        assert!(!form.input_visible);
    }

    #[test]
    fn aborted_confirmation_adds_nothing() {
        let mut form = CustomDnsForm::default();
        form.set_input("1.1.1.1");
        form.submit(&Settings::default());
        form.abort();
        assert_eq!(form.confirm(&Settings::default()), None);
    }

    #[test]
    fn invalid_and_duplicate_addresses_are_rejected_inline() {
        let settings = custom(&["10.0.0.1"]);
        let mut form = CustomDnsForm::default();
        form.set_input("not an ip");
        assert_eq!(form.submit(&settings), None);
        assert_eq!(form.input_error.as_deref(), Some("Invalid IP address"));
        form.set_input("10.0.0.1");
        assert_eq!(form.submit(&settings), None);
        assert_eq!(
            form.input_error.as_deref(),
            Some("This address has already been entered")
        );
        assert_eq!(form.public_dns_ip_to_confirm, None);
    }

    #[test]
    fn local_address_confirmation_depends_on_platform() {
        let settings = custom(&[]);
        let mut form = CustomDnsForm::default();
        form.set_input("192.168.1.1");
        let change = form.submit(&settings);
        if CONFIRM_LOCAL_ADDRESSES {
            assert_eq!(change, None);
            assert_eq!(form.local_dns_ip_to_confirm.as_deref(), Some("192.168.1.1"));
            assert_eq!(form.confirmation_message(), Some(LOCAL_ADDRESS_WARNING));
        } else {
            assert!(change.is_some());
        }
    }

    #[test]
    fn editing_rejects_duplicates_and_replaces_in_place() {
        let settings = custom(&["1.1.1.1", "9.9.9.9"]);
        let mut form = CustomDnsForm::default();
        form.start_editing("1.1.1.1");
        assert_eq!(form.submit_edit(&settings, "9.9.9.9"), None);
        assert!(form.edit_error.is_some());
        assert_eq!(form.submit_edit(&settings, "8.8.4.4"), None);
        let Some(SettingsChange::DnsOptions(options)) = form.confirm(&settings) else {
            panic!("expected dns options");
        };
        assert_eq!(
            options.custom_options.addresses,
            vec!["8.8.4.4".to_string(), "9.9.9.9".to_string()]
        );
        assert_eq!(form.editing, None);
    }

    #[test]
    fn removing_last_address_switches_to_default() {
        let settings = custom(&["1.1.1.1"]);
        let mut form = CustomDnsForm::default();
        let SettingsChange::DnsOptions(options) = form.remove(&settings, "1.1.1.1") else {
            panic!("expected dns options");
        };
        assert_eq!(options.state, DnsState::Default);
        assert!(options.custom_options.addresses.is_empty());
    }

    #[test]
    fn content_blockers_lock_the_feature() {
        let mut settings = Settings::default();
        assert!(feature_available(&settings));
        settings.tunnel_options.dns.default_options.block_trackers = true;
        assert!(!feature_available(&settings));
    }

    #[test]
    fn private_ranges_are_local() {
        for address in ["10.1.2.3", "172.16.0.1", "192.168.0.1", "127.0.0.1", "fd00::1", "fe80::1"] {
            assert!(is_local(&address.parse().unwrap()), "{address}");
        }
        assert!(!is_local(&"2606:4700:4700::1111".parse().unwrap()));
    }
}
