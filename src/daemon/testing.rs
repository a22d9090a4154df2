use std::sync::Mutex;

use futures::channel::mpsc::{UnboundedReceiver, unbounded};

use super::{Daemon, DaemonError, types::*};

/// Test double that records every call as a readable string and answers from canned
/// state.
#[derive(Default)]
pub struct RecordingDaemon {
    pub calls: Mutex<Vec<String>>,
    pub failure: Mutex<Option<DaemonError>>,
    pub devices: Mutex<Vec<Device>>,
    pub settings: Mutex<Settings>,
    pub voucher_response: Mutex<Option<VoucherResponse>>,
    pub applications: Mutex<Vec<SplitTunnelingApplication>>,
}

impl RecordingDaemon {
    pub fn failing(error: DaemonError) -> Self {
        let daemon = Self::default();
        *daemon.failure.lock().unwrap() = Some(error);
        daemon
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), DaemonError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Daemon for RecordingDaemon {
    fn subscribe(&self) -> Result<UnboundedReceiver<DaemonEvent>, DaemonError> {
        self.record("subscribe".into())?;
        let (_sender, receiver) = unbounded();
        Ok(receiver)
    }

    fn get_settings(&self) -> Result<Settings, DaemonError> {
        self.record("get_settings".into())?;
        Ok(self.settings.lock().unwrap().clone())
    }

    fn get_tunnel_state(&self) -> Result<TunnelState, DaemonError> {
        self.record("get_tunnel_state".into())?;
        Ok(TunnelState::default())
    }

    fn get_relay_list(&self) -> Result<RelayList, DaemonError> {
        self.record("get_relay_list".into())?;
        Ok(RelayList::default())
    }

    fn get_version_info(&self) -> Result<AppVersionInfo, DaemonError> {
        self.record("get_version_info".into())?;
        Ok(AppVersionInfo {
            supported: true,
            ..Default::default()
        })
    }

    fn get_current_version(&self) -> Result<String, DaemonError> {
        self.record("get_current_version".into())?;
        Ok("2025.1".into())
    }

    fn get_device_state(&self) -> Result<DeviceState, DaemonError> {
        self.record("get_device_state".into())?;
        Ok(DeviceState::LoggedOut)
    }

    fn connect_tunnel(&self) -> Result<bool, DaemonError> {
        self.record("connect_tunnel".into()).map(|_| true)
    }

    fn disconnect_tunnel(&self) -> Result<bool, DaemonError> {
        self.record("disconnect_tunnel".into()).map(|_| true)
    }

    fn reconnect_tunnel(&self) -> Result<bool, DaemonError> {
        self.record("reconnect_tunnel".into()).map(|_| true)
    }

    fn get_account_data(&self, account_number: &str) -> Result<AccountData, DaemonError> {
        self.record(format!("get_account_data({account_number})"))?;
        Ok(AccountData {
            expiry: chrono::Utc::now(),
        })
    }

    fn get_account_history(&self) -> Result<Option<String>, DaemonError> {
        self.record("get_account_history".into()).map(|_| None)
    }

    fn clear_account_history(&self) -> Result<(), DaemonError> {
        self.record("clear_account_history".into())
    }

    fn create_new_account(&self) -> Result<String, DaemonError> {
        self.record("create_new_account".into())
            .map(|_| "1234567890123456".into())
    }

    fn login(&self, account_number: &str) -> Result<(), DaemonError> {
        self.record(format!("login({account_number})"))
    }

    fn logout(&self) -> Result<(), DaemonError> {
        self.record("logout".into())
    }

    fn submit_voucher(&self, voucher_code: &str) -> Result<VoucherResponse, DaemonError> {
        self.record(format!("submit_voucher({voucher_code})"))?;
        Ok(self
            .voucher_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(VoucherResponse::Invalid))
    }

    fn get_auth_token(&self) -> Result<String, DaemonError> {
        self.record("get_auth_token".into()).map(|_| "token".into())
    }

    fn list_devices(&self, account_number: &str) -> Result<Vec<Device>, DaemonError> {
        self.record(format!("list_devices({account_number})"))?;
        Ok(self.devices.lock().unwrap().clone())
    }

    fn remove_device(&self, account_number: &str, device_id: &str) -> Result<(), DaemonError> {
        self.record(format!("remove_device({account_number}, {device_id})"))?;
        self.devices
            .lock()
            .unwrap()
            .retain(|device| device.id != device_id);
        Ok(())
    }

    fn update_relay_settings(&self, update: &RelaySettingsUpdate) -> Result<(), DaemonError> {
        self.record(format!("update_relay_settings({update:?})"))
    }

    fn set_bridge_state(&self, state: BridgeState) -> Result<(), DaemonError> {
        self.record(format!("set_bridge_state({state:?})"))
    }

    fn set_bridge_settings(&self, settings: &BridgeSettings) -> Result<(), DaemonError> {
        self.record(format!("set_bridge_settings({settings:?})"))
    }

    fn set_dns_options(&self, options: &DnsOptions) -> Result<(), DaemonError> {
        self.record(format!("set_dns_options({options:?})"))
    }

    fn set_allow_lan(&self, allow_lan: bool) -> Result<(), DaemonError> {
        self.record(format!("set_allow_lan({allow_lan})"))
    }

    fn set_auto_connect(&self, auto_connect: bool) -> Result<(), DaemonError> {
        self.record(format!("set_auto_connect({auto_connect})"))
    }

    fn set_block_when_disconnected(&self, block: bool) -> Result<(), DaemonError> {
        self.record(format!("set_block_when_disconnected({block})"))
    }

    fn set_enable_ipv6(&self, enable_ipv6: bool) -> Result<(), DaemonError> {
        self.record(format!("set_enable_ipv6({enable_ipv6})"))
    }

    fn set_show_beta_releases(&self, show: bool) -> Result<(), DaemonError> {
        self.record(format!("set_show_beta_releases({show})"))
    }

    fn set_openvpn_mssfix(&self, mssfix: Option<u16>) -> Result<(), DaemonError> {
        self.record(format!("set_openvpn_mssfix({mssfix:?})"))
    }

    fn set_wireguard_mtu(&self, mtu: Option<u16>) -> Result<(), DaemonError> {
        self.record(format!("set_wireguard_mtu({mtu:?})"))
    }

    fn set_wireguard_quantum_resistant(&self, enabled: Option<bool>) -> Result<(), DaemonError> {
        self.record(format!("set_wireguard_quantum_resistant({enabled:?})"))
    }

    fn set_obfuscation_settings(&self, settings: &ObfuscationSettings) -> Result<(), DaemonError> {
        self.record(format!("set_obfuscation_settings({:?})", settings.selected))
    }

    fn set_enable_daita(&self, enable: bool) -> Result<(), DaemonError> {
        self.record(format!("set_enable_daita({enable})"))
    }

    fn set_daita_direct_only(&self, direct_only: bool) -> Result<(), DaemonError> {
        self.record(format!("set_daita_direct_only({direct_only})"))
    }

    fn add_api_access_method(&self, method: &NewAccessMethod) -> Result<String, DaemonError> {
        self.record(format!("add_api_access_method({})", method.name))
            .map(|_| "new-id".into())
    }

    fn update_api_access_method(&self, method: &AccessMethodSetting) -> Result<(), DaemonError> {
        self.record(format!("update_api_access_method({})", method.id))
    }

    fn remove_api_access_method(&self, id: &str) -> Result<(), DaemonError> {
        self.record(format!("remove_api_access_method({id})"))
    }

    fn set_api_access_method(&self, id: &str) -> Result<(), DaemonError> {
        self.record(format!("set_api_access_method({id})"))
    }

    fn test_api_access_method(&self, id: &str) -> Result<bool, DaemonError> {
        self.record(format!("test_api_access_method({id})"))
            .map(|_| true)
    }

    fn test_custom_api_access_method(&self, _proxy: &CustomProxy) -> Result<bool, DaemonError> {
        self.record("test_custom_api_access_method".into())
            .map(|_| true)
    }

    fn get_split_tunneling_applications(
        &self,
    ) -> Result<Vec<SplitTunnelingApplication>, DaemonError> {
        self.record("get_split_tunneling_applications".into())?;
        Ok(self.applications.lock().unwrap().clone())
    }

    fn set_split_tunnel_state(&self, enabled: bool) -> Result<(), DaemonError> {
        self.record(format!("set_split_tunnel_state({enabled})"))
    }

    fn add_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError> {
        self.record(format!("add_split_tunneling_application({path})"))
    }

    fn remove_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError> {
        self.record(format!("remove_split_tunneling_application({path})"))
    }

    fn launch_excluded_application(&self, path: &str) -> Result<(), DaemonError> {
        self.record(format!("launch_excluded_application({path})"))
    }

    fn import_settings(&self, text: &str) -> Result<(), DaemonError> {
        self.record(format!("import_settings({} bytes)", text.len()))
    }

    fn collect_problem_report(&self, to_redact: &[String]) -> Result<String, DaemonError> {
        self.record(format!("collect_problem_report({})", to_redact.join(",")))
            .map(|_| "/tmp/report.log".into())
    }

    fn send_problem_report(
        &self,
        email: &str,
        message: &str,
        report_path: Option<&str>,
    ) -> Result<(), DaemonError> {
        self.record(format!(
            "send_problem_report({email}, {message}, {report_path:?})"
        ))
    }
}
