use std::{collections::HashMap, fmt};

use crate::{
    daemon::{Daemon, DaemonError, types::*},
    proxy_form::ProxyForm,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiAccessError {
    /// At least one method has to stay enabled.
    LastEnabled,
    BuiltIn,
    Form(String),
    Daemon(DaemonError),
}

impl fmt::Display for ApiAccessError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastEnabled => formatter.write_str("At least one method needs to be enabled"),
            Self::BuiltIn => formatter.write_str("Built-in methods cannot be changed"),
            Self::Form(message) => formatter.write_str(message),
            Self::Daemon(error) => formatter.write_str(&error.user_message()),
        }
    }
}

impl std::error::Error for ApiAccessError {}

impl From<DaemonError> for ApiAccessError {
    fn from(error: DaemonError) -> Self {
        Self::Daemon(error)
    }
}

pub fn kind_label(kind: &AccessMethodKind) -> &'static str {
    match kind {
        AccessMethodKind::Direct => "Direct",
        AccessMethodKind::Bridges => "Mullvad bridges",
        AccessMethodKind::EncryptedDnsProxy => "Encrypted DNS proxy",
        AccessMethodKind::Custom(CustomProxy::Shadowsocks { .. }) => "Shadowsocks",
        AccessMethodKind::Custom(CustomProxy::Socks5Remote { .. }) => "SOCKS5 remote",
    }
}

pub fn description(kind: &AccessMethodKind) -> Option<[&'static str; 2]> {
    match kind {
        AccessMethodKind::Direct => Some([
            "With the “Direct” method, the app communicates with a Mullvad API server directly without any intermediate proxies.",
            "This can be useful when you are not affected by censorship.",
        ]),
        AccessMethodKind::Bridges => Some([
            "With the “Mullvad bridges” method, the app communicates with a Mullvad API server via a Mullvad bridge server. It does this by sending the traffic obfuscated by Shadowsocks.",
            "This can be useful if the API is censored but Mullvad’s bridge servers are not.",
        ]),
        AccessMethodKind::EncryptedDnsProxy => Some([
            "With the “Encrypted DNS proxy” method, the app will communicate with our Mullvad API through a proxy address. It does this by retrieving an address from a DNS over HTTPS (DoH) server and then using that to reach our API servers.",
            "If you are not connected to our VPN, then the Encrypted DNS proxy will use your own non-VPN IP when connecting. The DoH servers are hosted by one of the following providers: Quad9 or CloudFlare.",
        ]),
        AccessMethodKind::Custom(_) => None,
    }
}

/// Built-in methods first, then custom ones in the order the service keeps them.
pub fn sorted_methods(methods: &[AccessMethodSetting]) -> Vec<&AccessMethodSetting> {
    let mut sorted: Vec<_> = methods.iter().collect();
    sorted.sort_by_key(|method| match method.kind {
        AccessMethodKind::Direct => 0,
        AccessMethodKind::Bridges => 1,
        AccessMethodKind::EncryptedDnsProxy => 2,
        AccessMethodKind::Custom(_) => 3,
    });
    sorted
}

pub fn is_in_use(method: &AccessMethodSetting, current: Option<&AccessMethodSetting>) -> bool {
    current.is_some_and(|current| current.id == method.id)
}

pub fn can_set_enabled(methods: &[AccessMethodSetting], id: &str, enabled: bool) -> bool {
    enabled
        || methods
            .iter()
            .any(|method| method.enabled && method.id != id)
}

pub fn set_enabled(
    daemon: &dyn Daemon,
    methods: &[AccessMethodSetting],
    method: &AccessMethodSetting,
    enabled: bool,
) -> Result<(), ApiAccessError> {
    if !can_set_enabled(methods, &method.id, enabled) {
        return Err(ApiAccessError::LastEnabled);
    }
    let updated = AccessMethodSetting {
        enabled,
        ..method.clone()
    };
    daemon.update_api_access_method(&updated)?;
    Ok(())
}

/// Tests the method and only switches to it when the API is reachable through it.
pub fn use_method(daemon: &dyn Daemon, id: &str) -> Result<bool, ApiAccessError> {
    let reachable = daemon.test_api_access_method(id)?;
    if reachable {
        daemon.set_api_access_method(id)?;
    } else {
        log::info!("[api-access] {id} is unreachable, keeping current method");
    }
    Ok(reachable)
}

pub fn remove(daemon: &dyn Daemon, method: &AccessMethodSetting) -> Result<(), ApiAccessError> {
    if method.is_builtin() {
        return Err(ApiAccessError::BuiltIn);
    }
    daemon.remove_api_access_method(&method.id)?;
    Ok(())
}

pub fn remove_title(method: &AccessMethodSetting) -> String {
    format!("Delete {}?", method.name)
}

pub fn remove_message(in_use: bool) -> Option<&'static str> {
    in_use.then_some("The in use API access method will change.")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Use,
    Test,
    Edit,
    Delete,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Use => "Use",
            Self::Test => "Test",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// Context menu entries with their disabled state.
pub fn menu_items(method: &AccessMethodSetting, in_use: bool) -> Vec<(MenuItem, bool)> {
    let mut items = vec![(MenuItem::Use, in_use), (MenuItem::Test, false)];
    if !method.is_builtin() {
        items.push((MenuItem::Edit, false));
        items.push((MenuItem::Delete, false));
    }
    items
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestStatus {
    Testing,
    Reachable,
    Unreachable,
}

impl TestStatus {
    pub fn from_result(reachable: bool) -> Self {
        if reachable {
            Self::Reachable
        } else {
            Self::Unreachable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Testing => "Testing...",
            Self::Reachable => "API reachable",
            Self::Unreachable => "API unreachable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The proxy didn't answer; the user decides whether to save anyway.
    Unreachable,
}

/// Page state: per-method test results and the pending delete confirmation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiAccessPage {
    pub tests: HashMap<String, TestStatus>,
    pub remove_confirmation: Option<AccessMethodSetting>,
    pub form: Option<ProxyForm>,
    pub save_unreachable: bool,
}

impl ApiAccessPage {
    pub fn sub_label(&self, method: &AccessMethodSetting, in_use: bool) -> Option<&'static str> {
        match self.tests.get(&method.id) {
            Some(status) => Some(status.label()),
            None => in_use.then_some("In use"),
        }
    }

    pub fn start_test(&mut self, id: &str) -> bool {
        if self.tests.get(id) == Some(&TestStatus::Testing) {
            return false;
        }
        self.tests.insert(id.to_string(), TestStatus::Testing);
        true
    }

    pub fn finish_test(&mut self, id: &str, reachable: bool) {
        self.tests
            .insert(id.to_string(), TestStatus::from_result(reachable));
    }

    pub fn open_new(&mut self) {
        self.form = Some(ProxyForm::default());
        self.save_unreachable = false;
    }

    pub fn open_edit(&mut self, method: &AccessMethodSetting) -> Result<(), ApiAccessError> {
        self.form = Some(ProxyForm::edit(method).ok_or(ApiAccessError::BuiltIn)?);
        self.save_unreachable = false;
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.save_unreachable = false;
    }

    pub fn request_remove(&mut self, method: &AccessMethodSetting) {
        if !method.is_builtin() {
            self.remove_confirmation = Some(method.clone());
        }
    }

    pub fn cancel_remove(&mut self) {
        self.remove_confirmation = None;
    }
}

/// Saves the form. New and edited proxies are tested first unless `force` is set.
pub fn save(daemon: &dyn Daemon, form: &ProxyForm, force: bool) -> Result<SaveOutcome, ApiAccessError> {
    let proxy = form
        .proxy()
        .map_err(|error| ApiAccessError::Form(error.to_string()))?;
    if !force && !daemon.test_custom_api_access_method(&proxy)? {
        return Ok(SaveOutcome::Unreachable);
    }
    match form.updated_method() {
        Some(updated) => {
            let updated = updated.map_err(|error| ApiAccessError::Form(error.to_string()))?;
            daemon.update_api_access_method(&updated)?;
        }
        None => {
            let method = form
                .new_access_method()
                .map_err(|error| ApiAccessError::Form(error.to_string()))?;
            let id = daemon.add_api_access_method(&method)?;
            log::info!("[api-access] added method {id}");
        }
    }
    Ok(SaveOutcome::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::RecordingDaemon;
    use pretty_assertions::assert_eq;

    fn method(id: &str, enabled: bool, kind: AccessMethodKind) -> AccessMethodSetting {
        AccessMethodSetting {
            id: id.into(),
            name: id.into(),
            enabled,
            kind,
        }
    }

    fn custom() -> AccessMethodKind {
        AccessMethodKind::Custom(CustomProxy::Socks5Remote {
            ip: "192.0.2.1".into(),
            port: 1080,
            authentication: None,
        })
    }

    #[test]
    fn last_enabled_method_stays_enabled() {
        let daemon = RecordingDaemon::default();
        let methods = vec![
            method("direct", true, AccessMethodKind::Direct),
            method("bridges", false, AccessMethodKind::Bridges),
        ];
        assert_eq!(
            set_enabled(&daemon, &methods, &methods[0], false),
            Err(ApiAccessError::LastEnabled)
        );
        assert!(daemon.calls().is_empty());

        set_enabled(&daemon, &methods, &methods[1], true).unwrap();
        assert_eq!(daemon.calls(), vec!["update_api_access_method(bridges)"]);
    }

    #[test]
    fn built_in_methods_cannot_be_removed() {
        let daemon = RecordingDaemon::default();
        let direct = method("direct", true, AccessMethodKind::Direct);
        assert_eq!(remove(&daemon, &direct), Err(ApiAccessError::BuiltIn));
        assert_eq!(
            menu_items(&direct, true),
            vec![(MenuItem::Use, true), (MenuItem::Test, false)]
        );

        let mut page = ApiAccessPage::default();
        page.request_remove(&direct);
        assert_eq!(page.remove_confirmation, None);

        let proxy = method("custom", true, custom());
        page.request_remove(&proxy);
        assert_eq!(remove_title(&proxy), "Delete custom?");
        remove(&daemon, &proxy).unwrap();
        assert_eq!(daemon.calls(), vec!["remove_api_access_method(custom)"]);
    }

    #[test]
    fn use_tests_before_switching() {
        let daemon = RecordingDaemon::default();
        assert_eq!(use_method(&daemon, "bridges"), Ok(true));
        assert_eq!(
            daemon.calls(),
            vec!["test_api_access_method(bridges)", "set_api_access_method(bridges)"]
        );
    }

    #[test]
    fn built_ins_sort_before_custom_methods() {
        let methods = vec![
            method("custom", true, custom()),
            method("dns", true, AccessMethodKind::EncryptedDnsProxy),
            method("direct", true, AccessMethodKind::Direct),
        ];
        assert_eq!(
            sorted_methods(&methods)
                .iter()
                .map(|method| method.id.as_str())
                .collect::<Vec<_>>(),
            vec!["direct", "dns", "custom"]
        );
    }

    #[test]
    fn test_status_replaces_in_use_label() {
        let mut page = ApiAccessPage::default();
        let direct = method("direct", true, AccessMethodKind::Direct);
        assert_eq!(page.sub_label(&direct, true), Some("In use"));
        assert!(page.start_test("direct"));
        assert!(!page.start_test("direct"));
        page.finish_test("direct", false);
        assert_eq!(page.sub_label(&direct, true), Some("API unreachable"));
    }

    #[test]
    fn new_method_is_tested_then_added() {
        let daemon = RecordingDaemon::default();
        let form = ProxyForm {
            name: "Home".into(),
            kind: crate::proxy_form::ProxyKind::Socks5Remote,
            server: "192.0.2.1".into(),
            port: "1080".into(),
            ..Default::default()
        };
        assert_eq!(save(&daemon, &form, false), Ok(SaveOutcome::Saved));
        assert_eq!(
            daemon.calls(),
            vec!["test_custom_api_access_method", "add_api_access_method(Home)"]
        );
    }
}
