use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_millis(10000);

#[cfg(unix)]
const DEFAULT_SOCKET_PATH: &str = "/var/run/vpn-daemon/rpc-socket";
#[cfg(windows)]
const DEFAULT_SOCKET_PATH: &str = r"\\.\pipe\vpn-daemon";

const DEFAULT_EXCLUDE_LAUNCHER: &str = "vpn-exclude";

/// How to reach the background service.
#[derive(Clone, Debug, PartialEq)]
pub struct DaemonConfiguration {
    pub socket_path: PathBuf,
    pub request_timeout: Duration,
    pub network_timeout: Duration,
    pub exclude_launcher: String,
}

impl Default for DaemonConfiguration {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
            exclude_launcher: DEFAULT_EXCLUDE_LAUNCHER.into(),
        }
    }
}

impl DaemonConfiguration {
    /// Defaults overridden by `VPN_DAEMON_SOCKET`, `VPN_DAEMON_TIMEOUT_MS` and
    /// `VPN_EXCLUDE_LAUNCHER`.
    pub fn from_environment() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut configuration = Self::default();
        if let Some(path) = lookup("VPN_DAEMON_SOCKET").filter(|path| !path.is_empty()) {
            configuration.socket_path = PathBuf::from(path);
        }
        if let Some(timeout) = lookup("VPN_DAEMON_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(milliseconds) if milliseconds > 0 => {
                    configuration.request_timeout = Duration::from_millis(milliseconds);
                    configuration.network_timeout =
                        configuration.network_timeout.max(configuration.request_timeout);
                }
                _ => log::warn!("[configuration] ignoring invalid VPN_DAEMON_TIMEOUT_MS={timeout}"),
            }
        }
        if let Some(launcher) = lookup("VPN_EXCLUDE_LAUNCHER").filter(|value| !value.is_empty()) {
            configuration.exclude_launcher = launcher;
        }
        configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn environment_overrides_defaults() {
        let configuration = DaemonConfiguration::from_lookup(|name| match name {
            "VPN_DAEMON_SOCKET" => Some("/tmp/daemon.sock".into()),
            "VPN_DAEMON_TIMEOUT_MS" => Some("20000".into()),
            _ => None,
        });
        assert_eq!(configuration.socket_path, PathBuf::from("/tmp/daemon.sock"));
        assert_eq!(configuration.request_timeout, Duration::from_secs(20));
        assert_eq!(configuration.network_timeout, Duration::from_secs(20));
        assert_eq!(configuration.exclude_launcher, DEFAULT_EXCLUDE_LAUNCHER);
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let configuration = DaemonConfiguration::from_lookup(|name| {
            (name == "VPN_DAEMON_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(configuration.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
