use std::{
    collections::HashMap,
    io::{BufReader, Read, Write},
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};

use futures::channel::mpsc::{UnboundedReceiver, unbounded};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use super::{Daemon, DaemonError, types::*};
use crate::{configuration::DaemonConfiguration, system};

const ACCOUNT_NOT_FOUND: i64 = -200;
const TOO_MANY_DEVICES: i64 = -201;
const INTERNAL_ERROR: i64 = -32603;

type Reply = Result<Value, DaemonError>;
type Listener = Box<dyn Fn(Value) + Send>;

/// JSON-RPC 2.0 client over a local stream. Replies are matched to requests by id and
/// notifications are routed to listeners by subscription id.
pub struct JsonRpcClient {
    writer: Mutex<Box<dyn Write + Send>>,
    pending: Arc<Mutex<HashMap<String, mpsc::Sender<Reply>>>>,
    subscriptions: Arc<Mutex<HashMap<String, Listener>>>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl JsonRpcClient {
    #[cfg(unix)]
    pub fn connect(path: &Path, timeout: Duration) -> Result<Self, DaemonError> {
        let stream = std::os::unix::net::UnixStream::connect(path).map_err(|error| {
            DaemonError::Transport(format!("Failed to connect to {}: {error}", path.display()))
        })?;
        let reader = stream
            .try_clone()
            .map_err(|error| DaemonError::Transport(format!("Failed to clone socket: {error}")))?;
        Ok(Self::from_parts(Box::new(reader), Box::new(stream), timeout))
    }

    #[cfg(windows)]
    pub fn connect(path: &Path, timeout: Duration) -> Result<Self, DaemonError> {
        let pipe = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|error| {
                DaemonError::Transport(format!("Failed to open {}: {error}", path.display()))
            })?;
        let reader = pipe
            .try_clone()
            .map_err(|error| DaemonError::Transport(format!("Failed to clone pipe: {error}")))?;
        Ok(Self::from_parts(Box::new(reader), Box::new(pipe), timeout))
    }

    pub fn from_parts(
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
        timeout: Duration,
    ) -> Self {
        let client = Self {
            writer: Mutex::new(writer),
            pending: Arc::new(Mutex::new(HashMap::new())),
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            timeout,
        };
        client.start_reader(reader);
        client
    }

    fn start_reader(&self, reader: Box<dyn Read + Send>) {
        let pending = self.pending.clone();
        let subscriptions = self.subscriptions.clone();
        std::thread::spawn(move || {
            let stream =
                serde_json::Deserializer::from_reader(BufReader::new(reader)).into_iter::<Value>();
            for message in stream {
                match message {
                    Ok(message) => dispatch_message(message, &pending, &subscriptions),
                    Err(error) => {
                        log::warn!("[rpc] failed to decode message stream: {error}");
                        break;
                    }
                }
            }

            log::info!("[rpc] connection closed");
            if let Ok(mut pending) = pending.lock() {
                for (_, sender) in pending.drain() {
                    let _ = sender.send(Err(DaemonError::Transport(
                        "Socket was closed by peer".into(),
                    )));
                }
            }
            if let Ok(mut subscriptions) = subscriptions.lock() {
                subscriptions.clear();
            }
        });
    }

    pub fn send(&self, method: &str, params: Value) -> Reply {
        self.send_with_timeout(method, params, self.timeout)
    }

    pub fn send_with_timeout(&self, method: &str, params: Value, timeout: Duration) -> Reply {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let (sender, receiver) = mpsc::channel();
        self.pending
            .lock()
            .map_err(|_| DaemonError::Transport("Request table poisoned".into()))?
            .insert(id.clone(), sender);

        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": prepare_params(params),
        });

        log::trace!("[rpc] sending {id} {method}");
        if let Err(error) = self.write_message(&message) {
            log::error!("[rpc] failed sending \"{method}\": {error}");
            self.forget(&id);
            return Err(error);
        }

        match receiver.recv_timeout(timeout) {
            Ok(reply) => reply,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("[rpc] request {id} ({method}) timed out");
                self.forget(&id);
                Err(DaemonError::TimedOut(method.to_string()))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(DaemonError::Transport(
                "RPC client transport is not connected".into(),
            )),
        }
    }

    pub fn subscribe(&self, event: &str, listener: Listener) -> Result<(), DaemonError> {
        let reply = self.send(&format!("{event}_subscribe"), Value::Null)?;
        let subscription_id = match reply {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            other => {
                log::error!("[rpc] failed adding listener to {event}: bad id {other}");
                return Err(DaemonError::Subscription(format!(
                    "The subscription id was not a string or a number: {other}"
                )));
            }
        };
        self.subscriptions
            .lock()
            .map_err(|_| DaemonError::Subscription("Subscription table poisoned".into()))?
            .insert(subscription_id, listener);
        Ok(())
    }

    fn write_message(&self, message: &Value) -> Result<(), DaemonError> {
        let mut bytes = serde_json::to_vec(message)
            .map_err(|error| DaemonError::Parse(format!("Failed to encode request: {error}")))?;
        bytes.push(b'\n');
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DaemonError::Transport("Writer poisoned".into()))?;
        writer
            .write_all(&bytes)
            .and_then(|_| writer.flush())
            .map_err(|error| DaemonError::Transport(format!("Socket not connected: {error}")))
    }

    fn forget(&self, id: &str) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(id);
        }
    }
}

// Only arrays and objects are valid params; scalars are wrapped.
fn prepare_params(params: Value) -> Value {
    match params {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(_) | Value::Object(_) => params,
        other => Value::Array(vec![other]),
    }
}

fn dispatch_message(
    message: Value,
    pending: &Mutex<HashMap<String, mpsc::Sender<Reply>>>,
    subscriptions: &Mutex<HashMap<String, Listener>>,
) {
    if let Some(method) = message.get("method").and_then(Value::as_str) {
        let subscription_id = match message.pointer("/params/subscription") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                log::warn!("[rpc] notification {method} without subscription id");
                return;
            }
        };
        let result = message
            .pointer("/params/result")
            .cloned()
            .unwrap_or(Value::Null);
        match subscriptions.lock() {
            Ok(subscriptions) => match subscriptions.get(&subscription_id) {
                Some(listener) => listener(result),
                None => log::warn!(
                    "[rpc] got notification for {method} but no one is listening for it"
                ),
            },
            Err(_) => log::error!("[rpc] subscription table poisoned"),
        }
        return;
    }

    let id = match message.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            log::error!("[rpc] failed to parse JSON-RPC message: {message}");
            return;
        }
    };

    let Some(sender) = pending.lock().ok().and_then(|mut pending| pending.remove(&id)) else {
        log::warn!("[rpc] got reply to {id} but no one was waiting for it");
        return;
    };

    let reply = match message.get("error") {
        Some(error) if !error.is_null() => Err(DaemonError::Remote {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Ok(message.get("result").cloned().unwrap_or(Value::Null)),
    };
    let _ = sender.send(reply);
}

fn map_account_error(error: DaemonError) -> DaemonError {
    match error {
        DaemonError::Remote {
            code: ACCOUNT_NOT_FOUND,
            ..
        } => DaemonError::InvalidAccount,
        DaemonError::Remote {
            code: TOO_MANY_DEVICES,
            ..
        } => DaemonError::TooManyDevices,
        DaemonError::Remote {
            code: INTERNAL_ERROR,
            ..
        }
        | DaemonError::TimedOut(_) => DaemonError::Communication,
        other => other,
    }
}

pub struct DaemonRpc {
    client: JsonRpcClient,
    network_timeout: Duration,
    exclude_launcher: String,
}

impl DaemonRpc {
    pub fn connect(configuration: &DaemonConfiguration) -> Result<Self, DaemonError> {
        let client =
            JsonRpcClient::connect(&configuration.socket_path, configuration.request_timeout)?;
        log::info!(
            "[daemon] connected to {}",
            configuration.socket_path.display()
        );
        Ok(Self::with_client(client, configuration))
    }

    pub fn with_client(client: JsonRpcClient, configuration: &DaemonConfiguration) -> Self {
        Self {
            client,
            network_timeout: configuration.network_timeout,
            exclude_launcher: configuration.exclude_launcher.clone(),
        }
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, DaemonError> {
        let reply = self.client.send(method, params)?;
        serde_json::from_value(reply)
            .map_err(|error| DaemonError::Parse(format!("Invalid response from {method}: {error}")))
    }

    fn call_network<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, DaemonError> {
        let reply = self
            .client
            .send_with_timeout(method, params, self.network_timeout)?;
        serde_json::from_value(reply)
            .map_err(|error| DaemonError::Parse(format!("Invalid response from {method}: {error}")))
    }

    fn command(&self, method: &str, params: Value) -> Result<(), DaemonError> {
        self.client.send(method, params).map(|_| ())
    }

    fn command_with<P: Serialize>(&self, method: &str, params: &P) -> Result<(), DaemonError> {
        let params = serde_json::to_value(params)
            .map_err(|error| DaemonError::Parse(format!("Failed to encode {method}: {error}")))?;
        self.command(method, json!([params]))
    }
}

impl Daemon for DaemonRpc {
    fn subscribe(&self) -> Result<UnboundedReceiver<DaemonEvent>, DaemonError> {
        let (sender, receiver) = unbounded();
        self.client.subscribe(
            "daemon_event",
            Box::new(move |value| match serde_json::from_value::<DaemonEvent>(value) {
                Ok(event) => {
                    if sender.unbounded_send(event).is_err() {
                        log::debug!("[daemon] event receiver dropped");
                    }
                }
                Err(error) => log::warn!("[daemon] dropping malformed event: {error}"),
            }),
        )?;
        Ok(receiver)
    }

    fn get_settings(&self) -> Result<Settings, DaemonError> {
        self.call("get_settings", Value::Null)
    }

    fn get_tunnel_state(&self) -> Result<TunnelState, DaemonError> {
        self.call("get_state", Value::Null)
    }

    fn get_relay_list(&self) -> Result<RelayList, DaemonError> {
        self.call("get_relay_locations", Value::Null)
    }

    fn get_version_info(&self) -> Result<AppVersionInfo, DaemonError> {
        self.call_network("get_version_info", Value::Null)
    }

    fn get_current_version(&self) -> Result<String, DaemonError> {
        self.call("get_current_version", Value::Null)
    }

    fn get_device_state(&self) -> Result<DeviceState, DaemonError> {
        self.call("get_device", Value::Null)
    }

    fn connect_tunnel(&self) -> Result<bool, DaemonError> {
        self.call("connect", Value::Null)
    }

    fn disconnect_tunnel(&self) -> Result<bool, DaemonError> {
        self.call("disconnect", Value::Null)
    }

    fn reconnect_tunnel(&self) -> Result<bool, DaemonError> {
        self.call("reconnect", Value::Null)
    }

    fn get_account_data(&self, account_number: &str) -> Result<AccountData, DaemonError> {
        self.call_network("get_account_data", json!(account_number))
            .map_err(map_account_error)
    }

    fn get_account_history(&self) -> Result<Option<String>, DaemonError> {
        self.call("get_account_history", Value::Null)
    }

    fn clear_account_history(&self) -> Result<(), DaemonError> {
        self.command("clear_account_history", Value::Null)
    }

    fn create_new_account(&self) -> Result<String, DaemonError> {
        self.call_network("create_new_account", Value::Null)
            .map_err(map_account_error)
    }

    fn login(&self, account_number: &str) -> Result<(), DaemonError> {
        self.client
            .send_with_timeout("login_account", json!([account_number]), self.network_timeout)
            .map(|_| ())
            .map_err(map_account_error)
    }

    fn logout(&self) -> Result<(), DaemonError> {
        self.client
            .send_with_timeout("logout_account", Value::Null, self.network_timeout)
            .map(|_| ())
    }

    fn submit_voucher(&self, voucher_code: &str) -> Result<VoucherResponse, DaemonError> {
        self.call_network("submit_voucher", json!([voucher_code]))
    }

    fn get_auth_token(&self) -> Result<String, DaemonError> {
        self.call_network("get_www_auth_token", Value::Null)
    }

    fn list_devices(&self, account_number: &str) -> Result<Vec<Device>, DaemonError> {
        self.call_network("list_devices", json!([account_number]))
            .map_err(map_account_error)
    }

    fn remove_device(&self, account_number: &str, device_id: &str) -> Result<(), DaemonError> {
        self.client
            .send_with_timeout(
                "remove_device",
                json!({ "account_number": account_number, "device_id": device_id }),
                self.network_timeout,
            )
            .map(|_| ())
            .map_err(map_account_error)
    }

    fn update_relay_settings(&self, update: &RelaySettingsUpdate) -> Result<(), DaemonError> {
        self.command_with("update_relay_settings", update)
    }

    fn set_bridge_state(&self, state: BridgeState) -> Result<(), DaemonError> {
        self.command_with("set_bridge_state", &state)
    }

    fn set_bridge_settings(&self, settings: &BridgeSettings) -> Result<(), DaemonError> {
        self.command_with("set_bridge_settings", settings)
    }

    fn set_dns_options(&self, options: &DnsOptions) -> Result<(), DaemonError> {
        self.command_with("set_dns_options", options)
    }

    fn set_allow_lan(&self, allow_lan: bool) -> Result<(), DaemonError> {
        self.command("set_allow_lan", json!([allow_lan]))
    }

    fn set_auto_connect(&self, auto_connect: bool) -> Result<(), DaemonError> {
        self.command("set_auto_connect", json!([auto_connect]))
    }

    fn set_block_when_disconnected(&self, block: bool) -> Result<(), DaemonError> {
        self.command("set_block_when_disconnected", json!([block]))
    }

    fn set_enable_ipv6(&self, enable_ipv6: bool) -> Result<(), DaemonError> {
        self.command("set_enable_ipv6", json!([enable_ipv6]))
    }

    fn set_show_beta_releases(&self, show: bool) -> Result<(), DaemonError> {
        self.command("set_show_beta_releases", json!([show]))
    }

    fn set_openvpn_mssfix(&self, mssfix: Option<u16>) -> Result<(), DaemonError> {
        self.command("set_openvpn_mssfix", json!([mssfix]))
    }

    fn set_wireguard_mtu(&self, mtu: Option<u16>) -> Result<(), DaemonError> {
        self.command("set_wireguard_mtu", json!([mtu]))
    }

    fn set_wireguard_quantum_resistant(&self, enabled: Option<bool>) -> Result<(), DaemonError> {
        self.command("set_quantum_resistant_tunnel", json!([enabled]))
    }

    fn set_obfuscation_settings(&self, settings: &ObfuscationSettings) -> Result<(), DaemonError> {
        self.command_with("set_obfuscation_settings", settings)
    }

    fn set_enable_daita(&self, enable: bool) -> Result<(), DaemonError> {
        self.command("set_enable_daita", json!([enable]))
    }

    fn set_daita_direct_only(&self, direct_only: bool) -> Result<(), DaemonError> {
        self.command("set_daita_direct_only", json!([direct_only]))
    }

    fn add_api_access_method(&self, method: &NewAccessMethod) -> Result<String, DaemonError> {
        let params = serde_json::to_value(method)
            .map_err(|error| DaemonError::Parse(format!("Failed to encode method: {error}")))?;
        self.call("add_api_access_method", json!([params]))
    }

    fn update_api_access_method(&self, method: &AccessMethodSetting) -> Result<(), DaemonError> {
        self.command_with("update_api_access_method", method)
    }

    fn remove_api_access_method(&self, id: &str) -> Result<(), DaemonError> {
        self.command("remove_api_access_method", json!([id]))
    }

    fn set_api_access_method(&self, id: &str) -> Result<(), DaemonError> {
        self.command("set_api_access_method", json!([id]))
    }

    fn test_api_access_method(&self, id: &str) -> Result<bool, DaemonError> {
        self.call_network("test_api_access_method_by_id", json!([id]))
    }

    fn test_custom_api_access_method(&self, proxy: &CustomProxy) -> Result<bool, DaemonError> {
        let params = serde_json::to_value(proxy)
            .map_err(|error| DaemonError::Parse(format!("Failed to encode proxy: {error}")))?;
        self.call_network("test_custom_api_access_method", json!([params]))
    }

    fn get_split_tunneling_applications(
        &self,
    ) -> Result<Vec<SplitTunnelingApplication>, DaemonError> {
        self.call("get_split_tunnel_applications", Value::Null)
    }

    fn set_split_tunnel_state(&self, enabled: bool) -> Result<(), DaemonError> {
        self.command("set_split_tunnel_state", json!([enabled]))
    }

    fn add_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError> {
        self.command("add_split_tunnel_app", json!([path]))
    }

    fn remove_split_tunneling_application(&self, path: &str) -> Result<(), DaemonError> {
        self.command("remove_split_tunnel_app", json!([path]))
    }

    fn launch_excluded_application(&self, path: &str) -> Result<(), DaemonError> {
        system::launch_detached(&self.exclude_launcher, &[path]).map_err(DaemonError::Transport)
    }

    fn import_settings(&self, text: &str) -> Result<(), DaemonError> {
        self.command("apply_json_settings", json!([text]))
    }

    fn collect_problem_report(&self, to_redact: &[String]) -> Result<String, DaemonError> {
        self.call_network("collect_problem_report", json!([to_redact]))
    }

    fn send_problem_report(
        &self,
        email: &str,
        message: &str,
        report_path: Option<&str>,
    ) -> Result<(), DaemonError> {
        self.client
            .send_with_timeout(
                "send_problem_report",
                json!({ "email": email, "message": message, "report_path": report_path }),
                self.network_timeout,
            )
            .map(|_| ())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{
        io::{BufRead, BufReader},
        os::unix::net::UnixStream,
    };

    use super::*;
    use pretty_assertions::assert_eq;

    fn client_with_server(
        respond: impl Fn(Value) -> Vec<Value> + Send + 'static,
    ) -> JsonRpcClient {
        let (client_stream, server_stream) = UnixStream::pair().unwrap();
        std::thread::spawn(move || {
            let mut writer = server_stream.try_clone().unwrap();
            for line in BufReader::new(server_stream).lines() {
                let Ok(line) = line else { break };
                let request: Value = serde_json::from_str(&line).unwrap();
                for reply in respond(request) {
                    writeln!(writer, "{reply}").unwrap();
                }
            }
        });
        let reader = client_stream.try_clone().unwrap();
        JsonRpcClient::from_parts(
            Box::new(reader),
            Box::new(client_stream),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn scalar_params_are_wrapped_in_an_array() {
        assert_eq!(prepare_params(json!(true)), json!([true]));
        assert_eq!(prepare_params(Value::Null), json!([]));
        assert_eq!(prepare_params(json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn reply_is_matched_to_request_id() {
        let client = client_with_server(|request| {
            vec![json!({"jsonrpc": "2.0", "id": request["id"], "result": request["params"][0]})]
        });
        assert_eq!(client.send("echo", json!("hello")).unwrap(), json!("hello"));
    }

    #[test]
    fn remote_error_maps_to_invalid_account() {
        let client = client_with_server(|request| {
            vec![json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": -200, "message": "no such account"},
            })]
        });
        let error = client
            .send("get_account_data", json!("1234"))
            .map_err(map_account_error)
            .unwrap_err();
        assert_eq!(error, DaemonError::InvalidAccount);
    }

    #[test]
    fn split_tunnel_applications_come_from_the_service() {
        let client = client_with_server(|request| {
            let result = if request["method"] == "get_split_tunnel_applications" {
                json!([{"name": "Firefox", "absolute_path": "/usr/bin/firefox"}])
            } else {
                Value::Null
            };
            vec![json!({"jsonrpc": "2.0", "id": request["id"], "result": result})]
        });
        let daemon = DaemonRpc::with_client(client, &DaemonConfiguration::default());
        assert_eq!(
            daemon.get_split_tunneling_applications(),
            Ok(vec![SplitTunnelingApplication {
                name: "Firefox".into(),
                absolute_path: "/usr/bin/firefox".into(),
                icon: None,
                warning: None,
            }])
        );
    }

    #[test]
    fn unanswered_request_times_out() {
        let client = client_with_server(|_| Vec::new());
        assert_eq!(
            client.send("connect", Value::Null),
            Err(DaemonError::TimedOut("connect".into()))
        );
    }

    #[test]
    fn notifications_reach_subscribed_listener() {
        let client = client_with_server(|request| {
            let mut replies = vec![json!({"jsonrpc": "2.0", "id": request["id"], "result": 7})];
            if request["method"] == "get_state" {
                replies.push(json!({
                    "jsonrpc": "2.0",
                    "method": "daemon_event",
                    "params": {"subscription": 7, "result": {"tunnel_state": {"disconnecting": "reconnect"}}},
                }));
            }
            replies
        });
        let (sender, receiver) = mpsc::channel();
        client
            .subscribe(
                "daemon_event",
                Box::new(move |value| {
                    let _ = sender.send(value);
                }),
            )
            .unwrap();
        client.send("get_state", Value::Null).unwrap();
        let event: DaemonEvent =
            serde_json::from_value(receiver.recv_timeout(Duration::from_secs(1)).unwrap())
                .unwrap();
        assert_eq!(
            event,
            DaemonEvent::TunnelState(TunnelState::Disconnecting(AfterDisconnect::Reconnect))
        );
    }
}
