use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use futures::StreamExt;
use gpui::{
    AnyElement, App, AsyncApp, Context, Entity, FocusHandle, Focusable, MouseButton,
    MouseDownEvent, MouseMoveEvent, MouseUpEvent, ScrollHandle, ScrollWheelEvent, Subscription,
    WeakEntity, Window, actions, div, prelude::*, px, rgb, rgba,
};

use crate::{
    account::{self, TooManyDevices, VoucherState},
    blocking::BlockingSet,
    components::*,
    configuration::DaemonConfiguration,
    connection::{ConnectionPanel, SecuredLabel, TunnelCommand, displayed_location},
    daemon::{Daemon, DaemonError, DaemonRpc},
    dialog::{DialogResponse, DialogSources, active_dialog},
    gui_settings::GuiSettings,
    location::LocationType,
    location_list::{FilterState, LocationList, selected_location},
    map::{Coordinate, MapCamera, MarkerStyle},
    navigation::{EscapeOutcome, History, NavigationBarState, Route, handle_escape},
    notifications::{
        self, CloseTarget, InAppNotification, NotificationAction, NotificationContext,
        TroubleshootButton, TroubleshootInfo, select_notification, subtitle_segments,
    },
    problem_report::ProblemReport,
    scheduler::Scheduler,
    scrollbar::{
        self, AUTO_HIDE_DELAY, DEFAULT_PADDING, ScrollMetrics, ScrollbarState, TimerCommand,
        thumb_geometry,
    },
    settings::{
        ConfirmationGate, SettingsChange, api_access::ApiAccessPage, custom_dns::CustomDnsForm,
        import::ImportForm, openvpn::OpenVpnForm, split_tunneling::SplitTunnelingForm,
        wireguard::WireguardForm,
    },
    store::{AppStore, StoreAction, StoreEffect, reduce},
    system,
    text_input::{InputFilter, TextInput, TextInputEvent},
    theme::*,
};

actions!(
    vpn_client,
    [
        FocusNext,
        FocusPrevious,
        Back,
        BackToRoot,
        Quit,
        OpenSettings
    ]
);

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Every text field of the window. Fields live as long as the view so drafts survive
/// navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    AccountNumber,
    Voucher,
    LocationSearch,
    ApplicationSearch,
    Mssfix,
    Mtu,
    WireguardPort,
    ShadowsocksPort,
    DnsAddress,
    DnsEdit,
    ImportText,
    Email,
    Message,
    ProxyName,
    ProxyServer,
    ProxyPort,
    ProxyPassword,
    ProxyUsername,
}

impl InputField {
    const ALL: [InputField; 18] = [
        Self::AccountNumber,
        Self::Voucher,
        Self::LocationSearch,
        Self::ApplicationSearch,
        Self::Mssfix,
        Self::Mtu,
        Self::WireguardPort,
        Self::ShadowsocksPort,
        Self::DnsAddress,
        Self::DnsEdit,
        Self::ImportText,
        Self::Email,
        Self::Message,
        Self::ProxyName,
        Self::ProxyServer,
        Self::ProxyPort,
        Self::ProxyPassword,
        Self::ProxyUsername,
    ];

    /// Fields reachable with Tab on a page, in visual order.
    fn for_route(route: &Route) -> &'static [InputField] {
        match route {
            Route::Login => &[Self::AccountNumber],
            Route::RedeemVoucher => &[Self::Voucher],
            Route::SelectLocation => &[Self::LocationSearch],
            Route::SplitTunneling => &[Self::ApplicationSearch],
            Route::OpenVpnSettings => &[Self::Mssfix],
            Route::WireguardSettings => &[Self::WireguardPort, Self::ShadowsocksPort, Self::Mtu],
            Route::VpnSettings => &[Self::DnsAddress, Self::DnsEdit],
            Route::SettingsImport => &[Self::ImportText],
            Route::Support => &[Self::Email, Self::Message],
            Route::EditApiAccessMethod(_) => &[
                Self::ProxyName,
                Self::ProxyServer,
                Self::ProxyPort,
                Self::ProxyPassword,
                Self::ProxyUsername,
            ],
            _ => &[],
        }
    }
}

pub struct Inputs {
    account_number: Entity<TextInput>,
    voucher: Entity<TextInput>,
    location_search: Entity<TextInput>,
    application_search: Entity<TextInput>,
    mssfix: Entity<TextInput>,
    mtu: Entity<TextInput>,
    wireguard_port: Entity<TextInput>,
    shadowsocks_port: Entity<TextInput>,
    dns_address: Entity<TextInput>,
    dns_edit: Entity<TextInput>,
    import_text: Entity<TextInput>,
    email: Entity<TextInput>,
    message: Entity<TextInput>,
    proxy_name: Entity<TextInput>,
    proxy_server: Entity<TextInput>,
    proxy_port: Entity<TextInput>,
    proxy_password: Entity<TextInput>,
    proxy_username: Entity<TextInput>,
}

impl Inputs {
    fn new(context: &mut App) -> Self {
        let digits = InputFilter::Digits;
        Self {
            account_number: TextInput::with_filter(
                context,
                "0000 0000 0000 0000",
                None,
                digits,
            ),
            voucher: TextInput::new(context, "XXXX-XXXX-XXXX-XXXX", None),
            location_search: TextInput::new(context, "Search for...", None),
            application_search: TextInput::new(context, "Filter...", None),
            mssfix: TextInput::with_filter(context, "Default", None, digits),
            mtu: TextInput::with_filter(context, "Default", None, digits),
            wireguard_port: TextInput::with_filter(context, "Port", None, digits),
            shadowsocks_port: TextInput::with_filter(context, "Port", None, digits),
            dns_address: TextInput::new(context, "Enter IP", None),
            dns_edit: TextInput::new(context, "Enter IP", None),
            import_text: TextInput::new(context, "Paste settings here", None),
            email: TextInput::new(context, "Your email (optional)", None),
            message: TextInput::new(
                context,
                crate::problem_report::MESSAGE_PLACEHOLDER,
                None,
            ),
            proxy_name: TextInput::new(context, "Enter name", None),
            proxy_server: TextInput::new(context, "Enter IP address", None),
            proxy_port: TextInput::with_filter(context, "Enter port", None, digits),
            proxy_password: TextInput::new(context, "Enter password", None),
            proxy_username: TextInput::new(context, "Enter username", None),
        }
    }

    pub fn get(&self, field: InputField) -> &Entity<TextInput> {
        match field {
            InputField::AccountNumber => &self.account_number,
            InputField::Voucher => &self.voucher,
            InputField::LocationSearch => &self.location_search,
            InputField::ApplicationSearch => &self.application_search,
            InputField::Mssfix => &self.mssfix,
            InputField::Mtu => &self.mtu,
            InputField::WireguardPort => &self.wireguard_port,
            InputField::ShadowsocksPort => &self.shadowsocks_port,
            InputField::DnsAddress => &self.dns_address,
            InputField::DnsEdit => &self.dns_edit,
            InputField::ImportText => &self.import_text,
            InputField::Email => &self.email,
            InputField::Message => &self.message,
            InputField::ProxyName => &self.proxy_name,
            InputField::ProxyServer => &self.proxy_server,
            InputField::ProxyPort => &self.proxy_port,
            InputField::ProxyPassword => &self.proxy_password,
            InputField::ProxyUsername => &self.proxy_username,
        }
    }
}

pub struct AppInitialization {
    pub configuration: DaemonConfiguration,
    pub gui_settings: GuiSettings,
}

pub struct VpnApp {
    pub(crate) focus_handle: FocusHandle,
    pub(crate) primary_focus_handle: FocusHandle,
    configuration: DaemonConfiguration,
    pub(crate) daemon: Option<Arc<dyn Daemon>>,
    pub(crate) store: AppStore,
    pub(crate) gui_settings: GuiSettings,
    pub(crate) history: History,
    pub(crate) blocking: BlockingSet,
    pub(crate) confirmation_gate: ConfirmationGate,
    pub(crate) error_dialog: Option<String>,
    pub(crate) troubleshoot: Option<TroubleshootInfo>,
    pub(crate) inputs: Inputs,
    pub(crate) openvpn_form: OpenVpnForm,
    pub(crate) wireguard_form: WireguardForm,
    pub(crate) custom_dns: CustomDnsForm,
    pub(crate) split_tunneling: SplitTunnelingForm,
    pub(crate) import_form: ImportForm,
    pub(crate) api_access: ApiAccessPage,
    pub(crate) problem_report: ProblemReport,
    pub(crate) location_type: LocationType,
    pub(crate) exit_locations: LocationList,
    pub(crate) entry_locations: LocationList,
    pub(crate) filter: Option<FilterState>,
    pub(crate) too_many_devices: Option<TooManyDevices>,
    pub(crate) voucher: VoucherState,
    pub(crate) connection_panel: ConnectionPanel,
    pub(crate) map_camera: MapCamera,
    pub(crate) scroll_handle: ScrollHandle,
    scrollbar: ScrollbarState,
    scrollbar_timer: Scheduler,
    reconnect_timer: Scheduler,
    started: Instant,
    _subscriptions: Vec<Subscription>,
}

impl VpnApp {
    pub fn new(initialization: AppInitialization, context: &mut Context<Self>) -> Self {
        let inputs = Inputs::new(context);
        let subscriptions = InputField::ALL
            .iter()
            .map(|field| {
                let field = *field;
                context.subscribe(
                    inputs.get(field),
                    move |this, _, event: &TextInputEvent, context| {
                        this.on_input_event(field, event, context)
                    },
                )
            })
            .collect();

        let gui_version = env!("CARGO_PKG_VERSION");
        let store = AppStore::new(gui_version);
        let settings = store.settings.clone();
        let auto_hide = initialization.gui_settings.auto_hide_scrollbars;

        let mut app = Self {
            focus_handle: context.focus_handle(),
            primary_focus_handle: context.focus_handle(),
            configuration: initialization.configuration,
            daemon: None,
            store,
            gui_settings: initialization.gui_settings,
            history: History::new(Route::Launch),
            blocking: BlockingSet::default(),
            confirmation_gate: ConfirmationGate::default(),
            error_dialog: None,
            troubleshoot: None,
            inputs,
            openvpn_form: OpenVpnForm::new(&settings),
            wireguard_form: WireguardForm::new(&settings),
            custom_dns: CustomDnsForm::default(),
            split_tunneling: SplitTunnelingForm::default(),
            import_form: ImportForm::default(),
            api_access: ApiAccessPage::default(),
            problem_report: ProblemReport::default(),
            location_type: LocationType::Exit,
            exit_locations: LocationList::default(),
            entry_locations: LocationList::default(),
            filter: None,
            too_many_devices: None,
            voucher: VoucherState::Idle,
            connection_panel: ConnectionPanel::default(),
            map_camera: MapCamera::new(Coordinate::default(), MarkerStyle::Unsecure),
            scroll_handle: ScrollHandle::new(),
            scrollbar: ScrollbarState::new(auto_hide),
            scrollbar_timer: Scheduler::default(),
            reconnect_timer: Scheduler::default(),
            started: Instant::now(),
            _subscriptions: subscriptions,
        };

        if app.gui_settings.changelog_seen_version.is_none() {
            app.gui_settings.changelog_seen_version = Some(gui_version.to_string());
            app.gui_settings.save();
        }

        app.connect_daemon(context);
        app
    }

    pub fn initial_focus(&self) -> FocusHandle {
        self.focus_handle.clone()
    }

    pub(crate) fn input_text(&self, field: InputField, context: &App) -> String {
        self.inputs.get(field).read(context).text()
    }

    /// Refills an input from pushed state, leaving the caret alone when nothing changed.
    fn sync_input_text(&self, field: InputField, text: &str, context: &mut Context<Self>) {
        if self.input_text(field, context) != text {
            self.set_input_text(field, text, context);
        }
    }

    pub(crate) fn set_input_text(&self, field: InputField, text: &str, context: &mut Context<Self>) {
        self.inputs
            .get(field)
            .update(context, |input, context| input.set_text(text, context));
    }

    // Daemon connection

    fn connect_daemon(&mut self, context: &mut Context<Self>) {
        let configuration = self.configuration.clone();
        let executor = context.background_executor().clone();
        log::info!(
            "[daemon] connecting to {}",
            configuration.socket_path.display()
        );

        context
            .spawn(async move |this: WeakEntity<Self>, context: &mut AsyncApp| {
                let connected = executor
                    .spawn(async move {
                        let daemon = DaemonRpc::connect(&configuration)?;
                        let events = daemon.subscribe()?;
                        let initial = load_initial_state(&daemon)?;
                        let daemon: Arc<dyn Daemon> = Arc::new(daemon);
                        Ok::<_, DaemonError>((daemon, events, initial))
                    })
                    .await;

                let mut events = match connected {
                    Ok((daemon, events, initial)) => {
                        if let Err(error) = this.update(context, |this, context| {
                            log::info!("[daemon] connected");
                            this.daemon = Some(daemon);
                            this.dispatch(initial, context);
                        }) {
                            log::warn!("[daemon] view dropped while connecting: {error}");
                            return;
                        }
                        events
                    }
                    Err(error) => {
                        log::warn!("[daemon] unable to connect: {error}");
                        if let Err(error) = this.update(context, |this, context| {
                            this.schedule_reconnect(context);
                            context.notify();
                        }) {
                            log::warn!("[daemon] view dropped after failed connect: {error}");
                        }
                        return;
                    }
                };

                while let Some(event) = events.next().await {
                    log::debug!("[daemon] event {event:?}");
                    if this
                        .update(context, |this, context| {
                            this.dispatch(StoreAction::Event(event), context)
                        })
                        .is_err()
                    {
                        return;
                    }
                }

                log::warn!("[daemon] event stream closed");
                if let Err(error) = this.update(context, |this, context| {
                    this.daemon = None;
                    this.dispatch(StoreAction::DaemonDisconnected, context);
                    this.schedule_reconnect(context);
                }) {
                    log::warn!("[daemon] view dropped after disconnect: {error}");
                }
            })
            .detach();
    }

    fn schedule_reconnect(&mut self, context: &mut Context<Self>) {
        self.reconnect_timer
            .schedule(RECONNECT_DELAY, context, |this, context| this.connect_daemon(context));
    }

    /// Runs a blocking daemon call on the background executor and hands the result back
    /// to the view. Calls made while disconnected are dropped.
    pub(crate) fn spawn_daemon<R: Send + 'static>(
        &self,
        tag: &'static str,
        context: &mut Context<Self>,
        job: impl FnOnce(&dyn Daemon) -> R + Send + 'static,
        done: impl FnOnce(&mut Self, R, &mut Context<Self>) + 'static,
    ) {
        let Some(daemon) = self.daemon.clone() else {
            log::warn!("[{tag}] ignored while disconnected from the service");
            return;
        };
        let executor = context.background_executor().clone();
        context
            .spawn(async move |this: WeakEntity<Self>, context: &mut AsyncApp| {
                let result = executor.spawn(async move { job(daemon.as_ref()) }).await;
                if let Err(error) = this.update(context, |this, context| {
                    done(this, result, context);
                    context.notify();
                }) {
                    log::warn!("[{tag}] view dropped before the call finished: {error}");
                }
            })
            .detach();
    }

    /// Like `spawn_daemon`, but the control owning `key` stays disabled until the call
    /// resolves and repeated presses are ignored.
    pub(crate) fn run_daemon<R: Send + 'static>(
        &mut self,
        key: &'static str,
        context: &mut Context<Self>,
        job: impl FnOnce(&dyn Daemon) -> R + Send + 'static,
        done: impl FnOnce(&mut Self, R, &mut Context<Self>) + 'static,
    ) {
        if self.daemon.is_none() || !self.blocking.begin(key) {
            return;
        }
        context.notify();
        self.spawn_daemon(key, context, job, move |this, result, context| {
            this.blocking.finish(key);
            done(this, result, context);
        });
    }

    // Store

    pub(crate) fn dispatch(&mut self, action: StoreAction, context: &mut Context<Self>) {
        let effects = reduce(&mut self.store, action);
        for effect in effects {
            match effect {
                StoreEffect::ResetNavigation(route) => self.reset(route, context),
                StoreEffect::FetchAccountData(account_number) => {
                    self.fetch_account_data(account_number, context)
                }
                StoreEffect::FetchAccountHistory => self.fetch_account_history(context),
            }
        }
        self.route_for_expiry(context);
        self.sync_forms(context);
        self.sync_map();
        context.notify();
    }

    fn fetch_account_data(&self, account_number: String, context: &mut Context<Self>) {
        let devices_account = account_number.clone();
        self.spawn_daemon(
            "account",
            context,
            move |daemon| daemon.get_account_data(&account_number),
            |this, result, context| match result {
                Ok(data) => this.dispatch(StoreAction::AccountExpiry(Some(data.expiry)), context),
                Err(error) => log::error!("[account] failed to fetch account data: {error}"),
            },
        );
        self.spawn_daemon(
            "devices",
            context,
            move |daemon| daemon.list_devices(&devices_account),
            |this, result, context| match result {
                Ok(devices) => this.dispatch(StoreAction::Devices(devices), context),
                Err(error) => log::warn!("[devices] failed to list devices: {error}"),
            },
        );
    }

    fn fetch_account_history(&self, context: &mut Context<Self>) {
        self.spawn_daemon(
            "account-history",
            context,
            |daemon| daemon.get_account_history(),
            |this, result, context| match result {
                Ok(history) => {
                    if let Some(account_number) = &history
                        && this.input_text(InputField::AccountNumber, context).is_empty()
                    {
                        this.set_input_text(InputField::AccountNumber, account_number, context);
                    }
                    this.dispatch(StoreAction::AccountHistory(history), context);
                }
                Err(error) => log::warn!("[account] failed to fetch account history: {error}"),
            },
        );
    }

    /// An expired account replaces the main view, and new time brings it back.
    fn route_for_expiry(&mut self, context: &mut Context<Self>) {
        let expired = self.store.account_expired(Utc::now());
        match self.history.current() {
            Route::Main if expired => self.reset(Route::ExpiredAccount, context),
            Route::ExpiredAccount if !expired && self.store.account.expiry.is_some() => {
                self.reset(Route::TimeAdded, context)
            }
            _ => {}
        }
    }

    fn sync_forms(&mut self, context: &mut Context<Self>) {
        let settings = &self.store.settings;
        let route = self.history.current().clone();

        if self.openvpn_form.mssfix.sync(
            settings.tunnel_options.openvpn.mssfix,
            route == Route::OpenVpnSettings,
        ) {
            let mssfix = self.openvpn_form.mssfix.text.clone();
            self.sync_input_text(InputField::Mssfix, &mssfix, context);
        }
        if self.wireguard_form.mtu.sync(
            settings.tunnel_options.wireguard.mtu,
            route == Route::WireguardSettings,
        ) {
            let mtu = self.wireguard_form.mtu.text.clone();
            self.sync_input_text(InputField::Mtu, &mtu, context);
        }

        if self.scrollbar.auto_hide != self.gui_settings.auto_hide_scrollbars {
            self.scrollbar = ScrollbarState::new(self.gui_settings.auto_hide_scrollbars);
        }
    }

    fn sync_map(&mut self) {
        let Some(location) = displayed_location(&self.store.tunnel_state) else {
            return;
        };
        let coordinate = Coordinate::new(location.longitude, location.latitude);
        let secure = SecuredLabel::for_state(
            &self.store.tunnel_state,
            self.store.settings.block_when_disconnected,
        )
        .is_secure();
        let marker = if secure {
            MarkerStyle::Secure
        } else {
            MarkerStyle::Unsecure
        };
        if self.map_camera.target() != coordinate || self.map_camera.marker() != marker {
            let now = self.started.elapsed().as_secs_f64();
            self.map_camera.set_location(coordinate, marker, now);
        }
    }

    pub(crate) fn map_time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    // Settings

    /// Sends a settings change, asking the user first when it weakens their protection.
    pub(crate) fn apply_change(&mut self, change: SettingsChange, context: &mut Context<Self>) {
        match self
            .confirmation_gate
            .request(change, &self.store.settings)
        {
            Some(change) => self.submit_change(change, context),
            None => context.notify(),
        }
    }

    pub(crate) fn submit_change(&mut self, change: SettingsChange, context: &mut Context<Self>) {
        self.submit_changes(vec![change], context);
    }

    /// Applies dependent changes in order on one background task; the first failure stops
    /// the rest.
    pub(crate) fn submit_changes(
        &mut self,
        changes: Vec<SettingsChange>,
        context: &mut Context<Self>,
    ) {
        let Some(key) = changes.first().map(SettingsChange::key) else {
            return;
        };
        self.run_daemon(
            key,
            context,
            move |daemon| {
                changes
                    .iter()
                    .try_for_each(|change| change.apply(daemon))
            },
            move |this, result, _| {
                if let Err(error) = result {
                    log::error!("[settings] {key} failed: {error}");
                    this.error_dialog = Some(error.user_message());
                }
            },
        );
    }

    pub(crate) fn save_gui_settings(&mut self, context: &mut Context<Self>) {
        self.gui_settings.save();
        if self.scrollbar.auto_hide != self.gui_settings.auto_hide_scrollbars {
            self.scrollbar = ScrollbarState::new(self.gui_settings.auto_hide_scrollbars);
            self.scrollbar_timer.cancel();
        }
        context.notify();
    }

    pub(crate) fn open_url(&self, url: &str, with_auth: bool, context: &mut Context<Self>) {
        let url = url.to_string();
        let daemon = self.daemon.clone();
        let executor = context.background_executor().clone();
        executor
            .spawn(async move {
                let url = match (with_auth, daemon) {
                    (true, Some(daemon)) => match daemon.get_auth_token() {
                        Ok(token) => format!("{url}?token={token}"),
                        Err(error) => {
                            log::warn!("[browser] no auth token, opening plain url: {error}");
                            url
                        }
                    },
                    _ => url,
                };
                if let Err(error) = system::open_url(&url) {
                    log::error!("[browser] {error}");
                }
            })
            .detach();
    }

    pub(crate) fn run_tunnel_command(&mut self, command: TunnelCommand, context: &mut Context<Self>) {
        log::info!("[tunnel] {}", command.key());
        self.run_daemon(
            command.key(),
            context,
            move |daemon| command.run(daemon),
            move |this, result, _| {
                if let Err(error) = result {
                    log::error!("[tunnel] {} failed: {error}", command.key());
                    this.error_dialog = Some(error.user_message());
                }
            },
        );
    }

    // Navigation

    pub(crate) fn push(&mut self, route: Route, context: &mut Context<Self>) {
        if self.history.current() == &route {
            return;
        }
        let leaving = self.history.current().clone();
        self.on_route_leave(&leaving, context);
        self.history
            .push(route.clone(), scrollbar::current_offset(&self.scroll_handle));
        scrollbar::restore_offset(&self.scroll_handle, 0.0);
        self.on_route_enter(&route, context);
        context.notify();
    }

    pub(crate) fn pop(&mut self, context: &mut Context<Self>) {
        let leaving = self.history.current().clone();
        if let Some(offset) = self.history.pop() {
            self.on_route_leave(&leaving, context);
            scrollbar::restore_offset(&self.scroll_handle, offset);
            context.notify();
        }
    }

    pub(crate) fn reset(&mut self, route: Route, context: &mut Context<Self>) {
        let leaving = self.history.current().clone();
        self.on_route_leave(&leaving, context);
        self.history.reset(route.clone());
        scrollbar::restore_offset(&self.scroll_handle, 0.0);
        self.on_route_enter(&route, context);
        context.notify();
    }

    fn on_route_enter(&mut self, route: &Route, context: &mut Context<Self>) {
        let settings = self.store.settings.clone();
        match route {
            Route::SelectLocation => {
                self.exit_locations =
                    LocationList::new(selected_location(LocationType::Exit, &settings).as_ref());
                self.entry_locations =
                    LocationList::new(selected_location(LocationType::Entry, &settings).as_ref());
                self.set_input_text(InputField::LocationSearch, "", context);
            }
            Route::Filter => {
                self.filter = Some(FilterState::for_location(
                    &self.store.relay_list,
                    self.location_type,
                    &settings,
                ));
            }
            Route::OpenVpnSettings => {
                self.openvpn_form = OpenVpnForm::new(&settings);
                let text = self.openvpn_form.mssfix.text.clone();
                self.set_input_text(InputField::Mssfix, &text, context);
            }
            Route::WireguardSettings => {
                self.wireguard_form = WireguardForm::new(&settings);
                let form = self.wireguard_form.clone();
                self.set_input_text(InputField::Mtu, &form.mtu.text, context);
                self.set_input_text(InputField::WireguardPort, &form.custom_port.text, context);
                self.set_input_text(
                    InputField::ShadowsocksPort,
                    &form.shadowsocks_port.text,
                    context,
                );
            }
            Route::VpnSettings => {
                self.custom_dns = CustomDnsForm::default();
                self.set_input_text(InputField::DnsAddress, "", context);
            }
            Route::SplitTunneling => self.load_split_tunneling_applications(context),
            Route::EditApiAccessMethod(id) => self.open_access_method_form(id.clone(), context),
            Route::Support => {
                if self.problem_report.reset_after_success() {
                    self.set_input_text(InputField::Email, "", context);
                }
                self.collect_problem_report(context);
            }
            Route::RedeemVoucher => {
                self.voucher = VoucherState::Idle;
                self.set_input_text(InputField::Voucher, "", context);
            }
            _ => {}
        }
    }

    fn on_route_leave(&mut self, route: &Route, context: &mut Context<Self>) {
        match route {
            Route::SettingsImport => self.import_form.leave(),
            Route::Support => self.problem_report.leave(),
            Route::EditApiAccessMethod(_) => self.api_access.close_form(),
            Route::VpnSettings => self.custom_dns.abort(),
            Route::OpenVpnSettings => {
                if let Some(change) = self.openvpn_form.mssfix_change() {
                    self.submit_change(change, context);
                }
            }
            Route::WireguardSettings => {
                if let Some(change) = self.wireguard_form.mtu_change() {
                    self.submit_change(change, context);
                }
            }
            _ => {}
        }
    }

    // Dialogs

    fn dialog_sources(&self) -> DialogSources<'_> {
        DialogSources {
            route: self.history.current(),
            store: &self.store,
            error: self.error_dialog.as_deref(),
            troubleshoot: self.troubleshoot.as_ref(),
            confirmation_gate: &self.confirmation_gate,
            custom_dns: &self.custom_dns,
            too_many_devices: self.too_many_devices.as_ref(),
            api_access: &self.api_access,
            split_tunneling: &self.split_tunneling,
            problem_report: &self.problem_report,
        }
    }

    fn handle_dialog_response(&mut self, response: DialogResponse, context: &mut Context<Self>) {
        let settings = self.store.settings.clone();
        match response {
            DialogResponse::Dismiss => {
                if self.error_dialog.take().is_none() {
                    self.troubleshoot = None;
                }
            }
            DialogResponse::ConfirmSetting => {
                if let Some(change) = self.confirmation_gate.confirm() {
                    self.submit_change(change, context);
                }
            }
            DialogResponse::CancelSetting => self.confirmation_gate.cancel(),
            DialogResponse::ConfirmCustomDns => {
                if let Some(change) = self.custom_dns.confirm(&settings) {
                    self.set_input_text(InputField::DnsAddress, "", context);
                    self.submit_change(change, context);
                }
            }
            DialogResponse::AbortCustomDns => self.custom_dns.abort(),
            DialogResponse::RemoveDevice => self.remove_device(context),
            DialogResponse::KeepDevice => {
                if let Some(page) = &mut self.too_many_devices {
                    page.cancel_removal();
                }
            }
            DialogResponse::RemoveAccessMethod => self.remove_access_method(context),
            DialogResponse::KeepAccessMethod => self.api_access.cancel_remove(),
            DialogResponse::SaveAccessMethodAnyway => self.save_access_method(true, context),
            DialogResponse::KeepEditingAccessMethod => self.api_access.save_unreachable = false,
            DialogResponse::LaunchApplication => {
                if let Some(application) = self.split_tunneling.accept_warning() {
                    self.launch_application(application, context);
                }
            }
            DialogResponse::CancelLaunch => self.split_tunneling.dismiss_warning(),
            DialogResponse::DismissLaunchError => self.split_tunneling.dismiss_error(),
            DialogResponse::SendWithoutEmail => self.send_problem_report(context),
            DialogResponse::CancelSend => self.problem_report.cancel_confirmation(),
            DialogResponse::UpgradeApp => self.open_url(notifications::DOWNLOAD_URL, false, context),
            DialogResponse::AcknowledgeOutdated => self.problem_report.acknowledge_outdated(),
            DialogResponse::Troubleshoot(button) => {
                self.troubleshoot = None;
                match button {
                    TroubleshootButton::OpenSystemSettings => {
                        let executor = context.background_executor().clone();
                        executor
                            .spawn(async move {
                                if let Err(error) = system::open_system_settings() {
                                    log::error!("[troubleshoot] {error}");
                                }
                            })
                            .detach();
                    }
                    TroubleshootButton::DisableSplitTunneling => self.apply_change(
                        crate::settings::split_tunneling::set_enabled(false),
                        context,
                    ),
                }
            }
        }
        context.notify();
    }

    fn on_notification_action(&mut self, action: NotificationAction, context: &mut Context<Self>) {
        match action {
            NotificationAction::OpenUrl { url, with_auth } => self.open_url(&url, with_auth, context),
            NotificationAction::Troubleshoot(info) => self.troubleshoot = Some(info),
            NotificationAction::Close(CloseTarget::NewDeviceBanner) => {
                self.dispatch(StoreAction::HideNewDeviceBanner, context)
            }
            NotificationAction::Close(CloseTarget::Changelog) => {
                self.gui_settings.changelog_seen_version = Some(self.store.version.gui.clone());
                self.save_gui_settings(context);
            }
        }
        context.notify();
    }

    // Text fields

    fn on_input_event(
        &mut self,
        field: InputField,
        event: &TextInputEvent,
        context: &mut Context<Self>,
    ) {
        match event {
            TextInputEvent::Changed(text) => self.on_input_changed(field, text, context),
            TextInputEvent::Submitted(text) => self.on_input_submitted(field, text, context),
            TextInputEvent::Blurred => match field {
                InputField::Mssfix | InputField::Mtu => {
                    let text = self.input_text(field, context);
                    self.on_input_submitted(field, &text, context)
                }
                _ => {}
            },
        }
        context.notify();
    }

    fn on_input_changed(&mut self, field: InputField, text: &str, context: &mut Context<Self>) {
        match field {
            InputField::AccountNumber => self.dispatch(StoreAction::ResetLoginError, context),
            InputField::Voucher => {
                if matches!(self.voucher, VoucherState::Failure(_)) {
                    self.voucher = VoucherState::Idle;
                }
            }
            InputField::LocationSearch => self.set_location_search(text),
            InputField::ApplicationSearch => self.split_tunneling.set_search_term(text),
            InputField::Mssfix => self.openvpn_form.set_mssfix_text(text),
            InputField::Mtu => self.wireguard_form.mtu.set_text(text),
            InputField::WireguardPort => {
                self.wireguard_form.custom_port.set_text(text);
                self.wireguard_form.custom_port_error = None;
            }
            InputField::ShadowsocksPort => {
                self.wireguard_form.shadowsocks_port.set_text(text);
                self.wireguard_form.shadowsocks_port_error = None;
            }
            InputField::DnsAddress => self.custom_dns.set_input(text),
            InputField::DnsEdit => self.custom_dns.edit_error = None,
            InputField::ImportText => self.import_form.set_text(text),
            InputField::Email => self.problem_report.set_email(text),
            InputField::Message => self.problem_report.set_message(text),
            InputField::ProxyName
            | InputField::ProxyServer
            | InputField::ProxyPort
            | InputField::ProxyPassword
            | InputField::ProxyUsername => {
                if let Some(form) = &mut self.api_access.form {
                    let target = match field {
                        InputField::ProxyName => &mut form.name,
                        InputField::ProxyServer => &mut form.server,
                        InputField::ProxyPort => &mut form.port,
                        InputField::ProxyPassword => &mut form.password,
                        _ => &mut form.username,
                    };
                    *target = text.to_string();
                }
            }
        }
    }

    fn on_input_submitted(&mut self, field: InputField, text: &str, context: &mut Context<Self>) {
        let settings = self.store.settings.clone();
        let change = match field {
            InputField::AccountNumber => {
                self.login(context);
                None
            }
            InputField::Voucher => {
                self.submit_voucher(context);
                None
            }
            InputField::Mssfix => self.openvpn_form.mssfix_change(),
            InputField::Mtu => self.wireguard_form.mtu_change(),
            InputField::WireguardPort => self
                .wireguard_form
                .custom_port_change(&settings, &self.store.relay_list),
            InputField::ShadowsocksPort => self
                .wireguard_form
                .shadowsocks_port_change(&settings, &self.store.relay_list),
            InputField::DnsAddress => {
                let change = self.custom_dns.submit(&settings);
                if change.is_some() {
                    self.set_input_text(InputField::DnsAddress, "", context);
                }
                change
            }
            InputField::DnsEdit => self.custom_dns.submit_edit(&settings, text),
            InputField::ImportText => {
                self.import_text(context);
                None
            }
            InputField::ProxyName
            | InputField::ProxyServer
            | InputField::ProxyPort
            | InputField::ProxyPassword
            | InputField::ProxyUsername => {
                self.save_access_method(false, context);
                None
            }
            InputField::LocationSearch
            | InputField::ApplicationSearch
            | InputField::Email
            | InputField::Message => None,
        };
        if let Some(change) = change {
            self.apply_change(change, context);
        }
    }

    // Actions

    fn focusable_entries(&self, context: &App) -> Vec<FocusHandle> {
        let mut entries: Vec<FocusHandle> = InputField::for_route(self.history.current())
            .iter()
            .map(|field| self.inputs.get(*field).read(context).focus_handle.clone())
            .collect();
        entries.push(self.primary_focus_handle.clone());
        entries
    }

    fn focus_next(&mut self, _: &FocusNext, window: &mut Window, context: &mut Context<Self>) {
        let entries = self.focusable_entries(context);
        let next = entries
            .iter()
            .position(|handle| handle.is_focused(window))
            .map_or(0, |current| (current + 1) % entries.len());
        window.focus(&entries[next], context);
    }

    fn focus_previous(
        &mut self,
        _: &FocusPrevious,
        window: &mut Window,
        context: &mut Context<Self>,
    ) {
        let entries = self.focusable_entries(context);
        let previous = match entries.iter().position(|handle| handle.is_focused(window)) {
            Some(0) | None => entries.len() - 1,
            Some(current) => current - 1,
        };
        window.focus(&entries[previous], context);
    }

    fn back(&mut self, _: &Back, _window: &mut Window, context: &mut Context<Self>) {
        let dialog = active_dialog(&self.dialog_sources());
        let leaving = self.history.current().clone();
        match handle_escape(dialog.is_some(), &mut self.history) {
            EscapeOutcome::CloseDialog => {
                if let Some(dialog) = dialog {
                    self.handle_dialog_response(dialog.cancel, context);
                }
            }
            EscapeOutcome::Back(offset) => {
                self.on_route_leave(&leaving, context);
                scrollbar::restore_offset(&self.scroll_handle, offset);
            }
            EscapeOutcome::Ignored => {}
        }
        context.notify();
    }

    fn back_to_root(&mut self, _: &BackToRoot, _window: &mut Window, context: &mut Context<Self>) {
        let leaving = self.history.current().clone();
        if let Some(offset) = self.history.pop_to_root() {
            self.on_route_leave(&leaving, context);
            scrollbar::restore_offset(&self.scroll_handle, offset);
            context.notify();
        }
    }

    fn open_settings(&mut self, _: &OpenSettings, _window: &mut Window, context: &mut Context<Self>) {
        if matches!(
            self.history.current(),
            Route::Main | Route::ExpiredAccount | Route::Login | Route::Launch
        ) {
            self.push(Route::Settings, context);
        }
    }

    pub(crate) fn quit(&mut self, _: &Quit, _window: &mut Window, context: &mut Context<Self>) {
        log::info!("[quit] shutting down");
        self.gui_settings.save();
        context.quit();
    }

    /// Disconnects the tunnel first and quits once the call returns.
    pub(crate) fn disconnect_and_quit(&mut self, context: &mut Context<Self>) {
        if self.daemon.is_none() {
            context.quit();
            return;
        }
        self.spawn_daemon(
            "quit",
            context,
            |daemon| daemon.disconnect_tunnel(),
            |this, result, context| {
                if let Err(error) = result {
                    log::error!("[quit] failed to disconnect: {error}");
                }
                this.gui_settings.save();
                context.quit();
            },
        );
    }

    // Scrollbar

    fn apply_timer_command(&mut self, command: TimerCommand, context: &mut Context<Self>) {
        match command {
            TimerCommand::Start => {
                self.scrollbar_timer
                    .schedule(AUTO_HIDE_DELAY, context, |this, context| {
                        this.scrollbar.on_auto_hide_elapsed();
                        context.notify();
                    })
            }
            TimerCommand::Cancel => self.scrollbar_timer.cancel(),
            TimerCommand::Keep => {}
        }
        context.notify();
    }

    fn on_scroll_wheel(
        &mut self,
        _: &ScrollWheelEvent,
        _window: &mut Window,
        context: &mut Context<Self>,
    ) {
        let command = self.scrollbar.on_wheel_scroll();
        self.apply_timer_command(command, context);
    }

    fn on_thumb_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        _window: &mut Window,
        _context: &mut Context<Self>,
    ) {
        self.scrollbar.on_drag_start(
            f32::from(event.position.y),
            scrollbar::current_offset(&self.scroll_handle),
        );
    }

    fn on_mouse_move(
        &mut self,
        event: &MouseMoveEvent,
        _window: &mut Window,
        context: &mut Context<Self>,
    ) {
        if !self.scrollbar.is_dragging() {
            return;
        }
        let metrics = ScrollMetrics::from_handle(&self.scroll_handle);
        if let Some(scroll_top) =
            self.scrollbar
                .on_drag_move(f32::from(event.position.y), &metrics, DEFAULT_PADDING)
        {
            scrollbar::scroll_to(&self.scroll_handle, scroll_top);
            context.notify();
        }
    }

    fn on_mouse_up(&mut self, event: &MouseUpEvent, window: &mut Window, context: &mut Context<Self>) {
        if !self.scrollbar.is_dragging() {
            return;
        }
        let bounds = self.scroll_handle.bounds();
        let track_left = bounds.origin.x + bounds.size.width - px(SCROLLBAR_WIDTH_WIDE * 2.0);
        let inside = bounds.contains(&event.position) && event.position.x >= track_left;
        let command = self.scrollbar.on_mouse_up(inside);
        self.apply_timer_command(command, context);
        window.refresh();
    }
}

fn load_initial_state(daemon: &dyn Daemon) -> Result<StoreAction, DaemonError> {
    Ok(StoreAction::DaemonConnected {
        settings: Box::new(daemon.get_settings()?),
        tunnel_state: daemon.get_tunnel_state()?,
        relay_list: daemon.get_relay_list()?,
        device_state: daemon.get_device_state()?,
        current_version: daemon.get_current_version()?,
        version_info: daemon.get_version_info()?,
    })
}

impl Focusable for VpnApp {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for VpnApp {
    fn render(&mut self, window: &mut Window, context: &mut Context<Self>) -> impl IntoElement {
        let now = self.map_time();
        if self.map_camera.update(now) {
            window.request_animation_frame();
        }

        let metrics = ScrollMetrics::from_handle(&self.scroll_handle);
        let thumb = thumb_geometry(&metrics, DEFAULT_PADDING);
        if thumb.can_scroll != self.scrollbar.can_scroll {
            let command = self.scrollbar.on_can_scroll_changed(thumb.can_scroll);
            self.apply_timer_command(command, context);
        }

        let route = self.history.current().clone();
        let active = active_dialog(&self.dialog_sources());
        let notification = if matches!(route, Route::Main) {
            select_notification(&NotificationContext {
                store: &self.store,
                gui_settings: &self.gui_settings,
                now: Utc::now(),
            })
        } else {
            None
        };
        let navigation_state =
            NavigationBarState::for_scroll_offset(scrollbar::current_offset(&self.scroll_handle));

        div()
            .key_context("VpnApp")
            .track_focus(&self.focus_handle(context))
            .on_action(context.listener(Self::focus_next))
            .on_action(context.listener(Self::focus_previous))
            .on_action(context.listener(Self::back))
            .on_action(context.listener(Self::back_to_root))
            .on_action(context.listener(Self::quit))
            .on_action(context.listener(Self::open_settings))
            .on_mouse_move(context.listener(Self::on_mouse_move))
            .on_mouse_up(MouseButton::Left, context.listener(Self::on_mouse_up))
            .relative()
            .flex()
            .flex_col()
            .size_full()
            .bg(rgb(SURFACE))
            .text_color(rgb(TEXT_PRIMARY))
            .child(self.render_titlebar(context))
            .when(!route.is_root(), |element| {
                element.child(navigation_bar(
                    route.title(),
                    navigation_state,
                    back_button()
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.pop(context)),
                        )
                        .into_any_element(),
                ))
            })
            .when_some(notification, |element, notification| {
                element.child(self.render_notification(notification, context))
            })
            .child(
                div()
                    .relative()
                    .flex_1()
                    .overflow_hidden()
                    .child(
                        div()
                            .id("page-scroll")
                            .size_full()
                            .flex()
                            .flex_col()
                            .overflow_y_scroll()
                            .track_scroll(&self.scroll_handle)
                            .on_scroll_wheel(context.listener(Self::on_scroll_wheel))
                            .child(self.render_page(&route, window, context)),
                    )
                    .child(self.render_scrollbar(thumb.height, thumb.y, thumb.can_scroll, context)),
            )
            .when_some(active, |element, content| {
                let details = content
                    .details
                    .iter()
                    .map(|detail| paragraph(detail.clone()).into_any_element())
                    .collect();
                let buttons = content
                    .buttons
                    .into_iter()
                    .enumerate()
                    .map(|(index, button)| {
                        let response = button.response;
                        button_action(
                            ("dialog-button", index),
                            button.label,
                            button.style,
                            false,
                            None,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                this.handle_dialog_response(response, context)
                            }),
                        )
                        .into_any_element()
                    })
                    .collect();
                element.child(dialog(content.message, details, buttons))
            })
    }
}

impl VpnApp {
    fn render_titlebar(&self, context: &mut Context<Self>) -> impl IntoElement {
        div()
            .flex()
            .flex_row()
            .flex_shrink_0()
            .items_center()
            .w_full()
            .h(px(TITLEBAR_HEIGHT))
            .bg(rgb(TITLEBAR_BACKGROUND))
            .child(
                titlebar_title("VPN")
                    .on_mouse_down(
                        MouseButton::Left,
                        context.listener(|_, _, window, _| window.start_window_move()),
                    ),
            )
            .child(titlebar_button("titlebar-minimize", "−", false).on_mouse_up(
                MouseButton::Left,
                context.listener(|_, _, window, _| window.minimize_window()),
            ))
            .child(titlebar_button("titlebar-close", "✕", true).on_mouse_up(
                MouseButton::Left,
                context.listener(|this, _, window, context| this.quit(&Quit, window, context)),
            ))
    }

    fn render_notification(
        &self,
        notification: InAppNotification,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let subtitle = notification.subtitle.as_deref().map(|subtitle| {
            div()
                .flex()
                .flex_row()
                .flex_wrap()
                .text_size(px(TEXT_SIZE_SMALL))
                .text_color(rgb(TEXT_DIM))
                .children(
                    subtitle_segments(subtitle)
                        .into_iter()
                        .map(|(text, bold)| {
                            div()
                                .when(bold, |element| {
                                    element
                                        .font_weight(gpui::FontWeight::BOLD)
                                        .text_color(rgb(TEXT_WHITE))
                                })
                                .child(text)
                        }),
                )
                .into_any_element()
        });
        let action = notification.action.clone();
        let glyph = match &action {
            Some(NotificationAction::OpenUrl { .. }) => "↗",
            Some(NotificationAction::Troubleshoot(_)) => "?",
            Some(NotificationAction::Close(_)) => "✕",
            None => "",
        };

        banner(notification.indicator, &notification.title, subtitle).when_some(
            action,
            |element, action| {
                element.child(
                    div()
                        .id("notification-action")
                        .flex_shrink_0()
                        .cursor_pointer()
                        .text_color(rgb(TEXT_DIM))
                        .hover(|style| style.text_color(rgb(TEXT_WHITE)))
                        .child(glyph)
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                this.on_notification_action(action.clone(), context)
                            }),
                        ),
                )
            },
        )
    }

    fn render_scrollbar(
        &self,
        height: f32,
        y: f32,
        can_scroll: bool,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let visible = can_scroll && self.scrollbar.indicators_visible;
        let width = if self.scrollbar.wide {
            SCROLLBAR_WIDTH_WIDE
        } else {
            SCROLLBAR_WIDTH
        };

        div()
            .id("scrollbar-track")
            .absolute()
            .top_0()
            .right_0()
            .h_full()
            .w(px(SCROLLBAR_WIDTH_WIDE + DEFAULT_PADDING.x * 2.0))
            .when(can_scroll, |element| {
                element.on_hover(context.listener(|this, hovered: &bool, _, context| {
                    let command = if *hovered {
                        this.scrollbar.on_track_enter()
                    } else {
                        this.scrollbar.on_track_leave()
                    };
                    this.apply_timer_command(command, context);
                }))
            })
            .when(visible, |element| {
                element.child(
                    div()
                        .id("scrollbar-thumb")
                        .absolute()
                        .top(px(y))
                        .right(px(DEFAULT_PADDING.x))
                        .w(px(width))
                        .h(px(height))
                        .rounded(px(width / 2.0))
                        .bg(rgba(BUTTON_NEUTRAL_TRANSLUCENT))
                        .on_mouse_down(MouseButton::Left, context.listener(Self::on_thumb_mouse_down)),
                )
            })
    }

    fn render_page(
        &mut self,
        route: &Route,
        window: &mut Window,
        context: &mut Context<Self>,
    ) -> AnyElement {
        match route {
            Route::Launch => self.render_launch(context).into_any_element(),
            Route::Login => self.render_login(context).into_any_element(),
            Route::TooManyDevices => self.render_too_many_devices(context).into_any_element(),
            Route::DeviceRevoked => self.render_device_revoked(context).into_any_element(),
            Route::Main => self.render_main(window, context).into_any_element(),
            Route::ExpiredAccount => self.render_expired_account(context).into_any_element(),
            Route::RedeemVoucher => self.render_redeem_voucher(context).into_any_element(),
            Route::TimeAdded => self.render_time_added(context).into_any_element(),
            Route::SelectLocation => self.render_select_location(context).into_any_element(),
            Route::Filter => self.render_filter(context).into_any_element(),
            Route::Settings => self.render_settings(context).into_any_element(),
            Route::Account => self.render_account(context).into_any_element(),
            Route::UserInterfaceSettings => {
                self.render_user_interface_settings(context).into_any_element()
            }
            Route::VpnSettings => self.render_vpn_settings(context).into_any_element(),
            Route::WireguardSettings => self.render_wireguard_settings(context).into_any_element(),
            Route::OpenVpnSettings => self.render_openvpn_settings(context).into_any_element(),
            Route::DaitaSettings => self.render_daita_settings(context).into_any_element(),
            Route::MultihopSettings => self.render_multihop_settings(context).into_any_element(),
            Route::SplitTunneling => self.render_split_tunneling(context).into_any_element(),
            Route::ApiAccessMethods => self.render_api_access_methods(context).into_any_element(),
            Route::EditApiAccessMethod(_) => {
                self.render_edit_api_access_method(context).into_any_element()
            }
            Route::SettingsImport => self.render_settings_import(context).into_any_element(),
            Route::Support => self.render_support(context).into_any_element(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{testing::RecordingDaemon, types::DeviceState};
    use pretty_assertions::assert_eq;

    #[test]
    fn every_route_with_fields_lists_them_once() {
        for field in InputField::ALL {
            let routes = [
                Route::Login,
                Route::RedeemVoucher,
                Route::SelectLocation,
                Route::SplitTunneling,
                Route::OpenVpnSettings,
                Route::WireguardSettings,
                Route::VpnSettings,
                Route::SettingsImport,
                Route::Support,
                Route::EditApiAccessMethod(None),
            ];
            let count = routes
                .iter()
                .filter(|route| InputField::for_route(route).contains(&field))
                .count();
            assert_eq!(count, 1, "{field:?}");
        }
    }

    #[test]
    fn initial_state_collects_every_slice() {
        let daemon = RecordingDaemon::default();
        let action = load_initial_state(&daemon).unwrap();
        let StoreAction::DaemonConnected { device_state, .. } = action else {
            panic!("unexpected action");
        };
        assert_eq!(device_state, DeviceState::LoggedOut);
    }
}
