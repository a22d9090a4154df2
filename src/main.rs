mod account;
mod app;
mod blocking;
mod components;
mod configuration;
mod connection;
mod daemon;
mod dialog;
mod gui_settings;
mod location;
mod location_list;
mod map;
mod navigation;
mod notifications;
mod pages;
mod problem_report;
mod proxy_form;
mod scheduler;
mod scrollbar;
mod settings;
mod store;
mod system;
mod text_input;
mod theme;

use gpui::{
    Application, Bounds, KeyBinding, WindowBackgroundAppearance, WindowBounds, WindowOptions,
    prelude::*, px, size,
};

use crate::{
    app::{AppInitialization, Back, BackToRoot, FocusNext, FocusPrevious, OpenSettings, Quit, VpnApp},
    configuration::DaemonConfiguration,
    gui_settings::GuiSettings,
    text_input::{
        Backspace, Copy, Cut, Delete, End, Home, Left, Paste, Right, SelectAll, SelectLeft,
        SelectRight, Submit,
    },
    theme::{WINDOW_HEIGHT, WINDOW_WIDTH},
};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("vpn_client_ui=info"),
    )
    .init();

    log::info!(
        "vpn-client-ui v{} starting (RUST_LOG={})",
        env!("CARGO_PKG_VERSION"),
        std::env::var("RUST_LOG").unwrap_or_else(|_| "<default: info>".into()),
    );

    log::info!(
        "[env] XDG_CURRENT_DESKTOP={}, XDG_SESSION_TYPE={}, DISPLAY={}, WAYLAND_DISPLAY={}",
        std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default(),
        std::env::var("XDG_SESSION_TYPE").unwrap_or_default(),
        std::env::var("DISPLAY").unwrap_or_default(),
        std::env::var("WAYLAND_DISPLAY").unwrap_or_default(),
    );

    let configuration = DaemonConfiguration::from_environment();
    log::info!(
        "[startup] service socket: {} (timeout {:?})",
        configuration.socket_path.display(),
        configuration.request_timeout,
    );
    let gui_settings = GuiSettings::load();

    Application::new().run(move |context| {
        let bounds = Bounds::centered(None, size(px(WINDOW_WIDTH), px(WINDOW_HEIGHT)), context);

        bind_keys(context);

        let initialization = AppInitialization {
            configuration: configuration.clone(),
            gui_settings: gui_settings.clone(),
        };
        let window = context.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                titlebar: None,
                window_background: WindowBackgroundAppearance::Opaque,
                ..Default::default()
            },
            |_, context| context.new(|context| VpnApp::new(initialization, context)),
        );

        match window {
            Ok(window) => {
                if let Err(error) = window.update(context, |view, window, context| {
                    window.focus(&view.initial_focus(), context);
                    context.activate(true);
                }) {
                    log::error!("[startup] failed to initialize application window: {error}");
                    context.quit();
                }
            }
            Err(error) => {
                log::error!("[startup] failed to open application window: {error}");
                context.quit();
            }
        }
    });
}

fn bind_keys(context: &mut gpui::App) {
    context.bind_keys([
        KeyBinding::new("backspace", Backspace, Some("TextInput")),
        KeyBinding::new("delete", Delete, Some("TextInput")),
        KeyBinding::new("left", Left, Some("TextInput")),
        KeyBinding::new("right", Right, Some("TextInput")),
        KeyBinding::new("shift-left", SelectLeft, Some("TextInput")),
        KeyBinding::new("shift-right", SelectRight, Some("TextInput")),
        KeyBinding::new("home", Home, Some("TextInput")),
        KeyBinding::new("end", End, Some("TextInput")),
        KeyBinding::new("enter", Submit, Some("TextInput")),
        KeyBinding::new("cmd-a", SelectAll, Some("TextInput")),
        KeyBinding::new("cmd-v", Paste, Some("TextInput")),
        KeyBinding::new("cmd-c", Copy, Some("TextInput")),
        KeyBinding::new("cmd-x", Cut, Some("TextInput")),
        KeyBinding::new("ctrl-a", SelectAll, Some("TextInput")),
        KeyBinding::new("ctrl-v", Paste, Some("TextInput")),
        KeyBinding::new("ctrl-c", Copy, Some("TextInput")),
        KeyBinding::new("ctrl-x", Cut, Some("TextInput")),
    ]);

    context.bind_keys([
        KeyBinding::new("tab", FocusNext, Some("VpnApp")),
        KeyBinding::new("shift-tab", FocusPrevious, Some("VpnApp")),
        KeyBinding::new("escape", Back, Some("VpnApp")),
        KeyBinding::new("shift-escape", BackToRoot, Some("VpnApp")),
        KeyBinding::new("cmd-q", Quit, Some("VpnApp")),
        KeyBinding::new("ctrl-q", Quit, Some("VpnApp")),
        KeyBinding::new("cmd-,", OpenSettings, Some("VpnApp")),
        KeyBinding::new("ctrl-,", OpenSettings, Some("VpnApp")),
    ]);
}
