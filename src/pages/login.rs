use gpui::{Context, MouseButton, SharedString, div, prelude::*, px, rgb};

use super::{form_column, page};
use crate::{
    account::{
        self, LoginFailure, LoginState, TooManyDevices, capitalize_device_name,
        format_account_number, is_valid_account_number, login_failure, normalize_account_number,
    },
    app::{InputField, VpnApp},
    components::*,
    connection::{ButtonStyle, TunnelCommand},
    navigation::Route,
    store::StoreAction,
    theme::*,
};

impl VpnApp {
    pub(crate) fn login(&mut self, context: &mut Context<Self>) {
        let account_number = normalize_account_number(&self.input_text(InputField::AccountNumber, context));
        self.login_with(account_number, context);
    }

    fn login_with(&mut self, account_number: String, context: &mut Context<Self>) {
        if !is_valid_account_number(&account_number) || self.store.account.login.is_busy() {
            return;
        }
        log::info!("[login] logging in");
        self.dispatch(StoreAction::LoginStarted, context);
        let attempted = account_number.clone();
        self.run_daemon(
            "login",
            context,
            move |daemon| daemon.login(&account_number),
            move |this, result, context| {
                let Err(error) = result else {
                    return;
                };
                log::warn!("[login] failed: {error}");
                match login_failure(&error) {
                    LoginFailure::Message(message) => {
                        this.dispatch(StoreAction::LoginFailed(message), context)
                    }
                    LoginFailure::Navigate(route) => {
                        this.dispatch(StoreAction::LoginFailed(error.user_message()), context);
                        this.too_many_devices = Some(TooManyDevices::new(attempted));
                        this.reset(route, context);
                        this.fetch_too_many_devices(context);
                    }
                }
            },
        );
    }

    fn create_account(&mut self, context: &mut Context<Self>) {
        if self.store.account.login.is_busy() {
            return;
        }
        self.dispatch(StoreAction::AccountCreationStarted, context);
        self.run_daemon(
            "create-account",
            context,
            |daemon| daemon.create_new_account(),
            |this, result, context| match result {
                Ok(_) => log::info!("[login] created a new account"),
                Err(error) => {
                    log::error!("[login] failed to create account: {error}");
                    this.dispatch(StoreAction::LoginFailed(error.user_message()), context)
                }
            },
        );
    }

    fn clear_account_history(&mut self, context: &mut Context<Self>) {
        self.run_daemon(
            "clear-account-history",
            context,
            |daemon| daemon.clear_account_history(),
            |this, result, context| match result {
                Ok(()) => {
                    this.set_input_text(InputField::AccountNumber, "", context);
                    this.dispatch(StoreAction::AccountHistory(None), context)
                }
                // TODO: surface this in the error dialog; the history stays on screen for now.
                Err(error) => log::error!("[login] failed to clear account history: {error}"),
            },
        );
    }

    fn fetch_too_many_devices(&self, context: &mut Context<Self>) {
        let Some(account_number) = self
            .too_many_devices
            .as_ref()
            .map(|page| page.account_number.clone())
        else {
            return;
        };
        self.spawn_daemon(
            "devices",
            context,
            move |daemon| daemon.list_devices(&account_number),
            |this, result, _| match (result, &mut this.too_many_devices) {
                (Ok(devices), Some(page)) => page.set_devices(devices),
                (Err(error), Some(page)) => page.removal_failed(&error),
                (_, None) => {}
            },
        );
    }

    pub(crate) fn remove_device(&mut self, context: &mut Context<Self>) {
        let Some(page) = &mut self.too_many_devices else {
            return;
        };
        let Some(device) = page.confirm() else {
            return;
        };
        let account_number = page.account_number.clone();
        log::info!("[devices] removing {}", device.name);
        self.run_daemon(
            "remove-device",
            context,
            move |daemon| daemon.remove_device(&account_number, &device.id),
            |this, result, context| match result {
                Ok(()) => this.fetch_too_many_devices(context),
                Err(error) => {
                    if let Some(page) = &mut this.too_many_devices {
                        page.removal_failed(&error);
                    }
                }
            },
        );
    }

    /// A revoked device has to be logged out before a new login. A tunnel that is still
    /// up would keep blocking traffic.
    fn leave_revoked_device(&mut self, context: &mut Context<Self>) {
        self.run_daemon(
            "logout",
            context,
            |daemon| {
                TunnelCommand::Disconnect.run(daemon)?;
                daemon.logout()
            },
            |this, result, context| match result {
                Ok(()) => this.reset(Route::Login, context),
                Err(error) => {
                    log::error!("[login] failed to leave revoked device: {error}");
                    this.error_dialog = Some(error.user_message());
                }
            },
        );
    }

    pub(crate) fn render_launch(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let waited = self.map_time() > 5.0;
        div()
            .flex()
            .flex_col()
            .items_center()
            .justify_center()
            .size_full()
            .pt(px(GAP_LARGE * 4.0))
            .child(page_title("Connecting to service"))
            .child(spinner("Connecting..."))
            .when(waited, |element| {
                element
                    .child(paragraph(
                        "Unable to contact the VPN service, your connection might be unsecure. Please troubleshoot or send a problem report by going to Settings.",
                    ))
                    .child(button_column().child(
                        button_action("launch-report", "Report a problem", ButtonStyle::Neutral, false, None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.push(Route::Support, context)),
                            ),
                    ))
            })
    }

    pub(crate) fn render_login(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let login = self.store.account.login.clone();
        let busy = login.is_busy();
        let account_input = self.input_text(InputField::AccountNumber, context);
        let valid = is_valid_account_number(&normalize_account_number(&account_input));
        let error = match &login {
            LoginState::Failed(message) => Some(message.clone()),
            _ => None,
        };
        self.inputs.get(InputField::AccountNumber).update(context, |input, _| {
            input.invalid = error.is_some();
            input.disabled = busy;
        });

        let subtitle = match &login {
            LoginState::LoggingIn => "Checking account number",
            LoginState::CreatingAccount => "Creating account...",
            LoginState::Ok => "Correct account number",
            _ => "Enter your account number",
        };
        let history = self.store.account.account_history.clone();

        page()
            .pt(px(GAP_LARGE * 2.0))
            .child(page_title(login.title()))
            .child(paragraph(subtitle))
            .child(
                form_column()
                    .child(self.inputs.get(InputField::AccountNumber).clone())
                    .when_some(error, |element, error| element.child(error_text(error)))
                    .when_some(history.filter(|_| !busy), |element, history| {
                        element.child(
                            cell("account-history", 1, false)
                                .child(
                                    cell_label(format_account_number(&history)).on_mouse_up(
                                        MouseButton::Left,
                                        context.listener(move |this, _, _, context| {
                                            this.set_input_text(InputField::AccountNumber, &history, context);
                                            this.login(context);
                                        }),
                                    ),
                                )
                                .child(
                                    div()
                                        .id("account-history-clear")
                                        .cursor_pointer()
                                        .text_color(rgb(TEXT_DIM))
                                        .hover(|style| style.text_color(rgb(TEXT_WHITE)))
                                        .child("✕")
                                        .on_mouse_up(
                                            MouseButton::Left,
                                            context.listener(|this, _, _, context| {
                                                this.clear_account_history(context)
                                            }),
                                        ),
                                ),
                        )
                    }),
            )
            .child(
                button_column()
                    .child(
                        button_action(
                            "login-submit",
                            "Log in",
                            ButtonStyle::Success,
                            busy || !valid,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.login(context)),
                        ),
                    )
                    .child(label("Don't have an account number?"))
                    .child(
                        button_action(
                            "login-create-account",
                            "Create account",
                            ButtonStyle::Neutral,
                            busy,
                            None,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.create_account(context)),
                        ),
                    ),
            )
    }

    pub(crate) fn render_too_many_devices(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let Some(page_state) = self.too_many_devices.clone() else {
            return page().child(spinner("Fetching devices..."));
        };
        let can_continue = page_state.can_continue();
        let busy = self.blocking.is_blocked("remove-device") || self.store.account.login.is_busy();

        let devices = page_state.devices.iter().map(|device| {
            let removing = page_state.removing.as_deref() == Some(device.id.as_str());
            let id = device.id.clone();
            cell(SharedString::from(format!("device-{}", device.id)), 0, removing)
                .child(
                    div()
                        .flex()
                        .flex_col()
                        .flex_1()
                        .child(cell_label(capitalize_device_name(&device.name)))
                        .child(label(format!(
                            "Created: {}",
                            account::format_expiry_date(device.created)
                        ))),
                )
                .child(if removing {
                    status_dot(COLOR_YELLOW).into_any_element()
                } else {
                    div()
                        .id(SharedString::from(format!("device-remove-{}", device.id)))
                        .cursor_pointer()
                        .text_color(rgb(COLOR_RED))
                        .child("✕")
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                if let Some(page) = &mut this.too_many_devices {
                                    page.request_removal(&id);
                                }
                                context.notify();
                            }),
                        )
                        .into_any_element()
                })
        });

        let message = if can_continue {
            "You can now continue logging in on this device."
        } else {
            "Please log out of at least one by removing it from the list below. You can find the corresponding device name under the device’s Account settings."
        };
        let account_number = page_state.account_number.clone();

        page()
            .pt(px(GAP_LARGE))
            .child(page_title(if can_continue {
                "Super!"
            } else {
                "Too many devices"
            }))
            .child(paragraph(message))
            .children(page_state.error.clone().map(|error| form_column().child(error_text(error))))
            .child(div().flex().flex_col().mt(px(GAP_MEDIUM)).children(devices))
            .child(
                button_column()
                    .child(
                        button_action(
                            "too-many-devices-continue",
                            "Continue with login",
                            ButtonStyle::Success,
                            !can_continue || busy,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                this.login_with(account_number.clone(), context)
                            }),
                        ),
                    )
                    .child(
                        button_action("too-many-devices-back", "Back", ButtonStyle::Neutral, busy, None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| {
                                    this.too_many_devices = None;
                                    this.dispatch(StoreAction::ResetLoginError, context);
                                    this.reset(Route::Login, context);
                                }),
                            ),
                    ),
            )
    }

    pub(crate) fn render_device_revoked(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let blocking = self.store.settings.block_when_disconnected
            || !matches!(
                self.store.tunnel_state,
                crate::daemon::types::TunnelState::Disconnected { .. }
            );
        page()
            .pt(px(GAP_LARGE * 2.0))
            .child(page_title("Device is inactive"))
            .child(paragraph(
                "You have removed this device. To connect again, you will need to log back in.",
            ))
            .when(blocking, |element| {
                element.child(paragraph(
                    "Going to login will unblock the internet on this device.",
                ))
            })
            .child(
                button_column().child(
                    button_action(
                        "device-revoked-login",
                        "Go to login",
                        ButtonStyle::Success,
                        self.blocking.is_blocked("logout"),
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.leave_revoked_device(context)),
                    ),
                ),
            )
    }
}
