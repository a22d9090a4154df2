use gpui::{Context, Div, MouseButton, SharedString, div, prelude::*, px, rgb};

use super::{form_column, page, selector};
use crate::{
    app::{InputField, VpnApp},
    components::*,
    connection::ButtonStyle,
    daemon::types::AccessMethodSetting,
    navigation::Route,
    proxy_form::{ProxyKind, SHADOWSOCKS_CIPHERS},
    settings::api_access::{
        self, MenuItem, SaveOutcome, description, is_in_use, kind_label, menu_items,
        sorted_methods, use_method,
    },
    theme::*,
};

impl VpnApp {
    fn access_method(&self, id: &str) -> Option<AccessMethodSetting> {
        self.store
            .settings
            .api_access_methods
            .iter()
            .find(|method| method.id == id)
            .cloned()
    }

    /// Fills the proxy form for a new method, or for the custom method with `id`.
    pub(crate) fn open_access_method_form(&mut self, id: Option<String>, context: &mut Context<Self>) {
        match id {
            None => self.api_access.open_new(),
            Some(id) => {
                let Some(method) = self.access_method(&id) else {
                    log::warn!("[api-access] method {id} no longer exists");
                    self.pop(context);
                    return;
                };
                if let Err(error) = self.api_access.open_edit(&method) {
                    log::warn!("[api-access] cannot edit {id}: {error}");
                    self.pop(context);
                    return;
                }
            }
        }
        let form = self.api_access.form.clone().unwrap_or_default();
        self.set_input_text(InputField::ProxyName, &form.name, context);
        self.set_input_text(InputField::ProxyServer, &form.server, context);
        self.set_input_text(InputField::ProxyPort, &form.port, context);
        self.set_input_text(InputField::ProxyPassword, &form.password, context);
        self.set_input_text(InputField::ProxyUsername, &form.username, context);
    }

    /// Without `force` the proxy is tested first and an unreachable one asks before saving.
    pub(crate) fn save_access_method(&mut self, force: bool, context: &mut Context<Self>) {
        let Some(form) = self.api_access.form.clone() else {
            return;
        };
        if !form.is_submittable() {
            return;
        }
        self.api_access.save_unreachable = false;
        self.run_daemon(
            "save-access-method",
            context,
            move |daemon| api_access::save(daemon, &form, force),
            |this, result, context| match result {
                Ok(SaveOutcome::Saved) => this.pop(context),
                Ok(SaveOutcome::Unreachable) => this.api_access.save_unreachable = true,
                Err(error) => {
                    log::error!("[api-access] failed to save method: {error}");
                    this.error_dialog = Some(error.to_string());
                }
            },
        );
    }

    pub(crate) fn remove_access_method(&mut self, context: &mut Context<Self>) {
        let Some(method) = self.api_access.remove_confirmation.take() else {
            return;
        };
        self.run_daemon(
            "remove-access-method",
            context,
            move |daemon| api_access::remove(daemon, &method),
            |this, result, _| {
                if let Err(error) = result {
                    log::error!("[api-access] failed to remove method: {error}");
                    this.error_dialog = Some(error.to_string());
                }
            },
        );
    }

    fn test_access_method(&mut self, id: String, context: &mut Context<Self>) {
        if !self.api_access.start_test(&id) {
            return;
        }
        let test_id = id.clone();
        self.spawn_daemon(
            "test-access-method",
            context,
            move |daemon| daemon.test_api_access_method(&test_id),
            move |this, result, _| {
                let reachable = result.unwrap_or_else(|error| {
                    log::warn!("[api-access] test of {id} failed: {error}");
                    false
                });
                this.api_access.finish_test(&id, reachable);
            },
        );
    }

    fn use_access_method(&mut self, id: String, context: &mut Context<Self>) {
        if self.blocking.is_blocked("use-access-method") || !self.api_access.start_test(&id) {
            return;
        }
        let use_id = id.clone();
        self.run_daemon(
            "use-access-method",
            context,
            move |daemon| use_method(daemon, &use_id),
            move |this, result, _| match result {
                Ok(reachable) => this.api_access.finish_test(&id, reachable),
                Err(error) => {
                    this.api_access.finish_test(&id, false);
                    this.error_dialog = Some(error.to_string());
                }
            },
        );
    }

    fn toggle_access_method(&mut self, method: AccessMethodSetting, context: &mut Context<Self>) {
        let methods = self.store.settings.api_access_methods.clone();
        let enabled = !method.enabled;
        self.run_daemon(
            "toggle-access-method",
            context,
            move |daemon| api_access::set_enabled(daemon, &methods, &method, enabled),
            |this, result, _| {
                if let Err(error) = result {
                    this.error_dialog = Some(error.to_string());
                }
            },
        );
    }

    fn on_menu_item(&mut self, item: MenuItem, method: AccessMethodSetting, context: &mut Context<Self>) {
        match item {
            MenuItem::Use => self.use_access_method(method.id, context),
            MenuItem::Test => self.test_access_method(method.id, context),
            MenuItem::Edit => self.push(Route::EditApiAccessMethod(Some(method.id)), context),
            MenuItem::Delete => self.api_access.request_remove(&method),
        }
        context.notify();
    }

    pub(crate) fn render_api_access_methods(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let methods = self.store.settings.api_access_methods.clone();
        let current = self.store.current_access_method.clone();
        let busy = self.blocking.is_blocked("toggle-access-method");

        page()
            .child(page_title("API access"))
            .child(paragraph(
                "Manage default and set up custom methods to access the Mullvad API.",
            ))
            .children(
                sorted_methods(&methods)
                    .into_iter()
                    .map(|method| {
                        let in_use = is_in_use(method, current.as_ref());
                        self.access_method_row(method.clone(), in_use, busy, context)
                    })
                    .collect::<Vec<_>>(),
            )
            .child(
                button_column().child(
                    button_action(
                        "api-access-add",
                        "Add",
                        ButtonStyle::Success,
                        false,
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| {
                            this.push(Route::EditApiAccessMethod(None), context)
                        }),
                    ),
                ),
            )
    }

    fn access_method_row(
        &self,
        method: AccessMethodSetting,
        in_use: bool,
        busy: bool,
        context: &Context<Self>,
    ) -> Div {
        let id = method.id.clone();
        let sub_label = self.api_access.sub_label(&method, in_use);
        let toggled = method.clone();
        let footer = description(&method.kind).map(|[first, second]| format!("{first} {second}"));

        div()
            .flex()
            .flex_col()
            .pb(px(GAP_SMALL))
            .child(
                cell(SharedString::from(format!("access-method-{id}")), 0, false)
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .flex_1()
                            .child(cell_label(method.name.clone()))
                            .child(
                                div()
                                    .text_size(px(TEXT_SIZE_SMALL))
                                    .text_color(rgb(TEXT_DIM))
                                    .child(sub_label.unwrap_or(kind_label(&method.kind))),
                            ),
                    )
                    .child(
                        div()
                            .id(SharedString::from(format!("access-method-toggle-{id}")))
                            .child(toggle_switch(method.enabled, busy))
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(move |this, _, _, context| {
                                    if !busy {
                                        this.toggle_access_method(toggled.clone(), context)
                                    }
                                }),
                            ),
                    ),
            )
            .child(
                div()
                    .flex()
                    .gap(px(GAP_MEDIUM))
                    .px(px(PADDING_CELL))
                    .pt(px(GAP_EXTRA_SMALL))
                    .children(menu_items(&method, in_use).into_iter().map(|(item, disabled)| {
                        let method = method.clone();
                        link(
                            SharedString::from(format!("access-method-{id}-{}", item.label())),
                            item.label(),
                        )
                        .when(disabled, |element| element.text_color(rgb(TEXT_DISABLED)))
                        .when(!disabled, |element| {
                            element.on_mouse_up(
                                MouseButton::Left,
                                context.listener(move |this, _, _, context| {
                                    this.on_menu_item(item, method.clone(), context)
                                }),
                            )
                        })
                    })),
            )
            .children(footer.map(cell_footer))
    }

    pub(crate) fn render_edit_api_access_method(
        &mut self,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let form = self.api_access.form.clone().unwrap_or_default();
        let saving = self.blocking.is_blocked("save-access-method");
        let server_error = form.server_error();
        let port_error = form.port_error();
        self.inputs.get(InputField::ProxyServer).update(context, |input, _| {
            input.invalid = server_error.is_some();
            input.disabled = saving;
        });
        self.inputs.get(InputField::ProxyPort).update(context, |input, _| {
            input.invalid = port_error.is_some();
            input.disabled = saving;
        });
        for field in [InputField::ProxyName, InputField::ProxyPassword, InputField::ProxyUsername] {
            self.inputs.get(field).update(context, |input, _| input.disabled = saving);
        }

        let kinds = ProxyKind::ALL
            .iter()
            .map(|kind| (*kind, kind.label().to_string(), saving))
            .collect();
        let details = match form.kind {
            ProxyKind::Shadowsocks => {
                let ciphers = SHADOWSOCKS_CIPHERS
                    .iter()
                    .map(|cipher| (cipher.to_string(), cipher.to_string(), saving))
                    .collect();
                div()
                    .flex()
                    .flex_col()
                    .child(form_column().child(field("Password (optional)", self.inputs.get(InputField::ProxyPassword))))
                    .child(section_header("Cipher"))
                    .child(selector(
                        "proxy-cipher",
                        ciphers,
                        &form.cipher.clone().unwrap_or_default(),
                        context,
                        |this, cipher, context| {
                            if let Some(form) = &mut this.api_access.form {
                                form.set_cipher(&cipher);
                            }
                            context.notify();
                        },
                    ))
            }
            ProxyKind::Socks5Remote => div()
                .flex()
                .flex_col()
                .child(toggle(
                    "proxy-authentication",
                    "Authentication",
                    form.authentication,
                    saving,
                    context.listener(|this, _, _, context| {
                        if let Some(form) = &mut this.api_access.form {
                            form.authentication = !form.authentication;
                        }
                        context.notify();
                    }),
                ))
                .when(form.authentication, |element| {
                    element.child(
                        form_column()
                            .child(field("Username", self.inputs.get(InputField::ProxyUsername)))
                            .child(field("Password", self.inputs.get(InputField::ProxyPassword))),
                    )
                }),
        };

        page()
            .child(page_title(if form.is_new() { "Add method" } else { "Edit method" }))
            .child(
                form_column()
                    .child(field("Name", self.inputs.get(InputField::ProxyName)))
                    .child(section_header("Type")),
            )
            .child(selector("proxy-kind", kinds, &form.kind, context, |this, kind, context| {
                if let Some(form) = &mut this.api_access.form {
                    form.kind = kind;
                }
                context.notify();
            }))
            .child(
                form_column()
                    .child(field("Server", self.inputs.get(InputField::ProxyServer)))
                    .children(server_error.map(|error| error_text(error.to_string())))
                    .child(field("Port", self.inputs.get(InputField::ProxyPort)))
                    .children(port_error.map(|error| error_text(error.to_string()))),
            )
            .child(details)
            .when(saving, |element| {
                element.child(form_column().child(spinner("Testing method...")))
            })
            .child(
                button_column()
                    .child(
                        button_action(
                            "proxy-submit",
                            form.submit_label(),
                            ButtonStyle::Success,
                            saving || !form.is_submittable(),
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.save_access_method(false, context)
                            }),
                        ),
                    )
                    .child(
                        button_action("proxy-cancel", "Cancel", ButtonStyle::Neutral, saving, None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.pop(context)),
                            ),
                    ),
            )
    }
}
