use gpui::{Context, Div, MouseButton, SharedString, div, prelude::*, px, rgb};

use super::{form_column, page};
use crate::{
    app::{InputField, VpnApp},
    components::*,
    connection::ButtonStyle,
    daemon::types::SplitTunnelingApplication,
    settings::split_tunneling::{
        LEGACY_LAUNCHER, add_application, application_for_path, browse, disabled_warning,
        launch, load_applications, no_result_text, remove_application, set_enabled,
    },
    theme::*,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowAction {
    Add,
    Remove,
    Launch,
}

impl RowAction {
    fn glyph(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Remove => "−",
            Self::Launch => "›",
        }
    }
}

impl VpnApp {
    pub(crate) fn load_split_tunneling_applications(&mut self, context: &mut Context<Self>) {
        let gui_settings = self.gui_settings.clone();
        self.spawn_daemon(
            "split-tunnel-applications",
            context,
            move |daemon| load_applications(daemon, &gui_settings),
            |this, applications, _| {
                log::debug!("[split-tunnel] {} applications available", applications.len());
                this.split_tunneling.set_applications(applications)
            },
        );
    }

    pub(crate) fn launch_application(
        &mut self,
        application: SplitTunnelingApplication,
        context: &mut Context<Self>,
    ) {
        self.spawn_daemon(
            "launch",
            context,
            move |daemon| launch(daemon, &application),
            |this, result, _| {
                if let Err(error) = result {
                    log::warn!("[split-tunnel] {error}");
                    this.split_tunneling.launch_error = Some(error);
                }
            },
        );
    }

    fn on_application_row(
        &mut self,
        action: RowAction,
        application: SplitTunnelingApplication,
        context: &mut Context<Self>,
    ) {
        let settings = self.store.settings.clone();
        match action {
            RowAction::Add => {
                self.submit_changes(add_application(&settings, &application.absolute_path), context)
            }
            RowAction::Remove => self.submit_changes(
                remove_application(&settings, &application.absolute_path),
                context,
            ),
            RowAction::Launch => {
                if let Some(application) = self.split_tunneling.select(&application) {
                    self.launch_application(application, context);
                }
            }
        }
        context.notify();
    }

    /// The picked executable is excluded right away, or launched in legacy mode.
    fn browse_application(&mut self, context: &mut Context<Self>) {
        let mut gui_settings = self.gui_settings.clone();
        self.run_daemon(
            "browse",
            context,
            move |_| browse(&mut gui_settings),
            |this, path, context| {
                let Some(path) = path else {
                    return;
                };
                if this.gui_settings.remember_browsed_application(&path) {
                    this.save_gui_settings(context);
                }
                if LEGACY_LAUNCHER {
                    let application = application_for_path(&path, &[]);
                    this.on_application_row(RowAction::Launch, application, context);
                } else {
                    let changes = add_application(&this.store.settings, &path);
                    this.submit_changes(changes, context);
                }
                this.load_split_tunneling_applications(context);
            },
        );
    }

    pub(crate) fn render_split_tunneling(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let form = self.split_tunneling.clone();
        let search_term = form.search_term.clone();
        let enabled = settings.split_tunnel.enable_exclusions;
        let browsing = self.blocking.is_blocked("browse");

        let body = if form.is_loading() {
            div().child(spinner("Loading applications..."))
        } else if LEGACY_LAUNCHER {
            let applications = form.launchable();
            div()
                .flex()
                .flex_col()
                .when(applications.is_empty() && !search_term.is_empty(), |element| {
                    element.child(paragraph(no_result_text(&search_term)))
                })
                .children(
                    applications
                        .into_iter()
                        .map(|application| self.application_row(RowAction::Launch, application, context)),
                )
        } else {
            let lists = form.lists(&settings);
            let warning = disabled_warning(&settings, &lists);
            let empty = lists.is_empty() && !search_term.is_empty();
            div()
                .flex()
                .flex_col()
                .children(warning.map(|warning| form_column().child(error_text(warning))))
                .when(empty, |element| {
                    element.child(paragraph(no_result_text(&search_term)))
                })
                .when(!lists.excluded.is_empty(), |element| {
                    element.child(section_header("Excluded apps")).children(
                        lists
                            .excluded
                            .into_iter()
                            .map(|application| self.application_row(RowAction::Remove, application, context)),
                    )
                })
                .when(!lists.available.is_empty(), |element| {
                    element.child(section_header("All apps")).children(
                        lists
                            .available
                            .into_iter()
                            .map(|application| self.application_row(RowAction::Add, application, context)),
                    )
                })
        };

        page()
            .child(page_title("Split tunneling"))
            .child(paragraph(if LEGACY_LAUNCHER {
                "Click on an app to launch it. Its traffic will bypass the VPN tunnel until you close it."
            } else {
                "Choose the apps you want to exclude from the VPN tunnel."
            }))
            .when(!LEGACY_LAUNCHER, |element| {
                element.child(div().pt(px(GAP_MEDIUM)).child(toggle(
                    "split-tunneling-enable",
                    "Split tunneling",
                    enabled,
                    self.blocking.is_blocked("split-tunnel-state"),
                    context.listener(move |this, _, _, context| {
                        this.apply_change(set_enabled(!enabled), context)
                    }),
                )))
            })
            .child(form_column().child(self.inputs.get(InputField::ApplicationSearch).clone()))
            .child(body)
            .child(
                button_column().child(
                    button_action(
                        "split-tunneling-browse",
                        "Find another app",
                        ButtonStyle::Neutral,
                        browsing,
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.browse_application(context)),
                    ),
                ),
            )
    }

    fn application_row(
        &self,
        action: RowAction,
        application: SplitTunnelingApplication,
        context: &Context<Self>,
    ) -> Div {
        let id = SharedString::from(format!("application-{}", application.absolute_path));
        let name = application.name.clone();
        let warned = application.warning.is_some();
        div().child(
            cell(id, 0, false)
                .child(cell_label(name))
                .when(warned, |element| element.child(status_dot(COLOR_YELLOW)))
                .child(
                    div()
                        .text_size(px(TEXT_SIZE_LARGE))
                        .text_color(rgb(match action {
                            RowAction::Remove => COLOR_RED,
                            RowAction::Add => COLOR_GREEN,
                            RowAction::Launch => TEXT_DIM,
                        }))
                        .child(action.glyph()),
                )
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(move |this, _, _, context| {
                        this.on_application_row(action, application.clone(), context)
                    }),
                ),
        )
    }
}
