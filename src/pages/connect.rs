use chrono::Utc;
use gpui::{AnyElement, Context, MouseButton, Window, div, prelude::*, px, rgb};

use crate::{
    account,
    app::VpnApp,
    components::*,
    connection::{
        ButtonStyle, SecuredLabel, TunnelCommand, TunnelControls, displayed_location,
        feature_labels, hostname_line, location_line,
    },
    map::{Coordinate, MarkerStyle, project},
    navigation::Route,
    theme::*,
};

const GRID_STEP_DEGREES: usize = 30;

impl VpnApp {
    pub(crate) fn render_main(
        &mut self,
        window: &mut Window,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let width = f32::from(window.viewport_size().width);
        let tunnel_state = self.store.tunnel_state.clone();
        let secured = SecuredLabel::for_state(
            &tunnel_state,
            self.store.settings.block_when_disconnected,
        );
        let controls = TunnelControls::for_state(&tunnel_state);
        let location = displayed_location(&tunnel_state);
        let hostname = location.and_then(hostname_line);
        let location_text = location_line(location);
        let rows = self.connection_panel.rows(&tunnel_state);
        let features = feature_labels(&tunnel_state);
        let has_details = !rows.is_empty();

        div()
            .relative()
            .w_full()
            .h(px(MAP_HEIGHT - TITLEBAR_HEIGHT))
            .child(self.render_map(width, MAP_HEIGHT - TITLEBAR_HEIGHT))
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .flex()
                    .flex_col()
                    .child(self.render_main_header(context))
                    .child(div().flex_1())
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .gap(px(GAP_EXTRA_SMALL))
                            .px(px(PADDING_PAGE))
                            .child(
                                div()
                                    .text_size(px(TEXT_SIZE_MEDIUM))
                                    .font_weight(gpui::FontWeight::BOLD)
                                    .text_color(rgb(secured.color()))
                                    .child(secured.text()),
                            )
                            .child(
                                div()
                                    .text_size(px(TEXT_SIZE_TITLE))
                                    .font_weight(gpui::FontWeight::BOLD)
                                    .text_color(rgb(TEXT_WHITE))
                                    .child(location_text),
                            )
                            .when_some(hostname, |element, hostname| {
                                element.child(label(hostname))
                            })
                            .when(has_details, |element| {
                                element.child(self.render_connection_panel(rows, context))
                            })
                            .when(!features.is_empty(), |element| {
                                element.child(
                                    div()
                                        .flex()
                                        .flex_row()
                                        .flex_wrap()
                                        .gap(px(GAP_EXTRA_SMALL))
                                        .children(features.into_iter().map(feature_chip)),
                                )
                            }),
                    )
                    .child(self.render_tunnel_controls(controls, context)),
            )
    }

    fn render_main_header(&self, context: &mut Context<Self>) -> impl IntoElement {
        let device_name = self
            .store
            .account
            .device_name()
            .map(account::capitalize_device_name);
        let time_left = self
            .store
            .account
            .expiry
            .map(|expiry| account::remaining_time_text(expiry, Utc::now()));

        div()
            .flex()
            .flex_row()
            .items_center()
            .gap(px(GAP_SMALL))
            .px(px(PADDING_CELL))
            .py(px(GAP_SMALL))
            .bg(rgb(TITLEBAR_BACKGROUND))
            .child(
                div()
                    .flex()
                    .flex_col()
                    .flex_1()
                    .when_some(device_name, |element, name| {
                        element.child(label(format!("Device name: {name}")))
                    })
                    .when_some(time_left, |element, time_left| {
                        element.child(label(format!("Time left: {time_left}")))
                    }),
            )
            .child(
                titlebar_button("header-account", "Account", false).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::Account, context)),
                ),
            )
            .child(
                titlebar_button("header-settings", "Settings", false).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::Settings, context)),
                ),
            )
    }

    fn render_map(&self, width: f32, height: f32) -> impl IntoElement {
        let camera = &self.map_camera;
        let meridians = (-180..180).step_by(GRID_STEP_DEGREES).map(|longitude| {
            let (x, _) = project(
                camera,
                Coordinate::new(f64::from(longitude), camera.coordinate().latitude),
                width,
                height,
            );
            grid_line(x, 0.0, 1.0, height)
        });
        let parallels = (-60..=60).step_by(GRID_STEP_DEGREES).map(|latitude| {
            let (_, y) = project(
                camera,
                Coordinate::new(camera.coordinate().longitude, f64::from(latitude)),
                width,
                height,
            );
            grid_line(0.0, y, width, 1.0)
        });
        let (marker_x, marker_y) = project(camera, camera.target(), width, height);
        let marker_color = match camera.marker() {
            MarkerStyle::Secure => COLOR_GREEN,
            MarkerStyle::Unsecure => COLOR_RED,
        };

        div()
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .overflow_hidden()
            .bg(rgb(MAP_OCEAN))
            .children(meridians)
            .children(parallels)
            .child(
                div()
                    .absolute()
                    .left(px(marker_x - MARKER_SIZE / 2.0))
                    .top(px(marker_y - MARKER_SIZE / 2.0))
                    .size(px(MARKER_SIZE))
                    .rounded(px(MARKER_SIZE / 2.0))
                    .border_2()
                    .border_color(rgb(TEXT_WHITE))
                    .bg(rgb(marker_color)),
            )
    }

    fn render_connection_panel(
        &self,
        rows: Vec<(&'static str, String)>,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let expanded = self.connection_panel.expanded;
        div()
            .id("connection-panel")
            .flex()
            .flex_col()
            .gap(px(GAP_EXTRA_SMALL))
            .py(px(GAP_EXTRA_SMALL))
            .cursor_pointer()
            .on_mouse_up(
                MouseButton::Left,
                context.listener(|this, _, _, context| {
                    this.connection_panel.toggle();
                    context.notify();
                }),
            )
            .children(rows.into_iter().map(|(name, value)| {
                div()
                    .flex()
                    .flex_row()
                    .gap(px(GAP_SMALL))
                    .text_size(px(TEXT_SIZE_SMALL))
                    .child(div().w(px(60.0)).text_color(rgb(TEXT_DIM)).child(name))
                    .child(div().text_color(rgb(TEXT_WHITE)).child(value))
            }))
            .child(expand_chevron(expanded))
    }

    fn render_tunnel_controls(
        &self,
        controls: TunnelControls,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let primary = controls.primary;
        let busy = self.blocking.is_blocked(primary.key())
            || self.blocking.is_blocked(TunnelCommand::Reconnect.key());
        let reconnect: Option<AnyElement> = controls.show_reconnect.then(|| {
            button_icon("tunnel-reconnect", "⟳", controls.primary_style, busy)
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| {
                        this.run_tunnel_command(TunnelCommand::Reconnect, context)
                    }),
                )
                .into_any_element()
        });

        button_column()
            .child(
                button_action(
                    "switch-location",
                    controls.switch_location_label,
                    ButtonStyle::Neutral,
                    false,
                    None,
                )
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| {
                        this.push(Route::SelectLocation, context)
                    }),
                ),
            )
            .child(
                div()
                    .flex()
                    .flex_row()
                    .gap(px(GAP_SMALL))
                    .child(
                        button_action(
                            "tunnel-primary",
                            controls.primary_label,
                            controls.primary_style,
                            busy,
                            Some(&self.primary_focus_handle),
                        )
                        .flex_1()
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                this.run_tunnel_command(primary, context)
                            }),
                        ),
                    )
                    .children(reconnect),
            )
    }
}

fn grid_line(left: f32, top: f32, width: f32, height: f32) -> impl IntoElement {
    div()
        .absolute()
        .left(px(left))
        .top(px(top))
        .w(px(width))
        .h(px(height))
        .bg(rgb(MAP_GRID))
}

fn feature_chip(text: &'static str) -> impl IntoElement {
    div()
        .px(px(GAP_SMALL))
        .py(px(2.0))
        .rounded(px(RADIUS))
        .bg(rgb(CELL_NESTED))
        .text_size(px(TEXT_SIZE_EXTRA_SMALL))
        .text_color(rgb(TEXT_WHITE))
        .child(text)
}
