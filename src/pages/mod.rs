//! One `impl VpnApp` block per group of pages. Each renders from the view state and sends
//! user input back through the view's daemon helpers.

mod account;
mod api_access;
mod connect;
mod login;
mod select_location;
mod settings;
mod split_tunneling;
mod support;

use gpui::{Context, Div, MouseButton, SharedString, div, prelude::*, px};

use crate::{app::VpnApp, components::selector_option, theme::*};

/// Scroll content of a pushed page.
pub(crate) fn page() -> Div {
    div()
        .flex()
        .flex_col()
        .w_full()
        .pb(px(GAP_LARGE))
}

/// Padded column that holds form fields between the cell lists.
pub(crate) fn form_column() -> Div {
    div()
        .flex()
        .flex_col()
        .gap(px(GAP_SMALL))
        .px(px(PADDING_PAGE))
        .py(px(GAP_SMALL))
        .w_full()
}

/// Single-choice list. Each entry carries its value, its label and whether it is
/// disabled; the handler reads fresh settings from the view when clicked.
pub(crate) fn selector<T: Clone + PartialEq + 'static>(
    id: &'static str,
    options: Vec<(T, String, bool)>,
    selected: &T,
    context: &Context<VpnApp>,
    on_select: fn(&mut VpnApp, T, &mut Context<VpnApp>),
) -> Div {
    div()
        .flex()
        .flex_col()
        .children(options.into_iter().enumerate().map(|(index, (value, text, disabled))| {
            let is_selected = &value == selected;
            selector_option(
                SharedString::from(format!("{id}-{index}")),
                text,
                is_selected,
                disabled,
            )
            .when(!disabled && !is_selected, |element| {
                element.on_mouse_up(
                    MouseButton::Left,
                    context.listener(move |this, _, _, context| {
                        on_select(this, value.clone(), context)
                    }),
                )
            })
        }))
}
