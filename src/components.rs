use gpui::{
    AnyElement, App, Div, ElementId, Entity, FocusHandle, MouseButton, MouseUpEvent, SharedString,
    Stateful, Window, div, prelude::*, px, rgb, rgba,
};

use crate::{
    connection::ButtonStyle,
    navigation::NavigationBarState,
    notifications::Indicator,
    text_input::TextInput,
    theme::*,
};

pub fn label(text: impl Into<SharedString>) -> Div {
    div()
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_DIM))
        .child(text.into())
}

pub fn field(text: &str, input: &Entity<TextInput>) -> Div {
    div()
        .flex()
        .flex_col()
        .gap(px(GAP_EXTRA_SMALL))
        .w_full()
        .child(label(text.to_string()))
        .child(input.clone())
}

pub fn page_title(text: impl Into<SharedString>) -> Div {
    div()
        .px(px(PADDING_PAGE))
        .pb(px(GAP_SMALL))
        .text_size(px(TEXT_SIZE_TITLE))
        .text_color(rgb(TEXT_WHITE))
        .font_weight(gpui::FontWeight::BOLD)
        .child(text.into())
}

pub fn paragraph(text: impl Into<SharedString>) -> Div {
    div()
        .px(px(PADDING_PAGE))
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_DIM))
        .child(text.into())
}

pub fn error_text(text: impl Into<SharedString>) -> Div {
    div()
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(COLOR_RED))
        .child(text.into())
}

/// Group header above a block of cells.
pub fn section_header(text: impl Into<SharedString>) -> Div {
    div()
        .flex()
        .items_center()
        .h(px(ELEMENT_HEIGHT))
        .px(px(PADDING_CELL))
        .mt(px(GAP_MEDIUM))
        .bg(rgb(CELL_BACKGROUND))
        .text_size(px(TEXT_SIZE_LARGE))
        .text_color(rgb(TEXT_WHITE))
        .font_weight(gpui::FontWeight::SEMIBOLD)
        .child(text.into())
}

pub fn cell_footer(text: impl Into<SharedString>) -> Div {
    div()
        .px(px(PADDING_CELL))
        .pt(px(GAP_EXTRA_SMALL))
        .pb(px(GAP_MEDIUM))
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_DIM))
        .child(text.into())
}

/// Base row used by every list on the settings and location pages.
pub fn cell(id: impl Into<ElementId>, nesting: usize, disabled: bool) -> Stateful<Div> {
    let background = match nesting {
        0 => CELL_BACKGROUND,
        1 => CELL_NESTED,
        _ => CELL_NESTED_DEEP,
    };
    div()
        .id(id)
        .flex()
        .flex_row()
        .flex_shrink_0()
        .items_center()
        .gap(px(GAP_SMALL))
        .w_full()
        .min_h(px(ELEMENT_HEIGHT))
        .pl(px(PADDING_CELL + INDENT * nesting as f32))
        .pr(px(PADDING_CELL))
        .mb(px(1.0))
        .bg(rgb(background))
        .text_size(px(TEXT_SIZE_MEDIUM))
        .text_color(rgb(if disabled { TEXT_DISABLED } else { TEXT_PRIMARY }))
        .when(!disabled, |element| {
            element
                .cursor_pointer()
                .hover(|style| style.bg(rgb(CELL_HOVER)))
        })
}

pub fn cell_label(text: impl Into<SharedString>) -> Div {
    div().flex_1().overflow_hidden().child(text.into())
}

/// Row that opens another page, with an optional value shown before the chevron.
pub fn navigation_cell(
    id: impl Into<ElementId>,
    text: impl Into<SharedString>,
    value: Option<String>,
) -> Stateful<Div> {
    cell(id, 0, false)
        .child(cell_label(text))
        .when_some(value, |element, value| {
            element.child(
                div()
                    .text_size(px(TEXT_SIZE_SMALL))
                    .text_color(rgb(TEXT_DIM))
                    .child(value),
            )
        })
        .child(div().text_color(rgb(TEXT_DIM)).child("›"))
}

pub fn toggle_switch(value: bool, disabled: bool) -> Div {
    let (background, dot_offset) = match (value, disabled) {
        (true, false) => (COLOR_GREEN, TOGGLE_DOT_ON_OFFSET),
        (true, true) => (TEXT_DISABLED, TOGGLE_DOT_ON_OFFSET),
        (false, _) => (INPUT_BACKGROUND, TOGGLE_DOT_OFF_OFFSET),
    };
    div()
        .flex()
        .flex_shrink_0()
        .items_center()
        .w(px(TOGGLE_WIDTH))
        .h(px(TOGGLE_HEIGHT))
        .rounded(px(TOGGLE_HEIGHT / 2.0))
        .bg(rgb(background))
        .border_1()
        .border_color(rgb(BORDER))
        .child(
            div()
                .size(px(TOGGLE_DOT_SIZE))
                .rounded(px(TOGGLE_DOT_SIZE / 2.0))
                .bg(rgb(if disabled { TEXT_DIM } else { TEXT_WHITE }))
                .ml(px(dot_offset)),
        )
}

pub fn toggle(
    id: impl Into<ElementId>,
    text: impl Into<SharedString>,
    value: bool,
    disabled: bool,
    on_click: impl Fn(&MouseUpEvent, &mut Window, &mut App) + 'static,
) -> Stateful<Div> {
    cell(id, 0, disabled)
        .child(cell_label(text))
        .child(toggle_switch(value, disabled))
        .on_mouse_up(MouseButton::Left, move |event, window, context| {
            if !disabled {
                on_click(event, window, context);
            }
        })
}

/// One option of a single-choice list. The selected option carries a check mark.
pub fn selector_option(
    id: impl Into<ElementId>,
    text: impl Into<SharedString>,
    selected: bool,
    disabled: bool,
) -> Stateful<Div> {
    cell(id, 1, disabled)
        .child(
            div()
                .w(px(INDENT))
                .text_color(rgb(COLOR_GREEN))
                .when(selected, |element| element.child("✓")),
        )
        .child(cell_label(text))
}

pub fn checkbox(checked: bool) -> Div {
    div()
        .flex()
        .flex_shrink_0()
        .items_center()
        .justify_center()
        .size(px(STATUS_DOT_SIZE * 2.0))
        .rounded(px(RADIUS))
        .bg(rgb(TEXT_WHITE))
        .text_color(rgb(COLOR_GREEN))
        .text_size(px(TEXT_SIZE_SMALL))
        .when(checked, |element| element.child("✓"))
}

pub fn expand_chevron(expanded: bool) -> Div {
    div()
        .flex_shrink_0()
        .text_color(rgb(TEXT_DIM))
        .child(if expanded { "▴" } else { "▾" })
}

pub fn button_colors(style: ButtonStyle) -> (u32, u32) {
    match style {
        ButtonStyle::Success => (BUTTON_SUCCESS, BUTTON_SUCCESS_HOVER),
        ButtonStyle::Destructive => (BUTTON_DANGER, BUTTON_DANGER_HOVER),
        ButtonStyle::Neutral => (BUTTON_NEUTRAL, BUTTON_NEUTRAL_HOVER),
    }
}

pub fn button_action(
    id: impl Into<ElementId>,
    text: impl Into<SharedString>,
    style: ButtonStyle,
    disabled: bool,
    focus_handle: Option<&FocusHandle>,
) -> Stateful<Div> {
    let (background, hover_background) = button_colors(style);
    let (background, text_color) = if disabled {
        (BORDER, TEXT_DIM)
    } else {
        (background, TEXT_WHITE)
    };

    div()
        .id(id)
        .when_some(focus_handle, |element, handle| element.track_focus(handle))
        .flex()
        .flex_shrink_0()
        .items_center()
        .justify_center()
        .px(px(PADDING_INPUT_HORIZONTAL))
        .h(px(BUTTON_HEIGHT))
        .w_full()
        .bg(rgb(background))
        .rounded(px(RADIUS))
        .border_1()
        .border_color(gpui::transparent_black())
        .when(!disabled, |element| {
            element
                .cursor_pointer()
                .hover(move |style| style.bg(rgb(hover_background)))
                .focus(|style| style.border_color(rgb(BORDER_FOCUS)))
        })
        .text_color(rgb(text_color))
        .text_size(px(TEXT_SIZE_MEDIUM))
        .font_weight(gpui::FontWeight::SEMIBOLD)
        .child(text.into())
}

/// Compact square button, used for the reconnect icon beside the main action.
pub fn button_icon(
    id: impl Into<ElementId>,
    glyph: &'static str,
    style: ButtonStyle,
    disabled: bool,
) -> Stateful<Div> {
    button_action(id, glyph, style, disabled, None)
        .w(px(BUTTON_HEIGHT + GAP_SMALL))
        .flex_shrink_0()
}

pub fn link(id: impl Into<ElementId>, text: impl Into<SharedString>) -> Stateful<Div> {
    div()
        .id(id)
        .cursor_pointer()
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_WHITE))
        .hover(|style| style.text_color(rgb(TEXT_DIM)))
        .child(text.into())
}

pub fn button_column() -> Div {
    div()
        .flex()
        .flex_col()
        .gap(px(GAP_MEDIUM))
        .px(px(PADDING_PAGE))
        .py(px(GAP_LARGE))
        .w_full()
}

pub fn status_dot(color: u32) -> Div {
    div()
        .flex_shrink_0()
        .size(px(STATUS_DOT_SIZE))
        .rounded(px(STATUS_DOT_SIZE / 2.0))
        .bg(rgb(color))
}

pub fn indicator_color(indicator: Indicator) -> u32 {
    match indicator {
        Indicator::Success => COLOR_GREEN,
        Indicator::Warning => COLOR_YELLOW,
        Indicator::Error => COLOR_RED,
    }
}

pub fn spinner(text: impl Into<SharedString>) -> Div {
    div()
        .flex()
        .flex_row()
        .items_center()
        .justify_center()
        .gap(px(GAP_SMALL))
        .py(px(GAP_LARGE))
        .text_size(px(TEXT_SIZE_MEDIUM))
        .text_color(rgb(TEXT_DIM))
        .child(status_dot(COLOR_YELLOW))
        .child(text.into())
}

pub fn titlebar_title(text: &str) -> Div {
    div()
        .flex()
        .flex_1()
        .h_full()
        .items_center()
        .pl(px(PADDING_CELL))
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_DIM))
        .child(text.to_string())
}

pub fn titlebar_button(id: &'static str, text: &'static str, danger: bool) -> Stateful<Div> {
    let hover = if danger { BUTTON_DANGER_HOVER } else { CELL_HOVER };
    div()
        .id(id)
        .flex()
        .items_center()
        .px(px(PADDING_CELL))
        .h(px(TITLEBAR_HEIGHT))
        .text_size(px(TEXT_SIZE_SMALL))
        .text_color(rgb(TEXT_DIM))
        .cursor_pointer()
        .hover(move |style| style.bg(rgb(hover)).text_color(rgb(TEXT_WHITE)))
        .child(text)
}

/// Bar above a pushed page. The title and separator fade in once the page's own title
/// has scrolled out of view.
pub fn navigation_bar(title: &str, state: NavigationBarState, back: AnyElement) -> Div {
    div()
        .flex()
        .flex_row()
        .flex_shrink_0()
        .items_center()
        .w_full()
        .h(px(NAVIGATION_BAR_HEIGHT))
        .px(px(GAP_SMALL))
        .bg(rgb(SURFACE))
        .when(state.show_separator, |element| {
            element.border_b_1().border_color(rgb(BORDER))
        })
        .child(back)
        .child(
            div()
                .flex_1()
                .text_center()
                .text_size(px(TEXT_SIZE_MEDIUM))
                .text_color(rgb(TEXT_WHITE))
                .when(state.show_title, |element| element.child(title.to_string())),
        )
        .child(div().w(px(BUTTON_HEIGHT)))
}

pub fn back_button() -> Stateful<Div> {
    div()
        .id("navigation-back")
        .flex()
        .items_center()
        .justify_center()
        .w(px(BUTTON_HEIGHT))
        .h(px(BUTTON_HEIGHT))
        .rounded(px(RADIUS))
        .cursor_pointer()
        .text_size(px(TEXT_SIZE_TITLE))
        .text_color(rgb(TEXT_DIM))
        .hover(|style| style.text_color(rgb(TEXT_WHITE)))
        .child("‹")
}

pub fn banner(indicator: Indicator, title: &str, subtitle: Option<AnyElement>) -> Div {
    div()
        .flex()
        .flex_row()
        .items_start()
        .gap(px(GAP_SMALL))
        .w_full()
        .px(px(PADDING_CELL))
        .py(px(GAP_SMALL))
        .bg(rgb(BANNER_BACKGROUND))
        .child(div().pt(px(GAP_EXTRA_SMALL)).child(status_dot(indicator_color(indicator))))
        .child(
            div()
                .flex()
                .flex_col()
                .flex_1()
                .gap(px(GAP_EXTRA_SMALL))
                .child(
                    div()
                        .text_size(px(TEXT_SIZE_SMALL))
                        .text_color(rgb(TEXT_WHITE))
                        .font_weight(gpui::FontWeight::SEMIBOLD)
                        .child(title.to_string()),
                )
                .children(subtitle),
        )
}

/// Modal box over a dimmed page.
pub fn dialog(message: impl Into<SharedString>, details: Vec<AnyElement>, buttons: Vec<AnyElement>) -> Div {
    div()
        .absolute()
        .top_0()
        .left_0()
        .size_full()
        .flex()
        .items_center()
        .justify_center()
        .bg(rgba(OVERLAY))
        .child(
            div()
                .id("dialog")
                .flex()
                .flex_col()
                .gap(px(GAP_MEDIUM))
                .w(px(DIALOG_WIDTH))
                .p(px(PADDING_CELL))
                .rounded(px(RADIUS * 2.0))
                .bg(rgb(DIALOG_BACKGROUND))
                .border_1()
                .border_color(rgb(BORDER))
                .occlude()
                .child(
                    div()
                        .text_size(px(TEXT_SIZE_MEDIUM))
                        .text_color(rgb(TEXT_WHITE))
                        .child(message.into()),
                )
                .children(details)
                .child(div().flex().flex_col().gap(px(GAP_SMALL)).children(buttons)),
        )
}
