use std::time::Duration;

use gpui::{Point, ScrollHandle, px};

pub const MIN_THUMB_HEIGHT: f32 = 8.0;
pub const AUTO_HIDE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_PADDING: ThumbPadding = ThumbPadding { x: 2.0, y: 2.0 };

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThumbPadding {
    pub x: f32,
    pub y: f32,
}

/// Measurements of a scroll container, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub visible_height: f32,
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub track_height: f32,
}

impl ScrollMetrics {
    pub fn from_handle(handle: &ScrollHandle) -> Self {
        let visible_height = f32::from(handle.bounds().size.height);
        let max_offset = f32::from(handle.max_offset().height);
        Self {
            visible_height,
            scroll_height: visible_height + max_offset,
            scroll_top: -f32::from(handle.offset().y),
            track_height: visible_height,
        }
    }

    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.visible_height).max(0.0)
    }

    pub fn clamp(&self, scroll_top: f32) -> f32 {
        scroll_top.clamp(0.0, self.max_scroll_top())
    }
}

pub fn thumb_height(visible_height: f32, scroll_height: f32) -> f32 {
    if scroll_height <= 0.0 {
        return visible_height.max(MIN_THUMB_HEIGHT);
    }
    (visible_height * visible_height / scroll_height).max(MIN_THUMB_HEIGHT)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThumbGeometry {
    pub height: f32,
    pub y: f32,
    pub can_scroll: bool,
}

pub fn thumb_geometry(metrics: &ScrollMetrics, padding: ThumbPadding) -> ThumbGeometry {
    let height = thumb_height(metrics.visible_height, metrics.scroll_height);
    let can_scroll = height < metrics.track_height;
    let max_scroll_top = metrics.max_scroll_top();
    let travel = (metrics.track_height - 2.0 * padding.y - height).max(0.0);
    let y = if max_scroll_top > 0.0 {
        travel * metrics.clamp(metrics.scroll_top) / max_scroll_top + padding.y
    } else {
        padding.y
    };
    ThumbGeometry {
        height,
        y,
        can_scroll,
    }
}

/// Converts pointer movement along the track into a content scroll offset.
pub fn drag_scroll_top(
    start_scroll_top: f32,
    pointer_delta: f32,
    metrics: &ScrollMetrics,
    padding: ThumbPadding,
) -> f32 {
    let height = thumb_height(metrics.visible_height, metrics.scroll_height);
    let travel = metrics.track_height - 2.0 * padding.y - height;
    if travel <= 0.0 {
        return metrics.clamp(start_scroll_top);
    }
    let ratio = metrics.max_scroll_top() / travel;
    metrics.clamp(start_scroll_top + pointer_delta * ratio)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAlignment {
    Top,
    Bottom,
    Middle,
}

pub fn scroll_into_view_offset(
    child_top: f32,
    child_height: f32,
    visible_height: f32,
    alignment: ScrollAlignment,
) -> f32 {
    match alignment {
        ScrollAlignment::Top => child_top,
        ScrollAlignment::Bottom => child_top - (visible_height - child_height),
        ScrollAlignment::Middle => child_top - (visible_height - child_height) / 2.0,
    }
}

/// Scrolls the shortest distance that brings the child fully into view.
pub fn ensure_visible_offset(
    scroll_top: f32,
    child_top: f32,
    child_height: f32,
    visible_height: f32,
) -> f32 {
    if child_top < scroll_top {
        child_top
    } else if child_top + child_height > scroll_top + visible_height {
        child_top + child_height - visible_height
    } else {
        scroll_top
    }
}

pub fn scroll_to(handle: &ScrollHandle, scroll_top: f32) {
    let metrics = ScrollMetrics::from_handle(handle);
    let offset = handle.offset();
    handle.set_offset(Point::new(offset.x, px(-metrics.clamp(scroll_top))));
}

/// Sets an offset remembered for a page that has not been laid out yet. Layout clamps
/// it once the new content size is known.
pub fn restore_offset(handle: &ScrollHandle, scroll_top: f32) {
    let offset = handle.offset();
    handle.set_offset(Point::new(offset.x, px(-scroll_top.max(0.0))));
}

pub fn scroll_to_top(handle: &ScrollHandle) {
    scroll_to(handle, 0.0);
}

pub fn current_offset(handle: &ScrollHandle) -> f32 {
    -f32::from(handle.offset().y)
}

/// Timer work the owning view has to perform after a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Cancel,
    Keep,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    pointer_start: f32,
    scroll_top_start: f32,
}

/// Visibility and interaction state of one overlay scrollbar.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollbarState {
    pub auto_hide: bool,
    pub indicators_visible: bool,
    pub wide: bool,
    pub can_scroll: bool,
    drag: Option<Drag>,
}

impl ScrollbarState {
    pub fn new(auto_hide: bool) -> Self {
        Self {
            auto_hide,
            indicators_visible: !auto_hide,
            wide: false,
            can_scroll: false,
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn on_wheel_scroll(&mut self) -> TimerCommand {
        self.indicators_visible = true;
        if self.auto_hide && !self.wide && !self.is_dragging() {
            TimerCommand::Start
        } else {
            TimerCommand::Keep
        }
    }

    pub fn on_track_enter(&mut self) -> TimerCommand {
        self.indicators_visible = true;
        self.wide = true;
        TimerCommand::Cancel
    }

    pub fn on_track_leave(&mut self) -> TimerCommand {
        if self.is_dragging() {
            return TimerCommand::Keep;
        }
        self.wide = false;
        if self.auto_hide {
            TimerCommand::Start
        } else {
            TimerCommand::Keep
        }
    }

    pub fn on_drag_start(&mut self, pointer_y: f32, scroll_top: f32) {
        self.drag = Some(Drag {
            pointer_start: pointer_y,
            scroll_top_start: scroll_top,
        });
    }

    /// New scroll offset for the content while the thumb is dragged.
    pub fn on_drag_move(
        &self,
        pointer_y: f32,
        metrics: &ScrollMetrics,
        padding: ThumbPadding,
    ) -> Option<f32> {
        let drag = self.drag?;
        Some(drag_scroll_top(
            drag.scroll_top_start,
            pointer_y - drag.pointer_start,
            metrics,
            padding,
        ))
    }

    /// Releasing outside the track after a drag counts as leaving it.
    pub fn on_mouse_up(&mut self, inside_track: bool) -> TimerCommand {
        let was_dragging = self.drag.take().is_some();
        if was_dragging && !inside_track {
            self.on_track_leave()
        } else {
            TimerCommand::Keep
        }
    }

    pub fn on_auto_hide_elapsed(&mut self) {
        if self.auto_hide && !self.wide && !self.is_dragging() {
            self.indicators_visible = false;
        }
    }

    /// Becoming scrollable flashes the indicators so the user notices.
    pub fn on_can_scroll_changed(&mut self, can_scroll: bool) -> TimerCommand {
        let became_scrollable = can_scroll && !self.can_scroll;
        self.can_scroll = can_scroll;
        if became_scrollable {
            self.indicators_visible = true;
            if self.auto_hide {
                return TimerCommand::Start;
            }
        }
        TimerCommand::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(scroll_top: f32) -> ScrollMetrics {
        ScrollMetrics {
            visible_height: 400.0,
            scroll_height: 1600.0,
            scroll_top,
            track_height: 400.0,
        }
    }

    #[test]
    fn thumb_height_is_visible_squared_over_content() {
        assert_eq!(thumb_height(400.0, 1600.0), 100.0);
        assert_eq!(thumb_height(100.0, 100_000.0), MIN_THUMB_HEIGHT);
    }

    #[test]
    fn thumb_position_spans_padded_track() {
        let top = thumb_geometry(&metrics(0.0), DEFAULT_PADDING);
        assert_eq!(top.y, 2.0);
        assert!(top.can_scroll);
        let bottom = thumb_geometry(&metrics(1200.0), DEFAULT_PADDING);
        assert_eq!(bottom.y, 400.0 - 2.0 - 100.0);
    }

    #[test]
    fn thumb_position_is_monotonic() {
        let mut previous = f32::MIN;
        for step in 0..=24 {
            let y = thumb_geometry(&metrics(step as f32 * 50.0), DEFAULT_PADDING).y;
            assert!(y >= previous);
            previous = y;
        }
    }

    #[test]
    fn content_that_fits_cannot_scroll() {
        let geometry = thumb_geometry(
            &ScrollMetrics {
                visible_height: 400.0,
                scroll_height: 400.0,
                scroll_top: 0.0,
                track_height: 400.0,
            },
            DEFAULT_PADDING,
        );
        assert!(!geometry.can_scroll);
    }

    #[test]
    fn dragging_scales_pointer_delta_to_content() {
        let mut state = ScrollbarState::new(true);
        state.on_drag_start(50.0, 0.0);
        let scroll_top = state
            .on_drag_move(50.0 + 98.0, &metrics(0.0), DEFAULT_PADDING)
            .unwrap();
        assert_eq!(scroll_top, 600.0);
        let clamped = state
            .on_drag_move(1000.0, &metrics(0.0), DEFAULT_PADDING)
            .unwrap();
        assert_eq!(clamped, 1200.0);
    }

    #[test]
    fn scroll_into_view_alignments() {
        assert_eq!(scroll_into_view_offset(500.0, 50.0, 400.0, ScrollAlignment::Top), 500.0);
        assert_eq!(scroll_into_view_offset(500.0, 50.0, 400.0, ScrollAlignment::Bottom), 150.0);
        assert_eq!(scroll_into_view_offset(500.0, 50.0, 400.0, ScrollAlignment::Middle), 325.0);
    }

    #[test]
    fn ensure_visible_scrolls_minimally() {
        assert_eq!(ensure_visible_offset(100.0, 150.0, 50.0, 400.0), 100.0);
        assert_eq!(ensure_visible_offset(100.0, 50.0, 50.0, 400.0), 50.0);
        assert_eq!(ensure_visible_offset(100.0, 480.0, 50.0, 400.0), 130.0);
    }

    #[test]
    fn hover_cancels_auto_hide_and_leave_restarts_it() {
        let mut state = ScrollbarState::new(true);
        assert_eq!(state.on_wheel_scroll(), TimerCommand::Start);
        assert_eq!(state.on_track_enter(), TimerCommand::Cancel);
        assert!(state.wide);
        state.on_auto_hide_elapsed();
        assert!(state.indicators_visible);
        assert_eq!(state.on_track_leave(), TimerCommand::Start);
        state.on_auto_hide_elapsed();
        assert!(!state.indicators_visible);
    }

    #[test]
    fn leaving_without_auto_hide_only_shrinks() {
        let mut state = ScrollbarState::new(false);
        state.on_track_enter();
        assert_eq!(state.on_track_leave(), TimerCommand::Keep);
        assert!(!state.wide);
        assert!(state.indicators_visible);
    }

    #[test]
    fn release_outside_track_after_drag_behaves_like_leave() {
        let mut state = ScrollbarState::new(true);
        state.on_track_enter();
        state.on_drag_start(10.0, 0.0);
        assert_eq!(state.on_track_leave(), TimerCommand::Keep);
        assert!(state.wide);
        assert_eq!(state.on_mouse_up(false), TimerCommand::Start);
        assert!(!state.wide);
    }

    #[test]
    fn becoming_scrollable_flashes_indicators() {
        let mut state = ScrollbarState::new(true);
        assert_eq!(state.on_can_scroll_changed(true), TimerCommand::Start);
        assert!(state.indicators_visible);
        assert_eq!(state.on_can_scroll_changed(true), TimerCommand::Keep);
    }
}
