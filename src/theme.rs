// Dark navy theme
//
// Pages sit on a deep blue base, cells are one step lighter, and the primary action
// colors carry the connection state: green secures, red disconnects or cancels.

// Backgrounds
pub const SURFACE: u32 = 0x192e45;
pub const TITLEBAR_BACKGROUND: u32 = 0x0f2033;
pub const CELL_BACKGROUND: u32 = 0x294d73;
pub const CELL_HOVER: u32 = 0x3a5f86;
pub const CELL_NESTED: u32 = 0x1e3d5e;
pub const CELL_NESTED_DEEP: u32 = 0x18324e;
pub const INPUT_BACKGROUND: u32 = 0x10243a;
pub const MAP_OCEAN: u32 = 0x192e45;
pub const MAP_GRID: u32 = 0x213d5c;
pub const OVERLAY: u32 = 0x00000099;
pub const DIALOG_BACKGROUND: u32 = 0x192e45;
pub const BANNER_BACKGROUND: u32 = 0x0f2033;

// Borders
pub const BORDER: u32 = 0x3a5f86;
pub const BORDER_FOCUS: u32 = 0xffd524;

// Text
pub const TEXT_PRIMARY: u32 = 0xffffff;
pub const TEXT_WHITE: u32 = 0xffffff;
pub const TEXT_DIM: u32 = 0xa3aebc;
pub const TEXT_DISABLED: u32 = 0x6b7a8c;
pub const INPUT_PLACEHOLDER: u32 = 0xffffff66;

// Buttons
pub const BUTTON_SUCCESS: u32 = 0x44ad4d;
pub const BUTTON_SUCCESS_HOVER: u32 = 0x2e8a37;
pub const BUTTON_DANGER: u32 = 0xe34039;
pub const BUTTON_DANGER_HOVER: u32 = 0xb82e28;
pub const BUTTON_NEUTRAL: u32 = 0x3a5f86;
pub const BUTTON_NEUTRAL_HOVER: u32 = 0x4a709a;
pub const BUTTON_NEUTRAL_TRANSLUCENT: u32 = 0xffffff33;

// Status colors
pub const COLOR_GREEN: u32 = 0x44ad4d;
pub const COLOR_RED: u32 = 0xe34039;
pub const COLOR_YELLOW: u32 = 0xffd524;

// Selection highlight
pub const SELECTION: u32 = 0xffd52440;

// Typography
pub const TEXT_SIZE_TITLE: f32 = 24.0;
pub const TEXT_SIZE_LARGE: f32 = 16.0;
pub const TEXT_SIZE_MEDIUM: f32 = 14.0;
pub const TEXT_SIZE_SMALL: f32 = 12.0;
pub const TEXT_SIZE_EXTRA_SMALL: f32 = 10.0;

pub const LINE_HEIGHT_MEDIUM: f32 = 18.0;

// Element sizing
pub const ELEMENT_HEIGHT: f32 = 44.0;
pub const BUTTON_HEIGHT: f32 = 40.0;
pub const TITLEBAR_HEIGHT: f32 = 32.0;
pub const NAVIGATION_BAR_HEIGHT: f32 = 48.0;
pub const INPUT_HEIGHT: f32 = 32.0;
pub const STATUS_DOT_SIZE: f32 = 10.0;
pub const MARKER_SIZE: f32 = 16.0;
pub const SCROLLBAR_WIDTH: f32 = 6.0;
pub const SCROLLBAR_WIDTH_WIDE: f32 = 10.0;

// Radius
pub const RADIUS: f32 = 4.0;
pub const CURSOR_WIDTH: f32 = 2.0;

// Spacing
pub const GAP_EXTRA_SMALL: f32 = 4.0;
pub const GAP_SMALL: f32 = 8.0;
pub const GAP_MEDIUM: f32 = 12.0;
pub const GAP_LARGE: f32 = 20.0;

// Padding
pub const PADDING_INPUT_HORIZONTAL: f32 = 10.0;
pub const PADDING_INPUT_VERTICAL: f32 = 6.0;
pub const PADDING_CELL: f32 = 16.0;
pub const PADDING_PAGE: f32 = 22.0;
pub const INDENT: f32 = 18.0;

// Layout
pub const WINDOW_WIDTH: f32 = 320.0;
pub const WINDOW_HEIGHT: f32 = 568.0;
pub const MAP_HEIGHT: f32 = 568.0;
pub const DIALOG_WIDTH: f32 = 280.0;

// Toggle
pub const TOGGLE_WIDTH: f32 = 48.0;
pub const TOGGLE_HEIGHT: f32 = 28.0;
pub const TOGGLE_DOT_SIZE: f32 = 22.0;
pub const TOGGLE_DOT_ON_OFFSET: f32 = 22.0;
pub const TOGGLE_DOT_OFF_OFFSET: f32 = 2.0;
