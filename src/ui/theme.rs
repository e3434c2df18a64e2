use ratatui::style::Color;

pub const BG_PRIMARY: Color = Color::Rgb(0, 0, 0);
pub const BG_PANEL: Color = Color::Rgb(12, 12, 12);
pub const BG_SIDEBAR: Color = Color::Rgb(18, 18, 28);
pub const FG_PRIMARY: Color = Color::Rgb(190, 190, 190);
pub const FG_DIM: Color = Color::Rgb(128, 128, 128);

pub const BAR_BG: Color = Color::Rgb(23, 52, 127);
pub const BAR_TEXT: Color = Color::Rgb(235, 240, 255);
pub const BAR_HIGHLIGHT_BG: Color = Color::Rgb(73, 102, 177);
pub const BAR_HIGHLIGHT_TEXT: Color = Color::Rgb(255, 255, 255);

pub const BORDER_IDLE: Color = Color::Rgb(61, 120, 120);
pub const BORDER_FOCUS: Color = Color::Rgb(187, 94, 0);
pub const DIVIDER_ACTIVE: Color = Color::Rgb(120, 160, 255);

pub const USER_ACCENT: Color = Color::Rgb(130, 110, 255);
pub const AI_ACCENT: Color = Color::Rgb(170, 170, 170);
pub const TOOL_ACCENT: Color = Color::Rgb(110, 200, 140);
pub const RESEARCH_BADGE: Color = Color::Rgb(255, 196, 0);

pub const EDITOR_LINE_HIGHLIGHT_BG: Color = Color::Rgb(40, 40, 40);
pub const EDITOR_LINE_HIGHLIGHT_FG: Color = Color::Rgb(255, 255, 255);
pub const LIST_HIGHLIGHT_BG: Color = Color::Rgb(60, 60, 90);
pub const GUTTER_FG: Color = Color::Rgb(173, 173, 173);
pub const TERMINAL_OK: Color = Color::Rgb(80, 220, 120);
