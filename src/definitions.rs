use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

/// Which half of the screen receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Panel,
    Chat,
}

impl FocusArea {
    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Panel => "Panel",
            FocusArea::Chat => "Chat",
        }
    }
}

/// The side panels reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelId {
    Browser,
    Develop,
    Tools,
}

impl PanelId {
    pub const ALL: [PanelId; 3] = [PanelId::Browser, PanelId::Develop, PanelId::Tools];

    pub fn label(&self) -> &'static str {
        match self {
            PanelId::Browser => "Browser",
            PanelId::Develop => "Develop",
            PanelId::Tools => "Tools",
        }
    }

    /// Single glyph drawn on the sidebar button.
    pub fn glyph(&self) -> char {
        match self {
            PanelId::Browser => 'B',
            PanelId::Develop => 'D',
            PanelId::Tools => 'T',
        }
    }
}

/// Sub-tabs of the Develop panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopTab {
    #[default]
    Editor,
    Preview,
    Terminal,
}

impl DevelopTab {
    pub const ALL: [DevelopTab; 3] = [DevelopTab::Editor, DevelopTab::Preview, DevelopTab::Terminal];

    pub fn label(&self) -> &'static str {
        match self {
            DevelopTab::Editor => "Editor",
            DevelopTab::Preview => "Preview",
            DevelopTab::Terminal => "Terminal",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DevelopTab::Editor => DevelopTab::Preview,
            DevelopTab::Preview => DevelopTab::Terminal,
            DevelopTab::Terminal => DevelopTab::Editor,
        }
    }
}

/// Clickable regions registered while a frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    SidebarButton(PanelId),
    PanelClose,
    Divider,
    DevelopTab(DevelopTab),
    PanelBody,
    ToolEntry(usize),
    ChatHistory,
    ChatInput,
}

#[derive(Default, Debug, Clone)]
pub struct HitRegistry {
    entries: Vec<(HitTarget, Rect)>,
}

impl HitRegistry {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn register(&mut self, target: HitTarget, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.entries.push((target, area));
    }

    /// Later registrations sit on top of earlier ones.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        self.entries
            .iter()
            .rev()
            .find(|(_, rect)| rect_contains(rect, column, row))
            .map(|(target, _)| *target)
    }
}

pub fn rect_contains(rect: &Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
