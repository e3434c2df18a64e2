use log::debug;

use crate::definitions::PanelId;

pub const MIN_PANEL_WIDTH_PERCENT: f32 = 15.0;
pub const MAX_PANEL_WIDTH_PERCENT: f32 = 80.0;
pub const DEFAULT_PANEL_WIDTH_PERCENT: f32 = 45.0;

/// Width change per keyboard resize step.
pub const KEYBOARD_RESIZE_STEP_PERCENT: f32 = 5.0;
/// How far the rendered width moves toward its target on each frame.
const TRANSITION_STEP_PERCENT: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Closed,
    Open,
    Resizing,
}

/// Pointer capture taken when a divider drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeCapture {
    start_x: i32,
    start_width_cells: f32,
}

/// Which side panel is visible, how wide it is, and the drag that resizes it.
#[derive(Debug, Clone)]
pub struct PanelLayout {
    active_panel: Option<PanelId>,
    /// Target width as a percentage of the container, always in [15, 80].
    width_percent: f32,
    /// Width used when a panel opens from the closed state.
    opening_width_percent: f32,
    /// Width of the container (panel + chat) in cells, known after a render.
    container_width: u16,
    resize: Option<ResizeCapture>,
    /// Width actually drawn, chasing the target during transitions.
    rendered_percent: f32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_WIDTH_PERCENT)
    }
}

impl PanelLayout {
    pub fn new(opening_width_percent: f32) -> Self {
        let opening = clamp_width(opening_width_percent);
        Self {
            active_panel: None,
            width_percent: opening,
            opening_width_percent: opening,
            container_width: 0,
            resize: None,
            rendered_percent: 0.0,
        }
    }

    pub fn active_panel(&self) -> Option<PanelId> {
        self.active_panel
    }

    pub fn width_percent(&self) -> f32 {
        self.width_percent
    }

    pub fn rendered_percent(&self) -> f32 {
        self.rendered_percent
    }

    pub fn container_width(&self) -> u16 {
        self.container_width
    }

    pub fn phase(&self) -> LayoutPhase {
        match (self.active_panel, self.resize) {
            (None, _) => LayoutPhase::Closed,
            (Some(_), Some(_)) => LayoutPhase::Resizing,
            (Some(_), None) => LayoutPhase::Open,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    /// Sidebar behaviour: the active panel's button closes it, any other
    /// button shows that panel.
    pub fn open_panel(&mut self, panel: PanelId) {
        if self.active_panel == Some(panel) {
            self.close_panel();
        } else {
            self.show_panel(panel);
        }
    }

    /// Shows a panel without toggling. Opening from the closed state
    /// guarantees at least the opening width.
    pub fn show_panel(&mut self, panel: PanelId) {
        if self.active_panel.is_none() {
            self.width_percent = self.width_percent.max(self.opening_width_percent);
        }
        debug!("showing panel {:?} at {:.0}%", panel, self.width_percent);
        self.active_panel = Some(panel);
    }

    pub fn close_panel(&mut self) {
        self.resize = None;
        self.active_panel = None;
    }

    /// Recorded on every render so drags can convert cells to percent.
    pub fn set_container_width(&mut self, width: u16) {
        self.container_width = width;
    }

    /// Starts a divider drag. Returns false when no panel is open or the
    /// container has not been measured yet.
    pub fn begin_resize(&mut self, pointer_x: i32) -> bool {
        if self.active_panel.is_none() || self.container_width == 0 {
            return false;
        }
        // The drag starts from the divider as drawn, even mid-transition.
        let start_width_cells = f32::from(self.container_width) * self.rendered_percent / 100.0;
        self.resize = Some(ResizeCapture {
            start_x: pointer_x,
            start_width_cells,
        });
        self.width_percent = clamp_width(self.rendered_percent);
        true
    }

    pub fn update_resize(&mut self, pointer_x: i32) {
        let Some(capture) = self.resize else {
            return;
        };
        if self.container_width == 0 {
            return;
        }
        let delta = (pointer_x - capture.start_x) as f32;
        let width_cells = capture.start_width_cells + delta;
        self.width_percent = clamp_width(width_cells / f32::from(self.container_width) * 100.0);
        self.rendered_percent = self.width_percent;
    }

    pub fn end_resize(&mut self) {
        if self.resize.take().is_some() {
            debug!("resize finished at {:.1}%", self.width_percent);
        }
    }

    /// Keyboard resize. Ignored while closed.
    pub fn nudge_width(&mut self, delta_percent: f32) {
        if self.active_panel.is_none() {
            return;
        }
        self.width_percent = clamp_width(self.width_percent + delta_percent);
    }

    /// Percentage the rendered width is heading to.
    pub fn target_percent(&self) -> f32 {
        if self.active_panel.is_some() {
            self.width_percent
        } else {
            0.0
        }
    }

    pub fn is_transitioning(&self) -> bool {
        (self.rendered_percent - self.target_percent()).abs() > f32::EPSILON
    }

    /// Moves the rendered width one step toward the target. Resizing snaps
    /// instead of animating. Returns whether another frame is needed.
    pub fn advance_transition(&mut self) -> bool {
        let target = self.target_percent();
        if self.resize.is_some() {
            self.rendered_percent = target;
            return false;
        }
        let gap = target - self.rendered_percent;
        if gap.abs() <= TRANSITION_STEP_PERCENT {
            self.rendered_percent = target;
        } else {
            self.rendered_percent += TRANSITION_STEP_PERCENT.copysign(gap);
        }
        self.is_transitioning()
    }

    /// Rendered panel width in cells for the current container.
    pub fn panel_width_cells(&self) -> u16 {
        let cells = f32::from(self.container_width) * self.rendered_percent / 100.0;
        cells.round().clamp(0.0, f32::from(self.container_width)) as u16
    }
}

fn clamp_width(percent: f32) -> f32 {
    percent.clamp(MIN_PANEL_WIDTH_PERCENT, MAX_PANEL_WIDTH_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured() -> PanelLayout {
        let mut layout = PanelLayout::default();
        layout.set_container_width(100);
        layout
    }

    #[test]
    fn open_toggles_only_for_the_active_panel() {
        let mut layout = measured();
        let sequence = [
            PanelId::Browser,
            PanelId::Develop,
            PanelId::Develop,
            PanelId::Tools,
            PanelId::Browser,
            PanelId::Browser,
            PanelId::Develop,
        ];
        for panel in sequence {
            let before = layout.active_panel();
            layout.open_panel(panel);
            let expected = if before == Some(panel) { None } else { Some(panel) };
            assert_eq!(layout.active_panel(), expected);
        }
        assert_eq!(layout.active_panel(), Some(PanelId::Develop));
    }

    #[test]
    fn show_panel_never_toggles() {
        let mut layout = measured();
        layout.show_panel(PanelId::Develop);
        layout.show_panel(PanelId::Develop);
        assert_eq!(layout.active_panel(), Some(PanelId::Develop));
        assert_eq!(layout.phase(), LayoutPhase::Open);
    }

    #[test]
    fn reopening_bumps_narrow_width_to_default() {
        let mut layout = measured();
        layout.show_panel(PanelId::Tools);
        layout.begin_resize(45);
        layout.update_resize(5);
        layout.end_resize();
        assert_eq!(layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);

        // switching panels while open keeps the narrow width
        layout.show_panel(PanelId::Browser);
        assert_eq!(layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);

        layout.close_panel();
        layout.show_panel(PanelId::Develop);
        assert_eq!(layout.width_percent(), DEFAULT_PANEL_WIDTH_PERCENT);
    }

    #[test]
    fn wide_width_survives_reopen() {
        let mut layout = measured();
        layout.show_panel(PanelId::Tools);
        layout.nudge_width(20.0);
        layout.close_panel();
        layout.open_panel(PanelId::Tools);
        assert_eq!(layout.width_percent(), 65.0);
    }

    #[test]
    fn extreme_drags_stay_clamped() {
        let mut layout = measured();
        layout.show_panel(PanelId::Develop);
        while layout.advance_transition() {}
        assert!(layout.begin_resize(45));
        assert_eq!(layout.phase(), LayoutPhase::Resizing);

        layout.update_resize(1_000_000);
        assert_eq!(layout.width_percent(), MAX_PANEL_WIDTH_PERCENT);
        layout.update_resize(-1_000_000);
        assert_eq!(layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);
        layout.update_resize(55);
        assert!((layout.width_percent() - 55.0).abs() < 0.01);

        layout.end_resize();
        assert_eq!(layout.phase(), LayoutPhase::Open);
        layout.update_resize(0);
        assert!((layout.width_percent() - 55.0).abs() < 0.01);
    }

    #[test]
    fn resize_during_opening_transition_starts_at_drawn_width() {
        let mut layout = measured();
        layout.open_panel(PanelId::Develop);
        for _ in 0..3 {
            layout.advance_transition();
        }
        let drawn = layout.rendered_percent();
        assert!(drawn < layout.width_percent());

        assert!(layout.begin_resize(drawn as i32));
        layout.update_resize(drawn as i32);
        assert!((layout.width_percent() - drawn).abs() < 0.01);
        assert!((layout.rendered_percent() - drawn).abs() < 0.01);
    }

    #[test]
    fn resize_needs_open_panel_and_measured_container() {
        let mut layout = PanelLayout::default();
        layout.show_panel(PanelId::Browser);
        assert!(!layout.begin_resize(10));

        let mut closed = measured();
        assert!(!closed.begin_resize(10));
        closed.update_resize(90);
        assert_eq!(closed.width_percent(), DEFAULT_PANEL_WIDTH_PERCENT);
        assert_eq!(closed.phase(), LayoutPhase::Closed);
    }

    #[test]
    fn closing_ends_drag() {
        let mut layout = measured();
        layout.show_panel(PanelId::Browser);
        layout.begin_resize(45);
        layout.close_panel();
        assert!(!layout.is_resizing());
        assert_eq!(layout.phase(), LayoutPhase::Closed);
    }

    #[test]
    fn transitions_animate_except_while_resizing() {
        let mut layout = measured();
        layout.show_panel(PanelId::Develop);
        assert!(layout.is_transitioning());
        let mut frames = 0;
        while layout.advance_transition() {
            frames += 1;
            assert!(layout.rendered_percent() < DEFAULT_PANEL_WIDTH_PERCENT);
        }
        assert!(frames > 1);
        assert_eq!(layout.rendered_percent(), DEFAULT_PANEL_WIDTH_PERCENT);
        assert_eq!(layout.panel_width_cells(), 45);

        layout.begin_resize(45);
        layout.update_resize(70);
        assert!(!layout.advance_transition());
        assert!((layout.rendered_percent() - 70.0).abs() < 0.01);
        layout.end_resize();

        layout.close_panel();
        assert!(layout.advance_transition());
        assert!(layout.rendered_percent() > 0.0);
    }

    #[test]
    fn keyboard_nudge_is_clamped_and_ignored_when_closed() {
        let mut layout = measured();
        layout.nudge_width(KEYBOARD_RESIZE_STEP_PERCENT);
        assert_eq!(layout.width_percent(), DEFAULT_PANEL_WIDTH_PERCENT);

        layout.show_panel(PanelId::Tools);
        for _ in 0..20 {
            layout.nudge_width(KEYBOARD_RESIZE_STEP_PERCENT);
        }
        assert_eq!(layout.width_percent(), MAX_PANEL_WIDTH_PERCENT);
        for _ in 0..20 {
            layout.nudge_width(-KEYBOARD_RESIZE_STEP_PERCENT);
        }
        assert_eq!(layout.width_percent(), MIN_PANEL_WIDTH_PERCENT);
    }
}
