use log::debug;

use crate::backend::{AssistantReply, PreviewAction};
use crate::definitions::{DevelopTab, PanelId};

pub const GFR_CALCULATOR_HTML: &str = include_str!("../../assets/gfr_calculator.html");
pub const GFR_CALCULATOR_DARK_HTML: &str = include_str!("../../assets/gfr_calculator_dark.html");

pub const GFR_TOOL: &str = "GFR Calculator";

/// Where the canned walkthrough currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoState {
    #[default]
    Idle,
    /// The calculator is on screen; a dark-mode request continues the script.
    AwaitingDarkModeRequest,
    /// The dark calculator is on screen; the next prompt closes the script.
    AwaitingReaction,
}

/// The scripted GFR calculator walkthrough.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDemo {
    state: DemoState,
}

impl ScriptedDemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DemoState {
        self.state
    }

    /// The scripted reply for `prompt` and the state it leads to, or `None`
    /// when the script has nothing to say. The state only moves on
    /// through `advance`, once the reply has actually been shown.
    pub fn step_for(&self, prompt: &str) -> Option<DemoStep> {
        let lowered = prompt.to_lowercase();
        let (reply, next) = match self.state {
            DemoState::Idle if lowered.contains("gfr") => {
                (calculator_reply(), DemoState::AwaitingDarkModeRequest)
            }
            DemoState::AwaitingDarkModeRequest if lowered.contains("dark") => {
                (dark_mode_reply(), DemoState::AwaitingReaction)
            }
            DemoState::AwaitingReaction => (closing_reply(), DemoState::Idle),
            _ => return None,
        };
        Some(DemoStep { reply, next })
    }

    pub fn advance(&mut self, next: DemoState) {
        debug!("scripted demo: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// One scripted exchange: what to answer and where the script goes after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoStep {
    pub reply: AssistantReply,
    pub next: DemoState,
}

fn preview(code: &str) -> PreviewAction {
    PreviewAction {
        code: code.to_string(),
        target_panel: PanelId::Develop,
        target_develop_tab: DevelopTab::Preview,
    }
}

fn calculator_reply() -> AssistantReply {
    AssistantReply::from_text(
        "I've built a GFR calculator using the CKD-EPI 2021 equation. It's open in the Develop \
panel's Preview tab: enter serum creatinine, age and sex to get the eGFR and the CKD stage.",
    )
    .with_tool(GFR_TOOL)
    .with_reasoning("The request asks for a kidney function estimate, which the GFR Calculator covers.")
    .with_preview(preview(GFR_CALCULATOR_HTML))
}

fn dark_mode_reply() -> AssistantReply {
    AssistantReply::from_text(
        "Done. The calculator now uses a dark theme; the formula and staging are unchanged.",
    )
    .with_tool(GFR_TOOL)
    .with_reasoning("Only the styling changed, so the same tool applies.")
    .with_preview(preview(GFR_CALCULATOR_DARK_HTML))
}

fn closing_reply() -> AssistantReply {
    AssistantReply::from_text(
        "Glad it helps! Ask for another tool whenever you're ready, or open the Tools panel to run a lookup.",
    )
}
