//! Step Views: one variant per step, each carrying only its own transient UI state.
//! A view is rebuilt from scratch whenever its step is entered.

use serde::Serialize;

use crate::models::analysis::KeywordExtraction;
use crate::wizard::state::{Step, WizardState};
use crate::wizard::validation::{job_description_gate, profile_gate, GateStatus};

pub const ANALYSIS_FALLBACK_WARNING: &str =
    "We could not reach the analysis service. Using basic local analysis instead.";
pub const GENERATION_FALLBACK_WARNING: &str =
    "We could not reach the generation service. Using local generation instead.";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobDescriptionView {
    pub extracting: bool,
    pub extraction: Option<KeywordExtraction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisView {
    pub analyzing: bool,
    pub match_score: u32,
    pub suggestions: Vec<String>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationView {
    pub generating: bool,
    pub downloading: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepView {
    JobDescription(JobDescriptionView),
    Profile,
    Analysis(AnalysisView),
    Generation(GenerationView),
}

impl StepView {
    pub fn for_step(step: Step) -> Self {
        match step {
            Step::JobDescription => StepView::JobDescription(JobDescriptionView::default()),
            Step::Profile => StepView::Profile,
            Step::Analysis => StepView::Analysis(AnalysisView::default()),
            Step::Generation => StepView::Generation(GenerationView::default()),
        }
    }

    pub fn step(&self) -> Step {
        match self {
            StepView::JobDescription(_) => Step::JobDescription,
            StepView::Profile => Step::Profile,
            StepView::Analysis(_) => Step::Analysis,
            StepView::Generation(_) => Step::Generation,
        }
    }

    /// Whether the "continue" action is enabled on this view.
    pub fn gate(&self, state: &WizardState) -> GateStatus {
        match self {
            StepView::JobDescription(_) => job_description_gate(&state.job_description),
            StepView::Profile => profile_gate(state),
            StepView::Analysis(view) if view.analyzing => GateStatus {
                can_continue: false,
                missing: vec!["the match analysis to finish"],
            },
            StepView::Analysis(_) => GateStatus::open(),
            StepView::Generation(_) => GateStatus {
                can_continue: false,
                missing: vec![],
            },
        }
    }
}
