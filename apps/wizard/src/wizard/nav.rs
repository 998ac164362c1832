//! Sidebar navigation: step titles, completion marks and the jump policy.

use serde::Serialize;

use crate::wizard::state::Step;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub id: u8,
    pub title: &'static str,
    pub completed: bool,
    pub active: bool,
    /// Only completed steps can be jumped to.
    pub enabled: bool,
}

pub fn title(step: Step) -> &'static str {
    match step {
        Step::JobDescription => "Job description",
        Step::Profile => "Personal information",
        Step::Analysis => "Match analysis",
        Step::Generation => "CV generation",
    }
}

pub fn can_jump(current: Step, target: Step) -> bool {
    target < current
}

pub fn entries(current: Step) -> Vec<NavEntry> {
    Step::ALL
        .iter()
        .map(|&step| NavEntry {
            id: step.number(),
            title: title(step),
            completed: step < current,
            active: step == current,
            enabled: can_jump(current, step),
        })
        .collect()
}

/// Progress bar fill, 0.25 on the first step and 1.0 on the last.
pub fn progress(current: Step) -> f32 {
    current.number() as f32 / Step::ALL.len() as f32
}
