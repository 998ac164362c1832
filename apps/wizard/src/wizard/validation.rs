//! Step gates: when may the user leave a step. Checked before the controller is asked to advance.

use serde::Serialize;

use crate::wizard::state::WizardState;

/// Minimum job description length (characters, after trimming).
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub can_continue: bool,
    /// What is still missing, for the hint under the disabled button.
    pub missing: Vec<&'static str>,
}

impl GateStatus {
    pub fn open() -> Self {
        Self {
            can_continue: true,
            missing: vec![],
        }
    }

    fn from_missing(missing: Vec<&'static str>) -> Self {
        Self {
            can_continue: missing.is_empty(),
            missing,
        }
    }

    pub fn hint(&self) -> String {
        if self.can_continue {
            String::new()
        } else {
            format!("Before continuing, complete: {}", self.missing.join(", "))
        }
    }
}

pub fn job_description_gate(job_description: &str) -> GateStatus {
    if job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        GateStatus::from_missing(vec!["a job description of at least 50 characters"])
    } else {
        GateStatus::open()
    }
}

pub fn profile_gate(state: &WizardState) -> GateStatus {
    let mut missing = Vec::new();
    if state.personal_info.name.is_empty() {
        missing.push("name");
    }
    if state.personal_info.email.is_empty() {
        missing.push("email");
    }
    if state.experience().first().map_or(true, |e| e.company.is_empty()) {
        missing.push("company of your first experience");
    }
    if state.education().first().map_or(true, |e| e.institution.is_empty()) {
        missing.push("institution of your first education entry");
    }
    if state.skills().is_empty() {
        missing.push("at least one skill");
    }
    GateStatus::from_missing(missing)
}
