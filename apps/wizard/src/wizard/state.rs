//! Wizard Controller: the cross-step form state and the linear step machine.
//!
//! Transitions never skip validation on their own behalf: gates are checked by the
//! step views before `go_to_next_step` is called. The controller only guarantees the
//! step index stays in 1..=4.

use serde::Serialize;
use thiserror::Error;

use crate::models::resume::{Education, Experience, GeneratedResume, KeywordMatch, PersonalInfo};
use crate::templates::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    JobDescription = 1,
    Profile = 2,
    Analysis = 3,
    Generation = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::JobDescription,
        Step::Profile,
        Step::Analysis,
        Step::Generation,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        match n {
            1 => Some(Step::JobDescription),
            2 => Some(Step::Profile),
            3 => Some(Step::Analysis),
            4 => Some(Step::Generation),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Experience entry {0} does not exist")]
    ExperienceOutOfRange(usize),

    #[error("Education entry {0} does not exist")]
    EducationOutOfRange(usize),
}

/// All data collected by one wizard session. Lives only as long as the session.
#[derive(Debug, Clone, Serialize)]
pub struct WizardState {
    current_step: Step,
    pub job_description: String,
    pub personal_info: PersonalInfo,
    experience: Vec<Experience>,
    education: Vec<Education>,
    skills: Vec<String>,
    pub keyword_matches: Vec<KeywordMatch>,
    pub generated_resume: Option<GeneratedResume>,
    template: Template,
    resume_version: u32,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current_step: Step::JobDescription,
            job_description: String::new(),
            personal_info: PersonalInfo::default(),
            experience: vec![Experience::default()],
            education: vec![Education::default()],
            skills: vec![],
            keyword_matches: vec![],
            generated_resume: None,
            template: Template::default(),
            resume_version: 1,
        }
    }
}

impl WizardState {
    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn experience(&self) -> &[Experience] {
        &self.experience
    }

    pub fn education(&self) -> &[Education] {
        &self.education
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn resume_version(&self) -> u32 {
        self.resume_version
    }

    // ── step transitions ────────────────────────────────────────────────────

    /// Moves one step forward. Returns `false` (and changes nothing) on the last step.
    pub fn go_to_next_step(&mut self) -> bool {
        self.move_to(self.current_step.next())
    }

    /// Moves one step back. Returns `false` (and changes nothing) on the first step.
    pub fn go_to_previous_step(&mut self) -> bool {
        self.move_to(self.current_step.previous())
    }

    /// Jumps to step `n` when it is in 1..=4. Performs no completion check.
    /// Returns whether the current step changed.
    pub fn go_to_step(&mut self, n: u8) -> bool {
        self.move_to(Step::from_number(n))
    }

    fn move_to(&mut self, target: Option<Step>) -> bool {
        match target {
            Some(step) if step != self.current_step => {
                self.current_step = step;
                true
            }
            _ => false,
        }
    }

    // ── step 1 ──────────────────────────────────────────────────────────────

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    // ── step 2 ──────────────────────────────────────────────────────────────

    pub fn set_personal_info(&mut self, info: PersonalInfo) {
        self.personal_info = info;
    }

    /// Appends a blank experience entry and returns its index.
    pub fn add_experience(&mut self) -> usize {
        self.experience.push(Experience::default());
        self.experience.len() - 1
    }

    pub fn update_experience(&mut self, index: usize, entry: Experience) -> Result<(), StateError> {
        let slot = self
            .experience
            .get_mut(index)
            .ok_or(StateError::ExperienceOutOfRange(index))?;
        *slot = entry;
        Ok(())
    }

    /// Removes an entry unless it is the only one left. Returns whether it was removed.
    pub fn remove_experience(&mut self, index: usize) -> Result<bool, StateError> {
        if index >= self.experience.len() {
            return Err(StateError::ExperienceOutOfRange(index));
        }
        if self.experience.len() == 1 {
            return Ok(false);
        }
        self.experience.remove(index);
        Ok(true)
    }

    pub fn add_education(&mut self) -> usize {
        self.education.push(Education::default());
        self.education.len() - 1
    }

    pub fn update_education(&mut self, index: usize, entry: Education) -> Result<(), StateError> {
        let slot = self
            .education
            .get_mut(index)
            .ok_or(StateError::EducationOutOfRange(index))?;
        *slot = entry;
        Ok(())
    }

    pub fn remove_education(&mut self, index: usize) -> Result<bool, StateError> {
        if index >= self.education.len() {
            return Err(StateError::EducationOutOfRange(index));
        }
        if self.education.len() == 1 {
            return Ok(false);
        }
        self.education.remove(index);
        Ok(true)
    }

    /// Adds a trimmed skill. Empty and duplicate skills are ignored.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != skill);
        self.skills.len() != before
    }

    // ── step 4 ──────────────────────────────────────────────────────────────

    /// Selects a template. A different template bumps the résumé version.
    pub fn select_template(&mut self, template: Template) -> bool {
        if template == self.template {
            return false;
        }
        self.template = template;
        self.resume_version += 1;
        true
    }

    pub fn bump_resume_version(&mut self) -> u32 {
        self.resume_version += 1;
        self.resume_version
    }

    /// True when the final step has nothing generated for the current version yet.
    pub fn needs_generation(&self) -> bool {
        self.generated_resume
            .as_ref()
            .map_or(true, |resume| resume.version != self.resume_version)
    }

    /// Skills to show on the CV: the generated résumé's resolved list, else the user's own.
    pub fn resolved_skills(&self) -> &[String] {
        self.generated_resume
            .as_ref()
            .map_or(&self.skills, |resume| &resume.skills)
    }
}
