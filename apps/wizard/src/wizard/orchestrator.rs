//! Wizard orchestration: step entry effects and gateway calls with local fallback.
//!
//! Flow per step:
//!   1. job description edits → debounced keyword extraction (no fallback)
//!   2. profile edits → nothing remote
//!   3. entry → match analysis, local simulation when the gateway is unavailable
//!   4. entry / template change / regenerate → CV generation, local simulation on failure
//!
//! The session lock is never held across a gateway call. Every request takes a sequence
//! number and its result is dropped if a newer request of the same kind was issued since.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::fallback::{simulate_match_analysis, simulate_resume_generation};
use crate::gateway::AnalysisGateway;
use crate::models::resume::{GeneratedResume, KeywordMatch, ResumeDraft};
use crate::templates::{CvInput, CvLayout, Template};
use crate::wizard::nav;
use crate::wizard::session::{RequestKind, SharedSession, WizardSession};
use crate::wizard::state::{StateError, Step, WizardState};
use crate::wizard::steps::{StepView, ANALYSIS_FALLBACK_WARNING, GENERATION_FALLBACK_WARNING};

pub const NO_RESUME_MESSAGE: &str = "No CV has been generated yet.";
pub const DOWNLOAD_UNAVAILABLE_MESSAGE: &str =
    "The CV could not be downloaded right now. Please try again later.";

#[derive(Debug, Clone, Copy)]
pub struct WizardTimings {
    pub extraction_debounce: Duration,
    pub fallback_delay: Duration,
}

impl From<&Config> for WizardTimings {
    fn from(config: &Config) -> Self {
        Self {
            extraction_debounce: config.extraction_debounce,
            fallback_delay: config.fallback_delay,
        }
    }
}

/// A PDF fetched from the gateway, ready to hand to the browser.
#[derive(Debug, Clone)]
pub struct CvDownload {
    pub filename: String,
    pub pdf: Bytes,
}

struct ExtractionJob {
    seq: u64,
    job_description: String,
}

struct AnalysisJob {
    seq: u64,
    job_description: String,
    skills: Vec<String>,
}

struct GenerationJob {
    seq: u64,
    draft: ResumeDraft,
    keyword_matches: Vec<KeywordMatch>,
    version: u32,
}

#[derive(Clone)]
pub struct Wizard {
    gateway: Arc<dyn AnalysisGateway>,
    timings: WizardTimings,
}

impl Wizard {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, timings: WizardTimings) -> Self {
        Self { gateway, timings }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Navigation
    // ────────────────────────────────────────────────────────────────────────

    /// "Continue": refused while the active view's gate is closed. No-op on the last step.
    pub async fn advance(&self, session: &SharedSession) -> Result<bool, AppError> {
        let mut s = session.lock().await;
        if s.step() == Step::Generation {
            return Ok(false);
        }
        let gate = s.gate();
        if !gate.can_continue {
            return Err(AppError::Validation(gate.hint()));
        }
        let moved = s.next();
        if moved {
            info!("Session {} advanced to step {}", s.id, s.step().number());
            self.enter_step(&mut s, session);
        }
        Ok(moved)
    }

    pub async fn retreat(&self, session: &SharedSession) -> bool {
        let mut s = session.lock().await;
        let moved = s.previous();
        if moved {
            info!("Session {} went back to step {}", s.id, s.step().number());
            self.enter_step(&mut s, session);
        }
        moved
    }

    /// Sidebar jump. Only completed steps are reachable; the current step is a no-op.
    pub async fn jump(&self, session: &SharedSession, n: u8) -> Result<bool, AppError> {
        let target = Step::from_number(n)
            .ok_or_else(|| AppError::Validation(format!("Step must be between 1 and 4, got {n}")))?;

        let mut s = session.lock().await;
        if target == s.step() {
            return Ok(false);
        }
        if !nav::can_jump(s.step(), target) {
            return Err(AppError::Conflict(format!(
                "Step {n} ({}) has not been reached yet",
                nav::title(target)
            )));
        }
        let moved = s.jump(n);
        if moved {
            info!("Session {} jumped to step {n}", s.id);
            self.enter_step(&mut s, session);
        }
        Ok(moved)
    }

    /// Runs the side effect of the step that was just entered.
    fn enter_step(&self, s: &mut WizardSession, session: &SharedSession) {
        match s.step() {
            Step::JobDescription => self.schedule_extraction(s, session),
            Step::Profile => {}
            Step::Analysis => {
                if let Some(job) = begin_analysis(s) {
                    self.spawn_analysis(session.clone(), job);
                }
            }
            Step::Generation => {
                if s.state.needs_generation() {
                    if let Some(job) = begin_generation(s) {
                        self.spawn_generation(session.clone(), job);
                    }
                }
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Step 1: job description + debounced keyword extraction
    // ────────────────────────────────────────────────────────────────────────

    pub async fn edit_job_description(
        &self,
        session: &SharedSession,
        text: String,
    ) -> Result<(), AppError> {
        let mut s = session.lock().await;
        require_step(&s, Step::JobDescription)?;
        s.state.set_job_description(text);
        self.schedule_extraction(&mut s, session);
        Ok(())
    }

    fn schedule_extraction(&self, s: &mut WizardSession, session: &SharedSession) {
        let wizard = self.clone();
        let session = session.clone();
        s.extraction_timer
            .schedule(self.timings.extraction_debounce, async move {
                wizard.run_extraction(&session).await;
            });
    }

    /// Extracts keywords for the current job description. Fired by the debounce timer.
    pub async fn run_extraction(&self, session: &SharedSession) {
        let job = {
            let mut s = session.lock().await;
            begin_extraction(&mut s)
        };
        let Some(job) = job else {
            return;
        };

        let result = self.gateway.extract_keywords(&job.job_description).await;

        let mut s = session.lock().await;
        if !s.requests.is_latest(RequestKind::Extraction, job.seq) {
            debug!("Discarding stale keyword extraction #{}", job.seq);
            return;
        }
        if let StepView::JobDescription(view) = &mut s.view {
            view.extracting = false;
            match result {
                Some(extraction) => {
                    info!("Extracted {} keywords", extraction.keywords.len());
                    view.extraction = Some(extraction);
                }
                // No local fallback for extraction: no keywords is a valid outcome.
                None => debug!("Keyword extraction unavailable"),
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Step 2: profile edits
    // ────────────────────────────────────────────────────────────────────────

    /// Applies an edit to the personal/experience/education/skills data.
    pub async fn edit_profile<T>(
        &self,
        session: &SharedSession,
        edit: impl FnOnce(&mut WizardState) -> Result<T, StateError>,
    ) -> Result<T, AppError> {
        let mut s = session.lock().await;
        require_step(&s, Step::Profile)?;
        Ok(edit(&mut s.state)?)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Step 3: match analysis
    // ────────────────────────────────────────────────────────────────────────

    fn spawn_analysis(&self, session: SharedSession, job: AnalysisJob) {
        let wizard = self.clone();
        tokio::spawn(async move {
            wizard.finish_analysis(&session, job).await;
        });
    }

    async fn finish_analysis(&self, session: &SharedSession, job: AnalysisJob) {
        let (analysis, warning) = match self
            .gateway
            .analyze_match(&job.job_description, &job.skills)
            .await
        {
            Some(analysis) => (analysis, None),
            None => {
                warn!("Match analysis unavailable, falling back to local analysis");
                let analysis = simulate_match_analysis(
                    &job.job_description,
                    &job.skills,
                    self.timings.fallback_delay,
                )
                .await;
                (analysis, Some(ANALYSIS_FALLBACK_WARNING.to_string()))
            }
        };

        let mut s = session.lock().await;
        if !s.requests.is_latest(RequestKind::Analysis, job.seq) {
            debug!("Discarding stale match analysis #{}", job.seq);
            return;
        }
        info!(
            "Match analysis applied: score={} matches={}",
            analysis.match_score,
            analysis.matches.len()
        );
        s.state.keyword_matches = analysis.matches;
        if let StepView::Analysis(view) = &mut s.view {
            view.analyzing = false;
            view.match_score = analysis.match_score;
            view.suggestions = analysis.suggestions;
            view.warning = warning;
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Step 4: generation, template selection, download
    // ────────────────────────────────────────────────────────────────────────

    fn spawn_generation(&self, session: SharedSession, job: GenerationJob) {
        let wizard = self.clone();
        tokio::spawn(async move {
            wizard.finish_generation(&session, job).await;
        });
    }

    async fn finish_generation(&self, session: &SharedSession, job: GenerationJob) {
        let (resume, warning) = match self.gateway.generate_cv(&job.draft).await {
            Some(cv) => (
                GeneratedResume::from_gateway(cv, &job.draft.skills, job.draft.template, job.version),
                None,
            ),
            None => {
                warn!("CV generation unavailable, falling back to local generation");
                let resume = simulate_resume_generation(
                    &job.draft,
                    &job.keyword_matches,
                    job.version,
                    self.timings.fallback_delay,
                )
                .await;
                (resume, Some(GENERATION_FALLBACK_WARNING.to_string()))
            }
        };

        let mut s = session.lock().await;
        if !s.requests.is_latest(RequestKind::Generation, job.seq) {
            debug!("Discarding stale CV generation #{}", job.seq);
            return;
        }
        info!(
            "CV {} generated (version {}, {:?})",
            resume.resume_id, resume.version, resume.source
        );
        s.state.generated_resume = Some(resume);
        if let StepView::Generation(view) = &mut s.view {
            view.generating = false;
            view.warning = warning;
        }
    }

    /// Switches template. A different template bumps the version and regenerates.
    pub async fn change_template(
        &self,
        session: &SharedSession,
        template: Template,
    ) -> Result<bool, AppError> {
        let mut s = session.lock().await;
        require_step(&s, Step::Generation)?;
        if !s.state.select_template(template) {
            return Ok(false);
        }
        if let Some(job) = begin_generation(&mut s) {
            self.spawn_generation(session.clone(), job);
        }
        Ok(true)
    }

    /// Bumps the version and regenerates. Returns the new version.
    pub async fn regenerate(&self, session: &SharedSession) -> Result<u32, AppError> {
        let mut s = session.lock().await;
        require_step(&s, Step::Generation)?;
        let version = s.state.bump_resume_version();
        if let Some(job) = begin_generation(&mut s) {
            self.spawn_generation(session.clone(), job);
        }
        Ok(version)
    }

    /// Fetches the PDF for the generated résumé. There is no local fallback.
    pub async fn download(&self, session: &SharedSession) -> Result<CvDownload, AppError> {
        let (resume_id, name) = {
            let mut s = session.lock().await;
            require_step(&s, Step::Generation)?;
            let resume_id = s
                .state
                .generated_resume
                .as_ref()
                .map(|r| r.resume_id.clone())
                .ok_or_else(|| AppError::Validation(NO_RESUME_MESSAGE.to_string()))?;
            if let StepView::Generation(view) = &mut s.view {
                view.downloading = true;
            }
            (resume_id, s.state.personal_info.name.clone())
        };

        let pdf = self.gateway.download_cv(&resume_id).await;

        let mut s = session.lock().await;
        if let StepView::Generation(view) = &mut s.view {
            view.downloading = false;
        }
        match pdf {
            Some(pdf) => Ok(CvDownload {
                filename: download_filename(&name, Utc::now()),
                pdf,
            }),
            None => Err(AppError::ServiceUnavailable(
                DOWNLOAD_UNAVAILABLE_MESSAGE.to_string(),
            )),
        }
    }

    /// Renders the selected template from the session's current data.
    pub async fn preview(&self, session: &SharedSession) -> CvLayout {
        let s = session.lock().await;
        let state = &s.state;
        state.template().render(&CvInput {
            personal_info: &state.personal_info,
            experience: state.experience(),
            education: state.education(),
            skills: state.resolved_skills(),
            keyword_matches: &state.keyword_matches,
        })
    }

    /// Stops any pending timer of a session that is being discarded.
    pub async fn discard(&self, session: &SharedSession) {
        session.lock().await.extraction_timer.cancel();
    }
}

fn require_step(s: &WizardSession, step: Step) -> Result<(), AppError> {
    if s.step() == step {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "This action is only available on step {} ({})",
            step.number(),
            nav::title(step)
        )))
    }
}

/// Below the length threshold the previous keywords are cleared and nothing is sent.
fn begin_extraction(s: &mut WizardSession) -> Option<ExtractionJob> {
    if !matches!(s.view, StepView::JobDescription(_)) {
        return None;
    }
    let long_enough = s.gate().can_continue;
    let seq = s.requests.issue(RequestKind::Extraction);
    let job_description = s.state.job_description.clone();
    let StepView::JobDescription(view) = &mut s.view else {
        return None;
    };
    if !long_enough {
        view.extracting = false;
        view.extraction = None;
        return None;
    }
    view.extracting = true;
    Some(ExtractionJob {
        seq,
        job_description,
    })
}

/// Nothing to analyze without a job description and at least one skill.
fn begin_analysis(s: &mut WizardSession) -> Option<AnalysisJob> {
    let runnable = !s.state.job_description.is_empty() && !s.state.skills().is_empty();
    let job_description = s.state.job_description.clone();
    let skills = s.state.skills().to_vec();
    let StepView::Analysis(view) = &mut s.view else {
        return None;
    };
    if !runnable {
        view.analyzing = false;
        return None;
    }
    view.analyzing = true;
    view.warning = None;
    let seq = s.requests.issue(RequestKind::Analysis);
    Some(AnalysisJob {
        seq,
        job_description,
        skills,
    })
}

fn begin_generation(s: &mut WizardSession) -> Option<GenerationJob> {
    let StepView::Generation(view) = &mut s.view else {
        return None;
    };
    view.generating = true;
    view.warning = None;
    let seq = s.requests.issue(RequestKind::Generation);
    Some(GenerationJob {
        seq,
        draft: build_draft(&s.state),
        keyword_matches: s.state.keyword_matches.clone(),
        version: s.state.resume_version(),
    })
}

fn build_draft(state: &WizardState) -> ResumeDraft {
    ResumeDraft {
        personal_info: state.personal_info.clone(),
        experience: state.experience().to_vec(),
        education: state.education().to_vec(),
        skills: state.skills().to_vec(),
        job_description: state.job_description.clone(),
        template: state.template(),
    }
}

/// `CV-<name>-<unix millis>.pdf`, keeping the name header-safe.
fn download_filename(name: &str, now: DateTime<Utc>) -> String {
    let mut slug = String::new();
    for word in name.split_whitespace() {
        let clean: String = word.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if clean.is_empty() {
            continue;
        }
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&clean);
    }
    if slug.is_empty() {
        slug.push_str("resume");
    }
    format!("CV-{slug}-{}.pdf", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use tokio::sync::Mutex;

    use super::*;
    use crate::gateway::fake::FakeGateway;
    use crate::models::analysis::{KeywordExtraction, MatchAnalysis};
    use crate::models::resume::{Education, Experience, GeneratedCv, GenerationSource, PersonalInfo};

    const JD: &str = "Frontend developer wanted: React, CSS and TypeScript experience required for our web team.";

    fn timings() -> WizardTimings {
        WizardTimings {
            extraction_debounce: Duration::from_secs(1),
            fallback_delay: Duration::from_secs(2),
        }
    }

    fn wizard(gateway: FakeGateway) -> (Wizard, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        (Wizard::new(gateway.clone(), timings()), gateway)
    }

    fn new_session() -> SharedSession {
        Arc::new(Mutex::new(WizardSession::new()))
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn fill_profile(wizard: &Wizard, session: &SharedSession, skills: &[&str]) {
        let skills: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
        wizard
            .edit_profile(session, move |state| {
                state.set_personal_info(PersonalInfo {
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    ..Default::default()
                });
                state.update_experience(
                    0,
                    Experience {
                        company: "Acme".to_string(),
                        position: "Engineer".to_string(),
                        ..Default::default()
                    },
                )?;
                state.update_education(
                    0,
                    Education {
                        institution: "MIT".to_string(),
                        ..Default::default()
                    },
                )?;
                for skill in &skills {
                    state.add_skill(skill);
                }
                Ok(())
            })
            .await
            .unwrap();
    }

    /// Walks a fresh session to step 3 with the given skills.
    async fn session_at_analysis(wizard: &Wizard, skills: &[&str]) -> SharedSession {
        let session = new_session();
        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        assert!(wizard.advance(&session).await.unwrap());
        fill_profile(wizard, &session, skills).await;
        assert!(wizard.advance(&session).await.unwrap());
        session
    }

    // ── navigation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_advance_refused_with_short_job_description() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = new_session();
        wizard
            .edit_job_description(&session, "too short".to_string())
            .await
            .unwrap();

        let result = wizard.advance(&session).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(session.lock().await.step(), Step::JobDescription);
    }

    #[tokio::test]
    async fn test_advance_refused_with_incomplete_profile() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = new_session();
        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        wizard.advance(&session).await.unwrap();

        let result = wizard.advance(&session).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("skill")));
    }

    #[tokio::test]
    async fn test_jump_only_to_completed_steps() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = new_session();
        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        wizard.advance(&session).await.unwrap();

        assert!(matches!(wizard.jump(&session, 3).await, Err(AppError::Conflict(_))));
        assert!(matches!(wizard.jump(&session, 9).await, Err(AppError::Validation(_))));
        assert!(!wizard.jump(&session, 2).await.unwrap());
        assert!(wizard.jump(&session, 1).await.unwrap());
        assert_eq!(session.lock().await.step(), Step::JobDescription);
    }

    #[tokio::test]
    async fn test_advance_on_last_step_is_noop() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = new_session();
        session.lock().await.jump(4);
        assert!(!wizard.advance(&session).await.unwrap());
        assert_eq!(session.lock().await.step(), Step::Generation);
    }

    #[tokio::test]
    async fn test_edits_on_wrong_step_conflict() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = new_session();

        let profile = wizard
            .edit_profile(&session, |state| Ok(state.add_skill("Rust")))
            .await;
        assert!(matches!(profile, Err(AppError::Conflict(_))));
        assert!(matches!(
            wizard.change_template(&session, Template::Modern).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(wizard.regenerate(&session).await, Err(AppError::Conflict(_))));

        session.lock().await.jump(2);
        assert!(matches!(
            wizard.edit_job_description(&session, JD.to_string()).await,
            Err(AppError::Conflict(_))
        ));
    }

    // ── step 1 ──────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_trigger_single_extraction() {
        let (wizard, gateway) = wizard(FakeGateway {
            extraction: Some(KeywordExtraction {
                keywords: vec!["react".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        });
        let session = new_session();

        let mut text = JD.to_string();
        for _ in 0..4 {
            text.push('!');
            wizard.edit_job_description(&session, text.clone()).await.unwrap();
            settle(Duration::from_millis(300)).await;
        }
        // last edit at t=900ms, now t=1200ms
        settle(Duration::from_millis(699)).await;
        assert_eq!(gateway.extract_count(), 0);

        settle(Duration::from_millis(2)).await;
        assert_eq!(gateway.extract_count(), 1);
        assert_eq!(gateway.extract_calls.lock().unwrap()[0], text);

        let s = session.lock().await;
        let StepView::JobDescription(view) = &s.view else {
            panic!("expected job description view");
        };
        assert!(!view.extracting);
        assert_eq!(view.extraction.as_ref().unwrap().keywords, vec!["react"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_description_clears_keywords_without_call() {
        let (wizard, gateway) = wizard(FakeGateway {
            extraction: Some(KeywordExtraction::default()),
            ..Default::default()
        });
        let session = new_session();

        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        settle(Duration::from_millis(1100)).await;
        assert_eq!(gateway.extract_count(), 1);

        wizard.edit_job_description(&session, "short".to_string()).await.unwrap();
        settle(Duration::from_millis(1100)).await;
        assert_eq!(gateway.extract_count(), 1);

        let s = session.lock().await;
        assert_eq!(
            s.view,
            StepView::JobDescription(Default::default()),
            "keywords cleared once the description is too short"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_extraction_is_discarded() {
        let (wizard, gateway) = wizard(
            FakeGateway {
                extraction: Some(KeywordExtraction {
                    keywords: vec!["css".to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            }
            .with_latencies([Duration::from_secs(10)]),
        );
        let session = new_session();

        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        settle(Duration::from_millis(1500)).await;
        // first request in flight for 10s; the edit below must not cancel it
        wizard.edit_job_description(&session, "short".to_string()).await.unwrap();
        settle(Duration::from_secs(15)).await;

        assert_eq!(gateway.extract_count(), 1);
        let s = session.lock().await;
        let StepView::JobDescription(view) = &s.view else {
            panic!("expected job description view");
        };
        assert!(view.extraction.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_step_one_cancels_pending_timer() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = new_session();
        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        wizard.advance(&session).await.unwrap();
        settle(Duration::from_secs(2)).await;
        assert_eq!(gateway.extract_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_to_step_one_extracts_again() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = new_session();
        wizard.edit_job_description(&session, JD.to_string()).await.unwrap();
        wizard.advance(&session).await.unwrap();
        wizard.retreat(&session).await;
        settle(Duration::from_millis(1100)).await;
        assert_eq!(gateway.extract_count(), 1);
        assert_eq!(session.lock().await.state.job_description, JD);
    }

    // ── step 3 ──────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_analysis_falls_back_to_simulation() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = session_at_analysis(&wizard, &["React", "Python"]).await;

        {
            let s = session.lock().await;
            let StepView::Analysis(view) = &s.view else {
                panic!("expected analysis view");
            };
            assert!(view.analyzing);
            assert!(!s.gate().can_continue);
        }

        settle(Duration::from_millis(2500)).await;
        assert_eq!(gateway.analyze_count(), 1);

        let s = session.lock().await;
        let StepView::Analysis(view) = &s.view else {
            panic!("expected analysis view");
        };
        assert!(!view.analyzing);
        assert_eq!(view.warning.as_deref(), Some(ANALYSIS_FALLBACK_WARNING));
        assert_eq!(s.state.keyword_matches[0], KeywordMatch::matched("React", true));
        assert_eq!(s.state.keyword_matches[1], KeywordMatch::matched("Python", false));
        assert!(s.state.keyword_matches.iter().any(|m| m.skill == "css" && m.is_suggestion()));
        assert!(s.gate().can_continue);
    }

    #[tokio::test]
    async fn test_analysis_uses_gateway_result() {
        let (wizard, gateway) = wizard(FakeGateway {
            analysis: Some(MatchAnalysis {
                matches: vec![KeywordMatch::matched("Rust", true)],
                match_score: 91,
                suggestions: vec!["Go".to_string()],
            }),
            ..Default::default()
        });
        let session = session_at_analysis(&wizard, &["Rust"]).await;
        settle(Duration::from_millis(10)).await;

        let s = session.lock().await;
        let StepView::Analysis(view) = &s.view else {
            panic!("expected analysis view");
        };
        assert_eq!(view.match_score, 91);
        assert!(view.warning.is_none());
        assert_eq!(s.state.keyword_matches, vec![KeywordMatch::matched("Rust", true)]);
        assert_eq!(gateway.analyze_calls.lock().unwrap()[0].1, vec!["Rust"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_analysis_is_discarded() {
        let (wizard, gateway) =
            wizard(FakeGateway::unavailable().with_latencies([Duration::from_secs(5)]));
        let session = session_at_analysis(&wizard, &["React"]).await;

        // Back to step 2 while the first analysis is still in flight; change skills.
        wizard.retreat(&session).await;
        wizard
            .edit_profile(&session, |state| {
                state.remove_skill("React");
                Ok(state.add_skill("Python"))
            })
            .await
            .unwrap();
        wizard.advance(&session).await.unwrap();

        settle(Duration::from_secs(10)).await;
        assert_eq!(gateway.analyze_count(), 2);

        let s = session.lock().await;
        assert_eq!(s.state.keyword_matches[0].skill, "Python");
        assert!(!s.state.keyword_matches.iter().any(|m| m.skill == "React"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_result_applied_after_navigating_away() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = session_at_analysis(&wizard, &["React"]).await;
        wizard.retreat(&session).await;
        settle(Duration::from_secs(3)).await;

        let s = session.lock().await;
        assert_eq!(s.view, StepView::Profile);
        assert_eq!(s.state.keyword_matches[0], KeywordMatch::matched("React", true));
    }

    #[tokio::test]
    async fn test_analysis_skipped_without_skills() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = new_session();
        {
            let mut s = session.lock().await;
            s.state.set_job_description(JD);
            s.jump(3);
            wizard.enter_step(&mut s, &session);
        }
        settle(Duration::from_millis(10)).await;

        assert_eq!(gateway.analyze_count(), 0);
        let s = session.lock().await;
        assert_eq!(s.view, StepView::Analysis(Default::default()));
    }

    // ── step 4 ──────────────────────────────────────────────────────────────

    async fn session_at_generation(wizard: &Wizard, skills: &[&str]) -> SharedSession {
        let session = session_at_analysis(wizard, skills).await;
        settle(Duration::from_millis(2500)).await;
        assert!(wizard.advance(&session).await.unwrap());
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_falls_back_to_simulation() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["Python", "React"]).await;
        settle(Duration::from_millis(2500)).await;

        assert_eq!(gateway.generate_count(), 1);
        let s = session.lock().await;
        let resume = s.state.generated_resume.as_ref().unwrap();
        assert_eq!(resume.source, GenerationSource::LocalSimulation);
        // matched first, then the rest in input order
        assert_eq!(resume.skills, vec!["React", "Python"]);
        assert!(resume.suggested_skills.contains(&"css".to_string()));
        assert_eq!(resume.version, 1);
        let StepView::Generation(view) = &s.view else {
            panic!("expected generation view");
        };
        assert!(!view.generating);
        assert_eq!(view.warning.as_deref(), Some(GENERATION_FALLBACK_WARNING));

        let sent = &gateway.generate_calls.lock().unwrap()[0];
        assert_eq!(sent.job_description, JD);
        assert_eq!(sent.template, Template::Minimal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_template_change_regenerates_with_new_version() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["React"]).await;
        settle(Duration::from_millis(2500)).await;

        assert!(!wizard.change_template(&session, Template::Minimal).await.unwrap());
        assert!(wizard.change_template(&session, Template::Modern).await.unwrap());
        settle(Duration::from_millis(2500)).await;

        assert_eq!(gateway.generate_count(), 2);
        let s = session.lock().await;
        assert_eq!(s.state.resume_version(), 2);
        let resume = s.state.generated_resume.as_ref().unwrap();
        assert_eq!(resume.template, Template::Modern);
        assert_eq!(resume.version, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_discarded() {
        let (wizard, _) = wizard(FakeGateway::unavailable().with_latencies([
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_secs(5),
        ]));
        let session = session_at_generation(&wizard, &["React"]).await;
        settle(Duration::from_millis(2500)).await;

        // the Modern request outlives the Creative one
        wizard.change_template(&session, Template::Modern).await.unwrap();
        wizard.change_template(&session, Template::Creative).await.unwrap();
        settle(Duration::from_secs(10)).await;

        let s = session.lock().await;
        let resume = s.state.generated_resume.as_ref().unwrap();
        assert_eq!(resume.template, Template::Creative);
        assert_eq!(resume.version, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentering_final_step_keeps_current_resume() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["React"]).await;
        settle(Duration::from_millis(2500)).await;
        let first_id = session
            .lock()
            .await
            .state
            .generated_resume
            .as_ref()
            .unwrap()
            .resume_id
            .clone();

        wizard.retreat(&session).await;
        settle(Duration::from_millis(2500)).await;
        wizard.advance(&session).await.unwrap();
        settle(Duration::from_millis(2500)).await;

        assert_eq!(gateway.generate_count(), 1);
        let s = session.lock().await;
        assert_eq!(s.state.generated_resume.as_ref().unwrap().resume_id, first_id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_bumps_version() {
        let (wizard, gateway) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["React"]).await;
        settle(Duration::from_millis(2500)).await;

        assert_eq!(wizard.regenerate(&session).await.unwrap(), 2);
        {
            let s = session.lock().await;
            let StepView::Generation(view) = &s.view else {
                panic!("expected generation view");
            };
            assert!(view.generating);
        }
        settle(Duration::from_millis(2500)).await;
        assert_eq!(gateway.generate_count(), 2);
        assert_eq!(
            session.lock().await.state.generated_resume.as_ref().unwrap().version,
            2
        );
    }

    #[tokio::test]
    async fn test_gateway_generation_and_download() {
        let (wizard, gateway) = wizard(FakeGateway {
            analysis: Some(MatchAnalysis::default()),
            generated: Some(GeneratedCv {
                resume_id: "cv-42".to_string(),
                resume_content: "content".to_string(),
                optimized_sections: None,
            }),
            pdf: Some(Bytes::from_static(b"%PDF")),
            ..Default::default()
        });
        let session = session_at_analysis(&wizard, &["Rust"]).await;
        settle(Duration::from_millis(10)).await;
        wizard.advance(&session).await.unwrap();
        settle(Duration::from_millis(10)).await;

        {
            let s = session.lock().await;
            let resume = s.state.generated_resume.as_ref().unwrap();
            assert_eq!(resume.resume_id, "cv-42");
            assert_eq!(resume.source, GenerationSource::Gateway);
        }

        let download = wizard.download(&session).await.unwrap();
        assert_eq!(download.pdf.as_ref(), b"%PDF");
        assert!(download.filename.starts_with("CV-Ada-Lovelace-"));
        assert_eq!(gateway.download_calls.lock().unwrap()[0], "cv-42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_without_gateway_is_unavailable() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["React"]).await;

        // nothing generated yet
        assert!(matches!(
            wizard.download(&session).await,
            Err(AppError::Validation(msg)) if msg == NO_RESUME_MESSAGE
        ));

        settle(Duration::from_millis(2500)).await;
        assert!(matches!(
            wizard.download(&session).await,
            Err(AppError::ServiceUnavailable(_))
        ));
        let s = session.lock().await;
        let StepView::Generation(view) = &s.view else {
            panic!("expected generation view");
        };
        assert!(!view.downloading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_uses_resolved_skills_and_template() {
        let (wizard, _) = wizard(FakeGateway::unavailable());
        let session = session_at_generation(&wizard, &["Python", "React"]).await;
        settle(Duration::from_millis(2500)).await;
        wizard.change_template(&session, Template::Modern).await.unwrap();
        settle(Duration::from_millis(2500)).await;

        let layout = wizard.preview(&session).await;
        assert_eq!(layout.template, Template::Modern);
        assert_eq!(layout.header.initials.as_deref(), Some("AL"));
        let skills = &layout.sidebar[1].items;
        assert_eq!(skills.len(), 2);
        assert_eq!(
            skills[0],
            crate::templates::Item::Skill {
                name: "React".to_string(),
                highlighted: true
            }
        );
    }

    #[test]
    fn test_download_filename_is_header_safe() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            download_filename("José O'Neil", now),
            "CV-Jos-ONeil-1700000000000.pdf"
        );
        assert_eq!(download_filename("  ", now), "CV-resume-1700000000000.pdf");
    }
}
