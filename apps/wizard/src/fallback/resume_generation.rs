use std::time::Duration;

use uuid::Uuid;

use crate::models::resume::{GeneratedResume, GenerationSource, KeywordMatch, ResumeDraft};

/// Waits `delay`, then runs [`resolve_resume`].
pub async fn simulate_resume_generation(
    draft: &ResumeDraft,
    keyword_matches: &[KeywordMatch],
    version: u32,
    delay: Duration,
) -> GeneratedResume {
    tokio::time::sleep(delay).await;
    resolve_resume(draft, keyword_matches, version)
}

/// Orders skills matched-first, then the user's remaining skills, without duplicates.
/// Suggestions are carried separately and never merged into the skill list.
pub fn resolve_resume(
    draft: &ResumeDraft,
    keyword_matches: &[KeywordMatch],
    version: u32,
) -> GeneratedResume {
    let matched: Vec<String> = keyword_matches
        .iter()
        .filter(|m| m.is_match)
        .map(|m| m.skill.clone())
        .collect();
    let suggested_skills: Vec<String> = keyword_matches
        .iter()
        .filter(|m| m.is_suggestion())
        .map(|m| m.skill.clone())
        .collect();

    let mut skills = matched.clone();
    skills.extend(
        draft
            .skills
            .iter()
            .filter(|skill| !matched.contains(skill))
            .cloned(),
    );

    GeneratedResume {
        resume_id: format!("resume-{}", Uuid::new_v4()),
        skills,
        suggested_skills,
        template: draft.template,
        version,
        content: None,
        source: GenerationSource::LocalSimulation,
    }
}
