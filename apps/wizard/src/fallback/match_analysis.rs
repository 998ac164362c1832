use std::time::Duration;

use crate::models::analysis::MatchAnalysis;
use crate::models::resume::KeywordMatch;

/// Keywords the local analysis knows how to spot in a job description.
pub const KNOWN_KEYWORDS: &[&str] = &[
    "javascript",
    "react",
    "frontend",
    "web development",
    "html",
    "css",
    "responsive",
    "ui/ux",
    "typescript",
    "next.js",
    "tailwind",
];

/// Waits `delay`, then runs [`analyze_locally`].
pub async fn simulate_match_analysis(
    job_description: &str,
    skills: &[String],
    delay: Duration,
) -> MatchAnalysis {
    tokio::time::sleep(delay).await;
    analyze_locally(job_description, skills)
}

/// Substring-based match analysis over `KNOWN_KEYWORDS`.
///
/// Algorithm:
/// 1. found = known keywords contained in the lower-cased job description
/// 2. a skill matches when it contains, or is contained in, any found keyword
/// 3. score = round(100 × matched / max(|skills|, |found|))
/// 4. found keywords not contained in any skill are appended as suggestions
pub fn analyze_locally(job_description: &str, skills: &[String]) -> MatchAnalysis {
    let text = job_description.to_lowercase();
    let found: Vec<&str> = KNOWN_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| text.contains(keyword))
        .collect();

    let mut matches: Vec<KeywordMatch> = skills
        .iter()
        .map(|skill| {
            let skill_lower = skill.to_lowercase();
            let is_match = found
                .iter()
                .any(|keyword| skill_lower.contains(keyword) || keyword.contains(skill_lower.as_str()));
            KeywordMatch::matched(skill.clone(), is_match)
        })
        .collect();

    let matched = matches.iter().filter(|m| m.is_match).count();
    let denominator = skills.len().max(found.len());
    let match_score = if denominator == 0 {
        0
    } else {
        ((matched as f64 / denominator as f64) * 100.0).round() as u32
    };

    let suggestions: Vec<String> = found
        .iter()
        .filter(|keyword| {
            !skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(*keyword))
        })
        .map(|keyword| keyword.to_string())
        .collect();

    matches.extend(suggestions.iter().map(KeywordMatch::suggestion));

    MatchAnalysis {
        matches,
        match_score,
        suggestions,
    }
}
