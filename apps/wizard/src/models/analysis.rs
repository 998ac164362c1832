use serde::{Deserialize, Deserializer, Serialize};

use crate::models::resume::KeywordMatch;

/// Response body of `POST /keywords/extract`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordExtraction {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// Response body of `POST /keywords/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    #[serde(default)]
    pub matches: Vec<KeywordMatch>,
    /// 0 – 100
    #[serde(deserialize_with = "deserialize_score")]
    pub match_score: u32,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// The gateway may report fractional scores; the wizard displays whole percentages.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, 100.0) as u32)
}

#[derive(Debug, Serialize)]
pub struct ExtractKeywordsRequest<'a> {
    pub job_description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeMatchRequest<'a> {
    pub job_description: &'a str,
    pub skills: &'a [String],
}
