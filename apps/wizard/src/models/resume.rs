use serde::{Deserialize, Serialize};

use crate::templates::Template;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
}

/// One job on the CV. Dates are ISO-8601 strings as produced by the date pickers;
/// an empty `end_date` means the position is current.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub graduation_date: String,
}

/// A skill or job keyword paired with whether the job description asks for it.
/// `is_suggestion` marks job keywords missing from the user's own skill list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatch {
    pub skill: String,
    pub is_match: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suggestion: Option<bool>,
}

impl KeywordMatch {
    pub fn matched(skill: impl Into<String>, is_match: bool) -> Self {
        Self {
            skill: skill.into(),
            is_match,
            is_suggestion: None,
        }
    }

    pub fn suggestion(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            is_match: false,
            is_suggestion: Some(true),
        }
    }

    pub fn is_suggestion(&self) -> bool {
        self.is_suggestion.unwrap_or(false)
    }
}

/// Request body for `POST /cv-generator/generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDraft {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub job_description: String,
    pub template: Template,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedSections {
    #[serde(default)]
    pub experience: Option<Vec<Experience>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// Response body of `POST /cv-generator/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCv {
    pub resume_id: String,
    #[serde(default)]
    pub resume_content: String,
    #[serde(default)]
    pub optimized_sections: Option<OptimizedSections>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Gateway,
    LocalSimulation,
}

/// The résumé produced on the final step, either by the gateway or the local simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedResume {
    pub resume_id: String,
    /// Resolved skill list shown on the CV.
    pub skills: Vec<String>,
    pub suggested_skills: Vec<String>,
    pub template: Template,
    /// `resume_version` this résumé was generated for.
    pub version: u32,
    pub content: Option<String>,
    pub source: GenerationSource,
}

impl GeneratedResume {
    /// Builds the wizard-side résumé from a gateway response.
    /// Falls back to the user's skills when the gateway did not optimize them.
    pub fn from_gateway(cv: GeneratedCv, skills: &[String], template: Template, version: u32) -> Self {
        let skills = cv
            .optimized_sections
            .and_then(|s| s.skills)
            .unwrap_or_else(|| skills.to_vec());
        Self {
            resume_id: cv.resume_id,
            skills,
            suggested_skills: vec![],
            template,
            version,
            content: Some(cv.resume_content).filter(|c| !c.is_empty()),
            source: GenerationSource::Gateway,
        }
    }
}
