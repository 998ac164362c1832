//! Template Renderers: pure transforms from the wizard's data to a CV layout.
//!
//! All three renderers share the same input contract (`CvInput`) and output type
//! (`CvLayout`); they differ only in how sections are arranged and styled.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::resume::{Education, Experience, KeywordMatch, PersonalInfo};

pub mod creative;
pub mod minimal;
pub mod modern;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Minimal,
    Modern,
    Creative,
}

impl Template {
    pub fn render(self, input: &CvInput<'_>) -> CvLayout {
        match self {
            Template::Minimal => minimal::render(input),
            Template::Modern => modern::render(input),
            Template::Creative => creative::render(input),
        }
    }
}

/// Everything a renderer may read.
#[derive(Debug, Clone, Copy)]
pub struct CvInput<'a> {
    pub personal_info: &'a PersonalInfo,
    pub experience: &'a [Experience],
    pub education: &'a [Education],
    pub skills: &'a [String],
    pub keyword_matches: &'a [KeywordMatch],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvLayout {
    pub template: Template,
    pub header: Header,
    /// Empty for single-column templates.
    pub sidebar: Vec<Section>,
    pub main: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    pub contact: Vec<ContactLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLine {
    pub kind: ContactKind,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStyle {
    Contact,
    Chips,
    List,
    Timeline,
    Cards,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub style: SectionStyle,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Contact(ContactLine),
    Skill {
        name: String,
        /// The skill matched a job keyword.
        highlighted: bool,
    },
    Entry {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        period: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Building blocks shared by the renderers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn contact_lines(info: &PersonalInfo) -> Vec<ContactLine> {
    [
        (ContactKind::Email, &info.email),
        (ContactKind::Phone, &info.phone),
        (ContactKind::Location, &info.location),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(kind, value)| ContactLine {
        kind,
        value: value.clone(),
    })
    .collect()
}

pub(crate) fn skill_items(input: &CvInput<'_>) -> Vec<Item> {
    input
        .skills
        .iter()
        .map(|skill| Item::Skill {
            name: skill.clone(),
            highlighted: input
                .keyword_matches
                .iter()
                .any(|m| m.skill == *skill && m.is_match),
        })
        .collect()
}

pub(crate) fn experience_items(experience: &[Experience]) -> Vec<Item> {
    experience
        .iter()
        .map(|exp| Item::Entry {
            title: exp.position.clone(),
            subtitle: non_empty(&exp.company),
            period: Some(period(&exp.start_date, &exp.end_date)),
            description: non_empty(&exp.description),
        })
        .collect()
}

pub(crate) fn education_items(education: &[Education]) -> Vec<Item> {
    education
        .iter()
        .map(|edu| Item::Entry {
            title: edu.institution.clone(),
            subtitle: degree_line(edu),
            period: non_empty(&edu.graduation_date).map(|d| format_date(&d)),
            description: None,
        })
        .collect()
}

pub(crate) fn section(title: &str, style: SectionStyle, items: Vec<Item>) -> Section {
    Section {
        title: title.to_string(),
        style,
        items,
    }
}

/// "Month YYYY - Month YYYY", with "Present" for an open end date.
pub(crate) fn period(start: &str, end: &str) -> String {
    let end = if end.trim().is_empty() {
        "Present".to_string()
    } else {
        format_date(end)
    };
    format!("{} - {}", format_date(start), end)
}

/// Formats an ISO-8601 date or datetime as "Month YYYY". Unparseable input is returned as is.
pub(crate) fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%B %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %Y").to_string();
    }
    raw.to_string()
}

fn degree_line(edu: &Education) -> Option<String> {
    match (edu.degree.trim(), edu.field.trim()) {
        ("", "") => None,
        (degree, "") => Some(degree.to_string()),
        ("", field) => Some(format!("in {field}")),
        (degree, field) => Some(format!("{degree} in {field}")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
