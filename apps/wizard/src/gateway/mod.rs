//! Domain Service Layer: typed operations against the remote analysis gateway.
//!
//! The wizard only ever talks to `dyn AnalysisGateway`. A `None` from any operation
//! means "service unavailable"; callers decide whether a local fallback exists.

use async_trait::async_trait;
use bytes::Bytes;

use crate::models::analysis::{KeywordExtraction, MatchAnalysis};
use crate::models::resume::{GeneratedCv, ResumeDraft};

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpGateway;

/// Held by the `Wizard` as `Arc<dyn AnalysisGateway>`.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn extract_keywords(&self, job_description: &str) -> Option<KeywordExtraction>;

    async fn analyze_match(&self, job_description: &str, skills: &[String]) -> Option<MatchAnalysis>;

    async fn generate_cv(&self, draft: &ResumeDraft) -> Option<GeneratedCv>;

    /// Returns the rendered PDF.
    async fn download_cv(&self, resume_id: &str) -> Option<Bytes>;
}
