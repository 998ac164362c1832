use async_trait::async_trait;
use bytes::Bytes;
use tracing::error;

use crate::api_client::{ApiClient, ApiResponse};
use crate::gateway::AnalysisGateway;
use crate::models::analysis::{
    AnalyzeMatchRequest, ExtractKeywordsRequest, KeywordExtraction, MatchAnalysis,
};
use crate::models::resume::{GeneratedCv, ResumeDraft};

pub const EXTRACT_PATH: &str = "/keywords/extract";
pub const ANALYZE_PATH: &str = "/keywords/analyze";
pub const GENERATE_PATH: &str = "/cv-generator/generate";
pub const DOWNLOAD_PATH: &str = "/cv-generator/download";

/// `AnalysisGateway` backed by the HTTP API client.
#[derive(Clone)]
pub struct HttpGateway {
    client: ApiClient,
}

impl HttpGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// Logs a failed response and collapses it to `None`.
fn into_option<T>(response: ApiResponse<T>, operation: &str) -> Option<T> {
    if !response.success {
        error!(
            "{operation} failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
        return None;
    }
    response.data
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn extract_keywords(&self, job_description: &str) -> Option<KeywordExtraction> {
        let response = self
            .client
            .post(EXTRACT_PATH, &ExtractKeywordsRequest { job_description })
            .await;
        into_option(response, "Keyword extraction")
    }

    async fn analyze_match(&self, job_description: &str, skills: &[String]) -> Option<MatchAnalysis> {
        let response = self
            .client
            .post(
                ANALYZE_PATH,
                &AnalyzeMatchRequest {
                    job_description,
                    skills,
                },
            )
            .await;
        into_option(response, "Match analysis")
    }

    async fn generate_cv(&self, draft: &ResumeDraft) -> Option<GeneratedCv> {
        let response = self.client.post(GENERATE_PATH, draft).await;
        into_option(response, "CV generation")
    }

    async fn download_cv(&self, resume_id: &str) -> Option<Bytes> {
        let response = self
            .client
            .get_bytes(&format!("{DOWNLOAD_PATH}/{resume_id}"))
            .await;
        into_option(response, "CV download")
    }
}
