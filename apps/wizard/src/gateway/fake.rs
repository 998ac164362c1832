//! In-memory `AnalysisGateway` for tests. Records every call and answers from canned
//! responses; `None` canned responses model an unreachable gateway.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::AnalysisGateway;
use crate::models::analysis::{KeywordExtraction, MatchAnalysis};
use crate::models::resume::{GeneratedCv, ResumeDraft};

#[derive(Default)]
pub struct FakeGateway {
    pub extraction: Option<KeywordExtraction>,
    pub analysis: Option<MatchAnalysis>,
    pub generated: Option<GeneratedCv>,
    pub pdf: Option<Bytes>,
    /// Per-call latencies consumed in order; calls past the end answer immediately.
    pub latencies: Mutex<VecDeque<Duration>>,
    pub extract_calls: Mutex<Vec<String>>,
    pub analyze_calls: Mutex<Vec<(String, Vec<String>)>>,
    pub generate_calls: Mutex<Vec<ResumeDraft>>,
    pub download_calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    /// A gateway whose every operation fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with_latencies(self, latencies: impl IntoIterator<Item = Duration>) -> Self {
        *self.latencies.lock().unwrap() = latencies.into_iter().collect();
        self
    }

    pub fn extract_count(&self) -> usize {
        self.extract_calls.lock().unwrap().len()
    }

    pub fn analyze_count(&self) -> usize {
        self.analyze_calls.lock().unwrap().len()
    }

    pub fn generate_count(&self) -> usize {
        self.generate_calls.lock().unwrap().len()
    }

    async fn latency(&self) {
        let delay = self.latencies.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AnalysisGateway for FakeGateway {
    async fn extract_keywords(&self, job_description: &str) -> Option<KeywordExtraction> {
        self.extract_calls.lock().unwrap().push(job_description.to_string());
        self.latency().await;
        self.extraction.clone()
    }

    async fn analyze_match(&self, job_description: &str, skills: &[String]) -> Option<MatchAnalysis> {
        self.analyze_calls
            .lock()
            .unwrap()
            .push((job_description.to_string(), skills.to_vec()));
        self.latency().await;
        self.analysis.clone()
    }

    async fn generate_cv(&self, draft: &ResumeDraft) -> Option<GeneratedCv> {
        self.generate_calls.lock().unwrap().push(draft.clone());
        self.latency().await;
        self.generated.clone()
    }

    async fn download_cv(&self, resume_id: &str) -> Option<Bytes> {
        self.download_calls.lock().unwrap().push(resume_id.to_string());
        self.pdf.clone()
    }
}
