use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::wizard::debounce::Debouncer;
use crate::wizard::nav::{self, NavEntry};
use crate::wizard::state::{Step, WizardState};
use crate::wizard::steps::StepView;
use crate::wizard::validation::GateStatus;

pub type SharedSession = Arc<Mutex<WizardSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Extraction,
    Analysis,
    Generation,
}

/// Issues monotonically increasing request numbers per kind so that only the
/// most recently issued request of a kind may apply its result.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    extraction: u64,
    analysis: u64,
    generation: u64,
}

impl RequestSequencer {
    fn counter(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Extraction => &mut self.extraction,
            RequestKind::Analysis => &mut self.analysis,
            RequestKind::Generation => &mut self.generation,
        }
    }

    pub fn issue(&mut self, kind: RequestKind) -> u64 {
        let counter = self.counter(kind);
        *counter += 1;
        *counter
    }

    pub fn is_latest(&self, kind: RequestKind, seq: u64) -> bool {
        let latest = match kind {
            RequestKind::Extraction => self.extraction,
            RequestKind::Analysis => self.analysis,
            RequestKind::Generation => self.generation,
        };
        latest == seq
    }
}

/// One user's pass through the wizard: the owned state plus the active step view.
#[derive(Debug)]
pub struct WizardSession {
    pub id: Uuid,
    pub state: WizardState,
    pub view: StepView,
    pub created_at: DateTime<Utc>,
    pub(crate) requests: RequestSequencer,
    pub(crate) extraction_timer: Debouncer,
}

impl WizardSession {
    pub fn new() -> Self {
        let state = WizardState::default();
        Self {
            id: Uuid::new_v4(),
            view: StepView::for_step(state.current_step()),
            state,
            created_at: Utc::now(),
            requests: RequestSequencer::default(),
            extraction_timer: Debouncer::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.state.current_step()
    }

    pub fn gate(&self) -> GateStatus {
        self.view.gate(&self.state)
    }

    pub fn next(&mut self) -> bool {
        let moved = self.state.go_to_next_step();
        self.sync_view(moved)
    }

    pub fn previous(&mut self) -> bool {
        let moved = self.state.go_to_previous_step();
        self.sync_view(moved)
    }

    pub fn jump(&mut self, n: u8) -> bool {
        let moved = self.state.go_to_step(n);
        self.sync_view(moved)
    }

    /// Leaving a step drops its view; the step-1 timer dies with it.
    fn sync_view(&mut self, moved: bool) -> bool {
        if moved {
            if self.view.step() == Step::JobDescription {
                self.extraction_timer.cancel();
            }
            self.view = StepView::for_step(self.state.current_step());
        }
        moved
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let step = self.step();
        let gate = self.gate();
        WizardSnapshot {
            id: self.id,
            current_step: step.number(),
            hint: (!gate.can_continue && !gate.missing.is_empty()).then(|| gate.hint()),
            gate,
            extraction_scheduled: self.extraction_timer.is_pending(),
            view: self.view.clone(),
            state: self.state.clone(),
            nav: nav::entries(step),
            progress: nav::progress(step),
            created_at: self.created_at,
        }
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

/// What the front end needs to draw the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub id: Uuid,
    pub current_step: u8,
    pub gate: GateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// A keyword extraction is waiting out the debounce period.
    pub extraction_scheduled: bool,
    pub view: StepView,
    pub state: WizardState,
    pub nav: Vec<NavEntry>,
    pub progress: f32,
    pub created_at: DateTime<Utc>,
}

/// In-memory session registry. Nothing is persisted.
///
/// Browsers never announce that a wizard was abandoned, so every lookup refreshes the
/// session's last-seen time and idle sessions are dropped by [`SessionStore::evict_idle`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
}

#[derive(Debug)]
struct StoredSession {
    session: SharedSession,
    last_seen: Instant,
}

impl SessionStore {
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = WizardSession::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(
            id,
            StoredSession {
                session: shared.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, shared)
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id)?;
        stored.last_seen = Instant::now();
        Some(stored.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.write().await.remove(&id).map(|s| s.session)
    }

    /// Removes every session not looked up for at least `ttl` and returns them.
    pub async fn evict_idle(&self, ttl: Duration) -> Vec<(Uuid, SharedSession)> {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, stored)| stored.last_seen.elapsed() >= ttl)
            .map(|(id, _)| *id)
            .collect();
        idle.into_iter()
            .filter_map(|id| sessions.remove(&id).map(|stored| (id, stored.session)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
