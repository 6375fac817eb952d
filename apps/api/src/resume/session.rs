//! Resume session controller.
//!
//! One controller instance per open session; no state crosses session
//! boundaries. Statuses are derived from the session's contents rather than
//! stored, so `Ready` holds exactly when the revealed prefix equals the final
//! text.
//!
//! | From | Event | To |
//! |------|-------|----|
//! | any | `select_student` (same USN) | unchanged |
//! | any | `select_student` (different USN) | Idle (result cleared, reveal cancelled) |
//! | Idle / Ready / Failed / Revealing | `request_generation` | Generating |
//! | Generating | generation succeeds | Revealing (reveal started) |
//! | Generating | generation fails | Failed |
//! | Revealing | reveal completes | Ready |
//!
//! A second `request_generation` while one is in flight is rejected. A
//! response that arrives after its request was superseded (the selection
//! changed mid-flight, or the session was torn down) is discarded via an
//! epoch counter — stale content never lands.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::llm_client::prompts::build_resume_prompt;
use crate::llm_client::{GenerationError, ResumeGenerator};
use crate::models::student::StudentRecord;
use crate::resume::artifact::ResumeArtifact;
use crate::resume::reveal::RevealScheduler;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no student selected")]
    NoStudentSelected,

    #[error("a generation request is already in flight")]
    GenerationInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Generating,
    Revealing,
    Ready,
    Failed,
}

/// Point-in-time view of a session, safe to hand to any client.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub student: Option<StudentRecord>,
    pub revealed_text: String,
    pub error: Option<String>,
}

enum GenerationOutcome {
    Resume {
        final_text: String,
        revealed: watch::Receiver<String>,
    },
    Failed {
        message: String,
    },
}

struct SessionInner {
    selected: Option<StudentRecord>,
    generating: bool,
    /// Bumped whenever newer state must win over an in-flight generation.
    epoch: u64,
    outcome: Option<GenerationOutcome>,
    reveal: RevealScheduler,
}

impl SessionInner {
    fn status(&self) -> SessionStatus {
        if self.generating {
            return SessionStatus::Generating;
        }
        match &self.outcome {
            None => SessionStatus::Idle,
            Some(GenerationOutcome::Failed { .. }) => SessionStatus::Failed,
            Some(GenerationOutcome::Resume {
                final_text,
                revealed,
            }) => {
                if *revealed.borrow() == *final_text {
                    SessionStatus::Ready
                } else {
                    SessionStatus::Revealing
                }
            }
        }
    }

    fn revealed_text(&self) -> String {
        match &self.outcome {
            Some(GenerationOutcome::Resume { revealed, .. }) => revealed.borrow().clone(),
            _ => String::new(),
        }
    }

    fn error_message(&self) -> Option<String> {
        match &self.outcome {
            Some(GenerationOutcome::Failed { message }) => Some(message.clone()),
            _ => None,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            student: self.selected.clone(),
            revealed_text: self.revealed_text(),
            error: self.error_message(),
        }
    }

    fn clear_result(&mut self) {
        self.reveal.cancel();
        self.outcome = None;
    }
}

/// Ephemeral state machine for one resume-generation interaction.
pub struct ResumeSession {
    generator: Arc<dyn ResumeGenerator>,
    inner: Mutex<SessionInner>,
}

impl ResumeSession {
    pub fn new(generator: Arc<dyn ResumeGenerator>, reveal_tick: Duration) -> Self {
        Self {
            generator,
            inner: Mutex::new(SessionInner {
                selected: None,
                generating: false,
                epoch: 0,
                outcome: None,
                reveal: RevealScheduler::new(reveal_tick),
            }),
        }
    }

    /// Selects a student. Allowed from any state. Switching to a different
    /// student invalidates any previous or in-flight result; re-selecting the
    /// same student preserves a generated resume so the user is not forced to
    /// regenerate.
    pub async fn select_student(&self, record: StudentRecord) {
        let mut inner = self.inner.lock().await;
        let same = inner
            .selected
            .as_ref()
            .is_some_and(|current| current.usn == record.usn);
        if !same {
            inner.epoch += 1;
            inner.generating = false;
            inner.clear_result();
            debug!("Session selection changed to {}", record.usn);
        }
        inner.selected = Some(record);
    }

    /// Makes exactly one generation call for the selected student.
    ///
    /// Rejected while a call is in flight. On success the final text is
    /// stored and the reveal starts; on failure the error message is stored
    /// and the session reads `Failed` until the user retries. No partial
    /// content survives a failure.
    pub async fn request_generation(&self) -> Result<SessionSnapshot, SessionError> {
        let (prompt, epoch, usn) = {
            let mut inner = self.inner.lock().await;
            if inner.generating {
                return Err(SessionError::GenerationInFlight);
            }
            let student = inner.selected.as_ref().ok_or(SessionError::NoStudentSelected)?;
            let prompt = build_resume_prompt(student);
            let usn = student.usn.clone();
            inner.generating = true;
            inner.epoch += 1;
            inner.clear_result();
            (prompt, inner.epoch, usn)
        };

        info!("Generating resume for student {usn}");
        let result = self.generator.generate(&prompt).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            // Superseded while in flight: the newer state wins, this response
            // is dropped on the floor.
            debug!("Discarding superseded generation response for {usn}");
            return Ok(inner.snapshot());
        }
        inner.generating = false;

        match result {
            Ok(text) => {
                info!("Resume generated for {usn} ({} chars)", text.len());
                let revealed = inner.reveal.start(&text);
                inner.outcome = Some(GenerationOutcome::Resume {
                    final_text: text,
                    revealed,
                });
            }
            Err(e) => {
                warn!("Resume generation for {usn} failed: {e}");
                let message = match e {
                    GenerationError::Service { message } => message,
                    GenerationError::Transport(_) => {
                        "An error occurred while generating the resume".to_string()
                    }
                };
                inner.outcome = Some(GenerationOutcome::Failed { message });
            }
        }

        Ok(inner.snapshot())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// The downloadable artifact, or `None` when the reveal has not completed
    /// or there is nothing to export. Deliberately a silent no-op rather than
    /// an error.
    pub async fn export_artifact(&self) -> Option<ResumeArtifact> {
        let inner = self.inner.lock().await;
        if inner.status() != SessionStatus::Ready {
            return None;
        }
        let (final_text, student) = match (&inner.outcome, &inner.selected) {
            (Some(GenerationOutcome::Resume { final_text, .. }), Some(student)) => {
                (final_text, student)
            }
            _ => return None,
        };
        if final_text.is_empty() {
            return None;
        }
        Some(ResumeArtifact::new(&student.name, final_text))
    }

    /// Tears the session down: cancels the reveal timer and ensures any
    /// in-flight generation response is discarded on arrival.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        inner.generating = false;
        inner.reveal.cancel();
    }
}

/// Open sessions, keyed by id. Each session's state stays private to its
/// controller; the registry only routes to it.
#[derive(Clone)]
pub struct SessionRegistry {
    generator: Arc<dyn ResumeGenerator>,
    reveal_tick: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<ResumeSession>>>>,
}

impl SessionRegistry {
    pub fn new(generator: Arc<dyn ResumeGenerator>, reveal_tick: Duration) -> Self {
        Self {
            generator,
            reveal_tick,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        let session = Arc::new(ResumeSession::new(self.generator.clone(), self.reveal_tick));
        self.sessions.write().await.insert(id, session);
        info!("Opened resume session {id}");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ResumeSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.teardown().await;
                info!("Closed resume session {id}");
                true
            }
            None => false,
        }
    }
}
