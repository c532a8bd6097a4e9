//! Upload workflow state machine
//!
//! An upload session progresses through:
//! IDLE → FILE_SELECTED → RECOGNIZING → AWAITING_QUANTITIES → CALCULATING → COMPUTED
//!
//! RECOGNIZING and CALCULATING are in-flight states; while one request is
//! outstanding a second attempt is rejected, not queued. Failures return
//! the session to the settled state it came from.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EmissionResult, QuantityTable};

/// Upload workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadState {
    /// Session created, no file chosen yet
    Idle,
    /// A receipt image is attached
    FileSelected,
    /// Recognition request outstanding
    Recognizing,
    /// Candidate products listed, quantities being edited
    AwaitingQuantities,
    /// Calculation request outstanding
    Calculating,
    /// Emission result available
    Computed,
}

/// State transition record
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: UploadState,
    pub new_state: UploadState,
    pub transitioned_at: DateTime<Utc>,
}

/// Errors from invalid workflow operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A recognition or calculation call is already outstanding
    #[error("a request is already in flight (state {0:?})")]
    Busy(UploadState),

    /// Operation not allowed in the current state
    #[error("operation not allowed in state {0:?}")]
    InvalidState(UploadState),

    /// No receipt file attached yet
    #[error("no receipt file selected")]
    NoFile,
}

/// Uploaded receipt file, ephemeral per session
///
/// The raw bytes never leave the process except toward the recognition
/// service, and are not part of any serialized session view.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptFile {
    pub file_name: String,
    pub media_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Upload session (in-memory state, owned by the session table)
#[derive(Debug, Clone, Serialize)]
pub struct UploadSession {
    pub session_id: Uuid,
    pub state: UploadState,
    pub file: Option<ReceiptFile>,
    pub items: QuantityTable,
    pub result: Option<EmissionResult>,
    /// Minted once per computed result so the backend can deduplicate
    /// a retried submission
    pub idempotency_key: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            state: UploadState::Idle,
            file: None,
            items: QuantityTable::default(),
            result: None,
            idempotency_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while a recognition or calculation request is outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, UploadState::Recognizing | UploadState::Calculating)
    }

    fn transition_to(&mut self, new_state: UploadState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        self.updated_at = transition.transitioned_at;
        transition
    }

    /// Attach a receipt file, discarding candidates and any prior result
    pub fn select_file(&mut self, file: ReceiptFile) -> Result<StateTransition, SessionError> {
        if self.is_in_flight() {
            return Err(SessionError::Busy(self.state));
        }
        self.file = Some(file);
        self.items.clear();
        self.result = None;
        self.idempotency_key = None;
        Ok(self.transition_to(UploadState::FileSelected))
    }

    /// Enter RECOGNIZING; rejected while a request is outstanding
    pub fn begin_recognition(&mut self) -> Result<StateTransition, SessionError> {
        if self.is_in_flight() {
            return Err(SessionError::Busy(self.state));
        }
        if self.file.is_none() {
            return Err(SessionError::NoFile);
        }
        match self.state {
            UploadState::FileSelected
            | UploadState::AwaitingQuantities
            | UploadState::Computed => Ok(self.transition_to(UploadState::Recognizing)),
            state => Err(SessionError::InvalidState(state)),
        }
    }

    /// Recognition succeeded: initialize the quantity table 1:1 from the
    /// candidate list and enter AWAITING_QUANTITIES
    pub fn complete_recognition(
        &mut self,
        products: Vec<String>,
    ) -> Result<StateTransition, SessionError> {
        if self.state != UploadState::Recognizing {
            // Stale completion: the session was reset while the request
            // was outstanding. The caller discards the response.
            return Err(SessionError::InvalidState(self.state));
        }
        self.items = QuantityTable::from_candidates(products);
        self.result = None;
        self.idempotency_key = None;
        Ok(self.transition_to(UploadState::AwaitingQuantities))
    }

    /// Recognition failed: no partial candidates, back to FILE_SELECTED
    pub fn fail_recognition(&mut self) -> Result<StateTransition, SessionError> {
        if self.state != UploadState::Recognizing {
            return Err(SessionError::InvalidState(self.state));
        }
        self.items.clear();
        Ok(self.transition_to(UploadState::FileSelected))
    }

    /// Enter CALCULATING; rejected while a request is outstanding
    ///
    /// Quantity readiness is checked by the caller before any network
    /// request is issued.
    pub fn begin_calculation(&mut self) -> Result<StateTransition, SessionError> {
        if self.is_in_flight() {
            return Err(SessionError::Busy(self.state));
        }
        match self.state {
            UploadState::AwaitingQuantities | UploadState::Computed => {
                Ok(self.transition_to(UploadState::Calculating))
            }
            state => Err(SessionError::InvalidState(state)),
        }
    }

    /// Calculation succeeded: store the result, mint the idempotency key
    /// for the persistence call, enter COMPUTED
    pub fn complete_calculation(
        &mut self,
        result: EmissionResult,
    ) -> Result<(StateTransition, Uuid), SessionError> {
        if self.state != UploadState::Calculating {
            return Err(SessionError::InvalidState(self.state));
        }
        let key = Uuid::new_v4();
        self.result = Some(result);
        self.idempotency_key = Some(key);
        Ok((self.transition_to(UploadState::Computed), key))
    }

    /// Calculation failed: items (and any previously computed result)
    /// are preserved, session returns to the settled state it came from
    pub fn fail_calculation(&mut self) -> Result<StateTransition, SessionError> {
        if self.state != UploadState::Calculating {
            return Err(SessionError::InvalidState(self.state));
        }
        let settled = if self.result.is_some() {
            UploadState::Computed
        } else {
            UploadState::AwaitingQuantities
        };
        Ok(self.transition_to(settled))
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}
