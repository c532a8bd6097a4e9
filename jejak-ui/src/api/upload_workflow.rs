//! Upload workflow API handlers
//!
//! POST /session, POST /session/{id}/receipt, POST /session/{id}/recognize,
//! PUT /session/{id}/items/{position}, POST /session/{id}/calculate,
//! GET /session/{id}
//!
//! Data flows one direction per stage: raw file → normalized file →
//! candidate list → edited quantities → emission result → persisted
//! record. The in-flight states of the session machine gate against
//! concurrent recognition or calculation calls for the same session.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        EditableLineItem, EmissionResult, ReceiptFile, SessionError, StateTransition, Unit,
        UploadSession, UploadState,
    },
    services::{image_normalizer, EmissionSummary, PersistError},
    AppState,
};
use jejak_common::events::JejakEvent;

/// Receipt photos are small; anything beyond this is not a receipt
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /session response
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub state: UploadState,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// POST /session/{id}/receipt response
#[derive(Debug, Serialize)]
pub struct UploadReceiptResponse {
    pub session_id: Uuid,
    pub state: UploadState,
    pub file_name: String,
}

/// POST /session/{id}/recognize response
#[derive(Debug, Serialize)]
pub struct RecognizeResponse {
    pub session_id: Uuid,
    pub state: UploadState,
    pub products: Vec<String>,
}

/// PUT /session/{id}/items/{position} request
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity_text: Option<String>,
    pub unit: Option<Unit>,
}

/// PUT /session/{id}/items/{position} response
#[derive(Debug, Serialize)]
pub struct UpdateItemResponse {
    pub session_id: Uuid,
    pub items: Vec<EditableLineItem>,
    pub ready: bool,
}

/// POST /session/{id}/calculate response
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub session_id: Uuid,
    pub state: UploadState,
    pub result: EmissionResult,
    pub summary: EmissionSummary,
}

/// GET /session/{id} response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub state: UploadState,
    pub file_name: Option<String>,
    pub items: Vec<EditableLineItem>,
    pub ready: bool,
    pub result: Option<EmissionResult>,
    pub summary: Option<EmissionSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn session_not_found(session_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Upload session not found: {}", session_id))
}

fn map_session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::Busy(state) => ApiError::Conflict(format!(
            "a request is already in flight (state {:?})",
            state
        )),
        other => ApiError::BadRequest(other.to_string()),
    }
}

fn emit_transition(state: &AppState, transition: &StateTransition) {
    state.event_bus.emit_lossy(JejakEvent::SessionStateChanged {
        session_id: transition.session_id,
        old_state: format!("{:?}", transition.old_state),
        new_state: format!("{:?}", transition.new_state),
        timestamp: transition.transitioned_at,
    });
}

/// POST /session
///
/// Create a new upload session in IDLE.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<Json<CreateSessionResponse>> {
    let session = UploadSession::new();
    let response = CreateSessionResponse {
        session_id: session.session_id,
        state: session.state,
        created_at: session.created_at,
    };

    state
        .sessions
        .write()
        .await
        .insert(session.session_id, session);

    state.event_bus.emit_lossy(JejakEvent::SessionCreated {
        session_id: response.session_id,
        timestamp: response.created_at,
    });

    tracing::info!(session_id = %response.session_id, "Upload session created");

    Ok(Json(response))
}

/// POST /session/{id}/receipt
///
/// Attach a receipt image (multipart field `file`). Accepted media types:
/// JPEG and PNG, checked by extension and content. Replaces any earlier
/// file and discards candidates and results.
pub async fn upload_receipt(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadReceiptResponse>> {
    let mut file: Option<ReceiptFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("receipt").to_string();
            let media_type = field.content_type().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?
                .to_vec();
            file = Some(ReceiptFile {
                file_name,
                media_type,
                bytes,
            });
        }
    }

    let file = file
        .ok_or_else(|| ApiError::BadRequest("multipart field 'file' is required".to_string()))?;

    if file.bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    image_normalizer::validate_upload(&file.file_name, &file.bytes)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let file_name = file.file_name.clone();

    let transition = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        session.select_file(file).map_err(map_session_error)?
    };

    state.event_bus.emit_lossy(JejakEvent::FileSelected {
        session_id,
        file_name: file_name.clone(),
        timestamp: Utc::now(),
    });
    emit_transition(&state, &transition);

    tracing::info!(session_id = %session_id, file_name = %file_name, "Receipt attached");

    Ok(Json(UploadReceiptResponse {
        session_id,
        state: transition.new_state,
        file_name,
    }))
}

/// POST /session/{id}/recognize
///
/// Normalize the attached image and submit it for product detection.
/// A second attempt while a request is outstanding gets 409 and is not
/// queued. On failure the candidate list stays empty.
pub async fn recognize(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<RecognizeResponse>> {
    // Gate and grab the raw bytes under one short write lock
    let (raw_bytes, transition) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        let transition = session.begin_recognition().map_err(map_session_error)?;
        let raw_bytes = session
            .file
            .as_ref()
            .map(|f| f.bytes.clone())
            .unwrap_or_default();
        (raw_bytes, transition)
    };
    emit_transition(&state, &transition);

    // Image decode is CPU work; keep it off the async executor
    let normalized = tokio::task::spawn_blocking(move || {
        image_normalizer::normalize_to_jpeg(&raw_bytes)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let normalized = match normalized {
        Ok(bytes) => bytes,
        Err(e) => {
            fail_recognition(&state, session_id, e.to_string()).await;
            return Err(ApiError::BadRequest(e.to_string()));
        }
    };

    let outcome = state.recognition.detect_products(normalized).await;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    match outcome {
        Ok(products) => match session.complete_recognition(products.clone()) {
            Ok(transition) => {
                drop(sessions);
                emit_transition(&state, &transition);
                state.event_bus.emit_lossy(JejakEvent::RecognitionCompleted {
                    session_id,
                    product_count: products.len(),
                    timestamp: Utc::now(),
                });
                Ok(Json(RecognizeResponse {
                    session_id,
                    state: transition.new_state,
                    products,
                }))
            }
            // The session was reset while the request was in flight;
            // the late response is discarded
            Err(_) => Err(ApiError::Conflict(
                "session was reset during recognition".to_string(),
            )),
        },
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Recognition failed");
            if let Ok(transition) = session.fail_recognition() {
                drop(sessions);
                emit_transition(&state, &transition);
            }
            state.event_bus.emit_lossy(JejakEvent::RecognitionFailed {
                session_id,
                message: e.to_string(),
                timestamp: Utc::now(),
            });
            Err(ApiError::Upstream("recognition failed".to_string()))
        }
    }
}

async fn fail_recognition(state: &AppState, session_id: Uuid, message: String) {
    let mut sessions = state.sessions.write().await;
    if let Some(session) = sessions.get_mut(&session_id) {
        if let Ok(transition) = session.fail_recognition() {
            drop(sessions);
            emit_transition(state, &transition);
        }
    }
    state.event_bus.emit_lossy(JejakEvent::RecognitionFailed {
        session_id,
        message,
        timestamp: Utc::now(),
    });
}

/// PUT /session/{id}/items/{position}
///
/// Update quantity text and/or unit of one line item. Items are keyed by
/// position since duplicate product names are possible.
pub async fn update_item(
    State(state): State<AppState>,
    Path((session_id, position)): Path<(Uuid, usize)>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<Json<UpdateItemResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    if session.is_in_flight() {
        return Err(ApiError::Conflict(format!(
            "a request is already in flight (state {:?})",
            session.state
        )));
    }
    if !matches!(
        session.state,
        UploadState::AwaitingQuantities | UploadState::Computed
    ) {
        return Err(ApiError::BadRequest(format!(
            "no editable line items in state {:?}",
            session.state
        )));
    }

    if let Some(text) = request.quantity_text {
        session
            .items
            .set_quantity_text(position, text)
            .map_err(ApiError::NotFound)?;
    }
    if let Some(unit) = request.unit {
        session
            .items
            .set_unit(position, unit)
            .map_err(ApiError::NotFound)?;
    }
    session.updated_at = Utc::now();

    Ok(Json(UpdateItemResponse {
        session_id,
        items: session.items.items().to_vec(),
        ready: session.items.is_ready(),
    }))
}

/// POST /session/{id}/calculate
///
/// Validate quantities, convert to kilograms, request the emission
/// calculation and store the result. Persistence to the backend is
/// spawned fire-and-forget: its failure never reverts the result.
/// Blocked entirely (no network request) while any quantity is missing
/// or unparseable, and 401 when no session token is stored.
pub async fn calculate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CalculateResponse>> {
    let token = state.tokens.get().await.ok_or_else(|| {
        ApiError::Unauthorized("no session token stored; log in first".to_string())
    })?;

    let (items, transition) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found(session_id))?;

        if session.is_in_flight() {
            return Err(ApiError::Conflict(format!(
                "a request is already in flight (state {:?})",
                session.state
            )));
        }

        // Readiness is checked before any transition or network call
        let items = session.items.normalized().ok_or_else(|| {
            ApiError::BadRequest(
                "every line item needs a non-negative quantity before calculation".to_string(),
            )
        })?;

        let transition = session.begin_calculation().map_err(map_session_error)?;
        (items, transition)
    };
    emit_transition(&state, &transition);

    let outcome = state.calculator.calculate(&items).await;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    match outcome {
        Ok(result) => match session.complete_calculation(result.clone()) {
            Ok((transition, idempotency_key)) => {
                drop(sessions);
                emit_transition(&state, &transition);
                state.event_bus.emit_lossy(JejakEvent::CalculationCompleted {
                    session_id,
                    total_kg: result.total_kg,
                    timestamp: Utc::now(),
                });

                let summary =
                    EmissionSummary::from_result(&result, state.config.offset_price_per_kg);

                spawn_persistence(state.clone(), session_id, result.clone(), token, idempotency_key);

                Ok(Json(CalculateResponse {
                    session_id,
                    state: transition.new_state,
                    result,
                    summary,
                }))
            }
            Err(_) => Err(ApiError::Conflict(
                "session was reset during calculation".to_string(),
            )),
        },
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Calculation failed");
            if let Ok(transition) = session.fail_calculation() {
                drop(sessions);
                emit_transition(&state, &transition);
            }
            state.event_bus.emit_lossy(JejakEvent::CalculationFailed {
                session_id,
                message: e.to_string(),
                timestamp: Utc::now(),
            });
            Err(ApiError::Upstream("calculation failed".to_string()))
        }
    }
}

/// Background persistence task
///
/// The computed result is already stored on the session; whatever happens
/// here is reported through the event bus and the log only.
fn spawn_persistence(
    state: AppState,
    session_id: Uuid,
    result: EmissionResult,
    token: String,
    idempotency_key: Uuid,
) {
    tokio::spawn(async move {
        match state
            .persistence
            .save_emission(&result, &token, idempotency_key)
            .await
        {
            Ok(()) => {
                state.event_bus.emit_lossy(JejakEvent::EmissionRecordSaved {
                    session_id,
                    timestamp: Utc::now(),
                });
            }
            Err(PersistError::Unauthorized(code)) => {
                tracing::warn!(
                    session_id = %session_id,
                    status = code,
                    "Backend rejected credential; clearing stored token"
                );
                state.tokens.clear().await;
                state
                    .event_bus
                    .emit_lossy(JejakEvent::EmissionRecordSaveFailed {
                        session_id,
                        message: format!("credential rejected ({})", code),
                        timestamp: Utc::now(),
                    });
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Saving emission record failed");
                state
                    .event_bus
                    .emit_lossy(JejakEvent::EmissionRecordSaveFailed {
                        session_id,
                        message: e.to_string(),
                        timestamp: Utc::now(),
                    });
            }
        }
    });
}

/// GET /session/{id}
///
/// Current session view: state, items, result and the derived summary.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let summary = session
        .result
        .as_ref()
        .map(|r| EmissionSummary::from_result(r, state.config.offset_price_per_kg));

    Ok(Json(SessionStatusResponse {
        session_id: session.session_id,
        state: session.state,
        file_name: session.file.as_ref().map(|f| f.file_name.clone()),
        items: session.items.items().to_vec(),
        ready: session.items.is_ready(),
        result: session.result.clone(),
        summary,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }))
}

/// Build upload workflow routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/session/:session_id", get(get_session))
        .route(
            "/session/:session_id/receipt",
            post(upload_receipt).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/session/:session_id/recognize", post(recognize))
        .route("/session/:session_id/items/:position", put(update_item))
        .route("/session/:session_id/calculate", post(calculate))
}
