//! Session Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    ControlAction, ControlSessionCommand, EditSettingsCommand, GetSession, ListSessions,
    PresenceAction, PresenceCommand, SessionSnapshot, StartSessionCommand, StopSessionCommand,
    StopSessionResponse,
};
use crate::infrastructure::http::dto::{
    ApiResponse, ControlSessionRequest, EditSettingsRequest, GetSessionRequest, PresenceRequest,
    StartSessionRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

type SnapshotResponse = Result<Json<ApiResponse<SessionSnapshot>>, ApiError>;

// ============================================================================
// Start
// ============================================================================

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartSessionRequest>,
) -> SnapshotResponse {
    let cmd = StartSessionCommand {
        group: req.group,
        controller: req.controller,
        settings: req.settings,
        mode: req.mode,
    };

    let snapshot = state.start_session_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(snapshot)))
}

// ============================================================================
// Pause / Resume / Skip
// ============================================================================

fn control(state: &AppState, req: ControlSessionRequest, action: ControlAction) -> SnapshotResponse {
    let cmd = ControlSessionCommand {
        group: req.group,
        actor: req.actor,
        action,
    };

    let snapshot = state.control_session_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn pause_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlSessionRequest>,
) -> SnapshotResponse {
    control(&state, req, ControlAction::Pause)
}

pub async fn resume_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlSessionRequest>,
) -> SnapshotResponse {
    control(&state, req, ControlAction::Resume)
}

pub async fn skip_phase(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlSessionRequest>,
) -> SnapshotResponse {
    control(&state, req, ControlAction::Skip)
}

// ============================================================================
// Stop
// ============================================================================

pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlSessionRequest>,
) -> Result<Json<ApiResponse<StopSessionResponse>>, ApiError> {
    let cmd = StopSessionCommand {
        group: req.group,
        actor: req.actor,
    };

    let result = state.stop_session_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(result)))
}

// ============================================================================
// Edit Settings
// ============================================================================

pub async fn edit_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditSettingsRequest>,
) -> SnapshotResponse {
    let cmd = EditSettingsCommand {
        group: req.group,
        actor: req.actor,
        patch: req.settings,
    };

    let snapshot = state.edit_settings_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(snapshot)))
}

// ============================================================================
// Presence
// ============================================================================

fn presence(state: &AppState, req: PresenceRequest, action: PresenceAction) -> SnapshotResponse {
    let cmd = PresenceCommand {
        group: req.group,
        participant: req.participant,
        action,
    };

    let snapshot = state.presence_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn join_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PresenceRequest>,
) -> SnapshotResponse {
    presence(&state, req, PresenceAction::Join)
}

pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PresenceRequest>,
) -> SnapshotResponse {
    presence(&state, req, PresenceAction::Leave)
}

// ============================================================================
// Queries
// ============================================================================

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetSessionRequest>,
) -> SnapshotResponse {
    let snapshot = state
        .get_session_handler
        .handle(GetSession { group: req.group })?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<SessionSnapshot>>> {
    Json(ApiResponse::success(
        state.list_sessions_handler.handle(ListSessions),
    ))
}
