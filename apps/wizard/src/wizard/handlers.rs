use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{Education, Experience, PersonalInfo};
use crate::state::AppState;
use crate::templates::{CvLayout, Template};
use crate::wizard::session::{SharedSession, WizardSnapshot};

/// `Path` that rejects malformed ids and indexes with the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Json` that reports unreadable bodies with the JSON error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Deserialize)]
pub struct JobDescriptionBody {
    pub text: String,
}

#[derive(Deserialize)]
pub struct SkillBody {
    pub skill: String,
}

#[derive(Deserialize)]
pub struct TemplateBody {
    pub template: Template,
}

/// Response of every action that may or may not change something.
#[derive(Serialize)]
pub struct ActionResponse {
    pub changed: bool,
    pub wizard: WizardSnapshot,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard session {id} not found")))
}

async fn respond(session: &SharedSession, changed: bool) -> Json<ActionResponse> {
    Json(ActionResponse {
        changed,
        wizard: session.lock().await.snapshot(),
    })
}

// ── session lifecycle ───────────────────────────────────────────────────────

/// POST /api/v1/wizard
pub async fn handle_create(State(state): State<AppState>) -> (StatusCode, Json<WizardSnapshot>) {
    let (id, session) = state.sessions.create().await;
    info!("Wizard session {id} created");
    let snapshot = session.lock().await.snapshot();
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/wizard/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// DELETE /api/v1/wizard/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard session {id} not found")))?;
    state.wizard.discard(&session).await;
    info!("Wizard session {id} discarded");
    Ok(StatusCode::NO_CONTENT)
}

// ── navigation ──────────────────────────────────────────────────────────────

/// POST /api/v1/wizard/:id/next
pub async fn handle_next(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state.wizard.advance(&session).await?;
    Ok(respond(&session, changed).await)
}

/// POST /api/v1/wizard/:id/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state.wizard.retreat(&session).await;
    Ok(respond(&session, changed).await)
}

/// POST /api/v1/wizard/:id/step/:n
pub async fn handle_jump(
    State(state): State<AppState>,
    ApiPath((id, n)): ApiPath<(Uuid, u8)>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state.wizard.jump(&session, n).await?;
    Ok(respond(&session, changed).await)
}

// ── step 1 ──────────────────────────────────────────────────────────────────

/// PUT /api/v1/wizard/:id/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<JobDescriptionBody>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    state.wizard.edit_job_description(&session, body.text).await?;
    Ok(respond(&session, true).await)
}

/// POST /api/v1/wizard/:id/job-description/upload
/// Accepts the first file field of the form. Only text files are read.
pub async fn handle_upload_job_description(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
        .ok_or_else(|| AppError::Validation("No file was uploaded".to_string()))?;

    if let Some(content_type) = field.content_type() {
        if !content_type.starts_with("text/") {
            return Err(AppError::Validation(format!(
                "Only text files are supported, got {content_type}"
            )));
        }
    }
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let text = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read {file_name}: {e}")))?;

    info!("Job description uploaded from {file_name} ({} bytes)", text.len());
    state.wizard.edit_job_description(&session, text).await?;
    Ok(respond(&session, true).await)
}

// ── step 2 ──────────────────────────────────────────────────────────────────

/// PUT /api/v1/wizard/:id/personal-info
pub async fn handle_set_personal_info(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(info): ApiJson<PersonalInfo>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    state
        .wizard
        .edit_profile(&session, |s| {
            s.set_personal_info(info);
            Ok(())
        })
        .await?;
    Ok(respond(&session, true).await)
}

/// POST /api/v1/wizard/:id/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let session = find_session(&state, id).await?;
    state
        .wizard
        .edit_profile(&session, |s| Ok(s.add_experience()))
        .await?;
    Ok((StatusCode::CREATED, respond(&session, true).await))
}

/// PUT /api/v1/wizard/:id/experience/:index
pub async fn handle_update_experience(
    State(state): State<AppState>,
    ApiPath((id, index)): ApiPath<(Uuid, usize)>,
    ApiJson(entry): ApiJson<Experience>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    state
        .wizard
        .edit_profile(&session, |s| s.update_experience(index, entry))
        .await?;
    Ok(respond(&session, true).await)
}

/// DELETE /api/v1/wizard/:id/experience/:index
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    ApiPath((id, index)): ApiPath<(Uuid, usize)>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state
        .wizard
        .edit_profile(&session, |s| s.remove_experience(index))
        .await?;
    Ok(respond(&session, changed).await)
}

/// POST /api/v1/wizard/:id/education
pub async fn handle_add_education(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let session = find_session(&state, id).await?;
    state
        .wizard
        .edit_profile(&session, |s| Ok(s.add_education()))
        .await?;
    Ok((StatusCode::CREATED, respond(&session, true).await))
}

/// PUT /api/v1/wizard/:id/education/:index
pub async fn handle_update_education(
    State(state): State<AppState>,
    ApiPath((id, index)): ApiPath<(Uuid, usize)>,
    ApiJson(entry): ApiJson<Education>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    state
        .wizard
        .edit_profile(&session, |s| s.update_education(index, entry))
        .await?;
    Ok(respond(&session, true).await)
}

/// DELETE /api/v1/wizard/:id/education/:index
pub async fn handle_remove_education(
    State(state): State<AppState>,
    ApiPath((id, index)): ApiPath<(Uuid, usize)>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state
        .wizard
        .edit_profile(&session, |s| s.remove_education(index))
        .await?;
    Ok(respond(&session, changed).await)
}

/// POST /api/v1/wizard/:id/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SkillBody>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state
        .wizard
        .edit_profile(&session, |s| Ok(s.add_skill(&body.skill)))
        .await?;
    Ok(respond(&session, changed).await)
}

/// DELETE /api/v1/wizard/:id/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    ApiPath((id, skill)): ApiPath<(Uuid, String)>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state
        .wizard
        .edit_profile(&session, |s| Ok(s.remove_skill(&skill)))
        .await?;
    Ok(respond(&session, changed).await)
}

// ── step 4 ──────────────────────────────────────────────────────────────────

/// PUT /api/v1/wizard/:id/template
pub async fn handle_change_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TemplateBody>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let changed = state.wizard.change_template(&session, body.template).await?;
    Ok(respond(&session, changed).await)
}

/// POST /api/v1/wizard/:id/regenerate
pub async fn handle_regenerate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    let session = find_session(&state, id).await?;
    state.wizard.regenerate(&session).await?;
    Ok(respond(&session, true).await)
}

/// GET /api/v1/wizard/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CvLayout>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(state.wizard.preview(&session).await))
}

/// GET /api/v1/wizard/:id/download
pub async fn handle_download(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let download = state.wizard.download(&session).await?;
    info!("Serving {} ({} bytes)", download.filename, download.pdf.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.pdf,
    )
        .into_response())
}
