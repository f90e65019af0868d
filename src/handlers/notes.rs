use axum::extract::{Extension, Json, Path};
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::models::Note;
use crate::database::note_store::PgNoteStore;
use crate::middleware::{identity_of, ApiResponse, ApiResult, AuthUser};
use crate::services::{Identity, NoteDraft, NoteService};

/// Request body for note create and update
#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl From<NoteBody> for NoteDraft {
    fn from(body: NoteBody) -> Self {
        NoteDraft {
            title: body.title,
            text: body.text,
        }
    }
}

async fn note_service() -> Result<NoteService<PgNoteStore>, crate::error::ApiError> {
    let pool = DatabaseManager::pool().await?;
    Ok(NoteService::new(PgNoteStore::new(pool)))
}

fn identity(auth: &Option<Extension<AuthUser>>) -> Identity {
    identity_of(auth.as_ref().map(|e| &e.0))
}

/// GET /api/notes - list notes owned by the caller
pub async fn list(auth: Option<Extension<AuthUser>>) -> ApiResult<Vec<Note>> {
    let service = note_service().await?;
    let notes = service.list_owned(&identity(&auth)).await?;
    Ok(ApiResponse::success(notes))
}

/// GET /api/notes/:id - show a single note
pub async fn get(auth: Option<Extension<AuthUser>>, Path(id): Path<String>) -> ApiResult<Note> {
    let service = note_service().await?;
    let note = service.get(&identity(&auth), &id).await?;
    Ok(ApiResponse::success(note))
}

/// POST /api/notes - create a note owned by the caller
pub async fn create(
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<NoteBody>,
) -> ApiResult<Note> {
    let service = note_service().await?;
    let note = service.create(&identity(&auth), body.into()).await?;
    Ok(ApiResponse::created(note))
}

/// PUT/PATCH /api/notes/:id - update title and (optionally) text
pub async fn update(
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> ApiResult<Note> {
    let service = note_service().await?;
    let note = service.update(&identity(&auth), &id, body.into()).await?;
    Ok(ApiResponse::success(note))
}

/// DELETE /api/notes/:id - delete a note, responds 204 on success
pub async fn delete(auth: Option<Extension<AuthUser>>, Path(id): Path<String>) -> ApiResult<()> {
    let service = note_service().await?;
    service.delete(&identity(&auth), &id).await?;
    Ok(ApiResponse::<()>::no_content())
}
