use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Note;
use crate::database::note_store::NoteStore;

/// Resolved authentication state for one request.
///
/// Built at the boundary from the JWT middleware's extension; never read from
/// global state. Absence of a user id means the request is anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<Uuid>,
}

impl Identity {
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

/// Validated request body for note create and update
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid note id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    Validation(String),

    #[error("Note not found")]
    NotFound,

    #[error("Note belongs to another user")]
    Forbidden,

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for NoteError {
    fn from(err: DatabaseError) -> Self {
        match err {
            // A row that vanished between fetch and write is reported as a
            // plain not-found, same as a stale id
            DatabaseError::NotFound(_) => NoteError::NotFound,
            other => NoteError::Store(other),
        }
    }
}

/// Ownership-scoped access controller for notes.
///
/// Every operation verifies identity presence first, then id format, then
/// field validation, then existence, then ownership. The order is load-bearing:
/// a request failing several checks reports the earliest one.
pub struct NoteService<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All notes owned by the caller, store-natural order
    pub async fn list_owned(&self, identity: &Identity) -> Result<Vec<Note>, NoteError> {
        let user_id = require_user(identity)?;
        Ok(self.store.find_by_owner(user_id).await?)
    }

    pub async fn get(&self, identity: &Identity, raw_id: &str) -> Result<Note, NoteError> {
        let user_id = require_user(identity)?;
        let note_id = parse_note_id(raw_id)?;

        let note = self
            .store
            .find_by_id(note_id)
            .await?
            .ok_or(NoteError::NotFound)?;
        check_owner(&note, user_id)?;

        Ok(note)
    }

    pub async fn create(&self, identity: &Identity, draft: NoteDraft) -> Result<Note, NoteError> {
        let user_id = require_user(identity)?;
        let title = require_title(&draft)?;

        Ok(self
            .store
            .insert(user_id, title, draft.text.as_deref())
            .await?)
    }

    pub async fn update(
        &self,
        identity: &Identity,
        raw_id: &str,
        draft: NoteDraft,
    ) -> Result<Note, NoteError> {
        let user_id = require_user(identity)?;
        let note_id = parse_note_id(raw_id)?;
        let title = require_title(&draft)?;

        let note = self
            .store
            .find_by_id(note_id)
            .await?
            .ok_or(NoteError::NotFound)?;
        check_owner(&note, user_id)?;

        // Only a non-empty text value replaces the stored text; an omitted
        // or empty text leaves it untouched
        let text = match draft.text.as_deref() {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => note.text.clone(),
        };

        Ok(self.store.update(note_id, title, text.as_deref()).await?)
    }

    pub async fn delete(&self, identity: &Identity, raw_id: &str) -> Result<(), NoteError> {
        let user_id = require_user(identity)?;
        let note_id = parse_note_id(raw_id)?;

        let note = self
            .store
            .find_by_id(note_id)
            .await?
            .ok_or(NoteError::NotFound)?;
        check_owner(&note, user_id)?;

        Ok(self.store.delete(note_id).await?)
    }
}

/// Defense in depth: the routing layer already gates these endpoints behind
/// the JWT middleware, but the controller re-verifies before any store access
fn require_user(identity: &Identity) -> Result<Uuid, NoteError> {
    identity.user_id.ok_or(NoteError::Unauthenticated)
}

/// Syntactic id check, short-circuits malformed input without a store round-trip
fn parse_note_id(raw: &str) -> Result<Uuid, NoteError> {
    Uuid::parse_str(raw).map_err(|_| NoteError::InvalidId(raw.to_string()))
}

fn require_title(draft: &NoteDraft) -> Result<&str, NoteError> {
    match draft.title.as_deref() {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(NoteError::Validation("Note must have a title".to_string())),
    }
}

fn check_owner(note: &Note, user_id: Uuid) -> Result<(), NoteError> {
    if note.owner_id != user_id {
        return Err(NoteError::Forbidden);
    }
    Ok(())
}
