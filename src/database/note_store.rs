use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Note;

/// Persistence boundary for notes.
///
/// The access controller only talks to this trait; `PgNoteStore` is the
/// production implementation and the test suite substitutes an in-memory one.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a new note, generating its id
    async fn insert(
        &self,
        owner_id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, DatabaseError>;

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, DatabaseError>;

    /// Replace the mutable fields of a note.
    /// Fails with `DatabaseError::NotFound` if the row vanished since it was fetched.
    async fn update(
        &self,
        id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError>;

    /// Fails with `DatabaseError::NotFound` if the row vanished since it was fetched.
    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(
        &self,
        owner_id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError> {
        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (id, owner_id, title, text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let notes = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(notes)
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError> {
        // RETURNING doubles as the existence check: a concurrent delete
        // between fetch and write surfaces here as NotFound
        let note = sqlx::query_as::<_, Note>(
            "UPDATE notes SET title = $2, text = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;

        note.ok_or_else(|| DatabaseError::NotFound(format!("note {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("note {} not found", id)));
        }
        Ok(())
    }
}
