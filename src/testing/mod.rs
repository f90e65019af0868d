//! Test doubles for the persistence boundary.
//!
//! `MemoryNoteStore` counts every store call so tests can assert that
//! malformed input short-circuits before any lookup happens.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Note, User};
use crate::database::note_store::NoteStore;
use crate::database::user_store::UserStore;

#[derive(Default)]
pub struct MemoryNoteStore {
    notes: Mutex<HashMap<Uuid, Note>>,
    calls: AtomicUsize,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(
        &self,
        owner_id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError> {
        self.touch();
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            text: text.map(|t| t.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.notes
            .lock()
            .unwrap()
            .insert(note.id, note.clone());
        Ok(note)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        self.touch();
        Ok(self.notes.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        self.touch();
        Ok(self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        text: Option<&str>,
    ) -> Result<Note, DatabaseError> {
        self.touch();
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("note {} not found", id)))?;
        note.title = title.to_string();
        note.text = text.map(|t| t.to_string());
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.touch();
        self.notes
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("note {} not found", id)))
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        password_salt: &str,
    ) -> Result<User, DatabaseError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            password_salt: password_salt.to_string(),
            created_at: Utc::now(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
