pub mod manager;
pub mod models;
pub mod note_store;
pub mod user_store;

pub use manager::{DatabaseError, DatabaseManager};
