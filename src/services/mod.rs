pub mod note_service;
pub mod user_service;

pub use note_service::{Identity, NoteDraft, NoteError, NoteService};
pub use user_service::{AuthError, LoginInput, RegisterInput, Session, UserService};
