pub mod service;

pub use service::{CompletedSave, EditorSession, PendingSave};
