pub mod config;
pub mod drafts;

// Re-export commonly used types for convenience.
pub use config::DraftConfig;
pub use drafts::{DraftStore, EditingSession, OwnerId, ProfileDraft, SectionName};
