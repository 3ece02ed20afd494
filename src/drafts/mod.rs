//! Creator profile draft pipeline.
//!
//! A wizard collects a creator profile across six independent sections. The
//! working draft lives in a [`DraftStore`], is cached locally, reconciled with
//! the remote copy at session start, and can only be published once every
//! section is present, valid, and acknowledged by the remote service.

pub mod cache;
pub mod completion;
pub mod error;
pub mod model;
pub mod navigator;
pub mod persist;
pub mod publish;
pub mod reconcile;
pub mod remote;
pub mod schema;
pub mod session;
pub mod store;

pub use cache::{CacheEntry, FileDraftCache, LocalCache, MemoryDraftCache};
pub use completion::{compute, CompletionReport, SectionState};
pub use error::{
    EditError, FieldIssue, NavigationError, PublishError, ReconcileError, RemoteError, ShapeError,
    SubmitError, TransitionError,
};
pub use model::{DraftStatus, OwnerId, ProfileDraft, SectionName, SectionValue};
pub use navigator::{Step, StepNavigator};
pub use publish::PublicationGate;
pub use reconcile::{ReconcileReport, Reconciler};
pub use remote::{Ack, InMemoryDraftService, RemoteDraft, RemoteDraftService};
pub use schema::{parse_section, validate, RuleViolation};
pub use session::{EditingSession, SubmitOutcome, SubmitTicket};
pub use store::DraftStore;
