//! Error taxonomy for the draft pipeline.
//!
//! Business invalidity is deliberately absent: an invalid-but-well-shaped
//! section is a normal state reported by the completion calculator.

use super::model::{DraftStatus, SectionName};
use super::schema::RuleViolation;

/// One malformed field found while checking a section's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path into the section payload, e.g. `basic.price` or `links[1].platform`.
    pub path: String,
    pub problem: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into(),
        }
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.problem.clone()
            } else {
                format!("{}: {}", issue.path, issue.problem)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Input rejected before storage because it does not match the section shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{section} payload rejected: {}", describe_issues(.issues))]
pub struct ShapeError {
    pub section: SectionName,
    pub issues: Vec<FieldIssue>,
}

/// Failure of a Draft Store mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Draft is {status}; reopen it for editing first")]
    Locked { status: DraftStatus },
}

/// Illegal lifecycle transition requested on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot move draft from {from} to {to}")]
pub struct TransitionError {
    pub from: DraftStatus,
    pub to: DraftStatus,
}

/// Failure reported by the remote draft service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("No remote draft exists for this owner")]
    NotFound,

    #[error("Remote draft moved to revision {current}")]
    Conflict { current: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote call timed out")]
    Timeout,

    #[error("Remote service rejected the credential")]
    Unauthenticated,
}

/// Failure of a per-section submit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Section {0} has never been filled in")]
    Missing(SectionName),

    #[error("A submit for {0} is already outstanding")]
    InFlight(SectionName),

    #[error("Remote copy of {section} changed concurrently (remote revision {current}); reconcile before resubmitting")]
    Conflict { section: SectionName, current: u64 },

    #[error("Submitting {section} failed: {message}")]
    Transport {
        section: SectionName,
        message: String,
    },

    #[error("Re-authentication required")]
    Unauthenticated,
}

impl SubmitError {
    pub(crate) fn from_remote(section: SectionName, err: RemoteError) -> Self {
        match err {
            RemoteError::Conflict { current } => SubmitError::Conflict { section, current },
            RemoteError::Unauthenticated => SubmitError::Unauthenticated,
            other => SubmitError::Transport {
                section,
                message: other.to_string(),
            },
        }
    }
}

/// Failure of session-start reconciliation, including the re-submission of
/// sections it flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Re-authentication required before the draft can be synchronised")]
    Unauthenticated,
}

/// Forward navigation refused by the step navigator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Section {0} must be filled in before moving on")]
    Missing(SectionName),

    #[error("Section {section} has {} unmet rule(s)", .violations.len())]
    Invalid {
        section: SectionName,
        violations: Vec<RuleViolation>,
    },

    #[error("Already at the review step")]
    AtEnd,
}

/// Failure of the publication gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("Profile is incomplete; missing: {}", join_sections(.0))]
    Incomplete(Vec<SectionName>),

    #[error("Sections not yet confirmed by the server: {}", join_sections(.0))]
    Unsynced(Vec<SectionName>),

    #[error("Draft is {0}; only drafts can be published")]
    InvalidStatus(DraftStatus),

    #[error("Profile changed elsewhere (submitted revision {submitted}, remote at {current}); review the reconciled draft and retry")]
    Conflict { submitted: u64, current: u64 },

    #[error("Publishing failed, try again: {0}")]
    Transient(String),

    #[error("Re-authentication required")]
    Unauthenticated,
}

impl PublishError {
    /// Whether the caller may retry without reconciling first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::Transient(_))
    }

    /// Maps a failed pre-publish submit; `submitted` is the remote revision
    /// the draft was based on when the submit was attempted.
    pub fn from_submit(err: SubmitError, submitted: u64) -> Self {
        match err {
            SubmitError::Conflict { current, .. } => PublishError::Conflict { submitted, current },
            SubmitError::Unauthenticated => PublishError::Unauthenticated,
            SubmitError::Missing(section) => PublishError::Incomplete(vec![section]),
            SubmitError::InFlight(section) => PublishError::Unsynced(vec![section]),
            SubmitError::Transport { message, .. } => PublishError::Transient(message),
        }
    }
}

fn join_sections(sections: &[SectionName]) -> String {
    sections
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
