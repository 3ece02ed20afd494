//! Completion and readiness derived from actual section validity.

use super::model::{ProfileDraft, SectionName};
use super::schema::{validate, RuleViolation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionState {
    Missing,
    Invalid(Vec<RuleViolation>),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub section: SectionName,
    pub state: SectionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    /// 0..=100, rounded half up.
    pub percent: u8,
    /// Absent or invalid sections, in wizard order.
    pub missing: Vec<SectionName>,
    pub publishable: bool,
    pub sections: Vec<SectionProgress>,
}

pub fn compute(draft: &ProfileDraft) -> CompletionReport {
    let sections: Vec<SectionProgress> = SectionName::ALL
        .iter()
        .map(|&section| {
            let state = match draft.section(section) {
                None => SectionState::Missing,
                Some(value) => {
                    let violations = validate(value);
                    if violations.is_empty() {
                        SectionState::Complete
                    } else {
                        SectionState::Invalid(violations)
                    }
                }
            };
            SectionProgress { section, state }
        })
        .collect();

    let missing: Vec<SectionName> = sections
        .iter()
        .filter(|progress| progress.state != SectionState::Complete)
        .map(|progress| progress.section)
        .collect();
    let total = SectionName::ALL.len();
    let valid = total - missing.len();
    let percent = ((200 * valid + total) / (2 * total)) as u8;

    CompletionReport {
        percent,
        publishable: valid == total,
        missing,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::model::OwnerId;
    use crate::drafts::schema::fixtures::{tier, valid};
    use crate::drafts::store::DraftStore;
    use serde_json::json;

    #[test]
    fn empty_draft_is_zero_percent() {
        let report = compute(&ProfileDraft::empty(OwnerId::new()));
        assert_eq!(report.percent, 0);
        assert!(!report.publishable);
        assert_eq!(report.missing, SectionName::ALL.to_vec());
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let mut store = DraftStore::new(OwnerId::new());
        let expected = [17, 33, 50, 67, 83, 100];
        for (section, percent) in SectionName::ALL.into_iter().zip(expected) {
            store.set_section(section, &valid(section)).unwrap();
            assert_eq!(compute(store.draft()).percent, percent);
        }
        let report = compute(store.draft());
        assert!(report.publishable);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn invalid_sections_count_as_missing_in_order() {
        let mut store = DraftStore::new(OwnerId::new());
        for section in SectionName::ALL {
            store.set_section(section, &valid(section)).unwrap();
        }
        store
            .set_section(
                SectionName::Pricing,
                &json!({
                    "basic": tier("Starter", 0),
                    "standard": tier("Growth", 400),
                    "premium": tier("Campaign", 900)
                }),
            )
            .unwrap();
        let report = compute(store.draft());
        assert_eq!(report.missing, vec![SectionName::Pricing]);
        assert_eq!(report.percent, 83);
        assert!(!report.publishable);
        assert!(matches!(report.sections[1].state, SectionState::Invalid(_)));
    }
}
