//! Wizard step navigation over the fixed section sequence.
//!
//! Moving backward is always allowed. Moving forward requires the current
//! section to be present and business-valid. Navigation never touches the
//! draft itself.

use super::error::NavigationError;
use super::model::SectionName;
use super::schema::validate;
use super::store::DraftStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Section(SectionName),
    /// Terminal pseudo-step after `personal`.
    Review,
}

impl Step {
    pub const FIRST: Step = Step::Section(SectionName::Overview);

    fn ordinal(self) -> usize {
        match self {
            Step::Section(section) => section.index(),
            Step::Review => SectionName::ALL.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepNavigator {
    position: Step,
}

impl Default for StepNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl StepNavigator {
    pub fn new() -> Self {
        Self {
            position: Step::FIRST,
        }
    }

    pub fn position(&self) -> Step {
        self.position
    }

    pub fn can_advance(&self, store: &DraftStore) -> bool {
        self.check_advance(store).is_ok()
    }

    fn check_advance(&self, store: &DraftStore) -> Result<Step, NavigationError> {
        let Step::Section(current) = self.position else {
            return Err(NavigationError::AtEnd);
        };
        check_section(store, current)?;
        Ok(current.next().map(Step::Section).unwrap_or(Step::Review))
    }

    pub fn next(&mut self, store: &DraftStore) -> Result<Step, NavigationError> {
        let target = self.check_advance(store)?;
        self.position = target;
        Ok(target)
    }

    pub fn previous(&mut self) -> Step {
        self.position = match self.position {
            Step::Review => Step::Section(SectionName::Personal),
            Step::Section(section) => Step::Section(section.previous().unwrap_or(section)),
        };
        self.position
    }

    /// Jumps to `target`: backward freely, forward only when the current
    /// section and every section skipped over are valid. Sections behind the
    /// current position are not re-checked.
    pub fn go_to(&mut self, target: Step, store: &DraftStore) -> Result<Step, NavigationError> {
        let from = self.position.ordinal();
        if target.ordinal() > from {
            for section in &SectionName::ALL[from..target.ordinal()] {
                check_section(store, *section)?;
            }
        }
        self.position = target;
        Ok(target)
    }
}

fn check_section(store: &DraftStore, section: SectionName) -> Result<(), NavigationError> {
    let value = store
        .get_section(section)
        .ok_or(NavigationError::Missing(section))?;
    let violations = validate(value);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(NavigationError::Invalid {
            section,
            violations,
        })
    }
}
