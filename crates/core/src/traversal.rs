use std::fmt;
use thiserror::Error;

use crate::model::{
    ChronologicalAge, Milestone, MilestoneCatalog, MilestoneId, RecordedAnswer, Response,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraversalError {
    #[error("screening session already completed")]
    Completed,
}

//
// ─── SEARCH PHASE ──────────────────────────────────────────────────────────────
//

/// Which way the basal/ceiling search is currently moving.
///
/// Sessions open `Backward`, walking down from the start index until a
/// mastered floor is found, then pivot `Forward` to locate the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Session state reported after each submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// One pending question; the caller should present this milestone next.
    Awaiting(MilestoneId),
    /// The search has terminated; the session is ready for scoring.
    Complete,
}

//
// ─── ASSESSMENT SESSION ────────────────────────────────────────────────────────
//

/// Mutable state of one in-progress screening.
///
/// An explicit state machine with no dependency on any rendering or event
/// framework: collaborators call [`AssessmentSession::submit`] once per
/// caregiver answer and read [`AssessmentSession::current_milestone`] for the
/// single pending question. The catalog snapshot taken at creation fixes the
/// question order for the session's lifetime.
///
/// The traversal minimizes question count with a basal/ceiling search:
/// starting at the first milestone at/above the chronological age, it walks
/// backward until a mastered milestone (the basal) is found, then forward
/// from the start point until a miss establishes the ceiling. Every branch
/// either shrinks the unanswered backward range or advances monotonically
/// forward, so a session terminates within catalog-length steps and asks
/// about each milestone at most once.
pub struct AssessmentSession {
    catalog: MilestoneCatalog,
    chronological_age: ChronologicalAge,
    answers: Vec<RecordedAnswer>,
    slots: Vec<Option<Response>>,
    start_index: usize,
    cursor: Option<usize>,
    direction: Direction,
}

impl AssessmentSession {
    /// Opens a session on a validated catalog snapshot.
    ///
    /// The start index is the first milestone whose expected-by month is at
    /// or above the chronological age, or the last milestone if none is.
    #[must_use]
    pub fn new(catalog: MilestoneCatalog, chronological_age: ChronologicalAge) -> Self {
        let start_index = catalog
            .iter()
            .position(|m| m.start_reference_month() >= chronological_age.months())
            .unwrap_or(catalog.len() - 1);

        let slots = vec![None; catalog.len()];

        Self {
            catalog,
            chronological_age,
            answers: Vec::new(),
            slots,
            start_index,
            cursor: Some(start_index),
            direction: Direction::Backward,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &MilestoneCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn chronological_age(&self) -> ChronologicalAge {
        self.chronological_age
    }

    /// Answers in presentation order.
    #[must_use]
    pub fn answers(&self) -> &[RecordedAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.cursor.is_none()
    }

    /// Catalog index of the pending question, `None` once terminal.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// The single pending question, `None` once terminal.
    #[must_use]
    pub fn current_milestone(&self) -> Option<&Milestone> {
        self.cursor.and_then(|index| self.catalog.get(index))
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.current_milestone() {
            Some(milestone) => SessionState::Awaiting(milestone.id()),
            None => SessionState::Complete,
        }
    }

    /// Records the caregiver's answer to the pending question and moves the
    /// search.
    ///
    /// Transition rules, with pass = `Yes`:
    /// - backward pass: the mastered floor is found; pivot forward (see
    ///   below);
    /// - backward fail: step one milestone down; running out below index 0
    ///   terminates with no mastered floor (age-equivalency floor 0);
    /// - forward pass: next unanswered milestone up; running off the end of
    ///   the catalog terminates with ceiling = catalog end;
    /// - forward fail: terminate immediately.
    ///
    /// The pivot resumes at the start index when the basal was found below
    /// it, otherwise directly after the just-passed item. Resuming skips
    /// recorded passes; a recorded miss at or above the resume point is an
    /// already-established ceiling, so the session terminates on the spot
    /// rather than re-asking anything.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::Completed` if the session is already
    /// terminal.
    pub fn submit(&mut self, response: Response) -> Result<SessionState, TraversalError> {
        let index = self.cursor.ok_or(TraversalError::Completed)?;
        self.record(index, response);

        match (self.direction, response.is_pass()) {
            (Direction::Backward, true) => {
                self.direction = Direction::Forward;
                if index >= self.start_index {
                    self.seek_forward(index + 1);
                } else {
                    self.seek_forward(self.start_index);
                }
            }
            (Direction::Backward, false) => {
                self.cursor = index.checked_sub(1);
            }
            (Direction::Forward, true) => self.seek_forward(index + 1),
            (Direction::Forward, false) => self.cursor = None,
        }

        Ok(self.state())
    }

    fn record(&mut self, index: usize, response: Response) {
        debug_assert!(self.slots[index].is_none(), "milestone asked twice");
        self.slots[index] = Some(response);
        let id = self.catalog.milestones()[index].id();
        self.answers.push(RecordedAnswer::new(id, response));
    }

    /// Moves the cursor to the first unanswered index at or after `from`,
    /// skipping recorded passes. A recorded miss ends the session (the
    /// ceiling is already known), as does running past the catalog end.
    fn seek_forward(&mut self, from: usize) {
        let mut index = from;
        while let Some(slot) = self.slots.get(index) {
            match slot {
                None => {
                    self.cursor = Some(index);
                    return;
                }
                Some(response) if response.is_pass() => index += 1,
                Some(_) => break,
            }
        }
        self.cursor = None;
    }
}

impl fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("catalog_len", &self.catalog.len())
            .field("chronological_age", &self.chronological_age)
            .field("answered", &self.answers.len())
            .field("start_index", &self.start_index)
            .field("cursor", &self.cursor)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MilestoneCategory, MilestoneDraft};

    fn catalog(ages: &[u32]) -> MilestoneCatalog {
        let drafts = ages
            .iter()
            .enumerate()
            .map(|(i, &age)| MilestoneDraft {
                id: MilestoneId::new(i as u64 + 1),
                display_name: format!("Milestone {}", i + 1),
                description: None,
                expected_by_month: Some(age),
                age_equivalent_months: Some(f64::from(age)),
                concern_if_missing_by_month: age + 3,
                red_flag: false,
                category: MilestoneCategory::Locomotion,
                display_order: i as u32,
            })
            .collect();
        MilestoneCatalog::from_drafts(drafts).unwrap()
    }

    fn age(months: f64) -> ChronologicalAge {
        ChronologicalAge::new(months).unwrap()
    }

    #[test]
    fn starts_at_first_milestone_at_or_above_age() {
        let session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12]), age(5.0));
        assert_eq!(session.start_index(), 2);
        assert_eq!(session.current_index(), Some(2));
        assert_eq!(session.direction(), Direction::Backward);
    }

    #[test]
    fn starts_at_last_milestone_when_age_is_above_catalog() {
        let session = AssessmentSession::new(catalog(&[2, 4, 6]), age(24.0));
        assert_eq!(session.start_index(), 2);
    }

    #[test]
    fn first_pass_pivots_forward_past_the_start() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12]), age(5.0));

        let state = session.submit(Response::Yes).unwrap();
        assert_eq!(session.direction(), Direction::Forward);
        assert_eq!(session.current_index(), Some(3));
        assert_eq!(state, SessionState::Awaiting(MilestoneId::new(4)));
    }

    #[test]
    fn backward_fail_steps_down_one_milestone() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12]), age(5.0));

        session.submit(Response::NotYet).unwrap();
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.direction(), Direction::Backward);
    }

    #[test]
    fn sometimes_counts_as_fail_for_traversal() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6]), age(5.0));

        session.submit(Response::Sometimes).unwrap();
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn all_fails_exhaust_the_floor() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6]), age(5.0));

        session.submit(Response::NotYet).unwrap();
        session.submit(Response::NotYet).unwrap();
        let state = session.submit(Response::NotYet).unwrap();

        assert_eq!(state, SessionState::Complete);
        assert!(session.is_terminal());
        assert_eq!(session.answered_count(), 3);
    }

    #[test]
    fn forward_passes_run_to_the_catalog_end() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9]), age(3.0));

        session.submit(Response::Yes).unwrap();
        session.submit(Response::Yes).unwrap();
        let state = session.submit(Response::Yes).unwrap();

        assert_eq!(state, SessionState::Complete);
        assert_eq!(session.answered_count(), 3);
    }

    #[test]
    fn forward_fail_terminates_immediately() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12]), age(5.0));

        session.submit(Response::Yes).unwrap();
        let state = session.submit(Response::NotYet).unwrap();

        assert_eq!(state, SessionState::Complete);
        assert_eq!(session.answered_count(), 2);
    }

    // The pivot scenario: fail at the start index, pass below it. The pivot
    // returns to the start index, finds the recorded miss there, and ends the
    // session with the basal as ceiling instead of asking anything above it.
    #[test]
    fn pivot_over_a_recorded_miss_ends_the_session() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12, 14, 18]), age(13.0));
        assert_eq!(session.start_index(), 5);

        session.submit(Response::NotYet).unwrap();
        assert_eq!(session.current_index(), Some(4));
        let state = session.submit(Response::Yes).unwrap();

        assert_eq!(state, SessionState::Complete);
        assert!(session.is_terminal());
        assert_eq!(session.answered_count(), 2);
    }

    #[test]
    fn pivot_from_deeper_backward_run_also_ends_at_the_recorded_miss() {
        let mut session = AssessmentSession::new(catalog(&[2, 4, 6, 9, 12, 14, 18]), age(13.0));

        session.submit(Response::NotYet).unwrap();
        session.submit(Response::Sometimes).unwrap();
        session.submit(Response::NotYet).unwrap();
        assert_eq!(session.current_index(), Some(2));
        let state = session.submit(Response::Yes).unwrap();

        assert_eq!(state, SessionState::Complete);
        assert_eq!(session.answered_count(), 4);
    }

    #[test]
    fn submit_after_terminal_is_rejected() {
        let mut session = AssessmentSession::new(catalog(&[2, 4]), age(3.0));

        session.submit(Response::NotYet).unwrap();
        session.submit(Response::NotYet).unwrap();
        assert!(session.is_terminal());

        let err = session.submit(Response::Yes).unwrap_err();
        assert!(matches!(err, TraversalError::Completed));
    }

    #[test]
    fn single_item_catalog_terminates_in_one_step() {
        let mut session = AssessmentSession::new(catalog(&[6]), age(6.0));
        let state = session.submit(Response::Yes).unwrap();
        assert_eq!(state, SessionState::Complete);
    }

    // Exhaustive over every answer combination on a small catalog: the
    // session always terminates within catalog-length steps and never asks
    // the same milestone twice.
    #[test]
    fn terminates_within_catalog_len_and_visits_each_once() {
        let ages = [2_u32, 4, 6, 9, 12];
        let responses = [Response::Yes, Response::Sometimes, Response::NotYet];

        for start_age in [0.0, 5.0, 9.0, 30.0] {
            for combination in 0..responses.len().pow(ages.len() as u32) {
                let mut session = AssessmentSession::new(catalog(&ages), age(start_age));
                let mut remaining = combination;
                let mut steps = 0;

                while !session.is_terminal() {
                    let response = responses[remaining % responses.len()];
                    remaining /= responses.len();
                    session.submit(response).unwrap();
                    steps += 1;
                    assert!(steps <= ages.len());
                }

                let mut seen = std::collections::HashSet::new();
                for answer in session.answers() {
                    assert!(seen.insert(answer.milestone_id));
                }
            }
        }
    }
}
