//! Age-equivalency scoring: cumulative-threshold with interpolation.
//!
//! Deterministically maps a completed answer set to an [`AssessmentResult`],
//! independent of the order the questions were asked in.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{
    AssessmentResult, CategoryScore, MilestoneCatalog, MilestoneId, RecordedAnswer,
};
use crate::traversal::AssessmentSession;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("cannot score a session that has not terminated")]
    Incomplete,

    #[error("answer references milestone {0}, which is not in the catalog")]
    UnknownMilestone(MilestoneId),
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Scores a terminal session.
///
/// # Errors
///
/// Returns `ScoringError::Incomplete` if the session has a pending question.
pub fn score_session(session: &AssessmentSession) -> Result<AssessmentResult, ScoringError> {
    if !session.is_terminal() {
        return Err(ScoringError::Incomplete);
    }
    score_answers(session.catalog(), session.answers())
}

/// Scores an ordered answer set against a catalog.
///
/// Replaying the same answers always yields an identical result, and the
/// estimate never depends on presentation order.
///
/// # Errors
///
/// Returns `ScoringError::UnknownMilestone` if an answer references an id
/// the catalog does not contain.
pub fn score_answers(
    catalog: &MilestoneCatalog,
    answers: &[RecordedAnswer],
) -> Result<AssessmentResult, ScoringError> {
    let mut raw_score = 0_u32;
    let mut max_score = 0_u32;
    let mut category_scores: BTreeMap<_, CategoryScore> = BTreeMap::new();
    let mut scored = Vec::with_capacity(answers.len());

    for answer in answers {
        let milestone = catalog
            .find(answer.milestone_id)
            .ok_or(ScoringError::UnknownMilestone(answer.milestone_id))?;
        let points = answer.response.points();

        raw_score += points;
        max_score += 2;
        let entry = category_scores.entry(milestone.category()).or_default();
        entry.raw += points;
        entry.max += 2;

        scored.push((milestone.ordering_age(), points));
    }

    let groups = group_by_age(scored);
    let age_equivalent_months = estimate_age_equivalent(&groups);

    Ok(AssessmentResult::new(
        age_equivalent_months,
        raw_score,
        max_score,
        category_scores,
        answers.to_vec(),
    ))
}

/// Answered milestones sharing one ordering age.
struct AgeGroup {
    age: f64,
    score: u32,
    max: u32,
}

fn group_by_age(mut scored: Vec<(f64, u32)>) -> Vec<AgeGroup> {
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut groups: Vec<AgeGroup> = Vec::new();
    for (age, points) in scored {
        match groups.last_mut() {
            Some(group) if group.age == age => {
                group.score += points;
                group.max += 2;
            }
            _ => groups.push(AgeGroup {
                age,
                score: points,
                max: 2,
            }),
        }
    }
    groups
}

/// Inclusive 80% threshold, compared in integer arithmetic so that e.g. an
/// exact 4/5 qualifies. A zero denominator never qualifies.
fn meets_full_credit(score: u32, max: u32) -> bool {
    max > 0 && 5 * score >= 4 * max
}

fn estimate_age_equivalent(groups: &[AgeGroup]) -> f64 {
    // Walk the groups youngest-first, accumulating points. The basal
    // estimate is the highest group age at which the cumulative ratio still
    // meets the threshold.
    let mut cumulative_score = 0_u32;
    let mut cumulative_max = 0_u32;
    let mut last_full_age = 0.0_f64;

    for group in groups {
        cumulative_score += group.score;
        cumulative_max += group.max;
        if meets_full_credit(cumulative_score, cumulative_max) {
            last_full_age = group.age;
        }
    }

    // Partial credit for emerging skills above the basal estimate: include
    // consecutive older groups until one contributes nothing. No credit is
    // extended past the first complete miss.
    let mut partial_score = 0_u32;
    let mut partial_max = 0_u32;
    let mut highest_contributing_age = last_full_age;

    for group in groups.iter().filter(|g| g.age > last_full_age) {
        if group.score == 0 {
            break;
        }
        partial_score += group.score;
        partial_max += group.max;
        highest_contributing_age = group.age;
    }

    let estimate = if partial_max > 0 && partial_score > 0 {
        last_full_age
            + (highest_contributing_age - last_full_age) * f64::from(partial_score)
                / f64::from(partial_max)
    } else {
        last_full_age
    };

    round_half_up_tenths(estimate)
}

/// Round-half-up to one decimal place (9.75 → 9.8).
fn round_half_up_tenths(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
