//! Vote aggregation and reconciliation.
//!
//! A report's community score is a pair of counters plus the current
//! user's own vote. Votes toggle:
//!
//! | current vote | action   | outcome                          |
//! |--------------|----------|----------------------------------|
//! | none         | up       | cast: `up += 1`                  |
//! | up           | up       | retract: `up -= 1`, vote cleared |
//! | down         | up       | switch: `down -= 1`, `up += 1`   |
//!
//! Applying the same action twice therefore votes and then un-votes. This
//! is intended and must not be "fixed" into idempotence.
//!
//! The net score is never stored. It is recomputed from the counters on
//! every read, so it cannot drift from them.
//!
//! # Caller Contract
//!
//! - The report owner must not vote on their own report. That policy is
//!   enforced at the UI/API boundary, not here.
//! - `user_vote` must reflect a vote actually counted in the counters. If it
//!   does not (e.g. retracting from a zero counter), the decrement saturates
//!   at zero instead of underflowing; the resulting state is not meaningful.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{DelayReport, ReportId};

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    /// The other direction.
    pub const fn opposite(self) -> Self {
        match self {
            VoteKind::Upvote => VoteKind::Downvote,
            VoteKind::Downvote => VoteKind::Upvote,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteKind::Upvote),
            "downvote" => Ok(VoteKind::Downvote),
            other => Err(Error::UnknownVoteKind(other.to_string())),
        }
    }
}

/// What a vote action does to a [`VoteState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote; the action is counted.
    Cast(VoteKind),
    /// The action matches the prior vote; the prior vote is withdrawn.
    Retract(VoteKind),
    /// The action reverses the prior vote.
    Switch { from: VoteKind, to: VoteKind },
}

impl VoteTransition {
    /// The vote left active after the transition, if any.
    pub const fn resulting_vote(self) -> Option<VoteKind> {
        match self {
            VoteTransition::Cast(kind) => Some(kind),
            VoteTransition::Retract(_) => None,
            VoteTransition::Switch { to, .. } => Some(to),
        }
    }
}

/// Per-report vote counters plus the current user's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", into = "VoteStats")]
pub struct VoteState {
    pub upvotes: u32,
    pub downvotes: u32,
    #[serde(default)]
    pub user_vote: Option<VoteKind>,
}

/// Wire form of [`VoteState`], carrying the derived net score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStats {
    pub upvotes: u32,
    pub downvotes: u32,
    pub user_vote: Option<VoteKind>,
    pub net_score: i64,
}

impl From<VoteState> for VoteStats {
    fn from(state: VoteState) -> Self {
        Self {
            upvotes: state.upvotes,
            downvotes: state.downvotes,
            user_vote: state.user_vote,
            net_score: state.net_score(),
        }
    }
}

impl VoteState {
    /// Counters with no vote from the current user.
    pub const fn with_counts(upvotes: u32, downvotes: u32) -> Self {
        Self {
            upvotes,
            downvotes,
            user_vote: None,
        }
    }

    /// Upvotes minus downvotes.
    pub const fn net_score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Classify what applying `action` would do.
    pub fn transition_for(&self, action: VoteKind) -> VoteTransition {
        match self.user_vote {
            Some(current) if current == action => VoteTransition::Retract(action),
            Some(current) => VoteTransition::Switch {
                from: current,
                to: action,
            },
            None => VoteTransition::Cast(action),
        }
    }

    fn counter_mut(&mut self, kind: VoteKind) -> &mut u32 {
        match kind {
            VoteKind::Upvote => &mut self.upvotes,
            VoteKind::Downvote => &mut self.downvotes,
        }
    }

    fn increment(&mut self, kind: VoteKind) {
        let counter = self.counter_mut(kind);
        *counter = counter.saturating_add(1);
    }

    // Saturates: never decrements past zero.
    fn decrement(&mut self, kind: VoteKind) {
        let counter = self.counter_mut(kind);
        *counter = counter.saturating_sub(1);
    }
}

/// Apply a vote action to `current`, returning the new state.
///
/// Pure: persisting the result and submitting the vote to the reporting
/// API are the caller's job.
///
/// ```
/// use delaywatch_core::{apply_vote, VoteKind, VoteState};
///
/// let s = apply_vote(VoteState::default(), VoteKind::Upvote);
/// assert_eq!((s.upvotes, s.net_score()), (1, 1));
///
/// // Same action again retracts.
/// let s = apply_vote(s, VoteKind::Upvote);
/// assert_eq!(s, VoteState::default());
/// ```
pub fn apply_vote(current: VoteState, action: VoteKind) -> VoteState {
    let mut next = current;
    match current.transition_for(action) {
        VoteTransition::Cast(kind) => {
            next.increment(kind);
            next.user_vote = Some(kind);
        }
        VoteTransition::Retract(kind) => {
            next.decrement(kind);
            next.user_vote = None;
        }
        VoteTransition::Switch { from, to } => {
            next.decrement(from);
            next.increment(to);
            next.user_vote = Some(to);
        }
    }
    next
}

/// Vote state for every report the current user has seen.
///
/// Local votes are applied optimistically with [`ScoreLedger::vote`];
/// authoritative counters from the reporting API or the push channel are
/// folded in with [`ScoreLedger::reconcile`], which keeps the local vote.
#[derive(Debug, Default, Clone)]
pub struct ScoreLedger {
    entries: HashMap<ReportId, VoteState>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a report with zero counters. No-op if already tracked.
    pub fn track(&mut self, report: ReportId) -> VoteState {
        *self.entries.entry(report).or_default()
    }

    /// Current state for a report, if tracked.
    pub fn get(&self, report: &ReportId) -> Option<VoteState> {
        self.entries.get(report).copied()
    }

    /// Apply a vote action from the current user.
    ///
    /// Untracked reports start from zero counters.
    pub fn vote(&mut self, report: ReportId, action: VoteKind) -> (VoteTransition, VoteState) {
        let state = self.entries.entry(report).or_default();
        let transition = state.transition_for(action);
        *state = apply_vote(*state, action);
        (transition, *state)
    }

    /// Adopt authoritative counters, keeping the current user's vote.
    pub fn reconcile(&mut self, report: ReportId, upvotes: u32, downvotes: u32) -> VoteState {
        let state = self.entries.entry(report).or_default();
        state.upvotes = upvotes;
        state.downvotes = downvotes;
        *state
    }

    /// Reconcile from a pushed or fetched report snapshot.
    pub fn apply_snapshot(&mut self, report: &DelayReport) -> VoteState {
        self.reconcile(report.id.clone(), report.upvotes, report.downvotes)
    }

    /// Stop tracking a deleted report.
    pub fn forget(&mut self, report: &ReportId) -> Option<VoteState> {
        self.entries.remove(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReportId, &VoteState)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UP: VoteKind = VoteKind::Upvote;
    const DOWN: VoteKind = VoteKind::Downvote;

    fn state(upvotes: u32, downvotes: u32, user_vote: Option<VoteKind>) -> VoteState {
        VoteState {
            upvotes,
            downvotes,
            user_vote,
        }
    }

    #[test]
    fn cast_increments_and_records_vote() {
        assert_eq!(apply_vote(state(2, 1, None), UP), state(3, 1, Some(UP)));
        assert_eq!(apply_vote(state(2, 1, None), DOWN), state(2, 2, Some(DOWN)));
    }

    #[test]
    fn same_action_retracts() {
        assert_eq!(apply_vote(state(3, 0, Some(UP)), UP), state(2, 0, None));
        assert_eq!(apply_vote(state(0, 4, Some(DOWN)), DOWN), state(0, 3, None));
    }

    #[test]
    fn opposite_action_switches() {
        assert_eq!(apply_vote(state(3, 1, Some(UP)), DOWN), state(2, 2, Some(DOWN)));
        assert_eq!(apply_vote(state(3, 1, Some(DOWN)), UP), state(4, 0, Some(UP)));
    }

    #[test]
    fn retract_from_zero_saturates() {
        // Contract violation: the recorded vote was never counted.
        assert_eq!(apply_vote(state(0, 0, Some(UP)), UP), state(0, 0, None));
        assert_eq!(apply_vote(state(0, 2, Some(UP)), DOWN), state(0, 3, Some(DOWN)));
    }

    #[test]
    fn toggle_is_not_idempotent() {
        let once = apply_vote(VoteState::default(), UP);
        let twice = apply_vote(once, UP);
        let thrice = apply_vote(twice, UP);
        assert_ne!(once, twice);
        assert_eq!(once, thrice);
    }

    #[test]
    fn net_score_can_go_negative() {
        assert_eq!(state(1, 4, None).net_score(), -3);
        assert_eq!(state(u32::MAX, 0, None).net_score(), i64::from(u32::MAX));
    }

    #[test]
    fn transition_classification() {
        assert_eq!(state(0, 0, None).transition_for(UP), VoteTransition::Cast(UP));
        assert_eq!(state(1, 0, Some(UP)).transition_for(UP), VoteTransition::Retract(UP));
        assert_eq!(
            state(1, 0, Some(UP)).transition_for(DOWN),
            VoteTransition::Switch { from: UP, to: DOWN }
        );
        assert_eq!(VoteTransition::Retract(UP).resulting_vote(), None);
        assert_eq!(VoteTransition::Switch { from: UP, to: DOWN }.resulting_vote(), Some(DOWN));
    }

    #[test]
    fn vote_kind_names() {
        assert_eq!("upvote".parse::<VoteKind>(), Ok(UP));
        assert_eq!("downvote".parse::<VoteKind>(), Ok(DOWN));
        assert!("up".parse::<VoteKind>().is_err());
        assert_eq!(UP.opposite(), DOWN);
    }

    #[test]
    fn serialized_form_carries_net_score() {
        let json = serde_json::to_value(state(5, 2, Some(UP))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"upvotes": 5, "downvotes": 2, "userVote": "upvote", "netScore": 3})
        );
    }

    #[test]
    fn incoming_net_score_is_ignored() {
        let parsed: VoteState = serde_json::from_str(
            r#"{"upvotes": 5, "downvotes": 2, "userVote": null, "netScore": 99}"#,
        )
        .unwrap();
        assert_eq!(parsed, state(5, 2, None));
        assert_eq!(parsed.net_score(), 3);
    }

    #[test]
    fn ledger_votes_and_reconciles() {
        let mut ledger = ScoreLedger::new();
        let id = ReportId::from("r-1");

        assert_eq!(ledger.track(id.clone()), VoteState::default());
        let (transition, after) = ledger.vote(id.clone(), UP);
        assert_eq!(transition, VoteTransition::Cast(UP));
        assert_eq!(after, state(1, 0, Some(UP)));

        // Server says others voted too; our vote stays recorded.
        let reconciled = ledger.reconcile(id.clone(), 7, 2);
        assert_eq!(reconciled, state(7, 2, Some(UP)));

        let (transition, after) = ledger.vote(id.clone(), UP);
        assert_eq!(transition, VoteTransition::Retract(UP));
        assert_eq!(after, state(6, 2, None));

        assert_eq!(ledger.forget(&id), Some(state(6, 2, None)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn track_does_not_reset_existing_state() {
        let mut ledger = ScoreLedger::new();
        let id = ReportId::from("r-2");
        ledger.vote(id.clone(), DOWN);
        assert_eq!(ledger.track(id.clone()), state(0, 1, Some(DOWN)));
        assert_eq!(ledger.len(), 1);
    }

    fn arb_kind() -> impl Strategy<Value = VoteKind> {
        prop_oneof![Just(UP), Just(DOWN)]
    }

    /// States that honour the caller contract: a recorded vote is counted.
    fn arb_state() -> impl Strategy<Value = VoteState> {
        (0u32..1_000, 0u32..1_000, prop::option::of(arb_kind())).prop_map(|(up, down, vote)| {
            match vote {
                Some(VoteKind::Upvote) => state(up + 1, down, vote),
                Some(VoteKind::Downvote) => state(up, down + 1, vote),
                None => state(up, down, None),
            }
        })
    }

    proptest! {
        #[test]
        fn net_score_matches_counters(s in arb_state(), actions in prop::collection::vec(arb_kind(), 0..20)) {
            let mut current = s;
            for action in actions {
                current = apply_vote(current, action);
                prop_assert_eq!(
                    current.net_score(),
                    i64::from(current.upvotes) - i64::from(current.downvotes)
                );
            }
        }

        #[test]
        fn double_apply_from_no_vote_restores_counters(up in 0u32..1_000, down in 0u32..1_000, a in arb_kind()) {
            let s = state(up, down, None);
            let cast = apply_vote(s, a);
            let retracted = apply_vote(cast, a);
            prop_assert_eq!(retracted, s);
            // And the cycle continues: cast again.
            prop_assert_eq!(apply_vote(retracted, a), cast);
        }

        #[test]
        fn total_votes_change_by_at_most_one(s in arb_state(), a in arb_kind()) {
            let before = i64::from(s.upvotes) + i64::from(s.downvotes);
            let next = apply_vote(s, a);
            let after = i64::from(next.upvotes) + i64::from(next.downvotes);
            prop_assert!((after - before).abs() <= 1);
            prop_assert_eq!(next.user_vote, s.transition_for(a).resulting_vote());
        }
    }
}
