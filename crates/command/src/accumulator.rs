//! Time-windowed merge of partial commands.
//!
//! A session holds at most one pending partial command. Incomplete
//! candidates merge into it field-wise while the context window is open;
//! the instant the merged record satisfies the completeness rule it is
//! emitted and the slot clears. Expiry is lazy: a stale record is only
//! discarded when the next candidate arrives, which is acceptable because
//! voice fragments are bounded in frequency.

use std::time::{Duration, Instant};

use tally_command_interface::{
    CandidateCommand, CommandAction, CompletedCommand, PartialCommand,
};

/// Multi-turn confirmations earn a fixed high score when the merge
/// completes the command.
const MERGED_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy)]
pub struct AccumulatorConfig {
    /// How long a pending partial command may wait for its next fragment.
    pub window: Duration,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(5000),
        }
    }
}

/// The single in-flight partial command, privately owned.
#[derive(Debug, Clone)]
struct PendingCommand {
    action: Option<CommandAction>,
    item: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    updated_at: Instant,
}

impl PendingCommand {
    fn seed(candidate: &CandidateCommand, now: Instant) -> Self {
        Self {
            action: candidate.action,
            item: candidate.item.clone(),
            quantity: candidate.quantity,
            unit: candidate.unit.clone(),
            updated_at: now,
        }
    }

    /// Field-wise merge: the candidate's present fields win, existing
    /// fields survive when the candidate leaves them blank.
    fn merge(&mut self, candidate: &CandidateCommand, now: Instant) {
        if candidate.action.is_some() {
            self.action = candidate.action;
        }
        if candidate.has_item() {
            self.item = candidate.item.clone();
        }
        if candidate.quantity.is_some() {
            self.quantity = candidate.quantity;
        }
        if candidate.has_unit() {
            self.unit = candidate.unit.clone();
        }
        self.updated_at = now;
    }

    fn as_candidate(&self, confidence: f64) -> CandidateCommand {
        let mut candidate = CandidateCommand {
            action: self.action,
            item: self.item.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            confidence,
            is_complete: false,
        };
        candidate.is_complete = candidate.meets_requirements();
        candidate
    }
}

/// What one candidate produced: an actionable command, or a live snapshot
/// of the still-pending partial state.
#[derive(Debug, Clone)]
pub enum AccumulatorOutcome {
    Completed(CompletedCommand),
    Partial(PartialCommand),
}

/// The Empty/Pending state machine. Not shared across sessions; each
/// session owns exactly one instance.
#[derive(Debug)]
pub struct CommandAccumulator {
    pending: Option<PendingCommand>,
    window: Duration,
}

impl CommandAccumulator {
    pub fn new(config: AccumulatorConfig) -> Self {
        Self {
            pending: None,
            window: config.window,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops any pending state, e.g. at session end.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn apply(&mut self, candidate: CandidateCommand) -> AccumulatorOutcome {
        self.apply_at(candidate, Instant::now())
    }

    /// Drives one transition with an explicit clock, so tests control the
    /// window without sleeping.
    pub fn apply_at(&mut self, candidate: CandidateCommand, now: Instant) -> AccumulatorOutcome {
        // Complete candidates bypass the slot entirely; an unrelated
        // pending partial is left untouched. A candidate flagged complete
        // that fails the rule is treated as incomplete input instead.
        if candidate.is_complete
            && let Some(completed) = candidate.to_completed()
        {
            return AccumulatorOutcome::Completed(completed);
        }

        if let Some(pending) = self.pending.as_mut()
            && now.duration_since(pending.updated_at) <= self.window
        {
            pending.merge(&candidate, now);
            let merged = pending.as_candidate(MERGED_CONFIDENCE);

            if merged.is_complete {
                self.pending = None;
                if let Some(completed) = merged.to_completed() {
                    return AccumulatorOutcome::Completed(completed);
                }
            } else {
                let confidence = merged.coverage_confidence();
                return AccumulatorOutcome::Partial(merged.to_partial(confidence));
            }
        }

        // Empty slot, or the previous partial expired: start fresh and
        // discard any stale record.
        let pending = PendingCommand::seed(&candidate, now);
        let snapshot = pending.as_candidate(0.0);
        let confidence = snapshot.coverage_confidence();
        self.pending = Some(pending);
        AccumulatorOutcome::Partial(snapshot.to_partial(confidence))
    }
}

impl Default for CommandAccumulator {
    fn default() -> Self {
        Self::new(AccumulatorConfig::default())
    }
}
