use std::time::Duration;

use tally_command_interface::{InterpretUpdate, Role, TextFragment};

use crate::accumulator::{AccumulatorConfig, AccumulatorOutcome, CommandAccumulator};
use crate::buffer::FragmentBuffer;
use crate::context::{ContextSource, SessionContext};
use crate::enhance::ContextEnhancer;
use crate::interpreter::{CommandInterpreter, ExtractionProvider};
use crate::relative::contains_relative_term;

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub window: Duration,
    pub history_cap: usize,
    pub recents_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(5000),
            history_cap: 20,
            recents_cap: 10,
        }
    }
}

/// Per-session interpretation pipeline: buffer, interpreter, enhancer and
/// accumulator wired in arrival order.
///
/// One instance per session, behind `&mut self` — fragments for the same
/// session are therefore serialized by construction, which the merge-order
/// invariant requires. Dropping the pipeline drops any pending partial
/// command; nothing else needs cleanup.
pub struct CommandPipeline {
    buffer: FragmentBuffer,
    interpreter: CommandInterpreter,
    enhancer: ContextEnhancer,
    accumulator: CommandAccumulator,
    context: SessionContext,
}

impl CommandPipeline {
    pub fn new(provider: Box<dyn ExtractionProvider>) -> Self {
        Self::with_config(provider, PipelineConfig::default())
    }

    pub fn with_config(provider: Box<dyn ExtractionProvider>, config: PipelineConfig) -> Self {
        Self {
            buffer: FragmentBuffer::new(),
            interpreter: CommandInterpreter::new(provider),
            enhancer: ContextEnhancer::new(),
            accumulator: CommandAccumulator::new(AccumulatorConfig {
                window: config.window,
            }),
            context: SessionContext::new(config.history_cap, config.recents_cap),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn buffered_text(&self) -> &str {
        self.buffer.current()
    }

    pub fn has_pending(&self) -> bool {
        self.accumulator.has_pending()
    }

    /// Runs one finalized fragment through interpret → enhance → merge.
    /// Interim fragments are display-only and skipped entirely.
    pub async fn process_fragment(&mut self, fragment: &TextFragment) -> InterpretUpdate {
        if !fragment.is_final {
            return InterpretUpdate::default();
        }

        self.buffer.push(&fragment.text);

        if contains_relative_term(&fragment.text) {
            tracing::debug!(text = %fragment.text, "relative_term_detected");
        }

        let candidates = self
            .interpreter
            .interpret(
                &fragment.text,
                self.context.conversation_history(),
                self.context.recent_commands(),
            )
            .await;

        let mut update = InterpretUpdate::default();
        for candidate in candidates {
            let candidate = if candidate.is_complete {
                candidate
            } else {
                self.enhancer.enhance(
                    candidate,
                    self.context.conversation_history(),
                    self.context.recent_commands(),
                )
            };

            match self.accumulator.apply(candidate) {
                AccumulatorOutcome::Completed(command) => update.completed.push(command),
                AccumulatorOutcome::Partial(partial) => update.partial = Some(partial),
            }
        }

        self.context.push_turn(Role::User, fragment.text.clone());
        for command in &update.completed {
            self.context.record_command(command);
            tracing::info!(
                action = command.action.as_str(),
                item = command.item.as_deref().unwrap_or_default(),
                "command_completed"
            );
        }

        // The buffer only matters while an utterance is still being
        // assembled. Once the turn completes, or leaves nothing pending,
        // its text can no longer contribute to a merge.
        if !update.completed.is_empty() || !self.accumulator.has_pending() {
            self.buffer.clear();
        }

        update
    }
}
