use std::future::Future;
use std::pin::Pin;

use tally_command_interface::{CandidateCommand, CommandAction, ContextEntry, RecentCommand};

pub type ExtractionError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async contract for the external language-understanding call.
///
/// Given one fragment plus read-only context, an implementation returns
/// whatever JSON the model produced: an array of extractions, a single
/// object, or garbage. The interpreter owns all normalization, so
/// implementations should pass the model output through untouched.
///
/// Object-safe via the explicit `BoxFuture` return type; the pipeline
/// holds a `Box<dyn ExtractionProvider>` so tests can substitute a
/// deterministic stub.
pub trait ExtractionProvider: Send + Sync {
    fn extract<'a>(
        &'a self,
        fragment: &'a str,
        history: &'a [ContextEntry],
        recents: &'a [RecentCommand],
    ) -> BoxFuture<'a, Result<serde_json::Value, ExtractionError>>;
}

/// Normalizes raw extractions into a uniform candidate list.
///
/// The provider is treated as unreliable: malformed output, failures and
/// timeouts all degrade to a low-confidence placeholder or an empty list,
/// never to a caller-visible error. Completeness and fallback confidence
/// are computed here regardless of what the provider claims.
pub struct CommandInterpreter {
    provider: Box<dyn ExtractionProvider>,
}

impl CommandInterpreter {
    pub fn new(provider: Box<dyn ExtractionProvider>) -> Self {
        Self { provider }
    }

    pub async fn interpret(
        &self,
        fragment: &str,
        history: &[ContextEntry],
        recents: &[RecentCommand],
    ) -> Vec<CandidateCommand> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return vec![CandidateCommand::placeholder()];
        }

        if is_undo_phrase(trimmed) {
            return vec![CandidateCommand::undo()];
        }

        let value = match self.provider.extract(trimmed, history, recents).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "extraction_provider_failed");
                return vec![CandidateCommand::placeholder()];
            }
        };

        let candidates = normalize(&value);

        // An undo anywhere in the response stands alone and suppresses
        // every other candidate.
        if candidates
            .iter()
            .any(|c| c.action == Some(CommandAction::Undo))
        {
            return vec![CandidateCommand::undo()];
        }

        candidates
    }
}

fn is_undo_phrase(fragment: &str) -> bool {
    let lower = fragment.to_lowercase();
    let stripped = lower.trim_end_matches(['.', '!']);
    stripped == "undo" || stripped == "revert last"
}

/// Array responses yield candidates in order, a bare object yields one,
/// anything else yields none.
fn normalize(value: &serde_json::Value) -> Vec<CandidateCommand> {
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(candidate_from_value).collect(),
        serde_json::Value::Object(_) => candidate_from_value(value).into_iter().collect(),
        _ => vec![],
    }
}

fn candidate_from_value(value: &serde_json::Value) -> Option<CandidateCommand> {
    let obj = value.as_object()?;

    let action = obj
        .get("action")
        .and_then(|v| v.as_str())
        .and_then(CommandAction::parse);

    let item = obj
        .get("item")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let quantity = obj.get("quantity").and_then(number_from_value);

    let unit = obj
        .get("unit")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut candidate = CandidateCommand {
        action,
        item,
        quantity,
        unit,
        confidence: 0.0,
        is_complete: false,
    };

    candidate.confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or_else(|| candidate.coverage_confidence());
    candidate.is_complete = candidate.meets_requirements();

    Some(candidate)
}

/// Models sometimes emit quantities as strings ("5" instead of 5).
fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubProvider(serde_json::Value);

    impl ExtractionProvider for StubProvider {
        fn extract<'a>(
            &'a self,
            _fragment: &'a str,
            _history: &'a [ContextEntry],
            _recents: &'a [RecentCommand],
        ) -> BoxFuture<'a, Result<serde_json::Value, ExtractionError>> {
            let value = self.0.clone();
            Box::pin(async move { Ok(value) })
        }
    }

    struct FailingProvider;

    impl ExtractionProvider for FailingProvider {
        fn extract<'a>(
            &'a self,
            _fragment: &'a str,
            _history: &'a [ContextEntry],
            _recents: &'a [RecentCommand],
        ) -> BoxFuture<'a, Result<serde_json::Value, ExtractionError>> {
            Box::pin(async move {
                Err::<serde_json::Value, _>("upstream timed out".to_string().into())
            })
        }
    }

    fn interpreter(value: serde_json::Value) -> CommandInterpreter {
        CommandInterpreter::new(Box::new(StubProvider(value)))
    }

    async fn run(interpreter: &CommandInterpreter, fragment: &str) -> Vec<CandidateCommand> {
        interpreter.interpret(fragment, &[], &[]).await
    }

    #[tokio::test]
    async fn provider_failure_yields_placeholder() {
        let interpreter = CommandInterpreter::new(Box::new(FailingProvider));
        let candidates = run(&interpreter, "add milk").await;

        assert_eq!(candidates, vec![CandidateCommand::placeholder()]);
    }

    #[tokio::test]
    async fn empty_fragment_yields_placeholder() {
        let interpreter = CommandInterpreter::new(Box::new(FailingProvider));
        let candidates = run(&interpreter, "   ").await;

        assert_eq!(candidates, vec![CandidateCommand::placeholder()]);
    }

    #[tokio::test]
    async fn single_object_is_wrapped() {
        let interpreter = interpreter(json!({
            "action": "add", "item": "coffee", "quantity": 5, "unit": "pounds",
            "confidence": 0.92
        }));
        let candidates = run(&interpreter, "add 5 pounds of coffee").await;

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.action, Some(CommandAction::Add));
        assert_eq!(c.item.as_deref(), Some("coffee"));
        assert_eq!(c.quantity, Some(5.0));
        assert_eq!(c.unit.as_deref(), Some("pounds"));
        assert!(c.is_complete);
    }

    #[tokio::test]
    async fn array_preserves_order() {
        let interpreter = interpreter(json!([
            { "action": "add", "item": "milk", "quantity": 30, "unit": "gallons" },
            { "action": "add", "item": "tea", "quantity": 20, "unit": "boxes" },
        ]));
        let candidates = run(&interpreter, "30 gallons of milk and 20 boxes of tea").await;

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].item.as_deref(), Some("milk"));
        assert_eq!(candidates[1].item.as_deref(), Some("tea"));
        assert!(candidates.iter().all(|c| c.is_complete));
    }

    #[tokio::test]
    async fn unparseable_response_yields_empty_list() {
        let interpreter = interpreter(json!("no commands here"));
        let candidates = run(&interpreter, "how is the weather").await;

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn literal_undo_bypasses_the_provider() {
        let interpreter = CommandInterpreter::new(Box::new(FailingProvider));

        for phrase in ["undo", "Undo", "UNDO.", "revert last", "Revert Last"] {
            let candidates = run(&interpreter, phrase).await;
            assert_eq!(candidates, vec![CandidateCommand::undo()], "{phrase}");
        }
    }

    #[tokio::test]
    async fn provider_tagged_undo_suppresses_other_candidates() {
        let interpreter = interpreter(json!([
            { "action": "add", "item": "milk", "quantity": 5 },
            { "action": "undo" },
        ]));
        let candidates = run(&interpreter, "no wait undo that").await;

        assert_eq!(candidates, vec![CandidateCommand::undo()]);
    }

    #[tokio::test]
    async fn completeness_is_never_trusted_from_the_provider() {
        let interpreter = interpreter(json!({
            "action": "add", "item": "milk", "isComplete": true, "confidence": 0.99
        }));
        let candidates = run(&interpreter, "add some milk").await;

        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].is_complete, "no quantity, cannot be complete");
    }

    #[tokio::test]
    async fn missing_confidence_falls_back_to_field_coverage() {
        let interpreter = interpreter(json!({ "action": "add", "item": "milk" }));
        let candidates = run(&interpreter, "add some milk").await;

        assert_eq!(candidates[0].confidence, 0.6);
    }

    #[tokio::test]
    async fn provider_confidence_is_clamped() {
        let interpreter = interpreter(json!({
            "action": "add", "item": "milk", "quantity": 2, "confidence": 3.5
        }));
        let candidates = run(&interpreter, "add 2 milk").await;

        assert_eq!(candidates[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn string_quantities_are_parsed() {
        let interpreter = interpreter(json!({
            "action": "set", "item": "cups", "quantity": "30", "unit": "sleeves"
        }));
        let candidates = run(&interpreter, "set cups to 30 sleeves").await;

        assert_eq!(candidates[0].quantity, Some(30.0));
        assert!(candidates[0].is_complete);
    }

    #[tokio::test]
    async fn empty_strings_mean_missing_fields() {
        let interpreter = interpreter(json!({
            "action": "", "item": "", "unit": "", "quantity": 5
        }));
        let candidates = run(&interpreter, "5 more").await;

        let c = &candidates[0];
        assert_eq!(c.action, None);
        assert_eq!(c.item, None);
        assert_eq!(c.unit, None);
        assert_eq!(c.quantity, Some(5.0));
    }
}
