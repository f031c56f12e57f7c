use regex::Regex;

use tally_command_interface::{CandidateCommand, ContextEntry, RecentCommand};

/// Fills gaps in an incomplete candidate from prior context.
///
/// Ellipsis utterances like "5 more" carry a quantity and nothing else;
/// the missing item/unit/action come from the most recent completed
/// command, or failing that from a pattern match over recent
/// conversation turns. Present fields are never overwritten.
pub struct ContextEnhancer {
    turn_pattern: Regex,
}

impl ContextEnhancer {
    pub fn new() -> Self {
        let turn_pattern =
            Regex::new(r"(?i)\b(add|remove|set)\s+(\d+(?:\.\d+)?)\s+(\w+)\s+of\s+(\S.*)").unwrap();
        Self { turn_pattern }
    }

    /// Applied only when quantity is present but item or unit is missing;
    /// everything else passes through untouched.
    pub fn enhance(
        &self,
        mut candidate: CandidateCommand,
        history: &[ContextEntry],
        recents: &[RecentCommand],
    ) -> CandidateCommand {
        let gap = candidate.quantity.is_some() && (!candidate.has_item() || !candidate.has_unit());
        if !gap {
            return candidate;
        }

        if let Some(recent) = recents.last()
            && (candidate.action.is_none() || candidate.action == Some(recent.action))
        {
            if !candidate.has_item() {
                candidate.item = Some(recent.item.clone());
            }
            if !candidate.has_unit() {
                candidate.unit = recent.unit.clone();
            }
            if candidate.action.is_none() {
                candidate.action = Some(recent.action);
            }
        }

        if !candidate.has_item() || !candidate.has_unit() {
            for entry in history.iter().rev() {
                let Some(captures) = self.turn_pattern.captures(&entry.content) else {
                    continue;
                };
                if !candidate.has_unit() {
                    candidate.unit = Some(captures[3].to_string());
                }
                if !candidate.has_item() {
                    candidate.item = Some(captures[4].trim().to_string());
                }
                break;
            }
        }

        candidate.is_complete = candidate.meets_requirements();
        if candidate.is_complete {
            // Context-resolved commands are treated as high-confidence.
            candidate.confidence = candidate.confidence.max(0.9);
        }
        candidate
    }
}

impl Default for ContextEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_command_interface::{CommandAction, Role};

    fn quantity_only(quantity: f64) -> CandidateCommand {
        CandidateCommand {
            action: None,
            item: None,
            quantity: Some(quantity),
            unit: None,
            confidence: 0.3,
            is_complete: false,
        }
    }

    fn recent(action: CommandAction, item: &str, unit: Option<&str>) -> RecentCommand {
        RecentCommand {
            action,
            item: item.to_string(),
            unit: unit.map(str::to_string),
        }
    }

    fn turn(content: &str) -> ContextEntry {
        ContextEntry::new(Role::User, content)
    }

    #[test]
    fn recent_command_fills_item_unit_and_action() {
        let enhancer = ContextEnhancer::new();
        let recents = [recent(CommandAction::Add, "milk", Some("gallons"))];

        let enhanced = enhancer.enhance(quantity_only(5.0), &[], &recents);

        assert_eq!(enhanced.action, Some(CommandAction::Add));
        assert_eq!(enhanced.item.as_deref(), Some("milk"));
        assert_eq!(enhanced.unit.as_deref(), Some("gallons"));
        assert!(enhanced.is_complete);
        assert!(enhanced.confidence >= 0.9);
    }

    #[test]
    fn present_fields_are_never_overwritten() {
        let enhancer = ContextEnhancer::new();
        let recents = [recent(CommandAction::Add, "milk", Some("gallons"))];
        let candidate = CandidateCommand {
            action: Some(CommandAction::Add),
            item: Some("coffee".to_string()),
            quantity: Some(2.0),
            unit: None,
            confidence: 0.5,
            is_complete: false,
        };

        let enhanced = enhancer.enhance(candidate, &[], &recents);

        assert_eq!(enhanced.item.as_deref(), Some("coffee"));
        assert_eq!(enhanced.unit.as_deref(), Some("gallons"));
    }

    #[test]
    fn conflicting_action_skips_the_recent_command() {
        let enhancer = ContextEnhancer::new();
        let recents = [recent(CommandAction::Add, "milk", Some("gallons"))];
        let candidate = CandidateCommand {
            action: Some(CommandAction::Remove),
            item: None,
            quantity: Some(3.0),
            unit: None,
            confidence: 0.45,
            is_complete: false,
        };

        let enhanced = enhancer.enhance(candidate, &[], &recents);

        assert_eq!(enhanced.item, None);
        assert!(!enhanced.is_complete);
    }

    #[test]
    fn conversation_scan_fills_remaining_gaps() {
        let enhancer = ContextEnhancer::new();
        let history = [
            turn("please add 5 gallons of milk"),
            turn("thanks, done"),
        ];
        let candidate = CandidateCommand {
            action: Some(CommandAction::Add),
            item: None,
            quantity: Some(2.0),
            unit: None,
            confidence: 0.45,
            is_complete: false,
        };

        let enhanced = enhancer.enhance(candidate, &history, &[]);

        assert_eq!(enhanced.item.as_deref(), Some("milk"));
        assert_eq!(enhanced.unit.as_deref(), Some("gallons"));
        assert!(enhanced.is_complete);
        assert!(enhanced.confidence >= 0.9);
    }

    #[test]
    fn conversation_scan_prefers_the_newest_match() {
        let enhancer = ContextEnhancer::new();
        let history = [
            turn("add 5 gallons of milk"),
            turn("remove 2 boxes of tea"),
        ];

        let enhanced = enhancer.enhance(quantity_only(1.0), &history, &[]);

        assert_eq!(enhanced.item.as_deref(), Some("tea"));
        assert_eq!(enhanced.unit.as_deref(), Some("boxes"));
    }

    #[test]
    fn recent_without_unit_falls_through_to_history_for_the_unit() {
        let enhancer = ContextEnhancer::new();
        let recents = [recent(CommandAction::Add, "coffee", None)];
        let history = [turn("add 5 pounds of coffee")];

        let enhanced = enhancer.enhance(quantity_only(4.0), &history, &recents);

        assert_eq!(enhanced.item.as_deref(), Some("coffee"));
        assert_eq!(enhanced.unit.as_deref(), Some("pounds"));
    }

    #[test]
    fn no_quantity_means_no_enhancement() {
        let enhancer = ContextEnhancer::new();
        let recents = [recent(CommandAction::Add, "milk", Some("gallons"))];
        let candidate = CandidateCommand {
            action: Some(CommandAction::Add),
            item: None,
            quantity: None,
            unit: None,
            confidence: 0.45,
            is_complete: false,
        };

        let enhanced = enhancer.enhance(candidate.clone(), &[], &recents);

        assert_eq!(enhanced, candidate);
    }

    #[test]
    fn no_context_leaves_the_candidate_incomplete() {
        let enhancer = ContextEnhancer::new();
        let enhanced = enhancer.enhance(quantity_only(5.0), &[], &[]);

        assert!(!enhanced.is_complete);
        assert_eq!(enhanced.confidence, 0.3);
    }
}
