//! Shared data model for the voice inventory pipeline.
//!
//! Everything here crosses a crate boundary: candidates produced by the
//! interpreter, partial/completed commands surfaced by the accumulator,
//! and the read-only context the session layer supplies. Completeness is
//! owned by this crate (`CandidateCommand::meets_requirements`) so no
//! upstream provider can claim a command is actionable when it is not.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Add,
    Remove,
    Set,
    Undo,
    Unknown,
}

impl CommandAction {
    /// Parses a provider-supplied action string. Empty or whitespace-only
    /// strings mean "not stated yet" and map to `None`; anything the model
    /// invents that we do not recognize maps to `Unknown`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" => None,
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "set" => Some(Self::Set),
            "undo" => Some(Self::Undo),
            _ => Some(Self::Unknown),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
            Self::Undo => "undo",
            Self::Unknown => "unknown",
        }
    }
}

/// One finalized chunk of transcribed speech. Interim fragments are
/// display-only; only `is_final` fragments reach interpretation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TextFragment {
    pub text: String,
    pub is_final: bool,
    pub confidence: f64,
}

impl TextFragment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence: 1.0,
        }
    }
}

/// One extraction attempt's structured guess at an inventory command.
/// Produced fresh per fragment; never mutated after the interpreter
/// returns it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct CandidateCommand {
    pub action: Option<CommandAction>,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub confidence: f64,
    pub is_complete: bool,
}

impl CandidateCommand {
    /// Low-confidence stand-in returned when interpretation fails or the
    /// fragment is empty, so downstream logic always has something to
    /// reason about.
    pub fn placeholder() -> Self {
        Self {
            action: Some(CommandAction::Unknown),
            item: Some("unknown".to_string()),
            quantity: None,
            unit: None,
            confidence: 0.3,
            is_complete: false,
        }
    }

    /// Standalone undo, complete by construction with no item/quantity/unit.
    pub fn undo() -> Self {
        Self {
            action: Some(CommandAction::Undo),
            item: None,
            quantity: None,
            unit: None,
            confidence: 1.0,
            is_complete: true,
        }
    }

    pub fn has_item(&self) -> bool {
        self.item.as_deref().is_some_and(|i| !i.trim().is_empty())
    }

    pub fn has_unit(&self) -> bool {
        self.unit.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// The completeness rule for emitted commands:
    ///
    /// - `set` needs item, quantity and unit
    /// - `add` / `remove` need item and quantity
    /// - `undo` is complete with nothing else
    /// - any other action is never complete
    pub fn meets_requirements(&self) -> bool {
        match self.action {
            Some(CommandAction::Set) => {
                self.has_item() && self.quantity.is_some() && self.has_unit()
            }
            Some(CommandAction::Add) | Some(CommandAction::Remove) => {
                self.has_item() && self.quantity.is_some()
            }
            Some(CommandAction::Undo) => true,
            _ => false,
        }
    }

    /// Confidence from field coverage alone, used when no provider score
    /// exists and for scoring partial accumulator state. Reflects how much
    /// of the command's meaning is pinned down, not model probability.
    pub fn coverage_confidence(&self) -> f64 {
        let has_action = self
            .action
            .is_some_and(|a| !matches!(a, CommandAction::Unknown));
        if has_action && self.has_item() && self.quantity.is_some() {
            0.8
        } else if has_action && self.has_item() {
            0.6
        } else if has_action {
            0.45
        } else {
            0.3
        }
    }

    /// Promotes a complete candidate. Returns `None` when the candidate
    /// does not satisfy [`Self::meets_requirements`].
    pub fn to_completed(&self) -> Option<CompletedCommand> {
        if !self.meets_requirements() {
            return None;
        }
        let action = self.action?;
        Some(CompletedCommand {
            action,
            item: self.item.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            confidence: self.confidence,
        })
    }

    pub fn to_partial(&self, confidence: f64) -> PartialCommand {
        PartialCommand {
            action: self.action,
            item: self.item.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            confidence,
        }
    }
}

/// An actionable command ready for the inventory-update consumer.
/// `item` is present for every action that requires one; only `undo`
/// omits it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct CompletedCommand {
    pub action: CommandAction,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub confidence: f64,
}

/// Live snapshot of the in-flight partial command, for UI feedback only.
/// Must never be treated as actionable by inventory-update logic.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct PartialCommand {
    pub action: Option<CommandAction>,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn, oldest-to-newest in the history slice.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Shape of a previously completed command kept around for ellipsis
/// resolution ("5 more" inherits item/unit from here).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct RecentCommand {
    pub action: CommandAction,
    pub item: String,
    pub unit: Option<String>,
}

/// Everything one fragment produced: zero or more actionable commands
/// plus at most one live partial snapshot.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct InterpretUpdate {
    pub completed: Vec<CompletedCommand>,
    pub partial: Option<PartialCommand>,
}

impl InterpretUpdate {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.partial.is_none()
    }
}
