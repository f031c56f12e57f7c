use tally_command_interface::{ContextEntry, RecentCommand, Role};

pub(crate) const SYSTEM_PROMPT: &str = "\
You extract inventory commands from transcribed speech. \
Respond with a JSON array of objects, one per command found in the fragment, \
each shaped as {\"action\": \"add\"|\"remove\"|\"set\"|\"undo\"|\"\", \
\"item\": string, \"quantity\": number|null, \"unit\": string, \
\"confidence\": number}. \
Leave action/item/unit empty and quantity null when the fragment does not \
state them; never guess. The fragment may be a partial utterance that \
continues an earlier one. Respond with [] when there is no command. \
Output only JSON, no prose.";

pub(crate) fn build_user_message(
    fragment: &str,
    history: &[ContextEntry],
    recents: &[RecentCommand],
) -> String {
    let mut message = format!("Fragment: {fragment}\n");

    if !recents.is_empty() {
        message.push_str("\nRecent commands:\n");
        for command in recents {
            message.push_str(&format!(
                "- {} {}{}\n",
                command.action.as_str(),
                command.item,
                command
                    .unit
                    .as_deref()
                    .map(|u| format!(" ({u})"))
                    .unwrap_or_default(),
            ));
        }
    }

    if !history.is_empty() {
        message.push_str("\nConversation:\n");
        for entry in history {
            let role = match entry.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            message.push_str(&format!("{role}: {}\n", entry.content));
        }
    }

    message
}

/// Models wrap JSON replies in markdown fences despite instructions.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
