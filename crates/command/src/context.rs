use tally_command_interface::{
    CommandAction, CompletedCommand, ContextEntry, RecentCommand, Role,
};

/// Read-only supplier of conversation turns and recently completed
/// commands. Backed by [`SessionContext`] in the session runtime, or by
/// caller-owned slices in tests.
pub trait ContextSource {
    /// Conversation turns, oldest to newest.
    fn conversation_history(&self) -> &[ContextEntry];

    /// Completed commands, oldest to newest.
    fn recent_commands(&self) -> &[RecentCommand];
}

/// In-memory per-session context with bounded history. Oldest entries are
/// evicted once the caps are reached.
#[derive(Debug)]
pub struct SessionContext {
    history: Vec<ContextEntry>,
    recents: Vec<RecentCommand>,
    history_cap: usize,
    recents_cap: usize,
}

impl SessionContext {
    pub fn new(history_cap: usize, recents_cap: usize) -> Self {
        Self {
            history: Vec::new(),
            recents: Vec::new(),
            history_cap,
            recents_cap,
        }
    }

    pub fn push_turn(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ContextEntry::new(role, content));
        if self.history.len() > self.history_cap {
            let excess = self.history.len() - self.history_cap;
            self.history.drain(..excess);
        }
    }

    /// Records a completed command for later ellipsis resolution. Undo and
    /// item-less commands carry nothing worth inheriting and are skipped.
    pub fn record_command(&mut self, command: &CompletedCommand) {
        if command.action == CommandAction::Undo {
            return;
        }
        let Some(item) = command.item.clone() else {
            return;
        };
        self.recents.push(RecentCommand {
            action: command.action,
            item,
            unit: command.unit.clone(),
        });
        if self.recents.len() > self.recents_cap {
            let excess = self.recents.len() - self.recents_cap;
            self.recents.drain(..excess);
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(20, 10)
    }
}

impl ContextSource for SessionContext {
    fn conversation_history(&self) -> &[ContextEntry] {
        &self.history
    }

    fn recent_commands(&self) -> &[RecentCommand] {
        &self.recents
    }
}
