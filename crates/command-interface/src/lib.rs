pub mod types;

pub use types::{
    CandidateCommand, CommandAction, CompletedCommand, ContextEntry, InterpretUpdate,
    PartialCommand, RecentCommand, Role, TextFragment,
};
