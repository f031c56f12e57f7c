pub mod error;
pub mod events;
pub mod manager;
pub mod session;

pub use error::SessionError;
pub use events::SessionEvent;
pub use manager::SessionManager;
pub use session::SessionHandle;

pub use tally_command::PipelineConfig;
