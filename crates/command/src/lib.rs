pub mod accumulator;
pub mod buffer;
pub mod context;
pub mod enhance;
pub mod interpreter;
pub mod pipeline;
pub mod relative;

pub use accumulator::{AccumulatorConfig, AccumulatorOutcome, CommandAccumulator};
pub use buffer::FragmentBuffer;
pub use context::{ContextSource, SessionContext};
pub use enhance::ContextEnhancer;
pub use interpreter::{BoxFuture, CommandInterpreter, ExtractionError, ExtractionProvider};
pub use pipeline::{CommandPipeline, PipelineConfig};
pub use relative::contains_relative_term;
