//! Batch pipeline components: context and channels, producer, workers, controller.

pub mod context;
pub mod orchestrator;
pub mod producer;
pub mod worker;

pub use context::{
    CancelToken, PipelineChannels, PipelineContext, PipelineEvent, Role, create_pipeline_channels,
};
pub use orchestrator::{BatchOutcome, run_batch, validate_concurrency};
pub use producer::run_producer;
pub use worker::run_worker;
