//! A small thread pipeline built on bounded, blocking, interruptible queues.
//!
//! Each stage runs on its own OS thread and talks to its neighbours only
//! through [`BoundedBlockingQueue`]s. Shutdown is cooperative: stopping a
//! stage lowers its [`WorkFlag`] and wakes the queues it touches, and any
//! queue call that would block returns [`Interrupted`], which ends the
//! stage's work loop.
//!
//! A normal run drains instead: when a stage's worker returns, its queues are
//! closed, and the next stage empties its input before finishing on its own.
//!
//! # Features
//!
//! - Capacity-bounded FIFO queue with blocking enqueue/dequeue
//! - Interrupt-aware queue operations driven by a shared liveness flag
//! - Uniform start / stop / join lifecycle for every stage
//! - Per-stage metrics: processed and skipped items, step latency percentiles
//! - The quadratic-equation reader → solver → printer pipeline
//!
//! # Example
//!
//! ```no_run
//! use quad_pipeline::build_quad_pipeline;
//!
//! let args = vec!["1".to_string(), "-3".to_string(), "2".to_string()];
//! let mut quad = build_quad_pipeline(args, Some(16), std::io::stdout())?;
//! quad.pipeline.start()?;
//! quad.pipeline.wait()?;
//! # Ok::<(), quad_pipeline::PipelineError>(())
//! ```

pub mod buffer;
pub mod cli;
pub mod error;
pub mod flag;
pub mod logger;
pub mod metrics;
pub mod pipeline;
pub mod quad;
pub mod stage;

// Re-exports for convenience
pub use buffer::{BoundedBlockingQueue, QueueEnd};
pub use error::{Interrupted, PipelineError, Result};
pub use flag::WorkFlag;
pub use metrics::{MetricsSnapshot, StageMetrics};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use quad::{build_quad_pipeline, Coeffs, QuadEquation, QuadPipeline, Roots};
pub use stage::{
    MapStage, SourceStage, Stage, StageControl, StageRunner, StageState, Step, StepResult,
    StopHandle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
