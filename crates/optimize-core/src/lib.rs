//! glTF asset optimization pipeline core (spec §1–§9): ingests a glTF-2.0
//! binary asset, runs it through a configurable sequence of transforms, and
//! writes a smaller, GPU-friendlier binary asset back out.

pub mod document;
pub mod draco_handle;
pub mod error;
pub mod io;
pub mod options;
pub mod scheduler;
pub mod steps;

pub use document::Document;
pub use error::{OptimizeError, Result};
pub use options::Options;
pub use scheduler::{
    execute, execute_with_cancellation, CancellationToken, FlagCancellationToken, NeverCancelled,
    PipelineResult, ProgressEvent, ProgressStatus, ProgressSink, StepResult,
};
pub use steps::StepStats;
