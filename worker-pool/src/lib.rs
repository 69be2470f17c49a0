//! Bounded ingress queue, fixed worker fleet, and the four-stage
//! validate → sanctions → risk → enqueue pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod pool;

pub use config::WorkerPoolConfig;
pub use error::{Error, Result};
pub use observer::{NoopObserver, PipelineEvent, PipelineObserver};
pub use pool::WorkerPool;
