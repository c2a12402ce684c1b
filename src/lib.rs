//! tripflow — near-real-time trip-count feature pipeline.
//!
//! Modular structure:
//! - [`source`] — Trip-completion event type and rate-varying simulator
//! - [`bus`] — In-process pub/sub topic (at-least-once, unordered)
//! - [`window`] — Sliding-window aggregation, the core of the pipeline
//! - [`store`] — Append-only SQLite aggregate store
//! - [`features`] — Feature vectors and latest-count augmentation
//! - [`predict`] — Prediction endpoint client
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod source;
pub mod bus;
pub mod window;
pub mod store;
pub mod features;
pub mod predict;
pub mod logging;

pub use config::PipelineConfig;
pub use source::{TripEvent, TripGenerator};
pub use bus::EventBus;
pub use window::{AggregateRecord, SlidingWindowAggregator};
pub use store::AggregateStore;
pub use features::{AugmentError, FeatureAugmenter, FeatureVector};
pub use predict::PredictionClient;
pub use logging::StructuredLogger;
