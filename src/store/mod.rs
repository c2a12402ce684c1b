//! Append-only storage for window aggregates.

mod aggregates;

pub use aggregates::AggregateStore;
