//! sluice-core: Core library for the sluice event mesh
//!
//! This crate provides:
//! - The CloudEvent envelope and its stored record form
//! - Structural validation and partition derivation
//! - Sequencing, subscription, and retry-policy types
//! - Daemon configuration and the clock/id seams

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod attributes;
pub mod clock;
pub mod config;
pub mod event;
pub mod id;
pub mod partition;
pub mod retry;
pub mod sequencing;
pub mod subscription;
pub mod validate;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BrokerConfig, SluiceConfig, StartPosition, StoreBackend};
pub use event::{CloudEvent, CloudEventRecord};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use partition::{
    partition_memberships, PartitionMetadata, PartitionReference, PartitionType, StreamMetadata,
};
pub use retry::RetryPolicy;
pub use sequencing::{ConflictResolution, SequencingConfig, SequencingStrategy};
pub use subscription::{
    DesiredState, Subscription, SubscriptionChange, SubscriptionFilter, SubscriptionPhase,
};
pub use validate::{validate, ValidationError, Violation};
