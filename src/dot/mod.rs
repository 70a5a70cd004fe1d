//! Dot. cloud integration module
//!
//! - `client`: Low-level API client (bearer auth, error translation)
//! - `sync`: Background status polling

pub mod client;
pub mod sync;

pub use client::{ApiFailure, DeviceApi, DotClient, DotError, DEFAULT_TASK_TYPE};
pub use sync::{CoordinatorState, DotSyncer};
