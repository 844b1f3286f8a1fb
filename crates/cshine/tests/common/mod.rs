//! Shared test utilities for cshine integration tests.
//!
//! - `ScriptedBackend`: a `JobBackend` replaying a scripted status sequence
//! - `MockUploader`: a `StorageUploader` that never touches the network
//! - `ContractBackend`: decodes creation payloads into server request shapes
//! - fixtures for artifacts, configs and contexts

pub mod fixtures;
pub mod mock;
pub mod server;

pub use fixtures::*;
pub use mock::{MockUploader, ScriptedBackend, Step};
pub use server::{ContractBackend, StoredJob};
