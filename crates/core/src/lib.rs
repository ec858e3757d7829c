//! # trustlens Core
//!
//! Domain types, traits, and error definitions for the trustlens client
//! analytics runtime. This crate has **zero framework dependencies**. It
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping the persistence medium or LLM backend via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod client;
pub mod collaborator;
pub mod error;
pub mod message;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use client::{ClientField, ClientRecord, Roster, Scalar};
pub use collaborator::{AssistantClient, AssistantQuery, NarrativeGenerator, NarrativeRequest};
pub use error::{ProviderError, StoreError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use store::{KeyValueStore, StoreKey};
