//! Client-side session cache for Authforge.
//!
//! This crate maintains the application's current belief about who is
//! logged in: hydrated from the identity provider at startup, revalidated
//! on demand, and persisted across reloads — but only the parts that are
//! safe to persist.
//!
//! The cached identity is a snapshot, never proof. Before anything
//! security-sensitive, callers run
//! [`verify_session`](SessionCache::verify_session), which re-asks the
//! provider and pessimistically clears the cache the moment the provider
//! stops vouching for the session.
//!
//! # Key types
//!
//! - [`SessionCache`] — the cache itself and its operation set
//! - [`CacheState`] / [`CachePhase`] — the observable state machine
//! - [`SnapshotStore`] — where the persisted blob lives
//!   ([`FileSnapshotStore`], [`MemorySnapshotStore`])
//!
//! # Concurrency note
//!
//! `SessionCache` is deliberately a single-writer structure: every
//! mutation takes `&mut self`, so the hosting application's main
//! execution context serializes them. There is no internal locking to
//! reason about, and no way for two in-flight hydrations to interleave
//! without the caller explicitly arranging it.

#![allow(async_fn_in_trait)]

mod cache;
mod state;
mod store;

pub use cache::{SessionCache, SNAPSHOT_NAME};
pub use state::{CachePhase, CacheState};
pub use store::{
    FileSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreError,
};
