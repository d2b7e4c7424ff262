//! esatom Atom feed publisher library.
//!
//! This crate primarily ships the `atompub` binary, but exposes its router,
//! configuration and event store adapters so integration tests can run the
//! service against an in-memory store.

pub mod api;
pub mod config;
pub mod state;
pub mod store;
