//! Network boundary for the worker.
//!
//! The worker never talks to the network directly; it goes through the
//! `Network` trait so the fetch-interception policy can be exercised
//! against a scripted network in tests. `HttpNetwork` is the production
//! implementation on reqwest, and also decides whether a response counts
//! as basic (same-origin), cors, or opaque.

pub mod client;
pub mod error;

pub use client::{HttpNetwork, Network};
pub use error::NetError;
