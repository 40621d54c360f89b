//! Core types and algorithms for the organisational hierarchy graph.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::OrgStore`]; the request layer talks to the
//! [`chart::OrgChart`] facade.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod chart;
pub mod closure;
pub mod department;
pub mod employee;
pub mod error;
pub mod hierarchy;
pub mod link;
pub mod mutator;
pub mod overrides;
pub mod position;
pub mod stats;
pub mod store;

pub use chart::OrgChart;
pub use error::{Error, ErrorKind, Result};
