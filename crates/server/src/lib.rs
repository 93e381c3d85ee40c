//! HTTP surface for the morpho conversion service.
//!
//! Exposed as a library so integration tests can drive the full router
//! in-process; the `morpho` binary is a thin wiring layer on top.

pub mod api;
pub mod metrics;
pub mod state;
