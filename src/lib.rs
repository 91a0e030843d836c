//! ecfan — embedded-controller fan regulator for Clevo laptops.
//!
//! Exposes the worker core (EC transport, register map, auto-duty policy,
//! shared state block) for the binary, integration tests, and any
//! presentation layer that attaches to the shared block.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod ec;
pub mod error;
pub mod shared;
pub mod worker;

pub use error::{Error, Result};
