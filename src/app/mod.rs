//! Application core — duty decisions, zero I/O.
//!
//! The worker cycle (manual override, sample, auto-duty) lives in
//! [`service`]. Hardware is reached only through the port traits in
//! [`ports`], so the whole cycle runs against mocks in tests.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
