//! Control policies.

pub mod auto_duty;

pub use auto_duty::next_duty;
