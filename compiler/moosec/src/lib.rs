//! Moose compiler library surface.
//!
//! The binary in `main.rs` is a thin command dispatcher over the
//! [`driver`] pipeline, which is also what integration tests drive.

pub mod driver;
pub mod tracing_setup;
