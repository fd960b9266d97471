//! Shared foundational types used across the bondout pin allocator.
//!
//! This crate provides the fabrication process enum, supply voltages with
//! unit parsing, port directions and port roles. It has no knowledge of packages or
//! lock files.

#![warn(missing_docs)]

pub mod direction;
pub mod port_type;
pub mod process;
pub mod voltage;

pub use direction::Direction;
pub use port_type::PortType;
pub use process::{ParseProcessError, Process};
pub use voltage::{ParseVoltageError, Voltage, VoltageRange};
