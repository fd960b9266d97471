//! Pin locking for the bondout pin allocator.
//!
//! Given a package and the interface metadata of a design, [`lock`] assigns
//! package pins to every port and returns a [`LockFile`] recording the result.
//! Feeding the previous lock file back in keeps every unchanged interface on
//! the pins it already has, so unrelated design changes never move bonded pins.
//!
//! ```no_run
//! use bondout_lock::{load_lock_file, lock, LockOptions};
//! use bondout_common::Process;
//! use bondout_package::load_package;
//! use indexmap::IndexMap;
//! use std::path::Path;
//!
//! let package = load_package("pga144").unwrap();
//! let previous = load_lock_file(Path::new("pins.lock")).ok();
//! let interfaces = IndexMap::new();
//! let locked = lock(&package, Process::Sky130, &interfaces, previous.as_ref(), &LockOptions::default()).unwrap();
//! locked.save(Path::new("pins.lock")).unwrap();
//! ```

#![warn(missing_docs)]

pub mod allocate;
pub mod error;
pub mod iomodel;
pub mod lockfile;
pub mod metadata;
pub mod port;
pub mod power;

pub use allocate::{lock, LockOptions, BRINGUP_INTERFACE, CORE_COMPONENT, PADS_INTERFACE};
pub use error::LockError;
pub use iomodel::{IOModel, Invert, DEFAULT_POWER_DOMAIN};
pub use lockfile::{load_lock_file, LockFile, LOCK_FILE};
pub use metadata::{component_interfaces, MetadataNode, IO_ANNOTATION_SCHEMA};
pub use port::{Component, Interface, PortDescriptor, PortMap};
pub use power::power_port_names;
