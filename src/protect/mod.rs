//! Protect module - Tag-driven protected copy between values of one type.
//!
//! A [`Protector`] walks a source and a destination value in parallel and
//! copies every exported field except those whose annotation lists the
//! current operation tag. Sequences and maps are merged according to a
//! [`SequencePolicy`] or [`MapPolicy`], chosen per container instance, per
//! field annotation, or defaulting to `overwrite`.

mod config;
mod copy;
mod error;
mod mapping;
mod options;
mod protector;
mod registry;
mod sequence;

#[cfg(test)]
mod copy_test;

pub use config::*;
pub use error::*;
pub use options::*;
pub use protector::*;
pub use registry::ContainerId;
