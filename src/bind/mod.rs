//! Bind module - Protected binding of untrusted payloads.
//!
//! A payload is decoded into a scratch clone of the destination, never into
//! the destination itself; the scratch value is then copied over with the
//! operation tag so protected fields keep their values.

mod binder;
mod decoder;
mod replay;


pub use binder::*;
pub use decoder::*;
pub use replay::*;
