//! Reflect module - Shape introspection for copyable values.
//!
//! Every value the copy engine walks implements [`Reflect`], which reports
//! the value's shape (struct, pointer, dynamic, sequence, map or scalar)
//! and gives typed access to its parts. Struct descriptor tables are
//! generated once per type by [`reflect_struct!`](crate::reflect_struct).

mod field;
mod impls;
mod macros;
mod shape;

pub use field::*;
pub use impls::DynValue;
pub use shape::*;
