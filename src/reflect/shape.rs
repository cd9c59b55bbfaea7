//! Shape traits for reflected values.

use std::any::{Any, TypeId};
use std::fmt;

use super::field::FieldDescriptor;
use crate::protect::ProtectError;

/// Kind names the shape of a reflected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A composite value decomposed field by field.
    Struct,
    /// A nilable reference to a single value (`Option<T>`, `Box<T>`).
    Pointer,
    /// A value whose concrete type is only known at runtime.
    Dynamic,
    /// An ordered, integer-indexed, resizable container.
    Sequence,
    /// A keyed container.
    Map,
    /// A value that is always copied whole.
    Scalar,
}

impl Kind {
    /// Returns the lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Dynamic => "dynamic",
            Kind::Sequence => "sequence",
            Kind::Map => "map",
            Kind::Scalar => "scalar",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reflect is implemented by every value the copy engine can traverse.
///
/// Implementations exist for scalars, `String`, the chrono date/time types,
/// `Option<T>`, `Box<T>`, `Vec<T>`, `HashMap<K, V>`, `BTreeMap<K, V>` and
/// [`DynValue`](super::DynValue). Structs implement it through
/// [`reflect_struct!`](crate::reflect_struct).
pub trait Reflect: Any + Send + Sync + 'static {
    /// Returns the Rust type name of the concrete value.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn as_reflect(&self) -> &dyn Reflect;

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    /// Returns a shape-specific view of the value.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Returns a mutable shape-specific view of the value.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Creates a zero value of the same concrete type.
    fn new_zero(&self) -> Box<dyn Reflect>;

    /// Clones the whole value, private fields included.
    fn clone_boxed(&self) -> Box<dyn Reflect>;

    /// Replaces this value with a whole-value clone of `src`.
    ///
    /// Fails with a type mismatch if `src` has a different concrete type.
    fn assign(&mut self, src: &dyn Reflect) -> Result<(), ProtectError>;
}

impl dyn Reflect {
    /// Returns the `TypeId` of the concrete value.
    pub fn reflect_type_id(&self) -> TypeId {
        Any::type_id(self.as_any())
    }

    /// Returns the shape of the value.
    pub fn kind(&self) -> Kind {
        self.reflect_ref().kind()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Unboxes the value as a `T`.
    pub fn take<T: Reflect>(self: Box<Self>) -> Result<T, ProtectError> {
        let actual = self.type_name();
        self.into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ProtectError::type_mismatch(std::any::type_name::<T>(), actual))
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reflect({})", self.type_name())
    }
}

/// Immutable view of a reflected value's shape.
pub enum ReflectRef<'a> {
    Struct(&'a dyn Struct),
    Pointer(&'a dyn Pointer),
    Dynamic(&'a dyn Dynamic),
    Sequence(&'a dyn Sequence),
    Map(&'a dyn Mapping),
    Scalar(&'a dyn Reflect),
}

impl ReflectRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Pointer(_) => Kind::Pointer,
            ReflectRef::Dynamic(_) => Kind::Dynamic,
            ReflectRef::Sequence(_) => Kind::Sequence,
            ReflectRef::Map(_) => Kind::Map,
            ReflectRef::Scalar(_) => Kind::Scalar,
        }
    }
}

/// Mutable view of a reflected value's shape.
pub enum ReflectMut<'a> {
    Struct(&'a mut dyn Struct),
    Pointer(&'a mut dyn Pointer),
    Dynamic(&'a mut dyn Dynamic),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Mapping),
    Scalar(&'a mut dyn Reflect),
}

impl ReflectMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectMut::Struct(_) => Kind::Struct,
            ReflectMut::Pointer(_) => Kind::Pointer,
            ReflectMut::Dynamic(_) => Kind::Dynamic,
            ReflectMut::Sequence(_) => Kind::Sequence,
            ReflectMut::Map(_) => Kind::Map,
            ReflectMut::Scalar(_) => Kind::Scalar,
        }
    }
}

/// Struct exposes a composite value through its field descriptor table.
pub trait Struct: Reflect {
    /// Returns the descriptor table, one entry per declared field in order.
    fn fields(&self) -> &'static [FieldDescriptor];

    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Pointer is a reference to a single target value that may be nil.
pub trait Pointer: Reflect {
    /// Returns the target, or `None` for a nil reference.
    fn target(&self) -> Option<&dyn Reflect>;

    fn target_mut(&mut self) -> Option<&mut dyn Reflect>;

    /// Drops the target.
    fn set_nil(&mut self);

    /// Returns the target, allocating a zero value first if the reference is nil.
    fn get_or_alloc(&mut self) -> &mut dyn Reflect;

    /// Creates a zero value of the target type.
    fn new_target(&self) -> Box<dyn Reflect>;
}

/// Dynamic holds a value of any reflected type, or nothing.
pub trait Dynamic: Reflect {
    fn value(&self) -> Option<&dyn Reflect>;

    fn replace(&mut self, value: Option<Box<dyn Reflect>>);
}

/// Sequence is an ordered, integer-indexed, resizable container.
pub trait Sequence: Reflect {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Creates a zero value of the element type.
    fn new_element(&self) -> Box<dyn Reflect>;

    /// Appends an element, which must have the element type.
    fn push(&mut self, value: Box<dyn Reflect>) -> Result<(), ProtectError>;

    fn truncate(&mut self, len: usize);

    fn clear(&mut self) {
        self.truncate(0);
    }
}

/// Mapping is a keyed container.
pub trait Mapping: Reflect {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keys(&self) -> Vec<&dyn Reflect>;

    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect>;

    /// Inserts an entry, replacing any previous value for the key.
    fn insert(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>)
        -> Result<(), ProtectError>;

    fn remove(&mut self, key: &dyn Reflect) -> Option<Box<dyn Reflect>>;

    fn clear(&mut self);
}
