//! Reflect implementations for standard library, chrono and dynamic values.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use super::shape::{Dynamic, Mapping, Pointer, Reflect, ReflectMut, ReflectRef, Sequence};
use crate::protect::ProtectError;

crate::__reflect_scalar!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::NaiveDateTime,
    chrono::NaiveDate,
    chrono::NaiveTime,
);

impl<T: Reflect + Clone + Default> Reflect for Option<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect + Clone + Default> Pointer for Option<T> {
    fn target(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|value| value as &dyn Reflect)
    }

    fn target_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|value| value as &mut dyn Reflect)
    }

    fn set_nil(&mut self) {
        *self = None;
    }

    fn get_or_alloc(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn new_target(&self) -> Box<dyn Reflect> {
        Box::new(T::default())
    }
}

// Box is a reference that is never nil; setting it to nil resets the target
// to its zero value.
impl<T: Reflect + Clone + Default> Reflect for Box<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }
}

impl<T: Reflect + Clone + Default> Pointer for Box<T> {
    fn target(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn target_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    fn set_nil(&mut self) {
        **self = T::default();
    }

    fn get_or_alloc(&mut self) -> &mut dyn Reflect {
        &mut **self
    }

    fn new_target(&self) -> Box<dyn Reflect> {
        Box::new(T::default())
    }
}

impl<T: Reflect + Clone + Default> Reflect for Vec<T> {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }
}

impl<T: Reflect + Clone + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|value| value as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|value| value as &mut dyn Reflect)
    }

    fn new_element(&self) -> Box<dyn Reflect> {
        Box::new(T::default())
    }

    fn push(&mut self, value: Box<dyn Reflect>) -> Result<(), ProtectError> {
        Vec::push(self, value.take::<T>()?);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Clone + Eq + Hash,
    V: Reflect + Clone + Default,
{
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

impl<K, V> Mapping for HashMap<K, V>
where
    K: Reflect + Clone + Eq + Hash,
    V: Reflect + Clone + Default,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn keys(&self) -> Vec<&dyn Reflect> {
        HashMap::keys(self).map(|key| key as &dyn Reflect).collect()
    }

    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        let key = key.downcast_ref::<K>()?;
        HashMap::get(self, key).map(|value| value as &dyn Reflect)
    }

    fn insert(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> Result<(), ProtectError> {
        let key = key.take::<K>()?;
        let value = value.take::<V>()?;
        HashMap::insert(self, key, value);
        Ok(())
    }

    fn remove(&mut self, key: &dyn Reflect) -> Option<Box<dyn Reflect>> {
        let key = key.downcast_ref::<K>()?;
        HashMap::remove(self, key).map(|value| Box::new(value) as Box<dyn Reflect>)
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Clone + Ord,
    V: Reflect + Clone + Default,
{
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

impl<K, V> Mapping for BTreeMap<K, V>
where
    K: Reflect + Clone + Ord,
    V: Reflect + Clone + Default,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn keys(&self) -> Vec<&dyn Reflect> {
        BTreeMap::keys(self).map(|key| key as &dyn Reflect).collect()
    }

    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        let key = key.downcast_ref::<K>()?;
        BTreeMap::get(self, key).map(|value| value as &dyn Reflect)
    }

    fn insert(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> Result<(), ProtectError> {
        let key = key.take::<K>()?;
        let value = value.take::<V>()?;
        BTreeMap::insert(self, key, value);
        Ok(())
    }

    fn remove(&mut self, key: &dyn Reflect) -> Option<Box<dyn Reflect>> {
        let key = key.downcast_ref::<K>()?;
        BTreeMap::remove(self, key).map(|value| Box::new(value) as Box<dyn Reflect>)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

/// DynValue holds a value of any reflected type, or nothing.
///
/// When copied, the held value is always rebuilt from the source's concrete
/// type; it is never merged into whatever the destination held before.
#[derive(Default)]
pub struct DynValue(Option<Box<dyn Reflect>>);

impl DynValue {
    /// Creates a DynValue holding `value`.
    pub fn new<T: Reflect>(value: T) -> Self {
        DynValue(Some(Box::new(value)))
    }

    /// Creates an empty DynValue.
    pub fn empty() -> Self {
        DynValue(None)
    }

    /// Returns true if no value is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the held value.
    pub fn get(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.get()?.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Replaces the held value.
    pub fn set<T: Reflect>(&mut self, value: T) {
        self.0 = Some(Box::new(value));
    }
}

impl Clone for DynValue {
    fn clone(&self) -> Self {
        DynValue(self.0.as_ref().map(|value| value.clone_boxed()))
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "DynValue({})", value.type_name()),
            None => f.write_str("DynValue(<empty>)"),
        }
    }
}

impl Reflect for DynValue {
    crate::__reflect_common!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }
}

impl Dynamic for DynValue {
    fn value(&self) -> Option<&dyn Reflect> {
        self.get()
    }

    fn replace(&mut self, value: Option<Box<dyn Reflect>>) {
        self.0 = value;
    }
}
