//! Declarative macros generating [`Reflect`](super::Reflect) implementations.

/// Expands to the [`Reflect`](crate::reflect::Reflect) methods shared by
/// every implementation. Requires `Self: Clone + Default`.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_common {
    () => {
        fn type_name(&self) -> &'static str {
            ::std::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
            self
        }

        fn as_reflect(&self) -> &dyn $crate::reflect::Reflect {
            self
        }

        fn as_reflect_mut(&mut self) -> &mut dyn $crate::reflect::Reflect {
            self
        }

        fn new_zero(&self) -> ::std::boxed::Box<dyn $crate::reflect::Reflect> {
            ::std::boxed::Box::new(<Self as ::std::default::Default>::default())
        }

        fn clone_boxed(&self) -> ::std::boxed::Box<dyn $crate::reflect::Reflect> {
            ::std::boxed::Box::new(<Self as ::std::clone::Clone>::clone(self))
        }

        fn assign(
            &mut self,
            src: &dyn $crate::reflect::Reflect,
        ) -> ::std::result::Result<(), $crate::protect::ProtectError> {
            match src.as_any().downcast_ref::<Self>() {
                ::std::option::Option::Some(value) => {
                    *self = <Self as ::std::clone::Clone>::clone(value);
                    ::std::result::Result::Ok(())
                }
                ::std::option::Option::None => ::std::result::Result::Err(
                    $crate::protect::ProtectError::type_mismatch(
                        ::std::any::type_name::<Self>(),
                        src.type_name(),
                    ),
                ),
            }
        }
    };
}

/// Implements [`Reflect`](crate::reflect::Reflect) for scalar types, which are
/// always copied by whole-value assignment.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_scalar {
    ($($type:ty),* $(,)?) => {
        $(
            impl $crate::reflect::Reflect for $type {
                $crate::__reflect_common!();

                fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                    $crate::reflect::ReflectRef::Scalar(self)
                }

                fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                    $crate::reflect::ReflectMut::Scalar(self)
                }
            }
        )*
    };
}

/// Declares a struct and implements [`Reflect`](crate::reflect::Reflect) and
/// [`Struct`](crate::reflect::Struct) for it.
///
/// Each field may carry an annotation string after `=>`, written as space
/// separated `key:"value"` pairs. Only `pub` fields take part in copying.
/// The struct must implement `Clone` and `Default`, and every field type
/// must implement `Reflect`.
///
/// ```
/// protect::reflect_struct! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Account {
///         pub id: String => r#"protectfor:"create,update""#,
///         pub email: String => r#"protectfor:"update""#,
///         pub name: String,
///         pub roles: Vec<String> => r#"protectopt:"match""#,
///     }
/// }
///
/// let src = Account {
///     id: "1".into(),
///     email: "a@example.com".into(),
///     name: "Alice".into(),
///     roles: vec!["admin".into()],
/// };
/// let mut dst = Account::default();
/// protect::copy("update", &src, &mut dst).unwrap();
/// assert_eq!(dst.id, "");
/// assert_eq!(dst.email, "");
/// assert_eq!(dst.name, "Alice");
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::reflect::Reflect for $name {
            $crate::__reflect_common!();

            fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                $crate::reflect::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                $crate::reflect::ReflectMut::Struct(self)
            }
        }

        impl $crate::reflect::Struct for $name {
            fn fields(&self) -> &'static [$crate::reflect::FieldDescriptor] {
                const FIELDS: &[$crate::reflect::FieldDescriptor] = &[
                    $(
                        $crate::reflect::FieldDescriptor::new(
                            ::std::stringify!($field),
                            ::std::concat!("" $(, $tag)?),
                            !::std::stringify!($field_vis).is_empty(),
                        ),
                    )*
                ];
                FIELDS
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::reflect::Reflect> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&self.$field);
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn $crate::reflect::Reflect> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }
        }
    };
}
