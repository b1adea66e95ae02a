//! Declarative registration macros.

/// Register the field table of a record type.
///
/// Fields are listed in declaration order; `field => "key"` overrides the
/// key, which otherwise is the field name. Generates
/// [`Schema`](crate::schema::Schema) and [`Field`](crate::schema::Field)
/// impls. Must be invoked where the fields are visible.
#[macro_export]
macro_rules! schema {
    ($ty:ty { $($field:ident $(=> $key:literal)?),* $(,)? }) => {
        impl $crate::schema::Schema for $ty {
            fn schema() -> &'static $crate::schema::SchemaTable<Self> {
                static TABLE: ::std::sync::OnceLock<$crate::schema::SchemaTable<$ty>> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init(|| {
                    $crate::schema::SchemaTable::new(
                        stringify!($ty),
                        ::std::vec![$({
                            fn get(t: &$ty) -> &dyn $crate::schema::Field {
                                &t.$field
                            }
                            fn get_mut(t: &mut $ty) -> &mut dyn $crate::schema::Field {
                                &mut t.$field
                            }
                            $crate::schema::SchemaEntry::new(
                                $crate::__schema_key!($field $(, $key)?),
                                get,
                                get_mut,
                            )
                        }),*],
                    )
                })
            }
        }

        impl $crate::schema::Field for $ty {
            fn view(&self) -> $crate::schema::FieldRef<'_> {
                $crate::schema::FieldRef::Record(self)
            }

            fn view_mut(&mut self) -> $crate::schema::FieldMut<'_> {
                $crate::schema::FieldMut::Record(self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $key:literal) => {
        $key
    };
}

/// Register the value table of a fieldless enum.
///
/// Every variant that can occur at runtime must be listed; encoding an
/// unlisted variant is an error.
#[macro_export]
macro_rules! enum_schema {
    ($ty:ty { $($variant:ident => $key:literal),* $(,)? }) => {
        impl $crate::schema::EnumSchema for $ty {
            fn table() -> &'static $crate::schema::EnumValueTable<Self> {
                static TABLE: $crate::schema::EnumValueTable<$ty> =
                    $crate::schema::EnumValueTable::new(
                        stringify!($ty),
                        &[$((<$ty>::$variant, $key)),*],
                    );
                &TABLE
            }
        }

        impl $crate::schema::Field for $ty {
            fn view(&self) -> $crate::schema::FieldRef<'_> {
                $crate::schema::FieldRef::Enum(self)
            }

            fn view_mut(&mut self) -> $crate::schema::FieldMut<'_> {
                $crate::schema::FieldMut::Enum(self)
            }
        }
    };
}
