//! Schema registry - per-type field tables that drive every codec.
//!
//! A record type registers an ordered table of `(key, accessor)` pairs
//! once, with the [`schema!`](crate::schema!) macro. An enum registers a
//! bidirectional `(value, key)` table with
//! [`enum_schema!`](crate::enum_schema!). Codecs only ever walk these
//! tables; there is no per-type code in any encoder or decoder.
//!
//! ```
//! use asset_schema::{schema, enum_schema};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! enum Quality { #[default] Low, High }
//! enum_schema!(Quality { Low => "low", High => "high" });
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Video { width: u32, height: u32, quality: Quality }
//! schema!(Video { width, height, quality });
//! ```

mod field;
mod impls;
mod macros;

pub use field::*;

use std::fmt;

use crate::util::{Error, Result};

/// Accessor pair: given an instance, borrow one of its fields.
pub struct Accessor<T> {
    get: fn(&T) -> &dyn Field,
    get_mut: fn(&mut T) -> &mut dyn Field,
}

impl<T> Accessor<T> {
    /// Borrow the field.
    #[inline]
    pub fn get<'a>(&self, instance: &'a T) -> &'a dyn Field {
        (self.get)(instance)
    }

    /// Mutably borrow the field.
    #[inline]
    pub fn get_mut<'a>(&self, instance: &'a mut T) -> &'a mut dyn Field {
        (self.get_mut)(instance)
    }
}

/// One schema table row.
pub struct SchemaEntry<T> {
    key: &'static str,
    accessor: Accessor<T>,
}

impl<T> SchemaEntry<T> {
    /// Create an entry from a key and an accessor pair.
    pub fn new(
        key: &'static str,
        get: fn(&T) -> &dyn Field,
        get_mut: fn(&mut T) -> &mut dyn Field,
    ) -> Self {
        Self {
            key,
            accessor: Accessor { get, get_mut },
        }
    }

    /// Field key.
    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Field accessor.
    #[inline]
    pub fn accessor(&self) -> &Accessor<T> {
        &self.accessor
    }
}

/// Ordered field table of a record type `T`.
///
/// Order is significant for positional formats (binary, debug text) and
/// irrelevant for keyed ones (JSON, INI). Built once per type.
pub struct SchemaTable<T> {
    type_name: &'static str,
    entries: Vec<SchemaEntry<T>>,
}

impl<T> SchemaTable<T> {
    /// Build a table. Keys must be unique.
    pub fn new(type_name: &'static str, entries: Vec<SchemaEntry<T>>) -> Self {
        debug_assert!(
            entries
                .iter()
                .enumerate()
                .all(|(i, e)| entries[..i].iter().all(|p| p.key != e.key)),
            "duplicate key in schema of {}",
            type_name
        );
        Self { type_name, entries }
    }

    /// Name of the record type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    #[inline]
    pub fn entries(&self) -> &[SchemaEntry<T>] {
        &self.entries
    }

    /// Returns true if a field named `name` exists.
    pub fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Index of the field named `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == name)
    }

    /// Apply `f` to field `index` of `instance`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn call<R>(&self, index: usize, instance: &T, f: impl FnOnce(&dyn Field) -> R) -> R {
        f(self.entries[index].accessor.get(instance))
    }

    /// Apply `f` to mutable field `index` of `instance`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn call_mut<R>(&self, index: usize, instance: &mut T, f: impl FnOnce(&mut dyn Field) -> R) -> R {
        f(self.entries[index].accessor.get_mut(instance))
    }

    /// Apply `f` to the mutable field named `name`.
    ///
    /// Callers iterating untrusted keys should use [`SchemaTable::find`]
    /// and skip misses instead.
    pub fn call_named<R>(
        &self,
        name: &str,
        instance: &mut T,
        f: impl FnOnce(&mut dyn Field) -> R,
    ) -> Result<R> {
        let index = self.find(name).ok_or_else(|| Error::UnknownField {
            type_name: self.type_name,
            key: name.to_string(),
        })?;
        Ok(self.call_mut(index, instance, f))
    }

    /// Visit every field in declaration order, stopping at the first error.
    pub fn for_each_member(
        &self,
        instance: &T,
        mut f: impl FnMut(&'static str, &dyn Field) -> Result<()>,
    ) -> Result<()> {
        for entry in &self.entries {
            f(entry.key, entry.accessor.get(instance))?;
        }
        Ok(())
    }

    /// Mutable counterpart of [`SchemaTable::for_each_member`].
    pub fn for_each_member_mut(
        &self,
        instance: &mut T,
        mut f: impl FnMut(&'static str, &mut dyn Field) -> Result<()>,
    ) -> Result<()> {
        for entry in &self.entries {
            f(entry.key, entry.accessor.get_mut(instance))?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for SchemaTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTable")
            .field("type_name", &self.type_name)
            .field("keys", &self.entries.iter().map(|e| e.key).collect::<Vec<_>>())
            .finish()
    }
}

/// A record type with a registered field table.
pub trait Schema: Sized + 'static {
    /// The table, built on first use.
    fn schema() -> &'static SchemaTable<Self>;
}

impl<T: Schema> Record for T {
    fn record_name(&self) -> &'static str {
        T::schema().type_name()
    }

    fn field_count(&self) -> usize {
        T::schema().len()
    }

    fn key(&self, index: usize) -> &'static str {
        T::schema().entries()[index].key()
    }

    fn find(&self, key: &str) -> Option<usize> {
        T::schema().find(key)
    }

    fn field(&self, index: usize) -> &dyn Field {
        T::schema().entries()[index].accessor().get(self)
    }

    fn field_mut(&mut self, index: usize) -> &mut dyn Field {
        T::schema().entries()[index].accessor().get_mut(self)
    }
}

/// Bidirectional map between enum values and their canonical keys.
pub struct EnumValueTable<E: 'static> {
    name: &'static str,
    entries: &'static [(E, &'static str)],
}

impl<E: Copy + PartialEq + 'static> EnumValueTable<E> {
    /// Build a table; usable in `static` initializers.
    pub const fn new(name: &'static str, entries: &'static [(E, &'static str)]) -> Self {
        Self { name, entries }
    }

    /// Name of the enum type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `(value, key)` pairs in declaration order.
    #[inline]
    pub fn entries(&self) -> &'static [(E, &'static str)] {
        self.entries
    }

    /// Key of `value`.
    pub fn key_of(&self, value: E) -> Option<&'static str> {
        self.entries.iter().find(|(v, _)| *v == value).map(|(_, k)| *k)
    }

    /// Value named `key`.
    pub fn value_of(&self, key: &str) -> Option<E> {
        self.entries.iter().find(|(_, k)| *k == key).map(|(v, _)| *v)
    }

    /// Position of `value` in the table.
    pub fn ordinal_of(&self, value: E) -> Option<usize> {
        self.entries.iter().position(|(v, _)| *v == value)
    }

    /// Value at table position `ordinal`.
    pub fn by_ordinal(&self, ordinal: usize) -> Option<E> {
        self.entries.get(ordinal).map(|(v, _)| *v)
    }
}

/// An enum type with a registered value table.
pub trait EnumSchema: Copy + PartialEq + Sized + 'static {
    /// The table.
    fn table() -> &'static EnumValueTable<Self>;
}

impl<E: EnumSchema> EnumField for E {
    fn enum_name(&self) -> &'static str {
        E::table().name()
    }

    fn key(&self) -> Option<&'static str> {
        E::table().key_of(*self)
    }

    fn ordinal(&self) -> Option<usize> {
        E::table().ordinal_of(*self)
    }

    fn set_key(&mut self, key: &str) -> Result<()> {
        *self = E::table().value_of(key).ok_or_else(|| Error::UnknownEnumKey {
            enum_name: E::table().name(),
            key: key.to_string(),
        })?;
        Ok(())
    }

    fn set_ordinal(&mut self, ordinal: usize) -> Result<()> {
        *self = E::table().by_ordinal(ordinal).ok_or_else(|| Error::UnknownEnumKey {
            enum_name: E::table().name(),
            key: format!("#{}", ordinal),
        })?;
        Ok(())
    }
}

/// Key of an enum value for encoders; a value missing from its table is a
/// structural error.
pub(crate) fn enum_key(e: &dyn EnumField) -> Result<&'static str> {
    e.key().ok_or_else(|| Error::UnknownEnumKey {
        enum_name: e.enum_name(),
        key: "<unlisted variant>".to_string(),
    })
}
