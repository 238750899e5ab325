//! Process-wide registry mapping stable indices to type descriptors.
//!
//! Built-in descriptors occupy indices 1 through 32. Custom descriptors are
//! registered in owning/no-copy pairs after them. Call [`crate::init`] (or any
//! registry function) before sharing containers across threads so built-in
//! registration happens on a known thread.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::builtin::BUILTINS;
use super::descriptor::{CompareFn, HashFn, Ownership, TypeDescriptor};
use super::value::ValueKind;
use crate::error::{CollectionError, Result};

/// Index ↔ descriptor table.
pub struct TypeRegistry {
    descriptors: RwLock<Vec<&'static TypeDescriptor>>,
}

static REGISTRY: Lazy<TypeRegistry> = Lazy::new(|| {
    log::debug!("registering {} built-in type descriptors", BUILTINS.len());
    TypeRegistry {
        descriptors: RwLock::new(BUILTINS.to_vec()),
    }
});

/// The process-wide registry.
pub fn registry() -> &'static TypeRegistry {
    &REGISTRY
}

impl TypeRegistry {
    /// Descriptor registered at `index`, if any. Indices start at 1.
    pub fn get(&self, index: i16) -> Option<&'static TypeDescriptor> {
        if index < 1 {
            return None;
        }
        self.descriptors.read().get(index as usize - 1).copied()
    }

    /// Descriptor registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.descriptors
            .read()
            .iter()
            .copied()
            .find(|descriptor| descriptor.name() == name)
    }

    /// Number of registered descriptors, counting both members of each pair.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Always false; the built-ins are registered on first access.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Register a custom descriptor pair and return its owning member.
    ///
    /// The descriptor reuses `kind`'s representation and wire encoding while
    /// ordering values with `compare` and, when given, bucketing them with
    /// `hash`. Registered descriptors live for the rest of the process.
    pub fn register(
        &self,
        name: &str,
        kind: ValueKind,
        compare: CompareFn,
        hash: Option<HashFn>,
    ) -> Result<&'static TypeDescriptor> {
        let shared_name = format!("{}_no_copy", name);
        let mut descriptors = self.descriptors.write();
        if descriptors
            .iter()
            .any(|d| d.name() == name || d.name() == shared_name)
        {
            return Err(CollectionError::invalid_argument(format!(
                "type '{}' is already registered",
                name
            )));
        }

        let index = i16::try_from(descriptors.len() + 1)
            .ok()
            .filter(|index| *index < i16::MAX)
            .ok_or_else(|| CollectionError::invalid_argument("type registry is full"))?;

        let owned_name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let shared_name: &'static str = Box::leak(shared_name.into_boxed_str());
        let owned: &'static TypeDescriptor = Box::leak(Box::new(TypeDescriptor::new(
            owned_name,
            kind,
            Ownership::Owned,
            index,
            compare,
            hash,
        )));
        let shared: &'static TypeDescriptor = Box::leak(Box::new(TypeDescriptor::new(
            shared_name,
            kind,
            Ownership::Shared,
            index + 1,
            compare,
            hash,
        )));
        descriptors.push(owned);
        descriptors.push(shared);

        log::debug!("registered type '{}' ({}) at index {}", owned_name, kind, index);
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin::*;
    use crate::types::Value;
    use std::cmp::Ordering;

    fn reverse_compare(a: &Value<'_>, b: &Value<'_>) -> Ordering {
        crate::types::compare_values(b, a)
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(registry().get(25), Some(&TYPE_STRING));
        assert_eq!(registry().get(26), Some(&TYPE_STRING_NO_COPY));
        assert!(registry().get(0).is_none());
        assert!(registry().get(-3).is_none());
        assert!(registry().get(i16::MAX).is_none());
        assert_eq!(registry().lookup("i64"), Some(&TYPE_I64));
        assert!(registry().len() >= 32);
        assert!(!registry().is_empty());
    }

    #[test]
    fn test_register_custom_pair() {
        let descriptor = registry()
            .register("registry_test_reversed_i32", ValueKind::I32, reverse_compare, None)
            .unwrap();
        assert!(descriptor.index() > 32);
        assert_eq!(descriptor.index() % 2, 1);
        assert_eq!(descriptor.no_copy().index(), descriptor.index() + 1);
        assert_eq!(descriptor.no_copy().owning(), descriptor);
        assert_eq!(registry().get(descriptor.index()), Some(descriptor));
        assert_eq!(
            descriptor.compare(&Value::I32(1), &Value::I32(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        registry()
            .register("registry_test_duplicate", ValueKind::Str, reverse_compare, None)
            .unwrap();
        let err = registry()
            .register("registry_test_duplicate", ValueKind::Str, reverse_compare, None)
            .unwrap_err();
        assert!(matches!(err, CollectionError::InvalidArgument { .. }));
        assert!(registry().register("string", ValueKind::Str, reverse_compare, None).is_err());
    }
}
