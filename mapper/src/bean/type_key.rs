use std::any::Any;
use std::any::TypeId;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

/// Runtime identity of a Rust type, paired with its name for diagnostics
#[derive(Clone, Copy)]
pub struct TypeKey {
    id:   TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id:   TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this key identifies `T`
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_compare_by_type_identity() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<&'static str>());
        assert!(TypeKey::of::<i64>().is::<i64>());
        assert!(!TypeKey::of::<i64>().is::<i32>());
    }
}
