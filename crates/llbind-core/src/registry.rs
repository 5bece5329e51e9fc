//! Named types declared so far in a run.

use indexmap::IndexMap;

use crate::target::TargetType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Struct,
    Alias,
    Enum,
}

/// A declared type, by target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub kind: NamedKind,
    pub underlying: TargetType,
}

/// Insertion-ordered registry consulted when resolving named references.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, NamedType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ty` unless its name is taken. Returns whether it was added.
    pub fn register(&mut self, ty: NamedType) -> bool {
        if self.types.contains_key(&ty.name) {
            return false;
        }
        self.types.insert(ty.name.clone(), ty);
        true
    }

    /// Replaces the underlying type of a registered name.
    pub fn update(&mut self, name: &str, underlying: TargetType) -> bool {
        match self.types.get_mut(name) {
            Some(ty) => {
                ty.underlying = underlying;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<NamedType> {
        self.types.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }
}
