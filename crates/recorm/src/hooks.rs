//! Per-field accessors and mutators.
//!
//! An accessor transforms the raw value read through `Model::get`; a mutator replaces
//! the raw store performed by `Model::set` and may normalize or reject the value.
//! Registries are built once per entity type from [`Entity::register_hooks`] and
//! cached for the life of the process.

use crate::entity::Entity;
use crate::error::OrmResult;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Transforms a raw field value on read.
pub type Accessor<E> = fn(&E, Value) -> Value;

/// Stores a written value; an error rejects it.
pub type Mutator<E> = fn(&mut E, Value) -> OrmResult<()>;

/// Accessors and mutators of one entity type, keyed by attribute name.
pub struct HookRegistry<E> {
    accessors: HashMap<&'static str, Accessor<E>>,
    mutators: HashMap<&'static str, Mutator<E>>,
}

impl<E> Default for HookRegistry<E> {
    fn default() -> Self {
        Self {
            accessors: HashMap::new(),
            mutators: HashMap::new(),
        }
    }
}

impl<E> fmt::Debug for HookRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .field("mutators", &self.mutators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<E> HookRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessor(&mut self, name: &'static str, f: Accessor<E>) -> &mut Self {
        self.accessors.insert(name, f);
        self
    }

    pub fn mutator(&mut self, name: &'static str, f: Mutator<E>) -> &mut Self {
        self.mutators.insert(name, f);
        self
    }

    pub fn get_accessor(&self, name: &str) -> Option<Accessor<E>> {
        self.accessors.get(name).copied()
    }

    pub fn get_mutator(&self, name: &str) -> Option<Mutator<E>> {
        self.mutators.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty() && self.mutators.is_empty()
    }
}

type RegistryMap = HashMap<TypeId, &'static (dyn Any + Send + Sync)>;

fn registries() -> &'static RwLock<RegistryMap> {
    static REGISTRIES: OnceLock<RwLock<RegistryMap>> = OnceLock::new();
    REGISTRIES.get_or_init(|| RwLock::new(HashMap::new()))
}

impl<E: Entity> HookRegistry<E> {
    /// The registry of `E`, built on first use.
    pub fn for_type() -> &'static Self {
        let key = TypeId::of::<E>();
        let cached = registries()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied();

        let any = match cached {
            Some(any) => any,
            None => {
                let mut built = Self::new();
                E::register_hooks(&mut built);
                *registries()
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key)
                    .or_insert_with(|| {
                        let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(built));
                        leaked
                    })
            }
        };

        match any.downcast_ref::<Self>() {
            Some(registry) => registry,
            None => unreachable!("hook registry stored under a foreign TypeId"),
        }
    }
}
