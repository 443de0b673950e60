//! Object structures (shapes).
//!
//! A structure is the ordered list of `(key, descriptor)` entries an object
//! has. Structures are immutable once published: adding a property produces
//! the parent plus one trailing entry, removing one produces a copy with the
//! entry excised. Additions are memoized on the parent so objects built by
//! the same sequence of definitions share a single structure.
//!
//! A structure stops participating in transition caching once a property has
//! been removed from its lineage or once it is put into dictionary mode;
//! every later structure derived from it is private to one object.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::descriptor::StructurePropertyDescriptor;
use crate::value::{CheapClone, PropertyKey};

/// Shared reference to an immutable structure
pub type StructureRef = Rc<Structure>;

/// Default entry count above which a key index is built
pub const DEFAULT_INDEX_THRESHOLD: usize = 8;

/// Cache size at which dead transitions are first swept; sweeps repeat at
/// every power of two above it.
const TRANSITION_SWEEP_THRESHOLD: usize = 32;

static NEXT_STRUCTURE_ID: AtomicU64 = AtomicU64::new(1);

fn next_structure_id() -> u64 {
    NEXT_STRUCTURE_ID.fetch_add(1, Ordering::Relaxed)
}

/// One entry of a structure
#[derive(Debug, Clone)]
pub struct StructureItem {
    pub key: PropertyKey,
    pub descriptor: StructurePropertyDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransitionKey {
    key: PropertyKey,
    descriptor: StructurePropertyDescriptor,
}

#[derive(Debug)]
pub struct Structure {
    id: u64,
    items: Vec<StructureItem>,
    /// Key to ordinal, present once the entry count exceeds `index_threshold`
    index: Option<HashMap<PropertyKey, usize, FxBuildHasher>>,
    index_threshold: usize,
    has_index_property_name: bool,
    /// Shares transitions with other objects
    cacheable: bool,
    dictionary: bool,
    transitions: RefCell<FxHashMap<TransitionKey, Weak<Structure>>>,
}

impl Structure {
    /// Empty structure that new objects start from
    pub fn root(index_threshold: usize) -> StructureRef {
        Rc::new(Self::build(Vec::new(), index_threshold, true, false))
    }

    fn build(
        items: Vec<StructureItem>,
        index_threshold: usize,
        cacheable: bool,
        dictionary: bool,
    ) -> Self {
        let index = (items.len() > index_threshold).then(|| {
            let mut map = HashMap::with_capacity_and_hasher(items.len(), FxBuildHasher);
            for (ordinal, item) in items.iter().enumerate() {
                map.insert(item.key.cheap_clone(), ordinal);
            }
            map
        });
        let has_index_property_name = items.iter().any(|item| item.key.is_index());
        Self {
            id: next_structure_id(),
            items,
            index,
            index_threshold,
            has_index_property_name,
            cacheable,
            dictionary,
            transitions: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn property_count(&self) -> usize {
        self.items.len()
    }

    pub fn has_index_property_name(&self) -> bool {
        self.has_index_property_name
    }

    pub fn is_dictionary(&self) -> bool {
        self.dictionary
    }

    /// Whether additions from this structure are shared through the transition cache
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Ordinal of `key`, if present
    pub fn find_property(&self, key: &PropertyKey) -> Option<usize> {
        if let Some(index) = &self.index {
            return index.get(key).copied();
        }
        if key.is_index() && !self.has_index_property_name {
            return None;
        }
        self.items.iter().position(|item| &item.key == key)
    }

    pub fn read_property(&self, ordinal: usize) -> Option<&StructureItem> {
        self.items.get(ordinal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructureItem> {
        self.items.iter()
    }

    /// Live transitions cached on this structure
    pub fn transition_count(&self) -> usize {
        self.transitions
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Structure with one more trailing entry.
    ///
    /// The caller guarantees `key` is not already present.
    pub fn add_property(
        self: &Rc<Self>,
        key: PropertyKey,
        descriptor: StructurePropertyDescriptor,
    ) -> StructureRef {
        if !self.cacheable {
            return Rc::new(self.with_item(key, descriptor));
        }

        let transition = TransitionKey {
            key: key.cheap_clone(),
            descriptor,
        };
        if let Some(existing) = self
            .transitions
            .borrow()
            .get(&transition)
            .and_then(Weak::upgrade)
        {
            log::trace!(
                "structure {} -> {}: reused transition for '{}'",
                self.id,
                existing.id,
                key
            );
            return existing;
        }

        let next = Rc::new(self.with_item(key, descriptor));
        log::trace!(
            "structure {} -> {}: new transition for '{}'",
            self.id,
            next.id,
            transition.key
        );
        let mut transitions = self.transitions.borrow_mut();
        let cached = transitions.len();
        if cached >= TRANSITION_SWEEP_THRESHOLD && cached.is_power_of_two() {
            transitions.retain(|_, target| target.strong_count() > 0);
            log::trace!(
                "structure {}: swept {} dead transitions",
                self.id,
                cached - transitions.len()
            );
        }
        transitions.insert(transition, Rc::downgrade(&next));
        drop(transitions);
        next
    }

    fn with_item(&self, key: PropertyKey, descriptor: StructurePropertyDescriptor) -> Structure {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(StructureItem { key, descriptor });
        Self::build(items, self.index_threshold, self.cacheable, self.dictionary)
    }

    /// Structure with the entry at `ordinal` excised; later ordinals shift down.
    ///
    /// The result never shares transitions.
    pub fn remove_property(&self, ordinal: usize) -> StructureRef {
        let items: Vec<StructureItem> = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ordinal)
            .map(|(_, item)| item.clone())
            .collect();
        let next = Rc::new(Self::build(
            items,
            self.index_threshold,
            false,
            self.dictionary,
        ));
        log::trace!(
            "structure {} -> {}: removed ordinal {}",
            self.id,
            next.id,
            ordinal
        );
        next
    }

    /// Private copy in dictionary mode
    pub fn to_dictionary(&self) -> StructureRef {
        Rc::new(Self::build(
            self.items.clone(),
            self.index_threshold,
            false,
            true,
        ))
    }
}
