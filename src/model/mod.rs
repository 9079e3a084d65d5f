//! The mapping tree: a registry of class mappings and the members they own.
//!
//! This module provides the in-memory representation of a set of obfuscation mappings. A
//! [`MappingSet`] owns top-level [`ClassMapping`]s; every class mapping owns inner classes,
//! [`FieldMapping`]s and [`MethodMapping`]s; methods own [`ParameterMapping`]s.
//!
//! # Key Components
//!
//! - [`MappingSet`] - The registry of top-level classes, plus type deobfuscation
//! - [`ClassMapping`] - A top-level or inner class and its member collections
//! - [`FieldMapping`], [`MethodMapping`], [`ParameterMapping`] - Member mappings
//! - [`Mapping`] - Behaviour shared by all four mapping kinds
//! - [`MappingBase`] - The record embedded in every mapping (names, docs, listeners)
//!
//! # Ownership
//!
//! Every entity is stored as an [`Arc`] inside its parent's keyed collection and holds only
//! [`std::sync::Weak`] handles to its owning registry and its parent, so the tree contains no
//! strong cycles. Removing a mapping detaches it from its parent collection; references that
//! were already handed out stay valid.
//!
//! # Thread Safety
//!
//! All mutation goes through `&self`. Collections are concurrent maps with atomic
//! insert-or-update, so two threads creating the same key always end up with one entity, with
//! the last supplied rename applied.
//!
//! # Examples
//!
//! ```rust
//! use mapscope::model::{Mapping, MappingSet};
//!
//! let mappings = MappingSet::new();
//! let ght = mappings.get_or_create_top_level_class_mapping("ght");
//! ght.set_deobfuscated_name("uk/jamierocks/Test");
//!
//! let ds = ght.get_or_create_inner_class_mapping("ds");
//! ds.set_deobfuscated_name("Example");
//!
//! assert_eq!(ds.full_deobfuscated_name(), "uk/jamierocks/Test$Example");
//! ```

mod class;
mod completion;
mod field;
mod method;
mod parameter;
mod set;

use std::{
    fmt,
    hash::Hash,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use dashmap::{mapref::entry::Entry, DashMap};

pub use class::{ClassMapping, ClassTarget};
pub use field::FieldMapping;
pub use method::MethodMapping;
pub use parameter::ParameterMapping;
pub use set::MappingSet;

/// Reference to a `MappingSet`
pub type MappingSetRc = Arc<MappingSet>;
/// Reference to a `ClassMapping`
pub type ClassMappingRc = Arc<ClassMapping>;
/// Reference to a `FieldMapping`
pub type FieldMappingRc = Arc<FieldMapping>;
/// Reference to a `MethodMapping`
pub type MethodMappingRc = Arc<MethodMapping>;
/// Reference to a `ParameterMapping`
pub type ParameterMappingRc = Arc<ParameterMapping>;

/// Callback invoked when a mapping is about to be renamed.
///
/// Receives the mapping (still carrying its old deobfuscated name) and the new name.
pub type RenameListener<M> = Arc<dyn Fn(&M, &str) + Send + Sync>;

/// Handle returned by [`Mapping::add_listener`], used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// The record shared by every mapping kind: its names, documentation and rename listeners.
pub struct MappingBase<M> {
    obfuscated_name: String,
    deobfuscated_name: RwLock<String>,
    javadoc: boxcar::Vec<String>,
    listeners: RwLock<Vec<(ListenerId, RenameListener<M>)>>,
    next_listener: AtomicUsize,
}

impl<M> MappingBase<M> {
    pub(crate) fn new(obfuscated_name: String, deobfuscated_name: String) -> Self {
        MappingBase {
            obfuscated_name,
            deobfuscated_name: RwLock::new(deobfuscated_name),
            javadoc: boxcar::Vec::new(),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicUsize::new(0),
        }
    }

    pub(crate) fn obfuscated_name(&self) -> &str {
        &self.obfuscated_name
    }

    pub(crate) fn deobfuscated_name(&self) -> String {
        read_lock!(self.deobfuscated_name).clone()
    }

    pub(crate) fn is_renamed(&self) -> bool {
        *read_lock!(self.deobfuscated_name) != self.obfuscated_name
    }

    /// Listeners run before the write and see the old name; a no-op rename notifies nobody.
    pub(crate) fn rename(&self, owner: &M, name: String) {
        if *read_lock!(self.deobfuscated_name) == name {
            return;
        }

        let listeners: Vec<RenameListener<M>> = with_read!(
            self.listeners,
            |listeners: &Vec<(ListenerId, RenameListener<M>)>| {
                listeners.iter().map(|(_, listener)| listener.clone()).collect()
            }
        );
        for listener in &listeners {
            listener(owner, &name);
        }

        *write_lock!(self.deobfuscated_name) = name;
    }

    pub(crate) fn add_listener(&self, listener: RenameListener<M>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        write_lock!(self.listeners).push((id, listener));
        id
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) -> bool {
        with_write!(
            self.listeners,
            |listeners: &mut Vec<(ListenerId, RenameListener<M>)>| {
                let before = listeners.len();
                listeners.retain(|(existing, _)| *existing != id);
                listeners.len() != before
            }
        )
    }

    pub(crate) fn javadoc(&self) -> Vec<String> {
        self.javadoc.iter().map(|(_, line)| line.clone()).collect()
    }

    pub(crate) fn add_javadoc(&self, line: String) {
        self.javadoc.push(line);
    }

    /// Copies documentation onto a freshly produced mapping; targets that already carry
    /// documentation are left alone.
    pub(crate) fn carry_javadoc<N>(&self, target: &MappingBase<N>) {
        if target.javadoc.count() > 0 {
            return;
        }
        for (_, line) in self.javadoc.iter() {
            target.javadoc.push(line.clone());
        }
    }
}

impl<M> fmt::Debug for MappingBase<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingBase")
            .field("obfuscated_name", &self.obfuscated_name)
            .field("deobfuscated_name", &self.deobfuscated_name())
            .finish_non_exhaustive()
    }
}

/// Behaviour shared by class, field, method and parameter mappings.
///
/// Names come in three flavours: the plain name stored on the mapping, the *simple* name
/// (without package or outer class), and the *full* name that prefixes the owner's full name.
pub trait Mapping: Send + Sync + Sized {
    /// The embedded shared record
    fn base(&self) -> &MappingBase<Self>;

    /// The obfuscated name of the construct being represented
    fn obfuscated_name(&self) -> &str {
        self.base().obfuscated_name()
    }

    /// The current deobfuscated name
    fn deobfuscated_name(&self) -> String {
        self.base().deobfuscated_name()
    }

    /// Rename the mapping.
    ///
    /// Registered listeners are called *before* the change is applied, so they observe the
    /// original name. Setting the current name again does nothing.
    fn set_deobfuscated_name(&self, name: &str) {
        self.base().rename(self, name.to_string());
    }

    /// The fully-qualified obfuscated name
    fn full_obfuscated_name(&self) -> String;

    /// The fully-qualified deobfuscated name
    fn full_deobfuscated_name(&self) -> String;

    /// The unqualified obfuscated name
    fn simple_obfuscated_name(&self) -> String {
        self.obfuscated_name().to_string()
    }

    /// The unqualified deobfuscated name
    fn simple_deobfuscated_name(&self) -> String {
        self.deobfuscated_name()
    }

    /// Returns `true` if the mapping renames its construct
    fn has_deobfuscated_name(&self) -> bool {
        self.base().is_renamed()
    }

    /// Documentation lines attached to the mapping
    fn javadoc(&self) -> Vec<String> {
        self.base().javadoc()
    }

    /// Append a documentation line
    fn add_javadoc(&self, line: impl Into<String>) {
        self.base().add_javadoc(line.into());
    }

    /// Register a rename listener
    fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Self, &str) + Send + Sync + 'static,
    {
        self.base().add_listener(Arc::new(listener))
    }

    /// Remove a previously registered listener, returns `false` if it was not registered
    fn remove_listener(&self, id: ListenerId) -> bool {
        self.base().remove_listener(id)
    }

    /// The registry this mapping belongs to, if it is still alive
    fn mappings(&self) -> Option<MappingSetRc>;
}

/// Fetch `key` from `map`, renaming an existing entry, or insert the mapping built by `create`.
///
/// Returns the live entity and whether it was created by this call.
pub(crate) fn fetch_or_insert<K, V>(
    map: &DashMap<K, Arc<V>>,
    key: K,
    deobfuscated_name: &str,
    create: impl FnOnce(&K) -> Arc<V>,
) -> (Arc<V>, bool)
where
    K: Eq + Hash,
    V: Mapping,
{
    match map.entry(key) {
        Entry::Occupied(entry) => {
            let existing = entry.get().clone();
            drop(entry);
            existing.set_deobfuscated_name(deobfuscated_name);
            (existing, false)
        }
        Entry::Vacant(entry) => {
            let created = create(entry.key());
            entry.insert(created.clone());
            (created, true)
        }
    }
}

/// Snapshot the values of a concurrent map, sorted by key.
pub(crate) fn sorted_values<K, V>(map: &DashMap<K, Arc<V>>) -> Vec<Arc<V>>
where
    K: Eq + Hash + Ord + Clone,
{
    let mut entries: Vec<(K, Arc<V>)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, value)| value).collect()
}

/// Compare two concurrent maps by key set and value equality.
pub(crate) fn maps_equal<K, V>(left: &DashMap<K, Arc<V>>, right: &DashMap<K, Arc<V>>) -> bool
where
    K: Eq + Hash,
    V: PartialEq,
{
    left.len() == right.len()
        && left.iter().all(|entry| {
            right
                .get(entry.key())
                .is_some_and(|other| **entry.value() == **other.value())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_listener_sees_old_name() {
        let mappings = MappingSet::new();
        let class = mappings.get_or_create_top_level_class_mapping("a");

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();
        class.add_listener(move |mapping: &ClassMapping, new_name| {
            sink.lock()
                .unwrap()
                .push((mapping.deobfuscated_name(), new_name.to_string()));
        });

        class.set_deobfuscated_name("com/example/Foo");
        class.set_deobfuscated_name("com/example/Foo");
        class.set_deobfuscated_name("com/example/Bar");

        let observed = observed.lock().unwrap();
        assert_eq!(
            *observed,
            vec![
                ("a".to_string(), "com/example/Foo".to_string()),
                ("com/example/Foo".to_string(), "com/example/Bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_remove_listener() {
        let mappings = MappingSet::new();
        let class = mappings.get_or_create_top_level_class_mapping("a");

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = class.add_listener(move |_: &ClassMapping, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        class.set_deobfuscated_name("b");
        assert!(class.remove_listener(id));
        assert!(!class.remove_listener(id));
        class.set_deobfuscated_name("c");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(class.deobfuscated_name(), "c");
    }

    #[test]
    fn test_javadoc_lines() {
        let mappings = MappingSet::new();
        let class = mappings.get_or_create_top_level_class_mapping("a");
        class.add_javadoc("First line");
        class.add_javadoc(String::from("Second line"));

        assert_eq!(class.javadoc(), vec!["First line", "Second line"]);
    }
}
