use std::{
    fmt,
    sync::{Arc, Weak},
};

use crossbeam_skiplist::SkipMap;

use crate::{
    merge::{MappingSetMerger, MergeConfig},
    model::{ClassMapping, ClassTarget, Mapping},
    signatures::{ArrayType, FieldSignature, FieldType, MethodDescriptor, MethodSignature, ObjectType, Type},
    Result,
};

/// The registry of top-level class mappings.
///
/// Classes are kept ordered by obfuscated name. A `MappingSet` is always handled through an
/// [`Arc`]; every mapping inside it keeps a weak handle back to it, used to translate types
/// into the deobfuscated namespace.
///
/// # Example
///
/// ```rust
/// use mapscope::model::{Mapping, MappingSet};
/// use mapscope::signatures::FieldType;
///
/// let mappings = MappingSet::new();
/// let outer = mappings.create_top_level_class_mapping("a", "com/example/Outer");
/// outer.create_inner_class_mapping("b", "Inner");
///
/// let mapped = mappings.deobfuscate_field_type(&FieldType::object("a$b$c"));
/// assert_eq!(mapped.to_string(), "Lcom/example/Outer$Inner$c;");
/// ```
pub struct MappingSet {
    self_ref: Weak<MappingSet>,
    top_level: SkipMap<String, Arc<ClassMapping>>,
}

impl MappingSet {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Arc<MappingSet> {
        Arc::new_cyclic(|self_ref| MappingSet {
            self_ref: self_ref.clone(),
            top_level: SkipMap::new(),
        })
    }

    /// Number of top-level class mappings
    #[must_use]
    pub fn len(&self) -> usize {
        self.top_level.len()
    }

    /// Returns `true` if there are no class mappings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Snapshot of all top-level class mappings, ordered by obfuscated name
    #[must_use]
    pub fn top_level_class_mappings(&self) -> Vec<Arc<ClassMapping>> {
        self.top_level
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Create a top-level class mapping, or rename the existing one.
    ///
    /// Both names are normalized from `.` to `/` form.
    pub fn create_top_level_class_mapping(
        &self,
        obfuscated: &str,
        deobfuscated: &str,
    ) -> Arc<ClassMapping> {
        let key = obfuscated.replace('.', "/");
        let entry = self.top_level.get_or_insert_with(key.clone(), || {
            ClassMapping::new_top_level(self.self_ref.clone(), &key, deobfuscated)
        });
        let mapping = entry.value().clone();
        drop(entry);

        mapping.set_deobfuscated_name(deobfuscated);
        mapping
    }

    /// Lookup a top-level class by obfuscated name
    #[must_use]
    pub fn get_top_level_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        self.top_level
            .get(obfuscated.replace('.', "/").as_str())
            .map(|entry| entry.value().clone())
    }

    /// Fetch a top-level class, creating an identity mapping if absent
    pub fn get_or_create_top_level_class_mapping(&self, obfuscated: &str) -> Arc<ClassMapping> {
        if let Some(existing) = self.get_top_level_class_mapping(obfuscated) {
            return existing;
        }
        self.create_top_level_class_mapping(obfuscated, obfuscated)
    }

    /// Returns `true` if a top-level class with this obfuscated name exists
    #[must_use]
    pub fn has_top_level_class_mapping(&self, obfuscated: &str) -> bool {
        self.top_level
            .contains_key(obfuscated.replace('.', "/").as_str())
    }

    /// Lookup any class by full obfuscated binary name, e.g. `a$b$c`
    #[must_use]
    pub fn get_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        let name = obfuscated.replace('.', "/");
        match name.rsplit_once('$') {
            Some((outer, inner)) => self.get_class_mapping(outer)?.get_inner_class_mapping(inner),
            None => self.get_top_level_class_mapping(&name),
        }
    }

    /// Resolve a class by full name, creating the last inner segment if its outer class is mapped.
    ///
    /// Top-level names are only looked up, never created.
    pub fn compute_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        let name = obfuscated.replace('.', "/");
        match name.rsplit_once('$') {
            Some((outer, inner)) => Some(
                self.get_class_mapping(outer)?
                    .get_or_create_inner_class_mapping(inner),
            ),
            None => self.get_top_level_class_mapping(&name),
        }
    }

    /// Fetch any class by full obfuscated name, creating every missing segment
    pub fn get_or_create_class_mapping(&self, obfuscated: &str) -> Arc<ClassMapping> {
        let name = obfuscated.replace('.', "/");
        match name.rsplit_once('$') {
            Some((outer, inner)) => self
                .get_or_create_class_mapping(outer)
                .get_or_create_inner_class_mapping(inner),
            None => self.get_or_create_top_level_class_mapping(&name),
        }
    }

    /// Remove the class with this full obfuscated name, top-level or inner
    pub fn remove_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        let name = obfuscated.replace('.', "/");
        match name.rsplit_once('$') {
            Some((outer, inner)) => self.get_class_mapping(outer)?.remove_inner_class_mapping(inner),
            None => self.top_level.remove(name.as_str()).map(|entry| entry.value().clone()),
        }
    }

    /// Remove this exact class mapping from wherever it is registered
    pub fn remove_class_mapping_entry(&self, mapping: &Arc<ClassMapping>) {
        if let Some(parent) = mapping.parent_class() {
            parent.remove_inner_class_mapping_entry(mapping);
            return;
        }

        let registered = self
            .get_top_level_class_mapping(mapping.obfuscated_name())
            .is_some_and(|existing| Arc::ptr_eq(&existing, mapping));
        if registered {
            self.top_level.remove(mapping.obfuscated_name());
        }
    }

    // ---------------------------------------------------------------------------------------
    // Deobfuscation
    // ---------------------------------------------------------------------------------------

    /// Translate a class name to the deobfuscated namespace.
    ///
    /// Segments are resolved left to right; the first unresolved segment and everything after
    /// it are kept as written. A name whose top-level segment is unknown is returned unchanged.
    #[must_use]
    pub fn deobfuscate_class_name(&self, obfuscated: &str) -> String {
        let mut segments = obfuscated.split('$');
        let Some(first) = segments.next() else {
            return obfuscated.to_string();
        };
        let Some(mut current) = self.get_top_level_class_mapping(first) else {
            return obfuscated.to_string();
        };

        let mut remaining = Vec::new();
        for segment in segments.by_ref() {
            match current.get_inner_class_mapping(segment) {
                Some(inner) => current = inner,
                None => {
                    remaining.push(segment);
                    break;
                }
            }
        }
        remaining.extend(segments);

        let mut result = current.full_deobfuscated_name();
        for segment in remaining {
            result.push('$');
            result.push_str(segment);
        }
        result
    }

    /// Translate a field type; only class references (including array components) change
    #[must_use]
    pub fn deobfuscate_field_type(&self, field_type: &FieldType) -> FieldType {
        match field_type {
            FieldType::Base(_) => field_type.clone(),
            FieldType::Object(object) => {
                FieldType::Object(ObjectType::new(self.deobfuscate_class_name(object.class_name())))
            }
            FieldType::Array(array) => FieldType::Array(ArrayType::new(
                array.dimensions(),
                self.deobfuscate_field_type(array.component()),
            )),
        }
    }

    /// Translate a return type
    #[must_use]
    pub fn deobfuscate_type(&self, value: &Type) -> Type {
        match value {
            Type::Void => Type::Void,
            Type::Field(field_type) => Type::Field(self.deobfuscate_field_type(field_type)),
        }
    }

    /// Translate every type in a method descriptor
    #[must_use]
    pub fn deobfuscate_descriptor(&self, descriptor: &MethodDescriptor) -> MethodDescriptor {
        MethodDescriptor::new(
            descriptor
                .params()
                .iter()
                .map(|param| self.deobfuscate_field_type(param))
                .collect(),
            self.deobfuscate_type(descriptor.return_type()),
        )
    }

    /// Translate the type of a field signature, keeping its name
    #[must_use]
    pub fn deobfuscate_field_signature(&self, signature: &FieldSignature) -> FieldSignature {
        FieldSignature::new(
            signature.name(),
            signature
                .field_type()
                .map(|field_type| self.deobfuscate_field_type(field_type)),
        )
    }

    /// Translate the descriptor of a method signature, keeping its name
    #[must_use]
    pub fn deobfuscate_method_signature(&self, signature: &MethodSignature) -> MethodSignature {
        MethodSignature::new(
            signature.name(),
            self.deobfuscate_descriptor(signature.descriptor()),
        )
    }

    // ---------------------------------------------------------------------------------------
    // Whole-set operations
    // ---------------------------------------------------------------------------------------

    /// Produce a new registry mapping deobfuscated names back to obfuscated ones
    #[must_use]
    pub fn reverse(&self) -> Arc<MappingSet> {
        self.reverse_into(&MappingSet::new())
    }

    /// Reverse every class into `target`, returning it
    pub fn reverse_into(&self, target: &Arc<MappingSet>) -> Arc<MappingSet> {
        for class in self.top_level_class_mappings() {
            class.reverse_into(ClassTarget::Set(target));
        }
        target.clone()
    }

    /// Produce a structurally equal, independent registry
    #[must_use]
    pub fn copy(&self) -> Arc<MappingSet> {
        let target = MappingSet::new();
        for class in self.top_level_class_mappings() {
            class.copy_into(ClassTarget::Set(&target));
        }
        target
    }

    /// Merge `with` onto this registry using the default configuration.
    ///
    /// See [`crate::merge`] for how entries of the two sets are paired up.
    ///
    /// # Errors
    /// Returns [`crate::Error::MergeFailed`] if any class failed to merge.
    pub fn merge(&self, with: &MappingSet) -> Result<Arc<MappingSet>> {
        self.merge_with_config(with, MergeConfig::default())
    }

    /// Merge `with` onto this registry
    ///
    /// # Errors
    /// Returns [`crate::Error::MergeFailed`] if any class failed to merge, or
    /// [`crate::Error::ThreadPool`] if the worker pool could not be started.
    pub fn merge_with_config(&self, with: &MappingSet, config: MergeConfig) -> Result<Arc<MappingSet>> {
        MappingSetMerger::new(self, with, config).merge()
    }
}

impl PartialEq for MappingSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.top_level.iter().all(|entry| {
                other
                    .get_top_level_class_mapping(entry.key())
                    .is_some_and(|mapping| **entry.value() == *mapping)
            })
    }
}

impl fmt::Debug for MappingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.top_level.iter().map(|entry| entry.value().clone()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_mappings;
    use std::thread;

    #[test]
    fn test_get_class_mapping_nested() {
        let mappings = sample_mappings();
        let inner = mappings.get_class_mapping("ght$ds$bbc").unwrap();
        assert_eq!(inner.full_deobfuscated_name(), "uk/jamierocks/Test$Example$Inner");

        assert!(mappings.get_class_mapping("ght$zz").is_none());
        assert!(mappings.get_class_mapping("nope$ds").is_none());
    }

    #[test]
    fn test_compute_creates_only_last_segment() {
        let mappings = sample_mappings();

        let created = mappings.compute_class_mapping("ght$ds$new").unwrap();
        assert_eq!(created.full_deobfuscated_name(), "uk/jamierocks/Test$Example$new");

        assert!(mappings.compute_class_mapping("ght$zz$new").is_none());
        assert!(mappings.compute_class_mapping("unknown").is_none());
        assert!(!mappings.has_top_level_class_mapping("unknown"));
    }

    #[test]
    fn test_top_level_normalizes_dots() {
        let mappings = MappingSet::new();
        let mapping = mappings.create_top_level_class_mapping("a.b", "com.example.Foo");
        assert_eq!(mapping.obfuscated_name(), "a/b");
        assert_eq!(mapping.deobfuscated_name(), "com/example/Foo");
        assert!(mappings.has_top_level_class_mapping("a.b"));
    }

    #[test]
    fn test_partial_deobfuscation() {
        let mappings = sample_mappings();

        assert_eq!(mappings.deobfuscate_class_name("ght$ds"), "uk/jamierocks/Test$Example");
        assert_eq!(mappings.deobfuscate_class_name("ght$xx$ds"), "uk/jamierocks/Test$xx$ds");
        assert_eq!(mappings.deobfuscate_class_name("zzz$ds"), "zzz$ds");

        let descriptor = MethodDescriptor::parse("(Lght$ds;[[Lght;I)Lzzz;").unwrap();
        assert_eq!(
            mappings.deobfuscate_descriptor(&descriptor).to_string(),
            "(Luk/jamierocks/Test$Example;[[Luk/jamierocks/Test;I)Lzzz;"
        );
    }

    #[test]
    fn test_remove_class_mapping() {
        let mappings = sample_mappings();
        let inner = mappings.get_class_mapping("ght$ds$bbc").unwrap();

        mappings.remove_class_mapping_entry(&inner);
        assert!(mappings.get_class_mapping("ght$ds$bbc").is_none());
        assert_eq!(inner.full_deobfuscated_name(), "uk/jamierocks/Test$Example$Inner");

        assert!(mappings.remove_class_mapping("ght").is_some());
        assert!(mappings.is_empty());
        assert!(mappings.remove_class_mapping("ght").is_none());
    }

    #[test]
    fn test_concurrent_creation_yields_one_entity() {
        let mappings = MappingSet::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let mappings = mappings.clone();
                thread::spawn(move || {
                    let class = mappings.create_top_level_class_mapping("a", &format!("Name{i}"));
                    let field = class.create_field_mapping(FieldSignature::untyped("f"), "field");
                    (class, field)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(mappings.len(), 1);
        let class = mappings.get_top_level_class_mapping("a").unwrap();
        for (created, field) in &results {
            assert!(Arc::ptr_eq(created, &class));
            assert!(Arc::ptr_eq(field, &results[0].1));
        }
        assert!(class.deobfuscated_name().starts_with("Name"));
        assert_eq!(class.field_mappings().len(), 1);
    }

    #[test]
    fn test_copy_and_reverse() {
        let mappings = sample_mappings();
        let copy = mappings.copy();
        assert_eq!(*copy, *mappings);

        let reversed = mappings.reverse();
        let class = reversed.get_class_mapping("uk/jamierocks/Test$Example").unwrap();
        assert_eq!(class.full_deobfuscated_name(), "ght$ds");
        assert_eq!(*reversed.reverse(), *mappings);
    }
}
