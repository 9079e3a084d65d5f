use std::{
    collections::HashMap,
    fmt,
    sync::{atomic::AtomicBool, Arc, Weak},
};

use dashmap::DashMap;

use crate::{
    model::{
        fetch_or_insert, maps_equal, sorted_values, FieldMapping, Mapping, MappingBase,
        MappingSet, MappingSetRc, MethodMapping,
    },
    signatures::{FieldSignature, MethodSignature},
    Result,
};

/// Where a class mapping is placed: directly in a registry, or inside another class.
#[derive(Clone, Copy)]
pub enum ClassTarget<'a> {
    /// Create a top-level class in the registry
    Set(&'a MappingSet),
    /// Create an inner class of the given class
    Class(&'a ClassMapping),
}

impl ClassTarget<'_> {
    /// Create (or fetch and rename) a class mapping at this location
    pub fn create_class_mapping(&self, obfuscated: &str, deobfuscated: &str) -> Arc<ClassMapping> {
        match self {
            ClassTarget::Set(set) => set.create_top_level_class_mapping(obfuscated, deobfuscated),
            ClassTarget::Class(class) => class.create_inner_class_mapping(obfuscated, deobfuscated),
        }
    }
}

/// A mapping for a class, either top-level or nested in another class.
///
/// Top-level classes use `/`-separated internal names (e.g. `com/example/Foo`). Inner classes
/// store only their own name segment; their full names are built by joining onto the outer
/// class with `$`.
///
/// # Example
///
/// ```rust
/// use mapscope::model::{Mapping, MappingSet};
///
/// let mappings = MappingSet::new();
/// let outer = mappings.create_top_level_class_mapping("a", "com.example.Outer");
/// let inner = outer.create_inner_class_mapping("1", "com/example/Outer$Inner");
///
/// assert_eq!(outer.deobfuscated_name(), "com/example/Outer");
/// assert_eq!(inner.deobfuscated_name(), "Inner");
/// assert_eq!(inner.full_obfuscated_name(), "a$1");
/// assert_eq!(inner.simple_obfuscated_name(), "");
/// ```
pub struct ClassMapping {
    base: MappingBase<ClassMapping>,
    self_ref: Weak<ClassMapping>,
    mappings: Weak<MappingSet>,
    /// `None` for top-level classes
    parent: Option<Weak<ClassMapping>>,
    fields: DashMap<FieldSignature, Arc<FieldMapping>>,
    fields_by_name: DashMap<String, Arc<FieldMapping>>,
    methods: DashMap<MethodSignature, Arc<MethodMapping>>,
    inner_classes: DashMap<String, Arc<ClassMapping>>,
    pub(crate) completed: AtomicBool,
}

impl ClassMapping {
    pub(crate) fn new_top_level(
        mappings: Weak<MappingSet>,
        obfuscated: &str,
        deobfuscated: &str,
    ) -> Arc<ClassMapping> {
        Arc::new_cyclic(|self_ref| ClassMapping {
            base: MappingBase::new(obfuscated.replace('.', "/"), deobfuscated.replace('.', "/")),
            self_ref: self_ref.clone(),
            mappings,
            parent: None,
            fields: DashMap::new(),
            fields_by_name: DashMap::new(),
            methods: DashMap::new(),
            inner_classes: DashMap::new(),
            completed: AtomicBool::new(false),
        })
    }

    fn new_inner(&self, obfuscated: &str, deobfuscated: &str) -> Arc<ClassMapping> {
        Arc::new_cyclic(|self_ref| ClassMapping {
            base: MappingBase::new(obfuscated.to_string(), strip_outer(deobfuscated).to_string()),
            self_ref: self_ref.clone(),
            mappings: self.mappings.clone(),
            parent: Some(self.self_ref.clone()),
            fields: DashMap::new(),
            fields_by_name: DashMap::new(),
            methods: DashMap::new(),
            inner_classes: DashMap::new(),
            completed: AtomicBool::new(false),
        })
    }

    /// Returns `true` if this mapping lives directly in the registry
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if this mapping is nested in another class
    #[must_use]
    pub fn is_inner(&self) -> bool {
        self.parent.is_some()
    }

    /// The enclosing class of an inner class
    #[must_use]
    pub fn parent_class(&self) -> Option<Arc<ClassMapping>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// The obfuscated package, e.g. `com/example` for `com/example/Foo`
    #[must_use]
    pub fn obfuscated_package_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => parent.obfuscated_package_name(),
            None => package_of(self.obfuscated_name()).to_string(),
        }
    }

    /// The deobfuscated package
    #[must_use]
    pub fn deobfuscated_package_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => parent.deobfuscated_package_name(),
            None => package_of(&self.deobfuscated_name()).to_string(),
        }
    }

    /// Returns `true` if this class or any of its members, parameters or inner classes rename
    /// something
    #[must_use]
    pub fn has_mappings(&self) -> bool {
        self.has_deobfuscated_name()
            || self.fields.iter().any(|f| f.value().has_deobfuscated_name())
            || self.methods.iter().any(|m| m.value().has_mappings())
            || self.inner_classes.iter().any(|c| c.value().has_mappings())
    }

    // ---------------------------------------------------------------------------------------
    // Fields
    // ---------------------------------------------------------------------------------------

    /// All field mappings, ordered by signature
    #[must_use]
    pub fn field_mappings(&self) -> Vec<Arc<FieldMapping>> {
        sorted_values(&self.fields)
    }

    /// Field mappings indexed by obfuscated name, including fields inherited through completion
    #[must_use]
    pub fn field_mappings_by_name(&self) -> HashMap<String, Arc<FieldMapping>> {
        self.fields_by_name
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Create a field mapping, or rename the existing one with the same signature
    pub fn create_field_mapping(
        &self,
        signature: FieldSignature,
        deobfuscated: &str,
    ) -> Arc<FieldMapping> {
        let (mapping, created) =
            fetch_or_insert(&self.fields, signature, deobfuscated, |signature| {
                Arc::new(FieldMapping::new(
                    self.self_ref.clone(),
                    self.mappings.clone(),
                    signature.clone(),
                    deobfuscated,
                ))
            });
        if created {
            self.fields_by_name
                .insert(mapping.obfuscated_name().to_string(), mapping.clone());
        }
        mapping
    }

    /// Resolve the field mapping for `signature` through [`Self::compute_field_mapping`],
    /// creating an identity mapping if nothing matches.
    ///
    /// A typed signature inherits the name of an untyped mapping with the same obfuscated name,
    /// and an untyped signature resolves to whichever mapping is indexed under its name.
    pub fn get_or_create_field_mapping(&self, signature: FieldSignature) -> Arc<FieldMapping> {
        if let Some(existing) = self.compute_field_mapping(&signature) {
            return existing;
        }
        let name = signature.name().to_string();
        self.create_field_mapping(signature, &name)
    }

    /// Fetch or create an untyped field mapping
    pub fn get_or_create_field_mapping_by_name(&self, name: &str) -> Arc<FieldMapping> {
        self.get_or_create_field_mapping(FieldSignature::untyped(name))
    }

    /// Fetch or create a typed field mapping from a name and descriptor text
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a field type.
    pub fn get_or_create_field_mapping_of(
        &self,
        name: &str,
        descriptor: &str,
    ) -> Result<Arc<FieldMapping>> {
        Ok(self.get_or_create_field_mapping(FieldSignature::of(name, descriptor)?))
    }

    /// Exact lookup by signature
    #[must_use]
    pub fn get_field_mapping(&self, signature: &FieldSignature) -> Option<Arc<FieldMapping>> {
        self.fields.get(signature).map(|entry| entry.value().clone())
    }

    /// Lookup by obfuscated name, ignoring types
    #[must_use]
    pub fn get_field_mapping_by_name(&self, name: &str) -> Option<Arc<FieldMapping>> {
        self.fields_by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Resolve a field, falling back from a typed signature to an untyped mapping.
    ///
    /// An untyped signature is looked up by name. A typed signature returns the exact entry if
    /// one exists; otherwise, if an untyped mapping of the same name exists, a typed mapping
    /// carrying its deobfuscated name is materialized under `signature` and returned.
    pub fn compute_field_mapping(&self, signature: &FieldSignature) -> Option<Arc<FieldMapping>> {
        if signature.field_type().is_none() {
            return self.get_field_mapping_by_name(signature.name());
        }
        if let Some(existing) = self.get_field_mapping(signature) {
            return Some(existing);
        }

        let untyped = self.get_field_mapping(&signature.without_type())?;
        let typed = Arc::new(FieldMapping::new(
            untyped.parent.clone(),
            self.mappings.clone(),
            signature.clone(),
            &untyped.deobfuscated_name(),
        ));
        let entry = self.fields.entry(signature.clone()).or_insert(typed);
        Some(entry.value().clone())
    }

    /// Returns `true` if a mapping with exactly this signature exists
    #[must_use]
    pub fn has_field_mapping(&self, signature: &FieldSignature) -> bool {
        self.fields.contains_key(signature)
    }

    /// Returns `true` if a field mapping with this obfuscated name is known on this class
    #[must_use]
    pub fn has_field_mapping_by_name(&self, name: &str) -> bool {
        self.fields_by_name.contains_key(name)
    }

    /// Remove the field mapping with this signature
    pub fn remove_field_mapping(&self, signature: &FieldSignature) -> Option<Arc<FieldMapping>> {
        let (_, removed) = self.fields.remove(signature)?;
        self.fields_by_name
            .remove_if(removed.obfuscated_name(), |_, indexed| {
                Arc::ptr_eq(indexed, &removed)
            });
        Some(removed)
    }

    /// Remove every field mapping with this obfuscated name, typed or not
    pub fn remove_field_mapping_by_name(&self, name: &str) {
        self.fields.retain(|signature, _| signature.name() != name);
        self.fields_by_name.remove(name);
    }

    /// Remove this exact field mapping, wherever it is indexed
    pub fn remove_field_mapping_entry(&self, mapping: &Arc<FieldMapping>) {
        self.fields.retain(|_, existing| !Arc::ptr_eq(existing, mapping));
        self.fields_by_name
            .retain(|_, existing| !Arc::ptr_eq(existing, mapping));
    }

    pub(crate) fn insert_field_if_absent(&self, mapping: Arc<FieldMapping>) {
        self.fields_by_name
            .entry(mapping.obfuscated_name().to_string())
            .or_insert_with(|| mapping.clone());
        self.fields
            .entry(mapping.signature().clone())
            .or_insert(mapping);
    }

    // ---------------------------------------------------------------------------------------
    // Methods
    // ---------------------------------------------------------------------------------------

    /// All method mappings, ordered by signature
    #[must_use]
    pub fn method_mappings(&self) -> Vec<Arc<MethodMapping>> {
        sorted_values(&self.methods)
    }

    /// Create a method mapping, or rename the existing one with the same signature
    pub fn create_method_mapping(
        &self,
        signature: MethodSignature,
        deobfuscated: &str,
    ) -> Arc<MethodMapping> {
        let (mapping, _) = fetch_or_insert(&self.methods, signature, deobfuscated, |signature| {
            MethodMapping::new(
                self.self_ref.clone(),
                self.mappings.clone(),
                signature.clone(),
                deobfuscated,
            )
        });
        mapping
    }

    /// Fetch the method mapping for `signature`, creating an identity mapping if absent
    pub fn get_or_create_method_mapping(&self, signature: MethodSignature) -> Arc<MethodMapping> {
        if let Some(existing) = self.get_method_mapping(&signature) {
            return existing;
        }
        let name = signature.name().to_string();
        self.create_method_mapping(signature, &name)
    }

    /// Fetch or create a method mapping from a name and descriptor text
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a method descriptor.
    pub fn get_or_create_method_mapping_of(
        &self,
        name: &str,
        descriptor: &str,
    ) -> Result<Arc<MethodMapping>> {
        Ok(self.get_or_create_method_mapping(MethodSignature::of(name, descriptor)?))
    }

    /// Exact lookup by signature
    #[must_use]
    pub fn get_method_mapping(&self, signature: &MethodSignature) -> Option<Arc<MethodMapping>> {
        self.methods.get(signature).map(|entry| entry.value().clone())
    }

    /// Returns `true` if a mapping with this signature exists
    #[must_use]
    pub fn has_method_mapping(&self, signature: &MethodSignature) -> bool {
        self.methods.contains_key(signature)
    }

    /// Remove the method mapping with this signature
    pub fn remove_method_mapping(&self, signature: &MethodSignature) -> Option<Arc<MethodMapping>> {
        self.methods.remove(signature).map(|(_, removed)| removed)
    }

    /// Remove this exact method mapping, wherever it is indexed
    pub fn remove_method_mapping_entry(&self, mapping: &Arc<MethodMapping>) {
        self.methods
            .retain(|_, existing| !Arc::ptr_eq(existing, mapping));
    }

    pub(crate) fn insert_method_if_absent(
        &self,
        signature: MethodSignature,
        mapping: Arc<MethodMapping>,
    ) {
        self.methods.entry(signature).or_insert(mapping);
    }

    // ---------------------------------------------------------------------------------------
    // Inner classes
    // ---------------------------------------------------------------------------------------

    /// All inner class mappings, ordered by obfuscated name
    #[must_use]
    pub fn inner_class_mappings(&self) -> Vec<Arc<ClassMapping>> {
        sorted_values(&self.inner_classes)
    }

    /// Create an inner class mapping, or rename the existing one.
    ///
    /// Any `$`-qualified prefix in `deobfuscated` is stripped, keeping only the last segment.
    pub fn create_inner_class_mapping(
        &self,
        obfuscated: &str,
        deobfuscated: &str,
    ) -> Arc<ClassMapping> {
        let (mapping, _) = fetch_or_insert(
            &self.inner_classes,
            obfuscated.to_string(),
            deobfuscated,
            |obfuscated| self.new_inner(obfuscated, deobfuscated),
        );
        mapping
    }

    /// Fetch an inner class mapping, creating an identity mapping if absent
    pub fn get_or_create_inner_class_mapping(&self, obfuscated: &str) -> Arc<ClassMapping> {
        if let Some(existing) = self.get_inner_class_mapping(obfuscated) {
            return existing;
        }
        self.create_inner_class_mapping(obfuscated, obfuscated)
    }

    /// Lookup by obfuscated inner name
    #[must_use]
    pub fn get_inner_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        self.inner_classes
            .get(obfuscated)
            .map(|entry| entry.value().clone())
    }

    /// Returns `true` if an inner class mapping with this obfuscated name exists
    #[must_use]
    pub fn has_inner_class_mapping(&self, obfuscated: &str) -> bool {
        self.inner_classes.contains_key(obfuscated)
    }

    /// Remove the inner class mapping with this obfuscated name
    pub fn remove_inner_class_mapping(&self, obfuscated: &str) -> Option<Arc<ClassMapping>> {
        self.inner_classes
            .remove(obfuscated)
            .map(|(_, removed)| removed)
    }

    /// Remove this exact inner class mapping
    pub fn remove_inner_class_mapping_entry(&self, mapping: &Arc<ClassMapping>) {
        self.inner_classes
            .remove_if(mapping.obfuscated_name(), |_, existing| {
                Arc::ptr_eq(existing, mapping)
            });
    }

    // ---------------------------------------------------------------------------------------
    // Reverse / copy
    // ---------------------------------------------------------------------------------------

    /// Produce the reversed class (names swapped) at `target`, with all children reversed
    pub fn reverse_into(&self, target: ClassTarget<'_>) -> Arc<ClassMapping> {
        let reversed =
            target.create_class_mapping(&self.deobfuscated_name(), self.obfuscated_name());
        self.base.carry_javadoc(&reversed.base);

        for field in self.field_mappings() {
            field.reverse_into(&reversed);
        }
        for method in self.method_mappings() {
            method.reverse_into(&reversed);
        }
        for inner in self.inner_class_mappings() {
            inner.reverse_into(ClassTarget::Class(&reversed));
        }
        reversed
    }

    /// Produce a structurally equal copy at `target`
    pub fn copy_into(&self, target: ClassTarget<'_>) -> Arc<ClassMapping> {
        let copy = target.create_class_mapping(self.obfuscated_name(), &self.deobfuscated_name());
        self.base.carry_javadoc(&copy.base);

        for field in self.field_mappings() {
            field.copy_into(&copy);
        }
        for method in self.method_mappings() {
            method.copy_into(&copy);
        }
        for inner in self.inner_class_mappings() {
            inner.copy_into(ClassTarget::Class(&copy));
        }
        copy
    }
}

impl Mapping for ClassMapping {
    fn base(&self) -> &MappingBase<Self> {
        &self.base
    }

    /// Top-level names are normalized to `/` form; inner names keep their last `$` segment
    fn set_deobfuscated_name(&self, name: &str) {
        let name = if self.is_top_level() {
            name.replace('.', "/")
        } else {
            strip_outer(name).to_string()
        };
        self.base.rename(self, name);
    }

    fn full_obfuscated_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => format!("{}${}", parent.full_obfuscated_name(), self.obfuscated_name()),
            None => self.obfuscated_name().to_string(),
        }
    }

    fn full_deobfuscated_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => format!(
                "{}${}",
                parent.full_deobfuscated_name(),
                self.deobfuscated_name()
            ),
            None => self.deobfuscated_name(),
        }
    }

    fn simple_obfuscated_name(&self) -> String {
        simple_name(self.is_top_level(), self.obfuscated_name()).to_string()
    }

    fn simple_deobfuscated_name(&self) -> String {
        simple_name(self.is_top_level(), &self.deobfuscated_name()).to_string()
    }

    /// Inner classes count as renamed when any enclosing class is renamed
    fn has_deobfuscated_name(&self) -> bool {
        self.base.is_renamed()
            || self
                .parent_class()
                .is_some_and(|parent| parent.has_deobfuscated_name())
    }

    fn mappings(&self) -> Option<MappingSetRc> {
        self.mappings.upgrade()
    }
}

impl PartialEq for ClassMapping {
    fn eq(&self, other: &Self) -> bool {
        self.obfuscated_name() == other.obfuscated_name()
            && self.deobfuscated_name() == other.deobfuscated_name()
            && maps_equal(&self.fields, &other.fields)
            && maps_equal(&self.methods, &other.methods)
            && maps_equal(&self.inner_classes, &other.inner_classes)
    }
}

impl fmt::Debug for ClassMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMapping")
            .field("obfuscated", &self.full_obfuscated_name())
            .field("deobfuscated", &self.full_deobfuscated_name())
            .field("fields", &self.field_mappings())
            .field("methods", &self.method_mappings())
            .field("inner_classes", &self.inner_class_mappings())
            .finish()
    }
}

fn strip_outer(name: &str) -> &str {
    name.rsplit_once('$').map_or(name, |(_, own)| own)
}

fn package_of(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(package, _)| package)
}

/// Top-level: text after the last `/`. Inner: the name minus any leading digits, which are
/// what anonymous and local classes are numbered with.
fn simple_name(top_level: bool, name: &str) -> &str {
    if top_level {
        name.rsplit_once('/').map_or(name, |(_, simple)| simple)
    } else {
        name.trim_start_matches(|c: char| c.is_ascii_digit())
    }
}
