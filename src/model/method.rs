use std::{
    fmt,
    sync::{Arc, Weak},
};

use dashmap::DashMap;

use crate::{
    model::{
        fetch_or_insert, maps_equal, sorted_values, ClassMapping, Mapping, MappingBase,
        MappingSet, MappingSetRc, ParameterMapping,
    },
    signatures::{MethodDescriptor, MethodSignature},
};

/// A mapping for a method, keyed in its class by [`MethodSignature`], owning mappings for its
/// parameters keyed by index.
pub struct MethodMapping {
    base: MappingBase<MethodMapping>,
    self_ref: Weak<MethodMapping>,
    parent: Weak<ClassMapping>,
    mappings: Weak<MappingSet>,
    signature: MethodSignature,
    parameters: DashMap<usize, Arc<ParameterMapping>>,
}

impl MethodMapping {
    pub(crate) fn new(
        parent: Weak<ClassMapping>,
        mappings: Weak<MappingSet>,
        signature: MethodSignature,
        deobfuscated: &str,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| MethodMapping {
            base: MappingBase::new(signature.name().to_string(), deobfuscated.to_string()),
            self_ref: self_ref.clone(),
            parent,
            mappings,
            signature,
            parameters: DashMap::new(),
        })
    }

    /// The obfuscated signature
    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// The obfuscated descriptor
    #[must_use]
    pub fn descriptor(&self) -> &MethodDescriptor {
        self.signature.descriptor()
    }

    /// The obfuscated descriptor text
    #[must_use]
    pub fn obfuscated_descriptor(&self) -> String {
        self.signature.descriptor().to_string()
    }

    /// The descriptor translated through the owning registry
    #[must_use]
    pub fn deobfuscated_descriptor(&self) -> MethodDescriptor {
        match self.mappings() {
            Some(mappings) => mappings.deobfuscate_descriptor(self.descriptor()),
            None => self.descriptor().clone(),
        }
    }

    /// The deobfuscated name with the translated descriptor
    #[must_use]
    pub fn deobfuscated_signature(&self) -> MethodSignature {
        MethodSignature::new(self.deobfuscated_name(), self.deobfuscated_descriptor())
    }

    /// The class that declared this mapping
    #[must_use]
    pub fn parent_class(&self) -> Option<Arc<ClassMapping>> {
        self.parent.upgrade()
    }

    /// Returns `true` if the method or any of its parameters is renamed
    #[must_use]
    pub fn has_mappings(&self) -> bool {
        self.has_deobfuscated_name()
            || self
                .parameters
                .iter()
                .any(|param| param.value().has_deobfuscated_name())
    }

    /// All parameter mappings, ordered by index
    #[must_use]
    pub fn parameter_mappings(&self) -> Vec<Arc<ParameterMapping>> {
        sorted_values(&self.parameters)
    }

    /// Create a parameter mapping, or rename the existing one at `index`
    pub fn create_parameter_mapping(&self, index: usize, deobfuscated: &str) -> Arc<ParameterMapping> {
        let (mapping, _) = fetch_or_insert(&self.parameters, index, deobfuscated, |index| {
            Arc::new(ParameterMapping::new(
                self.self_ref.clone(),
                self.mappings.clone(),
                *index,
                deobfuscated,
            ))
        });
        mapping
    }

    /// Fetch the parameter mapping at `index`, creating an identity mapping if absent
    pub fn get_or_create_parameter_mapping(&self, index: usize) -> Arc<ParameterMapping> {
        if let Some(existing) = self.get_parameter_mapping(index) {
            return existing;
        }
        self.create_parameter_mapping(index, &index.to_string())
    }

    /// Lookup by index
    #[must_use]
    pub fn get_parameter_mapping(&self, index: usize) -> Option<Arc<ParameterMapping>> {
        self.parameters.get(&index).map(|entry| entry.value().clone())
    }

    /// Returns `true` if a parameter mapping exists at `index`
    #[must_use]
    pub fn has_parameter_mapping(&self, index: usize) -> bool {
        self.parameters.contains_key(&index)
    }

    /// Remove the parameter mapping at `index`
    pub fn remove_parameter_mapping(&self, index: usize) -> Option<Arc<ParameterMapping>> {
        self.parameters.remove(&index).map(|(_, removed)| removed)
    }

    /// Add the reversed method (keyed by the deobfuscated signature) to `target`.
    ///
    /// Parameters keep their index and name.
    pub fn reverse_into(&self, target: &ClassMapping) -> Arc<MethodMapping> {
        let reversed =
            target.create_method_mapping(self.deobfuscated_signature(), self.obfuscated_name());
        self.base.carry_javadoc(&reversed.base);
        for param in self.parameter_mappings() {
            param.reverse_into(&reversed);
        }
        reversed
    }

    /// Add an equal method mapping to `target`
    pub fn copy_into(&self, target: &ClassMapping) -> Arc<MethodMapping> {
        let copy =
            target.create_method_mapping(self.signature.clone(), &self.deobfuscated_name());
        self.base.carry_javadoc(&copy.base);
        for param in self.parameter_mappings() {
            param.copy_into(&copy);
        }
        copy
    }
}

impl Mapping for MethodMapping {
    fn base(&self) -> &MappingBase<Self> {
        &self.base
    }

    fn full_obfuscated_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => format!("{}/{}", parent.full_obfuscated_name(), self.obfuscated_name()),
            None => self.obfuscated_name().to_string(),
        }
    }

    fn full_deobfuscated_name(&self) -> String {
        match self.parent_class() {
            Some(parent) => format!(
                "{}/{}",
                parent.full_deobfuscated_name(),
                self.deobfuscated_name()
            ),
            None => self.deobfuscated_name(),
        }
    }

    fn mappings(&self) -> Option<MappingSetRc> {
        self.mappings.upgrade()
    }
}

impl PartialEq for MethodMapping {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
            && self.deobfuscated_name() == other.deobfuscated_name()
            && maps_equal(&self.parameters, &other.parameters)
    }
}

impl fmt::Debug for MethodMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMapping")
            .field("signature", &self.signature.to_string())
            .field("deobfuscated", &self.deobfuscated_name())
            .field("parameters", &self.parameter_mappings())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deobfuscated_descriptor() {
        let mappings = MappingSet::new();
        mappings.create_top_level_class_mapping("a", "com/example/Foo");
        let class = mappings.create_top_level_class_mapping("b", "com/example/Bar");
        let method = class.get_or_create_method_mapping_of("c", "(La;I)[La;").unwrap();
        method.set_deobfuscated_name("convert");

        assert_eq!(
            method.deobfuscated_signature().to_string(),
            "convert(Lcom/example/Foo;I)[Lcom/example/Foo;"
        );
        assert_eq!(method.obfuscated_descriptor(), "(La;I)[La;");
        assert_eq!(method.full_deobfuscated_name(), "com/example/Bar/convert");
    }

    #[test]
    fn test_parameters() {
        let mappings = MappingSet::new();
        let class = mappings.get_or_create_top_level_class_mapping("a");
        let method = class.get_or_create_method_mapping_of("b", "(II)V").unwrap();
        assert!(!method.has_mappings());

        let first = method.get_or_create_parameter_mapping(0);
        assert_eq!(first.obfuscated_name(), "0");
        assert_eq!(first.deobfuscated_name(), "0");

        method.create_parameter_mapping(1, "count");
        method.create_parameter_mapping(0, "offset");

        let names: Vec<String> = method
            .parameter_mappings()
            .iter()
            .map(|param| param.deobfuscated_name())
            .collect();
        assert_eq!(names, vec!["offset", "count"]);
        assert!(method.has_mappings());
        assert!(class.has_mappings());

        assert!(method.remove_parameter_mapping(1).is_some());
        assert!(!method.has_parameter_mapping(1));
    }

    #[test]
    fn test_reverse_keeps_parameter_names() {
        let mappings = MappingSet::new();
        let class = mappings.create_top_level_class_mapping("a", "Foo");
        let method = class.get_or_create_method_mapping_of("b", "(La;)V").unwrap();
        method.set_deobfuscated_name("accept");
        method.create_parameter_mapping(0, "other");

        let reversed_set = MappingSet::new();
        let target = reversed_set.get_or_create_top_level_class_mapping("Foo");
        let reversed = method.reverse_into(&target);

        assert_eq!(reversed.signature().to_string(), "accept(LFoo;)V");
        assert_eq!(reversed.deobfuscated_name(), "b");
        assert_eq!(
            reversed.get_parameter_mapping(0).unwrap().deobfuscated_name(),
            "other"
        );
    }
}
