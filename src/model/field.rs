use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{
    model::{ClassMapping, Mapping, MappingBase, MappingSet, MappingSetRc},
    signatures::{FieldSignature, FieldType},
};

/// A mapping for a field, keyed in its class by [`FieldSignature`].
///
/// The obfuscated name is the signature's name; the type (if any) stays in the obfuscated
/// namespace and is translated on demand by [`FieldMapping::deobfuscated_signature`].
pub struct FieldMapping {
    base: MappingBase<FieldMapping>,
    pub(crate) parent: Weak<ClassMapping>,
    mappings: Weak<MappingSet>,
    signature: FieldSignature,
}

impl FieldMapping {
    pub(crate) fn new(
        parent: Weak<ClassMapping>,
        mappings: Weak<MappingSet>,
        signature: FieldSignature,
        deobfuscated: &str,
    ) -> Self {
        FieldMapping {
            base: MappingBase::new(signature.name().to_string(), deobfuscated.to_string()),
            parent,
            mappings,
            signature,
        }
    }

    /// The obfuscated signature
    #[must_use]
    pub fn signature(&self) -> &FieldSignature {
        &self.signature
    }

    /// The obfuscated field type, if known
    #[must_use]
    pub fn field_type(&self) -> Option<&FieldType> {
        self.signature.field_type()
    }

    /// The deobfuscated name together with the type translated through the owning registry
    #[must_use]
    pub fn deobfuscated_signature(&self) -> FieldSignature {
        let field_type = self.field_type().map(|field_type| match self.mappings() {
            Some(mappings) => mappings.deobfuscate_field_type(field_type),
            None => field_type.clone(),
        });
        FieldSignature::new(self.deobfuscated_name(), field_type)
    }

    /// The class that declared this mapping
    #[must_use]
    pub fn parent_class(&self) -> Option<Arc<ClassMapping>> {
        self.parent.upgrade()
    }

    /// Add the reversed field (keyed by the deobfuscated signature) to `target`
    pub fn reverse_into(&self, target: &ClassMapping) -> Arc<FieldMapping> {
        let reversed =
            target.create_field_mapping(self.deobfuscated_signature(), self.obfuscated_name());
        self.base.carry_javadoc(&reversed.base);
        reversed
    }

    /// Add an equal field mapping to `target`
    pub fn copy_into(&self, target: &ClassMapping) -> Arc<FieldMapping> {
        let copy = target.create_field_mapping(self.signature.clone(), &self.deobfuscated_name());
        self.base.carry_javadoc(&copy.base);
        copy
    }
}

impl Mapping for FieldMapping {
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

impl PartialEq for FieldMapping {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature && self.deobfuscated_name() == other.deobfuscated_name()
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("signature", &self.signature.to_string())
            .field("deobfuscated", &self.deobfuscated_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deobfuscated_signature_translates_type() {
        let mappings = MappingSet::new();
        mappings.create_top_level_class_mapping("a", "com/example/Logger");
        let class = mappings.create_top_level_class_mapping("b", "com/example/Service");
        let field = class
            .get_or_create_field_mapping_of("c", "La;")
            .unwrap();
        field.set_deobfuscated_name("logger");

        let deobfuscated = field.deobfuscated_signature();
        assert_eq!(deobfuscated.to_string(), "logger:Lcom/example/Logger;");
        assert_eq!(field.full_obfuscated_name(), "b/c");
        assert_eq!(field.full_deobfuscated_name(), "com/example/Service/logger");
    }

    #[test]
    fn test_untyped_reverse() {
        let mappings = MappingSet::new();
        let class = mappings.create_top_level_class_mapping("a", "Foo");
        let field = class.create_field_mapping(FieldSignature::untyped("b"), "bar");

        let other = MappingSet::new();
        let target = other.get_or_create_top_level_class_mapping("Foo");
        let reversed = field.reverse_into(&target);

        assert_eq!(reversed.signature(), &FieldSignature::untyped("bar"));
        assert_eq!(reversed.deobfuscated_name(), "b");
    }
}
