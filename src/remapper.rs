//! Name translation for bytecode rewriting tools.
//!
//! A [`Remapper`] answers the questions a class file rewriter asks while walking bytecode:
//! what a class, inner class, field or method is called in the deobfuscated namespace, and
//! what a descriptor looks like after translation. Member lookups complete the owning class
//! first, so members accessed through a subclass resolve to the inherited mapping.

use std::sync::Arc;

use crate::{
    inheritance::InheritanceProvider,
    model::{ClassMapping, Mapping, MappingSet},
    signatures::{
        parse_field_type, parse_method_descriptor, ArrayType, FieldSignature, FieldType,
        MethodDescriptor, MethodSignature, ObjectType, Type,
    },
    Result,
};

/// Translates obfuscated names using a [`MappingSet`] and an [`InheritanceProvider`].
///
/// Unknown names are returned unchanged. Lookups may create mappings: inner classes whose
/// outer class is mapped, and owner classes that are completed for member lookups.
///
/// # Example
///
/// ```rust
/// use mapscope::inheritance::MemoryInheritanceProvider;
/// use mapscope::model::MappingSet;
/// use mapscope::remapper::Remapper;
///
/// let mappings = MappingSet::new();
/// mappings.create_top_level_class_mapping("a", "com/example/Foo");
///
/// let provider = MemoryInheritanceProvider::new();
/// let remapper = Remapper::new(&mappings, &provider);
/// assert_eq!(remapper.map_class("a"), "com/example/Foo");
/// assert_eq!(remapper.map_descriptor("(La;[La;)V")?, "(Lcom/example/Foo;[Lcom/example/Foo;)V");
/// # Ok::<(), mapscope::Error>(())
/// ```
pub struct Remapper<'a, P: ?Sized> {
    mappings: &'a MappingSet,
    provider: &'a P,
}

impl<'a, P> Remapper<'a, P>
where
    P: InheritanceProvider + ?Sized,
{
    /// Create a remapper over `mappings`
    pub fn new(mappings: &'a MappingSet, provider: &'a P) -> Self {
        Remapper { mappings, provider }
    }

    /// The full deobfuscated name of a class, or `name` itself if it is not mapped
    pub fn map_class(&self, name: &str) -> String {
        self.mappings
            .compute_class_mapping(name)
            .map_or_else(|| name.to_string(), |mapping| mapping.full_deobfuscated_name())
    }

    /// The deobfuscated simple name of the inner class `name`, or `inner_name` if unmapped
    pub fn map_inner_class_name(&self, name: &str, _outer_name: &str, inner_name: &str) -> String {
        self.mappings
            .compute_class_mapping(name)
            .map_or_else(|| inner_name.to_string(), |mapping| mapping.deobfuscated_name())
    }

    /// The deobfuscated name of field `name` with type `descriptor` accessed through `owner`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a field type.
    pub fn map_field_name(&self, owner: &str, name: &str, descriptor: &str) -> Result<String> {
        let signature = FieldSignature::of(name, descriptor)?;
        Ok(self
            .completed_class(owner)
            .compute_field_mapping(&signature)
            .map_or_else(|| name.to_string(), |mapping| mapping.deobfuscated_name()))
    }

    /// The deobfuscated name of method `name` with `descriptor` invoked through `owner`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a method descriptor.
    pub fn map_method_name(&self, owner: &str, name: &str, descriptor: &str) -> Result<String> {
        let signature = MethodSignature::of(name, descriptor)?;
        Ok(self
            .completed_class(owner)
            .get_method_mapping(&signature)
            .map_or_else(|| name.to_string(), |mapping| mapping.deobfuscated_name()))
    }

    /// Translate a field or method descriptor
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is neither.
    pub fn map_descriptor(&self, descriptor: &str) -> Result<String> {
        if descriptor.starts_with('(') {
            let parsed = parse_method_descriptor(descriptor)?;
            return Ok(self.map_method_descriptor(&parsed).to_string());
        }
        Ok(self.map_field_type(&parse_field_type(descriptor)?).to_string())
    }

    /// Translate every class reference in a field type
    pub fn map_field_type(&self, field_type: &FieldType) -> FieldType {
        match field_type {
            FieldType::Base(_) => field_type.clone(),
            FieldType::Object(object) => {
                FieldType::Object(ObjectType::new(self.map_class(object.class_name())))
            }
            FieldType::Array(array) => FieldType::Array(ArrayType::new(
                array.dimensions(),
                self.map_field_type(array.component()),
            )),
        }
    }

    /// Translate every class reference in a method descriptor
    pub fn map_method_descriptor(&self, descriptor: &MethodDescriptor) -> MethodDescriptor {
        let return_type = match descriptor.return_type() {
            Type::Void => Type::Void,
            Type::Field(field_type) => Type::Field(self.map_field_type(field_type)),
        };
        MethodDescriptor::new(
            descriptor
                .params()
                .iter()
                .map(|param| self.map_field_type(param))
                .collect(),
            return_type,
        )
    }

    fn completed_class(&self, owner: &str) -> Arc<ClassMapping> {
        let mapping = self.mappings.get_or_create_class_mapping(owner);
        mapping.complete(self.provider);
        mapping
    }
}
