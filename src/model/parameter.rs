use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::model::{Mapping, MappingBase, MappingSet, MappingSetRc, MethodMapping};

/// A mapping for a method parameter, identified by its index.
///
/// The obfuscated name is the index rendered as text. Full names are the plain names; a
/// parameter is never addressed through its method.
pub struct ParameterMapping {
    base: MappingBase<ParameterMapping>,
    parent: Weak<MethodMapping>,
    mappings: Weak<MappingSet>,
    index: usize,
}

impl ParameterMapping {
    pub(crate) fn new(
        parent: Weak<MethodMapping>,
        mappings: Weak<MappingSet>,
        index: usize,
        deobfuscated: &str,
    ) -> Self {
        ParameterMapping {
            base: MappingBase::new(index.to_string(), deobfuscated.to_string()),
            parent,
            mappings,
            index,
        }
    }

    /// The parameter index
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The method owning this parameter
    #[must_use]
    pub fn parent_method(&self) -> Option<Arc<MethodMapping>> {
        self.parent.upgrade()
    }

    /// Add the reversed parameter to `target`; the index is kept, so is the name
    pub fn reverse_into(&self, target: &MethodMapping) -> Arc<ParameterMapping> {
        let reversed = target.create_parameter_mapping(self.index, &self.deobfuscated_name());
        self.base.carry_javadoc(&reversed.base);
        reversed
    }

    /// Add an equal parameter mapping to `target`
    pub fn copy_into(&self, target: &MethodMapping) -> Arc<ParameterMapping> {
        let copy = target.create_parameter_mapping(self.index, &self.deobfuscated_name());
        self.base.carry_javadoc(&copy.base);
        copy
    }
}

impl Mapping for ParameterMapping {
    fn base(&self) -> &MappingBase<Self> {
        &self.base
    }

    fn full_obfuscated_name(&self) -> String {
        self.obfuscated_name().to_string()
    }

    fn full_deobfuscated_name(&self) -> String {
        self.deobfuscated_name()
    }

    fn mappings(&self) -> Option<MappingSetRc> {
        self.mappings.upgrade()
    }
}

impl PartialEq for ParameterMapping {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.deobfuscated_name() == other.deobfuscated_name()
    }
}

impl fmt::Debug for ParameterMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterMapping")
            .field("index", &self.index)
            .field("deobfuscated", &self.deobfuscated_name())
            .finish()
    }
}
