use std::sync::Arc;

use crate::{
    merge::{MemberMatch, MergeContext, MergeResult},
    model::{ClassMapping, FieldMapping, Mapping, MappingSet, MethodMapping, ParameterMapping},
    Result,
};

/// Decides what a matched pair of mappings becomes in the merge target.
///
/// The merger locates matches and calls exactly one method per left entry (and per right-only
/// entry). Every method has a default implementation; override only the cases that should
/// behave differently. Implementations must create their results inside `target`; returning a
/// mapping owned by anything else aborts the merge with [`crate::Error::InconsistentMerge`].
///
/// Handlers are shared between worker threads and must not rely on call order across
/// different top-level classes.
///
/// # Default behaviour
///
/// | case | obfuscated name | deobfuscated name |
/// |------|-----------------|-------------------|
/// | continuation | left | right |
/// | duplicate | left | duplicate |
/// | left only | left | left |
/// | right only | right | right |
///
/// Right-only member signatures are translated into the left obfuscated namespace through
/// [`MergeContext::left_reversed`].
pub trait MergeHandler: Send + Sync {
    /// A left top-level class and its continuation
    fn merge_top_level_class_mappings(
        &self,
        left: &Arc<ClassMapping>,
        right: &Arc<ClassMapping>,
        target: &MappingSet,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_top_level_class_mapping(left.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left top-level class that the right set redefines, possibly also continued
    fn merge_duplicate_top_level_class_mappings(
        &self,
        left: &Arc<ClassMapping>,
        right: &Arc<ClassMapping>,
        right_continuation: Option<&Arc<ClassMapping>>,
        target: &MappingSet,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_top_level_class_mapping(left.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::new(
            Some(mapping),
            duplicate_then_continuation(right, right_continuation),
        ))
    }

    /// A left top-level class with no match
    fn add_left_top_level_class_mapping(
        &self,
        left: &Arc<ClassMapping>,
        target: &MappingSet,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_top_level_class_mapping(left.obfuscated_name(), &left.deobfuscated_name());
        Ok(MergeResult::of(mapping))
    }

    /// A right top-level class no left class refers to
    fn add_right_top_level_class_mapping(
        &self,
        right: &Arc<ClassMapping>,
        target: &MappingSet,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping = target
            .create_top_level_class_mapping(right.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left inner class and its continuation
    fn merge_inner_class_mappings(
        &self,
        left: &Arc<ClassMapping>,
        right: &Arc<ClassMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_inner_class_mapping(left.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left inner class that the right set redefines, possibly also continued
    fn merge_duplicate_inner_class_mappings(
        &self,
        left: &Arc<ClassMapping>,
        right: &Arc<ClassMapping>,
        right_continuation: Option<&Arc<ClassMapping>>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_inner_class_mapping(left.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::new(
            Some(mapping),
            duplicate_then_continuation(right, right_continuation),
        ))
    }

    /// A left inner class with no match
    fn add_left_inner_class_mapping(
        &self,
        left: &Arc<ClassMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_inner_class_mapping(left.obfuscated_name(), &left.deobfuscated_name());
        Ok(MergeResult::of(mapping))
    }

    /// A right inner class no left inner class refers to
    fn add_right_inner_class_mapping(
        &self,
        right: &Arc<ClassMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<ClassMapping>> {
        let mapping =
            target.create_inner_class_mapping(right.obfuscated_name(), &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left field and its continuation
    fn merge_field_mappings(
        &self,
        left: &Arc<FieldMapping>,
        continuation: MemberMatch<'_, FieldMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        let name = continuation
            .first()
            .map_or_else(|| left.deobfuscated_name(), |right| right.deobfuscated_name());
        Ok(Some(target.create_field_mapping(left.signature().clone(), &name)))
    }

    /// A left field that the right set redefines
    fn merge_duplicate_field_mappings(
        &self,
        left: &Arc<FieldMapping>,
        duplicate: MemberMatch<'_, FieldMapping>,
        _continuation: MemberMatch<'_, FieldMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        let name = duplicate
            .first()
            .map_or_else(|| left.deobfuscated_name(), |right| right.deobfuscated_name());
        Ok(Some(target.create_field_mapping(left.signature().clone(), &name)))
    }

    /// A left field with no match
    fn add_left_field_mapping(
        &self,
        left: &Arc<FieldMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        Ok(Some(target.create_field_mapping(
            left.signature().clone(),
            &left.deobfuscated_name(),
        )))
    }

    /// A right field no left field refers to
    fn add_right_field_mapping(
        &self,
        right: &Arc<FieldMapping>,
        target: &ClassMapping,
        context: &MergeContext<'_>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        let signature = context
            .left_reversed()
            .deobfuscate_field_signature(right.signature());
        Ok(Some(target.create_field_mapping(signature, &right.deobfuscated_name())))
    }

    /// A left method and its continuation
    fn merge_method_mappings(
        &self,
        left: &Arc<MethodMapping>,
        continuation: MemberMatch<'_, MethodMapping>,
        target: &ClassMapping,
        context: &MergeContext<'_>,
    ) -> Result<MergeResult<MethodMapping>> {
        let Some(right) = continuation.first() else {
            return self.add_left_method_mapping(left, target, context);
        };
        let mapping =
            target.create_method_mapping(left.signature().clone(), &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left method that the right set redefines, possibly also continued
    fn merge_duplicate_method_mappings(
        &self,
        left: &Arc<MethodMapping>,
        duplicate: MemberMatch<'_, MethodMapping>,
        continuation: MemberMatch<'_, MethodMapping>,
        target: &ClassMapping,
        context: &MergeContext<'_>,
    ) -> Result<MergeResult<MethodMapping>> {
        let Some(right) = duplicate.first() else {
            return self.merge_method_mappings(left, continuation, target, context);
        };
        let mapping =
            target.create_method_mapping(left.signature().clone(), &right.deobfuscated_name());
        Ok(MergeResult::new(
            Some(mapping),
            duplicate_then_continuation(right, continuation.first()),
        ))
    }

    /// A left method with no match
    fn add_left_method_mapping(
        &self,
        left: &Arc<MethodMapping>,
        target: &ClassMapping,
        _context: &MergeContext<'_>,
    ) -> Result<MergeResult<MethodMapping>> {
        let mapping =
            target.create_method_mapping(left.signature().clone(), &left.deobfuscated_name());
        Ok(MergeResult::of(mapping))
    }

    /// A right method no left method refers to
    fn add_right_method_mapping(
        &self,
        right: &Arc<MethodMapping>,
        target: &ClassMapping,
        context: &MergeContext<'_>,
    ) -> Result<MergeResult<MethodMapping>> {
        let signature = context
            .left_reversed()
            .deobfuscate_method_signature(right.signature());
        let mapping = target.create_method_mapping(signature, &right.deobfuscated_name());
        Ok(MergeResult::with(mapping, right.clone()))
    }

    /// A left parameter and the right parameter at the same index
    fn merge_parameter_mappings(
        &self,
        left: &Arc<ParameterMapping>,
        right: &Arc<ParameterMapping>,
        target: &MethodMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<ParameterMapping>>> {
        Ok(Some(target.create_parameter_mapping(
            left.index(),
            &right.deobfuscated_name(),
        )))
    }

    /// A left parameter with no match
    fn add_left_parameter_mapping(
        &self,
        left: &Arc<ParameterMapping>,
        target: &MethodMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<ParameterMapping>>> {
        Ok(Some(target.create_parameter_mapping(
            left.index(),
            &left.deobfuscated_name(),
        )))
    }

    /// A right parameter at an index the left method does not map
    fn add_right_parameter_mapping(
        &self,
        right: &Arc<ParameterMapping>,
        target: &MethodMapping,
        _context: &MergeContext<'_>,
    ) -> Result<Option<Arc<ParameterMapping>>> {
        Ok(Some(target.create_parameter_mapping(
            right.index(),
            &right.deobfuscated_name(),
        )))
    }
}

/// The handler used unless a [`crate::merge::MergeConfig`] names another
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMergeHandler;

impl MergeHandler for DefaultMergeHandler {}

fn duplicate_then_continuation<T>(duplicate: &Arc<T>, continuation: Option<&Arc<T>>) -> Vec<Arc<T>> {
    match continuation {
        Some(continuation) if !Arc::ptr_eq(duplicate, continuation) => {
            vec![duplicate.clone(), continuation.clone()]
        }
        _ => vec![duplicate.clone()],
    }
}
