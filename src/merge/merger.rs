use std::{collections::HashSet, sync::Arc};

use log::{debug, error, trace};
use rayon::{prelude::*, ThreadPoolBuilder};

use crate::{
    merge::{MemberMatch, MergeConfig, MergeContext, MergeHandler, MergeResult, MergeStrategy},
    model::{ClassMapping, FieldMapping, Mapping, MappingSet, MethodMapping, ParameterMapping},
    signatures::MethodSignature,
    Error, Result,
};

/// One unit of top-level work
enum MergeTask {
    /// A left class, merged with whatever the right set has for it
    Left(Arc<ClassMapping>),
    /// A right class that no left class refers to
    Right(Arc<ClassMapping>),
}

/// Merges two [`MappingSet`]s.
///
/// Top-level classes are merged in parallel on a dedicated worker pool; everything below a
/// top-level class is handled by the worker that owns it. The merged set is only returned
/// once every task succeeded.
///
/// # Example
///
/// ```rust
/// use mapscope::merge::{MappingSetMerger, MergeConfig, MergeStrategy};
/// use mapscope::model::{Mapping, MappingSet};
/// use mapscope::signatures::FieldSignature;
///
/// let left = MappingSet::new();
/// let class = left.create_top_level_class_mapping("a", "com/example/Foo");
/// class.create_field_mapping(FieldSignature::untyped("b"), "count");
///
/// let right = MappingSet::new();
/// let class = right.create_top_level_class_mapping("com/example/Foo", "com/example/Bar");
/// class.create_field_mapping(FieldSignature::untyped("count"), "total");
///
/// let config = MergeConfig::builder().with_field_strategy(MergeStrategy::Loose).build();
/// let merged = MappingSetMerger::new(&left, &right, config).merge()?;
///
/// let class = merged.get_top_level_class_mapping("a").unwrap();
/// assert_eq!(class.deobfuscated_name(), "com/example/Bar");
/// assert_eq!(class.get_field_mapping_by_name("b").unwrap().deobfuscated_name(), "total");
/// # Ok::<(), mapscope::Error>(())
/// ```
pub struct MappingSetMerger<'a> {
    left: &'a MappingSet,
    right: &'a MappingSet,
    config: MergeConfig,
    context: MergeContext<'a>,
}

impl<'a> MappingSetMerger<'a> {
    /// Create a merger of `left` with `right`
    pub fn new(left: &'a MappingSet, right: &'a MappingSet, config: MergeConfig) -> Self {
        MappingSetMerger {
            left,
            right,
            config,
            context: MergeContext::new(left, right),
        }
    }

    /// Create a merger using [`MergeConfig::default`]
    pub fn with_defaults(left: &'a MappingSet, right: &'a MappingSet) -> Self {
        Self::new(left, right, MergeConfig::default())
    }

    /// The configuration in use
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// The context handed to every handler call
    pub fn context(&self) -> &MergeContext<'a> {
        &self.context
    }

    fn handler(&self) -> &dyn MergeHandler {
        self.config.handler.as_ref()
    }

    /// Merge into a fresh set
    ///
    /// # Errors
    /// See [`MappingSetMerger::merge_into`].
    pub fn merge(&self) -> Result<Arc<MappingSet>> {
        let target = MappingSet::new();
        self.merge_into(&target)?;
        Ok(target)
    }

    /// Merge into an existing set
    ///
    /// # Errors
    /// Returns [`Error::ThreadPool`] if the worker pool cannot be created, or
    /// [`Error::MergeFailed`] wrapping the first failure of any top-level task.
    pub fn merge_into(&self, target: &MappingSet) -> Result<()> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        for left in self.left.top_level_class_mappings() {
            seen.insert(left.obfuscated_name().to_string());
            seen.insert(left.deobfuscated_name());
            tasks.push(MergeTask::Left(left));
        }
        let left_count = tasks.len();
        for right in self.right.top_level_class_mappings() {
            if !seen.contains(right.obfuscated_name()) {
                tasks.push(MergeTask::Right(right));
            }
        }

        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("mapscope-merge-{index}"));
        if let Some(threads) = self.config.thread_count() {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        debug!(
            "Merging {} left and {} right-only top-level classes on {} workers",
            left_count,
            tasks.len() - left_count,
            pool.current_num_threads()
        );

        pool.install(|| {
            tasks
                .par_iter()
                .try_for_each(|task| self.run_task(task, target))
        })
        .map_err(|source| {
            error!("Mapping merge failed: {source}");
            Error::MergeFailed {
                source: Box::new(source),
            }
        })?;

        debug!("Merge finished with {} top-level classes", target.len());
        Ok(())
    }

    fn run_task(&self, task: &MergeTask, target: &MappingSet) -> Result<()> {
        match task {
            MergeTask::Left(left) => {
                trace!("Merging top-level class '{}'", left.obfuscated_name());
                let continuation = self
                    .right
                    .get_top_level_class_mapping(&left.deobfuscated_name());
                let duplicate = self.right.get_top_level_class_mapping(left.obfuscated_name());
                self.merge_top_level_internal(
                    Some(left),
                    continuation.as_ref(),
                    duplicate.as_ref(),
                    target,
                )?;
            }
            MergeTask::Right(right) => {
                trace!("Adding right-only class '{}'", right.obfuscated_name());
                self.merge_top_level_internal(None, Some(right), None, target)?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // Single-entity entry points
    // ---------------------------------------------------------------------------------------

    /// Merge one pair of top-level classes into `target`.
    ///
    /// If both sides share an obfuscated name `right` is treated as a duplicate of `left`,
    /// otherwise as its continuation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if both sides are `None`, or any handler error.
    pub fn merge_top_level_class(
        &self,
        left: Option<&Arc<ClassMapping>>,
        right: Option<&Arc<ClassMapping>>,
        target: &MappingSet,
    ) -> Result<Option<Arc<ClassMapping>>> {
        let (continuation, duplicate) =
            split_match(left, right, |l, r| l.obfuscated_name() == r.obfuscated_name());
        self.merge_top_level_internal(left, continuation, duplicate, target)
    }

    /// Merge one pair of inner classes into `target`
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if both sides are `None`, or any handler error.
    pub fn merge_inner_class(
        &self,
        left: Option<&Arc<ClassMapping>>,
        right: Option<&Arc<ClassMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<ClassMapping>>> {
        let (continuation, duplicate) =
            split_match(left, right, |l, r| l.obfuscated_name() == r.obfuscated_name());
        self.merge_inner_internal(left, continuation, duplicate, target)
    }

    /// Merge one pair of fields into `target`.
    ///
    /// Fields sharing an obfuscated name pair as a duplicate whatever their types.
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if both sides are `None`, or any handler error.
    pub fn merge_field(
        &self,
        left: Option<&Arc<FieldMapping>>,
        right: Option<&Arc<FieldMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        let (continuation, duplicate) =
            split_match(left, right, |l, r| l.obfuscated_name() == r.obfuscated_name());
        self.merge_field_internal(
            left,
            MemberMatch::new(continuation, None),
            MemberMatch::new(duplicate, None),
            target,
        )
    }

    /// Merge one pair of methods into `target`
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if both sides are `None`, or any handler error.
    pub fn merge_method(
        &self,
        left: Option<&Arc<MethodMapping>>,
        right: Option<&Arc<MethodMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<MethodMapping>>> {
        let (continuation, duplicate) =
            split_match(left, right, |l, r| l.signature() == r.signature());
        self.merge_method_internal(
            left,
            MemberMatch::new(continuation, None),
            MemberMatch::new(duplicate, None),
            target,
        )
    }

    /// Merge one pair of parameters into `target`
    ///
    /// # Errors
    /// Returns [`Error::InvalidState`] if both sides are `None`, or any handler error.
    pub fn merge_parameter(
        &self,
        left: Option<&Arc<ParameterMapping>>,
        right: Option<&Arc<ParameterMapping>>,
        target: &Arc<MethodMapping>,
    ) -> Result<Option<Arc<ParameterMapping>>> {
        self.merge_parameter_internal(left, right, target)
    }

    // ---------------------------------------------------------------------------------------
    // Classes
    // ---------------------------------------------------------------------------------------

    fn merge_top_level_internal(
        &self,
        left: Option<&Arc<ClassMapping>>,
        continuation: Option<&Arc<ClassMapping>>,
        duplicate: Option<&Arc<ClassMapping>>,
        target: &MappingSet,
    ) -> Result<Option<Arc<ClassMapping>>> {
        let handler = self.handler();
        let result = match (left, continuation, duplicate) {
            (Some(left), _, Some(duplicate)) => handler.merge_duplicate_top_level_class_mappings(
                left,
                duplicate,
                continuation,
                target,
                &self.context,
            )?,
            (Some(left), Some(continuation), None) => {
                handler.merge_top_level_class_mappings(left, continuation, target, &self.context)?
            }
            (Some(left), None, None) => {
                handler.add_left_top_level_class_mapping(left, target, &self.context)?
            }
            (None, Some(right), _) => {
                handler.add_right_top_level_class_mapping(right, target, &self.context)?
            }
            (None, None, _) => {
                return Err(Error::InvalidState(
                    "top-level class merge without a left class or right continuation".to_string(),
                ))
            }
        };

        let Some(mapping) = result.result() else {
            return Ok(None);
        };
        let owned = target
            .get_top_level_class_mapping(mapping.obfuscated_name())
            .is_some_and(|registered| Arc::ptr_eq(&registered, mapping));
        ensure_owned(owned, || {
            format!("top-level class '{}'", mapping.full_obfuscated_name())
        })?;

        self.merge_class_children(left, &result, mapping)?;
        Ok(Some(mapping.clone()))
    }

    fn merge_inner_internal(
        &self,
        left: Option<&Arc<ClassMapping>>,
        continuation: Option<&Arc<ClassMapping>>,
        duplicate: Option<&Arc<ClassMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<ClassMapping>>> {
        let handler = self.handler();
        let result = match (left, continuation, duplicate) {
            (Some(left), _, Some(duplicate)) => handler.merge_duplicate_inner_class_mappings(
                left,
                duplicate,
                continuation,
                target,
                &self.context,
            )?,
            (Some(left), Some(continuation), None) => {
                handler.merge_inner_class_mappings(left, continuation, target, &self.context)?
            }
            (Some(left), None, None) => {
                handler.add_left_inner_class_mapping(left, target, &self.context)?
            }
            (None, Some(right), _) => {
                handler.add_right_inner_class_mapping(right, target, &self.context)?
            }
            (None, None, _) => {
                return Err(Error::InvalidState(format!(
                    "inner class merge in '{}' without a left class or right continuation",
                    target.full_obfuscated_name()
                )))
            }
        };

        let Some(mapping) = result.result() else {
            return Ok(None);
        };
        let owned = target
            .get_inner_class_mapping(mapping.obfuscated_name())
            .is_some_and(|registered| Arc::ptr_eq(&registered, mapping));
        ensure_owned(owned, || {
            format!("inner class '{}'", mapping.full_obfuscated_name())
        })?;

        self.merge_class_children(left, &result, mapping)?;
        Ok(Some(mapping.clone()))
    }

    fn merge_class_children(
        &self,
        left: Option<&Arc<ClassMapping>>,
        result: &MergeResult<ClassMapping>,
        mapping: &Arc<ClassMapping>,
    ) -> Result<()> {
        if result.mappings_to_map().is_empty() {
            return self.merge_class(left, None, mapping);
        }
        for right in result.mappings_to_map() {
            self.merge_class(left, Some(right), mapping)?;
        }
        Ok(())
    }

    /// Merge the members and inner classes of `left` and `right` into `target`
    fn merge_class(
        &self,
        left: Option<&Arc<ClassMapping>>,
        right: Option<&Arc<ClassMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<()> {
        let mut seen_classes = HashSet::new();
        if let Some(left) = left {
            for inner in left.inner_class_mappings() {
                let continuation =
                    right.and_then(|right| right.get_inner_class_mapping(&inner.deobfuscated_name()));
                let duplicate =
                    right.and_then(|right| right.get_inner_class_mapping(inner.obfuscated_name()));
                self.merge_inner_internal(
                    Some(&inner),
                    continuation.as_ref(),
                    duplicate.as_ref(),
                    target,
                )?;

                seen_classes.insert(inner.obfuscated_name().to_string());
                seen_classes.insert(inner.deobfuscated_name());
            }
        }
        if let Some(right) = right {
            for inner in right.inner_class_mappings() {
                if !seen_classes.contains(inner.obfuscated_name()) {
                    self.merge_inner_internal(None, Some(&inner), None, target)?;
                }
            }
        }

        self.merge_fields(left, right, target)?;
        self.merge_methods(left, right, target)
    }

    // ---------------------------------------------------------------------------------------
    // Fields
    // ---------------------------------------------------------------------------------------

    fn merge_fields(
        &self,
        left: Option<&Arc<ClassMapping>>,
        right: Option<&Arc<ClassMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<()> {
        let loose = self.config.field_strategy == MergeStrategy::Loose;
        let mut seen_signatures = HashSet::new();
        let mut seen_names = HashSet::new();

        if let Some(left) = left {
            for field in left.field_mappings() {
                let deobfuscated = field.deobfuscated_signature();

                let strict_continuation = right.and_then(|right| right.get_field_mapping(&deobfuscated));
                let strict_duplicate =
                    right.and_then(|right| right.get_field_mapping(field.signature()));
                let (loose_continuation, loose_duplicate) = match right {
                    Some(right) if loose => (
                        distinct(
                            right.get_field_mapping_by_name(deobfuscated.name()),
                            strict_continuation.as_ref(),
                        ),
                        distinct(
                            right.get_field_mapping_by_name(field.obfuscated_name()),
                            strict_duplicate.as_ref(),
                        ),
                    ),
                    _ => (None, None),
                };

                self.merge_field_internal(
                    Some(&field),
                    MemberMatch::new(strict_continuation.as_ref(), loose_continuation.as_ref()),
                    MemberMatch::new(strict_duplicate.as_ref(), loose_duplicate.as_ref()),
                    target,
                )?;

                if loose {
                    seen_names.insert(field.obfuscated_name().to_string());
                    seen_names.insert(deobfuscated.name().to_string());
                }
                seen_signatures.insert(field.signature().clone());
                seen_signatures.insert(deobfuscated);
            }
        }

        if let Some(right) = right {
            for field in right.field_mappings() {
                if seen_names.contains(field.obfuscated_name())
                    || seen_signatures.contains(field.signature())
                {
                    continue;
                }
                self.merge_field_internal(
                    None,
                    MemberMatch::strict_only(&field),
                    MemberMatch::none(),
                    target,
                )?;
            }
        }
        Ok(())
    }

    fn merge_field_internal(
        &self,
        left: Option<&Arc<FieldMapping>>,
        continuation: MemberMatch<'_, FieldMapping>,
        duplicate: MemberMatch<'_, FieldMapping>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<FieldMapping>>> {
        let handler = self.handler();
        let merged = match left {
            Some(left) if duplicate.is_some() => handler.merge_duplicate_field_mappings(
                left,
                duplicate,
                continuation,
                target,
                &self.context,
            )?,
            Some(left) if continuation.is_some() => {
                handler.merge_field_mappings(left, continuation, target, &self.context)?
            }
            Some(left) => handler.add_left_field_mapping(left, target, &self.context)?,
            None => match continuation.first() {
                Some(right) => handler.add_right_field_mapping(right, target, &self.context)?,
                None => {
                    return Err(Error::InvalidState(format!(
                        "field merge in '{}' without a left field or right continuation",
                        target.full_obfuscated_name()
                    )))
                }
            },
        };

        if let Some(mapping) = &merged {
            let owned = target
                .get_field_mapping(mapping.signature())
                .is_some_and(|registered| Arc::ptr_eq(&registered, mapping));
            ensure_owned(owned, || format!("field '{}'", mapping.full_obfuscated_name()))?;
        }
        Ok(merged)
    }

    // ---------------------------------------------------------------------------------------
    // Methods
    // ---------------------------------------------------------------------------------------

    fn merge_methods(
        &self,
        left: Option<&Arc<ClassMapping>>,
        right: Option<&Arc<ClassMapping>>,
        target: &Arc<ClassMapping>,
    ) -> Result<()> {
        let loose = self.config.method_strategy == MergeStrategy::Loose;
        let mut seen = HashSet::new();

        if let Some(left) = left {
            for method in left.method_mappings() {
                let deobfuscated = method.deobfuscated_signature();
                // deobfuscated name with obfuscated descriptor, and the other way round
                let loose_continuation_signature =
                    MethodSignature::new(method.deobfuscated_name(), method.descriptor().clone());
                let loose_duplicate_signature =
                    MethodSignature::new(method.obfuscated_name(), deobfuscated.descriptor().clone());

                let strict_continuation =
                    right.and_then(|right| right.get_method_mapping(&deobfuscated));
                let strict_duplicate =
                    right.and_then(|right| right.get_method_mapping(method.signature()));
                let (loose_continuation, loose_duplicate) = match right {
                    Some(right) if loose => (
                        distinct(
                            right.get_method_mapping(&loose_continuation_signature),
                            strict_continuation.as_ref(),
                        ),
                        distinct(
                            right.get_method_mapping(&loose_duplicate_signature),
                            strict_duplicate.as_ref(),
                        ),
                    ),
                    _ => (None, None),
                };

                self.merge_method_internal(
                    Some(&method),
                    MemberMatch::new(strict_continuation.as_ref(), loose_continuation.as_ref()),
                    MemberMatch::new(strict_duplicate.as_ref(), loose_duplicate.as_ref()),
                    target,
                )?;

                seen.insert(method.signature().clone());
                seen.insert(deobfuscated);
                if loose {
                    seen.insert(loose_continuation_signature);
                    seen.insert(loose_duplicate_signature);
                }
            }
        }

        if let Some(right) = right {
            for method in right.method_mappings() {
                if seen.contains(method.signature()) {
                    continue;
                }
                self.merge_method_internal(
                    None,
                    MemberMatch::strict_only(&method),
                    MemberMatch::none(),
                    target,
                )?;
            }
        }
        Ok(())
    }

    fn merge_method_internal(
        &self,
        left: Option<&Arc<MethodMapping>>,
        continuation: MemberMatch<'_, MethodMapping>,
        duplicate: MemberMatch<'_, MethodMapping>,
        target: &Arc<ClassMapping>,
    ) -> Result<Option<Arc<MethodMapping>>> {
        let handler = self.handler();
        let result = match left {
            Some(left) if duplicate.is_some() => handler.merge_duplicate_method_mappings(
                left,
                duplicate,
                continuation,
                target,
                &self.context,
            )?,
            Some(left) if continuation.is_some() => {
                handler.merge_method_mappings(left, continuation, target, &self.context)?
            }
            Some(left) => handler.add_left_method_mapping(left, target, &self.context)?,
            None => match continuation.first() {
                Some(right) => handler.add_right_method_mapping(right, target, &self.context)?,
                None => {
                    return Err(Error::InvalidState(format!(
                        "method merge in '{}' without a left method or right continuation",
                        target.full_obfuscated_name()
                    )))
                }
            },
        };

        let Some(mapping) = result.result() else {
            return Ok(None);
        };
        let owned = target
            .get_method_mapping(mapping.signature())
            .is_some_and(|registered| Arc::ptr_eq(&registered, mapping));
        ensure_owned(owned, || {
            format!("method '{}'", mapping.full_obfuscated_name())
        })?;

        if result.mappings_to_map().is_empty() {
            self.merge_method_children(left, None, mapping)?;
        } else {
            for right in result.mappings_to_map() {
                self.merge_method_children(left, Some(right), mapping)?;
            }
        }
        Ok(Some(mapping.clone()))
    }

    // ---------------------------------------------------------------------------------------
    // Parameters
    // ---------------------------------------------------------------------------------------

    fn merge_method_children(
        &self,
        left: Option<&Arc<MethodMapping>>,
        right: Option<&Arc<MethodMapping>>,
        target: &Arc<MethodMapping>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(left) = left {
            for param in left.parameter_mappings() {
                let matching = right.and_then(|right| right.get_parameter_mapping(param.index()));
                self.merge_parameter_internal(Some(&param), matching.as_ref(), target)?;
                seen.insert(param.index());
            }
        }
        if let Some(right) = right {
            for param in right.parameter_mappings() {
                if !seen.contains(&param.index()) {
                    self.merge_parameter_internal(None, Some(&param), target)?;
                }
            }
        }
        Ok(())
    }

    fn merge_parameter_internal(
        &self,
        left: Option<&Arc<ParameterMapping>>,
        right: Option<&Arc<ParameterMapping>>,
        target: &Arc<MethodMapping>,
    ) -> Result<Option<Arc<ParameterMapping>>> {
        let handler = self.handler();
        let merged = match (left, right) {
            (Some(left), Some(right)) => {
                handler.merge_parameter_mappings(left, right, target, &self.context)?
            }
            (Some(left), None) => handler.add_left_parameter_mapping(left, target, &self.context)?,
            (None, Some(right)) => {
                handler.add_right_parameter_mapping(right, target, &self.context)?
            }
            (None, None) => {
                return Err(Error::InvalidState(format!(
                    "parameter merge in '{}' without either parameter",
                    target.full_obfuscated_name()
                )))
            }
        };

        if let Some(mapping) = &merged {
            let owned = target
                .get_parameter_mapping(mapping.index())
                .is_some_and(|registered| Arc::ptr_eq(&registered, mapping));
            ensure_owned(owned, || {
                format!(
                    "parameter {} of '{}'",
                    mapping.index(),
                    target.full_obfuscated_name()
                )
            })?;
        }
        Ok(merged)
    }
}

/// Classify an explicit pair: equal keys make `right` a duplicate, otherwise a continuation
fn split_match<'m, T>(
    left: Option<&Arc<T>>,
    right: Option<&'m Arc<T>>,
    same_key: impl Fn(&T, &T) -> bool,
) -> (Option<&'m Arc<T>>, Option<&'m Arc<T>>) {
    match (left, right) {
        (Some(left), Some(right)) if same_key(&**left, &**right) => (None, Some(right)),
        (_, right) => (right, None),
    }
}

/// A loose match only counts when it is not the entity the strict lookup already found
fn distinct<T>(candidate: Option<Arc<T>>, strict: Option<&Arc<T>>) -> Option<Arc<T>> {
    candidate.filter(|found| !strict.is_some_and(|strict| Arc::ptr_eq(found, strict)))
}

fn ensure_owned(owned: bool, describe: impl FnOnce() -> String) -> Result<()> {
    if owned {
        return Ok(());
    }
    Err(Error::InconsistentMerge(format!(
        "handler returned {} which is not registered in the merge target",
        describe()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        merge::MergeResult,
        signatures::FieldSignature,
        test::mapping_pairs,
    };

    fn chain() -> (Arc<MappingSet>, Arc<MappingSet>) {
        let left = MappingSet::new();
        let a = left.create_top_level_class_mapping("a", "b");
        a.create_field_mapping(FieldSignature::untyped("f"), "g");
        a.create_inner_class_mapping("i", "j");
        a.create_method_mapping(MethodSignature::parse("m(La;)V").unwrap(), "n")
            .create_parameter_mapping(0, "p");

        let right = MappingSet::new();
        let b = right.create_top_level_class_mapping("b", "c");
        b.create_field_mapping(FieldSignature::untyped("g"), "h");
        b.create_inner_class_mapping("j", "k");
        b.create_method_mapping(MethodSignature::parse("n(Lb;)V").unwrap(), "o")
            .create_parameter_mapping(0, "q");
        right.create_top_level_class_mapping("x", "y");

        (left, right)
    }

    #[test]
    fn test_chained_merge() {
        let (left, right) = chain();
        let merged = MappingSetMerger::with_defaults(&left, &right).merge().unwrap();

        let a = merged.get_top_level_class_mapping("a").unwrap();
        assert_eq!(a.deobfuscated_name(), "c");
        assert_eq!(a.get_field_mapping_by_name("f").unwrap().deobfuscated_name(), "h");
        assert_eq!(a.get_inner_class_mapping("i").unwrap().deobfuscated_name(), "k");

        let method = a
            .get_method_mapping(&MethodSignature::parse("m(La;)V").unwrap())
            .unwrap();
        assert_eq!(method.deobfuscated_name(), "o");
        assert_eq!(method.get_parameter_mapping(0).unwrap().deobfuscated_name(), "q");

        assert_eq!(
            merged.get_top_level_class_mapping("x").unwrap().deobfuscated_name(),
            "y"
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_parallelism_does_not_change_result() {
        let (left, right) = chain();
        let expected = mapping_pairs(&MappingSetMerger::with_defaults(&left, &right).merge().unwrap());

        for parallelism in 1..=5 {
            let config = MergeConfig::builder().with_parallelism(parallelism).build();
            let merged = MappingSetMerger::new(&left, &right, config).merge().unwrap();
            assert_eq!(mapping_pairs(&merged), expected, "parallelism {parallelism}");
        }
    }

    #[test]
    fn test_single_entity_entry_points() {
        let (left, right) = chain();
        let merger = MappingSetMerger::with_defaults(&left, &right);
        let target = MappingSet::new();

        let a = left.get_top_level_class_mapping("a");
        let b = right.get_top_level_class_mapping("b");
        let merged = merger
            .merge_top_level_class(a.as_ref(), b.as_ref(), &target)
            .unwrap()
            .unwrap();
        assert_eq!(merged.deobfuscated_name(), "c");

        let error = merger.merge_top_level_class(None, None, &target).unwrap_err();
        assert!(matches!(error, Error::InvalidState(_)));

        let left_param = left
            .get_top_level_class_mapping("a")
            .unwrap()
            .method_mappings()[0]
            .get_parameter_mapping(0);
        let method = merged.method_mappings()[0].clone();
        let param = merger
            .merge_parameter(left_param.as_ref(), None, &method)
            .unwrap()
            .unwrap();
        assert_eq!(param.deobfuscated_name(), "p");
    }

    /// Marks fields merged as duplicates
    struct DuplicateMarker;

    impl MergeHandler for DuplicateMarker {
        fn merge_duplicate_field_mappings(
            &self,
            left: &Arc<FieldMapping>,
            _duplicate: MemberMatch<'_, FieldMapping>,
            _continuation: MemberMatch<'_, FieldMapping>,
            target: &ClassMapping,
            _context: &MergeContext<'_>,
        ) -> Result<Option<Arc<FieldMapping>>> {
            Ok(Some(target.create_field_mapping(left.signature().clone(), "duplicate")))
        }
    }

    #[test]
    fn test_single_field_pairs_by_obfuscated_name() {
        let left = MappingSet::new();
        let a = left.create_top_level_class_mapping("a", "b");
        let typed = a.create_field_mapping(FieldSignature::of("f", "I").unwrap(), "g");
        let right = MappingSet::new();
        let b = right.create_top_level_class_mapping("a", "c");
        let other_type = b.create_field_mapping(FieldSignature::of("f", "J").unwrap(), "h");
        let continued = b.create_field_mapping(FieldSignature::untyped("g"), "i");

        let config = MergeConfig::builder().with_handler(DuplicateMarker).build();
        let merger = MappingSetMerger::new(&left, &right, config);
        let target = MappingSet::new();
        let owner = target.create_top_level_class_mapping("a", "c");

        let merged = merger
            .merge_field(Some(&typed), Some(&other_type), &owner)
            .unwrap()
            .unwrap();
        assert_eq!(merged.deobfuscated_name(), "duplicate");

        let merged = merger
            .merge_field(Some(&typed), Some(&continued), &owner)
            .unwrap()
            .unwrap();
        assert_eq!(merged.deobfuscated_name(), "i");
    }

    struct StrayHandler {
        stray: Arc<MappingSet>,
    }

    impl MergeHandler for StrayHandler {
        fn add_right_top_level_class_mapping(
            &self,
            right: &Arc<ClassMapping>,
            _target: &MappingSet,
            _context: &MergeContext<'_>,
        ) -> Result<MergeResult<ClassMapping>> {
            let mapping = self
                .stray
                .create_top_level_class_mapping(right.obfuscated_name(), "stray");
            Ok(MergeResult::of(mapping))
        }
    }

    #[test]
    fn test_foreign_handler_result_is_rejected() {
        let (left, right) = chain();
        let config = MergeConfig::builder()
            .with_handler(StrayHandler {
                stray: MappingSet::new(),
            })
            .build();

        match MappingSetMerger::new(&left, &right, config).merge() {
            Err(Error::MergeFailed { source }) => {
                assert!(matches!(*source, Error::InconsistentMerge(_)));
            }
            other => panic!("expected a merge failure, got {other:?}"),
        }
    }
}
