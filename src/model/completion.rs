//! Inheritance completion: copying inherited member mappings down the class hierarchy.
//!
//! Mapping formats usually record a member only on the class that declares it. Tools that
//! look members up on the class they are *accessed* through need the inherited entries too.
//! Completing a class pulls in the mappings of every member it inherits from its parents,
//! plus overrides with a covariant (narrowed) return type.

use std::{
    collections::HashMap,
    sync::atomic::Ordering,
};

use log::{debug, trace, warn};

use crate::{
    inheritance::{ClassInfo, InheritanceProvider},
    model::{ClassMapping, Mapping},
    signatures::MethodSignature,
};

/// Deepest parent chain followed before completion gives up; guards against cyclic hierarchies
const MAX_HIERARCHY_DEPTH: usize = 256;

impl ClassMapping {
    /// Returns `true` once inheritance completion has run for this class
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Complete this class using the provider's description of it.
    ///
    /// Does nothing if the class was already completed or the provider does not know it.
    pub fn complete<P>(&self, provider: &P)
    where
        P: InheritanceProvider + ?Sized,
    {
        if self.is_completed() {
            return;
        }
        match provider.provide(&self.full_obfuscated_name()) {
            Some(info) => self.complete_with(provider, &info),
            None => trace!(
                "No class info for '{}', skipping completion",
                self.full_obfuscated_name()
            ),
        }
    }

    /// Complete this class from an explicit [`ClassInfo`].
    ///
    /// Parents are completed first (creating empty mappings for them if needed). Then, for
    /// every parent:
    /// - each parent field that is not shadowed here and may be inherited is added by reference
    /// - each parent method that may be inherited is added by reference
    /// - each parent method that this class overrides with a narrower return type is added
    ///   under this class's own signature
    ///
    /// Completion runs at most once per class.
    pub fn complete_with<P>(&self, provider: &P, info: &ClassInfo)
    where
        P: InheritanceProvider + ?Sized,
    {
        self.complete_at_depth(provider, info, 0);
    }

    fn complete_at_depth<P>(&self, provider: &P, info: &ClassInfo, depth: usize)
    where
        P: InheritanceProvider + ?Sized,
    {
        if self.is_completed() {
            return;
        }
        if depth > MAX_HIERARCHY_DEPTH {
            warn!(
                "Class hierarchy of '{}' exceeds {} levels, stopping completion",
                info.name(),
                MAX_HIERARCHY_DEPTH
            );
            return;
        }
        let Some(mappings) = self.mappings() else {
            warn!(
                "Mapping set of '{}' was dropped, cannot complete",
                self.full_obfuscated_name()
            );
            return;
        };

        let mut methods_by_name: HashMap<&str, Vec<&MethodSignature>> = HashMap::new();
        for signature in info.methods().keys() {
            methods_by_name
                .entry(signature.name())
                .or_default()
                .push(signature);
        }

        for parent in provider.provide_parents(info) {
            let parent_mapping = mappings.get_or_create_class_mapping(parent.name());
            parent_mapping.complete_at_depth(provider, &parent, depth + 1);

            for field in parent_mapping.field_mappings() {
                if self.compute_field_mapping(field.signature()).is_some() {
                    continue;
                }
                if provider.can_inherit_field(&parent, info, field.signature()) {
                    self.insert_field_if_absent(field);
                }
            }

            for method in parent_mapping.method_mappings() {
                if provider.can_inherit_method(&parent, info, method.signature()) {
                    self.insert_method_if_absent(method.signature().clone(), method.clone());
                }

                let Some(candidates) = methods_by_name.get(method.obfuscated_name()) else {
                    continue;
                };
                let inherited = method.descriptor();
                for local in candidates {
                    let local_descriptor = local.descriptor();
                    if local_descriptor.params() != inherited.params() {
                        continue;
                    }
                    if provider
                        .is_assignable_from(inherited.return_type(), local_descriptor.return_type())
                    {
                        self.insert_method_if_absent((*local).clone(), method.clone());
                    }
                }
            }
        }

        self.completed.store(true, Ordering::Release);
        debug!("Completed class mapping '{}'", self.full_obfuscated_name());
    }
}
