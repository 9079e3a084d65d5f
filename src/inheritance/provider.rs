use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{
    inheritance::{ClassInfo, InheritanceType},
    signatures::{FieldSignature, FieldType, MethodSignature, Type},
};

/// Deepest parent chain walked when looking for an inherited member declaration
const MAX_LOOKUP_DEPTH: usize = 256;

/// Source of class hierarchy information.
///
/// Only [`InheritanceProvider::provide`] is required. The remaining methods encode the JVM's
/// inheritance and assignability rules in terms of `provide`, and may be overridden by
/// providers with better knowledge.
pub trait InheritanceProvider: Send + Sync {
    /// Describe the class with this internal name, if known
    fn provide(&self, name: &str) -> Option<Arc<ClassInfo>>;

    /// The known parents of `info`: superclass first, then interfaces
    fn provide_parents(&self, info: &ClassInfo) -> Vec<Arc<ClassInfo>> {
        info.parents().filter_map(|name| self.provide(name)).collect()
    }

    /// Whether `child` inherits the field `signature` through `parent`.
    ///
    /// If `parent` declares the field its visibility decides. Otherwise the field may itself
    /// be inherited by `parent`, so its own parents are searched.
    fn can_inherit_field(
        &self,
        parent: &ClassInfo,
        child: &ClassInfo,
        signature: &FieldSignature,
    ) -> bool {
        inherits(self, parent, child, 0, &|info: &ClassInfo| {
            info.field_inheritance(signature)
        })
    }

    /// Whether `child` inherits the method `signature` through `parent`
    fn can_inherit_method(
        &self,
        parent: &ClassInfo,
        child: &ClassInfo,
        signature: &MethodSignature,
    ) -> bool {
        inherits(self, parent, child, 0, &|info: &ClassInfo| {
            info.method_inheritance(signature)
        })
    }

    /// Whether a value of type `source` can be used where `target` is expected
    fn is_assignable_from(&self, target: &Type, source: &Type) -> bool {
        if target == source {
            return true;
        }
        match (target.as_field_type(), source.as_field_type()) {
            (Some(target), Some(source)) => field_assignable(self, target, source),
            _ => false,
        }
    }

    /// Whether class `name` is `ancestor` or extends / implements it, directly or not
    fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([name.to_string()]);
        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(info) = self.provide(&current) {
                queue.extend(info.parents().map(str::to_string));
            }
        }
        false
    }
}

fn inherits<P, F>(
    provider: &P,
    parent: &ClassInfo,
    child: &ClassInfo,
    depth: usize,
    declared: &F,
) -> bool
where
    P: InheritanceProvider + ?Sized,
    F: Fn(&ClassInfo) -> Option<InheritanceType>,
{
    if let Some(inheritance) = declared(parent) {
        return inheritance.can_inherit(parent.package(), child.package());
    }
    if depth >= MAX_LOOKUP_DEPTH {
        return false;
    }
    provider
        .provide_parents(parent)
        .iter()
        .any(|grandparent| inherits(provider, grandparent, child, depth + 1, declared))
}

/// Every array type is assignable to these classes
const ARRAY_SUPERTYPES: [&str; 3] = [
    "java/lang/Object",
    "java/lang/Cloneable",
    "java/io/Serializable",
];

fn field_assignable<P>(provider: &P, target: &FieldType, source: &FieldType) -> bool
where
    P: InheritanceProvider + ?Sized,
{
    match (target, source) {
        (FieldType::Base(target), FieldType::Base(source)) => target == source,
        (FieldType::Object(target), FieldType::Object(source)) => {
            target.class_name() == "java/lang/Object"
                || provider.is_subclass_of(source.class_name(), target.class_name())
        }
        (FieldType::Object(target), FieldType::Array(_)) => {
            ARRAY_SUPERTYPES.contains(&target.class_name())
        }
        (FieldType::Array(target), FieldType::Array(source)) => {
            if target.dimensions() == source.dimensions() {
                match (target.component(), source.component()) {
                    (FieldType::Object(_), FieldType::Object(_)) => {
                        field_assignable(provider, target.component(), source.component())
                    }
                    (target, source) => target == source,
                }
            } else if target.dimensions() < source.dimensions() {
                // Object[] accepts int[][]: the extra dimensions make the element a reference
                match target.component() {
                    FieldType::Object(object) => ARRAY_SUPERTYPES.contains(&object.class_name()),
                    _ => false,
                }
            } else {
                false
            }
        }
        _ => false,
    }
}

/// A provider backed by a fixed in-memory table of classes
#[derive(Debug, Default)]
pub struct MemoryInheritanceProvider {
    classes: DashMap<String, Arc<ClassInfo>>,
}

impl MemoryInheritanceProvider {
    /// Create an empty provider
    #[must_use]
    pub fn new() -> Self {
        MemoryInheritanceProvider {
            classes: DashMap::new(),
        }
    }

    /// Add or replace a class description
    pub fn register(&self, info: ClassInfo) -> Arc<ClassInfo> {
        let info = Arc::new(info);
        self.classes.insert(info.name().to_string(), info.clone());
        info
    }

    /// Number of known classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no classes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassInfo> for MemoryInheritanceProvider {
    fn from_iter<T: IntoIterator<Item = ClassInfo>>(iter: T) -> Self {
        let provider = MemoryInheritanceProvider::new();
        for info in iter {
            provider.register(info);
        }
        provider
    }
}

impl InheritanceProvider for MemoryInheritanceProvider {
    fn provide(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }
}

/// Memoizes another provider's answers, including classes it does not know
#[derive(Debug)]
pub struct CachingInheritanceProvider<P> {
    inner: P,
    cache: DashMap<String, Option<Arc<ClassInfo>>>,
}

impl<P: InheritanceProvider> CachingInheritanceProvider<P> {
    /// Wrap `inner`
    pub fn new(inner: P) -> Self {
        CachingInheritanceProvider {
            inner,
            cache: DashMap::new(),
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Forget every cached answer
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<P: InheritanceProvider> InheritanceProvider for CachingInheritanceProvider<P> {
    fn provide(&self, name: &str) -> Option<Arc<ClassInfo>> {
        if let Some(cached) = self.cache.get(name) {
            return cached.value().clone();
        }

        let provided = self.inner.provide(name);
        self.cache
            .entry(name.to_string())
            .or_insert(provided)
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        inheritance::AccessFlags,
        signatures::{parse_field_type, MethodDescriptor},
        test::{create_class_info, create_provider},
    };

    fn ty(text: &str) -> Type {
        MethodDescriptor::parse(&format!("(){text}"))
            .unwrap()
            .return_type()
            .clone()
    }

    #[test]
    fn test_assignability() {
        let provider = create_provider(vec![
            create_class_info("a/Base", None, &[], &[]),
            ClassInfo::builder("a/Impl")
                .super_class("a/Base")
                .interface("a/Iface")
                .build(),
        ]);

        assert!(provider.is_assignable_from(&ty("La/Base;"), &ty("La/Impl;")));
        assert!(provider.is_assignable_from(&ty("La/Iface;"), &ty("La/Impl;")));
        assert!(!provider.is_assignable_from(&ty("La/Impl;"), &ty("La/Base;")));
        assert!(provider.is_assignable_from(&ty("Ljava/lang/Object;"), &ty("Lx/Unknown;")));
        assert!(provider.is_assignable_from(&ty("Ljava/lang/Object;"), &ty("[I")));
        assert!(provider.is_assignable_from(&ty("[La/Base;"), &ty("[La/Impl;")));
        assert!(provider.is_assignable_from(&ty("[Ljava/lang/Object;"), &ty("[[I")));
        assert!(!provider.is_assignable_from(&ty("[J"), &ty("[I")));
        assert!(!provider.is_assignable_from(&ty("I"), &ty("V")));
        assert!(provider.is_assignable_from(&ty("V"), &ty("V")));
    }

    #[test]
    fn test_inherited_declaration_lookup() {
        let provider = create_provider(vec![
            create_class_info("a", None, &["f"], &["m()V"]),
            create_class_info("b", Some("a"), &[], &[]),
            create_class_info("c", Some("b"), &[], &[]),
        ]);
        let b = provider.provide("b").unwrap();
        let c = provider.provide("c").unwrap();

        let field = FieldSignature::new("f", Some(parse_field_type("I").unwrap()));
        assert!(provider.can_inherit_field(&b, &c, &field));
        assert!(provider.can_inherit_method(&b, &c, &MethodSignature::parse("m()V").unwrap()));
        assert!(!provider.can_inherit_method(&b, &c, &MethodSignature::parse("n()V").unwrap()));
    }

    #[test]
    fn test_private_declaration_blocks() {
        let provider = create_provider(vec![
            ClassInfo::builder("a")
                .field(FieldSignature::untyped("f"), AccessFlags::PRIVATE)
                .build(),
            create_class_info("b", Some("a"), &[], &[]),
        ]);
        let a = provider.provide("a").unwrap();
        let b = provider.provide("b").unwrap();
        assert!(!provider.can_inherit_field(&a, &b, &FieldSignature::untyped("f")));
    }

    struct CountingProvider {
        inner: MemoryInheritanceProvider,
        calls: AtomicUsize,
    }

    impl InheritanceProvider for CountingProvider {
        fn provide(&self, name: &str) -> Option<Arc<ClassInfo>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.provide(name)
        }
    }

    #[test]
    fn test_caching_provider() {
        let caching = CachingInheritanceProvider::new(CountingProvider {
            inner: create_provider(vec![create_class_info("a", None, &[], &[])]),
            calls: AtomicUsize::new(0),
        });

        assert!(caching.provide("a").is_some());
        assert!(caching.provide("a").is_some());
        assert!(caching.provide("missing").is_none());
        assert!(caching.provide("missing").is_none());
        assert_eq!(caching.inner().calls.load(Ordering::SeqCst), 2);

        caching.clear();
        assert!(caching.provide("a").is_some());
        assert_eq!(caching.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_subclass_walk_handles_cycles() {
        let provider = create_provider(vec![
            create_class_info("a", Some("b"), &[], &[]),
            create_class_info("b", Some("a"), &[], &[]),
        ]);
        assert!(provider.is_subclass_of("a", "b"));
        assert!(!provider.is_subclass_of("a", "c"));
    }
}
