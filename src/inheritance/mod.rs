//! Class hierarchy information used to complete mappings with inherited members.
//!
//! Mapping files only describe names; whether a member is visible to a subclass depends on the
//! class files. This module models the small part of that information completion needs, and
//! the [`InheritanceProvider`] trait through which callers supply it.
//!
//! # Key Components
//!
//! - [`ClassInfo`] - A class's parents and its members' visibility
//! - [`InheritanceType`] - Visibility levels relevant to inheritance
//! - [`AccessFlags`] - Raw JVM access flags, convertible to an [`InheritanceType`]
//! - [`InheritanceProvider`] - Source of [`ClassInfo`] plus inheritance and subtyping rules
//! - [`MemoryInheritanceProvider`], [`CachingInheritanceProvider`] - Ready-made providers
//!
//! # Examples
//!
//! ```rust
//! use mapscope::inheritance::{AccessFlags, ClassInfo, InheritanceProvider, MemoryInheritanceProvider};
//! use mapscope::signatures::MethodSignature;
//!
//! let provider = MemoryInheritanceProvider::new();
//! provider.register(
//!     ClassInfo::builder("com/example/Base")
//!         .method(MethodSignature::parse("run()V")?, AccessFlags::PUBLIC)
//!         .build(),
//! );
//! provider.register(ClassInfo::builder("com/example/Impl").super_class("com/example/Base").build());
//!
//! let child = provider.provide("com/example/Impl").unwrap();
//! assert_eq!(provider.provide_parents(&child).len(), 1);
//! # Ok::<(), mapscope::Error>(())
//! ```

mod provider;

use std::{collections::HashMap, fmt};

use bitflags::bitflags;
use strum::{Display, EnumIter};

pub use provider::{CachingInheritanceProvider, InheritanceProvider, MemoryInheritanceProvider};

use crate::signatures::{FieldSignature, MethodSignature};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// JVM access flags for classes, fields and methods
    pub struct AccessFlags: u16 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible only in the declaring class
        const PRIVATE = 0x0002;
        /// Visible to subclasses and the package
        const PROTECTED = 0x0004;
        /// Belongs to the class rather than instances
        const STATIC = 0x0008;
        /// Cannot be overridden or reassigned
        const FINAL = 0x0010;
        /// `synchronized` method, or `ACC_SUPER` on classes
        const SYNCHRONIZED = 0x0020;
        /// Bridge method generated by the compiler
        const BRIDGE = 0x0040;
        /// Variable arity method
        const VARARGS = 0x0080;
        /// Native method
        const NATIVE = 0x0100;
        /// The class is an interface
        const INTERFACE = 0x0200;
        /// Abstract class or method
        const ABSTRACT = 0x0400;
        /// Strict floating point
        const STRICT = 0x0800;
        /// Not present in source
        const SYNTHETIC = 0x1000;
        /// The class is an annotation type
        const ANNOTATION = 0x2000;
        /// Enum class or constant
        const ENUM = 0x4000;
    }
}

/// How far a member is visible down the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum InheritanceType {
    /// Inherited by every subclass
    Public,
    /// Inherited by every subclass
    Protected,
    /// Inherited by subclasses in the same package
    PackagePrivate,
    /// Never inherited
    Private,
}

impl InheritanceType {
    /// Derive the inheritance type from access flags
    #[must_use]
    pub fn from_access(flags: AccessFlags) -> Self {
        if flags.contains(AccessFlags::PUBLIC) {
            InheritanceType::Public
        } else if flags.contains(AccessFlags::PROTECTED) {
            InheritanceType::Protected
        } else if flags.contains(AccessFlags::PRIVATE) {
            InheritanceType::Private
        } else {
            InheritanceType::PackagePrivate
        }
    }

    /// Returns `true` if a member with this visibility passes from a class in `parent_package`
    /// to a subclass in `child_package`
    #[must_use]
    pub fn can_inherit(self, parent_package: &str, child_package: &str) -> bool {
        match self {
            InheritanceType::Public | InheritanceType::Protected => true,
            InheritanceType::PackagePrivate => parent_package == child_package,
            InheritanceType::Private => false,
        }
    }
}

impl From<AccessFlags> for InheritanceType {
    fn from(value: AccessFlags) -> Self {
        InheritanceType::from_access(value)
    }
}

/// What completion needs to know about one class, in the obfuscated namespace.
#[derive(Clone, PartialEq, Eq)]
pub struct ClassInfo {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: HashMap<FieldSignature, InheritanceType>,
    fields_by_name: HashMap<String, InheritanceType>,
    methods: HashMap<MethodSignature, InheritanceType>,
}

impl ClassInfo {
    /// Start building the info for class `name`
    pub fn builder(name: impl Into<String>) -> ClassInfoBuilder {
        ClassInfoBuilder {
            info: ClassInfo {
                name: name.into().replace('.', "/"),
                super_name: None,
                interfaces: Vec::new(),
                fields: HashMap::new(),
                fields_by_name: HashMap::new(),
                methods: HashMap::new(),
            },
        }
    }

    /// Internal name of the class
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package, everything before the last `/`
    #[must_use]
    pub fn package(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(package, _)| package)
    }

    /// The superclass, if any
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Implemented interfaces
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// The superclass followed by all interfaces
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.super_name
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }

    /// Declared fields
    #[must_use]
    pub fn fields(&self) -> &HashMap<FieldSignature, InheritanceType> {
        &self.fields
    }

    /// Declared methods
    #[must_use]
    pub fn methods(&self) -> &HashMap<MethodSignature, InheritanceType> {
        &self.methods
    }

    /// Visibility of a declared field; untyped signatures match by name
    #[must_use]
    pub fn field_inheritance(&self, signature: &FieldSignature) -> Option<InheritanceType> {
        if let Some(found) = self.fields.get(signature) {
            return Some(*found);
        }
        match signature.field_type() {
            None => self.fields_by_name.get(signature.name()).copied(),
            Some(_) => self.fields.get(&signature.without_type()).copied(),
        }
    }

    /// Visibility of a declared method
    #[must_use]
    pub fn method_inheritance(&self, signature: &MethodSignature) -> Option<InheritanceType> {
        self.methods.get(signature).copied()
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("super_name", &self.super_name)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Builder for [`ClassInfo`]
#[derive(Debug, Clone)]
pub struct ClassInfoBuilder {
    info: ClassInfo,
}

impl ClassInfoBuilder {
    /// Set the superclass
    #[must_use]
    pub fn super_class(mut self, name: impl Into<String>) -> Self {
        self.info.super_name = Some(name.into().replace('.', "/"));
        self
    }

    /// Add an implemented interface
    #[must_use]
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.info.interfaces.push(name.into().replace('.', "/"));
        self
    }

    /// Declare a field
    #[must_use]
    pub fn field(mut self, signature: FieldSignature, access: AccessFlags) -> Self {
        let inheritance = InheritanceType::from_access(access);
        self.info
            .fields_by_name
            .insert(signature.name().to_string(), inheritance);
        self.info.fields.insert(signature, inheritance);
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method(mut self, signature: MethodSignature, access: AccessFlags) -> Self {
        self.info
            .methods
            .insert(signature, InheritanceType::from_access(access));
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> ClassInfo {
        self.info
    }
}
