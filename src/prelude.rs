//! # mapscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the mapscope library. Import this module to get quick access to the registry, the
//! mapping types and the merge engine.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all mapscope operations
pub use crate::Error;

/// The result type used throughout mapscope
pub use crate::Result;

// ================================================================================================
// Mapping Tree
// ================================================================================================

/// The registry of top-level class mappings
pub use crate::model::MappingSet;

/// Behaviour shared by every mapping kind; needed to call name accessors
pub use crate::model::Mapping;

/// Class, field, method and parameter mappings
pub use crate::model::{ClassMapping, FieldMapping, MethodMapping, ParameterMapping};

/// Where reversed and copied classes are placed
pub use crate::model::ClassTarget;

/// Handles for removing rename listeners
pub use crate::model::ListenerId;

// ================================================================================================
// Signatures
// ================================================================================================

/// Member keys
pub use crate::signatures::{FieldSignature, MethodSignature};

/// Descriptor types
pub use crate::signatures::{
    ArrayType, BaseType, FieldType, MethodDescriptor, ObjectType, Type,
};

// ================================================================================================
// Inheritance
// ================================================================================================

/// Hierarchy information and providers
pub use crate::inheritance::{
    AccessFlags, CachingInheritanceProvider, ClassInfo, InheritanceProvider, InheritanceType,
    MemoryInheritanceProvider,
};

// ================================================================================================
// Merging
// ================================================================================================

/// The merge engine and its configuration
pub use crate::merge::{
    DefaultMergeHandler, MappingSetMerger, MergeConfig, MergeContext, MergeHandler, MergeResult,
    MergeStrategy,
};

/// Name lookups for bytecode rewriting
pub use crate::remapper::Remapper;
