// Copyright 2025 mapscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # mapscope
//!
//! A concurrent registry for JVM obfuscation mappings. `mapscope` records how the obfuscated
//! names of compiled classes, fields, methods and parameters map to readable names, translates
//! type descriptors between the two namespaces, completes classes with the mappings of members
//! they inherit, and merges two mapping sets into one.
//!
//! ## Features
//!
//! - **Mapping tree** - Top-level and inner classes owning fields, methods and parameters
//! - **Descriptor translation** - Rewrite field types and method descriptors, including
//!   partially mapped inner class names
//! - **Inheritance completion** - Pull inherited and covariantly overridden members into a
//!   class, driven by a pluggable hierarchy provider
//! - **Merging** - Chain `A -> B` and `B -> C` into `A -> C`, with pluggable handlers, strict
//!   or loose member matching, and parallel processing of top-level classes
//! - **Thread safe** - Every registry operation takes `&self` and may be called concurrently
//!
//! ## Quick Start
//!
//! ```rust
//! use mapscope::prelude::*;
//!
//! let mappings = MappingSet::new();
//! let class = mappings.create_top_level_class_mapping("ght", "uk/jamierocks/Test");
//! class.create_field_mapping(FieldSignature::untyped("rft"), "log");
//!
//! let method = class.get_or_create_method_mapping_of("hyuu", "(Lght;)V")?;
//! method.set_deobfuscated_name("helloWorld");
//!
//! assert_eq!(
//!     method.deobfuscated_signature().to_string(),
//!     "helloWorld(Luk/jamierocks/Test;)V"
//! );
//! # Ok::<(), mapscope::Error>(())
//! ```
//!
//! ### Merging
//!
//! ```rust
//! use mapscope::prelude::*;
//!
//! let left = MappingSet::new();
//! left.create_top_level_class_mapping("a", "com/example/Intermediate");
//!
//! let right = MappingSet::new();
//! right.create_top_level_class_mapping("com/example/Intermediate", "com/example/Final");
//!
//! let merged = left.merge(&right)?;
//! let class = merged.get_top_level_class_mapping("a").unwrap();
//! assert_eq!(class.deobfuscated_name(), "com/example/Final");
//! # Ok::<(), mapscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`signatures`] - Field and method signatures and the descriptor type grammar
//! - [`model`] - The mapping tree and the [`model::MappingSet`] registry
//! - [`inheritance`] - Class hierarchy information for completion
//! - [`merge`] - The mapping set merge engine
//! - [`remapper`] - Name lookups for bytecode rewriting tools
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! `mapscope` logs through the [`log`] facade and never installs a logger. Merges report
//! progress at `debug` level and individual tasks at `trace` level.
//!
//! ## Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use mapscope::prelude::*;
///
/// let mappings = MappingSet::new();
/// let class = mappings.get_or_create_class_mapping("a$b");
/// assert_eq!(class.full_obfuscated_name(), "a$b");
/// ```
pub mod prelude;

/// JVM field and method signatures, and the descriptor grammar they are built from
///
/// Signatures are the keys members are stored under inside a class mapping. Types render
/// back to descriptor text through [`std::fmt::Display`].
///
/// # Key Types
///
/// - [`signatures::FieldSignature`] - Field name plus optional type
/// - [`signatures::MethodSignature`] - Method name plus descriptor
/// - [`signatures::FieldType`], [`signatures::Type`], [`signatures::MethodDescriptor`]
/// - [`signatures::DescriptorParser`] - Descriptor text parser
pub mod signatures;

/// The mapping tree: registry, classes, fields, methods and parameters
///
/// # Examples
///
/// ```rust
/// use mapscope::model::{Mapping, MappingSet};
///
/// let mappings = MappingSet::new();
/// let inner = mappings.get_or_create_class_mapping("a$b");
/// inner.set_deobfuscated_name("Outer$Inner");
/// assert_eq!(inner.deobfuscated_name(), "Inner");
/// ```
pub mod model;

/// Class hierarchy information and the provider trait used for completion
pub mod inheritance;

/// Merging two mapping sets
pub mod merge;

/// Name lookups in the shape bytecode remapping tools expect
pub mod remapper;

/// `mapscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `mapscope` Error type
///
/// The main error type for all operations in this crate. Lookups never fail; errors cover
/// malformed descriptor text and merge failures.
///
/// # Examples
///
/// ```rust
/// use mapscope::{Error, signatures::FieldSignature};
///
/// match FieldSignature::of("a", "Lbroken") {
///     Ok(signature) => println!("Parsed {signature}"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// The registry of class mappings, see [`model::MappingSet`]
pub use model::MappingSet;
