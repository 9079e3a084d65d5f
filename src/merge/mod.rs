//! Merging two mapping sets into a third.
//!
//! Merging combines a *left* set (`A -> B`) with a *right* set. For every left entry the right
//! set is consulted twice:
//!
//! - a **continuation** is a right entry keyed by the left entry's *deobfuscated* name. The
//!   right set maps `B -> C`, so the merged entry chains to `A -> C`.
//! - a **duplicate** is a right entry keyed by the left entry's *obfuscated* name. The right
//!   set also describes `A`, and its name replaces the left one.
//!
//! Right entries matching neither a left obfuscated nor deobfuscated name are passed through.
//! How each case turns into a target entry is decided by a [`MergeHandler`]; the default
//! [`DefaultMergeHandler`] implements the behaviour above.
//!
//! # Key Components
//!
//! - [`MappingSetMerger`] - Drives the merge, classes in parallel, members recursively
//! - [`MergeConfig`] - Handler, field and method matching strategies, parallelism
//! - [`MergeHandler`] - Decides what each matched pair becomes in the target
//! - [`MergeContext`] - The two inputs plus lazily computed reversed views
//! - [`MergeResult`] - A handler's output and the right entries whose children to merge
//! - [`MemberMatch`] - The strict and loose right matches for a left member
//!
//! # Matching Strategies
//!
//! With [`MergeStrategy::Strict`] members match only on their full signature. With
//! [`MergeStrategy::Loose`] a field also matches by name alone and a method also matches when
//! its name agrees under one namespace and its descriptor under the other.
//!
//! # Examples
//!
//! ```rust
//! use mapscope::model::{Mapping, MappingSet};
//!
//! let left = MappingSet::new();
//! left.create_top_level_class_mapping("a", "b");
//! let right = MappingSet::new();
//! right.create_top_level_class_mapping("b", "c");
//!
//! let merged = left.merge(&right)?;
//! assert_eq!(merged.get_top_level_class_mapping("a").unwrap().deobfuscated_name(), "c");
//! # Ok::<(), mapscope::Error>(())
//! ```

mod config;
mod context;
mod handler;
mod merger;

use std::sync::Arc;

use strum::{Display, EnumIter};

pub use config::{MergeConfig, MergeConfigBuilder};
pub use context::MergeContext;
pub use handler::{DefaultMergeHandler, MergeHandler};
pub use merger::MappingSetMerger;

/// How members of the right set are located for a left member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum MergeStrategy {
    /// Match only on the full signature
    #[default]
    Strict,
    /// Additionally match on partial signatures
    Loose,
}

/// The right-set members found for one left member under one relation.
///
/// `strict` is the match on the full signature. `loose` is a partial-signature match found only
/// under [`MergeStrategy::Loose`], and never the same entity as `strict`.
pub struct MemberMatch<'m, T> {
    strict: Option<&'m Arc<T>>,
    loose: Option<&'m Arc<T>>,
}

impl<'m, T> MemberMatch<'m, T> {
    /// A match from its strict and loose parts
    pub fn new(strict: Option<&'m Arc<T>>, loose: Option<&'m Arc<T>>) -> Self {
        MemberMatch { strict, loose }
    }

    /// Only a strict match
    pub fn strict_only(strict: &'m Arc<T>) -> Self {
        Self::new(Some(strict), None)
    }

    /// No match at all
    pub fn none() -> Self {
        Self::new(None, None)
    }

    /// The full-signature match
    pub fn strict(&self) -> Option<&'m Arc<T>> {
        self.strict
    }

    /// The partial-signature match
    pub fn loose(&self) -> Option<&'m Arc<T>> {
        self.loose
    }

    /// The strict match, else the loose one
    pub fn first(&self) -> Option<&'m Arc<T>> {
        self.strict.or(self.loose)
    }

    /// Returns `true` if either match was found
    pub fn is_some(&self) -> bool {
        self.strict.is_some() || self.loose.is_some()
    }
}

impl<T> Clone for MemberMatch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MemberMatch<'_, T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for MemberMatch<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberMatch")
            .field("strict", &self.strict)
            .field("loose", &self.loose)
            .finish()
    }
}

/// What a handler produced for a matched pair.
///
/// `result` is the entry created in the target, if any. `mappings_to_map` lists the right-set
/// entries whose children should be merged into `result`; when it is empty the children of the
/// left entry are merged on their own.
#[derive(Debug)]
pub struct MergeResult<T> {
    result: Option<Arc<T>>,
    mappings_to_map: Vec<Arc<T>>,
}

impl<T> MergeResult<T> {
    /// A result with explicit right entries to descend into
    pub fn new(result: Option<Arc<T>>, mappings_to_map: Vec<Arc<T>>) -> Self {
        MergeResult {
            result,
            mappings_to_map,
        }
    }

    /// A result whose children come from the left entry only
    pub fn of(result: Arc<T>) -> Self {
        Self::new(Some(result), Vec::new())
    }

    /// A result whose children come from the left entry and `right`
    pub fn with(result: Arc<T>, right: Arc<T>) -> Self {
        Self::new(Some(result), vec![right])
    }

    /// Nothing is produced and nothing below it is merged
    pub fn empty() -> Self {
        Self::new(None, Vec::new())
    }

    /// The produced target entry
    pub fn result(&self) -> Option<&Arc<T>> {
        self.result.as_ref()
    }

    /// Right entries whose children get merged into the result
    pub fn mappings_to_map(&self) -> &[Arc<T>] {
        &self.mappings_to_map
    }
}
