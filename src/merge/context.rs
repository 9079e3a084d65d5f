use std::sync::{Arc, OnceLock};

use crate::model::MappingSet;

/// The inputs of a merge, shared with every handler call.
///
/// Reversed views of either input are computed on first use and then reused by all workers.
pub struct MergeContext<'a> {
    left: &'a MappingSet,
    right: &'a MappingSet,
    left_reversed: OnceLock<Arc<MappingSet>>,
    right_reversed: OnceLock<Arc<MappingSet>>,
}

impl<'a> MergeContext<'a> {
    /// Create a context over the two inputs
    pub fn new(left: &'a MappingSet, right: &'a MappingSet) -> Self {
        MergeContext {
            left,
            right,
            left_reversed: OnceLock::new(),
            right_reversed: OnceLock::new(),
        }
    }

    /// The left input
    pub fn left(&self) -> &'a MappingSet {
        self.left
    }

    /// The right input
    pub fn right(&self) -> &'a MappingSet {
        self.right
    }

    /// The left input reversed, mapping its deobfuscated names back to obfuscated ones
    pub fn left_reversed(&self) -> &MappingSet {
        self.left_reversed.get_or_init(|| self.left.reverse())
    }

    /// The right input reversed
    pub fn right_reversed(&self) -> &MappingSet {
        self.right_reversed.get_or_init(|| self.right.reverse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mapping;

    #[test]
    fn test_reversed_views_are_cached() {
        let left = MappingSet::new();
        left.create_top_level_class_mapping("a", "b");
        let right = MappingSet::new();

        let context = MergeContext::new(&left, &right);
        let first = context.left_reversed() as *const MappingSet;
        let second = context.left_reversed() as *const MappingSet;

        assert_eq!(first, second);
        assert_eq!(
            context
                .left_reversed()
                .get_top_level_class_mapping("b")
                .unwrap()
                .deobfuscated_name(),
            "a"
        );
        assert!(context.right_reversed().is_empty());
    }
}
