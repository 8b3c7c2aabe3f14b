use crate::models::{PathEntry, PathNode};

/// Per-depth ordered entries of a layout forest. Index 0 is the root level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelMatrix {
    levels: Vec<Vec<PathEntry>>,
}

impl LevelMatrix {
    /// Flatten a forest into levels.
    ///
    /// Entries within a level follow depth-first visitation order of the forest, siblings
    /// in the order given. Duplicates are kept positionally.
    pub fn build(forest: &[PathNode]) -> Self {
        let mut matrix = Self::default();
        if !forest.is_empty() {
            matrix.visit(forest, 0);
        }
        matrix
    }

    fn visit(&mut self, nodes: &[PathNode], depth: usize) {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, Vec::new);
        }
        for node in nodes {
            self.levels[depth].push(node.entry());
            if !node.children.is_empty() {
                self.visit(&node.children, depth + 1);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, depth: usize) -> Option<&[PathEntry]> {
        self.levels.get(depth).map(Vec::as_slice)
    }

    /// Levels from deepest to shallowest, paired with their depth.
    pub fn bottom_up(&self) -> impl Iterator<Item = (usize, &[PathEntry])> {
        self.levels
            .iter()
            .enumerate()
            .rev()
            .map(|(depth, level)| (depth, level.as_slice()))
    }

    /// Entries as their external id strings, mostly for diagnostics and tests.
    pub fn to_ids(&self) -> Vec<Vec<String>> {
        self.levels
            .iter()
            .map(|level| level.iter().map(ToString::to_string).collect())
            .collect()
    }
}
