use std::collections::HashMap;

/// Parent id used for entries without a parent.
pub const ROOT_PARENT: &str = "0";

/// Horizontal position of a level entry.
///
/// With no recorded children the entry takes slot `row_index` of `row_width` slots
/// centred on 0. Otherwise it sits at the midpoint of its children's extent (min and
/// max), regardless of how many children lie in between.
pub fn calc_x_position(
    known_child_xs: Option<&[f64]>,
    row_width: usize,
    row_index: usize,
    x_spacing: f64,
) -> f64 {
    match known_child_xs {
        Some(xs) if !xs.is_empty() => {
            let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            min + (max - min) / 2.0
        }
        _ => (row_index as f64 - (row_width as f64 - 1.0) / 2.0) * x_spacing,
    }
}

/// Child x-coordinates collected per parent while a pass walks up the levels.
#[derive(Debug, Clone, Default)]
pub struct ChildPositions {
    by_parent: HashMap<String, Vec<f64>>,
}

impl ChildPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `x` against `parent`, or against [`ROOT_PARENT`] when there is none.
    pub fn record(&mut self, parent: Option<&str>, x: f64) {
        let parent = parent.unwrap_or(ROOT_PARENT);
        self.by_parent.entry(parent.to_string()).or_default().push(x);
    }

    pub fn get(&self, parent: &str) -> Option<&[f64]> {
        self.by_parent.get(parent).map(Vec::as_slice)
    }
}
