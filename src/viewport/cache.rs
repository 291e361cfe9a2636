use std::collections::BTreeMap;

/// Measured row heights keyed by row index.
#[derive(Debug, Clone, PartialEq)]
pub struct RowHeightCache {
    estimated: f64,
    measured: BTreeMap<usize, f64>,
}

impl RowHeightCache {
    pub fn new(estimated: f64) -> Self {
        Self {
            estimated: estimated.max(0.0),
            measured: BTreeMap::new(),
        }
    }

    pub fn estimated(&self) -> f64 {
        self.estimated
    }

    /// Record a measurement. Returns `true` when the stored height changed.
    pub fn measure(&mut self, index: usize, height: f64) -> bool {
        let height = height.max(0.0);
        match self.measured.insert(index, height) {
            Some(previous) => previous != height,
            None => height != self.estimated,
        }
    }

    pub fn height(&self, index: usize) -> f64 {
        self.measured.get(&index).copied().unwrap_or(self.estimated)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.contains_key(&index)
    }

    pub fn measured_count(&self) -> usize {
        self.measured.len()
    }

    /// Distance from the top of the list to the top of row `index`.
    pub fn offset_of(&self, index: usize) -> f64 {
        let correction: f64 = self
            .measured
            .range(..index)
            .map(|(_, h)| h - self.estimated)
            .sum();
        index as f64 * self.estimated + correction
    }

    /// Drop measurements for rows at or beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        self.measured.retain(|&i, _| i < len);
    }

    /// Forget every measurement.
    pub fn clear(&mut self) {
        self.measured.clear();
    }
}
