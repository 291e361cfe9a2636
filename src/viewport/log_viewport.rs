use std::ops::Range;

use crate::config::ViewportConfig;

use super::cache::RowHeightCache;

/// Scroll state of a virtualized, auto-following log list.
#[derive(Debug, Clone)]
pub struct LogViewport {
    config: ViewportConfig,
    cache: RowHeightCache,
    rows: usize,
    height: f64,
    scroll_top: f64,
    following: bool,
}

impl LogViewport {
    pub fn new(config: ViewportConfig, height: f64) -> Self {
        Self {
            cache: RowHeightCache::new(config.estimated_row_height),
            config,
            rows: 0,
            height: height.max(0.0),
            scroll_top: 0.0,
            following: true,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn cache(&self) -> &RowHeightCache {
        &self.cache
    }

    /// Replace the data set. Every cached height belongs to the old rows and
    /// is dropped.
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
        self.cache.clear();
        self.settle();
    }

    /// New rows arrived at the end; measurements of existing rows stay valid.
    pub fn append_rows(&mut self, count: usize) {
        self.rows += count;
        self.settle();
    }

    /// Record the rendered height of a row.
    pub fn measure_row(&mut self, index: usize, height: f64) {
        if index >= self.rows {
            tracing::debug!(index, rows = self.rows, "ignoring measurement for row out of range");
            return;
        }
        if self.cache.measure(index, height) {
            self.settle();
        }
    }

    pub fn total_height(&self) -> f64 {
        self.cache.offset_of(self.rows)
    }

    pub fn offset_of(&self, index: usize) -> f64 {
        self.cache.offset_of(index.min(self.rows))
    }

    fn max_scroll(&self) -> f64 {
        (self.total_height() - self.height).max(0.0)
    }

    /// Number of rows whose top edge satisfies `pred`; rows are ordered by offset.
    fn partition(&self, pred: impl Fn(f64) -> bool) -> usize {
        let (mut lo, mut hi) = (0, self.rows);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.cache.offset_of(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// The row covering `offset`, or `None` for an empty list.
    pub fn row_at(&self, offset: f64) -> Option<usize> {
        if self.rows == 0 {
            return None;
        }
        Some(self.partition(|top| top <= offset).saturating_sub(1))
    }

    /// Rows to render, including overscan on both sides.
    pub fn visible_range(&self) -> Range<usize> {
        let Some(first) = self.row_at(self.scroll_top) else {
            return 0..0;
        };
        let bottom = self.scroll_top + self.height;
        let end = self.partition(|top| top < bottom).max(first + 1);

        first.saturating_sub(self.config.overscan)..(end + self.config.overscan).min(self.rows)
    }

    /// Scroll to `offset`. Following resumes when the user lands close
    /// enough to the bottom and stops as soon as they scroll away.
    pub fn scroll_to(&mut self, offset: f64) {
        let max = self.max_scroll();
        self.scroll_top = offset.clamp(0.0, max);
        self.following = max - self.scroll_top <= self.config.follow_threshold;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll();
        self.following = true;
    }

    pub fn resize(&mut self, height: f64) {
        self.height = height.max(0.0);
        self.settle();
    }

    /// Re-pin to the bottom when following, otherwise keep the scroll
    /// position inside the new bounds.
    fn settle(&mut self) {
        if self.following {
            self.scroll_top = self.max_scroll();
        } else {
            self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(rows: usize) -> LogViewport {
        let mut vp = LogViewport::new(ViewportConfig::default(), 100.0);
        vp.set_rows(rows);
        vp
    }

    #[test]
    fn test_empty() {
        let vp = viewport(0);
        assert_eq!(vp.visible_range(), 0..0);
        assert_eq!(vp.row_at(0.0), None);
        assert_eq!(vp.total_height(), 0.0);
        assert_eq!(vp.scroll_top(), 0.0);
    }

    #[test]
    fn test_follows_bottom_by_default() {
        let vp = viewport(100);
        assert!(vp.is_following());
        assert_eq!(vp.total_height(), 2000.0);
        assert_eq!(vp.scroll_top(), 1900.0);
        // rows 95..100 visible, 5 rows of overscan above
        assert_eq!(vp.visible_range(), 90..100);
    }

    #[test]
    fn test_append_keeps_following() {
        let mut vp = viewport(100);
        vp.append_rows(10);
        assert_eq!(vp.scroll_top(), 2100.0);
        assert_eq!(vp.visible_range(), 100..110);
    }

    #[test]
    fn test_scroll_away_stops_following() {
        let mut vp = viewport(100);
        vp.scroll_to(0.0);
        assert!(!vp.is_following());

        vp.append_rows(10);
        assert_eq!(vp.scroll_top(), 0.0);
        assert_eq!(vp.visible_range(), 0..10);

        vp.scroll_to(vp.total_height());
        assert!(vp.is_following());
    }

    #[test]
    fn test_scroll_near_bottom_resumes_following() {
        let mut vp = viewport(100);
        vp.scroll_to(0.0);
        vp.scroll_to(1897.0);
        assert!(vp.is_following());
        vp.scroll_to(1800.0);
        assert!(!vp.is_following());
    }

    #[test]
    fn test_measured_heights_shift_rows() {
        let mut vp = viewport(100);
        vp.scroll_to(0.0);
        vp.measure_row(0, 50.0);

        assert_eq!(vp.total_height(), 2030.0);
        assert_eq!(vp.offset_of(1), 50.0);
        assert_eq!(vp.row_at(49.0), Some(0));
        assert_eq!(vp.row_at(50.0), Some(1));
        // tops at 0, 50, 70, 90 are above the 100px fold
        assert_eq!(vp.visible_range(), 0..9);
    }

    #[test]
    fn test_measure_while_following_repins() {
        let mut vp = viewport(100);
        vp.measure_row(99, 120.0);
        assert_eq!(vp.scroll_top(), vp.total_height() - 100.0);
        assert!(vp.is_following());
    }

    #[test]
    fn test_out_of_range_measurement_ignored() {
        let mut vp = viewport(3);
        vp.measure_row(10, 500.0);
        assert_eq!(vp.cache().measured_count(), 0);
    }

    #[test]
    fn test_replacing_rows_clears_cache() {
        let mut vp = viewport(10);
        vp.measure_row(2, 80.0);
        assert_eq!(vp.cache().measured_count(), 1);

        vp.set_rows(10);
        assert_eq!(vp.cache().measured_count(), 0);
        assert_eq!(vp.total_height(), 200.0);
    }

    #[test]
    fn test_resize() {
        let mut vp = viewport(100);
        vp.resize(400.0);
        assert_eq!(vp.scroll_top(), 1600.0);

        vp.scroll_to(100.0);
        vp.resize(3000.0);
        assert_eq!(vp.scroll_top(), 0.0);
    }
}
