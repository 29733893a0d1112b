use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

#[derive(Clone, Debug)]
/// Uniform grid index over agent positions, rebuilt once per frame.
///
/// Stores agent indices sorted by cell in one flat array, with
/// `cell_offsets[i]..cell_offsets[i + 1]` spanning the agents of cell `i`
/// (compressed sparse row layout). Agents outside the park bounds are not
/// indexed; fleeing agents that left the park are never queried for.
///
/// # Examples
/// ```
/// use pigeon_core::spatial_hash::SpatialHash;
///
/// let mut spatial = SpatialHash::new(2.0, 40.0, 24.0);
/// let positions = vec![(3.0, 3.0), (4.0, 3.5), (30.0, 20.0)];
/// spatial.build_parallel(&positions);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(3.0, 3.0, 2.0, &mut nearby);
/// assert!(nearby.contains(&0) && nearby.contains(&1));
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub width: f64,
    pub height: f64,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
}

impl SpatialHash {
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let cols = (width.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let rows = (height.max(0.0) / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            width,
            height,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
        }
    }

    /// Flat cell index for a world coordinate, `None` when non-finite or out of bounds.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        // Check for i32 overflow before casting
        if x.abs() > i32::MAX as f64 * self.cell_size || y.abs() > i32::MAX as f64 * self.cell_size
        {
            return None;
        }

        let mut cx = (x / self.cell_size).floor() as i32;
        let mut cy = (y / self.cell_size).floor() as i32;
        // The far edge of the park belongs to the last row and column.
        if cx == self.cols as i32 && x <= self.width {
            cx -= 1;
        }
        if cy == self.rows as i32 && y <= self.height {
            cy -= 1;
        }
        if cx < 0 || cx >= self.cols as i32 || cy < 0 || cy >= self.rows as i32 {
            None
        } else {
            Some((cy as usize * self.cols) + cx as usize)
        }
    }

    pub fn build_parallel(&mut self, positions: &[(f64, f64)]) {
        let cell_count = self.cols * self.rows;
        let entity_count = positions.len();

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|&(x, y)| {
            if let Some(idx) = self.get_cell_idx(x, y) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.clear();
        self.entity_indices.resize(total, 0);
        let mut cursor = self.cell_offsets[..cell_count].to_vec();
        for (entity_idx, &(x, y)) in positions.iter().enumerate().take(entity_count) {
            if let Some(cell_idx) = self.get_cell_idx(x, y) {
                self.entity_indices[cursor[cell_idx]] = entity_idx;
                cursor[cell_idx] += 1;
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_indices.is_empty()
    }

    /// Calls `callback` for every indexed agent in cells overlapping the
    /// square around `(x, y)`. Callers filter by exact distance.
    pub fn query_callback<F>(&self, x: f64, y: f64, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        if !x.is_finite() || !y.is_finite() || !radius.is_finite() {
            return;
        }
        let min_cx = ((x - radius) / self.cell_size).floor() as i32;
        let max_cx = ((x + radius) / self.cell_size).floor() as i32;
        let min_cy = ((y - radius) / self.cell_size).floor() as i32;
        let max_cy = ((y + radius) / self.cell_size).floor() as i32;

        for cy in min_cy.max(0)..=max_cy.min(self.rows as i32 - 1) {
            for cx in min_cx.max(0)..=max_cx.min(self.cols as i32 - 1) {
                let cell_idx = (cy as usize * self.cols) + cx as usize;
                let start = self.cell_offsets[cell_idx];
                let end = self.cell_offsets[cell_idx + 1];
                for &entity_idx in &self.entity_indices[start..end] {
                    callback(entity_idx);
                }
            }
        }
    }

    #[inline]
    pub fn query_into(&self, x: f64, y: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(x, y, radius, |idx| result.push(idx));
    }

    pub fn count_nearby(&self, x: f64, y: f64, radius: f64) -> usize {
        let mut count = 0;
        self.query_callback(x, y, radius, |_| count += 1);
        count
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_spatial_hash_query_finds_nearby() {
        let mut sh = SpatialHash::new(5.0, 20.0, 20.0);
        sh.build_parallel(&[(1.0, 1.0), (2.0, 2.0), (12.0, 12.0)]);

        let mut found = Vec::new();
        sh.query_into(1.5, 1.5, 2.0, &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_spatial_hash_skips_out_of_bounds() {
        let mut sh = SpatialHash::new(5.0, 20.0, 20.0);
        sh.build_parallel(&[(1.0, 1.0), (-3.0, 1.0), (25.0, 5.0)]);
        assert_eq!(sh.len(), 1);
        assert_eq!(sh.count_nearby(0.0, 0.0, 100.0), 1);
    }

    #[test]
    fn test_spatial_hash_rebuild_clears() {
        let mut sh = SpatialHash::new(5.0, 20.0, 20.0);
        sh.build_parallel(&[(1.0, 1.0)]);
        sh.build_parallel(&[]);
        assert_eq!(sh.count_nearby(1.0, 1.0, 10.0), 0);
    }

    #[test]
    fn test_spatial_hash_far_edge_is_indexed() {
        let mut sh = SpatialHash::new(2.0, 40.0, 24.0);
        assert_eq!(sh.get_cell_idx(40.0, 24.0), Some(sh.cols * sh.rows - 1));
        assert!(sh.get_cell_idx(40.01, 12.0).is_none());

        sh.build_parallel(&[(40.0, 12.0), (0.0, 24.0)]);
        assert_eq!(sh.len(), 2);
        assert_eq!(sh.count_nearby(39.5, 12.0, 1.0), 1);
    }

    #[test]
    fn test_spatial_hash_rejects_non_finite() {
        let sh = SpatialHash::new(5.0, 20.0, 20.0);
        assert!(sh.get_cell_idx(f64::NAN, 1.0).is_none());
        assert!(sh.get_cell_idx(1.0, f64::INFINITY).is_none());
    }
}
