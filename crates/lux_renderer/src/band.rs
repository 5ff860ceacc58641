//! Row bands: contiguous runs of image rows, one per worker thread.

use std::ops::Range;

/// A contiguous run of rows rendered by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// Worker index, also used to derive the worker's seed
    pub index: usize,
    /// First row (inclusive)
    pub start_row: u32,
    /// Last row (exclusive)
    pub end_row: u32,
}

impl RowBand {
    pub fn rows(&self) -> Range<u32> {
        self.start_row..self.end_row
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row
    }
}

/// Split `height` rows into `workers` contiguous bands covering every row
/// exactly once.
///
/// The first `height % workers` bands get one extra row. The worker count
/// is clamped to `1..=height` so no band is empty (except for a zero-height
/// image, which gets a single empty band).
pub fn partition_rows(height: u32, workers: usize) -> Vec<RowBand> {
    let workers = workers.clamp(1, (height as usize).max(1)) as u32;
    let base = height / workers;
    let remainder = height % workers;

    let mut bands = Vec::with_capacity(workers as usize);
    let mut start_row = 0;
    for index in 0..workers {
        let rows = base + u32::from(index < remainder);
        bands.push(RowBand {
            index: index as usize,
            start_row,
            end_row: start_row + rows,
        });
        start_row += rows;
    }

    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(bands: &[RowBand], height: u32) {
        let mut next = 0;
        for (i, band) in bands.iter().enumerate() {
            assert_eq!(band.index, i);
            assert_eq!(band.start_row, next, "gap or overlap before band {}", i);
            assert!(band.row_count() > 0);
            next = band.end_row;
        }
        assert_eq!(next, height);
    }

    #[test]
    fn test_partition_covers_every_row() {
        for workers in [1, 2, 3, 7] {
            let bands = partition_rows(360, workers);
            assert_eq!(bands.len(), workers);
            assert_covers(&bands, 360);
        }
    }

    #[test]
    fn test_partition_spreads_remainder() {
        let bands = partition_rows(360, 7);
        let counts: Vec<u32> = bands.iter().map(RowBand::row_count).collect();
        // 360 = 7 * 51 + 3
        assert_eq!(counts, vec![52, 52, 52, 51, 51, 51, 51]);
    }

    #[test]
    fn test_partition_caps_workers_at_height() {
        let bands = partition_rows(3, 8);
        assert_eq!(bands.len(), 3);
        assert_covers(&bands, 3);

        let bands = partition_rows(10, 0);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].rows(), 0..10);
    }
}
