//! Pixel scales for the layout grid.
//!
//! Rows grow downward: row 0 is the topmost row and holds meta items.

use crate::layout::Layout;
use crate::TimelineConfig;

const MAX_PADDING: f64 = 0.99;

/// Maps column indices to equal, padded pixel bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    first: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Splits `[start, stop]` into `count` bands. `padding` is applied both
    /// between bands and at the outer edges, and the bands are centred.
    pub fn new(count: usize, start: f64, stop: f64, padding: f64) -> Self {
        let padding = padding.clamp(0.0, MAX_PADDING);
        let n = count as f64;
        let step = (stop - start) / (n + padding).max(1.0);
        let first = start + (stop - start - step * (n - padding)) / 2.0;
        Self {
            count,
            first,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Half-open pixel range `[start, end)` of a column.
    pub fn band(&self, column: usize) -> Option<(f64, f64)> {
        if column >= self.count {
            return None;
        }
        let start = self.first + self.step * column as f64;
        Some((start, start + self.bandwidth))
    }

    pub fn center(&self, column: usize) -> Option<f64> {
        self.band(column).map(|(start, end)| (start + end) / 2.0)
    }
}

/// Linear map from a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Both scales plus the pixel canvas they were sized for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub x: BandScale,
    pub y: LinearScale,
    pub width: f64,
    pub height: f64,
    pub row_height: f64,
}

impl Scales {
    /// Sizes the canvas to the data: every drawn band is at least
    /// `min_band_width` wide, every row `row_height` tall.
    pub fn new(layout: &Layout, config: &TimelineConfig) -> Self {
        let columns = layout.column_count();
        let padding = config.band_padding.clamp(0.0, MAX_PADDING);
        // bandwidth = range / (n + p) * (1 - p), solved for range.
        let band_range = (columns as f64 + padding) * config.min_band_width / (1.0 - padding);
        let data_width = config.margin_left + config.margin_right + band_range;
        let width = data_width.max(config.min_width);

        let row_slots = (layout.max_rows + 1) as f64;
        let plot_height = row_slots * config.row_height;
        let height = config.margin_top + plot_height + config.margin_bottom;

        let x = BandScale::new(
            columns,
            config.margin_left,
            width - config.margin_right,
            config.band_padding,
        );
        let y = LinearScale::new(
            (0.0, row_slots),
            (config.margin_top, config.margin_top + plot_height),
        );

        Self {
            x,
            y,
            width,
            height,
            row_height: config.row_height,
        }
    }

    /// Top edge of a row.
    pub fn row_y(&self, row: usize) -> f64 {
        self.y.apply(row as f64)
    }

    /// Baseline of the plot, where the date axis is drawn.
    pub fn plot_bottom(&self, layout: &Layout) -> f64 {
        self.row_y(layout.max_rows + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPosition;
    use chrono::NaiveDate;

    fn layout(columns: usize, max_rows: usize) -> Layout {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        Layout {
            dates: (0..columns)
                .map(|i| base + chrono::Duration::days(i as i64))
                .collect(),
            positions: vec![LayoutPosition { column: 0, row: 1 }],
            column_totals: vec![max_rows; columns],
            max_rows,
        }
    }

    #[test]
    fn bands_are_equal_and_ordered() {
        let scale = BandScale::new(4, 0.0, 400.0, 0.1);
        let bands: Vec<(f64, f64)> = (0..4).map(|c| scale.band(c).unwrap()).collect();
        for pair in bands.windows(2) {
            assert!(pair[0].1 <= pair[1].0);
            assert!(((pair[0].1 - pair[0].0) - (pair[1].1 - pair[1].0)).abs() < 1e-9);
        }
        assert!(bands[0].0 >= 0.0);
        assert!(bands[3].1 <= 400.0);
        assert!(scale.band(4).is_none());
    }

    #[test]
    fn zero_padding_fills_the_range() {
        let scale = BandScale::new(2, 10.0, 210.0, 0.0);
        assert_eq!(scale.band(0), Some((10.0, 110.0)));
        assert_eq!(scale.band(1), Some((110.0, 210.0)));
    }

    #[test]
    fn canvas_grows_with_columns_and_rows() {
        let config = TimelineConfig::default();
        let small = Scales::new(&layout(2, 2), &config);
        assert_eq!(small.width, config.min_width);
        assert!(small.x.bandwidth() >= config.min_band_width);

        let wide = Scales::new(&layout(20, 2), &config);
        assert!(wide.width > 40.0 + 40.0 + 20.0 * 140.0);
        assert!((wide.x.bandwidth() - config.min_band_width).abs() < 1e-6);
        let (first, _) = wide.x.band(0).unwrap();
        let (_, last) = wide.x.band(19).unwrap();
        assert!(first >= config.margin_left - 1e-6);
        assert!(last <= wide.width - config.margin_right + 1e-6);

        let tall = Scales::new(&layout(2, 10), &config);
        assert_eq!(tall.height, 60.0 + 11.0 * 35.0 + 140.0);
        assert!(tall.height > small.height);
    }

    #[test]
    fn row_zero_is_above_row_one() {
        let config = TimelineConfig::default();
        let scales = Scales::new(&layout(3, 4), &config);
        assert_eq!(scales.row_y(0), config.margin_top);
        for row in 0..5 {
            assert!(scales.row_y(row) < scales.row_y(row + 1));
        }
        assert_eq!(scales.row_y(1) - scales.row_y(0), config.row_height);
    }
}
