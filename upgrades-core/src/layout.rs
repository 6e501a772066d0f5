//! Discrete (column, row) assignment.
//!
//! Columns follow the distinct dates in chronological order. Within a
//! column, non-meta items are packed densely from row 1 in list order and
//! every meta item sits on row 0.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::DrawableItem;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LayoutPosition {
    pub column: usize,
    pub row: usize,
}

/// Positions for a drawable list, parallel to that list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Layout {
    /// Distinct dates, sorted; the index is the column.
    pub dates: Vec<NaiveDate>,
    pub positions: Vec<LayoutPosition>,
    /// Non-meta item count per column.
    pub column_totals: Vec<usize>,
    /// Tallest column, excluding the meta row.
    pub max_rows: usize,
}

impl Layout {
    pub fn compute(items: &[DrawableItem]) -> Self {
        let mut dates: Vec<NaiveDate> = items.iter().map(|item| item.date).collect();
        dates.sort_unstable();
        dates.dedup();

        let mut column_totals = vec![0usize; dates.len()];
        let positions = items
            .iter()
            .map(|item| {
                let column = dates
                    .binary_search(&item.date)
                    .unwrap_or_else(|insert_at| insert_at);
                let row = if item.is_meta {
                    0
                } else {
                    column_totals[column] += 1;
                    column_totals[column]
                };
                LayoutPosition { column, row }
            })
            .collect();

        let max_rows = column_totals.iter().copied().max().unwrap_or(0);

        Self {
            dates,
            positions,
            column_totals,
            max_rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}
