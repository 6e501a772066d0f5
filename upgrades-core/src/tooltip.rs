//! Boundary-aware tooltip placement.

use serde::Serialize;

use crate::model::{Dataset, DrawableItem};
use crate::viewport::{Point, Size};

/// Distance between the cursor and the tooltip corner.
pub const TOOLTIP_OFFSET: f64 = 15.0;

/// Places a tooltip below-right of the pointer, flipping to the other side
/// of the cursor on an axis where it would overflow, then clamping into
/// `[margin, container - margin]`.
pub fn place_tooltip(pointer: Point, tooltip: Size, container: Size, margin: f64) -> Point {
    Point::new(
        place_axis(pointer.x, tooltip.width, container.width, margin),
        place_axis(pointer.y, tooltip.height, container.height, margin),
    )
}

fn place_axis(pointer: f64, extent: f64, container: f64, margin: f64) -> f64 {
    let mut pos = pointer + TOOLTIP_OFFSET;
    if pos + extent + margin > container {
        pos = pointer - extent - TOOLTIP_OFFSET;
    }
    // Lower bound last: an oversized tooltip stays pinned to the top/left.
    pos.min(container - extent - margin).max(margin)
}

/// Text shown for a hovered item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TooltipContent {
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub removed: bool,
}

impl TooltipContent {
    /// Falls back to the bare identifier when the item has no metadata.
    pub fn for_item(item: &DrawableItem, dataset: &Dataset) -> Self {
        let label = item.item.label();
        let metadata = dataset.item_metadata(&item.item);

        let title = match metadata {
            Some(meta) if !meta.title.is_empty() => format!("{label}: {}", meta.title),
            _ => label.to_string(),
        };

        let mut subtitle = format!("{} · {}", item.upgrade_name, item.date.format("%Y-%m-%d"));
        if let Some(layer) = item.layer {
            subtitle.push_str(" · ");
            subtitle.push_str(layer.label());
        }
        if item.is_meta {
            subtitle.push_str(" · Meta");
        }

        Self {
            title,
            subtitle,
            description: metadata.and_then(|meta| meta.description.clone()),
            status: metadata.and_then(|meta| meta.status.clone()),
            removed: item.removed,
        }
    }
}
