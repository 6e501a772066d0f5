//! Core engine for the network upgrades timeline: event model, layout,
//! scales, viewport transform, interaction and tooltip placement.

use serde::{Deserialize, Serialize};

pub mod events;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod scale;
pub mod scene;
pub mod svg;
pub mod timeline;
pub mod tooltip;
pub mod viewport;

pub use events::{build_drawable_items, parse_item_id, ParsedItemId};
pub use interaction::{
    resolve_navigation, InteractionController, Navigation, Navigator, PointerState,
};
pub use layout::{Layout, LayoutPosition};
pub use model::{
    Dataset, DrawableItem, ItemKey, ItemMetadata, ItemRef, Layer, MetaAssociations, SpecLinks,
    UpgradeRecord,
};
pub use scale::{BandScale, LinearScale, Scales};
pub use scene::{Badge, ColumnAnnotation, ItemGlyph, Rect, Scene};
pub use timeline::{ModelCache, TimelineModel, UpgradeSummary};
pub use tooltip::{place_tooltip, TooltipContent, TOOLTIP_OFFSET};
pub use viewport::{Point, Size, ViewBox, Viewport, ViewportState};

/// Tunable geometry and interaction constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    /// Space above row 0, holds the per-column totals.
    pub margin_top: f64,
    /// Space below the plot for the axis, date labels and badges.
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Vertical pixels per row.
    pub row_height: f64,
    /// Floor on the drawn width of every band, padding excluded. Dense
    /// timelines grow the canvas (and scroll) instead of squeezing.
    pub min_band_width: f64,
    /// Padding fraction between bands, in `[0, 1)`.
    pub band_padding: f64,
    /// Canvas width used when the data would fit in less.
    pub min_width: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Multiplier applied by one zoom step.
    pub zoom_step: f64,
    pub tooltip_width: f64,
    pub tooltip_height: f64,
    /// Minimum distance kept between the tooltip and the container edges.
    pub tooltip_margin: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            margin_top: 60.0,
            margin_bottom: 140.0,
            margin_left: 40.0,
            margin_right: 40.0,
            row_height: 35.0,
            min_band_width: 140.0,
            band_padding: 0.1,
            min_width: 960.0,
            zoom_min: 0.5,
            zoom_max: 3.0,
            zoom_step: 1.2,
            tooltip_width: 280.0,
            tooltip_height: 120.0,
            tooltip_margin: 8.0,
        }
    }
}

impl TimelineConfig {
    pub fn tooltip_size(&self) -> Size {
        Size::new(self.tooltip_width, self.tooltip_height)
    }
}

/// Common error type for loading and preparing timeline data.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Input data is missing required information")]
    MissingData,
    #[error("Could not read data: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: TimelineConfig =
            serde_json::from_str(r#"{"row_height": 40.0, "zoom_max": 4.0}"#).unwrap();
        assert_eq!(cfg.row_height, 40.0);
        assert_eq!(cfg.zoom_max, 4.0);
        assert_eq!(cfg.margin_bottom, 140.0);
        assert_eq!(cfg.min_band_width, 140.0);
    }
}
