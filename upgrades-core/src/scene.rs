//! Positioned, render-ready description of the timeline.
//!
//! Both the yew component and the static SVG writer draw from a [`Scene`],
//! so geometry is decided in one place.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{ItemKey, Layer};
use crate::scale::Scales;
use crate::timeline::TimelineModel;
use crate::viewport::Point;
use crate::TimelineConfig;

const ROW_GAP: f64 = 6.0;
const META_SLOT_GAP: f64 = 4.0;
const TOTAL_LABEL_LIFT: f64 = 12.0;
const DATE_LABEL_DROP: f64 = 20.0;
const BADGE_TOP: f64 = 34.0;
const BADGE_LINE_HEIGHT: f64 = 14.0;
const BADGE_PADDING: f64 = 6.0;
const BADGE_GAP: f64 = 6.0;
/// Rough glyph advance used to truncate labels to their box.
const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_INSET: f64 = 8.0;

pub const EXECUTION_FILL: &str = "#93c5fd";
pub const CONSENSUS_FILL: &str = "#fcd34d";
pub const UNLABELED_FILL: &str = "#c4b5fd";
pub const META_FILL: &str = "#f1f5f9";

pub fn layer_fill(layer: Option<Layer>) -> &'static str {
    match layer {
        Some(Layer::Execution) => EXECUTION_FILL,
        Some(Layer::Consensus) => CONSENSUS_FILL,
        None => UNLABELED_FILL,
    }
}

/// Legend rows: label and fill.
pub fn legend() -> [(&'static str, &'static str); 4] {
    [
        ("Execution", EXECUTION_FILL),
        ("Consensus", CONSENSUS_FILL),
        ("Unlabeled", UNLABELED_FILL),
        ("Meta", META_FILL),
    ]
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One item box.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemGlyph {
    /// Index into [`TimelineModel::items`].
    pub index: usize,
    pub key: ItemKey,
    pub rect: Rect,
    pub label: String,
    pub is_meta: bool,
    pub removed: bool,
    pub layer: Option<Layer>,
    pub fill: &'static str,
}

impl ItemGlyph {
    pub fn class_name(&self) -> String {
        let mut class = String::from("upgrade-item");
        if self.is_meta {
            class.push_str(" upgrade-item--meta");
        }
        if self.removed {
            class.push_str(" upgrade-item--removed");
        }
        if let Some(layer) = self.layer {
            class.push_str(" upgrade-item--");
            class.push_str(layer.as_str());
        }
        class
    }
}

/// Upgrade name plus whichever of block number / fork epoch is known.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Badge {
    pub upgrade_name: String,
    pub details: Vec<String>,
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnAnnotation {
    pub column: usize,
    pub date: NaiveDate,
    pub date_label: String,
    pub band: (f64, f64),
    pub center_x: f64,
    /// Non-meta items in the column, printed above the stack.
    pub total: usize,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub total_y: f64,
    pub axis_y: f64,
    pub date_label_y: f64,
    pub glyphs: Vec<ItemGlyph>,
    pub columns: Vec<ColumnAnnotation>,
}

impl Scene {
    pub fn build(model: &TimelineModel, config: &TimelineConfig) -> Self {
        let layout = &model.layout;
        let scales = Scales::new(layout, config);
        let column_count = layout.column_count();

        let mut meta_slots = vec![0usize; column_count];
        for (item, position) in model.entries() {
            if item.is_meta {
                meta_slots[position.column] += 1;
            }
        }

        let mut meta_seen = vec![0usize; column_count];
        let mut glyphs = Vec::with_capacity(model.items.len());
        for (index, (item, position)) in model.entries().enumerate() {
            let Some((start, end)) = scales.x.band(position.column) else {
                continue;
            };
            let slots = meta_slots[position.column];
            let (x, width) = if item.is_meta && slots > 1 {
                let slot = meta_seen[position.column];
                meta_seen[position.column] += 1;
                let slot_width = (end - start) / slots as f64;
                (
                    start + slot as f64 * slot_width + META_SLOT_GAP / 2.0,
                    slot_width - META_SLOT_GAP,
                )
            } else {
                (start, end - start)
            };

            let rect = Rect {
                x,
                y: scales.row_y(position.row) + ROW_GAP / 2.0,
                width,
                height: scales.row_height - ROW_GAP,
            };
            glyphs.push(ItemGlyph {
                index,
                key: item.key(),
                rect,
                label: fit_label(item.item.label(), width),
                is_meta: item.is_meta,
                removed: item.removed,
                layer: item.layer,
                fill: if item.is_meta {
                    META_FILL
                } else {
                    layer_fill(item.layer)
                },
            });
        }

        let axis_y = scales.plot_bottom(layout);
        let columns = layout
            .dates
            .iter()
            .enumerate()
            .filter_map(|(column, date)| {
                let band = scales.x.band(column)?;
                let mut top = axis_y + BADGE_TOP;
                let badges = model
                    .upgrades_in_column(column)
                    .map(|upgrade| {
                        let mut details = Vec::new();
                        if let Some(block) = upgrade.block_number {
                            details.push(format!("Block {block}"));
                        }
                        if let Some(epoch) = upgrade.fork_epoch {
                            details.push(format!("Epoch {epoch}"));
                        }
                        let height =
                            BADGE_LINE_HEIGHT * (1 + details.len()) as f64 + BADGE_PADDING * 2.0;
                        let rect = Rect {
                            x: band.0,
                            y: top,
                            width: band.1 - band.0,
                            height,
                        };
                        top += height + BADGE_GAP;
                        Badge {
                            upgrade_name: fit_label(&upgrade.upgrade_name, rect.width),
                            details,
                            rect,
                        }
                    })
                    .collect();

                Some(ColumnAnnotation {
                    column,
                    date: *date,
                    date_label: date.format("%b %-d, %Y").to_string(),
                    band,
                    center_x: (band.0 + band.1) / 2.0,
                    total: layout.column_totals.get(column).copied().unwrap_or(0),
                    badges,
                })
            })
            .collect();

        Self {
            width: scales.width,
            height: scales.height,
            total_y: scales.row_y(0) - TOTAL_LABEL_LIFT,
            axis_y,
            date_label_y: axis_y + DATE_LABEL_DROP,
            glyphs,
            columns,
        }
    }

    pub fn size(&self) -> crate::viewport::Size {
        crate::viewport::Size::new(self.width, self.height)
    }

    /// Topmost glyph under a point in canvas coordinates.
    pub fn hit_test(&self, point: Point) -> Option<&ItemGlyph> {
        self.glyphs.iter().rev().find(|glyph| glyph.rect.contains(point))
    }
}

/// Shortens `text` with an ellipsis so it fits `width` pixels.
fn fit_label(text: &str, width: f64) -> String {
    let capacity = ((width - LABEL_INSET) / LABEL_CHAR_WIDTH).floor().max(1.0) as usize;
    if text.chars().count() <= capacity {
        return text.to_string();
    }
    let mut out: String = text.chars().take(capacity.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetaAssociations, UpgradeRecord};

    fn model() -> TimelineModel {
        let records = vec![
            UpgradeRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
                upgrade_name: "Dencun".into(),
                items: vec!["EIP-4844".into(), "EIP-1153-removed".into()],
                layer: Some(Layer::Execution),
                block_number: Some(19_426_587),
                fork_epoch: Some(269_568),
            },
            UpgradeRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
                upgrade_name: "Deneb".into(),
                items: vec!["EIP-7044".into()],
                layer: Some(Layer::Consensus),
                block_number: None,
                fork_epoch: Some(269_568),
            },
        ];
        let meta = MetaAssociations::from([
            ("Dencun".to_string(), "EIP-7569".to_string()),
            ("Deneb".to_string(), "EIP-7568".to_string()),
        ]);
        TimelineModel::build(&records, &meta)
    }

    #[test]
    fn metas_sharing_a_column_sit_side_by_side() {
        let scene = Scene::build(&model(), &TimelineConfig::default());
        let metas: Vec<&ItemGlyph> = scene.glyphs.iter().filter(|g| g.is_meta).collect();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].rect.y, metas[1].rect.y);
        assert!(metas[0].rect.x + metas[0].rect.width <= metas[1].rect.x);

        let first_row = scene.glyphs.iter().find(|g| !g.is_meta).unwrap();
        assert!(metas[0].rect.y < first_row.rect.y);
    }

    #[test]
    fn badges_omit_missing_numbers() {
        let scene = Scene::build(&model(), &TimelineConfig::default());
        let column = &scene.columns[0];
        assert_eq!(column.total, 3);
        assert_eq!(column.date_label, "Mar 13, 2024");
        assert_eq!(column.badges.len(), 2);
        assert_eq!(column.badges[0].details, vec!["Block 19426587", "Epoch 269568"]);
        assert_eq!(column.badges[1].details, vec!["Epoch 269568"]);
        assert!(column.badges[0].rect.y + column.badges[0].rect.height < column.badges[1].rect.y);
    }

    #[test]
    fn hit_test_finds_the_glyph_under_the_point() {
        let scene = Scene::build(&model(), &TimelineConfig::default());
        let removed = scene.glyphs.iter().find(|g| g.removed).unwrap();
        assert!(removed.class_name().contains("upgrade-item--removed"));

        let hit = scene.hit_test(removed.rect.center()).unwrap();
        assert_eq!(hit.key, removed.key);
        assert!(scene.hit_test(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(fit_label("EIP-4844", 140.0), "EIP-4844");
        let short = fit_label("A very long upgrade name indeed", 60.0);
        assert!(short.ends_with('…'));
        assert!(short.chars().count() <= 7);
    }
}
