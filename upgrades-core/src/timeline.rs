//! Drawable items and their layout, built once per data load.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::build_drawable_items;
use crate::layout::{Layout, LayoutPosition};
use crate::model::{DrawableItem, ItemKey, Layer, MetaAssociations, UpgradeRecord};

/// Per-upgrade facts shown as badges under the axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeSummary {
    pub date: NaiveDate,
    pub upgrade_name: String,
    pub layer: Option<Layer>,
    pub block_number: Option<u64>,
    pub fork_epoch: Option<u64>,
    pub item_count: usize,
}

impl From<&UpgradeRecord> for UpgradeSummary {
    fn from(record: &UpgradeRecord) -> Self {
        Self {
            date: record.date,
            upgrade_name: record.upgrade_name.clone(),
            layer: record.layer,
            block_number: record.block_number,
            fork_epoch: record.fork_epoch,
            item_count: record.items.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineModel {
    pub items: Vec<DrawableItem>,
    pub layout: Layout,
    pub upgrades: Vec<UpgradeSummary>,
}

impl TimelineModel {
    pub fn build(records: &[UpgradeRecord], meta: &MetaAssociations) -> Self {
        let items = build_drawable_items(records, meta);
        let layout = Layout::compute(&items);

        let mut upgrades: Vec<UpgradeSummary> = records
            .iter()
            .filter(|record| layout.column_of(record.date).is_some())
            .map(UpgradeSummary::from)
            .collect();
        upgrades.sort_by_key(|upgrade| upgrade.date);

        tracing::debug!(
            records = records.len(),
            items = items.len(),
            columns = layout.column_count(),
            max_rows = layout.max_rows,
            "built timeline model"
        );

        Self {
            items,
            layout,
            upgrades,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&DrawableItem, LayoutPosition)> + '_ {
        self.items.iter().zip(self.layout.positions.iter().copied())
    }

    pub fn find(&self, key: &ItemKey) -> Option<&DrawableItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    pub fn upgrades_in_column(&self, column: usize) -> impl Iterator<Item = &UpgradeSummary> + '_ {
        let date = self.layout.dates.get(column).copied();
        self.upgrades
            .iter()
            .filter(move |upgrade| Some(upgrade.date) == date)
    }
}

/// Content fingerprint of the inputs the layout depends on.
pub fn fingerprint(records: &[UpgradeRecord], meta: &MetaAssociations) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.hash(&mut hasher);
    meta.hash(&mut hasher);
    hasher.finish()
}

/// Keeps the last built model and rebuilds only when the input changes.
#[derive(Debug, Default)]
pub struct ModelCache {
    entry: Option<(u64, Rc<TimelineModel>)>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        records: &[UpgradeRecord],
        meta: &MetaAssociations,
    ) -> Rc<TimelineModel> {
        let key = fingerprint(records, meta);
        if let Some((cached_key, model)) = &self.entry {
            if *cached_key == key {
                tracing::debug!(key, "timeline model cache hit");
                return Rc::clone(model);
            }
        }

        let model = Rc::new(TimelineModel::build(records, meta));
        self.entry = Some((key, Rc::clone(&model)));
        model
    }

    pub fn current(&self) -> Option<Rc<TimelineModel>> {
        self.entry.as_ref().map(|(_, model)| Rc::clone(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<UpgradeRecord> {
        vec![
            UpgradeRecord {
                date: NaiveDate::from_ymd_opt(2022, 9, 15).unwrap(),
                upgrade_name: "Paris".into(),
                items: vec!["EIP-3675".into(), "EIP-4399".into()],
                layer: None,
                block_number: Some(15_537_394),
                fork_epoch: None,
            },
            UpgradeRecord {
                date: NaiveDate::from_ymd_opt(2021, 12, 9).unwrap(),
                upgrade_name: "Arrow Glacier".into(),
                items: vec![],
                layer: None,
                block_number: Some(13_773_000),
                fork_epoch: None,
            },
        ]
    }

    #[test]
    fn upgrades_without_drawable_items_get_no_badge() {
        let model = TimelineModel::build(&records(), &MetaAssociations::new());
        assert_eq!(model.upgrades.len(), 1);
        assert_eq!(model.upgrades[0].upgrade_name, "Paris");
        assert_eq!(model.upgrades_in_column(0).count(), 1);
    }

    #[test]
    fn cache_reuses_model_for_identical_input() {
        let mut cache = ModelCache::new();
        let meta = MetaAssociations::new();
        let first = cache.get_or_build(&records(), &meta);
        let second = cache.get_or_build(&records(), &meta);
        assert!(Rc::ptr_eq(&first, &second));

        let mut changed = records();
        changed[0].items.push("EIP-9999".into());
        let third = cache.get_or_build(&changed, &meta);
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(third.items.len(), 3);
    }

    #[test]
    fn find_locates_items_by_key() {
        let model = TimelineModel::build(&records(), &MetaAssociations::new());
        let key = model.items[1].key();
        assert_eq!(model.find(&key), Some(&model.items[1]));
    }
}
