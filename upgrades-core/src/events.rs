//! Expands upgrade records into a flat, date-ordered list of drawable items.

use crate::model::{
    DrawableItem, ItemRef, Layer, MetaAssociations, UpgradeRecord, CONSENSUS_SPEC_SENTINEL,
    EXECUTION_SPEC_SENTINEL, REMOVED_MARKER,
};

const EXECUTION_PREFIXES: [&str; 2] = ["execution:", "el:"];
const CONSENSUS_PREFIXES: [&str; 2] = ["consensus:", "cl:"];

/// A raw item identifier after prefix and marker handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItemId {
    pub item: ItemRef,
    pub layer: Option<Layer>,
    pub removed: bool,
}

/// Resolves a raw identifier once, so later stages never re-parse strings.
///
/// A layer prefix wins over the sentinel's own layer, which wins over the
/// record-level layer.
pub fn parse_item_id(raw: &str, record_layer: Option<Layer>) -> ParsedItemId {
    let (prefix_layer, rest) = split_layer_prefix(raw.trim());
    let (rest, removed) = strip_removed_marker(rest);

    let item = if rest.eq_ignore_ascii_case(EXECUTION_SPEC_SENTINEL) {
        ItemRef::ExternalExecutionLink
    } else if rest.eq_ignore_ascii_case(CONSENSUS_SPEC_SENTINEL) {
        ItemRef::ExternalConsensusLink
    } else {
        ItemRef::Numbered(rest.to_string())
    };

    let layer = prefix_layer
        .or_else(|| item.sentinel_layer())
        .or(record_layer);

    ParsedItemId {
        item,
        layer,
        removed,
    }
}

/// Builds the drawable list: one entry per member item, one per meta
/// association, stably sorted by date.
pub fn build_drawable_items(
    records: &[UpgradeRecord],
    meta: &MetaAssociations,
) -> Vec<DrawableItem> {
    let mut items = Vec::new();

    for record in records {
        for raw in &record.items {
            items.push(drawable(record, raw, false));
        }

        match meta.get(&record.upgrade_name) {
            Some(meta_id) => items.push(drawable(record, meta_id, true)),
            None if record.items.is_empty() => {
                tracing::debug!(
                    upgrade = %record.upgrade_name,
                    date = %record.date,
                    "upgrade has no items and no meta item, skipping"
                );
            }
            None => {}
        }
    }

    // `sort_by_key` is stable, ties keep input order.
    items.sort_by_key(|item| item.date);
    items
}

fn drawable(record: &UpgradeRecord, raw: &str, is_meta: bool) -> DrawableItem {
    let parsed = parse_item_id(raw, record.layer);
    DrawableItem {
        date: record.date,
        upgrade_name: record.upgrade_name.clone(),
        item: parsed.item,
        is_meta,
        layer: parsed.layer,
        removed: parsed.removed,
    }
}

fn split_layer_prefix(raw: &str) -> (Option<Layer>, &str) {
    for (layer, prefixes) in [
        (Layer::Execution, EXECUTION_PREFIXES),
        (Layer::Consensus, CONSENSUS_PREFIXES),
    ] {
        for prefix in prefixes {
            if let Some(head) = raw.get(..prefix.len()) {
                if head.eq_ignore_ascii_case(prefix) {
                    return (Some(layer), raw[prefix.len()..].trim_start());
                }
            }
        }
    }
    (None, raw)
}

fn strip_removed_marker(raw: &str) -> (&str, bool) {
    let Some(split) = raw.len().checked_sub(REMOVED_MARKER.len()) else {
        return (raw, false);
    };
    match raw.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(REMOVED_MARKER) => (raw[..split].trim_end(), true),
        _ => (raw, false),
    }
}
