//! Loads the upgrades dataset from JSON and exports it as CSV.
//!
//! The loader walks `serde_json::Value` by hand so it can accept both the
//! snake_case layout written by this workspace and the camelCase layout
//! produced by the web data pipeline, and so every rejected record is
//! reported with its position.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use upgrades_core::{
    Dataset, ItemMetadata, Layer, MetaAssociations, SpecLinks, TimelineError, UpgradeRecord,
};

mod csv;

pub use csv::{export_csv, CSV_HEADER};

/// Load a dataset from a JSON string.
pub fn load_dataset_str(json: &str) -> Result<Dataset, TimelineError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    load_dataset_value(&value)
}

/// Load a dataset from a `serde_json::Value`.
///
/// Accepts either a full document (`{"upgrades": [...], "meta": {...}, ...}`)
/// or a bare array of upgrade records.
pub fn load_dataset_value(document: &Value) -> Result<Dataset, TimelineError> {
    let (upgrades, root) = match document {
        Value::Array(records) => (records.as_slice(), None),
        Value::Object(root) => {
            let records = root
                .get("upgrades")
                .and_then(Value::as_array)
                .ok_or(TimelineError::MissingData)?;
            (records.as_slice(), Some(root))
        }
        _ => {
            return Err(TimelineError::Parse(
                "Expected an object or an array of upgrades".to_string(),
            ))
        }
    };

    let mut builder = DatasetBuilder::default();
    for (index, record) in upgrades.iter().enumerate() {
        builder.handle_upgrade(index, record)?;
    }

    if let Some(root) = root {
        if let Some(meta) = root.get("meta").and_then(Value::as_object) {
            builder.handle_meta(meta);
        }
        if let Some(links) = field(root, &["spec_links", "specLinks"]).and_then(Value::as_object) {
            builder.handle_spec_links(links);
        }
        if let Some(items) = root.get("items").and_then(Value::as_object) {
            builder.handle_items(items);
        }
    }

    Ok(builder.finalize())
}

#[derive(Default)]
struct DatasetBuilder {
    upgrades: Vec<UpgradeRecord>,
    meta: MetaAssociations,
    spec_links: BTreeMap<String, SpecLinks>,
    items: BTreeMap<String, ItemMetadata>,
}

impl DatasetBuilder {
    fn handle_upgrade(&mut self, index: usize, record: &Value) -> Result<(), TimelineError> {
        let Some(object) = record.as_object() else {
            return Err(TimelineError::Parse(format!(
                "Upgrade #{index} is not an object"
            )));
        };

        let raw_date = object
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| TimelineError::Parse(format!("Upgrade #{index} has no date")))?;
        let date = parse_date(raw_date).ok_or_else(|| {
            TimelineError::Parse(format!("Upgrade #{index} has an invalid date: {raw_date}"))
        })?;

        let upgrade_name = field(object, &["upgrade_name", "upgradeName", "upgrade"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| TimelineError::Parse(format!("Upgrade #{index} has no name")))?
            .to_string();

        let items = field(object, &["items", "eips"])
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(identifier).collect())
            .unwrap_or_default();

        let layer = object
            .get("layer")
            .and_then(Value::as_str)
            .and_then(parse_layer);

        self.upgrades.push(UpgradeRecord {
            date,
            upgrade_name,
            items,
            layer,
            block_number: field(object, &["block_number", "blockNumber"]).and_then(as_u64),
            fork_epoch: field(object, &["fork_epoch", "forkEpoch"]).and_then(as_u64),
        });
        Ok(())
    }

    fn handle_meta(&mut self, meta: &Map<String, Value>) {
        for (upgrade, value) in meta {
            match identifier(value) {
                Some(id) => {
                    self.meta.insert(upgrade.clone(), id);
                }
                None => tracing::warn!(upgrade = %upgrade, "ignoring non-string meta item"),
            }
        }
    }

    fn handle_spec_links(&mut self, links: &Map<String, Value>) {
        for (upgrade, value) in links {
            let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
            let entry = SpecLinks {
                execution: text("execution"),
                consensus: text("consensus"),
            };
            if entry == SpecLinks::default() {
                continue;
            }
            self.spec_links.insert(upgrade.clone(), entry);
        }
    }

    fn handle_items(&mut self, items: &Map<String, Value>) {
        for (id, value) in items {
            let metadata = match value {
                Value::String(title) => ItemMetadata {
                    title: title.clone(),
                    description: None,
                    status: None,
                },
                Value::Object(obj) => {
                    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
                    ItemMetadata {
                        title: text("title").unwrap_or_default(),
                        description: text("description"),
                        status: text("status"),
                    }
                }
                _ => continue,
            };
            self.items.insert(id.clone(), metadata);
        }
    }

    fn finalize(self) -> Dataset {
        for record in &self.upgrades {
            if record.items.is_empty() && !self.meta.contains_key(&record.upgrade_name) {
                tracing::info!(
                    upgrade = %record.upgrade_name,
                    "upgrade has no items and will not be drawn"
                );
            }
        }

        tracing::debug!(
            upgrades = self.upgrades.len(),
            meta = self.meta.len(),
            spec_links = self.spec_links.len(),
            items = self.items.len(),
            "dataset loaded"
        );

        Dataset {
            upgrades: self.upgrades,
            meta: self.meta,
            spec_links: self.spec_links,
            items: self.items,
        }
    }
}

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

/// Item ids arrive as strings or bare numbers.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn parse_layer(value: &str) -> Option<Layer> {
    match value.trim().to_ascii_lowercase().as_str() {
        "execution" | "el" => Some(Layer::Execution),
        "consensus" | "cl" => Some(Layer::Consensus),
        _ => None,
    }
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its date.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_in_both_forms() {
        assert_eq!(
            parse_date("2022-09-15"),
            NaiveDate::from_ymd_opt(2022, 9, 15)
        );
        assert_eq!(
            parse_date("2023-04-12T22:27:35Z"),
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
        assert_eq!(parse_date("2022-13-01"), None);
    }

    #[test]
    fn layer_names_are_case_insensitive() {
        assert_eq!(parse_layer("Execution"), Some(Layer::Execution));
        assert_eq!(parse_layer("CL"), Some(Layer::Consensus));
        assert_eq!(parse_layer("data"), None);
    }

    #[test]
    fn numeric_identifiers_become_strings() {
        assert_eq!(identifier(&Value::from(4844)), Some("4844".to_string()));
        assert_eq!(identifier(&Value::from(" ")), None);
    }
}
