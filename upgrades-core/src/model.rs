//! Input records and the drawable items derived from them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item id meaning "no discrete item, link to the execution spec".
pub const EXECUTION_SPEC_SENTINEL: &str = "execution-spec";
/// Item id meaning "no discrete item, link to the consensus spec".
pub const CONSENSUS_SPEC_SENTINEL: &str = "consensus-spec";
/// Suffix marking an item that was dropped from the upgrade.
pub const REMOVED_MARKER: &str = "-removed";

/// Protocol layer an upgrade or item belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Execution,
    Consensus,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Execution => "execution",
            Layer::Consensus => "consensus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layer::Execution => "Execution",
            Layer::Consensus => "Consensus",
        }
    }
}

/// One named upgrade as supplied by the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UpgradeRecord {
    pub date: NaiveDate,
    pub upgrade_name: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_epoch: Option<u64>,
}

/// Upgrade name to its single meta item id.
pub type MetaAssociations = BTreeMap<String, String>;

/// External specification links for an upgrade, per layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SpecLinks {
    #[serde(default)]
    pub execution: Option<String>,
    #[serde(default)]
    pub consensus: Option<String>,
}

impl SpecLinks {
    pub fn for_layer(&self, layer: Layer) -> Option<&str> {
        match layer {
            Layer::Execution => self.execution.as_deref(),
            Layer::Consensus => self.consensus.as_deref(),
        }
    }
}

/// Human readable text shown in the tooltip for an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Everything the timeline reads from the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Dataset {
    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,
    #[serde(default)]
    pub meta: MetaAssociations,
    #[serde(default)]
    pub spec_links: BTreeMap<String, SpecLinks>,
    #[serde(default)]
    pub items: BTreeMap<String, ItemMetadata>,
}

impl Dataset {
    pub fn spec_link(&self, upgrade_name: &str, layer: Layer) -> Option<&str> {
        self.spec_links
            .get(upgrade_name)
            .and_then(|links| links.for_layer(layer))
    }

    pub fn item_metadata(&self, item: &ItemRef) -> Option<&ItemMetadata> {
        match item {
            ItemRef::Numbered(id) => self.items.get(id),
            _ => None,
        }
    }
}

/// What an item identifier resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    /// A concrete item, carrying its cleaned identifier.
    Numbered(String),
    ExternalExecutionLink,
    ExternalConsensusLink,
}

impl ItemRef {
    pub fn label(&self) -> &str {
        match self {
            ItemRef::Numbered(id) => id,
            ItemRef::ExternalExecutionLink => "Execution spec",
            ItemRef::ExternalConsensusLink => "Consensus spec",
        }
    }

    /// Layer of the spec a sentinel links to; `None` for concrete items.
    pub fn sentinel_layer(&self) -> Option<Layer> {
        match self {
            ItemRef::Numbered(_) => None,
            ItemRef::ExternalExecutionLink => Some(Layer::Execution),
            ItemRef::ExternalConsensusLink => Some(Layer::Consensus),
        }
    }
}

/// Identity of a drawable item, used for hover tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub date: NaiveDate,
    pub upgrade_name: String,
    pub item: ItemRef,
}

/// One box on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DrawableItem {
    pub date: NaiveDate,
    pub upgrade_name: String,
    pub item: ItemRef,
    pub is_meta: bool,
    pub layer: Option<Layer>,
    pub removed: bool,
}

impl DrawableItem {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            date: self.date,
            upgrade_name: self.upgrade_name.clone(),
            item: self.item.clone(),
        }
    }

    pub fn matches(&self, key: &ItemKey) -> bool {
        self.date == key.date && self.upgrade_name == key.upgrade_name && self.item == key.item
    }
}
