//! Alias catalog — human device names mapped to hub addresses.
//!
//! The same spoken name may be bound to several unrelated devices (a
//! "rest room" light and a "rest room" speaker). The table therefore maps
//! each normalized name to an **ordered** list of entries; insertion order
//! is the final tie-break when neither category nor type preferences
//! disambiguate.

use serde::{Deserialize, Serialize};

/// Behavioral class of a device, driving disambiguation and response shape.
///
/// Deserialization never fails: unrecognized type tags degrade to
/// [`Unknown`](Self::Unknown) so a partially-migrated catalog stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DeviceType {
    /// On/off switchable output.
    Relay,
    /// Read-only measurement source.
    Sensor,
    /// Parametrized device (thermostat setpoints and the like).
    Device,
    /// Audio output, addressed through the hub `say` method.
    Media,
    /// No type tag in the catalog.
    #[default]
    Unknown,
}

impl From<String> for DeviceType {
    fn from(value: String) -> Self {
        // Catalogs written for the original system use the plural "sensors".
        match value.as_str() {
            "relay" => Self::Relay,
            "sensor" | "sensors" => Self::Sensor,
            "device" => Self::Device,
            "media" => Self::Media,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relay => f.write_str("relay"),
            Self::Sensor => f.write_str("sensor"),
            Self::Device => f.write_str("device"),
            Self::Media => f.write_str("media"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// One resolvable device binding.
///
/// `(object, property)` is the opaque hub address. No uniqueness is
/// enforced here: several entries may share a name, an address, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Hub entity identifier.
    pub object: String,
    /// Hub attribute on that entity.
    pub property: String,
    /// Catalog grouping the binding came from (not type-homogeneous).
    pub category: String,
    /// Behavioral class from the category's type tag.
    pub device_type: DeviceType,
}

/// Mapping from normalized alias name to its ordered entries.
///
/// Rebuilt wholesale on every catalog load; it is a pure derived view
/// with no lifecycle of its own.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: std::collections::HashMap<String, Vec<AliasEntry>>,
}

impl AliasTable {
    /// Append an entry under `name`, case-folding and trimming the name.
    ///
    /// Empty names are discarded. Repeated inserts under the same name
    /// accumulate in insertion order.
    pub fn insert(&mut self, name: &str, entry: AliasEntry) {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return;
        }
        self.entries.entry(name).or_default().push(entry);
    }

    /// All entries bound to `alias`, in insertion order.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&[AliasEntry]> {
        self.entries.get(alias).map(Vec::as_slice)
    }

    /// Number of distinct alias names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the best entry for `alias` under the given preferences.
    ///
    /// Order, first match wins:
    /// 1. unknown alias → `None`;
    /// 2. with `preferred_categories`: first entry (in table order) whose
    ///    category is preferred and whose type matches `preferred_type`
    ///    when one is given;
    /// 3. with `preferred_type`: first entry of that type, any category —
    ///    a category-and-type search degrades to type-only;
    /// 4. the first entry overall.
    #[must_use]
    pub fn find(
        &self,
        alias: &str,
        preferred_categories: Option<&[&str]>,
        preferred_type: Option<DeviceType>,
    ) -> Option<&AliasEntry> {
        let entries = self.entries.get(alias)?;
        if let Some(categories) = preferred_categories {
            for entry in entries {
                if !categories.contains(&entry.category.as_str()) {
                    continue;
                }
                if preferred_type.is_some_and(|ty| entry.device_type != ty) {
                    continue;
                }
                return Some(entry);
            }
        }
        if let Some(ty) = preferred_type {
            if let Some(entry) = entries.iter().find(|e| e.device_type == ty) {
                return Some(entry);
            }
        }
        entries.first()
    }

    /// Alias names having at least one entry matching the restriction,
    /// sorted for stable presentation.
    ///
    /// This is the "known alternatives" list shown to a caller after a
    /// failed lookup, filtered so only relevant names are suggested.
    #[must_use]
    pub fn names_matching(
        &self,
        categories: Option<&[&str]>,
        device_type: Option<DeviceType>,
    ) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entries)| {
                entries.iter().any(|e| {
                    categories.is_none_or(|c| c.contains(&e.category.as_str()))
                        && device_type.is_none_or(|ty| e.device_type == ty)
                })
            })
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// All alias names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names_matching(None, None)
    }
}
