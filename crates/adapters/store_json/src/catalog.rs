//! Alias catalog backed by the device catalog JSON file.
//!
//! Catalog layout: top-level object keyed by category, each category an
//! object with a `type` tag and a `devices` map. A devices key may join
//! several spoken names with commas; each name gets its own table entry.
//!
//! ```json
//! {
//!   "lighting": {
//!     "type": "relay",
//!     "devices": {
//!       "rest room, туалет": {"object": "Relay01", "property": "status"}
//!     }
//!   }
//! }
//! ```
//!
//! Loading fails soft: a missing or corrupt file yields an empty table.
//! Category order in the file is the tie-break order of resolution, which
//! is why parsing goes through `serde_json`'s order-preserving maps.

use std::future::Future;
use std::path::PathBuf;

use serde_json::Value;

use domobridge_app::ports::AliasCatalog;
use domobridge_domain::alias::{AliasEntry, AliasTable, DeviceType};

/// [`AliasCatalog`] reading the catalog file on every load.
#[derive(Debug, Clone)]
pub struct JsonAliasCatalog {
    path: PathBuf,
}

impl JsonAliasCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> AliasTable {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "catalog unreadable, using empty table");
                return AliasTable::default();
            }
        };
        let root: Value = match serde_json::from_str(&text) {
            Ok(root) => root,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "catalog is not valid JSON, using empty table");
                return AliasTable::default();
            }
        };
        let Some(categories) = root.as_object() else {
            tracing::warn!(path = %self.path.display(), "catalog root is not an object, using empty table");
            return AliasTable::default();
        };

        let mut table = AliasTable::default();
        for (category, body) in categories {
            let Some(devices) = body.get("devices").and_then(Value::as_object) else {
                tracing::warn!(category, "category has no devices map, skipping");
                continue;
            };
            let device_type = body
                .get("type")
                .and_then(Value::as_str)
                .map_or(DeviceType::Unknown, |tag| {
                    DeviceType::from(tag.to_string())
                });

            for (names, device) in devices {
                let (Some(object), Some(property)) = (
                    device.get("object").and_then(Value::as_str),
                    device.get("property").and_then(Value::as_str),
                ) else {
                    tracing::warn!(category, names, "device entry lacks object/property, skipping");
                    continue;
                };
                for name in names.split(',') {
                    table.insert(
                        name,
                        AliasEntry {
                            object: object.to_string(),
                            property: property.to_string(),
                            category: category.clone(),
                            device_type,
                        },
                    );
                }
            }
        }
        table
    }
}

impl AliasCatalog for JsonAliasCatalog {
    fn load(&self) -> impl Future<Output = AliasTable> + Send {
        let table = self.read();
        async move { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_catalog(content: &str) -> (tempfile::TempDir, JsonAliasCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, content).unwrap();
        (dir, JsonAliasCatalog::new(path))
    }

    #[tokio::test]
    async fn should_load_entries_with_comma_fan_out() {
        let (_dir, catalog) = write_catalog(
            r#"{
                "lighting": {
                    "type": "relay",
                    "devices": {
                        "rest room, туалет": {"object": "Relay01", "property": "status"}
                    }
                }
            }"#,
        );

        let table = catalog.load().await;
        assert_eq!(table.len(), 2);
        let entry = &table.get("rest room").unwrap()[0];
        assert_eq!(entry.object, "Relay01");
        assert_eq!(entry.category, "lighting");
        assert_eq!(entry.device_type, DeviceType::Relay);
        assert_eq!(table.get("туалет").unwrap()[0].object, "Relay01");
    }

    #[tokio::test]
    async fn should_preserve_category_order_per_alias() {
        let (_dir, catalog) = write_catalog(
            r#"{
                "lighting": {
                    "type": "relay",
                    "devices": {"hall": {"object": "Relay02", "property": "status"}}
                },
                "speakers": {
                    "type": "media",
                    "devices": {"hall": {"object": "Speaker2", "property": "say"}}
                }
            }"#,
        );

        let table = catalog.load().await;
        let entries = table.get("hall").unwrap();
        assert_eq!(entries[0].object, "Relay02");
        assert_eq!(entries[1].object, "Speaker2");
    }

    #[tokio::test]
    async fn should_default_missing_type_to_unknown() {
        let (_dir, catalog) = write_catalog(
            r#"{
                "misc": {
                    "devices": {"thing": {"object": "X1", "property": "status"}}
                }
            }"#,
        );

        let table = catalog.load().await;
        assert_eq!(table.get("thing").unwrap()[0].device_type, DeviceType::Unknown);
    }

    #[tokio::test]
    async fn should_skip_category_without_devices_map() {
        let (_dir, catalog) = write_catalog(
            r#"{
                "broken": {"type": "relay"},
                "lighting": {
                    "type": "relay",
                    "devices": {"hall": {"object": "Relay02", "property": "status"}}
                }
            }"#,
        );

        let table = catalog.load().await;
        assert_eq!(table.len(), 1);
        assert!(table.get("hall").is_some());
    }

    #[tokio::test]
    async fn should_return_empty_table_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonAliasCatalog::new(dir.path().join("absent.json"));
        assert!(catalog.load().await.is_empty());
    }

    #[tokio::test]
    async fn should_return_empty_table_for_corrupt_file() {
        let (_dir, catalog) = write_catalog("{not json");
        assert!(catalog.load().await.is_empty());
    }
}
