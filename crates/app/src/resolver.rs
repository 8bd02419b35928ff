//! Device resolver — normalized alias + preferences → hub address.

use domobridge_domain::alias::{AliasEntry, DeviceType};
use domobridge_domain::error::NotFoundError;

use crate::ports::AliasCatalog;

/// Resolves alias names against a freshly loaded alias table.
///
/// The catalog is re-read on every call, so edits to the device catalog
/// take effect on the next lookup without a restart. The table itself is
/// a read-only snapshot; resolution never mutates shared state.
#[derive(Debug, Clone)]
pub struct DeviceResolver<C> {
    catalog: C,
}

impl<C: AliasCatalog> DeviceResolver<C> {
    /// Create a resolver over the given catalog source.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Resolve an already-normalized alias to its best-matching entry.
    ///
    /// Preference order: preferred category (and type, when given), then
    /// type alone, then the first entry in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the alias is unknown, carrying the
    /// known alias names filtered to the same category/type restriction
    /// so the caller can offer a correction prompt.
    pub async fn resolve(
        &self,
        alias: &str,
        preferred_categories: Option<&[&str]>,
        preferred_type: Option<DeviceType>,
    ) -> Result<AliasEntry, NotFoundError> {
        let table = self.catalog.load().await;
        match table.find(alias, preferred_categories, preferred_type) {
            Some(entry) => Ok(entry.clone()),
            None => Err(NotFoundError {
                alias: alias.to_string(),
                alternatives: table.names_matching(preferred_categories, preferred_type),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domobridge_domain::alias::AliasTable;
    use std::future::Future;

    /// Catalog stub returning a fixed table on every load.
    struct FixedCatalog {
        table: AliasTable,
    }

    impl AliasCatalog for FixedCatalog {
        fn load(&self) -> impl Future<Output = AliasTable> + Send {
            let table = self.table.clone();
            async move { table }
        }
    }

    fn entry(object: &str, category: &str, device_type: DeviceType) -> AliasEntry {
        AliasEntry {
            object: object.to_string(),
            property: "status".to_string(),
            category: category.to_string(),
            device_type,
        }
    }

    fn resolver() -> DeviceResolver<FixedCatalog> {
        let mut table = AliasTable::default();
        table.insert("hall", entry("Relay01", "lighting", DeviceType::Relay));
        table.insert("rest room", entry("Relay01", "lighting", DeviceType::Relay));
        table.insert("rest room", entry("Speaker1", "speakers", DeviceType::Media));
        table.insert("bedroom", entry("Temp1", "sensors_temperature", DeviceType::Sensor));
        DeviceResolver::new(FixedCatalog { table })
    }

    #[tokio::test]
    async fn should_resolve_by_preferred_category_and_type() {
        let entry = resolver()
            .resolve("rest room", Some(&["lighting"]), Some(DeviceType::Relay))
            .await
            .unwrap();
        assert_eq!(entry.object, "Relay01");
    }

    #[tokio::test]
    async fn should_resolve_by_type_only() {
        let entry = resolver()
            .resolve("rest room", None, Some(DeviceType::Media))
            .await
            .unwrap();
        assert_eq!(entry.object, "Speaker1");
    }

    #[tokio::test]
    async fn should_return_first_entry_without_preferences() {
        let entry = resolver().resolve("rest room", None, None).await.unwrap();
        assert_eq!(entry.object, "Relay01");
    }

    #[tokio::test]
    async fn should_report_filtered_alternatives_on_not_found() {
        let err = resolver()
            .resolve("attic", Some(&["lighting"]), Some(DeviceType::Relay))
            .await
            .unwrap_err();
        assert_eq!(err.alias, "attic");
        assert_eq!(
            err.alternatives,
            vec!["hall".to_string(), "rest room".to_string()]
        );
    }

    #[tokio::test]
    async fn should_report_sensor_alternatives_for_sensor_lookup() {
        let err = resolver()
            .resolve("attic", None, Some(DeviceType::Sensor))
            .await
            .unwrap_err();
        assert_eq!(err.alternatives, vec!["bedroom".to_string()]);
    }

    #[tokio::test]
    async fn should_stay_usable_with_empty_catalog() {
        let resolver = DeviceResolver::new(FixedCatalog {
            table: AliasTable::default(),
        });
        let err = resolver.resolve("hall", None, None).await.unwrap_err();
        assert!(err.alternatives.is_empty());
    }
}
