//! Device service — spoken-name device operations against the hub.
//!
//! Every operation normalizes the query, resolves it with the preference
//! rules of its device class, performs the hub call, and records an audit
//! entry either way. Callers always get a resolved result or a structured
//! "not found, here are alternatives" error, never a bare failure.

use domobridge_domain::alias::DeviceType;
use domobridge_domain::audit::AuditRecord;
use domobridge_domain::error::{BridgeError, ValidationError};
use domobridge_domain::query::normalize;

use crate::executor::DEVICE_TASK_CATEGORIES;
use crate::ports::{AliasCatalog, AuditSink, HubGateway};
use crate::resolver::DeviceResolver;

/// Category searched when announcing text through a room speaker.
const SPEAKER_CATEGORIES: &[&str] = &["speakers"];

/// Current status of a relay device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Whether the relay reports "1".
    pub on: bool,
    /// Raw value as returned by the hub.
    pub raw: String,
}

/// Caller-facing device operations.
pub struct DeviceService<C, H, A> {
    resolver: DeviceResolver<C>,
    hub: H,
    audit: A,
    /// Identity of the front-end session on whose behalf we act.
    user: String,
}

impl<C, H, A> DeviceService<C, H, A>
where
    C: AliasCatalog,
    H: HubGateway,
    A: AuditSink,
{
    /// Create a service acting on behalf of `user`.
    pub fn new(resolver: DeviceResolver<C>, hub: H, audit: A, user: impl Into<String>) -> Self {
        Self {
            resolver,
            hub,
            audit,
            user: user.into(),
        }
    }

    /// Switch a relay on or off by spoken name.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] for an unrecognized switch
    /// command, [`BridgeError::NotFound`] when no relay matches, or a hub
    /// error when the call fails.
    #[tracing::instrument(skip(self))]
    pub async fn set_device(&self, query: &str, command: &str) -> Result<(), BridgeError> {
        let name = normalize(query);
        let Some(on) = parse_switch(command) else {
            let err = ValidationError::UnknownCommand(command.to_string());
            self.record("set_device", &name, false, error_details(&err))
                .await;
            return Err(err.into());
        };

        let entry = match self
            .resolver
            .resolve(&name, Some(DEVICE_TASK_CATEGORIES), Some(DeviceType::Relay))
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                self.record("set_device", &name, false, error_details(&err))
                    .await;
                return Err(err.into());
            }
        };

        let value = if on { "1" } else { "0" };
        let result = self
            .hub
            .set_property(&entry.object, &entry.property, value)
            .await;
        match &result {
            Ok(()) => {
                self.record(
                    "set_device",
                    &name,
                    true,
                    serde_json::json!({"state": if on { "on" } else { "off" }}),
                )
                .await;
            }
            Err(err) => {
                self.record("set_device", &name, false, error_details(err))
                    .await;
            }
        }
        result
    }

    /// Read a relay's current status by spoken name.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no relay matches, or a hub
    /// error when the call fails.
    #[tracing::instrument(skip(self))]
    pub async fn device_status(&self, query: &str) -> Result<DeviceStatus, BridgeError> {
        let name = normalize(query);
        let entry = match self
            .resolver
            .resolve(&name, Some(DEVICE_TASK_CATEGORIES), Some(DeviceType::Relay))
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                self.record("device_status", &name, false, error_details(&err))
                    .await;
                return Err(err.into());
            }
        };

        match self.hub.get_property(&entry.object, &entry.property).await {
            Ok(raw) => {
                let status = DeviceStatus {
                    on: raw == "1",
                    raw,
                };
                self.record(
                    "device_status",
                    &name,
                    true,
                    serde_json::json!({"status": if status.on { "on" } else { "off" }, "raw_value": status.raw}),
                )
                .await;
                Ok(status)
            }
            Err(err) => {
                self.record("device_status", &name, false, error_details(&err))
                    .await;
                Err(err)
            }
        }
    }

    /// Read a sensor value by spoken name.
    ///
    /// The optional `unit` hint narrows the search to the matching sensor
    /// category ("degrees" → temperature, "percent" → humidity, …); the
    /// lookup still requires the `sensor` type either way.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no sensor matches, or a hub
    /// error when the call fails.
    #[tracing::instrument(skip(self))]
    pub async fn sensor_value(
        &self,
        query: &str,
        unit: Option<&str>,
    ) -> Result<String, BridgeError> {
        let name = normalize(query);
        let categories = unit.and_then(sensor_categories_for_unit);
        let entry = match self
            .resolver
            .resolve(&name, categories, Some(DeviceType::Sensor))
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                self.record("sensor_value", &name, false, error_details(&err))
                    .await;
                return Err(err.into());
            }
        };

        match self.hub.get_property(&entry.object, &entry.property).await {
            Ok(value) => {
                self.record(
                    "sensor_value",
                    &name,
                    true,
                    serde_json::json!({"value": value, "unit": unit}),
                )
                .await;
                Ok(value)
            }
            Err(err) => {
                self.record("sensor_value", &name, false, error_details(&err))
                    .await;
                Err(err)
            }
        }
    }

    /// Set a parameter on a `device`-type target (setpoints and the like).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no parametrized device
    /// matches, or a hub error when the call fails.
    #[tracing::instrument(skip(self))]
    pub async fn set_parameter(&self, query: &str, value: &str) -> Result<(), BridgeError> {
        let name = normalize(query);
        let entry = match self
            .resolver
            .resolve(&name, None, Some(DeviceType::Device))
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                self.record("set_parameter", &name, false, error_details(&err))
                    .await;
                return Err(err.into());
            }
        };

        let result = self
            .hub
            .set_property(&entry.object, &entry.property, value)
            .await;
        match &result {
            Ok(()) => {
                self.record(
                    "set_parameter",
                    &name,
                    true,
                    serde_json::json!({"value": value}),
                )
                .await;
            }
            Err(err) => {
                self.record("set_parameter", &name, false, error_details(err))
                    .await;
            }
        }
        result
    }

    /// Trigger a hub script by name. No resolution involved.
    ///
    /// # Errors
    ///
    /// Returns a hub error when the call fails.
    #[tracing::instrument(skip(self))]
    pub async fn run_script(&self, name: &str) -> Result<(), BridgeError> {
        let result = self.hub.run_script(name).await;
        match &result {
            Ok(()) => self.record("run_script", name, true, serde_json::json!({})).await,
            Err(err) => {
                self.record("run_script", name, false, error_details(err))
                    .await;
            }
        }
        result
    }

    /// Speak `text` through the speaker of the given room.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when the room has no speaker, or
    /// a hub error when the call fails.
    #[tracing::instrument(skip(self, text))]
    pub async fn announce(&self, room: &str, text: &str) -> Result<(), BridgeError> {
        let name = normalize(room);
        let entry = match self.resolver.resolve(&name, Some(SPEAKER_CATEGORIES), None).await {
            Ok(entry) => entry,
            Err(err) => {
                self.record("announce", &name, false, error_details(&err))
                    .await;
                return Err(err.into());
            }
        };

        let result = self.hub.say(&entry.object, text).await;
        match &result {
            Ok(()) => self.record("announce", &name, true, serde_json::json!({})).await,
            Err(err) => {
                self.record("announce", &name, false, error_details(err)).await;
            }
        }
        result
    }

    async fn record(&self, action: &str, target: &str, success: bool, details: serde_json::Value) {
        let record = AuditRecord::new("bridge", action, target, success)
            .with_user(self.user.clone())
            .with_details(details);
        if let Err(err) = self.audit.record(record).await {
            tracing::warn!(error = %err, "failed to write audit record");
        }
    }
}

/// Map a spoken switch command to on/off, `None` when unrecognizable.
///
/// Containment checks, not equality: front-ends hand over phrases like
/// "включи свет" or "turn off".
fn parse_switch(command: &str) -> Option<bool> {
    let command = command.to_lowercase();
    const ON_WORDS: &[&str] = &["включи", "зажги", "on", "1", "да"];
    const OFF_WORDS: &[&str] = &["выключи", "потуши", "off", "0", "нет"];
    if ON_WORDS.iter().any(|word| command.contains(word)) {
        return Some(true);
    }
    if OFF_WORDS.iter().any(|word| command.contains(word)) {
        return Some(false);
    }
    None
}

fn error_details(err: &impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({"error": err.to_string()})
}

/// Preferred sensor categories for a spoken unit hint.
fn sensor_categories_for_unit(unit: &str) -> Option<&'static [&'static str]> {
    match unit.to_lowercase().as_str() {
        "percent" | "%" | "процентов" => Some(&["sensors_humidity"]),
        "degrees" | "°c" | "°f" | "градусов" => Some(&["sensors_temperature"]),
        "pressure" | "pa" | "bar" | "паскаль" | "мм рт.ст." => Some(&["sensors_pressure"]),
        "ppm" | "co2" => Some(&["sensors_gas"]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AliasCatalog;
    use domobridge_domain::alias::{AliasEntry, AliasTable};
    use domobridge_domain::error::HubError;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    // ── In-memory fakes ────────────────────────────────────────────

    #[derive(Clone)]
    struct FixedCatalog {
        table: AliasTable,
    }

    impl AliasCatalog for FixedCatalog {
        fn load(&self) -> impl Future<Output = AliasTable> + Send {
            let table = self.table.clone();
            async move { table }
        }
    }

    #[derive(Default)]
    struct FakeHub {
        fail: bool,
        value: String,
        gets: Mutex<Vec<(String, String)>>,
        sets: Mutex<Vec<(String, String, String)>>,
        says: Mutex<Vec<(String, String)>>,
        scripts: Mutex<Vec<String>>,
    }

    impl FakeHub {
        fn outcome(&self) -> Result<(), BridgeError> {
            if self.fail {
                Err(HubError::Status(500).into())
            } else {
                Ok(())
            }
        }
    }

    impl HubGateway for FakeHub {
        fn get_property(
            &self,
            object: &str,
            property: &str,
        ) -> impl Future<Output = Result<String, BridgeError>> + Send {
            self.gets
                .lock()
                .unwrap()
                .push((object.to_string(), property.to_string()));
            let result = self.outcome().map(|()| self.value.clone());
            async { result }
        }

        fn set_property(
            &self,
            object: &str,
            property: &str,
            value: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.sets.lock().unwrap().push((
                object.to_string(),
                property.to_string(),
                value.to_string(),
            ));
            let result = self.outcome();
            async { result }
        }

        fn run_script(&self, name: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.scripts.lock().unwrap().push(name.to_string());
            let result = self.outcome();
            async { result }
        }

        fn say(
            &self,
            object: &str,
            text: &str,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.says
                .lock()
                .unwrap()
                .push((object.to_string(), text.to_string()));
            let result = self.outcome();
            async { result }
        }
    }

    #[derive(Default, Clone)]
    struct CollectingAudit {
        records: Arc<Mutex<Vec<AuditRecord>>>,
    }

    impl AuditSink for CollectingAudit {
        fn record(
            &self,
            record: AuditRecord,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.records.lock().unwrap().push(record);
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn entry(object: &str, category: &str, device_type: DeviceType) -> AliasEntry {
        AliasEntry {
            object: object.to_string(),
            property: if device_type == DeviceType::Media {
                "say".to_string()
            } else {
                "status".to_string()
            },
            category: category.to_string(),
            device_type,
        }
    }

    fn catalog() -> FixedCatalog {
        let mut table = AliasTable::default();
        table.insert("rest room", entry("Relay01", "lighting", DeviceType::Relay));
        table.insert("rest room", entry("Speaker1", "speakers", DeviceType::Media));
        table.insert("bedroom", entry("Temp1", "sensors_temperature", DeviceType::Sensor));
        table.insert("bedroom", entry("Hum1", "sensors_humidity", DeviceType::Sensor));
        table.insert("boiler", entry("Boiler1", "heating", DeviceType::Device));
        FixedCatalog { table }
    }

    fn service(hub: FakeHub) -> DeviceService<FixedCatalog, FakeHub, CollectingAudit> {
        DeviceService::new(
            DeviceResolver::new(catalog()),
            hub,
            CollectingAudit::default(),
            "assistant",
        )
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_switch_relay_on_by_spoken_name() {
        let svc = service(FakeHub::default());
        svc.set_device("rest room", "включи").await.unwrap();

        let sets = svc.hub.sets.lock().unwrap().clone();
        assert_eq!(
            sets,
            vec![("Relay01".to_string(), "status".to_string(), "1".to_string())]
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_switch_command() {
        let svc = service(FakeHub::default());
        let err = svc.set_device("rest room", "dance").await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Validation(ValidationError::UnknownCommand(_))
        ));
        assert!(svc.hub.sets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_with_relay_alternatives() {
        let svc = service(FakeHub::default());
        let err = svc.set_device("attic", "on").await.unwrap_err();
        let BridgeError::NotFound(err) = err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert_eq!(err.alternatives, vec!["rest room".to_string()]);
    }

    #[tokio::test]
    async fn should_read_relay_status() {
        let svc = service(FakeHub {
            value: "1".to_string(),
            ..FakeHub::default()
        });
        let status = svc.device_status("rest room").await.unwrap();
        assert!(status.on);
        assert_eq!(status.raw, "1");
    }

    #[tokio::test]
    async fn should_pick_sensor_category_from_unit_hint() {
        let svc = service(FakeHub {
            value: "47".to_string(),
            ..FakeHub::default()
        });
        let value = svc.sensor_value("bedroom", Some("percent")).await.unwrap();
        assert_eq!(value, "47");

        // The humidity entry, not the temperature one that comes first.
        let gets = svc.hub.gets.lock().unwrap().clone();
        assert_eq!(gets[0].0, "Hum1");

        let records = svc.audit.records.lock().unwrap();
        assert!(records[0].success);
        assert_eq!(records[0].user, "assistant");
    }

    #[tokio::test]
    async fn should_set_parameter_on_device_type_target() {
        let svc = service(FakeHub::default());
        svc.set_parameter("boiler", "21.5").await.unwrap();

        let sets = svc.hub.sets.lock().unwrap().clone();
        assert_eq!(sets[0].0, "Boiler1");
        assert_eq!(sets[0].2, "21.5");
    }

    #[tokio::test]
    async fn should_announce_through_room_speaker() {
        let svc = service(FakeHub::default());
        svc.announce("rest room", "dinner is ready").await.unwrap();

        let says = svc.hub.says.lock().unwrap().clone();
        assert_eq!(
            says,
            vec![("Speaker1".to_string(), "dinner is ready".to_string())]
        );
    }

    #[tokio::test]
    async fn should_audit_hub_failure() {
        let svc = service(FakeHub {
            fail: true,
            ..FakeHub::default()
        });
        let err = svc.run_script("good_night").await.unwrap_err();
        assert!(matches!(err, BridgeError::Hub(HubError::Status(500))));

        let records = svc.audit.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert_eq!(records[0].source, "bridge");
    }

    #[test]
    fn should_parse_switch_phrases() {
        assert_eq!(parse_switch("turn on"), Some(true));
        assert_eq!(parse_switch("включи свет"), Some(true));
        assert_eq!(parse_switch("выключи"), Some(false));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("dance"), None);
    }
}
