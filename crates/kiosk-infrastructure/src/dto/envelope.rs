//! Loading and saving versioned documents through a `version_migrate::Migrator`.
//!
//! # Schema Versioning (Semantic Versioning)
//!
//! Every persisted document is written flat as
//! `{"version": "X.Y.Z", "data": <payload>}`.
//!
//! - **Major** changes are incompatible: a document with a different major
//!   version is reported as `Hydration::SchemaMismatch` and discarded.
//! - **Minor/Patch** changes must stay readable by older builds, so any
//!   version sharing the current major is read as the current one.
//!
//! Documents written before the envelope existed are a bare JSON array of
//! the payload. They are tagged with the legacy version and handed to the
//! migrator, which steps them up like any other old document.

use semver::Version;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use version_migrate::Migrator;

use kiosk_core::error::Result;
use kiosk_core::storage::Hydration;

/// Schema parameters of one stored document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema<'a> {
    /// Entity name registered with the migrator.
    pub entity: &'a str,
    /// Version written on save.
    pub current: &'a Version,
    /// Version given to bare legacy arrays.
    pub legacy: &'a str,
}

/// Serializes a domain value as the current version of `schema.entity`.
pub fn encode_document<D: Serialize>(
    migrator: &Migrator,
    schema: DocumentSchema<'_>,
    domain: D,
) -> Result<String> {
    Ok(migrator.save_domain_flat(schema.entity, domain)?)
}

/// Parses a stored document and migrates it to the domain type.
///
/// Never fails: unreadable input becomes `Corrupted`, an incompatible major
/// version becomes `SchemaMismatch`.
pub fn decode_document<D: DeserializeOwned>(
    migrator: &Migrator,
    schema: DocumentSchema<'_>,
    raw: &str,
) -> Hydration<D> {
    let value = match check_version(schema, raw) {
        Ok(value) => value,
        Err(rejected) => return rejected,
    };

    match migrator.load_flat_from(schema.entity, value) {
        Ok(domain) => Hydration::Loaded(domain),
        Err(e) => Hydration::Corrupted(format!("invalid payload: {}", e)),
    }
}

/// Classifies the raw document and returns the value the migrator should see.
fn check_version<D>(
    schema: DocumentSchema<'_>,
    raw: &str,
) -> std::result::Result<Value, Hydration<D>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Hydration::Corrupted(format!("invalid JSON: {}", e)))?;

    let mut fields = match value {
        Value::Array(_) => return Ok(json!({ "version": schema.legacy, "data": value })),
        Value::Object(fields) => fields,
        _ => return Err(Hydration::Corrupted("expected an object or an array".into())),
    };

    let found = match fields.get("version") {
        Some(Value::String(version)) => Version::parse(version).map_err(|e| {
            Hydration::Corrupted(format!("invalid version '{}': {}", version, e))
        })?,
        Some(_) => return Err(Hydration::Corrupted("version is not a string".to_string())),
        None => return Err(Hydration::Corrupted("missing version field".to_string())),
    };
    if found.major != schema.current.major {
        return Err(Hydration::SchemaMismatch {
            found: found.to_string(),
            expected: schema.current.to_string(),
        });
    }
    if !fields.contains_key("data") {
        return Err(Hydration::Corrupted("missing data field".to_string()));
    }

    fields.insert("version".to_string(), Value::String(schema.current.to_string()));
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::cart::{
        CART_ITEMS_ENTITY, CART_ITEMS_LEGACY_VERSION, CART_ITEMS_VERSION,
        create_cart_items_migrator,
    };
    use kiosk_core::cart::LineItem;

    fn schema() -> DocumentSchema<'static> {
        const SCHEMA: DocumentSchema<'static> = DocumentSchema {
            entity: CART_ITEMS_ENTITY,
            current: &CART_ITEMS_VERSION,
            legacy: CART_ITEMS_LEGACY_VERSION,
        };
        SCHEMA
    }

    fn decode(raw: &str) -> Hydration<Vec<LineItem>> {
        let migrator = create_cart_items_migrator().unwrap();
        decode_document(&migrator, schema(), raw)
    }

    fn tea(quantity: u32) -> LineItem {
        LineItem {
            id: 1,
            name: "Tea".to_string(),
            price: 2.0,
            quantity,
        }
    }

    #[test]
    fn test_encode_then_decode_current_version() {
        let migrator = create_cart_items_migrator().unwrap();
        let raw = encode_document(&migrator, schema(), vec![tea(2)]).unwrap();

        assert_eq!(decode(&raw), Hydration::Loaded(vec![tea(2)]));
    }

    #[test]
    fn test_decode_newer_minor_is_compatible() {
        let decoded = decode(r#"{"version":"1.4.2","data":[]}"#);
        assert_eq!(decoded, Hydration::Loaded(vec![]));
    }

    #[test]
    fn test_decode_legacy_bare_array() {
        let decoded = decode(r#"[{"id":1,"name":"Tea","price":2.0,"quantity":3}]"#);
        assert_eq!(decoded, Hydration::Loaded(vec![tea(3)]));
    }

    #[test]
    fn test_decode_other_major_is_mismatch() {
        assert_eq!(
            decode(r#"{"version":"2.0.0","data":[]}"#),
            Hydration::SchemaMismatch {
                found: "2.0.0".to_string(),
                expected: "1.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_garbage_is_corrupted() {
        for raw in [
            "not json",
            "42",
            r#"{"data":[]}"#,
            r#"{"version":"x","data":[]}"#,
            r#"{"version":1,"data":[]}"#,
            r#"{"version":"1.0.0"}"#,
            r#"{"version":"1.0.0","data":{"a":1}}"#,
            r#"[1,2]"#,
        ] {
            assert!(matches!(decode(raw), Hydration::Corrupted(_)), "raw {:?}", raw);
        }
    }
}
