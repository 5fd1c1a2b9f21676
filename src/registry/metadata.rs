//! Metadata rendering boundary.
//!
//! Given a record's identifying tuple, a renderer produces a human- or
//! machine-readable description. Rendering is outside the algorithmic
//! core; the registry only defines the interface and ships a plain JSON
//! implementation.

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::types::{Identity, Name, SurrogateId, Timestamp};

/// Renders a description for a registered name.
pub trait MetadataRenderer {
    /// Produce a description for the record tuple
    fn render(
        &self,
        surrogate_id: SurrogateId,
        name: &Name,
        owner: &Identity,
        expires_at: Timestamp,
    ) -> String;
}

/// Default renderer: one compact JSON object per record.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl MetadataRenderer for JsonRenderer {
    fn render(
        &self,
        surrogate_id: SurrogateId,
        name: &Name,
        owner: &Identity,
        expires_at: Timestamp,
    ) -> String {
        let expiry = Utc
            .timestamp_opt(expires_at, 0)
            .single()
            .map_or_else(|| expires_at.to_string(), |t| t.to_rfc3339());

        json!({
            "surrogate_id": surrogate_id,
            "name": name.as_str(),
            "owner": owner.to_hex(),
            "expires_at": expiry,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_renderer_fields() {
        let name = Name::parse("rendered").unwrap();
        let owner = Identity::derive(b"owner");

        let out = JsonRenderer.render(7, &name, &owner, 1_700_000_000);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["surrogate_id"], 7);
        assert_eq!(parsed["name"], "rendered");
        assert_eq!(parsed["owner"], owner.to_hex());
        // RFC3339 expiry
        assert!(parsed["expires_at"].as_str().unwrap().starts_with("2023-11-14T"));
    }
}
