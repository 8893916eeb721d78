use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Body of a successful service response.
///
/// `json`-format requests come back parsed; every other format (`xml`,
/// `kml`, `txt`) is handed over untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Raw(String),
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            ApiResponse::Raw(body) => Some(body.as_str()),
            ApiResponse::Json(_) => None,
        }
    }

    /// Deserialize the body into a typed payload such as
    /// [`FeatureCollection`]. Raw bodies are parsed as JSON first.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, Error> {
        match self {
            ApiResponse::Json(value) => Ok(serde_json::from_value(value.clone())?),
            ApiResponse::Raw(body) => Ok(serde_json::from_str(body)?),
        }
    }
}

/// GeoJSON-style result of search, closest-match and feature lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Value>,
}

/// Result of a footprint lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub footprints: Vec<Value>,
}

/// Result of a supported-feature-types request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTypes {
    pub total_results: u64,
    #[serde(default)]
    pub feature_types: Vec<String>,
}

impl FeatureTypes {
    /// The service promises one entry per counted result.
    pub fn is_consistent(&self) -> bool {
        self.feature_types.len() as u64 == self.total_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_feature_collection_from_json_body() {
        let response = ApiResponse::Json(json!({
            "type": "FeatureCollection",
            "features": [{"properties": {"name": "Dublin"}}],
        }));

        let collection: FeatureCollection = response.decode().expect("decode should succeed");
        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn decode_footprint_collection_from_raw_body() {
        let response =
            ApiResponse::Raw(r#"{"type":"FootprintCollection","footprints":[]}"#.to_string());

        let collection: FootprintCollection = response.decode().expect("decode should succeed");
        assert_eq!(collection.kind, "FootprintCollection");
        assert!(collection.footprints.is_empty());
    }

    #[test]
    fn decode_non_json_raw_body_fails() {
        let response = ApiResponse::Raw("<kml></kml>".to_string());
        let err = response.decode::<FeatureCollection>().unwrap_err();

        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn feature_types_consistency() {
        let listing = FeatureTypes {
            total_results: 2,
            feature_types: vec!["river".to_string(), "mountain".to_string()],
        };
        assert!(listing.is_consistent());

        let short = FeatureTypes { total_results: 3, feature_types: vec!["river".to_string()] };
        assert!(!short.is_consistent());
    }
}
