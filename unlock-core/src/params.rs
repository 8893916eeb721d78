use std::collections::BTreeMap;

/// Literal fallbacks applied whenever a defaults record is missing them.
pub const DEFAULT_FORMAT: &str = "json";
pub const DEFAULT_GAZETTEER: &str = "unlock";

/// A single query parameter value.
///
/// The service accepts strings and numbers everywhere; a few parameters
/// (`name`, `country`) also accept several values at once, which travel as
/// one comma-separated string on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Whether this value yields to a configured default during a merge.
    ///
    /// The empty string, `0`, `0.0` and `false` all count as blank; a list
    /// never does, even when empty.
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::Bool(b) => !b,
            ParamValue::Int(n) => *n == 0,
            ParamValue::Float(x) => *x == 0.0,
            ParamValue::Text(s) => s.is_empty(),
            ParamValue::List(_) => false,
        }
    }

    /// Wire representation of the value. Lists join with commas.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::Float(x) => x.to_string(),
            ParamValue::Text(s) => s.clone(),
            ParamValue::List(items) => items.join(","),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        ParamValue::List(value.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Per-call request parameters.
///
/// Built fresh for every request and consumed by it; keys are kept sorted so
/// the resulting query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether `key` holds a value that survives a defaults merge.
    pub fn has_usable(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_blank())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Render all entries into query-string pairs.
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(key, value)| (key.clone(), value.render())).collect()
    }
}

/// Default parameters carried by a client instance.
///
/// `format` and `gazetteer` are always present and non-empty after
/// construction; a missing or blank value is back-filled with `json` /
/// `unlock`. Every other key rides along on each request unless the caller
/// overrides it.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    format: String,
    gazetteer: String,
    feature_type: Option<String>,
    extra: Params,
}

impl Default for Defaults {
    fn default() -> Self {
        Self::new()
    }
}

impl Defaults {
    pub fn new() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            gazetteer: DEFAULT_GAZETTEER.to_string(),
            feature_type: None,
            extra: Params::new(),
        }
    }

    /// Build a defaults record from a partial parameter map.
    ///
    /// `format`, `gazetteer` and `featureType` are lifted into their own
    /// fields; anything else is kept verbatim as an extra parameter. Absent
    /// or blank `format`/`gazetteer` values are back-filled, explicit ones
    /// are never overridden.
    pub fn from_params(partial: Params) -> Self {
        let mut partial = partial;
        let format = take_text(&mut partial, "format");
        let gazetteer = take_text(&mut partial, "gazetteer");
        let feature_type = take_text(&mut partial, "featureType");

        Self {
            format: format.unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            gazetteer: gazetteer.unwrap_or_else(|| DEFAULT_GAZETTEER.to_string()),
            feature_type,
            extra: partial,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Store the response format, lower-cased.
    ///
    /// The value is not validated against the supported set (`json`, `xml`,
    /// `kml`, `txt`); an unsupported format is forwarded to the service
    /// as-is.
    pub fn set_format(&mut self, format: &str) {
        self.format = format.to_lowercase();
    }

    pub fn gazetteer(&self) -> &str {
        &self.gazetteer
    }

    pub fn set_gazetteer(&mut self, name: impl Into<String>) {
        self.gazetteer = name.into();
    }

    pub fn feature_type(&self) -> Option<&str> {
        self.feature_type.as_deref()
    }

    pub fn set_feature_type(&mut self, feature_type: impl Into<String>) {
        self.feature_type = Some(feature_type.into());
    }

    pub fn clear_feature_type(&mut self) {
        self.feature_type = None;
    }

    /// Set an arbitrary extra parameter sent with every request.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.extra.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.extra.get(key)
    }

    pub fn extra(&self) -> &Params {
        &self.extra
    }

    /// Layer these defaults under the caller's parameters.
    ///
    /// Every default key missing from `params`, or present with a blank
    /// value, is filled in; caller-supplied values always win. Neither input
    /// record is mutated, so merging twice yields the same result.
    #[must_use]
    pub fn merge_into(&self, params: Params) -> Params {
        let mut merged = params;

        if !merged.has_usable("format") {
            merged.insert("format", self.format.as_str());
        }
        if !merged.has_usable("gazetteer") {
            merged.insert("gazetteer", self.gazetteer.as_str());
        }
        if let Some(feature_type) = &self.feature_type {
            if !merged.has_usable("featureType") {
                merged.insert("featureType", feature_type.as_str());
            }
        }
        for (key, value) in self.extra.iter() {
            if !merged.has_usable(key) {
                merged.insert(key.as_str(), value.clone());
            }
        }

        merged
    }
}

/// Remove `key` from the map, keeping it only when its rendering is
/// non-empty and non-blank.
fn take_text(params: &mut Params, key: &str) -> Option<String> {
    let value = params.remove(key)?;
    if value.is_blank() {
        return None;
    }
    Some(value.render())
}
