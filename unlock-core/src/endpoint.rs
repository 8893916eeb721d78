use std::convert::TryFrom;

/// Root of the Unlock web service.
pub const BASE_URL: &str = "http://unlock.edina.ac.uk/ws";

/// The five fixed service endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    ClosestMatch,
    FeatureLookup,
    FeatureTypes,
    FootprintLookup,
}

impl Endpoint {
    /// Path segment appended to the service root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::ClosestMatch => "closestMatchSearch",
            Endpoint::FeatureLookup => "featureLookup",
            Endpoint::FeatureTypes => "supportedFeatureTypes",
            Endpoint::FootprintLookup => "footprintLookup",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Search,
            Endpoint::ClosestMatch,
            Endpoint::FeatureLookup,
            Endpoint::FeatureTypes,
            Endpoint::FootprintLookup,
        ]
    }

    /// Full request URL against a service root.
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.as_str())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Endpoint {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Endpoint::all()
            .iter()
            .copied()
            .find(|endpoint| endpoint.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown endpoint '{value}'. Supported endpoints: search, \
                     closestMatchSearch, featureLookup, supportedFeatureTypes, footprintLookup."
                )
            })
    }
}
