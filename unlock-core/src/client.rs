use crate::endpoint::{BASE_URL, Endpoint};
use crate::error::Error;
use crate::model::ApiResponse;
use crate::params::{Defaults, ParamValue, Params};
use crate::transport::{HttpTransport, RawResponse, Transport};

/// Client for the Unlock place-name gazetteer service.
///
/// Holds a defaults record layered under every request's parameters and
/// dispatches GET requests to the five fixed endpoints. Construction cannot
/// fail; mutating the defaults takes `&mut self`, so a caller cannot race a
/// setter against an in-flight request.
#[derive(Debug)]
pub struct UnlockClient {
    transport: Box<dyn Transport>,
    base_url: String,
    defaults: Defaults,
}

impl Default for UnlockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UnlockClient {
    pub fn new() -> Self {
        Self::with_defaults(Defaults::new())
    }

    pub fn with_defaults(defaults: Defaults) -> Self {
        Self {
            transport: Box::new(HttpTransport::new()),
            base_url: BASE_URL.to_string(),
            defaults,
        }
    }

    /// Point the client at a different service root, e.g. a local test
    /// server.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Swap the HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Current response format, `json` unless configured otherwise.
    pub fn response_format(&self) -> &str {
        self.defaults.format()
    }

    /// Store the response format, lower-cased and unvalidated; an
    /// unsupported value is forwarded to the service as-is.
    pub fn set_response_format(&mut self, format: &str) {
        self.defaults.set_format(format);
    }

    pub fn gazetteer(&self) -> &str {
        self.defaults.gazetteer()
    }

    pub fn set_gazetteer(&mut self, name: impl Into<String>) {
        self.defaults.set_gazetteer(name);
    }

    pub fn feature_type(&self) -> Option<&str> {
        self.defaults.feature_type()
    }

    pub fn set_feature_type(&mut self, feature_type: impl Into<String>) {
        self.defaults.set_feature_type(feature_type);
    }

    /// Replace the whole defaults record; `None` resets to the library
    /// defaults (`json` / `unlock`).
    pub fn set_defaults(&mut self, defaults: Option<Defaults>) {
        self.defaults = defaults.unwrap_or_default();
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Explicit mutation access to the defaults record.
    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    /// Layer the instance defaults under `params`. The stored defaults are
    /// not mutated.
    pub fn build_params(&self, params: Params) -> Params {
        self.defaults.merge_into(params)
    }

    /// Issue a GET against `url` with the merged parameters as the query
    /// string.
    ///
    /// A non-200 status surfaces as [`Error::Status`]. On 200, a body
    /// requested in `json` format is parsed ([`Error::Parse`] on failure);
    /// any other format is returned raw. The effective format is the merged
    /// `format` parameter: a per-call override wins over the stored default.
    pub async fn do_request(&self, url: &str, params: Params) -> Result<ApiResponse, Error> {
        let merged = self.build_params(params);
        let format = merged.get("format").map(ParamValue::render).unwrap_or_default();

        let RawResponse { status, body } = self.transport.get(url, &merged.to_query()).await?;

        if status != 200 {
            tracing::warn!(status, url, "request rejected by service");
            return Err(Error::Status { status, body: truncate_body(&body) });
        }

        if format == "json" {
            Ok(ApiResponse::Json(serde_json::from_str(&body)?))
        } else {
            Ok(ApiResponse::Raw(body))
        }
    }

    /// Search for places by name and other criteria.
    pub async fn search(&self, params: Params) -> Result<ApiResponse, Error> {
        self.request(Endpoint::Search, params).await
    }

    /// Search for one or more names at once; the names travel as a single
    /// comma-separated `name` parameter.
    pub async fn search_by_name(
        &self,
        names: &[&str],
        params: Params,
    ) -> Result<ApiResponse, Error> {
        let params = params.with("name", names);
        self.search(params).await
    }

    /// Search for names within one or more countries.
    pub async fn search_by_country_and_name(
        &self,
        names: &[&str],
        countries: &[&str],
        params: Params,
    ) -> Result<ApiResponse, Error> {
        let params = params.with("name", names).with("country", countries);
        self.search(params).await
    }

    /// Return the single closest match for the given criteria.
    pub async fn closest_match_search(&self, params: Params) -> Result<ApiResponse, Error> {
        self.request(Endpoint::ClosestMatch, params).await
    }

    /// Look up a feature by identifier. Fails with [`Error::MissingId`]
    /// before any I/O when `params` carries no usable `id`.
    pub async fn feature_lookup(&self, params: Params) -> Result<ApiResponse, Error> {
        require_id(Endpoint::FeatureLookup, &params)?;
        self.request(Endpoint::FeatureLookup, params).await
    }

    /// Look up the footprint geometry for a feature. Same `id` contract as
    /// [`UnlockClient::feature_lookup`].
    pub async fn footprint_lookup(&self, params: Params) -> Result<ApiResponse, Error> {
        require_id(Endpoint::FootprintLookup, &params)?;
        self.request(Endpoint::FootprintLookup, params).await
    }

    /// List the feature types the service knows about.
    pub async fn supported_feature_types(&self, params: Params) -> Result<ApiResponse, Error> {
        self.request(Endpoint::FeatureTypes, params).await
    }

    async fn request(&self, endpoint: Endpoint, params: Params) -> Result<ApiResponse, Error> {
        self.do_request(&endpoint.url(&self.base_url), params).await
    }
}

fn require_id(endpoint: Endpoint, params: &Params) -> Result<(), Error> {
    if params.has_usable("id") {
        return Ok(());
    }
    Err(Error::MissingId { endpoint })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Transport that answers every GET with one canned response and
    /// records each call it sees.
    #[derive(Debug)]
    struct ScriptedTransport {
        status: u16,
        body: String,
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ScriptedTransport {
        fn new(status: u16, body: &str) -> Self {
            Self { status, body: body.to_string(), calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.calls.lock().expect("lock poisoned").clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(
            &self,
            url: &str,
            query: &[(String, String)],
        ) -> Result<RawResponse, Error> {
            self.calls
                .lock()
                .expect("lock poisoned")
                .push((url.to_string(), query.to_vec()));
            Ok(RawResponse { status: self.status, body: self.body.clone() })
        }
    }

    /// Transport that fails before any response arrives.
    #[derive(Debug)]
    struct BrokenTransport;

    #[async_trait]
    impl Transport for BrokenTransport {
        async fn get(&self, _url: &str, _query: &[(String, String)]) -> Result<RawResponse, Error> {
            Err(Error::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))))
        }
    }

    fn scripted(status: u16, body: &str) -> (UnlockClient, std::sync::Arc<ScriptedTransport>) {
        let transport = std::sync::Arc::new(ScriptedTransport::new(status, body));
        let client = UnlockClient::new().transport(Box::new(SharedTransport(transport.clone())));
        (client, transport)
    }

    /// Lets a test keep a handle on the transport the client owns.
    #[derive(Debug)]
    struct SharedTransport(std::sync::Arc<ScriptedTransport>);

    #[async_trait]
    impl Transport for SharedTransport {
        async fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, Error> {
            self.0.get(url, query).await
        }
    }

    const FEATURES_BODY: &str =
        r#"{"type":"FeatureCollection","features":[{"properties":{"name":"Dublin"}}]}"#;

    #[test]
    fn new_client_defaults_to_json_and_unlock() {
        let client = UnlockClient::new();

        assert_eq!(client.response_format(), "json");
        assert_eq!(client.gazetteer(), "unlock");
        assert_eq!(client.feature_type(), None);
    }

    #[test]
    fn set_response_format_case_folds() {
        let mut client = UnlockClient::new();
        client.set_response_format("XML");

        assert_eq!(client.response_format(), "xml");
    }

    #[test]
    fn set_defaults_replaces_the_whole_record() {
        let mut client = UnlockClient::new();
        let replacement = Defaults::from_params(
            Params::new().with("gazetteer", "os").with("format", "kml").with("name", "dublin"),
        );

        client.set_defaults(Some(replacement.clone()));

        assert_eq!(client.defaults(), &replacement);
        assert_eq!(client.response_format(), "kml");
        assert_eq!(client.gazetteer(), "os");
    }

    #[test]
    fn set_defaults_none_resets() {
        let mut client = UnlockClient::new();
        client.set_gazetteer("os");
        client.set_response_format("kml");

        client.set_defaults(None);

        assert_eq!(client.response_format(), "json");
        assert_eq!(client.gazetteer(), "unlock");
    }

    #[test]
    fn build_params_layers_defaults_without_mutating_them() {
        let mut client = UnlockClient::new();
        client.defaults_mut().set("maxRows", 20);
        let before = client.defaults().clone();

        let merged = client.build_params(Params::new().with("name", "dublin"));

        assert_eq!(merged.get("format"), Some(&ParamValue::from("json")));
        assert_eq!(merged.get("gazetteer"), Some(&ParamValue::from("unlock")));
        assert_eq!(merged.get("maxRows"), Some(&ParamValue::from(20)));
        assert_eq!(merged.get("name"), Some(&ParamValue::from("dublin")));
        assert_eq!(client.defaults(), &before);
    }

    #[tokio::test]
    async fn search_parses_a_feature_collection() {
        let (client, transport) = scripted(200, FEATURES_BODY);

        let response = client
            .search(Params::new().with("name", "dublin"))
            .await
            .expect("search should succeed");

        let value = response.as_json().expect("json body expected");
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().map(Vec::len), Some(1));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (url, query) = &calls[0];
        assert_eq!(url, "http://unlock.edina.ac.uk/ws/search");
        assert!(query.contains(&("format".to_string(), "json".to_string())));
        assert!(query.contains(&("gazetteer".to_string(), "unlock".to_string())));
        assert!(query.contains(&("name".to_string(), "dublin".to_string())));
    }

    #[tokio::test]
    async fn per_call_format_overrides_the_default() {
        let (client, transport) = scripted(200, "<kml></kml>");

        let response = client
            .search(Params::new().with("name", "dublin").with("format", "kml"))
            .await
            .expect("search should succeed");

        assert_eq!(response.as_raw(), Some("<kml></kml>"));
        let (_, query) = &transport.calls()[0];
        assert!(query.contains(&("format".to_string(), "kml".to_string())));
    }

    #[tokio::test]
    async fn non_json_format_returns_the_body_unparsed() {
        let (mut client, _) = scripted(200, "Dublin\tIE");
        client.set_response_format("txt");

        let response = client
            .search(Params::new().with("name", "dublin"))
            .await
            .expect("search should succeed");

        assert_eq!(response.as_raw(), Some("Dublin\tIE"));
    }

    #[tokio::test]
    async fn malformed_json_surfaces_a_parse_error() {
        let (client, _) = scripted(200, "definitely not json");

        let err = client.search(Params::new().with("name", "dublin")).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn non_200_status_surfaces_on_every_endpoint() {
        let (client, _) = scripted(500, "boom");

        let results = [
            client.search(Params::new()).await,
            client.closest_match_search(Params::new()).await,
            client.feature_lookup(Params::new().with("id", 9656)).await,
            client.footprint_lookup(Params::new().with("id", 9656)).await,
            client.supported_feature_types(Params::new()).await,
        ];

        for result in results {
            match result {
                Err(Error::Status { status, .. }) => assert_eq!(status, 500),
                other => panic!("expected status error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn lookups_without_id_fail_before_any_request() {
        let (client, transport) = scripted(200, FEATURES_BODY);

        let err = client.footprint_lookup(Params::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingId { endpoint: Endpoint::FootprintLookup }));

        let err = client.feature_lookup(Params::new().with("id", 0)).await.unwrap_err();
        assert!(matches!(err, Error::MissingId { endpoint: Endpoint::FeatureLookup }));

        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let client = UnlockClient::new().transport(Box::new(BrokenTransport));

        let err = client.search(Params::new().with("name", "dublin")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn search_by_name_joins_names_with_commas() {
        let (client, transport) = scripted(200, FEATURES_BODY);

        client
            .search_by_name(&["dublin", "cork"], Params::new())
            .await
            .expect("search should succeed");

        let (_, query) = &transport.calls()[0];
        assert!(query.contains(&("name".to_string(), "dublin,cork".to_string())));
    }

    #[tokio::test]
    async fn search_by_country_and_name_sets_both_parameters() {
        let (client, transport) = scripted(200, FEATURES_BODY);

        client
            .search_by_country_and_name(&["dublin"], &["ireland"], Params::new())
            .await
            .expect("search should succeed");

        let (_, query) = &transport.calls()[0];
        assert!(query.contains(&("name".to_string(), "dublin".to_string())));
        assert!(query.contains(&("country".to_string(), "ireland".to_string())));
    }

    #[tokio::test]
    async fn endpoint_urls_follow_the_base_override() {
        let (client, transport) = scripted(200, FEATURES_BODY);
        let client = client.base_url("http://127.0.0.1:9999");

        client
            .closest_match_search(Params::new().with("name", "dublin"))
            .await
            .expect("search should succeed");

        let (url, _) = &transport.calls()[0];
        assert_eq!(url, "http://127.0.0.1:9999/closestMatchSearch");
    }

    #[test]
    fn truncate_body_caps_long_bodies() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);

        assert!(truncated.len() < long.len());
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
