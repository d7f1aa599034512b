use crate::core::errors::{Error, Result};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::time;

/*-------------------------------------------------------------------------------------------------
  InfoBlox Gateway
-------------------------------------------------------------------------------------------------*/

/// Abstract creation capability consumed by the reconciliation executor.
///
/// Failures are signaled as descriptive message strings; the gateway implementation is
/// responsible for folding whatever transport-level error occurred into a message containing the
/// relevant classification keywords (overlap, permission, invalid, ...) where applicable.
pub trait InfobloxGateway {
    /// Create a leaf network; returns the WAPI object reference.
    fn create_network(
        &mut self,
        cidr: &str,
        network_view: &str,
        comment: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String>;

    /// Create a network container; returns the WAPI object reference.
    fn create_network_container(
        &mut self,
        cidr: &str,
        network_view: &str,
        comment: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String>;
}

/*-------------------------------------------------------------------------------------------------
  WAPI Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [WapiClient] struct that allows you to customize the client configuration.
///
/// ```no_run
/// let client = ibxsync::WapiClientBuilder::new()
///     .grid_master("infoblox.example.com")
///     .wapi_version("v2.13.1")
///     .username("admin")
///     .password("infoblox")
///     .timeout(30) // 30 seconds
///     .build();
/// ```
///
/// The [WapiClientBuilder::new] method attempts to source configuration values from environment
/// variables when set and uses default values when the environment variables are not set.
///
/// If you want to use the default configuration values, ignoring any environment variables, use
/// the [WapiClientBuilder::default] method to create a new [WapiClientBuilder] instance.
#[derive(Debug, Clone)]
pub struct WapiClientBuilder {
    grid_master: String,
    wapi_version: String,
    username: String,
    password: String,
    timeout: u64,
    accept_invalid_certs: bool,
}

impl Default for WapiClientBuilder {
    fn default() -> Self {
        Self {
            grid_master: String::new(),
            wapi_version: "v2.13.1".to_string(),
            username: String::new(),
            password: String::new(),
            timeout: 30, // 30 seconds
            accept_invalid_certs: false,
        }
    }
}

impl WapiClientBuilder {
    /// Create a new [WapiClientBuilder] reading initial configuration values from environment
    /// variables when set and default values when the environment variables are not set.
    ///
    /// The environment variables used to set the initial configuration values are:
    /// - `IBXSYNC_GRID_MASTER`
    /// - `IBXSYNC_WAPI_VERSION`
    /// - `IBXSYNC_USERNAME`
    /// - `IBXSYNC_PASSWORD`
    /// - `IBXSYNC_TIMEOUT`
    /// - `IBXSYNC_ACCEPT_INVALID_CERTS`
    pub fn new() -> Self {
        let default = WapiClientBuilder::default();

        Self {
            grid_master: get_env_var("IBXSYNC_GRID_MASTER", default.grid_master),
            wapi_version: get_env_var("IBXSYNC_WAPI_VERSION", default.wapi_version),
            username: get_env_var("IBXSYNC_USERNAME", default.username),
            password: get_env_var("IBXSYNC_PASSWORD", default.password),
            timeout: get_env_var("IBXSYNC_TIMEOUT", default.timeout),
            accept_invalid_certs: get_env_var(
                "IBXSYNC_ACCEPT_INVALID_CERTS",
                default.accept_invalid_certs,
            ),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the InfoBlox Grid Master hostname or IP address.
    pub fn grid_master(&mut self, grid_master: &str) -> &mut Self {
        self.grid_master = grid_master.to_string();
        self
    }

    /// Set the WAPI version path segment; defaults to `v2.13.1`.
    pub fn wapi_version(&mut self, wapi_version: &str) -> &mut Self {
        self.wapi_version = wapi_version.to_string();
        self
    }

    /// Set the WAPI username.
    pub fn username(&mut self, username: &str) -> &mut Self {
        self.username = username.to_string();
        self
    }

    /// Set the WAPI password.
    pub fn password(&mut self, password: &str) -> &mut Self {
        self.password = password.to_string();
        self
    }

    /// Set the request timeout (in seconds); defaults to `30` seconds.
    pub fn timeout(&mut self, timeout: u64) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates; defaults to `false`. Grid Masters commonly run with
    /// self-signed certificates, so operators may need to opt in.
    pub fn accept_invalid_certs(&mut self, accept_invalid_certs: bool) -> &mut Self {
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Result<WapiClient> {
        if self.grid_master.is_empty() {
            return Err("InfoBlox Grid Master is required (IBXSYNC_GRID_MASTER)".into());
        }
        if self.username.is_empty() {
            return Err("InfoBlox username is required (IBXSYNC_USERNAME)".into());
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(time::Duration::from_secs(self.timeout))
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;

        Ok(WapiClient {
            base_url: format!("https://{}/wapi/{}", self.grid_master, self.wapi_version),
            username: self.username.clone(),
            password: self.password.clone(),
            http,
            ea_cache: EaDefinitionCache::new(),
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  WAPI Client
-------------------------------------------------------------------------------------------------*/

/// Blocking client for the InfoBlox WAPI REST interface.
///
/// The [WapiClient::new] method attempts to source configuration values from environment
/// variables when set and uses default values when the environment variables are not set.
#[derive(Debug)]
pub struct WapiClient {
    base_url: String,
    username: String,
    password: String,
    http: reqwest::blocking::Client,
    ea_cache: EaDefinitionCache,
}

/// An existing InfoBlox object found for a CIDR: either a leaf network or a network container.
#[derive(Clone, Debug)]
pub enum Existing {
    Network(Value),
    Container(Value),
}

impl WapiClient {
    pub fn new() -> Result<Self> {
        WapiClientBuilder::new().build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /*-------------------------------------------------------------------------
      Lookups
    -------------------------------------------------------------------------*/

    /// Get a network object by CIDR, or `None` if it does not exist in the view.
    pub fn get_network(&self, cidr: &str, network_view: &str) -> Result<Option<Value>> {
        self.get_object("network", cidr, network_view)
    }

    /// Get a network container object by CIDR, or `None` if it does not exist in the view.
    pub fn get_network_container(&self, cidr: &str, network_view: &str) -> Result<Option<Value>> {
        self.get_object("networkcontainer", cidr, network_view)
    }

    /// Check whether a CIDR already exists in the view as either a network or a container.
    pub fn check_network_or_container_exists(
        &self,
        cidr: &str,
        network_view: &str,
    ) -> Result<Option<Existing>> {
        if let Some(network) = self.get_network(cidr, network_view)? {
            return Ok(Some(Existing::Network(network)));
        }
        if let Some(container) = self.get_network_container(cidr, network_view)? {
            return Ok(Some(Existing::Container(container)));
        }
        Ok(None)
    }

    /*-------------------------------------------------------------------------
      Extensible Attribute Definitions
    -------------------------------------------------------------------------*/

    /// The set of extensible attribute definition names known to the grid. Cached after the
    /// first lookup; the cache is invalidated when a definition is created.
    pub fn ea_definition_names(&mut self) -> Result<BTreeSet<String>> {
        if let Some(names) = self.ea_cache.get() {
            return Ok(names.clone());
        }

        let response = self
            .http
            .get(format!("{}/extensibleattributedef", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("_return_fields", "name")])
            .send()?;
        let definitions: Vec<Value> = Self::read_json(response)?;

        let names: BTreeSet<String> = definitions
            .iter()
            .filter_map(|definition| definition.get("name"))
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        debug!("Cached {} extensible attribute definitions", names.len());
        self.ea_cache.set(names.clone());
        Ok(names)
    }

    /// Create a STRING-typed extensible attribute definition; returns the object reference.
    pub fn create_ea_definition(&mut self, name: &str) -> Result<String> {
        let body = json!({ "name": name, "type": "STRING" });
        let reference = self.post("extensibleattributedef", &body)?;
        info!("Created extensible attribute definition: {name}");
        self.ea_cache.invalidate();
        Ok(reference)
    }

    /// Create any missing extensible attribute definitions for the given names; returns the
    /// number created.
    pub fn ensure_ea_definitions<'a, I>(&mut self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known = self.ea_definition_names()?;

        let mut created = 0;
        for name in names {
            if !known.contains(name) {
                self.create_ea_definition(name)?;
                created += 1;
            }
        }
        Ok(created)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    fn get_object(&self, endpoint: &str, cidr: &str, network_view: &str) -> Result<Option<Value>> {
        let response = self
            .http
            .get(format!("{}/{endpoint}", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("network", cidr),
                ("network_view", network_view),
                ("_return_fields", "network,comment,extattrs"),
            ])
            .send()?;

        // The WAPI answers 400/404 for lookups of objects that do not exist.
        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            debug!("{endpoint} {cidr} not found in view {network_view} (HTTP {status})");
            return Ok(None);
        }

        let objects: Vec<Value> = Self::read_json(response)?;
        Ok(objects.into_iter().next())
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<String> {
        debug!("POST {endpoint}: {body}");

        let response = self
            .http
            .post(format!("{}/{endpoint}", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()?;

        let reference: Value = Self::read_json(response)?;
        match reference {
            Value::String(reference) => Ok(reference),
            other => Ok(other.to_string()),
        }
    }

    /// Read a JSON response body, folding WAPI error payloads (`text` / `Error` fields) into a
    /// descriptive failure message.
    fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T> {
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let details = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|payload| {
                    payload
                        .get("text")
                        .or_else(|| payload.get("Error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(Error::from(format!(
                "InfoBlox API request failed: HTTP {status} - {details}"
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl InfobloxGateway for WapiClient {
    fn create_network(
        &mut self,
        cidr: &str,
        network_view: &str,
        comment: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        let body = creation_body(cidr, network_view, comment, attributes);
        let reference = self.post("network", &body)?;
        debug!("Created network {cidr} in view {network_view}");
        Ok(reference)
    }

    fn create_network_container(
        &mut self,
        cidr: &str,
        network_view: &str,
        comment: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        let body = creation_body(cidr, network_view, comment, attributes);
        let reference = self.post("networkcontainer", &body)?;
        debug!("Created network container {cidr} in view {network_view}");
        Ok(reference)
    }
}

/*-------------------------------------------------------------------------------------------------
  EA Definition Cache
-------------------------------------------------------------------------------------------------*/

/// Explicit cache of the grid's extensible attribute definition names, owned by the client and
/// invalidated whenever a definition is written. Owning the cache on the client (rather than a
/// hidden module-level global) keeps concurrent batches and tests isolated.
#[derive(Debug, Default)]
pub struct EaDefinitionCache {
    names: Option<BTreeSet<String>>,
}

impl EaDefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&BTreeSet<String>> {
        self.names.as_ref()
    }

    pub fn set(&mut self, names: BTreeSet<String>) {
        self.names = Some(names);
    }

    pub fn invalidate(&mut self) {
        self.names = None;
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/// Build a WAPI creation request body. Attributes with empty values are dropped; the WAPI
/// rejects empty extensible attribute values.
pub(crate) fn creation_body(
    cidr: &str,
    network_view: &str,
    comment: &str,
    attributes: &BTreeMap<String, String>,
) -> Value {
    let mut body = json!({
        "network": cidr,
        "network_view": network_view,
    });

    if !comment.is_empty() {
        body["comment"] = json!(comment);
    }

    let extattrs: serde_json::Map<String, Value> = attributes
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| (name.clone(), json!({ "value": value })))
        .collect();
    if !extattrs.is_empty() {
        body["extattrs"] = Value::Object(extattrs);
    }

    body
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    /*----------------------------------------------------------------------------------
      Builder Configuration
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_builder_defaults() {
        let builder = WapiClientBuilder::default();
        assert_eq!(builder.wapi_version, "v2.13.1");
        assert_eq!(builder.timeout, 30);
        assert!(!builder.accept_invalid_certs);
    }

    #[test]
    fn test_builder_setters() {
        let mut builder = WapiClientBuilder::default();
        builder
            .grid_master("infoblox.example.com")
            .wapi_version("v2.12")
            .username("admin")
            .password("infoblox")
            .timeout(5)
            .accept_invalid_certs(true);

        let client = builder.build().unwrap();
        assert_eq!(client.base_url(), "https://infoblox.example.com/wapi/v2.12");
    }

    #[test]
    fn test_builder_requires_grid_master_and_username() {
        let missing_grid_master = WapiClientBuilder::default()
            .username("admin")
            .password("infoblox")
            .build();
        assert!(missing_grid_master.is_err());

        let missing_username = WapiClientBuilder::default()
            .grid_master("infoblox.example.com")
            .build();
        assert!(missing_username.is_err());
    }

    /*----------------------------------------------------------------------------------
      Creation Request Body
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_creation_body_shape() {
        let attributes: BTreeMap<String, String> = [
            ("aws_name".to_string(), "prod-vpc".to_string()),
            ("environment".to_string(), "production".to_string()),
        ]
        .into_iter()
        .collect();

        let body = creation_body("10.0.0.0/16", "default", "AWS VPC: vpc-1", &attributes);
        assert_eq!(body["network"], "10.0.0.0/16");
        assert_eq!(body["network_view"], "default");
        assert_eq!(body["comment"], "AWS VPC: vpc-1");
        assert_eq!(body["extattrs"]["aws_name"]["value"], "prod-vpc");
        assert_eq!(body["extattrs"]["environment"]["value"], "production");
    }

    /// Empty attribute values are dropped; a fully-empty attribute map omits `extattrs`.
    #[test]
    fn test_creation_body_drops_empty_values() {
        let attributes: BTreeMap<String, String> = [
            ("aws_name".to_string(), "prod-vpc".to_string()),
            ("owner".to_string(), "  ".to_string()),
        ]
        .into_iter()
        .collect();

        let body = creation_body("10.0.0.0/16", "default", "", &attributes);
        assert!(body.get("comment").is_none());
        assert!(body["extattrs"].get("owner").is_none());
        assert_eq!(body["extattrs"]["aws_name"]["value"], "prod-vpc");

        let body = creation_body("10.0.0.0/16", "default", "", &BTreeMap::new());
        assert!(body.get("extattrs").is_none());
    }

    /*----------------------------------------------------------------------------------
      EA Definition Cache
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_ea_definition_cache() {
        let mut cache = EaDefinitionCache::new();
        assert!(cache.get().is_none());

        cache.set(["site_id".to_string()].into_iter().collect());
        assert!(cache.get().unwrap().contains("site_id"));

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
