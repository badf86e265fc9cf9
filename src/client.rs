use std::fmt;
use std::ops::AsyncFnOnce;
use std::time::Duration;

use http::header::ETAG;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::endpoint::{
    EndpointMap, UrlTemplate, AUTH_ENDPOINT, CURRENT_UNIT_ENDPOINT, DEFAULT_CONFIG_URL,
    SIGNOUT_ENDPOINT,
};
use crate::models::auth::SignInForm;
use crate::models::unit::CurrentUnitResponse;
use crate::{EndpointArgs, LdsError, LdsResult};

/// Builder for the LDS Tools client.
///
/// This builder provides a fluent API for creating clients with validation
/// at build time. Building performs endpoint discovery, and signs in when
/// both a username and a password were supplied.
#[derive(Default)]
pub struct LdsClientBuilder {
    config_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
    default_headers: Vec<(String, String)>,
    http_client: Option<ReqwestClient>,
}

impl LdsClientBuilder {
    /// Sets the URL of the bootstrap configuration document.
    pub fn config_url(mut self, url: impl Into<String>) -> Self {
        self.config_url = Some(url.into());
        self
    }

    /// Sets the username for signing in.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password for signing in.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets whether invalid TLS certificates are accepted.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets a custom reqwest client (e.g., for testing or custom middleware).
    ///
    /// The client should keep a cookie store; the signed-in session lives in
    /// the cookies set by the sign-in endpoint.
    pub fn http_client(mut self, http_client: ReqwestClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Builds the client, discovers the endpoint map and signs in if
    /// credentials were provided.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid (bad URL or header, only one of
    ///   username/password given, blank credentials).
    /// - The configuration document cannot be fetched or parsed.
    /// - Signing in fails.
    pub async fn build(self) -> LdsResult<LdsClient> {
        let credentials = match (self.username, self.password) {
            (None, None) => None,
            (username, password) => {
                let username = username
                    .filter(|username| !username.trim().is_empty())
                    .ok_or_else(|| LdsError::ConfigurationError("Username is required".into()))?;
                let password = password
                    .filter(|password| !password.expose_secret().trim().is_empty())
                    .ok_or_else(|| LdsError::ConfigurationError("Password is required".into()))?;
                Some((username, password))
            }
        };

        let config_url = Url::parse(self.config_url.as_deref().unwrap_or(DEFAULT_CONFIG_URL))
            .map_err(|e| LdsError::ConfigurationError(format!("Invalid config URL: {e}")))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                LdsError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                LdsError::ConfigurationError(format!("Invalid value for header '{name}': {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let http_client = if let Some(custom_client) = self.http_client {
            custom_client
        } else {
            let user_agent = self
                .user_agent
                .as_deref()
                .unwrap_or(concat!("ldsorg-client/", env!("CARGO_PKG_VERSION")));

            ReqwestClient::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(30)))
                .danger_accept_invalid_certs(self.accept_invalid_certs)
                .cookie_store(true)
                .user_agent(user_agent)
                .build()
                .map_err(|e| {
                    LdsError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
                })?
        };

        let mut client = LdsClient {
            config_url,
            http_client,
            default_headers,
            endpoints: EndpointMap::default(),
            signed_in: false,
            unit: None,
        };
        client.endpoints = client.discover_endpoints().await?;

        if let Some((username, password)) = credentials {
            client.sign_in(&username, password.expose_secret()).await?;
        }

        Ok(client)
    }

    /// Builds a client, hands it to `f`, and signs out afterwards.
    ///
    /// See [`crate::session`].
    pub async fn session<F, T>(self, f: F) -> LdsResult<T>
    where
        F: AsyncFnOnce(&mut LdsClient) -> LdsResult<T>,
    {
        crate::session::session(self, f).await
    }
}

/// Client for the LDS Tools member and unit services.
///
/// One client owns one HTTP session. Operations that change the session
/// (signing in or out, resolving the unit number, dispatching requests)
/// take `&mut self`.
pub struct LdsClient {
    config_url: Url,
    http_client: ReqwestClient,
    default_headers: HeaderMap,
    endpoints: EndpointMap,
    signed_in: bool,
    unit: Option<String>,
}

impl fmt::Debug for LdsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdsClient")
            .field("config_url", &self.config_url)
            .field("endpoints", &self.endpoints.len())
            .field("signed_in", &self.signed_in)
            .field("unit", &self.unit)
            .finish()
    }
}

impl LdsClient {
    pub fn builder() -> LdsClientBuilder {
        LdsClientBuilder::default()
    }

    /// The endpoints advertised by the service, normalized.
    pub fn endpoints(&self) -> &EndpointMap {
        &self.endpoints
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    async fn discover_endpoints(&self) -> LdsResult<EndpointMap> {
        let response = self
            .http_client
            .get(self.config_url.clone())
            .headers(self.default_headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LdsError::DiscoveryFailed(format!(
                "configuration request failed with status code: {status}"
            )));
        }

        let config: Value = response.json().await.map_err(|e| {
            LdsError::DiscoveryFailed(format!("configuration document is not valid JSON: {e}"))
        })?;
        let endpoints = EndpointMap::from_config(&config)?;

        debug!("discovered {} endpoints from {}", endpoints.len(), self.config_url);
        Ok(endpoints)
    }

    /// Signs in with a member username and password.
    ///
    /// The service acknowledges valid credentials with an `ETag` header; the
    /// status code is not meaningful. Rejected credentials leave the client
    /// signed out, even if it was signed in before the attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::AuthenticationError`] when the credentials are
    /// rejected, [`LdsError::UnknownEndpoint`] when the service does not
    /// advertise a sign-in endpoint, and [`LdsError::HttpError`] for
    /// transport failures.
    pub async fn sign_in(&mut self, username: &str, password: &str) -> LdsResult<()> {
        let url = self.endpoints.require(AUTH_ENDPOINT)?;

        let response = self
            .http_client
            .post(url)
            .headers(self.default_headers.clone())
            .form(&SignInForm { username, password })
            .send()
            .await?;

        if !response.headers().contains_key(ETAG) {
            self.signed_in = false;
            self.unit = None;
            return Err(LdsError::AuthenticationError("Invalid credentials".into()));
        }

        self.signed_in = true;
        self.unit = None;
        info!("signed in");
        Ok(())
    }

    /// Signs out of the current session and forgets the cached unit number.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::NotSignedIn`] when called without a signed-in
    /// session. A failed sign-out request leaves the session signed in.
    pub async fn sign_out(&mut self) -> LdsResult<()> {
        self.ensure_signed_in("sign out")?;

        let url = self.endpoints.require(SIGNOUT_ENDPOINT)?.to_string();
        self.send_get(&url, &[]).await?;

        self.signed_in = false;
        self.unit = None;
        info!("signed out");
        Ok(())
    }

    /// Returns the unit number of the signed-in member.
    ///
    /// The first call asks the service; later calls in the same session
    /// return the cached value.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::NotSignedIn`] without a signed-in session, and an
    /// API or serialization error when the service answers unexpectedly.
    pub async fn get_unit(&mut self) -> LdsResult<String> {
        self.ensure_signed_in("resolve the current unit")?;

        if let Some(unit) = &self.unit {
            return Ok(unit.clone());
        }

        let url = self.endpoints.require(CURRENT_UNIT_ENDPOINT)?.to_string();
        let response = error_for_status(self.send_get(&url, &[]).await?).await?;
        let body = response.bytes().await?;
        let current: CurrentUnitResponse = serde_json::from_slice(&body)?;

        let unit = String::from(current.message);
        debug!("resolved current unit {unit}");
        self.unit = Some(unit.clone());
        Ok(unit)
    }

    /// Sends a GET request to a discovered endpoint.
    ///
    /// The endpoint's template is filled from `args`, with `{unit}` always
    /// bound to the signed-in member's unit (see [`LdsClient::get_unit`]).
    /// Query parameters not used by the template are sent as the URL query.
    /// The response is returned as is, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `endpoint` is not advertised by the service (no request is made).
    /// - The client is not signed in.
    /// - The template needs an argument `args` does not provide.
    /// - The request fails due to network issues.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(client: &mut ldsorg_client::LdsClient) -> ldsorg_client::LdsResult<()> {
    /// use ldsorg_client::EndpointArgs;
    ///
    /// let response = client.get("stake-units", EndpointArgs::new()).await?;
    /// println!("status: {}", response.status());
    ///
    /// let photo = client
    ///     .get("photo-url", EndpointArgs::new().arg("individual").member(123456789))
    ///     .await?;
    /// println!("photo: {}", photo.text().await?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&mut self, endpoint: &str, args: EndpointArgs) -> LdsResult<Response> {
        let template = UrlTemplate::parse(self.endpoints.require(endpoint)?)?;
        let unit = self.get_unit().await?;

        let rendered = template.render(args.positional(), &args.named_values(&unit))?;
        let query: Vec<(&str, &str)> = args
            .query_params()
            .iter()
            .filter(|(key, _)| !rendered.consumed.contains(*key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        debug!("dispatching {endpoint} to {}", rendered.url);
        self.send_get(&rendered.url, &query).await
    }

    /// Sends a GET request to a discovered endpoint and decodes the JSON
    /// body.
    ///
    /// # Errors
    ///
    /// Everything [`LdsClient::get`] reports, plus [`LdsError::ApiError`] for
    /// non-success statuses and [`LdsError::SerializationError`] when the
    /// body does not decode into `T`.
    pub async fn get_json<T>(&mut self, endpoint: &str, args: EndpointArgs) -> LdsResult<T>
    where
        T: DeserializeOwned,
    {
        let response = error_for_status(self.get(endpoint, args).await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends an authenticated GET request to an absolute URL that is not
    /// part of the endpoint map.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::NotSignedIn`] without a signed-in session and
    /// [`LdsError::UrlParseError`] when `url` is not absolute.
    pub async fn get_url(&self, url: &str) -> LdsResult<Response> {
        self.ensure_signed_in("send authenticated requests")?;
        let url = Url::parse(url)?;
        self.send_get(url.as_str(), &[]).await
    }

    fn ensure_signed_in(&self, action: &str) -> LdsResult<()> {
        if self.signed_in {
            Ok(())
        } else {
            Err(LdsError::NotSignedIn(format!("must be signed in to {action}")))
        }
    }

    async fn send_get(&self, url: &str, query: &[(&str, &str)]) -> LdsResult<Response> {
        let mut request = self.http_client.get(url).headers(self.default_headers.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        Ok(request.send().await?)
    }
}

async fn error_for_status(response: Response) -> LdsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(LdsError::ApiError {
        status: status.as_u16(),
        message,
    })
}
