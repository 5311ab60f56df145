//! vCloud Director REST API HTTP client with session-based authentication.
//!
//! Communicates with a vCD cell via `https://{host}/api/...`. Manages the
//! session lifecycle (login / logout) and provides the generic resource
//! fetch every entity wrapper is built on. Responses are XML and are parsed
//! into [`XmlElement`] trees.

use crate::error::{VcloudError, VcloudResult};
use crate::query::{QueryResultFormat, TypedQuery};
use crate::types::{VcloudConfig, VcloudSession};
use crate::xml::XmlElement;

use chrono::Utc;
use reqwest::{Client, Method, Response, StatusCode};
use std::time::Duration;

/// Session token header issued and consumed by the legacy vCD API.
const SESSION_TOKEN_HEADER: &str = "x-vcloud-authorization";

/// Version-qualified Accept header; 36.0 is the last release carrying the
/// legacy XML endpoints used here.
const VCLOUD_ACCEPT: &str = "application/*+xml;version=36.0";

/// Name of the provider (system administrator) organization.
const PROVIDER_ORG: &str = "System";

/// vCD REST API client.
#[derive(Debug)]
pub struct VcloudClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    session_org: Option<String>,
    config: VcloudConfig,
}

impl VcloudClient {
    /// Build a new client from config (does NOT create a session yet).
    pub fn new(config: &VcloudConfig) -> VcloudResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| VcloudError::connection(format!("Failed to build HTTP client: {e}")))?;

        let base_url = format!("https://{}:{}", config.host, config.port);

        Ok(Self {
            client,
            base_url,
            token: None,
            session_org: None,
            config: config.clone(),
        })
    }

    /// Base URL of the cell.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URI of the API, used to build query endpoints.
    pub fn api_base_uri(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Whether we have an active session.
    pub fn is_connected(&self) -> bool {
        self.token.is_some()
    }

    /// Current session token (if any).
    pub fn session_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current config.
    pub fn config(&self) -> &VcloudConfig {
        &self.config
    }

    // ── Session management ──────────────────────────────────────────

    /// Create a new API session (POST /api/sessions).
    ///
    /// Authenticates with Basic credentials in the `user@org` form and
    /// stores the `x-vcloud-authorization` token for subsequent calls.
    pub async fn login(&mut self) -> VcloudResult<VcloudSession> {
        let url = format!("{}/sessions", self.api_base_uri());
        let identity = format!("{}@{}", self.config.username, self.config.org);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&identity, Some(&self.config.password))
            .header("Accept", VCLOUD_ACCEPT)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(VcloudError::auth("Invalid credentials"));
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VcloudError::api(
                status.as_u16(),
                format!("Login failed: {body}"),
            ));
        }

        let token = resp
            .headers()
            .get(SESSION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| VcloudError::auth("Login response carried no session token"))?;

        // The Session representation names the authenticated org.
        let session = XmlElement::parse(&resp.text().await?)?;
        let org = session
            .attr("org")
            .unwrap_or(&self.config.org)
            .to_string();

        log::debug!("vCD session established for {identity}");
        self.token = Some(token);
        self.session_org = Some(org.clone());

        Ok(VcloudSession {
            host: self.config.host.clone(),
            username: self.config.username.clone(),
            org,
            connected_at: Utc::now().to_rfc3339(),
        })
    }

    /// Delete the current session (DELETE /api/session).
    pub async fn logout(&mut self) -> VcloudResult<()> {
        if let Some(ref token) = self.token {
            let url = format!("{}/session", self.api_base_uri());
            let _ = self
                .client
                .delete(&url)
                .header(SESSION_TOKEN_HEADER, token.as_str())
                .header("Accept", VCLOUD_ACCEPT)
                .send()
                .await;
        }
        self.token = None;
        self.session_org = None;
        Ok(())
    }

    // ── Authorization / URL-shape helpers ───────────────────────────

    /// Whether the session belongs to the provider ("System") org.
    pub fn is_sysadmin(&self) -> bool {
        self.session_org
            .as_deref()
            .is_some_and(|org| org.eq_ignore_ascii_case(PROVIDER_ORG))
    }

    /// Whether an href already points at the admin API view.
    pub fn is_admin(&self, href: &str) -> bool {
        is_admin_href(href)
    }

    /// Admin variant of an entity href.
    pub fn get_admin_href(&self, href: &str) -> String {
        admin_href(href)
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn require_session(&self) -> VcloudResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| VcloudError::auth("Not logged in — no active session"))
    }

    /// Authenticated GET of an entity representation.
    pub async fn get_resource(&self, href: &str) -> VcloudResult<XmlElement> {
        self.do_request(Method::GET, href).await
    }

    /// Generic authenticated call returning the parsed XML tree.
    ///
    /// `uri` is used as-is: entity hrefs are absolute resource locators.
    pub async fn do_request(&self, method: Method, uri: &str) -> VcloudResult<XmlElement> {
        let token = self.require_session()?;
        log::debug!("vCD API request: {method} {uri}");

        let resp = self
            .client
            .request(method, uri)
            .header(SESSION_TOKEN_HEADER, token)
            .header("Accept", VCLOUD_ACCEPT)
            .send()
            .await?;

        let resp = Self::check_status(resp).await?;
        XmlElement::parse(&resp.text().await?)
    }

    /// Typed server-side query scoped to this session.
    pub fn typed_query(
        &self,
        resource_type: &str,
        format: QueryResultFormat,
        equality_filter: Option<(&str, &str)>,
        qfilter: Option<String>,
    ) -> TypedQuery<'_> {
        TypedQuery::new(self, resource_type, format, equality_filter, qfilter)
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> VcloudResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        log::warn!("vCD API error {code}: {body}");

        match status {
            StatusCode::UNAUTHORIZED => {
                Err(VcloudError::auth(format!("Session expired or invalid: {body}")))
            }
            StatusCode::FORBIDDEN => Err(VcloudError::new(
                crate::error::VcloudErrorKind::AccessDenied,
                format!("Access denied: {body}"),
            )),
            StatusCode::NOT_FOUND => {
                Err(VcloudError::not_found(format!("Resource not found: {body}")))
            }
            _ => Err(VcloudError::api(code, format!("API error {code}: {body}"))),
        }
    }
}

/// Whether an href points at the admin API view.
pub fn is_admin_href(href: &str) -> bool {
    href.contains("/api/admin/")
}

/// Admin variant of a vCD href.
///
/// Idempotent across all three input shapes: an admin-extension href is
/// stripped to the plain admin path, an admin href is returned unchanged,
/// and a plain API href gets the admin segment inserted.
pub fn admin_href(href: &str) -> String {
    if href.contains("/api/admin/extension/") {
        href.replace("/api/admin/extension/", "/api/admin/")
    } else if href.contains("/api/admin/") {
        href.to_string()
    } else {
        href.replace("/api/", "/api/admin/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let config = VcloudConfig {
            host: "vcd.lab.local".to_string(),
            ..VcloudConfig::default()
        };
        let client = VcloudClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://vcd.lab.local:443");
        assert_eq!(client.api_base_uri(), "https://vcd.lab.local:443/api");
        assert!(!client.is_connected());
        assert!(!client.is_sysadmin());
    }

    #[test]
    fn admin_href_from_plain_api() {
        assert_eq!(
            admin_href("https://vcd.lab.local/api/org/a93c9db9"),
            "https://vcd.lab.local/api/admin/org/a93c9db9"
        );
    }

    #[test]
    fn admin_href_already_admin_is_unchanged() {
        let href = "https://vcd.lab.local/api/admin/org/a93c9db9";
        assert_eq!(admin_href(href), href);
    }

    #[test]
    fn admin_href_from_extension() {
        assert_eq!(
            admin_href("https://vcd.lab.local/api/admin/extension/vimServer/4"),
            "https://vcd.lab.local/api/admin/vimServer/4"
        );
    }

    #[test]
    fn admin_href_is_idempotent() {
        for href in [
            "https://vcd.lab.local/api/vdc/5ee4e252",
            "https://vcd.lab.local/api/admin/vdc/5ee4e252",
            "https://vcd.lab.local/api/admin/extension/vdc/5ee4e252",
        ] {
            let once = admin_href(href);
            assert_eq!(admin_href(&once), once);
        }
    }

    #[test]
    fn admin_detection() {
        assert!(is_admin_href("https://vcd.lab.local/api/admin/vdc/5ee4e252"));
        assert!(!is_admin_href("https://vcd.lab.local/api/vdc/5ee4e252"));
    }
}
