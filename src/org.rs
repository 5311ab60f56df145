//! Organization entity wrapper.
//!
//! Wraps one vCD organization identified by href. The XML representation is
//! fetched lazily and cached until [`Org::reload`]; listing operations issue
//! one request each and translate result records into plain references.

use reqwest::Method;
use url::Url;

use crate::error::{VcloudError, VcloudResult};
use crate::query::{query_encode, QueryResultFormat};
use crate::types::EntityRef;
use crate::vcloud::{admin_href, VcloudClient};
use crate::xml::XmlElement;

/// One organization, lazily backed by its server-side representation.
#[derive(Debug)]
pub struct Org<'a> {
    client: &'a VcloudClient,
    pub name: Option<String>,
    pub href: String,
    /// Admin variant of the org URL, for elevated-scope operations.
    pub admin_href: String,
    /// Cached representation; replaced wholesale on reload.
    pub resource: Option<XmlElement>,
}

impl<'a> Org<'a> {
    /// Construct from an href, a pre-fetched resource, or both.
    ///
    /// When a resource is supplied its `href` attribute wins; with neither
    /// an href nor a resource there is no identity to wrap and construction
    /// fails.
    pub fn new(
        client: &'a VcloudClient,
        href: Option<&str>,
        resource: Option<XmlElement>,
    ) -> VcloudResult<Self> {
        let href = match (&resource, href) {
            (Some(r), fallback) => r
                .attr("href")
                .or(fallback)
                .map(str::to_string)
                .ok_or_else(|| {
                    VcloudError::invalid_entity("organization resource carries no href")
                })?,
            (None, Some(h)) => h.to_string(),
            (None, None) => {
                return Err(VcloudError::invalid_entity(
                    "organization requires an href or a fetched resource",
                ))
            }
        };
        let name = resource
            .as_ref()
            .and_then(|r| r.attr("name"))
            .map(str::to_string);

        Ok(Self {
            client,
            name,
            admin_href: admin_href(&href),
            href,
            resource,
        })
    }

    /// Reload the cached representation with a full fetch.
    pub async fn reload(&mut self) -> VcloudResult<()> {
        self.resource = Some(self.client.get_resource(&self.href).await?);
        Ok(())
    }

    /// List the org's virtual data centers as name + href pairs.
    ///
    /// Empty when the org has none.
    pub async fn list_vdcs(&self) -> VcloudResult<Vec<EntityRef>> {
        let org_id = org_id(&self.href).ok_or_else(|| {
            VcloudError::parse(format!("org href has no identifier segment: {}", self.href))
        })?;
        let uri = format!(
            "{}/query?type=adminOrgVdc&filter=org%3D%3D{}",
            self.client.api_base_uri(),
            org_id
        );
        let result = self.client.do_request(Method::GET, &uri).await?;

        Ok(result
            .children("AdminVdcRecord")
            .map(EntityRef::from_record)
            .collect())
    }

    /// Fetch a VDC representation by href.
    pub async fn get_vdc(&self, href: &str) -> VcloudResult<XmlElement> {
        self.client.get_resource(href).await
    }

    /// List the users of this organization as raw query result records.
    ///
    /// A sysadmin session is scoped to this org via an `org==` filter;
    /// tenant sessions query unscoped (the server scopes them already).
    /// `name_filter` is an optional `("name", value)` equality filter.
    pub async fn list_users(
        &mut self,
        name_filter: Option<(&str, &str)>,
    ) -> VcloudResult<Vec<XmlElement>> {
        if self.resource.is_none() {
            self.reload().await?;
        }

        let org_filter = if self.client.is_sysadmin() {
            self.resource
                .as_ref()
                .and_then(|r| r.attr("href"))
                .map(|href| format!("org=={}", query_encode(href)))
        } else {
            None
        };

        self.client
            .typed_query("user", QueryResultFormat::Records, name_filter, org_filter)
            .execute()
            .await
    }
}

/// Trailing path segment of an org href — the org identifier.
fn org_id(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
