//! vApp entity wrapper.
//!
//! Wraps one deployable application unit. The VM listing is a read-only view
//! over the cached representation; metadata is fetched per call.

use reqwest::Method;

use crate::error::{VcloudError, VcloudResult};
use crate::vcloud::VcloudClient;
use crate::xml::XmlElement;

/// One vApp, backed by its server-side representation.
pub struct VApp<'a> {
    client: &'a VcloudClient,
    pub name: Option<String>,
    pub href: String,
    /// Cached representation supplied at construction.
    pub resource: Option<XmlElement>,
}

impl<'a> VApp<'a> {
    /// Construct from an href, a pre-fetched resource, or both.
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
                .ok_or_else(|| VcloudError::invalid_entity("vApp resource carries no href"))?,
            (None, Some(h)) => h.to_string(),
            (None, None) => {
                return Err(VcloudError::invalid_entity(
                    "vApp requires an href or a fetched resource",
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
            href,
            resource,
        })
    }

    /// Fetch the metadata associated with the vApp.
    pub async fn get_metadata(&self) -> VcloudResult<XmlElement> {
        self.client
            .do_request(Method::GET, &format!("{}/metadata", self.href))
            .await
    }

    /// The vApp's child VMs from the cached representation.
    ///
    /// Read-only view, no fetch: a vApp without a cached resource, without a
    /// `Children` element, or without `Vm` children lists nothing.
    pub fn get_all_vms(&self) -> Vec<&XmlElement> {
        self.resource
            .as_ref()
            .and_then(|r| r.child("Children"))
            .map(|children| children.children("Vm").collect())
            .unwrap_or_default()
    }
}
