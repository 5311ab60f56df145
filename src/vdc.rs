//! Org VDC entity wrapper.
//!
//! Wraps one virtual data center. Gateway and metadata operations go through
//! the admin variant of the VDC URL; resource listing is a read-only view
//! over the cached representation.

use reqwest::Method;

use crate::error::{VcloudError, VcloudResult};
use crate::types::{media_type, EntityRef, ResourceEntity};
use crate::vcloud::VcloudClient;
use crate::xml::XmlElement;

/// One org VDC, lazily backed by its server-side representation.
pub struct Vdc<'a> {
    client: &'a VcloudClient,
    pub name: Option<String>,
    pub href: String,
    /// Whether the wrapped href already points at the admin view.
    pub is_admin: bool,
    /// Admin variant of the VDC URL, used for gateway and metadata calls.
    pub admin_href: String,
    /// Cached representation; replaced wholesale on reload.
    pub resource: Option<XmlElement>,
}

impl<'a> Vdc<'a> {
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
                .ok_or_else(|| VcloudError::invalid_entity("VDC resource carries no href"))?,
            (None, Some(h)) => h.to_string(),
            (None, None) => {
                return Err(VcloudError::invalid_entity(
                    "VDC requires an href or a fetched resource",
                ))
            }
        };
        let name = resource
            .as_ref()
            .and_then(|r| r.attr("name"))
            .map(str::to_string);

        Ok(Self {
            name,
            is_admin: client.is_admin(&href),
            admin_href: client.get_admin_href(&href),
            client,
            href,
            resource,
        })
    }

    /// Reload the cached representation with a full fetch.
    pub async fn reload(&mut self) -> VcloudResult<()> {
        self.resource = Some(self.client.get_resource(&self.href).await?);
        Ok(())
    }

    /// Fetch the edge gateway with the given name (case-insensitive).
    ///
    /// The first record matching in document order is fetched in full;
    /// a name matching no record at all is a not-found error.
    pub async fn get_gateway(&self, name: &str) -> VcloudResult<XmlElement> {
        let result = self
            .client
            .do_request(Method::GET, &format!("{}/edgeGateways", self.admin_href))
            .await?;

        let record = find_gateway_record(&result, name)
            .ok_or_else(|| VcloudError::not_found(format!("edge gateway '{name}' not found")))?;
        let href = record.attr("href").ok_or_else(|| {
            VcloudError::parse(format!("gateway record '{name}' has no href"))
        })?;
        self.client.get_resource(href).await
    }

    /// List all edge gateways of the VDC as name + href pairs.
    pub async fn list_edge_gateways(&self) -> VcloudResult<Vec<EntityRef>> {
        let result = self
            .client
            .do_request(Method::GET, &format!("{}/edgeGateways", self.admin_href))
            .await?;

        Ok(result
            .children("EdgeGatewayRecord")
            .map(EntityRef::from_record)
            .collect())
    }

    /// Fetch all metadata entries of the VDC as a raw tree.
    pub async fn get_all_metadata(&self) -> VcloudResult<XmlElement> {
        self.client
            .do_request(Method::GET, &format!("{}/metadata", self.admin_href))
            .await
    }

    /// Deployed vApps listed in the cached representation.
    ///
    /// Read-only view over the cache: entities whose type marker is not the
    /// vApp media type are skipped, and a never-loaded VDC lists nothing.
    pub fn list_resources(&self) -> Vec<ResourceEntity> {
        let Some(resource) = self.resource.as_ref() else {
            return Vec::new();
        };
        let Some(entities) = resource.child("ResourceEntities") else {
            return Vec::new();
        };

        entities
            .children("ResourceEntity")
            .filter(|e| e.attr("type") == Some(media_type::VAPP))
            .map(|e| ResourceEntity {
                name: e.attr("name").unwrap_or_default().to_string(),
                media_type: e.attr("type").unwrap_or_default().to_string(),
                href: e.attr("href").unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Fetch a vApp representation by href.
    pub async fn get_vapp(&self, href: &str) -> VcloudResult<XmlElement> {
        self.client.get_resource(href).await
    }
}

/// First gateway record matching the name case-insensitively, in document
/// order.
fn find_gateway_record<'e>(result: &'e XmlElement, name: &str) -> Option<&'e XmlElement> {
    result
        .children("EdgeGatewayRecord")
        .find(|record| record.attr("name").unwrap_or_default().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VcloudConfig;

    const VDC_XML: &str = r#"<Vdc xmlns="http://www.vmware.com/vcloud/v1.5"
  name="dev-vdc" href="https://vcd.lab.local/api/vdc/5ee4e252">
  <ResourceEntities>
    <ResourceEntity type="application/vnd.vmware.vcloud.vApp+xml"
                    name="web-stack"
                    href="https://vcd.lab.local/api/vApp/vapp-7"/>
    <ResourceEntity type="application/vnd.vmware.vcloud.vAppTemplate+xml"
                    name="golden-image"
                    href="https://vcd.lab.local/api/vAppTemplate/vappTemplate-3"/>
    <ResourceEntity type="application/vnd.vmware.vcloud.vApp+xml"
                    name="db-stack"
                    href="https://vcd.lab.local/api/vApp/vapp-9"/>
  </ResourceEntities>
</Vdc>"#;

    fn test_client() -> VcloudClient {
        let config = VcloudConfig {
            host: "vcd.lab.local".to_string(),
            ..VcloudConfig::default()
        };
        VcloudClient::new(&config).unwrap()
    }

    #[test]
    fn construction_requires_identity() {
        let client = test_client();
        assert!(Vdc::new(&client, None, None).is_err());
    }

    #[test]
    fn construction_computes_admin_variant() {
        let client = test_client();
        let vdc = Vdc::new(&client, Some("https://vcd.lab.local/api/vdc/5ee4e252"), None).unwrap();
        assert!(!vdc.is_admin);
        assert_eq!(vdc.admin_href, "https://vcd.lab.local/api/admin/vdc/5ee4e252");

        let admin =
            Vdc::new(&client, Some("https://vcd.lab.local/api/admin/vdc/5ee4e252"), None).unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.admin_href, admin.href);
    }

    #[test]
    fn list_resources_filters_to_vapps() {
        let client = test_client();
        let resource = XmlElement::parse(VDC_XML).unwrap();
        let vdc = Vdc::new(&client, None, Some(resource)).unwrap();

        let resources = vdc.list_resources();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].name, "web-stack");
        assert_eq!(resources[1].name, "db-stack");
        assert!(resources
            .iter()
            .all(|r| r.media_type == media_type::VAPP));
    }

    #[test]
    fn list_resources_empty_without_cache() {
        let client = test_client();
        let vdc = Vdc::new(&client, Some("https://vcd.lab.local/api/vdc/5ee4e252"), None).unwrap();
        assert!(vdc.list_resources().is_empty());
    }

    #[test]
    fn gateway_match_is_case_insensitive() {
        let records = XmlElement::parse(
            r#"<QueryResultRecords xmlns="http://www.vmware.com/vcloud/v1.5">
  <EdgeGatewayRecord name="GW1" href="https://vcd.lab.local/api/admin/edgeGateway/21"/>
  <EdgeGatewayRecord name="backup-gw" href="https://vcd.lab.local/api/admin/edgeGateway/22"/>
</QueryResultRecords>"#,
        )
        .unwrap();

        let hit = find_gateway_record(&records, "gw1").unwrap();
        assert_eq!(hit.attr("href"), Some("https://vcd.lab.local/api/admin/edgeGateway/21"));
        assert!(find_gateway_record(&records, "BACKUP-GW").is_some());
        assert!(find_gateway_record(&records, "missing").is_none());
    }

    #[test]
    fn gateway_scan_handles_empty_record_set() {
        let records = XmlElement::parse(r#"<QueryResultRecords total="0"/>"#).unwrap();
        assert!(find_gateway_record(&records, "anything").is_none());
    }

    #[test]
    fn list_resources_empty_without_entities() {
        let client = test_client();
        let resource = XmlElement::parse(
            r#"<Vdc name="empty-vdc" href="https://vcd.lab.local/api/vdc/99"/>"#,
        )
        .unwrap();
        let vdc = Vdc::new(&client, None, Some(resource)).unwrap();
        assert!(vdc.list_resources().is_empty());
    }
}
