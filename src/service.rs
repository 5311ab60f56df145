//! Aggregate service façade for the vCloud Director crate.
//!
//! `VcloudService` owns the `VcloudClient` and exposes entity accessors and
//! the most common operations without the caller wiring entities manually.
//! One service wraps one session.

use crate::error::{VcloudError, VcloudResult};
use crate::org::Org;
use crate::types::{EntityRef, PowerState, VcloudConfig, VcloudSession, VmCpus, VmNic};
use crate::vapp::VApp;
use crate::vcloud::VcloudClient;
use crate::vdc::Vdc;
use crate::vm::Vm;
use crate::xml::XmlElement;

/// Top-level service that aggregates the vCD entity wrappers.
pub struct VcloudService {
    client: Option<VcloudClient>,
    config: Option<VcloudConfig>,
}

impl VcloudService {
    /// Create a new (disconnected) service.
    pub fn new() -> Self {
        Self {
            client: None,
            config: None,
        }
    }

    /// Whether we have an active vCD session.
    pub fn is_connected(&self) -> bool {
        self.client
            .as_ref()
            .map(|c| c.is_connected())
            .unwrap_or(false)
    }

    fn require_client(&self) -> VcloudResult<&VcloudClient> {
        self.client
            .as_ref()
            .filter(|c| c.is_connected())
            .ok_or_else(|| {
                VcloudError::connection("Not connected to vCloud Director. Call connect first.")
            })
    }

    // ── Connection ──────────────────────────────────────────────────

    /// Connect to a vCD cell.
    pub async fn connect(&mut self, config: VcloudConfig) -> VcloudResult<VcloudSession> {
        let mut client = VcloudClient::new(&config)?;
        let session = client.login().await?;
        self.config = Some(config);
        self.client = Some(client);
        Ok(session)
    }

    /// Disconnect from vCD.
    pub async fn disconnect(&mut self) -> VcloudResult<()> {
        if let Some(ref mut client) = self.client {
            let _ = client.logout().await;
        }
        self.client = None;
        self.config = None;
        Ok(())
    }

    /// Get current config (without password).
    pub fn get_config(&self) -> Option<VcloudConfigSafe> {
        self.config.as_ref().map(|c| VcloudConfigSafe {
            host: c.host.clone(),
            port: c.port,
            username: c.username.clone(),
            org: c.org.clone(),
            insecure: c.insecure,
        })
    }

    // ── Entity accessors ────────────────────────────────────────────

    /// Organization wrapper for an href.
    pub fn org(&self, href: &str) -> VcloudResult<Org<'_>> {
        Org::new(self.require_client()?, Some(href), None)
    }

    /// VDC wrapper for an href.
    pub fn vdc(&self, href: &str) -> VcloudResult<Vdc<'_>> {
        Vdc::new(self.require_client()?, Some(href), None)
    }

    /// vApp wrapper for an href.
    pub fn vapp(&self, href: &str) -> VcloudResult<VApp<'_>> {
        VApp::new(self.require_client()?, Some(href), None)
    }

    /// VM wrapper for an href.
    pub fn vm(&self, href: &str) -> VcloudResult<Vm<'_>> {
        Vm::new(self.require_client()?, Some(href), None)
    }

    // ── Org operations ──────────────────────────────────────────────

    pub async fn list_vdcs(&self, org_href: &str) -> VcloudResult<Vec<EntityRef>> {
        self.org(org_href)?.list_vdcs().await
    }

    pub async fn list_users(
        &self,
        org_href: &str,
        name_filter: Option<(&str, &str)>,
    ) -> VcloudResult<Vec<XmlElement>> {
        self.org(org_href)?.list_users(name_filter).await
    }

    // ── VDC operations ──────────────────────────────────────────────

    pub async fn list_edge_gateways(&self, vdc_href: &str) -> VcloudResult<Vec<EntityRef>> {
        self.vdc(vdc_href)?.list_edge_gateways().await
    }

    pub async fn get_gateway(&self, vdc_href: &str, name: &str) -> VcloudResult<XmlElement> {
        self.vdc(vdc_href)?.get_gateway(name).await
    }

    pub async fn get_vdc_metadata(&self, vdc_href: &str) -> VcloudResult<XmlElement> {
        self.vdc(vdc_href)?.get_all_metadata().await
    }

    // ── VM operations ───────────────────────────────────────────────

    pub async fn get_vm_cpus(&self, vm_href: &str) -> VcloudResult<VmCpus> {
        self.vm(vm_href)?.get_cpus().await
    }

    pub async fn get_vm_memory(&self, vm_href: &str) -> VcloudResult<u64> {
        self.vm(vm_href)?.get_memory().await
    }

    pub async fn get_vm_power_state(&self, vm_href: &str) -> VcloudResult<PowerState> {
        self.vm(vm_href)?.get_power_state(None).await
    }

    pub async fn is_vm_powered_on(&self, vm_href: &str) -> VcloudResult<bool> {
        self.vm(vm_href)?.is_powered_on(None).await
    }

    pub async fn list_vm_nics(&self, vm_href: &str) -> VcloudResult<Vec<VmNic>> {
        self.vm(vm_href)?.list_nics().await
    }
}

impl Default for VcloudService {
    fn default() -> Self {
        Self::new()
    }
}

/// Config without the password, safe to surface in UIs and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcloudConfigSafe {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub org: String,
    pub insecure: bool,
}
