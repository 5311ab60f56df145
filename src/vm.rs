//! VM entity wrapper.
//!
//! Wraps one virtual machine. Unlike the other entities, accessors here go
//! through a memoizing [`Vm::resource`] fetch: the first read loads the
//! representation, later reads serve the cache until an explicit reload.

use std::str::FromStr;

use reqwest::Method;

use crate::error::{VcloudError, VcloudErrorKind, VcloudResult};
use crate::types::{PowerState, VmCpus, VmNic};
use crate::vcloud::VcloudClient;
use crate::xml::XmlElement;

/// One virtual machine, lazily backed by its server-side representation.
#[derive(Debug)]
pub struct Vm<'a> {
    client: &'a VcloudClient,
    pub href: String,
    /// Cached representation; filled on first access, replaced on reload.
    pub resource: Option<XmlElement>,
}

impl<'a> Vm<'a> {
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
                .ok_or_else(|| VcloudError::invalid_entity("VM resource carries no href"))?,
            (None, Some(h)) => h.to_string(),
            (None, None) => {
                return Err(VcloudError::invalid_entity(
                    "VM requires an href or a fetched resource",
                ))
            }
        };

        Ok(Self {
            client,
            href,
            resource,
        })
    }

    /// Reload the cached representation with a full fetch.
    ///
    /// The href is re-derived from the fresh representation, so a VM that
    /// moved keeps resolving.
    pub async fn reload(&mut self) -> VcloudResult<()> {
        let resource = self.client.get_resource(&self.href).await?;
        if let Some(href) = resource.attr("href") {
            self.href = href.to_string();
        }
        self.resource = Some(resource);
        Ok(())
    }

    /// The VM's representation, fetching it first if not yet loaded.
    pub async fn resource(&mut self) -> VcloudResult<&XmlElement> {
        if self.resource.is_none() {
            self.reload().await?;
        }
        self.resource.as_ref().ok_or_else(|| {
            VcloudError::new(VcloudErrorKind::Other, "VM resource missing after reload")
        })
    }

    /// CPU topology from the VM spec section.
    pub async fn get_cpus(&mut self) -> VcloudResult<VmCpus> {
        let spec = spec_section(self.resource().await?)?;
        Ok(VmCpus {
            num_cpus: required_int(spec, "NumCpus")?,
            num_cores_per_socket: required_int(spec, "NumCoresPerSocket")?,
        })
    }

    /// Configured memory in MB.
    pub async fn get_memory(&mut self) -> VcloudResult<u64> {
        let spec = spec_section(self.resource().await?)?;
        let memory = spec
            .child("MemoryResourceMb")
            .ok_or_else(|| VcloudError::parse("MemoryResourceMb missing from VM spec section"))?;
        required_int(memory, "Configured")
    }

    /// Power state from the `status` attribute.
    ///
    /// Reads the passed representation when one is given, otherwise the
    /// (lazily fetched) cached one.
    pub async fn get_power_state(
        &mut self,
        vm_resource: Option<&XmlElement>,
    ) -> VcloudResult<PowerState> {
        let status = match vm_resource {
            Some(r) => r.attr("status"),
            None => self.resource().await?.attr("status"),
        };
        let status = status
            .ok_or_else(|| VcloudError::parse("VM representation carries no status attribute"))?;
        let code = status
            .trim()
            .parse::<i32>()
            .map_err(|_| VcloudError::parse(format!("VM status is not an integer: {status}")))?;
        Ok(PowerState::from_code(code))
    }

    /// Whether the VM is powered on.
    pub async fn is_powered_on(
        &mut self,
        vm_resource: Option<&XmlElement>,
    ) -> VcloudResult<bool> {
        Ok(self.get_power_state(vm_resource).await? == PowerState::PoweredOn)
    }

    /// Fetch the operating system section of the VM.
    pub async fn get_operating_system_section(&self) -> VcloudResult<XmlElement> {
        self.client
            .get_resource(&format!("{}/operatingSystemSection/", self.href))
            .await
    }

    /// Fetch the metadata associated with the VM.
    pub async fn get_metadata(&self) -> VcloudResult<XmlElement> {
        self.client
            .do_request(Method::GET, &format!("{}/metadata", self.href))
            .await
    }

    /// All nics of the VM, in the order the server returns them.
    ///
    /// A section without a `PrimaryNetworkConnectionIndex` marks no nic as
    /// primary. IP and MAC addresses are carried only when present.
    pub async fn list_nics(&mut self) -> VcloudResult<Vec<VmNic>> {
        let section = self
            .resource()
            .await?
            .child("NetworkConnectionSection")
            .ok_or_else(|| {
                VcloudError::parse("NetworkConnectionSection missing from VM representation")
            })?;

        let primary_index = section.child_text("PrimaryNetworkConnectionIndex");

        let mut nics = Vec::new();
        for nc in section.children("NetworkConnection") {
            let index_text = required_text(nc, "NetworkConnectionIndex")?;
            nics.push(VmNic {
                index: index_text.trim().parse::<i32>().map_err(|_| {
                    VcloudError::parse(format!(
                        "NetworkConnectionIndex is not an integer: {index_text}"
                    ))
                })?,
                connected: required_text(nc, "IsConnected")?.trim() == "true",
                // Primary is an index comparison on the raw text.
                primary: primary_index == Some(index_text),
                adapter_type: required_text(nc, "NetworkAdapterType")?.to_string(),
                network: nc.attr("network").map(str::to_string),
                ip_address_mode: required_text(nc, "IpAddressAllocationMode")?.to_string(),
                ip_address: nc.child_text("IpAddress").map(str::to_string),
                mac_address: nc.child_text("MACAddress").map(str::to_string),
            });
        }
        Ok(nics)
    }
}

fn spec_section(resource: &XmlElement) -> VcloudResult<&XmlElement> {
    resource
        .child("VmSpecSection")
        .ok_or_else(|| VcloudError::parse("VmSpecSection missing from VM representation"))
}

fn required_text<'e>(element: &'e XmlElement, name: &str) -> VcloudResult<&'e str> {
    element
        .child_text(name)
        .ok_or_else(|| VcloudError::parse(format!("{name} missing from VM representation")))
}

fn required_int<T: FromStr>(element: &XmlElement, name: &str) -> VcloudResult<T> {
    let text = required_text(element, name)?;
    text.trim()
        .parse()
        .map_err(|_| VcloudError::parse(format!("{name} is not an integer: {text}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VcloudConfig;

    const VM_XML: &str = r#"<Vm xmlns="http://www.vmware.com/vcloud/v1.5"
    xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1"
    status="4" name="web-01" href="https://vcd.lab.local/api/vApp/vm-41">
  <VmSpecSection Modified="false">
    <ovf:Info>Virtual hardware requirements</ovf:Info>
    <NumCpus>4</NumCpus>
    <NumCoresPerSocket>2</NumCoresPerSocket>
    <MemoryResourceMb>
      <Configured>8192</Configured>
    </MemoryResourceMb>
  </VmSpecSection>
  <NetworkConnectionSection>
    <ovf:Info>Network connections</ovf:Info>
    <PrimaryNetworkConnectionIndex>1</PrimaryNetworkConnectionIndex>
    <NetworkConnection network="org-net" needsCustomization="false">
      <NetworkConnectionIndex>0</NetworkConnectionIndex>
      <IpAddress>10.20.0.11</IpAddress>
      <IsConnected>true</IsConnected>
      <MACAddress>00:50:56:01:00:0b</MACAddress>
      <IpAddressAllocationMode>POOL</IpAddressAllocationMode>
      <NetworkAdapterType>VMXNET3</NetworkAdapterType>
    </NetworkConnection>
    <NetworkConnection network="mgmt-net">
      <NetworkConnectionIndex>1</NetworkConnectionIndex>
      <IsConnected>false</IsConnected>
      <IpAddressAllocationMode>DHCP</IpAddressAllocationMode>
      <NetworkAdapterType>E1000</NetworkAdapterType>
    </NetworkConnection>
  </NetworkConnectionSection>
</Vm>"#;

    fn test_client() -> VcloudClient {
        let config = VcloudConfig {
            host: "vcd.lab.local".to_string(),
            ..VcloudConfig::default()
        };
        VcloudClient::new(&config).unwrap()
    }

    fn cached_vm(client: &VcloudClient) -> Vm<'_> {
        let resource = XmlElement::parse(VM_XML).unwrap();
        Vm::new(client, None, Some(resource)).unwrap()
    }

    #[test]
    fn construction_requires_identity() {
        let client = test_client();
        let err = Vm::new(&client, None, None).unwrap_err();
        assert!(matches!(err.kind, VcloudErrorKind::InvalidEntity));
    }

    #[test]
    fn construction_from_resource_derives_href() {
        let client = test_client();
        let vm = cached_vm(&client);
        assert_eq!(vm.href, "https://vcd.lab.local/api/vApp/vm-41");
    }

    #[tokio::test]
    async fn cpus_from_spec_section() {
        let client = test_client();
        let mut vm = cached_vm(&client);
        let cpus = vm.get_cpus().await.unwrap();
        assert_eq!(cpus.num_cpus, 4);
        assert_eq!(cpus.num_cores_per_socket, 2);
    }

    #[tokio::test]
    async fn memory_from_spec_section() {
        let client = test_client();
        let mut vm = cached_vm(&client);
        assert_eq!(vm.get_memory().await.unwrap(), 8192);
    }

    #[tokio::test]
    async fn powered_on_from_cached_resource() {
        let client = test_client();
        let mut vm = cached_vm(&client);
        assert_eq!(
            vm.get_power_state(None).await.unwrap(),
            PowerState::PoweredOn
        );
        assert!(vm.is_powered_on(None).await.unwrap());
    }

    #[tokio::test]
    async fn powered_on_from_passed_resource() {
        let client = test_client();
        let mut vm = cached_vm(&client);

        let off =
            XmlElement::parse(r#"<Vm status="8" href="https://vcd.lab.local/api/vApp/vm-9"/>"#)
                .unwrap();
        assert_eq!(
            vm.get_power_state(Some(&off)).await.unwrap(),
            PowerState::PoweredOff
        );
        assert!(!vm.is_powered_on(Some(&off)).await.unwrap());

        // Every non-4 code is "not powered on".
        for code in [-1, 0, 1, 2, 3, 5, 6, 7, 9, 10] {
            let other = XmlElement::parse(&format!(
                r#"<Vm status="{code}" href="https://vcd.lab.local/api/vApp/vm-9"/>"#
            ))
            .unwrap();
            assert!(!vm.is_powered_on(Some(&other)).await.unwrap());
        }
    }

    #[tokio::test]
    async fn nics_mark_only_the_primary_index() {
        let client = test_client();
        let mut vm = cached_vm(&client);
        let nics = vm.list_nics().await.unwrap();

        assert_eq!(nics.len(), 2);
        assert_eq!(nics[0].index, 0);
        assert!(!nics[0].primary);
        assert!(nics[0].connected);
        assert_eq!(nics[0].adapter_type, "VMXNET3");
        assert_eq!(nics[0].network.as_deref(), Some("org-net"));
        assert_eq!(nics[0].ip_address_mode, "POOL");
        assert_eq!(nics[0].ip_address.as_deref(), Some("10.20.0.11"));
        assert_eq!(nics[0].mac_address.as_deref(), Some("00:50:56:01:00:0b"));

        assert_eq!(nics[1].index, 1);
        assert!(nics[1].primary);
        assert!(!nics[1].connected);
        assert_eq!(nics[1].adapter_type, "E1000");
        assert!(nics[1].ip_address.is_none());
        assert!(nics[1].mac_address.is_none());
    }

    #[tokio::test]
    async fn nics_without_primary_index_mark_none() {
        let client = test_client();
        let resource = XmlElement::parse(
            r#"<Vm status="4" href="https://vcd.lab.local/api/vApp/vm-50">
  <NetworkConnectionSection>
    <NetworkConnection network="org-net">
      <NetworkConnectionIndex>0</NetworkConnectionIndex>
      <IsConnected>true</IsConnected>
      <IpAddressAllocationMode>DHCP</IpAddressAllocationMode>
      <NetworkAdapterType>VMXNET3</NetworkAdapterType>
    </NetworkConnection>
  </NetworkConnectionSection>
</Vm>"#,
        )
        .unwrap();
        let mut vm = Vm::new(&client, None, Some(resource)).unwrap();

        let nics = vm.list_nics().await.unwrap();
        assert_eq!(nics.len(), 1);
        assert!(!nics[0].primary);
    }

    #[tokio::test]
    async fn nics_empty_section_lists_nothing() {
        let client = test_client();
        let resource = XmlElement::parse(
            r#"<Vm status="4" href="https://vcd.lab.local/api/vApp/vm-51">
  <NetworkConnectionSection/>
</Vm>"#,
        )
        .unwrap();
        let mut vm = Vm::new(&client, None, Some(resource)).unwrap();
        assert!(vm.list_nics().await.unwrap().is_empty());
    }
}
