//! # SortOfRemote NG – VMware vCloud Director Management
//!
//! vCloud Director tenant and provider management via the vCD REST/XML API:
//! organizations, org VDCs, vApps, VMs, edge gateways, and metadata. Each
//! entity wraps one remote resource identified by an href and lazily
//! fetches/caches its XML representation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  VcloudService  (service.rs)                     │
//! │  ├── session lifecycle (connect / disconnect)    │
//! │  └── entity accessors:                           │
//! │       Org · Vdc · VApp · Vm                      │
//! ├──────────────────────────────────────────────────┤
//! │  Entity wrappers  (org.rs, vdc.rs, vapp.rs,      │
//! │  vm.rs)                                          │
//! │  ├── href identity + cached XML representation   │
//! │  └── one request per operation, no paging        │
//! ├──────────────────────────────────────────────────┤
//! │  VcloudClient  (vcloud.rs)  +  TypedQuery        │
//! │  ├── session token auth (x-vcloud-authorization) │
//! │  ├── get_resource / do_request                   │
//! │  └── admin-href + sysadmin helpers               │
//! ├──────────────────────────────────────────────────┤
//! │  XmlElement  (xml.rs)                            │
//! │  └── quick-xml event reader → element tree       │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - **types** — Shared data structures (config, power states, records)
//! - **error** — Crate-specific error types
//! - **xml** — Generic XML element tree for entity representations
//! - **vcloud** — vCD REST API HTTP client with session-based auth
//! - **query** — Typed server-side queries against the query service
//! - **org** — Organization entity (VDC and user listing)
//! - **vdc** — Org VDC entity (gateways, metadata, deployed vApps)
//! - **vapp** — vApp entity (metadata, child VMs)
//! - **vm** — VM entity (spec, power state, OS section, nics)
//! - **service** — Aggregate facade owning the client

pub mod error;
pub mod org;
pub mod query;
pub mod service;
pub mod types;
pub mod vapp;
pub mod vcloud;
pub mod vdc;
pub mod vm;
pub mod xml;
