//! FRR configuration generation from a validated configuration tree.
//!
//! The pipeline has two halves: [`generate_frr_config`] assembles the flat
//! [`FrrConfig`] target model (interface mapping, BGP, OSPF, static routes,
//! translated policy), and [`generate_frr_config_file`] serializes it to
//! frr.conf text with deterministic ordering.
//!
//! ```
//! use junction_frr::{generate_frr_config, generate_frr_config_file};
//!
//! let mut config = junction_config::parse(
//!     "set system host-name r1\n\
//!      set routing-options static route 0.0.0.0/0 next-hop 10.0.1.254\n",
//! )?;
//! config.validate()?;
//!
//! let frr = generate_frr_config(&config)?;
//! let text = generate_frr_config_file(&frr)?;
//! assert!(text.contains("ip route 0.0.0.0/0 10.0.1.254"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod generate;
pub mod ifname;
pub mod model;
pub mod policy;
pub mod render;

pub use error::FrrError;
pub use generate::{FRR_LOG_FILE, generate_frr_config};
pub use ifname::{MAX_LINUX_IFNAME_LEN, linux_ifname};
pub use model::{
    FrrAsPathAccessList, FrrAsPathEntry, FrrBgp, FrrBgpNeighbor, FrrConfig, FrrOspf,
    FrrOspfInterface, FrrOspfNetwork, FrrPrefixList, FrrPrefixListEntry, FrrRouteMap,
    FrrRouteMapEntry, FrrStaticRoute, RouteAction,
};
pub use policy::{PolicyArtifacts, translate_policy_options};
pub use render::generate_frr_config_file;
