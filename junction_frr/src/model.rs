//! Target FRR configuration model.
//!
//! Flat lists instead of the source tree's nested maps, built fresh per
//! compilation and serialized immediately. Entries are pre-sorted by the
//! generator and sorted again by natural key at render time so output is
//! byte-stable.

use std::collections::BTreeMap;
use std::fmt;

/// Complete FRR configuration ready for serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrConfig {
    pub hostname: String,
    pub log_file: String,
    pub log_timestamp: bool,
    pub bgp: Option<FrrBgp>,
    pub ospf: Option<FrrOspf>,
    pub static_routes: Vec<FrrStaticRoute>,
    /// Source interface name to Linux interface name.
    pub interface_mapping: BTreeMap<String, String>,
    pub prefix_lists: Vec<FrrPrefixList>,
    pub route_maps: Vec<FrrRouteMap>,
    pub as_path_lists: Vec<FrrAsPathAccessList>,
}

/// Permit/deny action used by prefix-lists, route-maps, and AS-path lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteAction {
    #[default]
    Permit,
    Deny,
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAction::Permit => f.write_str("permit"),
            RouteAction::Deny => f.write_str("deny"),
        }
    }
}

/// `router bgp` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrBgp {
    pub asn: u32,
    pub router_id: String,
    pub neighbors: Vec<FrrBgpNeighbor>,
    pub ipv4_unicast: bool,
    pub ipv6_unicast: bool,
}

/// One BGP neighbor in FRR form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrBgpNeighbor {
    pub ip: String,
    pub remote_as: u32,
    pub description: String,
    /// Source interface or address for the session; empty means unset.
    pub update_source: String,
    pub route_map_in: String,
    pub route_map_out: String,
    pub is_ipv6: bool,
}

/// `router ospf` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrOspf {
    pub router_id: String,
    pub networks: Vec<FrrOspfNetwork>,
    pub interfaces: Vec<FrrOspfInterface>,
}

/// One `network <prefix> area <id>` statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrOspfNetwork {
    pub prefix: String,
    pub area_id: String,
}

/// Per-interface OSPF overrides, using the Linux interface name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrOspfInterface {
    pub name: String,
    pub area_id: String,
    pub passive: bool,
    /// 0 means not set.
    pub metric: u16,
    pub priority: Option<u8>,
}

/// One static route in FRR form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrStaticRoute {
    pub prefix: String,
    pub next_hop: String,
    /// 0 means default distance.
    pub distance: u8,
    pub is_ipv6: bool,
}

/// One `ip`/`ipv6 prefix-list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrPrefixList {
    pub name: String,
    pub is_ipv6: bool,
    pub entries: Vec<FrrPrefixListEntry>,
}

/// One sequence entry of a prefix-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrPrefixListEntry {
    pub seq: u32,
    pub action: RouteAction,
    pub prefix: String,
}

/// One route-map with ordered entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrRouteMap {
    pub name: String,
    pub entries: Vec<FrrRouteMapEntry>,
}

/// One `route-map <name> <action> <seq>` stanza.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrRouteMapEntry {
    pub seq: u32,
    pub action: RouteAction,
    pub match_prefix_lists: Vec<String>,
    pub match_protocol: String,
    pub match_neighbor: String,
    /// Name of a generated AS-path access-list; empty means no match.
    pub match_as_path: String,
    pub set_local_preference: Option<u32>,
    pub set_community: String,
}

/// One `bgp as-path access-list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrAsPathAccessList {
    pub name: String,
    pub entries: Vec<FrrAsPathEntry>,
}

/// One sequence entry of an AS-path access-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrrAsPathEntry {
    pub seq: u32,
    pub action: RouteAction,
    pub regex: String,
}
