//! Configuration tree built by the parser.
//!
//! All maps are `BTreeMap` so iteration order, and therefore everything
//! derived from the tree, is deterministic. Statements accumulate into the
//! tree through the `*_mut` get-or-create methods; repeated statements
//! deepen or extend existing entries instead of replacing them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of the parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemConfig>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, Interface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_options: Option<RoutingOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Protocols>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_options: Option<PolicyOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn system_mut(&mut self) -> &mut SystemConfig {
        self.system.get_or_insert_with(SystemConfig::default)
    }

    pub fn interface_mut(&mut self, name: &str) -> &mut Interface {
        self.interfaces.entry(name.to_owned()).or_default()
    }

    pub fn routing_options_mut(&mut self) -> &mut RoutingOptions {
        self.routing_options
            .get_or_insert_with(RoutingOptions::default)
    }

    pub fn protocols_mut(&mut self) -> &mut Protocols {
        self.protocols.get_or_insert_with(Protocols::default)
    }

    pub fn policy_options_mut(&mut self) -> &mut PolicyOptions {
        self.policy_options
            .get_or_insert_with(PolicyOptions::default)
    }

    pub fn security_mut(&mut self) -> &mut Security {
        self.security.get_or_insert_with(Security::default)
    }
}

/// `system` subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SystemConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host_name: String,
}

/// One physical or logical interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Interface {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub units: BTreeMap<u16, Unit>,
}

impl Interface {
    pub fn unit_mut(&mut self, number: u16) -> &mut Unit {
        self.units.entry(number).or_default()
    }
}

/// Logical unit under an interface, keyed by unit number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Unit {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub families: BTreeMap<String, Family>,
}

impl Unit {
    pub fn family_mut(&mut self, name: &str) -> &mut Family {
        self.families.entry(name.to_owned()).or_default()
    }
}

/// Address family (`inet` or `inet6`) with its CIDR addresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Family {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
}

/// `routing-options` subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RoutingOptions {
    /// Local AS number; 0 means not configured.
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub autonomous_system: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub router_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_routes: Vec<StaticRoute>,
}

/// One `routing-options static route` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StaticRoute {
    pub prefix: String,
    pub next_hop: String,
    /// Administrative distance; 0 means default.
    #[serde(skip_serializing_if = "is_zero_u8")]
    pub distance: u8,
}

/// `protocols` subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Protocols {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp: Option<BgpConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf: Option<OspfConfig>,
}

impl Protocols {
    pub fn bgp_mut(&mut self) -> &mut BgpConfig {
        self.bgp.get_or_insert_with(BgpConfig::default)
    }

    pub fn ospf_mut(&mut self) -> &mut OspfConfig {
        self.ospf.get_or_insert_with(OspfConfig::default)
    }
}

/// BGP protocol configuration, a set of named peer groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BgpConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, BgpGroup>,
}

impl BgpConfig {
    pub fn group_mut(&mut self, name: &str) -> &mut BgpGroup {
        self.groups.entry(name.to_owned()).or_default()
    }
}

/// One BGP peer group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BgpGroup {
    /// `internal` or `external`; empty means not yet set.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub group_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub import: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub export: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub neighbors: BTreeMap<String, BgpNeighbor>,
}

impl BgpGroup {
    pub fn neighbor_mut(&mut self, ip: &str) -> &mut BgpNeighbor {
        self.neighbors.entry(ip.to_owned()).or_default()
    }
}

/// One BGP neighbor, keyed by its IP address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BgpNeighbor {
    /// Peer AS number; 0 means not yet set.
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub peer_as: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_address: String,
}

/// OSPF protocol configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OspfConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub router_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub areas: BTreeMap<String, OspfArea>,
}

impl OspfConfig {
    pub fn area_mut(&mut self, id: &str) -> &mut OspfArea {
        self.areas.entry(id.to_owned()).or_default()
    }
}

/// One OSPF area, keyed by its area ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OspfArea {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, OspfInterface>,
}

impl OspfArea {
    pub fn interface_mut(&mut self, name: &str) -> &mut OspfInterface {
        self.interfaces.entry(name.to_owned()).or_default()
    }
}

/// Per-interface OSPF settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OspfInterface {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub passive: bool,
    /// Interface cost; 0 means not set.
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub metric: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// `policy-options` subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyOptions {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub prefix_lists: BTreeMap<String, PrefixList>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub policy_statements: BTreeMap<String, PolicyStatement>,
}

impl PolicyOptions {
    pub fn prefix_list_mut(&mut self, name: &str) -> &mut PrefixList {
        self.prefix_lists.entry(name.to_owned()).or_default()
    }

    pub fn policy_statement_mut(&mut self, name: &str) -> &mut PolicyStatement {
        self.policy_statements.entry(name.to_owned()).or_default()
    }
}

/// Named list of CIDR prefixes, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PrefixList {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
}

/// Named routing policy made of ordered terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyStatement {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<PolicyTerm>,
}

impl PolicyStatement {
    /// Finds the term by name, appending a new one if absent. Terms keep
    /// their first-seen order.
    pub fn term_mut(&mut self, name: &str) -> &mut PolicyTerm {
        if let Some(pos) = self.terms.iter().position(|t| t.name == name) {
            return &mut self.terms[pos];
        }
        self.terms.push(PolicyTerm {
            name: name.to_owned(),
            ..PolicyTerm::default()
        });
        let last = self.terms.len() - 1;
        &mut self.terms[last]
    }
}

/// One term of a policy statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyTerm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<MatchConditions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then: Option<PolicyActions>,
}

impl PolicyTerm {
    pub fn from_mut(&mut self) -> &mut MatchConditions {
        self.from.get_or_insert_with(MatchConditions::default)
    }

    pub fn then_mut(&mut self) -> &mut PolicyActions {
        self.then.get_or_insert_with(PolicyActions::default)
    }
}

/// `from` clause of a policy term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MatchConditions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix_lists: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub neighbor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub as_path: String,
}

/// `then` clause of a policy term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyActions {
    /// `Some(true)` for accept, `Some(false)` for reject, `None` when the
    /// term has no terminal action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_preference: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub community: String,
}

/// `security` subtree. Parsed and carried through but not consumed by
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Security {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netconf: Option<NetconfConfig>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub users: BTreeMap<String, User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}

impl Security {
    pub fn netconf_mut(&mut self) -> &mut NetconfConfig {
        self.netconf.get_or_insert_with(NetconfConfig::default)
    }

    pub fn user_mut(&mut self, name: &str) -> &mut User {
        self.users.entry(name.to_owned()).or_default()
    }

    pub fn rate_limit_mut(&mut self) -> &mut RateLimit {
        self.rate_limit.get_or_insert_with(RateLimit::default)
    }
}

/// NETCONF-over-SSH settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NetconfConfig {
    /// Listening port; 0 means not set.
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub ssh_port: u16,
}

/// One management user, keyed by username.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct User {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// `admin`, `operator`, or `read-only`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,
}

/// Request rate limits; 0 means not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RateLimit {
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub per_ip: u16,
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub per_user: u16,
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_mut_reuses_existing_entry() {
        let mut config = Config::new();
        config.interface_mut("ge-0/0/0").description = "uplink".into();
        config
            .interface_mut("ge-0/0/0")
            .unit_mut(0)
            .family_mut("inet")
            .addresses
            .push("10.0.1.1/24".into());

        assert_eq!(config.interfaces.len(), 1);
        let iface = &config.interfaces["ge-0/0/0"];
        assert_eq!(iface.description, "uplink");
        assert_eq!(iface.units[&0].families["inet"].addresses.len(), 1);
    }

    #[test]
    fn term_mut_preserves_first_seen_order() {
        let mut statement = PolicyStatement::default();
        statement.term_mut("b");
        statement.term_mut("a");
        statement.term_mut("b").then_mut().accept = Some(true);

        let names: Vec<&str> = statement.terms.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(statement.terms[0].then.as_ref().unwrap().accept, Some(true));
    }

    #[test]
    fn empty_subtrees_are_omitted_from_json() {
        let mut config = Config::new();
        config.system_mut().host_name = "r1".into();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"system":{"host-name":"r1"}}"#);
    }
}
