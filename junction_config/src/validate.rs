//! Semantic validation of a parsed configuration tree.
//!
//! Runs after a complete parse. Checks stop at the first violation and
//! return one structured error. The only mutation performed here is
//! filling in the default hostname.

use std::net::IpAddr;
use std::sync::LazyLock;

use ipnet::IpNet;
use regex::Regex;

use crate::error::ConfigError;
use crate::model::{
    BgpGroup, Config, Family, Interface, OspfArea, OspfConfig, RoutingOptions, StaticRoute, Unit,
};

/// Hostname assigned when the configuration does not set one.
pub const DEFAULT_HOSTNAME: &str = "junction-router";

// Physical names like ge-0/0/0, plus aeN, loN, irb, and fxpN.
static INTERFACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2}-\d+/\d+/\d+|ae\d+|lo\d+|irb|fxp\d+)$").expect("valid regex")
});

// RFC 1123 hostname labels.
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("valid regex")
});

static AREA_ID_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

impl Config {
    /// Validates the tree, assigning the default hostname when missing.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let system = self.system_mut();
        if system.host_name.is_empty() {
            system.host_name = DEFAULT_HOSTNAME.to_owned();
        }
        validate_hostname(&system.host_name)?;

        for (name, iface) in &self.interfaces {
            validate_interface_name(name)?;
            validate_interface(name, iface)?;
        }

        if let Some(ro) = &self.routing_options {
            validate_routing_options(ro)?;
        }

        if let Some(protocols) = &self.protocols {
            if let Some(bgp) = &protocols.bgp {
                validate_bgp(self, &bgp.groups)?;
            }
            if let Some(ospf) = &protocols.ospf {
                validate_ospf(self, ospf)?;
            }
        }

        Ok(())
    }
}

fn validate_hostname(hostname: &str) -> Result<(), ConfigError> {
    if hostname.len() > 253 {
        return Err(ConfigError::validation(
            format!("Hostname too long: {hostname}"),
            "Hostname must be 253 characters or less",
            "Use a shorter hostname",
        ));
    }
    if !HOSTNAME.is_match(hostname) {
        return Err(ConfigError::validation(
            format!("Invalid hostname format: {hostname}"),
            "Hostname must follow RFC 1123 format",
            "Use only alphanumeric characters and hyphens, starting and ending with alphanumeric",
        ));
    }
    Ok(())
}

fn validate_interface_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::validation(
            "Interface name is empty",
            "Interface name must be specified",
            "Use a valid interface name like 'ge-0/0/0'",
        ));
    }
    if !INTERFACE_NAME.is_match(name) {
        return Err(ConfigError::validation(
            format!("Invalid interface name: {name}"),
            "Interface name must be a valid Junos-style name (e.g., ge-0/0/0, xe-1/2/3, ae0, lo0, irb, fxp0)",
            "Use a valid Junos-style interface name",
        ));
    }
    Ok(())
}

fn validate_interface(name: &str, iface: &Interface) -> Result<(), ConfigError> {
    if iface.description.len() > 255 {
        return Err(ConfigError::validation(
            format!("Interface {name} description too long"),
            "Description must be 255 characters or less",
            "Use a shorter description",
        ));
    }
    for (unit_num, unit) in &iface.units {
        validate_unit(name, *unit_num, unit)?;
    }
    Ok(())
}

fn validate_unit(iface_name: &str, unit_num: u16, unit: &Unit) -> Result<(), ConfigError> {
    // The parser enforces this too; hand-built trees go through here.
    if unit_num > 32767 {
        return Err(ConfigError::validation(
            format!("Invalid unit number {unit_num} on interface {iface_name}"),
            "Unit number must be between 0 and 32767",
            "Use a valid unit number in the allowed range",
        ));
    }
    for (family_name, family) in &unit.families {
        validate_family(iface_name, unit_num, family_name, family)?;
    }
    Ok(())
}

fn validate_family(
    iface_name: &str,
    unit_num: u16,
    family_name: &str,
    family: &Family,
) -> Result<(), ConfigError> {
    if family_name != "inet" && family_name != "inet6" {
        return Err(ConfigError::validation(
            format!("Invalid family {family_name} on interface {iface_name} unit {unit_num}"),
            "Family must be one of: inet, inet6",
            "Use a valid address family",
        ));
    }

    if family.addresses.is_empty() {
        return Err(ConfigError::validation(
            format!(
                "No addresses configured for family {family_name} on interface {iface_name} unit {unit_num}"
            ),
            "At least one address must be configured",
            "Add an address using 'set interfaces <name> unit <num> family <family> address <cidr>'",
        ));
    }

    for addr in &family.addresses {
        validate_address(addr, family_name, iface_name, unit_num)?;
    }
    Ok(())
}

fn validate_address(
    addr: &str,
    family_name: &str,
    iface_name: &str,
    unit_num: u16,
) -> Result<(), ConfigError> {
    if addr.is_empty() {
        return Err(ConfigError::validation(
            format!("Empty address on interface {iface_name} unit {unit_num} family {family_name}"),
            "Address must not be empty",
            "Specify a valid IP address in CIDR format",
        ));
    }

    let net: IpNet = addr.parse().map_err(|_| {
        ConfigError::validation(
            format!(
                "Invalid CIDR address {addr} on interface {iface_name} unit {unit_num} family {family_name}"
            ),
            "Failed to parse CIDR",
            "Use a valid CIDR format like '192.168.1.1/24' or '2001:db8::1/64'",
        )
    })?;

    match (family_name, &net) {
        ("inet", IpNet::V6(_)) => Err(ConfigError::validation(
            format!(
                "IPv4 address expected for family inet, got {addr} on interface {iface_name} unit {unit_num}"
            ),
            "Family inet requires IPv4 addresses",
            "Use an IPv4 address or change family to inet6 for IPv6",
        )),
        ("inet6", IpNet::V4(_)) => Err(ConfigError::validation(
            format!(
                "IPv6 address expected for family inet6, got {addr} on interface {iface_name} unit {unit_num}"
            ),
            "Family inet6 requires IPv6 addresses",
            "Use an IPv6 address or change family to inet for IPv4",
        )),
        _ => Ok(()),
    }
}

fn validate_routing_options(ro: &RoutingOptions) -> Result<(), ConfigError> {
    if !ro.router_id.is_empty() {
        validate_router_id(&ro.router_id, "router-id")?;
    }

    for route in &ro.static_routes {
        validate_static_route(route)?;
    }
    Ok(())
}

fn validate_router_id(router_id: &str, what: &str) -> Result<(), ConfigError> {
    match router_id.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok(()),
        Ok(IpAddr::V6(_)) => Err(ConfigError::validation(
            format!("Router ID must be IPv4: {router_id}"),
            "Router ID must be an IPv4 address, not IPv6",
            "Use an IPv4 address",
        )),
        Err(_) => Err(ConfigError::validation(
            format!("Invalid {what}: {router_id}"),
            "Router ID must be a valid IPv4 address",
            "Use a valid IPv4 address like '192.168.1.1'",
        )),
    }
}

fn validate_static_route(route: &StaticRoute) -> Result<(), ConfigError> {
    if route.prefix.is_empty() {
        return Err(ConfigError::validation(
            "Static route prefix is empty",
            "Prefix must be specified",
            "Use a valid CIDR prefix like '0.0.0.0/0' or '192.168.0.0/24'",
        ));
    }
    if route.prefix.parse::<IpNet>().is_err() {
        return Err(ConfigError::validation(
            format!("Invalid static route prefix: {}", route.prefix),
            "Failed to parse CIDR",
            "Use a valid CIDR format",
        ));
    }
    if route.next_hop.is_empty() {
        return Err(ConfigError::validation(
            format!("Static route {} has empty next-hop", route.prefix),
            "Next-hop must be specified",
            "Specify a valid next-hop IP address",
        ));
    }
    if route.next_hop.parse::<IpAddr>().is_err() {
        return Err(ConfigError::validation(
            format!(
                "Invalid next-hop for static route {}: {}",
                route.prefix, route.next_hop
            ),
            "Next-hop must be a valid IP address",
            "Use a valid IPv4 or IPv6 address",
        ));
    }
    Ok(())
}

fn validate_bgp(
    config: &Config,
    groups: &std::collections::BTreeMap<String, BgpGroup>,
) -> Result<(), ConfigError> {
    let has_asn = config
        .routing_options
        .as_ref()
        .is_some_and(|ro| ro.autonomous_system != 0);
    if !has_asn {
        return Err(ConfigError::validation(
            "BGP configured but autonomous-system not set",
            "BGP requires an autonomous system number",
            "Set 'routing-options autonomous-system <asn>'",
        ));
    }

    if groups.is_empty() {
        return Err(ConfigError::validation(
            "BGP configured but no groups defined",
            "BGP requires at least one group",
            "Add a BGP group using 'set protocols bgp group <name> ...'",
        ));
    }

    for (name, group) in groups {
        validate_bgp_group(name, group)?;
    }
    Ok(())
}

fn validate_bgp_group(name: &str, group: &BgpGroup) -> Result<(), ConfigError> {
    if group.group_type.is_empty() {
        return Err(ConfigError::validation(
            format!("BGP group {name} has no type"),
            "BGP group type must be specified",
            "Set 'set protocols bgp group <name> type internal' or 'type external'",
        ));
    }
    if group.group_type != "internal" && group.group_type != "external" {
        return Err(ConfigError::validation(
            format!("Invalid BGP group type for {name}: {}", group.group_type),
            "BGP group type must be 'internal' or 'external'",
            "Use 'type internal' or 'type external'",
        ));
    }

    if group.neighbors.is_empty() {
        return Err(ConfigError::validation(
            format!("BGP group {name} has no neighbors"),
            "BGP group must have at least one neighbor",
            "Add a neighbor using 'set protocols bgp group <name> neighbor <ip> peer-as <asn>'",
        ));
    }

    for (ip, neighbor) in &group.neighbors {
        if ip.parse::<IpAddr>().is_err() {
            return Err(ConfigError::validation(
                format!("Invalid BGP neighbor IP in group {name}: {ip}"),
                "Neighbor IP must be a valid IP address",
                "Use a valid IPv4 or IPv6 address",
            ));
        }
        if neighbor.peer_as == 0 {
            return Err(ConfigError::validation(
                format!("BGP neighbor {ip} in group {name} has no peer-as"),
                "Peer AS number must be specified",
                "Set 'set protocols bgp group <name> neighbor <ip> peer-as <asn>'",
            ));
        }
        if !neighbor.local_address.is_empty() && neighbor.local_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::validation(
                format!(
                    "Invalid local address for neighbor {ip} in group {name}: {}",
                    neighbor.local_address
                ),
                "Local address must be a valid IP address",
                "Use a valid IPv4 or IPv6 address",
            ));
        }
    }
    Ok(())
}

fn validate_ospf(config: &Config, ospf: &OspfConfig) -> Result<(), ConfigError> {
    let router_id = if !ospf.router_id.is_empty() {
        ospf.router_id.as_str()
    } else {
        config
            .routing_options
            .as_ref()
            .map(|ro| ro.router_id.as_str())
            .unwrap_or("")
    };

    if router_id.is_empty() {
        return Err(ConfigError::validation(
            "OSPF configured but no router-id set",
            "OSPF requires a router ID",
            "Set 'routing-options router-id <ip>' or 'protocols ospf router-id <ip>'",
        ));
    }
    validate_router_id(router_id, "OSPF router-id")?;

    if ospf.areas.is_empty() {
        return Err(ConfigError::validation(
            "OSPF configured but no areas defined",
            "OSPF requires at least one area",
            "Add an area using 'set protocols ospf area <area-id> interface <name>'",
        ));
    }

    for (area_id, area) in &ospf.areas {
        validate_ospf_area(config, area_id, area)?;
    }
    Ok(())
}

fn validate_ospf_area(config: &Config, area_id: &str, area: &OspfArea) -> Result<(), ConfigError> {
    match area_id.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => {}
        Ok(IpAddr::V6(_)) => {
            return Err(ConfigError::validation(
                format!("Invalid OSPF area ID: {area_id}"),
                "Area ID must be in dotted decimal IPv4 format (e.g., 0.0.0.0), not IPv6",
                "Use an IPv4 address or integer format",
            ));
        }
        Err(_) => {
            if !AREA_ID_INTEGER.is_match(area_id) {
                return Err(ConfigError::validation(
                    format!("Invalid OSPF area ID: {area_id}"),
                    "Area ID must be in dotted decimal format (e.g., 0.0.0.0) or integer (e.g., 0)",
                    "Use a valid area ID format",
                ));
            }
        }
    }

    if area.interfaces.is_empty() {
        return Err(ConfigError::validation(
            format!("OSPF area {area_id} has no interfaces"),
            "OSPF area must have at least one interface",
            "Add an interface using 'set protocols ospf area <area-id> interface <name>'",
        ));
    }

    for if_name in area.interfaces.keys() {
        if !config.interfaces.contains_key(if_name) {
            return Err(ConfigError::validation(
                format!("OSPF references non-existent interface {if_name} in area {area_id}"),
                "Interface must be defined before being used in OSPF",
                format!("Add interface configuration for {if_name}"),
            ));
        }
    }
    Ok(())
}
