//! Serializes an [`FrrConfig`] to frr.conf text.
//!
//! Every block re-sorts its entries by natural key before emission, even
//! though the generator already builds them in sorted order. The output is
//! diffed between recompiles and must stay byte-stable for logically
//! identical input.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::IpNet;
use tracing::debug;

use crate::error::FrrError;
use crate::model::{
    FrrAsPathAccessList, FrrBgp, FrrBgpNeighbor, FrrConfig, FrrOspf, FrrPrefixList, FrrRouteMap,
    FrrStaticRoute,
};

/// Renders the complete configuration file.
pub fn generate_frr_config_file(config: &FrrConfig) -> Result<String, FrrError> {
    if config.hostname.is_empty() {
        return Err(FrrError::GenerateFailed(
            "FRR hostname is required".to_owned(),
        ));
    }

    let mut out = String::new();

    out.push_str("frr defaults traditional\n");
    out.push_str(&format!("hostname {}\n", config.hostname));
    if !config.log_file.is_empty() {
        out.push_str(&format!("log file {}\n", config.log_file));
    }
    if config.log_timestamp {
        out.push_str("log timestamp precision 3\n");
    }
    out.push_str("service integrated-vtysh-config\n");

    out.push_str(&render_static_routes(&config.static_routes)?);
    if let Some(bgp) = &config.bgp {
        out.push_str(&render_bgp(bgp)?);
    }
    if let Some(ospf) = &config.ospf {
        out.push_str(&render_ospf(ospf)?);
    }
    out.push_str(&render_prefix_lists(&config.prefix_lists));
    out.push_str(&render_route_maps(&config.route_maps, &config.prefix_lists));
    out.push_str(&render_as_path_lists(&config.as_path_lists));

    out.push_str("!\nline vty\n!\n");

    debug!(bytes = out.len(), "frr.conf rendered");
    Ok(out)
}

fn render_static_routes(routes: &[FrrStaticRoute]) -> Result<String, FrrError> {
    if routes.is_empty() {
        return Ok(String::new());
    }

    let mut sorted: Vec<&FrrStaticRoute> = routes.iter().collect();
    sorted.sort_by(|a, b| {
        a.prefix
            .cmp(&b.prefix)
            .then_with(|| a.next_hop.cmp(&b.next_hop))
    });

    let mut out = String::from("!\n");
    for route in sorted {
        validate_static_route(route)?;
        let cmd = if route.is_ipv6 { "ipv6 route" } else { "ip route" };
        if route.distance > 0 {
            out.push_str(&format!(
                "{cmd} {} {} {}\n",
                route.prefix, route.next_hop, route.distance
            ));
        } else {
            out.push_str(&format!("{cmd} {} {}\n", route.prefix, route.next_hop));
        }
    }
    out.push_str("!\n");
    Ok(out)
}

fn validate_static_route(route: &FrrStaticRoute) -> Result<(), FrrError> {
    if route.prefix.is_empty() {
        return Err(FrrError::invalid("static route prefix is required"));
    }
    if route.prefix.parse::<IpNet>().is_err() {
        return Err(FrrError::invalid(format!(
            "invalid static route prefix: {}",
            route.prefix
        )));
    }
    if route.next_hop.is_empty() {
        return Err(FrrError::invalid(format!(
            "static route {}: next-hop is required",
            route.prefix
        )));
    }
    if route.next_hop.parse::<IpAddr>().is_err() {
        return Err(FrrError::invalid(format!(
            "static route {}: invalid next-hop IP: {}",
            route.prefix, route.next_hop
        )));
    }
    Ok(())
}

fn render_bgp(bgp: &FrrBgp) -> Result<String, FrrError> {
    if bgp.asn == 0 {
        return Err(FrrError::invalid("BGP ASN is required"));
    }

    let mut neighbors: Vec<&FrrBgpNeighbor> = bgp.neighbors.iter().collect();
    neighbors.sort_by(|a, b| a.ip.cmp(&b.ip));

    let mut out = String::from("!\n");
    out.push_str(&format!("router bgp {}\n", bgp.asn));
    if !bgp.router_id.is_empty() {
        out.push_str(&format!(" bgp router-id {}\n", bgp.router_id));
    }

    for n in &neighbors {
        validate_bgp_neighbor(n)?;
        out.push_str(&format!(" neighbor {} remote-as {}\n", n.ip, n.remote_as));
        if !n.description.is_empty() {
            out.push_str(&format!(
                " neighbor {} description {}\n",
                n.ip,
                escape_description(&n.description)
            ));
        }
        if !n.update_source.is_empty() {
            out.push_str(&format!(
                " neighbor {} update-source {}\n",
                n.ip, n.update_source
            ));
        }
    }

    if bgp.ipv4_unicast {
        out.push_str(" !\n address-family ipv4 unicast\n");
        render_family_neighbors(&mut out, &neighbors, false);
        out.push_str(" exit-address-family\n");
    }
    if bgp.ipv6_unicast {
        out.push_str(" !\n address-family ipv6 unicast\n");
        render_family_neighbors(&mut out, &neighbors, true);
        out.push_str(" exit-address-family\n");
    }

    out.push_str("!\n");
    Ok(out)
}

fn render_family_neighbors(out: &mut String, neighbors: &[&FrrBgpNeighbor], ipv6: bool) {
    for n in neighbors {
        if n.is_ipv6 != ipv6 {
            continue;
        }
        out.push_str(&format!("  neighbor {} activate\n", n.ip));
        if !n.route_map_in.is_empty() {
            out.push_str(&format!(
                "  neighbor {} route-map {} in\n",
                n.ip, n.route_map_in
            ));
        }
        if !n.route_map_out.is_empty() {
            out.push_str(&format!(
                "  neighbor {} route-map {} out\n",
                n.ip, n.route_map_out
            ));
        }
    }
}

fn validate_bgp_neighbor(n: &FrrBgpNeighbor) -> Result<(), FrrError> {
    if n.ip.is_empty() {
        return Err(FrrError::invalid("BGP neighbor IP is required"));
    }
    if n.ip.parse::<IpAddr>().is_err() {
        return Err(FrrError::invalid(format!(
            "invalid BGP neighbor IP: {}",
            n.ip
        )));
    }
    if n.remote_as == 0 {
        return Err(FrrError::invalid(format!(
            "BGP neighbor {}: remote-as is required",
            n.ip
        )));
    }
    Ok(())
}

/// Quotes a description containing whitespace, escaping embedded quotes.
fn escape_description(desc: &str) -> String {
    if desc.contains(' ') || desc.contains('\t') {
        format!("\"{}\"", desc.replace('"', "\\\""))
    } else {
        desc.to_owned()
    }
}

fn render_ospf(ospf: &FrrOspf) -> Result<String, FrrError> {
    let mut out = String::from("!\nrouter ospf\n");

    if ospf.router_id.is_empty() {
        return Err(FrrError::invalid("OSPF router-id is required"));
    }
    validate_router_id(&ospf.router_id)?;
    out.push_str(&format!(" ospf router-id {}\n", ospf.router_id));

    let mut networks: Vec<_> = ospf.networks.iter().collect();
    networks.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    for network in networks {
        if network.prefix.is_empty() {
            return Err(FrrError::invalid("OSPF network prefix is required"));
        }
        if network.prefix.parse::<IpNet>().is_err() {
            return Err(FrrError::invalid(format!(
                "invalid OSPF network prefix: {}",
                network.prefix
            )));
        }
        if network.area_id.is_empty() {
            return Err(FrrError::invalid(format!(
                "OSPF network {}: area-id is required",
                network.prefix
            )));
        }
        validate_area_id(&network.area_id)?;
        out.push_str(&format!(
            " network {} area {}\n",
            network.prefix, network.area_id
        ));
    }
    out.push_str("!\n");

    let mut interfaces: Vec<_> = ospf.interfaces.iter().collect();
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    for iface in interfaces {
        if iface.name.is_empty() {
            return Err(FrrError::invalid("OSPF interface name is required"));
        }
        if iface.area_id.is_empty() {
            return Err(FrrError::invalid(format!(
                "OSPF interface {}: area-id is required",
                iface.name
            )));
        }
        validate_area_id(&iface.area_id)?;

        // Interfaces with no overrides produce no stanza.
        if !iface.passive && iface.metric == 0 && iface.priority.is_none() {
            continue;
        }

        out.push_str(&format!("interface {}\n", iface.name));
        if iface.passive {
            out.push_str(" ip ospf passive\n");
        }
        if iface.metric > 0 {
            out.push_str(&format!(" ip ospf cost {}\n", iface.metric));
        }
        if let Some(priority) = iface.priority {
            out.push_str(&format!(" ip ospf priority {priority}\n"));
        }
        out.push_str("!\n");
    }

    Ok(out)
}

fn validate_router_id(router_id: &str) -> Result<(), FrrError> {
    match router_id.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok(()),
        Ok(IpAddr::V6(_)) => Err(FrrError::invalid(format!(
            "OSPF router-id must be IPv4 format: {router_id}"
        ))),
        Err(_) => Err(FrrError::invalid(format!(
            "invalid OSPF router-id: {router_id} (must be IPv4 format)"
        ))),
    }
}

/// Area IDs are dotted decimal (`0.0.0.0`) or plain integers (`0`).
fn validate_area_id(area_id: &str) -> Result<(), FrrError> {
    if area_id.contains(':') {
        return Err(FrrError::invalid(format!(
            "invalid OSPF area-id: {area_id} (IPv6 addresses not allowed, \
             must be IPv4 format like '0.0.0.0' or integer like '0')"
        )));
    }
    if area_id.parse::<u32>().is_ok() || area_id.parse::<Ipv4Addr>().is_ok() {
        return Ok(());
    }
    Err(FrrError::invalid(format!(
        "invalid OSPF area-id: {area_id} (must be IPv4 format like '0.0.0.0' or integer like '0')"
    )))
}

fn render_prefix_lists(lists: &[FrrPrefixList]) -> String {
    let mut sorted: Vec<&FrrPrefixList> = lists.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for list in sorted {
        let family = if list.is_ipv6 { "ipv6" } else { "ip" };
        for entry in &list.entries {
            out.push_str(&format!(
                "{family} prefix-list {} seq {} {} {}\n",
                list.name, entry.seq, entry.action, entry.prefix
            ));
        }
        out.push_str("!\n");
    }
    out
}

fn render_route_maps(route_maps: &[FrrRouteMap], prefix_lists: &[FrrPrefixList]) -> String {
    let mut sorted: Vec<&FrrRouteMap> = route_maps.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for rm in sorted {
        for entry in &rm.entries {
            out.push_str(&format!("route-map {} {} {}\n", rm.name, entry.action, entry.seq));

            for list_name in &entry.match_prefix_lists {
                // Family of the match line follows the referenced list.
                let is_ipv6 = prefix_lists
                    .iter()
                    .any(|pl| pl.name == *list_name && pl.is_ipv6);
                let family = if is_ipv6 { "ipv6" } else { "ip" };
                out.push_str(&format!(
                    " match {family} address prefix-list {list_name}\n"
                ));
            }
            if !entry.match_protocol.is_empty() {
                out.push_str(&format!(" match source-protocol {}\n", entry.match_protocol));
            }
            if !entry.match_neighbor.is_empty() {
                out.push_str(&format!(" match peer {}\n", entry.match_neighbor));
            }
            if !entry.match_as_path.is_empty() {
                out.push_str(&format!(" match as-path {}\n", entry.match_as_path));
            }
            if let Some(pref) = entry.set_local_preference {
                out.push_str(&format!(" set local-preference {pref}\n"));
            }
            if !entry.set_community.is_empty() {
                out.push_str(&format!(" set community {}\n", entry.set_community));
            }

            out.push_str("!\n");
        }
    }
    out
}

fn render_as_path_lists(lists: &[FrrAsPathAccessList]) -> String {
    let mut sorted: Vec<&FrrAsPathAccessList> = lists.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for list in sorted {
        for entry in &list.entries {
            out.push_str(&format!(
                "bgp as-path access-list {} seq {} {} {}\n",
                list.name, entry.seq, entry.action, entry.regex
            ));
        }
        out.push_str("!\n");
    }
    out
}
