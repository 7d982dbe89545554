//! Builds the FRR target model from a validated configuration tree.

use std::collections::BTreeSet;
use std::net::IpAddr;

use ipnet::IpNet;
use junction_config::{Config, DEFAULT_HOSTNAME};
use tracing::debug;

use crate::error::FrrError;
use crate::ifname::linux_ifname;
use crate::model::{
    FrrBgp, FrrBgpNeighbor, FrrConfig, FrrOspf, FrrOspfInterface, FrrOspfNetwork, FrrStaticRoute,
};
use crate::policy::translate_policy_options;

/// Where FRR writes its log on the router.
pub const FRR_LOG_FILE: &str = "/var/log/frr/frr.log";

/// Assembles a complete [`FrrConfig`] from the source tree.
///
/// BGP group import/export references are checked here against
/// policy-options: a reference to a policy-statement that does not exist
/// fails generation, naming the policy and the direction.
pub fn generate_frr_config(config: &Config) -> Result<FrrConfig, FrrError> {
    let hostname = match &config.system {
        Some(system) if !system.host_name.is_empty() => system.host_name.clone(),
        _ => DEFAULT_HOSTNAME.to_owned(),
    };

    let mut frr = FrrConfig {
        hostname,
        log_file: FRR_LOG_FILE.to_owned(),
        log_timestamp: true,
        ..FrrConfig::default()
    };

    for name in config.interfaces.keys() {
        frr.interface_mapping
            .insert(name.clone(), linux_ifname(name)?);
    }
    debug!(interfaces = frr.interface_mapping.len(), "interface mapping built");

    if let Some(ro) = &config.routing_options {
        for route in &ro.static_routes {
            frr.static_routes.push(FrrStaticRoute {
                prefix: route.prefix.clone(),
                next_hop: route.next_hop.clone(),
                distance: route.distance,
                is_ipv6: matches!(route.prefix.parse::<IpNet>(), Ok(IpNet::V6(_))),
            });
        }
    }

    frr.bgp = convert_bgp(config)?;
    frr.ospf = convert_ospf(config)?;

    let artifacts = translate_policy_options(config.policy_options.as_ref());
    debug!(
        prefix_lists = artifacts.prefix_lists.len(),
        route_maps = artifacts.route_maps.len(),
        as_path_lists = artifacts.as_path_lists.len(),
        "policy translation done"
    );
    frr.prefix_lists = artifacts.prefix_lists;
    frr.route_maps = artifacts.route_maps;
    frr.as_path_lists = artifacts.as_path_lists;

    Ok(frr)
}

fn convert_bgp(config: &Config) -> Result<Option<FrrBgp>, FrrError> {
    let Some(bgp) = config.protocols.as_ref().and_then(|p| p.bgp.as_ref()) else {
        return Ok(None);
    };

    let ro = config.routing_options.as_ref();
    let asn = ro.map_or(0, |ro| ro.autonomous_system);
    if asn == 0 {
        return Err(FrrError::invalid(
            "BGP is configured but routing-options autonomous-system is not set",
        ));
    }

    let mut frr_bgp = FrrBgp {
        asn,
        router_id: ro.map_or_else(String::new, |ro| ro.router_id.clone()),
        ..FrrBgp::default()
    };

    for (group_name, group) in &bgp.groups {
        check_policy_reference(config, group_name, "import", &group.import)?;
        check_policy_reference(config, group_name, "export", &group.export)?;

        for (ip, neighbor) in &group.neighbors {
            let is_ipv6 = matches!(ip.parse::<IpAddr>(), Ok(IpAddr::V6(_)));
            if is_ipv6 {
                frr_bgp.ipv6_unicast = true;
            } else {
                frr_bgp.ipv4_unicast = true;
            }
            frr_bgp.neighbors.push(FrrBgpNeighbor {
                ip: ip.clone(),
                remote_as: neighbor.peer_as,
                description: neighbor.description.clone(),
                update_source: neighbor.local_address.clone(),
                route_map_in: group.import.clone(),
                route_map_out: group.export.clone(),
                is_ipv6,
            });
        }
    }

    Ok(Some(frr_bgp))
}

fn check_policy_reference(
    config: &Config,
    group: &str,
    direction: &str,
    policy: &str,
) -> Result<(), FrrError> {
    if policy.is_empty() {
        return Ok(());
    }
    match &config.policy_options {
        None => Err(FrrError::invalid(format!(
            "BGP group '{group}' references {direction} policy '{policy}' \
             but no policy-options are configured"
        ))),
        Some(po) if !po.policy_statements.contains_key(policy) => {
            Err(FrrError::invalid(format!(
                "BGP group '{group}' references {direction} policy '{policy}' \
                 but policy-statement does not exist"
            )))
        }
        Some(_) => Ok(()),
    }
}

fn convert_ospf(config: &Config) -> Result<Option<FrrOspf>, FrrError> {
    let Some(ospf) = config.protocols.as_ref().and_then(|p| p.ospf.as_ref()) else {
        return Ok(None);
    };

    let router_id = if ospf.router_id.is_empty() {
        config
            .routing_options
            .as_ref()
            .map_or_else(String::new, |ro| ro.router_id.clone())
    } else {
        ospf.router_id.clone()
    };

    let mut frr_ospf = FrrOspf {
        router_id,
        ..FrrOspf::default()
    };

    // Deduplicate across areas sharing an interface's subnet.
    let mut seen_networks = BTreeSet::new();

    for (area_id, area) in &ospf.areas {
        for (ifname, iface) in &area.interfaces {
            if let Some(source_iface) = config.interfaces.get(ifname) {
                for unit in source_iface.units.values() {
                    if let Some(family) = unit.families.get("inet") {
                        for address in &family.addresses {
                            let Ok(net) = address.parse::<IpNet>() else {
                                continue;
                            };
                            let prefix = net.trunc().to_string();
                            if seen_networks.insert((prefix.clone(), area_id.clone())) {
                                frr_ospf.networks.push(FrrOspfNetwork {
                                    prefix,
                                    area_id: area_id.clone(),
                                });
                            }
                        }
                    }
                }
            }

            frr_ospf.interfaces.push(FrrOspfInterface {
                name: linux_ifname(ifname)?,
                area_id: area_id.clone(),
                passive: iface.passive,
                metric: iface.metric,
                priority: iface.priority,
            });
        }
    }

    Ok(Some(frr_ospf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_config::parse;
    use pretty_assertions::assert_eq;

    fn compile(input: &str) -> Result<FrrConfig, FrrError> {
        let mut config = parse(input).expect("parse failed");
        config.validate().expect("validation failed");
        generate_frr_config(&config)
    }

    const FULL_CONFIG: &str = concat!(
        "set system host-name router1\n",
        "set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24\n",
        "set routing-options autonomous-system 65001\n",
        "set routing-options router-id 10.0.1.1\n",
        "set routing-options static route 0.0.0.0/0 next-hop 10.0.1.254\n",
        "set protocols bgp group IBGP type internal\n",
        "set protocols bgp group IBGP neighbor 10.0.1.2 peer-as 65001\n",
        "set protocols ospf area 0.0.0.0 interface ge-0/0/0\n",
    );

    #[test]
    fn full_configuration_converts() {
        let frr = compile(FULL_CONFIG).unwrap();
        assert_eq!(frr.hostname, "router1");
        assert_eq!(frr.log_file, FRR_LOG_FILE);
        assert!(frr.log_timestamp);
        assert!(frr.bgp.is_some());
        assert!(frr.ospf.is_some());
        assert_eq!(frr.static_routes.len(), 1);
        assert_eq!(
            frr.interface_mapping.get("ge-0/0/0").map(String::as_str),
            Some("ge0-0-0")
        );
    }

    #[test]
    fn bgp_only_leaves_ospf_unset() {
        let frr = compile(concat!(
            "set system host-name bgp-router\n",
            "set routing-options autonomous-system 65001\n",
            "set routing-options router-id 10.0.1.1\n",
            "set protocols bgp group EBGP type external\n",
            "set protocols bgp group EBGP neighbor 10.0.2.2 peer-as 65002\n",
        ))
        .unwrap();
        let bgp = frr.bgp.unwrap();
        assert_eq!(bgp.asn, 65001);
        assert_eq!(bgp.router_id, "10.0.1.1");
        assert!(bgp.ipv4_unicast);
        assert!(!bgp.ipv6_unicast);
        assert!(frr.ospf.is_none());
    }

    #[test]
    fn bgp_without_autonomous_system_fails() {
        let config = parse(concat!(
            "set protocols bgp group EBGP type external\n",
            "set protocols bgp group EBGP neighbor 10.0.2.2 peer-as 65002\n",
        ))
        .unwrap();
        let err = generate_frr_config(&config).unwrap_err();
        assert_eq!(err.code(), "FRR_INVALID_CONFIG");
    }

    #[test]
    fn missing_import_policy_is_named_in_the_error() {
        let config = parse(concat!(
            "set routing-options autonomous-system 65001\n",
            "set routing-options router-id 10.0.1.1\n",
            "set protocols bgp group external type external\n",
            "set protocols bgp group external import NONEXISTENT-POLICY\n",
            "set protocols bgp group external neighbor 10.0.1.2 peer-as 65002\n",
            "set policy-options policy-statement EXPORT-POLICY term 1 then accept\n",
        ))
        .unwrap();
        let err = generate_frr_config(&config).unwrap_err();
        assert!(err.to_string().contains(
            "import policy 'NONEXISTENT-POLICY' but policy-statement does not exist"
        ));
    }

    #[test]
    fn missing_export_policy_is_named_in_the_error() {
        let config = parse(concat!(
            "set routing-options autonomous-system 65001\n",
            "set protocols bgp group external type external\n",
            "set protocols bgp group external export NONEXISTENT-EXPORT\n",
            "set protocols bgp group external neighbor 10.0.1.2 peer-as 65002\n",
            "set policy-options policy-statement IMPORT-POLICY term 1 then accept\n",
        ))
        .unwrap();
        let err = generate_frr_config(&config).unwrap_err();
        assert!(err.to_string().contains(
            "export policy 'NONEXISTENT-EXPORT' but policy-statement does not exist"
        ));
    }

    #[test]
    fn policy_reference_without_policy_options_fails() {
        let config = parse(concat!(
            "set routing-options autonomous-system 65001\n",
            "set protocols bgp group external type external\n",
            "set protocols bgp group external import IMPORT-POLICY\n",
            "set protocols bgp group external neighbor 10.0.1.2 peer-as 65002\n",
        ))
        .unwrap();
        let err = generate_frr_config(&config).unwrap_err();
        assert!(err
            .to_string()
            .contains("import policy 'IMPORT-POLICY' but no policy-options are configured"));
    }

    #[test]
    fn neighbor_carries_group_policies_and_local_address() {
        let frr = compile(concat!(
            "set routing-options autonomous-system 65001\n",
            "set routing-options router-id 10.0.1.1\n",
            "set protocols bgp group peers type external\n",
            "set protocols bgp group peers import IN\n",
            "set protocols bgp group peers export OUT\n",
            "set protocols bgp group peers neighbor 10.0.1.2 peer-as 65002\n",
            "set protocols bgp group peers neighbor 10.0.1.2 local-address 10.0.1.1\n",
            "set policy-options policy-statement IN term 1 then accept\n",
            "set policy-options policy-statement OUT term 1 then accept\n",
        ))
        .unwrap();
        let neighbor = &frr.bgp.unwrap().neighbors[0];
        assert_eq!(neighbor.route_map_in, "IN");
        assert_eq!(neighbor.route_map_out, "OUT");
        assert_eq!(neighbor.update_source, "10.0.1.1");
        assert!(!neighbor.is_ipv6);
    }

    #[test]
    fn ipv6_neighbor_enables_ipv6_unicast() {
        let frr = compile(concat!(
            "set routing-options autonomous-system 65001\n",
            "set routing-options router-id 10.0.1.1\n",
            "set protocols bgp group v6 type external\n",
            "set protocols bgp group v6 neighbor 2001:db8::2 peer-as 65002\n",
        ))
        .unwrap();
        let bgp = frr.bgp.unwrap();
        assert!(bgp.ipv6_unicast);
        assert!(!bgp.ipv4_unicast);
        assert!(bgp.neighbors[0].is_ipv6);
    }

    #[test]
    fn ospf_networks_come_from_interface_addresses() {
        let frr = compile(concat!(
            "set system host-name ospf-router\n",
            "set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24\n",
            "set interfaces ge-0/0/1 unit 0 family inet address 10.0.2.1/24\n",
            "set routing-options router-id 10.0.1.1\n",
            "set protocols ospf area 0.0.0.0 interface ge-0/0/0\n",
            "set protocols ospf area 0.0.0.0 interface ge-0/0/1 passive\n",
        ))
        .unwrap();
        let ospf = frr.ospf.unwrap();
        assert_eq!(ospf.router_id, "10.0.1.1");

        let networks: Vec<(&str, &str)> = ospf
            .networks
            .iter()
            .map(|n| (n.prefix.as_str(), n.area_id.as_str()))
            .collect();
        assert_eq!(
            networks,
            vec![("10.0.1.0/24", "0.0.0.0"), ("10.0.2.0/24", "0.0.0.0")]
        );

        let names: Vec<&str> = ospf.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ge0-0-0", "ge0-0-1"]);
        assert!(ospf.interfaces[1].passive);
    }

    #[test]
    fn ospf_router_id_falls_back_to_routing_options() {
        let frr = compile(concat!(
            "set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24\n",
            "set routing-options router-id 192.0.2.1\n",
            "set protocols ospf area 0 interface ge-0/0/0\n",
        ))
        .unwrap();
        assert_eq!(frr.ospf.unwrap().router_id, "192.0.2.1");
    }
}
