//! Policy translation: prefix-lists and policy-statements into FRR
//! prefix-lists, route-maps, and generated AS-path access-lists.

use std::collections::BTreeMap;

use ipnet::IpNet;
use junction_config::{PolicyOptions, PolicyStatement, PrefixList};

use crate::model::{
    FrrAsPathAccessList, FrrAsPathEntry, FrrPrefixList, FrrPrefixListEntry, FrrRouteMap,
    FrrRouteMapEntry, RouteAction,
};

/// Output of one policy translation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyArtifacts {
    pub prefix_lists: Vec<FrrPrefixList>,
    pub route_maps: Vec<FrrRouteMap>,
    pub as_path_lists: Vec<FrrAsPathAccessList>,
}

/// Translates policy-options into FRR artifacts. Absent policy-options
/// produce empty artifacts.
pub fn translate_policy_options(policy: Option<&PolicyOptions>) -> PolicyArtifacts {
    let Some(policy) = policy else {
        return PolicyArtifacts::default();
    };

    let (prefix_lists, v6_names) = convert_prefix_lists(&policy.prefix_lists);
    let (route_maps, as_path_lists) =
        convert_policy_statements(&policy.policy_statements, &v6_names);

    PolicyArtifacts {
        prefix_lists,
        route_maps,
        as_path_lists,
    }
}

/// Partitions each prefix-list by address family. A list containing both
/// families is split: the IPv4 half keeps the original name and the IPv6
/// half is renamed `<name>-v6`, with the rename recorded so route-map
/// references can be expanded. Sequence numbers restart per emitted list
/// at 10, 20, 30, ...
fn convert_prefix_lists(
    lists: &BTreeMap<String, PrefixList>,
) -> (Vec<FrrPrefixList>, BTreeMap<String, String>) {
    let mut out = Vec::new();
    let mut v6_names = BTreeMap::new();

    for (name, list) in lists {
        let (v4, v6): (Vec<&String>, Vec<&String>) = list
            .prefixes
            .iter()
            .partition(|prefix| !is_ipv6_prefix(prefix));

        if !v4.is_empty() {
            out.push(FrrPrefixList {
                name: name.clone(),
                is_ipv6: false,
                entries: numbered_entries(&v4),
            });
        }

        if !v6.is_empty() {
            let v6_name = if v4.is_empty() {
                name.clone()
            } else {
                let renamed = format!("{name}-v6");
                v6_names.insert(name.clone(), renamed.clone());
                renamed
            };
            out.push(FrrPrefixList {
                name: v6_name,
                is_ipv6: true,
                entries: numbered_entries(&v6),
            });
        }
    }

    (out, v6_names)
}

fn numbered_entries(prefixes: &[&String]) -> Vec<FrrPrefixListEntry> {
    prefixes
        .iter()
        .enumerate()
        .map(|(i, prefix)| FrrPrefixListEntry {
            seq: (i as u32 + 1) * 10,
            action: RouteAction::Permit,
            prefix: (*prefix).clone(),
        })
        .collect()
}

/// Converts policy-statements to route-maps. Statement names come out in
/// sorted order; terms keep their source order. Each `from as-path` regex
/// becomes a fresh `AS-PATH-<n>` access-list, with `<n>` counted across
/// the whole call.
fn convert_policy_statements(
    statements: &BTreeMap<String, PolicyStatement>,
    v6_names: &BTreeMap<String, String>,
) -> (Vec<FrrRouteMap>, Vec<FrrAsPathAccessList>) {
    let mut route_maps = Vec::new();
    let mut as_path_lists = Vec::new();
    let mut as_path_counter = 1u32;

    for (name, statement) in statements {
        let mut entries = Vec::with_capacity(statement.terms.len());

        for (i, term) in statement.terms.iter().enumerate() {
            let mut entry = FrrRouteMapEntry {
                seq: (i as u32 + 1) * 10,
                // Terms without an explicit reject permit by default.
                action: match term.then.as_ref().and_then(|t| t.accept) {
                    Some(false) => RouteAction::Deny,
                    _ => RouteAction::Permit,
                },
                ..FrrRouteMapEntry::default()
            };

            if let Some(from) = &term.from {
                for list_name in &from.prefix_lists {
                    entry.match_prefix_lists.push(list_name.clone());
                    if let Some(v6_name) = v6_names.get(list_name) {
                        entry.match_prefix_lists.push(v6_name.clone());
                    }
                }
                entry.match_protocol = from.protocol.clone();
                entry.match_neighbor = from.neighbor.clone();

                if !from.as_path.is_empty() {
                    let list_name = format!("AS-PATH-{as_path_counter}");
                    as_path_counter += 1;
                    as_path_lists.push(FrrAsPathAccessList {
                        name: list_name.clone(),
                        entries: vec![FrrAsPathEntry {
                            seq: 10,
                            action: RouteAction::Permit,
                            regex: from.as_path.clone(),
                        }],
                    });
                    entry.match_as_path = list_name;
                }
            }

            if let Some(then) = &term.then {
                entry.set_local_preference = then.local_preference;
                entry.set_community = then.community.clone();
            }

            entries.push(entry);
        }

        route_maps.push(FrrRouteMap {
            name: name.clone(),
            entries,
        });
    }

    (route_maps, as_path_lists)
}

fn is_ipv6_prefix(prefix: &str) -> bool {
    matches!(prefix.parse::<IpNet>(), Ok(IpNet::V6(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_config::parse;

    fn artifacts(input: &str) -> PolicyArtifacts {
        let config = parse(input).expect("parse failed");
        translate_policy_options(config.policy_options.as_ref())
    }

    #[test]
    fn absent_policy_options_produce_empty_artifacts() {
        assert_eq!(translate_policy_options(None), PolicyArtifacts::default());
    }

    #[test]
    fn sequence_numbers_step_by_ten() {
        let artifacts = artifacts(concat!(
            "set policy-options prefix-list P 10.0.0.0/8\n",
            "set policy-options prefix-list P 172.16.0.0/12\n",
            "set policy-options prefix-list P 192.168.0.0/16\n",
        ));
        let seqs: Vec<u32> = artifacts.prefix_lists[0]
            .entries
            .iter()
            .map(|e| e.seq)
            .collect();
        assert_eq!(seqs, vec![10, 20, 30]);
    }

    #[test]
    fn mixed_family_list_splits_with_v6_rename() {
        let artifacts = artifacts(concat!(
            "set policy-options prefix-list P 10.0.0.0/8\n",
            "set policy-options prefix-list P 2001:db8::/32\n",
            "set policy-options policy-statement EXPORT term 10 from prefix-list P\n",
            "set policy-options policy-statement EXPORT term 10 then accept\n",
        ));

        let names: Vec<(&str, bool)> = artifacts
            .prefix_lists
            .iter()
            .map(|pl| (pl.name.as_str(), pl.is_ipv6))
            .collect();
        assert_eq!(names, vec![("P", false), ("P-v6", true)]);

        // The route-map reference expands to both variants.
        let entry = &artifacts.route_maps[0].entries[0];
        assert_eq!(
            entry.match_prefix_lists,
            vec!["P".to_owned(), "P-v6".to_owned()]
        );
    }

    #[test]
    fn pure_ipv6_list_keeps_its_name() {
        let artifacts = artifacts("set policy-options prefix-list V6ONLY 2001:db8::/32\n");
        assert_eq!(artifacts.prefix_lists[0].name, "V6ONLY");
        assert!(artifacts.prefix_lists[0].is_ipv6);
    }

    #[test]
    fn term_without_action_defaults_to_permit() {
        let artifacts =
            artifacts("set policy-options policy-statement P term 1 from protocol static\n");
        assert_eq!(
            artifacts.route_maps[0].entries[0].action,
            RouteAction::Permit
        );
    }

    #[test]
    fn reject_becomes_deny() {
        let artifacts = artifacts(concat!(
            "set policy-options policy-statement P term 1 then accept\n",
            "set policy-options policy-statement P term 2 then reject\n",
        ));
        let actions: Vec<RouteAction> = artifacts.route_maps[0]
            .entries
            .iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![RouteAction::Permit, RouteAction::Deny]);
    }

    #[test]
    fn as_path_counter_spans_statements() {
        let artifacts = artifacts(concat!(
            "set policy-options policy-statement A term 1 from as-path \"^65002 \"\n",
            "set policy-options policy-statement B term 1 from as-path \"65003$\"\n",
        ));

        let names: Vec<&str> = artifacts
            .as_path_lists
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["AS-PATH-1", "AS-PATH-2"]);
        // Statements iterate in sorted order, so A gets the first list.
        assert_eq!(artifacts.route_maps[0].name, "A");
        assert_eq!(artifacts.route_maps[0].entries[0].match_as_path, "AS-PATH-1");
        assert_eq!(artifacts.route_maps[1].entries[0].match_as_path, "AS-PATH-2");
    }

    #[test]
    fn set_actions_copy_through() {
        let artifacts = artifacts(concat!(
            "set policy-options policy-statement P term 1 then local-preference 200\n",
            "set policy-options policy-statement P term 1 then community 65001:100\n",
        ));
        let entry = &artifacts.route_maps[0].entries[0];
        assert_eq!(entry.set_local_preference, Some(200));
        assert_eq!(entry.set_community, "65001:100");
    }
}
