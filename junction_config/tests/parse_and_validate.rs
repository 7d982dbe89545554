use junction_config::{ConfigError, parse};
use pretty_assertions::assert_eq;

const ROUTER_CONFIG: &str = "\
# edge router
set system host-name edge1
set interfaces ge-0/0/0 description \"uplink to core\"
set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24
set interfaces ge-0/0/0 unit 0 family inet6 address 2001:db8:1::1/64
set interfaces lo0 unit 0 family inet address 192.0.2.1/32
set routing-options autonomous-system 65001
set routing-options router-id 192.0.2.1
set routing-options static route 0.0.0.0/0 next-hop 10.0.1.254
set protocols bgp group transit type external
set protocols bgp group transit neighbor 10.0.1.2 peer-as 65002
set protocols bgp group transit neighbor 10.0.1.2 description \"Transit A\"
set protocols ospf area 0.0.0.0 interface ge-0/0/0
set protocols ospf area 0.0.0.0 interface lo0 passive
set policy-options prefix-list CUSTOMERS 198.51.100.0/24
set policy-options policy-statement EXPORT-CUSTOMERS term 10 from prefix-list CUSTOMERS
set policy-options policy-statement EXPORT-CUSTOMERS term 10 then accept
";

#[test]
fn full_router_config_parses_and_validates() {
    let mut config = parse(ROUTER_CONFIG).expect("parse failed");
    config.validate().expect("validation failed");

    assert_eq!(config.system.as_ref().unwrap().host_name, "edge1");
    assert_eq!(config.interfaces.len(), 2);
    assert_eq!(
        config.interfaces["ge-0/0/0"].description,
        "uplink to core"
    );

    let ro = config.routing_options.as_ref().unwrap();
    assert_eq!(ro.autonomous_system, 65001);
    assert_eq!(ro.static_routes.len(), 1);

    let protocols = config.protocols.as_ref().unwrap();
    let group = &protocols.bgp.as_ref().unwrap().groups["transit"];
    assert_eq!(group.neighbors["10.0.1.2"].description, "Transit A");
    let area = &protocols.ospf.as_ref().unwrap().areas["0.0.0.0"];
    assert!(area.interfaces["lo0"].passive);

    let policies = config.policy_options.as_ref().unwrap();
    assert_eq!(
        policies.prefix_lists["CUSTOMERS"].prefixes,
        vec!["198.51.100.0/24".to_owned()]
    );
}

#[test]
fn parse_then_validate_is_repeatable() {
    let mut first = parse(ROUTER_CONFIG).unwrap();
    let mut second = parse(ROUTER_CONFIG).unwrap();
    first.validate().unwrap();
    second.validate().unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_dump_round_trips_through_serde() {
    let mut config = parse(ROUTER_CONFIG).unwrap();
    config.validate().unwrap();

    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: junction_config::Config = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);
}

#[test]
fn first_error_wins_across_stages() {
    // A file that is both syntactically and semantically broken reports
    // the parse error, never the validation error.
    let err = parse(concat!(
        "set interfaces eth0 unit 0 family inet address 10.0.0.1/24\n",
        "set bogus\n",
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("unsupported keyword: bogus"));
}
