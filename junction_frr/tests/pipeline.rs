//! End-to-end compilation: source text through parse, validate, generate,
//! and render to frr.conf text.

use junction_frr::{generate_frr_config, generate_frr_config_file};
use pretty_assertions::assert_eq;

fn compile(input: &str) -> String {
    let mut config = junction_config::parse(input).expect("parse failed");
    config.validate().expect("validation failed");
    let frr = generate_frr_config(&config).expect("generation failed");
    generate_frr_config_file(&frr).expect("rendering failed")
}

const ROUTER: &str = "\
set system host-name edge1
set interfaces ge-0/0/0 description \"uplink to core\"
set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24
set interfaces ge-0/0/1 unit 0 family inet address 10.0.2.1/24
set routing-options autonomous-system 65001
set routing-options router-id 10.0.1.1
set routing-options static route 0.0.0.0/0 next-hop 10.0.1.254
set protocols bgp group UPSTREAM type external
set protocols bgp group UPSTREAM import IMPORT-POLICY
set protocols bgp group UPSTREAM neighbor 10.0.1.2 peer-as 65002
set protocols bgp group UPSTREAM neighbor 10.0.1.2 description \"transit provider\"
set protocols ospf area 0.0.0.0 interface ge-0/0/1 passive
set policy-options prefix-list CUSTOMERS 192.0.2.0/24
set policy-options policy-statement IMPORT-POLICY term 10 from prefix-list CUSTOMERS
set policy-options policy-statement IMPORT-POLICY term 10 then accept
";

#[test]
fn full_router_config_compiles_to_expected_stanzas() {
    let text = compile(ROUTER);
    for expected in [
        "hostname edge1",
        "log file /var/log/frr/frr.log",
        "ip route 0.0.0.0/0 10.0.1.254",
        "router bgp 65001",
        " bgp router-id 10.0.1.1",
        " neighbor 10.0.1.2 remote-as 65002",
        " neighbor 10.0.1.2 description \"transit provider\"",
        "  neighbor 10.0.1.2 activate",
        "  neighbor 10.0.1.2 route-map IMPORT-POLICY in",
        "router ospf",
        " ospf router-id 10.0.1.1",
        " network 10.0.2.0/24 area 0.0.0.0",
        "interface ge0-0-1",
        " ip ospf passive",
        "ip prefix-list CUSTOMERS seq 10 permit 192.0.2.0/24",
        "route-map IMPORT-POLICY permit 10",
        " match ip address prefix-list CUSTOMERS",
        "line vty",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in:\n{text}");
    }
}

#[test]
fn mixed_family_prefix_list_splits_in_the_output() {
    let text = compile(
        "set routing-options router-id 10.0.1.1\n\
         set policy-options prefix-list P 10.0.0.0/8\n\
         set policy-options prefix-list P 2001:db8::/32\n\
         set policy-options policy-statement EXPORT term 1 from prefix-list P\n\
         set policy-options policy-statement EXPORT term 1 then accept\n",
    );
    assert!(text.contains("ip prefix-list P seq 10 permit 10.0.0.0/8"));
    assert!(text.contains("ipv6 prefix-list P-v6 seq 10 permit 2001:db8::/32"));
    assert!(text.contains(" match ip address prefix-list P\n"));
    assert!(text.contains(" match ipv6 address prefix-list P-v6\n"));
}

#[test]
fn dangling_policy_reference_fails_generation_naming_the_policy() {
    let config = junction_config::parse(
        "set routing-options autonomous-system 65001\n\
         set routing-options router-id 10.0.1.1\n\
         set protocols bgp group UP type external\n\
         set protocols bgp group UP import NOPE\n\
         set protocols bgp group UP neighbor 10.0.1.2 peer-as 65002\n",
    )
    .expect("parse failed");
    let err = generate_frr_config(&config).expect_err("generation should fail");
    assert!(err.to_string().contains("NOPE"));
}

#[test]
fn compiling_twice_is_byte_identical() {
    assert_eq!(compile(ROUTER), compile(ROUTER));
}

#[test]
fn statement_order_across_named_blocks_does_not_change_output() {
    // Reordering whole named blocks (prefix-lists, groups, interfaces)
    // must not change the output. Order within one block stays put.
    let a = "\
set system host-name r1
set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24
set interfaces ge-0/0/1 unit 0 family inet address 10.0.2.1/24
set routing-options autonomous-system 65001
set routing-options router-id 10.0.1.1
set protocols bgp group A type internal
set protocols bgp group A neighbor 10.0.1.2 peer-as 65001
set protocols bgp group B type external
set protocols bgp group B neighbor 10.0.2.2 peer-as 65002
set policy-options prefix-list ONE 10.0.0.0/8
set policy-options prefix-list TWO 172.16.0.0/12
";
    let b = "\
set routing-options router-id 10.0.1.1
set routing-options autonomous-system 65001
set policy-options prefix-list TWO 172.16.0.0/12
set policy-options prefix-list ONE 10.0.0.0/8
set protocols bgp group B type external
set protocols bgp group B neighbor 10.0.2.2 peer-as 65002
set protocols bgp group A type internal
set protocols bgp group A neighbor 10.0.1.2 peer-as 65001
set interfaces ge-0/0/1 unit 0 family inet address 10.0.2.1/24
set interfaces ge-0/0/0 unit 0 family inet address 10.0.1.1/24
set system host-name r1
";
    assert_eq!(compile(a), compile(b));
}

#[test]
fn hostname_defaults_when_system_is_absent() {
    let text = compile("set routing-options static route 10.0.0.0/8 next-hop 192.0.2.1\n");
    assert!(text.contains("hostname junction-router"));
    assert!(text.contains("ip route 10.0.0.0/8 192.0.2.1"));
}
