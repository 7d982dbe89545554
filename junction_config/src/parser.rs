//! Recursive-descent parser for set-style configuration.
//!
//! Each `set <keyword> ...` statement dispatches on the word after `set`
//! into a dedicated sub-parser. Statements accumulate into one [`Config`]
//! through get-or-create builders, so an entity can be built up across
//! multiple lines. Parsing stops at the first error.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::ConfigError;
use crate::lexer::Lexer;
use crate::model::{
    BgpConfig, BgpGroup, Config, Interface, OspfConfig, PolicyTerm, RoutingOptions, StaticRoute,
};
use crate::token::{Token, TokenKind};

/// Parses a complete configuration from text.
pub fn parse(input: &str) -> Result<Config, ConfigError> {
    Parser::new(input).parse()
}

/// Two-token-lookahead parser over the lexer's stream.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
        }
    }

    /// Parses the whole input into a configuration tree.
    pub fn parse(mut self) -> Result<Config, ConfigError> {
        let mut config = Config::new();

        while self.current.kind != TokenKind::Eof {
            if self.current.kind == TokenKind::Eol {
                self.advance();
                continue;
            }

            self.parse_statement(&mut config)?;

            // Statements may not span multiple lines.
            if self.current.kind != TokenKind::Eol && self.current.kind != TokenKind::Eof {
                return Err(self.error("expected end of line after statement"));
            }
            if self.current.kind == TokenKind::Eol {
                self.advance();
            }
        }

        Ok(config)
    }

    fn advance(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::parse(self.current.line, self.current.column, message)
    }

    /// Fails if the current token is a lexer error, otherwise a no-op.
    fn check_lex_error(&self) -> Result<(), ConfigError> {
        if self.current.kind == TokenKind::Error {
            return Err(ConfigError::lex(
                self.current.line,
                self.current.column,
                self.current.text.clone(),
            ));
        }
        Ok(())
    }

    /// Consumes a word token and returns its text.
    fn word(&mut self, expected: &str) -> Result<String, ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word {
            return Err(self.error(format!("expected {expected}")));
        }
        let text = std::mem::take(&mut self.current.text);
        self.advance();
        Ok(text)
    }

    /// Consumes a word or quoted-string token and returns its text.
    fn word_or_string(&mut self, expected: &str) -> Result<String, ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word && self.current.kind != TokenKind::Str {
            return Err(self.error(format!("expected {expected}")));
        }
        let text = std::mem::take(&mut self.current.text);
        self.advance();
        Ok(text)
    }

    /// Parses the current number token without consuming it, so errors
    /// point at the number rather than the following token.
    fn number_at_current<T: std::str::FromStr>(
        &self,
        expected: &str,
        invalid: &str,
    ) -> Result<T, ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Number {
            return Err(self.error(format!("expected {expected}")));
        }
        self.current
            .text
            .parse::<T>()
            .map_err(|_| self.error(format!("{invalid}: {}", self.current.text)))
    }

    /// Consumes a fixed keyword word token.
    fn keyword(&mut self, keyword: &str, expected: &str) -> Result<(), ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word || self.current.text != keyword {
            return Err(self.error(format!("expected {expected}")));
        }
        self.advance();
        Ok(())
    }

    fn parse_statement(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Set {
            return Err(self.error(format!("expected 'set', got {}", self.current.kind)));
        }
        self.advance();

        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word {
            return Err(self.error(format!(
                "expected keyword after 'set', got {}",
                self.current.kind
            )));
        }
        let keyword = std::mem::take(&mut self.current.text);
        self.advance();

        match keyword.as_str() {
            "system" => self.parse_system(config),
            "interfaces" => self.parse_interfaces(config),
            "routing-options" => self.parse_routing_options(config),
            "protocols" => self.parse_protocols(config),
            "policy-options" => self.parse_policy_options(config),
            "security" => self.parse_security(config),
            other => Err(self.error(format!("unsupported keyword: {other}"))),
        }
    }

    fn parse_system(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let param = self.word("system parameter")?;
        match param.as_str() {
            "host-name" => {
                let hostname = self.word_or_string("hostname value")?;
                config.system_mut().host_name = hostname;
                Ok(())
            }
            other => Err(self.error(format!("unsupported system parameter: {other}"))),
        }
    }

    fn parse_interfaces(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let name = self.word("interface name")?;
        let param = self.word("interface parameter")?;

        let iface = config.interface_mut(&name);
        match param.as_str() {
            "description" => self.parse_interface_description(iface),
            "unit" => self.parse_interface_unit(iface),
            other => Err(self.error(format!("unsupported interface parameter: {other}"))),
        }
    }

    fn parse_interface_description(&mut self, iface: &mut Interface) -> Result<(), ConfigError> {
        iface.description = self.word_or_string("description text")?;
        Ok(())
    }

    fn parse_interface_unit(&mut self, iface: &mut Interface) -> Result<(), ConfigError> {
        let unit_num: u16 = self.number_at_current("unit number", "invalid unit number")?;
        if unit_num > 32767 {
            return Err(self.error(format!("unit number out of range (0-32767): {unit_num}")));
        }
        self.advance();

        self.keyword("family", "'family' keyword")?;
        let family_name = self.word("family name")?;
        self.keyword("address", "'address' keyword")?;
        let address = self.word("IP address in CIDR format")?;

        iface
            .unit_mut(unit_num)
            .family_mut(&family_name)
            .addresses
            .push(address);
        Ok(())
    }

    fn parse_routing_options(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let param = self.word("routing-options parameter")?;
        let ro = config.routing_options_mut();
        match param.as_str() {
            "autonomous-system" => self.parse_autonomous_system(ro),
            "router-id" => {
                ro.router_id = self.word("router-id value")?;
                Ok(())
            }
            "static" => self.parse_static_route(ro),
            other => Err(self.error(format!("unsupported routing-options parameter: {other}"))),
        }
    }

    fn parse_autonomous_system(&mut self, ro: &mut RoutingOptions) -> Result<(), ConfigError> {
        let asn: u32 = self.number_at_current("AS number", "invalid AS number")?;
        if asn == 0 {
            return Err(self.error(format!("AS number out of range (1-4294967295): {asn}")));
        }
        self.advance();
        ro.autonomous_system = asn;
        Ok(())
    }

    fn parse_static_route(&mut self, ro: &mut RoutingOptions) -> Result<(), ConfigError> {
        self.keyword("route", "'route' keyword")?;
        let prefix = self.word("route prefix in CIDR format")?;
        self.keyword("next-hop", "'next-hop' keyword")?;
        let next_hop = self.word("next-hop IP address")?;

        let mut route = StaticRoute {
            prefix,
            next_hop,
            distance: 0,
        };

        if self.current.kind == TokenKind::Word && self.current.text == "distance" {
            self.advance();
            route.distance = self.number_at_current("distance value", "invalid distance value")?;
            self.advance();
        }

        if ro.static_routes.iter().any(|sr| sr.prefix == route.prefix) {
            return Err(self.error(format!("duplicate static route prefix: {}", route.prefix)));
        }
        ro.static_routes.push(route);
        Ok(())
    }

    fn parse_protocols(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let protocol = self.word("protocol name")?;
        let protocols = config.protocols_mut();
        match protocol.as_str() {
            "bgp" => self.parse_bgp(protocols.bgp_mut()),
            "ospf" => self.parse_ospf(protocols.ospf_mut()),
            other => Err(self.error(format!("unsupported protocol: {other}"))),
        }
    }

    fn parse_bgp(&mut self, bgp: &mut BgpConfig) -> Result<(), ConfigError> {
        let param = self.word("BGP parameter")?;
        match param.as_str() {
            "group" => self.parse_bgp_group(bgp),
            other => Err(self.error(format!("unsupported BGP parameter: {other}"))),
        }
    }

    fn parse_bgp_group(&mut self, bgp: &mut BgpConfig) -> Result<(), ConfigError> {
        let group_name = self.word("BGP group name")?;
        let param = self.word("BGP group parameter")?;
        let group = bgp.group_mut(&group_name);

        match param.as_str() {
            "type" => self.parse_bgp_group_type(group),
            "neighbor" => self.parse_bgp_neighbor(group),
            "import" => {
                group.import = self.word("import policy name")?;
                Ok(())
            }
            "export" => {
                group.export = self.word("export policy name")?;
                Ok(())
            }
            other => Err(self.error(format!("unsupported BGP group parameter: {other}"))),
        }
    }

    fn parse_bgp_group_type(&mut self, group: &mut BgpGroup) -> Result<(), ConfigError> {
        let group_type = self.word("group type (internal or external)")?;
        if group_type != "internal" && group_type != "external" {
            return Err(self.error(format!(
                "invalid group type: {group_type} (must be 'internal' or 'external')"
            )));
        }
        group.group_type = group_type;
        Ok(())
    }

    fn parse_bgp_neighbor(&mut self, group: &mut BgpGroup) -> Result<(), ConfigError> {
        let ip = self.word("neighbor IP address")?;
        let param = self.word("neighbor parameter")?;
        let neighbor = group.neighbor_mut(&ip);

        match param.as_str() {
            "peer-as" => {
                let peer_as: u32 =
                    self.number_at_current("peer AS number", "invalid peer AS number")?;
                if peer_as == 0 {
                    return Err(self.error(format!(
                        "peer AS number out of range (1-4294967295): {peer_as}"
                    )));
                }
                self.advance();
                neighbor.peer_as = peer_as;
                Ok(())
            }
            "description" => {
                neighbor.description = self.word_or_string("description text")?;
                Ok(())
            }
            "local-address" => {
                neighbor.local_address = self.word("local address")?;
                Ok(())
            }
            other => Err(self.error(format!("unsupported neighbor parameter: {other}"))),
        }
    }

    fn parse_ospf(&mut self, ospf: &mut OspfConfig) -> Result<(), ConfigError> {
        let param = self.word("OSPF parameter")?;
        match param.as_str() {
            "area" => self.parse_ospf_area(ospf),
            "router-id" => {
                ospf.router_id = self.word("router-id value")?;
                Ok(())
            }
            other => Err(self.error(format!("unsupported OSPF parameter: {other}"))),
        }
    }

    fn parse_ospf_area(&mut self, ospf: &mut OspfConfig) -> Result<(), ConfigError> {
        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word && self.current.kind != TokenKind::Number {
            return Err(self.error("expected area ID"));
        }
        let area_id = std::mem::take(&mut self.current.text);
        self.advance();

        self.keyword("interface", "'interface' keyword")?;
        let if_name = self.word("interface name")?;

        let ospf_if = ospf.area_mut(&area_id).interface_mut(&if_name);

        // Optional trailing parameters; anything else ends the statement.
        while self.current.kind == TokenKind::Word {
            match self.current.text.as_str() {
                "passive" => {
                    self.advance();
                    ospf_if.passive = true;
                }
                "metric" => {
                    self.advance();
                    ospf_if.metric =
                        self.number_at_current("metric value", "invalid metric value")?;
                    self.advance();
                }
                "priority" => {
                    self.advance();
                    let priority: u8 =
                        self.number_at_current("priority value", "invalid priority value")?;
                    ospf_if.priority = Some(priority);
                    self.advance();
                }
                _ => break,
            }
        }

        Ok(())
    }

    fn parse_policy_options(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let param = self.word("policy-options parameter")?;
        match param.as_str() {
            "prefix-list" => self.parse_prefix_list(config),
            "policy-statement" => self.parse_policy_statement(config),
            other => Err(self.error(format!("unsupported policy-options parameter: {other}"))),
        }
    }

    fn parse_prefix_list(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let list_name = self.word("prefix-list name")?;

        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word {
            return Err(self.error("expected prefix value"));
        }
        let prefix = self.current.text.clone();
        if let Err(err) = validate_cidr(&prefix) {
            return Err(self.error(format!("invalid prefix \"{prefix}\": {err}")));
        }
        self.advance();

        config
            .policy_options_mut()
            .prefix_list_mut(&list_name)
            .prefixes
            .push(prefix);
        Ok(())
    }

    fn parse_policy_statement(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let policy_name = self.word("policy-statement name")?;
        self.keyword("term", "'term' keyword")?;
        let term_name = self.word("term name")?;

        let term = config
            .policy_options_mut()
            .policy_statement_mut(&policy_name)
            .term_mut(&term_name);

        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word {
            return Err(self.error("expected 'from' or 'then' keyword"));
        }
        let clause = std::mem::take(&mut self.current.text);
        self.advance();

        match clause.as_str() {
            "from" => self.parse_policy_match_conditions(term),
            "then" => self.parse_policy_actions(term),
            other => Err(self.error(format!("expected 'from' or 'then', got '{other}'"))),
        }
    }

    fn parse_policy_match_conditions(&mut self, term: &mut PolicyTerm) -> Result<(), ConfigError> {
        let condition = self.word("match condition")?;
        match condition.as_str() {
            "prefix-list" => {
                let list_name = self.word("prefix-list name")?;
                term.from_mut().prefix_lists.push(list_name);
                Ok(())
            }
            "protocol" => {
                self.check_lex_error()?;
                if self.current.kind != TokenKind::Word {
                    return Err(self.error("expected protocol name"));
                }
                let protocol = self.current.text.clone();
                if let Err(err) = validate_protocol(&protocol) {
                    return Err(self.error(format!("invalid protocol: {err}")));
                }
                self.advance();
                term.from_mut().protocol = protocol;
                Ok(())
            }
            "neighbor" => {
                self.check_lex_error()?;
                if self.current.kind != TokenKind::Word {
                    return Err(self.error("expected neighbor IP"));
                }
                let neighbor = self.current.text.clone();
                if validate_ip(&neighbor).is_err() {
                    return Err(self.error(format!(
                        "invalid neighbor IP \"{neighbor}\": invalid IP address format"
                    )));
                }
                self.advance();
                term.from_mut().neighbor = neighbor;
                Ok(())
            }
            "as-path" => {
                let as_path = self.word_or_string("AS path pattern")?;
                term.from_mut().as_path = as_path;
                Ok(())
            }
            other => Err(self.error(format!("unsupported match condition: {other}"))),
        }
    }

    fn parse_policy_actions(&mut self, term: &mut PolicyTerm) -> Result<(), ConfigError> {
        let action = self.word("action")?;
        match action.as_str() {
            "accept" => {
                term.then_mut().accept = Some(true);
                Ok(())
            }
            "reject" => {
                term.then_mut().accept = Some(false);
                Ok(())
            }
            "local-preference" => {
                let value: u32 = self
                    .number_at_current("local-preference value", "invalid local-preference value")?;
                self.advance();
                term.then_mut().local_preference = Some(value);
                Ok(())
            }
            "community" => {
                self.check_lex_error()?;
                if self.current.kind != TokenKind::Word && self.current.kind != TokenKind::Str {
                    return Err(self.error("expected community value"));
                }
                let community = self.current.text.clone();
                if let Err(err) = validate_community(&community) {
                    return Err(self.error(format!("invalid community: {err}")));
                }
                self.advance();
                term.then_mut().community = community;
                Ok(())
            }
            other => Err(self.error(format!("unsupported action: {other}"))),
        }
    }

    fn parse_security(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let param = self.word("security parameter")?;
        match param.as_str() {
            "netconf" => self.parse_security_netconf(config),
            "users" => self.parse_security_users(config),
            "rate-limit" => self.parse_security_rate_limit(config),
            other => Err(self.error(format!("unsupported security parameter: {other}"))),
        }
    }

    fn parse_security_netconf(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        self.keyword("ssh", "'ssh' after 'netconf'")?;
        self.keyword("port", "'port' after 'ssh'")?;

        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word && self.current.kind != TokenKind::Number {
            return Err(self.error("expected port number"));
        }
        let port: u16 = self
            .current
            .text
            .parse()
            .map_err(|_| self.error(format!("invalid port number: {}", self.current.text)))?;
        if port == 0 {
            return Err(self.error(format!("port number out of range: {port}")));
        }
        self.advance();

        config.security_mut().netconf_mut().ssh_port = port;
        Ok(())
    }

    fn parse_security_users(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        self.keyword("user", "'user' after 'users'")?;
        let username = self.word("username")?;
        let param = self.word("user parameter (password, role, ssh-key)")?;

        let user = config.security_mut().user_mut(&username);
        match param.as_str() {
            "password" => {
                user.password = self.word("password value")?;
                Ok(())
            }
            "role" => {
                let role = self.word("role value")?;
                if role != "admin" && role != "operator" && role != "read-only" {
                    return Err(self.error(format!(
                        "invalid role: {role} (must be admin, operator, or read-only)"
                    )));
                }
                user.role = role;
                Ok(())
            }
            "ssh-key" => {
                self.check_lex_error()?;
                if self.current.kind != TokenKind::Str {
                    return Err(self.error("expected SSH key string"));
                }
                user.ssh_key = std::mem::take(&mut self.current.text);
                self.advance();
                Ok(())
            }
            other => Err(self.error(format!("unsupported user parameter: {other}"))),
        }
    }

    fn parse_security_rate_limit(&mut self, config: &mut Config) -> Result<(), ConfigError> {
        let param = self.word("rate-limit parameter")?;

        self.check_lex_error()?;
        if self.current.kind != TokenKind::Word && self.current.kind != TokenKind::Number {
            return Err(self.error("expected rate limit value"));
        }
        let limit: u16 = self
            .current
            .text
            .parse()
            .map_err(|_| self.error(format!("invalid rate limit: {}", self.current.text)))?;
        if !(1..=1000).contains(&limit) {
            return Err(self.error(format!("rate limit out of range: {limit} (must be 1-1000)")));
        }
        self.advance();

        let rate_limit = config.security_mut().rate_limit_mut();
        match param.as_str() {
            "per-ip" => rate_limit.per_ip = limit,
            "per-user" => rate_limit.per_user = limit,
            other => {
                return Err(self.error(format!("unsupported rate-limit parameter: {other}")));
            }
        }
        Ok(())
    }
}

fn validate_cidr(prefix: &str) -> Result<(), String> {
    prefix
        .parse::<IpNet>()
        .map(|_| ())
        .map_err(|_| "invalid CIDR format".to_owned())
}

fn validate_protocol(protocol: &str) -> Result<(), String> {
    const VALID: [&str; 8] = [
        "bgp",
        "ospf",
        "ospf3",
        "static",
        "connected",
        "direct",
        "kernel",
        "rip",
    ];
    if VALID.contains(&protocol) {
        Ok(())
    } else {
        Err(format!(
            "unknown protocol \"{protocol}\", valid values: bgp, ospf, ospf3, static, connected, direct, kernel, rip"
        ))
    }
}

fn validate_ip(ip: &str) -> Result<(), String> {
    ip.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| "invalid IP address format".to_owned())
}

fn validate_community(community: &str) -> Result<(), String> {
    const WELL_KNOWN: [&str; 4] = ["no-export", "no-advertise", "local-AS", "no-peer"];
    if WELL_KNOWN.contains(&community) {
        return Ok(());
    }

    let valid = community
        .split_once(':')
        .is_some_and(|(asn, value)| asn.parse::<u32>().is_ok() && value.parse::<u32>().is_ok());
    if valid {
        Ok(())
    } else {
        Err(format!(
            "invalid community format \"{community}\", expected ASN:value or well-known community (no-export, no-advertise, local-AS, no-peer)"
        ))
    }
}
