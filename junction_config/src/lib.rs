//! Parser and semantic validator for set-style router configuration.
//!
//! This crate provides:
//! - a lexer over `set ...` statement text ([`lexer::Lexer`])
//! - a recursive-descent parser building a configuration tree ([`parse`])
//! - a semantic validator ([`Config::validate`])
//!
//! Parsing and validation fail fast: the first error aborts and is returned
//! as a structured [`ConfigError`] with a code, cause, and suggested action.
//!
//! # Example
//!
//! ```rust
//! let mut config = junction_config::parse(
//!     "set system host-name r1\n\
//!      set interfaces ge-0/0/0 unit 0 family inet address 10.0.0.1/24\n",
//! )?;
//! config.validate()?;
//! assert_eq!(config.system.as_ref().unwrap().host_name, "r1");
//! # Ok::<(), junction_config::ConfigError>(())
//! ```

pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod token;
mod validate;

pub use error::ConfigError;
pub use model::{
    BgpConfig, BgpGroup, BgpNeighbor, Config, Family, Interface, MatchConditions, NetconfConfig,
    OspfArea, OspfConfig, OspfInterface, PolicyActions, PolicyOptions, PolicyStatement, PolicyTerm,
    PrefixList, Protocols, RateLimit, RoutingOptions, Security, StaticRoute, SystemConfig, Unit,
    User,
};
pub use parser::parse;
pub use validate::DEFAULT_HOSTNAME;
