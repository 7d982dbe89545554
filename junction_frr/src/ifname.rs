//! Junos-to-Linux interface name mapping.
//!
//! Physical names like `ge-0/0/0` become `ge0-0-0`; the separator scheme
//! keeps `ge-1/11/1` and `ge-11/1/1` distinct. A `.N` unit suffix becomes
//! `vN`. Names with no physical structure (`ae0`, `lo0`, `irb`, `fxp0`)
//! pass through unchanged. Results never exceed the Linux IFNAMSIZ limit;
//! overlong names get a truncated prefix plus a deterministic hash suffix.

use std::sync::LazyLock;

use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::FrrError;

/// Maximum length for Linux interface names (IFNAMSIZ - 1).
pub const MAX_LINUX_IFNAME_LEN: usize = 15;

const HASH_SUFFIX_LEN: usize = 5;

static PHYSICAL_IFNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)-(\d+)/(\d+)/(\d+)(?:\.(\d+))?$").expect("valid regex")
});

/// Converts a source interface name to its Linux equivalent.
pub fn linux_ifname(name: &str) -> Result<String, FrrError> {
    if name.is_empty() {
        return Err(FrrError::invalid("empty interface name"));
    }

    let Some(captures) = PHYSICAL_IFNAME.captures(name) else {
        // ae0, lo0, irb, fxp0 and friends already fit Linux naming.
        if name.len() <= MAX_LINUX_IFNAME_LEN {
            return Ok(name.to_owned());
        }
        return Ok(hashed_name(name, name));
    };

    let if_type = &captures[1];
    let fpc = &captures[2];
    let pic = &captures[3];
    let port = &captures[4];

    let mut linux = format!("{if_type}{fpc}-{pic}-{port}");
    if let Some(vlan) = captures.get(5) {
        linux.push('v');
        linux.push_str(vlan.as_str());
    }

    if linux.len() <= MAX_LINUX_IFNAME_LEN {
        return Ok(linux);
    }
    Ok(hashed_name(name, if_type))
}

/// Builds `<prefix><hash>` capped at the Linux limit. The hash is derived
/// from the full source name, so the result is stable and collision
/// resistant even after truncation.
fn hashed_name(source: &str, prefix: &str) -> String {
    let hash = xxh3_64(source.as_bytes());
    let suffix = format!("{hash:016x}");
    let suffix = &suffix[..HASH_SUFFIX_LEN];

    let max_prefix = MAX_LINUX_IFNAME_LEN - HASH_SUFFIX_LEN;
    let prefix = if prefix.len() > max_prefix {
        &prefix[..max_prefix]
    } else {
        prefix
    };
    format!("{prefix}{suffix}")
}
