use log::warn;
use regex::{RegexSet, RegexSetBuilder};
use std::sync::OnceLock;

/// Patterns that mark an adapter as virtual or tunnel, matched case-insensitively
/// against the interface name and description. Tunnel devices only count as a
/// whole name (`tun0`, `utun3`, `tap1`) or a separate word (`TAP-Windows`).
const VIRTUAL_ADAPTER_PATTERNS: &[&str] = &[
    r"virtual",
    r"vmware",
    r"vmnet",
    r"vbox",
    r"hyper-v",
    r"vethernet",
    r"docker",
    r"veth",
    r"virbr",
    r"wsl",
    r"pseudo",
    r"teredo",
    r"isatap",
    r"tailscale",
    r"zerotier",
    r"^(?:u?tun|tap)\d*$",
    r"\b(?:tun|tap)\b",
];

fn virtual_adapter_patterns() -> Option<&'static RegexSet> {
    static PATTERNS: OnceLock<Option<RegexSet>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            RegexSetBuilder::new(VIRTUAL_ADAPTER_PATTERNS)
                .case_insensitive(true)
                .build()
                .map_err(|e| warn!("Invalid virtual adapter pattern: {}", e))
                .ok()
        })
        .as_ref()
}

pub fn is_virtual_adapter(name: &str, description: &str) -> bool {
    match virtual_adapter_patterns() {
        Some(patterns) => patterns.is_match(name) || patterns.is_match(description),
        None => false,
    }
}
