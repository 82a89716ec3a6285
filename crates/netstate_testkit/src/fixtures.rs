//! Fixture documents and native outcomes.

use crate::double::Outcome;
use netstate_core::NISPOR_FAIL;
use serde_json::json;

/// Minimal single-interface snapshot.
pub const ETH0_STATE: &str = r#"{"interfaces":[{"name":"eth0","state":"up"}]}"#;

/// A snapshot shaped like libnispor output, with interfaces, routes and
/// route rules.
pub fn sample_state() -> String {
    json!({
        "ifaces": {
            "lo": {
                "name": "lo",
                "iface_type": "loopback",
                "state": "unknown",
                "mtu": 65536,
                "flags": ["loopback", "running", "up", "lower_up"],
                "ipv4": {"addresses": [{"address": "127.0.0.1", "prefix_len": 8}]},
                "ipv6": {"addresses": [{"address": "::1", "prefix_len": 128}]},
                "mac_address": "00:00:00:00:00:00"
            },
            "eth0": {
                "name": "eth0",
                "iface_type": "ethernet",
                "state": "up",
                "mtu": 1500,
                "flags": ["broadcast", "lower_up", "multicast", "running", "up"],
                "ipv4": {"addresses": [{"address": "192.0.2.10", "prefix_len": 24}]},
                "mac_address": "52:54:00:12:34:56"
            }
        },
        "routes": [
            {"address_family": "ipv4", "dst": "0.0.0.0/0", "oif": "eth0", "gateway": "192.0.2.1", "table": 254}
        ],
        "rules": []
    })
    .to_string()
}

/// A successful call returning [`ETH0_STATE`].
pub fn eth0_success() -> Outcome {
    Outcome::success(ETH0_STATE)
}

/// A failed call reporting `InvalidArgument: bad filter`.
pub fn invalid_argument() -> Outcome {
    Outcome::failure(NISPOR_FAIL, "InvalidArgument", "bad filter")
}

/// A failed call reporting a netlink permission problem.
pub fn permission_denied() -> Outcome {
    Outcome::failure(NISPOR_FAIL, "PermissionDeny", "Operation not permitted")
}

/// A successful return code with every buffer populated.
pub fn success_with_error_buffers() -> Outcome {
    eth0_success()
        .with_err_kind(b"NisporBug".to_vec())
        .with_err_msg(b"stale error".to_vec())
}

/// A failure return code that still carries a state payload.
pub fn failure_with_state() -> Outcome {
    invalid_argument().with_state(ETH0_STATE.as_bytes().to_vec())
}

/// A successful call whose payload is not UTF-8.
pub fn invalid_utf8_state() -> Outcome {
    Outcome::bare_failure(0).with_state(vec![b'{', 0xff, 0xfe, b'}'])
}
