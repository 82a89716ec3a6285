//! Property-based test generators using proptest.

use crate::double::Outcome;
use proptest::prelude::*;
use serde_json::json;

/// Generates an interface name.
pub fn arb_iface_name() -> impl Strategy<Value = String> {
    "[a-z]{2,5}[0-9]{0,2}"
}

/// Generates a small JSON snapshot with a handful of interfaces.
pub fn arb_state_json() -> impl Strategy<Value = String> {
    prop::collection::vec((arb_iface_name(), prop::bool::ANY), 0..6).prop_map(|ifaces| {
        let ifaces: Vec<_> = ifaces
            .into_iter()
            .map(|(name, up)| {
                let state = if up { "up" } else { "down" };
                json!({ "name": name, "state": state })
            })
            .collect();
        json!({ "interfaces": ifaces }).to_string()
    })
}

/// Generates a diagnostic string without NUL bytes.
pub fn arb_diagnostic() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _:.-]{0,40}"
}

/// Generates a non-zero return code.
pub fn arb_failure_code() -> impl Strategy<Value = i32> {
    prop_oneof![Just(1), 2..=255i32, i32::MIN..0]
}

/// Generates a native outcome, including ones that break the documented
/// contract by populating buffers that do not match the return code.
pub fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        arb_state_json().prop_map(|state| Outcome::success(state)),
        (
            arb_failure_code(),
            prop::option::of(arb_diagnostic()),
            prop::option::of(arb_diagnostic())
        )
            .prop_map(|(code, kind, message)| {
                let mut outcome = Outcome::bare_failure(code);
                outcome.err_kind = kind.map(String::into_bytes);
                outcome.err_msg = message.map(String::into_bytes);
                outcome
            }),
        (
            any::<i32>(),
            prop::option::of(arb_state_json()),
            prop::option::of(arb_diagnostic()),
            prop::option::of(arb_diagnostic())
        )
            .prop_map(|(code, state, kind, message)| Outcome {
                code,
                state: state.map(String::into_bytes),
                err_kind: kind.map(String::into_bytes),
                err_msg: message.map(String::into_bytes),
                delay: None,
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_state_is_json(state in arb_state_json()) {
            let value: serde_json::Value = serde_json::from_str(&state).unwrap();
            prop_assert!(value["interfaces"].is_array());
        }

        #[test]
        fn failure_codes_are_non_zero(code in arb_failure_code()) {
            prop_assert_ne!(code, 0);
        }

        #[test]
        fn diagnostics_have_no_nul(text in arb_diagnostic()) {
            prop_assert!(!text.contains('\0'));
        }
    }
}
