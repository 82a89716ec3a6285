//! Retrieval tests against the counting native double.

use netstate_core::{retrieve_with_timeout, NetStateError, NetStateRetriever, NISPOR_FAIL};
use netstate_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn returns_fixed_document_verbatim() {
    let native = CountingNative::new(eth0_success());
    let retriever = NetStateRetriever::new(&native);

    let state = retriever.retrieve().unwrap();
    assert_eq!(state, r#"{"interfaces":[{"name":"eth0","state":"up"}]}"#);

    let report = native.report();
    assert_eq!(report.allocated, 1);
    assert_eq!(report.freed, 1);
    assert!(report.is_balanced());
}

#[test]
fn success_payload_is_json() {
    let native = CountingNative::new(Outcome::success(sample_state()));
    let retriever = NetStateRetriever::new(&native);

    let state = retriever.retrieve().unwrap();
    assert!(!state.is_empty());
    let value: serde_json::Value = serde_json::from_str(&state).unwrap();
    assert_eq!(value["ifaces"]["eth0"]["state"], "up");
}

#[test]
fn failure_carries_code_kind_and_message() {
    let native = CountingNative::new(invalid_argument());
    let retriever = NetStateRetriever::new(&native);

    let err = retriever.retrieve().unwrap_err();
    match &err {
        NetStateError::Native {
            code,
            kind,
            message,
        } => {
            assert_eq!(
                (*code, kind.as_deref(), message.as_deref()),
                (1, Some("InvalidArgument"), Some("bad filter"))
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), Some(1));
    assert_eq!(err.kind(), Some("InvalidArgument"));
    assert_eq!(err.message(), Some("bad filter"));
    assert!(native.report().is_balanced());
}

#[test]
fn failure_code_is_passed_through() {
    for code in [NISPOR_FAIL, 2, 22, -1, i32::MAX] {
        let native = CountingNative::new(Outcome::failure(code, "NetlinkError", "boom"));
        let err = NetStateRetriever::new(&native).retrieve().unwrap_err();
        assert_eq!(err.code(), Some(code));
        assert!(native.report().is_balanced());
    }
}

#[test]
fn failure_with_null_diagnostics() {
    let native = CountingNative::new(Outcome::bare_failure(3));
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();

    assert_eq!(err.code(), Some(3));
    assert!(err.kind().is_none());
    assert!(err.message().is_none());
    assert_eq!(err.to_string(), "failed retrieving net state with rc 3");

    let report = native.report();
    assert_eq!(report.allocated, 0);
    assert_eq!(report.null_frees, 0);
    assert!(report.is_balanced());
}

#[test]
fn failure_with_only_message() {
    let native = CountingNative::new(Outcome::bare_failure(1).with_err_msg(b"no kind".to_vec()));
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();

    assert!(err.kind().is_none());
    assert_eq!(err.message(), Some("no kind"));
    assert!(native.report().is_balanced());
}

#[test]
fn success_with_error_buffers_frees_everything() {
    let native = CountingNative::new(success_with_error_buffers());
    let state = NetStateRetriever::new(&native).retrieve().unwrap();

    assert_eq!(state, ETH0_STATE);
    let report = native.report();
    assert_eq!(report.allocated, 3);
    assert_eq!(report.freed, 3);
    assert!(report.is_balanced());
}

#[test]
fn failure_with_state_frees_everything() {
    let native = CountingNative::new(failure_with_state());
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();

    assert_eq!(err.code(), Some(1));
    let report = native.report();
    assert_eq!(report.freed, 3);
    assert!(report.is_balanced());
}

#[test]
fn missing_payload_is_an_error() {
    let native = CountingNative::new(Outcome::bare_failure(0));
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();
    assert!(matches!(err, NetStateError::MissingState));

    let native = CountingNative::new(Outcome::success(""));
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();
    assert!(matches!(err, NetStateError::MissingState));
    assert!(native.report().is_balanced());
}

#[test]
fn invalid_utf8_payload_still_frees() {
    let native = CountingNative::new(invalid_utf8_state());
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();

    assert!(matches!(err, NetStateError::InvalidUtf8(_)));
    let report = native.report();
    assert_eq!(report.allocated, 1);
    assert!(report.is_balanced());
}

#[test]
fn lossy_diagnostics() {
    let native = CountingNative::new(
        Outcome::bare_failure(1)
            .with_err_kind(b"Bad\xffKind".to_vec())
            .with_err_msg(b"msg".to_vec()),
    );
    let err = NetStateRetriever::new(&native).retrieve().unwrap_err();
    assert_eq!(err.kind(), Some("Bad\u{fffd}Kind"));
    assert!(native.report().is_balanced());
}

#[test]
fn mixed_calls_stay_balanced() {
    let native = CountingNative::scripted([
        eth0_success(),
        invalid_argument(),
        Outcome::bare_failure(5),
        success_with_error_buffers(),
        failure_with_state(),
        invalid_utf8_state(),
        permission_denied(),
    ]);
    let retriever = NetStateRetriever::new(&native);

    let results: Vec<_> = (0..7).map(|_| retriever.retrieve()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);

    let report = native.report();
    assert_eq!(report.calls, 7);
    assert_eq!(report.allocated, 1 + 2 + 0 + 3 + 3 + 1 + 2);
    assert!(report.is_balanced(), "{report:?}");
}

#[test]
fn concurrent_calls_stay_balanced() {
    let retriever = Arc::new(NetStateRetriever::new(CountingNative::new(eth0_success())));
    let config = StressConfig {
        operations: 100,
        threads: 8,
    };

    let result = concurrent_retrievals(&retriever, &config);
    assert_eq!(result.successful_ops, 800);
    assert_eq!(result.failed_ops, 0);

    let report = retriever.library().report();
    assert_eq!(report.calls, 800);
    assert!(report.is_balanced());
}

#[test]
fn timeout_abandons_slow_call() {
    let native = CountingNative::new(eth0_success().with_delay(Duration::from_millis(500)));
    let retriever = Arc::new(NetStateRetriever::new(native));

    let err = retrieve_with_timeout(&retriever, Duration::from_millis(20)).unwrap_err();
    assert!(matches!(err, NetStateError::Timeout(_)));

    // The abandoned worker finishes and releases its buffer.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while retriever.library().report().freed == 0 {
        assert!(std::time::Instant::now() < deadline, "worker never finished");
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(retriever.library().report().is_balanced());
}

#[test]
fn timeout_returns_result_when_fast() {
    let retriever = Arc::new(NetStateRetriever::new(CountingNative::scripted([
        eth0_success(),
        invalid_argument(),
    ])));

    let state = retrieve_with_timeout(&retriever, Duration::from_secs(10)).unwrap();
    assert_eq!(state, ETH0_STATE);

    let err = retrieve_with_timeout(&retriever, Duration::from_secs(10)).unwrap_err();
    assert_eq!(err.code(), Some(1));
}

proptest! {
    #[test]
    fn every_buffer_freed_exactly_once(outcomes in prop::collection::vec(arb_outcome(), 1..32)) {
        let expected: usize = outcomes.iter().map(Outcome::buffer_count).sum();
        let expected_codes: Vec<i32> = outcomes.iter().map(|o| o.code).collect();
        let native = CountingNative::scripted(outcomes);
        let retriever = NetStateRetriever::new(&native);

        for code in expected_codes {
            match retriever.retrieve() {
                Ok(state) => {
                    prop_assert_eq!(code, 0);
                    prop_assert!(serde_json::from_str::<serde_json::Value>(&state).is_ok());
                }
                Err(err) if code != 0 => prop_assert_eq!(err.code(), Some(code)),
                Err(err) => prop_assert!(matches!(err, NetStateError::MissingState)),
            }
        }

        let report = native.report();
        prop_assert_eq!(report.allocated, expected);
        prop_assert!(report.is_balanced(), "{:?}", report);
    }
}
