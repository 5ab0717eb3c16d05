//! Integration tests for the request loop.

use charge_probe::prelude::*;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

/// Transport answering from a script indexed by call number.
/// `None` from the script simulates a transport failure.
struct ScriptedTransport {
    script: Box<dyn Fn(usize) -> Option<ProbeResponse> + Send + Sync>,
    calls: Mutex<Vec<(String, ChargeRequest)>>,
}

impl ScriptedTransport {
    fn new(script: impl Fn(usize) -> Option<ProbeResponse> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, ChargeRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &ChargeRequest,
    ) -> Result<ProbeResponse, ProbeError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((url.to_string(), payload.clone()));
            calls.len() - 1
        };
        (self.script)(call).ok_or_else(|| ProbeError::transport("connection refused"))
    }
}

const URL: &str = "http://probe.test/charge";

fn scripted_loop(
    script: impl Fn(usize) -> Option<ProbeResponse> + Send + Sync + 'static,
) -> RequestLoop<ScriptedTransport> {
    RequestLoop::new(ProbeConfig::new().url(URL), ScriptedTransport::new(script))
}

fn lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_every_request_carries_the_fixed_payload() {
    let probe = scripted_loop(|_| Some(ProbeResponse::new(200, "{}")));
    let mut out = Vec::new();
    assert_ok!(probe.run(&mut out).await);

    let calls = probe.transport().calls();
    assert_eq!(calls.len(), 100);
    for (url, payload) in calls {
        assert_eq!(url, URL);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"serviceType": "voice", "unit": -2})
        );
    }
}

#[tokio::test]
async fn test_all_success() {
    let probe = scripted_loop(|_| Some(ProbeResponse::new(200, r#"{"ok": true}"#)));
    let mut out = Vec::new();
    let summary = probe.run(&mut out).await.unwrap();

    assert_eq!(
        summary,
        LoopSummary {
            attempts: 100,
            succeeded: 100,
            failed: 0
        }
    );
    assert_eq!(probe.transport().calls().len(), 100);

    let lines = lines(out);
    assert_eq!(lines.len(), 200);
    for pair in lines.chunks(2) {
        assert_eq!(pair[0], "Request succeeded!");
        assert_eq!(pair[1], r#"Response: {"ok":true}"#);
    }
}

#[tokio::test]
async fn test_all_failures_do_not_stop_the_loop() {
    let probe = scripted_loop(|_| Some(ProbeResponse::new(503, "service unavailable")));
    let mut out = Vec::new();
    let summary = probe.run(&mut out).await.unwrap();

    assert_eq!(summary.failed, 100);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(probe.transport().calls().len(), 100);

    let lines = lines(out);
    assert_eq!(lines.len(), 200);
    for pair in lines.chunks(2) {
        assert_eq!(pair[0], "Request failed with status code: 503");
        assert_eq!(pair[1], "Error message: service unavailable");
    }
}

#[tokio::test]
async fn test_mixed_outcomes_keep_order() {
    let probe = scripted_loop(|call| {
        if call < 3 {
            Some(ProbeResponse::new(200, r#"{"ok": true}"#))
        } else {
            Some(ProbeResponse::new(500, "boom"))
        }
    });
    let mut out = Vec::new();
    let summary = probe.run(&mut out).await.unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 97);

    let lines = lines(out);
    let headers: Vec<&String> = lines.iter().step_by(2).collect();
    assert_eq!(headers.len(), 100);
    assert!(headers[..3].iter().all(|l| *l == "Request succeeded!"));
    assert!(headers[3..]
        .iter()
        .all(|l| *l == "Request failed with status code: 500"));
}

#[tokio::test]
async fn test_non_json_success_body_is_fatal() {
    let probe = scripted_loop(|call| {
        if call == 5 {
            Some(ProbeResponse::new(200, "not json"))
        } else {
            Some(ProbeResponse::new(200, "[]"))
        }
    });
    let mut out = Vec::new();
    let err = probe.run(&mut out).await.unwrap_err();

    assert!(matches!(err, ProbeError::Decode { iteration: 5, .. }));
    assert_eq!(probe.transport().calls().len(), 6);

    let lines = lines(out);
    assert_eq!(lines.len(), 11);
    assert_eq!(lines.last().unwrap(), "Request succeeded!");
}

#[tokio::test]
async fn test_transport_failure_on_first_request() {
    let probe = scripted_loop(|_| None);
    let mut out = Vec::new();
    let err = probe.run(&mut out).await.unwrap_err();

    assert!(matches!(err, ProbeError::Transport(_)));
    assert_eq!(probe.transport().calls().len(), 1);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_with_http_transport() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ProbeConfig::new().url(format!("http://{}/charge", addr));
    let transport = HttpTransport::new(&config).unwrap();
    let mut out = Vec::new();

    let result = RequestLoop::new(config, transport).run(&mut out).await;
    let err = assert_err!(result);
    assert!(matches!(err, ProbeError::Transport(_)));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_probe_against_charge_server() {
    let ledger = Arc::new(MemoryLedger::with_balance(100));
    let server = ChargeServer::with_ledger(ServerConfig::new(), ledger.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener));

    let config = ProbeConfig::new()
        .url(format!("http://{}/charge", addr))
        .timeout(std::time::Duration::from_secs(10));
    let transport = HttpTransport::new(&config).unwrap();
    let mut out = Vec::new();

    let summary = RequestLoop::new(config, transport)
        .run(&mut out)
        .await
        .unwrap();

    // A negative unit is always rejected, so every attempt is a reported failure.
    assert_eq!(summary.failed, 100);
    let lines = lines(out);
    assert_eq!(lines[0], "Request failed with status code: 400");
    assert_eq!(
        lines[1],
        "Error message: Invalid unit value. Unit cannot be negative."
    );
    assert_eq!(ledger.balance().await.unwrap(), 100);
}
