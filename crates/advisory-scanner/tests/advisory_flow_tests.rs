//! End-to-end advisory scan flow tests against a scripted registry transport

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use lockgate_advisory_scanner::{
    AdvisoryScanner, AdvisoryScannerBuilder, AdvisoryScannerConfig, AdvisoryScannerError,
    RegistryTransport,
};
use lockgate_core::types::{AdvisoryLevel, PackageRef};

/// Scripted transport: serves queued outcomes front-to-back, then `{}`.
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<String, u16>>>,
    requests: AtomicUsize,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
        }
    }

    fn with_body(self, body: impl Into<String>) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(body.into()));
        self
    }

    fn with_status(self, status: u16) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(status));
        self
    }

    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RegistryTransport for ScriptedTransport {
    fn post_bulk(
        &self,
        _gzip_body: Vec<u8>,
    ) -> impl Future<Output = Result<Bytes, AdvisoryScannerError>> + Send {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("{}".to_owned()));
        async move {
            match outcome {
                Ok(body) => Ok(Bytes::from(body.into_bytes())),
                Err(status) => Err(AdvisoryScannerError::Status { status }),
            }
        }
    }
}

fn advisory_body(entries: &[(&str, &str, &str, &str)]) -> String {
    // (id, name, severity, range)
    let records: Vec<String> = entries
        .iter()
        .map(|(id, name, severity, range)| {
            format!(
                r#""{id}": {{
                    "id": {id},
                    "title": "Vulnerability in {name}",
                    "module_name": "{name}",
                    "severity": "{severity}",
                    "vulnerable_versions": "{range}",
                    "url": "https://npmjs.com/advisories/{id}"
                }}"#
            )
        })
        .collect();
    format!("{{{}}}", records.join(","))
}

fn build_scanner(
    transport: Arc<ScriptedTransport>,
    batch_size: usize,
) -> AdvisoryScanner<ScriptedTransport> {
    let config = AdvisoryScannerConfig {
        batch_size,
        max_retries: 1,
        retry_base_delay_ms: 1,
        ..Default::default()
    };
    AdvisoryScannerBuilder::new()
        .config(config)
        .transport(transport)
        .build()
        .unwrap()
}

/// The lodash end-to-end scenario: one advisory, one affected package,
/// exactly one fatal record.
#[tokio::test]
async fn lodash_advisory_yields_one_fatal_record() {
    let body = advisory_body(&[("1065", "lodash", "high", "<4.17.21")]);
    let transport = Arc::new(ScriptedTransport::new().with_body(body));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("lodash", "4.17.20")];
    let report = scanner.audit(&packages).await;

    assert_eq!(report.advisory_count(), 1);
    let record = &report.advisories[0];
    assert_eq!(record.id, "1065");
    assert_eq!(record.level, AdvisoryLevel::Fatal);
    assert_eq!(record.package, "lodash@4.17.20");
}

/// A fixed package not inside the vulnerable range produces no records.
#[tokio::test]
async fn patched_version_is_clean() {
    let body = advisory_body(&[("1065", "lodash", "high", "<4.17.21")]);
    let transport = Arc::new(ScriptedTransport::new().with_body(body));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("lodash", "4.17.21")];
    let report = scanner.audit(&packages).await;
    assert_eq!(report.advisory_count(), 0);
    assert!(!report.has_fatal());
}

/// Duplicate input entries collapse to one queried pair and one record.
#[tokio::test]
async fn duplicate_entries_are_deduplicated() {
    let body = advisory_body(&[("1065", "lodash", "high", "<4.17.21")]);
    let transport = Arc::new(ScriptedTransport::new().with_body(body));
    let scanner = build_scanner(Arc::clone(&transport), 100);

    // Same name+version hoisted at multiple paths
    let packages = vec![
        PackageRef::new("lodash", "4.17.20"),
        PackageRef::new("lodash", "4.17.20"),
        PackageRef::new("lodash", "4.17.20"),
    ];
    let report = scanner.audit(&packages).await;

    assert_eq!(report.total_packages, 3);
    assert_eq!(report.unique_packages, 1);
    assert_eq!(report.advisory_count(), 1);
    assert_eq!(transport.request_count(), 1);
}

/// ⌈N/K⌉ batches are issued, and their union matches the unbatched result.
#[tokio::test]
async fn batched_query_matches_unbatched_result() {
    let packages = vec![
        PackageRef::new("lodash", "4.17.20"),
        PackageRef::new("minimist", "1.2.5"),
        PackageRef::new("left-pad", "1.3.0"),
    ];

    // Unbatched: single response carrying both advisories
    let full_body = advisory_body(&[
        ("1065", "lodash", "high", "<4.17.21"),
        ("1179", "minimist", "moderate", "<1.2.6"),
    ]);
    let unbatched_transport = Arc::new(ScriptedTransport::new().with_body(full_body));
    let unbatched = build_scanner(Arc::clone(&unbatched_transport), 100);
    let unbatched_report = unbatched.audit(&packages).await;
    assert_eq!(unbatched_transport.request_count(), 1);

    // Batched: batch size 1 -> three requests, advisories spread across them
    let batched_transport = Arc::new(
        ScriptedTransport::new()
            .with_body(advisory_body(&[("1065", "lodash", "high", "<4.17.21")]))
            .with_body(advisory_body(&[("1179", "minimist", "moderate", "<1.2.6")]))
            .with_body("{}"),
    );
    let batched = build_scanner(Arc::clone(&batched_transport), 1);
    let batched_report = batched.audit(&packages).await;
    assert_eq!(batched_transport.request_count(), 3);

    let mut unbatched_ids: Vec<String> = unbatched_report
        .advisories
        .iter()
        .map(|a| a.id.clone())
        .collect();
    let mut batched_ids: Vec<String> = batched_report
        .advisories
        .iter()
        .map(|a| a.id.clone())
        .collect();
    unbatched_ids.sort();
    batched_ids.sort();
    assert_eq!(unbatched_ids, batched_ids);
}

/// One failing batch is skipped; sibling batches still contribute.
#[tokio::test]
async fn partial_batch_failure_keeps_sibling_results() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_status(503)
            .with_body(advisory_body(&[("1179", "minimist", "moderate", "<1.2.6")])),
    );
    let scanner = build_scanner(Arc::clone(&transport), 1);

    let packages = vec![
        PackageRef::new("lodash", "4.17.20"),
        PackageRef::new("minimist", "1.2.5"),
    ];
    let report = scanner.audit(&packages).await;

    assert_eq!(transport.request_count(), 2);
    assert_eq!(report.advisory_count(), 1);
    assert_eq!(report.advisories[0].id, "1179");
}

/// A total transport failure never escapes `audit` — the scan fails open.
#[tokio::test]
async fn total_failure_fails_open_with_empty_report() {
    let transport = Arc::new(ScriptedTransport::new().with_status(500));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("lodash", "4.17.20")];
    let report = scanner.audit(&packages).await;

    assert_eq!(report.advisory_count(), 0);
    assert_eq!(report.total_packages, 1);
}

/// A malformed response body also fails open at the audit boundary.
#[tokio::test]
async fn malformed_response_fails_open() {
    let transport =
        Arc::new(ScriptedTransport::new().with_body("<html>502 Bad Gateway</html>"));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("lodash", "4.17.20")];
    let report = scanner.audit(&packages).await;
    assert_eq!(report.advisory_count(), 0);
}

/// Advisories carrying only the deprecated module_name field still attribute.
#[tokio::test]
async fn module_name_only_advisory_attributes() {
    // advisory_body always uses module_name, never name
    let body = advisory_body(&[("42", "event-stream", "critical", "=3.3.6")]);
    let transport = Arc::new(ScriptedTransport::new().with_body(body));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("event-stream", "3.3.6")];
    let report = scanner.audit(&packages).await;

    assert_eq!(report.advisory_count(), 1);
    assert_eq!(report.advisories[0].level, AdvisoryLevel::Fatal);
    assert_eq!(report.advisories[0].package, "event-stream@3.3.6");
}

/// Wrapped response shape (`advisories` field plus metadata) is accepted.
#[tokio::test]
async fn wrapped_response_shape_is_accepted() {
    let inner = advisory_body(&[("1065", "lodash", "high", "<4.17.21")]);
    let wrapped = format!(r#"{{"advisories": {inner}, "total": 1}}"#);
    let transport = Arc::new(ScriptedTransport::new().with_body(wrapped));
    let scanner = build_scanner(transport, 100);

    let packages = vec![PackageRef::new("lodash", "4.17.20")];
    let report = scanner.audit(&packages).await;
    assert_eq!(report.advisory_count(), 1);
}

/// Empty input returns an empty report without touching the network.
#[tokio::test]
async fn empty_input_skips_network() {
    let transport = Arc::new(ScriptedTransport::new());
    let scanner = build_scanner(Arc::clone(&transport), 100);

    let report = scanner.audit(&[]).await;
    assert_eq!(report.advisory_count(), 0);
    assert_eq!(transport.request_count(), 0);
}

/// Level counts aggregate fatal and warn records.
#[tokio::test]
async fn level_counts_reflect_severity_mapping() {
    let body = advisory_body(&[
        ("1", "a", "critical", "*"),
        ("2", "b", "low", "*"),
        ("3", "c", "moderate", "*"),
    ]);
    let transport = Arc::new(ScriptedTransport::new().with_body(body));
    let scanner = build_scanner(transport, 100);

    let packages = vec![
        PackageRef::new("a", "1.0.0"),
        PackageRef::new("b", "1.0.0"),
        PackageRef::new("c", "1.0.0"),
    ];
    let report = scanner.audit(&packages).await;

    let counts = report.level_counts();
    assert_eq!(counts.fatal, 1);
    assert_eq!(counts.warn, 2);
    assert_eq!(counts.total(), 3);
}
