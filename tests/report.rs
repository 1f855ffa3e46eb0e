use lockbench::measure::{MemorySample, TimingSample};
use lockbench::probes::SecurityProbeResult;
use lockbench::report::pct_delta;
use lockbench::{BenchError, BenchmarkReport, ComparativeReport, ReportEntry};

fn timing(ns: &[u128]) -> TimingSample {
    TimingSample::from_nanos(ns.to_vec()).unwrap()
}

fn memory(peak_bytes: usize) -> MemorySample {
    MemorySample::from_peaks(vec![peak_bytes; 3]).unwrap()
}

fn passing() -> SecurityProbeResult {
    SecurityProbeResult {
        round_trip: true,
        nonce_unique: true,
        tamper_rejected: true,
        context_bound: true,
        nonce_draws: 10,
    }
}

fn report(name: &str, enc_ns: u128, dec_ns: u128, peak: usize) -> ReportEntry {
    report_with_probes(name, enc_ns, dec_ns, peak, passing())
}

fn report_with_probes(
    name: &str,
    enc_ns: u128,
    dec_ns: u128,
    peak: usize,
    probes: SecurityProbeResult,
) -> ReportEntry {
    ReportEntry::Valid(Box::new(BenchmarkReport {
        algorithm: name.to_string(),
        payload_size: 16,
        iterations: 2,
        warmup: 0,
        encrypt: timing(&[enc_ns, enc_ns]),
        decrypt: timing(&[dec_ns, dec_ns]),
        memory: memory(peak),
        probes,
    }))
}

#[test]
fn percentage_delta_is_relative_to_baseline() {
    assert_eq!(pct_delta(150.0, 100.0).unwrap(), 50.0);
    assert_eq!(pct_delta(50.0, 100.0).unwrap(), -50.0);
    assert!(matches!(pct_delta(1.0, 0.0), Err(BenchError::Configuration(_))));
    assert!(pct_delta(f64::NAN, 1.0).is_err());
}

#[test]
fn entries_keep_insertion_order_and_refuse_duplicates() {
    let mut cmp = ComparativeReport::new(16);
    cmp.insert(report("ASCON-128", 2_000, 2_000, 4096)).unwrap();
    cmp.insert(report("AES-128-GCM", 1_000, 1_000, 4096)).unwrap();
    assert!(matches!(
        cmp.insert(report("ASCON-128", 1, 1, 1)),
        Err(BenchError::Configuration(_))
    ));
    assert_eq!(cmp.algorithms().collect::<Vec<_>>(), vec!["ASCON-128", "AES-128-GCM"]);
    assert_eq!(cmp.len(), 2);
    // the refused insert left the original untouched
    let kept = cmp.get("ASCON-128").and_then(|e| e.report()).unwrap();
    assert_eq!(kept.encrypt.mean_us(), 2.0);
}

#[test]
fn delta_compares_mean_latency() {
    let mut cmp = ComparativeReport::new(16);
    cmp.insert(report("a", 3_000, 1_000, 8192)).unwrap();
    cmp.insert(report("b", 2_000, 2_000, 8192)).unwrap();
    let d = cmp.delta("a", "b").unwrap();
    assert!((d.encrypt_latency_pct - 50.0).abs() < 1e-9);
    assert!((d.decrypt_latency_pct + 50.0).abs() < 1e-9);
    assert!(d.peak_memory_pct.is_finite());
}

#[test]
fn delta_is_refused_for_invalid_or_missing_entries() {
    let mut cmp = ComparativeReport::new(16);
    cmp.insert(report("a", 1_000, 1_000, 4096)).unwrap();
    cmp.insert(ReportEntry::Invalid {
        algorithm: "b".into(),
        reason: "aborted".into(),
    })
    .unwrap();
    assert!(matches!(cmp.delta("a", "b"), Err(BenchError::Configuration(_))));
    assert!(matches!(cmp.delta("b", "a"), Err(BenchError::Configuration(_))));
    assert!(matches!(cmp.delta("a", "c"), Err(BenchError::Configuration(_))));
}

#[test]
fn delta_is_refused_when_a_probe_failed() {
    let mut cmp = ComparativeReport::new(16);
    let probes = SecurityProbeResult {
        tamper_rejected: false,
        ..passing()
    };
    cmp.insert(report_with_probes("a", 1_000, 1_000, 4096, probes))
        .unwrap();
    cmp.insert(report("b", 1_000, 1_000, 4096)).unwrap();
    let err = cmp.delta("a", "b").unwrap_err();
    assert!(err.to_string().contains("tamper_rejected"));
}

#[test]
fn memory_sample_summarises_per_call_peaks() {
    let m = MemorySample::from_peaks(vec![96, 92, 100]).unwrap();
    assert_eq!(m.iterations(), 3);
    assert_eq!(m.peaks_bytes(), &[96, 92, 100]);
    assert_eq!(m.min_peak_kb() * 1024.0, 92.0);
    assert_eq!(m.peak_kb() * 1024.0, 100.0);
    assert!(matches!(
        MemorySample::from_peaks(Vec::new()),
        Err(BenchError::Configuration(_))
    ));
}
