//! # Credential Operation Benchmarks
//!
//! | Path | Measured |
//! |------|----------|
//! | Fact hashing | Canonical bytes + Keccak-256 per batch size |
//! | Assign processing | pre_process + process over an in-memory view |
//! | Wire decoding | Hinted JSON -> Operation with hash check |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_18_credentials::prelude::*;
use qc_tests::harness::*;
use std::time::Duration;

const BATCH_SIZES: [usize; 4] = [1, 10, 50, 100];

fn assign_batch(size: usize) -> AssignCredentialsFact {
    let items = (0..size)
        .map(|i| {
            assign_item(
                HOLDER,
                "edu-degree",
                &format!("cred-{i}"),
                (100, 200),
                "did:example:H",
            )
        })
        .collect();
    assign(items)
}

// ============================================================================
// FACT HASHING
// ============================================================================

fn bench_fact_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("credentials-fact-hash");

    for size in BATCH_SIZES {
        let fact = assign_batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("assign_fact_hash", size), &fact, |b, fact| {
            b.iter(|| black_box(fact.hash()))
        });
    }

    group.finish();
}

// ============================================================================
// ASSIGN PROCESSING
// ============================================================================

fn bench_assign_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("credentials-assign");
    group.measurement_time(Duration::from_secs(10));

    let chain = harness_with_template().expect("harness setup");

    for size in BATCH_SIZES {
        let op = chain.sign(assign_batch(size), OWNER).expect("sign batch");
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("execute", size), &op, |b, op| {
            b.iter(|| {
                let view = LedgerView::over(chain.height(), &chain.ledger);
                black_box(chain.processors.execute(op, view).is_ok())
            })
        });
    }

    group.finish();
}

// ============================================================================
// WIRE DECODING
// ============================================================================

fn bench_wire_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("credentials-wire");

    let chain = ChainHarness::new().expect("harness setup");
    let registry = HintRegistry::with_credential_facts().expect("registry");

    for size in BATCH_SIZES {
        let op = chain.sign(assign_batch(size), OWNER).expect("sign batch");
        let json = encode_operation(&op).expect("encode").to_string();
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode_operation", size), &json, |b, json| {
            b.iter(|| black_box(registry.decode_operation_str(json).is_ok()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fact_hashing,
    bench_assign_processing,
    bench_wire_decoding,
);

criterion_main!(benches);
