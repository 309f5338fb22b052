//! Benchmarks for request signing
//!
//! - Content hashing of request bodies of increasing size
//! - Full HMAC signing of a send request
//! - Credential authorization including URL decomposition

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use integrations_azure_email::signing::{content_hash, sign_request};
use integrations_azure_email::Credential;
use url::Url;

const KEY: &str = "dGVzdC1hY2Nlc3Mta2V5LTAxMjM0NTY3ODlhYmNkZWY=";
const HOST: &str = "contoso.communication.azure.com";
const PATH: &str = "/emails:send?api-version=2025-09-01";

fn bench_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hash");

    for size in [64usize, 4 * 1024, 256 * 1024] {
        let body = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| content_hash(black_box(body)))
        });
    }

    group.finish();
}

fn bench_sign_request(c: &mut Criterion) {
    let timestamp = Utc.with_ymd_and_hms(2023, 12, 15, 10, 30, 45).unwrap();
    let body = br#"{"senderAddress":"sender@example.com","content":{"subject":"Hi"}}"#;

    c.bench_function("sign_request", |b| {
        b.iter(|| {
            sign_request(
                black_box("POST"),
                black_box(PATH),
                black_box(HOST),
                black_box(body),
                black_box(KEY),
                timestamp,
            )
            .unwrap()
        })
    });
}

fn bench_credential_authorize(c: &mut Criterion) {
    let credential = Credential::access_key(format!("https://{}", HOST), KEY).unwrap();
    let url = Url::parse(&format!("https://{}{}", HOST, PATH)).unwrap();
    let timestamp = Utc.with_ymd_and_hms(2023, 12, 15, 10, 30, 45).unwrap();

    c.bench_function("credential_authorize", |b| {
        b.iter(|| {
            credential
                .authorize("POST", black_box(&url), black_box(b"{}"), timestamp)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_content_hash,
    bench_sign_request,
    bench_credential_authorize
);
criterion_main!(benches);
