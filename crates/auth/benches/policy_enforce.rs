use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use relaygate_auth::{PolicyRule, PolicySet, PolicySnapshot, RoleAssignment};

/// Policy with `subjects` accounts spread over 10 roles, each role granted
/// one exact and one wildcard channel rule.
fn policy(subjects: usize) -> PolicySnapshot {
    let mut rules = Vec::new();
    for role in 0..10 {
        rules.push(PolicyRule::new(format!("role{role}"), format!("room{role}"), "subscribe"));
        rules.push(PolicyRule::new(format!("role{role}"), format!("feed{role}:*"), "*"));
    }
    let assignments = (0..subjects)
        .map(|s| RoleAssignment::new(s.to_string(), format!("role{}", s % 10)))
        .collect();

    PolicySnapshot::build(PolicySet { rules, assignments }, Utc::now()).unwrap()
}

fn bench_enforce(c: &mut Criterion) {
    let mut group = c.benchmark_group("enforce");
    group.throughput(Throughput::Elements(1));

    for subjects in [100usize, 10_000] {
        let snapshot = policy(subjects);

        group.bench_with_input(BenchmarkId::new("exact_permit", subjects), &snapshot, |b, snap| {
            b.iter(|| snap.enforce(black_box("42"), black_box("room2"), black_box("subscribe")))
        });
        group.bench_with_input(BenchmarkId::new("wildcard_permit", subjects), &snapshot, |b, snap| {
            b.iter(|| snap.enforce(black_box("42"), black_box("feed2:eu:sport"), black_box("publish")))
        });
        group.bench_with_input(BenchmarkId::new("deny", subjects), &snapshot, |b, snap| {
            b.iter(|| snap.enforce(black_box("42"), black_box("room3"), black_box("subscribe")))
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("snapshot_build_10k", |b| b.iter(|| policy(black_box(10_000))));
}

criterion_group!(benches, bench_enforce, bench_build);
criterion_main!(benches);
