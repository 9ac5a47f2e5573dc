//! 触发引擎性能基准测试
//!
//! 测试覆盖：
//! - 单个条件评估性能
//! - 单规则派发性能
//! - 不同规则数量下整表派发的性能曲线

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use trigger_engine::{Condition, Cycle, Every, Randomizer, Rule, TriggerRegistry};

/// 计数上下文：动作只做一次自增
#[derive(Debug, Default)]
struct Counter {
    fired: usize,
}

fn counting_rule() -> Rule<Counter> {
    Rule::new("bd", |ctx: &mut Counter, _snapshot| {
        ctx.fired += 1;
        Ok(())
    })
}

fn bench_condition_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_evaluate");

    group.bench_function("every", |b| {
        let mut condition = Condition::Every(Every::new(16).unwrap());
        b.iter(|| black_box(condition.evaluate()));
    });

    group.bench_function("cycle", |b| {
        let mut condition = Condition::Cycle(Cycle::new(&[100.0, 0.0], 3.0).unwrap());
        b.iter(|| black_box(condition.evaluate()));
    });

    group.bench_function("randomizer", |b| {
        let mut condition = Condition::Randomizer(Randomizer::with_seed(1, 6, 42).unwrap());
        b.iter(|| black_box(condition.evaluate()));
    });

    group.finish();
}

fn bench_rule_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_dispatch");

    group.bench_function("all_conditions", |b| {
        let mut ctx = Counter::default();
        let mut rule = counting_rule()
            .every(4)
            .unwrap()
            .cycle(&[100.0, 0.0], 5.0)
            .unwrap()
            .randomizer_seeded(1, 6, 42)
            .unwrap();

        b.iter(|| rule.dispatch(black_box("bd"), &mut ctx).unwrap());
    });

    group.bench_function("subject_mismatch", |b| {
        let mut ctx = Counter::default();
        let mut rule = counting_rule().every(4).unwrap();

        b.iter(|| rule.dispatch(black_box("sn"), &mut ctx).unwrap());
    });

    group.finish();
}

fn bench_registry_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_pass");

    for rules_count in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(rules_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(rules_count),
            &rules_count,
            |b, &count| {
                let registry = TriggerRegistry::new(Counter::default());
                for _ in 0..count {
                    registry.register(
                        counting_rule()
                            .every(4)
                            .unwrap()
                            .cycle(&[100.0, 0.0], 5.0)
                            .unwrap(),
                    );
                }

                b.iter(|| registry.dispatch(black_box("bd")).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_condition_evaluate,
    bench_rule_dispatch,
    bench_registry_pass
);
criterion_main!(benches);
