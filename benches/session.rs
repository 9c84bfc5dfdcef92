use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use handlabel::labeling::{FnOracle, HandLabelSession, LabelContext};
use handlabel::table::{Table, Value};
use rand::SeedableRng;
use rand::rngs::StdRng;

const ROW_COUNT: usize = 10_000;

fn unlabeled_table() -> Table {
    let mut table = Table::new(["x", "y", "label"]);
    for i in 0..ROW_COUNT {
        table.push_row([
            ("x", Value::Integer(i as i64)),
            ("y", Value::Float(i as f64 * 0.5)),
            ("label", Value::Null),
        ]);
    }
    table
}

fn parity_oracle() -> FnOracle<impl FnMut(&LabelContext) -> String> {
    FnOracle::new("integer", |ctx: &LabelContext| (ctx.row % 2).to_string())
}

fn bench_hand_label(c: &mut Criterion) {
    let table = unlabeled_table();
    c.bench_with_input(
        BenchmarkId::new("hand_label", ROW_COUNT),
        &table,
        |b, table| {
            b.iter(|| {
                let mut session = HandLabelSession::new(parity_oracle());
                let mut table = black_box(table.clone());
                session
                    .hand_label(&mut table, "label", &[])
                    .expect("hand_label");
            });
        },
    );
}

fn bench_verify(c: &mut Criterion) {
    let mut session = HandLabelSession::new(parity_oracle());
    let mut table = unlabeled_table();
    let labeled = session
        .hand_label(&mut table, "label", &[])
        .expect("seed labels");
    let features = vec!["x".to_string(), "y".to_string()];
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_with_input(
        BenchmarkId::new("verify_consistency", ROW_COUNT),
        &table,
        |b, table| {
            b.iter(|| {
                session
                    .verify_consistency_with_rng(
                        black_box(table),
                        &labeled,
                        "label",
                        &features,
                        0.3,
                        &mut rng,
                    )
                    .expect("verify");
            });
        },
    );
}

criterion_group!(benches, bench_hand_label, bench_verify);
criterion_main!(benches);
