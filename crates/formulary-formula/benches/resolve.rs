use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formulary_core::Variable;
use formulary_formula::{evaluate_expression, resolve_variables};

/// V0 = 1, Vn = V(n-1) + 1, defined in reverse so every lookup descends
fn chain(len: usize) -> Vec<Variable> {
    let mut variables: Vec<Variable> = (1..len)
        .rev()
        .map(|i| Variable::dynamic(&format!("V{i}"), format!("V{} + 1", i - 1)).unwrap())
        .collect();
    variables.push(Variable::constant("V0", "1").unwrap());
    variables
}

fn bench_resolve(c: &mut Criterion) {
    let variables = chain(200);
    c.bench_function("resolve_chain_200", |b| {
        b.iter(|| resolve_variables(black_box(&variables)).unwrap())
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let expression = "(1 + 2) * 3 / 4 - 5 * (6 + 7) / 8";
    c.bench_function("evaluate_expression", |b| {
        b.iter(|| evaluate_expression(black_box(expression)).unwrap())
    });
}

criterion_group!(benches, bench_resolve, bench_evaluate);
criterion_main!(benches);
