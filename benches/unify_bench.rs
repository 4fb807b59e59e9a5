//! Benchmark for unification and expression typing.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use viskell_types::{unify, Expression, Type, TypeChecker, TypeVarTable};

fn nested_list(depth: usize, leaf: Type) -> Type {
    (0..depth).fold(leaf, |ty, _| Type::list(ty))
}

fn benchmark_unify_nested(c: &mut Criterion) {
    c.bench_function("unify [[..v..]] with [[..Int..]] (depth 64)", |b| {
        b.iter(|| {
            let mut vars = TypeVarTable::new();
            let v = vars.fresh("v");
            let left = nested_list(64, Type::var(&v));
            let right = nested_list(64, Type::con("Int"));
            unify(&mut vars, &Expression::hole(), &left, &right).unwrap();
            black_box(vars)
        });
    });
}

fn benchmark_variable_chain(c: &mut Criterion) {
    c.bench_function("merge chain of 256 variables then bind", |b| {
        b.iter(|| {
            let mut vars = TypeVarTable::new();
            let context = Expression::hole();
            let all: Vec<_> = (0..256).map(|i| vars.fresh(format!("t{}", i))).collect();
            for pair in all.windows(2) {
                unify(&mut vars, &context, &Type::var(&pair[0]), &Type::var(&pair[1])).unwrap();
            }
            unify(&mut vars, &context, &Type::var(&all[0]), &Type::con("Int")).unwrap();
            black_box(vars.instantiated_type(&all[255]))
        });
    });
}

fn benchmark_find_type(c: &mut Criterion) {
    let one = Expression::value(Type::con("Int"), "1");
    let expr = (0..32).fold(one.clone(), |acc, _| {
        Expression::apply_all(Expression::ident("+"), [acc, one.clone()])
    });

    c.bench_function("find_type of 32 nested additions", |b| {
        b.iter(|| {
            let mut checker = TypeChecker::new();
            black_box(checker.check(&expr).unwrap())
        });
    });
}

criterion_group!(
    benches,
    benchmark_unify_nested,
    benchmark_variable_chain,
    benchmark_find_type
);
criterion_main!(benches);
