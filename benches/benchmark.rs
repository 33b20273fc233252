use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use tessera::ast::*;
use tessera::config::ResolverSettings;
use tessera::context::ResolveContext;
use tessera::datatype::XSD_INTEGER;
use tessera::lexicon::{Lexicon, TermDictionary};
use tessera::term::ExternalTerm;
use tessera::walker::TermResolver;

fn uri(n: usize) -> ExternalTerm {
    ExternalTerm::uri(format!("http://bench/term/{n}"))
}

// a query with `width` unions of two optional branches, half of the terms known
fn wide_query(width: usize) -> QueryNode {
    let mut children = Vec::with_capacity(width);
    for n in 0..width {
        let branch = |k: usize| {
            GroupNode::optional(vec![GroupMember::pattern(
                TermNode::var("s"),
                TermNode::constant(uri(k)),
                TermNode::constant(ExternalTerm::typed(k.to_string(), XSD_INTEGER)),
            )])
        };
        children.push(GroupMember::Union(UnionNode {
            members: vec![
                GroupNode::join(vec![GroupMember::Group(branch(2 * n))]),
                GroupNode::join(vec![GroupMember::Group(branch(2 * n + 1))]),
            ],
        }));
    }
    QueryNode::Query(QueryRoot::select(vec![AssignmentNode::plain("s")], GroupNode::join(children)))
}

fn context(settings: ResolverSettings, known: usize) -> ResolveContext {
    let lexicon = Arc::new(Lexicon::new());
    for n in (0..known).step_by(2) {
        let _ = lexicon.insert_or_get(&uri(n));
    }
    ResolveContext::with_settings(lexicon, settings)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    for width in [10, 1000] {
        let node = wide_query(width);
        let ctx = context(ResolverSettings::default(), 2 * width);
        c.bench_function(&format!("resolve {width} unions"), |b| {
            b.iter_batched(
                || node.clone(),
                |mut node| black_box(TermResolver::new(&ctx).optimize(&mut node)),
                BatchSize::SmallInput,
            )
        });
        let pruning = context(
            ResolverSettings {
                prune_unknown_terms: true,
                ..ResolverSettings::default()
            },
            2 * width,
        );
        c.bench_function(&format!("resolve and prune {width} unions"), |b| {
            b.iter_batched(
                || node.clone(),
                |mut node| black_box(TermResolver::new(&pruning).optimize(&mut node)),
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
