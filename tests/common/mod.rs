#![allow(dead_code)]

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;

use tessera::ast::{AssignmentNode, GroupMember, GroupNode, QueryNode, QueryRoot, TermNode};
use tessera::config::ResolverSettings;
use tessera::context::ResolveContext;
use tessera::iv::Iv;
use tessera::lexicon::{Lexicon, TermDictionary};
use tessera::term::ExternalTerm;

pub const EX: &str = "http://ex/";

static TRACING: Once = Once::new();

/// Logs show up with `RUST_LOG=tessera=debug cargo test -- --nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct Fixture {
    pub lexicon: Arc<Lexicon>,
    pub ctx: ResolveContext,
}
impl Fixture {
    /// Puts `term` into the lexicon and returns its handle.
    pub fn intern(&self, term: &ExternalTerm) -> Iv {
        self.lexicon.insert_or_get(term).expect("insert term")
    }
}

pub fn fixture() -> Fixture {
    fixture_with(ResolverSettings::default())
}

pub fn fixture_with(settings: ResolverSettings) -> Fixture {
    init_tracing();
    let lexicon = Arc::new(Lexicon::new());
    let ctx = ResolveContext::with_settings(lexicon.clone(), settings);
    Fixture { lexicon, ctx }
}

pub fn ex(local: &str) -> ExternalTerm {
    ExternalTerm::uri(format!("{EX}{local}"))
}

pub fn ex_node(local: &str) -> TermNode {
    TermNode::constant(ex(local))
}

pub fn pattern(s: TermNode, p: TermNode, o: TermNode) -> GroupMember {
    GroupMember::pattern(s, p, o)
}

pub fn select(vars: &[&str], children: Vec<GroupMember>) -> QueryRoot {
    QueryRoot::select(
        vars.iter().map(|var| AssignmentNode::plain(*var)).collect(),
        GroupNode::join(children),
    )
}

pub fn query(root: QueryRoot) -> QueryNode {
    QueryNode::Query(root)
}

pub fn where_clause(node: &QueryNode) -> &GroupNode {
    match node {
        QueryNode::Query(root) => root.where_clause.as_ref().expect("where clause"),
        QueryNode::Update(_) => panic!("not a query"),
    }
}

/// The object of the statement pattern at `index` in `group`.
pub fn object_at(group: &GroupNode, index: usize) -> &TermNode {
    match &group.children[index] {
        GroupMember::StatementPattern(pattern) => &pattern.o,
        other => panic!("expected a statement pattern, found {}", other.kind_name()),
    }
}

pub fn constant_iv(term: &TermNode) -> Option<&Iv> {
    term.as_constant().expect("constant").iv()
}
