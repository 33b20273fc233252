mod common;

use tessera::access_path::{SpoKeyOrder, SpoRelation};
use tessera::ast::{StatementPattern, TermNode};
use tessera::datatype::XSD_INTEGER;
use tessera::iv::Iv;
use tessera::predicate::{Position, SpoPredicate, VarOrConst};
use tessera::resolver::resolve;
use tessera::store::MemoryTripleStore;
use tessera::term::ExternalTerm;

use common::{ex, fixture, Fixture};

fn spo_vars() -> SpoPredicate {
    SpoPredicate::new(VarOrConst::var("s"), VarOrConst::var("p"), VarOrConst::var("o"))
}

fn terms(fx: &Fixture) -> (Iv, Iv, Iv) {
    (fx.intern(&ex("a")), fx.intern(&ex("g1")), fx.intern(&ex("g2")))
}

#[test]
fn binding_a_variable_gives_a_new_predicate() {
    let fx = fixture();
    let (a, _, _) = terms(&fx);
    let unbound = spo_vars();
    let bound = unbound.bind(Position::Subject, &a).unwrap();
    assert_eq!(bound.get(Position::Subject), Some(&VarOrConst::Const(a.clone())));
    assert_eq!(unbound.get(Position::Subject), Some(&VarOrConst::var("s")));
    // rebinding to the same value is a no-op
    assert_eq!(bound.bind(Position::Subject, &a).unwrap(), bound);
}

#[test]
fn every_occurrence_of_the_variable_is_bound() {
    let fx = fixture();
    let (a, _, _) = terms(&fx);
    let same = SpoPredicate::new(VarOrConst::var("x"), VarOrConst::var("p"), VarOrConst::var("x"));
    let bound = same.bind(Position::Object, &a).unwrap();
    assert_eq!(bound.get(Position::Subject), Some(&VarOrConst::Const(a.clone())));
    assert_eq!(bound.get(Position::Object), Some(&VarOrConst::Const(a)));
    assert!(bound.get(Position::Predicate).unwrap().is_var());
}

#[test]
#[should_panic(expected = "binding conflict")]
fn binding_a_different_constant_panics() {
    let fx = fixture();
    let (a, g1, _) = terms(&fx);
    let bound = spo_vars().bind(Position::Subject, &a).unwrap();
    let _ = bound.bind(Position::Subject, &g1);
}

#[test]
fn mock_handles_cannot_be_bound() {
    let fx = fixture();
    let mock = resolve(&fx.ctx, &ExternalTerm::typed("v", "http://ex/dt")).unwrap().unwrap();
    assert!(mock.is_mock());
    let before = spo_vars();
    assert!(before.bind(Position::Object, &mock).is_err());
    assert_eq!(before, spo_vars());
}

#[test]
fn context_can_be_bound_once() {
    let fx = fixture();
    let (_, g1, _) = terms(&fx);
    let store = MemoryTripleStore::new(true);
    let path = store.access_path(spo_vars()).unwrap();
    assert!(path.predicate().get(Position::Context).is_none());
    let in_g1 = path.bind_context(&g1).unwrap();
    assert_eq!(in_g1.predicate().get(Position::Context), Some(&VarOrConst::Const(g1.clone())));
    assert_eq!(in_g1.key_order(), SpoKeyOrder::Cspo);
    let again = in_g1.bind_context(&g1).unwrap();
    assert_eq!(again, in_g1);
}

#[test]
#[should_panic(expected = "binding conflict")]
fn context_bound_to_another_graph_panics() {
    let fx = fixture();
    let (_, g1, g2) = terms(&fx);
    let store = MemoryTripleStore::new(true);
    let in_g1 = store.access_path(spo_vars()).unwrap().bind_context(&g1).unwrap();
    let _ = in_g1.bind_context(&g2);
}

#[test]
fn triples_only_relations_have_no_context() {
    let fx = fixture();
    let (_, g1, _) = terms(&fx);
    let store = MemoryTripleStore::new(false);
    let path = store.access_path(spo_vars()).unwrap();
    assert!(path.bind_context(&g1).is_err());
    assert!(store
        .access_path(spo_vars().with_context(VarOrConst::var("c")))
        .is_err());
}

#[test]
fn binding_moves_the_path_to_a_better_index() {
    let fx = fixture();
    let (a, g1, _) = terms(&fx);
    let p = fx.intern(&ex("p"));
    let store = MemoryTripleStore::new(true);
    let path = store.access_path(spo_vars()).unwrap();
    assert_eq!(path.key_order(), SpoKeyOrder::Spoc);
    let by_p = path.bind_position(Position::Predicate, &p).unwrap();
    assert_eq!(by_p.key_order(), SpoKeyOrder::Pocs);
    let by_pc = by_p.bind_context(&g1).unwrap();
    assert_eq!(by_pc.key_order(), SpoKeyOrder::Pcso);
    let by_pcs = by_pc.bind_position(Position::Subject, &a).unwrap();
    assert_eq!(by_pcs.key_order(), SpoKeyOrder::Pcso);
}

#[test]
fn quad_key_orders() {
    let fx = fixture();
    let c = VarOrConst::Const(fx.intern(&ex("c")));
    let k = VarOrConst::Const(fx.intern(&ex("k")));
    let v = VarOrConst::var;
    let cases = [
        (SpoPredicate::new(v("s"), v("p"), v("o")), SpoKeyOrder::Spoc),
        (SpoPredicate::new(k.clone(), v("p"), v("o")), SpoKeyOrder::Spoc),
        (SpoPredicate::new(k.clone(), k.clone(), v("o")), SpoKeyOrder::Spoc),
        (SpoPredicate::new(k.clone(), k.clone(), k.clone()), SpoKeyOrder::Spoc),
        (SpoPredicate::new(v("s"), k.clone(), v("o")), SpoKeyOrder::Pocs),
        (SpoPredicate::new(v("s"), k.clone(), k.clone()), SpoKeyOrder::Pocs),
        (SpoPredicate::new(v("s"), k.clone(), k.clone()).with_context(c.clone()), SpoKeyOrder::Pocs),
        (SpoPredicate::new(v("s"), v("p"), k.clone()), SpoKeyOrder::Ocsp),
        (SpoPredicate::new(v("s"), v("p"), k.clone()).with_context(c.clone()), SpoKeyOrder::Ocsp),
        (SpoPredicate::new(k.clone(), v("p"), k.clone()).with_context(c.clone()), SpoKeyOrder::Ocsp),
        (SpoPredicate::new(v("s"), v("p"), v("o")).with_context(c.clone()), SpoKeyOrder::Cspo),
        (SpoPredicate::new(k.clone(), v("p"), v("o")).with_context(c.clone()), SpoKeyOrder::Cspo),
        (SpoPredicate::new(v("s"), k.clone(), v("o")).with_context(c.clone()), SpoKeyOrder::Pcso),
        (SpoPredicate::new(k.clone(), k.clone(), v("o")).with_context(c.clone()), SpoKeyOrder::Pcso),
        (SpoPredicate::new(k.clone(), v("p"), k.clone()), SpoKeyOrder::Sopc),
        (SpoPredicate::new(k.clone(), k.clone(), k.clone()).with_context(c.clone()), SpoKeyOrder::Spoc),
        (SpoPredicate::new(v("s"), v("p"), v("o")).with_context(v("c")), SpoKeyOrder::Spoc),
    ];
    for (predicate, expected) in cases {
        assert_eq!(SpoKeyOrder::for_query(&predicate, true), expected, "{predicate}");
    }
}

#[test]
fn triple_key_orders() {
    let fx = fixture();
    let k = VarOrConst::Const(fx.intern(&ex("k")));
    let v = VarOrConst::var;
    let cases = [
        (SpoPredicate::new(v("s"), v("p"), v("o")), SpoKeyOrder::Spo),
        (SpoPredicate::new(k.clone(), v("p"), v("o")), SpoKeyOrder::Spo),
        (SpoPredicate::new(k.clone(), k.clone(), v("o")), SpoKeyOrder::Spo),
        (SpoPredicate::new(k.clone(), k.clone(), k.clone()), SpoKeyOrder::Spo),
        (SpoPredicate::new(v("s"), k.clone(), v("o")), SpoKeyOrder::Pos),
        (SpoPredicate::new(v("s"), k.clone(), k.clone()), SpoKeyOrder::Pos),
        (SpoPredicate::new(v("s"), v("p"), k.clone()), SpoKeyOrder::Osp),
        (SpoPredicate::new(k.clone(), v("p"), k.clone()), SpoKeyOrder::Osp),
    ];
    for (predicate, expected) in cases {
        assert_eq!(SpoKeyOrder::for_query(&predicate, false), expected, "{predicate}");
    }
    assert_eq!(SpoKeyOrder::Osp.to_string(), "OSP");
    assert_eq!(SpoKeyOrder::Pcso.to_string(), "PCSO");
}

#[test]
fn predicates_from_resolved_patterns() {
    let fx = fixture();
    let p = fx.intern(&ex("p"));
    let mut pattern = StatementPattern::new(
        TermNode::var("s"),
        TermNode::uri("http://ex/p"),
        TermNode::constant(ExternalTerm::typed("42", XSD_INTEGER)),
    );
    // constants need their handles first
    assert!(SpoPredicate::try_from(&pattern).is_err());
    for term in pattern.terms_mut() {
        if let Some(constant) = term.as_constant_mut() {
            let iv = resolve(&fx.ctx, constant.term()).unwrap();
            constant.set_iv(iv);
        }
    }
    let predicate = SpoPredicate::try_from(&pattern).unwrap();
    assert_eq!(predicate.get(Position::Predicate), Some(&VarOrConst::Const(p)));
    assert!(predicate.get(Position::Object).unwrap().as_const().unwrap().is_inline());
    assert!(predicate.get(Position::Context).is_none());
    assert!(!predicate.is_fully_bound());
}
