mod common;

use tessera::access_path::{SpoKeyOrder, SpoRelation};
use tessera::config::StoreSettings;
use tessera::error::Result;
use tessera::iv::Iv;
use tessera::predicate::{Position, Spo, SpoPredicate, StatementType, VarOrConst};
use tessera::store::MemoryTripleStore;

use common::{ex, fixture, Fixture};

struct Terms {
    alice: Iv,
    bob: Iv,
    carol: Iv,
    knows: Iv,
    likes: Iv,
    g1: Iv,
    g2: Iv,
}

fn terms(fx: &Fixture) -> Terms {
    Terms {
        alice: fx.intern(&ex("alice")),
        bob: fx.intern(&ex("bob")),
        carol: fx.intern(&ex("carol")),
        knows: fx.intern(&ex("knows")),
        likes: fx.intern(&ex("likes")),
        g1: fx.intern(&ex("g1")),
        g2: fx.intern(&ex("g2")),
    }
}

fn any() -> SpoPredicate {
    SpoPredicate::new(VarOrConst::var("s"), VarOrConst::var("p"), VarOrConst::var("o"))
}

fn seeded(t: &Terms) -> MemoryTripleStore {
    let store = MemoryTripleStore::from_settings(&StoreSettings::default());
    for spo in [
        Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone()),
        Spo::quad(t.alice.clone(), t.knows.clone(), t.carol.clone(), t.g1.clone()),
        Spo::quad(t.bob.clone(), t.knows.clone(), t.carol.clone(), t.g2.clone()),
        Spo::quad(t.alice.clone(), t.likes.clone(), t.alice.clone(), t.g2.clone()),
    ] {
        assert!(store.add(spo).unwrap());
    }
    store
}

#[test]
fn adding_twice_keeps_one_statement() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    assert!(!store.add(Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone())).unwrap());
    assert_eq!(store.len().unwrap(), 4);
    assert!(store.add(Spo::triple(t.alice.clone(), t.knows.clone(), t.bob.clone())).is_err());
}

#[test]
fn scans_match_bound_positions() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let all = store.access_path(any()).unwrap();
    assert_eq!(all.count().unwrap(), 4);
    let from_alice = all.bind_position(Position::Subject, &t.alice).unwrap();
    assert_eq!(from_alice.count().unwrap(), 3);
    let knows_carol = all
        .bind_position(Position::Predicate, &t.knows)
        .unwrap()
        .bind_position(Position::Object, &t.carol)
        .unwrap();
    let subjects: Vec<Iv> = knows_carol.iter().unwrap().map(|spo| spo.s).collect();
    assert_eq!(subjects.len(), 2);
    assert!(subjects.contains(&t.alice) && subjects.contains(&t.bob));
    let in_g2 = all.bind_context(&t.g2).unwrap();
    assert_eq!(in_g2.count().unwrap(), 2);
    // subject and object on the SOPC index
    let alice_bob = from_alice.bind_position(Position::Object, &t.bob).unwrap();
    assert_eq!(alice_bob.count().unwrap(), 1);
}

#[test]
fn repeated_variables_must_match_the_same_term() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let reflexive = SpoPredicate::new(VarOrConst::var("x"), VarOrConst::var("p"), VarOrConst::var("x"));
    let matched: Vec<Spo> = store.access_path(reflexive).unwrap().iter().unwrap().collect();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].p, t.likes);
}

#[test]
fn iteration_restarts_and_sees_new_statements() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let path = store.access_path(any()).unwrap().bind_position(Position::Subject, &t.carol).unwrap();
    assert_eq!(path.iter().unwrap().count(), 0);
    store.add(Spo::quad(t.carol.clone(), t.likes.clone(), t.bob.clone(), t.g1.clone())).unwrap();
    assert_eq!(path.iter().unwrap().count(), 1);
    assert_eq!(path.iter().unwrap().count(), 1);
}

#[test]
fn remove_all_removes_what_the_path_matches() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let path = store.access_path(any()).unwrap().bind_context(&t.g1).unwrap();
    assert_eq!(path.remove_all().unwrap(), 2);
    assert_eq!(store.len().unwrap(), 2);
    assert!(path.is_empty().unwrap());
    // every index agrees
    let by_predicate = store.access_path(any()).unwrap().bind_position(Position::Predicate, &t.knows).unwrap();
    assert_eq!(by_predicate.count().unwrap(), 1);
    assert_eq!(path.remove_all().unwrap(), 0);
}

#[test]
fn retraction_follows_justifications() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let ab = Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone());
    let bc = Spo::quad(t.bob.clone(), t.knows.clone(), t.carol.clone(), t.g2.clone());
    let ac = Spo::quad(t.alice.clone(), t.likes.clone(), t.carol.clone(), t.g2.clone());
    let ca = Spo::quad(t.carol.clone(), t.likes.clone(), t.alice.clone(), t.g2.clone());
    assert!(store.add_inferred(ac.clone(), &[ab.clone(), bc.clone()]).unwrap());
    // derived from the inference above
    assert!(store.add_inferred(ca.clone(), &[ac.clone()]).unwrap());
    assert_eq!(store.get(&ac).unwrap().unwrap().statement_type, StatementType::Inferred);

    let path = store
        .access_path(any())
        .unwrap()
        .bind_position(Position::Subject, &t.alice)
        .unwrap()
        .bind_position(Position::Object, &t.bob)
        .unwrap();
    // the explicit statement and both inferences that depended on it
    assert_eq!(path.remove_all().unwrap(), 3);
    assert!(!store.contains(&ac).unwrap());
    assert!(!store.contains(&ca).unwrap());
    assert!(store.contains(&bc).unwrap());
}

#[test]
fn inferences_with_other_support_survive() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let ab = Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone());
    let ac = Spo::quad(t.alice.clone(), t.knows.clone(), t.carol.clone(), t.g1.clone());
    let derived = Spo::quad(t.alice.clone(), t.likes.clone(), t.bob.clone(), t.g1.clone());
    store.add_inferred(derived.clone(), &[ab.clone()]).unwrap();
    assert!(!store.add_inferred(derived.clone(), &[ac]).unwrap());
    assert_eq!(store.remove_statements(vec![ab]).unwrap(), 1);
    assert!(store.contains(&derived).unwrap());
}

#[test]
fn axioms_and_missing_antecedents() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let axiom = Spo::quad(t.knows.clone(), t.knows.clone(), t.knows.clone(), t.g1.clone())
        .with_type(StatementType::Axiom);
    store.add(axiom.clone()).unwrap();
    let path = store.access_path(any()).unwrap().bind_position(Position::Subject, &t.knows).unwrap();
    assert_eq!(path.remove_all().unwrap(), 0);
    assert!(store.contains(&axiom).unwrap());

    let unknown = Spo::quad(t.carol.clone(), t.knows.clone(), t.alice.clone(), t.g1.clone());
    let derived = Spo::quad(t.carol.clone(), t.likes.clone(), t.alice.clone(), t.g1.clone());
    assert!(store.add_inferred(derived, &[unknown]).is_err());
}

#[test]
fn explicit_assertion_upgrades_an_inference() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let ab = Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone());
    let derived = Spo::quad(t.bob.clone(), t.likes.clone(), t.alice.clone(), t.g1.clone());
    store.add_inferred(derived.clone(), &[ab.clone()]).unwrap();
    assert!(!store.add(derived.clone()).unwrap());
    assert_eq!(store.get(&derived).unwrap().unwrap().statement_type, StatementType::Explicit);
    store.remove_statements(vec![ab]).unwrap();
    assert!(store.contains(&derived).unwrap());
}

#[test]
fn triple_stores() {
    let fx = fixture();
    let t = terms(&fx);
    let store = MemoryTripleStore::new(false);
    store.add(Spo::triple(t.alice.clone(), t.knows.clone(), t.bob.clone())).unwrap();
    store.add(Spo::triple(t.bob.clone(), t.knows.clone(), t.alice.clone())).unwrap();
    assert!(store.add(Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone())).is_err());
    let to_alice = store.access_path(any()).unwrap().bind_position(Position::Object, &t.alice).unwrap();
    assert_eq!(to_alice.count().unwrap(), 1);
    assert_eq!(to_alice.remove_all().unwrap(), 1);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn mock_constants_match_nothing() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let mock = tessera::resolver::resolve(&fx.ctx, &tessera::term::ExternalTerm::typed("z", "http://ex/dt"))
        .unwrap()
        .unwrap();
    let predicate = SpoPredicate::new(VarOrConst::var("s"), VarOrConst::var("p"), VarOrConst::Const(mock));
    let path = store.access_path(predicate).unwrap();
    assert!(path.is_empty().unwrap());
    assert_eq!(path.remove_all().unwrap(), 0);
    assert_eq!(store.len().unwrap(), 4);
}

#[test]
fn withdrawn_assertions_that_are_still_entailed_stay_inferred() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let base = Spo::quad(t.alice.clone(), t.knows.clone(), t.bob.clone(), t.g1.clone());
    let entailed = Spo::quad(t.bob.clone(), t.likes.clone(), t.carol.clone(), t.g1.clone());
    assert!(store.add(entailed.clone()).unwrap());
    assert!(!store.add_inferred(entailed.clone(), &[base.clone()]).unwrap());
    assert_eq!(store.get(&entailed).unwrap().unwrap().statement_type, StatementType::Explicit);

    let path = store
        .access_path(any())
        .unwrap()
        .bind_position(Position::Predicate, &t.likes)
        .unwrap()
        .bind_position(Position::Object, &t.carol)
        .unwrap();
    // nothing leaves the store, the statement only loses its assertion
    assert_eq!(path.remove_all().unwrap(), 0);
    assert_eq!(store.get(&entailed).unwrap().unwrap().statement_type, StatementType::Inferred);

    // once its support goes, so does the statement
    assert_eq!(store.remove_statements(vec![base]).unwrap(), 2);
    assert!(!store.contains(&entailed).unwrap());
}

#[test]
fn removal_in_one_step_matches_what_a_scan_sees() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let path = store.access_path(any()).unwrap().bind_position(Position::Predicate, &t.knows).unwrap();
    let scanned = store.scan(path.key_order(), path.predicate()).unwrap();
    assert_eq!(scanned.len(), 3);
    assert_eq!(store.remove_matching(path.key_order(), path.predicate()).unwrap(), 3);
    assert!(store.scan(path.key_order(), path.predicate()).unwrap().is_empty());
    assert_eq!(store.len().unwrap(), 1);
}

// a relation that only knows how to scan and remove
struct Delegating<'a>(&'a MemoryTripleStore);

impl SpoRelation for Delegating<'_> {
    fn quads(&self) -> bool {
        self.0.quads()
    }
    fn scan(&self, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<Vec<Spo>> {
        self.0.scan(key_order, predicate)
    }
    fn remove_statements(&self, statements: Vec<Spo>) -> Result<usize> {
        self.0.remove_statements(statements)
    }
}

#[test]
fn relations_without_their_own_matching_removal() {
    let fx = fixture();
    let t = terms(&fx);
    let store = seeded(&t);
    let relation = Delegating(&store);
    let path = relation.access_path(any()).unwrap().bind_context(&t.g2).unwrap();
    assert_eq!(path.remove_all().unwrap(), 2);
    assert_eq!(store.len().unwrap(), 2);
}
