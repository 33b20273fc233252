//! An in-memory statement store with one sorted index per key order.
//!
//! Inferred statements are kept together with their justifications, the sets
//! of statements they were derived from. Removing statements retracts every
//! inferred statement left without a justification, and so on transitively.
//! Axioms are never retracted.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::sync::Mutex;

// we will use a fast hashing algo for the index and key maps
use seahash::SeaHasher;

use tracing::{debug, info};

use crate::access_path::{SpoKeyOrder, SpoRelation};
use crate::config::StoreSettings;
use crate::error::{Result, TesseraError};
use crate::predicate::{Spo, SpoPredicate, StatementType};

pub type KeyHasher = BuildHasherDefault<SeaHasher>;

type Index = BTreeMap<Vec<u8>, Spo>;
type Key = Vec<u8>;

#[derive(Debug, Default)]
struct StoreState {
    indices: HashMap<SpoKeyOrder, Index, KeyHasher>,
    // primary key of an inferred statement -> primary keys of each antecedent set
    justifications: HashMap<Key, Vec<Vec<Key>>, KeyHasher>,
}

#[derive(Debug)]
pub struct MemoryTripleStore {
    quads: bool,
    state: Mutex<StoreState>,
}

impl MemoryTripleStore {
    pub fn new(quads: bool) -> Self {
        let orders: &[SpoKeyOrder] = if quads {
            &SpoKeyOrder::QUAD_ORDERS
        } else {
            &SpoKeyOrder::TRIPLE_ORDERS
        };
        let mut state = StoreState::default();
        for order in orders {
            state.indices.insert(*order, Index::new());
        }
        Self {
            quads,
            state: Mutex::new(state),
        }
    }
    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.quads)
    }
    fn primary(&self) -> SpoKeyOrder {
        if self.quads { SpoKeyOrder::Spoc } else { SpoKeyOrder::Spo }
    }
    fn check_shape(&self, spo: &Spo) -> Result<()> {
        match (self.quads, spo.c.is_some()) {
            (true, false) => Err(TesseraError::InvalidArgument(format!("{} needs a context", spo))),
            (false, true) => Err(TesseraError::InvalidArgument(format!(
                "{} has a context but the store holds triples only",
                spo
            ))),
            _ => Ok(()),
        }
    }

    /// Asserts `spo`, returning whether it was not already present. An
    /// explicit assertion of an inferred statement makes it explicit, and its
    /// justifications are kept for when the assertion is removed again.
    pub fn add(&self, spo: Spo) -> Result<bool> {
        self.check_shape(&spo)?;
        let key = self.primary().encode_key(&spo)?;
        let mut state = self.state.lock()?;
        let existing = state
            .indices
            .get(&self.primary())
            .and_then(|index| index.get(&key))
            .map(|kept| kept.statement_type);
        match existing {
            Some(StatementType::Inferred) if spo.statement_type != StatementType::Inferred => {
                if spo.statement_type == StatementType::Axiom {
                    state.justifications.remove(&key);
                }
                Self::write(&mut state, spo)?;
                Ok(false)
            }
            Some(_) => Ok(false),
            None => {
                Self::write(&mut state, spo)?;
                Ok(true)
            }
        }
    }

    /// Adds an inferred statement justified by `antecedents`, which must all
    /// be present already. A statement that is already present keeps its type
    /// and gains the justification, unless it is an axiom.
    pub fn add_inferred(&self, spo: Spo, antecedents: &[Spo]) -> Result<bool> {
        self.check_shape(&spo)?;
        let primary = self.primary();
        let key = primary.encode_key(&spo)?;
        let mut support = Vec::with_capacity(antecedents.len());
        for antecedent in antecedents {
            self.check_shape(antecedent)?;
            support.push(primary.encode_key(antecedent)?);
        }
        let mut state = self.state.lock()?;
        let index = state
            .indices
            .get(&primary)
            .ok_or_else(|| TesseraError::Invariant(format!("no {} index", primary)))?;
        if let Some(missing) = support.iter().position(|antecedent| !index.contains_key(antecedent)) {
            return Err(TesseraError::InvalidArgument(format!(
                "antecedent {} of {} is not in the store",
                antecedents[missing], spo
            )));
        }
        let existing = index.get(&key).map(|kept| kept.statement_type);
        match existing {
            Some(StatementType::Axiom) => Ok(false),
            Some(_) => {
                state.justifications.entry(key).or_default().push(support);
                Ok(false)
            }
            None => {
                state.justifications.entry(key).or_default().push(support);
                Self::write(&mut state, spo.with_type(StatementType::Inferred))?;
                Ok(true)
            }
        }
    }

    pub fn contains(&self, spo: &Spo) -> Result<bool> {
        self.check_shape(spo)?;
        let key = self.primary().encode_key(spo)?;
        let state = self.state.lock()?;
        Ok(state
            .indices
            .get(&self.primary())
            .is_some_and(|index| index.contains_key(&key)))
    }
    pub fn get(&self, spo: &Spo) -> Result<Option<Spo>> {
        self.check_shape(spo)?;
        let key = self.primary().encode_key(spo)?;
        let state = self.state.lock()?;
        Ok(state
            .indices
            .get(&self.primary())
            .and_then(|index| index.get(&key))
            .cloned())
    }
    pub fn len(&self) -> Result<usize> {
        let state = self.state.lock()?;
        Ok(state.indices.get(&self.primary()).map_or(0, Index::len))
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn write(state: &mut StoreState, spo: Spo) -> Result<()> {
        for (order, index) in state.indices.iter_mut() {
            index.insert(order.encode_key(&spo)?, spo.clone());
        }
        Ok(())
    }
    fn erase(state: &mut StoreState, spo: &Spo) -> Result<()> {
        for (order, index) in state.indices.iter_mut() {
            index.remove(&order.encode_key(spo)?);
        }
        Ok(())
    }
}

impl SpoRelation for MemoryTripleStore {
    fn quads(&self) -> bool {
        self.quads
    }

    fn scan(&self, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<Vec<Spo>> {
        let state = self.state.lock()?;
        Self::matching(&state, key_order, predicate)
    }

    fn remove_statements(&self, statements: Vec<Spo>) -> Result<usize> {
        let mut state = self.state.lock()?;
        self.retract(&mut state, statements)
    }

    fn remove_matching(&self, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<usize> {
        let mut state = self.state.lock()?;
        let matched = Self::matching(&state, key_order, predicate)?;
        self.retract(&mut state, matched)
    }
}

impl MemoryTripleStore {
    fn matching(state: &StoreState, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<Vec<Spo>> {
        // a mock constant matches nothing
        let Some(prefix) = key_order.key_prefix(predicate) else {
            return Ok(Vec::new());
        };
        let index = state
            .indices
            .get(&key_order)
            .ok_or_else(|| TesseraError::Store(format!("no {} index in this store", key_order)))?;
        Ok(index
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, spo)| spo)
            .filter(|spo| predicate.matches(spo))
            .cloned()
            .collect())
    }

    fn retract(&self, state: &mut StoreState, statements: Vec<Spo>) -> Result<usize> {
        let primary = self.primary();
        let mut removed: HashSet<Key, KeyHasher> = HashSet::default();
        let mut axioms = 0;
        let mut downgraded = 0;
        for spo in statements {
            let key = primary.encode_key(&spo)?;
            let kept = state.indices.get(&primary).and_then(|index| index.get(&key)).cloned();
            let supported = state.justifications.get(&key).is_some_and(|support| !support.is_empty());
            match kept {
                Some(kept) if kept.statement_type == StatementType::Axiom => axioms += 1,
                // still entailed, so it stays as an inference
                Some(kept) if kept.statement_type == StatementType::Explicit && supported => {
                    debug!(statement = %kept, "assertion withdrawn, statement kept as inferred");
                    Self::write(state, kept.with_type(StatementType::Inferred))?;
                    downgraded += 1;
                }
                Some(kept) => {
                    Self::erase(state, &kept)?;
                    state.justifications.remove(&key);
                    removed.insert(key);
                }
                None => (),
            }
        }
        let explicit = removed.len();
        // retract inferences until every remaining one has some support
        let mut frontier: Vec<Key> = removed.iter().cloned().collect();
        while !frontier.is_empty() {
            let mut unsupported = Vec::new();
            for (key, support) in state.justifications.iter_mut() {
                support.retain(|antecedents| !antecedents.iter().any(|a| frontier.contains(a)));
                if support.is_empty() {
                    unsupported.push(key.clone());
                }
            }
            frontier.clear();
            for key in unsupported {
                state.justifications.remove(&key);
                let kept = state.indices.get(&primary).and_then(|index| index.get(&key)).cloned();
                if let Some(kept) = kept {
                    if kept.statement_type == StatementType::Inferred {
                        Self::erase(state, &kept)?;
                        debug!(statement = %kept, "inference retracted");
                        removed.insert(key.clone());
                        frontier.push(key);
                    }
                }
            }
        }
        info!(
            removed = explicit,
            retracted = removed.len() - explicit,
            axioms_kept = axioms,
            downgraded,
            "statements removed"
        );
        Ok(removed.len())
    }
}
