//! Index-backed access paths and the choice of index for a predicate.

use std::fmt;

use tracing::trace;

use crate::error::{Result, TesseraError};
use crate::iv::Iv;
use crate::predicate::{Position, Spo, SpoPredicate, VarOrConst};

use crate::predicate::Position::{Context as C, Object as O, Predicate as P, Subject as S};

// ------------- Key orders -------------
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub enum SpoKeyOrder {
    Spo,
    Pos,
    Osp,
    Spoc,
    Pocs,
    Ocsp,
    Cspo,
    Pcso,
    Sopc,
}

impl SpoKeyOrder {
    pub const TRIPLE_ORDERS: [SpoKeyOrder; 3] = [SpoKeyOrder::Spo, SpoKeyOrder::Pos, SpoKeyOrder::Osp];
    pub const QUAD_ORDERS: [SpoKeyOrder; 6] = [
        SpoKeyOrder::Spoc,
        SpoKeyOrder::Pocs,
        SpoKeyOrder::Ocsp,
        SpoKeyOrder::Cspo,
        SpoKeyOrder::Pcso,
        SpoKeyOrder::Sopc,
    ];

    pub fn positions(&self) -> &'static [Position] {
        match self {
            SpoKeyOrder::Spo => &[S, P, O],
            SpoKeyOrder::Pos => &[P, O, S],
            SpoKeyOrder::Osp => &[O, S, P],
            SpoKeyOrder::Spoc => &[S, P, O, C],
            SpoKeyOrder::Pocs => &[P, O, C, S],
            SpoKeyOrder::Ocsp => &[O, C, S, P],
            SpoKeyOrder::Cspo => &[C, S, P, O],
            SpoKeyOrder::Pcso => &[P, C, S, O],
            SpoKeyOrder::Sopc => &[S, O, P, C],
        }
    }
    pub fn is_quad(&self) -> bool {
        self.positions().len() == 4
    }

    /// The key order whose leading positions are exactly the bound positions
    /// of `predicate`, so that a scan reads one contiguous key range.
    pub fn for_query(predicate: &SpoPredicate, quads: bool) -> SpoKeyOrder {
        let (s, p, o, c) = (S.bit(), P.bit(), O.bit(), C.bit());
        let mask = predicate.bound_mask();
        if quads {
            match mask {
                m if m == p || m == p | o || m == p | o | c => SpoKeyOrder::Pocs,
                m if m == o || m == o | c || m == o | c | s => SpoKeyOrder::Ocsp,
                m if m == c || m == c | s => SpoKeyOrder::Cspo,
                m if m == p | c || m == p | c | s => SpoKeyOrder::Pcso,
                m if m == s | o => SpoKeyOrder::Sopc,
                _ => SpoKeyOrder::Spoc,
            }
        } else {
            match mask & !c {
                m if m == p || m == p | o => SpoKeyOrder::Pos,
                m if m == o || m == o | s => SpoKeyOrder::Osp,
                _ => SpoKeyOrder::Spo,
            }
        }
    }

    /// The key of `spo` in this order.
    pub fn encode_key(&self, spo: &Spo) -> Result<Vec<u8>> {
        let mut key = Vec::with_capacity(13 * 4);
        for position in self.positions() {
            let iv = spo.get(*position).ok_or_else(|| {
                TesseraError::InvalidArgument(format!("{} has no context for key order {}", spo, self))
            })?;
            iv.encode_key(&mut key)?;
        }
        Ok(key)
    }

    /// The encoded constants of `predicate` leading this order's key. A mock
    /// constant has no key, and the predicate then has no prefix at all.
    pub fn key_prefix(&self, predicate: &SpoPredicate) -> Option<Vec<u8>> {
        let mut prefix = Vec::new();
        for position in self.positions() {
            match predicate.get(*position) {
                Some(VarOrConst::Const(iv)) => iv.encode_key(&mut prefix).ok()?,
                _ => break,
            }
        }
        Some(prefix)
    }
}

impl fmt::Display for SpoKeyOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for position in self.positions() {
            write!(f, "{}", position.to_string().to_uppercase())?;
        }
        Ok(())
    }
}

// ------------- Relations -------------
/// The owner of the statement indices. It decides which index serves a
/// predicate and carries out removals, including the bookkeeping that
/// removing statements entails.
pub trait SpoRelation: Send + Sync {
    /// Whether statements carry a context position.
    fn quads(&self) -> bool;

    fn key_order(&self, predicate: &SpoPredicate) -> SpoKeyOrder {
        let key_order = SpoKeyOrder::for_query(predicate, self.quads());
        trace!(predicate = %predicate, key_order = %key_order, "index selected");
        key_order
    }

    /// The statements matching `predicate`, read from the `key_order` index.
    fn scan(&self, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<Vec<Spo>>;

    /// Removes the given statements as one unit of work, returning how
    /// many statements were removed.
    fn remove_statements(&self, statements: Vec<Spo>) -> Result<usize>;

    /// Removes the statements matching `predicate`. Relations that can hold
    /// their indices across the scan and the removal should do so.
    fn remove_matching(&self, key_order: SpoKeyOrder, predicate: &SpoPredicate) -> Result<usize> {
        self.remove_statements(self.scan(key_order, predicate)?)
    }

    fn access_path(&self, predicate: SpoPredicate) -> Result<SpoAccessPath<'_>>
    where
        Self: Sized,
    {
        SpoAccessPath::new(self, predicate)
    }
}

// ------------- Access paths -------------
#[derive(Clone)]
pub struct SpoAccessPath<'r> {
    relation: &'r dyn SpoRelation,
    predicate: SpoPredicate,
    key_order: SpoKeyOrder,
}

impl<'r> SpoAccessPath<'r> {
    pub fn new(relation: &'r dyn SpoRelation, predicate: SpoPredicate) -> Result<Self> {
        if !relation.quads() && predicate.get(Position::Context).is_some() {
            return Err(TesseraError::InvalidArgument(format!(
                "{} has a context but the relation holds triples only",
                predicate
            )));
        }
        let key_order = relation.key_order(&predicate);
        Ok(Self { relation, predicate, key_order })
    }
    pub fn predicate(&self) -> &SpoPredicate {
        &self.predicate
    }
    pub fn key_order(&self) -> SpoKeyOrder {
        self.key_order
    }

    /// The access path for this path's predicate with `position` bound to
    /// `value`, on the index the relation picks for it.
    pub fn bind_position(&self, position: Position, value: &Iv) -> Result<SpoAccessPath<'r>> {
        if position == Position::Context && !self.relation.quads() {
            return Err(TesseraError::InvalidArgument(format!(
                "cannot bind the context of {}, the relation holds triples only",
                self.predicate
            )));
        }
        let predicate = self.predicate.bind(position, value)?;
        SpoAccessPath::new(self.relation, predicate)
    }
    pub fn bind_context(&self, value: &Iv) -> Result<SpoAccessPath<'r>> {
        self.bind_position(Position::Context, value)
    }

    /// The matching statements. Every call scans the index again.
    pub fn iter(&self) -> Result<std::vec::IntoIter<Spo>> {
        Ok(self.relation.scan(self.key_order, &self.predicate)?.into_iter())
    }
    pub fn count(&self) -> Result<usize> {
        Ok(self.relation.scan(self.key_order, &self.predicate)?.len())
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Removes every statement currently matched by this path through the
    /// relation's batched removal.
    pub fn remove_all(&self) -> Result<usize> {
        self.relation.remove_matching(self.key_order, &self.predicate)
    }
}

impl PartialEq for SpoAccessPath<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.key_order == other.key_order
    }
}

impl fmt::Debug for SpoAccessPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SpoAccessPath")
            .field("predicate", &self.predicate)
            .field("key_order", &self.key_order)
            .finish()
    }
}
