//! Statements and the patterns matched against them.

use std::fmt;

use crate::ast::{StatementPattern, TermNode};
use crate::error::{Result, TesseraError};
use crate::iv::Iv;

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Context,
}
impl Position {
    pub const ALL: [Position; 4] = [Position::Subject, Position::Predicate, Position::Object, Position::Context];

    pub fn bit(&self) -> u8 {
        match self {
            Position::Subject => 1,
            Position::Predicate => 2,
            Position::Object => 4,
            Position::Context => 8,
        }
    }
}
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Position::Subject => "s",
            Position::Predicate => "p",
            Position::Object => "o",
            Position::Context => "c",
        };
        f.write_str(name)
    }
}

// ------------- Statements -------------
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum StatementType {
    Explicit,
    Inferred,
    Axiom,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Spo {
    pub s: Iv,
    pub p: Iv,
    pub o: Iv,
    pub c: Option<Iv>,
    pub statement_type: StatementType,
}
impl Spo {
    pub fn triple(s: Iv, p: Iv, o: Iv) -> Self {
        Self { s, p, o, c: None, statement_type: StatementType::Explicit }
    }
    pub fn quad(s: Iv, p: Iv, o: Iv, c: Iv) -> Self {
        Self { c: Some(c), ..Self::triple(s, p, o) }
    }
    pub fn with_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = statement_type;
        self
    }
    pub fn get(&self, position: Position) -> Option<&Iv> {
        match position {
            Position::Subject => Some(&self.s),
            Position::Predicate => Some(&self.p),
            Position::Object => Some(&self.o),
            Position::Context => self.c.as_ref(),
        }
    }
    /// Same statement, regardless of how it came to be asserted.
    pub fn same_terms(&self, other: &Spo) -> bool {
        self.s == other.s && self.p == other.p && self.o == other.o && self.c == other.c
    }
}
impl fmt::Display for Spo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {}", self.s, self.p, self.o)?;
        if let Some(c) = &self.c {
            write!(f, ", {}", c)?;
        }
        write!(f, ")")
    }
}

// ------------- Predicates -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarOrConst {
    Var(String),
    Const(Iv),
}
impl VarOrConst {
    pub fn var(name: impl Into<String>) -> Self {
        VarOrConst::Var(name.into())
    }
    pub fn is_var(&self) -> bool {
        matches!(self, VarOrConst::Var(_))
    }
    pub fn as_const(&self) -> Option<&Iv> {
        match self {
            VarOrConst::Const(iv) => Some(iv),
            VarOrConst::Var(_) => None,
        }
    }
}
impl fmt::Display for VarOrConst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VarOrConst::Var(name) => write!(f, "?{}", name),
            VarOrConst::Const(iv) => write!(f, "{}", iv),
        }
    }
}

/// A statement pattern over handles. A missing context means the pattern
/// does not constrain the graph at all.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpoPredicate {
    s: VarOrConst,
    p: VarOrConst,
    o: VarOrConst,
    c: Option<VarOrConst>,
}

impl SpoPredicate {
    pub fn new(s: VarOrConst, p: VarOrConst, o: VarOrConst) -> Self {
        Self { s, p, o, c: None }
    }
    pub fn with_context(mut self, c: VarOrConst) -> Self {
        self.c = Some(c);
        self
    }
    pub fn get(&self, position: Position) -> Option<&VarOrConst> {
        match position {
            Position::Subject => Some(&self.s),
            Position::Predicate => Some(&self.p),
            Position::Object => Some(&self.o),
            Position::Context => self.c.as_ref(),
        }
    }
    fn slots_mut(&mut self) -> impl Iterator<Item = &mut VarOrConst> {
        [&mut self.s, &mut self.p, &mut self.o].into_iter().chain(self.c.as_mut())
    }
    /// Bit set of the positions holding a constant, see [`Position::bit`].
    pub fn bound_mask(&self) -> u8 {
        Position::ALL
            .iter()
            .filter(|position| self.get(**position).is_some_and(|slot| !slot.is_var()))
            .fold(0, |mask, position| mask | position.bit())
    }
    pub fn is_fully_bound(&self) -> bool {
        Position::ALL
            .iter()
            .all(|position| self.get(*position).is_none_or(|slot| !slot.is_var()))
    }

    /// A new predicate with `position` pinned to `value`.
    ///
    /// A variable is replaced by `value` wherever it occurs in this predicate.
    /// A missing context is set directly. Binding a position to the constant
    /// it already holds returns an equal predicate.
    ///
    /// # Panics
    /// If the position already holds a different constant. Callers track
    /// which positions they bound, so this is a logic error on their side.
    pub fn bind(&self, position: Position, value: &Iv) -> Result<SpoPredicate> {
        if value.is_mock() {
            return Err(TesseraError::InvalidArgument(format!(
                "cannot bind {} to {}, the term is not in the lexicon",
                position, value
            )));
        }
        match self.get(position) {
            None => {
                let mut bound = self.clone();
                bound.c = Some(VarOrConst::Const(value.clone()));
                Ok(bound)
            }
            Some(VarOrConst::Var(name)) => {
                let name = name.clone();
                let mut bound = self.clone();
                for slot in bound.slots_mut() {
                    if matches!(slot, VarOrConst::Var(other) if *other == name) {
                        *slot = VarOrConst::Const(value.clone());
                    }
                }
                Ok(bound)
            }
            Some(VarOrConst::Const(existing)) if existing == value => Ok(self.clone()),
            Some(VarOrConst::Const(existing)) => panic!(
                "binding conflict on {}: {} is already bound to {}, cannot rebind to {}",
                self, position, existing, value
            ),
        }
    }

    /// Whether `spo` is one of the statements this predicate describes,
    /// including the equality of repeated variables.
    pub fn matches(&self, spo: &Spo) -> bool {
        let mut seen: Vec<(&str, &Iv)> = Vec::with_capacity(4);
        for position in Position::ALL {
            let Some(slot) = self.get(position) else {
                continue;
            };
            let Some(value) = spo.get(position) else {
                return false;
            };
            match slot {
                VarOrConst::Const(iv) if iv != value => return false,
                VarOrConst::Const(_) => (),
                VarOrConst::Var(name) => match seen.iter().find(|(seen_name, _)| *seen_name == name.as_str()) {
                    Some((_, earlier)) if *earlier != value => return false,
                    Some(_) => (),
                    None => seen.push((name.as_str(), value)),
                },
            }
        }
        true
    }
}

impl fmt::Display for SpoPredicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "spo({}, {}, {}", self.s, self.p, self.o)?;
        if let Some(c) = &self.c {
            write!(f, ", {}", c)?;
        }
        write!(f, ")")
    }
}

fn slot(term: &TermNode) -> Result<VarOrConst> {
    match term {
        TermNode::Var(var) => Ok(VarOrConst::Var(var.name.clone())),
        TermNode::Const(constant) => match constant.iv() {
            Some(iv) => Ok(VarOrConst::Const(iv.clone())),
            None => Err(TesseraError::InvalidArgument(format!(
                "constant {} has not been resolved",
                constant.term()
            ))),
        },
    }
}

/// The predicate of a resolved statement pattern.
impl TryFrom<&StatementPattern> for SpoPredicate {
    type Error = TesseraError;

    fn try_from(pattern: &StatementPattern) -> Result<Self> {
        let predicate = SpoPredicate::new(slot(&pattern.s)?, slot(&pattern.p)?, slot(&pattern.o)?);
        Ok(match &pattern.c {
            Some(c) => predicate.with_context(slot(c)?),
            None => predicate,
        })
    }
}
