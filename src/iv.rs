//! Resolved handles ("internal values").
//!
//! An [`Iv`] stands in for an [`ExternalTerm`] inside the engine. It is one of
//! * a dictionary handle ([`TermId`]) issued by a specific lexicon,
//! * an inline handle carrying the literal's value itself ([`InlineValue`]),
//! * a mock handle, a placeholder for a term that is neither in the lexicon
//!   nor inline encodable, which can never match an index entry.
//!
//! Every handle keeps a reference to the term it was produced from, so that
//! it can be displayed (and materialized) without another dictionary round trip.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::datatype::InlineValue;
use crate::error::{Result, TesseraError};
use crate::term::{ExternalTerm, TermKind};

/// Identifies the lexicon instance that issued a dictionary handle.
pub type Namespace = u32;

#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct TermId {
    namespace: Namespace,
    kind: TermKind,
    id: u64,
}
impl TermId {
    pub fn new(namespace: Namespace, kind: TermKind, id: u64) -> Self {
        Self { namespace, kind, id }
    }
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }
    pub fn kind(&self) -> TermKind {
        self.kind
    }
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub enum IvRepr {
    Term(TermId),
    Inline(InlineValue),
    Mock(TermKind),
}

#[derive(Clone, Debug)]
pub struct Iv {
    repr: IvRepr,
    value: Arc<ExternalTerm>,
}

impl Iv {
    pub fn term(id: TermId, value: Arc<ExternalTerm>) -> Self {
        Self { repr: IvRepr::Term(id), value }
    }
    pub fn inline(inline: InlineValue, value: Arc<ExternalTerm>) -> Self {
        Self { repr: IvRepr::Inline(inline), value }
    }
    pub fn mock(value: Arc<ExternalTerm>) -> Self {
        Self { repr: IvRepr::Mock(value.kind()), value }
    }
    pub fn repr(&self) -> &IvRepr {
        &self.repr
    }
    /// The external term this handle was resolved from.
    pub fn value(&self) -> &Arc<ExternalTerm> {
        &self.value
    }
    pub fn kind(&self) -> TermKind {
        match &self.repr {
            IvRepr::Term(id) => id.kind(),
            IvRepr::Inline(_) => TermKind::Literal,
            IvRepr::Mock(kind) => *kind,
        }
    }
    pub fn term_id(&self) -> Option<&TermId> {
        match &self.repr {
            IvRepr::Term(id) => Some(id),
            _ => None,
        }
    }
    pub fn as_inline(&self) -> Option<&InlineValue> {
        match &self.repr {
            IvRepr::Inline(inline) => Some(inline),
            _ => None,
        }
    }
    pub fn is_term(&self) -> bool {
        matches!(self.repr, IvRepr::Term(_))
    }
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, IvRepr::Inline(_))
    }
    pub fn is_mock(&self) -> bool {
        matches!(self.repr, IvRepr::Mock(_))
    }
    /// Dictionary handle issued by the lexicon with the given namespace.
    pub fn is_from(&self, namespace: Namespace) -> bool {
        matches!(&self.repr, IvRepr::Term(id) if id.namespace() == namespace)
    }

    /// Appends the binary index key of this handle. Mock handles have no key
    /// since they cannot appear in any index.
    pub fn encode_key(&self, key: &mut Vec<u8>) -> Result<()> {
        match &self.repr {
            IvRepr::Term(id) => {
                key.push(id.kind().flag());
                key.extend(id.namespace().to_be_bytes());
                key.extend(id.id().to_be_bytes());
                Ok(())
            }
            IvRepr::Inline(inline) => {
                inline.encode_key(key);
                Ok(())
            }
            IvRepr::Mock(_) => Err(TesseraError::InvalidArgument(format!(
                "mock handle for {} has no index key",
                self.value
            ))),
        }
    }
}

// Dictionary and inline handles are equal when their encodings are. Mock
// handles have no identity of their own, so the kind and the original term decide.
impl PartialEq for Iv {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (IvRepr::Mock(a), IvRepr::Mock(b)) => a == b && self.value == other.value,
            (a, b) => a == b,
        }
    }
}
impl Eq for Iv {}
impl Hash for Iv {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repr.hash(state);
        if self.is_mock() {
            self.value.hash(state);
        }
    }
}
impl fmt::Display for Iv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.repr {
            IvRepr::Term(id) => write!(f, "TermId({}:{}{})", id.namespace(), id.kind(), id.id()),
            IvRepr::Inline(inline) => write!(f, "Inline({})", inline),
            IvRepr::Mock(kind) => write!(f, "Mock({}, {})", kind, self.value),
        }
    }
}
