use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// used to keep the one-to-one mapping between terms and their assigned identifiers
use bimap::BiMap;

use tracing::trace;

use crate::config::LexiconSettings;
use crate::datatype::{Dte, InlineCodec, XsdCodecs};
use crate::error::Result;
use crate::iv::{Iv, Namespace, TermId};
use crate::term::{ExternalTerm, Literal};

/// The term dictionary contract the resolver depends on.
///
/// Lookups may be served concurrently. An implementation must serialize
/// inserts of the same new term so that a committed handle never changes.
pub trait TermDictionary: Send + Sync {
    /// Identity of this dictionary instance, recorded in every handle it issues.
    fn namespace(&self) -> Namespace;
    fn lookup(&self, term: &ExternalTerm) -> Result<Option<Iv>>;
    fn insert_or_get(&self, term: &ExternalTerm) -> Result<Iv>;
    fn materialize(&self, iv: &Iv) -> Result<Option<ExternalTerm>>;
}

static NEXT_NAMESPACE: AtomicU32 = AtomicU32::new(1);

// ------------- Term ids -------------
#[derive(Debug)]
pub struct TermIdGenerator {
    lower_bound: u64,
}

impl TermIdGenerator {
    pub fn new() -> Self {
        Self { lower_bound: 0 }
    }
    pub fn generate(&mut self) -> u64 {
        self.lower_bound += 1;
        self.lower_bound
    }
}

#[derive(Debug)]
struct TermKeeper {
    generator: TermIdGenerator,
    kept: BiMap<Arc<ExternalTerm>, u64>,
}
impl TermKeeper {
    // hands out the kept copy, so equal terms share one allocation
    fn kept_handle(&self, term: &ExternalTerm) -> Option<(Arc<ExternalTerm>, u64)> {
        let id = *self.kept.get_by_left(term)?;
        let kept = self.kept.get_by_right(&id)?;
        Some((Arc::clone(kept), id))
    }
}

// ------------- Lexicon -------------
/// In-memory lexicon keeping every term it is asked to insert. With
/// `inline_literals` the inline-encodable literals are answered with inline
/// handles and never stored.
#[derive(Debug)]
pub struct Lexicon {
    namespace: Namespace,
    inline_literals: bool,
    codecs: XsdCodecs,
    keeper: Mutex<TermKeeper>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::from_settings(&LexiconSettings::default())
    }
    pub fn from_settings(settings: &LexiconSettings) -> Self {
        Self {
            namespace: NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed),
            inline_literals: settings.inline_literals,
            codecs: XsdCodecs,
            keeper: Mutex::new(TermKeeper {
                generator: TermIdGenerator::new(),
                kept: BiMap::new(),
            }),
        }
    }
    pub fn inline_literals(&self) -> bool {
        self.inline_literals
    }
    pub fn len(&self) -> Result<usize> {
        Ok(self.keeper.lock()?.kept.len())
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
    fn inline_type<'a>(&self, term: &'a ExternalTerm) -> Option<(Dte, &'a Literal)> {
        if !self.inline_literals {
            return None;
        }
        let literal = term.as_literal()?;
        let dte = self.codecs.inline_type(literal.datatype()?)?;
        Some((dte, literal))
    }
    fn handle(&self, term: Arc<ExternalTerm>, id: u64) -> Iv {
        Iv::term(TermId::new(self.namespace, term.kind(), id), term)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl TermDictionary for Lexicon {
    fn namespace(&self) -> Namespace {
        self.namespace
    }
    fn lookup(&self, term: &ExternalTerm) -> Result<Option<Iv>> {
        let canonical = term.canonical();
        if let Some((dte, literal)) = self.inline_type(&canonical) {
            // a malformed label is not in the lexicon either
            return Ok(self
                .codecs
                .decode_inline(dte, literal.label())
                .ok()
                .map(|inline| Iv::inline(inline, Arc::new(canonical.clone()))));
        }
        let keeper = self.keeper.lock()?;
        Ok(keeper.kept_handle(&canonical).map(|(kept, id)| self.handle(kept, id)))
    }
    fn insert_or_get(&self, term: &ExternalTerm) -> Result<Iv> {
        let canonical = term.canonical();
        if let Some((dte, literal)) = self.inline_type(&canonical) {
            let inline = self.codecs.decode_inline(dte, literal.label())?;
            return Ok(Iv::inline(inline, Arc::new(canonical)));
        }
        let mut keeper = self.keeper.lock()?;
        if let Some((kept, id)) = keeper.kept_handle(&canonical) {
            return Ok(self.handle(kept, id));
        }
        let id = keeper.generator.generate();
        let keepsake = Arc::new(canonical);
        keeper.kept.insert(Arc::clone(&keepsake), id);
        trace!(namespace = self.namespace, id, term = %keepsake, "term added to lexicon");
        Ok(self.handle(keepsake, id))
    }
    fn materialize(&self, iv: &Iv) -> Result<Option<ExternalTerm>> {
        if let Some(inline) = iv.as_inline() {
            return Ok(Some(ExternalTerm::typed(
                self.codecs.encode_inline(inline),
                inline.dte().iri(),
            )));
        }
        match iv.term_id() {
            Some(id) if id.namespace() == self.namespace => {
                let keeper = self.keeper.lock()?;
                Ok(keeper.kept.get_by_right(&id.id()).map(|term| term.as_ref().clone()))
            }
            // issued by another lexicon
            Some(_) => Ok(None),
            None => Ok(Some(iv.value().as_ref().clone())),
        }
    }
}
