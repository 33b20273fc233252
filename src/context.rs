use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex};

// we will use a fast hashing algo for the canonical value cache
use seahash::SeaHasher;

use crate::config::ResolverSettings;
use crate::datatype::{InlineCodec, XsdCodecs};
use crate::error::Result;
use crate::iv::{Iv, Namespace};
use crate::lexicon::TermDictionary;
use crate::term::ExternalTerm;

pub type TermHasher = BuildHasherDefault<SeaHasher>;

/// Everything a resolution pass needs, passed explicitly to every call.
///
/// The context also owns the canonical value cache: dictionary handles found
/// for a canonical term are written back here, so that later lookups of an
/// equal term do not go to the dictionary again. Only dictionary handles are
/// cached, inline and mock handles are recomputed on every pass.
pub struct ResolveContext {
    dictionary: Arc<dyn TermDictionary>,
    codecs: Arc<dyn InlineCodec>,
    settings: ResolverSettings,
    canonical: Mutex<HashMap<ExternalTerm, Iv, TermHasher>>,
}

impl ResolveContext {
    pub fn new(dictionary: Arc<dyn TermDictionary>) -> Self {
        Self::with_settings(dictionary, ResolverSettings::default())
    }
    pub fn with_settings(dictionary: Arc<dyn TermDictionary>, settings: ResolverSettings) -> Self {
        Self {
            dictionary,
            codecs: Arc::new(XsdCodecs),
            settings,
            canonical: Mutex::new(HashMap::default()),
        }
    }
    pub fn with_codecs(mut self, codecs: Arc<dyn InlineCodec>) -> Self {
        self.codecs = codecs;
        self
    }
    pub fn dictionary(&self) -> &dyn TermDictionary {
        self.dictionary.as_ref()
    }
    pub fn namespace(&self) -> Namespace {
        self.dictionary.namespace()
    }
    pub fn codecs(&self) -> &dyn InlineCodec {
        self.codecs.as_ref()
    }
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }
    pub fn cached(&self, canonical: &ExternalTerm) -> Result<Option<Iv>> {
        Ok(self.canonical.lock()?.get(canonical).cloned())
    }
    pub fn remember(&self, canonical: ExternalTerm, iv: &Iv) -> Result<()> {
        self.canonical.lock()?.insert(canonical, iv.clone());
        Ok(())
    }
    pub fn cache_len(&self) -> Result<usize> {
        Ok(self.canonical.lock()?.len())
    }
}
