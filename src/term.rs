//! External terms: the RDF values a query mentions before any of them has
//! been looked up in the lexicon.
//!
//! Display follows the N-Triples conventions, so `<http://ex/p>`,
//! `"foo"@en`, `"42"^^<http://www.w3.org/2001/XMLSchema#integer>` and
//! `_:b0` are what a term prints as.

// used to print out readable forms of a term
use std::fmt;
use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use crate::datatype::XSD_STRING;
use crate::error::{Result, TesseraError};

lazy_static! {
    // BCP47 shape only, the registry itself is not consulted
    static ref LANGUAGE_TAG: Regex = Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap();
}

/// The logical kind of a term, which is all a mock handle remembers about it.
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum TermKind {
    Uri,
    Literal,
    BlankNode,
}
impl TermKind {
    pub fn flag(&self) -> u8 {
        match self {
            TermKind::Uri => 1,
            TermKind::Literal => 2,
            TermKind::BlankNode => 3,
        }
    }
    pub fn from_flag(flag: u8) -> Option<TermKind> {
        match flag {
            1 => Some(TermKind::Uri),
            2 => Some(TermKind::Literal),
            3 => Some(TermKind::BlankNode),
            _ => None,
        }
    }
}
impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TermKind::Uri => write!(f, "uri"),
            TermKind::Literal => write!(f, "literal"),
            TermKind::BlankNode => write!(f, "bnode"),
        }
    }
}

// ------------- Literal -------------
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct Literal {
    label: String,
    datatype: Option<String>,
    language: Option<String>,
}

impl Literal {
    pub fn simple(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            datatype: None,
            language: None,
        }
    }
    pub fn typed(label: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }
    /// Language tags are validated and lowercased.
    pub fn lang(label: impl Into<String>, language: &str) -> Result<Self> {
        if !LANGUAGE_TAG.is_match(language) {
            return Err(TesseraError::InvalidArgument(format!(
                "malformed language tag: {language:?}"
            )));
        }
        Ok(Self {
            label: label.into(),
            datatype: None,
            language: Some(language.to_lowercase()),
        })
    }
    // It's intentional to only expose the parts through getters,
    // since a literal is immutable after creation.
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
    /// The identity the lexicon keys literals by: (label, language) when a
    /// language tag is present, otherwise (label, datatype) with
    /// `xsd:string` folded into the simple literal.
    pub fn canonical(&self) -> Literal {
        match (&self.language, &self.datatype) {
            (Some(language), _) => Literal {
                label: self.label.clone(),
                datatype: None,
                language: Some(language.clone()),
            },
            (None, Some(datatype)) if datatype == XSD_STRING => Literal::simple(self.label.clone()),
            _ => self.clone(),
        }
    }
}
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        print_quoted_str(&self.label, f)?;
        if let Some(language) = &self.language {
            write!(f, "@{}", language)
        } else if let Some(datatype) = &self.datatype {
            write!(f, "^^<{}>", datatype)
        } else {
            Ok(())
        }
    }
}

fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\n' => f.write_str("\\n"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            c => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

// ------------- ExternalTerm -------------
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Debug)]
pub enum ExternalTerm {
    Uri(String),
    Literal(Literal),
    BlankNode(String),
}

impl ExternalTerm {
    pub fn uri(iri: impl Into<String>) -> Self {
        ExternalTerm::Uri(iri.into())
    }
    pub fn bnode(id: impl Into<String>) -> Self {
        ExternalTerm::BlankNode(id.into())
    }
    pub fn literal(label: impl Into<String>) -> Self {
        ExternalTerm::Literal(Literal::simple(label))
    }
    pub fn typed(label: impl Into<String>, datatype: impl Into<String>) -> Self {
        ExternalTerm::Literal(Literal::typed(label, datatype))
    }
    pub fn lang(label: impl Into<String>, language: &str) -> Result<Self> {
        Ok(ExternalTerm::Literal(Literal::lang(label, language)?))
    }
    pub fn kind(&self) -> TermKind {
        match self {
            ExternalTerm::Uri(_) => TermKind::Uri,
            ExternalTerm::Literal(_) => TermKind::Literal,
            ExternalTerm::BlankNode(_) => TermKind::BlankNode,
        }
    }
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            ExternalTerm::Literal(literal) => Some(literal),
            _ => None,
        }
    }
    pub fn canonical(&self) -> ExternalTerm {
        match self {
            ExternalTerm::Literal(literal) => ExternalTerm::Literal(literal.canonical()),
            other => other.clone(),
        }
    }
}
impl fmt::Display for ExternalTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExternalTerm::Uri(iri) => write!(f, "<{}>", iri),
            ExternalTerm::Literal(literal) => write!(f, "{}", literal),
            ExternalTerm::BlankNode(id) => write!(f, "_:{}", id),
        }
    }
}
impl From<Literal> for ExternalTerm {
    fn from(literal: Literal) -> Self {
        ExternalTerm::Literal(literal)
    }
}
