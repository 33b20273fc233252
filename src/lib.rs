//! Tessera – the term resolution front end of a quad store query compiler.
//!
//! A parsed query arrives as a tree of [`ast`] nodes holding external terms
//! (URIs, literals, blank nodes). Before plans are built, every embedded
//! constant is given a handle ([`iv::Iv`]), which is one of
//! * a dictionary handle, issued by a [`lexicon::TermDictionary`],
//! * an inline handle, carrying the value of a numeric, temporal or boolean
//!   literal (see [`datatype`]),
//! * a mock handle, for a literal known to be absent from the lexicon.
//!
//! The [`walker::TermResolver`] performs that rewrite over whole queries and
//! updates, subqueries included, using the [`resolver`] for each constant. An
//! optional [`prune`] pass then removes branches that cannot match.
//!
//! Downstream, statement patterns become [`predicate::SpoPredicate`]s read
//! through [`access_path::SpoAccessPath`]s. Binding a position of an access
//! path yields a new, more specific path on the index its
//! [`access_path::SpoRelation`] picks, and `remove_all` hands the matched
//! statements back to the relation for a batched removal. The
//! [`store::MemoryTripleStore`] is an in-memory relation with truth
//! maintenance for inferred statements.
//!
//! ## Modules
//! * [`term`] – External terms and their canonical forms.
//! * [`datatype`] – The inline-encodable XSD datatypes and their codecs.
//! * [`iv`] – Handles and their index keys.
//! * [`lexicon`] – The dictionary contract and an in-memory lexicon.
//! * [`context`] – The explicit context of a resolution pass.
//! * [`resolver`], [`walker`], [`prune`] – Term resolution.
//! * [`predicate`], [`access_path`], [`store`] – Patterns, index selection and storage.
//! * [`config`] – Layered settings.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use tessera::access_path::SpoRelation;
//! use tessera::context::ResolveContext;
//! use tessera::lexicon::Lexicon;
//! use tessera::predicate::{Position, Spo, SpoPredicate, VarOrConst};
//! use tessera::resolver::resolve_or_insert;
//! use tessera::store::MemoryTripleStore;
//! use tessera::term::ExternalTerm;
//!
//! let ctx = ResolveContext::new(Arc::new(Lexicon::new()));
//! let alice = resolve_or_insert(&ctx, &ExternalTerm::uri("http://ex/alice")).unwrap();
//! let knows = resolve_or_insert(&ctx, &ExternalTerm::uri("http://ex/knows")).unwrap();
//! let bob = resolve_or_insert(&ctx, &ExternalTerm::uri("http://ex/bob")).unwrap();
//! let graph = resolve_or_insert(&ctx, &ExternalTerm::uri("http://ex/g")).unwrap();
//!
//! let store = MemoryTripleStore::new(true);
//! store.add(Spo::quad(alice.clone(), knows.clone(), bob, graph.clone())).unwrap();
//!
//! let any = SpoPredicate::new(VarOrConst::var("s"), VarOrConst::var("p"), VarOrConst::var("o"));
//! let path = store.access_path(any).unwrap();
//! let path = path.bind_position(Position::Subject, &alice).unwrap().bind_context(&graph).unwrap();
//! assert_eq!(path.iter().unwrap().count(), 1);
//! assert_eq!(path.remove_all().unwrap(), 1);
//! assert!(store.is_empty().unwrap());
//! ```

pub mod access_path;
pub mod ast;
pub mod config;
pub mod context;
pub mod datatype;
pub mod error;
pub mod iv;
pub mod lexicon;
pub mod predicate;
pub mod prune;
pub mod resolver;
pub mod store;
pub mod term;
pub mod walker;
