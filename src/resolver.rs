//! Resolution of a single external term to a handle.

use std::sync::Arc;

use tracing::debug;

use crate::context::ResolveContext;
use crate::error::Result;
use crate::iv::{Iv, IvRepr};
use crate::term::ExternalTerm;

/// Resolves `term` against the context's dictionary.
///
/// Literals always resolve: a dictionary handle if the lexicon knows the
/// canonical form, otherwise an inline handle when the datatype is inline
/// encodable (a malformed label is a decode error), otherwise a mock handle.
/// URIs and blank nodes resolve only through the dictionary, `None` when unknown.
pub fn resolve(ctx: &ResolveContext, term: &ExternalTerm) -> Result<Option<Iv>> {
    let canonical = term.canonical();
    if let Some(iv) = ctx.cached(&canonical)? {
        return Ok(Some(iv));
    }
    if let Some(iv) = ctx.dictionary().lookup(&canonical)? {
        if iv.is_from(ctx.namespace()) {
            ctx.remember(canonical, &iv)?;
        }
        debug!(term = %term, iv = %iv, "constant found in lexicon");
        return Ok(Some(iv));
    }
    let Some(literal) = canonical.as_literal() else {
        debug!(term = %term, "constant not in lexicon");
        return Ok(None);
    };
    if let Some(dte) = literal.datatype().and_then(|datatype| ctx.codecs().inline_type(datatype)) {
        let inline = ctx.codecs().decode_inline(dte, literal.label())?;
        let iv = Iv::inline(inline, Arc::new(canonical));
        debug!(term = %term, iv = %iv, "constant inlined");
        return Ok(Some(iv));
    }
    let iv = Iv::mock(Arc::new(canonical));
    debug!(term = %term, iv = %iv, "constant mocked");
    Ok(Some(iv))
}

/// Whether a constant already carrying `existing` has to go through
/// [`resolve`] again in this context.
///
/// Dictionary handles issued by this context's lexicon are authoritative.
/// Handles from another lexicon and mock handles are always looked up again,
/// inline handles unless `reresolve_inline` is switched off.
pub fn needs_resolution(ctx: &ResolveContext, existing: Option<&Iv>) -> bool {
    match existing.map(Iv::repr) {
        None => true,
        Some(IvRepr::Term(id)) => id.namespace() != ctx.namespace(),
        Some(IvRepr::Inline(_)) => ctx.settings().reresolve_inline,
        Some(IvRepr::Mock(_)) => true,
    }
}

/// Resolves `term`, inserting it into the lexicon first if it is unknown.
/// Used when a canonical form has to exist before it can be referenced,
/// as for the statements loaded into a store.
pub fn resolve_or_insert(ctx: &ResolveContext, term: &ExternalTerm) -> Result<Iv> {
    match resolve(ctx, term)? {
        Some(iv) if !iv.is_mock() => Ok(iv),
        _ => {
            let canonical = term.canonical();
            let iv = ctx.dictionary().insert_or_get(&canonical)?;
            if iv.is_from(ctx.namespace()) {
                ctx.remember(canonical, &iv)?;
            }
            Ok(iv)
        }
    }
}
