//! The term resolution pass over a whole query or update.
//!
//! [`TermResolver::optimize`] visits the projection, construct template,
//! where clause, having constraints, bindings, named subqueries and dataset of
//! a query root (or the graph terms and quad blocks of every update
//! operation) and replaces each embedded constant's handle with the one
//! its term resolves to in the given [`ResolveContext`].
//!
//! ```
//! use std::sync::Arc;
//! use tessera::ast::{AssignmentNode, GroupMember, GroupNode, QueryNode, QueryRoot, TermNode};
//! use tessera::context::ResolveContext;
//! use tessera::datatype::XSD_INTEGER;
//! use tessera::lexicon::Lexicon;
//! use tessera::term::ExternalTerm;
//! use tessera::walker::TermResolver;
//!
//! let ctx = ResolveContext::new(Arc::new(Lexicon::new()));
//! let mut query = QueryNode::Query(QueryRoot::select(
//!     vec![AssignmentNode::plain("s")],
//!     GroupNode::join(vec![GroupMember::pattern(
//!         TermNode::var("s"),
//!         TermNode::uri("http://ex/p"),
//!         TermNode::constant(ExternalTerm::typed("42", XSD_INTEGER)),
//!     )]),
//! ));
//! let report = TermResolver::new(&ctx).optimize(&mut query).expect("resolves");
//! assert_eq!(report.inlined, 1);
//! assert_eq!(report.unresolved, 1);
//! ```

use std::sync::Arc;

// used to expose the report of a pass to tooling
use serde::Serialize;

use tracing::{debug, warn};

use crate::ast::{
    BindingsClause, ConstantNode, DataSetSummary, DatasetNode, GraphTarget, GroupMember, GroupNode,
    PathAlternative, PathPrimary, QueryNode, QueryRoot, TermNode, UpdateOp, UpdateRoot, ValueExpr,
};
use crate::context::ResolveContext;
use crate::error::Result;
use crate::iv::IvRepr;
use crate::prune::{self, PruneReport};
use crate::resolver;

/// What a pass did, summed over the root and every subquery.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    /// Dictionary handles assigned.
    pub resolved: usize,
    pub inlined: usize,
    pub mocked: usize,
    /// Constants left without a handle.
    pub unresolved: usize,
    /// Constants whose handle was already authoritative.
    pub retained: usize,
    pub subqueries: usize,
    pub unsupported: Vec<String>,
    pub pruned: Option<PruneReport>,
}
impl ResolutionReport {
    pub fn constants(&self) -> usize {
        self.resolved + self.inlined + self.mocked + self.unresolved + self.retained
    }
    fn merge(&mut self, other: ResolutionReport) {
        self.resolved += other.resolved;
        self.inlined += other.inlined;
        self.mocked += other.mocked;
        self.unresolved += other.unresolved;
        self.retained += other.retained;
        self.subqueries += other.subqueries;
        self.unsupported.extend(other.unsupported);
    }
}

/// One resolution pass. A resolver holds no state besides the report of its
/// own pass, and every subquery is handled by a resolver of its own.
pub struct TermResolver<'ctx> {
    ctx: &'ctx ResolveContext,
    report: ResolutionReport,
}

impl<'ctx> TermResolver<'ctx> {
    pub fn new(ctx: &'ctx ResolveContext) -> Self {
        Self {
            ctx,
            report: ResolutionReport::default(),
        }
    }

    /// Resolves every constant in `node` in place. Decode errors abort the
    /// pass; unknown terms and unsupported nodes do not.
    pub fn optimize(mut self, node: &mut QueryNode) -> Result<ResolutionReport> {
        match node {
            QueryNode::Query(root) => {
                self.query(root)?;
                if self.ctx.settings().prune_unknown_terms {
                    self.report.pruned = Some(prune::prune_query(root));
                }
            }
            QueryNode::Update(root) => {
                self.update(root)?;
                if self.ctx.settings().prune_unknown_terms {
                    let mut pruned = PruneReport::default();
                    for operation in root.operations.iter_mut() {
                        if let UpdateOp::DeleteInsert { where_clause, .. } = operation {
                            pruned.absorb(prune::prune_where(where_clause));
                        }
                    }
                    self.report.pruned = Some(pruned);
                }
            }
        }
        debug!(
            resolved = self.report.resolved,
            inlined = self.report.inlined,
            mocked = self.report.mocked,
            unresolved = self.report.unresolved,
            "term resolution finished"
        );
        Ok(self.report)
    }

    // ------------- Roots -------------
    fn query(&mut self, root: &mut QueryRoot) -> Result<()> {
        for assignment in root.projection.iter_mut() {
            self.value_expr(&mut assignment.expr)?;
        }
        if let Some(template) = root.construct.as_mut() {
            for pattern in template.iter_mut() {
                for term in pattern.terms_mut() {
                    self.term(term)?;
                }
            }
        }
        if let Some(where_clause) = root.where_clause.as_mut() {
            self.group(where_clause)?;
        }
        for constraint in root.having.iter_mut() {
            self.value_expr(constraint)?;
        }
        if let Some(bindings) = root.bindings.as_mut() {
            self.bindings(bindings)?;
        }
        for named in root.named_subqueries.iter_mut() {
            self.subquery(&mut named.query)?;
        }
        if let Some(dataset) = root.dataset.as_mut() {
            self.dataset(dataset)?;
        }
        Ok(())
    }

    fn update(&mut self, root: &mut UpdateRoot) -> Result<()> {
        for operation in root.operations.iter_mut() {
            match operation {
                UpdateOp::CreateGraph { target, .. } => self.term(target)?,
                UpdateOp::DropGraph { target, .. } => {
                    if let GraphTarget::Graph(graph) = target {
                        self.term(graph)?;
                    }
                }
                UpdateOp::DeleteInsert {
                    dataset,
                    delete,
                    insert,
                    where_clause,
                } => {
                    if let Some(dataset) = dataset.as_mut() {
                        self.dataset(dataset)?;
                    }
                    if let Some(delete) = delete.as_mut() {
                        self.group(delete)?;
                    }
                    if let Some(insert) = insert.as_mut() {
                        self.group(insert)?;
                    }
                    self.group(where_clause)?;
                }
                UpdateOp::InsertData(quads) | UpdateOp::DeleteData(quads) => self.group(quads)?,
                UpdateOp::Load { source, target, .. } => {
                    self.term(source)?;
                    if let Some(target) = target.as_mut() {
                        self.term(target)?;
                    }
                }
                UpdateOp::Unsupported(kind) => {
                    warn!(kind = %kind, "unsupported update operation left unresolved");
                    self.report.unsupported.push(kind.clone());
                }
            }
        }
        Ok(())
    }

    fn subquery(&mut self, query: &mut QueryRoot) -> Result<()> {
        let mut nested = TermResolver::new(self.ctx);
        nested.query(query)?;
        self.report.merge(nested.report);
        self.report.subqueries += 1;
        Ok(())
    }

    // ------------- Groups -------------
    fn group(&mut self, group: &mut GroupNode) -> Result<()> {
        if let Some(context) = group.context.as_mut() {
            self.term(context)?;
        }
        for child in group.children.iter_mut() {
            self.scan_constants(child)?;
            self.member(child)?;
        }
        Ok(())
    }

    // the constants a member carries as its own arguments
    fn scan_constants(&mut self, member: &mut GroupMember) -> Result<()> {
        match member {
            GroupMember::StatementPattern(pattern) => {
                for term in pattern.terms_mut() {
                    self.term(term)?;
                }
            }
            GroupMember::PropertyPath(path) => {
                self.term(&mut path.s)?;
                self.term(&mut path.o)?;
                if let Some(c) = path.c.as_mut() {
                    self.term(c)?;
                }
            }
            GroupMember::Service(service) => self.term(&mut service.endpoint)?,
            _ => (),
        }
        Ok(())
    }

    fn member(&mut self, member: &mut GroupMember) -> Result<()> {
        match member {
            // arguments were handled by the constant scan
            GroupMember::StatementPattern(_) | GroupMember::Service(_) => (),
            GroupMember::PropertyPath(path) => self.path(&mut path.path)?,
            GroupMember::Group(group) => self.group(group)?,
            GroupMember::Union(union) => {
                for member in union.members.iter_mut() {
                    self.group(member)?;
                }
            }
            GroupMember::Subquery(subquery) => self.subquery(&mut subquery.query)?,
            GroupMember::Bindings(bindings) => self.bindings(bindings)?,
            GroupMember::Filter(expr) => self.value_expr(expr)?,
            GroupMember::Assignment(assignment) => self.value_expr(&mut assignment.expr)?,
            GroupMember::NamedSubqueryInclude(_) => (),
            GroupMember::Unsupported(kind) => {
                warn!(kind = %kind, "unsupported node left unresolved");
                self.report.unsupported.push(kind.clone());
            }
        }
        Ok(())
    }

    fn path(&mut self, path: &mut PathAlternative) -> Result<()> {
        for sequence in path.0.iter_mut() {
            for elt in sequence.0.iter_mut() {
                match &mut elt.primary {
                    PathPrimary::Iri(iri) => self.term(iri)?,
                    PathPrimary::Nested(nested) => self.path(nested)?,
                    PathPrimary::NegatedSet(members) => {
                        for (iri, _) in members.iter_mut() {
                            self.term(iri)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn bindings(&mut self, bindings: &mut BindingsClause) -> Result<()> {
        for row in bindings.rows.iter_mut() {
            for (_, value) in row.iter_mut() {
                self.constant(value)?;
            }
        }
        Ok(())
    }

    fn value_expr(&mut self, expr: &mut ValueExpr) -> Result<()> {
        match expr {
            ValueExpr::Var(_) => Ok(()),
            ValueExpr::Constant(constant) => self.constant(constant),
            ValueExpr::Function(function) => {
                for arg in function.args.iter_mut() {
                    self.value_expr(arg)?;
                }
                if let Some(pattern) = function.graph_pattern.as_mut() {
                    self.group(pattern)?;
                }
                Ok(())
            }
        }
    }

    fn dataset(&mut self, dataset: &mut DatasetNode) -> Result<()> {
        for graphs in [&mut dataset.default_graphs, &mut dataset.named_graphs] {
            if let Some(summary) = graphs.as_ref() {
                let mut rebuilt = summary.graphs().to_vec();
                for graph in rebuilt.iter_mut() {
                    self.constant(graph)?;
                }
                if rebuilt.as_slice() != summary.graphs() {
                    *graphs = Some(Arc::new(DataSetSummary::new(rebuilt)));
                }
            }
        }
        Ok(())
    }

    // ------------- Constants -------------
    fn term(&mut self, term: &mut TermNode) -> Result<()> {
        match term {
            TermNode::Var(_) => Ok(()),
            TermNode::Const(constant) => self.constant(constant),
        }
    }

    fn constant(&mut self, constant: &mut ConstantNode) -> Result<()> {
        if !resolver::needs_resolution(self.ctx, constant.iv()) {
            self.report.retained += 1;
            return Ok(());
        }
        let iv = resolver::resolve(self.ctx, constant.term())?;
        match iv.as_ref().map(|iv| iv.repr()) {
            Some(IvRepr::Term(_)) => self.report.resolved += 1,
            Some(IvRepr::Inline(_)) => self.report.inlined += 1,
            Some(IvRepr::Mock(_)) => self.report.mocked += 1,
            None => self.report.unresolved += 1,
        }
        constant.set_iv(iv);
        Ok(())
    }
}
