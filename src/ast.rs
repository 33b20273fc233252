//! The query and update syntax tree handed over by the parser.
//!
//! Every node kind is a closed variant. Members the resolver does not know
//! how to handle arrive as [`GroupMember::Unsupported`] or
//! [`UpdateOp::Unsupported`] and are reported rather than rejected.

use std::fmt;
use std::sync::Arc;

use crate::iv::Iv;
use crate::term::ExternalTerm;

// ------------- Terms -------------
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct VarNode {
    pub name: String,
}
impl VarNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
impl fmt::Display for VarNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// An embedded constant and, once resolved, its handle.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantNode {
    term: Arc<ExternalTerm>,
    iv: Option<Iv>,
}
impl ConstantNode {
    pub fn new(term: ExternalTerm) -> Self {
        Self { term: Arc::new(term), iv: None }
    }
    /// A constant that already carries a handle, for instance one
    /// materialized by another lexicon.
    pub fn resolved(iv: Iv) -> Self {
        Self { term: Arc::clone(iv.value()), iv: Some(iv) }
    }
    pub fn term(&self) -> &ExternalTerm {
        &self.term
    }
    pub fn iv(&self) -> Option<&Iv> {
        self.iv.as_ref()
    }
    pub fn is_resolved(&self) -> bool {
        self.iv.is_some()
    }
    /// Unresolved, or resolved to a mock handle: nothing in any index can match.
    pub fn is_unknown(&self) -> bool {
        self.iv.as_ref().is_none_or(Iv::is_mock)
    }
    pub fn set_iv(&mut self, iv: Option<Iv>) {
        self.iv = iv;
    }
}
impl fmt::Display for ConstantNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.iv {
            Some(iv) => write!(f, "{}", iv),
            None => write!(f, "{}", self.term),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TermNode {
    Var(VarNode),
    Const(ConstantNode),
}
impl TermNode {
    pub fn var(name: impl Into<String>) -> Self {
        TermNode::Var(VarNode::new(name))
    }
    pub fn constant(term: ExternalTerm) -> Self {
        TermNode::Const(ConstantNode::new(term))
    }
    pub fn uri(iri: impl Into<String>) -> Self {
        TermNode::constant(ExternalTerm::uri(iri))
    }
    pub fn as_constant(&self) -> Option<&ConstantNode> {
        match self {
            TermNode::Const(constant) => Some(constant),
            TermNode::Var(_) => None,
        }
    }
    pub fn as_constant_mut(&mut self) -> Option<&mut ConstantNode> {
        match self {
            TermNode::Const(constant) => Some(constant),
            TermNode::Var(_) => None,
        }
    }
    pub fn is_unknown(&self) -> bool {
        self.as_constant().is_some_and(ConstantNode::is_unknown)
    }
}
impl fmt::Display for TermNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TermNode::Var(var) => write!(f, "{}", var),
            TermNode::Const(constant) => write!(f, "{}", constant),
        }
    }
}

// ------------- Patterns -------------
#[derive(Clone, Debug, PartialEq)]
pub struct StatementPattern {
    pub s: TermNode,
    pub p: TermNode,
    pub o: TermNode,
    pub c: Option<TermNode>,
}
impl StatementPattern {
    pub fn new(s: TermNode, p: TermNode, o: TermNode) -> Self {
        Self { s, p, o, c: None }
    }
    pub fn in_graph(mut self, c: TermNode) -> Self {
        self.c = Some(c);
        self
    }
    pub fn terms(&self) -> impl Iterator<Item = &TermNode> {
        [&self.s, &self.p, &self.o].into_iter().chain(self.c.as_ref())
    }
    pub fn terms_mut(&mut self) -> impl Iterator<Item = &mut TermNode> {
        [&mut self.s, &mut self.p, &mut self.o].into_iter().chain(self.c.as_mut())
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum PathMod {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PathPrimary {
    Iri(TermNode),
    Nested(PathAlternative),
    /// `!(p1 | ^p2)`, the flag marks an inverse member.
    NegatedSet(Vec<(TermNode, bool)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathElt {
    pub primary: PathPrimary,
    pub inverse: bool,
    pub modifier: Option<PathMod>,
}
impl PathElt {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self {
            primary: PathPrimary::Iri(TermNode::uri(iri)),
            inverse: false,
            modifier: None,
        }
    }
    pub fn with_modifier(mut self, modifier: PathMod) -> Self {
        self.modifier = Some(modifier);
        self
    }
    pub fn allows_zero_length(&self) -> bool {
        matches!(self.modifier, Some(PathMod::ZeroOrOne | PathMod::ZeroOrMore))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathSequence(pub Vec<PathElt>);

#[derive(Clone, Debug, PartialEq)]
pub struct PathAlternative(pub Vec<PathSequence>);

impl PathAlternative {
    /// A single one-step path.
    pub fn single(elt: PathElt) -> Self {
        PathAlternative(vec![PathSequence(vec![elt])])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyPathNode {
    pub s: TermNode,
    pub path: PathAlternative,
    pub o: TermNode,
    pub c: Option<TermNode>,
}

// ------------- Expressions -------------
#[derive(Clone, Debug, PartialEq)]
pub enum ValueExpr {
    Var(VarNode),
    Constant(ConstantNode),
    Function(FunctionNode),
}
impl ValueExpr {
    pub fn var(name: impl Into<String>) -> Self {
        ValueExpr::Var(VarNode::new(name))
    }
    pub fn constant(term: ExternalTerm) -> Self {
        ValueExpr::Constant(ConstantNode::new(term))
    }
    pub fn call(name: impl Into<String>, args: Vec<ValueExpr>) -> Self {
        ValueExpr::Function(FunctionNode {
            name: name.into(),
            args,
            graph_pattern: None,
        })
    }
    /// `EXISTS { .. }` and `NOT EXISTS { .. }`.
    pub fn exists(negated: bool, pattern: GroupNode) -> Self {
        let name = if negated { "not-exists" } else { "exists" };
        ValueExpr::Function(FunctionNode {
            name: name.to_owned(),
            args: Vec::new(),
            graph_pattern: Some(Box::new(pattern)),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionNode {
    /// Operator name or function IRI.
    pub name: String,
    pub args: Vec<ValueExpr>,
    pub graph_pattern: Option<Box<GroupNode>>,
}

/// `BIND(expr AS ?var)` in a group, `(expr AS ?var)` in a projection.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentNode {
    pub var: VarNode,
    pub expr: ValueExpr,
}
impl AssignmentNode {
    pub fn new(var: impl Into<String>, expr: ValueExpr) -> Self {
        Self { var: VarNode::new(var), expr }
    }
    /// Projection of a bare variable.
    pub fn plain(var: impl Into<String>) -> Self {
        let var = VarNode::new(var);
        Self { expr: ValueExpr::Var(var.clone()), var }
    }
    pub fn is_plain_variable(&self) -> bool {
        matches!(&self.expr, ValueExpr::Var(var) if *var == self.var)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BindingsClause {
    pub vars: Vec<VarNode>,
    /// A variable missing from a row is `UNDEF` in that row.
    pub rows: Vec<Vec<(VarNode, ConstantNode)>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceNode {
    pub endpoint: TermNode,
    pub silent: bool,
    /// Evaluated by the remote endpoint and left untouched here.
    pub pattern: GroupNode,
}

// ------------- Groups -------------
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum GroupKind {
    Join,
    Optional,
    Minus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupNode {
    pub kind: GroupKind,
    /// The graph of `GRAPH <g> { .. }` or `GRAPH ?g { .. }`.
    pub context: Option<TermNode>,
    pub children: Vec<GroupMember>,
}
impl GroupNode {
    pub fn join(children: Vec<GroupMember>) -> Self {
        Self { kind: GroupKind::Join, context: None, children }
    }
    pub fn optional(children: Vec<GroupMember>) -> Self {
        Self { kind: GroupKind::Optional, context: None, children }
    }
    pub fn minus(children: Vec<GroupMember>) -> Self {
        Self { kind: GroupKind::Minus, context: None, children }
    }
    pub fn graph(context: TermNode, children: Vec<GroupMember>) -> Self {
        Self { kind: GroupKind::Join, context: Some(context), children }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionNode {
    pub members: Vec<GroupNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubqueryNode {
    pub query: QueryRoot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GroupMember {
    StatementPattern(StatementPattern),
    PropertyPath(PropertyPathNode),
    Group(GroupNode),
    Union(UnionNode),
    Subquery(Box<SubqueryNode>),
    Bindings(BindingsClause),
    Service(ServiceNode),
    Filter(ValueExpr),
    Assignment(AssignmentNode),
    /// `INCLUDE %name`, a reference to a named subquery solution set.
    NamedSubqueryInclude(String),
    /// A node kind produced by the parser that has no variant here.
    Unsupported(String),
}
impl GroupMember {
    pub fn pattern(s: TermNode, p: TermNode, o: TermNode) -> Self {
        GroupMember::StatementPattern(StatementPattern::new(s, p, o))
    }
    pub fn subquery(query: QueryRoot) -> Self {
        GroupMember::Subquery(Box::new(SubqueryNode { query }))
    }
    pub fn kind_name(&self) -> &str {
        match self {
            GroupMember::StatementPattern(_) => "statement-pattern",
            GroupMember::PropertyPath(_) => "property-path",
            GroupMember::Group(_) => "group",
            GroupMember::Union(_) => "union",
            GroupMember::Subquery(_) => "subquery",
            GroupMember::Bindings(_) => "bindings",
            GroupMember::Service(_) => "service",
            GroupMember::Filter(_) => "filter",
            GroupMember::Assignment(_) => "assignment",
            GroupMember::NamedSubqueryInclude(_) => "named-subquery-include",
            GroupMember::Unsupported(kind) => kind,
        }
    }
}

// ------------- Datasets -------------
/// An immutable set of graph constants. Changing any member means building
/// a new summary.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSetSummary {
    graphs: Vec<ConstantNode>,
}
impl DataSetSummary {
    pub fn new(graphs: Vec<ConstantNode>) -> Self {
        Self { graphs }
    }
    pub fn from_uris<I: IntoIterator<Item = S>, S: Into<String>>(uris: I) -> Self {
        Self::new(uris.into_iter().map(|uri| ConstantNode::new(ExternalTerm::uri(uri))).collect())
    }
    pub fn graphs(&self) -> &[ConstantNode] {
        &self.graphs
    }
    pub fn len(&self) -> usize {
        self.graphs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// `FROM` (default graphs) and `FROM NAMED` (named graphs).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetNode {
    pub default_graphs: Option<Arc<DataSetSummary>>,
    pub named_graphs: Option<Arc<DataSetSummary>>,
}

// ------------- Roots -------------
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum QueryKind {
    Select,
    Construct,
    Ask,
    Describe,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedSubquery {
    pub name: String,
    pub query: QueryRoot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryRoot {
    pub kind: QueryKind,
    pub projection: Vec<AssignmentNode>,
    pub construct: Option<Vec<StatementPattern>>,
    pub where_clause: Option<GroupNode>,
    pub having: Vec<ValueExpr>,
    pub bindings: Option<BindingsClause>,
    pub named_subqueries: Vec<NamedSubquery>,
    pub dataset: Option<DatasetNode>,
    /// Set when the where clause is known to have no solutions.
    pub where_clause_empty: bool,
}
impl QueryRoot {
    pub fn select(projection: Vec<AssignmentNode>, where_clause: GroupNode) -> Self {
        Self {
            kind: QueryKind::Select,
            projection,
            construct: None,
            where_clause: Some(where_clause),
            having: Vec::new(),
            bindings: None,
            named_subqueries: Vec::new(),
            dataset: None,
            where_clause_empty: false,
        }
    }
    pub fn construct(template: Vec<StatementPattern>, where_clause: GroupNode) -> Self {
        Self {
            kind: QueryKind::Construct,
            construct: Some(template),
            ..Self::select(Vec::new(), where_clause)
        }
    }
    pub fn projects_plain_variables(&self) -> bool {
        self.projection.iter().all(AssignmentNode::is_plain_variable)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphTarget {
    Graph(TermNode),
    Default,
    Named,
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOp {
    CreateGraph {
        target: TermNode,
        silent: bool,
    },
    /// `DROP` and `CLEAR`.
    DropGraph {
        target: GraphTarget,
        silent: bool,
    },
    DeleteInsert {
        dataset: Option<DatasetNode>,
        delete: Option<GroupNode>,
        insert: Option<GroupNode>,
        where_clause: GroupNode,
    },
    InsertData(GroupNode),
    DeleteData(GroupNode),
    Load {
        source: TermNode,
        target: Option<TermNode>,
        silent: bool,
    },
    Unsupported(String),
}
impl UpdateOp {
    pub fn kind_name(&self) -> &str {
        match self {
            UpdateOp::CreateGraph { .. } => "create-graph",
            UpdateOp::DropGraph { .. } => "drop-graph",
            UpdateOp::DeleteInsert { .. } => "delete-insert",
            UpdateOp::InsertData(_) => "insert-data",
            UpdateOp::DeleteData(_) => "delete-data",
            UpdateOp::Load { .. } => "load",
            UpdateOp::Unsupported(kind) => kind,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateRoot {
    pub operations: Vec<UpdateOp>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryNode {
    Query(QueryRoot),
    Update(UpdateRoot),
}
