//! Removal of branches that cannot produce solutions once their constants
//! are resolved. A constant that is unresolved, or resolved to a mock
//! handle, matches nothing in any index.

use serde::Serialize;

use tracing::info;

use crate::ast::{
    GroupKind, GroupMember, GroupNode, PathAlternative, PathPrimary, PropertyPathNode, QueryRoot,
    StatementPattern,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PruneReport {
    pub optional_groups_removed: usize,
    pub minus_groups_removed: usize,
    pub union_members_removed: usize,
    pub unions_collapsed: usize,
    pub where_clause_empty: bool,
}
impl PruneReport {
    pub fn absorb(&mut self, other: PruneReport) {
        self.optional_groups_removed += other.optional_groups_removed;
        self.minus_groups_removed += other.minus_groups_removed;
        self.union_members_removed += other.union_members_removed;
        self.unions_collapsed += other.unions_collapsed;
        self.where_clause_empty |= other.where_clause_empty;
    }
}

/// Prunes the where clause of `root`, and of its named subqueries, and
/// marks the root when its where clause cannot match.
pub fn prune_query(root: &mut QueryRoot) -> PruneReport {
    let mut report = PruneReport::default();
    for named in root.named_subqueries.iter_mut() {
        let nested = prune_query(&mut named.query);
        report.absorb(PruneReport { where_clause_empty: false, ..nested });
    }
    if let Some(where_clause) = root.where_clause.as_mut() {
        if !group(where_clause, &mut report) {
            root.where_clause_empty = true;
            report.where_clause_empty = true;
        }
    }
    info!(
        optional_groups_removed = report.optional_groups_removed,
        minus_groups_removed = report.minus_groups_removed,
        union_members_removed = report.union_members_removed,
        unions_collapsed = report.unions_collapsed,
        where_clause_empty = report.where_clause_empty,
        "pruning finished"
    );
    report
}

/// Prunes a single where clause, as found in an update operation.
pub fn prune_where(where_clause: &mut GroupNode) -> PruneReport {
    let mut report = PruneReport::default();
    report.where_clause_empty = !group(where_clause, &mut report);
    report
}

enum Verdict {
    Keep(GroupMember),
    Drop,
    Fail,
}

// true when the group may still produce solutions
fn group(group_node: &mut GroupNode, report: &mut PruneReport) -> bool {
    if group_node.context.as_ref().is_some_and(|c| c.is_unknown()) {
        return false;
    }
    let children = std::mem::take(&mut group_node.children);
    let mut failed = false;
    for child in children {
        if failed {
            group_node.children.push(child);
            continue;
        }
        match member(child, report) {
            Verdict::Keep(child) => group_node.children.push(child),
            Verdict::Drop => (),
            Verdict::Fail => {
                failed = true;
            }
        }
    }
    !failed
}

fn member(child: GroupMember, report: &mut PruneReport) -> Verdict {
    match child {
        GroupMember::StatementPattern(pattern) => {
            if pattern_fails(&pattern) {
                Verdict::Fail
            } else {
                Verdict::Keep(GroupMember::StatementPattern(pattern))
            }
        }
        GroupMember::PropertyPath(path) => {
            if property_path_fails(&path) {
                Verdict::Fail
            } else {
                Verdict::Keep(GroupMember::PropertyPath(path))
            }
        }
        GroupMember::Group(mut nested) => {
            if group(&mut nested, report) {
                return Verdict::Keep(GroupMember::Group(nested));
            }
            match nested.kind {
                GroupKind::Join => Verdict::Fail,
                GroupKind::Optional => {
                    report.optional_groups_removed += 1;
                    Verdict::Drop
                }
                GroupKind::Minus => {
                    report.minus_groups_removed += 1;
                    Verdict::Drop
                }
            }
        }
        GroupMember::Union(mut union) => {
            let before = union.members.len();
            union.members.retain_mut(|member| group(member, report));
            report.union_members_removed += before - union.members.len();
            match union.members.len() {
                0 => Verdict::Fail,
                1 => {
                    report.unions_collapsed += 1;
                    match union.members.pop() {
                        Some(only) => Verdict::Keep(GroupMember::Group(only)),
                        None => Verdict::Fail,
                    }
                }
                _ => Verdict::Keep(GroupMember::Union(union)),
            }
        }
        GroupMember::Subquery(mut subquery) => {
            let nested = prune_query(&mut subquery.query);
            report.absorb(PruneReport { where_clause_empty: false, ..nested });
            // an aggregating subquery still yields a row over no solutions
            if subquery.query.where_clause_empty && subquery.query.projects_plain_variables() {
                Verdict::Fail
            } else {
                Verdict::Keep(GroupMember::Subquery(subquery))
            }
        }
        GroupMember::Bindings(bindings) if bindings.rows.is_empty() => Verdict::Fail,
        other => Verdict::Keep(other),
    }
}

fn pattern_fails(pattern: &StatementPattern) -> bool {
    pattern.terms().any(|term| term.is_unknown())
}

fn property_path_fails(node: &PropertyPathNode) -> bool {
    if !path_can_match(&node.path) || node.c.as_ref().is_some_and(|c| c.is_unknown()) {
        return true;
    }
    // a zero length path relates any term to itself, known or not
    (node.s.is_unknown() || node.o.is_unknown()) && !path_allows_zero_length(&node.path)
}

fn path_can_match(path: &PathAlternative) -> bool {
    path.0.iter().any(|sequence| {
        sequence.0.iter().all(|elt| {
            elt.allows_zero_length()
                || match &elt.primary {
                    PathPrimary::Iri(iri) => !iri.is_unknown(),
                    PathPrimary::Nested(nested) => path_can_match(nested),
                    PathPrimary::NegatedSet(_) => true,
                }
        })
    })
}

fn path_allows_zero_length(path: &PathAlternative) -> bool {
    path.0.iter().any(|sequence| {
        sequence.0.iter().all(|elt| {
            elt.allows_zero_length()
                || matches!(&elt.primary, PathPrimary::Nested(nested) if path_allows_zero_length(nested))
        })
    })
}
