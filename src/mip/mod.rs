//! Assignment model.
//!
//! The mixed-integer model is held as plain data: variables, one linear
//! objective, constraint rows tagged by family, and an append-only list
//! of exclusion cuts. A solver backend translates the whole thing on
//! every solve, so replaying the same model always submits the same
//! problem.
//!
//! # Variables
//!
//! | Family | Domain | Meaning |
//! |--------|--------|---------|
//! | `y[v,h,t]` | binary | visitor `v` meets host `h` at slot `t` |
//! | `excess[h,t]` | real >= 0 | visitors beyond the first at `(h,t)` |
//! | `overload[h]` | binary | host load above `max_visitors - 2` |
//! | `presence[v,l,t]` | binary | visitor `v` is at location `l` in slot `t` |
//! | `break[h,b]` | binary | host `h` is on break at break slot `b` |

mod builder;

pub use builder::AssignmentModelBuilder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Index of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// 0/1.
    Binary,
    /// Continuous, `>= 0`.
    NonNegative,
}

/// A model variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    /// Readable name, e.g. `y[V1,Faculty A,2]`.
    pub name: String,
    /// Domain.
    pub kind: VarKind,
    /// Fixed at zero (upper bound 0).
    pub fixed_zero: bool,
}

/// `sum(coef * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    /// Terms.
    pub terms: Vec<(VarId, f64)>,
    /// Constant offset.
    pub constant: f64,
}

impl LinearExpr {
    /// Empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Adds a term.
    pub fn add(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add(var, coef);
        self
    }

    /// Whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates against a value vector indexed by [`VarId`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
                .sum::<f64>()
    }
}

/// Row relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

/// Constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Host unavailable at the slot.
    Availability,
    /// Host total meetings `>= min_visitors`.
    HostMinMeetings,
    /// Host total meetings `<= max_visitors`.
    HostMaxMeetings,
    /// Visitor in at most one meeting per slot.
    OneMeetingPerSlot,
    /// Visitor total meetings lower bound.
    VisitorMinMeetings,
    /// Visitor meets a host at most once.
    MeetHostOnce,
    /// Links `excess[h,t]` to the group size.
    GroupExcess,
    /// Group size `<= max_group`.
    MaxGroup,
    /// Links `overload[h]` to the host load.
    Overload,
    /// Meeting before the location's phase slot.
    Phase,
    /// Links meetings to `presence[v,l,t]`.
    PresenceLink,
    /// Forbids presence pairs closer than the travel lag.
    Travel,
    /// Visitor keeps a free break slot.
    VisitorBreak,
    /// A host on break hosts nobody.
    HostBreakCapacity,
    /// A fully available host takes a break.
    HostMustBreak,
    /// Excludes an earlier solution.
    NoGood,
}

/// One linear row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Family.
    pub kind: ConstraintKind,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Relation.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// `expr <= rhs`.
    pub fn le(kind: ConstraintKind, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            kind,
            expr,
            relation: Relation::Le,
            rhs,
        }
    }

    /// `expr >= rhs`.
    pub fn ge(kind: ConstraintKind, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            kind,
            expr,
            relation: Relation::Ge,
            rhs,
        }
    }

    /// Whether `values` satisfy the row (with tolerance).
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        const EPS: f64 = 1e-6;
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::Le => lhs <= self.rhs + EPS,
            Relation::Ge => lhs >= self.rhs - EPS,
        }
    }
}

/// Indices of one assignment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentVar {
    /// Visitor index.
    pub visitor: usize,
    /// Host index.
    pub host: usize,
    /// 1-based slot.
    pub slot: usize,
    /// Model variable.
    pub var: VarId,
}

/// The full assignment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentModel {
    vars: Vec<VarDef>,
    objective: LinearExpr,
    constraints: Vec<LinearConstraint>,
    cuts: Vec<LinearConstraint>,
    assignments: Vec<AssignmentVar>,
    visitors: Vec<String>,
    hosts: Vec<String>,
    number_of_slots: usize,
}

impl AssignmentModel {
    /// All variables, indexed by [`VarId`].
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    /// Objective (maximised).
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Structural constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Exclusion cuts, in insertion order.
    pub fn cuts(&self) -> &[LinearConstraint] {
        &self.cuts
    }

    /// Structural constraints followed by cuts.
    pub fn all_constraints(&self) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().chain(&self.cuts)
    }

    /// Number of structural rows of one family.
    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// Assignment variables in (visitor, host, slot) order.
    pub fn assignments(&self) -> &[AssignmentVar] {
        &self.assignments
    }

    /// Visitor names, in model order.
    pub fn visitors(&self) -> &[String] {
        &self.visitors
    }

    /// Host names, in model order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Number of slots.
    pub fn number_of_slots(&self) -> usize {
        self.number_of_slots
    }

    /// Assignment variable for `(visitor, host, slot)` indices.
    pub fn assignment_var(&self, visitor: usize, host: usize, slot: usize) -> Option<VarId> {
        if slot < 1 || slot > self.number_of_slots || host >= self.hosts.len() {
            return None;
        }
        let i = (visitor * self.hosts.len() + host) * self.number_of_slots + (slot - 1);
        self.assignments.get(i).map(|a| a.var)
    }

    /// Assignments active in `values` (value `>= 0.5`).
    pub fn active_assignments<'a>(
        &'a self,
        values: &'a [f64],
    ) -> impl Iterator<Item = &'a AssignmentVar> + 'a {
        self.assignments
            .iter()
            .filter(move |a| values.get(a.var.0).copied().unwrap_or(0.0) >= 0.5)
    }

    /// Objective value of `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Appends an exclusion cut. Cuts are never removed.
    pub fn add_cut(&mut self, cut: LinearConstraint) {
        self.cuts.push(cut);
    }

    /// Cut excluding exactly the given active assignment set:
    /// `sum_{active}(1 - y) + sum_{inactive} y >= 1`.
    pub fn no_good_cut(&self, active: &BTreeSet<VarId>) -> LinearConstraint {
        let mut expr = LinearExpr::new();
        for a in &self.assignments {
            if active.contains(&a.var) {
                expr.add(a.var, -1.0);
            } else {
                expr.add(a.var, 1.0);
            }
        }
        let rhs = 1.0 - active.len() as f64;
        LinearConstraint::ge(ConstraintKind::NoGood, expr, rhs)
    }

    /// Whether `values` satisfy every row, cut and fixing.
    pub fn is_feasible(&self, values: &[f64]) -> bool {
        let fixings_ok = self
            .vars
            .iter()
            .enumerate()
            .all(|(i, v)| !v.fixed_zero || values.get(i).copied().unwrap_or(0.0) < 0.5);
        fixings_ok && self.all_constraints().all(|c| c.is_satisfied(values))
    }
}

impl fmt::Display for AssignmentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables ({} assignments), {} constraints, {} cuts",
            self.vars.len(),
            self.assignments.len(),
            self.constraints.len(),
            self.cuts.len()
        )
    }
}
