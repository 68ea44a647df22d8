//! Builds an [`AssignmentModel`] from domain data and run parameters.

use std::collections::BTreeMap;
use tracing::info;

use super::{
    AssignmentModel, AssignmentVar, ConstraintKind, LinearConstraint, LinearExpr, VarDef, VarId,
    VarKind,
};
use crate::config::RunParams;
use crate::models::{Host, TimeGrid, UtilityWeights, Visitor};
use crate::movement::MovementPlan;
use crate::validation::{validate_run_params, ConfigError, ConfigErrorKind, ConfigResult};

/// Multiplier on the group penalty for overloaded hosts.
const OVERLOAD_PENALTY_FACTOR: f64 = 3.0;

/// Builds the assignment model.
///
/// Only hosts with non-empty availability enter the model.
///
/// # Example
/// ```no_run
/// use visit_schedule::mip::AssignmentModelBuilder;
/// # fn demo(
/// #     grid: &visit_schedule::models::TimeGrid,
/// #     hosts: &[visit_schedule::models::Host],
/// #     visitors: &[visit_schedule::models::Visitor],
/// #     weights: &visit_schedule::models::UtilityWeights,
/// #     plan: &visit_schedule::movement::MovementPlan,
/// # ) -> Result<(), visit_schedule::validation::ConfigError> {
/// let model = AssignmentModelBuilder::new(grid, hosts, visitors, weights, plan)
///     .build(&visit_schedule::config::RunParams::default())?;
/// println!("{model}");
/// # Ok(())
/// # }
/// ```
pub struct AssignmentModelBuilder<'a> {
    grid: &'a TimeGrid,
    hosts: Vec<&'a Host>,
    visitors: &'a [Visitor],
    weights: &'a UtilityWeights,
    movement: &'a MovementPlan,
}

impl<'a> AssignmentModelBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        grid: &'a TimeGrid,
        hosts: &'a [Host],
        visitors: &'a [Visitor],
        weights: &'a UtilityWeights,
        movement: &'a MovementPlan,
    ) -> Self {
        Self {
            grid,
            hosts: hosts.iter().filter(|h| h.is_schedulable()).collect(),
            visitors,
            weights,
            movement,
        }
    }

    /// Hosts that enter the model.
    pub fn scheduled_hosts(&self) -> &[&'a Host] {
        &self.hosts
    }

    /// Builds the model.
    ///
    /// # Errors
    /// - invalid run parameters
    /// - break enforcement (explicit or implied by the movement input)
    ///   without configured break slots
    pub fn build(&self, params: &RunParams) -> ConfigResult<AssignmentModel> {
        validate_run_params(params)?;

        let enforce_breaks = params.enforce_breaks || self.movement.requires_breaks();
        let breaks = self.grid.breaks();
        if enforce_breaks && breaks.is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::MissingBreaks,
                "Must specify some break times!",
            ));
        }

        let n = self.grid.number_of_slots();
        let slots = self.grid.time_slots();
        let mut m = ModelParts::default();

        // y[v,h,t], in (visitor, host, slot) order
        for (vi, v) in self.visitors.iter().enumerate() {
            for (hi, h) in self.hosts.iter().enumerate() {
                for t in slots.clone() {
                    let var = m.var(
                        format!("y[{},{},{t}]", v.name, h.name),
                        VarKind::Binary,
                        !v.is_available_at(t),
                    );
                    m.assignments.push(AssignmentVar {
                        visitor: vi,
                        host: hi,
                        slot: t,
                        var,
                    });
                }
            }
        }
        let hosts_len = self.hosts.len();
        // the loop above is dense, so positions are computable
        let y_of = |assignments: &[AssignmentVar], vi: usize, hi: usize, t: usize| {
            assignments[(vi * hosts_len + hi) * n + (t - 1)].var
        };

        let excess: Vec<Vec<VarId>> = self
            .hosts
            .iter()
            .map(|h| {
                slots
                    .clone()
                    .map(|t| m.var(format!("excess[{},{t}]", h.name), VarKind::NonNegative, false))
                    .collect()
            })
            .collect();
        let overload: Vec<VarId> = self
            .hosts
            .iter()
            .map(|h| m.var(format!("overload[{}]", h.name), VarKind::Binary, false))
            .collect();

        // objective
        let mut objective = LinearExpr::new();
        for a in &m.assignments {
            let w = self
                .weights
                .get(&self.visitors[a.visitor].name, &self.hosts[a.host].name);
            objective.add(a.var, w);
        }
        for row in &excess {
            for &e in row {
                objective.add(e, -params.group_penalty);
            }
        }
        for &o in &overload {
            objective.add(o, -OVERLOAD_PENALTY_FACTOR * params.group_penalty);
        }
        m.objective = objective;

        let a = m.assignments.clone();
        let host_total = |hi: usize| {
            LinearExpr::sum(
                (0..self.visitors.len())
                    .flat_map(|vi| slots.clone().map(move |t| (vi, t)))
                    .map(|(vi, t)| y_of(&a, vi, hi, t)),
            )
        };
        let group = |hi: usize, t: usize| {
            LinearExpr::sum((0..self.visitors.len()).map(|vi| y_of(&a, vi, hi, t)))
        };

        // host availability and phase offsets
        for (hi, h) in self.hosts.iter().enumerate() {
            let phase = self.movement.phase_slot(&h.location);
            for vi in 0..self.visitors.len() {
                for t in slots.clone() {
                    let var = y_of(&a, vi, hi, t);
                    if !h.is_available_at(t) {
                        m.push(LinearConstraint::le(
                            ConstraintKind::Availability,
                            LinearExpr::sum([var]),
                            0.0,
                        ));
                    }
                    if t < phase {
                        m.push(LinearConstraint::le(
                            ConstraintKind::Phase,
                            LinearExpr::sum([var]),
                            0.0,
                        ));
                    }
                }
            }
        }

        // host load
        for hi in 0..hosts_len {
            m.push(LinearConstraint::ge(
                ConstraintKind::HostMinMeetings,
                host_total(hi),
                f64::from(params.min_visitors),
            ));
            m.push(LinearConstraint::le(
                ConstraintKind::HostMaxMeetings,
                host_total(hi),
                f64::from(params.max_visitors),
            ));
            // 2*overload >= total - max_visitors + 2
            m.push(LinearConstraint::le(
                ConstraintKind::Overload,
                host_total(hi).with_term(overload[hi], -2.0),
                f64::from(params.max_visitors) - 2.0,
            ));
            for t in slots.clone() {
                // excess >= group - 1
                m.push(LinearConstraint::le(
                    ConstraintKind::GroupExcess,
                    group(hi, t).with_term(excess[hi][t - 1], -1.0),
                    1.0,
                ));
                m.push(LinearConstraint::le(
                    ConstraintKind::MaxGroup,
                    group(hi, t),
                    f64::from(params.max_group),
                ));
            }
        }

        // visitor rules
        for (vi, v) in self.visitors.iter().enumerate() {
            for t in slots.clone() {
                m.push(LinearConstraint::le(
                    ConstraintKind::OneMeetingPerSlot,
                    LinearExpr::sum((0..hosts_len).map(|hi| y_of(&a, vi, hi, t))),
                    1.0,
                ));
            }
            let required = (params.min_meetings_per_visitor as usize).min(v.available_slot_count(n));
            m.push(LinearConstraint::ge(
                ConstraintKind::VisitorMinMeetings,
                LinearExpr::sum(
                    (0..hosts_len).flat_map(|hi| slots.clone().map(move |t| (hi, t)))
                        .map(|(hi, t)| y_of(&a, vi, hi, t)),
                ),
                required as f64,
            ));
            for hi in 0..hosts_len {
                m.push(LinearConstraint::le(
                    ConstraintKind::MeetHostOnce,
                    LinearExpr::sum(slots.clone().map(|t| y_of(&a, vi, hi, t))),
                    1.0,
                ));
            }
        }

        // presence and travel
        if self.movement.policy().tracks_presence() {
            let travel = self.movement.travel();
            let mut hosts_at: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (hi, h) in self.hosts.iter().enumerate() {
                if let Some(li) = self.grid.location_index(&h.location) {
                    hosts_at.entry(li).or_default().push(hi);
                }
            }
            for (vi, v) in self.visitors.iter().enumerate() {
                let presence: Vec<Vec<VarId>> = self
                    .grid
                    .locations()
                    .iter()
                    .map(|l| {
                        slots
                            .clone()
                            .map(|t| {
                                m.var(
                                    format!("presence[{},{},{t}]", v.name, l.name),
                                    VarKind::Binary,
                                    false,
                                )
                            })
                            .collect()
                    })
                    .collect();

                for (li, his) in &hosts_at {
                    for t in slots.clone() {
                        let expr = LinearExpr::sum(his.iter().map(|&hi| y_of(&a, vi, hi, t)))
                            .with_term(presence[*li][t - 1], -1.0);
                        m.push(LinearConstraint::le(ConstraintKind::PresenceLink, expr, 0.0));
                    }
                }

                for (from, to, lag) in travel.positive_lags() {
                    for t in slots.clone() {
                        let last = n.min(t + lag as usize);
                        for t2 in (t + 1)..=last {
                            m.push(LinearConstraint::le(
                                ConstraintKind::Travel,
                                LinearExpr::sum([presence[from][t - 1], presence[to][t2 - 1]]),
                                1.0,
                            ));
                        }
                    }
                }
            }
        }

        // breaks
        if enforce_breaks {
            let break_count = breaks.len() as f64;
            for vi in 0..self.visitors.len() {
                let expr = LinearExpr::sum(
                    (0..hosts_len)
                        .flat_map(|hi| breaks.iter().map(move |&b| (hi, b)))
                        .map(|(hi, b)| y_of(&a, vi, hi, b)),
                );
                m.push(LinearConstraint::le(
                    ConstraintKind::VisitorBreak,
                    expr,
                    break_count - 1.0,
                ));
            }
            for (hi, h) in self.hosts.iter().enumerate() {
                let flags: Vec<VarId> = breaks
                    .iter()
                    .map(|&b| m.var(format!("break[{},{b}]", h.name), VarKind::Binary, false))
                    .collect();
                // group <= max_group * (1 - flag)
                for (&b, &flag) in breaks.iter().zip(&flags) {
                    let max_group = f64::from(params.max_group);
                    m.push(LinearConstraint::le(
                        ConstraintKind::HostBreakCapacity,
                        group(hi, b).with_term(flag, max_group),
                        max_group,
                    ));
                }
                let fully_available = slots.clone().all(|t| h.is_available_at(t));
                if fully_available {
                    m.push(LinearConstraint::ge(
                        ConstraintKind::HostMustBreak,
                        LinearExpr::sum(flags),
                        1.0,
                    ));
                }
            }
        }

        let model = AssignmentModel {
            vars: m.vars,
            objective: m.objective,
            constraints: m.constraints,
            cuts: Vec::new(),
            assignments: m.assignments,
            visitors: self.visitors.iter().map(|v| v.name.clone()).collect(),
            hosts: self.hosts.iter().map(|h| h.name.clone()).collect(),
            number_of_slots: n,
        };
        info!(
            visitors = self.visitors.len(),
            hosts = hosts_len,
            slots = n,
            policy = %self.movement.policy(),
            enforce_breaks,
            "built assignment model: {model}"
        );
        Ok(model)
    }
}

#[derive(Default)]
struct ModelParts {
    vars: Vec<VarDef>,
    objective: LinearExpr,
    constraints: Vec<LinearConstraint>,
    assignments: Vec<AssignmentVar>,
}

impl ModelParts {
    fn var(&mut self, name: String, kind: VarKind, fixed_zero: bool) -> VarId {
        self.vars.push(VarDef {
            name,
            kind,
            fixed_zero,
        });
        VarId(self.vars.len() - 1)
    }

    fn push(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }
}
