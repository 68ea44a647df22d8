//! Translation of an [`AssignmentModel`] into a `good_lp` problem.

use good_lp::solvers::{ResolutionError, Solver};
use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use super::{is_no_feasible_message, SolveOutcome, SolverError};
use crate::mip::{AssignmentModel, LinearExpr, Relation, VarKind};
use crate::models::TerminationStatus;

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(id, coef) in &expr.terms {
        out += coef * vars[id.0];
    }
    out
}

/// Builds and solves the model with `solver`.
///
/// Binary values are rounded so that downstream thresholds see exact 0/1.
pub(crate) fn solve_with<S>(model: &AssignmentModel, solver: S) -> Result<SolveOutcome, SolverError>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = model
        .vars()
        .iter()
        .map(|def| {
            let definition = match def.kind {
                VarKind::Binary => variable().binary(),
                VarKind::NonNegative => variable().min(0.0),
            };
            let definition = if def.fixed_zero {
                definition.max(0.0)
            } else {
                definition
            };
            problem_vars.add(definition.name(def.name.clone()))
        })
        .collect();

    let objective = to_expression(model.objective(), &vars);
    let mut problem = problem_vars.maximise(objective).using(solver);
    for row in model.all_constraints() {
        let lhs = to_expression(&row.expr, &vars);
        let rhs = row.rhs;
        problem = match row.relation {
            Relation::Le => problem.with(constraint!(lhs <= rhs)),
            Relation::Ge => problem.with(constraint!(lhs >= rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => {
            let values = vars
                .iter()
                .zip(model.vars())
                .map(|(&var, def)| {
                    let value = solution.value(var);
                    match def.kind {
                        VarKind::Binary => value.round(),
                        VarKind::NonNegative => value.max(0.0),
                    }
                })
                .collect();
            Ok(SolveOutcome {
                termination: TerminationStatus::Optimal,
                values,
            })
        }
        Err(ResolutionError::Infeasible) => {
            Ok(SolveOutcome::without_solution(TerminationStatus::Infeasible))
        }
        Err(ResolutionError::Unbounded) => {
            Ok(SolveOutcome::without_solution(TerminationStatus::Unbounded))
        }
        Err(err) => {
            let message = err.to_string();
            if is_no_feasible_message(&message) {
                tracing::debug!(%message, "backend reported no feasible solution");
                Ok(SolveOutcome::without_solution(TerminationStatus::Infeasible))
            } else {
                Err(SolverError::Backend(message))
            }
        }
    }
}
