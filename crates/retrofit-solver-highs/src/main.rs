//! HiGHS LP solver plugin.
//!
//! Reads a [`retrofit_solver_common::LpProblem`] as JSON on stdin, solves it
//! with HiGHS via the `good_lp` modeling layer, and writes an
//! [`retrofit_solver_common::LpSolution`] as JSON on stdout.
//!
//! # HiGHS
//!
//! HiGHS is a dual revised simplex LP solver (with presolve and an interior
//! point method for large problems). It is the primary solver for the hybrid
//! dispatch LP; the `retrofit-solver-cbc` binary is the fallback when HiGHS
//! is not installed.

use anyhow::{Context, Result};
use good_lp::{variable, Expression, ResolutionError, Solution, SolverModel, Variable};
use retrofit_solver_common::{Constraint, ExitCode, LpProblem, LpSolution, Sense, SolutionStatus};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::time::Instant;
use tracing::{debug, error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("retrofit-solver-highs v{}", env!("CARGO_PKG_VERSION"));

    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            error!("solver error: {e:?}");
            ExitCode::SolverError
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> Result<()> {
    debug!("reading problem from stdin");
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("failed to read problem from stdin")?;

    if input.is_empty() {
        anyhow::bail!("empty input: no problem data received");
    }

    let problem: LpProblem =
        serde_json::from_slice(&input).context("failed to parse LP problem JSON")?;

    info!(
        "problem: {} variables, {} constraints",
        problem.variables.len(),
        problem.constraints.len()
    );

    let solution = solve_with_highs(&problem);

    let output = serde_json::to_vec(&solution).context("failed to serialize solution")?;
    io::stdout()
        .write_all(&output)
        .context("failed to write solution to stdout")?;

    info!(
        "solution written: status={:?} objective={:.6}",
        solution.status, solution.objective
    );

    Ok(())
}

fn solve_with_highs(problem: &LpProblem) -> LpSolution {
    let start = Instant::now();

    let mut var_defs = good_lp::variables!();
    let mut by_name: HashMap<String, Variable> = HashMap::with_capacity(problem.variables.len());
    for v in &problem.variables {
        let handle = var_defs.add(variable().min(v.lower).max(v.upper));
        by_name.insert(v.name.clone(), handle);
    }

    let objective = linear_expr(&problem.objective, &by_name);
    let model = var_defs.minimise(objective).using(good_lp::solvers::highs::highs);

    let mut model = model;
    for c in &problem.constraints {
        let expr = linear_expr(&c.terms, &by_name);
        model = match c.sense {
            Sense::Le => model.with(expr.leq(c.rhs)),
            Sense::Ge => model.with(expr.geq(c.rhs)),
            Sense::Eq => model.with(expr.eq(c.rhs)),
        };
    }

    match model.solve() {
        Ok(solution) => {
            let values = by_name
                .iter()
                .map(|(name, var)| (name.clone(), solution.value(*var)))
                .collect();
            let objective_value: f64 = problem
                .objective
                .iter()
                .map(|t| t.coeff * by_name.get(&t.var).map(|v| solution.value(*v)).unwrap_or(0.0))
                .sum();
            LpSolution {
                status: SolutionStatus::Optimal,
                objective: objective_value,
                values,
                solve_time_ms: start.elapsed().as_millis() as u64,
                error_message: None,
            }
        }
        Err(ResolutionError::Infeasible) => LpSolution {
            status: SolutionStatus::Infeasible,
            objective: f64::NAN,
            values: HashMap::new(),
            solve_time_ms: start.elapsed().as_millis() as u64,
            error_message: Some("infeasible".to_string()),
        },
        Err(ResolutionError::Unbounded) => LpSolution {
            status: SolutionStatus::Unbounded,
            objective: f64::NAN,
            values: HashMap::new(),
            solve_time_ms: start.elapsed().as_millis() as u64,
            error_message: Some("unbounded".to_string()),
        },
        Err(other) => LpSolution {
            status: SolutionStatus::Error,
            objective: f64::NAN,
            values: HashMap::new(),
            solve_time_ms: start.elapsed().as_millis() as u64,
            error_message: Some(other.to_string()),
        },
    }
}

fn linear_expr(terms: &[retrofit_solver_common::LpTerm], by_name: &HashMap<String, Variable>) -> Expression {
    terms
        .iter()
        .fold(Expression::from(0.0), |acc, t| match by_name.get(&t.var) {
            Some(&var) => acc + t.coeff * var,
            None => acc,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_solver_common::{LpTerm, Variable as LpVariable};

    #[test]
    fn solves_a_trivial_bounded_lp() {
        let problem = LpProblem::new(
            vec![LpVariable::non_negative("x", 10.0)],
            vec![LpTerm::new("x", -1.0)],
            vec![Constraint::le("cap", vec![LpTerm::new("x", 1.0)], 10.0)],
        );
        let solution = solve_with_highs(&problem);
        assert!(solution.status.is_usable());
        assert!((solution.value("x") - 10.0).abs() < 1e-6);
    }
}
