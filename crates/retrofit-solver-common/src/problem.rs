use serde::{Deserialize, Serialize};

/// A single LP decision variable with box bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl Variable {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Variable {
            name: name.into(),
            lower,
            upper,
        }
    }

    pub fn free(name: impl Into<String>) -> Self {
        Variable::new(name, f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn non_negative(name: impl Into<String>, upper: f64) -> Self {
        Variable::new(name, 0.0, upper)
    }
}

/// A coefficient on a named variable within a linear expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpTerm {
    pub var: String,
    pub coeff: f64,
}

impl LpTerm {
    pub fn new(var: impl Into<String>, coeff: f64) -> Self {
        LpTerm {
            var: var.into(),
            coeff,
        }
    }
}

/// The comparison a constraint row enforces against its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// One row of the constraint matrix: `sum(terms) <sense> rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<LpTerm>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, terms: Vec<LpTerm>, sense: Sense, rhs: f64) -> Self {
        Constraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        }
    }

    pub fn le(name: impl Into<String>, terms: Vec<LpTerm>, rhs: f64) -> Self {
        Constraint::new(name, terms, Sense::Le, rhs)
    }

    pub fn ge(name: impl Into<String>, terms: Vec<LpTerm>, rhs: f64) -> Self {
        Constraint::new(name, terms, Sense::Ge, rhs)
    }

    pub fn eq(name: impl Into<String>, terms: Vec<LpTerm>, rhs: f64) -> Self {
        Constraint::new(name, terms, Sense::Eq, rhs)
    }
}

/// A solver-agnostic linear program: minimize a linear objective over boxed
/// variables subject to linear constraint rows.
///
/// This is the entire payload crossing the subprocess boundary on the way
/// in. It has no notion of buses, generators, or timesteps — the orchestrator
/// flattens the hybrid dispatch model into this shape before handing it off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpProblem {
    pub protocol_version: i32,
    pub variables: Vec<Variable>,
    pub objective: Vec<LpTerm>,
    pub constraints: Vec<Constraint>,
    pub timeout_seconds: u64,
}

impl LpProblem {
    pub fn new(variables: Vec<Variable>, objective: Vec<LpTerm>, constraints: Vec<Constraint>) -> Self {
        LpProblem {
            protocol_version: crate::PROTOCOL_VERSION,
            variables,
            objective,
            constraints,
            timeout_seconds: 120,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_stamps_current_protocol_version() {
        let p = LpProblem::new(
            vec![Variable::non_negative("x", 10.0)],
            vec![LpTerm::new("x", 1.0)],
            vec![Constraint::le("cap", vec![LpTerm::new("x", 1.0)], 10.0)],
        );
        assert_eq!(p.protocol_version, crate::PROTOCOL_VERSION);
        assert_eq!(p.timeout_seconds, 120);
    }

    #[test]
    fn with_timeout_overrides_default() {
        let p = LpProblem::new(vec![], vec![], vec![]).with_timeout(30);
        assert_eq!(p.timeout_seconds, 30);
    }
}
