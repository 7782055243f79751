//! Joint sizing and dispatch optimizer for a gas+solar+battery retrofit.
//!
//! Formulates and solves a continuous LP (framed historically as a MILP,
//! though no integer variables are used) that jointly sizes solar nameplate,
//! battery power, and battery energy while co-optimizing hourly dispatch
//! over a 288-step representative year.

pub mod conflict;
pub mod error;
pub mod milp;
pub mod orchestrate;
pub mod profile;
pub mod types;

pub use error::{HybridError, HybridResult};
pub use orchestrate::optimize;
pub use types::{DispatchRow, HybridRequest, HybridResponse, LcoeComponent, SolverStatus};
