// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Procedure execution.
//!
//! [`plan`] runs a marcher's compiled procedures once, producing a [`Plan`]:
//! the ordered [`Command`]s plus the problems met along the way. A plan is
//! then sampled beat by beat through [`Plan::state_at`] or a [`Run`].
//!
//! The beat count is fixed per sheet. Whatever the procedures do, the plan
//! covers exactly that many beats: overlong commands are clipped
//! ([`AnimateErrorKind::OutOfTime`]), a missed destination gets a fix-up
//! move ([`AnimateErrorKind::WrongPlace`]) and unused beats become mark
//! time ([`AnimateErrorKind::ExtraTime`]).

mod command;
mod context;
mod error;
mod plan;
mod planner;

pub use command::{Command, StepStyle};
pub use context::{EmptyContinuity, ExecContext, RefTrack, Variables};
pub use error::{AnimateErrorKind, Diagnostic};
pub use plan::{MarcherState, Plan, Run};

use stunt_geom::Coord;

use crate::continuity::ProcedureList;

/// Executes `procedures` in `ctx`, reading and writing `vars`.
#[must_use]
pub fn plan(procedures: &ProcedureList, ctx: &ExecContext<'_>, vars: &mut Variables) -> Plan {
    planner::Planner::new(ctx, vars).execute(procedures)
}

/// Runs `procedures` for `beats` beats from `start`, with no next sheet and
/// every reference point on `start`.
#[must_use]
pub fn run(start: Coord, procedures: &ProcedureList, beats: u32) -> Run<'static> {
    let ctx = ExecContext::standalone(start, beats);
    let mut vars = Variables::new();
    plan(procedures, &ctx, &mut vars).into_run()
}
