// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Static beat budget for a compiled continuity.
//!
//! Only costs that fold to constants are counted. Anything that depends on
//! positions or variables is skipped, so the check never rejects text that
//! could fit at run time.

use super::ast::{Procedure, ProcedureList, Value};
use super::error::CompileError;

/// Beats a procedure is known to consume before execution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Cost {
    /// A fixed number of beats.
    Known(u64),
    /// Whatever is left on the sheet.
    Remainder,
    /// Depends on run-time positions or variables.
    Unknown,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn beats_of(value: &Value) -> Cost {
    if matches!(value, Value::Remaining) {
        return Cost::Remainder;
    }
    match value.constant_value() {
        Some(v) if v.is_finite() => Cost::Known((v + 0.5).floor().abs() as u64),
        _ => Cost::Unknown,
    }
}

pub(crate) fn cost(procedure: &Procedure) -> Cost {
    match procedure {
        Procedure::Set { .. } | Procedure::Magic(_) | Procedure::Grid(_) => Cost::Known(0),
        Procedure::Blam | Procedure::Mtrm(_) => Cost::Remainder,
        Procedure::Mt { beats, .. }
        | Procedure::Close { beats, .. }
        | Procedure::Countermarch { beats, .. }
        | Procedure::Dmcm { beats, .. }
        | Procedure::Hscm { beats, .. } => beats_of(beats),
        Procedure::Even { steps, .. }
        | Procedure::Fm { steps, .. }
        | Procedure::March { steps, .. }
        | Procedure::Rotate { steps, .. } => beats_of(steps),
        Procedure::Dmhs(_)
        | Procedure::Ewns(_)
        | Procedure::Fmto(_)
        | Procedure::Fountain { .. }
        | Procedure::Hsdm(_)
        | Procedure::Nsew(_) => Cost::Unknown,
    }
}

pub(crate) fn check(list: &ProcedureList, beats: u32) -> Result<(), CompileError> {
    let budget = u64::from(beats);
    let mut used = 0u64;
    let mut remainder_taken = false;
    for item in list {
        match cost(&item.node) {
            Cost::Known(0) | Cost::Unknown => {}
            Cost::Remainder => remainder_taken = true,
            Cost::Known(n) => {
                if remainder_taken {
                    return Err(CompileError::new(
                        format!("{} needs {n} beats after the remaining beats were used", item.node.verb()),
                        item.node.verb(),
                        item.span,
                    ));
                }
                if used + n > budget {
                    return Err(CompileError::new(
                        format!(
                            "{} needs {n} beats but only {} of {beats} remain",
                            item.node.verb(),
                            budget - used
                        ),
                        item.node.verb(),
                        item.span,
                    ));
                }
                used += n;
            }
        }
    }
    Ok(())
}
