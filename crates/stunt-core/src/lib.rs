// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! stunt-core: continuity compiler, beat-stepped execution and show animation.
//!
//! Text goes in, timelines come out. [`continuity::compile`] turns one
//! sheet's movement notation into procedures, [`exec::plan`] runs them for a
//! single marcher, and [`animate::build_timeline`] runs every marcher across
//! a whole [`show::Show`], recording positions and collisions per beat.
//!
//! Everything here is pure computation: no I/O, no global state, and the
//! same inputs always produce the same outputs.
#![forbid(unsafe_code)]

/// Timelines, collision sets and animation problems.
pub mod animate;
/// Continuity lexer, parser and procedure types.
pub mod continuity;
/// Procedure execution for one marcher on one sheet.
pub mod exec;
/// Sheets, marchers and shows.
pub mod show;

pub use animate::{
    build_timeline, build_timeline_with, AnimateError, AnimateErrors, AnimationConfig,
    CollisionPolicy, CollisionSet, Info, Timeline,
};
pub use continuity::{compile, compile_for_sheet, CompileError, ProcedureList};
pub use exec::{AnimateErrorKind, MarcherState, Plan, Run};
pub use show::{ExecError, MarcherId, RefPoint, Sheet, SheetPoint, Show, Symbol};
