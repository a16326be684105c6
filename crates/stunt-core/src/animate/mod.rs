// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Animation engine.
//!
//! [`build_timeline`] executes every marcher's continuity on every animated
//! sheet and records one frame per global beat, plus the colliding pairs of
//! each beat. Problems are collected as [`AnimateErrors`]; they never stop
//! the build. A marcher whose continuity fails to compile, or whose
//! reference points loop back on themselves, holds its position for that
//! sheet.

mod collision;
mod timeline;

pub use collision::{CollisionPolicy, CollisionSet};
pub use timeline::{AnimateError, AnimateErrors, Info, Timeline};

use serde::{Deserialize, Serialize};
use stunt_geom::{direction, Beat, Coord};
use tracing::{debug, info, instrument, warn};

use crate::continuity::Span;
use crate::exec::{self, AnimateErrorKind, EmptyContinuity, ExecContext, Plan, RefTrack, Variables};
use crate::show::{MarcherId, RefPoint, Sheet, Show, REF_SLOTS};
use timeline::SheetSpan;

/// Knobs for [`build_timeline_with`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// What an empty continuity does.
    pub empty_continuity: EmptyContinuity,
    /// Which separations are reported as collisions.
    pub collision_policy: CollisionPolicy,
}

/// Builds a timeline with the default [`AnimationConfig`].
#[must_use]
pub fn build_timeline(show: &Show) -> Timeline {
    build_timeline_with(show, &AnimationConfig::default())
}

/// Builds a timeline for `show`.
#[instrument(skip_all, fields(sheets = show.sheets().len(), marchers = show.marcher_count()))]
#[must_use]
pub fn build_timeline_with(show: &Show, config: &AnimationConfig) -> Timeline {
    let mut animator = Animator::new(show.marcher_count(), *config);
    for (index, sheet) in show.sheets().iter().enumerate() {
        if !sheet.is_animated() {
            debug!(sheet = index, "skipping sheet without beats");
            continue;
        }
        let next = show.next_animated(index).and_then(|i| show.sheet(i));
        animator.sheet(index, sheet, next);
    }
    let timeline = animator.finish();
    info!(
        beats = timeline.total_beats(),
        errors = timeline.errors().len(),
        "timeline built"
    );
    timeline
}

struct Animator {
    config: AnimationConfig,
    seeded: bool,
    positions: Vec<Coord>,
    facings: Vec<f64>,
    vars: Vec<Variables>,
    timeline: Timeline,
}

impl Animator {
    fn new(marchers: usize, config: AnimationConfig) -> Self {
        Self {
            config,
            seeded: false,
            positions: vec![Coord::ZERO; marchers],
            facings: vec![direction::E; marchers],
            vars: vec![Variables::new(); marchers],
            timeline: Timeline::default(),
        }
    }

    fn finish(mut self) -> Timeline {
        self.timeline.end = self.positions;
        self.timeline
    }

    fn sheet(&mut self, index: usize, sheet: &Sheet, next: Option<&Sheet>) {
        debug!(sheet = index, beats = sheet.beats(), "animating sheet");
        if !self.seeded {
            for (slot, point) in self.positions.iter_mut().zip(sheet.points()) {
                *slot = point.position;
            }
            self.seeded = true;
        }
        let plans = self.plans(index, sheet, next);

        let first_beat = self.timeline.frames.len();
        for beat in 0..sheet.beats() {
            let global = Beat::new(self.timeline.frames.len());
            let frame: Vec<Info> = plans
                .iter()
                .enumerate()
                .map(|(m, plan)| Info::from_state(MarcherId(m), global, &plan.state_at(beat)))
                .collect();
            let positions: Vec<Coord> = frame.iter().map(|i| i.position).collect();
            self.timeline
                .collisions
                .push(CollisionSet::detect(&positions, self.config.collision_policy));
            self.timeline.frames.push(frame);
        }
        self.timeline.spans.push(SheetSpan {
            sheet: index,
            first_beat,
            beats: self.timeline.frames.len() - first_beat,
        });

        for (m, plan) in plans.iter().enumerate() {
            self.positions[m] = plan.end_position();
            self.facings[m] = plan.end_facing();
        }
    }

    /// Plans every marcher on `sheet`, followed marchers first.
    fn plans(&mut self, index: usize, sheet: &Sheet, next: Option<&Sheet>) -> Vec<Plan> {
        let beats = sheet.beats();
        let count = sheet.marcher_count();
        let mut plans: Vec<Option<Plan>> = vec![None; count];
        let mut tracks: Vec<Vec<Coord>> = vec![Vec::new(); count];
        let order = sheet.reference_order();

        for &marcher in &order.cyclic {
            let m = marcher.index();
            warn!(sheet = index, %marcher, "cyclic reference, holding position");
            self.record(index, sheet, marcher, AnimateErrorKind::CyclicReference, None, None);
            let plan = Plan::hold(self.positions[m], self.facings[m], beats);
            tracks[m] = plan.track();
            plans[m] = Some(plan);
        }

        for &marcher in &order.order {
            let m = marcher.index();
            let Some(point) = sheet.point(marcher) else {
                continue;
            };
            let plan = match sheet.procedures(point.symbol) {
                Err(err) => {
                    warn!(sheet = index, %marcher, error = %err, "continuity failed to compile");
                    let (span, message) = (Some(err.span()), Some(err.to_string()));
                    self.record(index, sheet, marcher, AnimateErrorKind::Syntax, span, message);
                    Plan::hold(self.positions[m], self.facings[m], beats)
                }
                Ok(procedures) => {
                    let mut refs = [RefTrack::Fixed(point.position); REF_SLOTS];
                    for (slot, reference) in refs.iter_mut().zip(&point.refs) {
                        match reference {
                            Some(RefPoint::Fixed(c)) => *slot = RefTrack::Fixed(*c),
                            Some(RefPoint::Marcher(leader)) => {
                                if let Some(track) = tracks.get(leader.index()) {
                                    *slot = RefTrack::Follow(track);
                                }
                            }
                            None => {}
                        }
                    }
                    let ctx = ExecContext {
                        beats,
                        start: self.positions[m],
                        start_facing: self.facings[m],
                        sheet_position: point.position,
                        next: next.and_then(|s| s.point(marcher)).map(|p| p.position),
                        refs,
                        empty_continuity: self.config.empty_continuity,
                    };
                    exec::plan(procedures, &ctx, &mut self.vars[m])
                }
            };
            for diagnostic in plan.diagnostics() {
                self.record(index, sheet, marcher, diagnostic.kind, diagnostic.span, None);
            }
            tracks[m] = plan.track();
            plans[m] = Some(plan);
        }

        plans
            .into_iter()
            .enumerate()
            .map(|(m, plan)| {
                plan.unwrap_or_else(|| Plan::hold(self.positions[m], self.facings[m], beats))
            })
            .collect()
    }

    fn record(
        &mut self,
        index: usize,
        sheet: &Sheet,
        marcher: MarcherId,
        kind: AnimateErrorKind,
        span: Option<Span>,
        message: Option<String>,
    ) {
        let symbol = sheet.point(marcher).map(|p| p.symbol).unwrap_or_default();
        self.timeline.errors.push(AnimateError {
            kind,
            sheet: index,
            marcher,
            symbol,
            span,
            message,
        });
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::show::{SheetPoint, Symbol};

    fn point(x: i32, y: i32) -> SheetPoint {
        SheetPoint::new(Coord::from_steps(x, y), Symbol::Plain)
    }

    #[test]
    fn marchers_reach_the_next_sheet() {
        let show = Show::new(vec![
            Sheet::new("1", 4, vec![point(0, 0)]).with_continuity(Symbol::Plain, "EVEN REM NP"),
            Sheet::new("2", 2, vec![point(4, 0)]),
        ])
        .unwrap();
        let timeline = build_timeline(&show);
        assert_eq!(timeline.total_beats(), 6);
        assert!(timeline.errors().is_empty());
        let at = |b| timeline.info_at(Beat::new(b), MarcherId(0)).unwrap().position;
        assert_eq!(at(0), Coord::from_steps(0, 0));
        assert_eq!(at(2), Coord::from_steps(2, 0));
        assert_eq!(at(4), Coord::from_steps(4, 0));
        assert_eq!(timeline.sheet_at(Beat::new(5)), Some((1, 1)));
        assert_eq!(timeline.sheet_at(Beat::new(6)), None);
    }

    #[test]
    fn compile_errors_hold_the_marcher() {
        let show = Show::new(vec![
            Sheet::new("1", 4, vec![point(0, 0)]).with_continuity(Symbol::Plain, "JUMP NP"),
            Sheet::new("2", 2, vec![point(4, 0)]),
        ])
        .unwrap();
        let timeline = build_timeline(&show);
        let errors: Vec<&AnimateError> = timeline.errors().iter().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, AnimateErrorKind::Syntax);
        assert_eq!(errors[0].span.map(|s| (s.line, s.column)), Some((1, 1)));
        let last = timeline.info_at(Beat::new(3), MarcherId(0)).unwrap();
        assert_eq!(last.position, Coord::ZERO);
    }

    #[test]
    fn unanimated_sheets_are_skipped() {
        let show = Show::new(vec![
            Sheet::new("1", 2, vec![point(0, 0)]).with_continuity(Symbol::Plain, "BLAM"),
            Sheet::new("pause", 0, vec![point(9, 9)]),
            Sheet::new("3", 2, vec![point(2, 0)]),
        ])
        .unwrap();
        let timeline = build_timeline(&show);
        assert!(timeline.errors().is_empty());
        assert_eq!(timeline.sheet_start(1), None);
        assert_eq!(timeline.sheet_start(2), Some(Beat::new(2)));
        assert_eq!(timeline.final_positions(), &[Coord::from_steps(2, 0)]);
    }

    #[test]
    fn followers_read_their_leader_on_the_current_beat() {
        let mut follower = point(0, 4);
        follower.symbol = Symbol::Sol;
        let mut sheet = Sheet::new("1", 4, vec![point(0, 0), follower])
            .with_continuity(Symbol::Plain, "FM 4 N")
            .with_continuity(Symbol::Sol, "MT 2 N A = DIR(R1) MTRM A");
        sheet
            .set_reference(MarcherId(1), 1, Some(RefPoint::Marcher(MarcherId(0))))
            .unwrap();
        let show = Show::new(vec![sheet]).unwrap();
        let timeline = build_timeline(&show);
        assert!(timeline.errors().is_empty(), "{:?}", timeline.errors());
        let facing = timeline.info_at(Beat::new(3), MarcherId(1)).unwrap().facing;
        let expected = Coord::from_steps(2, -4).direction();
        assert!((facing - expected).abs() < 1e-9);
    }

    #[test]
    fn cyclic_references_are_reported_per_marcher() {
        let mut sheet = Sheet::new("1", 2, vec![point(0, 0), point(4, 0)])
            .with_continuity(Symbol::Plain, "FM 2 N");
        for (from, to) in [(0, 1), (1, 0)] {
            sheet
                .set_reference(MarcherId(from), 1, Some(RefPoint::Marcher(MarcherId(to))))
                .unwrap();
        }
        let show = Show::new(vec![sheet]).unwrap();
        let timeline = build_timeline(&show);
        let kinds: Vec<(MarcherId, AnimateErrorKind)> =
            timeline.errors().iter().map(|e| (e.marcher, e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (MarcherId(0), AnimateErrorKind::CyclicReference),
                (MarcherId(1), AnimateErrorKind::CyclicReference)
            ]
        );
        assert_eq!(timeline.final_positions(), &[point(0, 0).position, point(4, 0).position]);
    }

    #[test]
    fn collisions_follow_the_policy() {
        let mut still = point(2, 0);
        still.symbol = Symbol::Sol;
        let show = Show::new(vec![Sheet::new("1", 2, vec![point(0, 0), still])
            .with_continuity(Symbol::Plain, "FM 2 N")
            .with_continuity(Symbol::Sol, "MTRM N")])
        .unwrap();

        let strict = build_timeline(&show);
        assert_eq!(strict.beats_with_collisions().count(), 0);

        let config = AnimationConfig {
            collision_policy: CollisionPolicy::IncludeWarnings,
            ..AnimationConfig::default()
        };
        let loose = build_timeline_with(&show, &config);
        let beats: Vec<Beat> = loose.beats_with_collisions().collect();
        assert_eq!(beats, vec![Beat::new(1)]);
        assert!(loose
            .collisions_at(Beat::new(1))
            .unwrap()
            .contains(MarcherId(1), MarcherId(0)));
        assert!(loose.collisions_at(Beat::new(9)).is_none());
    }
}
