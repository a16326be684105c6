// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Evaluates procedures against a marcher's running state.
//!
//! One `Planner` executes one marcher's procedure list for one sheet. Every
//! procedure kind has its own method; each appends [`Command`]s through
//! [`Planner::append`], which enforces the sheet's beat budget.

use core::f64::consts::SQRT_2;

use stunt_geom::coord::{float_to_units, units_to_whole_steps, UNITS_PER_STEP};
use stunt_geom::direction::{self, bound_direction_signed, is_diagonal, is_zero, marching_vector};
use stunt_geom::Coord;

use super::command::{Command, StepStyle};
use super::context::{EmptyContinuity, ExecContext, Variables};
use super::error::{AnimateErrorKind, Diagnostic};
use super::plan::{Plan, Segment};
use crate::continuity::{BinaryOp, Constant, Point, Procedure, ProcedureList, Span, Value, Var};

/// Largest count accepted from a value; larger values are clamped.
const MAX_COUNT: f64 = 1_000_000.0;

pub(crate) struct Planner<'c, 'v> {
    ctx: &'c ExecContext<'c>,
    vars: &'v mut Variables,
    position: Coord,
    beats_left: u32,
    segments: Vec<Segment>,
    last_facing: f64,
    diagnostics: Vec<Diagnostic>,
    span: Option<Span>,
}

impl<'c, 'v> Planner<'c, 'v> {
    pub(crate) fn new(ctx: &'c ExecContext<'c>, vars: &'v mut Variables) -> Self {
        Self {
            ctx,
            vars,
            position: ctx.start,
            beats_left: ctx.beats,
            segments: Vec::new(),
            last_facing: ctx.start_facing,
            diagnostics: Vec::new(),
            span: None,
        }
    }

    pub(crate) fn execute(mut self, procedures: &ProcedureList) -> Plan {
        if procedures.is_empty() {
            match self.ctx.empty_continuity {
                EmptyContinuity::HoldPosition => {
                    self.append(Command::mark_time(self.beats_left, direction::E));
                    return self.finish();
                }
                EmptyContinuity::EvenToNext => {
                    if self.ctx.next.is_some() {
                        self.even(&Value::Remaining, Point::Next);
                    } else {
                        self.mark_time_remaining(&Value::Constant(Constant::E));
                    }
                }
            }
        }
        for item in procedures {
            self.span = Some(item.span);
            self.procedure(&item.node);
        }
        self.span = None;

        if let Some(next) = self.ctx.next {
            if self.position != next {
                self.report(AnimateErrorKind::WrongPlace);
                let beats = self.beats_left;
                self.append(Command::travel(beats, next - self.position));
            }
        }
        if self.beats_left > 0 {
            self.report(AnimateErrorKind::ExtraTime);
            self.append(Command::mark_time(self.beats_left, direction::E));
        }
        self.finish()
    }

    fn finish(self) -> Plan {
        let segments: Vec<Segment> = self
            .segments
            .into_iter()
            .filter(|s| s.command.beats() > 0)
            .collect();
        Plan {
            beats: self.ctx.beats,
            start: self.ctx.start,
            start_facing: self.ctx.start_facing,
            segments,
            end: self.position,
            end_facing: self.last_facing,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, kind: AnimateErrorKind) {
        self.diagnostics.push(Diagnostic {
            kind,
            span: self.span,
        });
    }

    fn current_beat(&self) -> u32 {
        self.ctx.beats - self.beats_left
    }

    /// Appends a command, clipping it to the beats left.
    ///
    /// Returns `false` when nothing could be appended because the sheet is
    /// already out of beats.
    fn append(&mut self, mut command: Command) -> bool {
        if self.beats_left < command.beats() {
            self.report(AnimateErrorKind::OutOfTime);
            if self.beats_left == 0 {
                return false;
            }
            command.clip(self.beats_left);
        }
        let start_beat = self.current_beat();
        self.beats_left -= command.beats();
        let start = self.position;
        self.position = command.end_position(start);
        self.last_facing = command.end_facing();
        self.vars.set(Var::Dof, command.motion_direction());
        self.vars.set(Var::Doh, self.last_facing);
        self.segments.push(Segment {
            start_beat,
            start,
            command,
        });
        true
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_int(&mut self, value: f64) -> i32 {
        if !value.is_finite() {
            self.report(AnimateErrorKind::NonInteger);
            return 0;
        }
        let rounded = (value + 0.5).floor().clamp(-MAX_COUNT, MAX_COUNT);
        if (value - rounded).abs() > 1.0 / f64::from(UNITS_PER_STEP) {
            self.report(AnimateErrorKind::NonInteger);
        }
        rounded as i32
    }

    fn to_unsigned(&mut self, value: f64) -> u32 {
        let v = self.to_int(value);
        u32::try_from(v).unwrap_or_else(|_| {
            self.report(AnimateErrorKind::NegativeInteger);
            0
        })
    }

    fn point(&mut self, point: Point) -> Coord {
        match point {
            Point::Current => self.position,
            Point::Start | Point::Ref(0) => self.ctx.sheet_position,
            Point::Next => {
                if let Some(next) = self.ctx.next {
                    next
                } else {
                    self.report(AnimateErrorKind::Undefined);
                    self.position
                }
            }
            Point::Ref(n) => {
                let beat = self.current_beat();
                self.ctx.refs[usize::from(n - 1)].at(beat, self.ctx.sheet_position)
            }
        }
    }

    fn eval(&mut self, value: &Value) -> f64 {
        match value {
            Value::Number(v) => *v,
            Value::Constant(c) => c.value(),
            Value::Remaining => f64::from(self.beats_left),
            Value::Var(var) => {
                if let Some(v) = self.vars.get(*var) {
                    v
                } else {
                    self.report(AnimateErrorKind::Undefined);
                    0.0
                }
            }
            Value::Neg(v) => -self.eval(v),
            Value::Binary { op, lhs, rhs } => match op {
                BinaryOp::Add => self.eval(lhs) + self.eval(rhs),
                BinaryOp::Sub => self.eval(lhs) - self.eval(rhs),
                BinaryOp::Mul => self.eval(lhs) * self.eval(rhs),
                BinaryOp::Div => {
                    let divisor = self.eval(rhs);
                    if is_zero(divisor) {
                        self.report(AnimateErrorKind::DivisionByZero);
                        0.0
                    } else {
                        self.eval(lhs) / divisor
                    }
                }
            },
            Value::Dir(p) => {
                let target = self.point(*p);
                if target == self.position {
                    self.report(AnimateErrorKind::Undefined);
                }
                self.position.direction_to(target)
            }
            Value::DirFrom(a, b) => {
                let from = self.point(*a);
                let to = self.point(*b);
                if from == to {
                    self.report(AnimateErrorKind::Undefined);
                }
                from.direction_to(to)
            }
            Value::Dist(p) => (self.point(*p) - self.position).dm_magnitude(),
            Value::DistFrom(a, b) => {
                let from = self.point(*a);
                (self.point(*b) - from).magnitude()
            }
            Value::Either(d1, d2, p) => {
                let target = self.point(*p);
                let first = self.eval(d1);
                if target == self.position {
                    self.report(AnimateErrorKind::Undefined);
                    return first;
                }
                let second = self.eval(d2);
                let toward = self.position.direction_to(target);
                let off1 = bound_direction_signed(first - toward).abs();
                let off2 = bound_direction_signed(second - toward).abs();
                if off1 > off2 {
                    second
                } else {
                    first
                }
            }
            Value::Opp(d) => self.eval(d) + 180.0,
            Value::Step(beats, block, p) => {
                let vector = self.point(*p) - self.position;
                let beats = self.eval(beats);
                let block = self.eval(block);
                if is_zero(block) {
                    self.report(AnimateErrorKind::DivisionByZero);
                    0.0
                } else {
                    vector.dm_magnitude() * beats / block
                }
            }
        }
    }

    fn procedure(&mut self, procedure: &Procedure) {
        match procedure {
            Procedure::Set { var, value } => {
                let v = self.eval(value);
                self.vars.set(*var, v);
            }
            Procedure::Blam => {
                let vector = self.point(Point::Next) - self.position;
                let beats = self.beats_left;
                self.append(Command::travel(beats, vector));
            }
            Procedure::Close { beats, dir } => self.still(beats, dir, StepStyle::Close),
            Procedure::Mt { beats, dir } => self.still(beats, dir, StepStyle::MarkTime),
            Procedure::Mtrm(dir) => self.mark_time_remaining(dir),
            Procedure::Countermarch {
                ref1,
                ref2,
                steps,
                dir1,
                dir2,
                beats,
            } => self.countermarch(*ref1, *ref2, steps, dir1, dir2, beats),
            Procedure::Dmcm { ref1, ref2, beats } => self.dmcm(*ref1, *ref2, beats),
            Procedure::Hscm { ref1, ref2, beats } => self.hscm(*ref1, *ref2, beats),
            Procedure::Dmhs(p) => self.diagonal_and_high_step(*p, true),
            Procedure::Hsdm(p) => self.diagonal_and_high_step(*p, false),
            Procedure::Even { steps, point } => self.even(steps, *point),
            Procedure::Ewns(p) => self.two_legs(*p, true),
            Procedure::Nsew(p) => self.two_legs(*p, false),
            Procedure::Fountain {
                dir1,
                dir2,
                step_sizes,
                point,
            } => self.fountain(dir1, dir2, step_sizes.as_ref(), *point),
            Procedure::Fm { steps, dir } => self.forward_march(steps, dir),
            Procedure::Fmto(p) => {
                let vector = self.point(*p) - self.position;
                if !vector.is_zero() {
                    let beats = self.to_unsigned(vector.dm_magnitude().trunc());
                    self.append(Command::travel(beats, vector));
                }
            }
            Procedure::Grid(spacing) => {
                let spacing = self.eval(spacing);
                let grid = float_to_units(spacing);
                let snapped = self.position.snapped(grid, 2 * UNITS_PER_STEP);
                let vector = snapped - self.position;
                if !vector.is_zero() {
                    self.append(Command::travel(0, vector));
                }
            }
            Procedure::Magic(p) => {
                let vector = self.point(*p) - self.position;
                self.append(Command::travel(0, vector));
            }
            Procedure::March {
                step_size,
                steps,
                dir,
                facing,
            } => self.march(step_size, steps, dir, facing.as_ref()),
            Procedure::Rotate {
                angle,
                steps,
                pivot,
            } => self.rotate(angle, steps, *pivot),
        }
    }

    fn still(&mut self, beats: &Value, dir: &Value, style: StepStyle) {
        let beats = self.eval(beats);
        let count = self.to_int(beats);
        if count != 0 {
            let facing = self.eval(dir);
            self.append(Command::Still {
                beats: count.unsigned_abs(),
                facing,
                style,
            });
        }
    }

    fn mark_time_remaining(&mut self, dir: &Value) {
        let facing = self.eval(dir);
        let beats = self.beats_left;
        self.append(Command::mark_time(beats, facing));
    }

    /// Moves a marcher backward when `count` is negative: same vector, facing
    /// reversed.
    fn signed_move(&mut self, count: i32, vector: Coord) {
        let command = if count < 0 {
            Command::Move {
                beats: count.unsigned_abs(),
                vector,
                facing: vector.direction() + 180.0,
            }
        } else {
            Command::travel(count.unsigned_abs(), vector)
        };
        self.append(command);
    }

    fn even(&mut self, steps: &Value, point: Point) {
        let vector = self.point(point) - self.position;
        let steps = self.eval(steps);
        let count = self.to_int(steps);
        self.signed_move(count, vector);
    }

    fn forward_march(&mut self, steps: &Value, dir: &Value) {
        let steps = self.eval(steps);
        let count = self.to_int(steps);
        if count == 0 {
            return;
        }
        let dir = self.eval(dir);
        let vector = marching_vector(dir, steps);
        if !vector.is_zero() {
            self.signed_move(count, vector);
        }
    }

    fn march(&mut self, step_size: &Value, steps: &Value, dir: &Value, facing: Option<&Value>) {
        let steps = self.eval(steps);
        let count = self.to_int(steps);
        if count == 0 {
            return;
        }
        let radians = self.eval(dir).to_radians();
        let magnitude = self.eval(step_size) * steps;
        let vector = Coord::new(
            float_to_units(radians.cos() * magnitude),
            float_to_units(-radians.sin() * magnitude),
        );
        if vector.is_zero() {
            return;
        }
        if let Some(face) = facing {
            let face = self.eval(face);
            self.append(Command::Move {
                beats: count.unsigned_abs(),
                vector,
                facing: face,
            });
        } else {
            self.signed_move(count, vector);
        }
    }

    /// `EWNS` (`ew_first`) or `NSEW`: one axis at a time, a beat per step.
    fn two_legs(&mut self, point: Point, ew_first: bool) {
        let delta = self.point(point) - self.position;
        let ew = Coord::new(0, delta.y);
        let ns = Coord::new(delta.x, 0);
        let legs = if ew_first { [ew, ns] } else { [ns, ew] };
        for leg in legs {
            if leg.is_zero() {
                continue;
            }
            let steps = units_to_whole_steps(leg.x + leg.y).unsigned_abs();
            if !self.append(Command::travel(steps, leg)) {
                return;
            }
        }
    }

    /// `DMHS` (`diagonal_first`) or `HSDM`.
    fn diagonal_and_high_step(&mut self, point: Point, diagonal_first: bool) {
        let c = self.point(point) - self.position;
        let signs_differ = (c.x < 0) != (c.y < 0);
        let (high_step, diagonal, hs_beats) = if c.x.unsigned_abs() > c.y.unsigned_abs() {
            let hs = if signs_differ { c.x.saturating_add(c.y) } else { c.x.saturating_sub(c.y) };
            let hs = Coord::new(hs, 0);
            let dm = Coord::new(if signs_differ { c.y.saturating_neg() } else { c.y }, c.y);
            (hs, dm, units_to_whole_steps(hs.x))
        } else {
            let hs = if signs_differ { c.y.saturating_add(c.x) } else { c.y.saturating_sub(c.x) };
            let hs = Coord::new(0, hs);
            let dm = Coord::new(c.x, if signs_differ { c.x.saturating_neg() } else { c.x });
            (hs, dm, units_to_whole_steps(hs.y))
        };
        let dm_beats = units_to_whole_steps(diagonal.x);
        let legs = if diagonal_first {
            [(diagonal, dm_beats), (high_step, hs_beats)]
        } else {
            [(high_step, hs_beats), (diagonal, dm_beats)]
        };
        for (leg, beats) in legs {
            if leg.is_zero() {
                continue;
            }
            if !self.append(Command::travel(beats.unsigned_abs(), leg)) {
                return;
            }
        }
    }

    fn fountain(
        &mut self,
        dir1: &Value,
        dir2: &Value,
        step_sizes: Option<&(Value, Value)>,
        point: Point,
    ) {
        let d1 = self.eval(dir1);
        let (a, c) = match step_sizes {
            Some((s1, _)) => {
                let s1 = self.eval(s1);
                let r = d1.to_radians();
                (s1 * r.cos(), -s1 * r.sin())
            }
            None => direction::marching_unit_vector(d1),
        };
        let d2 = self.eval(dir2);
        let (b, d) = match step_sizes {
            Some((_, s2)) => {
                let s2 = self.eval(s2);
                let r = d2.to_radians();
                (s2 * r.cos(), -s2 * r.sin())
            }
            None => direction::marching_unit_vector(d2),
        };
        let target = self.point(point);
        let vector = target - self.position;
        let (e, f) = vector.to_steps();
        let det = a * d - b * c;
        if is_zero(det) {
            // Parallel legs: only reachable when both directions agree and
            // the destination lies along them.
            if is_zero(a - b) && is_zero(c - d) && is_zero(e * c - a * f) {
                let beats = if is_zero(a) { f / c } else { e / a };
                let beats = self.to_unsigned(beats);
                self.append(Command::travel(beats, vector));
            } else {
                self.report(AnimateErrorKind::InvalidFountain);
            }
            return;
        }
        let first = (d * e - b * f) / det;
        if !is_zero(first) {
            let leg = Coord::from_steps_f64(first * a, first * c);
            let beats = self.to_unsigned(first);
            if !self.append(Command::travel(beats, leg)) {
                return;
            }
        }
        let second = (a * f - c * e) / det;
        if !is_zero(second) {
            let leg = Coord::from_steps_f64(second * b, second * d);
            let beats = self.to_unsigned(second);
            self.append(Command::travel(beats, leg));
        }
    }

    fn rotate(&mut self, angle: &Value, steps: &Value, pivot: Point) {
        let origin = self.point(pivot);
        let radius_vector = self.position - origin;
        let start_angle = if origin == self.position {
            self.eval(&Value::Var(Var::Doh))
        } else {
            origin.direction_to(self.position)
        };
        let steps = self.eval(steps);
        let count = self.to_int(steps);
        let angle = self.eval(angle);
        #[allow(clippy::cast_precision_loss)]
        let radius = (radius_vector.length_squared_units() as f64).sqrt();
        self.append(Command::Rotate {
            beats: count.unsigned_abs(),
            origin,
            radius,
            start_angle,
            end_angle: start_angle + angle,
            backwards: count < 0,
        });
    }

    fn dmcm(&mut self, ref1: Point, ref2: Point, beats: &Value) {
        let r1 = self.point(ref1);
        let r2 = self.point(ref2);
        let two = 2 * UNITS_PER_STEP;
        let Coord { x: c, y: across } = r2 - r1;
        let back = across.saturating_neg();
        let dirs = if c == across.saturating_add(two) {
            (c >= 0).then_some((Constant::SW, Constant::W))
        } else if c == back.saturating_sub(two) {
            (c >= 0).then_some((Constant::SE, Constant::W))
        } else if c == back.saturating_add(two) {
            (c <= 0).then_some((Constant::NW, Constant::E))
        } else if c == across.saturating_sub(two) {
            (c <= 0).then_some((Constant::NE, Constant::E))
        } else {
            None
        };
        self.derived_countermarch(ref1, ref2, beats, dirs);
    }

    fn hscm(&mut self, ref1: Point, ref2: Point, beats: &Value) {
        let r1 = self.point(ref1);
        let r2 = self.point(ref2);
        let two = 2 * UNITS_PER_STEP;
        let across = (r1 - r2).y;
        let dirs = if across == two {
            (r2.x >= r1.x).then_some((Constant::S, Constant::W))
        } else if across == -two {
            (r1.x >= r2.x).then_some((Constant::N, Constant::E))
        } else {
            None
        };
        self.derived_countermarch(ref1, ref2, beats, dirs);
    }

    fn derived_countermarch(
        &mut self,
        ref1: Point,
        ref2: Point,
        beats: &Value,
        dirs: Option<(Constant, Constant)>,
    ) {
        let Some((d1, d2)) = dirs else {
            self.report(AnimateErrorKind::InvalidCountermarch);
            return;
        };
        self.countermarch(
            ref1,
            ref2,
            &Value::Number(1.0),
            &Value::Constant(d1),
            &Value::Constant(d2),
            beats,
        );
    }

    /// Marches the four-leg loop through `ref1` and `ref2` for `beats`.
    fn countermarch(
        &mut self,
        ref1: Point,
        ref2: Point,
        steps: &Value,
        dir1: &Value,
        dir2: &Value,
        beats: &Value,
    ) {
        let d1 = self.eval(dir1);
        let d2 = self.eval(dir2);
        let sine = (d1 - d2).to_radians().sin();
        if is_zero(sine) {
            self.report(AnimateErrorKind::InvalidCountermarch);
            return;
        }
        let r1 = self.point(ref1);
        let r2 = self.point(ref2);
        let steps1 = self.eval(steps);
        let mut beats = self.eval(beats);

        let v1 = marching_vector(d1, steps1);
        let p1 = r1 + v1;
        let mut steps2 =
            (r2 - p1).magnitude() * (r2.direction_to(p1) - d1).to_radians().sin() / sine;
        if is_diagonal(d2) {
            steps2 /= SQRT_2;
        }
        let v2 = marching_vector(d2, steps2);
        let p2 = p1 + v2;
        let p3 = r2 - v1;
        let p0 = p3 - v2;
        let corners = [p0, p1, p2, p3];
        let leg_dirs = [d2 + 180.0, d1, d2, d1 + 180.0];

        let on_leg = |target: Coord, dir: f64, from: Coord| {
            let v = target - from;
            !v.is_zero() && is_zero(bound_direction_signed(v.direction() - dir))
        };
        let Some(mut leg) = [1usize, 2, 3, 0]
            .into_iter()
            .find(|&k| on_leg(corners[k], leg_dirs[k], self.position))
        else {
            self.report(AnimateErrorKind::InvalidCountermarch);
            return;
        };

        let mut idle_legs = 0;
        while beats > 0.0 {
            let v = corners[leg] - self.position;
            let length = v.dm_magnitude();
            if length <= beats {
                beats -= length;
                let count = self.to_unsigned(length);
                if !self.append(Command::travel(count, v)) {
                    return;
                }
                idle_legs = if count == 0 { idle_legs + 1 } else { 0 };
                if idle_legs >= corners.len() {
                    return;
                }
            } else {
                let partial = marching_vector(leg_dirs[leg], beats);
                let count = self.to_unsigned(beats);
                self.append(Command::travel(count, partial));
                return;
            }
            leg = (leg + 1) % corners.len();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::continuity::compile;
    use crate::exec::context::RefTrack;

    fn plan_with(text: &str, ctx: &ExecContext<'_>) -> Plan {
        let list = compile(text).unwrap();
        let mut vars = Variables::new();
        Planner::new(ctx, &mut vars).execute(&list)
    }

    fn ctx(start: Coord, next: Option<Coord>, beats: u32) -> ExecContext<'static> {
        ExecContext {
            next,
            ..ExecContext::standalone(start, beats)
        }
    }

    fn kinds(plan: &Plan) -> Vec<AnimateErrorKind> {
        plan.diagnostics().iter().map(|d| d.kind).collect()
    }

    #[test]
    fn ewns_moves_east_west_first() {
        let c = ctx(Coord::ZERO, Some(Coord::from_steps(2, 3)), 5);
        let plan = plan_with("EWNS NP", &c);
        let path: Vec<Coord> = plan.run().map(|s| s.position).collect();
        assert_eq!(path[1], Coord::from_steps(0, 1));
        assert_eq!(path[3], Coord::from_steps(0, 3));
        assert_eq!(path[4], Coord::from_steps(1, 3));
        assert_eq!(plan.end_position(), Coord::from_steps(2, 3));
        assert!(plan.diagnostics().is_empty());
    }

    #[test]
    fn nsew_moves_north_south_first() {
        let c = ctx(Coord::ZERO, Some(Coord::from_steps(2, 3)), 5);
        let plan = plan_with("NSEW NP", &c);
        let path: Vec<Coord> = plan.run().map(|s| s.position).collect();
        assert_eq!(path[2], Coord::from_steps(2, 0));
        assert_eq!(plan.end_position(), Coord::from_steps(2, 3));
    }

    #[test]
    fn short_continuity_reports_extra_time() {
        let c = ctx(Coord::ZERO, None, 8);
        let plan = plan_with("MT 4 N", &c);
        assert_eq!(kinds(&plan), vec![AnimateErrorKind::ExtraTime]);
        assert_eq!(plan.run().count(), 8);
        let last = plan.state_at(7);
        assert!((last.facing - direction::E).abs() < 1e-9);
    }

    #[test]
    fn overlong_continuity_is_clipped() {
        let c = ctx(Coord::ZERO, None, 4);
        let plan = plan_with("MT 3 N MT 3 N", &c);
        assert_eq!(kinds(&plan), vec![AnimateErrorKind::OutOfTime]);
        assert_eq!(plan.run().count(), 4);
    }

    #[test]
    fn missing_destination_is_fixed_up() {
        let next = Coord::from_steps(4, 0);
        let c = ctx(Coord::ZERO, Some(next), 8);
        let plan = plan_with("MT 4 N", &c);
        assert_eq!(kinds(&plan), vec![AnimateErrorKind::WrongPlace]);
        assert_eq!(plan.end_position(), next);
    }

    #[test]
    fn backward_even_faces_away_from_travel() {
        let next = Coord::from_steps(4, 0);
        let c = ctx(Coord::ZERO, Some(next), 4);
        let plan = plan_with("EVEN -4 NP", &c);
        let state = plan.state_at(1);
        assert!((state.facing - 180.0).abs() < 1e-9);
        assert_eq!(plan.end_position(), next);
    }

    #[test]
    fn undefined_variable_reads_zero() {
        let c = ctx(Coord::ZERO, None, 4);
        let plan = plan_with("MTRM A", &c);
        assert_eq!(kinds(&plan), vec![AnimateErrorKind::Undefined]);
        assert!(plan.state_at(0).facing.abs() < 1e-9);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        let c = ctx(Coord::ZERO, None, 4);
        let plan = plan_with("A = 4 / 0 MTRM A", &c);
        assert_eq!(kinds(&plan), vec![AnimateErrorKind::DivisionByZero]);
    }

    #[test]
    fn magic_jumps_without_beats() {
        let next = Coord::from_steps(6, -2);
        let c = ctx(Coord::ZERO, Some(next), 2);
        let plan = plan_with("MAGIC NP MTRM N", &c);
        assert_eq!(plan.state_at(0).position, next);
        assert!(plan.diagnostics().is_empty());
    }

    #[test]
    fn grid_snaps_with_offset() {
        let c = ctx(Coord::new(37, 40), None, 1);
        let plan = plan_with("GRID 2 MTRM N", &c);
        assert_eq!(plan.state_at(0).position, Coord::new(32, 32));
    }

    #[test]
    fn fountain_splits_into_two_legs() {
        let next = Coord::from_steps(3, 2);
        let c = ctx(Coord::ZERO, Some(next), 5);
        let plan = plan_with("FOUNTAIN N E NP", &c);
        assert!(plan.diagnostics().is_empty(), "{:?}", plan.diagnostics());
        assert_eq!(plan.state_at(3).position, Coord::from_steps(3, 0));
        assert_eq!(plan.end_position(), next);
    }

    #[test]
    fn fountain_with_parallel_mismatch_is_invalid() {
        let c = ctx(Coord::ZERO, Some(Coord::from_steps(3, 2)), 5);
        let plan = plan_with("FOUNTAIN N S NP", &c);
        assert!(kinds(&plan).contains(&AnimateErrorKind::InvalidFountain));
    }

    #[test]
    fn rotate_quarter_turn_about_reference() {
        let mut c = ctx(Coord::from_steps(4, 0), None, 4);
        c.refs = [RefTrack::Fixed(Coord::ZERO); 3];
        let plan = plan_with("ROTATE 90 4 R1", &c);
        assert_eq!(plan.end_position(), Coord::from_steps(0, -4));
        assert!(plan.diagnostics().is_empty());
    }

    #[test]
    fn hsdm_takes_high_step_then_diagonal() {
        let next = Coord::from_steps(5, 2);
        let c = ctx(Coord::ZERO, Some(next), 5);
        let plan = plan_with("HSDM NP", &c);
        assert!(plan.diagnostics().is_empty(), "{:?}", plan.diagnostics());
        assert_eq!(plan.state_at(3).position, Coord::from_steps(3, 0));
        assert_eq!(plan.end_position(), next);
    }

    #[test]
    fn dmhs_takes_diagonal_then_high_step() {
        let next = Coord::from_steps(5, 2);
        let c = ctx(Coord::ZERO, Some(next), 5);
        let plan = plan_with("DMHS NP", &c);
        assert!(plan.diagnostics().is_empty(), "{:?}", plan.diagnostics());
        assert_eq!(plan.state_at(2).position, Coord::from_steps(2, 2));
        assert_eq!(plan.end_position(), next);
    }

    #[test]
    fn countermarch_loops_between_references() {
        // Ref 1 at the marcher, ref 2 two steps east; march N then turn E.
        let mut c = ctx(Coord::from_steps(0, 0), None, 8);
        c.refs = [
            RefTrack::Fixed(Coord::from_steps(0, 0)),
            RefTrack::Fixed(Coord::from_steps(0, 2)),
            RefTrack::Fixed(Coord::ZERO),
        ];
        let plan = plan_with("COUNTERMARCH R1 R2 1 N E 8", &c);
        assert!(plan.diagnostics().is_empty(), "{:?}", plan.diagnostics());
        let path: Vec<Coord> = plan.track();
        assert_eq!(path[1], Coord::from_steps(1, 0));
        assert_eq!(path[3], Coord::from_steps(1, 2));
        assert_eq!(path[4], Coord::from_steps(0, 2));
        assert_eq!(path[8], Coord::from_steps(0, 0));
    }

    #[test]
    fn hold_position_ignores_next_sheet() {
        let c = ctx(Coord::ZERO, Some(Coord::from_steps(4, 4)), 6);
        let plan = plan_with("", &c);
        assert!(plan.diagnostics().is_empty());
        assert_eq!(plan.end_position(), Coord::ZERO);
    }

    #[test]
    fn even_to_next_for_empty_continuity() {
        let mut c = ctx(Coord::ZERO, Some(Coord::from_steps(4, 4)), 4);
        c.empty_continuity = EmptyContinuity::EvenToNext;
        let plan = plan_with("", &c);
        assert!(plan.diagnostics().is_empty());
        assert_eq!(plan.state_at(1).position, Coord::from_steps(1, 1));
    }
}
