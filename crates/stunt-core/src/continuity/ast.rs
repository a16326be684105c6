// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Compiled continuity: procedures, values and points.
//!
//! `Display` renders canonical continuity text (uppercase keywords, one
//! procedure per line, binary expressions parenthesized). Compiling that text
//! yields the same procedures.

use core::fmt;

use serde::{Deserialize, Serialize};
use stunt_geom::direction;

/// 1-based source position.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number in characters, starting at 1.
    pub column: u32,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A node tagged with the position of its first token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    /// The node.
    pub node: T,
    /// Where the node starts in the source.
    pub span: Span,
}

/// A field location named in continuity text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Point {
    /// `P`: the marcher's current position.
    Current,
    /// `SP`: the marcher's position on this sheet.
    Start,
    /// `NP`: the marcher's position on the next animated sheet.
    Next,
    /// `R0`..`R3`: reference point `n` (`R0` is the sheet position).
    Ref(u8),
}

/// Highest reference point number accepted by `R<n>`.
pub const MAX_REF_POINT: u8 = 3;

/// Per-marcher variables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Var {
    /// `A`
    A,
    /// `B`
    B,
    /// `C`
    C,
    /// `D`
    D,
    /// `X`
    X,
    /// `Y`
    Y,
    /// `Z`
    Z,
    /// `DOF`: direction of the last motion.
    Dof,
    /// `DOH`: direction the marcher last faced.
    Doh,
}

impl Var {
    /// Every variable, in storage order.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::X,
        Self::Y,
        Self::Z,
        Self::Dof,
        Self::Doh,
    ];

    /// Storage slot of this variable.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::Dof => "DOF",
            Self::Doh => "DOH",
        }
    }

    pub(crate) fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == word)
    }
}

/// Named numeric constants: compass directions and step sizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    /// North, 0°.
    N,
    /// Northwest, 45°.
    NW,
    /// West, 90°.
    W,
    /// Southwest, 135°.
    SW,
    /// South, 180°.
    S,
    /// Southeast, 225°.
    SE,
    /// East, 270°.
    E,
    /// Northeast, 315°.
    NE,
    /// High step, one step per beat.
    HS,
    /// Mini military, one step per beat.
    MM,
    /// Show high, half step per beat.
    SH,
    /// Jerky step, half step per beat.
    JS,
    /// Grapevine, one step per beat.
    GV,
    /// Military, 4/3 steps per beat.
    M,
    /// Diagonal military, √2 steps per beat.
    DM,
}

impl Constant {
    const ALL: [Self; 15] = [
        Self::N,
        Self::NW,
        Self::W,
        Self::SW,
        Self::S,
        Self::SE,
        Self::E,
        Self::NE,
        Self::HS,
        Self::MM,
        Self::SH,
        Self::JS,
        Self::GV,
        Self::M,
        Self::DM,
    ];

    /// Numeric value.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::N => direction::N,
            Self::NW => direction::NW,
            Self::W => direction::W,
            Self::SW => direction::SW,
            Self::S => direction::S,
            Self::SE => direction::SE,
            Self::E => direction::E,
            Self::NE => direction::NE,
            Self::HS | Self::MM | Self::GV => 1.0,
            Self::SH | Self::JS => 0.5,
            Self::M => 4.0 / 3.0,
            Self::DM => core::f64::consts::SQRT_2,
        }
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NW => "NW",
            Self::W => "W",
            Self::SW => "SW",
            Self::S => "S",
            Self::SE => "SE",
            Self::E => "E",
            Self::NE => "NE",
            Self::HS => "HS",
            Self::MM => "MM",
            Self::SH => "SH",
            Self::JS => "JS",
            Self::GV => "GV",
            Self::M => "M",
            Self::DM => "DM",
        }
    }

    pub(crate) fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == word)
    }
}

/// Binary arithmetic operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// A numeric expression, evaluated per marcher at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Literal number.
    Number(f64),
    /// Named constant.
    Constant(Constant),
    /// `REM`: beats remaining on the sheet.
    Remaining,
    /// Variable read.
    Var(Var),
    /// Unary minus.
    Neg(Box<Value>),
    /// Binary arithmetic.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Value>,
        /// Right operand.
        rhs: Box<Value>,
    },
    /// `DIR(p)`: direction from the current position to `p`.
    Dir(Point),
    /// `DIRFROM(a b)`: direction from `a` to `b`.
    DirFrom(Point, Point),
    /// `DIST(p)`: diagonal-aware distance from the current position to `p`.
    Dist(Point),
    /// `DISTFROM(a b)`: Euclidean distance from `a` to `b`.
    DistFrom(Point, Point),
    /// `EITHER(d1 d2 p)`: whichever of two directions is closer to `DIR(p)`.
    Either(Box<Value>, Box<Value>, Point),
    /// `OPP(d)`: the opposite direction.
    Opp(Box<Value>),
    /// `STEP(beats blocksize p)`: step-drill distance.
    Step(Box<Value>, Box<Value>, Point),
}

impl Value {
    /// Folds the expression to a number when it depends on nothing but
    /// literals and constants.
    #[must_use]
    pub fn constant_value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Constant(c) => Some(c.value()),
            Self::Neg(v) => v.constant_value().map(|v| -v),
            Self::Opp(v) => v.constant_value().map(|v| v + 180.0),
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.constant_value()?;
                let r = rhs.constant_value()?;
                match op {
                    BinaryOp::Add => Some(l + r),
                    BinaryOp::Sub => Some(l - r),
                    BinaryOp::Mul => Some(l * r),
                    BinaryOp::Div => (r.abs() >= direction::EPSILON).then(|| l / r),
                }
            }
            _ => None,
        }
    }
}

/// One executable continuity instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Procedure {
    /// `VAR = value`
    Set {
        /// Target variable.
        var: Var,
        /// Assigned value.
        value: Value,
    },
    /// `BLAM`: move to the next position over the remaining beats.
    Blam,
    /// `CLOSE beats dir`: stand in close position.
    Close {
        /// Beats to hold.
        beats: Value,
        /// Facing direction.
        dir: Value,
    },
    /// `COUNTERMARCH ref1 ref2 steps dir1 dir2 beats`
    Countermarch {
        /// First pivot reference.
        ref1: Point,
        /// Second pivot reference.
        ref2: Point,
        /// Steps of the first leg.
        steps: Value,
        /// Direction of the first leg.
        dir1: Value,
        /// Direction of the second leg.
        dir2: Value,
        /// Total beats to march.
        beats: Value,
    },
    /// `DMCM ref1 ref2 beats`: diagonal countermarch.
    Dmcm {
        /// First reference.
        ref1: Point,
        /// Second reference.
        ref2: Point,
        /// Total beats to march.
        beats: Value,
    },
    /// `DMHS p`: diagonal then high step.
    Dmhs(Point),
    /// `EVEN steps p`: even steps to a point.
    Even {
        /// Number of steps (negative marches backward).
        steps: Value,
        /// Destination.
        point: Point,
    },
    /// `EWNS p`: east/west leg then north/south leg.
    Ewns(Point),
    /// `FOUNTAIN dir1 dir2 [step1 step2] p`
    Fountain {
        /// Direction of the first leg.
        dir1: Value,
        /// Direction of the second leg.
        dir2: Value,
        /// Optional step sizes for the two legs.
        step_sizes: Option<(Value, Value)>,
        /// Destination.
        point: Point,
    },
    /// `FM steps dir`: forward march.
    Fm {
        /// Steps to march (negative marches backward).
        steps: Value,
        /// Direction.
        dir: Value,
    },
    /// `FMTO p`: forward march to a point.
    Fmto(Point),
    /// `GRID spacing`: snap to the grid.
    Grid(Value),
    /// `HSCM ref1 ref2 beats`: high step countermarch.
    Hscm {
        /// First reference.
        ref1: Point,
        /// Second reference.
        ref2: Point,
        /// Total beats to march.
        beats: Value,
    },
    /// `HSDM p`: high step then diagonal.
    Hsdm(Point),
    /// `MAGIC p`: jump to a point without using beats.
    Magic(Point),
    /// `MARCH stepsize steps dir [facing]`
    March {
        /// Step size in steps per beat.
        step_size: Value,
        /// Number of beats.
        steps: Value,
        /// Direction of motion.
        dir: Value,
        /// Optional facing direction.
        facing: Option<Value>,
    },
    /// `MT beats dir`: mark time.
    Mt {
        /// Beats to mark time.
        beats: Value,
        /// Facing direction.
        dir: Value,
    },
    /// `MTRM dir`: mark time for the rest of the sheet.
    Mtrm(Value),
    /// `NSEW p`: north/south leg then east/west leg.
    Nsew(Point),
    /// `ROTATE angle steps pivot`
    Rotate {
        /// Degrees to rotate (positive is counterclockwise on the field).
        angle: Value,
        /// Beats to take (negative marches backward).
        steps: Value,
        /// Center of rotation.
        pivot: Point,
    },
}

impl Procedure {
    /// Keyword that introduces this procedure (`"="` for assignments).
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Set { .. } => "=",
            Self::Blam => "BLAM",
            Self::Close { .. } => "CLOSE",
            Self::Countermarch { .. } => "COUNTERMARCH",
            Self::Dmcm { .. } => "DMCM",
            Self::Dmhs(_) => "DMHS",
            Self::Even { .. } => "EVEN",
            Self::Ewns(_) => "EWNS",
            Self::Fountain { .. } => "FOUNTAIN",
            Self::Fm { .. } => "FM",
            Self::Fmto(_) => "FMTO",
            Self::Grid(_) => "GRID",
            Self::Hscm { .. } => "HSCM",
            Self::Hsdm(_) => "HSDM",
            Self::Magic(_) => "MAGIC",
            Self::March { .. } => "MARCH",
            Self::Mt { .. } => "MT",
            Self::Mtrm(_) => "MTRM",
            Self::Nsew(_) => "NSEW",
            Self::Rotate { .. } => "ROTATE",
        }
    }
}

/// Ordered procedures compiled from one continuity text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureList {
    items: Vec<Spanned<Procedure>>,
}

impl ProcedureList {
    /// An empty list.
    pub const EMPTY: Self = Self { items: Vec::new() };

    pub(crate) fn new(items: Vec<Spanned<Procedure>>) -> Self {
        Self { items }
    }

    /// Number of procedures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing was compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Procedures with their source positions.
    pub fn iter(&self) -> impl Iterator<Item = &Spanned<Procedure>> {
        self.items.iter()
    }

    /// Procedures without positions.
    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.items.iter().map(|s| &s.node)
    }
}

impl<'a> IntoIterator for &'a ProcedureList {
    type Item = &'a Spanned<Procedure>;
    type IntoIter = core::slice::Iter<'a, Spanned<Procedure>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("P"),
            Self::Start => f.write_str("SP"),
            Self::Next => f.write_str("NP"),
            Self::Ref(n) => write!(f, "R{n}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Constant(c) => f.write_str(c.name()),
            Self::Remaining => f.write_str("REM"),
            Self::Var(v) => f.write_str(v.name()),
            Self::Neg(v) => write!(f, "-{v}"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Dir(p) => write!(f, "DIR({p})"),
            Self::DirFrom(a, b) => write!(f, "DIRFROM({a} {b})"),
            Self::Dist(p) => write!(f, "DIST({p})"),
            Self::DistFrom(a, b) => write!(f, "DISTFROM({a} {b})"),
            Self::Either(a, b, p) => write!(f, "EITHER({a} {b} {p})"),
            Self::Opp(v) => write!(f, "OPP({v})"),
            Self::Step(a, b, p) => write!(f, "STEP({a} {b} {p})"),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Self::Set { var, value } => write!(f, "{} = {value}", var.name()),
            Self::Blam => f.write_str(verb),
            Self::Close { beats, dir } | Self::Mt { beats, dir } => {
                write!(f, "{verb} {beats} {dir}")
            }
            Self::Countermarch {
                ref1,
                ref2,
                steps,
                dir1,
                dir2,
                beats,
            } => write!(f, "{verb} {ref1} {ref2} {steps} {dir1} {dir2} {beats}"),
            Self::Dmcm { ref1, ref2, beats } | Self::Hscm { ref1, ref2, beats } => {
                write!(f, "{verb} {ref1} {ref2} {beats}")
            }
            Self::Dmhs(p)
            | Self::Ewns(p)
            | Self::Fmto(p)
            | Self::Hsdm(p)
            | Self::Magic(p)
            | Self::Nsew(p) => write!(f, "{verb} {p}"),
            Self::Even { steps, point } => write!(f, "{verb} {steps} {point}"),
            Self::Fountain {
                dir1,
                dir2,
                step_sizes,
                point,
            } => match step_sizes {
                Some((s1, s2)) => write!(f, "{verb} {dir1} {dir2} {s1} {s2} {point}"),
                None => write!(f, "{verb} {dir1} {dir2} {point}"),
            },
            Self::Fm { steps, dir } => write!(f, "{verb} {steps} {dir}"),
            Self::Grid(v) | Self::Mtrm(v) => write!(f, "{verb} {v}"),
            Self::March {
                step_size,
                steps,
                dir,
                facing,
            } => match facing {
                Some(face) => write!(f, "{verb} {step_size} {steps} {dir} {face}"),
                None => write!(f, "{verb} {step_size} {steps} {dir}"),
            },
            Self::Rotate {
                angle,
                steps,
                pivot,
            } => write!(f, "{verb} {angle} {steps} {pivot}"),
        }
    }
}

impl fmt::Display for ProcedureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", item.node)?;
        }
        Ok(())
    }
}
