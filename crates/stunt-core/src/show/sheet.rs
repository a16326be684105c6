// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use stunt_geom::Coord;

use super::error::ExecError;
use crate::continuity::{compile_for_sheet, CompileError, ProcedureList, MAX_REF_POINT};

static EMPTY_PROCEDURES: ProcedureList = ProcedureList::EMPTY;

/// Reference slots per marcher (`R1`..`R3`).
pub const REF_SLOTS: usize = 3;

/// Marcher symbol; marchers sharing a symbol share a continuity.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    /// Open circle.
    #[default]
    Plain,
    /// Filled circle.
    Sol,
    /// Backslash.
    Bksl,
    /// Slash.
    Sl,
    /// Cross.
    X,
    /// Filled circle with backslash.
    SolBksl,
    /// Filled circle with slash.
    SolSl,
    /// Filled circle with cross.
    SolX,
}

impl Symbol {
    /// Every symbol in display order.
    pub const ALL: [Self; 8] = [
        Self::Plain,
        Self::Sol,
        Self::Bksl,
        Self::Sl,
        Self::X,
        Self::SolBksl,
        Self::SolSl,
        Self::SolX,
    ];

    /// Lower-case name used in show files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Sol => "sol",
            Self::Bksl => "bksl",
            Self::Sl => "sl",
            Self::X => "x",
            Self::SolBksl => "sol_bksl",
            Self::SolSl => "sol_sl",
            Self::SolX => "sol_x",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a marcher; stable across every sheet of a show.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MarcherId(pub usize);

impl MarcherId {
    /// Position in a sheet's point list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MarcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a reference point (`R1`..`R3`) sits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefPoint {
    /// A fixed field position.
    Fixed(Coord),
    /// Wherever another marcher is on the current beat.
    Marcher(MarcherId),
}

/// One marcher's entry on a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetPoint {
    /// Position at the start of the sheet.
    pub position: Coord,
    /// Symbol selecting the continuity.
    #[serde(default)]
    pub symbol: Symbol,
    /// Reference points `R1`..`R3`; unset slots sit on `position`.
    #[serde(default)]
    pub refs: [Option<RefPoint>; REF_SLOTS],
}

impl SheetPoint {
    /// A point at `position` with no reference points.
    #[must_use]
    pub fn new(position: Coord, symbol: Symbol) -> Self {
        Self {
            position,
            symbol,
            refs: [None; REF_SLOTS],
        }
    }

    /// Marchers this point's references follow.
    pub fn followed(&self) -> impl Iterator<Item = MarcherId> + '_ {
        self.refs.iter().filter_map(|r| match r {
            Some(RefPoint::Marcher(m)) => Some(*m),
            _ => None,
        })
    }
}

/// Continuity text with its lazily compiled procedures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Continuity {
    text: String,
    #[serde(skip)]
    compiled: OnceLock<Result<ProcedureList, CompileError>>,
}

impl Continuity {
    /// Wraps continuity text; nothing is compiled yet.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn procedures(&self, beats: u32) -> Result<&ProcedureList, &CompileError> {
        self.compiled
            .get_or_init(|| compile_for_sheet(&self.text, beats))
            .as_ref()
    }

    fn invalidate(&mut self) {
        self.compiled.take();
    }
}

impl PartialEq for Continuity {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// A snapshot of every marcher plus the continuities moving them on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    beats: u32,
    points: Vec<SheetPoint>,
    #[serde(default)]
    continuities: BTreeMap<Symbol, Continuity>,
}

impl Sheet {
    /// Creates a sheet with no continuities.
    #[must_use]
    pub fn new(name: impl Into<String>, beats: u32, points: Vec<SheetPoint>) -> Self {
        Self {
            name: name.into(),
            beats,
            points,
            continuities: BTreeMap::new(),
        }
    }

    /// Builder form of [`Sheet::replace_continuity`].
    #[must_use]
    pub fn with_continuity(mut self, symbol: Symbol, text: impl Into<String>) -> Self {
        self.replace_continuity(symbol, text);
        self
    }

    /// Sheet name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Beat count; 0 means the sheet is not animated.
    #[must_use]
    pub const fn beats(&self) -> u32 {
        self.beats
    }

    /// Returns `true` when the sheet has at least one beat.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.beats > 0
    }

    /// Changes the beat count. Compiled procedures are discarded since their
    /// beat budget changed.
    pub fn set_beats(&mut self, beats: u32) {
        self.beats = beats;
        for continuity in self.continuities.values_mut() {
            continuity.invalidate();
        }
    }

    /// All points, indexed by [`MarcherId`].
    #[must_use]
    pub fn points(&self) -> &[SheetPoint] {
        &self.points
    }

    /// Number of marchers.
    #[must_use]
    pub fn marcher_count(&self) -> usize {
        self.points.len()
    }

    /// Every marcher id in order.
    pub fn marchers(&self) -> impl Iterator<Item = MarcherId> {
        (0..self.points.len()).map(MarcherId)
    }

    /// One marcher's point.
    #[must_use]
    pub fn point(&self, marcher: MarcherId) -> Option<&SheetPoint> {
        self.points.get(marcher.index())
    }

    /// Marchers carrying `symbol`.
    pub fn marchers_with(&self, symbol: Symbol) -> impl Iterator<Item = MarcherId> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.symbol == symbol)
            .map(|(i, _)| MarcherId(i))
    }

    /// Symbols present on the sheet, ascending.
    #[must_use]
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.points.iter().map(|p| p.symbol).collect()
    }

    /// Continuity text for `symbol`, empty when none was written.
    #[must_use]
    pub fn continuity_text(&self, symbol: Symbol) -> &str {
        self.continuities.get(&symbol).map_or("", Continuity::text)
    }

    /// Replaces the continuity text for `symbol`.
    pub fn replace_continuity(&mut self, symbol: Symbol, text: impl Into<String>) {
        self.continuities.insert(symbol, Continuity::new(text));
    }

    /// Compiled procedures for `symbol`, compiled on first use.
    ///
    /// A symbol without continuity text has no procedures.
    pub fn procedures(&self, symbol: Symbol) -> Result<&ProcedureList, &CompileError> {
        self.continuities
            .get(&symbol)
            .map_or(Ok(&EMPTY_PROCEDURES), |c| c.procedures(self.beats))
    }

    /// Sets reference point `slot` (1..=3) of `marcher`.
    pub fn set_reference(
        &mut self,
        marcher: MarcherId,
        slot: u8,
        reference: Option<RefPoint>,
    ) -> Result<(), ExecError> {
        if slot == 0 || slot > MAX_REF_POINT {
            return Err(ExecError::ReferenceOutOfRange(slot));
        }
        if let Some(RefPoint::Marcher(target)) = reference {
            if target.index() >= self.points.len() {
                return Err(ExecError::UnknownMarcher { marcher, target });
            }
        }
        let point = self
            .points
            .get_mut(marcher.index())
            .ok_or(ExecError::UnknownMarcher {
                marcher,
                target: marcher,
            })?;
        point.refs[usize::from(slot - 1)] = reference;
        Ok(())
    }

    /// Checks that every followed marcher exists.
    pub fn check_references(&self) -> Result<(), ExecError> {
        for (i, point) in self.points.iter().enumerate() {
            if let Some(target) = point.followed().find(|t| t.index() >= self.points.len()) {
                return Err(ExecError::UnknownMarcher {
                    marcher: MarcherId(i),
                    target,
                });
            }
        }
        Ok(())
    }

    /// Order in which marchers must execute so that every followed marcher
    /// runs before its followers.
    pub fn evaluation_order(&self) -> Result<Vec<MarcherId>, ExecError> {
        let order = self.reference_order();
        if order.cyclic.is_empty() {
            Ok(order.order)
        } else {
            Err(ExecError::CyclicReference {
                marchers: order.cyclic,
            })
        }
    }

    /// Dependency order of the marchers not on a reference cycle, plus the
    /// marchers that are.
    pub(crate) fn reference_order(&self) -> ReferenceOrder {
        let mut walk = Walk {
            sheet: self,
            marks: vec![Mark::Unvisited; self.points.len()],
            path: Vec::new(),
            cyclic: BTreeSet::new(),
            order: Vec::with_capacity(self.points.len()),
        };
        for i in 0..self.points.len() {
            if walk.marks[i] == Mark::Unvisited {
                walk.visit(i);
            }
        }
        let cyclic = walk.cyclic;
        ReferenceOrder {
            order: walk
                .order
                .into_iter()
                .filter(|i| !cyclic.contains(i))
                .map(MarcherId)
                .collect(),
            cyclic: cyclic.into_iter().map(MarcherId).collect(),
        }
    }
}

pub(crate) struct ReferenceOrder {
    pub order: Vec<MarcherId>,
    pub cyclic: Vec<MarcherId>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

struct Walk<'s> {
    sheet: &'s Sheet,
    marks: Vec<Mark>,
    path: Vec<usize>,
    cyclic: BTreeSet<usize>,
    order: Vec<usize>,
}

impl Walk<'_> {
    fn visit(&mut self, i: usize) {
        self.marks[i] = Mark::Active;
        self.path.push(i);
        let sheet = self.sheet;
        for dep in sheet.points[i].followed().map(MarcherId::index) {
            match self.marks.get(dep).copied() {
                Some(Mark::Unvisited) => self.visit(dep),
                Some(Mark::Active) => {
                    if let Some(at) = self.path.iter().rposition(|&m| m == dep) {
                        self.cyclic.extend(self.path[at..].iter().copied());
                    }
                }
                Some(Mark::Done) | None => {}
            }
        }
        self.path.pop();
        self.marks[i] = Mark::Done;
        self.order.push(i);
    }
}
