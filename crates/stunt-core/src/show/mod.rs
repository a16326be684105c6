// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Shows: ordered sheets of marcher positions and their continuities.

mod error;
mod sheet;

pub use error::ExecError;
pub use sheet::{Continuity, MarcherId, RefPoint, Sheet, SheetPoint, Symbol, REF_SLOTS};

use serde::{Deserialize, Serialize};

/// An ordered sequence of sheets that all place the same marchers.
///
/// Construction validates the point counts and marcher references, so every
/// sheet of a `Show` can be animated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShow", into = "RawShow")]
pub struct Show {
    sheets: Vec<Sheet>,
}

#[derive(Serialize, Deserialize)]
struct RawShow {
    sheets: Vec<Sheet>,
}

impl TryFrom<RawShow> for Show {
    type Error = ExecError;

    fn try_from(raw: RawShow) -> Result<Self, ExecError> {
        Self::new(raw.sheets)
    }
}

impl From<Show> for RawShow {
    fn from(show: Show) -> Self {
        Self { sheets: show.sheets }
    }
}

impl Show {
    /// Builds a show, checking that every sheet has the same number of
    /// points and that references name existing marchers.
    pub fn new(sheets: Vec<Sheet>) -> Result<Self, ExecError> {
        if let Some(first) = sheets.first() {
            let expected = first.marcher_count();
            for (index, sheet) in sheets.iter().enumerate() {
                if sheet.marcher_count() != expected {
                    return Err(ExecError::PointCountMismatch {
                        sheet: index,
                        expected,
                        found: sheet.marcher_count(),
                    });
                }
                sheet.check_references()?;
            }
        }
        Ok(Self { sheets })
    }

    /// Sheets in show order.
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// One sheet.
    #[must_use]
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Number of marchers on every sheet.
    #[must_use]
    pub fn marcher_count(&self) -> usize {
        self.sheets.first().map_or(0, Sheet::marcher_count)
    }

    /// Total animated beats.
    #[must_use]
    pub fn total_beats(&self) -> usize {
        self.sheets
            .iter()
            .map(|s| usize::try_from(s.beats()).unwrap_or(usize::MAX))
            .fold(0, usize::saturating_add)
    }

    /// Index of the first animated sheet after `index`.
    #[must_use]
    pub fn next_animated(&self, index: usize) -> Option<usize> {
        self.sheets
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, s)| s.is_animated())
            .map(|(i, _)| i)
    }

    /// Replaces one sheet's continuity for `symbol`.
    pub fn replace_continuity(
        &mut self,
        sheet: usize,
        symbol: Symbol,
        text: impl Into<String>,
    ) -> Result<(), ExecError> {
        self.sheets
            .get_mut(sheet)
            .ok_or(ExecError::UnknownSheet(sheet))?
            .replace_continuity(symbol, text);
        Ok(())
    }

    /// Changes one sheet's beat count.
    pub fn set_beats(&mut self, sheet: usize, beats: u32) -> Result<(), ExecError> {
        self.sheets
            .get_mut(sheet)
            .ok_or(ExecError::UnknownSheet(sheet))?
            .set_beats(beats);
        Ok(())
    }

    /// Sets a reference point on one sheet; see [`Sheet::set_reference`].
    pub fn set_reference(
        &mut self,
        sheet: usize,
        marcher: MarcherId,
        slot: u8,
        reference: Option<RefPoint>,
    ) -> Result<(), ExecError> {
        self.sheets
            .get_mut(sheet)
            .ok_or(ExecError::UnknownSheet(sheet))?
            .set_reference(marcher, slot, reference)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use stunt_geom::Coord;

    use super::*;

    fn sheet(points: usize, beats: u32) -> Sheet {
        let points = (0..points)
            .map(|i| {
                let x = i32::try_from(i).unwrap() * 4;
                SheetPoint::new(Coord::from_steps(x, 0), Symbol::Plain)
            })
            .collect();
        Sheet::new("s", beats, points)
    }

    #[test]
    fn mismatched_point_counts_are_rejected() {
        let err = Show::new(vec![sheet(2, 4), sheet(3, 4)]).unwrap_err();
        assert_eq!(
            err,
            ExecError::PointCountMismatch {
                sheet: 1,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn next_animated_skips_empty_sheets() {
        let show = Show::new(vec![sheet(1, 4), sheet(1, 0), sheet(1, 2)]).unwrap();
        assert_eq!(show.next_animated(0), Some(2));
        assert_eq!(show.next_animated(2), None);
        assert_eq!(show.total_beats(), 6);
    }

    #[test]
    fn json_is_validated_on_load() {
        let json = r#"{"sheets":[
            {"name":"1","beats":4,"points":[{"position":{"x":0,"y":0}}]},
            {"name":"2","beats":4,"points":[]}
        ]}"#;
        assert!(serde_json::from_str::<Show>(json).is_err());
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let mut show = Show::new(vec![sheet(1, 4)]).unwrap();
        assert_eq!(show.set_beats(3, 2), Err(ExecError::UnknownSheet(3)));
    }
}
