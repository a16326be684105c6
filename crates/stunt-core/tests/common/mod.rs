// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use stunt_core::{MarcherId, RefPoint, Sheet, SheetPoint, Show, Symbol};
use stunt_geom::Coord;

/// A point `(x, y)` steps from the origin.
pub fn at(x: i32, y: i32) -> SheetPoint {
    SheetPoint::new(Coord::from_steps(x, y), Symbol::Plain)
}

/// A point with an explicit symbol.
pub fn at_with(x: i32, y: i32, symbol: Symbol) -> SheetPoint {
    SheetPoint::new(Coord::from_steps(x, y), symbol)
}

/// A marcher following `leader` through reference slot 1.
pub fn follower(x: i32, y: i32, symbol: Symbol, leader: usize) -> SheetPoint {
    let mut point = at_with(x, y, symbol);
    point.refs[0] = Some(RefPoint::Marcher(MarcherId(leader)));
    point
}

/// A block of `rows` x `cols` marchers, two steps apart, all `Plain`.
pub fn block(rows: i32, cols: i32, origin: (i32, i32)) -> Vec<SheetPoint> {
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| at(origin.0 + r * 2, origin.1 + c * 2)))
        .collect()
}

/// Two-sheet show: a block marching `steps` north, then holding.
pub fn march_north_show(steps: i32, beats: u32) -> Show {
    let start = block(2, 3, (0, 0));
    let end = block(2, 3, (steps, 0));
    Show::new(vec![
        Sheet::new("1", beats, start).with_continuity(Symbol::Plain, "EVEN REM NP"),
        Sheet::new("2", 4, end),
    ])
    .expect("fixture show is valid")
}

/// A show mixing symbols, references and an unanimated sheet; it animates
/// without errors or collisions.
pub fn mixed_show() -> Show {
    let first = vec![
        at(0, 0),
        at_with(0, 4, Symbol::Sol),
        follower(4, 4, Symbol::X, 0),
        at_with(8, 0, Symbol::SolX),
    ];
    let second = vec![at(9, 9), at(9, 11), at(9, 13), at(9, 15)];
    let third = vec![at(4, 0), at(0, 8), at(4, 8), at(12, 4)];
    Show::new(vec![
        Sheet::new("1", 8, first)
            .with_continuity(Symbol::Plain, "MT 4 E\nEWNS NP")
            .with_continuity(Symbol::Sol, "FMTO NP MTRM E")
            .with_continuity(Symbol::X, "A = DIR(R1)\nMT 4 A\nNSEW NP")
            .with_continuity(Symbol::SolX, "HSDM NP MTRM E"),
        Sheet::new("pause", 0, second),
        Sheet::new("3", 4, third),
    ])
    .expect("fixture show is valid")
}
