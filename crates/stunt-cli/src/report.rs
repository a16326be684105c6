// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Human-readable timeline reports.

use std::io::{self, Write};

use comfy_table::Table;
use stunt_core::{Info, Show, Timeline};
use stunt_geom::{Beat, CollisionKind};

/// Sheet table, animation problems and the beats that have collisions.
pub fn summary(out: &mut impl Write, show: &Show, timeline: &Timeline) -> io::Result<()> {
    writeln!(
        out,
        "{} sheet(s), {} marcher(s), {} beat(s)",
        show.sheets().len(),
        show.marcher_count(),
        timeline.total_beats()
    )?;

    let mut sheets = Table::new();
    sheets.set_header(vec!["sheet", "name", "beats", "first beat"]);
    for (index, sheet) in show.sheets().iter().enumerate() {
        let first = timeline
            .sheet_start(index)
            .map_or_else(|| "-".to_owned(), |beat| beat.index().to_string());
        sheets.add_row(vec![
            index.to_string(),
            sheet.name().to_owned(),
            sheet.beats().to_string(),
            first,
        ]);
    }
    writeln!(out, "{sheets}")?;

    let errors = timeline.errors();
    if errors.is_empty() {
        writeln!(out, "errors: none")?;
    } else {
        writeln!(out, "errors: {}", errors.len())?;
        for error in errors {
            writeln!(out, "  {error}")?;
        }
    }

    let collisions: Vec<String> = timeline
        .beats_with_collisions()
        .map(|beat| beat.index().to_string())
        .collect();
    if collisions.is_empty() {
        writeln!(out, "collisions: none")
    } else {
        writeln!(out, "collisions at beats: {}", collisions.join(", "))
    }
}

/// Every marcher on one beat, positions in steps.
pub fn frame(out: &mut impl Write, timeline: &Timeline, beat: Beat, frame: &[Info]) -> io::Result<()> {
    let location = timeline
        .sheet_at(beat)
        .map_or_else(String::new, |(sheet, offset)| format!(" (sheet {sheet}, beat {offset})"));
    writeln!(out, "beat {}{location}", beat.index())?;

    let collisions = timeline.collisions_at(beat);
    let mut table = Table::new();
    table.set_header(vec!["marcher", "x", "y", "facing", "style", "collision"]);
    for info in frame {
        let (x, y) = info.position.to_steps();
        let collision = match collisions.map(|c| c.worst_for(info.marcher)) {
            Some(CollisionKind::Intersect) => "intersect",
            Some(CollisionKind::Warning) => "warning",
            Some(CollisionKind::None) | None => "",
        };
        table.add_row(vec![
            info.marcher.to_string(),
            format!("{x:.2}"),
            format!("{y:.2}"),
            format!("{:.1}", info.facing),
            format!("{:?}", info.style),
            collision.to_owned(),
        ]);
    }
    writeln!(out, "{table}")
}
