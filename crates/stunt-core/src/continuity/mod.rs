// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Continuity compiler.
//!
//! [`compile`] is a pure function from text to a [`ProcedureList`]; it holds
//! no state and is safe to call concurrently. [`compile_for_sheet`] also
//! checks the constant beat costs against the sheet's beat count.
//!
//! Grammar summary (keywords are case-insensitive, newlines are whitespace):
//!
//! ```text
//! procedure := VAR = value | BLAM | CLOSE value value
//!            | COUNTERMARCH point point value value value value
//!            | DMCM point point value | DMHS point | EVEN value point
//!            | EWNS point | FOUNTAIN value value [value value] point
//!            | FM value value | FMTO point | GRID value
//!            | HSCM point point value | HSDM point | MAGIC point
//!            | MARCH value value value [value] | MT value value
//!            | MTRM value | NSEW point | ROTATE value value point
//! point     := P | SP | NP | R0..R3
//! value     := number | constant | REM | DOF | DOH | A..D | X..Z
//!            | value (+ - * /) value | -value | (value) | function
//! ```

mod ast;
mod budget;
mod error;
mod lexer;
mod parser;

pub use ast::{
    BinaryOp, Constant, Point, Procedure, ProcedureList, Span, Spanned, Value, Var,
    MAX_REF_POINT,
};
pub use error::CompileError;

/// Compiles continuity text into procedures.
///
/// Empty or all-whitespace text compiles to an empty list.
pub fn compile(text: &str) -> Result<ProcedureList, CompileError> {
    parser::parse(text)
}

/// Compiles continuity text for a sheet of `beats` beats.
///
/// In addition to [`compile`], procedures whose beat costs fold to constants
/// are summed; exceeding `beats`, or needing beats after a procedure that
/// consumes the remainder (`BLAM`, `MTRM`, `REM` counts), is a
/// [`CompileError`] pointing at the overflowing procedure.
pub fn compile_for_sheet(text: &str, beats: u32) -> Result<ProcedureList, CompileError> {
    let list = compile(text)?;
    budget::check(&list, beats)?;
    Ok(list)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "mt E REM",
        "BLAM",
        "Countermarch R1 R2 1 N E 16",
        "DMCM SP NP 6 / 3",
        "DMHS NP",
        "EVEN 10 + 3 NP",
        "EWNS NP",
        "FM 10 - 3 N",
        "FMTO R3",
        "FOUNTAIN DIR(NP) DIRFROM(SP NP) DIST(NP) 3 NP",
        "FOUNTAIN DIR(NP) DIRFROM(SP NP) NP",
        "GRID DISTFROM(R1 R2)",
        "HSCM NP R1 EITHER(N S R1)",
        "HSDM NP",
        "MAGIC NP",
        "MARCH GV STEP(2 2 R1) OPP(S)",
        "MARCH GV STEP(2 2 R1) OPP(S) S",
        "MT 1 1",
        "MTRM 10.5",
        "NSEW SP",
        "ROTATE 90 SH R2",
        "ROTATE -90 SH R2",
        "A = 10 * 9",
        "close 1 0",
        "ewns np",
    ];

    #[test]
    fn every_sample_compiles_to_one_procedure() {
        for text in SAMPLES {
            let list = compile(text).unwrap_or_else(|e| panic!("{text}: {e}"));
            assert_eq!(list.len(), 1, "{text}");
        }
    }

    #[test]
    fn whitespace_compiles_to_nothing() {
        assert!(compile("  ").unwrap().is_empty());
        assert!(compile("").unwrap().is_empty());
        assert!(compile("\n\t\n").unwrap().is_empty());
    }

    #[test]
    fn canonical_text_recompiles_to_same_procedures() {
        for text in SAMPLES {
            let first = compile(text).unwrap();
            let second = compile(&first.to_string()).unwrap();
            assert!(
                first.procedures().eq(second.procedures()),
                "{text} -> {first}"
            );
        }
    }

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let list = compile("A = 1 + 2 * 3").unwrap();
        let Some(Procedure::Set { value, .. }) = list.procedures().next() else {
            panic!("expected assignment");
        };
        assert_eq!(value.constant_value(), Some(7.0));
        let list = compile("A = 10 - 4 - 3").unwrap();
        let Some(Procedure::Set { value, .. }) = list.procedures().next() else {
            panic!("expected assignment");
        };
        assert_eq!(value.constant_value(), Some(3.0));
    }

    #[test]
    fn unknown_verb_is_the_offending_text() {
        let err = compile("MT 4 E\n  JUMP NP").unwrap_err();
        assert_eq!(err.offending_text, "JUMP");
        assert_eq!((err.line, err.column), (2, 3));
    }

    #[test]
    fn malformed_operand_reports_the_verb() {
        let err = compile("fm 1.2.3 N").unwrap_err();
        assert_eq!(err.offending_text, "fm");
        assert_eq!((err.line, err.column), (1, 4));
        assert!(err.message.contains("malformed number"));
    }

    #[test]
    fn missing_operand_points_past_the_end() {
        let err = compile("MT 4").unwrap_err();
        assert_eq!(err.offending_text, "MT");
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn reference_points_are_bounded() {
        assert!(compile("FMTO R3").is_ok());
        let err = compile("FMTO R4").unwrap_err();
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn budget_rejects_overflow() {
        assert!(compile_for_sheet("MT 8 E MT 8 W", 16).is_ok());
        let err = compile_for_sheet("MT 8 E\nFM 9 N", 16).unwrap_err();
        assert_eq!(err.offending_text, "FM");
        assert_eq!(err.line, 2);
        let err = compile_for_sheet("MTRM E MT 2 E", 16).unwrap_err();
        assert_eq!(err.offending_text, "MT");
    }

    #[test]
    fn budget_ignores_position_dependent_costs() {
        assert!(compile_for_sheet("EWNS NP MT 16 E", 16).is_ok());
        assert!(compile_for_sheet("MT A E MT 16 E", 16).is_ok());
        assert!(compile_for_sheet("MAGIC NP EVEN REM NP", 4).is_ok());
    }
}
