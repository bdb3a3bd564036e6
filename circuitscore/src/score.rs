//! Separation score: how cleanly the continuous outputs split into the
//! on and off bands the truth table asks for.
//!
//! For each output, `on_min` is its weakest response among rows that should
//! be on and `off_max` its strongest among rows that should be off. The
//! output contributes
//!
//! ```text
//! 1 - ((r_max - on_min) + (off_max - r_min)) / (2 (r_max - r_min))
//! ```
//!
//! and the circuit score is the mean over outputs. A perfect output (on rows
//! at `r_max`, off rows at `r_min`) contributes 1.

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, Result};
use crate::eval::{ResponseTable, TruthTable};
use crate::library::ResponseBounds;

/// How one output separates its on and off rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSeparation {
    pub output: String,
    pub on_min: f64,
    pub off_max: f64,
    pub separation: f64,
}

/// Score and the per-output terms it averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub bounds: ResponseBounds,
    pub outputs: Vec<OutputSeparation>,
}

/// Reduce per-row responses against the ideal truth table.
///
/// Both tables must have the same rows and output columns.
pub fn score(
    responses: &ResponseTable,
    truth: &TruthTable,
    bounds: ResponseBounds,
) -> Result<ScoreBreakdown> {
    let span = bounds.span();
    if !(span.is_finite() && span > 0.0) {
        return Err(CircuitError::UndefinedBounds {
            min: bounds.min,
            max: bounds.max,
        });
    }
    if responses.columns != truth.columns || responses.rows.len() != truth.rows.len() {
        return Err(CircuitError::MalformedMapping(format!(
            "responses cover {} row(s) of {:?}, truth table {} row(s) of {:?}",
            responses.rows.len(),
            responses.columns,
            truth.rows.len(),
            truth.columns
        )));
    }
    if truth.columns.is_empty() {
        return Err(CircuitError::MalformedMapping("no outputs to score".into()));
    }
    let width = truth.columns.len();
    let ragged = truth.rows.iter().map(Vec::len).chain(responses.rows.iter().map(Vec::len));
    if let Some((row, len)) = ragged.enumerate().find(|(_, len)| *len != width) {
        return Err(CircuitError::MalformedMapping(format!(
            "row {} holds {len} value(s) for {width} output(s)",
            row % truth.rows.len().max(1) + 1
        )));
    }

    let outputs: Vec<OutputSeparation> = truth
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let mut on_min = bounds.max;
            let mut off_max = bounds.min;
            for (ideal, level) in truth.column(col).zip(responses.column(col)) {
                if ideal {
                    on_min = on_min.min(level);
                } else {
                    off_max = off_max.max(level);
                }
            }
            let separation =
                1.0 - ((bounds.max - on_min) + (off_max - bounds.min)) / (2.0 * span);
            OutputSeparation {
                output: name.clone(),
                on_min,
                off_max,
                separation,
            }
        })
        .collect();

    let score = outputs.iter().map(|o| o.separation).sum::<f64>() / outputs.len() as f64;
    Ok(ScoreBreakdown {
        score,
        bounds,
        outputs,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::SignalTable;

    const BOUNDS: ResponseBounds = ResponseBounds { min: 0.1, max: 5.0 };

    fn table<V>(rows: Vec<Vec<V>>) -> SignalTable<V> {
        SignalTable {
            columns: vec!["y".into()],
            rows,
        }
    }

    #[test]
    fn perfect_separation_scores_one() {
        let truth = table(vec![vec![false], vec![true], vec![true], vec![true]]);
        let levels = table(vec![vec![0.1], vec![5.0], vec![5.0], vec![10.0]]);
        let result = score(&levels, &truth, BOUNDS).unwrap();
        assert!((result.score - 1.0).abs() < 1e-12);
        assert_eq!(result.outputs[0].on_min, 5.0);
        assert_eq!(result.outputs[0].off_max, 0.1);
    }

    #[test]
    fn overlapping_bands_lose_score() {
        let truth = table(vec![vec![false], vec![true]]);
        let levels = table(vec![vec![1.08], vec![4.02]]);
        let result = score(&levels, &truth, BOUNDS).unwrap();
        // (0.98 + 0.98) / 9.8 = 0.2
        assert!((result.score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn missing_band_contributes_no_penalty() {
        let truth = table(vec![vec![true], vec![true]]);
        let levels = table(vec![vec![5.0], vec![7.0]]);
        let result = score(&levels, &truth, BOUNDS).unwrap();
        assert_eq!(result.outputs[0].off_max, BOUNDS.min);
        assert!((result.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_averages_outputs() {
        let truth = SignalTable {
            columns: vec!["y1".into(), "y2".into()],
            rows: vec![vec![false, false], vec![true, true]],
        };
        let levels = SignalTable {
            columns: vec!["y1".into(), "y2".into()],
            rows: vec![vec![0.1, 5.0], vec![5.0, 0.1]],
        };
        let result = score(&levels, &truth, BOUNDS).unwrap();
        assert!((result.outputs[0].separation - 1.0).abs() < 1e-12);
        assert!((result.outputs[1].separation - 0.0).abs() < 1e-12);
        assert!((result.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn flat_bounds_are_undefined() {
        let truth = table(vec![vec![true]]);
        let levels = table(vec![vec![1.0]]);
        let flat = ResponseBounds { min: 1.0, max: 1.0 };
        assert_eq!(
            score(&levels, &truth, flat),
            Err(CircuitError::UndefinedBounds { min: 1.0, max: 1.0 })
        );
    }

    #[test]
    fn mismatched_tables_are_rejected() {
        let truth = table(vec![vec![true], vec![false]]);
        let levels = table(vec![vec![1.0]]);
        assert!(score(&levels, &truth, BOUNDS).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let truth = table(vec![vec![true], vec![false]]);
        let levels = table(vec![vec![1.0], vec![]]);
        assert_eq!(
            score(&levels, &truth, BOUNDS),
            Err(CircuitError::MalformedMapping(
                "row 2 holds 0 value(s) for 1 output(s)".into()
            ))
        );

        let truth = table(vec![vec![true, false]]);
        let levels = table(vec![vec![1.0]]);
        assert!(matches!(
            score(&levels, &truth, BOUNDS),
            Err(CircuitError::MalformedMapping(_))
        ));
    }
}
