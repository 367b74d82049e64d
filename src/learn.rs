//! Overall blend weights fitted from labelled pillar scores
//!
//! Input is a CSV with the columns `bofu`, `convincing`, `technical` and
//! `target_score`. The fit is ordinary least squares with a bias term,
//! solved in closed form through the normal equations.

use std::mem::take;

use serde::Serialize;

use crate::config::{OverallWeights, ScoringConfig};
use crate::error::{LpError, Result};

/// Columns read from the CSV, features first, target last
const FEATURE_COLUMNS: [&str; 3] = ["bofu", "convincing", "technical"];
const TARGET_COLUMN: &str = "target_score";

/// Bias plus one coefficient per feature
const MIN_ROWS: usize = FEATURE_COLUMNS.len() + 1;

const PIVOT_EPSILON: f64 = 1e-9;

/// Suffix marking a policy version produced by `learn`
pub const LEARNED_SUFFIX: &str = "+learned";

type Matrix = Vec<Vec<f64>>;

/// Result of a weight fit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedWeights {
    /// Non-negative weights summing to 1; structure stays at 0
    pub weights: OverallWeights,
    /// Raw coefficients before clamping, in `FEATURE_COLUMNS` order
    pub raw: [f64; 3],
    pub bias: f64,
    pub rows: usize,
    /// Root mean squared error of the raw fit on the training rows
    pub rmse: f64,
}

impl LearnedWeights {
    /// Install the learned blend into a scoring policy
    pub fn apply_to(&self, config: &mut ScoringConfig) {
        config.overall.bofu = self.weights.bofu;
        config.overall.convincing = self.weights.convincing;
        config.overall.technical = self.weights.technical;
        config.overall.structure = 0.0;

        let base = config
            .version
            .strip_suffix(LEARNED_SUFFIX)
            .unwrap_or(&config.version)
            .to_string();
        config.version = format!("{}{}", base, LEARNED_SUFFIX);
    }
}

/// Minimal CSV parser: quoted fields, doubled-quote escapes, CRLF or LF.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].trim().is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // trailing row without a newline
    row.push(field);
    if !(row.len() == 1 && row[0].trim().is_empty()) {
        rows.push(row);
    }

    rows
}

fn column_index(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| LpError::LearnError(format!("missing column '{}'", name)))
}

fn parse_cell(row: &[String], idx: usize) -> Option<f64> {
    row.get(idx)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Extract feature rows and targets from CSV text
fn read_samples(text: &str) -> Result<(Matrix, Vec<f64>)> {
    let mut rows = parse_rows(text.trim_start_matches('\u{feff}'), ',');
    if rows.is_empty() {
        return Err(LpError::LearnError("CSV is empty".into()));
    }
    let header = rows.remove(0);

    let feature_idx = FEATURE_COLUMNS
        .iter()
        .map(|name| column_index(&header, name))
        .collect::<Result<Vec<_>>>()?;
    let target_idx = column_index(&header, TARGET_COLUMN)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (line, row) in rows.iter().enumerate() {
        let Some(target) = parse_cell(row, target_idx) else {
            log::debug!("row {}: no numeric {}, skipped", line + 2, TARGET_COLUMN);
            continue;
        };
        let features: Option<Vec<f64>> = feature_idx.iter().map(|&i| parse_cell(row, i)).collect();
        match features {
            Some(features) => {
                x.push(features);
                y.push(target);
            }
            None => log::debug!("row {}: non-numeric pillar score, skipped", line + 2),
        }
    }

    Ok((x, y))
}

/// Fit blend weights from CSV text
pub fn learn_from_csv(text: &str) -> Result<LearnedWeights> {
    let (x, y) = read_samples(text)?;
    if x.len() < MIN_ROWS {
        return Err(LpError::LearnError(format!(
            "need at least {} usable rows, found {}",
            MIN_ROWS,
            x.len()
        )));
    }

    // bias column first
    let xb: Matrix = x
        .iter()
        .map(|row| std::iter::once(1.0).chain(row.iter().copied()).collect())
        .collect();

    let xt = transpose(&xb);
    let xtx = mat_mul(&xt, &xb);
    let xtx_inv = invert(&xtx)?;
    let xty = mat_vec_mul(&xt, &y);
    let coef = mat_vec_mul(&xtx_inv, &xty);

    let bias = coef[0];
    let raw = [coef[1], coef[2], coef[3]];

    let sse: f64 = xb
        .iter()
        .zip(&y)
        .map(|(row, target)| {
            let predicted: f64 = row.iter().zip(&coef).map(|(a, b)| a * b).sum();
            (predicted - target).powi(2)
        })
        .sum();
    let rmse = (sse / x.len() as f64).sqrt();

    let clamped = raw.map(|w| w.max(0.0));
    let total: f64 = clamped.iter().sum();
    if total <= PIVOT_EPSILON {
        return Err(LpError::LearnError(
            "every learned weight is zero or negative".into(),
        ));
    }

    let weights = OverallWeights {
        bofu: clamped[0] / total,
        convincing: clamped[1] / total,
        technical: clamped[2] / total,
        structure: 0.0,
    };

    log::info!(
        "learned weights from {} rows: bofu {:.3}, convincing {:.3}, technical {:.3} (rmse {:.2})",
        x.len(),
        weights.bofu,
        weights.convincing,
        weights.technical,
        rmse
    );

    Ok(LearnedWeights {
        weights,
        raw,
        bias,
        rows: x.len(),
        rmse,
    })
}

fn transpose(a: &Matrix) -> Matrix {
    if a.is_empty() {
        return Vec::new();
    }
    (0..a[0].len())
        .map(|j| a.iter().map(|row| row[j]).collect())
        .collect()
}

fn mat_mul(a: &Matrix, b: &Matrix) -> Matrix {
    let cols = b.first().map_or(0, |r| r.len());
    a.iter()
        .map(|row| {
            (0..cols)
                .map(|j| row.iter().zip(b).map(|(x, brow)| x * brow[j]).sum())
                .collect()
        })
        .collect()
}

fn mat_vec_mul(a: &Matrix, v: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|row| row.iter().zip(v).map(|(x, y)| x * y).sum())
        .collect()
}

/// Gauss-Jordan inverse with partial pivoting
fn invert(m: &Matrix) -> Result<Matrix> {
    let n = m.len();
    // augment with the identity
    let mut a: Matrix = m
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for i in 0..n {
        let pivot_row = (i..n)
            .max_by(|&p, &q| a[p][i].abs().total_cmp(&a[q][i].abs()))
            .unwrap_or(i);
        if a[pivot_row][i].abs() < PIVOT_EPSILON {
            return Err(LpError::LearnError("matrix not invertible".into()));
        }
        a.swap(i, pivot_row);

        let pivot = a[i][i];
        for value in a[i].iter_mut() {
            *value /= pivot;
        }

        let pivot_values = a[i].clone();
        for (r, row) in a.iter_mut().enumerate() {
            if r == i {
                continue;
            }
            let factor = row[i];
            if factor == 0.0 {
                continue;
            }
            for (value, p) in row.iter_mut().zip(&pivot_values) {
                *value -= factor * p;
            }
        }
    }

    Ok(a.into_iter().map(|row| row[n..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_parse_rows_quotes_and_crlf() {
        let rows = parse_rows("a,\"b,c\",\"say \"\"hi\"\"\"\r\n1,2,3\r\n\r\n", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b,c", "say \"hi\""]);
        assert_eq!(rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_invert_identity_and_known() {
        let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let inv = invert(&m).unwrap();
        assert!(approx(inv[0][0], 0.6));
        assert!(approx(inv[0][1], -0.7));
        assert!(approx(inv[1][0], -0.2));
        assert!(approx(inv[1][1], 0.4));
    }

    #[test]
    fn test_recovers_known_weights() {
        let samples = [
            (80.0, 60.0, 90.0),
            (20.0, 40.0, 70.0),
            (55.0, 90.0, 40.0),
            (100.0, 10.0, 60.0),
            (35.0, 75.0, 100.0),
            (65.0, 25.0, 30.0),
        ];
        let mut csv = String::from("technical,bofu,convincing,target_score,notes\n");
        for (b, c, t) in samples {
            let target = 0.5 * b + 0.35 * c + 0.15 * t;
            csv.push_str(&format!("{},{},{},{},\"free, text\"\n", t, b, c, target));
        }

        let learned = learn_from_csv(&csv).unwrap();
        assert_eq!(learned.rows, 6);
        assert!(approx(learned.weights.bofu, 0.5));
        assert!(approx(learned.weights.convincing, 0.35));
        assert!(approx(learned.weights.technical, 0.15));
        assert!(learned.bias.abs() < 1e-6);
        assert!(learned.rmse < 1e-6);
    }

    #[test]
    fn test_negative_weight_clamps_to_zero() {
        // target ignores technical and penalises it slightly
        let samples = [
            (80.0, 60.0, 90.0),
            (20.0, 40.0, 70.0),
            (55.0, 90.0, 40.0),
            (100.0, 10.0, 60.0),
            (35.0, 75.0, 100.0),
        ];
        let mut csv = String::from("bofu,convincing,technical,target_score\n");
        for (b, c, t) in samples {
            let target = 0.6 * b + 0.6 * c - 0.2 * t;
            csv.push_str(&format!("{},{},{},{}\n", b, c, t, target));
        }

        let learned = learn_from_csv(&csv).unwrap();
        assert!(learned.raw[2] < 0.0);
        assert_eq!(learned.weights.technical, 0.0);
        assert!(approx(learned.weights.bofu, 0.5));
        assert!(approx(learned.weights.convincing, 0.5));
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let csv = "bofu,convincing,technical,target_score\n\
                   10,20,0,15\n30,10,0,20\n50,60,0,55\n70,20,0,40\n";
        let err = learn_from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("not invertible"));
    }

    #[test]
    fn test_missing_column() {
        let err = learn_from_csv("bofu,convincing,target_score\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("technical"));
    }

    #[test]
    fn test_too_few_rows_after_skipping() {
        let csv = "bofu,convincing,technical,target_score\n\
                   10,20,30,15\n30,10,20,n/a\n50,60,70,\nx,1,2,3\n70,20,40,40\n";
        let err = learn_from_csv(csv).unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_apply_to_marks_version_once() {
        let learned = LearnedWeights {
            weights: OverallWeights {
                bofu: 0.6,
                convincing: 0.3,
                technical: 0.1,
                structure: 0.0,
            },
            raw: [0.6, 0.3, 0.1],
            bias: 0.0,
            rows: 10,
            rmse: 1.0,
        };
        let mut config = ScoringConfig::default();
        learned.apply_to(&mut config);
        learned.apply_to(&mut config);
        assert_eq!(config.version, "lpc-2026.1+learned");
        assert_eq!(config.overall.bofu, 0.6);
        assert!(config.validate().is_ok());
    }
}
