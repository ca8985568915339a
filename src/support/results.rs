//! Formatting estimation results for people.
//!
//! Estimated coefficients are laid out as a five-column table (variable,
//! coefficient, standard error, t-score, significance) and rendered to one of
//! three targets:
//!
//! - the terminal, via [`ResultTable::to_console`],
//! - a CSV file under the run `output` directory, via [`ResultsWriter::to_csv`],
//! - a LaTeX table under the run `debug` directory, via [`ResultsWriter::to_latex`].
//!
//! # Example
//!
//! ```
//! use urbansim_utils::support::results::{Coefficient, ResultTable, TableStyle};
//!
//! let names = ["ln_income", "year_built"];
//! let coefficients = [
//!     Coefficient::new(0.82, 0.05, 16.4),
//!     Coefficient::new(-0.01, 0.008, -1.5),
//! ];
//!
//! let table = ResultTable::new(&names, &coefficients, TableStyle::Plain);
//! assert_eq!(table.rows()[0], ["ln income", "0.82", "0.05", "16.40", "***"]);
//! assert_eq!(table.rows()[1][4], ".");
//! ```

mod console;
mod latex;
mod table;
mod writer;

use serde::{Deserialize, Serialize};

pub use table::{ResultTable, TableStyle};
pub use writer::{ResultsError, ResultsWriter};

/// One estimated coefficient with its standard error and t-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub estimate: f64,
    pub std_err: f64,
    pub t_score: f64,
}

impl Coefficient {
    #[must_use]
    pub fn new(estimate: f64, std_err: f64, t_score: f64) -> Self {
        Self {
            estimate,
            std_err,
            t_score,
        }
    }
}

/// Goodness-of-fit statistics reported beneath a results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fit {
    /// A hedonic (least squares) regression.
    Regression { r_squared: f64, adj_r_squared: f64 },

    /// A discrete choice model.
    Choice {
        null_loglik: f64,
        converged_loglik: f64,
        loglik_ratio: f64,
    },
}

impl Fit {
    /// Returns the LaTeX label and value of each statistic, in display order.
    #[must_use]
    pub fn statistics(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Fit::Regression {
                r_squared,
                adj_r_squared,
            } => vec![("R$^2$", r_squared), ("Adj-R$^2$", adj_r_squared)],
            Fit::Choice {
                null_loglik,
                converged_loglik,
                loglik_ratio,
            } => vec![
                ("Null loglik", null_loglik),
                ("Converged loglik", converged_loglik),
                ("Loglik ratio", loglik_ratio),
            ],
        }
    }
}

/// Converts a t-score to the significance codes R prints.
///
/// | `|t|` greater than | Code  |
/// |--------------------|-------|
/// | 3.1                | `***` |
/// | 2.33               | `**`  |
/// | 1.64               | `*`   |
/// | 1.28               | `.`   |
///
/// Anything else, including `NaN`, is not significant and yields `""`.
#[must_use]
pub fn significance(t_score: f64) -> &'static str {
    let t = t_score.abs();
    if t > 3.1 {
        "***"
    } else if t > 2.33 {
        "**"
    } else if t > 1.64 {
        "*"
    } else if t > 1.28 {
        "."
    } else {
        ""
    }
}

/// Formats `value` with two decimals, spelling non-finite values `nan`,
/// `inf`, and `-inf`.
fn two_decimals(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_owned()
    } else {
        format!("{value:.2}")
    }
}
