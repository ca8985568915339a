use super::{Coefficient, significance, two_decimals};

/// Number of columns in every results table.
pub(super) const COLUMNS: usize = 5;

/// Header row used for plain text and CSV tables.
const PLAIN_HEADER: [&str; COLUMNS] =
    ["Variables", "Coefficient", "Stderr", "T-score", "Significance"];

/// Header row used for LaTeX tables.
const LATEX_HEADER: [&str; COLUMNS] = [
    "Variables",
    "$\\beta$",
    "$\\sigma$",
    "\\multicolumn{1}{c}{T-score}",
    "Significance",
];

/// Selects the header row of a [`ResultTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    /// Column names suited to terminals and CSV.
    #[default]
    Plain,
    /// Column names typeset for LaTeX.
    Latex,
}

/// A formatted table of estimation results.
///
/// Every cell is already a string: variable names have underscores replaced
/// with spaces, numbers are rounded to two decimals, and the last column holds
/// the [`significance`] code of the t-score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    header: [String; COLUMNS],
    rows: Vec<[String; COLUMNS]>,
}

impl ResultTable {
    /// Builds a table from variable names and their coefficients.
    ///
    /// Names and coefficients are paired in order; extras in the longer input
    /// are ignored.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        coefficients: &[Coefficient],
        style: TableStyle,
    ) -> Self {
        let header = match style {
            TableStyle::Plain => PLAIN_HEADER,
            TableStyle::Latex => LATEX_HEADER,
        }
        .map(String::from);

        let rows = names
            .iter()
            .zip(coefficients)
            .map(|(name, c)| {
                [
                    name.as_ref().replace('_', " "),
                    two_decimals(c.estimate),
                    two_decimals(c.std_err),
                    two_decimals(c.t_score),
                    significance(c.t_score).to_owned(),
                ]
            })
            .collect();

        Self { header, rows }
    }

    /// Returns the header row.
    #[must_use]
    pub fn header(&self) -> &[String; COLUMNS] {
        &self.header
    }

    /// Returns the body rows, one per variable.
    #[must_use]
    pub fn rows(&self) -> &[[String; COLUMNS]] {
        &self.rows
    }

    /// Iterates over the header followed by the body rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &[String; COLUMNS]> {
        std::iter::once(&self.header).chain(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<&'static str>, Vec<Coefficient>) {
        (
            vec!["sqft_per_unit", "is_sf"],
            vec![
                Coefficient::new(1.234_56, 0.1, 12.5),
                Coefficient::new(-0.5, 0.2, -0.02),
            ],
        )
    }

    #[test]
    fn plain_table_cells() {
        let (names, coefficients) = sample();
        let table = ResultTable::new(&names, &coefficients, TableStyle::Plain);

        assert_eq!(table.header()[1], "Coefficient");
        assert_eq!(
            table.rows(),
            [
                ["sqft per unit", "1.23", "0.10", "12.50", "***"].map(String::from),
                ["is sf", "-0.50", "0.20", "-0.02", ""].map(String::from),
            ]
        );
    }

    #[test]
    fn missing_statistics_print_lowercase() {
        let table = ResultTable::new(
            &["tenure"],
            &[Coefficient::new(f64::NAN, f64::INFINITY, f64::NAN)],
            TableStyle::Plain,
        );
        assert_eq!(
            table.rows()[0],
            ["tenure", "nan", "inf", "nan", ""].map(String::from)
        );
    }

    #[test]
    fn latex_header() {
        let (names, coefficients) = sample();
        let table = ResultTable::new(&names, &coefficients, TableStyle::Latex);

        assert_eq!(table.header()[1], "$\\beta$");
        assert_eq!(table.header()[3], "\\multicolumn{1}{c}{T-score}");
        assert_eq!(table.all_rows().count(), 3);
    }

    #[test]
    fn pairs_stop_at_shorter_input() {
        let names = ["a", "b", "c"];
        let coefficients = [Coefficient::new(1.0, 1.0, 1.0)];
        let table = ResultTable::new(&names, &coefficients, TableStyle::Plain);
        assert_eq!(table.rows().len(), 1);
    }
}
