//! LaTeX table rendering.

use super::{Fit, ResultTable, two_decimals};

/// Renders a complete `table` environment.
///
/// The table is labelled `table<number>` and uses a `siunitx` `S` column for
/// the t-scores, so documents including it need `\usepackage{siunitx}`.
pub(super) fn render(table: &ResultTable, fit: &Fit, caption: &str, number: usize) -> String {
    let mut rows = String::new();
    for (i, row) in table.all_rows().enumerate() {
        rows.push_str(&row.join("&"));
        rows.push_str("\\\\\n");
        if i == 0 {
            rows.push_str("\\hline\n");
        }
    }

    let mut meta = String::new();
    for (label, value) in fit.statistics() {
        meta.push_str(&format!("{label} {} &&&&\\\\\n", two_decimals(value)));
    }

    format!(
        r"
\begin{{table}}\label{{table{number}}}
\caption {{ {caption} }}
\begin{{center}}
    \begin{{tabular}}{{lcc S[table-format=3.2] c}}
                {rows}
                \hline
                {meta}

    \end{{tabular}}
\end{{center}}
\end{{table}}
"
    )
}

#[cfg(test)]
mod tests {
    use crate::support::results::{Coefficient, TableStyle};

    use super::*;

    #[test]
    fn renders_rows_and_fit() {
        let table = ResultTable::new(
            &["ln_price"],
            &[Coefficient::new(0.5, 0.1, 5.0)],
            TableStyle::Latex,
        );
        let fit = Fit::Regression {
            r_squared: 0.456,
            adj_r_squared: 0.45,
        };

        let tex = render(&table, &fit, "Hedonic model", 3);

        assert!(tex.starts_with("\n\\begin{table}\\label{table3}\n"));
        assert!(tex.contains("\\caption { Hedonic model }\n"));
        assert!(tex.contains(
            "Variables&$\\beta$&$\\sigma$&\\multicolumn{1}{c}{T-score}&Significance\\\\\n\\hline\n"
        ));
        assert!(tex.contains("ln price&0.50&0.10&5.00&***\\\\\n"));
        assert!(tex.contains("R$^2$ 0.46 &&&&\\\\\nAdj-R$^2$ 0.45 &&&&\\\\\n"));
        assert!(tex.ends_with("\\end{table}\n"));
    }

    #[test]
    fn undefined_fit_statistics_print_nan() {
        let table = ResultTable::new(&["x"], &[Coefficient::new(1.0, 0.5, 2.0)], TableStyle::Latex);
        let fit = Fit::Choice {
            null_loglik: -120.5,
            converged_loglik: f64::NEG_INFINITY,
            loglik_ratio: f64::NAN,
        };

        let tex = render(&table, &fit, "", 1);

        assert!(tex.contains("Null loglik -120.50 &&&&\\\\\n"));
        assert!(tex.contains("Converged loglik -inf &&&&\\\\\n"));
        assert!(tex.contains("Loglik ratio nan &&&&\\\\\n"));
    }
}
