use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::support::dirs::{DirError, RunDirs};

use super::{Coefficient, Fit, ResultTable, TableStyle, latex};

/// Errors that can occur while writing results tables.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// The run directory could not be created.
    #[error(transparent)]
    Dir(#[from] DirError),

    /// A table file could not be written.
    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The CSV writer failed.
    #[error("failed to write CSV {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Writes results tables into the run directory layout.
///
/// Variable names can be replaced with publication-friendly labels through
/// [`rename`](Self::rename). LaTeX tables are numbered in the order this writer
/// produces them, starting at 1.
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    dirs: RunDirs,
    var_names: HashMap<String, String>,
    tables_written: usize,
}

impl ResultsWriter {
    #[must_use]
    pub fn new(dirs: RunDirs) -> Self {
        Self {
            dirs,
            var_names: HashMap::new(),
            tables_written: 0,
        }
    }

    /// Displays `variable` as `label` in every CSV table written afterwards,
    /// and in the LaTeX table [`to_csv`](Self::to_csv) writes alongside it.
    #[must_use]
    pub fn rename(mut self, variable: impl Into<String>, label: impl Into<String>) -> Self {
        self.var_names.insert(variable.into(), label.into());
        self
    }

    /// Returns the number of LaTeX tables written so far.
    #[must_use]
    pub fn tables_written(&self) -> usize {
        self.tables_written
    }

    /// Writes a LaTeX table to `<debug>/<filename>.tex` and returns its path.
    ///
    /// `names` are printed as given; the rename map is not consulted.
    ///
    /// # Errors
    ///
    /// Returns a [`ResultsError`] if the debug directory or the file cannot be written.
    pub fn to_latex<S: AsRef<str>>(
        &mut self,
        fit: &Fit,
        names: &[S],
        coefficients: &[Coefficient],
        filename: &str,
        caption: Option<&str>,
    ) -> Result<PathBuf, ResultsError> {
        let table = ResultTable::new(names, coefficients, TableStyle::Latex);

        self.tables_written += 1;
        let tex = latex::render(&table, fit, caption.unwrap_or_default(), self.tables_written);

        let path = self.dirs.debug_dir()?.join(format!("{filename}.tex"));
        fs::write(&path, tex).map_err(|source| ResultsError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), number = self.tables_written, "wrote LaTeX table");
        Ok(path)
    }

    /// Writes a CSV table to `<output>/<filename>` and returns its path.
    ///
    /// When `with_latex` is set, the same results are also written with
    /// [`to_latex`](Self::to_latex).
    ///
    /// # Errors
    ///
    /// Returns a [`ResultsError`] if any directory or file cannot be written.
    pub fn to_csv<S: AsRef<str>>(
        &mut self,
        fit: &Fit,
        names: &[S],
        coefficients: &[Coefficient],
        filename: &str,
        with_latex: bool,
        caption: Option<&str>,
    ) -> Result<PathBuf, ResultsError> {
        let names = self.display_names(names);
        if with_latex {
            self.to_latex(fit, &names, coefficients, filename, caption)?;
        }

        let table = ResultTable::new(&names, coefficients, TableStyle::Plain);

        let path = self.dirs.output_dir()?.join(filename);
        write_csv(&path, &table).map_err(|source| ResultsError::Csv {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "wrote CSV table");
        Ok(path)
    }

    fn display_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.var_names
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_owned())
            })
            .collect()
    }
}

fn write_csv(path: &Path, table: &ResultTable) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;
    for row in table.all_rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn choice_fit() -> Fit {
        Fit::Choice {
            null_loglik: -1000.0,
            converged_loglik: -750.0,
            loglik_ratio: 0.25,
        }
    }

    #[test]
    fn csv_lands_in_output_dir() {
        let tmp = tempdir().unwrap();
        let mut writer = ResultsWriter::new(RunDirs::new(tmp.path()));

        let path = writer
            .to_csv(
                &choice_fit(),
                &["ln_rent", "dist_to_cbd"],
                &[
                    Coefficient::new(0.7, 0.1, 7.0),
                    Coefficient::new(-0.2, 0.1, -2.0),
                ],
                "hlcm.csv",
                false,
                None,
            )
            .unwrap();

        assert_eq!(path, tmp.path().join("output").join("hlcm.csv"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Variables,Coefficient,Stderr,T-score,Significance\n\
             ln rent,0.70,0.10,7.00,***\n\
             dist to cbd,-0.20,0.10,-2.00,*\n"
        );
        assert_eq!(writer.tables_written(), 0);
        assert!(!tmp.path().join("debug").exists());
    }

    #[test]
    fn csv_with_latex_numbers_tables() {
        let tmp = tempdir().unwrap();
        let mut writer = ResultsWriter::new(RunDirs::new(tmp.path()));
        let names = ["population"];
        let coefficients = [Coefficient::new(1.0, 0.5, 2.0)];

        for filename in ["first", "second"] {
            writer
                .to_csv(
                    &choice_fit(),
                    &names,
                    &coefficients,
                    filename,
                    true,
                    Some("Location choice"),
                )
                .unwrap();
        }

        assert_eq!(writer.tables_written(), 2);
        let second = fs::read_to_string(tmp.path().join("debug").join("second.tex")).unwrap();
        assert!(second.contains("\\label{table2}"));
        assert!(second.contains("\\caption { Location choice }"));
        assert!(second.contains("Loglik ratio 0.25 &&&&"));
        assert!(tmp.path().join("output").join("second").exists());
    }

    #[test]
    fn renamed_variables_appear_in_both_formats() {
        let tmp = tempdir().unwrap();
        let mut writer =
            ResultsWriter::new(RunDirs::new(tmp.path())).rename("ln_sqft", "Log_square_feet");

        writer
            .to_csv(
                &Fit::Regression {
                    r_squared: 0.5,
                    adj_r_squared: 0.49,
                },
                &["ln_sqft"],
                &[Coefficient::new(0.3, 0.01, 30.0)],
                "hedonic.csv",
                true,
                None,
            )
            .unwrap();

        let csv = fs::read_to_string(tmp.path().join("output").join("hedonic.csv")).unwrap();
        assert!(csv.contains("Log square feet,0.30,0.01,30.00,***"));

        let tex = fs::read_to_string(tmp.path().join("debug").join("hedonic.csv.tex")).unwrap();
        assert!(tex.contains("Log square feet&0.30"));
        assert!(tex.contains("\\caption {  }"));
    }

    #[test]
    fn direct_latex_tables_keep_variable_names() {
        let tmp = tempdir().unwrap();
        let mut writer =
            ResultsWriter::new(RunDirs::new(tmp.path())).rename("ln_sqft", "Log_square_feet");

        let path = writer
            .to_latex(
                &choice_fit(),
                &["ln_sqft"],
                &[Coefficient::new(0.3, 0.01, 30.0)],
                "direct",
                None,
            )
            .unwrap();

        let tex = fs::read_to_string(path).unwrap();
        assert!(tex.contains("ln sqft&0.30"));
        assert!(!tex.contains("Log square feet"));
    }
}
