//! Bordered ASCII rendering of a [`ResultTable`].

use super::table::{COLUMNS, ResultTable};

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

/// Body alignment: numbers flush right, significance codes flush left.
const BODY_ALIGN: [Align; COLUMNS] = [
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Left,
];

impl ResultTable {
    /// Renders the table for a terminal.
    ///
    /// ```text
    /// +-----------+-------------+--------+---------+--------------+
    /// | Variables | Coefficient | Stderr | T-score | Significance |
    /// +===========+=============+========+=========+==============+
    /// | ln income |        0.82 |   0.05 |   16.40 | ***          |
    /// +-----------+-------------+--------+---------+--------------+
    /// ```
    ///
    /// Header cells are centered. There is no trailing newline.
    #[must_use]
    pub fn to_console(&self) -> String {
        let mut widths = [0; COLUMNS];
        for row in self.all_rows() {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_rule(&mut out, &widths, '-');
        push_row(&mut out, self.header(), &widths, [Align::Center; COLUMNS]);
        push_rule(&mut out, &widths, '=');
        for row in self.rows() {
            push_row(&mut out, row, &widths, BODY_ALIGN);
            push_rule(&mut out, &widths, '-');
        }

        out.truncate(out.trim_end_matches('\n').len());
        out
    }
}

fn push_rule(out: &mut String, widths: &[usize; COLUMNS], fill: char) {
    out.push('+');
    for &width in widths {
        out.extend(std::iter::repeat_n(fill, width + 2));
        out.push('+');
    }
    out.push('\n');
}

fn push_row(
    out: &mut String,
    row: &[String; COLUMNS],
    widths: &[usize; COLUMNS],
    aligns: [Align; COLUMNS],
) {
    out.push('|');
    for ((cell, &width), align) in row.iter().zip(widths).zip(aligns) {
        let pad = width - cell.chars().count();
        let (left, right) = match align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };
        out.push(' ');
        out.extend(std::iter::repeat_n(' ', left));
        out.push_str(cell);
        out.extend(std::iter::repeat_n(' ', right));
        out.push_str(" |");
    }
    out.push('\n');
}
