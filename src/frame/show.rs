use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use super::Frame;

const MIN_COLUMN_WIDTH: u16 = 3;

fn truncate_string(s: &str, truncate: usize) -> String {
    if truncate == 0 || s.chars().count() <= truncate {
        return s.to_string();
    }
    if truncate < 4 {
        s.chars().take(truncate).collect()
    } else {
        let head = s.chars().take(truncate - 3).collect::<String>();
        format!("{head}...")
    }
}

fn footer(num_rows: usize, has_more: bool) -> String {
    match (has_more, num_rows) {
        (true, 1) => "only showing top 1 row\n".to_string(),
        (true, n) => format!("only showing top {} rows\n", n),
        _ => "".to_string(),
    }
}

impl Frame {
    /// Renders the first `num_rows` rows as an ASCII table.
    ///
    /// Cells longer than `truncate` characters are shortened and right aligned;
    /// `truncate = 0` keeps full cells, left aligned.
    pub fn show_string(&self, num_rows: usize, truncate: usize) -> String {
        let shown = num_rows.min(self.num_rows());

        let mut table = Table::new();
        table.load_preset("||--+-++|    ++++++");
        table.set_header(
            self.schema()
                .names()
                .map(|name| Cell::new(truncate_string(name, truncate)))
                .collect::<Vec<_>>(),
        );

        let alignment = match truncate {
            0 => CellAlignment::Left,
            _ => CellAlignment::Right,
        };
        table.column_iter_mut().for_each(|c| {
            c.set_padding((0, 0))
                .set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(
                    MIN_COLUMN_WIDTH,
                )))
                .set_cell_alignment(alignment);
        });

        for row in 0..shown {
            table.add_row(
                self.columns()
                    .iter()
                    .map(|column| truncate_string(&column.value_string(row), truncate))
                    .collect::<Vec<_>>(),
            );
        }

        format!("{}\n{}", table, footer(shown, self.num_rows() > shown))
    }
}
