/// Fixed-width text table for console reports
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_cell_width: Option<usize>,
}

impl TextTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            max_cell_width: None,
        }
    }

    /// Truncate longer cells with "..."
    pub fn max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width.max(4));
        self
    }

    /// Add a row; missing trailing cells render empty
    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn fit(&self, cell: &str) -> String {
        match self.max_cell_width {
            Some(max) if cell.chars().count() > max => {
                let kept: String = cell.chars().take(max - 3).collect();
                format!("{}...", kept)
            }
            _ => cell.to_string(),
        }
    }

    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = std::iter::once(&self.headers)
            .chain(&self.rows)
            .map(|row| {
                (0..self.headers.len())
                    .map(|i| self.fit(row.get(i).map(String::as_str).unwrap_or("")))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| cells.iter().map(|row| row[i].chars().count()).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        if self.is_empty() {
            println!("(no rows)");
        } else {
            print!("{}", self.render());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_right_aligned() {
        let mut table = TextTable::new(&["week", "sales"]);
        table.row(vec!["2024-W01".to_string(), "7".to_string()]);
        table.row(vec!["2024-W02".to_string(), "12".to_string()]);

        assert_eq!(table.render(), "    week  sales\n2024-W01      7\n2024-W02     12\n");
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let mut table = TextTable::new(&["title"]).max_cell_width(8);
        table.row(vec!["A very long title".to_string()]);
        let rendered = table.render();
        assert!(rendered.contains("A ver..."));
    }

    #[test]
    fn test_short_rows_render_empty_cells() {
        let mut table = TextTable::new(&["a", "b"]);
        table.row(vec!["1".to_string()]);
        assert_eq!(table.render().lines().nth(1), Some("1"));
    }
}
