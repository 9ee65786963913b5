//! Textual pipe-table fallback
//!
//! Some pipe tables reach the projector as ordinary paragraph text, for
//! example when they follow a text line without a blank line or when the
//! separator row does not match the header width. A paragraph is split
//! into a table when it contains a row of `|`-separated cells immediately
//! followed by a separator row made of `|`, `-`, `:` and spaces that
//! includes `---`. Without both rows the text stays a paragraph.

use mdoffice_model::{Block, Cell};

use crate::inline::parse_runs;

/// A paragraph split around a recognized table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSplit {
    /// Lines before the header row
    pub before: Vec<String>,
    /// The table block, first row is the header
    pub table: Block,
    /// Lines after the last pipe row
    pub after: Vec<String>,
}

/// Find the first pipe table in a run of source lines
pub fn split_pipe_table(lines: &[&str]) -> Option<TableSplit> {
    let start = (0..lines.len().saturating_sub(1))
        .find(|&i| is_pipe_row(lines[i]) && is_separator_row(lines[i + 1]))?;

    let header = split_row(lines[start]);
    let width = header.len();
    if width == 0 {
        return None;
    }

    let mut rows = vec![header
        .iter()
        .map(|text| Cell::header(parse_runs(text)))
        .collect::<Vec<_>>()];

    let mut end = start + 2;
    while end < lines.len() && is_pipe_row(lines[end]) {
        let mut cells: Vec<Cell> = split_row(lines[end])
            .iter()
            .map(|text| Cell::new(parse_runs(text)))
            .collect();
        cells.resize_with(width, Cell::empty);
        rows.push(cells);
        end += 1;
    }

    Some(TableSplit {
        before: lines[..start].iter().map(|l| l.to_string()).collect(),
        table: Block::Table {
            rows,
            header_row_count: 1,
        },
        after: lines[end..].iter().map(|l| l.to_string()).collect(),
    })
}

/// A line that holds at least one unescaped `|`
pub fn is_pipe_row(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && unescaped_pipes(trimmed).next().is_some()
}

/// A separator row such as `|---|:--:|`
pub fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains("---")
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// Split a pipe row into trimmed cell texts
///
/// Leading and trailing pipes are optional; `\|` is a literal pipe.
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cuts: Vec<usize> = unescaped_pipes(trimmed).collect();

    let mut start = 0;
    if cuts.first() == Some(&0) {
        start = 1;
        cuts.remove(0);
    }
    let mut end = trimmed.len();
    if cuts.last().is_some_and(|&p| p + 1 == trimmed.len()) {
        end = trimmed.len() - 1;
        cuts.pop();
    }

    let mut cells = Vec::with_capacity(cuts.len() + 1);
    let mut from = start;
    for cut in cuts {
        cells.push(clean_cell(&trimmed[from..cut]));
        from = cut + 1;
    }
    cells.push(clean_cell(&trimmed[from..end.max(from)]));
    cells
}

fn clean_cell(raw: &str) -> String {
    raw.trim().replace("\\|", "|")
}

fn unescaped_pipes(line: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = line.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(move |(i, &b)| b == b'|' && (*i == 0 || bytes[i - 1] != b'\\'))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_texts(block: &Block) -> Vec<Vec<String>> {
        match block {
            Block::Table { rows, .. } => rows
                .iter()
                .map(|r| r.iter().map(Cell::text).collect())
                .collect(),
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_split_row_variants() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a \\| b | c"), vec!["a | b", "c"]);
        assert_eq!(split_row("| a | |"), vec!["a", ""]);
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator_row("|---|:---:|"));
        assert!(is_separator_row(" --- | --- "));
        assert!(!is_separator_row("| a | b |"));
        assert!(!is_separator_row("|--|"));
    }

    #[test]
    fn test_table_after_text_line() {
        let lines = [
            "Results below:",
            "| Name | Score |",
            "|------|-------|",
            "| Ann | 10 |",
            "| Bob |",
            "Done.",
        ];
        let split = split_pipe_table(&lines).unwrap();
        assert_eq!(split.before, vec!["Results below:"]);
        assert_eq!(split.after, vec!["Done."]);
        assert_eq!(
            cell_texts(&split.table),
            vec![
                vec!["Name", "Score"],
                vec!["Ann", "10"],
                vec!["Bob", ""],
            ]
        );
    }

    #[test]
    fn test_body_rows_truncated_to_header_width() {
        let lines = ["| a | b |", "| --- | --- |", "| 1 | 2 | 3 |"];
        let split = split_pipe_table(&lines).unwrap();
        assert_eq!(cell_texts(&split.table)[1], vec!["1", "2"]);
    }

    #[test]
    fn test_header_without_separator_is_not_a_table() {
        assert!(split_pipe_table(&["| a | b |", "| 1 | 2 |"]).is_none());
        assert!(split_pipe_table(&["| a | b |"]).is_none());
        assert!(split_pipe_table(&["---", "| a |"]).is_none());
    }

    #[test]
    fn test_header_cells_are_marked() {
        let split = split_pipe_table(&["| **H** |", "|---|"]).unwrap();
        match split.table {
            Block::Table {
                rows,
                header_row_count,
            } => {
                assert_eq!(header_row_count, 1);
                assert!(rows[0][0].header);
                assert!(rows[0][0].runs[0].bold);
            }
            _ => unreachable!(),
        }
    }
}
