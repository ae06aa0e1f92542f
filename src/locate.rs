//! Locating the parameters cell
//!
//! The parameters cell is the first code cell tagged with the requested tag,
//! falling back to the first code cell of the notebook. Both the extraction
//! and the rewrite path resolve the cell through [`parameters_cell_index`], so
//! they always agree on which cell holds the parameters.

use crate::notebook::{Cell, Notebook};

/// Index of the first code cell whose `metadata.tags` contains `tag` exactly
pub fn find_first_tagged_cell(nb: &Notebook, tag: &str) -> Option<usize> {
    nb.cells
        .iter()
        .position(|cell| cell.is_code() && cell.has_tag(tag))
}

pub fn first_code_cell(nb: &Notebook) -> Option<usize> {
    nb.cells.iter().position(Cell::is_code)
}

/// Tagged cell if any, else the first code cell
pub fn parameters_cell_index(nb: &Notebook, tag: &str) -> Option<usize> {
    find_first_tagged_cell(nb, tag).or_else(|| first_code_cell(nb))
}

pub fn get_parameter_cell<'a>(nb: &'a Notebook, tag: &str) -> Option<&'a Cell> {
    parameters_cell_index(nb, tag).map(|idx| &nb.cells[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook() -> Notebook {
        Notebook::new(vec![
            Cell::markdown("# Intro").with_tags(["Parameters"]),
            Cell::code("import os"),
            Cell::code("x = 1").with_tags(["other"]),
            Cell::code("n = 50").with_tags(["setup", "Parameters"]),
            Cell::code("y = 2").with_tags(["Parameters"]),
        ])
    }

    #[test]
    fn test_tagged_cell_takes_precedence() {
        let nb = notebook();
        assert_eq!(find_first_tagged_cell(&nb, "Parameters"), Some(3));
        assert_eq!(parameters_cell_index(&nb, "Parameters"), Some(3));
        assert_eq!(get_parameter_cell(&nb, "Parameters").unwrap().source, "n = 50");
    }

    #[test]
    fn test_non_code_cells_are_never_tag_matches() {
        let nb = Notebook::new(vec![
            Cell::markdown("text").with_tags(["Parameters"]),
            Cell::code("a = 1"),
        ]);
        assert_eq!(find_first_tagged_cell(&nb, "Parameters"), None);
        assert_eq!(parameters_cell_index(&nb, "Parameters"), Some(1));
    }

    #[test]
    fn test_falls_back_to_first_code_cell() {
        let nb = notebook();
        assert_eq!(find_first_tagged_cell(&nb, "missing"), None);
        assert_eq!(parameters_cell_index(&nb, "missing"), Some(1));
    }

    #[test]
    fn test_tag_match_is_exact() {
        let nb = notebook();
        assert_eq!(find_first_tagged_cell(&nb, "parameters"), None);
        assert_eq!(find_first_tagged_cell(&nb, "Param"), None);
        assert_eq!(find_first_tagged_cell(&nb, "other"), Some(2));
    }

    #[test]
    fn test_no_code_cells() {
        let nb = Notebook::new(vec![Cell::markdown("only text")]);
        assert_eq!(parameters_cell_index(&nb, "Parameters"), None);
        assert!(get_parameter_cell(&nb, "Parameters").is_none());

        let empty = Notebook::new(Vec::new());
        assert_eq!(first_code_cell(&empty), None);
    }
}
