use crate::domain::FALLBACK_FIELDS;

fn is_field_name(cell: &str) -> bool {
    !cell.is_empty()
        && cell
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Extract candidate field names from the FIELDS.md document.
///
/// A candidate is the first cell of a pipe-delimited markdown table row,
/// i.e. a line shaped like `| identifier | ... |`. Table separators and
/// header rows fall out because their first cell is not an identifier.
/// Duplicates are dropped, first occurrence wins.
pub fn parse_fields(markdown: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for line in markdown.lines() {
        let Some(rest) = line.strip_prefix('|') else {
            continue;
        };
        let Some((cell, _)) = rest.split_once('|') else {
            continue;
        };
        let cell = cell.trim();
        if is_field_name(cell) && !fields.iter().any(|f| f == cell) {
            fields.push(cell.to_string());
        }
    }
    fields
}

pub fn fallback_fields() -> Vec<String> {
    FALLBACK_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Drop every candidate that is already shown as a column.
pub fn without_shown(fields: Vec<String>, shown: &[String]) -> Vec<String> {
    fields
        .into_iter()
        .filter(|f| !shown.iter().any(|s| s == f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_cell_of_table_rows() {
        let md = "| population |\n| area |";
        assert_eq!(parse_fields(md), ["population", "area"]);
    }

    #[test]
    fn skips_headers_separators_and_prose() {
        let md = "\
# Fields

Some prose about | pipes.

| Field Name | Description |
|---|---|
| population | Number of people |
| idd.root | Calling code root |
| area | Surface |
| population | duplicate row |
";
        assert_eq!(parse_fields(md), ["population", "idd.root", "area"]);
    }

    #[test]
    fn requires_a_closing_pipe() {
        assert_eq!(parse_fields("| population"), Vec::<String>::new());
    }

    #[test]
    fn shown_fields_are_filtered_out() {
        let parsed = vec!["population".to_string(), "area".to_string()];
        let shown = vec!["population".to_string()];
        assert_eq!(without_shown(parsed, &shown), ["area"]);
    }

    #[test]
    fn fallback_list_has_the_fixed_ten_fields() {
        let fallback = fallback_fields();
        assert_eq!(fallback.len(), 10);
        assert!(fallback.contains(&"startOfWeek".to_string()));
    }
}
