use std::cmp::Ordering;

use serde_json::Value;

use crate::domain::{FilterKind, PAGE_SIZE};

/// A country record as returned by the API. Kept opaque on purpose,
/// any field the user adds later must render without a schema.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A projected cell. Images (the flag URL) render specially and are
/// unorderable, they compare equal against everything.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Image(String),
}

impl Cell {
    pub fn display(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Image(url) => url,
        }
    }

    fn sort_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Image(_) => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_array(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Project a record field into its display cell.
///
/// The base columns have bespoke renderings (nested objects, joined
/// lists); any other field falls through to a generic stringification
/// so user-added columns always show something sensible.
pub fn cell_value(record: &Record, key: &str) -> Cell {
    match key {
        "name" => Cell::Text(
            record
                .get("name")
                .and_then(|n| n.get("common"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "capital" | "continents" | "timezones" => {
            Cell::Text(record.get(key).map(join_array).unwrap_or_default())
        }
        "currencies" => {
            let rendered = record
                .get("currencies")
                .and_then(Value::as_object)
                .map(|currs| {
                    currs
                        .iter()
                        .map(|(code, obj)| {
                            match obj.get("symbol").and_then(Value::as_str) {
                                Some(symbol) => format!("{code} ({symbol})"),
                                None => code.clone(),
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            Cell::Text(rendered)
        }
        "flag" => {
            let url = record
                .get("flags")
                .and_then(|f| f.get("png").or_else(|| f.get("svg")))
                .and_then(Value::as_str);
            match url {
                Some(url) => Cell::Image(url.to_string()),
                None => Cell::Text(String::new()),
            }
        }
        "languages" => {
            let rendered = record
                .get("languages")
                .and_then(Value::as_object)
                .map(|langs| {
                    langs
                        .values()
                        .map(scalar_to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            Cell::Text(rendered)
        }
        _ => match record.get(key) {
            None | Some(Value::Null) => Cell::Text(String::new()),
            Some(Value::Array(_)) => Cell::Text(join_array(&record[key])),
            Some(obj @ Value::Object(_)) => Cell::Text(obj.to_string()),
            Some(scalar) => Cell::Text(scalar_to_string(scalar)),
        },
    }
}

pub fn display_name(record: &Record) -> String {
    match cell_value(record, "name") {
        Cell::Text(s) => s,
        Cell::Image(_) => String::new(),
    }
}

/// Comma-joined currency codes, the second filter matches against this.
pub fn currency_codes(record: &Record) -> String {
    record
        .get("currencies")
        .and_then(Value::as_object)
        .map(|currs| currs.keys().cloned().collect::<Vec<_>>().join(","))
        .unwrap_or_default()
}

/// Parse a leading number, `"12,500 km²"` reads as 12. Matches how the
/// upstream data sorts: a cell counts as numeric by its prefix, not by
/// the whole string.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if frac_digits > 0 {
            end += 1 + frac_digits;
        } else if int_digits > 0 {
            end += 1;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse().ok()
}

/// Numeric when both sides start with a number, case-insensitive string
/// comparison otherwise. Image cells compare equal to anything.
fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    let (Some(a), Some(b)) = (a.sort_text(), b.sort_text()) else {
        return Ordering::Equal;
    };
    if let (Some(x), Some(y)) = (leading_number(a), leading_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Filter, sort and pagination state of the table. Operates on row
/// indices so the fetched records are never reordered in place.
#[derive(Debug, Default)]
pub struct TableState {
    pub filter_name: String,
    pub filter_currency: String,
    pub sort: Option<(String, Direction)>,
    current_page: usize,
}

impl TableState {
    pub fn set_filter(&mut self, kind: FilterKind, term: String) {
        match kind {
            FilterKind::Name => self.filter_name = term,
            FilterKind::Currency => self.filter_currency = term,
        }
        self.current_page = 0;
    }

    /// Sorting the active column again flips the direction; switching
    /// to another column starts over ascending.
    pub fn cycle_sort(&mut self, key: &str) {
        self.sort = match self.sort.take() {
            Some((prev, Direction::Ascending)) if prev == key => {
                Some((prev, Direction::Descending))
            }
            Some((prev, Direction::Descending)) if prev == key => {
                Some((prev, Direction::Ascending))
            }
            _ => Some((key.to_string(), Direction::Ascending)),
        };
        self.current_page = 0;
    }

    /// Row indices that survive both filters, in sorted order.
    pub fn visible_rows(&self, records: &[Record]) -> Vec<usize> {
        let name_term = self.filter_name.to_lowercase();
        let currency_term = self.filter_currency.to_lowercase();

        let mut rows: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                (name_term.is_empty()
                    || display_name(r).to_lowercase().contains(&name_term))
                    && (currency_term.is_empty()
                        || currency_codes(r).to_lowercase().contains(&currency_term))
            })
            .map(|(idx, _)| idx)
            .collect();

        if let Some((key, direction)) = &self.sort {
            let cells: Vec<Cell> = records.iter().map(|r| cell_value(r, key)).collect();
            rows.sort_by(|&a, &b| {
                let ord = compare_cells(&cells[a], &cells[b]);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        rows
    }

    pub fn page_count(nrows: usize) -> usize {
        std::cmp::max(1, nrows.div_ceil(PAGE_SIZE))
    }

    /// Current page, clamped into range for the given row count.
    pub fn page(&self, nrows: usize) -> usize {
        std::cmp::min(self.current_page, Self::page_count(nrows) - 1)
    }

    pub fn next_page(&mut self, nrows: usize) {
        self.current_page = std::cmp::min(self.page(nrows) + 1, Self::page_count(nrows) - 1);
    }

    pub fn prev_page(&mut self, nrows: usize) {
        self.current_page = self.page(nrows).saturating_sub(1);
    }

    /// The slice of `rows` belonging to the current page.
    pub fn page_slice<'a>(&self, rows: &'a [usize]) -> &'a [usize] {
        let begin = self.page(rows.len()) * PAGE_SIZE;
        let end = std::cmp::min(begin + PAGE_SIZE, rows.len());
        &rows[begin..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterKind;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn country(name: &str, currency: &str, population: u64) -> Record {
        record(json!({
            "name": { "common": name },
            "currencies": { currency: { "symbol": "$" } },
            "population": population,
            "flags": { "png": format!("https://flags.example/{name}.png") },
        }))
    }

    fn names(records: &[Record], rows: &[usize]) -> Vec<String> {
        rows.iter().map(|&i| display_name(&records[i])).collect()
    }

    #[test]
    fn cell_projection_for_base_columns() {
        let rec = record(json!({
            "name": { "common": "Austria" },
            "capital": ["Vienna"],
            "currencies": { "EUR": { "symbol": "€" } },
            "languages": { "deu": "German" },
            "timezones": ["UTC+01:00"],
            "flags": { "png": "https://flags.example/at.png" },
        }));
        assert_eq!(cell_value(&rec, "name"), Cell::Text("Austria".into()));
        assert_eq!(cell_value(&rec, "capital"), Cell::Text("Vienna".into()));
        assert_eq!(cell_value(&rec, "currencies"), Cell::Text("EUR (€)".into()));
        assert_eq!(cell_value(&rec, "languages"), Cell::Text("German".into()));
        assert_eq!(
            cell_value(&rec, "flag"),
            Cell::Image("https://flags.example/at.png".into())
        );
        // Missing fields render empty
        assert_eq!(cell_value(&rec, "borders"), Cell::Text(String::new()));
    }

    #[test]
    fn generic_projection_for_extra_columns() {
        let rec = record(json!({
            "name": { "common": "X" },
            "tld": [".x", ".y"],
            "population": 1234,
            "maps": { "google": "https://maps.example" },
        }));
        assert_eq!(cell_value(&rec, "tld"), Cell::Text(".x, .y".into()));
        assert_eq!(cell_value(&rec, "population"), Cell::Text("1234".into()));
        assert_eq!(
            cell_value(&rec, "maps"),
            Cell::Text("{\"google\":\"https://maps.example\"}".into())
        );
    }

    #[test]
    fn sort_cycle_toggles_and_resets() {
        let mut state = TableState::default();
        state.cycle_sort("name");
        assert_eq!(state.sort, Some(("name".into(), Direction::Ascending)));
        state.cycle_sort("name");
        assert_eq!(state.sort, Some(("name".into(), Direction::Descending)));
        state.cycle_sort("name");
        assert_eq!(state.sort, Some(("name".into(), Direction::Ascending)));
        // Switching columns resets to ascending
        state.cycle_sort("name");
        state.cycle_sort("capital");
        assert_eq!(state.sort, Some(("capital".into(), Direction::Ascending)));
    }

    #[test]
    fn sorts_numeric_when_both_sides_parse() {
        let records = vec![
            country("B", "EUR", 90),
            country("A", "EUR", 1000),
            country("C", "EUR", 5),
        ];
        let mut state = TableState::default();
        state.cycle_sort("population");
        assert_eq!(names(&records, &state.visible_rows(&records)), ["C", "B", "A"]);
        state.cycle_sort("population");
        assert_eq!(names(&records, &state.visible_rows(&records)), ["A", "B", "C"]);
    }

    #[test]
    fn sorts_by_leading_numeric_prefix() {
        let mut records = vec![
            country("B", "EUR", 0),
            country("A", "EUR", 0),
            country("C", "EUR", 0),
        ];
        records[0].insert("area".into(), json!("12 km²"));
        records[1].insert("area".into(), json!("101.5 km²"));
        records[2].insert("area".into(), json!("9 km²"));
        let mut state = TableState::default();
        state.cycle_sort("area");
        // "9" before "12" before "101.5", not lexicographic
        assert_eq!(names(&records, &state.visible_rows(&records)), ["C", "B", "A"]);
    }

    #[test]
    fn leading_number_reads_a_prefix_only() {
        assert_eq!(leading_number("12 km"), Some(12.0));
        assert_eq!(leading_number("-3.5e2 m"), Some(-350.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("UTC+01:00"), None);
        assert_eq!(leading_number("+"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn sorts_strings_case_insensitively() {
        let records = vec![
            country("zimbabwe", "ZWL", 1),
            country("Austria", "EUR", 1),
            country("malta", "EUR", 1),
        ];
        let mut state = TableState::default();
        state.cycle_sort("name");
        assert_eq!(
            names(&records, &state.visible_rows(&records)),
            ["Austria", "malta", "zimbabwe"]
        );
    }

    #[test]
    fn image_cells_are_unorderable() {
        let records = vec![
            country("B", "EUR", 1),
            country("A", "EUR", 1),
        ];
        let mut state = TableState::default();
        state.cycle_sort("flag");
        // Equal comparisons leave the incoming order untouched
        assert_eq!(names(&records, &state.visible_rows(&records)), ["B", "A"]);
    }

    #[test]
    fn filters_apply_as_logical_and() {
        let records = vec![
            country("Austria", "EUR", 1),
            country("Australia", "AUD", 1),
            country("Malta", "EUR", 1),
        ];
        let mut state = TableState::default();
        state.set_filter(FilterKind::Name, "aus".into());
        assert_eq!(
            names(&records, &state.visible_rows(&records)),
            ["Austria", "Australia"]
        );
        state.set_filter(FilterKind::Currency, "eur".into());
        assert_eq!(names(&records, &state.visible_rows(&records)), ["Austria"]);
    }

    #[test]
    fn no_match_yields_zero_rows_and_one_page() {
        let records = vec![country("Austria", "EUR", 1)];
        let mut state = TableState::default();
        state.set_filter(FilterKind::Name, "zzz".into());
        let rows = state.visible_rows(&records);
        assert!(rows.is_empty());
        assert_eq!(TableState::page_count(rows.len()), 1);
        assert_eq!(state.page(rows.len()), 0);
    }

    #[test]
    fn pagination_covers_all_rows() {
        let records: Vec<Record> = (0..23)
            .map(|i| country(&format!("c{i:02}"), "EUR", i))
            .collect();
        let mut state = TableState::default();
        let rows = state.visible_rows(&records);
        assert_eq!(TableState::page_count(rows.len()), 3);
        assert_eq!(state.page_slice(&rows).len(), 10);
        state.next_page(rows.len());
        assert_eq!(state.page_slice(&rows).len(), 10);
        state.next_page(rows.len());
        // Last page holds the remainder
        assert_eq!(state.page_slice(&rows).len(), 3);
        // And the page index pins at the end
        state.next_page(rows.len());
        assert_eq!(state.page(rows.len()), 2);
    }

    #[test]
    fn page_clamps_when_the_visible_set_shrinks() {
        let records: Vec<Record> = (0..23)
            .map(|i| country(&format!("c{i:02}"), "EUR", i))
            .collect();
        let mut state = TableState::default();
        state.next_page(23);
        state.next_page(23);
        assert_eq!(state.page(23), 2);
        // 5 visible rows leave a single page
        assert_eq!(state.page(5), 0);
    }
}
