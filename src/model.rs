use tracing::{debug, info, warn};

use crate::domain::{
    BASE_COLUMNS, CtvConfig, FilterKind, MAX_COLUMNS, HELP_TEXT, Message,
};
use crate::fetch::Fetcher;
use crate::inputter::{InputResult, Inputter};
use crate::schema;
use crate::table::{Cell, Direction, Record, TableState, cell_value};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SELECTOR,
    POPUP,
    FILTERINPUT,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
}

pub struct ColumnHeader {
    pub label: String,
    pub sort: Option<Direction>,
    pub active: bool,
}

/// Render-ready snapshot handed to the UI each frame.
pub struct UIData {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<Vec<Cell>>,
    pub page: usize,
    pub page_count: usize,
    pub nrows: usize,
    pub total: usize,
    pub filter_name: String,
    pub filter_currency: String,
    pub status_message: String,
    pub input: Option<(FilterKind, String)>,
    pub selector: Option<(Vec<String>, usize)>,
    pub popup: Option<String>,
}

pub struct Model {
    fetcher: Fetcher,
    pub status: Status,
    modus: Modus,
    columns: Vec<Column>,
    extra_columns: Vec<String>,
    records: Vec<Record>,
    table: TableState,
    active_column: usize,
    candidates: Vec<String>,
    selector_row: usize,
    reload_pending: bool,
    filter_kind: Option<FilterKind>,
    input: Inputter,
    last_input: InputResult,
    status_message: String,
    popup_message: Option<String>,
}

impl Model {
    pub fn new(config: &CtvConfig) -> Self {
        let columns = BASE_COLUMNS
            .iter()
            .map(|(key, label)| Column {
                key: key.to_string(),
                label: label.to_string(),
            })
            .collect();
        Model {
            fetcher: Fetcher::new(config),
            status: Status::LOADING,
            modus: Modus::TABLE,
            columns,
            extra_columns: Vec::new(),
            records: Vec::new(),
            table: TableState::default(),
            active_column: 0,
            candidates: Vec::new(),
            selector_row: 0,
            reload_pending: false,
            filter_kind: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_message: "Loading ...".to_string(),
            popup_message: None,
        }
    }

    /// Initial load: the country list for the base columns and the
    /// candidate field list from FIELDS.md (with its fixed fallback).
    pub fn load(&mut self) {
        self.reload_countries();

        let parsed = match self.fetcher.fetch_fields_markdown() {
            Ok(text) => schema::parse_fields(&text),
            Err(e) => {
                warn!("Could not fetch FIELDS.md, using fallback fields: {e}");
                schema::fallback_fields()
            }
        };
        self.candidates = schema::without_shown(parsed, &self.shown_keys());
        debug!("{} candidate extra fields", self.candidates.len());
        self.status = Status::READY;
    }

    pub fn shown_keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Fetch all countries for the currently shown columns. On failure
    /// the previous records stay in place and only the status message
    /// changes (there is no retry).
    fn reload_countries(&mut self) {
        match self.fetcher.fetch_countries(&self.shown_keys()) {
            Ok(records) => {
                self.set_status_message(format!("Loaded {} countries", records.len()));
                self.records = records;
            }
            Err(e) => {
                warn!("Country fetch failed: {e}");
                self.set_status_message("Failed to fetch country data.");
            }
        }
    }

    /// Append an extra column and return the expanded field list to
    /// fetch. `None` means rejected (column cap) or a duplicate no-op;
    /// neither changes the fetched field list.
    fn add_extra_column(&mut self, field: &str) -> Option<Vec<String>> {
        if self.columns.len() >= MAX_COLUMNS {
            info!("Rejecting extra column {field}, cap of {MAX_COLUMNS} reached");
            self.set_status_message("Maximum number of columns reached");
            return None;
        }
        if self.extra_columns.iter().any(|f| f == field) {
            return None;
        }
        self.extra_columns.push(field.to_string());
        self.columns.push(Column {
            key: field.to_string(),
            label: field.to_string(),
        });
        self.candidates.retain(|c| c != field);
        info!("Added extra column {field}");
        Some(self.shown_keys())
    }

    fn confirm_selector(&mut self) {
        let Some(field) = self.candidates.get(self.selector_row).cloned() else {
            self.modus = Modus::TABLE;
            return;
        };
        self.modus = Modus::TABLE;
        if self.add_extra_column(&field).is_some() {
            // The fetch blocks the loop, so only flag it here. The main
            // loop services the flag after the next draw and the loading
            // status is on screen while the request runs.
            self.set_status_message("Loading ...");
            self.reload_pending = true;
        }
        self.selector_row = 0;
    }

    /// Run a re-fetch deferred by `confirm_selector`. Called between
    /// draws by the main loop.
    pub fn service_pending(&mut self) {
        if self.reload_pending {
            self.reload_pending = false;
            self.reload_countries();
        }
    }

    fn enter_filter_input(&mut self, kind: FilterKind) {
        self.modus = Modus::FILTERINPUT;
        self.filter_kind = Some(kind);
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            if !self.last_input.canceled
                && let Some(kind) = self.filter_kind
            {
                self.table.set_filter(kind, self.last_input.input.clone());
            }
            self.filter_kind = None;
            self.modus = Modus::TABLE;
        }
    }

    fn visible_count(&self) -> usize {
        self.table.visible_rows(&self.records).len()
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTERINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) {
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::MoveLeft => {
                    self.active_column = self.active_column.saturating_sub(1);
                }
                Message::MoveRight => {
                    self.active_column =
                        std::cmp::min(self.active_column + 1, self.columns.len() - 1);
                }
                Message::Enter => {
                    let key = self.columns[self.active_column].key.clone();
                    self.table.cycle_sort(&key);
                }
                Message::NextPage => {
                    let nrows = self.visible_count();
                    self.table.next_page(nrows);
                }
                Message::PrevPage => {
                    let nrows = self.visible_count();
                    self.table.prev_page(nrows);
                }
                Message::FilterByName => self.enter_filter_input(FilterKind::Name),
                Message::FilterByCurrency => self.enter_filter_input(FilterKind::Currency),
                Message::OpenSelector => {
                    self.selector_row = 0;
                    self.modus = Modus::SELECTOR;
                }
                Message::Help => {
                    self.popup_message = Some(HELP_TEXT.to_string());
                    self.modus = Modus::POPUP;
                }
                _ => (),
            },
            Modus::SELECTOR => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => {
                    self.selector_row = self.selector_row.saturating_sub(1);
                }
                Message::MoveDown => {
                    if !self.candidates.is_empty() {
                        self.selector_row =
                            std::cmp::min(self.selector_row + 1, self.candidates.len() - 1);
                    }
                }
                Message::Enter => self.confirm_selector(),
                Message::Exit => self.modus = Modus::TABLE,
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => {
                    self.popup_message = None;
                    self.modus = Modus::TABLE;
                }
                _ => (),
            },
            Modus::FILTERINPUT => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key);
                }
            }
        }
    }

    pub fn view(&self) -> UIData {
        let rows_idx = self.table.visible_rows(&self.records);
        let page_rows = self.table.page_slice(&rows_idx);
        let rows = page_rows
            .iter()
            .map(|&ridx| {
                self.columns
                    .iter()
                    .map(|c| cell_value(&self.records[ridx], &c.key))
                    .collect()
            })
            .collect();
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(cidx, c)| ColumnHeader {
                label: c.label.clone(),
                sort: self
                    .table
                    .sort
                    .as_ref()
                    .filter(|(key, _)| *key == c.key)
                    .map(|(_, direction)| *direction),
                active: cidx == self.active_column,
            })
            .collect();

        UIData {
            columns,
            rows,
            page: self.table.page(rows_idx.len()) + 1,
            page_count: TableState::page_count(rows_idx.len()),
            nrows: rows_idx.len(),
            total: self.records.len(),
            filter_name: self.table.filter_name.clone(),
            filter_currency: self.table.filter_currency.clone(),
            status_message: self.status_message.clone(),
            input: match self.modus {
                Modus::FILTERINPUT => self
                    .filter_kind
                    .map(|kind| (kind, self.last_input.input.clone())),
                _ => None,
            },
            selector: match self.modus {
                Modus::SELECTOR => Some((self.candidates.clone(), self.selector_row)),
                _ => None,
            },
            popup: self.popup_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent};
    use serde_json::json;

    fn model() -> Model {
        Model::new(&CtvConfig::default())
    }

    fn model_with_candidates(fields: &[&str]) -> Model {
        let mut m = model();
        m.candidates = fields.iter().map(|f| f.to_string()).collect();
        m
    }

    #[test]
    fn starts_with_the_eight_base_columns() {
        let m = model();
        assert_eq!(m.columns.len(), 8);
        assert_eq!(m.columns[0].key, "name");
        assert_eq!(m.columns[3].label, "Flag");
    }

    #[test]
    fn extra_column_expands_the_field_list() {
        let mut m = model_with_candidates(&["population", "area"]);
        let fields = m.add_extra_column("population").unwrap();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields.last().unwrap(), "population");
        // A confirmed candidate leaves the list
        assert_eq!(m.candidates, ["area"]);
    }

    #[test]
    fn eleventh_column_is_rejected() {
        let mut m = model_with_candidates(&["population", "area", "tld"]);
        assert!(m.add_extra_column("population").is_some());
        assert!(m.add_extra_column("area").is_some());
        assert_eq!(m.columns.len(), 10);

        assert!(m.add_extra_column("tld").is_none());
        assert_eq!(m.columns.len(), 10);
        assert_eq!(m.shown_keys().len(), 10);
        assert_eq!(m.status_message, "Maximum number of columns reached");
        // The rejected candidate stays available
        assert_eq!(m.candidates, ["tld"]);
    }

    #[test]
    fn duplicate_extra_column_is_a_noop() {
        let mut m = model_with_candidates(&["population"]);
        assert!(m.add_extra_column("population").is_some());
        assert!(m.add_extra_column("population").is_none());
        assert_eq!(m.columns.len(), 9);
    }

    #[test]
    fn sort_messages_target_the_active_column() {
        let mut m = model();
        m.update(Message::MoveRight);
        m.update(Message::Enter);
        assert_eq!(
            m.table.sort,
            Some(("capital".to_string(), Direction::Ascending))
        );
        m.update(Message::Enter);
        assert_eq!(
            m.table.sort,
            Some(("capital".to_string(), Direction::Descending))
        );
        m.update(Message::MoveLeft);
        m.update(Message::Enter);
        assert_eq!(
            m.table.sort,
            Some(("name".to_string(), Direction::Ascending))
        );
    }

    #[test]
    fn filter_input_flows_into_the_table_state() {
        let mut m = model();
        m.records = vec![
            json!({ "name": { "common": "Austria" } })
                .as_object()
                .unwrap()
                .clone(),
        ];
        m.update(Message::FilterByName);
        assert!(m.raw_keyevents());
        for c in ['a', 'u'] {
            m.update(Message::RawKey(KeyEvent::from(KeyCode::Char(c))));
        }
        m.update(Message::RawKey(KeyEvent::from(KeyCode::Enter)));
        assert!(!m.raw_keyevents());
        assert_eq!(m.table.filter_name, "au");
        assert_eq!(m.visible_count(), 1);
    }

    #[test]
    fn confirming_a_field_defers_the_refetch_behind_a_loading_status() {
        let mut m = model_with_candidates(&["population"]);
        m.update(Message::OpenSelector);
        m.update(Message::Enter);
        assert_eq!(m.columns.len(), 9);
        // The fetch must not run inside update(): the loading status has
        // to survive until the next draw, with the request still pending.
        assert!(m.reload_pending);
        assert_eq!(m.status_message, "Loading ...");
        assert_eq!(m.view().status_message, "Loading ...");
    }

    #[test]
    fn selector_navigation_clamps_to_the_candidate_list() {
        let mut m = model_with_candidates(&["population", "area"]);
        m.update(Message::OpenSelector);
        m.update(Message::MoveDown);
        m.update(Message::MoveDown);
        assert_eq!(m.selector_row, 1);
        m.update(Message::MoveUp);
        m.update(Message::MoveUp);
        assert_eq!(m.selector_row, 0);
        m.update(Message::Exit);
        assert_eq!(m.modus, Modus::TABLE);
    }
}
