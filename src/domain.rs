use ratatui::crossterm::event::KeyEvent;

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";
pub const DEFAULT_FIELDS_URL: &str =
    "https://gitlab.com/restcountries/restcountries/-/raw/master/FIELDS.md";

/// Hard cap on displayed columns, base and extra combined.
pub const MAX_COLUMNS: usize = 10;
pub const PAGE_SIZE: usize = 10;

/// The 8 columns every session starts with: (field key, display label).
pub const BASE_COLUMNS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("capital", "Capital"),
    ("currencies", "Currencies"),
    ("flag", "Flag"),
    ("languages", "Languages"),
    ("continents", "Continents"),
    ("region", "Region"),
    ("timezones", "Timezones"),
];

/// Display keys whose upstream field is named differently.
/// The "flag" column reads the "flags" object of the API response.
pub const FIELD_ALIASES: &[(&str, &str)] = &[("flag", "flags")];

/// Fields appended to every query regardless of the visible columns.
/// "cca3" gives each record a stable identity, "flags" feeds the flag column.
pub const IMPLICIT_QUERY_FIELDS: &[&str] = &["flags", "cca3"];

/// Candidate extra fields used when FIELDS.md cannot be fetched.
pub const FALLBACK_FIELDS: &[&str] = &[
    "population",
    "area",
    "tld",
    "borders",
    "subregion",
    "startOfWeek",
    "independent",
    "fifa",
    "coatOfArms",
    "maps",
];

pub const HELP_TEXT: &str = "\
ctv - country data viewer

  Left/Right   select column
  s, Enter     sort selected column (asc -> desc -> asc)
  n            filter by name
  c            filter by currency code
  PgDn/PgUp    next / previous page
  a            add an extra column
  ?            this help
  Esc          close popup / cancel input
  q            quit
";

/// Resolve a display key to the field name the API knows it by.
pub fn upstream_field(key: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(display, _)| *display == key)
        .map(|(_, upstream)| *upstream)
        .unwrap_or(key)
}

#[derive(Debug, Clone)]
pub struct CtvConfig {
    pub countries_url: String,
    pub fields_url: String,
    pub event_poll_time: u64,
}

impl Default for CtvConfig {
    fn default() -> Self {
        CtvConfig {
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            fields_url: DEFAULT_FIELDS_URL.to_string(),
            event_poll_time: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CtvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// Which of the two filter prompts is receiving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Name,
    Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FilterByName,
    FilterByCurrency,
    OpenSelector,
    Help,
    Enter,
    Exit,
    RawKey(KeyEvent),
}
