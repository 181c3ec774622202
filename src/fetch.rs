use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::domain::{CtvConfig, CtvError, IMPLICIT_QUERY_FIELDS, upstream_field};
use crate::table::Record;

/// Blocking HTTP access to the countries API and the schema document.
///
/// Requests run on the UI thread and block the event loop, so callers
/// set a loading status and let a frame render before calling in.
/// No retries, no caching, no timeouts.
pub struct Fetcher {
    client: Client,
    countries_url: String,
    fields_url: String,
}

impl Fetcher {
    pub fn new(config: &CtvConfig) -> Self {
        Fetcher {
            client: Client::new(),
            countries_url: config.countries_url.clone(),
            fields_url: config.fields_url.clone(),
        }
    }

    /// Build the query URL for the given display columns. Display keys
    /// are mapped to their upstream names, and the implicit fields are
    /// appended once.
    fn countries_endpoint(&self, fields: &[String]) -> Result<Url, CtvError> {
        let mut url = Url::parse(&self.countries_url)?;
        let mut names: Vec<&str> = fields.iter().map(|f| upstream_field(f)).collect();
        for implicit in IMPLICIT_QUERY_FIELDS {
            if !names.iter().any(|n| n == implicit) {
                names.push(implicit);
            }
        }
        url.query_pairs_mut().append_pair("fields", &names.join(","));
        Ok(url)
    }

    /// GET the country list for the given columns.
    pub fn fetch_countries(&self, fields: &[String]) -> Result<Vec<Record>, CtvError> {
        let url = self.countries_endpoint(fields)?;
        debug!("GET {url}");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CtvError::Status(status.as_u16()));
        }
        let body: serde_json::Value = response.json()?;
        let records = body
            .as_array()
            .ok_or_else(|| CtvError::Shape("expected a JSON array of countries".into()))?
            .iter()
            .map(|v| {
                v.as_object()
                    .cloned()
                    .ok_or_else(|| CtvError::Shape("expected country objects".into()))
            })
            .collect::<Result<Vec<Record>, CtvError>>()?;
        info!("Fetched {} countries", records.len());
        Ok(records)
    }

    /// GET the raw FIELDS.md text. The caller parses it and falls back
    /// to the fixed list when this errors.
    pub fn fetch_fields_markdown(&self) -> Result<String, CtvError> {
        debug!("GET {}", self.fields_url);
        let response = self.client.get(&self.fields_url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CtvError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}
