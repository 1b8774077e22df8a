use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;

use crate::store::table::{ProgressTable, TableBackend, TableError};

/// Progress table behind an HTTP endpoint: `GET` returns the whole table as
/// JSON, `PUT` replaces it.
pub struct HttpTable {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpTable {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, TableError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TableError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            token,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl TableBackend for HttpTable {
    fn read_table(&self) -> Result<ProgressTable, TableError> {
        let response = self
            .authorized(self.client.get(&self.url))
            .send()
            .map_err(|e| TableError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TableError::Status(response.status().as_u16()));
        }
        let body = response.text().map_err(|e| TableError::Http(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(ProgressTable::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn write_table(&self, table: &ProgressTable) -> Result<(), TableError> {
        let body = serde_json::to_string(table)?;
        let response = self
            .authorized(self.client.put(&self.url))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| TableError::Http(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TableError::Status(response.status().as_u16()))
        }
    }

    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }
}
