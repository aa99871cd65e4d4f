use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A single person from the directory sheet.
///
/// Column names follow the published spreadsheet; anything not listed here is
/// ignored and anything missing stays unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Row {
    #[serde(rename = "name_plain", deserialize_with = "blank_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub role: Option<String>,
    #[serde(rename = "company_plain", deserialize_with = "blank_as_none")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub company_link: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub country: Option<String>,
    #[serde(rename = "class", deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub short_description: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub long_description: Option<String>,
    #[serde(rename = "image", deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(rename = "linkedin_url", deserialize_with = "blank_as_none")]
    pub profile_link: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn blank_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(blank_as_none(deserializer)?.unwrap_or_default())
}

/// Where the directory CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Url(s.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A line that was skipped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: u64,
    pub message: String,
}

/// Rows plus the non-fatal problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedDataset {
    pub rows: Vec<Row>,
    pub warnings: Vec<ParseWarning>,
}

/// Failure to obtain a usable dataset at all.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LoadError {
    /// Message shown on the failed-load screen.
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Http(e) if e.is_timeout() => {
                "The data source did not answer in time".to_string()
            }
            LoadError::Http(e) => format!("Network error: {}", e),
            LoadError::Status { status, .. } => {
                format!("The data source answered with HTTP {}", status)
            }
            LoadError::Io { path, source } => {
                format!("Could not read {}: {}", path.display(), source)
            }
            LoadError::Csv(e) => format!("Failed to parse CSV data: {}", e),
            LoadError::Task(e) => format!("The load was interrupted: {}", e),
        }
    }
}

/// Fetch and parse the whole dataset.
pub async fn load(source: &Source, timeout: Duration) -> Result<ParsedDataset, LoadError> {
    let bytes = fetch(source, timeout).await?;
    let dataset = parse_rows(&bytes)?;
    for warning in &dataset.warnings {
        tracing::warn!(line = warning.line, "skipped CSV line: {}", warning.message);
    }
    tracing::info!(
        rows = dataset.rows.len(),
        skipped = dataset.warnings.len(),
        "loaded dataset from {}",
        source
    );
    Ok(dataset)
}

async fn fetch(source: &Source, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    match source {
        Source::Url(url) => {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
        Source::File(path) => tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        }),
    }
}

/// Parse CSV bytes with a header row. Undecodable records become warnings.
pub fn parse_rows(data: &[u8]) -> Result<ParsedDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    // Header failures are fatal; everything after is per line.
    reader.headers()?;

    let mut dataset = ParsedDataset::default();
    for (i, result) in reader.deserialize::<Row>().enumerate() {
        match result {
            Ok(row) => dataset.rows.push(row),
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    // header is line 1
                    .unwrap_or(i as u64 + 2);
                dataset.warnings.push(ParseWarning {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(dataset)
}
