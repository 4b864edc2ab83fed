use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Body for the admin login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response envelope. The HTTP status is authoritative for auth
/// outcomes; `code` and `message` only annotate the body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Directory listing envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub files: Vec<FileEntryDto>,
}

/// Wire shape of one listing entry. Everything but the name is optional on
/// older servers.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntryDto {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub time: Option<String>,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    /// Parsed from the wire `time` field; `None` when absent or unparseable.
    pub modified: Option<OffsetDateTime>,
}

impl From<FileEntryDto> for FileEntry {
    fn from(dto: FileEntryDto) -> Self {
        let modified = dto.time.as_deref().and_then(parse_listing_time);
        Self {
            name: dto.name,
            size: dto.size,
            is_dir: dto.is_dir,
            modified,
        }
    }
}

fn parse_listing_time(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).ok()
}

/// A directory's entries in server order.
///
/// Name uniqueness within one listing is assumed, not enforced; lookup
/// returns the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryListing {
    pub entries: Vec<FileEntry>,
}

impl DirectoryListing {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<FilesResponse> for DirectoryListing {
    fn from(response: FilesResponse) -> Self {
        Self {
            entries: response.files.into_iter().map(FileEntry::from).collect(),
        }
    }
}

/// Access log envelope. Newer servers return the records under `logs`;
/// older ones reused the `files` field.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub logs: Option<Vec<AccessRecordDto>>,
    #[serde(default)]
    pub files: Option<Vec<AccessRecordDto>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogsResponse {
    #[must_use]
    pub fn into_records(self) -> Vec<AccessRecord> {
        self.logs
            .or(self.files)
            .unwrap_or_default()
            .into_iter()
            .map(AccessRecord::from)
            .collect()
    }
}

/// Wire shape of one access log record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessRecordDto {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// One parsed access record. Every field is optional; summarization counts
/// only what is actually present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessRecord {
    pub time: Option<OffsetDateTime>,
    pub ip: Option<String>,
    pub path: Option<String>,
    pub status: Option<u16>,
}

impl From<AccessRecordDto> for AccessRecord {
    fn from(dto: AccessRecordDto) -> Self {
        Self {
            time: dto.time.as_deref().and_then(parse_listing_time),
            ip: normalize_field(dto.ip),
            path: normalize_field(dto.path),
            status: dto.status,
        }
    }
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
