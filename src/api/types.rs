//! Request and response shapes of the manager protocol.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::fs::{EntryKind, Quota, RemoteDirEntry};

/// Status envelope shared by login and mutating API actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub message: String,
}

impl ApiStatus {
    pub fn success() -> Self {
        Self {
            result: "success".to_string(),
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// Response of `update_tree_list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeListing {
    #[serde(rename = "sPath")]
    pub path: String,
    #[serde(rename = "aLines", default)]
    pub lines: Option<Vec<TreeLine>>,
    #[serde(rename = "aQuotas", default)]
    pub quotas: Option<Quotas>,
}

impl TreeListing {
    /// Names of the child folders, in server order.
    pub fn folder_names(&self) -> Vec<String> {
        self.lines
            .iter()
            .flatten()
            .map(|line| line.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeLine {
    #[serde(rename = "sName")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quotas {
    #[serde(default)]
    pub site: Option<QuotaFigures>,
    #[serde(default)]
    pub user: Option<QuotaFigures>,
}

/// Raw quota figures, units still localized.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaFigures {
    #[serde(rename = "pourcent", default, deserialize_with = "lenient_f64")]
    pub percent: f64,
    #[serde(rename = "pourcent_free", default, deserialize_with = "lenient_f64")]
    pub percent_free: f64,
    #[serde(default)]
    pub used: String,
    #[serde(default)]
    pub total: String,
}

impl From<&QuotaFigures> for Quota {
    fn from(q: &QuotaFigures) -> Self {
        Quota::from_raw(q.percent, q.percent_free, &q.used, &q.total)
    }
}

/// Percentages come back as numbers or as numeric strings.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Response of `loadFolderSelected`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderContents {
    #[serde(rename = "aLines", default)]
    pub lines: Option<Vec<ContentsLine>>,
    #[serde(rename = "numberOfRows", default)]
    pub number_of_rows: Option<u64>,
}

impl FolderContents {
    /// Entries with a name and a recognized kind.
    pub fn entries(&self) -> Vec<RemoteDirEntry> {
        self.lines
            .iter()
            .flatten()
            .filter_map(|line| {
                let name = line.name.clone()?;
                let kind = EntryKind::from_wire(&line.kind)?;
                Some(RemoteDirEntry { kind, name })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentsLine {
    #[serde(rename = "sName", default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// A whole file sent as the single chunk of a one-part upload.
#[derive(Debug, Clone)]
pub struct UploadChunk {
    pub file_name: String,
    pub data: Vec<u8>,
    /// Per-upload unique token correlating cookie and request.
    pub token: String,
}

impl UploadChunk {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
