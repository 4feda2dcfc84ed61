use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    ReportStatus {
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ReportStatus,
    pub created_by: Option<String>,
    pub file_url: Option<String>,
    pub parameters: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

impl_record!(Report, "reports");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: Option<ReportStatus>,
    pub created_by: Option<String>,
    pub file_url: Option<String>,
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    pub name: Option<String>,
    pub status: Option<ReportStatus>,
    pub file_url: Option<String>,
}

impl NewReport {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("name", &self.name)?;
        validate::required("type", &self.kind)
    }
}

impl Report {
    /// Reports start out processing unless the caller says otherwise.
    pub fn create(new: NewReport, now: NaiveDateTime) -> Self {
        Report {
            id: 0,
            name: new.name,
            kind: new.kind.trim().to_string(),
            status: new.status.unwrap_or(ReportStatus::Processing),
            created_by: new.created_by,
            file_url: new.file_url,
            parameters: new.parameters,
            created_at: now,
        }
    }

    pub fn apply(&mut self, patch: ReportPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.file_url, patch.file_url);
    }
}
