use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        Done => "done",
        Blocked => "blocked",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub project_code: Option<String>,
    pub name: String,
    pub customer_name: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Project, "projects");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub project_code: Option<String>,
    pub name: String,
    pub customer_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub project_code: Option<String>,
    pub name: Option<String>,
    pub customer_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("name", &self.name)?;

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(LedgerError::InvalidField {
                    field: "endDate",
                    reason: "must not precede startDate".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Project {
    pub fn create(new: NewProject, now: NaiveDateTime) -> Self {
        Project {
            id: 0,
            project_code: new.project_code,
            name: new.name,
            customer_name: new.customer_name,
            status: new.status.unwrap_or(ProjectStatus::Planning),
            start_date: new.start_date,
            end_date: new.end_date,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProjectPatch, now: NaiveDateTime) {
        merge_opt(&mut self.project_code, patch.project_code);
        merge(&mut self.name, patch.name);
        merge_opt(&mut self.customer_name, patch.customer_name);
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.start_date, patch.start_date);
        merge_opt(&mut self.end_date, patch.end_date);
        merge_opt(&mut self.description, patch.description);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).expect("valid date")
    }

    fn new_project(start: Option<NaiveDate>, end: Option<NaiveDate>) -> NewProject {
        NewProject {
            name: "ERP rollout".to_string(),
            start_date: start,
            end_date: end,
            ..Default::default()
        }
    }

    #[test]
    fn test_date_order() {
        assert!(new_project(Some(day(1)), Some(day(1))).validate().is_ok());
        assert!(new_project(Some(day(1)), None).validate().is_ok());
        assert!(matches!(
            new_project(Some(day(10)), Some(day(2))).validate(),
            Err(LedgerError::InvalidField { field: "endDate", .. })
        ));
    }

    #[test]
    fn test_defaults_and_patch() {
        let now = day(1).and_hms_opt(8, 0, 0).expect("valid time");
        let mut project = Project::create(new_project(None, None), now);
        assert_eq!(project.status, ProjectStatus::Planning);

        project.apply(
            ProjectPatch {
                status: Some(ProjectStatus::InProgress),
                ..Default::default()
            },
            now,
        );
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.name, "ERP rollout");
    }
}
