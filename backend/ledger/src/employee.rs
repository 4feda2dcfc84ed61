use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    EmployeeStatus {
        Active => "active",
        OnLeave => "on-leave",
        Resigned => "resigned",
    }
}

labels! {
    EmploymentType {
        FullTime => "full-time",
        PartTime => "part-time",
        Contract => "contract",
        Intern => "intern",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub salary: Option<Decimal>,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub manager: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Employee, "employees", |e| vec![(
    "employeeId",
    e.employee_id.clone()
)]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub salary: Option<Decimal>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub manager: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub salary: Option<Decimal>,
    pub status: Option<EmployeeStatus>,
    pub manager: Option<String>,
    pub notes: Option<String>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("employeeId", &self.employee_id)?;
        validate::required("firstName", &self.first_name)?;
        validate::required("lastName", &self.last_name)?;
        validate::optional_email("email", self.email.as_deref())
    }
}

impl Employee {
    pub fn create(new: NewEmployee, now: NaiveDateTime) -> Self {
        Employee {
            id: 0,
            employee_id: new.employee_id.trim().to_string(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            department: new.department,
            position: new.position,
            employment_type: new.employment_type,
            salary: new.salary,
            hire_date: new.hire_date,
            status: new.status.unwrap_or(EmployeeStatus::Active),
            manager: new.manager,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: EmployeePatch, now: NaiveDateTime) {
        merge(&mut self.first_name, patch.first_name);
        merge(&mut self.last_name, patch.last_name);
        merge_opt(&mut self.email, patch.email);
        merge_opt(&mut self.phone, patch.phone);
        merge_opt(&mut self.department, patch.department);
        merge_opt(&mut self.position, patch.position);
        merge_opt(&mut self.employment_type, patch.employment_type);
        merge_opt(&mut self.salary, patch.salary);
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.manager, patch.manager);
        merge_opt(&mut self.notes, patch.notes);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn new_employee() -> NewEmployee {
        NewEmployee {
            employee_id: "EMP-1".to_string(),
            first_name: "Hoa".to_string(),
            last_name: "Tran".to_string(),
            department: Some("Sales".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let e = Employee::create(new_employee(), now());

        assert_eq!(e.status, EmployeeStatus::Active);
        assert_eq!(e.department.as_deref(), Some("Sales"));
    }

    #[test]
    fn test_required_names() {
        let new = NewEmployee {
            last_name: String::new(),
            ..new_employee()
        };

        assert!(matches!(
            new.validate(),
            Err(LedgerError::MissingField("lastName"))
        ));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("on-leave".parse::<EmployeeStatus>(), Ok(EmployeeStatus::OnLeave));
        assert_eq!(EmploymentType::FullTime.to_string(), "full-time");
    }
}
