//! Wire shapes and endpoint paths of the volunteers admin API.
//!
//! Only the fields the board needs are decoded; everything else the server
//! sends is ignored.

use rota_core::model::{
    Assignment, AssignmentId, DayId, FormId, HallId, PositionId, PositionRef, RegistrationForm,
    VolunteerId, YearId,
};
use serde::{Deserialize, Serialize};

pub const API_PREFIX: &str = "/api/v1";

#[must_use]
pub fn day_assignments_path(day: DayId) -> String {
    format!("/admin/user-day/day/{day}/assignments")
}

#[must_use]
pub fn positions_path(year: YearId) -> String {
    format!("/admin/year/{year}/positions")
}

#[must_use]
pub fn halls_path(year: YearId) -> String {
    format!("/admin/hall/year/{year}")
}

#[must_use]
pub fn registration_forms_path(year: YearId) -> String {
    format!("/admin/year/{year}/registration-forms")
}

pub const CREATE_ASSIGNMENT_PATH: &str = "/admin/user-day/add";

#[must_use]
pub fn update_assignment_path(id: AssignmentId) -> String {
    format!("/admin/user-day/{id}/edit")
}

#[must_use]
pub fn delete_assignment_path(id: AssignmentId) -> String {
    format!("/admin/user-day/{id}")
}

pub const TELEGRAM_LOGIN_PATH: &str = "/auth/telegram/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const ME_PATH: &str = "/auth/me";

/// One row of `GET /admin/user-day/day/{day}/assignments`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignmentRecord {
    pub user_day_id: AssignmentId,
    pub day_id: DayId,
    pub application_form_id: FormId,
    #[serde(default)]
    pub user_id: Option<VolunteerId>,
    #[serde(default)]
    pub position: Option<PositionRef>,
    #[serde(default)]
    pub hall_id: Option<HallId>,
}

impl From<AssignmentRecord> for Assignment {
    fn from(record: AssignmentRecord) -> Self {
        Self {
            id: record.user_day_id,
            day_id: record.day_id,
            form_id: record.application_form_id,
            position_id: record.position.map(|p| p.position_id),
            hall_id: record.hall_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayAssignmentsResponse {
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationFormsResponse {
    #[serde(default)]
    pub forms: Vec<RegistrationForm>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentResponse {
    #[serde(default)]
    pub user_day_id: Option<AssignmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateAssignmentBody {
    pub position_id: PositionId,
    pub hall_id: Option<HallId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_embed_ids() {
        assert_eq!(
            day_assignments_path(DayId(12)),
            "/admin/user-day/day/12/assignments"
        );
        assert_eq!(halls_path(YearId(2025)), "/admin/hall/year/2025");
        assert_eq!(
            update_assignment_path(AssignmentId(9)),
            "/admin/user-day/9/edit"
        );
    }

    #[test]
    fn assignment_record_decodes_and_converts() {
        let json = r#"{
            "assignments": [
                {"user_day_id": 5, "day_id": 1, "application_form_id": 40, "user_id": 7,
                 "position": {"position_id": 3, "name": "Registration"}, "hall_id": 2,
                 "attendance": "yes", "information": "late shift"},
                {"user_day_id": 6, "day_id": 1, "application_form_id": 41, "position": null}
            ]
        }"#;
        let response: DayAssignmentsResponse = serde_json::from_str(json).expect("decode");
        let assignments: Vec<Assignment> =
            response.assignments.into_iter().map(Assignment::from).collect();

        assert_eq!(assignments[0].id, AssignmentId(5));
        assert_eq!(assignments[0].form_id, FormId(40));
        assert_eq!(assignments[0].position_id, Some(PositionId(3)));
        assert_eq!(assignments[0].hall_id, Some(HallId(2)));
        assert_eq!(assignments[1].position_id, None);
        assert_eq!(assignments[1].hall_id, None);
    }

    #[test]
    fn forms_response_tolerates_sparse_rows() {
        let json = r#"{"forms": [
            {"form_id": 1, "user_id": 2, "first_name_ru": "Anna", "last_name_ru": "Petrova"}
        ]}"#;
        let response: RegistrationFormsResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(response.forms.len(), 1);
        assert!(response.forms[0].desired_positions.is_empty());
    }
}
