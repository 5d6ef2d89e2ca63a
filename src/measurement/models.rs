use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::measurements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Measurement {
    pub id: i32,
    pub user_id: Uuid,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub shoulder: Option<f64>,
    pub sleeve_length: Option<f64>,
    pub shirt_length: Option<f64>,
    pub pant_length: Option<f64>,
    pub inseam: Option<f64>,
    pub neck: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::measurements)]
pub struct NewMeasurement {
    pub user_id: Uuid,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub shoulder: Option<f64>,
    pub sleeve_length: Option<f64>,
    pub shirt_length: Option<f64>,
    pub pant_length: Option<f64>,
    pub inseam: Option<f64>,
    pub neck: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MeasurementRequest {
    /// Admins may record a measurement on a customer's behalf.
    pub user_id: Option<Uuid>,
    #[validate(range(min = 0.0))]
    pub chest: Option<f64>,
    #[validate(range(min = 0.0))]
    pub waist: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hip: Option<f64>,
    #[validate(range(min = 0.0))]
    pub shoulder: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sleeve_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub shirt_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub pant_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub inseam: Option<f64>,
    #[validate(range(min = 0.0))]
    pub neck: Option<f64>,
    pub unit: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, AsChangeset)]
#[diesel(table_name = crate::schema::measurements)]
pub struct MeasurementChangeset {
    #[validate(range(min = 0.0))]
    pub chest: Option<f64>,
    #[validate(range(min = 0.0))]
    pub waist: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hip: Option<f64>,
    #[validate(range(min = 0.0))]
    pub shoulder: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sleeve_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub shirt_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub pant_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub inseam: Option<f64>,
    #[validate(range(min = 0.0))]
    pub neck: Option<f64>,
    pub unit: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl MeasurementChangeset {
    pub fn is_empty(&self) -> bool {
        self.chest.is_none()
            && self.waist.is_none()
            && self.hip.is_none()
            && self.shoulder.is_none()
            && self.sleeve_length.is_none()
            && self.shirt_length.is_none()
            && self.pant_length.is_none()
            && self.inseam.is_none()
            && self.neck.is_none()
            && self.unit.is_none()
            && self.notes.is_none()
            && self.photo_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changeset_reports_empty_when_no_field_is_set() {
        let changeset: MeasurementChangeset = serde_json::from_str("{}").unwrap();
        assert!(changeset.is_empty());

        let changeset: MeasurementChangeset = serde_json::from_str(r#"{"chest": 38.5}"#).unwrap();
        assert!(!changeset.is_empty());
    }

    #[test]
    fn negative_measurements_fail_validation() {
        let request: MeasurementRequest = serde_json::from_str(r#"{"waist": -2.0}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
