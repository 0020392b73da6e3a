//! Request and response shapes for the REST API.
//!
//! Requests carry dates as `YYYY-MM-DD` strings and are validated here,
//! before anything reaches the orchestrator: names and emails through the
//! validated types, dates through chrono. `registered_date` is required only
//! on create and ignored on update, where it is immutable anyway.

use carelink_core::{NewPatient, Patient, PatientError, PatientUpdate};
use carelink_types::{EmailAddress, PatientName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incoming patient payload for create and update.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct PatientReq {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub registered_date: Option<String>,
}

/// Outgoing patient shape.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
}

/// Error body returned for failed operations.
///
/// `patient_id` is set only for billing provisioning failures, where the
/// patient record was persisted before the failure and callers need its id
/// for reconciliation.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

fn parse_name(name: &str) -> Result<PatientName, PatientError> {
    PatientName::new(name).map_err(|e| PatientError::InvalidInput(format!("name: {e}")))
}

fn parse_email(email: &str) -> Result<EmailAddress, PatientError> {
    EmailAddress::new(email).map_err(|e| PatientError::InvalidInput(format!("email: {e}")))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, PatientError> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| PatientError::InvalidInput(format!("{field} must be a YYYY-MM-DD date")))
}

impl PatientReq {
    /// Validates the request into a creation draft.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidInput` naming the offending field;
    /// `registered_date` is required here.
    pub fn into_new_patient(self) -> Result<NewPatient, PatientError> {
        let registered_date = self
            .registered_date
            .as_deref()
            .ok_or_else(|| PatientError::InvalidInput("registered_date is required".into()))?;

        Ok(NewPatient {
            name: parse_name(&self.name)?,
            email: parse_email(&self.email)?,
            address: self.address,
            date_of_birth: parse_date("date_of_birth", &self.date_of_birth)?,
            registered_date: parse_date("registered_date", registered_date)?,
        })
    }

    /// Validates the request into an update of the mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidInput` naming the offending field.
    pub fn into_update(self) -> Result<PatientUpdate, PatientError> {
        Ok(PatientUpdate {
            name: parse_name(&self.name)?,
            email: parse_email(&self.email)?,
            address: self.address,
            date_of_birth: parse_date("date_of_birth", &self.date_of_birth)?,
        })
    }
}

impl From<&Patient> for PatientRes {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.as_str().to_owned(),
            email: patient.email.as_str().to_owned(),
            address: patient.address.clone(),
            date_of_birth: patient.date_of_birth.to_string(),
        }
    }
}
