//! The patient entity and its mutation carriers.

use carelink_types::{EmailAddress, PatientName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored patient record.
///
/// `id` is assigned by the store at insert and never changes afterwards, and
/// `registered_date` is fixed at creation time. The remaining fields are
/// mutable through [`PatientUpdate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: PatientName,
    pub email: EmailAddress,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// Carrier for a patient about to be inserted.
///
/// Everything a [`Patient`] holds except the identifier, which the store
/// assigns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPatient {
    pub name: PatientName,
    pub email: EmailAddress,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

/// The mutable subset of a patient record.
///
/// `id` and `registered_date` are deliberately absent; an update can never
/// touch them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientUpdate {
    pub name: PatientName,
    pub email: EmailAddress,
    pub address: String,
    pub date_of_birth: NaiveDate,
}

impl Patient {
    /// Applies the mutable fields of `update` to this record in place.
    pub(crate) fn apply(&mut self, update: PatientUpdate) {
        self.name = update.name;
        self.email = update.email;
        self.address = update.address;
        self.date_of_birth = update.date_of_birth;
    }
}
