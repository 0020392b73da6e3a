//! In-memory patient store for tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use carelink_types::EmailAddress;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PatientError, PatientResult};
use crate::patient::{NewPatient, Patient, PatientUpdate};
use crate::store::PatientStore;

/// A `PatientStore` backed by a guarded `HashMap`.
///
/// Uniqueness enforcement: every write path takes the write guard before
/// checking for email collisions and holds it through the mutation, so the
/// check and the write are atomic with respect to concurrent writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_in_use(
    patients: &HashMap<Uuid, Patient>,
    email: &EmailAddress,
    exclude: Option<Uuid>,
) -> bool {
    patients
        .values()
        .any(|p| Some(p.id) != exclude && p.email == *email)
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn list(&self) -> PatientResult<Vec<Patient>> {
        let patients = self.patients.read().await;
        Ok(patients.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PatientResult<Patient> {
        let patients = self.patients.read().await;
        patients.get(&id).cloned().ok_or(PatientError::NotFound(id))
    }

    async fn exists_by_email(
        &self,
        email: &EmailAddress,
        exclude: Option<Uuid>,
    ) -> PatientResult<bool> {
        let patients = self.patients.read().await;
        Ok(email_in_use(&patients, email, exclude))
    }

    async fn insert(&self, new: NewPatient) -> PatientResult<Patient> {
        let mut patients = self.patients.write().await;

        if email_in_use(&patients, &new.email, None) {
            return Err(PatientError::DuplicateEmail(new.email));
        }

        let mut id = Uuid::new_v4();
        while patients.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let patient = Patient {
            id,
            name: new.name,
            email: new.email,
            address: new.address,
            date_of_birth: new.date_of_birth,
            registered_date: new.registered_date,
        };
        patients.insert(id, patient.clone());
        Ok(patient)
    }

    async fn update(&self, id: Uuid, update: PatientUpdate) -> PatientResult<Patient> {
        let mut patients = self.patients.write().await;

        if !patients.contains_key(&id) {
            return Err(PatientError::NotFound(id));
        }
        if email_in_use(&patients, &update.email, Some(id)) {
            return Err(PatientError::DuplicateEmail(update.email));
        }

        let patient = patients
            .get_mut(&id)
            .ok_or(PatientError::NotFound(id))?;
        patient.apply(update);
        Ok(patient.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> PatientResult<()> {
        let mut patients = self.patients.write().await;
        patients
            .remove(&id)
            .map(|_| ())
            .ok_or(PatientError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_types::PatientName;
    use chrono::NaiveDate;

    fn draft(email: &str) -> NewPatient {
        NewPatient {
            name: PatientName::new("Sarah Williams").unwrap(),
            email: EmailAddress::new(email).unwrap(),
            address: "12 Acacia Avenue".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 3, 20).unwrap(),
            registered_date: NaiveDate::from_ymd_opt(2026, 1, 23).unwrap(),
        }
    }

    fn update_for(patient: &Patient, email: &str) -> PatientUpdate {
        PatientUpdate {
            name: patient.name.clone(),
            email: EmailAddress::new(email).unwrap(),
            address: patient.address.clone(),
            date_of_birth: patient.date_of_birth,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_keeps_fields() {
        let store = MemoryStore::new();
        let new = draft("sarah@example.com");
        let patient = store.insert(new.clone()).await.unwrap();

        assert_eq!(patient.name, new.name);
        assert_eq!(patient.email, new.email);
        assert_eq!(patient.registered_date, new.registered_date);

        let found = store.find_by_id(patient.id).await.unwrap();
        assert_eq!(found, patient);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert(draft("sarah@example.com")).await.unwrap();

        let err = store.insert(draft("sarah@example.com")).await.unwrap_err();
        assert!(matches!(err, PatientError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn concurrent_inserts_with_same_email_admit_exactly_one() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.insert(draft("race@example.com")).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.insert(draft("race@example.com")).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(
            loser.unwrap_err(),
            PatientError::DuplicateEmail(_)
        ));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exists_by_email_honours_exclusion() {
        let store = MemoryStore::new();
        let patient = store.insert(draft("sarah@example.com")).await.unwrap();
        let email = patient.email.clone();

        assert!(store.exists_by_email(&email, None).await.unwrap());
        assert!(!store
            .exists_by_email(&email, Some(patient.id))
            .await
            .unwrap());
        assert!(store
            .exists_by_email(&email, Some(Uuid::new_v4()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn update_changes_only_mutable_fields() {
        let store = MemoryStore::new();
        let patient = store.insert(draft("sarah@example.com")).await.unwrap();

        let mut update = update_for(&patient, "sarah.w@example.com");
        update.address = "99 New Street".into();
        let updated = store.update(patient.id, update).await.unwrap();

        assert_eq!(updated.id, patient.id);
        assert_eq!(updated.registered_date, patient.registered_date);
        assert_eq!(updated.email.as_str(), "sarah.w@example.com");
        assert_eq!(updated.address, "99 New Street");
    }

    #[tokio::test]
    async fn update_to_own_email_succeeds() {
        let store = MemoryStore::new();
        let patient = store.insert(draft("sarah@example.com")).await.unwrap();

        let update = update_for(&patient, "sarah@example.com");
        assert!(store.update(patient.id, update).await.is_ok());
    }

    #[tokio::test]
    async fn update_to_anothers_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert(draft("first@example.com")).await.unwrap();
        let second = store.insert(draft("second@example.com")).await.unwrap();

        let err = store
            .update(second.id, update_for(&second, "first@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, PatientError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn update_of_missing_record_reports_not_found() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();
        let patient = Patient {
            id: ghost,
            name: PatientName::new("Ghost").unwrap(),
            email: EmailAddress::new("ghost@example.com").unwrap(),
            address: String::new(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            registered_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };

        let err = store
            .update(ghost, update_for(&patient, "ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, PatientError::NotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn delete_then_find_reports_not_found() {
        let store = MemoryStore::new();
        let patient = store.insert(draft("sarah@example.com")).await.unwrap();

        store.delete_by_id(patient.id).await.unwrap();
        let err = store.find_by_id(patient.id).await.unwrap_err();
        assert!(matches!(err, PatientError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_of_absent_record_reports_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PatientError::NotFound(_)));
    }
}
