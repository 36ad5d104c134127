//! In-memory record store.
//!
//! Records are kept newest-first by insertion. The store is owned by a single
//! session and mutated only through `create`, `update` and `delete`.

use crate::classifier::classify;
use crate::{ChildRecord, Error, MeasurementInput, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Ordered collection of child measurement records
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Vec<ChildRecord>,
}

/// Validated measurement fields, ready to be written to a record
struct ValidMeasurement {
    name: String,
    age_months: u32,
    height_cm: f64,
    weight_kg: f64,
}

/// Check that all required fields are present and positive.
///
/// A name of only whitespace counts as missing, but the name is kept as entered.
fn validate(input: &MeasurementInput) -> Result<ValidMeasurement> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation("name is required".into()));
    }

    if input.age_months <= 0 {
        return Err(Error::Validation("age (months) must be positive".into()));
    }
    let age_months = u32::try_from(input.age_months)
        .map_err(|_| Error::Validation("age (months) is out of range".into()))?;

    if !(input.height_cm.is_finite() && input.height_cm > 0.0) {
        return Err(Error::Validation("height (cm) must be positive".into()));
    }
    if !(input.weight_kg.is_finite() && input.weight_kg > 0.0) {
        return Err(Error::Validation("weight (kg) must be positive".into()));
    }

    Ok(ValidMeasurement {
        name: input.name.clone(),
        age_months,
        height_cm: input.height_cm,
        weight_kg: input.weight_kg,
    })
}

/// An empty contact is stored as absent; anything else is kept as entered
fn normalize_contact(contact: &Option<String>) -> Option<String> {
    contact.clone().filter(|c| !c.is_empty())
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in store order (newest first)
    pub fn records(&self) -> &[ChildRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ChildRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Validate, classify and prepend a new record stamped with the current time
    pub fn create(&mut self, input: &MeasurementInput) -> Result<&ChildRecord> {
        self.create_at(input, Utc::now())
    }

    /// Same as [`create`](Self::create) with an explicit creation timestamp
    pub fn create_at(
        &mut self,
        input: &MeasurementInput,
        created_at: DateTime<Utc>,
    ) -> Result<&ChildRecord> {
        let valid = validate(input)?;
        let classification = classify(
            valid.weight_kg,
            valid.height_cm,
            i64::from(valid.age_months),
            input.gender,
        );

        let record = ChildRecord {
            id: Uuid::new_v4(),
            created_at,
            name: valid.name,
            age_months: valid.age_months,
            gender: input.gender,
            height_cm: valid.height_cm,
            weight_kg: valid.weight_kg,
            bmi: classification.bmi,
            status: classification.status,
            parent_contact: normalize_contact(&input.parent_contact),
        };

        tracing::debug!(
            "Created record {} ({}, status {})",
            record.id,
            record.name,
            record.status
        );
        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Replace a record's fields, keeping its id, creation time and position
    pub fn update(&mut self, id: Uuid, input: &MeasurementInput) -> Result<&ChildRecord> {
        let valid = validate(input)?;
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;

        let classification = classify(
            valid.weight_kg,
            valid.height_cm,
            i64::from(valid.age_months),
            input.gender,
        );

        let record = &mut self.records[index];
        record.name = valid.name;
        record.age_months = valid.age_months;
        record.gender = input.gender;
        record.height_cm = valid.height_cm;
        record.weight_kg = valid.weight_kg;
        record.bmi = classification.bmi;
        record.status = classification.status;
        record.parent_contact = normalize_contact(&input.parent_contact);

        tracing::debug!("Updated record {} (status {})", id, record.status);
        Ok(&self.records[index])
    }

    /// Remove a record. Returns the removed record, or `None` if it was absent.
    pub fn delete(&mut self, id: Uuid) -> Option<ChildRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        tracing::debug!("Deleted record {}", id);
        Some(removed)
    }
}
