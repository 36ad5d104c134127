//! Application state for one monitoring session.
//!
//! [`Posyandu`] owns the session, the record store and the authenticator.
//! Callers mutate it through the methods here and pull derived values
//! (`stats`, `trend`, `search`) from the current snapshot afterwards.

use crate::classifier::{self, Classification};
use crate::export;
use crate::session::{Action, Authenticator, DemoAuthenticator, Session};
use crate::stats::{self, Stats, TREND_BUCKETS};
use crate::{ChildRecord, Config, MeasurementInput, RecordStore, Result, Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Field overrides applied on top of a stored record when editing
#[derive(Clone, Debug, Default)]
pub struct MeasurementPatch {
    pub name: Option<String>,
    pub age_months: Option<i64>,
    pub gender: Option<crate::Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub parent_contact: Option<String>,
}

impl MeasurementPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age_months.is_none()
            && self.gender.is_none()
            && self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.parent_contact.is_none()
    }

    /// Overlay the supplied fields onto `input`
    pub fn apply(&self, input: &mut MeasurementInput) {
        if let Some(name) = &self.name {
            input.name = name.clone();
        }
        if let Some(age) = self.age_months {
            input.age_months = age;
        }
        if let Some(gender) = self.gender {
            input.gender = gender;
        }
        if let Some(height) = self.height_cm {
            input.height_cm = height;
        }
        if let Some(weight) = self.weight_kg {
            input.weight_kg = weight;
        }
        if let Some(contact) = &self.parent_contact {
            input.parent_contact = Some(contact.clone());
        }
    }
}

/// Outcome of a confirmed-or-declined delete
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOutcome {
    Deleted(ChildRecord),
    Declined,
    /// The id was not in the store; nothing changed
    Missing,
}

/// Point-in-time view of the whole session, for JSON dumps
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub user: Option<&'a User>,
    pub stats: Stats,
    pub trend: [f64; TREND_BUCKETS],
    pub records: &'a [ChildRecord],
}

/// Session-scoped application state
pub struct Posyandu {
    session: Session,
    store: RecordStore,
    auth: Box<dyn Authenticator>,
    recent_window_days: i64,
}

impl Default for Posyandu {
    fn default() -> Self {
        Self::new(Box::new(DemoAuthenticator))
    }
}

impl Posyandu {
    /// Fresh guest session with an empty store
    pub fn new(auth: Box<dyn Authenticator>) -> Self {
        Self {
            session: Session::new(),
            store: RecordStore::new(),
            auth,
            recent_window_days: stats::DEFAULT_RECENT_WINDOW_DAYS,
        }
    }

    /// Fresh session using the demo authenticator and the configured stats window
    pub fn with_config(config: &Config) -> Self {
        let mut app = Self::default();
        app.recent_window_days = config.stats.recent_window_days;
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn records(&self) -> &[ChildRecord] {
        self.store.records()
    }

    pub fn get(&self, id: Uuid) -> Option<&ChildRecord> {
        self.store.get(id)
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn login(&mut self, username: &str, password: &str, role: Role) -> Result<&User> {
        self.session
            .login(self.auth.as_ref(), username, password, role)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Live classification of an unsubmitted form
    pub fn preview(&self, input: &MeasurementInput) -> Classification {
        classifier::preview(input)
    }

    pub fn add(&mut self, input: &MeasurementInput) -> Result<&ChildRecord> {
        self.store.create(input)
    }

    /// Replace a record's fields. Not gated by role.
    pub fn update(&mut self, id: Uuid, input: &MeasurementInput) -> Result<&ChildRecord> {
        self.session.require(Action::Edit)?;
        self.store.update(id, input)
    }

    /// Edit a record starting from its stored fields, overriding only those in `patch`
    pub fn edit(&mut self, id: Uuid, patch: &MeasurementPatch) -> Result<&ChildRecord> {
        let mut input = self
            .store
            .get(id)
            .ok_or(crate::Error::NotFound(id))?
            .to_input();
        patch.apply(&mut input);
        self.update(id, &input)
    }

    /// Delete a record after `confirm` approves it. Admin only.
    ///
    /// The gate is checked before `confirm` is asked.
    pub fn delete<F>(&mut self, id: Uuid, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&ChildRecord) -> bool,
    {
        self.session.require(Action::Delete)?;

        let Some(record) = self.store.get(id) else {
            tracing::debug!("Delete of missing record {} ignored", id);
            return Ok(DeleteOutcome::Missing);
        };
        if !confirm(record) {
            return Ok(DeleteOutcome::Declined);
        }

        Ok(match self.store.delete(id) {
            Some(removed) => {
                tracing::info!("Deleted record for {}", removed.name);
                DeleteOutcome::Deleted(removed)
            }
            None => DeleteOutcome::Missing,
        })
    }

    /// Resolve a record by the leading characters of its id (hyphens ignored)
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&ChildRecord> {
        let needle = prefix.trim().replace('-', "").to_lowercase();
        if needle.is_empty() {
            return Err(crate::Error::Validation("record id is required".into()));
        }
        let mut matches = self
            .store
            .records()
            .iter()
            .filter(|r| r.id.simple().to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (None, _) => Err(crate::Error::UnknownId(prefix.to_string())),
            (Some(_), Some(_)) => Err(crate::Error::AmbiguousId(prefix.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    pub fn search(&self, query: &str) -> Vec<&ChildRecord> {
        crate::search::search(self.store.records(), query)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        stats::summarize_with_window(self.store.records(), now, self.recent_window_days)
    }

    pub fn trend(&self) -> [f64; TREND_BUCKETS] {
        stats::trend(self.store.records())
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot<'_> {
        Snapshot {
            user: self.session.user(),
            stats: self.stats(now),
            trend: self.trend(),
            records: self.store.records(),
        }
    }

    // ------------------------------------------------------------------
    // Exports (admin only)
    // ------------------------------------------------------------------

    pub fn export_csv(&self) -> Result<String> {
        self.session.require(Action::Export)?;
        export::export_csv(self.store.records())
    }

    pub fn export_report(&self, now: DateTime<Utc>) -> Result<String> {
        self.session.require(Action::Export)?;
        export::render_report(self.store.records(), &self.stats(now), now)
    }

    /// Export CSV and write it to `path`, returning the path written
    pub fn write_csv(&self, path: &Path) -> Result<PathBuf> {
        let csv = self.export_csv()?;
        export::write_atomic(path, &csv)?;
        tracing::info!("Exported {} records to CSV", self.store.len());
        Ok(path.to_path_buf())
    }

    /// Render the printable report and write it to `path`, returning the path written
    pub fn write_report(&self, path: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        let html = self.export_report(now)?;
        export::write_atomic(path, &html)?;
        tracing::info!("Exported report with {} records", self.store.len());
        Ok(path.to_path_buf())
    }
}
