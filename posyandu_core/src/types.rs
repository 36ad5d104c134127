//! Core domain types for the Posyandu growth monitor.
//!
//! This module defines the fundamental types used throughout the system:
//! - Child measurement records and the form input that produces them
//! - Gender and growth status labels
//! - Session users and their roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Labels
// ============================================================================

/// Gender of the measured child
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::Error::Validation(format!(
                "unknown gender '{}' (expected male or female)",
                other
            ))),
        }
    }
}

/// Coarse growth status derived by the classifier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthStatus {
    Unknown,
    Stunted,
    AtRisk,
    Normal,
}

impl GrowthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthStatus::Unknown => "unknown",
            GrowthStatus::Stunted => "stunted",
            GrowthStatus::AtRisk => "at-risk",
            GrowthStatus::Normal => "normal",
        }
    }
}

impl fmt::Display for GrowthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Measurement Records
// ============================================================================

/// Raw measurement as entered on the form, before validation.
///
/// Numeric fields use `0` for "not filled in", matching an empty form field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MeasurementInput {
    pub name: String,
    pub age_months: i64,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub parent_contact: Option<String>,
}

/// A stored child measurement with its derived BMI and status
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChildRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub age_months: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub status: GrowthStatus,
    pub parent_contact: Option<String>,
}

impl ChildRecord {
    /// Form input prefilled from this record, used as the starting point for an edit
    pub fn to_input(&self) -> MeasurementInput {
        MeasurementInput {
            name: self.name.clone(),
            age_months: i64::from(self.age_months),
            gender: self.gender,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            parent_contact: self.parent_contact.clone(),
        }
    }

    /// First eight characters of the id, enough to address a record in the shell
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Role selected at login
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Worker,
}

impl Role {
    /// Human-facing label shown in the header
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Worker => "Health Worker",
        }
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    /// Anything other than `admin` selects the worker role.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            _ => Ok(Role::Worker),
        }
    }
}

/// An authenticated session user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub role: Role,
}
