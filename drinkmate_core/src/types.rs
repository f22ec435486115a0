//! Core domain types for DrinkMate.
//!
//! This module defines the fundamental types used throughout the system:
//! - Catalog drinks
//! - Logged drink events
//! - Session aggregate state
//! - Body profile used by the BAC model

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// A drink as offered by the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Drink {
    pub name: String,
    pub volume_ml: f64,
    /// Alcohol by volume as a fraction (0.05 for 5%)
    pub abv: f64,
    pub category: String,
    pub glyph: String,
}

// ============================================================================
// Profile Types
// ============================================================================

/// Sex category used to pick the Widmark distribution factor
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
    Other,
}

impl Sex {
    /// Discrete index as stored by settings (0 male, 1 female, 2 other)
    pub fn index(self) -> i32 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
            Sex::Other => 2,
        }
    }

    /// Volume-of-distribution constant for this category
    pub fn distribution_factor(self) -> f64 {
        crate::bac::distribution_factor(self.index())
    }
}

/// Body measurements the BAC model needs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub sex: Sex,
}

impl Default for BodyProfile {
    fn default() -> Self {
        Self {
            weight_kg: 75.0,
            sex: Sex::Male,
        }
    }
}

// ============================================================================
// Event and Session Types
// ============================================================================

/// A logged drink with the BAC it added when it was computed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkEvent {
    pub id: Uuid,
    pub name: String,
    pub glyph: String,
    /// Number of standard servings
    pub amount: f64,
    pub is_double: bool,
    pub timestamp: DateTime<Utc>,
    /// Percentage points this event added to the aggregate BAC
    pub bac_contribution: f64,
}

impl DrinkEvent {
    /// Create a new event for `drink`, computing its contribution against `profile`
    pub fn log(
        drink: &Drink,
        amount: f64,
        is_double: bool,
        profile: &BodyProfile,
        now: DateTime<Utc>,
    ) -> Self {
        let contribution = crate::bac::compute_contribution(
            amount,
            drink,
            is_double,
            profile.weight_kg,
            profile.sex.distribution_factor(),
        );

        Self {
            id: Uuid::new_v4(),
            name: drink.name.clone(),
            glyph: drink.glyph.clone(),
            amount,
            is_double,
            timestamp: now,
            bac_contribution: contribution.bac_percent,
        }
    }

    /// Replacement for this event after an edit
    ///
    /// Keeps the id and original timestamp; everything else is recomputed.
    pub fn revise(
        &self,
        drink: &Drink,
        amount: f64,
        is_double: bool,
        profile: &BodyProfile,
    ) -> Self {
        Self {
            id: self.id,
            timestamp: self.timestamp,
            ..Self::log(drink, amount, is_double, profile, self.timestamp)
        }
    }
}

/// The session aggregate owned by the surrounding application
///
/// Events are newest-first and capped at [`crate::bac::MAX_RETAINED_EVENTS`].
/// `bac` always equals the floored sum of the retained contributions.
/// Values are passed by value through the core and replaced wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionState {
    pub events: Vec<DrinkEvent>,
    pub bac: f64,
    pub hours_until_safe: f64,
}

impl SessionState {
    /// Insert or replace an event and recompute the aggregate
    pub fn apply(self, event: DrinkEvent) -> Self {
        crate::bac::apply_event(self.events, event)
    }

    /// Remove an event by id and recompute the aggregate
    pub fn remove(self, id: Uuid) -> Self {
        crate::bac::recompute(crate::bac::remove_event(self.events, id))
    }

    /// Look up a retained event by id
    pub fn find(&self, id: Uuid) -> Option<&DrinkEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Resolve a full id or a unique id prefix to a retained event's id
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<Uuid> {
        let needle = id_or_prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::EventNotFound(id_or_prefix.to_string()));
        }

        let mut matches = self
            .events
            .iter()
            .filter(|e| e.id.to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(event), None) => Ok(event.id),
            (Some(_), Some(_)) => Err(Error::State(format!(
                "id prefix '{}' matches more than one drink",
                id_or_prefix
            ))),
            _ => Err(Error::EventNotFound(id_or_prefix.to_string())),
        }
    }
}
