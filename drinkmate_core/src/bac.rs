//! Blood-alcohol accumulation model.
//!
//! Single-dose Widmark estimate per drink event, summed over the retained
//! session events:
//! - `grams = servings × volume_ml × abv × 0.789 × (2 if double)`
//! - `bac% = grams / (weight_kg × 1000 × r) × 100`
//!
//! Each event's contribution is fixed when the event is created or edited
//! and is not decayed for time elapsed since logging. Only the
//! time-until-safe figure assumes ongoing elimination from the total.

use crate::{DrinkEvent, Drink, Error, Result, SessionState};
use uuid::Uuid;

/// Ethanol density in grams per millilitre
pub const ETHANOL_DENSITY_G_PER_ML: f64 = 0.789;

/// BAC percentage points eliminated per hour
pub const ELIMINATION_RATE_PER_HOUR: f64 = 0.015;

/// BAC at or below which driving is considered safe
pub const SAFE_DRIVING_BAC: f64 = 0.05;

/// Maximum number of events a session keeps
pub const MAX_RETAINED_EVENTS: usize = 10;

/// Smallest loggable amount and the step between amounts
pub const AMOUNT_STEP: f64 = 0.5;

/// Largest loggable amount
pub const MAX_AMOUNT: f64 = 10.0;

/// Output of [`compute_contribution`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    /// BAC percentage points added by the dose
    pub bac_percent: f64,
    /// Grams of ethanol in the dose
    pub alcohol_grams: f64,
}

/// Widmark distribution factor for a sex category index
///
/// 0 → 0.68, 1 → 0.55, anything else → 0.62.
pub fn distribution_factor(index: i32) -> f64 {
    match index {
        0 => 0.68,
        1 => 0.55,
        _ => 0.62,
    }
}

/// BAC contribution of a single dose
///
/// Callers uphold `servings > 0`, `drink.volume_ml > 0` and
/// `body_weight_kg > 0`.
pub fn compute_contribution(
    servings: f64,
    drink: &Drink,
    is_double: bool,
    body_weight_kg: f64,
    sex_factor: f64,
) -> Contribution {
    let multiplier = if is_double { 2.0 } else { 1.0 };
    let alcohol_grams =
        servings * drink.volume_ml * drink.abv * ETHANOL_DENSITY_G_PER_ML * multiplier;

    let body_water_grams = body_weight_kg * 1000.0 * sex_factor;
    let bac_percent = alcohol_grams / body_water_grams * 100.0;

    Contribution {
        bac_percent,
        alcohol_grams,
    }
}

/// Hours until the given BAC drops to the safe driving threshold
pub fn hours_until_safe(bac: f64) -> f64 {
    if bac <= SAFE_DRIVING_BAC {
        0.0
    } else {
        (bac - SAFE_DRIVING_BAC) / ELIMINATION_RATE_PER_HOUR
    }
}

/// Rebuild the aggregate from a retained event list
pub fn recompute(events: Vec<DrinkEvent>) -> SessionState {
    let total: f64 = events.iter().map(|e| e.bac_contribution).sum();
    let bac = total.max(0.0);

    SessionState {
        hours_until_safe: hours_until_safe(bac),
        events,
        bac,
    }
}

/// Insert or replace an event and recompute the aggregate
///
/// An event whose id is already present replaces that entry in place and
/// inherits its timestamp. A new event is prepended and the oldest entries
/// beyond [`MAX_RETAINED_EVENTS`] are dropped.
pub fn apply_event(mut events: Vec<DrinkEvent>, mut event: DrinkEvent) -> SessionState {
    if let Some(slot) = events.iter_mut().find(|e| e.id == event.id) {
        event.timestamp = slot.timestamp;
        tracing::debug!("Replacing drink event {}", event.id);
        *slot = event;
    } else {
        tracing::debug!("Logging new drink event {}", event.id);
        events.insert(0, event);
        if events.len() > MAX_RETAINED_EVENTS {
            let dropped = events.len() - MAX_RETAINED_EVENTS;
            events.truncate(MAX_RETAINED_EVENTS);
            tracing::debug!("Dropped {} oldest drink event(s)", dropped);
        }
    }

    recompute(events)
}

/// Remove the event with `id`; the caller recomputes
pub fn remove_event(mut events: Vec<DrinkEvent>, id: Uuid) -> Vec<DrinkEvent> {
    events.retain(|e| e.id != id);
    events
}

/// Check a serving amount against the loggable range (0.5 to 10, step 0.5)
pub fn validate_amount(amount: f64) -> Result<f64> {
    let on_step = (amount / AMOUNT_STEP).fract() == 0.0;
    if (AMOUNT_STEP..=MAX_AMOUNT).contains(&amount) && on_step {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}
