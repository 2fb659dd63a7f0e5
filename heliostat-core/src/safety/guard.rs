//! Coil-safety guard
//!
//! A unipolar stepper holding position draws full winding current and
//! heats up. The guard releases all windings after every completed move
//! or reset, and on controller start-up.

use crate::state::CycleState;
use crate::traits::CoilOutputs;

/// Winding status after a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardStatus {
    /// All windings released (or energized only while moving)
    Secured,
    /// Windings still powered in a state that does not allow it
    Energized,
}

/// Coil-safety guard
#[derive(Debug, Clone, Default)]
pub struct CoilGuard {
    /// Number of times the windings were released
    releases: u32,
}

impl CoilGuard {
    /// Create a new guard
    pub fn new() -> Self {
        Self { releases: 0 }
    }

    /// Release every winding
    ///
    /// Call after the driver reports the move complete, never during.
    pub fn secure<C: CoilOutputs>(&mut self, coils: &mut C) -> GuardStatus {
        coils.de_energize();
        self.releases = self.releases.wrapping_add(1);

        if coils.is_energized() {
            GuardStatus::Energized
        } else {
            GuardStatus::Secured
        }
    }

    /// Check the windings against what the current state allows
    pub fn check<C: CoilOutputs>(&self, state: CycleState, coils: &C) -> GuardStatus {
        if coils.is_energized() && !state.coils_allowed() {
            GuardStatus::Energized
        } else {
            GuardStatus::Secured
        }
    }

    /// Number of releases performed so far
    pub fn release_count(&self) -> u32 {
        self.releases
    }
}
