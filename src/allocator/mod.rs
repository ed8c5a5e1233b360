mod assignment;
mod post_call;
mod seed;
mod types;

pub use post_call::derive_post_call;
pub use seed::seed_requests;
pub use types::{AllocError, Allocation, AllocationResult, UnfilledShift};

use std::collections::HashSet;

use crate::calendar::{month_days, Day, YearMonth};
use crate::config::AllocConfig;
use crate::model::{Doctor, RequestSet};
use crate::staffing;

/// Allocator : moteur glouton jour par jour, palier par palier.
/// Ne garde aucun état entre deux runs.
#[derive(Debug, Clone, Copy)]
pub struct Allocator<'a> {
    config: &'a AllocConfig,
}

impl<'a> Allocator<'a> {
    /// Valide la configuration une fois pour toutes.
    pub fn new(config: &'a AllocConfig) -> Result<Self, AllocError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AllocConfig {
        self.config
    }

    /// Alloue un mois complet.
    pub fn allocate(
        &self,
        doctors: &[Doctor],
        requests: &RequestSet,
        month: YearMonth,
    ) -> Result<AllocationResult, AllocError> {
        let days = month_days(month, &self.config.holidays);
        self.allocate_days(doctors, requests, days)
    }

    /// Alloue une séquence de jours consécutifs commençant au jour 1.
    pub fn allocate_days(
        &self,
        doctors: &[Doctor],
        requests: &RequestSet,
        days: Vec<Day>,
    ) -> Result<AllocationResult, AllocError> {
        validate_doctors(doctors)?;
        validate_days(&days)?;
        warn_unknown_requesters(doctors, requests);

        let tiers = self.config.enabled_tiers();
        let mut allocation = Allocation::new(doctors, days.len() as u32);
        let mut ledger = assignment::RunLedger::new(doctors.len(), &tiers);

        let seeded = seed_requests(&mut allocation, doctors, requests)?;
        let unfilled = assignment::assign_calls(
            &mut allocation,
            doctors,
            requests,
            &days,
            self.config,
            &tiers,
            &mut ledger,
        )?;
        let post_calls = derive_post_call(&mut allocation, self.config)?;

        let staffing = staffing::staffing_report(
            &allocation,
            doctors,
            &days,
            &self.config.minimum_staffing,
        );

        tracing::info!(
            doctors = doctors.len(),
            days = days.len(),
            seeded,
            post_calls,
            unfilled = unfilled.len(),
            shortfalls = staffing.shortfalls().len(),
            "allocation complete"
        );

        Ok(AllocationResult {
            call_points: ledger.call_points(doctors),
            call_counts: ledger.call_counts(doctors),
            days,
            allocation,
            unfilled,
            staffing,
        })
    }
}

fn validate_doctors(doctors: &[Doctor]) -> Result<(), AllocError> {
    let mut seen = HashSet::new();
    for doctor in doctors {
        if !seen.insert(&doctor.id) {
            return Err(AllocError::DuplicateDoctor(doctor.id.clone()));
        }
        if !doctor.cumulative_points.is_finite() || doctor.cumulative_points < 0.0 {
            return Err(AllocError::InvalidPoints {
                doctor: doctor.id.clone(),
                value: doctor.cumulative_points,
            });
        }
    }
    Ok(())
}

fn validate_days(days: &[Day]) -> Result<(), AllocError> {
    for (expected, day) in (1u32..).zip(days) {
        if day.date != expected {
            return Err(AllocError::NonContiguousDays {
                expected,
                found: day.date,
            });
        }
    }
    Ok(())
}

fn warn_unknown_requesters(doctors: &[Doctor], requests: &RequestSet) {
    let known: HashSet<_> = doctors.iter().map(|d| &d.id).collect();
    let mut reported = HashSet::new();
    for (doctor, _, _) in requests.iter() {
        if !known.contains(doctor) && reported.insert(doctor) {
            tracing::warn!(doctor = %doctor, "requests for unknown doctor ignored");
        }
    }
}
