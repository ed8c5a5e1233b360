use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::allocator::Allocation;
use crate::calendar::Day;
use crate::model::{Doctor, Team};

/// Effectif présent d'une équipe un jour donné.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StaffingCell {
    pub count: u32,
    pub minimum: u32,
    pub sufficient: bool,
}

/// Jour où une équipe passe sous son minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub day: u32,
    pub team: Team,
    pub count: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct StaffingReport(BTreeMap<u32, BTreeMap<Team, StaffingCell>>);

impl StaffingReport {
    pub fn get(&self, day: u32, team: Team) -> Option<&StaffingCell> {
        self.0.get(&day).and_then(|teams| teams.get(&team))
    }

    pub fn day(&self, day: u32) -> Option<&BTreeMap<Team, StaffingCell>> {
        self.0.get(&day)
    }

    pub fn shortfalls(&self) -> Vec<Shortfall> {
        self.0
            .iter()
            .flat_map(|(day, teams)| {
                teams
                    .iter()
                    .filter(|(_, cell)| !cell.sufficient)
                    .map(move |(team, cell)| Shortfall {
                        day: *day,
                        team: *team,
                        count: cell.count,
                        minimum: cell.minimum,
                    })
            })
            .collect()
    }

    pub fn is_sufficient(&self) -> bool {
        self.0
            .values()
            .all(|teams| teams.values().all(|cell| cell.sufficient))
    }
}

/// Compte, par jour et par équipe, les médecins hors AL/PC/CB.
/// Une case vide ou une garde compte comme présence.
pub fn staffing_report(
    allocation: &Allocation,
    doctors: &[Doctor],
    days: &[Day],
    minimums: &BTreeMap<Team, u32>,
) -> StaffingReport {
    let mut report = BTreeMap::new();
    for day in days {
        let per_team = minimums
            .iter()
            .map(|(team, minimum)| {
                let count = doctors
                    .iter()
                    .filter(|d| d.team == *team)
                    .filter(|d| {
                        !allocation
                            .get(&d.id, day.date)
                            .map_or(false, |label| label.is_absence())
                    })
                    .count() as u32;
                let cell = StaffingCell {
                    count,
                    minimum: *minimum,
                    sufficient: count >= *minimum,
                };
                (*team, cell)
            })
            .collect();
        report.insert(day.date, per_team);
    }
    StaffingReport(report)
}
