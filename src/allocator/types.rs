use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::calendar::{CalendarError, Day};
use crate::config::ConfigError;
use crate::model::{Doctor, DoctorId, Label, TierCode};
use crate::staffing::StaffingReport;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid month: {0}")]
    Calendar(#[from] CalendarError),
    #[error("duplicate doctor id: {0}")]
    DuplicateDoctor(DoctorId),
    #[error("invalid cumulative points for doctor {doctor}: {value}")]
    InvalidPoints { doctor: DoctorId, value: f64 },
    #[error("days must be contiguous from 1: expected day {expected}, found {found}")]
    NonContiguousDays { expected: u32, found: u32 },
    #[error("cell already holds {existing} for doctor {doctor} on day {day}")]
    CellOccupied {
        doctor: DoctorId,
        day: u32,
        existing: Label,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Allocation médecin × jour. Une ligne par médecin (ordre du roster),
/// chaque ligne est indexée directement par le numéro de jour (case 0 inutilisée).
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    days: u32,
    rows: Vec<(DoctorId, Vec<Option<Label>>)>,
    index: HashMap<DoctorId, usize>,
}

impl Allocation {
    pub fn new(doctors: &[Doctor], days: u32) -> Self {
        let rows: Vec<_> = doctors
            .iter()
            .map(|d| (d.id.clone(), vec![None; days as usize + 1]))
            .collect();
        let index = rows
            .iter()
            .enumerate()
            .map(|(row, (id, _))| (id.clone(), row))
            .collect();
        Self { days, rows, index }
    }

    pub fn days_in_month(&self) -> u32 {
        self.days
    }

    pub fn doctors(&self) -> impl Iterator<Item = &DoctorId> + '_ {
        self.rows.iter().map(|(id, _)| id)
    }

    pub fn get(&self, doctor: &DoctorId, day: u32) -> Option<&Label> {
        self.row_of(doctor).and_then(|row| self.cell(row, day))
    }

    /// Cases remplies d'un médecin, jour croissant.
    pub fn row(&self, doctor: &DoctorId) -> Vec<(u32, &Label)> {
        self.row_of(doctor)
            .map(|row| {
                self.rows[row]
                    .1
                    .iter()
                    .enumerate()
                    .filter_map(|(day, cell)| cell.as_ref().map(|l| (day as u32, l)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DoctorId, u32, &Label)> + '_ {
        self.rows.iter().flat_map(|(id, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(day, cell)| cell.as_ref().map(|l| (id, day as u32, l)))
        })
    }

    /// Nombre de cases portant ce label.
    pub fn count_label(&self, label: &Label) -> usize {
        self.iter().filter(|(_, _, l)| *l == label).count()
    }

    pub(crate) fn row_of(&self, doctor: &DoctorId) -> Option<usize> {
        self.index.get(doctor).copied()
    }

    pub(crate) fn cell(&self, row: usize, day: u32) -> Option<&Label> {
        self.rows
            .get(row)
            .and_then(|(_, cells)| cells.get(day as usize))
            .and_then(Option::as_ref)
    }

    pub(crate) fn is_free(&self, row: usize, day: u32) -> bool {
        self.cell(row, day).is_none()
    }

    /// Pose un label dans une case vide. Reposer le même label est sans effet.
    pub(crate) fn place(&mut self, row: usize, day: u32, label: Label) -> Result<(), AllocError> {
        let (id, cells) = &mut self.rows[row];
        let cell = &mut cells[day as usize];
        if let Some(existing) = cell {
            if *existing == label {
                return Ok(());
            }
            return Err(AllocError::CellOccupied {
                doctor: id.clone(),
                day,
                existing: existing.clone(),
            });
        }
        *cell = Some(label);
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Allocation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (id, _) in &self.rows {
            let cells: BTreeMap<u32, &Label> = self.row(id).into_iter().collect();
            map.serialize_entry(id, &cells)?;
        }
        map.end()
    }
}

/// Couple (jour, palier) resté sans titulaire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnfilledShift {
    pub day: u32,
    pub tier: TierCode,
}

/// Résultat complet d'un run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AllocationResult {
    pub days: Vec<Day>,
    pub allocation: Allocation,
    /// Points gagnés pendant ce run uniquement.
    pub call_points: BTreeMap<DoctorId, f64>,
    pub call_counts: BTreeMap<TierCode, BTreeMap<DoctorId, u32>>,
    pub unfilled: Vec<UnfilledShift>,
    pub staffing: StaffingReport,
}

impl AllocationResult {
    pub fn points_for(&self, doctor: &DoctorId) -> f64 {
        self.call_points.get(doctor).copied().unwrap_or(0.0)
    }

    pub fn count_for(&self, tier: &TierCode, doctor: &DoctorId) -> u32 {
        self.call_counts
            .get(tier)
            .and_then(|per_doc| per_doc.get(doctor))
            .copied()
            .unwrap_or(0)
    }

    /// Titulaire d'un palier un jour donné.
    pub fn assignee(&self, day: u32, tier: &TierCode) -> Option<&DoctorId> {
        let wanted = Label::Tier(tier.clone());
        self.allocation
            .doctors()
            .find(|id| self.allocation.get(id, day) == Some(&wanted))
    }
}
