use std::collections::BTreeMap;

use super::{AllocError, Allocation, UnfilledShift};
use crate::calendar::Day;
use crate::config::{AllocConfig, PriorityPredicate, TierDefinition};
use crate::model::{Doctor, DoctorId, Label, RequestKind, RequestSet, TierCode};
use crate::points;

/// Compteurs du run, indexés par ligne de l'allocation.
#[derive(Debug, Clone)]
pub(super) struct RunLedger {
    points: Vec<f64>,
    counts: BTreeMap<TierCode, Vec<u32>>,
}

impl RunLedger {
    pub(super) fn new(doctors: usize, tiers: &[&TierDefinition]) -> Self {
        Self {
            points: vec![0.0; doctors],
            counts: tiers
                .iter()
                .map(|t| (t.code.clone(), vec![0; doctors]))
                .collect(),
        }
    }

    fn record(&mut self, row: usize, tier: &TierCode, points: f64) {
        self.points[row] += points;
        if let Some(per_row) = self.counts.get_mut(tier) {
            per_row[row] += 1;
        }
    }

    pub(super) fn call_points(&self, doctors: &[Doctor]) -> BTreeMap<DoctorId, f64> {
        doctors
            .iter()
            .zip(&self.points)
            .map(|(d, p)| (d.id.clone(), *p))
            .collect()
    }

    pub(super) fn call_counts(
        &self,
        doctors: &[Doctor],
    ) -> BTreeMap<TierCode, BTreeMap<DoctorId, u32>> {
        self.counts
            .iter()
            .map(|(tier, per_row)| {
                let per_doc = doctors
                    .iter()
                    .zip(per_row)
                    .map(|(d, c)| (d.id.clone(), *c))
                    .collect();
                (tier.clone(), per_doc)
            })
            .collect()
    }
}

/// Phase 2 : pour chaque jour puis chaque palier actif, affecte le meilleur candidat.
pub(super) fn assign_calls(
    allocation: &mut Allocation,
    doctors: &[Doctor],
    requests: &RequestSet,
    days: &[Day],
    config: &AllocConfig,
    tiers: &[&TierDefinition],
    ledger: &mut RunLedger,
) -> Result<Vec<UnfilledShift>, AllocError> {
    let mut unfilled = Vec::new();

    for day in days {
        for tier in tiers {
            let available = available_rows(allocation, doctors.len(), day.date, config);
            if available.is_empty() {
                tracing::warn!(
                    day = day.date,
                    tier = %tier.code,
                    "no doctor available, shift left unfilled"
                );
                unfilled.push(UnfilledShift {
                    day: day.date,
                    tier: tier.code.clone(),
                });
                continue;
            }

            let requesters: Vec<usize> = available
                .iter()
                .copied()
                .filter(|&row| {
                    requests.get(&doctors[row].id, day.date) == Some(RequestKind::CallRequest)
                })
                .collect();
            let candidates = if requesters.is_empty() {
                available
            } else {
                requesters
            };

            let ranked = rank_candidates(
                candidates,
                doctors,
                |row| doctors[row].cumulative_points + ledger.points[row],
                tier.priority.as_ref().map(|p| p as &dyn PriorityPredicate),
            );

            if let Some(&row) = ranked.first() {
                let earned = points::call_points(config, &tier.code, day);
                allocation.place(row, day.date, Label::Tier(tier.code.clone()))?;
                ledger.record(row, &tier.code, earned);
                tracing::debug!(
                    day = day.date,
                    tier = %tier.code,
                    doctor = %doctors[row].id,
                    points = earned,
                    "shift assigned"
                );
            }
        }
    }

    Ok(unfilled)
}

/// Lignes libres ce jour-là et non sorties d'une garde à repos la veille.
fn available_rows(
    allocation: &Allocation,
    rows: usize,
    day: u32,
    config: &AllocConfig,
) -> Vec<usize> {
    (0..rows)
        .filter(|&row| allocation.is_free(row, day))
        .filter(|&row| !worked_post_call_tier(allocation, row, day, config))
        .collect()
}

pub(super) fn worked_post_call_tier(
    allocation: &Allocation,
    row: usize,
    day: u32,
    config: &AllocConfig,
) -> bool {
    if day <= 1 {
        return false;
    }
    allocation
        .cell(row, day - 1)
        .and_then(Label::tier_code)
        .map_or(false, |code| config.is_post_call(code))
}

/// Tri d'équité (total le plus bas d'abord, puis ordre du roster), puis
/// remontée en bloc des candidats préférés par le palier.
fn rank_candidates<F>(
    mut candidates: Vec<usize>,
    doctors: &[Doctor],
    total: F,
    priority: Option<&dyn PriorityPredicate>,
) -> Vec<usize>
where
    F: Fn(usize) -> f64,
{
    candidates.sort_by(|&a, &b| total(a).total_cmp(&total(b)).then(a.cmp(&b)));

    match priority {
        Some(rule) => {
            let (mut preferred, rest): (Vec<usize>, Vec<usize>) = candidates
                .into_iter()
                .partition(|&row| rule.prefers(&doctors[row]));
            preferred.extend(rest);
            preferred
        }
        None => candidates,
    }
}
