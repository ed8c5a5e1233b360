use std::collections::BTreeMap;

use crate::allocator::AllocationResult;
use crate::model::{Doctor, DoctorId, Team, TierCode};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub doctor: DoctorId,
    pub name: String,
    pub team: Team,
    pub run_points: f64,
    pub total_points: f64,
}

/// Synthèse d'un run : moyenne, volumes par palier, classement.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub average_points: f64,
    pub total_calls: BTreeMap<TierCode, u32>,
    /// Du total le plus élevé au plus bas.
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl RunStatistics {
    pub fn compute(doctors: &[Doctor], result: &AllocationResult) -> Self {
        let mut leaderboard: Vec<LeaderboardEntry> = doctors
            .iter()
            .map(|d| {
                let run_points = result.points_for(&d.id);
                LeaderboardEntry {
                    doctor: d.id.clone(),
                    name: d.name.clone(),
                    team: d.team,
                    run_points,
                    total_points: d.cumulative_points + run_points,
                }
            })
            .collect();
        leaderboard.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));

        let average_points = if leaderboard.is_empty() {
            0.0
        } else {
            leaderboard.iter().map(|e| e.total_points).sum::<f64>() / leaderboard.len() as f64
        };

        let total_calls = result
            .call_counts
            .iter()
            .map(|(tier, per_doc)| (tier.clone(), per_doc.values().sum()))
            .collect();

        Self {
            average_points,
            total_calls,
            leaderboard,
        }
    }

    /// Écart entre le total le plus haut et le plus bas.
    pub fn spread(&self) -> f64 {
        match (self.leaderboard.first(), self.leaderboard.last()) {
            (Some(top), Some(bottom)) => top.total_points - bottom.total_points,
            _ => 0.0,
        }
    }
}
