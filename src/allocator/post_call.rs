use super::assignment::worked_post_call_tier;
use super::{AllocError, Allocation};
use crate::config::AllocConfig;
use crate::model::Label;

/// Phase 3 : pose PC le lendemain d'une garde à repos, uniquement dans une case vide.
/// Retourne le nombre de PC posés.
pub fn derive_post_call(
    allocation: &mut Allocation,
    config: &AllocConfig,
) -> Result<usize, AllocError> {
    let rows = allocation.doctors().count();
    let mut stamped = 0usize;

    for day in 2..=allocation.days_in_month() {
        for row in 0..rows {
            if allocation.is_free(row, day) && worked_post_call_tier(allocation, row, day, config) {
                allocation.place(row, day, Label::PostCall)?;
                stamped += 1;
            }
        }
    }

    Ok(stamped)
}
