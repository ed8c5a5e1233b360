use super::{AllocError, Allocation};
use crate::model::{Doctor, RequestSet};

/// Phase 1 : pose AL et CB dans l'allocation. Les CR ne sont pas posées.
/// Retourne le nombre de cases concernées ; rejouer la phase ne change rien.
pub fn seed_requests(
    allocation: &mut Allocation,
    doctors: &[Doctor],
    requests: &RequestSet,
) -> Result<usize, AllocError> {
    let last_day = allocation.days_in_month();
    let mut seeded = 0usize;

    for doctor in doctors {
        let Some(row) = allocation.row_of(&doctor.id) else {
            continue;
        };
        for (day, kind) in requests.for_doctor(&doctor.id) {
            if day == 0 || day > last_day {
                tracing::warn!(doctor = %doctor.id, day, kind = %kind, "request outside month ignored");
                continue;
            }
            if let Some(label) = kind.seeded_label() {
                allocation.place(row, day, label)?;
                seeded += 1;
            }
        }
    }

    Ok(seeded)
}
