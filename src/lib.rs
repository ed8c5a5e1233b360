#![forbid(unsafe_code)]
//! Gardes — répartition mensuelle des gardes hospitalières (paliers HO1..HO11).
//!
//! - Moteur glouton déterministe : jour par jour, palier par palier.
//! - Demandes individuelles (AL, CB, CR), repos post-garde, équité par points cumulés.
//! - Contrôle des effectifs minimaux par équipe.
//! - Stockage fichiers (JSON/CSV) hors du moteur ; aucune E/S pendant l'allocation.

pub mod allocator;
pub mod calendar;
pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod points;
pub mod staffing;
pub mod stats;
#[cfg(feature = "serde")]
pub mod storage;

pub use allocator::{
    derive_post_call, seed_requests, AllocError, Allocation, AllocationResult, Allocator,
    UnfilledShift,
};
pub use calendar::{month_days, CalendarError, Day, DayKind, HolidayCalendar, YearMonth};
pub use config::{
    AllocConfig, ConfigError, PointRates, PriorityPredicate, PriorityRule, TierDefinition,
};
#[cfg(feature = "serde")]
pub use config::{export_config_json, load_config_from_file};
pub use model::{Doctor, DoctorId, Label, RequestKind, RequestSet, Roster, Team, TierCode};
pub use points::call_points;
pub use staffing::{staffing_report, Shortfall, StaffingCell, StaffingReport};
pub use stats::{LeaderboardEntry, RunStatistics};
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage};
