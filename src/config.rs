//! Configuration immuable passée au moteur : paliers, barèmes, effectifs minimaux, jours fériés.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::HolidayCalendar;
use crate::model::{Doctor, Team, TierCode};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("configuration must define at least one tier")]
    NoTiers,
    #[error("tier code cannot be empty")]
    EmptyTierCode,
    #[error("tier code {0} is reserved for cell labels")]
    ReservedTierCode(TierCode),
    #[error("tier code {0} must be ASCII letters, digits, '_' or '-'")]
    MalformedTierCode(TierCode),
    #[error("duplicate tier code: {0}")]
    DuplicateTierCode(TierCode),
    #[error("duplicate tier rank {rank} ({code})")]
    DuplicateRank { code: TierCode, rank: u16 },
    #[error("invalid point rate for tier {code}: {value}")]
    InvalidRate { code: TierCode, value: f64 },
}

/// Barème de points par classe de jour. Les fériés suivent le taux du samedi.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointRates {
    pub mon_thu: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
}

impl PointRates {
    pub const fn new(mon_thu: f64, friday: f64, saturday: f64, sunday: f64) -> Self {
        Self {
            mon_thu,
            friday,
            saturday,
            sunday,
        }
    }

    fn values(&self) -> [f64; 4] {
        [self.mon_thu, self.friday, self.saturday, self.sunday]
    }
}

/// Capacité "priorité d'équipe" attachable à un palier.
pub trait PriorityPredicate {
    /// `true` si le médecin doit passer devant les autres candidats.
    fn prefers(&self, doctor: &Doctor) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", content = "value", rename_all = "snake_case")
)]
pub enum PriorityRule {
    /// Les membres de l'équipe passent en tête, ordre d'équité conservé.
    Team(Team),
}

impl PriorityPredicate for PriorityRule {
    fn prefers(&self, doctor: &Doctor) -> bool {
        match self {
            PriorityRule::Team(team) => doctor.team == *team,
        }
    }
}

/// Définition d'un palier de garde (HO1..HO11).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TierDefinition {
    pub code: TierCode,
    /// Ordre de traitement dans la journée, croissant.
    pub rank: u16,
    #[cfg_attr(feature = "serde", serde(default = "default_enabled"))]
    pub enabled: bool,
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Impose un repos (PC) le lendemain.
    #[cfg_attr(feature = "serde", serde(default))]
    pub post_call: bool,
    pub rates: PointRates,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Option<PriorityRule>,
}

#[cfg(feature = "serde")]
fn default_enabled() -> bool {
    true
}

impl TierDefinition {
    pub fn new<C: AsRef<str>>(code: C, rank: u16, rates: PointRates) -> Self {
        let code = TierCode::new(code);
        Self {
            label: code.as_str().to_string(),
            code,
            rank,
            enabled: true,
            description: String::new(),
            post_call: false,
            rates,
            priority: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_post_call(mut self, post_call: bool) -> Self {
        self.post_call = post_call;
        self
    }

    pub fn with_priority(mut self, rule: PriorityRule) -> Self {
        self.priority = Some(rule);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Configuration complète d'un run d'allocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocConfig {
    pub tiers: Vec<TierDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub minimum_staffing: BTreeMap<Team, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holidays: HolidayCalendar,
}

impl Default for AllocConfig {
    fn default() -> Self {
        let call = PointRates::new(1.0, 1.5, 2.5, 2.0);
        let handover = PointRates::new(0.5, 0.75, 1.25, 1.0);
        let tiers = vec![
            TierDefinition::new("HO1", 1, call)
                .with_description("Active On-Call")
                .with_post_call(true)
                .with_priority(PriorityRule::Team(Team::Esu)),
            TierDefinition::new("HO2", 2, call)
                .with_description("Passive On-Call")
                .with_post_call(true),
            TierDefinition::new("HO3", 3, handover).with_description("Handover HO"),
        ];

        let minimum_staffing = [
            (Team::Nes, 2),
            (Team::Vas, 2),
            (Team::Clr, 2),
            (Team::Esu, 3),
            (Team::Pras, 1),
            (Team::Hpb, 1),
            (Team::Ugi, 2),
            (Team::Bes, 1),
            (Team::Uro, 2),
        ]
        .into_iter()
        .collect();

        let mut holidays = HolidayCalendar::new();
        for (y, m, d, name) in [
            (2025, 8, 9, "National Day"),
            (2025, 12, 25, "Christmas"),
            (2026, 1, 1, "New Year"),
        ] {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                holidays.insert(date, name);
            }
        }

        Self {
            tiers,
            minimum_staffing,
            holidays,
        }
    }
}

impl AllocConfig {
    pub fn new(tiers: Vec<TierDefinition>) -> Self {
        Self {
            tiers,
            minimum_staffing: BTreeMap::new(),
            holidays: HolidayCalendar::new(),
        }
    }

    pub fn with_minimum(mut self, team: Team, minimum: u32) -> Self {
        self.minimum_staffing.insert(team, minimum);
        self
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        let mut codes = HashSet::new();
        let mut ranks = HashSet::new();
        for tier in &self.tiers {
            if tier.code.as_str().is_empty() {
                return Err(ConfigError::EmptyTierCode);
            }
            if tier.code.is_reserved() {
                return Err(ConfigError::ReservedTierCode(tier.code.clone()));
            }
            if !tier.code.is_well_formed() {
                return Err(ConfigError::MalformedTierCode(tier.code.clone()));
            }
            if !codes.insert(&tier.code) {
                return Err(ConfigError::DuplicateTierCode(tier.code.clone()));
            }
            if !ranks.insert(tier.rank) {
                return Err(ConfigError::DuplicateRank {
                    code: tier.code.clone(),
                    rank: tier.rank,
                });
            }
            if let Some(value) = tier
                .rates
                .values()
                .into_iter()
                .find(|v| !v.is_finite() || *v < 0.0)
            {
                return Err(ConfigError::InvalidRate {
                    code: tier.code.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn tier(&self, code: &TierCode) -> Option<&TierDefinition> {
        self.tiers.iter().find(|t| &t.code == code)
    }

    /// Paliers actifs, triés par rang.
    pub fn enabled_tiers(&self) -> Vec<&TierDefinition> {
        let mut tiers: Vec<&TierDefinition> = self.tiers.iter().filter(|t| t.enabled).collect();
        tiers.sort_by_key(|t| t.rank);
        tiers
    }

    pub fn is_post_call(&self, code: &TierCode) -> bool {
        self.tier(code).map_or(false, |t| t.post_call)
    }
}

#[cfg(feature = "serde")]
mod file {
    use super::AllocConfig;
    use anyhow::{Context, Result};
    use std::fs;
    use std::path::Path;

    /// Charge et valide une configuration JSON.
    pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<AllocConfig> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: AllocConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn export_config_json<P: AsRef<Path>>(path: P, config: &AllocConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
pub use file::{export_config_json, load_config_from_file};
