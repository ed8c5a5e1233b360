use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifiant fort pour Doctor
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DoctorId(String);

impl DoctorId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what}: {value}")]
pub struct ParseLabelError {
    what: &'static str,
    value: String,
}

impl ParseLabelError {
    fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

/// Équipes chirurgicales d'affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Team {
    Nes,
    Vas,
    Clr,
    Esu,
    Pras,
    Hpb,
    Ugi,
    Bes,
    Uro,
}

impl Team {
    pub const ALL: [Team; 9] = [
        Team::Nes,
        Team::Vas,
        Team::Clr,
        Team::Esu,
        Team::Pras,
        Team::Hpb,
        Team::Ugi,
        Team::Bes,
        Team::Uro,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Team::Nes => "NES",
            Team::Vas => "VAS",
            Team::Clr => "CLR",
            Team::Esu => "ESU",
            Team::Pras => "PRAS",
            Team::Hpb => "HPB",
            Team::Ugi => "UGI",
            Team::Bes => "BES",
            Team::Uro => "URO",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Team::Nes => "Neurosurgery",
            Team::Vas => "Vascular",
            Team::Clr => "Colorectal",
            Team::Esu => "Emergency Surgical Unit",
            Team::Pras => "Plastic Surgery",
            Team::Hpb => "Hepatobiliary",
            Team::Ugi => "Upper GI",
            Team::Bes => "Breast/Endocrine",
            Team::Uro => "Urology",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Team {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Team::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLabelError::new("team", s))
    }
}

/// Médecin du pool de gardes. Jamais modifié par le moteur.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub team: Team,
    /// Points reportés des périodes précédentes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cumulative_points: f64,
}

impl Doctor {
    pub fn new<I: AsRef<str>, N: Into<String>>(
        id: I,
        name: N,
        team: Team,
        cumulative_points: f64,
    ) -> Self {
        Self {
            id: DoctorId::new(id),
            name: name.into(),
            team,
            cumulative_points,
        }
    }
}

/// Code de palier de garde ("HO1", "HO2", ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TierCode(String);

impl TierCode {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Codes déjà pris par les étiquettes de cellule et les demandes.
    pub const RESERVED: [&str; 4] = ["PC", "AL", "CB", "CR"];

    pub fn is_reserved(&self) -> bool {
        Self::RESERVED
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&self.0))
    }

    /// Non vide, ASCII alphanumérique, `_` ou `-` uniquement.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl fmt::Display for TierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Demande individuelle pour un jour donné.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RequestKind {
    /// Congé annuel
    #[cfg_attr(feature = "serde", serde(rename = "AL"))]
    AnnualLeave,
    /// Refus de garde ce jour-là
    #[cfg_attr(feature = "serde", serde(rename = "CB"))]
    CallBlock,
    /// Volontaire pour une garde ce jour-là
    #[cfg_attr(feature = "serde", serde(rename = "CR"))]
    CallRequest,
}

impl RequestKind {
    pub fn code(self) -> &'static str {
        match self {
            RequestKind::AnnualLeave => "AL",
            RequestKind::CallBlock => "CB",
            RequestKind::CallRequest => "CR",
        }
    }

    /// Label posé d'office dans l'allocation (AL/CB), `None` pour CR.
    pub fn seeded_label(self) -> Option<Label> {
        match self {
            RequestKind::AnnualLeave => Some(Label::AnnualLeave),
            RequestKind::CallBlock => Some(Label::CallBlock),
            RequestKind::CallRequest => None,
        }
    }
}

impl FromStr for RequestKind {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AL" => Ok(RequestKind::AnnualLeave),
            "CB" => Ok(RequestKind::CallBlock),
            "CR" => Ok(RequestKind::CallRequest),
            _ => Err(ParseLabelError::new("request kind", s)),
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Contenu d'une case (médecin, jour) de l'allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "String", try_from = "String")
)]
pub enum Label {
    Tier(TierCode),
    PostCall,
    AnnualLeave,
    CallBlock,
}

impl Label {
    pub fn tier<S: AsRef<str>>(code: S) -> Self {
        Label::Tier(TierCode::new(code))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Tier(code) => code.as_str(),
            Label::PostCall => "PC",
            Label::AnnualLeave => "AL",
            Label::CallBlock => "CB",
        }
    }

    pub fn tier_code(&self) -> Option<&TierCode> {
        match self {
            Label::Tier(code) => Some(code),
            _ => None,
        }
    }

    /// AL, PC et CB retirent le médecin de l'effectif présent.
    pub fn is_absence(&self) -> bool {
        matches!(self, Label::PostCall | Label::AnnualLeave | Label::CallBlock)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ParseLabelError::new("label", s)),
            "PC" => Ok(Label::PostCall),
            "AL" => Ok(Label::AnnualLeave),
            "CB" => Ok(Label::CallBlock),
            code => {
                let tier = TierCode::new(code);
                if tier.is_reserved() || !tier.is_well_formed() {
                    return Err(ParseLabelError::new("label", s));
                }
                Ok(Label::Tier(tier))
            }
        }
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.as_str().to_string()
    }
}

impl TryFrom<String> for Label {
    type Error = ParseLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Demandes par médecin puis par numéro de jour (au plus une par couple).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RequestSet(BTreeMap<DoctorId, BTreeMap<u32, RequestKind>>);

impl RequestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace toute demande existante pour ce couple (médecin, jour).
    pub fn insert(&mut self, doctor: DoctorId, day: u32, kind: RequestKind) -> Option<RequestKind> {
        self.0.entry(doctor).or_default().insert(day, kind)
    }

    pub fn remove(&mut self, doctor: &DoctorId, day: u32) -> Option<RequestKind> {
        let days = self.0.get_mut(doctor)?;
        let removed = days.remove(&day);
        if days.is_empty() {
            self.0.remove(doctor);
        }
        removed
    }

    pub fn get(&self, doctor: &DoctorId, day: u32) -> Option<RequestKind> {
        self.0.get(doctor).and_then(|days| days.get(&day)).copied()
    }

    pub fn for_doctor(&self, doctor: &DoctorId) -> impl Iterator<Item = (u32, RequestKind)> + '_ {
        self.0
            .get(doctor)
            .into_iter()
            .flat_map(|days| days.iter().map(|(d, k)| (*d, *k)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DoctorId, u32, RequestKind)> + '_ {
        self.0
            .iter()
            .flat_map(|(doc, days)| days.iter().map(move |(d, k)| (doc, *d, *k)))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Pool complet : médecins (ordre significatif) et demandes du mois.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roster {
    pub doctors: Vec<Doctor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requests: RequestSet,
}

impl Roster {
    pub fn find_doctor_by_id<'a>(&'a self, id: &DoctorId) -> Option<&'a Doctor> {
        self.doctors.iter().find(|d| &d.id == id)
    }
    pub fn find_doctor_mut_by_id(&mut self, id: &DoctorId) -> Option<&mut Doctor> {
        self.doctors.iter_mut().find(|d| &d.id == id)
    }

    /// Ajoute ou remplace (même id) des médecins, en conservant l'ordre d'arrivée.
    pub fn upsert_doctors(&mut self, doctors: Vec<Doctor>) {
        for doctor in doctors {
            match self.find_doctor_mut_by_id(&doctor.id) {
                Some(existing) => *existing = doctor,
                None => self.doctors.push(doctor),
            }
        }
    }

    /// Reporte les points gagnés pendant un run dans les points cumulés.
    /// Retourne les ids inconnus du roster (ignorés).
    pub fn apply_call_points<'a, I>(&mut self, call_points: I) -> Vec<DoctorId>
    where
        I: IntoIterator<Item = (&'a DoctorId, &'a f64)>,
    {
        let mut unknown = Vec::new();
        for (id, points) in call_points {
            match self.find_doctor_mut_by_id(id) {
                Some(doctor) => doctor.cumulative_points += *points,
                None => unknown.push(id.clone()),
            }
        }
        unknown
    }
}
