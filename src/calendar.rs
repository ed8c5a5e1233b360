use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("month index must be in 0..=11, got {0}")]
    InvalidMonth(u32),
    #[error("year out of supported range: {0}")]
    InvalidYear(i32),
}

/// Mois cible ; `month0` est l'index zéro-basé (0 = janvier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct YearMonth {
    year: i32,
    month0: u32,
}

impl YearMonth {
    pub fn new(year: i32, month0: u32) -> Result<Self, CalendarError> {
        if month0 > 11 {
            return Err(CalendarError::InvalidMonth(month0));
        }
        if NaiveDate::from_ymd_opt(year, month0 + 1, 1).is_none() {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month0 })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn first_day(&self) -> NaiveDate {
        // validé dans `new`
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Dernier quantième valide du mois, y compris en fin de plage chrono.
    pub fn days_in_month(&self) -> u32 {
        (28..=31)
            .rev()
            .find(|&d| NaiveDate::from_ymd_opt(self.year, self.month0 + 1, d).is_some())
            .unwrap_or(28)
    }
}

/// Classe de jour utilisée pour la valorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DayKind {
    MonThu,
    Friday,
    Saturday,
    Sunday,
}

impl DayKind {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Fri => DayKind::Friday,
            Weekday::Sat => DayKind::Saturday,
            Weekday::Sun => DayKind::Sunday,
            _ => DayKind::MonThu,
        }
    }
}

/// Descripteur d'un jour du mois.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Day {
    /// Numéro du jour dans le mois (1-basé).
    pub date: u32,
    pub full_date: NaiveDate,
    pub kind: DayKind,
    pub is_weekend: bool,
    pub holiday: Option<String>,
}

impl Day {
    pub fn is_public_holiday(&self) -> bool {
        self.holiday.is_some()
    }

    /// Jour de semaine façon 0 = dimanche .. 6 = samedi.
    pub fn day_of_week(&self) -> u32 {
        self.full_date.weekday().num_days_from_sunday()
    }
}

/// Table date → nom des jours fériés.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct HolidayCalendar(BTreeMap<NaiveDate, String>);

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, date: NaiveDate, name: S) -> Option<String> {
        self.0.insert(date, name.into())
    }

    pub fn with<S: Into<String>>(mut self, date: NaiveDate, name: S) -> Self {
        self.insert(date, name);
        self
    }

    pub fn name_of(&self, date: NaiveDate) -> Option<&str> {
        self.0.get(&date).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &str)> + '_ {
        self.0.iter().map(|(d, n)| (d, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Déroule un mois en descripteurs de jours, dans l'ordre croissant.
pub fn month_days(month: YearMonth, holidays: &HolidayCalendar) -> Vec<Day> {
    (1..=month.days_in_month())
        .filter_map(|d| NaiveDate::from_ymd_opt(month.year(), month.month0() + 1, d))
        .map(|date| {
            let weekday = date.weekday();
            Day {
                date: date.day(),
                full_date: date,
                kind: DayKind::from_weekday(weekday),
                is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
                holiday: holidays.name_of(date).map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_month_out_of_range() {
        assert_eq!(YearMonth::new(2025, 12), Err(CalendarError::InvalidMonth(12)));
        assert!(YearMonth::new(2025, 11).is_ok());
    }

    #[test]
    fn month_lengths() {
        let len = |y, m| YearMonth::new(y, m).unwrap().days_in_month();
        assert_eq!(len(2025, 0), 31);
        assert_eq!(len(2024, 1), 29);
        assert_eq!(len(2025, 1), 28);
        assert_eq!(len(2025, 3), 30);
        assert_eq!(len(2025, 11), 31);
    }

    #[test]
    fn last_supported_december_keeps_its_31st() {
        let month = YearMonth::new(NaiveDate::MAX.year(), 11).unwrap();
        assert_eq!(month.days_in_month(), 31);

        let days = month_days(month, &HolidayCalendar::new());
        assert_eq!(days.len(), 31);
        assert_eq!(days.last().map(|d| d.full_date), Some(NaiveDate::MAX));
    }

    #[test]
    fn classifies_weekdays_and_holidays() {
        let holidays = HolidayCalendar::new().with(
            NaiveDate::from_ymd_opt(2025, 8, 9).unwrap(),
            "National Day",
        );
        let days = month_days(YearMonth::new(2025, 7).unwrap(), &holidays);
        assert_eq!(days.len(), 31);
        assert!(days.iter().enumerate().all(|(i, d)| d.date == i as u32 + 1));

        // 1er août 2025 : vendredi
        assert_eq!(days[0].kind, DayKind::Friday);
        assert_eq!(days[0].day_of_week(), 5);
        assert!(!days[0].is_weekend);
        assert_eq!(days[1].kind, DayKind::Saturday);
        assert!(days[1].is_weekend);
        assert_eq!(days[2].kind, DayKind::Sunday);
        assert_eq!(days[2].day_of_week(), 0);
        assert_eq!(days[3].kind, DayKind::MonThu);

        assert_eq!(days[8].holiday.as_deref(), Some("National Day"));
        assert!(days.iter().filter(|d| d.is_public_holiday()).count() == 1);
    }
}
