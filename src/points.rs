use crate::calendar::{Day, DayKind};
use crate::config::{AllocConfig, PointRates};
use crate::model::TierCode;

/// Valeur d'un jour selon le barème ; férié = samedi.
pub fn rate_for_day(rates: &PointRates, day: &Day) -> f64 {
    if day.is_public_holiday() {
        return rates.saturday;
    }
    match day.kind {
        DayKind::Saturday => rates.saturday,
        DayKind::Sunday => rates.sunday,
        DayKind::Friday => rates.friday,
        DayKind::MonThu => rates.mon_thu,
    }
}

/// Points gagnés pour une garde `tier` le jour `day`. 0 si le palier est inconnu.
pub fn call_points(config: &AllocConfig, tier: &TierCode, day: &Day) -> f64 {
    config
        .tier(tier)
        .map_or(0.0, |def| rate_for_day(&def.rates, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{month_days, HolidayCalendar, YearMonth};
    use chrono::NaiveDate;

    fn august_2025() -> Vec<Day> {
        let holidays = HolidayCalendar::new().with(
            NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
            "Test Day",
        );
        month_days(YearMonth::new(2025, 7).unwrap(), &holidays)
    }

    #[test]
    fn values_each_day_kind() {
        let config = AllocConfig::default();
        let ho1 = TierCode::new("HO1");
        let ho3 = TierCode::new("HO3");
        let days = august_2025();

        assert_eq!(call_points(&config, &ho1, &days[0]), 1.5); // vendredi
        assert_eq!(call_points(&config, &ho1, &days[1]), 2.5); // samedi
        assert_eq!(call_points(&config, &ho1, &days[2]), 2.0); // dimanche
        assert_eq!(call_points(&config, &ho1, &days[3]), 1.0); // lundi
        assert_eq!(call_points(&config, &ho3, &days[0]), 0.75);
        assert_eq!(call_points(&config, &ho3, &days[3]), 0.5);
    }

    #[test]
    fn holiday_uses_saturday_rate() {
        let config = AllocConfig::default();
        let days = august_2025();
        // jeudi 14 août, férié ici
        assert_eq!(days[13].kind, DayKind::MonThu);
        assert_eq!(call_points(&config, &TierCode::new("HO2"), &days[13]), 2.5);
        assert_eq!(call_points(&config, &TierCode::new("HO3"), &days[13]), 1.25);
    }

    #[test]
    fn unknown_tier_is_worth_nothing() {
        let config = AllocConfig::default();
        let days = august_2025();
        assert_eq!(call_points(&config, &TierCode::new("HO9"), &days[1]), 0.0);
    }
}
