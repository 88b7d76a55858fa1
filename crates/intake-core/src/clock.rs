//! Fuente de tiempo inyectable.
//!
//! La validación de fechas ("no antes de hoy") y el sello `saved_at` de los
//! borradores dependen del reloj; los tests fijan uno con `FixedClock`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fmt::Debug;

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj detenido en un instante dado.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Mediodía UTC de la fecha indicada. `None` si la fecha no existe.
    pub fn on_date(year: i32, month: u32, day: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let clock = FixedClock::on_date(2026, 3, 14).expect("valid date");
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 14).expect("date"));
        assert!(FixedClock::on_date(2026, 2, 30).is_none());
    }
}
