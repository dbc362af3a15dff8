//! Fio B phase-in schedule.
//!
//! Lei 14.300 phases in the charge of the TUSD Fio B component on compensated
//! energy year by year. The table maps a calendar year to the *charged*
//! fraction; the compensated fraction is `1 - charged`.
//!
//! Years outside the table are resolved by [`FioBFallback`]. The schedule is
//! plain data and can be loaded from JSON:
//!
//! ```json
//! { "anos": { "2023": 0.9, "2024": 0.8 }, "fallback": { "fixo": 2024 } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Year used by the default fallback.
pub const DEFAULT_FALLBACK_YEAR: i32 = 2026;

const DEFAULT_TABLE: [(i32, f64); 7] = [
    (2023, 0.90),
    (2024, 0.80),
    (2025, 0.70),
    (2026, 0.60),
    (2027, 0.50),
    (2028, 0.40),
    (2029, 0.30),
];

/// What to do for a year the table does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FioBFallback {
    /// Reuse the fraction of a fixed year.
    Fixo(i32),
    /// Clamp to the nearest defined year.
    MaisProximo,
    /// No value: the engine charges 100% of Fio B and raises an alert.
    Estrito,
}

impl Default for FioBFallback {
    fn default() -> Self {
        FioBFallback::Fixo(DEFAULT_FALLBACK_YEAR)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Fio B schedule has no years")]
    Empty,
    #[error("Fio B charged fraction for {ano} is {valor}, expected a value in [0, 1]")]
    FractionOutOfRange { ano: i32, valor: f64 },
    #[error("Fio B charged fraction increases in {ano}; the schedule must be non-increasing")]
    NotMonotonic { ano: i32 },
    #[error("fallback year {0} is not defined in the Fio B schedule")]
    FallbackYearMissing(i32),
    #[error("invalid Fio B schedule JSON: {0}")]
    Json(String),
}

/// How a year's fraction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origem", rename_all = "snake_case")]
pub enum FioBLookup {
    Tabela { cobrado: f64 },
    Fallback { cobrado: f64, ano_usado: i32 },
    Indefinido,
}

impl FioBLookup {
    pub fn cobrado(self) -> Option<f64> {
        match self {
            FioBLookup::Tabela { cobrado } | FioBLookup::Fallback { cobrado, .. } => Some(cobrado),
            FioBLookup::Indefinido => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct FioBSchedule {
    anos: BTreeMap<i32, f64>,
    fallback: FioBFallback,
}

#[derive(Deserialize)]
struct RawSchedule {
    anos: BTreeMap<i32, f64>,
    #[serde(default)]
    fallback: FioBFallback,
}

impl TryFrom<RawSchedule> for FioBSchedule {
    type Error = ScheduleError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        FioBSchedule::new(raw.anos, raw.fallback)
    }
}

impl Default for FioBSchedule {
    fn default() -> Self {
        FioBSchedule {
            anos: DEFAULT_TABLE.into_iter().collect(),
            fallback: FioBFallback::default(),
        }
    }
}

impl FioBSchedule {
    pub fn new(anos: BTreeMap<i32, f64>, fallback: FioBFallback) -> Result<Self, ScheduleError> {
        if anos.is_empty() {
            return Err(ScheduleError::Empty);
        }
        let mut previous: Option<f64> = None;
        for (&ano, &valor) in &anos {
            if !(0.0..=1.0).contains(&valor) {
                return Err(ScheduleError::FractionOutOfRange { ano, valor });
            }
            if previous.is_some_and(|p| valor > p) {
                return Err(ScheduleError::NotMonotonic { ano });
            }
            previous = Some(valor);
        }
        if let FioBFallback::Fixo(ano) = fallback {
            if !anos.contains_key(&ano) {
                return Err(ScheduleError::FallbackYearMissing(ano));
            }
        }
        Ok(FioBSchedule { anos, fallback })
    }

    pub fn from_json(text: &str) -> Result<Self, ScheduleError> {
        serde_json::from_str(text).map_err(|e| ScheduleError::Json(e.to_string()))
    }

    pub fn with_fallback(mut self, fallback: FioBFallback) -> Result<Self, ScheduleError> {
        if let FioBFallback::Fixo(ano) = fallback {
            if !self.anos.contains_key(&ano) {
                return Err(ScheduleError::FallbackYearMissing(ano));
            }
        }
        self.fallback = fallback;
        Ok(self)
    }

    pub fn years(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.anos.iter().map(|(&a, &v)| (a, v))
    }

    pub fn fallback(&self) -> FioBFallback {
        self.fallback
    }

    /// Charged fraction for `ano`, with provenance.
    pub fn lookup(&self, ano: i32) -> FioBLookup {
        if let Some(&cobrado) = self.anos.get(&ano) {
            return FioBLookup::Tabela { cobrado };
        }
        match self.fallback {
            FioBFallback::Fixo(ano_usado) => match self.anos.get(&ano_usado) {
                Some(&cobrado) => FioBLookup::Fallback { cobrado, ano_usado },
                None => FioBLookup::Indefinido,
            },
            FioBFallback::MaisProximo => {
                let below = self.anos.range(..ano).next_back();
                let above = self.anos.range(ano..).next();
                let nearest = match (below, above) {
                    (Some(b), Some(a)) => {
                        if ano - b.0 <= a.0 - ano {
                            Some(b)
                        } else {
                            Some(a)
                        }
                    }
                    (Some(b), None) => Some(b),
                    (None, Some(a)) => Some(a),
                    (None, None) => None,
                };
                match nearest {
                    Some((&ano_usado, &cobrado)) => FioBLookup::Fallback { cobrado, ano_usado },
                    None => FioBLookup::Indefinido,
                }
            }
            FioBFallback::Estrito => FioBLookup::Indefinido,
        }
    }

    /// Charged fraction for `ano`, or `None` when the fallback policy is strict.
    pub fn charged_fraction(&self, ano: i32) -> Option<f64> {
        self.lookup(ano).cobrado()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_values() {
        let s = FioBSchedule::default();
        assert_eq!(s.charged_fraction(2023), Some(0.90));
        assert_eq!(s.charged_fraction(2026), Some(0.60));
        assert_eq!(s.charged_fraction(2029), Some(0.30));
    }

    #[test]
    fn default_fallback_reuses_2026() {
        let s = FioBSchedule::default();
        assert_eq!(
            s.lookup(2035),
            FioBLookup::Fallback {
                cobrado: 0.60,
                ano_usado: 2026
            }
        );
        assert_eq!(s.charged_fraction(2019), Some(0.60));
    }

    #[test]
    fn nearest_fallback_clamps() {
        let s = FioBSchedule::default()
            .with_fallback(FioBFallback::MaisProximo)
            .unwrap();
        assert_eq!(s.charged_fraction(2040), Some(0.30));
        assert_eq!(s.charged_fraction(2010), Some(0.90));
    }

    #[test]
    fn strict_fallback_has_no_value() {
        let s = FioBSchedule::default()
            .with_fallback(FioBFallback::Estrito)
            .unwrap();
        assert_eq!(s.lookup(2031), FioBLookup::Indefinido);
        assert_eq!(s.charged_fraction(2027), Some(0.50));
    }

    #[test]
    fn rejects_invalid_tables() {
        let fallback = FioBFallback::MaisProximo;
        assert_eq!(
            FioBSchedule::new(BTreeMap::new(), fallback),
            Err(ScheduleError::Empty)
        );
        assert_eq!(
            FioBSchedule::new([(2023, 1.2)].into_iter().collect(), fallback),
            Err(ScheduleError::FractionOutOfRange {
                ano: 2023,
                valor: 1.2
            })
        );
        assert_eq!(
            FioBSchedule::new([(2023, 0.5), (2024, 0.7)].into_iter().collect(), fallback),
            Err(ScheduleError::NotMonotonic { ano: 2024 })
        );
        assert_eq!(
            FioBSchedule::new([(2023, 0.5)].into_iter().collect(), FioBFallback::Fixo(2026)),
            Err(ScheduleError::FallbackYearMissing(2026))
        );
    }

    #[test]
    fn loads_from_json() {
        let s = FioBSchedule::from_json(
            r#"{"anos": {"2030": 0.2, "2031": 0.0}, "fallback": "mais_proximo"}"#,
        )
        .unwrap();
        assert_eq!(s.charged_fraction(2031), Some(0.0));
        assert_eq!(s.fallback(), FioBFallback::MaisProximo);

        let fixed = FioBSchedule::from_json(r#"{"anos": {"2030": 0.2}, "fallback": {"fixo": 2030}}"#)
            .unwrap();
        assert_eq!(fixed.charged_fraction(2050), Some(0.2));

        let err = FioBSchedule::from_json(r#"{"anos": {}}"#).unwrap_err();
        assert!(matches!(err, ScheduleError::Json(_)));
    }
}
