//! pt-BR display formatting.
//!
//! Output must match what the document renderer has always received:
//! `.` thousands separator, `,` decimal separator, and a no-break space
//! between `R$` and the amount.

use chrono::{DateTime, NaiveDate};
use helio_tariff::round_to;
use serde_json::Value;

const NBSP: char = '\u{a0}';

pub const MESES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Locale-grouped number with exactly `decimals` places.
pub fn fmt_number(value: f64, decimals: usize) -> String {
    let rounded = match round_to(value.abs(), decimals as i32) {
        r if r.is_finite() => r,
        _ => value.abs(),
    };
    let text = format!("{rounded:.decimals$}");
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push(',');
        grouped.push_str(frac);
    }

    if value < 0.0 && rounded != 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `R$ 1.234,56` (no-break space).
pub fn fmt_currency(value: f64) -> String {
    let body = fmt_number(value.abs(), 2);
    if value < 0.0 && round_to(value.abs(), 2) != 0.0 {
        format!("-R${NBSP}{body}")
    } else {
        format!("R${NBSP}{body}")
    }
}

pub fn fmt_percent(value: f64, decimals: usize) -> String {
    format!("{}%", fmt_number(value, decimals))
}

pub fn fmt_energy(value: f64) -> String {
    format!("{} kWh", fmt_number(value, 1))
}

/// `2025-04-22` or an RFC 3339 timestamp → `22/04/2025`; anything else as-is.
pub fn fmt_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// Parse the same shapes [`fmt_date`] accepts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// `4 anos e 3 meses` from a month count.
pub fn fmt_payback(meses: f64) -> String {
    let total = meses.round().max(0.0) as u64;
    let anos = total / 12;
    let resto = total % 12;
    let anos_txt = match anos {
        1 => "1 ano".to_string(),
        n => format!("{n} anos"),
    };
    let meses_txt = match resto {
        1 => "1 mês".to_string(),
        n => format!("{n} meses"),
    };
    match (anos, resto) {
        (0, _) => meses_txt,
        (_, 0) => anos_txt,
        _ => format!("{anos_txt} e {meses_txt}"),
    }
}

/// `Jan: 520 | Fev: 498 | ...`
pub fn fmt_month_series(values: &[f64], decimals: usize) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .zip(MESES.iter())
            .map(|(v, m)| format!("{m}: {}", fmt_number(*v, decimals)))
            .collect::<Vec<_>>()
            .join(" | "),
    )
}

/// Display form of a free-form JSON value (snapshot and extras tiers).
///
/// Empty strings, null, arrays and objects count as absent.
pub fn json_display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(|v| fmt_number(v, 2)),
        Value::Bool(true) => Some("Sim".to_string()),
        Value::Bool(false) => Some("Não".to_string()),
        _ => None,
    }
}
