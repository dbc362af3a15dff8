//! Grupo B net-metering calculation (Lei 14.300)
//!
//! Given a month's generation and consumption, the tariff components in force
//! and the billing regime, compute how much energy is compensated and what
//! each compensated kWh is worth:
//!
//! ```text
//! consumo_compensavel = max(consumo - custo_disponibilidade, 0)
//! energia_compensada  = min(geracao, consumo_compensavel)
//! economia_mensal     = round2(energia_compensada * valor_credito_kwh)
//! ```
//!
//! The calculation is pure and total: it never fails and never performs I/O.
//! Regulatory and data-quality concerns are reported in `alertas`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod schedule;

pub use schedule::{FioBFallback, FioBLookup, FioBSchedule, ScheduleError, DEFAULT_FALLBACK_YEAR};

/// Share of TUSD Fio A credited under GD III.
pub const GD3_FIO_A_SHARE: f64 = 0.40;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegraGd {
    #[serde(rename = "GD_I")]
    GdI,
    #[serde(rename = "GD_II")]
    GdII,
    #[serde(rename = "GD_III")]
    GdIII,
}

impl RegraGd {
    pub fn label(self) -> &'static str {
        match self {
            RegraGd::GdI => "GD I",
            RegraGd::GdII => "GD II",
            RegraGd::GdIII => "GD III",
        }
    }

    pub fn parse(s: &str) -> Option<RegraGd> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "GD_I" | "GD1" | "GD_1" => Some(RegraGd::GdI),
            "GD_II" | "GD2" | "GD_2" => Some(RegraGd::GdII),
            "GD_III" | "GD3" | "GD_3" => Some(RegraGd::GdIII),
            _ => None,
        }
    }
}

impl fmt::Display for RegraGd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Service connection; selects the minimum-billing floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fase {
    #[serde(alias = "monofásico")]
    Monofasico,
    #[serde(alias = "bifásico")]
    Bifasico,
    #[serde(alias = "trifásico")]
    Trifasico,
}

impl Fase {
    pub fn label(self) -> &'static str {
        match self {
            Fase::Monofasico => "Monofásico",
            Fase::Bifasico => "Bifásico",
            Fase::Trifasico => "Trifásico",
        }
    }
}

impl fmt::Display for Fase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum billable consumption per phase, in kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustoDisponibilidade {
    pub monofasico: f64,
    pub bifasico: f64,
    pub trifasico: f64,
}

impl Default for CustoDisponibilidade {
    fn default() -> Self {
        CustoDisponibilidade {
            monofasico: 30.0,
            bifasico: 50.0,
            trifasico: 100.0,
        }
    }
}

impl CustoDisponibilidade {
    pub fn for_fase(&self, fase: Fase) -> f64 {
        match fase {
            Fase::Monofasico => self.monofasico,
            Fase::Bifasico => self.bifasico,
            Fase::Trifasico => self.trifasico,
        }
    }
}

/// Whether a tariff figure is regulator-confirmed or a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precisao {
    Exato,
    Estimado,
    #[default]
    Desconhecido,
}

impl Precisao {
    pub fn as_str(self) -> &'static str {
        match self {
            Precisao::Exato => "exato",
            Precisao::Estimado => "estimado",
            Precisao::Desconhecido => "desconhecido",
        }
    }
}

impl fmt::Display for Precisao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kWh tariff components for one billing period (R$/kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TariffComponents {
    pub te_kwh: f64,
    pub tusd_fio_b_kwh: f64,
    #[serde(default)]
    pub tusd_fio_a_kwh: Option<f64>,
    #[serde(default)]
    pub tfsee_kwh: Option<f64>,
    #[serde(default)]
    pub pnd_kwh: Option<f64>,
    #[serde(default)]
    pub vigencia_inicio: Option<String>,
    #[serde(default)]
    pub origem: Option<String>,
    #[serde(default)]
    pub validation_status: Option<String>,
    #[serde(default)]
    pub precisao: Option<Precisao>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcGrupoBInput {
    pub regra: RegraGd,
    pub fase: Fase,
    pub geracao_mensal_kwh: f64,
    pub consumo_mensal_kwh: f64,
    pub tarifa: TariffComponents,
    #[serde(default)]
    pub custo_disponibilidade: CustoDisponibilidade,
    pub ano: i32,
}

// ============================================================================
// Result
// ============================================================================

/// Components of `valor_credito_kwh`; absent components are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CreditoBreakdown {
    pub te: f64,
    pub fio_b: f64,
    pub fio_a: f64,
    pub tfsee: f64,
    pub pnd: f64,
}

impl CreditoBreakdown {
    pub fn total(&self) -> f64 {
        self.te + self.fio_b + self.fio_a + self.tfsee + self.pnd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcGrupoBResult {
    pub geracao_mensal_kwh: f64,
    pub consumo_mensal_kwh: f64,
    pub custo_disponibilidade_kwh: f64,
    pub consumo_compensavel_kwh: f64,
    pub energia_compensada_kwh: f64,
    pub regra_aplicada: RegraGd,
    pub ano: i32,
    /// Fraction of Fio B charged in `ano` (0..=1).
    pub percentual_fio_b_cobrado: f64,
    pub valor_credito_kwh: f64,
    pub valor_credito_breakdown: CreditoBreakdown,
    pub economia_mensal_rs: f64,
    pub tarifa_vigencia_inicio: Option<String>,
    pub tarifa_origem: Option<String>,
    pub tarifa_validation_status: Option<String>,
    #[serde(default)]
    pub precisao: Option<Precisao>,
    pub incompleto_gd3: bool,
    pub alertas: Vec<String>,
}

// ============================================================================
// Engine
// ============================================================================

/// Calculator bound to a Fio B schedule.
#[derive(Debug, Clone, Default)]
pub struct TariffEngine {
    schedule: FioBSchedule,
}

impl TariffEngine {
    pub fn new(schedule: FioBSchedule) -> Self {
        TariffEngine { schedule }
    }

    pub fn schedule(&self) -> &FioBSchedule {
        &self.schedule
    }

    pub fn calc(&self, input: &CalcGrupoBInput) -> CalcGrupoBResult {
        let mut alertas = Vec::new();
        let tarifa = &input.tarifa;

        let custo_disponibilidade_kwh = input.custo_disponibilidade.for_fase(input.fase);
        let consumo_compensavel_kwh = (input.consumo_mensal_kwh - custo_disponibilidade_kwh).max(0.0);
        let energia_compensada_kwh = input.geracao_mensal_kwh.min(consumo_compensavel_kwh);

        let cobrado = match self.schedule.lookup(input.ano) {
            FioBLookup::Tabela { cobrado } => cobrado,
            FioBLookup::Fallback { cobrado, ano_usado } => {
                tracing::debug!(ano = input.ano, ano_usado, "Fio B year outside schedule, using fallback");
                cobrado
            }
            FioBLookup::Indefinido => {
                alertas.push(format!(
                    "Ano {} fora da tabela de escalonamento do Fio B: considerado 100% cobrado.",
                    input.ano
                ));
                1.0
            }
        };
        let compensado = 1.0 - cobrado;

        let mut incompleto_gd3 = false;
        let breakdown = match input.regra {
            RegraGd::GdI => {
                alertas.push(
                    "GD I: compensação integral de TE e Fio B, sem escalonamento do Fio B (direito adquirido)."
                        .to_string(),
                );
                CreditoBreakdown {
                    te: tarifa.te_kwh,
                    fio_b: tarifa.tusd_fio_b_kwh,
                    ..CreditoBreakdown::default()
                }
            }
            RegraGd::GdII => {
                if compensado == 0.0 {
                    alertas.push(format!(
                        "Fio B 100% cobrado em {}: a parcela Fio B não gera crédito.",
                        input.ano
                    ));
                }
                CreditoBreakdown {
                    te: tarifa.te_kwh,
                    fio_b: tarifa.tusd_fio_b_kwh * compensado,
                    ..CreditoBreakdown::default()
                }
            }
            RegraGd::GdIII => {
                let fio_a = match tarifa.tusd_fio_a_kwh {
                    Some(v) => v,
                    None => {
                        incompleto_gd3 = true;
                        alertas.push(
                            "GD III: TUSD Fio A ausente, considerada zero; cálculo incompleto.".to_string(),
                        );
                        0.0
                    }
                };
                let tfsee = tarifa.tfsee_kwh.unwrap_or_else(|| {
                    alertas.push("GD III: TFSEE ausente, considerada zero.".to_string());
                    0.0
                });
                let pnd = tarifa.pnd_kwh.unwrap_or_else(|| {
                    alertas.push("GD III: encargo de P&D ausente, considerado zero.".to_string());
                    0.0
                });
                CreditoBreakdown {
                    te: tarifa.te_kwh,
                    fio_b: tarifa.tusd_fio_b_kwh,
                    fio_a: GD3_FIO_A_SHARE * fio_a,
                    tfsee,
                    pnd,
                }
            }
        };

        let valor_credito_kwh = round_to(breakdown.total(), 6);
        let economia_mensal_rs = round_to(energia_compensada_kwh * valor_credito_kwh, 2);

        if let Some(status) = tarifa.validation_status.as_deref() {
            if is_suspect_status(status) {
                alertas.push(format!(
                    "Tarifa com status de validação \"{status}\": revisar os valores antes de enviar a proposta."
                ));
            }
        }
        if tarifa.te_kwh <= 0.0 {
            alertas.push(format!(
                "TE não positiva ({}): o valor do crédito pode estar subestimado.",
                tarifa.te_kwh
            ));
        }

        if !alertas.is_empty() {
            tracing::debug!(regra = %input.regra, alertas = alertas.len(), "grupo B calculation raised alerts");
        }

        CalcGrupoBResult {
            geracao_mensal_kwh: input.geracao_mensal_kwh,
            consumo_mensal_kwh: input.consumo_mensal_kwh,
            custo_disponibilidade_kwh,
            consumo_compensavel_kwh,
            energia_compensada_kwh,
            regra_aplicada: input.regra,
            ano: input.ano,
            percentual_fio_b_cobrado: cobrado,
            valor_credito_kwh,
            valor_credito_breakdown: breakdown,
            economia_mensal_rs,
            tarifa_vigencia_inicio: tarifa.vigencia_inicio.clone(),
            tarifa_origem: tarifa.origem.clone(),
            tarifa_validation_status: tarifa.validation_status.clone(),
            precisao: tarifa.precisao,
            incompleto_gd3,
            alertas,
        }
    }
}

/// Calculate with the default Fio B schedule.
pub fn calc_grupo_b(input: &CalcGrupoBInput) -> CalcGrupoBResult {
    TariffEngine::default().calc(input)
}

/// Validation statuses that warrant human review.
pub fn is_suspect_status(status: &str) -> bool {
    matches!(
        status.trim().to_lowercase().as_str(),
        "suspeito" | "suspeita" | "suspect" | "divergente" | "invalido" | "inválido" | "invalid"
    )
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
