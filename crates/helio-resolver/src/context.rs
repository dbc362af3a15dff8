//! Resolver input.
//!
//! Every sub-object is optional and partial: wizards, persisted proposal
//! records and the document renderer fill in whatever they have. Missing data
//! never fails resolution; it only turns individual variables into fallbacks.

use helio_tariff::{CalcGrupoBResult, Fase, Precisao, RegraGd};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProposalResolverContext {
    pub cliente: Option<ClienteContext>,
    pub comercial: Option<ComercialContext>,
    /// Consumption units; the first one is the main UC.
    pub ucs: Vec<UnidadeConsumidora>,
    pub premissas: Option<Premissas>,
    pub kit: Option<KitContext>,
    pub servicos: Vec<Servico>,
    pub venda: Option<VendaContext>,
    pub pagamento_opcoes: Vec<PagamentoOpcao>,
    pub tariff_version: Option<TariffVersionContext>,
    /// Output of the tariff engine, computed upstream by the caller.
    pub gd_result: Option<CalcGrupoBResult>,
    pub aneel_sync: Option<AneelSyncMeta>,
    pub totais: Option<TotaisCalculados>,
    pub consultor: Option<ConsultorContext>,
    pub empresa: Option<EmpresaContext>,
    /// Free-form values, keyed by dotted, flattened or legacy name.
    pub extras: BTreeMap<String, Value>,
    /// Frozen prior resolution (`inputs` / `outputs`) of a locked proposal version.
    pub final_snapshot: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClienteContext {
    pub nome: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub empresa: Option<String>,
    pub endereco: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComercialContext {
    pub proposta_numero: Option<String>,
    pub proposta_versao: Option<u32>,
    /// ISO date (`2025-05-12`) or RFC 3339 timestamp.
    pub proposta_data: Option<String>,
    pub validade_dias: Option<u32>,
    pub prazo_instalacao_dias: Option<u32>,
    pub garantia_instalacao_anos: Option<u32>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnidadeConsumidora {
    pub numero: Option<String>,
    pub tipo: Option<String>,
    pub consumo_mensal_kwh: Option<f64>,
    /// Up to 12 months, January first.
    pub historico_consumo_kwh: Vec<f64>,
    pub valor_conta_rs: Option<f64>,
    pub fase: Option<Fase>,
    pub tensao: Option<String>,
    pub subgrupo: Option<String>,
    pub concessionaria: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub tipo_telhado: Option<String>,
    pub regra_gd: Option<RegraGd>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Premissas {
    /// Yearly tariff increase, percent.
    pub inflacao_energetica_pct: Option<f64>,
    /// Yearly module degradation, percent.
    pub degradacao_anual_pct: Option<f64>,
    pub perdas_sistema_pct: Option<f64>,
    pub irradiacao_media: Option<f64>,
    pub vida_util_anos: Option<u32>,
    pub imposto_pct: Option<f64>,
    pub ano_calculo: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitContext {
    pub modulo: Option<ModuloInfo>,
    pub inversor: Option<InversorInfo>,
    pub estrutura: Option<String>,
    pub preco: Option<f64>,
    pub itens: Vec<KitItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuloInfo {
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    pub potencia_w: Option<f64>,
    pub quantidade: Option<u32>,
    pub area_m2: Option<f64>,
    pub garantia_anos: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InversorInfo {
    pub fabricante: Option<String>,
    pub modelo: Option<String>,
    pub potencia_kw: Option<f64>,
    pub quantidade: Option<u32>,
    pub garantia_anos: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitItem {
    pub descricao: String,
    pub quantidade: f64,
    pub unidade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Servico {
    pub descricao: String,
    pub valor: Option<f64>,
    pub incluso: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendaContext {
    pub preco_final: Option<f64>,
    pub desconto_valor: Option<f64>,
    pub desconto_percentual: Option<f64>,
    pub margem_percentual: Option<f64>,
    pub forma_pagamento: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagamentoOpcao {
    pub nome: String,
    pub valor_total: Option<f64>,
    pub entrada: Option<f64>,
    pub num_parcelas: Option<u32>,
    pub valor_parcela: Option<f64>,
    pub taxa_juros_mensal_pct: Option<f64>,
    pub financiadora: Option<String>,
    pub selecionada: bool,
}

/// Tariff in force for the proposal, as synced from ANEEL or estimated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffVersionContext {
    pub te_kwh: Option<f64>,
    pub tusd_fio_b_kwh: Option<f64>,
    pub tusd_fio_a_kwh: Option<f64>,
    pub tfsee_kwh: Option<f64>,
    pub pnd_kwh: Option<f64>,
    pub tusd_total_kwh: Option<f64>,
    pub vigencia_inicio: Option<String>,
    pub origem: Option<String>,
    pub validation_status: Option<String>,
    pub precisao: Option<Precisao>,
    /// Published Fio B; `None` when Fio B was estimated from total TUSD.
    pub fio_b_real_kwh: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AneelSyncMeta {
    pub ultima_sincronizacao: Option<String>,
    pub resolucao: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotaisCalculados {
    pub potencia_kwp: Option<f64>,
    pub geracao_mensal_kwh: Option<f64>,
    /// Twelve monthly values, January first.
    pub geracao_mensal_serie_kwh: Vec<f64>,
    pub preco_total: Option<f64>,
    pub payback_meses: Option<f64>,
    pub payback_anos: Option<f64>,
    pub co2_evitado_kg_ano: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultorContext {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmpresaContext {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub site: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
}
