//! Live-computation tier: dotted key → handler.
//!
//! Each handler reads one variable out of the context and returns it already
//! formatted, or `None` when the data is not there. Keys without a handler
//! fall through to `extras` and then to the placeholder.

use std::collections::HashMap;
use std::sync::OnceLock;

use helio_tariff::{CalcGrupoBResult, Precisao};

use crate::context::*;
use crate::format::*;

/// Shown in the PDF when the tariff is not regulator-confirmed.
pub const ALERTA_ESTIMADO_TEXTO: &str = "Atenção: os valores tarifários desta proposta são estimados, \
pois a componente Fio B da distribuidora ainda não foi publicada pela ANEEL. \
A economia real pode variar em relação ao apresentado.";

/// Default projection horizon, years.
const VIDA_UTIL_PADRAO: u32 = 25;
/// Longest projection horizon accepted from `premissas.vida_util_anos`.
pub const VIDA_UTIL_MAXIMA: u32 = 50;

pub(crate) type Handler = for<'s, 'c> fn(&'s Scope<'c>) -> Option<String>;

/// Read-only view over the context with the derived figures handlers share.
pub(crate) struct Scope<'c> {
    pub ctx: &'c ProposalResolverContext,
    pub precisao: Precisao,
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Largest magnitude shown; past it an `f64` no longer holds centavos.
const MAGNITUDE_MAXIMA: f64 = 1e15;

fn finite(value: f64) -> Option<f64> {
    (value.is_finite() && value.abs() <= MAGNITUDE_MAXIMA).then_some(value)
}

fn positive(value: f64) -> Option<f64> {
    finite(value).filter(|&v| v > 0.0)
}

impl<'c> Scope<'c> {
    pub fn new(ctx: &'c ProposalResolverContext, precisao: Precisao) -> Self {
        Scope { ctx, precisao }
    }

    fn cliente(&self) -> Option<&'c ClienteContext> {
        self.ctx.cliente.as_ref()
    }

    fn comercial(&self) -> Option<&'c ComercialContext> {
        self.ctx.comercial.as_ref()
    }

    fn uc(&self) -> Option<&'c UnidadeConsumidora> {
        self.ctx.ucs.first()
    }

    fn premissas(&self) -> Option<&'c Premissas> {
        self.ctx.premissas.as_ref()
    }

    fn modulo(&self) -> Option<&'c ModuloInfo> {
        self.ctx.kit.as_ref()?.modulo.as_ref()
    }

    fn inversor(&self) -> Option<&'c InversorInfo> {
        self.ctx.kit.as_ref()?.inversor.as_ref()
    }

    fn tarifa(&self) -> Option<&'c TariffVersionContext> {
        self.ctx.tariff_version.as_ref()
    }

    fn gd(&self) -> Option<&'c CalcGrupoBResult> {
        self.ctx.gd_result.as_ref()
    }

    fn totais(&self) -> Option<&'c TotaisCalculados> {
        self.ctx.totais.as_ref()
    }

    fn venda(&self) -> Option<&'c VendaContext> {
        self.ctx.venda.as_ref()
    }

    fn consultor(&self) -> Option<&'c ConsultorContext> {
        self.ctx.consultor.as_ref()
    }

    fn empresa(&self) -> Option<&'c EmpresaContext> {
        self.ctx.empresa.as_ref()
    }

    /// Selected payment option, or the first one.
    fn pagamento(&self) -> Option<&'c PagamentoOpcao> {
        let opcoes = &self.ctx.pagamento_opcoes;
        opcoes.iter().find(|p| p.selecionada).or_else(|| opcoes.first())
    }

    // ---- derived figures ---------------------------------------------------

    fn consumo_mensal(&self) -> Option<f64> {
        self.uc()
            .and_then(|u| u.consumo_mensal_kwh)
            .or_else(|| self.gd().map(|g| g.consumo_mensal_kwh))
            .and_then(finite)
    }

    fn potencia_kwp(&self) -> Option<f64> {
        self.totais()
            .and_then(|t| t.potencia_kwp)
            .or_else(|| {
                let m = self.modulo()?;
                Some(m.potencia_w? * f64::from(m.quantidade?) / 1000.0)
            })
            .and_then(positive)
    }

    fn geracao_mensal(&self) -> Option<f64> {
        self.totais()
            .and_then(|t| {
                t.geracao_mensal_kwh.or_else(|| {
                    let serie = &t.geracao_mensal_serie_kwh;
                    (!serie.is_empty()).then(|| serie.iter().sum::<f64>() / serie.len() as f64)
                })
            })
            .or_else(|| self.gd().map(|g| g.geracao_mensal_kwh))
            .and_then(finite)
    }

    fn preco_total(&self) -> Option<f64> {
        self.totais()
            .and_then(|t| t.preco_total)
            .or_else(|| self.venda().and_then(|v| v.preco_final))
            .and_then(positive)
    }

    fn preco_servicos(&self) -> Option<f64> {
        let valores: Vec<f64> = self.ctx.servicos.iter().filter_map(|s| s.valor).collect();
        (!valores.is_empty()).then(|| valores.iter().sum())
    }

    fn economia_mensal(&self) -> Option<f64> {
        self.gd().map(|g| g.economia_mensal_rs).and_then(finite)
    }

    fn tarifa_total_kwh(&self) -> Option<f64> {
        let t = self.tarifa()?;
        let te = t.te_kwh?;
        let tusd = t.tusd_total_kwh.or_else(|| {
            Some(t.tusd_fio_b_kwh? + t.tusd_fio_a_kwh.unwrap_or(0.0) + t.tfsee_kwh.unwrap_or(0.0) + t.pnd_kwh.unwrap_or(0.0))
        })?;
        positive(te + tusd)
    }

    fn conta_atual(&self) -> Option<f64> {
        self.uc()
            .and_then(|u| u.valor_conta_rs)
            .or_else(|| Some(self.consumo_mensal()? * self.tarifa_total_kwh()?))
            .and_then(finite)
    }

    fn conta_com_solar(&self) -> Option<f64> {
        Some((self.conta_atual()? - self.economia_mensal()?).max(0.0))
    }

    fn payback_meses(&self) -> Option<f64> {
        self.totais()
            .and_then(|t| t.payback_meses)
            .or_else(|| Some((self.preco_total()? / positive(self.economia_mensal()?)?).ceil()))
            .and_then(finite)
    }

    fn payback_anos(&self) -> Option<f64> {
        self.totais()
            .and_then(|t| t.payback_anos)
            .or_else(|| Some(self.payback_meses()? / 12.0))
            .and_then(finite)
    }

    /// Projection horizon; `None` when the configured life exceeds
    /// [`VIDA_UTIL_MAXIMA`].
    fn vida_util(&self) -> Option<u32> {
        match self.premissas().and_then(|p| p.vida_util_anos).filter(|&n| n > 0) {
            Some(n) if n > VIDA_UTIL_MAXIMA => None,
            Some(n) => Some(n),
            None => Some(VIDA_UTIL_PADRAO),
        }
    }

    /// Yearly savings over the projection horizon, with energy inflation and
    /// module degradation compounding from year 2.
    fn economia_projetada(&self) -> Option<impl Iterator<Item = f64>> {
        let anual = self.economia_mensal()? * 12.0;
        let inflacao = self.premissas().and_then(|p| p.inflacao_energetica_pct).unwrap_or(0.0) / 100.0;
        let degradacao = self.premissas().and_then(|p| p.degradacao_anual_pct).unwrap_or(0.0) / 100.0;
        let fator = finite((1.0 + inflacao) * (1.0 - degradacao))?;
        Some(projecao(anual, fator, self.vida_util()?))
    }

    fn economia_total(&self) -> Option<f64> {
        finite(self.economia_projetada()?.sum())
    }

    fn data_proposta(&self) -> Option<chrono::NaiveDate> {
        self.comercial()?.proposta_data.as_deref().and_then(parse_date)
    }

    fn tarifa_componente(&self, pick: fn(&TariffVersionContext) -> Option<f64>) -> Option<String> {
        self.tarifa().and_then(pick).and_then(finite).map(|v| fmt_number(v, 5))
    }
}

/// `anos` yearly values starting at `anual`, each `fator` times the previous.
fn projecao(anual: f64, fator: f64, anos: u32) -> impl Iterator<Item = f64> {
    (0..anos).scan(anual, move |valor, _| {
        let atual = *valor;
        *valor *= fator;
        Some(atual)
    })
}

fn h(key: &'static str, handler: Handler) -> (&'static str, Handler) {
    (key, handler)
}

static TABLE: OnceLock<HashMap<&'static str, Handler>> = OnceLock::new();

/// Handler for `dotted`, if one is registered.
pub(crate) fn handler_for(dotted: &str) -> Option<Handler> {
    TABLE.get_or_init(build_table).get(dotted).copied()
}

/// Every key with a handler (for consistency checks).
pub fn handled_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = TABLE.get_or_init(build_table).keys().copied().collect();
    keys.sort_unstable();
    keys
}

fn build_table() -> HashMap<&'static str, Handler> {
    [
        // ---- entrada ----------------------------------------------------------
        h("entrada.tipo_uc", |s| text(&s.uc()?.tipo)),
        h("entrada.numero_uc", |s| text(&s.uc()?.numero)),
        h("entrada.consumo_mensal", |s| s.consumo_mensal().map(|v| fmt_number(v, 0))),
        h("entrada.consumo_anual", |s| s.consumo_mensal().map(|v| fmt_number(v * 12.0, 0))),
        h("entrada.consumo_total_ucs", |s| {
            let valores: Vec<f64> = s.ctx.ucs.iter().filter_map(|u| u.consumo_mensal_kwh).collect();
            if valores.is_empty() {
                return None;
            }
            finite(valores.iter().sum()).map(|v| fmt_number(v, 0))
        }),
        h("entrada.quantidade_ucs", |s| {
            (!s.ctx.ucs.is_empty()).then(|| s.ctx.ucs.len().to_string())
        }),
        h("entrada.fase", |s| s.uc()?.fase.map(|f| f.label().to_string())),
        h("entrada.tensao_rede", |s| text(&s.uc()?.tensao)),
        h("entrada.subgrupo", |s| text(&s.uc()?.subgrupo)),
        h("entrada.concessionaria", |s| text(&s.uc()?.concessionaria)),
        h("entrada.cidade", |s| text(&s.uc()?.cidade)),
        h("entrada.estado", |s| text(&s.uc()?.estado)),
        h("entrada.regra_gd", |s| {
            s.gd()
                .map(|g| g.regra_aplicada)
                .or_else(|| s.uc()?.regra_gd)
                .map(|r| r.label().to_string())
        }),
        h("entrada.custo_disponibilidade", |s| {
            s.gd().map(|g| fmt_number(g.custo_disponibilidade_kwh, 0))
        }),
        h("entrada.tipo_telhado", |s| text(&s.uc()?.tipo_telhado)),
        // ---- sistema_solar ----------------------------------------------------
        h("sistema_solar.potencia_sistema", |s| s.potencia_kwp().map(|v| fmt_number(v, 2))),
        h("sistema_solar.geracao_mensal", |s| s.geracao_mensal().map(|v| fmt_number(v, 0))),
        h("sistema_solar.geracao_anual", |s| s.geracao_mensal().map(|v| fmt_number(v * 12.0, 0))),
        h("sistema_solar.cobertura_consumo", |s| {
            let consumo = positive(s.consumo_mensal()?)?;
            finite(s.geracao_mensal()? / consumo * 100.0).map(|v| fmt_percent(v, 0))
        }),
        h("sistema_solar.modulo_fabricante", |s| text(&s.modulo()?.fabricante)),
        h("sistema_solar.modulo_modelo", |s| text(&s.modulo()?.modelo)),
        h("sistema_solar.modulo_potencia", |s| s.modulo()?.potencia_w.map(|v| fmt_number(v, 0))),
        h("sistema_solar.modulo_quantidade", |s| s.modulo()?.quantidade.map(|q| q.to_string())),
        h("sistema_solar.inversor_fabricante", |s| text(&s.inversor()?.fabricante)),
        h("sistema_solar.inversor_modelo", |s| text(&s.inversor()?.modelo)),
        h("sistema_solar.inversor_potencia", |s| s.inversor()?.potencia_kw.map(|v| fmt_number(v, 1))),
        h("sistema_solar.inversor_quantidade", |s| s.inversor()?.quantidade.map(|q| q.to_string())),
        h("sistema_solar.estrutura", |s| text(&s.ctx.kit.as_ref()?.estrutura)),
        h("sistema_solar.area_necessaria", |s| {
            let m = s.modulo()?;
            Some(fmt_number(m.area_m2? * f64::from(m.quantidade?), 1))
        }),
        h("sistema_solar.garantia_modulos", |s| s.modulo()?.garantia_anos.map(|g| g.to_string())),
        h("sistema_solar.garantia_inversor", |s| s.inversor()?.garantia_anos.map(|g| g.to_string())),
        h("sistema_solar.co2_evitado", |s| {
            s.totais()?.co2_evitado_kg_ano.and_then(finite).map(|v| fmt_number(v, 0))
        }),
        // ---- financeiro -------------------------------------------------------
        h("financeiro.preco_total", |s| s.preco_total().map(fmt_currency)),
        h("financeiro.preco_kwp", |s| {
            finite(s.preco_total()? / positive(s.potencia_kwp()?)?).map(fmt_currency)
        }),
        h("financeiro.preco_kit", |s| s.ctx.kit.as_ref()?.preco.and_then(finite).map(fmt_currency)),
        h("financeiro.preco_servicos", |s| s.preco_servicos().map(fmt_currency)),
        h("financeiro.desconto", |s| s.venda()?.desconto_valor.and_then(finite).map(fmt_currency)),
        h("financeiro.desconto_percentual", |s| {
            s.venda()?.desconto_percentual.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("financeiro.margem_percentual", |s| {
            s.venda()?.margem_percentual.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("financeiro.economia_mensal", |s| s.economia_mensal().map(fmt_currency)),
        h("financeiro.economia_anual", |s| s.economia_mensal().map(|v| fmt_currency(v * 12.0))),
        h("financeiro.economia_25_anos", |s| s.economia_total().map(fmt_currency)),
        h("financeiro.roi_25_anos", |s| {
            let preco = positive(s.preco_total()?)?;
            finite((s.economia_total()? - preco) / preco * 100.0).map(|v| fmt_percent(v, 2))
        }),
        h("financeiro.payback_meses", |s| s.payback_meses().map(|v| fmt_number(v, 0))),
        h("financeiro.payback_anos", |s| s.payback_anos().map(|v| fmt_number(v, 1))),
        h("financeiro.payback_texto", |s| s.payback_meses().map(fmt_payback)),
        h("financeiro.forma_pagamento", |s| {
            s.venda()
                .and_then(|v| text(&v.forma_pagamento))
                .or_else(|| {
                    let nome = s.pagamento()?.nome.trim();
                    (!nome.is_empty()).then(|| nome.to_string())
                })
        }),
        h("financeiro.valor_entrada", |s| s.pagamento()?.entrada.and_then(finite).map(fmt_currency)),
        h("financeiro.num_parcelas", |s| s.pagamento()?.num_parcelas.map(|n| n.to_string())),
        h("financeiro.valor_parcela", |s| s.pagamento()?.valor_parcela.and_then(finite).map(fmt_currency)),
        h("financeiro.taxa_juros", |s| {
            s.pagamento()?.taxa_juros_mensal_pct.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("financeiro.financiadora", |s| text(&s.pagamento()?.financiadora)),
        h("financeiro.parcela_vs_conta", |s| {
            let parcela = s.pagamento()?.valor_parcela?;
            finite(s.economia_mensal()? - parcela).map(fmt_currency)
        }),
        // ---- tarifa / gd ------------------------------------------------------
        h("tarifa.te_kwh", |s| s.tarifa_componente(|t| t.te_kwh)),
        h("tarifa.fio_b_kwh", |s| s.tarifa_componente(|t| t.tusd_fio_b_kwh)),
        h("tarifa.fio_b_real_kwh", |s| s.tarifa_componente(|t| t.fio_b_real_kwh)),
        h("tarifa.fio_a_kwh", |s| s.tarifa_componente(|t| t.tusd_fio_a_kwh)),
        h("tarifa.tfsee_kwh", |s| s.tarifa_componente(|t| t.tfsee_kwh)),
        h("tarifa.pnd_kwh", |s| s.tarifa_componente(|t| t.pnd_kwh)),
        h("tarifa.tusd_total_kwh", |s| s.tarifa_componente(|t| t.tusd_total_kwh)),
        h("tarifa.total_kwh", |s| s.tarifa_total_kwh().map(|v| fmt_number(v, 5))),
        h("tarifa.vigencia", |s| {
            s.tarifa()
                .and_then(|t| text(&t.vigencia_inicio))
                .or_else(|| text(&s.gd()?.tarifa_vigencia_inicio))
                .map(|d| fmt_date(&d))
        }),
        h("tarifa.origem", |s| {
            s.tarifa()
                .and_then(|t| text(&t.origem))
                .or_else(|| text(&s.gd()?.tarifa_origem))
        }),
        h("tarifa.precisao", |s| Some(s.precisao.as_str().to_uppercase())),
        h("tarifa.status_validacao", |s| {
            s.tarifa()
                .and_then(|t| text(&t.validation_status))
                .or_else(|| text(&s.gd()?.tarifa_validation_status))
        }),
        h("gd.percentual_fio_b", |s| {
            s.gd().map(|g| fmt_percent(g.percentual_fio_b_cobrado * 100.0, 0))
        }),
        h("gd.ano_referencia", |s| s.gd().map(|g| g.ano.to_string())),
        h("gd.valor_credito_kwh", |s| s.gd().map(|g| fmt_number(g.valor_credito_kwh, 6))),
        h("gd.energia_compensada", |s| s.gd().map(|g| fmt_energy(g.energia_compensada_kwh))),
        h("gd.consumo_compensavel", |s| s.gd().map(|g| fmt_energy(g.consumo_compensavel_kwh))),
        h("gd.alertas", |s| {
            let g = s.gd()?;
            (!g.alertas.is_empty()).then(|| g.alertas.join("; "))
        }),
        h("conta_energia.valor_atual", |s| s.conta_atual().map(fmt_currency)),
        h("conta_energia.valor_com_solar", |s| s.conta_com_solar().map(fmt_currency)),
        h("conta_energia.reducao_percentual", |s| {
            let atual = positive(s.conta_atual()?)?;
            Some(fmt_percent((atual - s.conta_com_solar()?) / atual * 100.0, 2))
        }),
        h("conta_energia.custo_disponibilidade_rs", |s| {
            finite(s.gd()?.custo_disponibilidade_kwh * s.tarifa_total_kwh()?).map(fmt_currency)
        }),
        h("alerta.estimado.texto_pdf", |s| match s.precisao {
            Precisao::Exato => Some(String::new()),
            Precisao::Estimado | Precisao::Desconhecido => Some(ALERTA_ESTIMADO_TEXTO.to_string()),
        }),
        h("aneel.ultima_sincronizacao", |s| {
            text(&s.ctx.aneel_sync.as_ref()?.ultima_sincronizacao).map(|d| fmt_date(&d))
        }),
        h("aneel.resolucao", |s| text(&s.ctx.aneel_sync.as_ref()?.resolucao)),
        // ---- comercial --------------------------------------------------------
        h("comercial.proposta_numero", |s| text(&s.comercial()?.proposta_numero)),
        h("comercial.proposta_versao", |s| s.comercial()?.proposta_versao.map(|v| v.to_string())),
        h("comercial.proposta_data", |s| text(&s.comercial()?.proposta_data).map(|d| fmt_date(&d))),
        h("comercial.proposta_validade", |s| {
            let dias = s.comercial()?.validade_dias?;
            let limite = s.data_proposta()?.checked_add_days(chrono::Days::new(u64::from(dias)))?;
            Some(limite.format("%d/%m/%Y").to_string())
        }),
        h("comercial.validade_dias", |s| s.comercial()?.validade_dias.map(|d| d.to_string())),
        h("comercial.prazo_instalacao", |s| s.comercial()?.prazo_instalacao_dias.map(|d| d.to_string())),
        h("comercial.garantia_instalacao", |s| {
            s.comercial()?.garantia_instalacao_anos.map(|a| a.to_string())
        }),
        h("comercial.observacoes", |s| text(&s.comercial()?.observacoes)),
        h("comercial.consultor_nome", |s| text(&s.consultor()?.nome)),
        h("comercial.consultor_email", |s| text(&s.consultor()?.email)),
        h("comercial.consultor_telefone", |s| text(&s.consultor()?.telefone)),
        h("comercial.empresa_nome", |s| text(&s.empresa()?.nome)),
        h("comercial.empresa_cnpj", |s| text(&s.empresa()?.cnpj)),
        h("comercial.empresa_telefone", |s| text(&s.empresa()?.telefone)),
        h("comercial.empresa_email", |s| text(&s.empresa()?.email)),
        h("comercial.empresa_site", |s| text(&s.empresa()?.site)),
        h("comercial.empresa_endereco", |s| text(&s.empresa()?.endereco)),
        h("comercial.empresa_cidade", |s| {
            let e = s.empresa()?;
            match (text(&e.cidade), text(&e.estado)) {
                (Some(c), Some(uf)) => Some(format!("{c}/{uf}")),
                (c, uf) => c.or(uf),
            }
        }),
        // ---- cliente ----------------------------------------------------------
        h("cliente.nome", |s| text(&s.cliente()?.nome)),
        h("cliente.primeiro_nome", |s| {
            text(&s.cliente()?.nome).and_then(|n| n.split_whitespace().next().map(str::to_string))
        }),
        h("cliente.cpf_cnpj", |s| text(&s.cliente()?.cpf_cnpj)),
        h("cliente.email", |s| text(&s.cliente()?.email)),
        h("cliente.telefone", |s| text(&s.cliente()?.telefone)),
        h("cliente.empresa", |s| text(&s.cliente()?.empresa)),
        h("cliente.endereco", |s| text(&s.cliente()?.endereco)),
        h("cliente.bairro", |s| text(&s.cliente()?.bairro)),
        h("cliente.cidade", |s| text(&s.cliente()?.cidade)),
        h("cliente.estado", |s| text(&s.cliente()?.estado)),
        h("cliente.cep", |s| text(&s.cliente()?.cep)),
        h("cliente.endereco_completo", |s| {
            let c = s.cliente()?;
            let mut linha = text(&c.endereco)?;
            if let Some(bairro) = text(&c.bairro) {
                linha.push_str(&format!(" - {bairro}"));
            }
            match (text(&c.cidade), text(&c.estado)) {
                (Some(cidade), Some(uf)) => linha.push_str(&format!(", {cidade}/{uf}")),
                (Some(cidade), None) => linha.push_str(&format!(", {cidade}")),
                _ => {}
            }
            if let Some(cep) = text(&c.cep) {
                linha.push_str(&format!(", {cep}"));
            }
            Some(linha)
        }),
        // ---- tabelas ----------------------------------------------------------
        h("tabelas.opcoes_pagamento", |s| {
            let linhas: Vec<String> = s
                .ctx
                .pagamento_opcoes
                .iter()
                .map(|p| match (p.num_parcelas, p.valor_parcela) {
                    (Some(n), Some(parcela)) if n > 1 => {
                        let entrada = p
                            .entrada
                            .filter(|e| *e > 0.0)
                            .map(|e| format!("entrada {} + ", fmt_currency(e)))
                            .unwrap_or_default();
                        format!("{}: {entrada}{n}x {}", p.nome, fmt_currency(parcela))
                    }
                    _ => match p.valor_total {
                        Some(total) => format!("{}: {}", p.nome, fmt_currency(total)),
                        None => p.nome.clone(),
                    },
                })
                .collect();
            (!linhas.is_empty()).then(|| linhas.join("\n"))
        }),
        h("tabelas.servicos", |s| {
            let linhas: Vec<String> = s
                .ctx
                .servicos
                .iter()
                .map(|sv| match sv.valor {
                    Some(v) if !sv.incluso => format!("{}: {}", sv.descricao, fmt_currency(v)),
                    _ => format!("{}: incluso", sv.descricao),
                })
                .collect();
            (!linhas.is_empty()).then(|| linhas.join("\n"))
        }),
        h("tabelas.itens_kit", |s| {
            let itens = &s.ctx.kit.as_ref()?.itens;
            let linhas: Vec<String> = itens
                .iter()
                .map(|i| {
                    let unidade = i.unidade.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
                    format!("{}{unidade} {}", fmt_number(i.quantidade, 0), i.descricao)
                })
                .collect();
            (!linhas.is_empty()).then(|| linhas.join("\n"))
        }),
        h("tabelas.ucs", |s| {
            let linhas: Vec<String> = s
                .ctx
                .ucs
                .iter()
                .enumerate()
                .map(|(i, u)| {
                    let nome = u.numero.clone().unwrap_or_else(|| format!("#{}", i + 1));
                    match u.consumo_mensal_kwh {
                        Some(c) => format!("UC {nome}: {} kWh", fmt_number(c, 0)),
                        None => format!("UC {nome}"),
                    }
                })
                .collect();
            (!linhas.is_empty()).then(|| linhas.join("\n"))
        }),
        // ---- series -----------------------------------------------------------
        h("series.geracao_mensal", |s| {
            fmt_month_series(&s.totais()?.geracao_mensal_serie_kwh, 0)
        }),
        h("series.consumo_mensal", |s| fmt_month_series(&s.uc()?.historico_consumo_kwh, 0)),
        h("series.economia_anual", |s| {
            let anos: Vec<f64> = s.economia_projetada()?.collect();
            if !anos.iter().all(|&v| finite(v).is_some()) {
                return None;
            }
            Some(
                anos.iter()
                    .enumerate()
                    .map(|(i, v)| format!("Ano {}: {}", i + 1, fmt_currency(*v)))
                    .collect::<Vec<_>>()
                    .join(" | "),
            )
        }),
        // ---- premissas --------------------------------------------------------
        h("premissas.inflacao_energetica", |s| {
            s.premissas()?.inflacao_energetica_pct.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("premissas.degradacao_anual", |s| {
            s.premissas()?.degradacao_anual_pct.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("premissas.perdas_sistema", |s| {
            s.premissas()?.perdas_sistema_pct.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("premissas.irradiacao_media", |s| {
            s.premissas()?.irradiacao_media.and_then(finite).map(|v| fmt_number(v, 2))
        }),
        h("premissas.vida_util", |s| s.premissas()?.vida_util_anos.map(|v| v.to_string())),
        h("premissas.imposto_percentual", |s| {
            s.premissas()?.imposto_pct.and_then(finite).map(|v| fmt_percent(v, 2))
        }),
        h("premissas.ano_calculo", |s| {
            s.premissas()
                .and_then(|p| p.ano_calculo)
                .or_else(|| s.gd().map(|g| g.ano))
                .map(|a| a.to_string())
        }),
    ]
    .into_iter()
    .collect()
}
