//! The builtin entry table.
//!
//! Declaration order matters: the resolver walks entries in this order and
//! `by_category` preserves it. New variables go at the end of their group and
//! always get both a canonical and a legacy key.

use crate::{AppliesTo, Category, CatalogVariable};

fn v(
    dotted: &str,
    legacy: &str,
    label: &str,
    description: &str,
    category: Category,
    unit: &str,
    example: &str,
) -> CatalogVariable {
    CatalogVariable {
        canonical_key: format!("{{{{{dotted}}}}}"),
        legacy_key: format!("[{legacy}]"),
        label: label.to_string(),
        description: description.to_string(),
        category,
        applies_to: AppliesTo::Todos,
        unit: unit.to_string(),
        example: example.to_string(),
        is_series: false,
        not_implemented: false,
    }
}

impl CatalogVariable {
    pub(crate) fn series(mut self) -> Self {
        self.is_series = true;
        self
    }

    pub(crate) fn not_implemented(mut self) -> Self {
        self.not_implemented = true;
        self
    }

    pub(crate) fn only(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = applies_to;
        self
    }
}

pub fn builtin_entries() -> Vec<CatalogVariable> {
    use AppliesTo::*;
    use Category::*;

    vec![
        // ---------------------------------------------------------------------
        // entrada
        // ---------------------------------------------------------------------
        v("entrada.tipo_uc", "tipo_uc", "Tipo da UC", "Classe da unidade consumidora", Entrada, "", "Residencial"),
        v("entrada.numero_uc", "numero_uc", "Número da UC", "Código da unidade consumidora na distribuidora", Entrada, "", "3001234567"),
        v("entrada.consumo_mensal", "consumo_mensal", "Consumo mensal", "Consumo médio mensal da UC principal", Entrada, "kWh", "500"),
        v("entrada.consumo_anual", "consumo_anual", "Consumo anual", "Consumo médio mensal × 12", Entrada, "kWh", "6.000"),
        v("entrada.consumo_total_ucs", "consumo_total_ucs", "Consumo total das UCs", "Soma do consumo mensal de todas as UCs", Entrada, "kWh", "820"),
        v("entrada.quantidade_ucs", "quantidade_ucs", "Quantidade de UCs", "Número de unidades consumidoras na proposta", Entrada, "", "2"),
        v("entrada.fase", "fase", "Fase", "Ligação da UC (mono, bi ou trifásica)", Entrada, "", "Bifásico"),
        v("entrada.tensao_rede", "tensao_rede", "Tensão da rede", "Tensão nominal de atendimento", Entrada, "V", "220V"),
        v("entrada.subgrupo", "subgrupo", "Subgrupo tarifário", "Subgrupo ANEEL da UC", Entrada, "", "B1"),
        v("entrada.concessionaria", "concessionaria", "Concessionária", "Distribuidora que atende a UC", Entrada, "", "CEMIG-D"),
        v("entrada.cidade", "cidade", "Cidade da instalação", "Município da UC principal", Entrada, "", "Belo Horizonte"),
        v("entrada.estado", "estado", "UF da instalação", "Estado da UC principal", Entrada, "", "MG"),
        v("entrada.regra_gd", "regra_gd", "Regra de compensação", "Regime de GD aplicado no cálculo", Entrada, "", "GD II"),
        v("entrada.custo_disponibilidade", "custo_disponibilidade", "Custo de disponibilidade", "Consumo mínimo faturável pela fase", Entrada, "kWh", "50"),
        v("entrada.tipo_telhado", "tipo_telhado", "Tipo de telhado", "Cobertura onde o sistema será instalado", Entrada, "", "Cerâmico"),
        v("entrada.distancia_inversor", "distancia_inversor", "Distância até o inversor", "Distância estimada entre arranjo e inversor", Entrada, "m", "15").not_implemented(),
        // ---------------------------------------------------------------------
        // sistema_solar
        // ---------------------------------------------------------------------
        v("sistema_solar.potencia_sistema", "potencia_sistema", "Potência do sistema", "Potência de pico do gerador", SistemaSolar, "kWp", "4,40"),
        v("sistema_solar.geracao_mensal", "geracao_mensal", "Geração mensal", "Geração média mensal estimada", SistemaSolar, "kWh", "480"),
        v("sistema_solar.geracao_anual", "geracao_anual", "Geração anual", "Geração média mensal × 12", SistemaSolar, "kWh", "5.760"),
        v("sistema_solar.cobertura_consumo", "cobertura_consumo", "Cobertura do consumo", "Geração mensal sobre consumo mensal", SistemaSolar, "%", "96%"),
        v("sistema_solar.modulo_fabricante", "modulo_fabricante", "Fabricante dos módulos", "", SistemaSolar, "", "Canadian Solar"),
        v("sistema_solar.modulo_modelo", "modulo_modelo", "Modelo dos módulos", "", SistemaSolar, "", "CS6W-550MS"),
        v("sistema_solar.modulo_potencia", "modulo_potencia", "Potência do módulo", "Potência nominal de cada módulo", SistemaSolar, "Wp", "550"),
        v("sistema_solar.modulo_quantidade", "modulo_quantidade", "Quantidade de módulos", "", SistemaSolar, "un", "8"),
        v("sistema_solar.inversor_fabricante", "inversor_fabricante", "Fabricante do inversor", "", SistemaSolar, "", "Growatt"),
        v("sistema_solar.inversor_modelo", "inversor_modelo", "Modelo do inversor", "", SistemaSolar, "", "MIN 5000TL-X"),
        v("sistema_solar.inversor_potencia", "inversor_potencia", "Potência do inversor", "Potência nominal CA por inversor", SistemaSolar, "kW", "5,0"),
        v("sistema_solar.inversor_quantidade", "inversor_quantidade", "Quantidade de inversores", "", SistemaSolar, "un", "1"),
        v("sistema_solar.estrutura", "tipo_estrutura", "Estrutura de fixação", "Tipo de estrutura do kit", SistemaSolar, "", "Telhado cerâmico"),
        v("sistema_solar.area_necessaria", "area_necessaria", "Área necessária", "Área ocupada pelos módulos", SistemaSolar, "m²", "20,8"),
        v("sistema_solar.garantia_modulos", "garantia_modulos", "Garantia dos módulos", "Garantia de produto dos módulos", SistemaSolar, "anos", "12"),
        v("sistema_solar.garantia_inversor", "garantia_inversor", "Garantia do inversor", "", SistemaSolar, "anos", "10"),
        v("sistema_solar.co2_evitado", "co2_evitado", "CO₂ evitado", "Emissões evitadas por ano", SistemaSolar, "kg/ano", "1.210"),
        v("sistema_solar.arvores_equivalentes", "arvores_equivalentes", "Árvores equivalentes", "Árvores plantadas equivalentes ao CO₂ evitado", SistemaSolar, "un", "8").not_implemented(),
        // ---------------------------------------------------------------------
        // financeiro
        // ---------------------------------------------------------------------
        v("financeiro.preco_total", "preco_total", "Preço total", "Valor final do sistema instalado", Financeiro, "R$", "R$ 22.900,00"),
        v("financeiro.preco_kwp", "preco_kwp", "Preço por kWp", "Preço total dividido pela potência", Financeiro, "R$/kWp", "R$ 5.204,55"),
        v("financeiro.preco_kit", "preco_kit", "Preço do kit", "Valor dos equipamentos", Financeiro, "R$", "R$ 14.500,00"),
        v("financeiro.preco_servicos", "preco_servicos", "Preço dos serviços", "Soma dos serviços incluídos", Financeiro, "R$", "R$ 6.200,00"),
        v("financeiro.desconto", "desconto", "Desconto", "Desconto concedido em reais", Financeiro, "R$", "R$ 500,00"),
        v("financeiro.desconto_percentual", "desconto_percentual", "Desconto (%)", "Desconto sobre o preço de tabela", Financeiro, "%", "2,00%"),
        v("financeiro.margem_percentual", "margem", "Margem", "Margem bruta da venda", Financeiro, "%", "28,00%").only(Contrato),
        v("financeiro.economia_mensal", "economia_mensal", "Economia mensal", "Economia estimada na conta de luz por mês", Financeiro, "R$", "R$ 265,50"),
        v("financeiro.economia_anual", "economia_anual", "Economia anual", "Economia mensal × 12", Financeiro, "R$", "R$ 3.186,00"),
        v("financeiro.economia_25_anos", "economia_25_anos", "Economia em 25 anos", "Economia acumulada com inflação energética e degradação", Financeiro, "R$", "R$ 112.430,00"),
        v("financeiro.roi_25_anos", "roi", "Retorno sobre o investimento", "Economia em 25 anos sobre o preço total", Financeiro, "%", "390,96%"),
        v("financeiro.payback_meses", "payback_meses", "Payback (meses)", "Meses até a economia pagar o sistema", Financeiro, "meses", "51"),
        v("financeiro.payback_anos", "payback_anos", "Payback (anos)", "Payback em anos, uma casa decimal", Financeiro, "anos", "4,3"),
        v("financeiro.payback_texto", "payback", "Payback por extenso", "Payback em anos e meses", Financeiro, "", "4 anos e 3 meses"),
        v("financeiro.tir", "tir", "TIR", "Taxa interna de retorno", Financeiro, "%", "24,5%").not_implemented(),
        v("financeiro.vpl", "vpl", "VPL", "Valor presente líquido", Financeiro, "R$", "R$ 41.000,00").not_implemented(),
        v("financeiro.forma_pagamento", "forma_pagamento", "Forma de pagamento", "Opção de pagamento escolhida", Financeiro, "", "Financiamento"),
        v("financeiro.valor_entrada", "valor_entrada", "Valor de entrada", "", Financeiro, "R$", "R$ 2.000,00"),
        v("financeiro.num_parcelas", "num_parcelas", "Número de parcelas", "", Financeiro, "", "60"),
        v("financeiro.valor_parcela", "valor_parcela", "Valor da parcela", "", Financeiro, "R$", "R$ 489,90"),
        v("financeiro.taxa_juros", "taxa_juros", "Taxa de juros", "Taxa mensal do financiamento", Financeiro, "% a.m.", "1,49%"),
        v("financeiro.financiadora", "financiadora", "Financiadora", "Instituição do financiamento", Financeiro, "", "BV Financeira"),
        v("financeiro.parcela_vs_conta", "parcela_vs_conta", "Parcela × economia", "Diferença entre economia mensal e parcela", Financeiro, "R$", "R$ -224,40"),
        // ---------------------------------------------------------------------
        // conta_energia (tarifa / gd / alerta / aneel)
        // ---------------------------------------------------------------------
        v("tarifa.te_kwh", "tarifa_te", "TE", "Tarifa de energia", ContaEnergia, "R$/kWh", "0,45000"),
        v("tarifa.fio_b_kwh", "tarifa_fio_b", "TUSD Fio B", "Parcela Fio B usada no cálculo", ContaEnergia, "R$/kWh", "0,35000"),
        v("tarifa.fio_b_real_kwh", "tarifa_fio_b_real", "TUSD Fio B (publicado)", "Fio B publicado pela ANEEL, quando disponível", ContaEnergia, "R$/kWh", "0,34120"),
        v("tarifa.fio_a_kwh", "tarifa_fio_a", "TUSD Fio A", "", ContaEnergia, "R$/kWh", "0,08000"),
        v("tarifa.tfsee_kwh", "tarifa_tfsee", "TFSEE", "Taxa de fiscalização", ContaEnergia, "R$/kWh", "0,00090"),
        v("tarifa.pnd_kwh", "tarifa_pnd", "P&D", "Encargo de pesquisa e desenvolvimento", ContaEnergia, "R$/kWh", "0,00500"),
        v("tarifa.tusd_total_kwh", "tarifa_tusd", "TUSD total", "", ContaEnergia, "R$/kWh", "0,48000"),
        v("tarifa.total_kwh", "tarifa_total", "Tarifa total", "TE + TUSD", ContaEnergia, "R$/kWh", "0,93000"),
        v("tarifa.vigencia", "tarifa_vigencia", "Vigência da tarifa", "Início de vigência da resolução tarifária", ContaEnergia, "", "22/04/2025"),
        v("tarifa.origem", "tarifa_origem", "Origem da tarifa", "Fonte dos valores tarifários", ContaEnergia, "", "ANEEL"),
        v("tarifa.precisao", "tarifa_precisao", "Precisão da tarifa", "EXATO quando publicado, ESTIMADO quando derivado", ContaEnergia, "", "EXATO"),
        v("tarifa.status_validacao", "tarifa_status", "Status de validação", "", ContaEnergia, "", "validado").only(Proposta),
        v("gd.percentual_fio_b", "percentual_fio_b", "Fio B cobrado", "Parcela do Fio B cobrada no ano de referência", ContaEnergia, "%", "60%"),
        v("gd.ano_referencia", "ano_referencia_gd", "Ano de referência", "Ano usado na escala do Fio B", ContaEnergia, "", "2026"),
        v("gd.valor_credito_kwh", "valor_credito_kwh", "Valor do crédito", "Valor de cada kWh compensado", ContaEnergia, "R$/kWh", "0,590000"),
        v("gd.energia_compensada", "energia_compensada", "Energia compensada", "", ContaEnergia, "kWh", "450,0 kWh"),
        v("gd.consumo_compensavel", "consumo_compensavel", "Consumo compensável", "Consumo acima do custo de disponibilidade", ContaEnergia, "kWh", "450,0 kWh"),
        v("gd.alertas", "alertas_calculo", "Alertas do cálculo", "Avisos regulatórios e de qualidade de dados", ContaEnergia, "", "").only(Proposta),
        v("conta_energia.valor_atual", "conta_atual", "Conta atual", "Conta mensal estimada sem o sistema", ContaEnergia, "R$", "R$ 465,00"),
        v("conta_energia.valor_com_solar", "conta_com_solar", "Conta com solar", "Conta mensal estimada com o sistema", ContaEnergia, "R$", "R$ 199,50"),
        v("conta_energia.reducao_percentual", "reducao_conta", "Redução da conta", "", ContaEnergia, "%", "57,10%"),
        v("conta_energia.custo_disponibilidade_rs", "custo_disponibilidade_rs", "Custo de disponibilidade (R$)", "", ContaEnergia, "R$", "R$ 46,50"),
        v("conta_energia.bandeira", "bandeira", "Bandeira tarifária", "", ContaEnergia, "", "Verde").not_implemented(),
        v("alerta.estimado.texto_pdf", "alerta_estimado", "Aviso de tarifa estimada", "Texto de aviso exibido quando a tarifa é estimada", ContaEnergia, "", "").only(Proposta),
        v("aneel.ultima_sincronizacao", "aneel_sincronizacao", "Última sincronização ANEEL", "", ContaEnergia, "", "03/05/2025"),
        v("aneel.resolucao", "aneel_resolucao", "Resolução homologatória", "", ContaEnergia, "", "REH 3.441/2025"),
        // ---------------------------------------------------------------------
        // comercial
        // ---------------------------------------------------------------------
        v("comercial.proposta_numero", "numero_proposta", "Número da proposta", "", Comercial, "", "PRP-2025-0142"),
        v("comercial.proposta_versao", "versao_proposta", "Versão da proposta", "", Comercial, "", "3"),
        v("comercial.proposta_data", "data_proposta", "Data da proposta", "", Comercial, "", "12/05/2025"),
        v("comercial.proposta_validade", "validade_proposta", "Validade da proposta", "Data limite da proposta", Comercial, "", "27/05/2025"),
        v("comercial.validade_dias", "validade_dias", "Validade (dias)", "", Comercial, "dias", "15"),
        v("comercial.prazo_instalacao", "prazo_instalacao", "Prazo de instalação", "", Comercial, "dias", "30"),
        v("comercial.garantia_instalacao", "garantia_instalacao", "Garantia da instalação", "", Comercial, "anos", "1"),
        v("comercial.observacoes", "observacoes", "Observações", "", Comercial, "", ""),
        v("comercial.consultor_nome", "consultor", "Consultor", "", Comercial, "", "Marina Duarte"),
        v("comercial.consultor_email", "consultor_email", "E-mail do consultor", "", Comercial, "", "marina@empresa.com.br"),
        v("comercial.consultor_telefone", "consultor_telefone", "Telefone do consultor", "", Comercial, "", "(31) 99999-0000"),
        v("comercial.empresa_nome", "empresa", "Empresa", "Razão social / nome fantasia do integrador", Comercial, "", "Sol Forte Energia"),
        v("comercial.empresa_cnpj", "empresa_cnpj", "CNPJ da empresa", "", Comercial, "", "12.345.678/0001-90"),
        v("comercial.empresa_telefone", "empresa_telefone", "Telefone da empresa", "", Comercial, "", "(31) 3333-0000"),
        v("comercial.empresa_email", "empresa_email", "E-mail da empresa", "", Comercial, "", "contato@empresa.com.br"),
        v("comercial.empresa_site", "empresa_site", "Site da empresa", "", Comercial, "", "www.empresa.com.br"),
        v("comercial.empresa_endereco", "empresa_endereco", "Endereço da empresa", "", Comercial, "", "Av. Afonso Pena, 1000"),
        v("comercial.empresa_cidade", "empresa_cidade", "Cidade da empresa", "", Comercial, "", "Belo Horizonte/MG"),
        // ---------------------------------------------------------------------
        // cliente
        // ---------------------------------------------------------------------
        v("cliente.nome", "cliente_nome", "Nome do cliente", "", Cliente, "", "João da Silva"),
        v("cliente.primeiro_nome", "cliente_primeiro_nome", "Primeiro nome", "Primeiro nome do cliente", Cliente, "", "João").only(Email),
        v("cliente.cpf_cnpj", "cliente_documento", "CPF/CNPJ", "", Cliente, "", "123.456.789-00"),
        v("cliente.email", "cliente_email", "E-mail do cliente", "", Cliente, "", "joao@email.com"),
        v("cliente.telefone", "cliente_telefone", "Telefone do cliente", "", Cliente, "", "(31) 98888-7777"),
        v("cliente.empresa", "cliente_empresa", "Empresa do cliente", "", Cliente, "", ""),
        v("cliente.endereco", "cliente_endereco", "Endereço do cliente", "Logradouro e número", Cliente, "", "Rua das Flores, 120"),
        v("cliente.bairro", "cliente_bairro", "Bairro", "", Cliente, "", "Centro"),
        v("cliente.cidade", "cliente_cidade", "Cidade do cliente", "", Cliente, "", "Belo Horizonte"),
        v("cliente.estado", "cliente_estado", "UF do cliente", "", Cliente, "", "MG"),
        v("cliente.cep", "cliente_cep", "CEP", "", Cliente, "", "30110-000"),
        v("cliente.endereco_completo", "cliente_endereco_completo", "Endereço completo", "Endereço, bairro, cidade/UF e CEP", Cliente, "", "Rua das Flores, 120 - Centro, Belo Horizonte/MG, 30110-000"),
        // ---------------------------------------------------------------------
        // tabelas
        // ---------------------------------------------------------------------
        v("tabelas.opcoes_pagamento", "tabela_pagamentos", "Tabela de pagamentos", "Uma linha por opção de pagamento", Tabelas, "", "À vista: R$ 22.900,00"),
        v("tabelas.servicos", "tabela_servicos", "Tabela de serviços", "Uma linha por serviço incluído", Tabelas, "", "Instalação: R$ 4.000,00"),
        v("tabelas.itens_kit", "tabela_kit", "Itens do kit", "Uma linha por item do kit", Tabelas, "", "8x Módulo 550 Wp"),
        v("tabelas.ucs", "tabela_ucs", "Unidades consumidoras", "Uma linha por UC", Tabelas, "", "UC 3001234567: 500 kWh"),
        // ---------------------------------------------------------------------
        // series
        // ---------------------------------------------------------------------
        v("series.geracao_mensal", "serie_geracao", "Geração mês a mês", "Geração estimada por mês do ano", Series, "kWh", "Jan: 520 | Fev: 498").series(),
        v("series.consumo_mensal", "serie_consumo", "Consumo mês a mês", "Histórico de consumo da UC principal", Series, "kWh", "Jan: 480 | Fev: 510").series(),
        v("series.economia_anual", "serie_economia", "Economia ano a ano", "Economia projetada por ano", Series, "R$", "Ano 1: R$ 3.186,00").series(),
        v("series.fluxo_caixa", "serie_fluxo_caixa", "Fluxo de caixa", "Fluxo de caixa acumulado por ano", Series, "R$", "").series().not_implemented(),
        v("series.irradiacao_mensal", "serie_irradiacao", "Irradiação mês a mês", "", Series, "kWh/m²/dia", "").series().not_implemented(),
        // ---------------------------------------------------------------------
        // premissas
        // ---------------------------------------------------------------------
        v("premissas.inflacao_energetica", "inflacao_energetica", "Inflação energética", "Reajuste anual estimado da tarifa", Premissas, "% a.a.", "6,50%"),
        v("premissas.degradacao_anual", "degradacao_modulos", "Degradação anual", "Perda anual de eficiência dos módulos", Premissas, "% a.a.", "0,50%"),
        v("premissas.perdas_sistema", "perdas_sistema", "Perdas do sistema", "", Premissas, "%", "20,00%"),
        v("premissas.irradiacao_media", "irradiacao", "Irradiação média", "", Premissas, "kWh/m²/dia", "5,12"),
        v("premissas.vida_util", "vida_util", "Vida útil", "Horizonte da projeção", Premissas, "anos", "25"),
        v("premissas.imposto_percentual", "imposto", "Impostos", "", Premissas, "%", "8,00%").only(Contrato),
        v("premissas.ano_calculo", "ano_calculo", "Ano do cálculo", "", Premissas, "", "2026"),
        // ---------------------------------------------------------------------
        // cdd (campos dinâmicos do negócio)
        // ---------------------------------------------------------------------
        v("cdd.origem_lead", "origem_lead", "Origem do lead", "", Cdd, "", "Instagram"),
        v("cdd.segmento", "segmento", "Segmento", "", Cdd, "", "Residencial"),
        v("cdd.etapa_funil", "etapa_funil", "Etapa do funil", "", Cdd, "", "Proposta enviada").only(Proposta),
        // ---------------------------------------------------------------------
        // customizada
        // ---------------------------------------------------------------------
        v("customizada.campo_1", "campo_customizado_1", "Campo customizado 1", "Livre, preenchido pelo integrador", Customizada, "", ""),
        v("customizada.campo_2", "campo_customizado_2", "Campo customizado 2", "Livre, preenchido pelo integrador", Customizada, "", ""),
        v("customizada.campo_3", "campo_customizado_3", "Campo customizado 3", "Livre, preenchido pelo integrador", Customizada, "", ""),
    ]
}
