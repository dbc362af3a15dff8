use helio_catalog::Catalog;
use helio_resolver::*;
use helio_tariff::{
    calc_grupo_b, CalcGrupoBInput, CustoDisponibilidade, Fase, Precisao, RegraGd, TariffComponents,
};
use proptest::prelude::*;
use serde_json::json;

fn gd2_result(precisao: Option<Precisao>) -> helio_tariff::CalcGrupoBResult {
    calc_grupo_b(&CalcGrupoBInput {
        regra: RegraGd::GdII,
        fase: Fase::Bifasico,
        geracao_mensal_kwh: 480.0,
        consumo_mensal_kwh: 500.0,
        tarifa: TariffComponents {
            te_kwh: 0.45,
            tusd_fio_b_kwh: 0.35,
            vigencia_inicio: Some("2025-04-22".into()),
            origem: Some("ANEEL".into()),
            precisao,
            ..TariffComponents::default()
        },
        custo_disponibilidade: CustoDisponibilidade::default(),
        ano: 2026,
    })
}

fn full_context() -> ProposalResolverContext {
    ProposalResolverContext {
        cliente: Some(ClienteContext {
            nome: Some("Maria Aparecida Souza".into()),
            email: Some("maria@example.com".into()),
            endereco: Some("Rua das Flores, 123".into()),
            bairro: Some("Centro".into()),
            cidade: Some("Campinas".into()),
            estado: Some("SP".into()),
            cep: Some("13010-000".into()),
            ..Default::default()
        }),
        comercial: Some(ComercialContext {
            proposta_numero: Some("PR-2025-0042".into()),
            proposta_versao: Some(2),
            proposta_data: Some("2025-05-12".into()),
            validade_dias: Some(15),
            ..Default::default()
        }),
        ucs: vec![UnidadeConsumidora {
            numero: Some("1234567".into()),
            consumo_mensal_kwh: Some(500.0),
            fase: Some(Fase::Bifasico),
            historico_consumo_kwh: vec![520.0, 1498.0],
            ..Default::default()
        }],
        tariff_version: Some(TariffVersionContext {
            te_kwh: Some(0.45),
            tusd_fio_b_kwh: Some(0.35),
            tusd_total_kwh: Some(0.40),
            fio_b_real_kwh: Some(0.35),
            vigencia_inicio: Some("2025-04-22".into()),
            origem: Some("ANEEL".into()),
            precisao: Some(Precisao::Exato),
            ..Default::default()
        }),
        gd_result: Some(gd2_result(Some(Precisao::Exato))),
        totais: Some(TotaisCalculados {
            potencia_kwp: Some(4.4),
            preco_total: Some(22900.0),
            ..Default::default()
        }),
        pagamento_opcoes: vec![
            PagamentoOpcao {
                nome: "À vista".into(),
                valor_total: Some(22900.0),
                ..Default::default()
            },
            PagamentoOpcao {
                nome: "Financiamento".into(),
                num_parcelas: Some(60),
                valor_parcela: Some(489.9),
                financiadora: Some("Banco Solar".into()),
                selecionada: true,
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

#[test]
fn empty_context_blocks_generation() {
    let result = resolve_proposal_variables(&ProposalResolverContext::default());
    assert!(!result.can_generate_pdf);
    assert!(result.missing_required.contains(&"cliente.nome".to_string()));
    assert_eq!(result.precisao, Precisao::Desconhecido);
    // Unknown precision still shows the disclaimer.
    assert_eq!(result.get("alerta.estimado.texto_pdf"), Some(ALERTA_ESTIMADO_TEXTO));
}

#[test]
fn exact_tariff_propagates_precision_and_hides_disclaimer() {
    let result = resolve_proposal_variables(&full_context());
    assert_eq!(result.precisao, Precisao::Exato);
    assert_eq!(result.get("tarifa.precisao"), Some("EXATO"));
    assert_eq!(result.get("alerta.estimado.texto_pdf"), Some(""));
    assert_eq!(result.get("[alerta_estimado]"), Some(""));
}

#[test]
fn estimated_precision_falls_back_to_gd_result() {
    let ctx = ProposalResolverContext {
        gd_result: Some(gd2_result(Some(Precisao::Estimado))),
        ..Default::default()
    };
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.precisao, Precisao::Estimado);
    assert_eq!(result.get("tarifa.precisao"), Some("ESTIMADO"));
    assert_eq!(result.get("alerta.estimado.texto_pdf"), Some(ALERTA_ESTIMADO_TEXTO));
}

#[test]
fn full_context_resolves_the_gd2_worked_example() {
    let result = resolve_proposal_variables(&full_context());
    assert!(result.can_generate_pdf, "missing: {:?}", result.missing_required);

    let expect = |key: &str, value: &str| assert_eq!(result.get(key), Some(value), "{key}");
    expect("cliente.nome", "Maria Aparecida Souza");
    expect("cliente.primeiro_nome", "Maria");
    expect(
        "cliente.endereco_completo",
        "Rua das Flores, 123 - Centro, Campinas/SP, 13010-000",
    );
    expect("entrada.consumo_mensal", "500");
    expect("entrada.consumo_anual", "6.000");
    expect("entrada.fase", "Bifásico");
    expect("entrada.regra_gd", "GD II");
    expect("entrada.custo_disponibilidade", "50");
    expect("sistema_solar.potencia_sistema", "4,40");
    expect("sistema_solar.geracao_mensal", "480");
    expect("sistema_solar.cobertura_consumo", "96%");
    expect("financeiro.preco_total", "R$\u{a0}22.900,00");
    expect("financeiro.economia_mensal", "R$\u{a0}265,50");
    expect("financeiro.economia_anual", "R$\u{a0}3.186,00");
    expect("financeiro.economia_25_anos", "R$\u{a0}79.650,00");
    expect("financeiro.roi_25_anos", "247,82%");
    expect("financeiro.payback_meses", "87");
    expect("financeiro.payback_texto", "7 anos e 3 meses");
    expect("financeiro.num_parcelas", "60");
    expect("financeiro.valor_parcela", "R$\u{a0}489,90");
    expect("financeiro.financiadora", "Banco Solar");
    expect("financeiro.forma_pagamento", "Financiamento");
    expect("gd.percentual_fio_b", "60%");
    expect("gd.ano_referencia", "2026");
    expect("gd.valor_credito_kwh", "0,590000");
    expect("gd.energia_compensada", "450,0 kWh");
    expect("gd.consumo_compensavel", "450,0 kWh");
    expect("tarifa.te_kwh", "0,45000");
    expect("tarifa.total_kwh", "0,85000");
    expect("tarifa.vigencia", "22/04/2025");
    expect("tarifa.origem", "ANEEL");
    expect("comercial.proposta_data", "12/05/2025");
    expect("comercial.proposta_validade", "27/05/2025");
    expect("series.consumo_mensal", "Jan: 520 | Fev: 1.498");
    expect(
        "tabelas.opcoes_pagamento",
        "À vista: R$\u{a0}22.900,00\nFinanciamento: 60x R$\u{a0}489,90",
    );
}

#[test]
fn current_bill_is_derived_from_consumption_and_tariff() {
    let result = resolve_proposal_variables(&full_context());
    // 500 kWh × 0,85 R$/kWh
    assert_eq!(result.get("conta_energia.valor_atual"), Some("R$\u{a0}425,00"));
    assert_eq!(result.get("conta_energia.valor_com_solar"), Some("R$\u{a0}159,50"));
    assert_eq!(result.get("conta_energia.reducao_percentual"), Some("62,47%"));
}

#[test]
fn both_key_forms_are_populated() {
    let result = resolve_proposal_variables(&full_context());
    for entry in Catalog::builtin().entries() {
        let dotted = entry.dotted_key();
        let flat = helio_catalog::flatten_key(dotted);
        assert_eq!(
            result.variables.get(dotted),
            result.variables.get(&flat),
            "{dotted}"
        );
        assert!(result.variables.contains_key(dotted));
    }
    assert_eq!(result.variables.len(), Catalog::builtin().len() * 2);
}

#[test]
fn fallbacks_are_exactly_the_placeholder_entries() {
    let result = resolve_proposal_variables(&full_context());
    for key in &result.fallbacks {
        assert_eq!(result.variables[key], DEFAULT_PLACEHOLDER, "{key}");
    }
    assert!(result.fallbacks.contains(&"financeiro.tir".to_string()));
    assert!(!result.fallbacks.contains(&"cliente.nome".to_string()));
    assert!(result.missing_required.is_empty());
}

#[test]
fn snapshot_wins_over_live_computation() {
    let mut ctx = full_context();
    ctx.final_snapshot = Some(json!({
        "outputs": {
            "financeiro": {"preco_total": "R$ 25.000,00"},
            "cliente": {"nome": ""}
        },
        "inputs": {"cliente.nome": "Nome Congelado"}
    }));
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("financeiro.preco_total"), Some("R$ 25.000,00"));
    // Empty outputs value falls through to inputs.
    assert_eq!(result.get("cliente.nome"), Some("Nome Congelado"));
    // Keys absent from the snapshot still compute live.
    assert_eq!(result.get("entrada.consumo_mensal"), Some("500"));
}

#[test]
fn snapshot_alone_satisfies_required_keys() {
    let ctx = ProposalResolverContext {
        final_snapshot: Some(json!({
            "cliente.nome": "Joana",
            "entrada": {"consumo_mensal": 350},
            "outputs": {"sistema_solar.potencia_sistema": "3,30", "financeiro.preco_total": 18000}
        })),
        ..Default::default()
    };
    let result = resolve_proposal_variables(&ctx);
    assert!(result.can_generate_pdf, "{:?}", result.missing_required);
    assert_eq!(result.get("entrada.consumo_mensal"), Some("350,00"));
    assert_eq!(result.get("financeiro_preco_total"), Some("18.000,00"));
}

#[test]
fn rendering_with_resolved_variables() {
    let result = resolve_proposal_variables(&full_context());
    let text = helio_catalog::replace_variables(
        "Olá [cliente_nome], economia de {{financeiro.economia_mensal}} ({{financeiro.tir}}).",
        &result.variables,
    );
    assert_eq!(
        text,
        "Olá Maria Aparecida Souza, economia de R$\u{a0}265,50 (-)."
    );
}

#[test]
fn every_catalog_key_is_either_handled_extras_only_or_not_implemented() {
    let handled = handled_keys();
    for entry in Catalog::builtin().entries() {
        let dotted = entry.dotted_key();
        let extras_only = dotted.starts_with("cdd.") || dotted.starts_with("customizada.");
        assert!(
            handled.iter().any(|k| *k == dotted) || extras_only || entry.not_implemented,
            "{dotted} has no resolution path"
        );
    }
}

fn arb_context() -> impl Strategy<Value = ProposalResolverContext> {
    (
        proptest::option::of("[A-Za-zÀ-ú ]{0,24}"),
        proptest::option::of(0.0f64..5000.0),
        proptest::option::of(0.0f64..30.0),
        proptest::option::of(0.0f64..200_000.0),
        proptest::option::of(prop_oneof![
            Just(Precisao::Exato),
            Just(Precisao::Estimado),
            Just(Precisao::Desconhecido)
        ]),
        any::<bool>(),
    )
        .prop_map(|(nome, consumo, kwp, preco, precisao, with_gd)| ProposalResolverContext {
            cliente: Some(ClienteContext {
                nome,
                ..Default::default()
            }),
            ucs: vec![UnidadeConsumidora {
                consumo_mensal_kwh: consumo,
                ..Default::default()
            }],
            totais: Some(TotaisCalculados {
                potencia_kwp: kwp,
                preco_total: preco,
                ..Default::default()
            }),
            tariff_version: Some(TariffVersionContext {
                precisao,
                ..Default::default()
            }),
            gd_result: with_gd.then(|| gd2_result(None)),
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn resolution_is_idempotent(ctx in arb_context()) {
        let a = resolve_proposal_variables(&ctx);
        let b = resolve_proposal_variables(&ctx);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_entry_has_a_value_and_gate_matches_missing(ctx in arb_context()) {
        let result = resolve_proposal_variables(&ctx);
        for entry in Catalog::builtin().entries() {
            prop_assert!(result.variables.contains_key(entry.dotted_key()));
        }
        prop_assert_eq!(result.can_generate_pdf, result.missing_required.is_empty());
        for key in &result.missing_required {
            prop_assert!(REQUIRED_KEYS.contains(&key.as_str()));
            prop_assert!(result.fallbacks.contains(key));
        }
    }
}

fn looks_broken(value: &str) -> bool {
    value == "inf" || value.contains("NaN") || value.contains("R$\u{a0}inf") || value.contains("inf%")
}

#[test]
fn validity_past_the_calendar_falls_back() {
    let mut ctx = full_context();
    ctx.comercial.as_mut().unwrap().validade_dias = Some(u32::MAX);
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("comercial.proposta_validade"), Some(DEFAULT_PLACEHOLDER));
    assert_eq!(result.get("comercial.validade_dias"), Some("4294967295"));
    assert_eq!(result.get("comercial.proposta_data"), Some("12/05/2025"));
}

#[test]
fn projection_horizon_is_bounded() {
    let mut ctx = full_context();
    ctx.premissas = Some(Premissas {
        vida_util_anos: Some(400_000_000),
        ..Default::default()
    });
    let result = resolve_proposal_variables(&ctx);
    for key in ["financeiro.economia_25_anos", "financeiro.roi_25_anos", "series.economia_anual"] {
        assert_eq!(result.get(key), Some(DEFAULT_PLACEHOLDER), "{key}");
    }

    ctx.premissas = Some(Premissas {
        vida_util_anos: Some(VIDA_UTIL_MAXIMA),
        ..Default::default()
    });
    let result = resolve_proposal_variables(&ctx);
    let serie = result.get("series.economia_anual").unwrap();
    assert_eq!(serie.split(" | ").count(), VIDA_UTIL_MAXIMA as usize);
    // Flat savings: 50 × R$ 3.186,00.
    assert_eq!(result.get("financeiro.economia_25_anos"), Some("R$\u{a0}159.300,00"));
}

#[test]
fn runaway_inflation_falls_back() {
    let mut ctx = full_context();
    ctx.premissas = Some(Premissas {
        inflacao_energetica_pct: Some(1e300),
        ..Default::default()
    });
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("financeiro.economia_25_anos"), Some(DEFAULT_PLACEHOLDER));
    assert_eq!(result.get("financeiro.roi_25_anos"), Some(DEFAULT_PLACEHOLDER));
    assert_eq!(result.get("series.economia_anual"), Some(DEFAULT_PLACEHOLDER));
    assert_eq!(result.get("financeiro.economia_mensal"), Some("R$\u{a0}265,50"));
}

#[test]
fn blank_payment_name_is_not_a_payment_method() {
    let mut ctx = full_context();
    ctx.pagamento_opcoes = vec![PagamentoOpcao {
        nome: "  Cartão  ".into(),
        ..Default::default()
    }];
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("financeiro.forma_pagamento"), Some("Cartão"));

    ctx.pagamento_opcoes[0].nome = "   ".into();
    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("financeiro.forma_pagamento"), Some(DEFAULT_PLACEHOLDER));
}

fn extreme_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(f64::MAX),
        Just(-f64::MAX),
        Just(f64::MIN_POSITIVE),
        Just(0.0),
        Just(1e300),
        -1e6f64..1e6,
    ]
}

fn arb_extreme_context() -> impl Strategy<Value = ProposalResolverContext> {
    (
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>()),
        (extreme_f64(), extreme_f64(), extreme_f64(), extreme_f64()),
        (extreme_f64(), extreme_f64(), extreme_f64(), extreme_f64()),
    )
        .prop_map(|((validade, vida, versao, parcelas), (consumo, kwp, preco, economia), (inflacao, degradacao, parcela, te))| {
            let mut gd = gd2_result(Some(Precisao::Exato));
            gd.economia_mensal_rs = economia;
            gd.valor_credito_kwh = te;
            ProposalResolverContext {
                cliente: Some(ClienteContext {
                    nome: Some("Maria".into()),
                    ..Default::default()
                }),
                comercial: Some(ComercialContext {
                    proposta_versao: Some(versao),
                    proposta_data: Some("2025-05-12".into()),
                    validade_dias: Some(validade),
                    ..Default::default()
                }),
                ucs: vec![UnidadeConsumidora {
                    consumo_mensal_kwh: Some(consumo),
                    historico_consumo_kwh: vec![consumo, consumo],
                    ..Default::default()
                }],
                premissas: Some(Premissas {
                    inflacao_energetica_pct: Some(inflacao),
                    degradacao_anual_pct: Some(degradacao),
                    vida_util_anos: Some(vida),
                    ..Default::default()
                }),
                tariff_version: Some(TariffVersionContext {
                    te_kwh: Some(te),
                    tusd_fio_b_kwh: Some(te),
                    ..Default::default()
                }),
                totais: Some(TotaisCalculados {
                    potencia_kwp: Some(kwp),
                    preco_total: Some(preco),
                    geracao_mensal_serie_kwh: vec![kwp, consumo],
                    ..Default::default()
                }),
                pagamento_opcoes: vec![PagamentoOpcao {
                    nome: "Financiamento".into(),
                    num_parcelas: Some(parcelas),
                    valor_parcela: Some(parcela),
                    selecionada: true,
                    ..Default::default()
                }],
                gd_result: Some(gd),
                ..Default::default()
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn boundary_values_never_break_resolution(ctx in arb_extreme_context()) {
        let result = resolve_proposal_variables(&ctx);
        prop_assert_eq!(result.variables.len(), Catalog::builtin().len() * 2);
        for (key, value) in &result.variables {
            prop_assert!(!looks_broken(value), "{} = {}", key, value);
        }
    }
}
