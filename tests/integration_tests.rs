//! Integration tests for the complete Helio pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Tariff engine → Resolver → rendered template
//! - Template audit → Catalog aliasing
//! - Configurable Fio B schedule → Resolver precision
//!
//! Run with: cargo test --test integration_tests

use approx::assert_relative_eq;
use helio_catalog::{replace_variables, AppliesTo, Catalog};
use helio_resolver::{
    resolve_proposal_variables, ClienteContext, ProposalResolver, ProposalResolverContext,
    ResolverConfig, TariffVersionContext, TotaisCalculados, UnidadeConsumidora,
};
use helio_tariff::{
    calc_grupo_b, CalcGrupoBInput, CustoDisponibilidade, Fase, FioBFallback, FioBSchedule,
    Precisao, RegraGd, TariffComponents, TariffEngine,
};
use helio_template::{audit_multiple_templates, audit_template, TemplateSource};

fn gd_input(regra: RegraGd, ano: i32, precisao: Precisao) -> CalcGrupoBInput {
    CalcGrupoBInput {
        regra,
        fase: Fase::Bifasico,
        geracao_mensal_kwh: 480.0,
        consumo_mensal_kwh: 500.0,
        tarifa: TariffComponents {
            te_kwh: 0.45,
            tusd_fio_b_kwh: 0.35,
            tusd_fio_a_kwh: Some(0.20),
            tfsee_kwh: Some(0.01),
            pnd_kwh: Some(0.005),
            precisao: Some(precisao),
            ..TariffComponents::default()
        },
        custo_disponibilidade: CustoDisponibilidade::default(),
        ano,
    }
}

fn context_for(gd: helio_tariff::CalcGrupoBResult) -> ProposalResolverContext {
    ProposalResolverContext {
        cliente: Some(ClienteContext {
            nome: Some("João da Silva".into()),
            ..Default::default()
        }),
        ucs: vec![UnidadeConsumidora {
            consumo_mensal_kwh: Some(500.0),
            fase: Some(Fase::Bifasico),
            ..Default::default()
        }],
        totais: Some(TotaisCalculados {
            potencia_kwp: Some(4.4),
            preco_total: Some(22900.0),
            ..Default::default()
        }),
        gd_result: Some(gd),
        ..Default::default()
    }
}

// ============================================================================
// Tariff engine → Resolver
// ============================================================================

#[test]
fn test_gd2_worked_example_end_to_end() {
    let gd = calc_grupo_b(&gd_input(RegraGd::GdII, 2026, Precisao::Exato));
    assert_relative_eq!(gd.valor_credito_kwh, 0.59, epsilon = 1e-9);
    assert_relative_eq!(gd.economia_mensal_rs, 265.50, epsilon = 1e-9);

    let result = resolve_proposal_variables(&context_for(gd));
    assert!(result.can_generate_pdf);
    assert_eq!(result.precisao, Precisao::Exato);

    let text = replace_variables(
        "Prezado(a) [cliente_nome], sua economia mensal estimada é de {{financeiro.economia_mensal}} \
         ({{gd.percentual_fio_b}} do Fio B cobrado em [ano_referencia_gd]).",
        &result.variables,
    );
    assert_eq!(
        text,
        "Prezado(a) João da Silva, sua economia mensal estimada é de R$\u{a0}265,50 \
         (60% do Fio B cobrado em 2026)."
    );
}

#[test]
fn test_regimes_rank_by_credit_value() {
    let g1 = calc_grupo_b(&gd_input(RegraGd::GdI, 2026, Precisao::Exato));
    let g2 = calc_grupo_b(&gd_input(RegraGd::GdII, 2026, Precisao::Exato));
    let g3 = calc_grupo_b(&gd_input(RegraGd::GdIII, 2026, Precisao::Exato));

    // GD I: TE + full Fio B.
    assert_relative_eq!(g1.valor_credito_kwh, 0.80, epsilon = 1e-9);
    // GD III: TE + Fio B + 40% Fio A + TFSEE + P&D.
    assert_relative_eq!(g3.valor_credito_kwh, 0.45 + 0.35 + 0.08 + 0.01 + 0.005, epsilon = 1e-9);
    assert!(g2.valor_credito_kwh < g1.valor_credito_kwh);
    assert!(!g3.incompleto_gd3);

    let r1 = resolve_proposal_variables(&context_for(g1));
    let r3 = resolve_proposal_variables(&context_for(g3));
    assert_eq!(r1.get("entrada.regra_gd"), Some("GD I"));
    assert_eq!(r3.get("entrada.regra_gd"), Some("GD III"));
}

#[test]
fn test_estimated_tariff_shows_disclaimer_in_rendered_pdf() {
    let gd = calc_grupo_b(&gd_input(RegraGd::GdII, 2026, Precisao::Estimado));
    let mut ctx = context_for(gd);
    ctx.tariff_version = Some(TariffVersionContext {
        te_kwh: Some(0.45),
        tusd_fio_b_kwh: Some(0.35),
        fio_b_real_kwh: None,
        precisao: Some(Precisao::Estimado),
        ..Default::default()
    });

    let result = resolve_proposal_variables(&ctx);
    assert_eq!(result.get("tarifa.precisao"), Some("ESTIMADO"));
    let rendered = replace_variables("[alerta_estimado]", &result.variables);
    assert!(rendered.starts_with("Atenção"));
    // No published Fio B: the "real" value falls back.
    assert_eq!(result.get("tarifa.fio_b_real_kwh"), Some("-"));
}

// ============================================================================
// Configurable schedule
// ============================================================================

#[test]
fn test_schedule_fallback_policies_flow_into_resolution() {
    let nearest = FioBSchedule::default()
        .with_fallback(FioBFallback::MaisProximo)
        .unwrap();
    let gd = TariffEngine::new(nearest).calc(&gd_input(RegraGd::GdII, 2035, Precisao::Exato));
    // Clamped to 2029 (30% charged).
    assert_relative_eq!(gd.percentual_fio_b_cobrado, 0.30, epsilon = 1e-12);
    assert!(gd.alertas.is_empty());

    let strict = FioBSchedule::default()
        .with_fallback(FioBFallback::Estrito)
        .unwrap();
    let gd = TariffEngine::new(strict).calc(&gd_input(RegraGd::GdII, 2035, Precisao::Exato));
    assert_relative_eq!(gd.percentual_fio_b_cobrado, 1.0);
    // Fio B fully charged: only TE is credited.
    assert_relative_eq!(gd.valor_credito_kwh, 0.45, epsilon = 1e-9);
    assert_eq!(gd.alertas.len(), 2);

    let result = resolve_proposal_variables(&context_for(gd));
    let alertas = result.get("gd.alertas").unwrap();
    assert!(alertas.contains("fora da tabela"));
    assert!(alertas.contains("; "));
}

// ============================================================================
// Resolver configuration
// ============================================================================

#[test]
fn test_custom_required_set_gates_generation() {
    let gd = calc_grupo_b(&gd_input(RegraGd::GdII, 2026, Precisao::Exato));
    let ctx = context_for(gd);

    let config = ResolverConfig::default().with_required(["cliente.nome", "[cliente_documento]"]);
    let result = ProposalResolver::new(Catalog::builtin(), config).resolve(&ctx);
    assert!(!result.can_generate_pdf);
    assert_eq!(result.missing_required, vec!["cliente.cpf_cnpj".to_string()]);

    let relaxed = ResolverConfig::default().with_required(["cliente.nome"]);
    assert!(ProposalResolver::new(Catalog::builtin(), relaxed).resolve(&ctx).can_generate_pdf);
}

// ============================================================================
// Template audit ↔ Catalog
// ============================================================================

#[test]
fn test_audit_sees_both_syntaxes_as_the_same_entry() {
    let audit = audit_template("{{cliente.nome}} [cliente_nome] {{fake.variable}}");
    assert_eq!(audit.total, 3);
    assert_eq!(audit.registered_count, 2);
    assert_eq!(audit.unregistered, vec!["{{fake.variable}}".to_string()]);
    assert_eq!(audit.orphaned.len(), Catalog::builtin().len() - 1);
}

#[test]
fn test_every_document_kind_template_is_fully_registered() {
    let catalog = Catalog::builtin();
    let templates: Vec<TemplateSource> = [
        ("proposta", AppliesTo::Proposta),
        ("contrato", AppliesTo::Contrato),
        ("email", AppliesTo::Email),
    ]
    .into_iter()
    .map(|(name, kind)| {
        let body: Vec<&str> = catalog
            .for_document(kind)
            .iter()
            .map(|v| v.legacy_key.as_str())
            .collect();
        TemplateSource::new(name, body.join("\n"))
    })
    .collect();

    let audit = audit_multiple_templates(&templates);
    assert!(audit.global_unregistered.is_empty());
    assert!(audit.global_orphaned.is_empty());
}

#[test]
fn test_resolved_map_renders_every_registered_placeholder() {
    let gd = calc_grupo_b(&gd_input(RegraGd::GdII, 2026, Precisao::Exato));
    let result = resolve_proposal_variables(&context_for(gd));
    for v in Catalog::builtin().entries() {
        let mustache = replace_variables(&v.canonical_key, &result.variables);
        let bracket = replace_variables(&v.legacy_key, &result.variables);
        assert_eq!(mustache, bracket, "{}", v.canonical_key);
        assert_ne!(mustache, v.canonical_key);
    }
}
