//! Helio CLI
//!
//! Administrative and CI front end for:
//! - Running the Grupo B net-metering calculation on a JSON input
//! - Resolving a proposal context into template variables (with PDF gating)
//! - Rendering a stored template against a proposal context
//! - Auditing stored templates against the variable catalog
//! - Browsing the variable catalog

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use helio_catalog::{normalize_key, AppliesTo, Catalog, CatalogVariable, Category, CATALOG_VERSION};
use helio_resolver::{ProposalResolver, ProposalResolverContext, ResolverResult};
use helio_tariff::{CalcGrupoBInput, TariffEngine};
use helio_template::{TemplateAuditor, TemplateSource};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "helio")]
#[command(author, version, about = "Helio: solar proposal variables and Lei 14.300 tariff engine")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Overrides HELIO_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Grupo B calculation (`CalcGrupoBInput` JSON → `CalcGrupoBResult` JSON).
    Calc {
        /// Input JSON file (`-` for stdin)
        input: PathBuf,
        /// Fio B schedule JSON (default: HELIO_FIO_B_SCHEDULE, then the built-in table)
        #[arg(long)]
        schedule: Option<PathBuf>,
    },

    /// Resolve a proposal context into the flat variable map.
    Resolve {
        /// Context JSON file (`-` for stdin)
        context: PathBuf,
        /// Compute `gdResult` from this `CalcGrupoBInput` JSON first
        #[arg(long)]
        gd_input: Option<PathBuf>,
        /// Fio B schedule JSON used with `--gd-input`
        #[arg(long)]
        schedule: Option<PathBuf>,
        /// Comma-separated required keys (default: HELIO_REQUIRED_KEYS, then built-in)
        #[arg(long)]
        required: Option<String>,
        /// Exit with an error when PDF generation is blocked
        #[arg(long)]
        strict: bool,
    },

    /// Resolve a context and substitute it into a template.
    Render {
        /// Template file (mustache and/or bracket placeholders)
        template: PathBuf,
        /// Context JSON file (`-` for stdin)
        #[arg(short, long)]
        context: PathBuf,
        /// Comma-separated required keys
        #[arg(long)]
        required: Option<String>,
        /// Refuse to render when PDF generation is blocked
        #[arg(long)]
        strict: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Audit templates against the catalog (unregistered references, orphaned entries).
    Audit {
        /// Template files
        #[arg(required = true)]
        templates: Vec<PathBuf>,
        /// Emit the full audit as JSON
        #[arg(long)]
        json: bool,
        /// Exit with an error if any template uses an unregistered variable
        #[arg(long)]
        deny_unregistered: bool,
    },

    /// Browse the variable catalog.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List entries, optionally filtered.
    List {
        /// Category (e.g. `financeiro`, `sistema_solar`)
        #[arg(long)]
        category: Option<String>,
        /// Only entries usable in this document kind
        #[arg(long, value_enum)]
        document: Option<DocumentKind>,
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive search over labels, descriptions and keys.
    Search {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one entry, by any key spelling.
    Show { key: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentKind {
    Proposta,
    Contrato,
    Email,
}

impl From<DocumentKind> for AppliesTo {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Proposta => AppliesTo::Proposta,
            DocumentKind::Contrato => AppliesTo::Contrato,
            DocumentKind::Email => AppliesTo::Email,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Calc { input, schedule } => cmd_calc(&input, schedule.as_deref()),
        Commands::Resolve {
            context,
            gd_input,
            schedule,
            required,
            strict,
        } => cmd_resolve(
            &context,
            gd_input.as_deref(),
            schedule.as_deref(),
            required.as_deref(),
            strict,
        ),
        Commands::Render {
            template,
            context,
            required,
            strict,
            out,
        } => cmd_render(&template, &context, required.as_deref(), strict, out.as_deref()),
        Commands::Audit {
            templates,
            json,
            deny_unregistered,
        } => cmd_audit(&templates, json, deny_unregistered),
        Commands::Catalog { command } => cmd_catalog(command),
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let directive = config::log_filter(verbose)?;
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("invalid log filter {directive:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

// ============================================================================
// calc
// ============================================================================

fn cmd_calc(input: &Path, schedule: Option<&Path>) -> Result<()> {
    let engine = TariffEngine::new(config::fio_b_schedule(schedule)?);
    let calc_input: CalcGrupoBInput = read_json(input)?;
    let result = engine.calc(&calc_input);

    eprintln!(
        "{} {} {}: compensado {:.1} kWh × R$ {:.6}/kWh = R$ {:.2}",
        "ok".green().bold(),
        result.regra_aplicada,
        result.ano,
        result.energia_compensada_kwh,
        result.valor_credito_kwh,
        result.economia_mensal_rs
    );
    for alerta in &result.alertas {
        eprintln!("  {} {}", "alerta:".yellow().bold(), alerta);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

// ============================================================================
// resolve / render
// ============================================================================

fn resolve_context(
    context: &Path,
    gd_input: Option<&Path>,
    schedule: Option<&Path>,
    required: Option<&str>,
) -> Result<ResolverResult> {
    let mut ctx: ProposalResolverContext = read_json(context)?;
    if let Some(gd_input) = gd_input {
        let engine = TariffEngine::new(config::fio_b_schedule(schedule)?);
        let calc_input: CalcGrupoBInput = read_json(gd_input)?;
        ctx.gd_result = Some(engine.calc(&calc_input));
    }
    let resolver = ProposalResolver::new(Catalog::builtin(), config::resolver_config(required)?);
    Ok(resolver.resolve(&ctx))
}

/// Print the gate status; error out under `--strict` when blocked.
fn report_gate(result: &ResolverResult, strict: bool) -> Result<()> {
    if result.can_generate_pdf {
        eprintln!(
            "{} resolved {} variables ({} fallbacks, precisão {})",
            "ok".green().bold(),
            result.variables.len() / 2,
            result.fallbacks.len(),
            result.precisao
        );
        return Ok(());
    }
    let missing = result.missing_required.join(", ");
    if strict {
        return Err(anyhow!("PDF generation blocked; missing required variables: {missing}"));
    }
    eprintln!(
        "{} PDF generation blocked; missing required variables: {}",
        "warn:".yellow().bold(),
        missing
    );
    Ok(())
}

fn cmd_resolve(
    context: &Path,
    gd_input: Option<&Path>,
    schedule: Option<&Path>,
    required: Option<&str>,
    strict: bool,
) -> Result<()> {
    let result = resolve_context(context, gd_input, schedule, required)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    report_gate(&result, strict)
}

fn cmd_render(
    template: &Path,
    context: &Path,
    required: Option<&str>,
    strict: bool,
    out: Option<&Path>,
) -> Result<()> {
    let text = read_input(template)?;
    let result = resolve_context(context, None, None, required)?;
    report_gate(&result, strict)?;

    let rendered = Catalog::builtin().replace_variables(&text, &result.variables);
    match out {
        Some(out) => {
            fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

// ============================================================================
// audit
// ============================================================================

fn cmd_audit(templates: &[PathBuf], json: bool, deny_unregistered: bool) -> Result<()> {
    let sources = templates
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(TemplateSource::new(name, read_input(path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let audit = TemplateAuditor::default().audit_many(&sources);

    if json {
        println!("{}", serde_json::to_string_pretty(&audit)?);
    } else {
        for t in &audit.per_template {
            let status = if t.audit.unregistered_count == 0 {
                "ok".green().bold()
            } else {
                "warn".yellow().bold()
            };
            println!(
                "{} {} ({} variables, {} registered, {} unregistered)",
                status,
                t.name.bold(),
                t.audit.total,
                t.audit.registered_count,
                t.audit.unregistered_count
            );
            for raw in &t.audit.unregistered {
                println!("  {} {}", "unregistered:".red(), raw);
            }
        }
        println!(
            "{} {} of {} catalog entries unused by every template",
            "info:".yellow().bold(),
            audit.global_orphaned.len(),
            Catalog::builtin().len()
        );
    }

    if deny_unregistered && !audit.global_unregistered.is_empty() {
        return Err(anyhow!(
            "{} unregistered variable(s): {}",
            audit.global_unregistered.len(),
            audit.global_unregistered.join(", ")
        ));
    }
    Ok(())
}

// ============================================================================
// catalog
// ============================================================================

fn cmd_catalog(command: CatalogCommands) -> Result<()> {
    let catalog = Catalog::builtin();
    match command {
        CatalogCommands::List {
            category,
            document,
            json,
        } => {
            let category = category
                .map(|c| {
                    Category::parse(&c).ok_or_else(|| {
                        let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                        anyhow!("unknown category {c:?} (expected one of: {})", known.join(", "))
                    })
                })
                .transpose()?;
            let entries: Vec<&CatalogVariable> = catalog
                .entries()
                .iter()
                .filter(|v| category.map_or(true, |c| v.category == c))
                .filter(|v| document.map_or(true, |d| v.applies_to.covers(d.into())))
                .collect();
            print_entries(&entries, json)?;
            if !json {
                eprintln!(
                    "{} {} entries (catalog {})",
                    "ok".green().bold(),
                    entries.len(),
                    CATALOG_VERSION
                );
            }
        }
        CatalogCommands::Search { query, json } => {
            let entries = catalog.search(&query);
            if entries.is_empty() && !json {
                eprintln!("{} no entries match {query:?}", "info:".yellow().bold());
            }
            print_entries(&entries, json)?;
        }
        CatalogCommands::Show { key } => {
            let dotted = normalize_key(&key);
            let entry = catalog
                .find_variable(&format!("{{{{{dotted}}}}}"))
                .ok_or_else(|| anyhow!("no catalog entry for {key:?}"))?;
            print_entry_detail(entry);
        }
    }
    Ok(())
}

fn print_entries(entries: &[&CatalogVariable], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    for v in entries {
        let mut line = format!("{:<44} {:<28} {}", v.canonical_key, v.legacy_key, v.label);
        if v.not_implemented {
            line.push_str(" (not implemented)");
        }
        println!("{line}");
    }
    Ok(())
}

fn print_entry_detail(v: &CatalogVariable) {
    println!("{}", v.label.bold());
    println!("  canonical:   {}", v.canonical_key);
    println!("  legacy:      {}", v.legacy_key);
    println!("  category:    {}", v.category);
    println!("  applies to:  {:?}", v.applies_to);
    if !v.description.is_empty() {
        println!("  description: {}", v.description);
    }
    if !v.unit.is_empty() {
        println!("  unit:        {}", v.unit);
    }
    if !v.example.is_empty() {
        println!("  example:     {}", v.example);
    }
    if v.is_series {
        println!("  series:      yes");
    }
    if v.not_implemented {
        println!("  {}", "not implemented: always resolves to the placeholder".yellow());
    }
}
