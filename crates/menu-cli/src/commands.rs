use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;

use menu_crypto::{ContentDigest, ContentHasher};
use menu_gate::PlanDefinitions;
use menu_sdk::{
    InMemoryDeployment, LedgerConfig, LogAlertSink, PublishReceipt, SnapshotQuery, SnapshotView,
    SweepSummary,
};
use menu_snapshot::{ChainReport, ExportDocument};

use crate::cli::*;
use crate::fixture::Fixture;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Hash(args) => cmd_hash(args, &cli.format),
        Command::VerifyExport(args) => cmd_verify_export(args, &cli.format),
        Command::Demo(args) => cmd_demo(args, &cli.format),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---- hash ----

pub fn canonical_digest(text: &str) -> anyhow::Result<ContentDigest> {
    let value: serde_json::Value = serde_json::from_str(text).context("input is not JSON")?;
    Ok(ContentHasher::hash_canonical(&value)?)
}

fn cmd_hash(args: HashArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let digest = canonical_digest(&read_input(&args.path)?)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "hash": digest })),
        OutputFormat::Text => {
            println!("{}", digest.to_hex());
            Ok(())
        }
    }
}

// ---- verify-export ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCheck {
    pub snapshot_id: String,
    pub organization_id: String,
    pub version: u64,
    pub recorded_hash: ContentDigest,
    pub content_matches: bool,
    /// The exporter itself already flagged the stored snapshot.
    pub flagged_at_export: bool,
}

impl ExportCheck {
    pub fn passed(&self) -> bool {
        self.content_matches && !self.flagged_at_export
    }
}

pub fn check_export(text: &str) -> anyhow::Result<ExportCheck> {
    let document: ExportDocument =
        serde_json::from_str(text).context("input is not a compliance export")?;
    Ok(ExportCheck {
        snapshot_id: document.snapshot_id.to_string(),
        organization_id: document.organization_id.to_string(),
        version: document.version,
        recorded_hash: document.hash,
        content_matches: document.recheck()?,
        flagged_at_export: document.integrity_failure,
    })
}

fn cmd_verify_export(args: VerifyExportArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let check = check_export(&read_input(&args.path)?)?;
    match format {
        OutputFormat::Json => print_json(&check)?,
        OutputFormat::Text => {
            println!(
                "Snapshot {} (version {} of {})",
                check.snapshot_id.yellow(),
                check.version.to_string().bold(),
                check.organization_id.bold()
            );
            println!("  Recorded hash: {}", check.recorded_hash.to_hex().dimmed());
            if check.content_matches {
                println!("  Content: {}", "matches recorded hash".green());
            } else {
                println!("  Content: {}", "does NOT match recorded hash".red().bold());
            }
            if check.flagged_at_export {
                println!("  Exporter: {}", "integrity failure reported".red().bold());
            }
        }
    }
    if !check.passed() {
        bail!("export failed verification");
    }
    if let OutputFormat::Text = format {
        println!("{} Export verified", "✓".green().bold());
    }
    Ok(())
}

// ---- demo ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoOutcome {
    pub prices_recorded: usize,
    pub receipt: PublishReceipt,
    pub export: ExportDocument,
    pub chain: ChainReport,
    pub sweep: SweepSummary,
}

pub fn run_demo(
    fixture: &Fixture,
    config: LedgerConfig,
    plans: Option<PlanDefinitions>,
) -> anyhow::Result<DemoOutcome> {
    let plans = match plans {
        Some(plans) => plans,
        None => fixture.default_plans(&config.publish_feature)?,
    };
    let deployment = InMemoryDeployment::new(&config, plans);
    fixture.seed(&deployment)?;
    let ledger = deployment.ledger(config.clone())?;

    for price in &fixture.prices {
        ledger.record_price_change(
            &price.item,
            price.amount,
            &price.currency,
            price.reason.as_deref(),
            &fixture.publisher,
        )?;
    }

    let org = &fixture.organization.id;
    let receipt = ledger.publish(org, &fixture.publisher)?;
    let export = match ledger.get_snapshot(SnapshotQuery::by_id(receipt.snapshot_id).exported())? {
        SnapshotView::Export { document } => document,
        other => bail!("unexpected snapshot view: {other:?}"),
    };
    let chain = ledger.verify_chain(org)?;

    let sweeper = deployment.sweeper(Arc::new(LogAlertSink), config.sweep.batch_size);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let sweep = runtime.block_on(sweeper.run_once())?;

    Ok(DemoOutcome {
        prices_recorded: fixture.prices.len(),
        receipt,
        export,
        chain,
        sweep,
    })
}

fn cmd_demo(args: DemoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fixture = Fixture::from_file(&args.fixture)?;
    let config = match &args.config {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };
    let plans = args
        .plans
        .as_deref()
        .map(PlanDefinitions::from_file)
        .transpose()?;
    tracing::debug!(fixture = %args.fixture.display(), "running demo");

    let outcome = run_demo(&fixture, config, plans)?;
    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            let receipt = &outcome.receipt;
            println!(
                "{} Published {} version {}",
                "✓".green().bold(),
                receipt.organization_id.to_string().bold(),
                receipt.version.to_string().yellow()
            );
            println!("  Prices recorded: {}", outcome.prices_recorded);
            println!("  Snapshot: {}", receipt.snapshot_id.to_string().cyan());
            println!("  Hash: {}", receipt.hash.to_hex().dimmed());
            let status = if outcome.export.integrity_failure {
                "FAILED".red().bold()
            } else {
                "verified".green()
            };
            println!("  Export: {status}");
            println!(
                "  Chain: {} snapshot(s), {}",
                outcome.chain.length,
                if outcome.chain.is_valid { "intact".green() } else { "broken".red().bold() }
            );
            println!(
                "  Sweep: {} checked, {} failed",
                outcome.sweep.checked, outcome.sweep.failed
            );
            println!();
            print_json(&outcome.export.content)
        }
    }
}
