// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::env;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use domain_portfolio::{
    export, import::decode_sales_csv, import_file, logging, roi_statistics, status_breakdown,
    AppConfig, DomainStatus, ImportNormalizer, MetricsEngine, PortfolioStore, SaleReconciler,
};

const USAGE: &str = "\
Usage: domain-portfolio [--config <path>] <command>

Commands:
  import <file>                  Decode a workbook/CSV/text file and list the domains
  report <file> [--sales <csv>]  Metrics, ROI and reconciliation for a file
  export <file> [dir]            Re-export a file as domains_<date>.xlsx + sales-history.csv
  template [path]                Write the empty import template
  ui [file]                      Terminal UI (default)";

/// Positional args plus the two options we understand
struct Invocation {
    positional: Vec<String>,
    config_path: Option<PathBuf>,
    sales_path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut sales_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--sales" => {
                let value = iter.next().context("--sales needs a path")?;
                sales_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => positional.push("help".to_string()),
            _ => positional.push(arg.clone()),
        }
    }

    Ok(Invocation {
        positional,
        config_path,
        sales_path,
    })
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let invocation = parse_args(&args)?;

    let config = AppConfig::load(invocation.config_path.as_deref())
        .context("Failed to load configuration")?;

    let command = invocation.positional.first().map(String::as_str).unwrap_or("ui");
    let operand = invocation.positional.get(1).map(PathBuf::from);

    if command == "ui" {
        // UI mode (default)
        return run_ui_mode(&config, operand.as_deref());
    }

    let _guard = logging::init(&logging::resolve_filter(config.log_filter.as_deref()), None)?;

    match command {
        "import" => run_import(&config, &require(operand, "import <file>")?),
        "report" => run_report(
            &config,
            &require(operand, "report <file>")?,
            invocation.sales_path.as_deref(),
        ),
        "export" => {
            let dir = invocation
                .positional
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| config.export_dir.clone());
            run_export(&config, &require(operand, "export <file>")?, &dir)
        }
        "template" => {
            let path = operand.unwrap_or_else(|| PathBuf::from(export::TEMPLATE_FILE_NAME));
            run_template(&path)
        }
        "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("{}", USAGE);
            bail!("unknown command '{}'", other)
        }
    }
}

fn require(operand: Option<PathBuf>, usage: &str) -> Result<PathBuf> {
    operand.with_context(|| format!("missing file: domain-portfolio {}", usage))
}

/// Decode + normalize + bulk-create into a fresh store
fn load_portfolio(config: &AppConfig, path: &Path) -> Result<PortfolioStore> {
    let normalizer = ImportNormalizer::new(&config.lists, &config.import);
    let batch = import_file(path, &normalizer)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    println!("✓ Read {} rows from {} (sha256 {})", batch.rows_read, batch.source_name, &batch.digest[..12]);
    if batch.rows_dropped > 0 {
        println!("  Skipped {} rows without a domain name", batch.rows_dropped);
    }

    let mut store = PortfolioStore::new();
    store
        .bulk_create_domains(batch.domains)
        .context("Import rejected, nothing was added")?;

    Ok(store)
}

fn run_import(config: &AppConfig, path: &Path) -> Result<()> {
    println!("📥 Domain Import");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = load_portfolio(config, path)?;
    let today = Local::now().date_naive();

    println!();
    for domain in store.domains() {
        println!(
            "  {:<30} {:<10} {:<11} {:<8} exp {} ({} days)",
            domain.name,
            domain.registrar,
            domain.category,
            domain.status.as_str(),
            domain.expiration_date,
            domain.days_until_expiration(today)
        );
    }

    println!("\n✅ {} domains imported", store.domains().len());
    Ok(())
}

fn run_report(config: &AppConfig, path: &Path, sales_path: Option<&Path>) -> Result<()> {
    println!("📊 Portfolio Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut store = load_portfolio(config, path)?;

    if let Some(sales_path) = sales_path {
        let file = std::fs::File::open(sales_path)
            .with_context(|| format!("Failed to open {}", sales_path.display()))?;
        let sales = decode_sales_csv(file)
            .with_context(|| format!("Failed to read sales from {}", sales_path.display()))?;

        for sale in sales {
            store.record_sale(sale)?;
        }
        println!("✓ Loaded {} ledger entries", store.sales().len());
    }

    let engine = MetricsEngine::with_multiplier(config.value_multiplier);
    let metrics = store.metrics(&engine);
    let roi = roi_statistics(store.domains(), store.sales());
    let breakdown = status_breakdown(store.domains());
    let sales = store.sales_summary();

    println!("\n💼 Portfolio");
    println!("  Domains:          {}", metrics.total_domains);
    println!("  Sold:             {}", metrics.sold_count);
    println!("  Investment:       {:.2}", metrics.total_investment);
    println!("  Sales revenue:    {:.2}", metrics.total_sales_revenue);
    println!("  ROI:              {:.1}%", metrics.roi);
    println!("  Estimated value:  {:.2}", metrics.estimated_portfolio_value);

    println!("\n📈 ROI statistics");
    println!("  Profit:           {:.2}", roi.profit);
    println!("  Avg purchase:     {:.2}", roi.average_purchase_price);
    println!("  Sales:            {} (avg {:.2})", sales.count, sales.average);

    println!("\n🏷️  Status");
    for status in DomainStatus::ALL {
        println!("  {:<10} {}", status.as_str(), breakdown.count(status));
    }

    let report = store.reconcile(&SaleReconciler::new());
    println!("\n⚖️  {}", report.summary());
    for discrepancy in &report.discrepancies {
        println!("  ⚠️  {}", discrepancy.description);
    }

    Ok(())
}

fn run_export(config: &AppConfig, path: &Path, dir: &Path) -> Result<()> {
    println!("📤 Domain Export");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = load_portfolio(config, path)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let today = Local::now().date_naive();
    let workbook = export::write_domains_workbook(dir, store.domains(), today)?;
    let ledger = export::write_sales_csv(dir, store.sales())?;

    println!("✓ {}", workbook.display());
    println!("✓ {}", ledger.display());
    println!("\n✅ Export complete");
    Ok(())
}

fn run_template(path: &Path) -> Result<()> {
    export::write_template(path)?;
    println!("✅ Template written to {}", path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig, file: Option<&Path>) -> Result<()> {
    let _guard = logging::init(
        &logging::resolve_filter(config.log_filter.as_deref()),
        Some(&config.log_dir),
    )?;

    println!("🖥️  Loading Domain Portfolio UI...\n");

    let store = match file {
        Some(path) => load_portfolio(config, path)?,
        None if config.seed_demo_data => {
            PortfolioStore::with_demo_data("tui").context("Failed to seed demo data")?
        }
        None => PortfolioStore::with_actor("tui"),
    };

    println!("✓ {} domains loaded", store.domains().len());
    println!("Starting UI... (Press 'q' to quit)\n");

    // Create and run app
    let mut app = ui::App::new(store, config.clone());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig, _file: Option<&Path>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin portfolio-server --features server");
    std::process::exit(1);
}
