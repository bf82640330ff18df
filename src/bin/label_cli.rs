use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use inbound_label::{
    config::{self, AppConfig},
    models::ResolvedLabelState,
    services::{CountryRegistry, CountryValidation, ScanSession},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    match cli.command {
        Commands::Resolve(args) => handle_resolve(cfg, args, cli.json).await?,
        Commands::Print(args) => handle_print(cfg, args, cli.json).await?,
        Commands::Country(args) => handle_country(&cfg, args, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "label-cli",
    about = "Resolve and print inbound handling-unit labels",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a scan without printing
    Resolve(ScanArgs),
    /// Resolve a scan and print one label per handling unit
    Print(PrintArgs),
    /// Check a country-of-origin code against the reference list
    Country(CountryArgs),
}

#[derive(Args)]
struct ScanArgs {
    #[arg(long, conflicts_with = "ibd", required_unless_present = "ibd", help = "Handling unit to scan")]
    hu: Option<String>,
    #[arg(long, help = "Inbound delivery to scan")]
    ibd: Option<String>,
    #[arg(long, help = "Warehouse number, overrides the configured one")]
    warehouse: Option<String>,
}

#[derive(Args)]
struct PrintArgs {
    #[command(flatten)]
    scan: ScanArgs,
    #[arg(long, help = "Country of origin; defaults to the product-plant value")]
    co: Option<String>,
    #[arg(long, help = "Lot / EI number")]
    lot: String,
    #[arg(long = "format", help = "Label format")]
    label_format: Option<String>,
    #[arg(long, help = "Printer")]
    printer: Option<String>,
}

#[derive(Args)]
struct CountryArgs {
    #[arg(help = "Two-letter country code")]
    code: String,
}

#[derive(Serialize)]
struct CountryReport<'a> {
    input: &'a str,
    valid: bool,
    result: &'a CountryValidation,
}

async fn resolve_into(session: &mut ScanSession, args: &ScanArgs) -> Result<()> {
    if let Some(warehouse) = &args.warehouse {
        session.set_warehouse(warehouse.as_str());
    }
    match (&args.hu, &args.ibd) {
        (Some(hu), _) => session
            .submit_handling_unit(hu)
            .await
            .with_context(|| format!("failed to resolve handling unit {}", hu))?,
        (None, Some(ibd)) => session
            .submit_inbound_delivery(ibd)
            .await
            .with_context(|| format!("failed to resolve inbound delivery {}", ibd))?,
        (None, None) => bail!("pass --hu or --ibd"),
    };
    Ok(())
}

async fn handle_resolve(cfg: AppConfig, args: ScanArgs, json: bool) -> Result<()> {
    let state = AppState::from_config(cfg).context("failed to build application state")?;
    let mut session = state.session();
    resolve_into(&mut session, &args).await?;

    let Some(resolved) = session.state() else {
        bail!("scan finished without a resolved state");
    };
    if json {
        print_json(resolved)?;
    } else {
        print_summary(resolved);
    }
    Ok(())
}

async fn handle_print(cfg: AppConfig, args: PrintArgs, json: bool) -> Result<()> {
    let state = AppState::from_config(cfg).context("failed to build application state")?;
    let mut session = state.session();
    resolve_into(&mut session, &args.scan).await?;

    if let Some(co) = &args.co {
        let result = session.edit_country_of_origin(co);
        if let Some(message) = result.message() {
            bail!("country of origin {}: {}", co, message);
        }
    }
    session.set_lot(args.lot);
    if let Some(format) = args.label_format {
        session.set_label_format(format);
    }
    if let Some(printer) = args.printer {
        session.set_printer(printer);
    }

    let outcome = session.print().await.context("print failed")?;
    if json {
        print_json(&outcome)?;
    } else {
        println!("Printed {} label(s):", outcome.printed.len());
        for hu in &outcome.printed {
            println!("  {}", hu);
        }
        if outcome.audit_failures > 0 {
            println!("Audit writes failed: {}", outcome.audit_failures);
        }
    }
    Ok(())
}

fn handle_country(cfg: &AppConfig, args: CountryArgs, json: bool) -> Result<()> {
    let countries = CountryRegistry::load(cfg.country_list_path.as_deref().map(Path::new))
        .context("failed to load country list")?;
    let result = countries.validate(&args.code);

    if json {
        print_json(&CountryReport {
            input: &args.code,
            valid: result.is_valid(),
            result: &result,
        })?;
    } else {
        match &result {
            CountryValidation::Valid { code, name } => println!("{} {}", code, name),
            other => println!("{}", other.message().unwrap_or("Enter Country of Origin")),
        }
    }
    Ok(())
}

fn print_summary(state: &ResolvedLabelState) {
    println!("Inbound delivery: {}", state.inbound_delivery);
    match (state.purchase_order(), state.production_order()) {
        (Some((order, item)), _) => {
            println!(
                "Purchase order:   {} / {}",
                order.purchase_order, item.purchase_order_item
            )
        }
        (None, Some(order)) => println!(
            "Production order: {} / {}",
            order.order_id, order.order_item
        ),
        (None, None) => {}
    }
    println!(
        "Goods receipt:    {}/{}/{}",
        state.goods_receipt.material_document,
        state.goods_receipt.fiscal_year,
        state.goods_receipt.item
    );
    println!(
        "Country:          {}",
        state.country_of_origin.as_deref().unwrap_or("-")
    );
    println!("Handling units:   {}", state.handling_units.len());
    for unit in &state.handling_units {
        println!("  {}", unit.external_id);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
