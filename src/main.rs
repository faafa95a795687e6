//! Carbon footprint estimator - command line entry point
//!
//! Loads the reference tables, restores the saved inputs and applies one
//! edit or report per invocation.
//!
//! # Usage
//!
//! ```bash
//! carbon-footprint --data data set appliance Ventilador 2
//! carbon-footprint --data data lamp add
//! carbon-footprint --data data summary --rows
//! ```

use anyhow::{Context, Result};
use carbon_footprint_lib::core::{parse_number, Config, DayCount, LampEntry, RowEmission, Section};
use carbon_footprint_lib::estimator::Estimator;
use clap::{Parser, Subcommand, ValueEnum};
use std::convert::Infallible;
use std::path::PathBuf;

/// Household carbon footprint estimator
#[derive(Parser, Debug)]
#[command(name = "carbon-footprint")]
#[command(about = "Estimate a household's yearly carbon footprint")]
struct Args {
    /// Directory holding the reference data JSON files
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Base URL to fetch the reference data from instead of a directory
    #[arg(long, global = true, conflicts_with = "data")]
    data_url: Option<String>,

    /// Storage database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show subtotals, total and equivalences
    Summary {
        /// Include every calculator row
        #[arg(long)]
        rows: bool,
    },
    /// List catalog items with their emission factors
    Catalog,
    /// Update a usage value
    Set {
        #[command(subcommand)]
        target: SetTarget,
    },
    /// Manage lighting fixtures
    Lamp {
        #[command(subcommand)]
        action: LampAction,
    },
    /// Clear all usage data and the saved snapshot
    Reset,
}

#[derive(Subcommand, Debug)]
enum SetTarget {
    /// Appliance hours per day
    Appliance {
        name: String,
        #[arg(value_parser = quantity)]
        hours: f64,
    },
    /// Heating hours per day
    Heating {
        name: String,
        #[arg(value_parser = quantity)]
        hours: f64,
    },
    /// Cooling hours per day
    Cooling {
        name: String,
        #[arg(value_parser = quantity)]
        hours: f64,
    },
    /// Commute km per leg
    Commute {
        mode: String,
        #[arg(value_parser = quantity)]
        outbound: f64,
        #[arg(value_parser = quantity)]
        inbound: f64,
    },
    /// Yearly business travel km
    Business {
        mode: String,
        #[arg(value_parser = quantity)]
        km: f64,
    },
    /// Annualization day count
    Days {
        which: DayArg,
        #[arg(value_parser = quantity)]
        days: f64,
    },
    /// Weekly food portions
    Food {
        id: String,
        #[arg(value_parser = quantity)]
        portions: f64,
        /// Grams per portion (defaults to the food's standard portion)
        #[arg(long, value_parser = quantity)]
        grams: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum LampAction {
    /// Append a fixture with the first type and wattage
    Add,
    /// Replace a fixture
    Set {
        index: usize,
        kind: String,
        wattage: String,
        #[arg(value_parser = quantity)]
        qty: f64,
        #[arg(value_parser = quantity)]
        hrs: f64,
    },
    /// Change a fixture's type
    Kind { index: usize, kind: String },
    /// Delete a fixture
    Remove { index: usize },
    /// Zero all fixtures
    Clear,
}

/// Quantities typed by the user never fail to parse; garbage counts as 0
fn quantity(text: &str) -> std::result::Result<f64, Infallible> {
    Ok(parse_number(text))
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DayArg {
    Appliances,
    Heating,
    Cooling,
    Working,
    Lighting,
}

impl From<DayArg> for DayCount {
    fn from(arg: DayArg) -> Self {
        match arg {
            DayArg::Appliances => DayCount::Appliances,
            DayArg::Heating => DayCount::Heating,
            DayArg::Cooling => DayCount::Cooling,
            DayArg::Working => DayCount::Working,
            DayArg::Lighting => DayCount::Lighting,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config_warning = None;
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            config_warning = Some(e);
            Config::default()
        }),
    };

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.general.log_level.as_str()),
    )
    .init();
    if let Some(e) = config_warning {
        log::warn!("Failed to load config, using defaults: {}", e);
    }

    if let Some(dir) = &args.data {
        config.data.source = "local".to_string();
        config.data.directory = dir.clone();
    }
    if let Some(url) = &args.data_url {
        config.data.source = "http".to_string();
        config.data.base_url = url.clone();
    }
    if let Some(db) = &args.db {
        config.storage.path = Some(db.clone());
    }

    let mut estimator = Estimator::open(&config)
        .await
        .context("Failed to load reference data or storage")?;
    let decimals = config.display.decimals;

    match args.command {
        Command::Summary { rows } => print_summary(&estimator, rows, args.json, decimals)?,
        Command::Catalog => print_catalog(&estimator, decimals),
        Command::Set { target } => {
            let (label, emission) = apply_set(&mut estimator, target)?;
            report_edit(&estimator, &label, emission, args.json, decimals)?;
        }
        Command::Lamp { action } => {
            let (label, emission) = apply_lamp(&mut estimator, action)?;
            report_edit(&estimator, &label, emission, args.json, decimals)?;
        }
        Command::Reset => {
            estimator.reset()?;
            println!("All usage data cleared");
        }
    }

    Ok(())
}

fn apply_set(estimator: &mut Estimator, target: SetTarget) -> Result<(String, Option<f64>)> {
    let result = match target {
        SetTarget::Appliance { name, hours } => {
            let e = estimator.set_appliance_hours(&name, hours)?;
            (name, Some(e))
        }
        SetTarget::Heating { name, hours } => {
            let e = estimator.set_heating_hours(&name, hours)?;
            (name, Some(e))
        }
        SetTarget::Cooling { name, hours } => {
            let e = estimator.set_cooling_hours(&name, hours)?;
            (name, Some(e))
        }
        SetTarget::Commute { mode, outbound, inbound } => {
            let e = estimator.set_commute(&mode, outbound, inbound)?;
            (mode, Some(e))
        }
        SetTarget::Business { mode, km } => {
            let e = estimator.set_business_km(&mode, km)?;
            (mode, Some(e))
        }
        SetTarget::Days { which, days } => {
            estimator.set_days(which.into(), days)?;
            (format!("{:?} days", which), None)
        }
        SetTarget::Food { id, portions, grams } => {
            if estimator.reference().food(&id).is_none() {
                log::warn!("Unknown food id '{}', it will not contribute", id);
            }
            let e = estimator.set_food(&id, portions, grams)?;
            (id, Some(e))
        }
    };
    Ok(result)
}

fn apply_lamp(estimator: &mut Estimator, action: LampAction) -> Result<(String, Option<f64>)> {
    let result = match action {
        LampAction::Add => {
            let index = estimator.add_lamp()?;
            (format!("lamp #{}", index), None)
        }
        LampAction::Set { index, kind, wattage, qty, hrs } => {
            let e = estimator.update_lamp(index, LampEntry::new(&kind, &wattage, qty, hrs))?;
            (format!("lamp #{}", index), Some(e))
        }
        LampAction::Kind { index, kind } => {
            let e = estimator.set_lamp_kind(index, &kind)?;
            (format!("lamp #{}", index), Some(e))
        }
        LampAction::Remove { index } => {
            let removed = estimator.remove_lamp(index)?;
            (format!("removed {} {}", removed.kind, removed.wattage), None)
        }
        LampAction::Clear => {
            estimator.clear_lamps()?;
            ("lamps cleared".to_string(), None)
        }
    };
    Ok(result)
}

fn report_edit(
    estimator: &Estimator,
    label: &str,
    emission: Option<f64>,
    json: bool,
    decimals: usize,
) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "item": label,
            "emission": emission,
            "summary": estimator.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match emission {
        Some(e) => println!("{}: {:.*} kg CO2e/year", label, decimals, e),
        None => println!("{}", label),
    }
    println!("Total: {:.*} kg CO2e/year", decimals, estimator.total());
    Ok(())
}

fn print_summary(estimator: &Estimator, rows: bool, json: bool, decimals: usize) -> Result<()> {
    let summary = estimator.summary();

    if json {
        let out = if rows {
            serde_json::json!({ "summary": summary, "rows": estimator.breakdown() })
        } else {
            serde_json::to_value(&summary)?
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let breakdown = if rows { estimator.breakdown() } else { Vec::new() };

    println!("{:<14} {:>14}", "Section", "kg CO2e/year");
    println!("-----------------------------");
    for section in Section::ALL {
        println!("{:<14} {:>14.*}", section.as_str(), decimals, summary.subtotals.get(section));
        for row in breakdown.iter().filter(|r| r.section == section) {
            print_row(row, decimals);
        }
    }
    println!("-----------------------------");
    println!("{:<14} {:>14.*}", "Total", decimals, summary.total);

    if !summary.equivalences.is_empty() {
        println!("\nEquivalent to:");
        for eq in &summary.equivalences {
            println!("  {:.*} {}", decimals, eq.amount, eq.unit);
        }
    }
    Ok(())
}

fn print_row(row: &RowEmission, decimals: usize) {
    if row.emission == 0.0 && row.quantity == 0.0 {
        return;
    }
    println!(
        "  {:<10} {:<20} {:>10.*}",
        row.group, row.label, decimals, row.emission
    );
}

fn print_catalog(estimator: &Estimator, decimals: usize) {
    let data = estimator.reference();
    let catalogs = data.catalogs();

    let lists = [
        ("appliances (kg/h)", &catalogs.appliances),
        ("heating (kg/h)", &catalogs.heating),
        ("cooling (kg/h)", &catalogs.cooling),
        ("commute (kg/km)", &catalogs.commute),
        ("business (kg/km)", &catalogs.business),
    ];
    for (title, items) in lists {
        println!("{}", title);
        for name in items.iter() {
            println!("  {:<28} {:.*}", name, decimals + 2, data.factor_for(name));
        }
    }

    println!("lighting (kg/h per fixture)");
    for kind in &catalogs.lighting.kinds {
        for wattage in data.wattages_for(kind) {
            println!(
                "  {:<28} {:.*}",
                format!("{} {}", kind, wattage),
                decimals + 2,
                data.factor_for_lamp(kind, wattage)
            );
        }
    }

    println!("food (kg/kg, default portion)");
    for food in data.foods() {
        let factor = food.factor.unwrap_or_else(|| data.factor_for(&food.name));
        println!(
            "  {:<12} {:<15} {:.*} {:>6} g",
            food.id, food.name, decimals + 2, factor, food.portion_g
        );
    }
}
