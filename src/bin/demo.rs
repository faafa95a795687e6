//! Carbon footprint - Demo CLI
//!
//! Walks through the calculator with the bundled reference data: loads the
//! tables, fills in a sample household, and prints the yearly footprint.
//! Nothing is written to disk.

use std::path::PathBuf;

use carbon_footprint_lib::core::{DayCount, LampEntry, Section};
use carbon_footprint_lib::estimator::Estimator;
use carbon_footprint_lib::reference::{self, DataSource};
use carbon_footprint_lib::store::Store;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("==============================================");
    println!("   Carbon Footprint - Demo CLI");
    println!("==============================================\n");

    // 1. Load reference data
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"));
    println!("[1/4] Loading reference data from {}...", data_dir.display());
    let data = reference::load(&DataSource::Directory(data_dir)).await?;
    println!("      Emission factors: {}", data.factors().len());
    println!("      Foods:            {}\n", data.foods().len());

    // 2. Open storage
    println!("[2/4] Opening in-memory storage...");
    let store = Store::open_in_memory()?;
    let mut estimator = Estimator::new(data, store);
    println!("      Snapshot key: {}\n", estimator.store().key());

    // 3. Sample household
    println!("[3/4] Entering sample usage...\n");
    println!("----------------------------------------------");
    println!("  Item                      |  kg CO2e/year");
    println!("----------------------------------------------");

    let edits: Vec<(&str, f64)> = vec![
        ("Ventilador 2 h/day", estimator.set_appliance_hours("Ventilador", 2.0)?),
        ("Heladera 24 h/day", estimator.set_appliance_hours("Heladera", 24.0)?),
        ("Televisor 4 h/day", estimator.set_appliance_hours("Televisor", 4.0)?),
        ("Estufa a gas 5 h/day", estimator.set_heating_hours("Estufa a gas", 5.0)?),
        ("Aire acond. 3 h/day", estimator.set_cooling_hours("Aire acondicionado", 3.0)?),
        ("Auto 5 + 5 km", estimator.set_commute("Auto", 5.0, 5.0)?),
        ("Avión 1500 km", estimator.set_business_km("Avión", 1500.0)?),
        ("Carne 2 portions/week", estimator.set_food("carne", 2.0, None)?),
        ("Legumbres 3 portions/week", estimator.set_food("legumbres", 3.0, None)?),
    ];
    for (label, emission) in &edits {
        println!("  {:<25} | {:>12.2}", label, emission);
    }

    let first = estimator.add_lamp()?;
    let second = estimator.add_lamp()?;
    let led = estimator.update_lamp(first, LampEntry::new("LED", "9W", 6.0, 5.0))?;
    println!("  {:<25} | {:>12.2}", "6 × LED 9W, 5 h/day", led);
    estimator.set_lamp_kind(second, "Incandescente")?;
    let bulb = estimator.update_lamp(second, LampEntry::new("Incandescente", "60W", 2.0, 3.0))?;
    println!("  {:<25} | {:>12.2}", "2 × Incand. 60W, 3 h/day", bulb);

    estimator.set_days(DayCount::Working, 22.0)?;
    println!("  (working days set to 22)");
    println!("----------------------------------------------\n");

    // 4. Summary
    println!("[4/4] Yearly footprint\n");
    let summary = estimator.summary();
    for section in Section::ALL {
        println!("  {:<12} {:>10.2} kg CO2e", section.as_str(), summary.subtotals.get(section));
    }
    println!("  {:<12} {:>10.2} kg CO2e", "Total", summary.total);
    for eq in &summary.equivalences {
        println!("    ≈ {:.1} {}", eq.amount, eq.unit);
    }

    println!("\n=== Reset ===\n");
    estimator.reset()?;
    println!("  Total after reset: {:.2} kg CO2e", estimator.total());
    println!(
        "  Saved snapshot present: {}",
        estimator.store().get_item(estimator.store().key())?.is_some()
    );
    println!();

    Ok(())
}
