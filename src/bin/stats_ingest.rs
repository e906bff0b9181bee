use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use ipl_stats::config::parse_path_arg;
use ipl_stats::dataset;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let matches_path = parse_path_arg(&args, "--matches")
        .ok_or_else(|| anyhow!("--matches <matches.parquet> is required"))?;
    let deliveries_path = parse_path_arg(&args, "--deliveries")
        .ok_or_else(|| anyhow!("--deliveries <deliveries.parquet> is required"))?;
    let db_path =
        parse_path_arg(&args, "--db").unwrap_or_else(|| PathBuf::from("ipl_tables.sqlite"));

    if db_path.exists() && !args.iter().any(|a| a == "--force") {
        return Err(anyhow!(
            "{} already exists (pass --force to replace it)",
            db_path.display()
        ));
    }
    if db_path.exists() {
        std::fs::remove_file(&db_path)
            .with_context(|| format!("remove existing {}", db_path.display()))?;
    }

    let tables = dataset::load_parquet(&matches_path, &deliveries_path)?;
    let mut conn = dataset::open_db(&db_path)?;
    let (matches, deliveries) = dataset::write_tables(&mut conn, &tables)?;

    println!("Table import complete");
    println!("DB: {}", db_path.display());
    println!("Matches: {matches}");
    println!("Deliveries: {deliveries}");
    Ok(())
}
