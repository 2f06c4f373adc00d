use dotenvy::dotenv;
use stall_ledger::{
    config::{self, stalls::Config},
    core::{catalog, report},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Stall list
    let stalls = config::stalls::load_default_config().unwrap_or_else(|e| {
        warn!("{e}; using default stalls");
        Config::default_stalls()
    });

    // 4. Database
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Sales overview for every stall
    for stall in &stalls.stalls {
        let products = catalog::list_products(&db, stall.id).await?;
        let rows = report::get_sales_report(&db, stall.id).await?;
        info!(
            "Stall {} ({}): {} product(s), {} in sales",
            stall.id,
            stall.name,
            products.len(),
            report::format_currency(report::grand_total(&rows))
        );
        println!("== {} ==\n{}\n", stall.name, report::format_report(&rows));
    }

    Ok(())
}
