use database::DbRepository;
use std::path::Path;
use std::sync::Arc;

// This main function is the entry point when running `cargo run -p web-server`.
// It serves the API against Postgres; `dugout serve` offers more options.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config(Path::new("config.toml"))?;
    let _guard = configuration::init_tracing(&config.logging)?;

    let pool = database::connect(&config.database).await?;
    database::run_migrations(&pool).await?;

    web_server::run_server(&config, Arc::new(DbRepository::new(pool))).await
}
