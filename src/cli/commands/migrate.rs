use crate::cli::connect_postgres;
use crate::config::AppConfig;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let store = connect_postgres(&config).await?;
    store.close().await;
    println!("Schema applied");
    Ok(())
}
