pub mod indexes;
pub mod models;

use mongodb::{Client, Database, options::ClientOptions};
use shopsquad_config::DatabaseSettings;
use tracing::info;

pub use indexes::ensure_indexes;

/// Opens the configured database and verifies the connection with a ping
/// before handing it out.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.url).await?;
    options.max_pool_size = settings.max_pool_size;
    options.min_pool_size = settings.min_pool_size;

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %settings.name, "Connected to MongoDB");
    Ok(client.database(&settings.name))
}
