use mongodb::{Client, Database};
use tokio::sync::OnceCell;

/// Lazily connected, process-wide database handle.
///
/// The handle is only stored once a client has been built successfully, so a
/// failed attempt is retried by the next caller.
pub struct MongoConnector {
    uri: String,
    db_name: String,
    db: OnceCell<Database>,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            db: OnceCell::new(),
        }
    }

    pub async fn database(&self) -> Result<&Database, mongodb::error::Error> {
        self.db
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri).await?;
                log::info!("Connected to MongoDB database '{}'", self.db_name);
                Ok(client.database(&self.db_name))
            })
            .await
    }
}
