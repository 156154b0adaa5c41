use mongodb::{options::ClientOptions, Client, Database as MongoDatabase};
use tracing::info;

/// Database connection wrapper for MongoDB
///
/// Holds the client and the application database handle so repositories can
/// share one connection pool.
#[derive(Clone)]
pub struct Database {
    /// MongoDB client instance for connection management
    pub client: Client,
    /// Specific database instance for this application
    pub database: MongoDatabase,
}

impl Database {
    /// Connects to MongoDB and verifies the connection.
    ///
    /// # Example
    /// ```no_run
    /// # async fn run() -> Result<(), mongodb::error::Error> {
    /// let db = lecture_portal::services::database::Database::new("mongodb://localhost:27017", "lecture_portal").await?;
    /// # Ok(()) }
    /// ```
    pub async fn new(database_url: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        info!("Connecting to MongoDB: {}", redact_credentials(database_url));

        let mut client_options = ClientOptions::parse(database_url).await?;
        client_options.app_name = Some("lecture-portal".to_string());

        let client = Client::with_options(client_options)?;
        let database = client.database(db_name);

        // Fail at startup rather than on the first request
        client.list_database_names(None, None).await?;

        info!("MongoDB connection established successfully");

        Ok(Self { client, database })
    }
}

fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
