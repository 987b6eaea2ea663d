//! SQLite persistence layer for AutoFollow.
//!
//! This crate provides async database operations for companies, clients,
//! agents, followups and their transcripts using SQLx with SQLite. Every
//! operation is a free function taking the connection pool, grouped by
//! record type.
//!
//! # Example
//!
//! ```no_run
//! use database::{company, models::NewCompany, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:autofollow.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a company
//!     let company = company::create_company(
//!         db.pool(),
//!         &NewCompany {
//!             name: "Acme".to_string(),
//!             location: "Berlin".to_string(),
//!             external_org_id: "org_123".to_string(),
//!         },
//!     )
//!     .await?;
//!     println!("created {}", company.id);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod client;
pub mod company;
pub mod error;
pub mod followup;
pub mod followup_message;
pub mod knowledge;
pub mod models;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    Agent, AgentSummary, AgentUpdate, Client, Company, Followup, FollowupMessage,
    FollowupOverview, FollowupStatus, FollowupUpdate, Knowledge, MessageRole, NewAgent,
    NewClient, NewCompany, NewFollowup, NewFollowupMessage, NewUser, User,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/autofollow.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Open a fresh in-memory database with the schema applied.
    ///
    /// Uses a single connection so every query sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_company_crud() {
        let db = test_db().await;

        // Create
        let company = seed_company(&db, "org_1").await;
        assert!(!company.whatsapp_enabled);

        // Read
        let fetched = company::get_company(db.pool(), &company.id).await.unwrap();
        assert_eq!(fetched.name, "Company org_1");
        let by_org = company::get_company_by_org(db.pool(), "org_1").await.unwrap();
        assert_eq!(by_org.id, company.id);

        // Update
        company::update_company(db.pool(), &company.id, "Renamed", "Porto")
            .await
            .unwrap();
        let fetched = company::get_company(db.pool(), &company.id).await.unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert_eq!(fetched.location, "Porto");

        // List
        let companies = company::list_companies(db.pool()).await.unwrap();
        assert_eq!(companies.len(), 1);

        // Missing
        let result = company::get_company(db.pool(), "missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleting_followup_cascades_to_messages() {
        let db = test_db().await;
        let company = seed_company(&db, "org_1").await;
        let client = seed_client(&db, &company.id, "5550100").await;
        let agent = seed_agent(&db, "Greeter").await;
        let followup = seed_followup(&db, &company, &client, &agent).await;

        followup_message::insert_message(
            db.pool(),
            &NewFollowupMessage {
                followup_id: followup.id.clone(),
                client_id: client.id.clone(),
                role: MessageRole::User,
                content: "hi".to_string(),
            },
        )
        .await
        .unwrap();

        followup::delete_followup(db.pool(), &followup.id).await.unwrap();
        let remaining = followup_message::list_messages(db.pool(), &followup.id)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_client_cascades_to_followups() {
        let db = test_db().await;
        let company = seed_company(&db, "org_1").await;
        let client = seed_client(&db, &company.id, "5550100").await;
        let agent = seed_agent(&db, "Greeter").await;
        let followup = seed_followup(&db, &company, &client, &agent).await;

        client::delete_client(db.pool(), &client.id).await.unwrap();
        let result = followup::get_followup(db.pool(), &followup.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
