//! Durable persistence for watch entries.
//!
//! One row per watched user, unique on `(community, guild_user)`.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

/// One durable row of the watch table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistedEntry {
    pub community: GuildId,
    pub user: UserId,
    pub channel: Option<ChannelId>,
    pub rate: Option<f32>,
}

/// Narrow interface the watch store uses to mirror its state.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Fetch every stored entry. Called once at startup.
    async fn load_all(&self) -> Result<Vec<PersistedEntry>, sqlx::Error>;

    /// Durably replace the row for `(entry.community, entry.user)`.
    async fn upsert(&self, entry: &PersistedEntry) -> Result<(), sqlx::Error>;

    /// Remove one row if present.
    async fn remove_user(&self, community: GuildId, user: UserId) -> Result<(), sqlx::Error>;

    /// Remove every row of a community.
    async fn remove_community(&self, community: GuildId) -> Result<(), sqlx::Error>;
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS watch_entries (\
    community BIGINT NOT NULL, \
    guild_user BIGINT NOT NULL, \
    channel BIGINT, \
    rate REAL, \
    UNIQUE (community, guild_user))";

// A single statement, so a concurrent reader sees either the old row or
// the new one, never neither.
const UPSERT: &str = "INSERT INTO watch_entries (community, guild_user, channel, rate) \
    VALUES ($1, $2, $3, $4) \
    ON CONFLICT (community, guild_user) \
    DO UPDATE SET channel = EXCLUDED.channel, rate = EXCLUDED.rate";

/// Postgres-backed persistence.
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Connect to the database and ensure the watch table exists.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(4).connect(url).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Persistence for PostgresPersistence {
    async fn load_all(&self) -> Result<Vec<PersistedEntry>, sqlx::Error> {
        let rows = sqlx::query("SELECT community, guild_user, channel, rate FROM watch_entries")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(PersistedEntry {
                    community: GuildId::new(row.try_get::<i64, _>("community")? as u64),
                    user: UserId::new(row.try_get::<i64, _>("guild_user")? as u64),
                    channel: row
                        .try_get::<Option<i64>, _>("channel")?
                        .map(|channel| ChannelId::new(channel as u64)),
                    rate: row.try_get::<Option<f32>, _>("rate")?,
                })
            })
            .collect()
    }

    async fn upsert(&self, entry: &PersistedEntry) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT)
            .bind(entry.community.get() as i64)
            .bind(entry.user.get() as i64)
            .bind(entry.channel.map(|channel| channel.get() as i64))
            .bind(entry.rate)
            .execute(&self.pool)
            .await?;
        debug!(
            "Persisted settings: community: {}; user: {}",
            entry.community, entry.user
        );
        Ok(())
    }

    async fn remove_user(&self, community: GuildId, user: UserId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM watch_entries WHERE community = $1 AND guild_user = $2")
            .bind(community.get() as i64)
            .bind(user.get() as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_community(&self, community: GuildId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM watch_entries WHERE community = $1")
            .bind(community.get() as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Persistence stand-in when no database is configured. Every operation
/// succeeds without doing anything.
pub struct NoopPersistence;

#[async_trait]
impl Persistence for NoopPersistence {
    async fn load_all(&self) -> Result<Vec<PersistedEntry>, sqlx::Error> {
        Ok(Vec::new())
    }

    async fn upsert(&self, _entry: &PersistedEntry) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn remove_user(&self, _community: GuildId, _user: UserId) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn remove_community(&self, _community: GuildId) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
