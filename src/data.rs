use std::{default::Default, ops::Deref, sync::Arc};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use tracing::error;
use uuid::Uuid;

use crate::sweep::{AuditSink, SweepAction, SweepService};

const DATA_DIR: &str = "data";
const SETTINGS_FILE: &str = "data/guild_settings.yaml";
const AUDIT_FILE: &str = "data/audit_log.yaml";

/// Per-guild protection settings for sweeps.
///
/// Both flags default to on, so a fresh guild starts with administrators
/// and bots shielded from mass actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildSettings {
    // The ID of the guild
    pub guild_id: u64,
    // Exclude administrators from sweep target sets
    pub skip_admins: bool,
    // Exclude bot accounts from sweep target sets
    pub skip_bots: bool,
}

impl Default for GuildSettings {
    fn default() -> Self {
        Self {
            guild_id: 0,
            skip_admins: true,
            skip_bots: true,
        }
    }
}

impl GuildSettings {
    /// Default settings row for a guild
    #[must_use]
    pub fn for_guild(guild_id: serenity::GuildId) -> Self {
        Self {
            guild_id: guild_id.get(),
            ..Default::default()
        }
    }
}

/// The two protection flags a guild can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionFlag {
    SkipAdmins,
    SkipBots,
}

impl ProtectionFlag {
    /// Human-readable name used in replies and dashboards
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SkipAdmins => "Skip Admins",
            Self::SkipBots => "Skip Bots",
        }
    }
}

/// One successfully applied sweep action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique ID of this record
    pub id: String,
    /// Guild the action happened in
    pub guild_id: u64,
    /// The action that was applied
    pub action: SweepAction,
    /// The member it was applied to
    pub target_id: u64,
    /// When the platform call succeeded
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Create a record stamped with the current time
    #[must_use]
    pub fn new(guild_id: u64, action: SweepAction, target_id: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            guild_id,
            action,
            target_id,
            timestamp: Utc::now(),
        }
    }
}

/// Centralized data structure for the bot
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

// Implement TypeMapKey for Data to allow storing it in Serenity's data map
impl TypeMapKey for Data {
    type Value = Data;
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("guild_settings", &self.guild_settings)
            .field("audit_log", &self.audit_log)
            .finish()
    }
}

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Data {
    /// Create a new Data instance
    #[must_use]
    pub fn new() -> Self {
        Self(DataInner::new().into())
    }

    /// Load data from the YAML files
    pub async fn load() -> Self {
        Self(Arc::new(DataInner::load().await))
    }

    /// Save data to the YAML files
    /// # Errors
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The settings or audit records cannot be serialized to YAML
    /// - The YAML data cannot be written to disk
    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.0.save().await
    }

    /// Persist in the background without blocking the caller
    pub fn spawn_save(&self) {
        let data = self.clone();
        tokio::spawn(async move {
            if let Err(error) = data.save().await {
                error!(%error, "Failed to persist bot data");
            }
        });
    }

    /// Get the guild's settings, creating the default row on first access
    #[must_use]
    pub fn settings(&self, guild_id: serenity::GuildId) -> GuildSettings {
        self.guild_settings
            .entry(guild_id)
            .or_insert_with(|| GuildSettings::for_guild(guild_id))
            .clone()
    }

    /// Flip one of the guild's protection flags; returns the new value
    pub fn toggle(&self, guild_id: serenity::GuildId, flag: ProtectionFlag) -> bool {
        let mut entry = self
            .guild_settings
            .entry(guild_id)
            .or_insert_with(|| GuildSettings::for_guild(guild_id));

        match flag {
            ProtectionFlag::SkipAdmins => {
                entry.skip_admins = !entry.skip_admins;
                entry.skip_admins
            }
            ProtectionFlag::SkipBots => {
                entry.skip_bots = !entry.skip_bots;
                entry.skip_bots
            }
        }
    }

    /// Get all audit records for a guild, oldest first
    #[must_use]
    pub fn audit_for_guild(&self, guild_id: serenity::GuildId) -> Vec<AuditRecord> {
        let mut records: Vec<AuditRecord> = self
            .audit_log
            .iter()
            .filter(|entry| entry.value().guild_id == guild_id.get())
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.timestamp);
        records
    }
}

impl AuditSink for Data {
    fn record(&self, guild_id: serenity::GuildId, action: SweepAction, target_id: serenity::UserId) {
        let record = AuditRecord::new(guild_id.get(), action, target_id.get());
        self.audit_log.insert(record.id.clone(), record);
        self.spawn_save();
    }
}

/// Main centralized data structure for the bot
pub struct DataInner {
    // Map of guild_id -> guild settings
    pub guild_settings: DashMap<serenity::GuildId, GuildSettings>,
    // Map of record_id -> audit record
    pub audit_log: DashMap<String, AuditRecord>,
    // The sweep engine shared by commands and interaction handlers
    pub sweeps: SweepService,
    // Spawned saves must not interleave their file writes
    save_lock: tokio::sync::Mutex<()>,
}

impl Default for DataInner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataInner {
    // Create a new Data instance
    #[must_use]
    pub fn new() -> Self {
        Self {
            guild_settings: DashMap::new(),
            audit_log: DashMap::new(),
            sweeps: SweepService::default(),
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Load data from the YAML files
    ///
    /// Missing or unreadable files leave the corresponding map empty.
    pub async fn load() -> Self {
        let data = Self::new();

        if let Ok(file_content) = tokio::fs::read_to_string(SETTINGS_FILE).await {
            if let Ok(rows) = serde_yaml::from_str::<Vec<GuildSettings>>(&file_content) {
                for row in rows {
                    // GuildId::new panics on zero; skip corrupt rows
                    if row.guild_id == 0 {
                        continue;
                    }
                    data.guild_settings
                        .insert(serenity::GuildId::new(row.guild_id), row);
                }
            }
        }

        if let Ok(file_content) = tokio::fs::read_to_string(AUDIT_FILE).await {
            if let Ok(records) = serde_yaml::from_str::<Vec<AuditRecord>>(&file_content) {
                for record in records {
                    data.audit_log.insert(record.id.clone(), record);
                }
            }
        }

        data
    }

    /// Save data to the YAML files
    ///
    /// It creates the data directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The data directory cannot be created
    /// - The settings or audit records cannot be serialized to YAML
    /// - The YAML data cannot be written to disk
    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let _guard = self.save_lock.lock().await;

        if !std::path::Path::new(DATA_DIR).exists() {
            tokio::fs::create_dir_all(DATA_DIR).await?;
        }

        let mut settings: Vec<GuildSettings> = self
            .guild_settings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        settings.sort_by_key(|row| row.guild_id);
        let settings_yaml = serde_yaml::to_string(&settings)?;
        tokio::fs::write(SETTINGS_FILE, settings_yaml).await?;

        let mut records: Vec<AuditRecord> = self
            .audit_log
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.timestamp);
        let audit_yaml = serde_yaml::to_string(&records)?;
        tokio::fs::write(AUDIT_FILE, audit_yaml).await?;

        Ok(())
    }
}

/// Tests for the data module
#[cfg(test)]
mod tests {
    use super::*;

    fn guild() -> serenity::GuildId {
        serenity::GuildId::new(12345)
    }

    #[test]
    fn test_data_new() {
        let data = Data::new();
        assert_eq!(data.guild_settings.len(), 0);
        assert_eq!(data.audit_log.len(), 0);
    }

    #[test]
    fn test_settings_row_created_on_first_access() {
        let data = Data::new();

        let settings = data.settings(guild());
        assert_eq!(settings.guild_id, 12345);
        assert!(settings.skip_admins);
        assert!(settings.skip_bots);
        assert_eq!(data.guild_settings.len(), 1);

        // A second read reuses the stored row
        let _ = data.settings(guild());
        assert_eq!(data.guild_settings.len(), 1);
    }

    #[test]
    fn test_toggle_flips_flags() {
        let data = Data::new();

        assert!(!data.toggle(guild(), ProtectionFlag::SkipAdmins));
        assert!(!data.settings(guild()).skip_admins);
        assert!(data.settings(guild()).skip_bots);

        assert!(data.toggle(guild(), ProtectionFlag::SkipAdmins));
        assert!(data.settings(guild()).skip_admins);

        assert!(!data.toggle(guild(), ProtectionFlag::SkipBots));
        assert!(!data.settings(guild()).skip_bots);
    }

    #[test]
    fn test_protection_flag_labels() {
        assert_eq!(ProtectionFlag::SkipAdmins.label(), "Skip Admins");
        assert_eq!(ProtectionFlag::SkipBots.label(), "Skip Bots");
    }

    #[test]
    fn test_guild_settings_serialization() {
        let settings = GuildSettings {
            guild_id: 12345,
            skip_admins: true,
            skip_bots: false,
        };

        // Test serialization
        let serialized = serde_yaml::to_string(&settings).expect("Failed to serialize");
        assert!(serialized.contains("guild_id: 12345"));
        assert!(serialized.contains("skip_admins: true"));
        assert!(serialized.contains("skip_bots: false"));

        // Test deserialization
        let deserialized: GuildSettings =
            serde_yaml::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(deserialized.guild_id, 12345);
        assert!(deserialized.skip_admins);
        assert!(!deserialized.skip_bots);
    }

    #[test]
    fn test_audit_record_serialization() {
        let record = AuditRecord {
            id: "test-id".to_string(),
            guild_id: 12345,
            action: SweepAction::Kick,
            target_id: 67890,
            timestamp: "2023-01-01T00:00:00Z".parse().expect("Failed to parse"),
        };

        let serialized = serde_yaml::to_string(&record).expect("Failed to serialize");
        assert!(serialized.contains("id: test-id"));
        assert!(serialized.contains("guild_id: 12345"));
        assert!(serialized.contains("target_id: 67890"));
        assert!(serialized.contains("Kick"));

        let deserialized: AuditRecord =
            serde_yaml::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(deserialized.id, "test-id");
        assert_eq!(deserialized.guild_id, 12345);
        assert_eq!(deserialized.action, SweepAction::Kick);
        assert_eq!(deserialized.target_id, 67890);
    }

    #[test]
    fn test_audit_record_new_is_stamped() {
        let before = Utc::now();
        let record = AuditRecord::new(12345, SweepAction::Ban, 67890);

        assert!(Uuid::parse_str(&record.id).is_ok());
        assert!(record.timestamp >= before);
        assert!(record.timestamp <= Utc::now());
        assert_eq!(record.action, SweepAction::Ban);
    }

    #[test]
    fn test_audit_for_guild_sorts_oldest_first() {
        let data = Data::new();

        let mut newer = AuditRecord::new(12345, SweepAction::Kick, 100);
        newer.timestamp = "2023-01-02T00:00:00Z".parse().expect("Failed to parse");
        let mut older = AuditRecord::new(12345, SweepAction::Kick, 101);
        older.timestamp = "2023-01-01T00:00:00Z".parse().expect("Failed to parse");
        let other_guild = AuditRecord::new(555, SweepAction::Ban, 102);

        data.audit_log.insert(newer.id.clone(), newer);
        data.audit_log.insert(older.id.clone(), older);
        data.audit_log.insert(other_guild.id.clone(), other_guild);

        let records = data.audit_for_guild(guild());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target_id, 101);
        assert_eq!(records[1].target_id, 100);
    }

    #[test]
    fn test_data_debug_impl() {
        let data = Data::new();
        let debug_output = format!("{data:?}");
        assert!(debug_output.contains("Data"));
        assert!(debug_output.contains("guild_settings"));
        assert!(debug_output.contains("audit_log"));
    }
}
