//! redb-based storage layer for the escrow journal
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `snapshots` | `"agrilink"` | `MarketplaceSnapshot` | 全量市场数据文档 |
//! | `events` | `sequence` | `EscrowEvent` | Event journal (append-only) |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `sequence_counter` | `"seq"` | `u64` | Global sequence |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! snapshot, its events and the idempotency mark are on disk together.
//! A failed command drops its transaction and nothing becomes visible.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::escrow::{EscrowEvent, MarketplaceSnapshot};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for the snapshot document: key = namespace, value = JSON-serialized MarketplaceSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Table for storing events: key = sequence, value = JSON-serialized EscrowEvent
const EVENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("events");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Table for sequence counter: key = "seq", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

/// 快照命名空间键
pub const SNAPSHOT_KEY: &str = "agrilink";
const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event not found: sequence={0}")]
    EventNotFound(u64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StorageStats {
    pub event_count: u64,
    pub processed_command_count: u64,
    pub current_sequence: u64,
    pub has_snapshot: bool,
}

/// Escrow storage backed by redb
#[derive(Clone)]
pub struct EscrowStorage {
    db: Arc<Database>,
}

impl EscrowStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Create all tables if they don't exist and initialize the sequence counter
    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// redb 同一时刻只允许一个写事务，这里就是全局串行化点。
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Get current sequence (within transaction)
    pub fn get_current_sequence_txn(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let table = txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &EscrowEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let value = serde_json::to_vec(event)?;
        table.insert(event.sequence, value.as_slice())?;
        Ok(())
    }

    /// Get a single event by sequence
    pub fn get_event(&self, sequence: u64) -> StorageResult<EscrowEvent> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;
        match table.get(sequence)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::EventNotFound(sequence)),
        }
    }

    /// Get events after a given sequence (exclusive), in sequence order
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<EscrowEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let Some(start) = since_sequence.checked_add(1) else {
            return Ok(events);
        };
        for result in table.range(start..)? {
            let (_key, value) = result?;
            let event: EscrowEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        Ok(events)
    }

    // ========== Snapshot Operations ==========

    /// Store the snapshot (within transaction)
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &MarketplaceSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(SNAPSHOT_KEY, value.as_slice())?;
        Ok(())
    }

    /// Load the latest committed snapshot
    ///
    /// Returns `None` on first run (no snapshot persisted yet).
    pub fn load_snapshot(&self) -> StorageResult<Option<MarketplaceSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(SNAPSHOT_KEY)? {
            Some(value) => {
                let snapshot: MarketplaceSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Load the snapshot (within transaction)
    pub fn load_snapshot_txn(
        &self,
        txn: &WriteTransaction,
    ) -> StorageResult<Option<MarketplaceSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(SNAPSHOT_KEY)? {
            Some(value) => {
                let snapshot: MarketplaceSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    // ========== Maintenance ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        let events = read_txn.open_table(EVENTS_TABLE)?;
        let processed = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let snapshots = read_txn.open_table(SNAPSHOTS_TABLE)?;
        let seq = read_txn.open_table(SEQUENCE_TABLE)?;

        Ok(StorageStats {
            event_count: events.len()?,
            processed_command_count: processed.len()?,
            current_sequence: seq.get(SEQUENCE_KEY)?.map(|g| g.value()).unwrap_or(0),
            has_snapshot: snapshots.get(SNAPSHOT_KEY)?.is_some(),
        })
    }
}
