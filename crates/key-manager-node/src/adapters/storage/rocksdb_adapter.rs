//! # RocksDB Key Store
//!
//! Durable [`KeyStore`] on RocksDB.
//!
//! ## Column Families
//!
//! - `keys` - id (u64 BE) → bincode [`KeyRecord`]
//! - `values` - non-random key value → id (the uniqueness index)
//! - `random_values` - random key value → id (lookup only, never checked)
//! - `owners` - owner id ‖ 0x00 ‖ id (u64 BE) → empty
//! - `meta` - `next_id` → u64 BE
//!
//! Inserts and deletes are single `WriteBatch`es applied under the write
//! lock, so the value uniqueness check and the write are atomic.

use parking_lot::RwLock;
use pk_01_key_lifecycle::{KeyRecord, KeyStore, NewKeyRecord, StoreError};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB,
};
use shared_types::KeyId;
use std::path::PathBuf;
use tracing::info;

pub const CF_KEYS: &str = "keys";
pub const CF_VALUES: &str = "values";
pub const CF_RANDOM_VALUES: &str = "random_values";
pub const CF_OWNERS: &str = "owners";
pub const CF_META: &str = "meta";

pub const COLUMN_FAMILIES: &[&str] = &[CF_KEYS, CF_VALUES, CF_RANDOM_VALUES, CF_OWNERS, CF_META];

const NEXT_ID: &[u8] = b"next_id";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 32MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/keys"),
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

fn backend(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("RocksDB {context} failed: {e}"))
}

fn owner_prefix(owner_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(owner_id.len() + 1);
    prefix.extend_from_slice(owner_id.as_bytes());
    prefix.push(0);
    prefix
}

fn owner_key(owner_id: &str, id: KeyId) -> Vec<u8> {
    let mut key = owner_prefix(owner_id);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn decode_id(bytes: &[u8]) -> Result<KeyId, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| backend("id decode", format!("{} bytes", bytes.len())))?;
    Ok(KeyId::from_be_bytes(raw))
}

/// RocksDB-backed key store
pub struct RocksDbKeyStore {
    db: RwLock<DB>,
    config: RocksDbConfig,
}

impl RocksDbKeyStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| backend("open", e))?;

        info!(path = %config.path.display(), "Opened RocksDB key store");

        Ok(Self {
            db: RwLock::new(db),
            config,
        })
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StoreError> {
    db.cf_handle(name)
        .ok_or_else(|| backend("column family lookup", name))
}

fn read_record(db: &DB, id: KeyId) -> Result<Option<KeyRecord>, StoreError> {
    let bytes = db
        .get_cf(cf(db, CF_KEYS)?, id.to_be_bytes())
        .map_err(|e| backend("get", e))?;
    bytes
        .map(|b| bincode::deserialize(&b).map_err(|e| backend("record decode", e)))
        .transpose()
}

/// Value index for a unique or a random key value.
fn value_index(unique: bool) -> &'static str {
    if unique {
        CF_VALUES
    } else {
        CF_RANDOM_VALUES
    }
}

fn read_value_id(db: &DB, index: &str, value: &str) -> Result<Option<KeyId>, StoreError> {
    db.get_cf(cf(db, index)?, value.as_bytes())
        .map_err(|e| backend("get", e))?
        .map(|b| decode_id(&b))
        .transpose()
}

impl KeyStore for RocksDbKeyStore {
    fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError> {
        let db = self.db.write();

        let unique = !record.key_type.is_random();
        let index = value_index(unique);
        let indexed = read_value_id(&db, index, &record.value)?;
        if unique && indexed.is_some() {
            return Err(StoreError::DuplicateValue {
                value: record.value,
            });
        }

        let id = match db
            .get_cf(cf(&db, CF_META)?, NEXT_ID)
            .map_err(|e| backend("get", e))?
        {
            Some(bytes) => decode_id(&bytes)?,
            None => 1,
        };
        let record = record.into_record(id);
        let encoded = bincode::serialize(&record).map_err(|e| backend("record encode", e))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf(&db, CF_KEYS)?, id.to_be_bytes(), encoded);
        // A random value already indexed keeps pointing at its first record.
        if indexed.is_none() {
            batch.put_cf(cf(&db, index)?, record.value().as_bytes(), id.to_be_bytes());
        }
        batch.put_cf(cf(&db, CF_OWNERS)?, owner_key(record.owner_id(), id), b"");
        batch.put_cf(cf(&db, CF_META)?, NEXT_ID, (id + 1).to_be_bytes());

        db.write_opt(batch, &self.write_opts())
            .map_err(|e| backend("batch write", e))?;

        Ok(record)
    }

    fn find_by_id(&self, id: KeyId) -> Result<Option<KeyRecord>, StoreError> {
        let db = self.db.read();
        read_record(&db, id)
    }

    fn find_by_value(&self, value: &str) -> Result<Option<KeyRecord>, StoreError> {
        let db = self.db.read();
        for index in [CF_VALUES, CF_RANDOM_VALUES] {
            if let Some(id) = read_value_id(&db, index, value)? {
                return read_record(&db, id);
            }
        }
        Ok(None)
    }

    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<KeyRecord>, StoreError> {
        let db = self.db.read();
        let prefix = owner_prefix(owner_id);
        let mut records = Vec::new();

        let iter = db.iterator_cf(
            cf(&db, CF_OWNERS)?,
            IteratorMode::From(prefix.as_slice(), Direction::Forward),
        );
        for item in iter {
            let (key, _) = item.map_err(|e| backend("scan", e))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let id = decode_id(&key[prefix.len()..])?;
            if let Some(record) = read_record(&db, id)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn delete(&self, id: KeyId) -> Result<bool, StoreError> {
        let db = self.db.write();
        let Some(record) = read_record(&db, id)? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(cf(&db, CF_KEYS)?, id.to_be_bytes());
        batch.delete_cf(cf(&db, CF_OWNERS)?, owner_key(record.owner_id(), id));
        let index = value_index(record.is_unique_value());
        if read_value_id(&db, index, record.value())? == Some(id) {
            batch.delete_cf(cf(&db, index)?, record.value().as_bytes());
        }

        db.write_opt(batch, &self.write_opts())
            .map_err(|e| backend("batch write", e))?;

        Ok(true)
    }
}
