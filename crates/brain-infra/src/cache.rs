//! Cache substrate (C1): in-memory LRU+TTL with an optional disk snapshot
//! and an optional remote tier.
//!
//! The in-memory map is the source of truth; `tokio::sync::RwLock` guards it
//! the same way `InMemoryWorkingMemoryRepository` guards its map in
//! `memory.rs`, except async so the sweeper and snapshot writer can hold the
//! lock across `.await` points. A remote tier is consulted on miss and
//! populated on write, but its failure never surfaces to the caller — a
//! failed remote call degrades to the in-memory result, never an error
//! (`SPEC_FULL.md` §4.1).
//!
//! Disk snapshots are a pair of files: `intelligent-cache.json` holds the
//! entries themselves, `cache-metadata.json` the bookkeeping (`spec.md`
//! §4.1 "Persisted cache snapshot layout"). Each entry's value is optionally
//! compressed and/or encrypted before being written, tagged with a
//! `compressed:` or `encrypted:<iv>:<cipher>` prefix so a reader knows how
//! to reverse the transform without consulting the live config.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use brain_types::domain::{CacheEntry, CacheStats};
use brain_types::{BrainError, BrainResult, CacheConfig};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const SNAPSHOT_FORMAT: &str = "v1";
const CACHE_FILE: &str = "intelligent-cache.json";
const METADATA_FILE: &str = "cache-metadata.json";

/// Pluggable remote cache tier. Implementations must treat every error as
/// recoverable — the caller always has the in-memory map to fall back to.
#[async_trait::async_trait]
pub trait RemoteCacheTier: Send + Sync {
    async fn get(&self, key: &str) -> BrainResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, bytes: Vec<u8>, ttl: Duration) -> BrainResult<()>;
}

struct Inner {
    entries: HashMap<String, CacheEntry<serde_json::Value>>,
    stats: CacheStats,
    max_size: usize,
}

pub struct Cache {
    inner: Arc<RwLock<Inner>>,
    config: CacheConfig,
    remote: Option<Arc<dyn RemoteCacheTier>>,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Self {
        let max_size = config.max_size;
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
                max_size,
            })),
            config,
            remote: None,
        }
    }

    pub fn with_remote(config: CacheConfig, remote: Arc<dyn RemoteCacheTier>) -> Self {
        let max_size = config.max_size;
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
                max_size,
            })),
            config,
            remote: Some(remote),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> BrainResult<Option<T>> {
        {
            let mut inner = self.inner.write().await;
            if let Some(entry) = inner.entries.get_mut(key) {
                if entry.expires_at > Utc::now() {
                    entry.access_count += 1;
                    entry.last_accessed = Utc::now();
                    inner.stats.hits += 1;
                    let value = entry.value.clone();
                    recompute_hit_rate(&mut inner.stats);
                    return Ok(Some(
                        serde_json::from_value(value)
                            .map_err(BrainError::from)?,
                    ));
                }
                inner.entries.remove(key);
            }
            inner.stats.misses += 1;
            recompute_hit_rate(&mut inner.stats);
        }

        if let Some(remote) = &self.remote {
            if let Ok(Some(bytes)) = remote.get(key).await {
                if let Ok(value) = decode_entry(&bytes, &self.config) {
                    self.set_raw(key, value.clone(), self.config.default_ttl_seconds, Default::default())
                        .await?;
                    return Ok(Some(
                        serde_json::from_value(value)
                            .map_err(BrainError::from)?,
                    ));
                }
            }
        }

        Ok(None)
    }

    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: T,
        ttl_seconds: Option<u64>,
    ) -> BrainResult<()> {
        let json = serde_json::to_value(value).map_err(BrainError::from)?;
        let ttl = ttl_seconds.unwrap_or(self.config.default_ttl_seconds);
        self.set_raw(key, json.clone(), ttl, Default::default()).await?;

        if let Some(remote) = &self.remote {
            let bytes = encode_entry(&json, &self.config)?;
            let _ = remote.set(key, bytes, Duration::from_secs(ttl)).await;
        }
        Ok(())
    }

    async fn set_raw(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl_seconds: u64,
        tags: HashSet<String>,
    ) -> BrainResult<()> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: now,
                expires_at: now + chrono::Duration::seconds(ttl_seconds as i64),
                access_count: 0,
                last_accessed: now,
                tags,
            },
        );

        while inner.entries.len() > inner.max_size {
            evict_lru(&mut inner);
        }
        inner.stats.size = inner.entries.len();
        Ok(())
    }

    /// Remove `key`, reporting whether an entry was actually present.
    pub async fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        let existed = inner.entries.remove(key).is_some();
        inner.stats.size = inner.entries.len();
        existed
    }

    /// Retained for existing callers; equivalent to `delete` without the
    /// presence report.
    pub async fn invalidate(&self, key: &str) {
        self.delete(key).await;
    }

    /// Whether `key` is present and not expired.
    pub async fn has(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.entries.get(key).is_some_and(|e| e.expires_at > Utc::now())
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.stats.size = 0;
    }

    /// Change the capacity, evicting least-recently-used entries if the new
    /// size is smaller than the current entry count.
    pub async fn resize(&self, new_size: usize) {
        let mut inner = self.inner.write().await;
        inner.max_size = new_size;
        while inner.entries.len() > inner.max_size {
            evict_lru(&mut inner);
        }
        inner.stats.size = inner.entries.len();
    }

    /// Remove every entry carrying `tag`, returning the number removed.
    pub async fn invalidate_by_tag(&self, tag: &str) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, e| !e.tags.contains(tag));
        let removed = before - inner.entries.len();
        inner.stats.size = inner.entries.len();
        removed
    }

    /// Remove every entry older than `age` (time since insertion), returning
    /// the number removed.
    pub async fn invalidate_older_than(&self, age: Duration) -> usize {
        let mut inner = self.inner.write().await;
        let cutoff = Utc::now() - chrono::Duration::from_std(age).unwrap_or(chrono::Duration::zero());
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.created_at > cutoff);
        let removed = before - inner.entries.len();
        inner.stats.size = inner.entries.len();
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats.clone()
    }

    /// Remove expired entries. Called on an interval by `spawn_sweeper`.
    pub async fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - inner.entries.len();
        inner.stats.evictions += removed as u64;
        inner.stats.size = inner.entries.len();
        removed
    }

    /// Spawn a background sweeper. The returned handle is cancel-safe:
    /// dropping or aborting it simply stops future sweeps.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let interval = Duration::from_secs(self.config.sweep_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                cache.sweep_expired().await;
            }
        })
    }

    /// Spawn a background snapshot writer if `disk_snapshot_dir` is set.
    pub fn spawn_snapshot_writer(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let dir = self.config.disk_snapshot_dir.clone()?;
        let cache = Arc::clone(self);
        let interval = Duration::from_secs(self.config.disk_snapshot_interval_seconds.max(1));
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = cache.write_snapshot(&dir).await {
                    tracing::warn!(error = %e, "cache snapshot write failed");
                }
            }
        }))
    }

    /// Evict everything; if a disk snapshot directory is configured, flush a
    /// final snapshot first so no pending writes are lost.
    pub async fn destroy(&self) -> BrainResult<()> {
        if let Some(dir) = self.config.disk_snapshot_dir.clone() {
            self.write_snapshot(&dir).await?;
        }
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.stats.size = 0;
        Ok(())
    }

    /// Atomically snapshot non-expired entries to `intelligent-cache.json`
    /// plus a `cache-metadata.json` sidecar (`spec.md` §4.1). Writes go to a
    /// temp file in the same directory, then `rename` into place so a reader
    /// never observes a partial snapshot.
    async fn write_snapshot(&self, dir: &str) -> BrainResult<()> {
        let now = Utc::now();
        let entries = {
            let inner = self.inner.read().await;
            inner.entries.clone()
        };

        let mut snapshot_entries = HashMap::new();
        for (key, entry) in entries.iter().filter(|(_, e)| e.expires_at > now) {
            let raw = serde_json::to_vec(&entry.value).map_err(BrainError::from)?;
            let encoded = transform_for_storage(&raw, &self.config)?;
            snapshot_entries.insert(
                key.clone(),
                SnapshotEntry {
                    value: encoded,
                    created_at: entry.created_at,
                    expires_at: entry.expires_at,
                    access_count: entry.access_count,
                    last_accessed: entry.last_accessed,
                    tags: entry.tags.clone(),
                },
            );
        }

        let dir_path = PathBuf::from(dir);
        tokio::fs::create_dir_all(&dir_path)
            .await
            .map_err(|e| BrainError::Io { source: e })?;

        let created_at = read_existing_created_at(&dir_path).await.unwrap_or(now);
        let total_entries = snapshot_entries.len();

        write_atomic(
            &dir_path,
            CACHE_FILE,
            &SnapshotFile {
                version: 1,
                format: SNAPSHOT_FORMAT.to_string(),
                saved_at: now,
                entries: snapshot_entries,
            },
        )
        .await?;

        write_atomic(
            &dir_path,
            METADATA_FILE,
            &MetadataFile {
                version: 1,
                created_at,
                last_persisted: now,
                total_entries,
                cache_format: SNAPSHOT_FORMAT.to_string(),
            },
        )
        .await?;

        Ok(())
    }

    /// Load a previously written snapshot at startup, if present. An
    /// unrecognised format version is treated as a soft reset — the load is
    /// skipped rather than erroring.
    pub async fn load_snapshot(&self, dir: &str) -> BrainResult<()> {
        let path = PathBuf::from(dir).join(CACHE_FILE);
        if !path.exists() {
            return Ok(());
        }
        let raw = tokio::fs::read(&path).await.map_err(|e| BrainError::Io { source: e })?;
        let snapshot: SnapshotFile = match serde_json::from_slice(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "cache snapshot is unreadable, resetting");
                return Ok(());
            }
        };
        if snapshot.format != SNAPSHOT_FORMAT {
            tracing::warn!(format = %snapshot.format, "cache snapshot format is unrecognised, resetting");
            return Ok(());
        }

        let now = Utc::now();
        let mut entries = HashMap::new();
        for (key, snap_entry) in snapshot.entries {
            if snap_entry.expires_at <= now {
                continue;
            }
            let raw = restore_from_storage(&snap_entry.value, &self.config)?;
            let value: serde_json::Value = serde_json::from_slice(&raw).map_err(BrainError::from)?;
            entries.insert(
                key,
                CacheEntry {
                    value,
                    created_at: snap_entry.created_at,
                    expires_at: snap_entry.expires_at,
                    access_count: snap_entry.access_count,
                    last_accessed: snap_entry.last_accessed,
                    tags: snap_entry.tags,
                },
            );
        }

        let mut inner = self.inner.write().await;
        inner.entries = entries;
        inner.stats.size = inner.entries.len();
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    version: u32,
    format: String,
    saved_at: DateTime<Utc>,
    entries: HashMap<String, SnapshotEntry>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEntry {
    value: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    access_count: u64,
    last_accessed: DateTime<Utc>,
    tags: HashSet<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataFile {
    version: u32,
    created_at: DateTime<Utc>,
    last_persisted: DateTime<Utc>,
    total_entries: usize,
    cache_format: String,
}

async fn read_existing_created_at(dir: &Path) -> Option<DateTime<Utc>> {
    let bytes = tokio::fs::read(dir.join(METADATA_FILE)).await.ok()?;
    let metadata: MetadataFile = serde_json::from_slice(&bytes).ok()?;
    Some(metadata.created_at)
}

async fn write_atomic<T: Serialize>(dir: &Path, filename: &str, value: &T) -> BrainResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(BrainError::from)?;
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BrainError::Io { source: e })?;
    tokio::fs::write(tmp.path(), &bytes)
        .await
        .map_err(|e| BrainError::Io { source: e })?;
    tmp.persist(dir.join(filename)).map_err(|e| BrainError::Io { source: e.error })?;
    Ok(())
}

fn recompute_hit_rate(stats: &mut CacheStats) {
    let total = stats.hits + stats.misses;
    stats.hit_rate = if total > 0 { stats.hits as f64 / total as f64 } else { 0.0 };
}

fn evict_lru(inner: &mut Inner) {
    if let Some(key) = inner
        .entries
        .iter()
        .min_by_key(|(_, e)| e.last_accessed)
        .map(|(k, _)| k.clone())
    {
        inner.entries.remove(&key);
        inner.stats.evictions += 1;
    }
}

/// Serialize `bytes` for storage, optionally compressing then optionally
/// encrypting, and tag the result so `restore_from_storage` can reverse it
/// without needing to know which transforms were applied at write time
/// (`spec.md` §4.1 "Serialization").
fn transform_for_storage(bytes: &[u8], config: &CacheConfig) -> BrainResult<String> {
    let compressed = if config.enable_compression {
        zstd::encode_all(bytes, 3).map_err(|e| BrainError::Io { source: e })?
    } else {
        bytes.to_vec()
    };

    match &config.encryption_key_hex {
        Some(hex_key) => {
            let (iv, ciphertext) = encrypt(&compressed, hex_key)?;
            Ok(format!("encrypted:{}:{}", STANDARD.encode(iv), STANDARD.encode(ciphertext)))
        }
        None if config.enable_compression => Ok(format!("compressed:{}", STANDARD.encode(compressed))),
        None => Ok(STANDARD.encode(compressed)),
    }
}

fn restore_from_storage(tagged: &str, config: &CacheConfig) -> BrainResult<Vec<u8>> {
    let stage1 = if let Some(rest) = tagged.strip_prefix("encrypted:") {
        let mut parts = rest.splitn(2, ':');
        let iv_b64 = parts.next().ok_or_else(|| BrainError::Other("malformed encrypted cache value".to_string()))?;
        let cipher_b64 = parts
            .next()
            .ok_or_else(|| BrainError::Other("malformed encrypted cache value".to_string()))?;
        let hex_key = config
            .encryption_key_hex
            .as_deref()
            .ok_or_else(|| BrainError::ConfigError("encrypted cache value but no encryption_key_hex configured".to_string()))?;
        let iv = STANDARD.decode(iv_b64).map_err(|e| BrainError::Other(format!("invalid cache iv: {e}")))?;
        let ciphertext = STANDARD
            .decode(cipher_b64)
            .map_err(|e| BrainError::Other(format!("invalid cache ciphertext: {e}")))?;
        decrypt(&ciphertext, &iv, hex_key)?
    } else if let Some(rest) = tagged.strip_prefix("compressed:") {
        STANDARD.decode(rest).map_err(|e| BrainError::Other(format!("invalid compressed cache value: {e}")))?
    } else {
        STANDARD.decode(tagged).map_err(|e| BrainError::Other(format!("invalid cache value: {e}")))?
    };

    if config.enable_compression {
        zstd::decode_all(stage1.as_slice()).map_err(|e| BrainError::Io { source: e })
    } else {
        Ok(stage1)
    }
}

/// AES-256-CBC encrypt with a freshly random IV (`spec.md` §4.1
/// "Serialization": `encrypted:<iv>:<cipher>`, 32-byte key, fresh IV per
/// write).
fn encrypt(plaintext: &[u8], hex_key: &str) -> BrainResult<(Vec<u8>, Vec<u8>)> {
    let key_bytes = decode_key(hex_key)?;
    let mut iv = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut iv);
    let cipher = Aes256CbcEnc::new_from_slices(&key_bytes, &iv)
        .map_err(|e| BrainError::Other(format!("cache encryption key rejected: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Ok((iv.to_vec(), ciphertext))
}

fn decrypt(ciphertext: &[u8], iv: &[u8], hex_key: &str) -> BrainResult<Vec<u8>> {
    let key_bytes = decode_key(hex_key)?;
    let cipher = Aes256CbcDec::new_from_slices(&key_bytes, iv)
        .map_err(|e| BrainError::Other(format!("cache decryption key rejected: {e}")))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| BrainError::Other(format!("cache decryption failed: {e}")))
}

fn decode_key(hex_key: &str) -> BrainResult<Vec<u8>> {
    let bytes = hex_decode(hex_key)?;
    if bytes.len() != 32 {
        return Err(BrainError::ConfigError(
            "encryption_key_hex must decode to 32 bytes for AES-256-CBC".to_string(),
        ));
    }
    Ok(bytes)
}

fn hex_decode(hex_key: &str) -> BrainResult<Vec<u8>> {
    (0..hex_key.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex_key[i..i + 2], 16)
                .map_err(|e| BrainError::ConfigError(format!("invalid encryption_key_hex: {e}")))
        })
        .collect()
}

fn decode_entry(bytes: &[u8], config: &CacheConfig) -> BrainResult<serde_json::Value> {
    let tagged = String::from_utf8(bytes.to_vec()).map_err(|e| BrainError::Other(format!("invalid cache wire value: {e}")))?;
    let raw = restore_from_storage(&tagged, config)?;
    serde_json::from_slice(&raw).map_err(BrainError::from)
}

fn encode_entry(value: &serde_json::Value, config: &CacheConfig) -> BrainResult<Vec<u8>> {
    let raw = serde_json::to_vec(value).map_err(BrainError::from)?;
    Ok(transform_for_storage(&raw, config)?.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CacheConfig {
        CacheConfig {
            max_size: 2,
            default_ttl_seconds: 300,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = Cache::new(config());
        cache.set("k", "v", None).await.unwrap();
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, Some("v".to_string()));
    }

    #[tokio::test]
    async fn expired_entries_are_treated_as_misses() {
        let cache = Cache::new(config());
        cache.set("k", "v", Some(0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn eviction_drops_least_recently_used() {
        let cache = Cache::new(config());
        cache.set("a", 1, None).await.unwrap();
        cache.set("b", 2, None).await.unwrap();
        let _: Option<i32> = cache.get("a").await.unwrap();
        cache.set("c", 3, None).await.unwrap();

        let a: Option<i32> = cache.get("a").await.unwrap();
        let b: Option<i32> = cache.get("b").await.unwrap();
        assert!(a.is_some());
        assert!(b.is_none());
    }

    #[tokio::test]
    async fn hit_rate_reflects_hits_and_misses() {
        let cache = Cache::new(config());
        cache.set("k", 1, None).await.unwrap();
        let _: Option<i32> = cache.get("k").await.unwrap();
        let _: Option<i32> = cache.get("missing").await.unwrap();
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn has_reflects_presence_without_bumping_access_count() {
        let cache = Cache::new(config());
        cache.set("k", 1, None).await.unwrap();
        assert!(cache.has("k").await);
        assert!(!cache.has("missing").await);
    }

    #[tokio::test]
    async fn delete_reports_whether_an_entry_existed() {
        let cache = Cache::new(config());
        cache.set("k", 1, None).await.unwrap();
        assert!(cache.delete("k").await);
        assert!(!cache.delete("k").await);
    }

    #[tokio::test]
    async fn clear_removes_every_entry() {
        let cache = Cache::new(config());
        cache.set("a", 1, None).await.unwrap();
        cache.set("b", 2, None).await.unwrap();
        cache.clear().await;
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn resize_down_evicts_lru_entries_immediately() {
        let cache = Cache::new(config());
        cache.set("a", 1, None).await.unwrap();
        cache.set("b", 2, None).await.unwrap();
        cache.resize(1).await;
        assert_eq!(cache.stats().await.size, 1);
    }

    #[tokio::test]
    async fn invalidate_by_tag_removes_only_tagged_entries() {
        let cache = Cache::new(config());
        cache.set_raw("a", serde_json::json!(1), 300, ["hot".to_string()].into_iter().collect()).await.unwrap();
        cache.set("b", 2, None).await.unwrap();
        let removed = cache.invalidate_by_tag("hot").await;
        assert_eq!(removed, 1);
        assert_eq!(cache.stats().await.size, 1);
    }

    #[tokio::test]
    async fn invalidate_older_than_removes_only_stale_entries() {
        let cache = Cache::new(config());
        cache.set("a", 1, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let removed = cache.invalidate_older_than(Duration::from_millis(5)).await;
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.disk_snapshot_dir = Some(dir.path().to_string_lossy().to_string());
        let cache = Arc::new(Cache::new(cfg));
        cache.set("k", "persisted", None).await.unwrap();
        cache
            .write_snapshot(&dir.path().to_string_lossy())
            .await
            .unwrap();

        assert!(dir.path().join(CACHE_FILE).exists());
        assert!(dir.path().join(METADATA_FILE).exists());

        let restored = Arc::new(Cache::new(config()));
        restored
            .load_snapshot(&dir.path().to_string_lossy())
            .await
            .unwrap();
        let value: Option<String> = restored.get("k").await.unwrap();
        assert_eq!(value, Some("persisted".to_string()));
    }

    #[tokio::test]
    async fn snapshot_round_trips_with_compression_and_encryption() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.disk_snapshot_dir = Some(dir.path().to_string_lossy().to_string());
        cfg.enable_compression = true;
        cfg.encryption_key_hex = Some("00".repeat(32));
        let cache = Arc::new(Cache::new(cfg.clone()));
        cache.set("k", "secret-payload", None).await.unwrap();
        cache
            .write_snapshot(&dir.path().to_string_lossy())
            .await
            .unwrap();

        let restored = Arc::new(Cache::new(cfg));
        restored
            .load_snapshot(&dir.path().to_string_lossy())
            .await
            .unwrap();
        let value: Option<String> = restored.get("k").await.unwrap();
        assert_eq!(value, Some("secret-payload".to_string()));
    }

    #[tokio::test]
    async fn destroy_flushes_a_final_snapshot_and_clears_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.disk_snapshot_dir = Some(dir.path().to_string_lossy().to_string());
        let cache = Arc::new(Cache::new(cfg));
        cache.set("k", "v", None).await.unwrap();
        cache.destroy().await.unwrap();

        assert_eq!(cache.stats().await.size, 0);
        assert!(dir.path().join(CACHE_FILE).exists());
    }
}
