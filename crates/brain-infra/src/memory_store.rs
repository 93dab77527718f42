//! Durable memory/learning/pattern store (C2), backed by SQLite through
//! `sqlx`. Schema setup mirrors `DatabaseManager::initialize_schema` in
//! `database.rs`: idempotent `CREATE TABLE IF NOT EXISTS` statements run on
//! connect, and WAL mode is enabled so concurrent readers don't block the
//! sweeper (`SPEC_FULL.md` §4.2).

use brain_types::domain::{Learning, LearningInsights, LearningStats, Memory, Pattern, SearchOptions};
use brain_types::{lowercase_words, BrainError, BrainResult, MemoryStoreConfig};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

pub struct MemoryStore {
    pool: SqlitePool,
    config: MemoryStoreConfig,
}

impl MemoryStore {
    pub async fn connect(config: MemoryStoreConfig) -> BrainResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to connect: {e}")))?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to enable WAL: {e}")))?;

        let store = Self { pool, config };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> BrainResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                category TEXT NOT NULL,
                project_path TEXT,
                confidence REAL NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                expires_at TEXT,
                tags TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to create memories table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_key ON memories(key)")
            .execute(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to index memories: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS learnings (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                user_input TEXT NOT NULL,
                intent TEXT NOT NULL,
                tasks_completed TEXT NOT NULL,
                success INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL,
                learnings TEXT NOT NULL,
                suggestions TEXT NOT NULL,
                project_path TEXT,
                confidence REAL NOT NULL,
                created_at TEXT NOT NULL,
                metadata TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to create learnings table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patterns (
                id TEXT PRIMARY KEY,
                pattern_type TEXT NOT NULL,
                pattern_data TEXT NOT NULL,
                frequency INTEGER NOT NULL,
                confidence REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_seen TEXT NOT NULL,
                UNIQUE(pattern_type, pattern_data)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to create patterns table: {e}")))?;

        Ok(())
    }

    pub async fn health_check(&self) -> BrainResult<bool> {
        let row = sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("health check failed: {e}")))?;
        let value: i32 = row.get(0);
        Ok(value == 1)
    }

    pub async fn store_memory(
        &self,
        key: &str,
        value: serde_json::Value,
        category: &str,
        project_path: Option<String>,
        confidence: f64,
        tags: HashSet<String>,
    ) -> BrainResult<Memory> {
        self.store_memory_with_expiry(key, value, category, project_path, confidence, tags, None).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn store_memory_with_expiry(
        &self,
        key: &str,
        value: serde_json::Value,
        category: &str,
        project_path: Option<String>,
        confidence: f64,
        tags: HashSet<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> BrainResult<Memory> {
        let now = Utc::now();
        let memory = Memory {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value,
            category: category.to_string(),
            project_path,
            confidence,
            access_count: 0,
            created_at: now,
            updated_at: now,
            expires_at,
            tags,
        };

        sqlx::query(
            r#"
            INSERT INTO memories (id, key, value, category, project_path, confidence, access_count, created_at, updated_at, expires_at, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(memory.id.to_string())
        .bind(&memory.key)
        .bind(memory.value.to_string())
        .bind(&memory.category)
        .bind(&memory.project_path)
        .bind(memory.confidence)
        .bind(memory.access_count as i64)
        .bind(memory.created_at.to_rfc3339())
        .bind(memory.updated_at.to_rfc3339())
        .bind(memory.expires_at.map(|e| e.to_rfc3339()))
        .bind(serde_json::to_string(&memory.tags).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to store memory: {e}")))?;

        Ok(memory)
    }

    pub async fn get_memory_by_key(&self, key: &str) -> BrainResult<Option<Memory>> {
        let row = sqlx::query("SELECT * FROM memories WHERE key = ? ORDER BY updated_at DESC LIMIT 1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to fetch memory: {e}")))?;

        let Some(row) = row else { return Ok(None) };
        let memory = row_to_memory(&row)?;

        sqlx::query("UPDATE memories SET access_count = access_count + 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(memory.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to bump access count: {e}")))?;

        Ok(Some(memory))
    }

    pub async fn search_memories(&self, options: &SearchOptions) -> BrainResult<Vec<Memory>> {
        let mut sql = String::from("SELECT * FROM memories WHERE 1=1");
        if options.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if options.project_path.is_some() {
            sql.push_str(" AND project_path = ?");
        }
        if options.min_confidence.is_some() {
            sql.push_str(" AND confidence >= ?");
        }
        if !options.include_expired {
            sql.push_str(" AND (expires_at IS NULL OR expires_at > datetime('now'))");
        }
        sql.push_str(" ORDER BY confidence DESC, access_count DESC, updated_at DESC");
        if options.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = &options.category {
            query = query.bind(category);
        }
        if let Some(project_path) = &options.project_path {
            query = query.bind(project_path);
        }
        if let Some(min_confidence) = options.min_confidence {
            query = query.bind(min_confidence);
        }
        if let Some(limit) = options.limit {
            query = query.bind(limit as i64);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to search memories: {e}")))?;

        let mut memories = Vec::with_capacity(rows.len());
        for row in &rows {
            let memory = row_to_memory(row)?;
            if options.tags.is_empty() || options.tags.iter().any(|t| memory.tags.contains(t)) {
                memories.push(memory);
            }
        }

        // `spec.md` §4.2 `retrieveMemories` bumps access bookkeeping for
        // every memory it returns, same as `get_memory_by_key`.
        let now = Utc::now();
        for memory in memories.iter_mut() {
            sqlx::query("UPDATE memories SET access_count = access_count + 1, updated_at = ? WHERE id = ?")
                .bind(now.to_rfc3339())
                .bind(memory.id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| BrainError::DatabaseError(format!("failed to bump access count: {e}")))?;
            memory.access_count += 1;
            memory.updated_at = now;
        }

        Ok(memories)
    }

    pub async fn delete_memory(&self, id: uuid::Uuid) -> BrainResult<()> {
        sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to delete memory: {e}")))?;
        Ok(())
    }

    pub async fn record_learning(&self, learning: &Learning) -> BrainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO learnings (id, session_id, user_input, intent, tasks_completed, success, duration_ms, learnings, suggestions, project_path, confidence, created_at, metadata)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(learning.id.to_string())
        .bind(&learning.session_id)
        .bind(&learning.user_input)
        .bind(&learning.intent)
        .bind(serde_json::to_string(&learning.tasks_completed).unwrap_or_default())
        .bind(learning.success)
        .bind(learning.duration.as_millis() as i64)
        .bind(serde_json::to_string(&learning.learnings).unwrap_or_default())
        .bind(serde_json::to_string(&learning.suggestions).unwrap_or_default())
        .bind(&learning.project_path)
        .bind(learning.confidence)
        .bind(learning.created_at.to_rfc3339())
        .bind(serde_json::to_string(&learning.metadata).unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to record learning: {e}")))?;

        self.update_learning_patterns(learning).await?;
        self.promote_learning_to_memories(learning).await?;
        Ok(())
    }

    /// Bump the four pattern counters `spec.md` §4.7 ties to every recorded
    /// learning: intent frequency, success/failure by intent, duration
    /// bucket, and task-count ("complexity") bucket.
    async fn update_learning_patterns(&self, learning: &Learning) -> BrainResult<()> {
        self.observe_pattern("intent_frequency", &learning.intent, learning.confidence).await?;

        let outcome_pattern = if learning.success { "success_pattern" } else { "failure_pattern" };
        self.observe_pattern(outcome_pattern, &learning.intent, learning.confidence).await?;

        let duration_key = format!("{}_{}", learning.intent, duration_bucket(learning.duration));
        self.observe_pattern("duration_pattern", &duration_key, learning.confidence).await?;

        let complexity_key = format!("{}_{}", learning.intent, complexity_bucket(learning.tasks_completed.len()));
        self.observe_pattern("complexity_pattern", &complexity_key, learning.confidence).await?;

        Ok(())
    }

    /// Promote a notable learning into durable memories (`spec.md` §4.7):
    /// a `success_pattern` memory for the intent, plus up to 3
    /// `specific_learning` memories for the individual learnings recorded,
    /// each expiring after 30 days. Only fires for high-confidence successes.
    async fn promote_learning_to_memories(&self, learning: &Learning) -> BrainResult<()> {
        if !(learning.confidence > 0.7 && learning.success) {
            return Ok(());
        }

        let mut success_tags = HashSet::new();
        success_tags.insert("success".to_string());
        success_tags.insert(learning.intent.clone());
        success_tags.insert("pattern".to_string());
        self.store_memory(
            &format!("successful_intent_{}", learning.intent),
            serde_json::json!({ "intent": learning.intent, "session_id": learning.session_id }),
            "success_pattern",
            learning.project_path.clone(),
            learning.confidence,
            success_tags,
        )
        .await?;

        let expires_at = Utc::now() + ChronoDuration::days(30);
        for (index, content) in learning.learnings.iter().take(3).enumerate() {
            let mut tags = HashSet::new();
            tags.insert("learning".to_string());
            tags.insert(learning.intent.clone());
            self.store_memory_with_expiry(
                &format!("learning_{index}"),
                serde_json::json!({ "intent": learning.intent, "content": content }),
                "specific_learning",
                learning.project_path.clone(),
                0.8 * learning.confidence,
                tags,
                Some(expires_at),
            )
            .await?;
        }

        Ok(())
    }

    /// Two-pass relevance lookup (`spec.md` §4.2 `retrieveRelevantMemories`):
    /// first, memories whose key/value text shares a word with `query`;
    /// topped up with high-confidence memories if still under `limit`.
    pub async fn retrieve_relevant_memories(
        &self,
        query: &str,
        project_path: Option<&str>,
        limit: usize,
    ) -> BrainResult<Vec<Memory>> {
        let query_words: HashSet<String> = lowercase_words(query).into_iter().collect();

        let options = SearchOptions {
            project_path: project_path.map(|p| p.to_string()),
            ..Default::default()
        };
        let candidates = self.search_memories(&options).await?;

        let mut matched = Vec::new();
        let mut seen = HashSet::new();
        for memory in &candidates {
            let text = format!("{} {}", memory.key, memory.value);
            let words = lowercase_words(&text);
            if words.iter().any(|w| query_words.contains(w)) {
                seen.insert(memory.id);
                matched.push(memory.clone());
            }
        }

        if matched.len() < limit {
            let mut by_confidence: Vec<&Memory> = candidates.iter().filter(|m| m.confidence >= 0.7).collect();
            by_confidence.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
            for memory in by_confidence {
                if matched.len() >= limit {
                    break;
                }
                if seen.insert(memory.id) {
                    matched.push(memory.clone());
                }
            }
        }

        matched.truncate(limit);
        Ok(matched)
    }

    /// Aggregate success counts over `learnings` (`spec.md` §4.2
    /// `getLearningStats()`).
    pub async fn get_learning_stats(&self) -> BrainResult<LearningStats> {
        let total: i64 = sqlx::query("SELECT COUNT(*) FROM learnings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to count learnings: {e}")))?
            .get(0);

        let successful: i64 = sqlx::query("SELECT COUNT(*) FROM learnings WHERE success = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to count successful learnings: {e}")))?
            .get(0);

        let success_rate = if total == 0 { 0.0 } else { successful as f64 / total as f64 };

        Ok(LearningStats {
            total_learnings: total as u64,
            successful_learnings: successful as u64,
            success_rate,
        })
    }

    /// Top intents/patterns by frequency, plus a 7-day daily learning trend
    /// (`spec.md` §4.2 `getInsights()`).
    pub async fn get_insights(&self) -> BrainResult<LearningInsights> {
        let intent_rows = sqlx::query(
            "SELECT intent, COUNT(*) as n FROM learnings GROUP BY intent ORDER BY n DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to aggregate intents: {e}")))?;
        let top_intents = intent_rows
            .iter()
            .map(|r| (r.get::<String, _>("intent"), r.get::<i64, _>("n") as u64))
            .collect();

        let pattern_rows = sqlx::query(
            "SELECT pattern_type || ':' || pattern_data as label, frequency FROM patterns ORDER BY frequency DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to aggregate patterns: {e}")))?;
        let top_patterns = pattern_rows
            .iter()
            .map(|r| (r.get::<String, _>("label"), r.get::<i64, _>("frequency") as u64))
            .collect();

        let cutoff = (Utc::now() - ChronoDuration::days(7)).to_rfc3339();
        let trend_rows = sqlx::query(
            "SELECT substr(created_at, 1, 10) as day, COUNT(*) as n FROM learnings WHERE created_at >= ? GROUP BY day ORDER BY day ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to aggregate daily trend: {e}")))?;
        let daily_trend = trend_rows
            .iter()
            .map(|r| (r.get::<String, _>("day"), r.get::<i64, _>("n") as u64))
            .collect();

        Ok(LearningInsights { top_intents, top_patterns, daily_trend })
    }

    pub async fn get_learnings_by_session(&self, session_id: &str) -> BrainResult<Vec<Learning>> {
        let rows = sqlx::query("SELECT * FROM learnings WHERE session_id = ? ORDER BY created_at DESC")
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to fetch learnings: {e}")))?;

        rows.iter().map(row_to_learning).collect()
    }

    /// Upsert a pattern observation, bumping its frequency and recency if it
    /// already exists for this `(pattern_type, pattern_data)` pair.
    pub async fn observe_pattern(&self, pattern_type: &str, pattern_data: &str, confidence: f64) -> BrainResult<Pattern> {
        let existing = sqlx::query("SELECT * FROM patterns WHERE pattern_type = ? AND pattern_data = ?")
            .bind(pattern_type)
            .bind(pattern_data)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to look up pattern: {e}")))?;

        let now = Utc::now();
        if let Some(row) = existing {
            let id: String = row.get("id");
            let frequency: i64 = row.get("frequency");
            let new_frequency = frequency + 1;
            sqlx::query("UPDATE patterns SET frequency = ?, confidence = ?, updated_at = ?, last_seen = ? WHERE id = ?")
                .bind(new_frequency)
                .bind(confidence)
                .bind(now.to_rfc3339())
                .bind(now.to_rfc3339())
                .bind(&id)
                .execute(&self.pool)
                .await
                .map_err(|e| BrainError::DatabaseError(format!("failed to update pattern: {e}")))?;
            return Ok(row_to_pattern(&row, new_frequency as u64, confidence, now)?);
        }

        let pattern = Pattern {
            id: Uuid::new_v4(),
            pattern_type: pattern_type.to_string(),
            pattern_data: pattern_data.to_string(),
            frequency: 1,
            confidence,
            created_at: now,
            updated_at: now,
            last_seen: now,
        };
        sqlx::query(
            "INSERT INTO patterns (id, pattern_type, pattern_data, frequency, confidence, created_at, updated_at, last_seen) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pattern.id.to_string())
        .bind(&pattern.pattern_type)
        .bind(&pattern.pattern_data)
        .bind(pattern.frequency as i64)
        .bind(pattern.confidence)
        .bind(pattern.created_at.to_rfc3339())
        .bind(pattern.updated_at.to_rfc3339())
        .bind(pattern.last_seen.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to insert pattern: {e}")))?;

        Ok(pattern)
    }

    /// Promote patterns that have crossed a frequency/confidence bar into
    /// durable memories, tagged `"pattern"` (`SPEC_FULL.md` §4.2 supplement).
    pub async fn promote_patterns(&self, min_frequency: u64, min_confidence: f64) -> BrainResult<Vec<Memory>> {
        let rows = sqlx::query("SELECT * FROM patterns WHERE frequency >= ? AND confidence >= ?")
            .bind(min_frequency as i64)
            .bind(min_confidence)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BrainError::DatabaseError(format!("failed to select promotable patterns: {e}")))?;

        let mut promoted = Vec::with_capacity(rows.len());
        for row in rows {
            let pattern_type: String = row.get("pattern_type");
            let pattern_data: String = row.get("pattern_data");
            let confidence: f64 = row.get("confidence");
            let mut tags = HashSet::new();
            tags.insert("pattern".to_string());
            tags.insert(pattern_type.clone());

            let memory = self
                .store_memory(
                    &format!("pattern:{pattern_type}:{pattern_data}"),
                    serde_json::json!({ "pattern_type": pattern_type, "pattern_data": pattern_data }),
                    "pattern",
                    None,
                    confidence,
                    tags,
                )
                .await?;
            promoted.push(memory);
        }
        Ok(promoted)
    }

    /// Delete memories whose confidence and access pattern mark them as
    /// low value (`spec.md` §4.2 retention policy).
    pub async fn prune_low_value(&self) -> BrainResult<u64> {
        let cutoff = Utc::now() - ChronoDuration::days(self.config.low_value_age_days);
        let result = sqlx::query(
            "DELETE FROM memories WHERE confidence < ? AND access_count = 0 AND created_at < ?",
        )
        .bind(self.config.low_value_confidence_threshold)
        .bind(cutoff.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| BrainError::DatabaseError(format!("failed to prune low-value memories: {e}")))?;
        Ok(result.rows_affected())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_memory(row: &sqlx::sqlite::SqliteRow) -> BrainResult<Memory> {
    let id: String = row.get("id");
    let tags_json: String = row.get("tags");
    let value_json: String = row.get("value");
    let expires_at: Option<String> = row.get("expires_at");

    Ok(Memory {
        id: Uuid::parse_str(&id).map_err(|e| BrainError::DatabaseError(format!("bad id: {e}")))?,
        key: row.get("key"),
        value: serde_json::from_str(&value_json).unwrap_or(serde_json::Value::Null),
        category: row.get("category"),
        project_path: row.get("project_path"),
        confidence: row.get("confidence"),
        access_count: row.get::<i64, _>("access_count") as u64,
        created_at: parse_rfc3339(row.get("created_at"))?,
        updated_at: parse_rfc3339(row.get("updated_at"))?,
        expires_at: expires_at.map(|e| parse_rfc3339(e)).transpose()?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
    })
}

fn row_to_learning(row: &sqlx::sqlite::SqliteRow) -> BrainResult<Learning> {
    let id: String = row.get("id");
    let duration_ms: i64 = row.get("duration_ms");
    Ok(Learning {
        id: Uuid::parse_str(&id).map_err(|e| BrainError::DatabaseError(format!("bad id: {e}")))?,
        session_id: row.get("session_id"),
        user_input: row.get("user_input"),
        intent: row.get("intent"),
        tasks_completed: serde_json::from_str(&row.get::<String, _>("tasks_completed")).unwrap_or_default(),
        success: row.get("success"),
        duration: ChronoDuration::milliseconds(duration_ms).to_std().unwrap_or_default(),
        learnings: serde_json::from_str(&row.get::<String, _>("learnings")).unwrap_or_default(),
        suggestions: serde_json::from_str(&row.get::<String, _>("suggestions")).unwrap_or_default(),
        project_path: row.get("project_path"),
        confidence: row.get("confidence"),
        created_at: parse_rfc3339(row.get("created_at"))?,
        metadata: serde_json::from_str(&row.get::<String, _>("metadata")).unwrap_or_default(),
    })
}

fn row_to_pattern(
    row: &sqlx::sqlite::SqliteRow,
    frequency: u64,
    confidence: f64,
    updated_at: DateTime<Utc>,
) -> BrainResult<Pattern> {
    let id: String = row.get("id");
    Ok(Pattern {
        id: Uuid::parse_str(&id).map_err(|e| BrainError::DatabaseError(format!("bad id: {e}")))?,
        pattern_type: row.get("pattern_type"),
        pattern_data: row.get("pattern_data"),
        frequency,
        confidence,
        created_at: parse_rfc3339(row.get("created_at"))?,
        updated_at,
        last_seen: updated_at,
    })
}

fn duration_bucket(duration: std::time::Duration) -> &'static str {
    if duration.as_secs() <= 30 {
        "fast"
    } else if duration.as_secs() <= 120 {
        "medium"
    } else {
        "slow"
    }
}

fn complexity_bucket(task_count: usize) -> &'static str {
    if task_count <= 3 {
        "simple"
    } else if task_count <= 7 {
        "moderate"
    } else {
        "complex"
    }
}

fn parse_rfc3339(value: String) -> BrainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| BrainError::DatabaseError(format!("bad timestamp {value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_types::domain::SearchOptions;

    async fn store() -> MemoryStore {
        MemoryStore::connect(MemoryStoreConfig {
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn stores_and_retrieves_by_key() {
        let store = store().await;
        store
            .store_memory("greeting", serde_json::json!("hi"), "note", None, 0.9, HashSet::new())
            .await
            .unwrap();
        let found = store.get_memory_by_key("greeting").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().access_count, 0);

        let second = store.get_memory_by_key("greeting").await.unwrap().unwrap();
        assert_eq!(second.access_count, 1);
    }

    #[tokio::test]
    async fn search_filters_by_category_and_confidence() {
        let store = store().await;
        store
            .store_memory("a", serde_json::json!(1), "fact", None, 0.9, HashSet::new())
            .await
            .unwrap();
        store
            .store_memory("b", serde_json::json!(2), "fact", None, 0.1, HashSet::new())
            .await
            .unwrap();

        let results = store
            .search_memories(&SearchOptions {
                category: Some("fact".to_string()),
                min_confidence: Some(0.5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "a");
    }

    #[tokio::test]
    async fn pattern_promotion_requires_threshold() {
        let store = store().await;
        for _ in 0..3 {
            store.observe_pattern("retry", "timeout", 0.8).await.unwrap();
        }
        let promoted = store.promote_patterns(3, 0.7).await.unwrap();
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].category, "pattern");
    }

    fn learning(intent: &str, success: bool, confidence: f64) -> Learning {
        Learning {
            id: Uuid::new_v4(),
            session_id: "s1".to_string(),
            user_input: "do the thing".to_string(),
            intent: intent.to_string(),
            tasks_completed: vec!["a".to_string(), "b".to_string()],
            success,
            duration: std::time::Duration::from_secs(5),
            learnings: vec!["use caching".to_string(), "batch requests".to_string()],
            suggestions: vec![],
            project_path: None,
            confidence,
            created_at: Utc::now(),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn recording_a_learning_updates_pattern_counters() {
        let store = store().await;
        store.record_learning(&learning("refactor", true, 0.9)).await.unwrap();

        let patterns = sqlx::query("SELECT pattern_type, pattern_data FROM patterns")
            .fetch_all(store.pool())
            .await
            .unwrap();
        let pairs: Vec<(String, String)> =
            patterns.iter().map(|r| (r.get("pattern_type"), r.get("pattern_data"))).collect();
        assert!(pairs.contains(&("intent_frequency".to_string(), "refactor".to_string())));
        assert!(pairs.contains(&("success_pattern".to_string(), "refactor".to_string())));
        assert!(pairs.contains(&("duration_pattern".to_string(), "refactor_fast".to_string())));
        assert!(pairs.contains(&("complexity_pattern".to_string(), "refactor_simple".to_string())));
    }

    #[tokio::test]
    async fn high_confidence_success_promotes_memories() {
        let store = store().await;
        store.record_learning(&learning("refactor", true, 0.9)).await.unwrap();

        let success = store.get_memory_by_key("successful_intent_refactor").await.unwrap();
        assert!(success.is_some());
        assert_eq!(success.unwrap().category, "success_pattern");

        let specific = store.get_memory_by_key("learning_0").await.unwrap();
        assert!(specific.is_some());
        assert_eq!(specific.unwrap().category, "specific_learning");
    }

    #[tokio::test]
    async fn low_confidence_learning_is_not_promoted() {
        let store = store().await;
        store.record_learning(&learning("refactor", true, 0.3)).await.unwrap();
        assert!(store.get_memory_by_key("successful_intent_refactor").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn retrieve_relevant_memories_matches_query_words_then_tops_up_by_confidence() {
        let store = store().await;
        store
            .store_memory("caching_tip", serde_json::json!("use redis for caching"), "note", None, 0.9, HashSet::new())
            .await
            .unwrap();
        store
            .store_memory("unrelated", serde_json::json!("totally different"), "note", None, 0.95, HashSet::new())
            .await
            .unwrap();

        let results = store.retrieve_relevant_memories("caching strategy", None, 5).await.unwrap();
        assert_eq!(results[0].key, "caching_tip");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn learning_stats_reports_success_rate() {
        let store = store().await;
        store.record_learning(&learning("a", true, 0.9)).await.unwrap();
        store.record_learning(&learning("b", false, 0.9)).await.unwrap();

        let stats = store.get_learning_stats().await.unwrap();
        assert_eq!(stats.total_learnings, 2);
        assert_eq!(stats.successful_learnings, 1);
        assert!((stats.success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn insights_rank_intents_by_frequency() {
        let store = store().await;
        store.record_learning(&learning("deploy", true, 0.9)).await.unwrap();
        store.record_learning(&learning("deploy", true, 0.9)).await.unwrap();
        store.record_learning(&learning("cleanup", true, 0.9)).await.unwrap();

        let insights = store.get_insights().await.unwrap();
        assert_eq!(insights.top_intents[0], ("deploy".to_string(), 2));
    }

    #[tokio::test]
    async fn retrieve_memories_breaks_confidence_ties_by_access_count() {
        let store = store().await;
        let low_access = store
            .store_memory("idle", serde_json::json!("idle"), "note", None, 0.8, HashSet::new())
            .await
            .unwrap();
        store
            .store_memory("active", serde_json::json!("active"), "note", None, 0.8, HashSet::new())
            .await
            .unwrap();
        for _ in 0..3 {
            store.get_memory_by_key("active").await.unwrap();
        }

        let results = store
            .search_memories(&SearchOptions { min_confidence: Some(0.5), limit: Some(1), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "active");
        assert_eq!(results[0].access_count, 4);
        assert!(results[0].updated_at > low_access.updated_at);
    }

    #[tokio::test]
    async fn prune_removes_low_value_old_memories() {
        let store = store().await;
        store
            .store_memory("stale", serde_json::json!(1), "note", None, 0.05, HashSet::new())
            .await
            .unwrap();
        // created_at is "now" so the age cutoff won't catch it; verify the
        // confidence/access_count gate alone does not prune recent writes.
        let pruned = store.prune_low_value().await.unwrap();
        assert_eq!(pruned, 0);
    }
}
