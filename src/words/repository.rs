use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::error::ApiError;
use crate::words::models::{Category, NewWord, UpdateWord, Word};

/// Storage operations for the word resource
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Pick one word uniformly at random, `None` when the collection is empty
    async fn random(&self) -> Result<Option<Word>, ApiError>;

    /// One page of words, newest first, plus the total matching count
    async fn list(
        &self,
        category: Option<Category>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Word>, u64), ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>, ApiError>;

    /// Insert a word; `Conflict` when the word already exists
    async fn create(&self, new_word: NewWord) -> Result<Word, ApiError>;

    /// Apply a partial update; `None` when the id is unknown
    async fn update(&self, id: Uuid, changes: UpdateWord) -> Result<Option<Word>, ApiError>;

    /// Remove a word and return it; `None` when the id is unknown
    async fn delete(&self, id: Uuid) -> Result<Option<Word>, ApiError>;
}

fn duplicate_word(word: &str) -> ApiError {
    ApiError::Conflict {
        message: format!("Word '{}' already exists", word),
    }
}

/// PostgreSQL-backed word repository
#[derive(Clone)]
pub struct WordRepository {
    pool: PgPool,
}

impl WordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WordStore for WordRepository {
    async fn random(&self) -> Result<Option<Word>, ApiError> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            SELECT id, word, category, definition, created_at, updated_at
            FROM words
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    async fn list(
        &self,
        category: Option<Category>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Word>, u64), ApiError> {
        let words = sqlx::query_as::<_, Word>(
            r#"
            SELECT id, word, category, definition, created_at, updated_at
            FROM words
            WHERE ($1::word_category IS NULL OR category = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM words WHERE ($1::word_category IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok((words, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>, ApiError> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            SELECT id, word, category, definition, created_at, updated_at
            FROM words
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }

    async fn create(&self, new_word: NewWord) -> Result<Word, ApiError> {
        sqlx::query_as::<_, Word>(
            r#"
            INSERT INTO words (word, category, definition)
            VALUES ($1, $2, $3)
            RETURNING id, word, category, definition, created_at, updated_at
            "#,
        )
        .bind(&new_word.word)
        .bind(new_word.category)
        .bind(&new_word.definition)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_word(&new_word.word)
            } else {
                ApiError::DatabaseError(e)
            }
        })
    }

    async fn update(&self, id: Uuid, changes: UpdateWord) -> Result<Option<Word>, ApiError> {
        let requested_word = changes.word.clone().unwrap_or_default();

        sqlx::query_as::<_, Word>(
            r#"
            UPDATE words
            SET word = COALESCE($1, word),
                category = COALESCE($2, category),
                definition = COALESCE($3, definition),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, word, category, definition, created_at, updated_at
            "#,
        )
        .bind(changes.word)
        .bind(changes.category)
        .bind(changes.definition)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_word(&requested_word)
            } else {
                ApiError::DatabaseError(e)
            }
        })
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Word>, ApiError> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            DELETE FROM words
            WHERE id = $1
            RETURNING id, word, category, definition, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }
}

/// In-memory word repository for tests and database-less development
///
/// Words are kept in insertion order, so newest-first is reverse order.
#[derive(Default)]
pub struct InMemoryWordRepository {
    words: RwLock<Vec<Word>>,
}

impl InMemoryWordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WordStore for InMemoryWordRepository {
    async fn random(&self) -> Result<Option<Word>, ApiError> {
        let words = self.words.read().await;
        Ok(words.choose(&mut rand::thread_rng()).cloned())
    }

    async fn list(
        &self,
        category: Option<Category>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Word>, u64), ApiError> {
        let words = self.words.read().await;
        let matching: Vec<&Word> = words
            .iter()
            .rev()
            .filter(|word| category.map_or(true, |c| word.category == c))
            .collect();

        let page = matching
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|word| (*word).clone())
            .collect();

        Ok((page, matching.len() as u64))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>, ApiError> {
        let words = self.words.read().await;
        Ok(words.iter().find(|word| word.id == id).cloned())
    }

    async fn create(&self, new_word: NewWord) -> Result<Word, ApiError> {
        let mut words = self.words.write().await;
        if words.iter().any(|word| word.word == new_word.word) {
            return Err(duplicate_word(&new_word.word));
        }

        let now = Utc::now();
        let word = Word {
            id: Uuid::new_v4(),
            word: new_word.word,
            category: new_word.category,
            definition: new_word.definition,
            created_at: now,
            updated_at: now,
        };
        words.push(word.clone());
        Ok(word)
    }

    async fn update(&self, id: Uuid, changes: UpdateWord) -> Result<Option<Word>, ApiError> {
        let mut words = self.words.write().await;

        if !words.iter().any(|word| word.id == id) {
            return Ok(None);
        }

        if let Some(ref new_text) = changes.word {
            if words.iter().any(|word| word.id != id && &word.word == new_text) {
                return Err(duplicate_word(new_text));
            }
        }

        Ok(words.iter_mut().find(|word| word.id == id).map(|word| {
            if let Some(text) = changes.word {
                word.word = text;
            }
            if let Some(category) = changes.category {
                word.category = category;
            }
            if let Some(definition) = changes.definition {
                word.definition = definition;
            }
            word.updated_at = Utc::now();
            word.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Word>, ApiError> {
        let mut words = self.words.write().await;
        Ok(words
            .iter()
            .position(|word| word.id == id)
            .map(|index| words.remove(index)))
    }
}
