use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Grammatical category of a word
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "word_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Noun,
    Verb,
    Adjective,
    Adverb,
    #[default]
    Other,
}

/// A vocabulary entry
///
/// `word` is stored trimmed and lowercase and is unique across the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Word {
    pub id: Uuid,
    #[schema(example = "resilient")]
    pub word: String,
    pub category: Category,
    #[schema(example = "Able to withstand or recover quickly from difficulties")]
    pub definition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a word
///
/// Used for POST /api/words requests
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWord {
    #[serde(default)]
    #[validate(
        length(max = 64, message = "must be at most 64 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "zealous")]
    pub word: String,
    pub category: Option<Category>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub definition: Option<String>,
}

/// Partial update for a word
///
/// Used for PUT /api/words/{id}; omitted fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWord {
    #[validate(
        length(max = 64, message = "must be at most 64 characters"),
        custom = "validate_not_blank"
    )]
    pub word: Option<String>,
    pub category: Option<Category>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub definition: Option<String>,
}

/// Normalized values ready to be written to a store
#[derive(Debug, Clone, PartialEq)]
pub struct NewWord {
    pub word: String,
    pub category: Category,
    pub definition: String,
}

impl From<CreateWord> for NewWord {
    fn from(input: CreateWord) -> Self {
        Self {
            word: normalize_word(&input.word),
            category: input.category.unwrap_or_default(),
            definition: input
                .definition
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

impl UpdateWord {
    /// Apply the same normalization as creation to the provided fields
    pub fn normalized(self) -> Self {
        Self {
            word: self.word.map(|w| normalize_word(&w)),
            category: self.category,
            definition: self.definition.map(|d| d.trim().to_string()),
        }
    }
}

pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Query parameters for GET /api/words
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: u32,
    /// Page size, 1 to 100
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: u32,
    pub category: Option<Category>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            category: None,
        }
    }
}

impl ListParams {
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of words, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total_words: u64,
}

impl WordPage {
    pub fn new(words: Vec<Word>, total_words: u64, params: &ListParams) -> Self {
        Self {
            words,
            total_pages: total_words.div_ceil(u64::from(params.limit)),
            current_page: params.page,
            total_words,
        }
    }
}

/// Body of GET /api/words/random
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RandomWord {
    pub word: String,
    pub category: Category,
    pub definition: String,
}

impl From<Word> for RandomWord {
    fn from(word: Word) -> Self {
        Self {
            word: word.word,
            category: word.category,
            definition: word.definition,
        }
    }
}

/// Confirmation body for create, update and delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WordMessage {
    #[schema(example = "Word created successfully")]
    pub message: String,
    pub word: Word,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_word_normalization() {
        let input = CreateWord {
            word: "  Zealous ".into(),
            category: None,
            definition: Some(" Passionate ".into()),
        };
        assert!(input.validate().is_ok());

        let new_word = NewWord::from(input);
        assert_eq!(new_word.word, "zealous");
        assert_eq!(new_word.category, Category::Other);
        assert_eq!(new_word.definition, "Passionate");
    }

    #[test]
    fn test_create_word_requires_word() {
        let input: CreateWord = serde_json::from_str(r#"{"category": "noun"}"#).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_unknown_category_is_rejected_by_serde() {
        let result = serde_json::from_str::<CreateWord>(r#"{"word": "run", "category": "gerund"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_word_partial() {
        let update: UpdateWord = serde_json::from_str(r#"{"definition": " Fast "}"#).unwrap();
        assert!(update.validate().is_ok());

        let update = update.normalized();
        assert_eq!(update.word, None);
        assert_eq!(update.definition.as_deref(), Some("Fast"));

        let blank: UpdateWord = serde_json::from_str(r#"{"word": "  "}"#).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_list_params_bounds() {
        let params = ListParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.offset(), 0);

        let params = ListParams { page: 3, limit: 20, category: None };
        assert_eq!(params.offset(), 40);

        assert!(ListParams { page: 0, limit: 10, category: None }.validate().is_err());
        assert!(ListParams { page: 1, limit: 101, category: None }.validate().is_err());
    }

    #[test]
    fn test_word_page_total_pages() {
        let params = ListParams { page: 2, limit: 10, category: None };
        assert_eq!(WordPage::new(vec![], 0, &params).total_pages, 0);
        assert_eq!(WordPage::new(vec![], 10, &params).total_pages, 1);
        assert_eq!(WordPage::new(vec![], 11, &params).total_pages, 2);
        assert_eq!(WordPage::new(vec![], 11, &params).current_page, 2);
    }
}
