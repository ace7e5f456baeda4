// Sample vocabulary for fresh databases

use crate::error::ApiError;
use crate::words::models::{Category, NewWord};
use crate::words::repository::WordStore;

pub const SAMPLE_WORDS: &[(&str, Category, &str)] = &[
    ("awesome", Category::Adjective, "Extremely impressive or daunting"),
    ("brilliant", Category::Adjective, "Exceptionally clever or talented"),
    ("courage", Category::Noun, "The ability to do something that frightens one"),
    ("determination", Category::Noun, "Firmness of purpose; resoluteness"),
    ("excellent", Category::Adjective, "Extremely good; outstanding"),
    ("fantastic", Category::Adjective, "Extraordinarily good or attractive"),
    ("gratitude", Category::Noun, "The quality of being thankful"),
    ("happiness", Category::Noun, "The state of being happy"),
    ("inspiration", Category::Noun, "The process of being mentally stimulated"),
    ("joyful", Category::Adjective, "Feeling, expressing, or causing great pleasure"),
    ("kindness", Category::Noun, "The quality of being friendly, generous, and considerate"),
    ("laughter", Category::Noun, "The action or sound of laughing"),
    ("magnificent", Category::Adjective, "Extremely beautiful, elaborate, or impressive"),
    ("nurture", Category::Verb, "Care for and encourage the growth or development of"),
    ("optimism", Category::Noun, "Hopefulness and confidence about the future"),
    ("peaceful", Category::Adjective, "Free from disturbance; tranquil"),
    ("quality", Category::Noun, "The standard of something as measured against other things"),
    ("resilient", Category::Adjective, "Able to withstand or recover quickly from difficulties"),
    ("success", Category::Noun, "The accomplishment of an aim or purpose"),
    ("triumph", Category::Noun, "A great victory or achievement"),
    ("unique", Category::Adjective, "Being the only one of its kind"),
    ("valuable", Category::Adjective, "Worth a great deal of money"),
    ("wonderful", Category::Adjective, "Inspiring delight, pleasure, or admiration"),
    ("yearning", Category::Noun, "A feeling of intense longing for something"),
    ("zealous", Category::Adjective, "Having or showing zeal; passionate"),
];

/// Outcome of a seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert every sample word, skipping those already present
pub async fn seed_words(store: &dyn WordStore) -> Result<SeedReport, ApiError> {
    let mut report = SeedReport::default();

    for (word, category, definition) in SAMPLE_WORDS {
        let new_word = NewWord {
            word: word.to_string(),
            category: *category,
            definition: definition.to_string(),
        };

        match store.create(new_word).await {
            Ok(_) => report.inserted += 1,
            Err(ApiError::Conflict { .. }) => report.skipped += 1,
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Seeded words: {} inserted, {} already present",
        report.inserted,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::repository::InMemoryWordRepository;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = InMemoryWordRepository::new();

        let first = seed_words(&store).await.unwrap();
        assert_eq!(first.inserted, SAMPLE_WORDS.len());
        assert_eq!(first.skipped, 0);

        let second = seed_words(&store).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, SAMPLE_WORDS.len());

        let (_, total) = store.list(None, 100, 0).await.unwrap();
        assert_eq!(total as usize, SAMPLE_WORDS.len());
    }
}
