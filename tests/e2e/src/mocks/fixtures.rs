//! Test Data Factory
//!
//! Realistic vocabulary and progress records for journey tests.

use std::io::Write;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::NamedTempFile;
use vocabox_core::{interval_for, VocabularyItem, WordProgress};

/// Monday morning, the reference "now" of every journey
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

const ANIMALS: &[(&str, &str, &str)] = &[
    ("cat", "kæt", "a small domesticated feline"),
    ("dog", "dɒɡ", "a domesticated canine"),
    ("horse", "hɔːs", "a large hoofed riding animal"),
    ("owl", "aʊl", "a nocturnal bird of prey"),
    ("otter", "ˈɒtə", "a fish-eating aquatic mammal"),
    ("badger", "ˈbædʒə", "a burrowing nocturnal mammal"),
    ("heron", "ˈhɛrən", "a long-legged wading bird"),
    ("lynx", "lɪŋks", "a wild cat with tufted ears"),
    ("beaver", "ˈbiːvə", "a dam-building rodent"),
    ("falcon", "ˈfɔːlkən", "a fast hunting bird"),
    ("moth", "mɒθ", "a night-flying insect"),
    ("newt", "njuːt", "a small amphibian"),
    ("weasel", "ˈwiːzəl", "a slender carnivorous mammal"),
    ("swan", "swɒn", "a large long-necked water bird"),
    ("hare", "hɛə", "a fast long-eared mammal"),
];

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    pub const TOPIC: &'static str = "animals";

    /// The first `n` animal words (more than the list holds get numbered ids)
    pub fn animals(n: usize) -> Vec<VocabularyItem> {
        (0..n)
            .map(|i| {
                let (word, pronunciation, meaning) = ANIMALS[i % ANIMALS.len()];
                let round = i / ANIMALS.len();
                let (word, meaning) = if round == 0 {
                    (word.to_string(), meaning.to_string())
                } else {
                    (format!("{}{}", word, round), format!("{} ({})", meaning, round))
                };
                let mut item =
                    VocabularyItem::new(format!("a{:02}", i), word, meaning, Self::TOPIC);
                item.pronunciation = pronunciation.to_string();
                item.part_of_speech = "noun".to_string();
                item.level = "A2".to_string();
                item
            })
            .collect()
    }

    /// A word last rated `ago`, sitting in `box_level`
    pub fn progress_in_box(box_level: u8, ago: Duration) -> WordProgress {
        let last = fixed_now() - ago;
        WordProgress {
            box_level,
            next_review_at: last + interval_for(box_level),
            last_review_at: last,
            streak: u32::from(box_level),
        }
    }

    /// Vocabulary written to a temporary JSON file, for file-backed content
    pub fn vocab_file(items: &[VocabularyItem]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create vocab file");
        let json = serde_json::to_string_pretty(items).expect("Failed to serialize vocabulary");
        file.write_all(json.as_bytes())
            .expect("Failed to write vocab file");
        file
    }
}
