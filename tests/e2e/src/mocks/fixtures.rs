//! Test Data Factory
//!
//! Lyric chunks for journey tests. The hymn fixture uses public-domain text.

use refrain_core::{ChunkRef, NewChunk};

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    /// One chunk from raw lines
    pub fn chunk(song_id: &str, id: &str, label: &str, position: u32, lines: &[&str]) -> ChunkRef {
        NewChunk {
            id: Some(id.to_string()),
            song_id: song_id.to_string(),
            label: label.to_string(),
            position,
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
        .into_chunk()
    }

    /// A song of `count` generic verses with ids `{song_id}-{n}`
    pub fn song(song_id: &str, count: u32) -> Vec<ChunkRef> {
        (0..count)
            .map(|i| {
                Self::chunk(
                    song_id,
                    &format!("{}-{}", song_id, i),
                    &format!("Verse {}", i + 1),
                    i,
                    &[
                        "We sing the morning into light",
                        "and carry every word along",
                        "until the evening holds the song",
                    ],
                )
            })
            .collect()
    }

    /// "Amazing Grace": two verses and a refrain, song id `amazing-grace`
    pub fn hymn() -> Vec<ChunkRef> {
        vec![
            Self::chunk(
                "amazing-grace",
                "grace-verse-1",
                "Verse 1",
                0,
                &[
                    "Amazing grace! How sweet the sound",
                    "That saved a wretch like me!",
                    "I once was lost, but now am found;",
                    "Was blind, but now I see.",
                ],
            ),
            Self::chunk(
                "amazing-grace",
                "grace-verse-2",
                "Verse 2",
                1,
                &[
                    "'Twas grace that taught my heart to fear,",
                    "And grace my fears relieved;",
                    "How precious did that grace appear",
                    "The hour I first believed.",
                ],
            ),
            Self::chunk(
                "amazing-grace",
                "grace-verse-3",
                "Verse 3",
                2,
                &[
                    "Through many dangers, toils and snares,",
                    "I have already come;",
                    "'Tis grace hath brought me safe thus far,",
                    "And grace will lead me home.",
                ],
            ),
        ]
    }
}
