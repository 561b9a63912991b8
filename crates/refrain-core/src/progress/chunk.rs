//! Lyric chunk references

use serde::{Deserialize, Serialize};

/// A labeled lyric section as handed over by the lyrics collaborator.
///
/// Lines are ordered and already tokenized into words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRef {
    pub id: String,
    pub song_id: String,
    /// Display label ("Verse 1", "Chorus")
    pub label: String,
    /// Position of the chunk within its song, used to break due-queue ties
    pub position: u32,
    pub lines: Vec<Vec<String>>,
}

impl ChunkRef {
    /// Check the shape the core relies on: at least one line, no empty lines.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Chunk id must not be empty".to_string());
        }
        if self.lines.is_empty() {
            return Err(format!("Chunk {} has no lines", self.id));
        }
        if let Some(index) = self.lines.iter().position(|line| line.is_empty()) {
            return Err(format!("Chunk {} has an empty line at {}", self.id, index));
        }
        Ok(())
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Plain text, one line per row
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Input for registering a chunk. Lines are raw text and get split on whitespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChunk {
    /// Leave empty to generate a UUID
    #[serde(default)]
    pub id: Option<String>,
    pub song_id: String,
    pub label: String,
    #[serde(default)]
    pub position: u32,
    pub lines: Vec<String>,
}

impl NewChunk {
    /// Tokenize into a [`ChunkRef`]. Blank lines are dropped.
    pub fn into_chunk(self) -> ChunkRef {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let lines = self
            .lines
            .iter()
            .map(|line| {
                line.split_whitespace()
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .collect();

        ChunkRef {
            id,
            song_id: self.song_id,
            label: self.label,
            position: self.position,
            lines,
        }
    }
}
