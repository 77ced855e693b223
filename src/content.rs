use crate::error::{GameError, Result};
use clap::ValueEnum;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which challenge a session plays
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Click the words of a sentence back into sentence order
    Ordered,
    /// Spell target words from a shared, shuffled pool of letter tiles
    Pool,
}

/// Identity of a letter tile, assigned at generation time
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileStatus {
    Available,
    Selected,
    /// Part of a matched target; never clickable again
    Consumed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub ch: char,
    pub status: TileStatus,
}

impl Tile {
    pub fn is_available(&self) -> bool {
        self.status == TileStatus::Available
    }
}

/// Targets and letter pool for one POOL session
#[derive(Debug, Clone)]
pub struct PoolContent {
    pub targets: Vec<String>,
    pub tiles: Vec<Tile>,
}

/// Longest ORDERED sentence, in words, that can still be labelled on screen
pub const MAX_ORDERED_WORDS: usize = 36;

/// Pick one corpus entry uniformly at random and split it into words.
pub fn generate_ordered<R: Rng + ?Sized>(corpus: &[String], rng: &mut R) -> Result<Vec<String>> {
    let sentence = corpus.choose(rng).ok_or(GameError::EmptyCorpus)?;
    Ok(sentence.split_whitespace().map(str::to_string).collect())
}

/// Pick `k` distinct corpus entries (all of them when the corpus is smaller)
/// and build a uniformly shuffled tile per lowercase character.
pub fn generate_pool<R: Rng + ?Sized>(
    corpus: &[String],
    k: usize,
    rng: &mut R,
) -> Result<PoolContent> {
    if corpus.is_empty() {
        return Err(GameError::EmptyCorpus);
    }
    if k == 0 {
        return Err(GameError::InvalidConfig(
            "pool target count must be at least 1".to_string(),
        ));
    }

    let amount = k.min(corpus.len());
    let targets: Vec<String> = index::sample(rng, corpus.len(), amount)
        .into_iter()
        .map(|i| corpus[i].clone())
        .collect();

    let mut letters: Vec<char> = targets
        .iter()
        .flat_map(|t| t.to_lowercase().chars().collect::<Vec<_>>())
        .collect();
    letters.shuffle(rng);

    let tiles = letters
        .into_iter()
        .enumerate()
        .map(|(i, ch)| Tile {
            id: TileId(i),
            ch,
            status: TileStatus::Available,
        })
        .collect();

    Ok(PoolContent { targets, tiles })
}
