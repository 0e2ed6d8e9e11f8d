use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::{PlayerError, Result};
use crate::models::Track;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Normal,
    Shuffle,
    RepeatOne,
    RepeatAll,
}

/// What happened to the current track after a removal.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueChange {
    /// The current track (if any) is still current.
    Unchanged,
    /// The current track was removed; the cursor now points at this one.
    CurrentReplaced(Track),
    /// The current track was removed and nothing is left.
    Emptied,
}

/// Ordered playback sequence with a cursor.
///
/// The cursor is either `None` or a valid index into `tracks`. Every
/// mutating method restores that before returning, so a reader behind the
/// same lock never sees a dangling cursor.
pub struct PlayQueue {
    tracks: Vec<Track>,
    current_index: Option<usize>,
    mode: PlaybackMode,
    rng: StdRng,
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Queue with a deterministic RNG for shuffle and random next.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tracks: Vec::new(),
            current_index: None,
            mode: PlaybackMode::Normal,
            rng,
        }
    }

    /// Replace the whole sequence and select `start_index` (clamped).
    ///
    /// Returns the newly selected track, if any.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) -> Option<Track> {
        self.tracks = tracks;
        self.current_index = if self.tracks.is_empty() {
            None
        } else {
            Some(start_index.min(self.tracks.len() - 1))
        };
        self.current().cloned()
    }

    /// Insert at `at` (clamped to `len`). Returns the index actually used.
    pub fn insert(&mut self, track: Track, at: usize) -> usize {
        let at = at.min(self.tracks.len());
        self.tracks.insert(at, track);
        if let Some(cursor) = self.current_index {
            if at <= cursor {
                self.current_index = Some(cursor + 1);
            }
        }
        at
    }

    pub fn push(&mut self, track: Track) -> usize {
        let end = self.tracks.len();
        self.insert(track, end)
    }

    /// Insert directly after the current track ("play next").
    pub fn insert_next(&mut self, track: Track) -> usize {
        let at = self.current_index.map_or(0, |cursor| cursor + 1);
        self.insert(track, at)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(Track, QueueChange)> {
        let len = self.tracks.len();
        if index >= len {
            return Err(PlayerError::IndexOutOfRange { index, len });
        }

        let removed = self.tracks.remove(index);
        let change = match self.current_index {
            Some(cursor) if index < cursor => {
                self.current_index = Some(cursor - 1);
                QueueChange::Unchanged
            }
            Some(cursor) if index == cursor => {
                if self.tracks.is_empty() {
                    self.current_index = None;
                    QueueChange::Emptied
                } else {
                    let cursor = cursor.min(self.tracks.len() - 1);
                    self.current_index = Some(cursor);
                    QueueChange::CurrentReplaced(self.tracks[cursor].clone())
                }
            }
            _ => QueueChange::Unchanged,
        };

        Ok((removed, change))
    }

    /// Move the track at `from` so that it ends up at index `to`.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        for index in [from, to] {
            if index >= len {
                return Err(PlayerError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        if let Some(cursor) = self.current_index {
            self.current_index = Some(if from == cursor {
                to
            } else if from < cursor && cursor <= to {
                cursor - 1
            } else if to <= cursor && cursor < from {
                cursor + 1
            } else {
                cursor
            });
        }

        Ok(())
    }

    /// Target index for the track after the current one.
    ///
    /// Does not move the cursor; apply the result with [`PlayQueue::select`].
    /// Shuffle picks uniformly over the whole queue and may return the
    /// current index again.
    pub fn next_index(&mut self, mode: PlaybackMode) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        match mode {
            PlaybackMode::Normal | PlaybackMode::RepeatAll => {
                Some(self.current_index.map_or(0, |cursor| (cursor + 1) % len))
            }
            PlaybackMode::Shuffle => Some(self.rng.random_range(0..len)),
            PlaybackMode::RepeatOne => Some(self.current_index.unwrap_or(0)),
        }
    }

    pub fn previous_index(&self, mode: PlaybackMode) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        let Some(cursor) = self.current_index else {
            return Some(0);
        };

        Some(match mode {
            PlaybackMode::RepeatOne => cursor,
            _ if cursor > 0 => cursor - 1,
            PlaybackMode::RepeatAll | PlaybackMode::Shuffle => len - 1,
            PlaybackMode::Normal => 0,
        })
    }

    /// Whether a successor exists without wrapping around.
    pub fn has_next(&self) -> bool {
        match self.current_index {
            Some(cursor) => cursor + 1 < self.tracks.len(),
            None => !self.tracks.is_empty(),
        }
    }

    pub fn select(&mut self, index: usize) -> Result<Track> {
        let len = self.tracks.len();
        let track = self
            .tracks
            .get(index)
            .cloned()
            .ok_or(PlayerError::IndexOutOfRange { index, len })?;
        self.current_index = Some(index);
        Ok(track)
    }

    /// Randomly permute the queue, keeping the current entry current.
    ///
    /// The current entry is followed by position rather than by id, so a
    /// queue holding the same track twice still keeps the exact entry that
    /// was selected.
    pub fn shuffle(&mut self) {
        let mut entries: Vec<(usize, Track)> = self.tracks.drain(..).enumerate().collect();
        entries.shuffle(&mut self.rng);

        if let Some(cursor) = self.current_index {
            self.current_index = entries.iter().position(|(original, _)| *original == cursor);
        }
        self.tracks = entries.into_iter().map(|(_, track)| track).collect();
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = None;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|idx| self.tracks.get(idx))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }
}
