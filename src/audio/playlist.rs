use crate::event::events::TrackId;

/// Playlist bookkeeping owned by the playback controller.
///
/// The overlay holds the tracks of an explicit `play a b c` request. While it
/// is non-empty it is the active sequence and `index` points into it; once it
/// runs out or playback is stopped it is cleared and the main playlist takes
/// over again.
#[derive(Clone, Debug)]
pub struct PlaylistState {
    main: Vec<TrackId>,
    overlay: Vec<TrackId>,
    index: usize,
    advance_on_natural_end: bool,
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self {
            main: Vec::new(),
            overlay: Vec::new(),
            index: 0,
            advance_on_natural_end: true,
        }
    }
}

impl PlaylistState {
    pub fn main(&self) -> &[TrackId] {
        &self.main
    }

    pub fn overlay(&self) -> &[TrackId] {
        &self.overlay
    }

    pub fn overlay_active(&self) -> bool {
        !self.overlay.is_empty()
    }

    pub fn active(&self) -> &[TrackId] {
        if self.overlay_active() {
            &self.overlay
        } else {
            &self.main
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance_on_natural_end(&self) -> bool {
        self.advance_on_natural_end
    }

    pub fn current(&self) -> Option<&TrackId> {
        self.active().get(self.index)
    }

    /// The track `delta` positions away from the cursor, if any.
    pub fn neighbour(&self, delta: isize) -> Option<&TrackId> {
        self.offset(delta).and_then(|i| self.active().get(i))
    }

    /// `index + delta` when it is a valid position in the active sequence.
    pub fn offset(&self, delta: isize) -> Option<usize> {
        self.index
            .checked_add_signed(delta)
            .filter(|&i| i < self.active().len())
    }

    pub fn add(&mut self, tracks: impl IntoIterator<Item = TrackId>) {
        self.main.extend(tracks);
    }

    /// Installs a new overlay and points the cursor at its first track.
    pub fn set_overlay(&mut self, tracks: Vec<TrackId>) {
        self.overlay = tracks;
        self.index = 0;
    }

    /// Called when a track is handed to the player.
    pub fn begin_track(&mut self) {
        self.advance_on_natural_end = true;
    }

    /// Moves the cursor for next/prev, unless the playing track was removed
    /// meanwhile and the following one already slid into its slot.
    pub fn step(&mut self, delta: isize) {
        if !self.advance_on_natural_end {
            return;
        }
        if let Some(i) = self.offset(delta) {
            self.index = i;
        }
    }

    /// Removes the first occurrence of `track` from the main playlist.
    /// Returns the position it was removed from.
    pub fn remove(&mut self, track: &TrackId) -> Option<usize> {
        let pos = self.main.iter().position(|t| t == track)?;
        self.main.remove(pos);
        if !self.overlay_active() {
            self.fix_index(pos);
        }

        Some(pos)
    }

    fn fix_index(&mut self, removed: usize) {
        if removed < self.index {
            self.index -= 1;
        } else if removed == self.index {
            self.advance_on_natural_end = false;
        }
    }

    /// Natural end of the current track. Returns whether another track is
    /// lined up; otherwise the sequence is exhausted and the cursor rewound.
    pub fn track_finished(&mut self) -> bool {
        if self.advance_on_natural_end {
            if let Some(next) = self.offset(1) {
                self.index = next;
                return true;
            }
        } else if self.index < self.active().len() {
            return true;
        }

        self.reset();
        false
    }

    /// The current track could not be played. Drops it from the sequence it
    /// came from, then proceeds like a natural end.
    pub fn track_failed(&mut self, track: &TrackId) -> bool {
        let from_overlay = self.overlay_active();
        let index = self.index;
        let sequence = if from_overlay {
            &mut self.overlay
        } else {
            &mut self.main
        };

        // The entry under the cursor, unless it was edited away meanwhile.
        let pos = match sequence.get(index) {
            Some(current) if current == track => Some(index),
            _ => sequence.iter().position(|t| t == track),
        };
        if let Some(pos) = pos {
            sequence.remove(pos);
            self.fix_index(pos);
        }

        if from_overlay && self.overlay.is_empty() {
            self.reset();
            return false;
        }

        self.track_finished()
    }

    /// Rewinds the cursor and drops the overlay.
    pub fn reset(&mut self) {
        self.index = 0;
        self.overlay.clear();
    }

    pub(crate) fn rewind_if_out_of_range(&mut self) {
        if self.index >= self.active().len() {
            self.index = 0;
        }
    }
}
