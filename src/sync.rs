//! Maps a polled playback offset onto rows of the precomputed band table.

use crate::audio::bands::BAND_COUNT;
use crate::audio::features::{BandLevels, BandTable};

/// Which table row is "now", and the playback offset it was committed at.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisualCursor {
    pub frame_index: usize,
    pub committed_timestamp: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Not playing, or nothing to show.
    Idle,
    /// A new row was emitted this tick.
    Advancing,
    /// Playing, but less than one frame of audio since the last row.
    Holding,
}

/// Borrows the analyzer's table, so the analyzer must outlive it.
pub struct VisualSync<'a> {
    table: &'a BandTable,
    time_per_frame: f32,
    cursor: VisualCursor,
    current: BandLevels,
    state: SyncState,
}

impl<'a> VisualSync<'a> {
    pub fn new(table: &'a BandTable, time_per_frame: f32) -> Self {
        Self {
            table,
            time_per_frame,
            cursor: VisualCursor::default(),
            current: [0.0; BAND_COUNT],
            state: SyncState::Idle,
        }
    }

    /// Back to the first row, as at audio startup.
    pub fn reset(&mut self) {
        self.cursor = VisualCursor::default();
        self.current = [0.0; BAND_COUNT];
        self.state = SyncState::Idle;
    }

    /// Resolve the current band values for this render tick.
    ///
    /// The committed timestamp only moves when a row is emitted, so a tick
    /// that holds keeps measuring elapsed time from the last emitted row.
    pub fn tick(&mut self, playback_offset: f32, is_playing: bool) -> BandLevels {
        if !is_playing || self.table.is_empty() {
            self.current = [0.0; BAND_COUNT];
            self.cursor.committed_timestamp = 0.0;
            self.state = SyncState::Idle;
            return self.current;
        }

        let elapsed = playback_offset - self.cursor.committed_timestamp;
        if self.time_per_frame >= elapsed {
            self.state = SyncState::Holding;
            return self.current;
        }

        // frame_index is always < rows() here: it wraps as soon as it reaches it.
        if let Some(row) = self.table.row(self.cursor.frame_index) {
            self.current = row;
        }
        self.cursor.frame_index += 1;
        self.cursor.committed_timestamp = playback_offset;
        if self.cursor.frame_index >= self.table.rows() {
            log::debug!("Visual cursor wrapped at offset {:.3}s", playback_offset);
            self.cursor = VisualCursor::default();
        }
        self.state = SyncState::Advancing;
        self.current
    }

    pub fn cursor(&self) -> VisualCursor {
        self.cursor
    }

    pub fn current(&self) -> BandLevels {
        self.current
    }

    pub fn state(&self) -> SyncState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> BandTable {
        let mut t = BandTable::with_capacity(rows);
        for r in 0..rows {
            let v = (r + 1) as f32;
            t.push_row(&[v, v * 10.0, v * 100.0, v * 1000.0, v * 10000.0]);
        }
        t
    }

    #[test]
    fn idle_yields_zero_and_keeps_index() {
        let t = table(4);
        let snapshot = t.clone();
        let mut sync = VisualSync::new(&t, 0.1);

        sync.tick(0.2, true);
        assert_eq!(sync.cursor().frame_index, 1);

        let values = sync.tick(0.5, false);
        assert_eq!(values, [0.0; BAND_COUNT]);
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.cursor().frame_index, 1);
        assert_eq!(sync.cursor().committed_timestamp, 0.0);
        assert_eq!(t, snapshot);
    }

    #[test]
    fn advances_past_threshold_and_holds_below() {
        let t = table(4);
        let mut sync = VisualSync::new(&t, 0.1);

        assert_eq!(sync.tick(0.05, true), [0.0; BAND_COUNT]);
        assert_eq!(sync.state(), SyncState::Holding);

        assert_eq!(sync.tick(0.11, true), t.row(0).unwrap());
        assert_eq!(sync.state(), SyncState::Advancing);
        assert_eq!(sync.cursor().committed_timestamp, 0.11);

        assert_eq!(sync.tick(0.15, true), t.row(0).unwrap());
        assert_eq!(sync.state(), SyncState::Holding);
        assert_eq!(sync.cursor().committed_timestamp, 0.11);

        assert_eq!(sync.tick(0.22, true), t.row(1).unwrap());
        assert_eq!(sync.cursor().frame_index, 2);
    }

    #[test]
    fn exact_threshold_holds() {
        let t = table(2);
        let mut sync = VisualSync::new(&t, 0.5);
        sync.tick(0.5, true);
        assert_eq!(sync.state(), SyncState::Holding);
    }

    #[test]
    fn wraps_once_per_traversal() {
        let rows = 5;
        let t = table(rows);
        let tpf = 0.1;
        let mut sync = VisualSync::new(&t, tpf);

        let mut wraps = 0;
        let mut emitted = Vec::new();
        let mut offset = 0.0f32;
        let mut prev_index = 0;
        for _ in 0..(rows * 3) {
            offset += tpf * 1.5;
            let values = sync.tick(offset, true);
            emitted.push(values[0]);
            let idx = sync.cursor().frame_index;
            assert!(idx < rows);
            if idx < prev_index {
                wraps += 1;
                assert_eq!(sync.cursor().committed_timestamp, 0.0);
            }
            prev_index = idx;
        }

        assert_eq!(wraps, 3);
        // Every row is shown, in order, on every pass.
        assert_eq!(&emitted[..rows], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(&emitted[rows..rows * 2], &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn empty_table_stays_idle() {
        let t = BandTable::default();
        let mut sync = VisualSync::new(&t, 0.1);
        for i in 0..10 {
            assert_eq!(sync.tick(i as f32, true), [0.0; BAND_COUNT]);
            assert_eq!(sync.state(), SyncState::Idle);
            assert_eq!(sync.cursor(), VisualCursor::default());
        }
    }

    #[test]
    fn reset_returns_to_start() {
        let t = table(3);
        let mut sync = VisualSync::new(&t, 0.1);
        sync.tick(0.2, true);
        sync.tick(0.4, true);
        sync.reset();
        assert_eq!(sync.cursor(), VisualCursor::default());
        assert_eq!(sync.current(), [0.0; BAND_COUNT]);
        assert_eq!(sync.tick(0.2, true), t.row(0).unwrap());
    }
}
