#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Read-only view of an audio transport, polled once per render tick.
pub trait PlaybackClock {
    /// Seconds of audio played since playback started.
    fn offset_seconds(&self) -> f32;
    fn status(&self) -> PlaybackStatus;

    fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }
}

/// Transport driven by the render cadence: every tick advances playback by
/// one video frame while playing. Stops on its own once the track ends.
#[derive(Debug)]
pub struct FrameClock {
    fps: u32,
    duration: f32,
    ticks: u64,
    status: PlaybackStatus,
}

impl FrameClock {
    pub fn new(fps: u32, duration: f32) -> Self {
        Self {
            fps: fps.max(1),
            duration,
            ticks: 0,
            status: PlaybackStatus::Stopped,
        }
    }

    pub fn play(&mut self) {
        if self.status == PlaybackStatus::Stopped {
            self.ticks = 0;
        }
        self.status = PlaybackStatus::Playing;
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.ticks = 0;
    }

    /// Advance by one video frame. Has no effect unless playing.
    pub fn advance(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.ticks += 1;
        if self.offset_seconds() > self.duration {
            log::debug!("Playback reached end of track at {:.3}s", self.duration);
            self.stop();
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl PlaybackClock for FrameClock {
    fn offset_seconds(&self) -> f32 {
        self.ticks as f32 / self.fps as f32
    }

    fn status(&self) -> PlaybackStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_at_zero() {
        let clock = FrameClock::new(30, 10.0);
        assert_eq!(clock.status(), PlaybackStatus::Stopped);
        assert_eq!(clock.offset_seconds(), 0.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn advances_only_while_playing() {
        let mut clock = FrameClock::new(10, 10.0);
        clock.advance();
        assert_eq!(clock.offset_seconds(), 0.0);

        clock.play();
        clock.advance();
        clock.advance();
        assert!((clock.offset_seconds() - 0.2).abs() < 1e-6);

        clock.pause();
        clock.advance();
        assert_eq!(clock.status(), PlaybackStatus::Paused);
        assert!((clock.offset_seconds() - 0.2).abs() < 1e-6);

        clock.play();
        assert!((clock.offset_seconds() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn stops_after_track_end() {
        let mut clock = FrameClock::new(4, 1.0);
        clock.play();
        for _ in 0..4 {
            clock.advance();
        }
        assert!(clock.is_playing());
        clock.advance();
        assert_eq!(clock.status(), PlaybackStatus::Stopped);
        assert_eq!(clock.offset_seconds(), 0.0);
    }
}
