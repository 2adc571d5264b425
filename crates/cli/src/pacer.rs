// Blocking waits between burst passes.

use std::time::Duration;

/// Something that can wait. Burst loops take a `Pacer` so tests can record
/// the requested waits instead of sleeping through them.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Real wall-clock waits on the current thread.
#[derive(Debug, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

#[cfg(test)]
impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
