use log::{Level, log_enabled};
use std::time::{Duration, Instant};

/// Times a named section of the step.
///
/// The elapsed time is traced when the timer drops and, if a sink was given,
/// added to it so per-phase totals land in the step profile.
pub struct ScopedTimer<'a> {
    label: &'static str,
    start: Instant,
    sink: Option<&'a mut Duration>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'static str) -> Self {
        Self::start(label, None)
    }

    pub fn accumulate(label: &'static str, sink: &'a mut Duration) -> Self {
        Self::start(label, Some(sink))
    }

    fn start(label: &'static str, sink: Option<&'a mut Duration>) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            sink,
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if let Some(sink) = self.sink.as_deref_mut() {
            *sink += elapsed;
        }
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}
