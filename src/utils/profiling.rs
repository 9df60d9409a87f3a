use std::time::Duration;

/// Timing and counters for one collision step.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepProfile {
    pub broad_phase_time: Duration,
    pub resolve_time: Duration,
    pub contact_time: Duration,
    pub total_time: Duration,

    pub object_count: usize,
    pub candidate_pairs: usize,
    pub contact_count: usize,
    pub iterations: usize,
    pub converged: bool,
}

impl StepProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn share(&self, phase: Duration) -> f32 {
        let total_us = self.total_time.as_micros() as f32;
        if total_us < 1.0 {
            0.0
        } else {
            phase.as_micros() as f32 / total_us * 100.0
        }
    }

    /// Logs the profile at debug level.
    pub fn report(&self) {
        log::debug!(
            "step: {} objects, {} candidate pairs, {} contacts, {} iterations{}",
            self.object_count,
            self.candidate_pairs,
            self.contact_count,
            self.iterations,
            if self.converged { "" } else { " (not converged)" }
        );
        log::debug!(
            "step: total {:.3} ms | broad {:.3} ms ({:.1}%) | resolve {:.3} ms ({:.1}%) | contacts {:.3} ms ({:.1}%)",
            self.total_time.as_secs_f32() * 1000.0,
            self.broad_phase_time.as_secs_f32() * 1000.0,
            self.share(self.broad_phase_time),
            self.resolve_time.as_secs_f32() * 1000.0,
            self.share(self.resolve_time),
            self.contact_time.as_secs_f32() * 1000.0,
            self.share(self.contact_time),
        );
    }
}
