//! Remote-service readiness tracking.

/// Tracks whether presence watching is active and whether the service is up.
///
/// Readiness follows presence events even while watching is stopped, so a
/// client that feeds events by hand still sees the right state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadinessMonitor {
    watching: bool,
    ready: bool,
}

impl ReadinessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this call started watching.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.watching, true)
    }

    /// Returns true when this call stopped watching.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.watching, false)
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Marks the service present; true on a not-ready to ready transition.
    pub fn appeared(&mut self) -> bool {
        !std::mem::replace(&mut self.ready, true)
    }

    /// Marks the service absent. Nothing is re-queued.
    pub fn vanished(&mut self) -> bool {
        std::mem::replace(&mut self.ready, false)
    }
}

#[cfg(test)]
mod tests {
    use super::ReadinessMonitor;

    #[test]
    fn transitions_report_only_edges() {
        let mut monitor = ReadinessMonitor::new();
        assert!(monitor.appeared());
        assert!(!monitor.appeared());
        assert!(monitor.vanished());
        assert!(!monitor.vanished());
        assert!(!monitor.is_ready());

        assert!(monitor.start());
        assert!(!monitor.start());
        assert!(monitor.stop());
        assert!(!monitor.is_watching());
    }
}
