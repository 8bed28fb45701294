use std::collections::HashMap;
use std::time::Duration;

use prep_core::model::Subject;

pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Exam behaviour fixed at service construction.
#[derive(Debug, Clone)]
pub struct ExamConfig {
    navigation_delay: Duration,
    tick_interval: Duration,
    max_attempts: usize,
    default_delay_enabled: bool,
    duration_overrides: HashMap<Subject, u32>,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            navigation_delay: DEFAULT_NAVIGATION_DELAY,
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_delay_enabled: true,
            duration_overrides: HashMap::new(),
        }
    }
}

impl ExamConfig {
    #[must_use]
    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_default_delay_enabled(mut self, enabled: bool) -> Self {
        self.default_delay_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, subject: Subject, minutes: u32) -> Self {
        self.duration_overrides.insert(subject, minutes);
        self
    }

    #[must_use]
    pub fn navigation_delay(&self) -> Duration {
        self.navigation_delay
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    #[must_use]
    pub fn default_delay_enabled(&self) -> bool {
        self.default_delay_enabled
    }

    /// Exam length for `subject`, before any extended-time factor.
    #[must_use]
    pub fn duration_minutes(&self, subject: Subject) -> u32 {
        self.duration_overrides
            .get(&subject)
            .copied()
            .unwrap_or_else(|| subject.profile().duration_minutes)
    }
}
