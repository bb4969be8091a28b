//! Idle-session timeout state machine.
//!
//! # State Transitions
//! ```text
//! Active → WarningShown: warning deadline reached
//! Active | WarningShown → Active: user activity (full restart)
//! WarningShown → Active: user chooses to continue (full restart)
//! WarningShown → Expired: user declines
//! Active | WarningShown → Expired: expiry deadline reached
//! ```
//!
//! Time is passed in explicitly as the offset from an arbitrary epoch, so
//! the machine has no timers of its own and can be driven by anything.

use std::time::Duration;

use crate::config::SessionConfig;

/// How long before expiry the warning is raised.
pub const WARNING_LEAD: Duration = Duration::from_secs(5 * 60);

/// Longest accepted timeout: one week.
pub const MAX_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

const MAX_TIMEOUT: Duration = Duration::from_secs(MAX_TIMEOUT_MINUTES * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub timeout: Duration,
}

impl TimeoutPolicy {
    /// Timeouts longer than [`MAX_TIMEOUT_MINUTES`] are clamped to it.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: timeout.min(MAX_TIMEOUT),
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.min(MAX_TIMEOUT_MINUTES) * 60))
    }

    /// Delay until the warning, or `None` when the timeout is too short
    /// to leave room for one.
    pub fn warning_after(&self) -> Option<Duration> {
        self.timeout
            .checked_sub(WARNING_LEAD)
            .filter(|d| !d.is_zero())
    }
}

impl From<&SessionConfig> for TimeoutPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self::from_minutes(config.timeout_minutes)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::from_minutes(30)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    WarningShown,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// The expiry deadline passed.
    Inactivity,
    /// The user answered the warning by declining to continue.
    Declined,
}

/// Something the presentation layer has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Ask the user whether to keep the session.
    WarningDue,
    /// Log out. `Inactivity` also warrants a "session expired" notice.
    Expired(ExpiryReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningDecision {
    Continue,
    Decline,
}

#[derive(Debug, Clone)]
pub struct SessionTimeout {
    policy: TimeoutPolicy,
    state: SessionState,
    warning_at: Option<Duration>,
    expiry_at: Option<Duration>,
}

impl SessionTimeout {
    /// Create a machine with both deadlines scheduled from `now`.
    pub fn new(policy: TimeoutPolicy, now: Duration) -> Self {
        let mut machine = Self {
            policy: TimeoutPolicy::new(policy.timeout),
            state: SessionState::Active,
            warning_at: None,
            expiry_at: None,
        };
        machine.restart(now);
        machine
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Cancel both deadlines and schedule them again from `now`.
    ///
    /// Has no effect once expired.
    pub fn restart(&mut self, now: Duration) {
        if self.state == SessionState::Expired {
            return;
        }
        self.state = SessionState::Active;
        self.warning_at = self.policy.warning_after().map(|w| now.saturating_add(w));
        self.expiry_at = Some(now.saturating_add(self.policy.timeout));
    }

    /// User activity: back to the start of `Active`, whatever the state.
    pub fn record_activity(&mut self, now: Duration) {
        self.restart(now);
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.warning_at, self.expiry_at) {
            (Some(w), Some(e)) => Some(w.min(e)),
            (w, e) => w.or(e),
        }
    }

    /// Fire whichever deadline has been reached by `now`.
    ///
    /// Expiry wins when both are due.
    pub fn advance(&mut self, now: Duration) -> Option<SessionEvent> {
        if self.state == SessionState::Expired {
            return None;
        }

        if self.expiry_at.is_some_and(|e| e <= now) {
            return Some(self.expire(ExpiryReason::Inactivity));
        }

        if self.warning_at.is_some_and(|w| w <= now) {
            self.warning_at = None;
            self.state = SessionState::WarningShown;
            return Some(SessionEvent::WarningDue);
        }

        None
    }

    /// Apply the user's answer to a pending warning.
    pub fn resolve_warning(&mut self, decision: WarningDecision, now: Duration) -> Option<SessionEvent> {
        if self.state != SessionState::WarningShown {
            return None;
        }

        match decision {
            WarningDecision::Continue => {
                self.restart(now);
                None
            }
            WarningDecision::Decline => Some(self.expire(ExpiryReason::Declined)),
        }
    }

    /// Drop both deadlines without changing state.
    pub fn cancel(&mut self) {
        self.warning_at = None;
        self.expiry_at = None;
    }

    fn expire(&mut self, reason: ExpiryReason) -> SessionEvent {
        self.cancel();
        self.state = SessionState::Expired;
        SessionEvent::Expired(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Duration = Duration::from_secs(60);

    #[test]
    fn test_policy_from_config() {
        let policy = TimeoutPolicy::from(&SessionConfig { timeout_minutes: 45 });
        assert_eq!(policy.warning_after(), Some(40 * MIN));
        assert_eq!(TimeoutPolicy::from(&SessionConfig::default()), TimeoutPolicy::default());
    }

    #[test]
    fn test_oversized_timeout_is_clamped() {
        let cap = Duration::from_secs(MAX_TIMEOUT_MINUTES * 60);
        assert_eq!(TimeoutPolicy::from_minutes(u64::MAX).timeout, cap);
        assert_eq!(TimeoutPolicy::from_minutes(u64::MAX / 60).timeout, cap);
        assert_eq!(TimeoutPolicy::new(Duration::MAX).timeout, cap);

        let raw = TimeoutPolicy { timeout: Duration::MAX };
        let mut m = SessionTimeout::new(raw, Duration::from_secs(u64::MAX));
        assert_eq!(m.policy().timeout, cap);
        assert_eq!(m.next_deadline(), Some(Duration::MAX));
        assert_eq!(m.advance(Duration::MAX), Some(SessionEvent::Expired(ExpiryReason::Inactivity)));
    }

    #[test]
    fn test_schedule() {
        let m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        assert_eq!(m.state(), SessionState::Active);
        assert_eq!(m.next_deadline(), Some(25 * MIN));
    }

    #[test]
    fn test_short_timeout_has_no_warning() {
        assert_eq!(TimeoutPolicy::from_minutes(5).warning_after(), None);
        assert_eq!(TimeoutPolicy::from_minutes(3).warning_after(), None);
        assert_eq!(TimeoutPolicy::from_minutes(6).warning_after(), Some(MIN));

        let mut m = SessionTimeout::new(TimeoutPolicy::from_minutes(5), Duration::ZERO);
        assert_eq!(m.next_deadline(), Some(5 * MIN));
        assert_eq!(m.advance(5 * MIN), Some(SessionEvent::Expired(ExpiryReason::Inactivity)));
    }

    #[test]
    fn test_warning_then_expiry() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        assert_eq!(m.advance(25 * MIN - Duration::from_millis(1)), None);
        assert_eq!(m.advance(25 * MIN), Some(SessionEvent::WarningDue));
        assert_eq!(m.state(), SessionState::WarningShown);
        assert_eq!(m.next_deadline(), Some(30 * MIN));
        assert_eq!(m.advance(29 * MIN), None);
        assert_eq!(m.advance(30 * MIN), Some(SessionEvent::Expired(ExpiryReason::Inactivity)));
        assert_eq!(m.state(), SessionState::Expired);
        assert_eq!(m.next_deadline(), None);
        assert_eq!(m.advance(60 * MIN), None);
    }

    #[test]
    fn test_activity_restarts_from_zero() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        m.record_activity(20 * MIN);
        assert_eq!(m.advance(25 * MIN), None);
        assert_eq!(m.next_deadline(), Some(45 * MIN));
    }

    #[test]
    fn test_activity_clears_pending_warning() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        m.advance(25 * MIN);
        m.record_activity(26 * MIN);
        assert_eq!(m.state(), SessionState::Active);
        assert_eq!(m.advance(30 * MIN), None);
        assert_eq!(m.next_deadline(), Some(51 * MIN));
    }

    #[test]
    fn test_continue_and_decline() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        m.advance(25 * MIN);
        assert_eq!(m.resolve_warning(WarningDecision::Continue, 27 * MIN), None);
        assert_eq!(m.state(), SessionState::Active);
        assert_eq!(m.next_deadline(), Some(52 * MIN));

        m.advance(52 * MIN);
        assert_eq!(
            m.resolve_warning(WarningDecision::Decline, 53 * MIN),
            Some(SessionEvent::Expired(ExpiryReason::Declined))
        );
        assert_eq!(m.state(), SessionState::Expired);
    }

    #[test]
    fn test_decision_without_warning_is_ignored() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        assert_eq!(m.resolve_warning(WarningDecision::Decline, MIN), None);
        assert_eq!(m.state(), SessionState::Active);
    }

    #[test]
    fn test_expired_is_terminal() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        m.advance(30 * MIN);
        m.record_activity(31 * MIN);
        assert_eq!(m.state(), SessionState::Expired);
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn test_late_advance_skips_to_expiry() {
        let mut m = SessionTimeout::new(TimeoutPolicy::default(), Duration::ZERO);
        assert_eq!(m.advance(40 * MIN), Some(SessionEvent::Expired(ExpiryReason::Inactivity)));
    }
}
