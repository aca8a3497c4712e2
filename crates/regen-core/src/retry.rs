//! Retry policy for image requests.
//!
//! Stateless: the caller tracks the attempt number, the policy only answers
//! whether another attempt is allowed. Every resolution error is treated as
//! transient, so the same inputs are simply re-sent.

/// Default total attempts per image request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Bounded retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Allow `max_attempts` attempts in total (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determine whether a retry should be attempted.
    ///
    /// `attempt` is 1-based (first execution is attempt 1).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry_within_limit() {
        let policy = RetryPolicy::new(3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
    }

    #[test]
    fn test_should_not_retry_at_or_beyond_max() {
        let policy = RetryPolicy::new(3);
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_single_attempt_never_retries() {
        assert!(!RetryPolicy::new(1).should_retry(1));
    }

    #[test]
    fn test_zero_is_raised_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }

    #[test]
    fn test_default_max_attempts_is_three() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }
}
