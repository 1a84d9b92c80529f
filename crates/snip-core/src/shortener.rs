use crate::detail::LinkDetail;
use crate::error::ShortenerError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::num::NonZeroU64;
use std::time::Duration;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Longest accepted lifetime: one hundred years, in minutes.
pub const MAX_EXPIRATION_MINUTES: u64 = 100 * 365 * 24 * 60;

/// Expiration policy for a shortened URL.
///
/// The same policy applies to every record written for one shortening event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// The shortened URL never expires.
    Never,
    /// The shortened URL expires this many minutes after creation.
    AfterMinutes(NonZeroU64),
}

impl ExpirationPolicy {
    /// Builds a policy from a lifetime in minutes, where `0` means "never".
    pub fn from_minutes(minutes: u64) -> Self {
        match NonZeroU64::new(minutes) {
            Some(minutes) => Self::AfterMinutes(minutes),
            None => Self::Never,
        }
    }

    /// The lifetime in minutes, `0` for [`ExpirationPolicy::Never`].
    pub fn as_minutes(&self) -> u64 {
        match self {
            Self::Never => 0,
            Self::AfterMinutes(minutes) => minutes.get(),
        }
    }

    /// Rejects lifetimes longer than [`MAX_EXPIRATION_MINUTES`].
    pub fn validate(&self) -> Result<()> {
        if self.as_minutes() > MAX_EXPIRATION_MINUTES {
            return Err(ShortenerError::InvalidInput(format!(
                "expiration must be at most {MAX_EXPIRATION_MINUTES} minutes, got {}",
                self.as_minutes()
            )));
        }
        Ok(())
    }

    /// The time-to-live handed to the storage backend; `None` means no expiry.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::AfterMinutes(minutes) => {
                Some(Duration::from_secs(minutes.get().saturating_mul(60)))
            }
        }
    }
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
}

impl ShortenParams {
    pub fn new(original_url: impl Into<String>, expiration_in_minutes: u64) -> Self {
        Self {
            original_url: original_url.into(),
            expiration: ExpirationPolicy::from_minutes(expiration_in_minutes),
        }
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns its short code.
    ///
    /// Shortening a URL that still has a live mapping returns the existing code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Resolves a short code to the original URL.
    /// Fails with `NotFound` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns the detail record of a short code.
    /// Fails with `NotFound` if the code does not exist or has expired.
    async fn info(&self, code: &ShortCode) -> Result<LinkDetail>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_minutes_never_expires() {
        let policy = ExpirationPolicy::from_minutes(0);
        assert_eq!(policy, ExpirationPolicy::Never);
        assert_eq!(policy.ttl(), None);
        assert_eq!(policy.as_minutes(), 0);
    }

    #[test]
    fn minutes_become_ttl() {
        let policy = ExpirationPolicy::from_minutes(60);
        assert_eq!(policy.ttl(), Some(Duration::from_secs(3600)));
        assert_eq!(policy.as_minutes(), 60);
    }

    #[test]
    fn lifetime_is_bounded() {
        assert!(ExpirationPolicy::from_minutes(0).validate().is_ok());
        assert!(ExpirationPolicy::from_minutes(MAX_EXPIRATION_MINUTES)
            .validate()
            .is_ok());
        assert!(matches!(
            ExpirationPolicy::from_minutes(MAX_EXPIRATION_MINUTES + 1).validate(),
            Err(ShortenerError::InvalidInput(_))
        ));
        assert!(ExpirationPolicy::from_minutes(u64::MAX).validate().is_err());
    }
}
