//! Terminal classification of one registration attempt.

/// Final classification of one phone-number registration attempt.
///
/// Exactly one outcome is produced per work item. [`Outcome::Unknown`]
/// is the mandatory catch-all: every path that cannot reach a definitive
/// classification falls back to it rather than dropping the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// The account has a password or recovery email configured.
    TwoFactor,
    /// The code logged the account in with no password step.
    NoTwoFactor,
    /// The number is suspended by the service.
    Suspended,
    /// The service refused the attempt for excessive tries.
    RateLimited,
    /// The attempt could not be resolved.
    Unknown,
}

impl Outcome {
    /// All outcomes, in routing order.
    pub const ALL: [Self; 5] = [
        Self::TwoFactor,
        Self::NoTwoFactor,
        Self::Suspended,
        Self::RateLimited,
        Self::Unknown,
    ];

    /// Stable tag used in logs and result routing.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TwoFactor => "2FA",
            Self::NoTwoFactor => "NO_2FA",
            Self::Suspended => "SUSPENDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
