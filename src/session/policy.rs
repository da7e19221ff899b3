//! Re-authentication policy.
//!
//! Decides whether the identity remembered in a session may be reused for a
//! new authorization request. The evaluation is pure: the caller supplies the
//! current time and applies the outcome.

use super::SessionRecord;
use crate::authorization::{AuthorizationRequestInfo, Prompt};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The client sent `prompt=login`.
    LoginPrompted,
    /// The authentication is older than the requested `max_age`.
    MaxAgeExceeded { age_seconds: i64, max_age: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reauthentication {
    /// No identity in the session; nothing to decide.
    Unauthenticated,
    /// The identity stays valid and may be reused without prompting.
    Reuse,
    /// The identity must be cleared before continuing.
    Invalidate(InvalidationReason),
}

/// Evaluate the session identity against a new authorization request.
///
/// `prompt=login` always invalidates. Otherwise a positive `max_age` `m`
/// invalidates when `now - authenticated_at > m`.
#[must_use]
pub fn evaluate(
    record: &SessionRecord,
    info: &AuthorizationRequestInfo,
    now_unix: i64,
) -> Reauthentication {
    let Some(identity) = &record.identity else {
        return Reauthentication::Unauthenticated;
    };

    if info.requests_prompt(Prompt::Login) {
        return Reauthentication::Invalidate(InvalidationReason::LoginPrompted);
    }

    if let Some(max_age) = info.max_age_constraint() {
        let age_seconds = now_unix.saturating_sub(identity.authenticated_at);
        if age_seconds > i64::try_from(max_age).unwrap_or(i64::MAX) {
            return Reauthentication::Invalidate(InvalidationReason::MaxAgeExceeded {
                age_seconds,
                max_age,
            });
        }
    }

    Reauthentication::Reuse
}
