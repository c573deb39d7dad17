/// Classification for retry policy.
///
/// Used to determine how the manager should respond to a provider outcome.
///
/// # Behavior Summary
///
/// | Class | Try Next Provider? | Breaker effect |
/// |-------|-------------------|----------------|
/// | `Done` | No | Resets exhaustion count |
/// | `NextProvider` | Yes | None |
/// | `RetryThenPenalty` | After one retry | Counts toward the trip threshold |
/// | `TripCircuit` | Yes | Opens immediately |
/// | `DisableProvider` | Yes | None (provider marked unavailable) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The provider answered with usable data.
    Done,

    /// Try next provider without recording any penalty.
    ///
    /// Used when this provider has nothing for the request (empty result,
    /// unparsable body) but another provider might succeed.
    NextProvider,

    /// Retry once after a short randomized backoff, then record an
    /// exhaustion signal and move on.
    ///
    /// Used for per-minute rate limiting (HTTP 429, "call frequency" notes).
    RetryThenPenalty,

    /// Open the provider's circuit for the rest of the session.
    ///
    /// Used when the provider reports its daily quota is used up.
    TripCircuit,

    /// Mark the provider unavailable for the rest of the session.
    ///
    /// Used for transport failures (DNS, connect, timeout) so later tickers
    /// don't pay the same connection cost again.
    DisableProvider,
}
