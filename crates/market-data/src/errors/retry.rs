/// Classification for retry policy.
///
/// Used by the fetch client to decide what to do after a failed attempt.
///
/// | Class | Sleep and retry? | Counts against `max_retries`? |
/// |-------|------------------|-------------------------------|
/// | `Never` | No | No, fails immediately |
/// | `WithBackoff` | Yes | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - malformed request, non-JSON body or undecodable payload.
    /// Repeating the same request would produce the same failure.
    Never,

    /// Transient failure such as throttling, a 5xx or a dropped connection.
    ///
    /// The client waits (the server's retry-after hint if present, otherwise
    /// the current backoff), doubles the backoff and tries again until the
    /// retry budget is spent.
    WithBackoff,
}
