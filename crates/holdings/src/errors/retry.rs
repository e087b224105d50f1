/// Classification for retry policy.
///
/// Used by the fetch client to decide whether an error is worth another
/// attempt after a backoff sleep.
///
/// # Behavior Summary
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No: the request is fundamentally invalid or the payload is structurally wrong |
/// | `WithBackoff` | Yes: sleep, then reissue the request, up to the policy's retry count |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry. Non-429 client errors, timeouts, parse failures, and
    /// configuration gaps all land here: reissuing the same request cannot
    /// change the outcome within the current call.
    Never,

    /// Retry with increasing backoff. Rate limiting (429) and server
    /// errors (5xx) are transient: the same request may succeed shortly.
    WithBackoff,
}
