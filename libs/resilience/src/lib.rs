/// Resilience patterns for long-lived client connections
///
/// This library provides:
/// - **Reconnect policy**: bounded attempts spaced by a fixed delay
/// - **Reconnect budget**: per-connection attempt counter driven by the policy
/// - **Timeout**: time limits on handshakes and other one-shot calls
///
/// # Example: bounded reconnect loop
///
/// ```rust,no_run
/// use resilience::{ReconnectBudget, ReconnectPolicy};
///
/// #[tokio::main]
/// async fn main() {
///     let mut budget = ReconnectBudget::new(ReconnectPolicy::fixed_default());
///
///     loop {
///         // connect and serve until the connection drops ...
///         match budget.next_delay() {
///             Some(delay) => tokio::time::sleep(delay).await,
///             None => break,
///         }
///     }
/// }
/// ```

pub mod backoff;
pub mod timeout;

// Re-export main types for convenience
pub use backoff::{ReconnectBudget, ReconnectPolicy};
pub use timeout::{with_timeout_result, TimeoutError};
