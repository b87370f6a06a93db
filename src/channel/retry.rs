//! Bounded retry decorator for command channels.

use std::time::Duration;

use log::warn;

use super::{CommandChannel, CommandOutput};
use crate::error::ChannelError;
use crate::inventory::DeviceDescriptor;

/// Default number of attempts per command.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Wraps a [`CommandChannel`] with a bounded retry budget.
///
/// Each attempt is a fresh session. After the budget is exhausted the
/// device is reported as [`ChannelError::Unreachable`] carrying the last
/// underlying failure; callers treat that as a per-device outcome, not a
/// pass-ending error.
pub struct RetryingChannel<C> {
    inner: C,
    attempts: u32,
    backoff: Duration,
}

impl<C: CommandChannel> RetryingChannel<C> {
    /// Wrap a channel with the default budget of three attempts.
    pub fn new(inner: C) -> Self {
        Self::with_attempts(inner, DEFAULT_ATTEMPTS)
    }

    /// Wrap a channel with a custom attempt budget (minimum 1).
    pub fn with_attempts(inner: C, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            backoff: Duration::from_secs(1),
        }
    }

    /// Set the delay between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Access the wrapped channel.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: CommandChannel> CommandChannel for RetryingChannel<C> {
    async fn execute(
        &mut self,
        device: &DeviceDescriptor,
        command: &str,
    ) -> Result<CommandOutput, ChannelError> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.inner.execute(device, command).await {
                Ok(output) => return Ok(output),
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    warn!(
                        "'{}' on {} failed (attempt {}/{}): {}",
                        command, device.host, attempt, self.attempts, e
                    );
                    last_error = Some(e);
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    last_error = Some(e);
                    break;
                }
            }
        }

        // last_error is always set: the loop runs at least once
        let source = last_error.unwrap_or(ChannelError::Closed);
        Err(ChannelError::Unreachable {
            host: device.host.clone(),
            attempts: self.attempts,
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Channel that fails a fixed number of times before succeeding.
    struct FlakyChannel {
        failures_left: u32,
        calls: u32,
    }

    impl CommandChannel for FlakyChannel {
        async fn execute(
            &mut self,
            _device: &DeviceDescriptor,
            command: &str,
        ) -> Result<CommandOutput, ChannelError> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(ChannelError::Timeout(Duration::from_secs(1)));
            }
            Ok(CommandOutput::new(command, "ok", "ok", Duration::ZERO))
        }
    }

    fn device() -> DeviceDescriptor {
        let json = r#"{ "host": "10.0.0.1", "username": "admin" }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_succeeds_within_budget() {
        tokio_test::block_on(async {
            let mut channel = RetryingChannel::with_attempts(
                FlakyChannel {
                    failures_left: 2,
                    calls: 0,
                },
                3,
            )
            .with_backoff(Duration::ZERO);

            let output = channel
                .execute(&device(), "show cdp neighbors")
                .await
                .unwrap();
            assert_eq!(output.result, "ok");
            assert_eq!(channel.inner().calls, 3);
        });
    }

    #[tokio::test]
    async fn test_exhaustion_is_unreachable() {
        let mut channel = RetryingChannel::with_attempts(
            FlakyChannel {
                failures_left: 10,
                calls: 0,
            },
            3,
        )
        .with_backoff(Duration::ZERO);

        let err = channel
            .execute(&device(), "show cdp neighbors")
            .await
            .unwrap_err();

        match err {
            ChannelError::Unreachable { host, attempts, .. } => {
                assert_eq!(host, "10.0.0.1");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
        assert_eq!(channel.inner().calls, 3);
    }

    #[test]
    fn test_unreachable_is_not_retryable() {
        let err = ChannelError::Unreachable {
            host: "10.0.0.1".to_string(),
            attempts: 3,
            source: Box::new(ChannelError::Closed),
        };
        assert!(!err.is_retryable());
        assert!(ChannelError::Timeout(Duration::from_secs(1)).is_retryable());
    }
}
