use std::time::{Duration, Instant};

/// How long a blocking operation may wait for the transport.
///
/// Every blocking call in framebus takes one of these instead of a magic
/// negative-millisecond value: the infinite case is an explicit variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Return at once if nothing is pending.
    Immediate,
    /// Wait up to the given duration.
    Bounded(Duration),
    /// Wait until the operation can complete.
    Forever,
}

impl Timeout {
    /// Bounded timeout from a millisecond count.
    pub fn from_millis(millis: u64) -> Self {
        Timeout::Bounded(Duration::from_millis(millis))
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::Bounded(duration)
    }
}

/// Monotonic-clock budget of one blocking operation.
///
/// Poll-and-act loops start one of these, then re-poll the transport with
/// [`Deadline::remaining`] each iteration until it reports
/// [`Timeout::Immediate`].
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires: Option<Instant>,
}

impl Deadline {
    /// Start the budget now.
    pub fn start(timeout: Timeout) -> Self {
        let expires = match timeout {
            Timeout::Immediate => Some(Instant::now()),
            Timeout::Bounded(duration) => Some(Instant::now() + duration),
            Timeout::Forever => None,
        };
        Self { expires }
    }

    /// Budget left for the next poll. `Immediate` once the deadline passed.
    pub fn remaining(&self) -> Timeout {
        match self.expires {
            None => Timeout::Forever,
            Some(expires) => match expires.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => Timeout::Bounded(left),
                _ => Timeout::Immediate,
            },
        }
    }

    /// Whether the budget is used up.
    pub fn expired(&self) -> bool {
        self.remaining() == Timeout::Immediate
    }
}
