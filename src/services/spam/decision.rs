use std::fmt;

/// Why a message was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The user is inside an earlier block
    Blocked { remaining_secs: u64 },
    /// This message pushed the user over the per-minute limit
    TooManyMessages { block_minutes: u64 },
    /// This message was one identical message too many
    RepeatedMessages { block_minutes: u64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Blocked { remaining_secs } => write!(
                f,
                "You are temporarily blocked. {} seconds left.",
                remaining_secs
            ),
            Rejection::TooManyMessages { block_minutes } => write!(
                f,
                "Too many messages. You are blocked for {} minutes.",
                block_minutes
            ),
            Rejection::RepeatedMessages { block_minutes } => write!(
                f,
                "Repeated-message spam detected. Blocked for {} minutes.",
                block_minutes
            ),
        }
    }
}

/// Outcome of evaluating one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Rejected(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Decision::Allowed => None,
            Decision::Rejected(rejection) => Some(*rejection),
        }
    }

    /// User-facing reason, empty when allowed
    pub fn reason(&self) -> String {
        self.rejection().map(|r| r.to_string()).unwrap_or_default()
    }
}
