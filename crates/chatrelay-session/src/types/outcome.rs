use chatrelay_types::Message;

/// Why a submit or retry did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty after trimming
    BlankInput,
    /// A request for this chat is already outstanding
    InFlight,
    /// The chat was opened with an unanswered user message; use retry
    Stalled,
    /// Retry requested but the log does not end with a user message
    NothingToRetry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The assistant reply, as persisted
    Replied(Message),
    Ignored(IgnoreReason),
}

impl SubmitOutcome {
    pub fn reply(&self) -> Option<&Message> {
        match self {
            Self::Replied(message) => Some(message),
            Self::Ignored(_) => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}
