/// Negotiation progress of one peer link.
///
/// The initiating side walks `Idle -> Offering -> AwaitingAnswer ->
/// Connected`; the other side walks `Idle -> Answering -> Connected`.
/// `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    Offering,
    AwaitingAnswer,
    Answering,
    Connected,
    Closed,
}

impl NegotiationState {
    /// States bounded by the negotiation timeout.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Offering | Self::AwaitingAnswer | Self::Answering)
    }
}
