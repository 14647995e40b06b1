use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a link may stay in a pending state before it is given up.
    pub negotiation_timeout: Duration,
    /// How often the session loop checks for expired negotiations.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            negotiation_timeout: Duration::from_secs(15),
            sweep_interval: Duration::from_secs(1),
        }
    }
}
