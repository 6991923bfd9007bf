//! Payment submission seam.
//!
//! [`PaymentGateway`] is where a real payment processor would plug in. The
//! crate ships [`SimulatedGateway`], which waits a fixed delay and then
//! succeeds or fails according to a [`SuccessSource`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use payment_form::gateway::{FixedOutcome, PaymentGateway, SimulatedGateway};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let gateway = SimulatedGateway::new(Duration::from_millis(1), FixedOutcome::Succeed);
//! let receipt = gateway.submit("dG9r").await.unwrap();
//! assert_eq!(receipt.token_id, "dG9r");
//! # });
//! ```

use crate::error::PaymentError;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Delay of the simulated payment call.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Probability that a simulated payment succeeds.
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.95;

/// Status reported for a processed payment.
pub const STATUS_PROCESSED: &str = "PROCESSED";

/// Confirmation of a processed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// The token the payment was submitted with.
    pub token_id: String,
    /// Processor status, `PROCESSED` for the simulation.
    pub status: String,
}

/// Accepts a payment token and settles it.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a payment. Resolves once the processor has settled it.
    async fn submit(&self, token: &str) -> Result<PaymentReceipt, PaymentError>;
}

/// Decides whether a simulated payment succeeds.
pub trait SuccessSource: Send + Sync {
    /// Draws one outcome.
    fn succeeds(&self) -> bool;
}

/// Succeeds with a fixed probability using the thread RNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomSuccess {
    probability: f64,
}

impl RandomSuccess {
    /// Creates a source succeeding with `probability`, clamped to [0, 1].
    ///
    /// `NaN` is treated as 0.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    /// The success probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomSuccess {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_PROBABILITY)
    }
}

impl SuccessSource for RandomSuccess {
    fn succeeds(&self) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Always produces the same outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedOutcome {
    /// Every payment succeeds.
    Succeed,
    /// Every payment is declined.
    Fail,
}

impl SuccessSource for FixedOutcome {
    fn succeeds(&self) -> bool {
        matches!(self, FixedOutcome::Succeed)
    }
}

/// Settings of the simulated gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatewayConfig {
    /// How long a payment takes to settle.
    pub delay: Duration,
    /// Probability of success.
    pub success_probability: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            success_probability: DEFAULT_SUCCESS_PROBABILITY,
        }
    }
}

/// A gateway that settles after a delay with an injected outcome.
///
/// The delay always runs to completion; there is no cancellation or timeout.
pub struct SimulatedGateway {
    delay: Duration,
    outcome: Box<dyn SuccessSource>,
}

impl SimulatedGateway {
    /// Creates a gateway with the given delay and outcome source.
    pub fn new(delay: Duration, outcome: impl SuccessSource + 'static) -> Self {
        Self {
            delay,
            outcome: Box::new(outcome),
        }
    }

    /// Creates a gateway with random outcomes from a configuration.
    pub fn from_config(config: GatewayConfig) -> Self {
        Self::new(config.delay, RandomSuccess::new(config.success_probability))
    }

    /// The settlement delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::from_config(GatewayConfig::default())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit(&self, token: &str) -> Result<PaymentReceipt, PaymentError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "simulating payment call");
        tokio::time::sleep(self.delay).await;

        if self.outcome.succeeds() {
            Ok(PaymentReceipt {
                token_id: token.to_string(),
                status: STATUS_PROCESSED.to_string(),
            })
        } else {
            Err(PaymentError::Declined {
                reason: "Error".to_string(),
            })
        }
    }
}
