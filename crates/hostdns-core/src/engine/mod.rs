//! Scheduler loop
//!
//! The HostDnsEngine is responsible for:
//! - Waiting one interval, then running a reconciliation pass on every tick
//! - Stopping cleanly when the shutdown future completes
//! - Stopping with the pass error when a pass fails
//!
//! ## Architecture
//!
//! ```text
//!   interval tick ──┐            ┌── shutdown future
//!                   ▼            ▼
//!            ┌──────────────────────────┐
//!            │      HostDnsEngine       │──── EngineEvent ───► observers
//!            └──────────────────────────┘
//!                         │
//!                         ▼
//!            ┌──────────────────────────┐
//!            │ Reconciler::run_pass()   │
//!            └──────────────────────────┘
//! ```
//!
//! ## Tick Semantics
//!
//! 1. The first pass runs one full interval after start
//! 2. A pass runs to completion before the next tick is looked at
//! 3. Ticks missed during a slow pass collapse into one immediate tick
//! 4. Shutdown is checked before every tick; it wins a tie
//! 5. The first failed pass ends the loop; there is no retry

use crate::config::EngineConfig;
use crate::error::Result;
use crate::identity::HostIdentity;
use crate::reconciler::{PassOutcome, Reconciler};
use crate::traits::{DnsProvider, IpSource};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Events emitted by the HostDnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        fqdn: String,
    },

    /// A pass finished successfully
    PassCompleted {
        outcome: PassOutcome,
    },

    /// A pass failed; the engine stops right after
    PassFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core hostdns engine
///
/// Owns a [`Reconciler`] and drives it on a fixed interval.
///
/// ## Lifecycle
///
/// 1. Create with [`HostDnsEngine::new()`]
/// 2. Start with [`HostDnsEngine::run_until()`]
/// 3. Engine runs until the shutdown future completes or a pass fails
///
/// ## Threading
///
/// The engine runs all operations on the calling task. There is exactly one
/// pass in flight at any time, so no locking is needed.
pub struct HostDnsEngine {
    /// Reconciler run on each tick
    reconciler: Reconciler,

    /// Time between ticks
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl HostDnsEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `identity`: The host name to publish
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        identity: HostIdentity,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler =
            Reconciler::new(ip_source, provider, identity).with_record_ttl(config.record_ttl);

        let engine = Self {
            reconciler,
            interval: config.interval(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The reconciler driven by this engine
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run the loop until `shutdown` completes or a pass fails
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Shutdown requested
    /// - `Err(Error)`: The error of the first failed pass
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let fqdn = self.reconciler.identity().fqdn();
        info!(
            "Reconciling A record for {} every {:?}",
            fqdn, self.interval
        );
        self.emit_event(EngineEvent::Started { fqdn });

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Reconciliation failed, stopping: {}", e);
                        self.emit_event(EngineEvent::PassFailed {
                            error: e.to_string(),
                        });
                        self.emit_event(EngineEvent::Stopped {
                            reason: "Reconciliation failed".to_string(),
                        });
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Run one pass and report its outcome
    async fn tick(&self) -> Result<()> {
        let outcome = self.reconciler.run_pass().await?;
        debug!("Pass completed: {:?}", outcome);
        self.emit_event(EngineEvent::PassCompleted { outcome });
        Ok(())
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        // Observers must never stall the loop; a full or closed channel drops the event
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
