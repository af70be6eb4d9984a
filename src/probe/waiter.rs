use crate::config::WaitPolicy;
use crate::inventory::Inventory;
use crate::probe::{NodeProber, ProbeError};
use tracing::{info, warn};

/// Polls a prober until every node answers or the attempts run out.
pub struct ReachabilityWaiter {
    policy: WaitPolicy,
}

impl ReachabilityWaiter {
    pub fn new(policy: WaitPolicy) -> Self {
        Self { policy }
    }

    /// Returns the number of probes it took. An inventory without nodes is
    /// reachable by definition and costs no probe at all.
    ///
    /// Probe command failures are returned immediately; only nodes that are
    /// still DOWN are retried.
    pub async fn wait_until_reachable<P>(
        &self,
        prober: &P,
        inventory: &Inventory,
    ) -> Result<u32, ProbeError>
    where
        P: NodeProber + ?Sized,
    {
        if inventory.is_empty() {
            warn!("No compute nodes defined in hardware config");
            return Ok(0);
        }

        let max_attempts = self.policy.max_attempts;
        let mut unreachable: Vec<String> = inventory.node_names().map(str::to_string).collect();

        for attempt in 1..=max_attempts {
            let report = prober.probe_all(inventory).await?;
            unreachable = inventory
                .node_names()
                .filter(|name| !report.status(name).is_up())
                .map(str::to_string)
                .collect();

            if unreachable.is_empty() {
                info!("All compute nodes are reachable");
                return Ok(attempt);
            }
            if attempt == max_attempts {
                break;
            }

            info!(
                "Attempt {}/{} failed. Waiting for: {}. Retrying in {:?}...",
                attempt,
                max_attempts,
                unreachable.join(", "),
                self.policy.delay
            );
            tokio::time::sleep(self.policy.delay).await;
        }

        Err(ProbeError::ReachabilityTimeout {
            attempts: max_attempts,
            unreachable,
        })
    }
}
