//! Live agent offers, keyed by hostname

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use scale_core::Agent;
use std::sync::Arc;
use std::time::Duration;

/// The latest offer seen for a host.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOffer {
    pub agent: Agent,
    pub seen_at: DateTime<Utc>,
}

impl AgentOffer {
    /// Whether the offer is still inside the heartbeat window at `now`.
    pub fn is_live(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match (now - self.seen_at).to_std() {
            Ok(age) => age <= timeout,
            // seen_at lies in the future
            Err(_) => true,
        }
    }
}

/// Concurrent map of `hostname -> latest AgentOffer`.
///
/// Offer callbacks write from many tasks while a reconciliation pass reads,
/// so the map is sharded and lock-free for readers.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    offers: Arc<DashMap<String, AgentOffer>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record offers seen now. A new agent id for a known host retires the old one.
    pub fn register<I>(&self, agents: I)
    where
        I: IntoIterator<Item = Agent>,
    {
        self.register_at(agents, Utc::now());
    }

    pub fn register_at<I>(&self, agents: I, seen_at: DateTime<Utc>)
    where
        I: IntoIterator<Item = Agent>,
    {
        for agent in agents {
            self.offers
                .insert(agent.hostname.clone(), AgentOffer { agent, seen_at });
        }
    }

    /// Drop the offer made under `agent_id`. Returns whether one was removed.
    ///
    /// A host that already re-registered under a newer id keeps its offer.
    pub fn remove_agent(&self, agent_id: &str) -> bool {
        let mut removed = false;
        self.offers.retain(|_, offer| {
            if offer.agent.agent_id == agent_id {
                removed = true;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop offers that fell outside the heartbeat window. Returns how many.
    pub fn prune_expired(&self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let mut pruned = 0;
        self.offers.retain(|_, offer| {
            let live = offer.is_live(now, timeout);
            if !live {
                pruned += 1;
            }
            live
        });
        pruned
    }

    pub fn get(&self, hostname: &str) -> Option<AgentOffer> {
        self.offers.get(hostname).map(|entry| entry.value().clone())
    }

    /// Offers still inside the heartbeat window.
    pub fn live_offers(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<AgentOffer> {
        self.offers
            .iter()
            .filter(|entry| entry.value().is_live(now, timeout))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}
