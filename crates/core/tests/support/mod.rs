//! Shared test helpers for `tidyhome-core` integration tests.
//!
//! In-memory fakes for every port plus a [`PayoutHarness`] that wires them
//! into a real orchestrator, so tests can focus on payout behaviour.

#![allow(dead_code)]

pub mod gateway;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use tidyhome_core::{
    BonusEngine, FeeTierQualifier, LoyaltyTierService, OrchestratorSettings, PayoutDependencies,
    PayoutOrchestrator,
};
use tidyhome_domain::{
    Job, PayeeAccount, PreferenceLevel, PreferredSiteRelationship, RelationshipSource,
};

pub use gateway::FakeGateway;
pub use repositories::{
    InMemoryConfigStore, InMemoryJobs, InMemoryLedger, InMemoryPayeeAccounts, InMemoryPayouts,
    InMemoryPreferredSites, InMemoryTierSnapshots, InMemoryVolumeStats,
};

/// Relationship fixture with default level and source.
pub fn relationship(worker_id: &str, site_id: &str) -> PreferredSiteRelationship {
    PreferredSiteRelationship {
        worker_id: worker_id.to_string(),
        site_id: site_id.to_string(),
        level: PreferenceLevel::Preferred,
        priority: 1,
        source: RelationshipSource::Manual,
        created_at: 1_700_000_000,
    }
}

/// Individual job at `site_id` with a captured charge.
pub fn job(id: &str, site_id: &str, amount_charged_cents: i64) -> Job {
    Job {
        id: id.to_string(),
        site_id: site_id.to_string(),
        business_id: None,
        amount_charged_cents,
        currency: "usd".to_string(),
        charge_ref: Some(format!("pi_{id}")),
    }
}

pub fn workers(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

/// Every fake plus the services built on top of them.
pub struct PayoutHarness {
    pub config: Arc<InMemoryConfigStore>,
    pub relationships: Arc<InMemoryPreferredSites>,
    pub snapshots: Arc<InMemoryTierSnapshots>,
    pub payouts: Arc<InMemoryPayouts>,
    pub accounts: Arc<InMemoryPayeeAccounts>,
    pub ledger: Arc<InMemoryLedger>,
    pub volume: Arc<InMemoryVolumeStats>,
    pub jobs: Arc<InMemoryJobs>,
    pub gateway: Arc<FakeGateway>,
    pub tiers: Arc<LoyaltyTierService>,
}

impl PayoutHarness {
    pub fn new() -> Self {
        let config = Arc::new(InMemoryConfigStore::default());
        let relationships = Arc::new(InMemoryPreferredSites::default());
        let snapshots = Arc::new(InMemoryTierSnapshots::default());
        let tiers = Arc::new(LoyaltyTierService::new(
            relationships.clone(),
            snapshots.clone(),
            config.clone(),
        ));

        Self {
            config,
            relationships,
            snapshots,
            payouts: Arc::new(InMemoryPayouts::default()),
            accounts: Arc::new(InMemoryPayeeAccounts::default()),
            ledger: Arc::new(InMemoryLedger::default()),
            volume: Arc::new(InMemoryVolumeStats::default()),
            jobs: Arc::new(InMemoryJobs::default()),
            gateway: Arc::new(FakeGateway::default()),
            tiers,
        }
    }

    /// Give `worker_id` preferred status at `count` distinct sites, the
    /// first being `site_id`.
    pub fn prefer(&self, worker_id: &str, site_id: &str, count: u32) {
        self.relationships.insert(relationship(worker_id, site_id));
        for n in 1..count {
            self.relationships.insert(relationship(worker_id, &format!("{site_id}-other-{n}")));
        }
    }

    /// Link a payee account for each worker.
    pub fn onboard(&self, worker_ids: &[&str]) {
        for worker_id in worker_ids {
            self.accounts.insert(PayeeAccount {
                worker_id: (*worker_id).to_string(),
                account_ref: format!("acct_{worker_id}"),
            });
        }
    }

    pub fn bonus_engine(&self) -> BonusEngine {
        BonusEngine::new(self.relationships.clone(), self.tiers.clone())
    }

    pub fn fee_qualifier(&self) -> FeeTierQualifier {
        FeeTierQualifier::new(self.config.clone(), self.volume.clone())
    }

    pub fn orchestrator(&self) -> PayoutOrchestrator {
        self.orchestrator_with(OrchestratorSettings {
            max_concurrency: 1,
            gateway_timeout: Duration::from_secs(5),
            ..OrchestratorSettings::default()
        })
    }

    pub fn orchestrator_with(&self, settings: OrchestratorSettings) -> PayoutOrchestrator {
        let deps = PayoutDependencies {
            jobs: self.jobs.clone(),
            payouts: self.payouts.clone(),
            payee_accounts: self.accounts.clone(),
            ledger: self.ledger.clone(),
            volume: self.volume.clone(),
            gateway: self.gateway.clone(),
            bonus: Arc::new(self.bonus_engine()),
            fees: Arc::new(self.fee_qualifier()),
        };
        PayoutOrchestrator::new(deps, settings)
    }
}
