//! Application context - dependency injection container

use std::sync::Arc;

use tidyhome_core::{
    BonusEngine, ConfigStore, FeeTierQualifier, LoyaltyTierService, OrchestratorSettings,
    PayeeAccountRepository, PaymentGateway, PayoutDependencies, PayoutOrchestrator,
    PayoutRepository, PreferredSiteRepository,
};
use tidyhome_domain::{Config, Result};
use tidyhome_infra::{
    config, DbManager, HttpPaymentGateway, SqliteConfigStore, SqliteJobRepository,
    SqliteLedgerRepository, SqlitePayeeAccountRepository, SqlitePayoutRepository,
    SqlitePreferredSiteRepository, SqliteTierSnapshotRepository, SqliteVolumeStatsRepository,
};
use tracing::info;

/// Type alias for configuration store port trait object
type DynConfigStore = dyn ConfigStore + Send + Sync + 'static;

/// Type alias for preferred-site repository port trait object
type DynPreferredSiteRepository = dyn PreferredSiteRepository + Send + Sync + 'static;

/// Type alias for payee account repository port trait object
type DynPayeeAccountRepository = dyn PayeeAccountRepository + Send + Sync + 'static;

/// Type alias for payout repository port trait object
type DynPayoutRepository = dyn PayoutRepository + Send + Sync + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,

    // Ports
    pub config_store: Arc<DynConfigStore>,
    pub preferred_sites: Arc<DynPreferredSiteRepository>,
    pub payee_accounts: Arc<DynPayeeAccountRepository>,
    pub payouts: Arc<DynPayoutRepository>,
    pub jobs: Arc<SqliteJobRepository>,
    pub ledger: Arc<SqliteLedgerRepository>,

    // Services
    pub tiers: Arc<LoyaltyTierService>,
    pub fees: Arc<FeeTierQualifier>,
    pub orchestrator: Arc<PayoutOrchestrator>,
}

impl AppContext {
    /// Load configuration from the environment (or a config file) and build
    /// the context.
    pub fn from_env() -> Result<Self> {
        Self::new(config::load()?)
    }

    /// Build the context with the HTTP payment gateway described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let gateway = Arc::new(HttpPaymentGateway::from_config(&config.gateway)?);
        Self::with_gateway(config, gateway)
    }

    /// Build the context around an already constructed gateway.
    pub fn with_gateway(config: Config, gateway: Arc<dyn PaymentGateway>) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let config_store = Arc::new(SqliteConfigStore::new(Arc::clone(&db)));
        let preferred_sites = Arc::new(SqlitePreferredSiteRepository::new(Arc::clone(&db)));
        let snapshots = Arc::new(SqliteTierSnapshotRepository::new(Arc::clone(&db)));
        let payee_accounts = Arc::new(SqlitePayeeAccountRepository::new(Arc::clone(&db)));
        let payouts = Arc::new(SqlitePayoutRepository::new(Arc::clone(&db)));
        let jobs = Arc::new(SqliteJobRepository::new(Arc::clone(&db)));
        let ledger = Arc::new(SqliteLedgerRepository::new(Arc::clone(&db)));
        let volume = Arc::new(SqliteVolumeStatsRepository::new(Arc::clone(&db)));

        let tiers = Arc::new(LoyaltyTierService::new(
            preferred_sites.clone(),
            snapshots,
            config_store.clone(),
        ));
        let fees = Arc::new(FeeTierQualifier::new(config_store.clone(), volume.clone()));
        let bonus = Arc::new(BonusEngine::new(preferred_sites.clone(), Arc::clone(&tiers)));

        let deps = PayoutDependencies {
            jobs: jobs.clone(),
            payouts: payouts.clone(),
            payee_accounts: payee_accounts.clone(),
            ledger: ledger.clone(),
            volume,
            gateway,
            bonus,
            fees: Arc::clone(&fees),
        };
        let settings = OrchestratorSettings {
            max_concurrency: config.payouts.max_concurrency,
            gateway_timeout: config.gateway.call_deadline(),
            default_currency: config.payouts.currency.clone(),
        };
        let orchestrator = Arc::new(PayoutOrchestrator::new(deps, settings));

        info!(
            db_path = %db.path().display(),
            max_concurrency = config.payouts.max_concurrency,
            "application context ready"
        );

        Ok(Self {
            config,
            db,
            config_store,
            preferred_sites,
            payee_accounts,
            payouts,
            jobs,
            ledger,
            tiers,
            fees,
            orchestrator,
        })
    }

    /// Verify the database answers queries.
    pub fn health_check(&self) -> Result<()> {
        self.db.health_check()
    }
}
