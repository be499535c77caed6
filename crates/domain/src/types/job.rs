//! Jobs, preferred-site relationships and payee accounts

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// A completed cleaning job whose charge is ready to be paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub site_id: String,
    /// Set when the job was performed under a business-owner account.
    pub business_id: Option<String>,
    /// Captured payment amount in cents.
    pub amount_charged_cents: i64,
    pub currency: String,
    /// Gateway reference of the captured customer charge.
    pub charge_ref: Option<String>,
}

/// Strength of a client's preference for a worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceLevel {
    #[default]
    Preferred,
    Favorite,
}

impl_domain_status_conversions!(PreferenceLevel {
    Preferred => "preferred",
    Favorite => "favorite",
});

/// How a preferred-site relationship came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipSource {
    Review,
    #[default]
    Manual,
    Invitation,
}

impl_domain_status_conversions!(RelationshipSource {
    Review => "review",
    Manual => "manual",
    Invitation => "invitation",
});

/// A client has marked `worker_id` as preferred for `site_id`.
///
/// Every relationship counts toward the worker's tier regardless of level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredSiteRelationship {
    pub worker_id: String,
    pub site_id: String,
    pub level: PreferenceLevel,
    /// Lower values are offered the site's jobs first.
    pub priority: u32,
    pub source: RelationshipSource,
    pub created_at: i64,
}

/// Worker-side destination account held with the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayeeAccount {
    pub worker_id: String,
    pub account_ref: String,
}
