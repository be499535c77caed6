//! Scriptable payment gateway fake

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tidyhome_core::{Charge, PaymentGateway, Transfer, TransferRequest};
use tidyhome_domain::{Result as DomainResult, TidyHomeError};

/// Records every transfer; destinations can be scripted to fail or stall.
///
/// Like a real gateway, a repeated idempotency key is answered with the
/// outcome of the first request carrying it and moves no money.
#[derive(Default)]
pub struct FakeGateway {
    transfers: Mutex<Vec<TransferRequest>>,
    requests: Mutex<Vec<TransferRequest>>,
    outcomes: Mutex<HashMap<String, Result<String, String>>>,
    rejected_destinations: Mutex<HashSet<String>>,
    stalled_destinations: Mutex<HashMap<String, Duration>>,
    missing_charges: Mutex<HashSet<String>>,
    charge_lookups: AtomicUsize,
}

impl FakeGateway {
    /// Transfers to `destination` are declined.
    pub fn reject(&self, destination: &str) {
        self.rejected_destinations.lock().unwrap().insert(destination.to_string());
    }

    /// Accept transfers to `destination` again.
    pub fn accept(&self, destination: &str) {
        self.rejected_destinations.lock().unwrap().remove(destination);
    }

    /// Transfers to `destination` take `delay` before succeeding.
    pub fn stall(&self, destination: &str, delay: Duration) {
        self.stalled_destinations.lock().unwrap().insert(destination.to_string(), delay);
    }

    /// Charge lookups for `charge_ref` fail.
    pub fn lose_charge(&self, charge_ref: &str) {
        self.missing_charges.lock().unwrap().insert(charge_ref.to_string());
    }

    /// Transfers that moved money, one per accepted idempotency key.
    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }

    /// Every transfer request received, including declined and replayed ones.
    pub fn requests(&self) -> Vec<TransferRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn charge_lookups(&self) -> usize {
        self.charge_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn retrieve_charge(&self, charge_ref: &str) -> DomainResult<Charge> {
        self.charge_lookups.fetch_add(1, Ordering::SeqCst);
        if self.missing_charges.lock().unwrap().contains(charge_ref) {
            return Err(TidyHomeError::Gateway(format!("No such charge: {charge_ref}")));
        }
        Ok(Charge { charge_id: format!("ch_{charge_ref}") })
    }

    async fn transfer(&self, request: &TransferRequest) -> DomainResult<Transfer> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.stalled_destinations.lock().unwrap().get(&request.destination).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        let outcome = outcomes.entry(request.idempotency_key.clone()).or_insert_with(|| {
            if self.rejected_destinations.lock().unwrap().contains(&request.destination) {
                return Err(format!("Destination {} cannot receive transfers", request.destination));
            }
            let mut transfers = self.transfers.lock().unwrap();
            transfers.push(request.clone());
            Ok(format!("tr_{}", transfers.len()))
        });
        match outcome {
            Ok(transfer_id) => Ok(Transfer { transfer_id: transfer_id.clone() }),
            Err(message) => Err(TidyHomeError::Gateway(message.clone())),
        }
    }
}
