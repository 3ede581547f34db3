//! Cosmetic skin ownership and purchases.

pub mod catalog;

use crate::store::{self, Store};
use crate::wallet::{units, PaymentFailure, WalletLink, TRANSFER_GAS};
use catalog::{SkinDefinition, DEFAULT_SKIN};
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("connect a wallet before purchasing")]
    NotConnected,

    #[error("skin {0} is not for sale")]
    InvalidSkin(String),

    #[error(transparent)]
    PurchaseFailed(PaymentFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkinOutcome {
    Selected,
    AlreadyOwned,
    Purchased { tx_hash: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Inventory {
    owned: Vec<String>,
    current: String,
}

impl Inventory {
    fn owns(&self, skin_id: &str) -> bool {
        self.owned.iter().any(|owned| owned == skin_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkinView {
    #[serde(flatten)]
    pub skin: &'static SkinDefinition,
    pub owned: bool,
    pub current: bool,
}

pub struct SkinShop {
    inventory: Mutex<Inventory>,
    purchase_lock: Mutex<()>,
    store: Store,
}

impl SkinShop {
    pub async fn load(kv: Store) -> Self {
        let mut owned: Vec<String> = kv.load_or(&store::OWNED_SKINS, Vec::new()).await;
        owned.retain(|id| catalog::find(id).is_some());
        for free in catalog::unlocked_ids() {
            if !owned.iter().any(|id| id == free) {
                owned.push(free.to_string());
            }
        }

        let stored_current = kv.load_or(&store::CURRENT_SKIN, DEFAULT_SKIN.to_string()).await;
        let current = if owned.contains(&stored_current) {
            stored_current
        } else {
            DEFAULT_SKIN.to_string()
        };

        tracing::info!(owned = owned.len(), %current, "inventory loaded");
        Self {
            inventory: Mutex::new(Inventory { owned, current }),
            purchase_lock: Mutex::new(()),
            store: kv,
        }
    }

    pub async fn is_owned(&self, skin_id: &str) -> bool {
        self.inventory.lock().await.owns(skin_id)
    }

    pub async fn current(&self) -> String {
        self.inventory.lock().await.current.clone()
    }

    #[cfg(test)]
    pub async fn owned(&self) -> Vec<String> {
        self.inventory.lock().await.owned.clone()
    }

    pub async fn views(&self) -> Vec<SkinView> {
        let inventory = self.inventory.lock().await;
        catalog::SKINS
            .iter()
            .map(|skin| SkinView {
                skin,
                owned: inventory.owns(skin.id),
                current: inventory.current == skin.id,
            })
            .collect()
    }

    /// Buying an owned skin is a no-op success and sends no payment.
    pub async fn purchase(
        &self,
        skin_id: &str,
        wallet: &WalletLink,
    ) -> Result<SkinOutcome, PurchaseError> {
        let session = wallet.session().ok_or(PurchaseError::NotConnected)?;
        // One payment in flight at a time, so a repeated request sees the first one's result.
        let _guard = self.purchase_lock.lock().await;

        if self.is_owned(skin_id).await {
            return Ok(SkinOutcome::AlreadyOwned);
        }
        let skin = catalog::find(skin_id)
            .filter(|skin| skin.locked)
            .ok_or_else(|| PurchaseError::InvalidSkin(skin_id.to_string()))?;
        let amount_wei =
            units::to_wei(skin.price).ok_or_else(|| PurchaseError::InvalidSkin(skin_id.to_string()))?;

        let tx_hash = wallet
            .pay(&session, amount_wei, Some(TRANSFER_GAS))
            .await
            .map_err(|error| {
                tracing::warn!(%error, skin_id, "skin purchase failed");
                PurchaseError::PurchaseFailed(error.payment_failure())
            })?;

        let (owned, current) = {
            let mut inventory = self.inventory.lock().await;
            inventory.owned.push(skin.id.to_string());
            inventory.current = skin.id.to_string();
            (inventory.owned.clone(), inventory.current.clone())
        };
        tracing::info!(skin_id, %tx_hash, "skin purchased");
        self.store.save_logged(&store::OWNED_SKINS, &owned).await;
        self.store.save_logged(&store::CURRENT_SKIN, &current).await;
        Ok(SkinOutcome::Purchased { tx_hash })
    }

    /// Owned skins become current; anything else goes through `purchase`.
    pub async fn select_skin(
        &self,
        skin_id: &str,
        wallet: &WalletLink,
    ) -> Result<SkinOutcome, PurchaseError> {
        let selected = {
            let mut inventory = self.inventory.lock().await;
            if inventory.owns(skin_id) {
                inventory.current = skin_id.to_string();
                true
            } else {
                false
            }
        };
        if !selected {
            return self.purchase(skin_id, wallet).await;
        }
        self.store
            .save_logged(&store::CURRENT_SKIN, &skin_id.to_string())
            .await;
        Ok(SkinOutcome::Selected)
    }
}
