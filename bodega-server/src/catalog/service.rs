//! Catalog Service
//!
//! Administrative create/edit/delete of catalog items. Concurrent edits to
//! the same item by two admins resolve last-writer-wins; only `quantity`
//! carries atomic semantics, via the stock ledger.

use std::sync::Arc;

use dashmap::DashMap;
use shared::error::{StoreError, StoreResult};
use shared::event::ChangePayload;
use shared::models::{CatalogItem, CatalogItemCreate, CatalogItemUpdate};

use crate::bus::ChangeBus;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, validate_non_negative, validate_optional_text,
    validate_required_text,
};

/// Items with stock below this count show up in the low-stock listing
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// The shared catalog item map. The catalog service and the stock ledger
/// both mutate it through entry locks.
pub type ItemMap = Arc<DashMap<String, CatalogItem>>;

/// Catalog CRUD service
#[derive(Debug, Clone)]
pub struct CatalogService {
    items: ItemMap,
    bus: ChangeBus,
}

impl CatalogService {
    pub fn new(items: ItemMap, bus: ChangeBus) -> Self {
        Self { items, bus }
    }

    /// Create a catalog item and broadcast the insert
    pub fn create(&self, payload: CatalogItemCreate) -> StoreResult<CatalogItem> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&payload.category, "category", MAX_NAME_LEN)?;
        validate_optional_text(payload.image_url.as_deref(), "image_url", MAX_URL_LEN)?;
        validate_non_negative(payload.price, "price")?;
        if let Some(offer_price) = payload.offer_price {
            validate_non_negative(offer_price, "offer_price")?;
        }

        let item = CatalogItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: payload.name,
            category: payload.category,
            image_url: payload.image_url,
            price: payload.price,
            quantity: payload.quantity,
            offer_enabled: payload.offer_enabled,
            offer_price: payload.offer_price,
            offer_window: payload.offer_window,
        };
        self.items.insert(item.id.clone(), item.clone());
        self.bus
            .publish(ChangePayload::CatalogInserted { item: item.clone() });
        tracing::info!(item_id = %item.id, name = %item.name, "catalog item created");
        Ok(item)
    }

    /// Apply a partial update, last-writer-wins per field, and broadcast it
    pub fn update(&self, id: &str, payload: CatalogItemUpdate) -> StoreResult<CatalogItem> {
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(category) = &payload.category {
            validate_required_text(category, "category", MAX_NAME_LEN)?;
        }
        validate_optional_text(payload.image_url.as_deref(), "image_url", MAX_URL_LEN)?;
        if let Some(price) = payload.price {
            validate_non_negative(price, "price")?;
        }
        if let Some(Some(offer_price)) = payload.offer_price {
            validate_non_negative(offer_price, "offer_price")?;
        }

        let mut entry = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("catalog item {id}")))?;

        if let Some(name) = payload.name {
            entry.name = name;
        }
        if let Some(category) = payload.category {
            entry.category = category;
        }
        if let Some(image_url) = payload.image_url {
            entry.image_url = Some(image_url);
        }
        if let Some(price) = payload.price {
            entry.price = price;
        }
        if let Some(quantity) = payload.quantity {
            entry.quantity = quantity;
        }
        if let Some(offer_enabled) = payload.offer_enabled {
            entry.offer_enabled = offer_enabled;
        }
        if let Some(offer_price) = payload.offer_price {
            entry.offer_price = offer_price;
        }
        if let Some(offer_window) = payload.offer_window {
            entry.offer_window = offer_window;
        }

        let item = entry.value().clone();
        // Publish while holding the entry lock so per-item event order
        // matches commit order.
        self.bus
            .publish(ChangePayload::CatalogUpdated { item: item.clone() });
        drop(entry);
        Ok(item)
    }

    /// Remove an item and broadcast the deletion
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let (item_id, item) = self
            .items
            .remove(id)
            .ok_or_else(|| StoreError::not_found(format!("catalog item {id}")))?;
        self.bus.publish(ChangePayload::CatalogDeleted { item_id });
        tracing::info!(item_id = %id, name = %item.name, "catalog item deleted");
        Ok(())
    }

    pub fn get(&self, id: &str) -> StoreResult<CatalogItem> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::not_found(format!("catalog item {id}")))
    }

    /// All items, newest-created last, sorted by name for stable listings
    pub fn list(&self) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> =
            self.items.iter().map(|entry| entry.value().clone()).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// Items whose stock has fallen below [`LOW_STOCK_THRESHOLD`]
    pub fn low_stock(&self) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|entry| entry.quantity < LOW_STOCK_THRESHOLD)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.id.cmp(&b.id)));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OfferWindow;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(DashMap::new()), ChangeBus::new())
    }

    fn create_payload(name: &str) -> CatalogItemCreate {
        CatalogItemCreate {
            name: name.into(),
            category: "Abarrotes".into(),
            image_url: None,
            price: 1000,
            quantity: 10,
            offer_enabled: false,
            offer_price: None,
            offer_window: None,
        }
    }

    #[test]
    fn create_rejects_bad_input_before_mutation() {
        let svc = service();
        let mut payload = create_payload("");
        assert!(svc.create(payload.clone()).is_err());
        payload.name = "Arroz Costeño 5kg".into();
        payload.price = -100;
        assert!(svc.create(payload).is_err());
        assert!(svc.list().is_empty());
    }

    #[test]
    fn update_is_partial_and_clears_offer_fields_on_null() {
        let svc = service();
        let item = svc.create(create_payload("Leche Gloria")).unwrap();

        let updated = svc
            .update(
                &item.id,
                CatalogItemUpdate {
                    offer_enabled: Some(true),
                    offer_price: Some(Some(450)),
                    offer_window: Some(Some(OfferWindow::parse("07:00", "10:00").unwrap())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.offer_enabled);
        assert_eq!(updated.offer_price, Some(450));
        assert_eq!(updated.name, "Leche Gloria");

        let cleared = svc
            .update(
                &item.id,
                CatalogItemUpdate {
                    offer_price: Some(None),
                    offer_window: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.offer_price, None);
        assert_eq!(cleared.offer_window, None);
        assert!(cleared.offer_enabled, "untouched fields keep their value");
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let svc = service();
        let item = svc.create(create_payload("Aceite Primor")).unwrap();
        svc.delete(&item.id).unwrap();
        assert!(matches!(svc.get(&item.id), Err(StoreError::NotFound(_))));
        assert!(matches!(svc.delete(&item.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn low_stock_uses_threshold() {
        let svc = service();
        let mut payload = create_payload("Casi agotado");
        payload.quantity = 2;
        let low = svc.create(payload).unwrap();
        svc.create(create_payload("Bien surtido")).unwrap();

        let listing = svc.low_stock();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, low.id);
    }
}
