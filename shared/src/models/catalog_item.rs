//! Catalog Item Model

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Daily-repeating offer window, expressed as two time-of-day values with no
/// associated date. Inclusive on both ends.
///
/// A window where `start > end` wraps around midnight: it is active from
/// `start` until 23:59 and again from 00:00 until `end`. A window where
/// `start == end` covers exactly that minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl OfferWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from two `HH:MM` strings
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
        Some(Self { start, end })
    }
}

/// Serde helper for `HH:MM` time-of-day fields (the storefront wire format)
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .map_err(|_| D::Error::custom(format!("invalid HH:MM time: {raw}")))
    }
}

/// Catalog item entity
///
/// `quantity` is the only field with atomic update semantics (the stock
/// ledger's guarded decrement); everything else is read-mostly and updated
/// last-writer-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Category label
    pub category: String,
    pub image_url: Option<String>,
    /// Base unit price in cents
    pub price: i64,
    /// Available quantity
    pub quantity: u32,
    pub offer_enabled: bool,
    /// Offer unit price in cents (present only when the offer flag is set;
    /// not required to be lower than the base price)
    pub offer_price: Option<i64>,
    /// Optional daily offer window; absent means the offer is always active
    pub offer_window: Option<OfferWindow>,
}

/// Create catalog item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItemCreate {
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub price: i64,
    pub quantity: u32,
    #[serde(default)]
    pub offer_enabled: bool,
    pub offer_price: Option<i64>,
    pub offer_window: Option<OfferWindow>,
}

/// Update catalog item payload (last-writer-wins per field)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<u32>,
    pub offer_enabled: Option<bool>,
    /// `Some(None)` clears the offer price
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<Option<i64>>,
    /// `Some(None)` clears the offer window
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub offer_window: Option<Option<OfferWindow>>,
}

/// Serde helper distinguishing "absent" from "explicitly null"
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_window_round_trips_as_hhmm() {
        let window = OfferWindow::parse("07:00", "10:30").unwrap();
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"start":"07:00","end":"10:30"}"#);
        let back: OfferWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, window);
    }

    #[test]
    fn offer_window_rejects_malformed_times() {
        assert!(OfferWindow::parse("7am", "10:00").is_none());
        assert!(serde_json::from_str::<OfferWindow>(r#"{"start":"25:00","end":"10:00"}"#).is_err());
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let update: CatalogItemUpdate = serde_json::from_str(r#"{"price": 500}"#).unwrap();
        assert!(update.offer_price.is_none());

        let update: CatalogItemUpdate =
            serde_json::from_str(r#"{"offer_price": null}"#).unwrap();
        assert_eq!(update.offer_price, Some(None));

        let update: CatalogItemUpdate =
            serde_json::from_str(r#"{"offer_price": 250}"#).unwrap();
        assert_eq!(update.offer_price, Some(Some(250)));
    }
}
