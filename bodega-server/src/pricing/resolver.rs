//! Offer Pricing Resolver
//!
//! Resolution rules:
//! - offer flag unset, or set without an offer price → base price
//! - offer set with no window → offer price (always active)
//! - offer set with a daily window → offer price iff the time-of-day falls
//!   inside the window, inclusive on both ends

use chrono::{NaiveTime, Timelike};
use shared::models::{CatalogItem, OfferWindow};

/// Resolve the effective unit price (cents) for `item` at time-of-day `at`.
///
/// The caller picks the clock; business code passes the current local
/// time-of-day, tests pass fixed values.
pub fn resolve_price(item: &CatalogItem, at: NaiveTime) -> i64 {
    if !item.offer_enabled {
        return item.price;
    }
    let Some(offer_price) = item.offer_price else {
        return item.price;
    };
    match item.offer_window {
        None => offer_price,
        Some(window) if window_contains(window, at) => offer_price,
        Some(_) => item.price,
    }
}

/// Whether `at` falls inside the daily window, comparing minutes since
/// midnight, inclusive on both ends.
///
/// A window with `start > end` wraps around midnight and is active iff
/// `t >= start || t <= end` (e.g. 22:00–02:00 covers 23:30 and 01:15 but
/// not 12:00). With `start == end` the window covers exactly that minute.
/// Seconds are ignored; the wire format carries minute precision only.
pub fn window_contains(window: OfferWindow, at: NaiveTime) -> bool {
    let t = minutes_since_midnight(at);
    let start = minutes_since_midnight(window.start);
    let end = minutes_since_midnight(window.end);
    if start <= end {
        t >= start && t <= end
    } else {
        t >= start || t <= end
    }
}

fn minutes_since_midnight(at: NaiveTime) -> u32 {
    at.hour() * 60 + at.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
    }

    fn item_with_offer(offer_price: Option<i64>, window: Option<OfferWindow>) -> CatalogItem {
        CatalogItem {
            id: "item-1".into(),
            name: "Pan con chicharrón".into(),
            category: "Desayunos".into(),
            image_url: None,
            price: 1250,
            quantity: 10,
            offer_enabled: true,
            offer_price,
            offer_window: window,
        }
    }

    #[test]
    fn disabled_offer_returns_base_price() {
        let mut item = item_with_offer(Some(500), None);
        item.offer_enabled = false;
        assert_eq!(resolve_price(&item, time("08:00")), 1250);
    }

    #[test]
    fn enabled_offer_without_price_falls_back_to_base() {
        let item = item_with_offer(None, None);
        assert_eq!(resolve_price(&item, time("08:00")), 1250);
    }

    #[test]
    fn offer_without_window_is_always_active() {
        let item = item_with_offer(Some(500), None);
        assert_eq!(resolve_price(&item, time("00:00")), 500);
        assert_eq!(resolve_price(&item, time("23:59")), 500);
    }

    #[test]
    fn morning_window_scenario() {
        // Base 12.50, offer 5.00, window 07:00–10:00:
        // 08:00 resolves to the offer, 11:00 to the base price.
        let item = item_with_offer(Some(500), OfferWindow::parse("07:00", "10:00"));
        assert_eq!(resolve_price(&item, time("08:00")), 500);
        assert_eq!(resolve_price(&item, time("11:00")), 1250);
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let item = item_with_offer(Some(500), OfferWindow::parse("07:00", "10:00"));
        assert_eq!(resolve_price(&item, time("07:00")), 500);
        assert_eq!(resolve_price(&item, time("10:00")), 500);
        assert_eq!(resolve_price(&item, time("06:59")), 1250);
        assert_eq!(resolve_price(&item, time("10:01")), 1250);
    }

    #[test]
    fn overnight_window_wraps_around_midnight() {
        let item = item_with_offer(Some(500), OfferWindow::parse("22:00", "02:00"));
        assert_eq!(resolve_price(&item, time("23:30")), 500);
        assert_eq!(resolve_price(&item, time("00:00")), 500);
        assert_eq!(resolve_price(&item, time("02:00")), 500);
        assert_eq!(resolve_price(&item, time("02:01")), 1250);
        assert_eq!(resolve_price(&item, time("12:00")), 1250);
        assert_eq!(resolve_price(&item, time("21:59")), 1250);
    }

    #[test]
    fn degenerate_window_covers_one_minute() {
        let item = item_with_offer(Some(500), OfferWindow::parse("09:30", "09:30"));
        assert_eq!(resolve_price(&item, time("09:30")), 500);
        assert_eq!(resolve_price(&item, time("09:29")), 1250);
        assert_eq!(resolve_price(&item, time("09:31")), 1250);
    }

    #[test]
    fn offer_may_exceed_base_price() {
        // Discount direction is not enforced.
        let item = item_with_offer(Some(2000), None);
        assert_eq!(resolve_price(&item, time("12:00")), 2000);
    }

    #[test]
    fn seconds_are_ignored() {
        let item = item_with_offer(Some(500), OfferWindow::parse("07:00", "10:00"));
        let late_in_minute = NaiveTime::from_hms_opt(10, 0, 59).unwrap();
        assert_eq!(resolve_price(&item, late_in_minute), 500);
    }
}
