//! Order State Machine
//!
//! ```text
//! pending ──(admin: payment verified)──> paid ──(admin: handed off)──> fulfilled
//!    │
//!    └────(admin: cancel)──> cancelled
//! ```
//!
//! `fulfilled` and `cancelled` are terminal. Every transition is an
//! administrative action; the payment verification itself is a manual human
//! decision recorded here, never computed.

use shared::error::{StoreError, StoreResult};
use shared::models::{Actor, OrderStatus};

/// Validate that `actor` may move an order from `current` to `target`.
///
/// Fails with [`StoreError::Forbidden`] for non-admin actors and
/// [`StoreError::InvalidTransition`] for any edge not in the graph,
/// including self-transitions and anything out of a terminal state.
pub fn validate_transition(
    current: OrderStatus,
    target: OrderStatus,
    actor: &Actor,
) -> StoreResult<()> {
    if !actor.is_admin() {
        return Err(StoreError::forbidden(format!(
            "order status changes require an admin actor (got {})",
            actor.role
        )));
    }
    if !current.can_transition_to(target) {
        return Err(StoreError::InvalidTransition {
            from: current,
            to: target,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    fn admin() -> Actor {
        Actor::admin("admin-1")
    }

    #[test]
    fn admin_walks_the_happy_path() {
        validate_transition(OrderStatus::Pending, OrderStatus::Paid, &admin()).unwrap();
        validate_transition(OrderStatus::Paid, OrderStatus::Fulfilled, &admin()).unwrap();
        validate_transition(OrderStatus::Pending, OrderStatus::Cancelled, &admin()).unwrap();
    }

    #[test]
    fn customers_may_not_transition() {
        let err =
            validate_transition(OrderStatus::Pending, OrderStatus::Paid, &Actor::customer("c"))
                .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        assert_eq!(Actor::customer("c").role, Role::Customer);
    }

    #[test]
    fn terminal_states_reject_everything() {
        for from in [OrderStatus::Fulfilled, OrderStatus::Cancelled] {
            for to in [
                OrderStatus::Pending,
                OrderStatus::Paid,
                OrderStatus::Fulfilled,
                OrderStatus::Cancelled,
            ] {
                let err = validate_transition(from, to, &admin()).unwrap_err();
                assert!(matches!(err, StoreError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn backwards_and_skipping_edges_are_rejected() {
        for (from, to) in [
            (OrderStatus::Paid, OrderStatus::Pending),
            (OrderStatus::Paid, OrderStatus::Cancelled),
            (OrderStatus::Pending, OrderStatus::Fulfilled),
            (OrderStatus::Pending, OrderStatus::Pending),
        ] {
            let err = validate_transition(from, to, &admin()).unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidTransition { .. }),
                "{from} -> {to} must be InvalidTransition"
            );
        }
    }
}
