//! Order lifecycle.
//!
//! The legal status graph and the notice a customer receives when their order
//! moves. Both are plain tables so the order service never decides either on
//! its own.
//!
//! ```text
//! PENDING ──► PAID ──► PROCESSING ──► SHIPPED ──► COMPLETED
//!    │          │          ▲   │
//!    │          │          │   └──────► CANCELLED
//!    └──────────┴──────────┴──────────► CANCELLED
//! ```
//!
//! `PAID` is never stored as a resting status: the payment is recorded and the
//! order continues straight to `PROCESSING`, with the customer told about the
//! payment rather than about packing.

use std::fmt;

use crate::types::{OrderId, OrderStatus, Severity};

/// Whether `to` may directly follow `from`.
#[must_use]
pub const fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::{Cancelled, Completed, Paid, Pending, Processing, Shipped};

    matches!(
        (from, to),
        (Pending, Paid | Processing | Cancelled)
            | (Paid, Processing | Cancelled)
            | (Processing, Shipped | Cancelled)
            | (Shipped, Completed)
    )
}

/// Statuses reachable from `from` in one step.
#[must_use]
pub fn next_statuses(from: OrderStatus) -> Vec<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .filter(|to| can_transition(from, *to))
        .collect()
}

/// A requested move the graph does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub struct IllegalTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move order from {} to {} (", self.from, self.to)?;
        let next = next_statuses(self.from);
        if next.is_empty() {
            write!(f, "{} is final", self.from)?;
        } else {
            let names: Vec<_> = next.iter().map(ToString::to_string).collect();
            write!(f, "allowed: {}", names.join(", "))?;
        }
        f.write_str(")")
    }
}

/// What applying a requested status actually does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan {
    /// The order already has the requested status. Nothing is written.
    Unchanged,
    /// Write `status` and send the notice for `notice`.
    Move {
        /// Status to store.
        status: OrderStatus,
        /// Status whose notice the customer receives.
        notice: OrderStatus,
        /// Whether the move records a payment (`paid_at` is stamped).
        records_payment: bool,
    },
}

/// Plan the move from `current` to `requested`.
///
/// # Errors
///
/// Returns [`IllegalTransition`] when the graph has no such edge.
pub fn plan_transition(
    current: OrderStatus,
    requested: OrderStatus,
) -> Result<TransitionPlan, IllegalTransition> {
    if current == requested {
        return Ok(TransitionPlan::Unchanged);
    }
    if !can_transition(current, requested) {
        return Err(IllegalTransition {
            from: current,
            to: requested,
        });
    }

    Ok(match requested {
        OrderStatus::Paid => TransitionPlan::Move {
            status: OrderStatus::Processing,
            notice: OrderStatus::Paid,
            records_payment: true,
        },
        status => TransitionPlan::Move {
            status,
            notice: status,
            records_payment: false,
        },
    })
}

/// Customer-facing notice for an order that reached a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// The notice sent when `order_id` reaches `status`.
///
/// `PENDING` has no notice; orders start there and never return.
#[must_use]
pub fn notice_for(status: OrderStatus, order_id: OrderId) -> Option<Notice> {
    let (title, message, severity) = match status {
        OrderStatus::Pending => return None,
        OrderStatus::Paid => (
            "Pembayaran Berhasil",
            format!(
                "Pembayaran untuk pesanan #{order_id} telah dikonfirmasi dan sedang dalam proses pengemasan."
            ),
            Severity::Success,
        ),
        OrderStatus::Processing => (
            "Pesanan Sedang Diproses",
            format!("Pesanan #{order_id} sedang dikemas dan akan segera dikirim."),
            Severity::Info,
        ),
        OrderStatus::Shipped => (
            "Pesanan Telah Dikirim",
            format!("Pesanan #{order_id} telah dikirim dan sedang dalam perjalanan ke alamat Anda."),
            Severity::Success,
        ),
        OrderStatus::Completed => (
            "Pesanan Selesai",
            format!("Pesanan #{order_id} telah selesai. Terima kasih atas pembelian Anda!"),
            Severity::Success,
        ),
        OrderStatus::Cancelled => (
            "Pesanan Dibatalkan",
            format!(
                "Pesanan #{order_id} telah dibatalkan. Silakan hubungi kami jika ada pertanyaan."
            ),
            Severity::Warning,
        ),
    };

    Some(Notice {
        title: title.to_owned(),
        message,
        severity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use OrderStatus::{Cancelled, Completed, Paid, Pending, Processing, Shipped};

    #[test]
    fn test_happy_path_is_legal() {
        assert!(can_transition(Pending, Paid));
        assert!(can_transition(Paid, Processing));
        assert!(can_transition(Processing, Shipped));
        assert!(can_transition(Shipped, Completed));
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for from in OrderStatus::ALL {
            assert!(!can_transition(from, Pending), "{from} -> PENDING");
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(next_statuses(from).is_empty(), "{from}");
        }
    }

    #[test]
    fn test_cannot_cancel_after_shipping() {
        assert!(!can_transition(Shipped, Cancelled));
        assert!(!can_transition(Completed, Cancelled));
        assert!(can_transition(Processing, Cancelled));
    }

    #[test]
    fn test_same_status_is_unchanged() {
        for status in OrderStatus::ALL {
            assert_eq!(
                plan_transition(status, status).unwrap(),
                TransitionPlan::Unchanged
            );
        }
    }

    #[test]
    fn test_paid_advances_to_processing_with_paid_notice() {
        assert_eq!(
            plan_transition(Pending, Paid).unwrap(),
            TransitionPlan::Move {
                status: Processing,
                notice: Paid,
                records_payment: true,
            }
        );
    }

    #[test]
    fn test_illegal_move_reports_both_ends() {
        let err = plan_transition(Completed, Processing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot move order from COMPLETED to PROCESSING (COMPLETED is final)"
        );

        let err = plan_transition(Shipped, Cancelled).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot move order from SHIPPED to CANCELLED (allowed: COMPLETED)"
        );
    }

    #[test]
    fn test_next_statuses_follow_graph_order() {
        assert_eq!(next_statuses(Pending), vec![Paid, Processing, Cancelled]);
        assert_eq!(next_statuses(Processing), vec![Shipped, Cancelled]);
    }

    #[test]
    fn test_every_target_status_has_one_notice() {
        let id = OrderId::new(42);
        for status in OrderStatus::ALL {
            let notice = notice_for(status, id);
            if status == Pending {
                assert!(notice.is_none());
            } else {
                let notice = notice.unwrap();
                assert!(notice.message.contains("#42"), "{status}");
                assert!(!notice.title.is_empty());
            }
        }
    }

    #[test]
    fn test_notice_severities() {
        let id = OrderId::new(1);
        let severity = |s| notice_for(s, id).unwrap().severity;
        assert_eq!(severity(Paid), Severity::Success);
        assert_eq!(severity(Processing), Severity::Info);
        assert_eq!(severity(Shipped), Severity::Success);
        assert_eq!(severity(Completed), Severity::Success);
        assert_eq!(severity(Cancelled), Severity::Warning);
    }
}
