use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::order::models::OrderStatus;

#[derive(Debug, Default, Serialize)]
pub struct OrderCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub ready: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

impl OrderCounts {
    /// Folds `(status, count)` rows into the per-status breakdown.
    pub fn from_rows(rows: Vec<(String, i64)>) -> Self {
        let mut counts = OrderCounts::default();
        for (status, count) in rows {
            counts.total += count;
            match OrderStatus::parse(&status) {
                Ok(OrderStatus::Pending) => counts.pending = count,
                Ok(OrderStatus::InProgress) => counts.in_progress = count,
                Ok(OrderStatus::Ready) => counts.ready = count,
                Ok(OrderStatus::Delivered) => counts.delivered = count,
                Ok(OrderStatus::Cancelled) => counts.cancelled = count,
                Err(_) => {}
            }
        }
        counts
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub orders: OrderCounts,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub revenue: BigDecimal,
    pub customers: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_fold_into_the_breakdown() {
        let counts = OrderCounts::from_rows(vec![
            ("pending".to_owned(), 4),
            ("in_progress".to_owned(), 2),
            ("delivered".to_owned(), 9),
        ]);
        assert_eq!(counts.total, 15);
        assert_eq!(counts.pending, 4);
        assert_eq!(counts.in_progress, 2);
        assert_eq!(counts.ready, 0);
        assert_eq!(counts.delivered, 9);
        assert_eq!(counts.cancelled, 0);
    }

    #[test]
    fn no_rows_means_all_zero() {
        let counts = OrderCounts::from_rows(Vec::new());
        assert_eq!(counts.total, 0);
        assert_eq!(counts.pending, 0);
    }
}
