//! Top-product aggregation shared by the store backends.

use std::collections::HashMap;

use crate::domain::{OrderEvent, TopProduct};

/// Group the completed orders' lines by product and pick the product with
/// the largest summed quantity.
///
/// Every line contributes its quantity, one to the product's order count and
/// the whole order total to its spend. On equal quantity the product seen
/// first wins, which makes the winner depend on storage order.
pub fn top_product<'a, I>(orders: I) -> Option<TopProduct>
where
    I: IntoIterator<Item = &'a OrderEvent>,
{
    let mut rows: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for order in orders.into_iter().filter(|o| o.is_completed()) {
        for item in &order.items {
            let slot = *index.entry(item.product_id.as_str()).or_insert_with(|| {
                rows.push(TopProduct {
                    product_id: item.product_id.clone(),
                    total_quantity: 0,
                    order_count: 0,
                    total_spent: 0.0,
                });
                rows.len() - 1
            });
            let row = &mut rows[slot];
            row.total_quantity += i64::from(item.quantity);
            row.order_count += 1;
            row.total_spent += order.total;
        }
    }

    rows.into_iter()
        .reduce(|best, row| if row.total_quantity > best.total_quantity { row } else { best })
}
