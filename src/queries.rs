//! Read models derived from the local collections.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};

use crate::domain::{MenuItem, Order, OrderStatus, User};

#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub pending: usize,
    pub completed: usize,
    /// Sum of completed order totals.
    pub revenue: f64,
    /// Up to seven most recent days with completed sales, oldest first.
    pub daily_sales: Vec<DailySales>,
}

pub fn newest_first(orders: &[Order]) -> Vec<Order> {
    let mut sorted = orders.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Orders whose customer name and phone both match the session user.
pub fn my_orders(orders: &[Order], user: &User) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| o.customer_name == user.name && Some(&o.customer_phone) == user.phone.as_ref())
        .cloned()
        .collect()
}

pub fn dashboard(orders: &[Order], offset: FixedOffset) -> Dashboard {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut pending = 0;
    let mut completed = 0;
    let mut revenue = 0.0;

    for order in orders {
        match order.status {
            OrderStatus::Pending => pending += 1,
            OrderStatus::Completed => {
                completed += 1;
                revenue += order.total;
                let day = order.created_at.with_timezone(&offset).date_naive();
                *by_day.entry(day).or_default() += order.total;
            }
            OrderStatus::Cancelled => {}
        }
    }

    let skip = by_day.len().saturating_sub(7);
    let daily_sales = by_day
        .into_iter()
        .skip(skip)
        .map(|(date, sales)| DailySales { date, sales })
        .collect();

    Dashboard { pending, completed, revenue, daily_sales }
}

/// Distinct categories in first-seen order.
pub fn categories(menu: &[MenuItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in menu {
        if !seen.contains(&item.category) {
            seen.push(item.category.clone());
        }
    }
    seen
}

/// Case-insensitive match on name or category, optionally limited to one category.
pub fn filter_menu<'a>(menu: &'a [MenuItem], query: &str, category: Option<&str>) -> Vec<&'a MenuItem> {
    let query = query.to_lowercase();
    menu.iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&query) || item.category.to_lowercase().contains(&query)
        })
        .filter(|item| category.is_none_or(|c| item.category == c))
        .collect()
}
