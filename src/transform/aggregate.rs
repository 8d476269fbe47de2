//! Top-N groupby/sum rankings and display formatting.
//!
//! Five independent read-only computations over the filtered table. Each
//! groups by one key column, sums one measure, and keeps the largest N
//! groups. Rows with a missing group key are dropped from that grouping
//! only. Order among exact ties is implementation-defined (the groups
//! accumulate in a hash map); callers must not rely on it.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::{TradeRecord, TradeTable};

/// Ranked products and customers keep the 10 largest groups.
pub const TOP_PRODUCTS: usize = 10;
pub const TOP_CUSTOMERS: usize = 10;
/// Ranked ingredients keep the 5 largest groups.
pub const TOP_INGREDIENTS: usize = 5;

/// One (group key, summed measure) pair of a ranking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankRow {
    pub key: String,
    pub total: f64,
}

/// Group records by `key`, sum `measure` per group, and keep the `n` largest
/// groups sorted descending by their sum.
pub fn top_n<K, M>(records: &[TradeRecord], key: K, measure: M, n: usize) -> Vec<RankRow>
where
    K: for<'r> Fn(&'r TradeRecord) -> Option<&'r str>,
    M: Fn(&TradeRecord) -> f64,
{
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        if let Some(group) = key(record) {
            *totals.entry(group).or_insert(0.0) += measure(record);
        }
    }

    let mut rows: Vec<RankRow> = totals
        .into_iter()
        .map(|(key, total)| RankRow {
            key: key.to_string(),
            total,
        })
        .collect();
    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

// =============================================================================
// Trade Report
// =============================================================================

/// The five rankings rendered for one filtered table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReport {
    /// Top 10 products by summed USD value.
    pub products_by_value: Vec<RankRow>,
    /// Top 10 products by summed quantity.
    pub products_by_quantity: Vec<RankRow>,
    /// Top 5 ingredients by summed USD value.
    pub ingredients_by_value: Vec<RankRow>,
    /// Top 5 ingredients by summed quantity.
    pub ingredients_by_quantity: Vec<RankRow>,
    /// Top 10 customers by summed USD value.
    pub customers_by_value: Vec<RankRow>,
}

impl TradeReport {
    /// Compute all five rankings. An empty table yields empty rankings,
    /// never an error.
    pub fn build(table: &TradeTable) -> Self {
        // fn items, not closures: the key extractors must be higher-ranked
        // over the record lifetime to satisfy the bound on `top_n`.
        fn product(r: &TradeRecord) -> Option<&str> {
            r.product_name.as_deref()
        }
        fn customer(r: &TradeRecord) -> Option<&str> {
            r.foreign_company.as_deref()
        }
        fn ingredient(r: &TradeRecord) -> Option<&str> {
            Some(r.api.as_str())
        }

        let records = &table.records;
        let usd = |r: &TradeRecord| r.fob_usd;
        let qty = |r: &TradeRecord| r.quantity;

        Self {
            products_by_value: top_n(records, product, usd, TOP_PRODUCTS),
            products_by_quantity: top_n(records, product, qty, TOP_PRODUCTS),
            ingredients_by_value: top_n(records, ingredient, usd, TOP_INGREDIENTS),
            ingredients_by_quantity: top_n(records, ingredient, qty, TOP_INGREDIENTS),
            customers_by_value: top_n(records, customer, usd, TOP_CUSTOMERS),
        }
    }
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Format a USD total as currency: `$1,234.56`.
pub fn format_usd(v: f64) -> String {
    format!("${}", format_grouped(v, 2))
}

/// Format a quantity total as a grouped integer: `1,234`.
pub fn format_count(v: f64) -> String {
    format_grouped(v, 0)
}

/// Fixed-point rendering with thousands separators.
fn format_grouped(v: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, v);
    let (sign, rest) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnLayout;
    use serde_json::Map;
    use std::collections::HashSet;

    fn record(product: &str, company: &str, qty: f64, usd: f64) -> TradeRecord {
        TradeRecord {
            product_name: Some(product.to_string()),
            foreign_company: Some(company.to_string()),
            quantity: qty,
            fob_inr: 0.0,
            item_rate_inr: 0.0,
            fob_usd: usd,
            api: product.split([' ', '-']).next().unwrap_or("").to_string(),
            raw: Map::new(),
        }
    }

    fn table(records: Vec<TradeRecord>) -> TradeTable {
        TradeTable {
            sheet_name: "Sheet1".to_string(),
            layout: ColumnLayout::resolve(vec!["Product Name".to_string()]),
            records,
        }
    }

    #[test]
    fn test_groups_are_summed() {
        let rows = vec![
            record("A TABLET", "ACME", 10.0, 5.0),
            record("A TABLET", "BETA", 20.0, 7.0),
            record("B TABLET", "ACME", 1.0, 100.0),
        ];
        let ranked = top_n(&rows, |r: &TradeRecord| r.product_name.as_deref(), |r| r.fob_usd, 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, "B TABLET");
        assert_eq!(ranked[0].total, 100.0);
        assert_eq!(ranked[1].total, 12.0);
    }

    #[test]
    fn test_at_most_n_rows_descending() {
        let rows: Vec<TradeRecord> = (0..20)
            .map(|i| record(&format!("P{i} TABLET"), "ACME", 1.0, i as f64))
            .collect();
        let ranked = top_n(&rows, |r: &TradeRecord| r.product_name.as_deref(), |r| r.fob_usd, 10);

        assert_eq!(ranked.len(), 10);
        assert!(ranked.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(ranked[0].total, 19.0);
    }

    #[test]
    fn test_top_n_never_exceeds_full_sum() {
        let rows: Vec<TradeRecord> = (0..8)
            .map(|i| record(&format!("P{i} TABLET"), "ACME", 1.0, (i * 3) as f64))
            .collect();
        let full_sum: f64 = rows.iter().map(|r| r.fob_usd).sum();
        let ranked = top_n(&rows, |r: &TradeRecord| r.product_name.as_deref(), |r| r.fob_usd, 5);
        let top_sum: f64 = ranked.iter().map(|r| r.total).sum();
        assert!(top_sum <= full_sum);
    }

    #[test]
    fn test_missing_keys_dropped_from_grouping() {
        let mut anon = record("X TABLET", "ACME", 1.0, 10.0);
        anon.foreign_company = None;
        let rows = vec![anon, record("Y TABLET", "BETA", 1.0, 5.0)];

        let ranked = top_n(&rows, |r: &TradeRecord| r.foreign_company.as_deref(), |r| r.fob_usd, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "BETA");
    }

    #[test]
    fn test_tie_membership_not_order() {
        // Exact ties: only the set of tied keys is guaranteed.
        let rows = vec![
            record("A TABLET", "ACME", 1.0, 5.0),
            record("B TABLET", "ACME", 1.0, 5.0),
            record("C TABLET", "ACME", 1.0, 5.0),
        ];
        let ranked = top_n(&rows, |r: &TradeRecord| r.product_name.as_deref(), |r| r.fob_usd, 10);
        let keys: HashSet<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            HashSet::from(["A TABLET", "B TABLET", "C TABLET"])
        );
    }

    #[test]
    fn test_empty_table_yields_empty_report() {
        let report = TradeReport::build(&table(vec![]));
        assert!(report.products_by_value.is_empty());
        assert!(report.customers_by_value.is_empty());
    }

    #[test]
    fn test_build_aggregates_all_five_rankings() {
        let mut anon = record("A-500 TABLET", "ACME", 2.0, 3.0);
        anon.foreign_company = None;
        let rows = vec![
            anon,
            record("A-500 TABLET", "BETA", 1.0, 4.0),
            record("B CAPSULE", "BETA", 5.0, 1.0),
        ];
        let report = TradeReport::build(&table(rows));

        assert_eq!(report.products_by_value[0].key, "A-500 TABLET");
        assert_eq!(report.products_by_value[0].total, 7.0);
        assert_eq!(report.products_by_quantity[0].key, "B CAPSULE");
        assert_eq!(report.ingredients_by_value[0].key, "A");
        assert_eq!(report.ingredients_by_quantity[0].key, "B");
        // The anonymous row is dropped from the customer grouping only.
        assert_eq!(report.customers_by_value.len(), 1);
        assert_eq!(report.customers_by_value[0].key, "BETA");
        assert_eq!(report.customers_by_value[0].total, 5.0);
    }

    #[test]
    fn test_report_sizes() {
        let rows: Vec<TradeRecord> = (0..30)
            .map(|i| record(&format!("P{i}-X TABLET"), &format!("C{i}"), 1.0, i as f64))
            .collect();
        let report = TradeReport::build(&table(rows));

        assert_eq!(report.products_by_value.len(), 10);
        assert_eq!(report.products_by_quantity.len(), 10);
        assert_eq!(report.ingredients_by_value.len(), 5);
        assert_eq!(report.ingredients_by_quantity.len(), 5);
        assert_eq!(report.customers_by_value.len(), 10);
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.9), "$999.90");
    }

    #[test]
    fn test_count_formatting() {
        assert_eq!(format_count(1234.0), "1,234");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1000000.0), "1,000,000");
        assert_eq!(format_count(12.4), "12");
    }
}
