//! Human-use filtering and the two interactive selection filters.
//!
//! Filtering narrows the table, it never mutates rows. The human-use filter
//! is a case-insensitive substring match against the dosage-form keyword
//! vocabulary; the selection filters are exact equality on customer and
//! ingredient with an "All" sentinel meaning no filter.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{TradeRecord, TradeTable, ALL_SENTINEL, HUMAN_USE_KEYWORDS};

/// True if the product name marks a human-use dosage form.
///
/// Substring match, not tokenized: "EXTABLETX" matches TABLET. A missing
/// name matches nothing.
pub fn is_human_use(product_name: Option<&str>) -> bool {
    let Some(name) = product_name else {
        return false;
    };
    let upper = name.to_uppercase();
    HUMAN_USE_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Narrow the table to human-use rows.
pub fn human_use(table: &TradeTable) -> TradeTable {
    narrow(table, |r| is_human_use(r.product_name.as_deref()))
}

fn narrow(table: &TradeTable, keep: impl Fn(&TradeRecord) -> bool) -> TradeTable {
    TradeTable {
        sheet_name: table.sheet_name.clone(),
        layout: table.layout.clone(),
        records: table.records.iter().filter(|r| keep(r)).cloned().collect(),
    }
}

// =============================================================================
// Interactive Selection
// =============================================================================

/// The two optional single-value filters, applied in sequence.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Exact `Foreign Company` match, or `None` for all customers.
    pub customer: Option<String>,
    /// Exact `API` match, or `None` for all ingredients.
    pub ingredient: Option<String>,
}

impl Selection {
    /// Build a selection from widget values, treating the "All" sentinel
    /// the same as an absent value.
    pub fn from_widgets(customer: Option<String>, ingredient: Option<String>) -> Self {
        let unset = |v: Option<String>| v.filter(|s| s != ALL_SENTINEL);
        Self {
            customer: unset(customer),
            ingredient: unset(ingredient),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.customer.is_none() && self.ingredient.is_none()
    }

    /// Apply both filters to the table. Unset filters are no-ops.
    pub fn apply(&self, table: &TradeTable) -> TradeTable {
        let mut result = narrow(table, |r| match &self.customer {
            Some(customer) => r.foreign_company.as_deref() == Some(customer.as_str()),
            None => true,
        });
        if let Some(ingredient) = &self.ingredient {
            result = narrow(&result, |r| r.api == *ingredient);
        }
        result
    }
}

// =============================================================================
// Filter Option Lists
// =============================================================================

/// The selectable values for the two widgets: sorted distinct non-missing
/// values of the human-use table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChoices {
    pub customers: Vec<String>,
    pub ingredients: Vec<String>,
}

impl FilterChoices {
    pub fn from_table(table: &TradeTable) -> Self {
        let customers: BTreeSet<String> = table
            .records
            .iter()
            .filter_map(|r| r.foreign_company.clone())
            .collect();
        let ingredients: BTreeSet<String> =
            table.records.iter().map(|r| r.api.clone()).collect();
        Self {
            customers: customers.into_iter().collect(),
            ingredients: ingredients.into_iter().collect(),
        }
    }
}
