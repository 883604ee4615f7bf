//! # Data Model
//!
//! Value types that flow through the pipeline. Everything here is an
//! immutable record: the resolver produces a [`ResolvedInput`], the lookup
//! produces a [`RegionMatch`] borrowing from the table, and the calculator
//! produces a fresh [`CalculationResult`] on every cycle.
//!
//! Rates are fractions (`0.05` is 5%). Amounts are plain `f64` and are
//! never rounded here; two-decimal formatting happens in the presenter.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A single named tax rate, e.g. `GST` at `0.05`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxComponent {
    /// Display name of the component.
    pub name: String,
    /// Rate as a fraction. Never negative in a validated table.
    pub rate: f64,
}

impl TaxComponent {
    /// Create a component.
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// The ordered tax components that apply in one region.
///
/// Order is kept for the breakdown; it has no effect on totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(Vec<TaxComponent>);

impl Region {
    /// Create a region from its components.
    pub fn new(components: Vec<TaxComponent>) -> Self {
        Self(components)
    }

    /// The components in table order.
    pub fn components(&self) -> &[TaxComponent] {
        &self.0
    }

    /// Whether the region levies no tax at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all component rates. Zero for an empty region.
    pub fn combined_rate(&self) -> f64 {
        self.0.iter().fold(0.0, |acc, c| acc + c.rate)
    }
}

impl From<Vec<TaxComponent>> for Region {
    fn from(components: Vec<TaxComponent>) -> Self {
        Self(components)
    }
}

// ---------------------------------------------------------------------------
// Pipeline records
// ---------------------------------------------------------------------------

/// Input that is complete enough to look up and calculate.
///
/// Only constructible through [`ResolvedInput::new`], which enforces a
/// finite positive amount and a non-empty region name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInput {
    amount: f64,
    region_name: String,
    country_hint: Option<String>,
}

impl ResolvedInput {
    /// Validate and build a resolved input.
    ///
    /// Returns `None` when the amount is not a finite number greater than
    /// zero or when the region name is blank. The region name and hint are
    /// trimmed; a blank hint is dropped.
    pub fn new(amount: f64, region_name: &str, country_hint: Option<&str>) -> Option<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        Some(Self {
            amount,
            region_name: non_blank(region_name)?,
            country_hint: country_hint.and_then(non_blank),
        })
    }

    /// The pre-tax amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The region name as the user supplied it.
    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    /// The country the lookup is restricted to, if any.
    pub fn country_hint(&self) -> Option<&str> {
        self.country_hint.as_deref()
    }
}

/// Trim `raw`, treating an all-whitespace string as absent.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A successful jurisdiction lookup.
///
/// Keys are reported with the spelling stored in the table, not the
/// spelling of the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMatch<'t> {
    /// Country key as stored.
    pub country: &'t str,
    /// Region key as stored.
    pub region: &'t str,
    /// The region's components.
    pub components: &'t Region,
}

/// Tax owed for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Component name.
    pub name: String,
    /// `amount * rate`, unrounded.
    pub amount: f64,
}

/// Outcome of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The pre-tax amount the calculation ran on.
    pub amount: f64,
    /// Sum of all breakdown amounts.
    pub total_tax: f64,
    /// `amount + total_tax`.
    pub total: f64,
    /// Per-component amounts in table order.
    pub breakdown: Vec<TaxLine>,
}

impl CalculationResult {
    /// Combined rate actually applied, as a fraction of the amount.
    pub fn effective_rate(&self) -> f64 {
        if self.amount == 0.0 {
            0.0
        } else {
            self.total_tax / self.amount
        }
    }
}
