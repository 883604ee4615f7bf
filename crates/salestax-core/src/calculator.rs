//! # Tax Calculator
//!
//! Applies every component of a region to an amount.
//!
//! ## Determinism
//!
//! The calculator is a pure function of `(amount, components)`. Components
//! are visited in table order and summed left to right, so identical inputs
//! produce bit-identical results. No rounding is applied; the presenter
//! formats to two decimals.

use crate::model::{CalculationResult, Region, TaxLine};

/// Compute the per-component breakdown, the tax sum and the grand total.
///
/// An empty region is valid and yields zero tax.
pub fn calculate(amount: f64, region: &Region) -> CalculationResult {
    let breakdown: Vec<TaxLine> = region
        .components()
        .iter()
        .map(|component| TaxLine {
            name: component.name.clone(),
            amount: amount * component.rate,
        })
        .collect();

    // An empty f64 sum is -0.0; folding from +0.0 keeps zero tax positive.
    let total_tax = breakdown.iter().fold(0.0, |acc, line| acc + line.amount);

    CalculationResult {
        amount,
        total_tax,
        total: amount + total_tax,
        breakdown,
    }
}
