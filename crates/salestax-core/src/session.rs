//! # Calculation Session — Orchestration State Machine
//!
//! Wires resolver → lookup → calculator and tracks where the pipeline
//! stands after the latest input change.
//!
//! ## States
//!
//! ```text
//!            input change
//!   ┌──────────────────────────────┐
//!   ▼                              │
//! Idle ──resolved──▶ Resolving ──found──▶ Resolved
//!   ▲                    │
//!   │                    └──not found──▶ Unresolved
//!   └── insufficient input (from any state)
//! ```
//!
//! There is no terminal state. Every input change restarts from scratch:
//! the previous state is discarded, never merged, and nothing is cached.
//! `Resolving` is transient; [`Session::update`] always settles in `Idle`,
//! `Resolved` or `Unresolved`.
//!
//! [`evaluate`] is the pure form of one cycle. [`Session`] is a thin
//! reactive shell around it that keeps the settled state and traces
//! transitions.

use serde::Serialize;

use crate::calculator::calculate;
use crate::lookup::lookup;
use crate::model::{CalculationResult, ResolvedInput};
use crate::resolver::{InputResolver, InputSnapshot};
use crate::table::ReferenceTable;

/// A completed calculation and the jurisdiction it used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// The input the calculation ran on.
    pub input: ResolvedInput,
    /// Country key as stored in the table.
    pub country: String,
    /// Region key as stored in the table.
    pub region: String,
    /// The computed breakdown and totals.
    pub result: CalculationResult,
}

/// Where the pipeline stands.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorState {
    /// No usable input.
    Idle,
    /// Input resolved, lookup pending.
    Resolving(ResolvedInput),
    /// Jurisdiction found and tax computed.
    Resolved(Resolution),
    /// Input resolved but no jurisdiction matched.
    Unresolved(ResolvedInput),
}

/// Discriminant of [`CalculatorState`], for logging and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// See [`CalculatorState::Idle`].
    Idle,
    /// See [`CalculatorState::Resolving`].
    Resolving,
    /// See [`CalculatorState::Resolved`].
    Resolved,
    /// See [`CalculatorState::Unresolved`].
    Unresolved,
}

impl StateKind {
    /// Return the string representation of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Unresolved => "unresolved",
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CalculatorState {
    /// The state's discriminant.
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Resolving(_) => StateKind::Resolving,
            Self::Resolved(_) => StateKind::Resolved,
            Self::Unresolved(_) => StateKind::Unresolved,
        }
    }

    /// The resolution, when in `Resolved`.
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    /// Enter the state machine from a raw snapshot: `Resolving` when the
    /// input is sufficient, `Idle` otherwise.
    pub fn from_snapshot(resolver: &InputResolver, snapshot: &InputSnapshot) -> Self {
        match resolver.resolve(snapshot) {
            Some(input) => Self::Resolving(input),
            None => Self::Idle,
        }
    }

    /// Advance a `Resolving` state by running lookup and, on a match, the
    /// calculator. Settled states are returned unchanged.
    pub fn advance(self, table: &ReferenceTable) -> Self {
        let input = match self {
            Self::Resolving(input) => input,
            settled => return settled,
        };
        match lookup(table, &input) {
            Some(found) => {
                let result = calculate(input.amount(), found.components);
                Self::Resolved(Resolution {
                    country: found.country.to_string(),
                    region: found.region.to_string(),
                    result,
                    input,
                })
            }
            None => Self::Unresolved(input),
        }
    }
}

/// Run one full cycle for a snapshot and return the settled state.
pub fn evaluate(
    table: &ReferenceTable,
    resolver: &InputResolver,
    snapshot: &InputSnapshot,
) -> CalculatorState {
    CalculatorState::from_snapshot(resolver, snapshot).advance(table)
}

/// Reactive shell: holds the settled state and recomputes it on every
/// input change.
#[derive(Debug)]
pub struct Session<'a> {
    table: &'a ReferenceTable,
    resolver: &'a InputResolver,
    state: CalculatorState,
}

impl<'a> Session<'a> {
    /// Start a session in `Idle`.
    pub fn new(table: &'a ReferenceTable, resolver: &'a InputResolver) -> Self {
        Self {
            table,
            resolver,
            state: CalculatorState::Idle,
        }
    }

    /// The current settled state.
    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// Replace the input and recompute from scratch.
    pub fn update(&mut self, snapshot: &InputSnapshot) -> &CalculatorState {
        let entered = CalculatorState::from_snapshot(self.resolver, snapshot);
        self.transition(entered);
        if matches!(self.state, CalculatorState::Resolving(_)) {
            let settled = self.state.clone().advance(self.table);
            self.transition(settled);
        }
        &self.state
    }

    fn transition(&mut self, next: CalculatorState) {
        tracing::debug!(
            from = %self.state.kind(),
            to = %next.kind(),
            "session transition"
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaxComponent;
    use crate::settings::Settings;

    fn table() -> ReferenceTable {
        ReferenceTable::builder()
            .country("Canada")
            .region(
                "Quebec",
                vec![TaxComponent::new("GST", 0.05), TaxComponent::new("QST", 0.09975)],
            )
            .region("Ontario", vec![TaxComponent::new("HST", 0.13)])
            .country("United States")
            .region("Oregon", Vec::new())
            .build()
            .unwrap()
    }

    fn resolver() -> InputResolver {
        InputResolver::new(&Settings::default()).unwrap()
    }

    #[test]
    fn evaluate_resolves_free_text() {
        let table = table();
        let state = evaluate(&table, &resolver(), &InputSnapshot::from_text("100 in quebec"));
        let resolution = state.resolution().unwrap();
        assert_eq!(resolution.country, "Canada");
        assert_eq!(resolution.region, "Quebec");
        assert_eq!(resolution.input.region_name(), "quebec");
        assert!((resolution.result.total - 114.975).abs() < 1e-9);
    }

    #[test]
    fn evaluate_not_found_is_unresolved() {
        let table = table();
        let state = evaluate(&table, &resolver(), &InputSnapshot::from_text("100 in Narnia"));
        assert_eq!(state.kind(), StateKind::Unresolved);
        match state {
            CalculatorState::Unresolved(input) => assert_eq!(input.region_name(), "Narnia"),
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_insufficient_input_is_idle() {
        let table = table();
        let resolver = resolver();
        for text in ["", "abc", "-5", "0 in Quebec", "Quebec"] {
            let state = evaluate(&table, &resolver, &InputSnapshot::from_text(text));
            assert_eq!(state, CalculatorState::Idle, "text {text:?}");
        }
    }

    #[test]
    fn evaluate_zero_tax_region() {
        let table = table();
        let state = evaluate(&table, &resolver(), &InputSnapshot::from_text("40 in oregon"));
        let resolution = state.resolution().unwrap();
        assert_eq!(resolution.result.total_tax, 0.0);
        assert!(!resolution.result.total_tax.is_sign_negative());
        assert_eq!(resolution.result.total, 40.0);
    }

    #[test]
    fn advance_leaves_settled_states_alone() {
        let table = table();
        assert_eq!(CalculatorState::Idle.advance(&table), CalculatorState::Idle);
        let input = ResolvedInput::new(1.0, "Narnia", None).unwrap();
        let unresolved = CalculatorState::Unresolved(input);
        assert_eq!(unresolved.clone().advance(&table), unresolved);
    }

    #[test]
    fn session_recomputes_on_every_change() {
        let table = table();
        let resolver = resolver();
        let mut session = Session::new(&table, &resolver);
        assert_eq!(session.state().kind(), StateKind::Idle);

        let kind = session.update(&InputSnapshot::from_text("100 in Ontario")).kind();
        assert_eq!(kind, StateKind::Resolved);

        let kind = session.update(&InputSnapshot::from_text("100 in Narnia")).kind();
        assert_eq!(kind, StateKind::Unresolved);

        // Insufficient input clears the previous result.
        let kind = session.update(&InputSnapshot::from_text("abc")).kind();
        assert_eq!(kind, StateKind::Idle);

        let state = session.update(&InputSnapshot::from_text("10 in Quebec"));
        assert_eq!(state.resolution().unwrap().region, "Quebec");
    }

    #[test]
    fn session_matches_pure_evaluation() {
        let table = table();
        let resolver = resolver();
        let mut session = Session::new(&table, &resolver);
        let snapshot = InputSnapshot::default()
            .with_amount("250")
            .with_region("QUEBEC");
        let via_session = session.update(&snapshot).clone();
        assert_eq!(via_session, evaluate(&table, &resolver, &snapshot));
    }

    #[test]
    fn state_kind_display() {
        assert_eq!(StateKind::Idle.to_string(), "idle");
        assert_eq!(StateKind::Resolving.to_string(), "resolving");
        assert_eq!(StateKind::Resolved.to_string(), "resolved");
        assert_eq!(StateKind::Unresolved.to_string(), "unresolved");
    }
}
