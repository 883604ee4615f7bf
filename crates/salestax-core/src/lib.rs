//! # salestax-core — Sales Tax Resolution and Calculation
//!
//! Parses a request naming an amount and a jurisdiction, finds the
//! jurisdiction's tax components in a static country → region table, and
//! computes the per-component breakdown and totals.
//!
//! ## Pipeline
//!
//! ```text
//! InputSnapshot ──▶ InputResolver ──▶ lookup ──▶ calculate ──▶ CalculatorState
//!                  (arguments →        (first       (Σ amount·rate)
//!                   free text →         match,
//!                   defaults)           any case)
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Pure cycles.** Each input change is evaluated from scratch by
//!    [`session::evaluate`]; nothing is cached or merged between cycles.
//!
//! 2. **Ordered strategy chain.** Input sources are explicit
//!    [`resolver::ResolutionStrategy`] links, each deciding a field or
//!    passing, rather than nested conditionals.
//!
//! 3. **Table order is behaviour.** The [`table::ReferenceTable`] keeps
//!    document order and lookup is first-match.
//!
//! 4. **No-result is not an error.** Insufficient input and unknown
//!    jurisdictions are states, not `Err`s. Errors are reserved for
//!    loading tables and settings.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No rounding in the core; formatting belongs to the presenter.

pub mod calculator;
pub mod error;
pub mod lookup;
pub mod model;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod table;

// Re-export primary types for ergonomic imports.
pub use calculator::calculate;
pub use error::{ConfigError, SalesTaxError, TableError};
pub use lookup::{find_region, lookup};
pub use model::{CalculationResult, Region, RegionMatch, ResolvedInput, TaxComponent, TaxLine};
pub use resolver::{InputResolver, InputSnapshot, ResolutionStrategy, Source};
pub use session::{evaluate, CalculatorState, Resolution, Session, StateKind};
pub use settings::Settings;
pub use table::{Country, ReferenceTable};
