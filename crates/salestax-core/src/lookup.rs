//! # Jurisdiction Lookup
//!
//! Linear, first-match scan of the [`ReferenceTable`].
//!
//! The search space is the hinted country if a hint is given, otherwise
//! every country in table order. Within each country regions are compared
//! in table order. The first region whose key equals the query ignoring
//! case wins and the scan stops. Absence of a match is an ordinary outcome
//! and is reported as `None`.

use crate::model::{RegionMatch, ResolvedInput};
use crate::table::ReferenceTable;

/// Find the first region named `region_name`, optionally restricted to the
/// country `country_hint`. Both names are compared case-insensitively.
pub fn find_region<'t>(
    table: &'t ReferenceTable,
    region_name: &str,
    country_hint: Option<&str>,
) -> Option<RegionMatch<'t>> {
    table
        .countries()
        .iter()
        .filter(|country| country_hint.map_or(true, |hint| eq_ignore_case(country.name(), hint)))
        .find_map(|country| {
            country
                .regions()
                .find(|(name, _)| eq_ignore_case(name, region_name))
                .map(|(region, components)| RegionMatch {
                    country: country.name(),
                    region,
                    components,
                })
        })
}

/// Look up the jurisdiction named by a resolved input.
pub fn lookup<'t>(table: &'t ReferenceTable, input: &ResolvedInput) -> Option<RegionMatch<'t>> {
    let found = find_region(table, input.region_name(), input.country_hint());
    match &found {
        Some(m) => tracing::debug!(
            query = input.region_name(),
            country = m.country,
            region = m.region,
            "jurisdiction resolved"
        ),
        None => tracing::debug!(
            query = input.region_name(),
            country_hint = ?input.country_hint(),
            "jurisdiction not found"
        ),
    }
    found
}

/// Unicode-aware case-insensitive equality without allocating.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
