//! # Reference Table
//!
//! The two-level rate table: country → region → ordered components.
//!
//! ## Ordering
//!
//! Countries and regions keep the order in which they appear in the source
//! document. Lookup is first-match, so this order is observable behaviour:
//! if two countries define a region with the same name, the one listed
//! first wins when no country hint is given. Entries are therefore held in
//! vectors and deserialized through an order-preserving visitor rather than
//! a `BTreeMap`, which would sort the keys.
//!
//! ## Validation
//!
//! Every constructor validates: keys must be non-blank and every rate must
//! be a finite, non-negative fraction. A table that exists is valid.
//!
//! ## File format
//!
//! YAML (and therefore JSON):
//!
//! ```yaml
//! Canada:
//!   Quebec:
//!     - { name: GST, rate: 0.05 }
//!     - { name: QST, rate: 0.09975 }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::TableError;
use crate::model::{Region, TaxComponent};

/// Rate table compiled into the binary, used when no table file is configured.
const BUILTIN_TABLE: &str = include_str!("../data/tax_rates.yaml");

/// One country and its regions, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    name: String,
    regions: Vec<(String, Region)>,
}

impl Country {
    /// Country key as stored.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regions in table order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, &Region)> {
        self.regions.iter().map(|(name, region)| (name.as_str(), region))
    }

    /// Number of regions defined for this country.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

/// Immutable, validated country → region → components table.
///
/// Shared by reference across calculations; it is never mutated after
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    countries: Vec<Country>,
}

impl ReferenceTable {
    /// Start building a table in code.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Parse and validate a YAML or JSON table document.
    pub fn from_yaml_str(source: &str) -> Result<Self, TableError> {
        let raw: OrderedMap<OrderedMap<Region>> = serde_yaml::from_str(source)?;
        let mut builder = Self::builder();
        for (country, regions) in raw.0 {
            builder = builder.country(country);
            for (region, components) in regions.0 {
                builder.push_region(region, components);
            }
        }
        builder.build()
    }

    /// Read, parse and validate a table file.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let source = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_yaml_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            countries = table.country_count(),
            regions = table.region_count(),
            "loaded tax table"
        );
        Ok(table)
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_yaml_str(BUILTIN_TABLE)
    }

    /// Countries in table order.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Number of countries.
    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Number of regions across all countries.
    pub fn region_count(&self) -> usize {
        self.countries.iter().map(Country::region_count).sum()
    }

    /// Whether the table defines no countries.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Incremental, order-preserving table construction.
///
/// Regions are appended to the most recently opened country. Validation is
/// deferred to [`TableBuilder::build`].
#[derive(Debug, Default)]
pub struct TableBuilder {
    countries: Vec<Country>,
}

impl TableBuilder {
    /// Open a new country. Subsequent regions are added to it.
    pub fn country(mut self, name: impl Into<String>) -> Self {
        self.countries.push(Country {
            name: name.into(),
            regions: Vec::new(),
        });
        self
    }

    /// Add a region to the current country, opening an unnamed one if none
    /// has been opened yet (which then fails validation).
    pub fn region(mut self, name: impl Into<String>, components: Vec<TaxComponent>) -> Self {
        self.push_region(name, Region::new(components));
        self
    }

    fn push_region(&mut self, name: impl Into<String>, region: Region) {
        if self.countries.is_empty() {
            self.countries.push(Country {
                name: String::new(),
                regions: Vec::new(),
            });
        }
        if let Some(country) = self.countries.last_mut() {
            country.regions.push((name.into(), region));
        }
    }

    /// Validate and freeze the table.
    pub fn build(self) -> Result<ReferenceTable, TableError> {
        for country in &self.countries {
            if country.name.trim().is_empty() {
                return Err(TableError::EmptyCountry);
            }
            for (region_name, region) in &country.regions {
                if region_name.trim().is_empty() {
                    return Err(TableError::EmptyRegion {
                        country: country.name.clone(),
                    });
                }
                for component in region.components() {
                    if !component.rate.is_finite() || component.rate < 0.0 {
                        return Err(TableError::InvalidRate {
                            country: country.name.clone(),
                            region: region_name.clone(),
                            component: component.name.clone(),
                            rate: component.rate,
                        });
                    }
                }
            }
        }
        Ok(ReferenceTable {
            countries: self.countries,
        })
    }
}

/// A string-keyed mapping that keeps document order.
struct OrderedMap<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of names to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
