//! # Input Resolver
//!
//! Turns an [`InputSnapshot`] into a [`ResolvedInput`] by running an
//! ordered chain of [`ResolutionStrategy`]s:
//!
//! 1. [`StructuredArguments`]: explicit `amount`, `region` and `country`
//!    arguments.
//! 2. [`FreeText`]: pattern extraction from the search text. Skipped once a
//!    region has been decided.
//! 3. [`ConfiguredDefaults`]: default region and country hint, applied only
//!    when the amount came from a structured argument and nothing else
//!    named a region.
//!
//! Each strategy either decides a field or leaves it open. A field is owned
//! by the first strategy that decides it; later strategies never overwrite
//! it. After the chain runs, the decisions are validated into a
//! `ResolvedInput` (positive finite amount, non-blank region) or rejected
//! as insufficient input.
//!
//! ## Free-text pattern
//!
//! ```text
//! ([0-9]+(\.[0-9]+)?) \s* (dollars|in|for) \s* (.+)
//! ```
//!
//! Case-insensitive and unanchored, so `"tax for 50 in ON"` yields 50 and
//! `"ON"`. Everything after the first separator following the first number
//! is the region name, trimmed. Region names that themselves contain a
//! separator word are not special-cased.

use regex::Regex;

use crate::error::SalesTaxError;
use crate::model::{non_blank, ResolvedInput};
use crate::settings::Settings;

const FREE_TEXT_PATTERN: &str = r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(?:dollars|in|for)\s*(.+)";

/// All raw inputs at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Free search text, e.g. `"100 in Quebec"`.
    pub text: String,
    /// Structured amount argument, unparsed.
    pub amount: Option<String>,
    /// Structured region argument.
    pub region: Option<String>,
    /// Structured country hint.
    pub country: Option<String>,
}

impl InputSnapshot {
    /// Snapshot holding only search text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Builder: set the structured amount argument.
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Builder: set the structured region argument.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder: set the structured country hint.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Which strategy decided a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Structured arguments.
    Arguments,
    /// Free-text extraction.
    FreeText,
    /// Configured defaults.
    Defaults,
}

impl Source {
    /// Return the string representation of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arguments => "arguments",
            Self::FreeText => "free_text",
            Self::Defaults => "defaults",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the strategy that decided it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decided<T> {
    /// The decided value.
    pub value: T,
    /// Where it came from.
    pub source: Source,
}

/// Field-by-field outcome of running (part of) the strategy chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decisions {
    /// Parsed amount. Not yet checked for positivity.
    pub amount: Option<Decided<f64>>,
    /// Region name, trimmed and non-blank.
    pub region: Option<Decided<String>>,
    /// Country hint, trimmed and non-blank.
    pub country: Option<Decided<String>>,
}

impl Decisions {
    /// Fill every still-open field from `later`. Decided fields are kept.
    fn merge(&mut self, later: Decisions) {
        if self.amount.is_none() {
            self.amount = later.amount;
        }
        if self.region.is_none() {
            self.region = later.region;
        }
        if self.country.is_none() {
            self.country = later.country;
        }
    }

    /// Validate into a [`ResolvedInput`], or `None` for insufficient input.
    pub fn to_resolved(&self) -> Option<ResolvedInput> {
        let amount = self.amount.as_ref()?.value;
        let region = self.region.as_ref()?;
        ResolvedInput::new(
            amount,
            &region.value,
            self.country.as_ref().map(|c| c.value.as_str()),
        )
    }
}

/// One link of the resolution chain.
pub trait ResolutionStrategy: std::fmt::Debug {
    /// Source tag attached to the values this strategy decides.
    fn source(&self) -> Source;

    /// Propose values given the raw snapshot and what earlier strategies
    /// already decided. Fields left `None` mean "no decision".
    fn decide(&self, snapshot: &InputSnapshot, decided: &Decisions) -> Decisions;
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Explicit `amount`, `region` and `country` arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredArguments;

impl ResolutionStrategy for StructuredArguments {
    fn source(&self) -> Source {
        Source::Arguments
    }

    fn decide(&self, snapshot: &InputSnapshot, _decided: &Decisions) -> Decisions {
        let source = self.source();
        Decisions {
            amount: snapshot
                .amount
                .as_deref()
                .and_then(parse_amount)
                .map(|value| Decided { value, source }),
            region: snapshot
                .region
                .as_deref()
                .and_then(non_blank)
                .map(|value| Decided { value, source }),
            country: snapshot
                .country
                .as_deref()
                .and_then(non_blank)
                .map(|value| Decided { value, source }),
        }
    }
}

/// Pattern extraction of `<number> <dollars|in|for> <region>` from the
/// search text.
#[derive(Debug, Clone)]
pub struct FreeText {
    pattern: Regex,
}

impl FreeText {
    /// Compile the extraction pattern.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(FREE_TEXT_PATTERN)?,
        })
    }

    /// Extract `(amount, region)` from `text`.
    ///
    /// Returns `None` when the pattern does not match, when the number does
    /// not fit a finite `f64`, or when the remainder is blank.
    pub fn extract(&self, text: &str) -> Option<(f64, String)> {
        let captures = self.pattern.captures(text)?;
        let amount = parse_amount(captures.get(1)?.as_str())?;
        let region = non_blank(captures.get(2)?.as_str())?;
        Some((amount, region))
    }
}

impl ResolutionStrategy for FreeText {
    fn source(&self) -> Source {
        Source::FreeText
    }

    fn decide(&self, snapshot: &InputSnapshot, decided: &Decisions) -> Decisions {
        if decided.region.is_some() {
            return Decisions::default();
        }
        let source = self.source();
        match self.extract(&snapshot.text) {
            Some((amount, region)) => Decisions {
                amount: Some(Decided {
                    value: amount,
                    source,
                }),
                region: Some(Decided {
                    value: region,
                    source,
                }),
                country: None,
            },
            None => Decisions::default(),
        }
    }
}

/// Default region and country hint from [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDefaults {
    region: Option<String>,
    country: Option<String>,
}

impl ConfiguredDefaults {
    /// Take the defaults from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            region: settings.default_region.as_deref().and_then(non_blank),
            country: settings.default_country.as_deref().and_then(non_blank),
        }
    }
}

impl ResolutionStrategy for ConfiguredDefaults {
    fn source(&self) -> Source {
        Source::Defaults
    }

    fn decide(&self, _snapshot: &InputSnapshot, decided: &Decisions) -> Decisions {
        let amount_from_arguments = decided
            .amount
            .as_ref()
            .is_some_and(|a| a.source == Source::Arguments);
        if !amount_from_arguments || decided.region.is_some() {
            return Decisions::default();
        }
        let source = self.source();
        Decisions {
            amount: None,
            region: self.region.clone().map(|value| Decided { value, source }),
            country: self.country.clone().map(|value| Decided { value, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// The ordered strategy chain.
#[derive(Debug)]
pub struct InputResolver {
    chain: Vec<Box<dyn ResolutionStrategy>>,
}

impl InputResolver {
    /// Build the standard chain: arguments, free text, configured defaults.
    pub fn new(settings: &Settings) -> Result<Self, SalesTaxError> {
        Ok(Self::with_chain(vec![
            Box::new(StructuredArguments),
            Box::new(FreeText::new()?),
            Box::new(ConfiguredDefaults::from_settings(settings)),
        ]))
    }

    /// Build a resolver from an explicit chain, highest priority first.
    pub fn with_chain(chain: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { chain }
    }

    /// Run the chain and return the per-field decisions.
    pub fn decide(&self, snapshot: &InputSnapshot) -> Decisions {
        let mut decided = Decisions::default();
        for strategy in &self.chain {
            let proposal = strategy.decide(snapshot, &decided);
            decided.merge(proposal);
        }
        decided
    }

    /// Run the chain and validate the result.
    ///
    /// Returns `None` for insufficient input: no usable amount, an amount
    /// that is not greater than zero, or no region.
    pub fn resolve(&self, snapshot: &InputSnapshot) -> Option<ResolvedInput> {
        let decided = self.decide(snapshot);
        let resolved = decided.to_resolved();
        match &resolved {
            Some(input) => tracing::debug!(
                amount = input.amount(),
                region = input.region_name(),
                country_hint = ?input.country_hint(),
                amount_source = ?decided.amount.as_ref().map(|a| a.source),
                region_source = ?decided.region.as_ref().map(|r| r.source),
                "input resolved"
            ),
            None => tracing::trace!(?decided, "insufficient input"),
        }
        resolved
    }
}

/// Parse a numeric argument. Only finite values count as parsed.
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> InputResolver {
        InputResolver::new(&Settings::default()).unwrap()
    }

    fn resolver_with_defaults(region: &str, country: &str) -> InputResolver {
        InputResolver::new(&Settings {
            default_country: Some(country.into()),
            default_region: Some(region.into()),
            tax_table: None,
        })
        .unwrap()
    }

    // -- FreeText --

    #[test]
    fn extracts_amount_and_region() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("100 in Quebec"),
            Some((100.0, "Quebec".to_string()))
        );
    }

    #[test]
    fn skips_leading_words() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("tax for 50 in ON"),
            Some((50.0, "ON".to_string()))
        );
    }

    #[test]
    fn accepts_every_separator_in_any_case() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("20 DOLLARS Ontario"),
            Some((20.0, "Ontario".to_string()))
        );
        assert_eq!(
            free_text.extract("20 For Ontario"),
            Some((20.0, "Ontario".to_string()))
        );
        assert_eq!(
            free_text.extract("20In Ontario"),
            Some((20.0, "Ontario".to_string()))
        );
    }

    #[test]
    fn parses_decimals() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("19.99 in British Columbia  "),
            Some((19.99, "British Columbia".to_string()))
        );
    }

    #[test]
    fn first_number_and_first_separator_win() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("5 in 10 in Quebec"),
            Some((5.0, "10 in Quebec".to_string()))
        );
    }

    #[test]
    fn separator_inside_a_word_is_not_escaped() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(
            free_text.extract("100 Indiana"),
            Some((100.0, "diana".to_string()))
        );
    }

    #[test]
    fn no_match_without_separator_or_number() {
        let free_text = FreeText::new().unwrap();
        assert_eq!(free_text.extract(""), None);
        assert_eq!(free_text.extract("abc"), None);
        assert_eq!(free_text.extract("-5"), None);
        assert_eq!(free_text.extract("in Quebec"), None);
        assert_eq!(free_text.extract("100 in"), None);
        assert_eq!(free_text.extract("100 in    "), None);
    }

    #[test]
    fn oversized_number_is_rejected() {
        let free_text = FreeText::new().unwrap();
        let huge = format!("{} in Quebec", "9".repeat(400));
        assert_eq!(free_text.extract(&huge), None);
    }

    // -- Chain --

    #[test]
    fn free_text_only() {
        let input = resolver()
            .resolve(&InputSnapshot::from_text("100 in Quebec"))
            .unwrap();
        assert_eq!(input.amount(), 100.0);
        assert_eq!(input.region_name(), "Quebec");
        assert_eq!(input.country_hint(), None);
    }

    #[test]
    fn structured_region_skips_free_text() {
        let snapshot = InputSnapshot::from_text("100 in Quebec")
            .with_amount("20")
            .with_region(" Ontario ");
        let decided = resolver().decide(&snapshot);
        assert_eq!(decided.region.as_ref().unwrap().value, "Ontario");
        assert_eq!(decided.region.as_ref().unwrap().source, Source::Arguments);
        assert_eq!(decided.amount.as_ref().unwrap().value, 20.0);
    }

    #[test]
    fn structured_region_without_amount_is_insufficient() {
        let snapshot = InputSnapshot::from_text("100 in Quebec").with_region("Ontario");
        assert!(resolver().resolve(&snapshot).is_none());
    }

    #[test]
    fn structured_amount_beats_free_text_amount() {
        let snapshot = InputSnapshot::from_text("100 in Quebec").with_amount("20");
        let decided = resolver().decide(&snapshot);
        assert_eq!(decided.amount.as_ref().unwrap().value, 20.0);
        assert_eq!(decided.amount.as_ref().unwrap().source, Source::Arguments);
        assert_eq!(decided.region.as_ref().unwrap().source, Source::FreeText);
    }

    #[test]
    fn invalid_structured_amount_falls_through_to_free_text() {
        let snapshot = InputSnapshot::from_text("100 in Quebec").with_amount("abc");
        let input = resolver().resolve(&snapshot).unwrap();
        assert_eq!(input.amount(), 100.0);
    }

    #[test]
    fn structured_amount_uses_defaults() {
        let snapshot = InputSnapshot::default().with_amount("80");
        let input = resolver_with_defaults("Ontario", "Canada")
            .resolve(&snapshot)
            .unwrap();
        assert_eq!(input.amount(), 80.0);
        assert_eq!(input.region_name(), "Ontario");
        assert_eq!(input.country_hint(), Some("Canada"));
    }

    #[test]
    fn structured_country_beats_default_country() {
        let snapshot = InputSnapshot::default()
            .with_amount("80")
            .with_country("United States");
        let input = resolver_with_defaults("Georgia", "Canada")
            .resolve(&snapshot)
            .unwrap();
        assert_eq!(input.region_name(), "Georgia");
        assert_eq!(input.country_hint(), Some("United States"));
    }

    #[test]
    fn defaults_ignored_when_free_text_names_region() {
        let snapshot = InputSnapshot::from_text("100 in Quebec").with_amount("80");
        let input = resolver_with_defaults("Ontario", "Canada")
            .resolve(&snapshot)
            .unwrap();
        assert_eq!(input.region_name(), "Quebec");
        assert_eq!(input.country_hint(), None);
    }

    #[test]
    fn defaults_need_a_structured_amount() {
        let resolver = resolver_with_defaults("Ontario", "Canada");
        assert!(resolver.resolve(&InputSnapshot::default()).is_none());
        assert!(resolver.resolve(&InputSnapshot::from_text("100")).is_none());
        assert!(resolver
            .resolve(&InputSnapshot::default().with_amount("abc"))
            .is_none());
    }

    #[test]
    fn structured_amount_without_defaults_is_insufficient() {
        assert!(resolver()
            .resolve(&InputSnapshot::default().with_amount("80"))
            .is_none());
    }

    #[test]
    fn non_positive_amounts_are_insufficient() {
        let resolver = resolver_with_defaults("Ontario", "Canada");
        for amount in ["-5", "0", "0.0", "NaN", "inf", "abc", ""] {
            let snapshot = InputSnapshot::default().with_amount(amount);
            assert!(resolver.resolve(&snapshot).is_none(), "amount {amount:?}");
        }
        assert!(resolver
            .resolve(&InputSnapshot::from_text("0 in Quebec"))
            .is_none());
    }

    #[test]
    fn empty_text_is_insufficient() {
        assert!(resolver().resolve(&InputSnapshot::default()).is_none());
    }

    #[test]
    fn custom_chain_order_is_respected() {
        let resolver = InputResolver::with_chain(vec![
            Box::new(ConfiguredDefaults::from_settings(&Settings {
                default_country: None,
                default_region: Some("Ontario".into()),
                tax_table: None,
            })),
            Box::new(StructuredArguments),
        ]);
        // Defaults run first and see no amount yet, so they stay silent.
        assert!(resolver
            .resolve(&InputSnapshot::default().with_amount("5"))
            .is_none());
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::Arguments.to_string(), "arguments");
        assert_eq!(Source::FreeText.to_string(), "free_text");
        assert_eq!(Source::Defaults.to_string(), "defaults");
    }
}
