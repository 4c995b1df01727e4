//! Market descriptions assembled from per-culture provider responses.
//!
//! The provider returns one culture per response. A [`MarketDescription`] keeps names of every
//! culture it has been loaded in, and [`MarketDescription::merge`] adds another culture without
//! discarding already-loaded outcomes or mappings.
use std::collections::{BTreeSet, HashMap};

use crate::{
    fetcher::{MappingDto, MarketDescriptionDto, OutcomeDto, VariantDescriptionDto},
    specifiers::VARIANT_SPECIFIER,
};

/// Culture to localized text.
pub type LocalizedNames = HashMap<String, String>;

/// Attribute that marks flex score markets.
pub const FLEX_SCORE_ATTRIBUTE: &str = "is_flex_score";

/// Variant value prefixes of markets whose outcomes are specific to each market occurrence and
/// must be fetched one by one.
const SINGLE_VARIANT_PREFIXES: [&str; 3] = [
    "pre:markettext:",
    "pre:playerprops:",
    "pre:competitorprops:",
];

/// Where the outcomes of a variant market come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantGrouping {
    /// Outcomes are shared between markets and listed in the variant description list.
    VariantList,
    /// Outcomes are specific to `(market id, variant value)` and fetched individually.
    SingleVariant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketDescription {
    id: i64,
    variant: Option<String>,
    names: LocalizedNames,
    groups: Vec<String>,
    outcome_type: Option<String>,
    specifiers: Vec<Specifier>,
    outcomes: Option<Vec<Outcome>>,
    mappings: Option<Vec<Mapping>>,
    attributes: Vec<Attribute>,
    active_mapping: Option<Mapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub name: String,
    /// Declared value type, e.g. `decimal`, `integer`, `string`, `variable_text`.
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    id: String,
    names: LocalizedNames,
}

impl Outcome {
    fn from_dto(culture: &str, dto: OutcomeDto) -> Outcome {
        Outcome {
            id: dto.id,
            names: [(culture.to_owned(), dto.name)].into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name template of the outcome.
    pub fn name(&self, culture: &str) -> Option<&str> {
        self.names.get(culture).map(String::as_str)
    }

    pub fn names(&self) -> &LocalizedNames {
        &self.names
    }
}

/// Translation of a market to a producer-specific market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Producers this mapping applies to.
    pub producer_ids: Vec<u32>,
    pub sport_id: Option<String>,
    /// Producer-specific market id.
    pub market_id: String,
    /// Template for outcome names of the producer market.
    pub sov_template: Option<String>,
    /// Validator expression; `None` means the mapping always applies.
    pub valid_for: Option<String>,
    pub outcome_mappings: Vec<OutcomeMapping>,
}

impl Mapping {
    fn from_dto(culture: &str, dto: MappingDto) -> Mapping {
        Mapping {
            producer_ids: dto.product_ids,
            sport_id: dto.sport_id,
            market_id: dto.market_id,
            sov_template: dto.sov_template,
            valid_for: dto.valid_for,
            outcome_mappings: dto
                .outcome_mappings
                .into_iter()
                .map(|it| OutcomeMapping {
                    outcome_id: it.outcome_id,
                    producer_outcome_id: it.product_outcome_id,
                    producer_outcome_names: it
                        .product_outcome_name
                        .map(|name| [(culture.to_owned(), name)].into())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }

    fn same_mapping(&self, other: &Mapping) -> bool {
        self.market_id == other.market_id
            && self.producer_ids == other.producer_ids
            && self.sport_id == other.sport_id
            && self.valid_for == other.valid_for
    }

    fn merge(&mut self, other: Mapping) {
        for outcome_mapping in other.outcome_mappings {
            match self
                .outcome_mappings
                .iter_mut()
                .find(|it| it.outcome_id == outcome_mapping.outcome_id)
            {
                Some(existing) => existing
                    .producer_outcome_names
                    .extend(outcome_mapping.producer_outcome_names),
                None => self.outcome_mappings.push(outcome_mapping),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeMapping {
    pub outcome_id: String,
    pub producer_outcome_id: String,
    pub producer_outcome_names: LocalizedNames,
}

impl MarketDescription {
    /// Build a description from a single-culture provider response.
    pub fn from_dto(culture: &str, dto: MarketDescriptionDto) -> MarketDescription {
        MarketDescription {
            id: dto.id,
            variant: None,
            names: [(culture.to_owned(), dto.name)].into(),
            groups: dto.groups,
            outcome_type: dto.outcome_type,
            specifiers: dto
                .specifiers
                .unwrap_or_default()
                .into_iter()
                .map(|it| Specifier {
                    name: it.name,
                    kind: it.kind,
                })
                .collect(),
            outcomes: dto.outcomes.map(|outcomes| {
                outcomes
                    .into_iter()
                    .map(|it| Outcome::from_dto(culture, it))
                    .collect()
            }),
            mappings: dto.mappings.map(|mappings| {
                mappings
                    .into_iter()
                    .map(|it| Mapping::from_dto(culture, it))
                    .collect()
            }),
            attributes: dto
                .attributes
                .unwrap_or_default()
                .into_iter()
                .map(|it| Attribute {
                    name: it.name,
                    description: it.description,
                })
                .collect(),
            active_mapping: None,
        }
    }

    /// Add names of another culture.
    ///
    /// Outcomes and mappings are matched by identity and their names are merged; outcomes and
    /// mappings not known yet are appended. Culture-independent data (specifiers, attributes,
    /// groups) is only taken from `other` if missing here.
    pub fn merge(&mut self, other: MarketDescription) {
        self.names.extend(other.names);

        if self.specifiers.is_empty() {
            self.specifiers = other.specifiers;
        }
        if self.attributes.is_empty() {
            self.attributes = other.attributes;
        }
        if self.groups.is_empty() {
            self.groups = other.groups;
        }
        if self.outcome_type.is_none() {
            self.outcome_type = other.outcome_type;
        }

        if let Some(other_outcomes) = other.outcomes {
            merge_outcomes(self.outcomes.get_or_insert_with(Vec::new), other_outcomes);
        }

        if let Some(other_mappings) = other.mappings {
            let mappings = self.mappings.get_or_insert_with(Vec::new);
            for mapping in other_mappings {
                match mappings.iter_mut().find(|it| it.same_mapping(&mapping)) {
                    Some(existing) => existing.merge(mapping),
                    None => mappings.push(mapping),
                }
            }
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Variant value whose outcomes were grafted onto this description, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Name template of the market.
    pub fn name(&self, culture: &str) -> Option<&str> {
        self.names.get(culture).map(String::as_str)
    }

    pub fn names(&self) -> &LocalizedNames {
        &self.names
    }

    /// Cultures this description has been loaded in.
    pub fn cultures(&self) -> BTreeSet<&str> {
        self.names.keys().map(String::as_str).collect()
    }

    pub fn has_cultures<S: AsRef<str>>(&self, cultures: &[S]) -> bool {
        cultures
            .iter()
            .all(|culture| self.names.contains_key(culture.as_ref()))
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn outcome_type(&self) -> Option<&str> {
        self.outcome_type.as_deref()
    }

    pub fn specifiers(&self) -> &[Specifier] {
        &self.specifiers
    }

    pub fn outcomes(&self) -> Option<&[Outcome]> {
        self.outcomes.as_deref()
    }

    pub fn outcome(&self, outcome_id: &str) -> Option<&Outcome> {
        self.outcomes.as_ref()?.iter().find(|it| it.id == outcome_id)
    }

    /// All mappings of the market.
    pub fn mappings(&self) -> Option<&[Mapping]> {
        self.mappings.as_deref()
    }

    /// The mapping selected for the specifiers this description was resolved with.
    pub fn active_mapping(&self) -> Option<&Mapping> {
        self.active_mapping.as_ref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn is_flex_score(&self) -> bool {
        self.attributes
            .iter()
            .any(|it| it.name == FLEX_SCORE_ATTRIBUTE)
    }

    /// Where outcomes for `variant` come from, or `None` if this market has no variants.
    pub fn variant_grouping(&self, variant: &str) -> Option<VariantGrouping> {
        if !self.specifiers.iter().any(|it| it.name == VARIANT_SPECIFIER) {
            return None;
        }
        if SINGLE_VARIANT_PREFIXES
            .iter()
            .any(|prefix| variant.starts_with(prefix))
        {
            Some(VariantGrouping::SingleVariant)
        } else {
            Some(VariantGrouping::VariantList)
        }
    }

    /// Replace outcomes with the ones of `variant`.
    pub(crate) fn with_variant_outcomes(
        mut self,
        variant: &str,
        outcomes: Option<Vec<Outcome>>,
    ) -> MarketDescription {
        self.variant = Some(variant.to_owned());
        self.outcomes = outcomes;
        self
    }

    pub(crate) fn with_active_mapping(mut self, mapping: Option<Mapping>) -> MarketDescription {
        self.active_mapping = mapping;
        self
    }
}

fn merge_outcomes(outcomes: &mut Vec<Outcome>, other: Vec<Outcome>) {
    for outcome in other {
        match outcomes.iter_mut().find(|it| it.id == outcome.id) {
            Some(existing) => existing.names.extend(outcome.names),
            None => outcomes.push(outcome),
        }
    }
}

/// Outcomes shared by all markets that reference the variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDescription {
    id: String,
    outcomes: Vec<Outcome>,
}

impl VariantDescription {
    pub fn from_dto(culture: &str, dto: VariantDescriptionDto) -> VariantDescription {
        VariantDescription {
            id: dto.id,
            outcomes: dto
                .outcomes
                .into_iter()
                .map(|it| Outcome::from_dto(culture, it))
                .collect(),
        }
    }

    pub fn merge(&mut self, other: VariantDescription) {
        merge_outcomes(&mut self.outcomes, other.outcomes);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::{MarketDescription, VariantGrouping};
    use crate::fetcher::{
        MappingDto, MarketDescriptionDto, OutcomeDto, OutcomeMappingDto, SpecifierDto,
    };

    fn outcome(id: &str, name: &str) -> OutcomeDto {
        OutcomeDto {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    fn market(name: &str, outcomes: Vec<OutcomeDto>, mapping_name: &str) -> MarketDescriptionDto {
        MarketDescriptionDto {
            id: 1,
            name: name.into(),
            groups: vec!["all".into()],
            outcome_type: None,
            specifiers: Some(vec![SpecifierDto {
                name: "variant".into(),
                kind: "variable_text".into(),
                description: None,
            }]),
            outcomes: Some(outcomes),
            mappings: Some(vec![MappingDto {
                product_ids: vec![1, 4],
                sport_id: None,
                market_id: "10".into(),
                sov_template: None,
                valid_for: None,
                outcome_mappings: vec![OutcomeMappingDto {
                    outcome_id: "1".into(),
                    product_outcome_id: "100".into(),
                    product_outcome_name: Some(mapping_name.into()),
                }],
            }]),
            attributes: None,
        }
    }

    #[test]
    fn merges_cultures_without_losing_outcomes() {
        let mut description = MarketDescription::from_dto(
            "en",
            market("1x2", vec![outcome("1", "home"), outcome("2", "draw")], "home"),
        );
        description.merge(MarketDescription::from_dto(
            "de",
            market(
                "1x2",
                vec![outcome("1", "heim"), outcome("3", "auswärts")],
                "heim",
            ),
        ));

        assert!(description.has_cultures(&["en", "de"]));
        assert!(!description.has_cultures(&["en", "fr"]));

        let outcomes = description.outcomes().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].name("en"), Some("home"));
        assert_eq!(outcomes[0].name("de"), Some("heim"));
        assert_eq!(outcomes[1].name("de"), None);
        assert_eq!(outcomes[2].name("de"), Some("auswärts"));

        let mappings = description.mappings().unwrap();
        assert_eq!(mappings.len(), 1);
        let names = &mappings[0].outcome_mappings[0].producer_outcome_names;
        assert_eq!(names["en"], "home");
        assert_eq!(names["de"], "heim");
    }

    #[test]
    fn merge_keeps_existing_outcomes_when_other_has_none() {
        let mut description =
            MarketDescription::from_dto("en", market("1x2", vec![outcome("1", "home")], "home"));
        let mut other = market("1x2", vec![], "heim");
        other.outcomes = None;
        description.merge(MarketDescription::from_dto("de", other));

        assert_eq!(description.outcomes().unwrap().len(), 1);
        assert_eq!(description.name("de"), Some("1x2"));
    }

    #[test]
    fn variant_grouping() {
        let description =
            MarketDescription::from_dto("en", market("Correct score", vec![], "home"));
        assert_eq!(
            description.variant_grouping("sr:correct_score:bestof:12"),
            Some(VariantGrouping::VariantList)
        );
        assert_eq!(
            description.variant_grouping("pre:markettext:123"),
            Some(VariantGrouping::SingleVariant)
        );
        assert_eq!(
            description.variant_grouping("pre:playerprops:35432179:608000"),
            Some(VariantGrouping::SingleVariant)
        );

        let mut invariant = market("1x2", vec![], "home");
        invariant.specifiers = None;
        let invariant = MarketDescription::from_dto("en", invariant);
        assert_eq!(invariant.variant_grouping("sr:correct_score:bestof:12"), None);
    }
}
