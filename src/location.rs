use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Identity of a selectable relay location. Two locations are the same node only when
/// every tuple component matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayLocation {
    Country(String),
    City(String, String),
    Hostname(String, String, String),
    CustomList(String),
}

impl RelayLocation {
    pub fn country(&self) -> Option<&str> {
        match self {
            Self::Country(country) | Self::City(country, _) | Self::Hostname(country, _, _) => {
                Some(country)
            }
            Self::CustomList(_) => None,
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            Self::City(_, city) | Self::Hostname(_, city, _) => Some(city),
            _ => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            Self::Hostname(_, _, hostname) => Some(hostname),
            _ => None,
        }
    }

    /// Ancestors from the outermost inwards, excluding the location itself.
    pub fn expand(&self) -> Vec<RelayLocation> {
        match self {
            Self::Country(_) | Self::CustomList(_) => Vec::new(),
            Self::City(country, _) => vec![Self::Country(country.clone())],
            Self::Hostname(country, city, _) => vec![
                Self::Country(country.clone()),
                Self::City(country.clone(), city.clone()),
            ],
        }
    }

    /// True when `other` is this location or lies inside it.
    pub fn contains(&self, other: &RelayLocation) -> bool {
        self == other || other.expand().iter().any(|ancestor| ancestor == self)
    }

    pub fn key(&self) -> String {
        match self {
            Self::Country(country) => country.clone(),
            Self::City(country, city) => format!("{country}-{city}"),
            Self::Hostname(country, city, hostname) => format!("{country}-{city}-{hostname}"),
            Self::CustomList(id) => format!("custom-list-{id}"),
        }
    }
}

/// Equal when both are present and identical, or when both are absent.
pub fn compare_loose(lhs: Option<&RelayLocation>, rhs: Option<&RelayLocation>) -> bool {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        (None, None) => true,
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationType {
    Entry,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialLocation {
    ClosestToExit,
    CustomBridge,
}

impl SpecialLocation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClosestToExit => "Automatic",
            Self::CustomBridge => "Custom bridge",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationSelection {
    Relay(RelayLocation),
    Special(SpecialLocation),
}

pub fn compare_selection_loose(
    lhs: Option<&LocationSelection>,
    rhs: Option<&LocationSelection>,
) -> bool {
    match (lhs, rhs) {
        (Some(LocationSelection::Relay(lhs)), Some(LocationSelection::Relay(rhs))) => lhs == rhs,
        (Some(LocationSelection::Special(lhs)), Some(LocationSelection::Special(rhs))) => {
            lhs == rhs
        }
        (None, None) => true,
        _ => false,
    }
}

/// Case-insensitive name ordering used for countries and cities.
pub fn compare_names(lhs: &str, rhs: &str) -> Ordering {
    lhs.to_lowercase()
        .cmp(&rhs.to_lowercase())
        .then_with(|| lhs.cmp(rhs))
}

/// Hostname ordering where digit runs compare by value, so `se2` sorts before `se10`.
pub fn compare_hostnames(lhs: &str, rhs: &str) -> Ordering {
    let mut left = Chunks::new(lhs);
    let mut right = Chunks::new(rhs);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return lhs.cmp(rhs),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(left_chunk), Some(right_chunk)) => {
                let ordering = match (left_chunk, right_chunk) {
                    (Chunk::Number(left_digits), Chunk::Number(right_digits)) => {
                        let left_trimmed = left_digits.trim_start_matches('0');
                        let right_trimmed = right_digits.trim_start_matches('0');
                        left_trimmed
                            .len()
                            .cmp(&right_trimmed.len())
                            .then_with(|| left_trimmed.cmp(right_trimmed))
                    }
                    (Chunk::Text(left_text), Chunk::Text(right_text)) => {
                        compare_names(left_text, right_text)
                    }
                    (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, character)| character.is_ascii_digit() != numeric)
            .map(|(index, _)| index)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if numeric {
            Chunk::Number(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hostname(host: &str) -> RelayLocation {
        RelayLocation::Hostname("se".into(), "got".into(), host.into())
    }

    #[test]
    fn expand_lists_ancestors_outermost_first() {
        assert_eq!(
            hostname("se-got-wg-001").expand(),
            vec![
                RelayLocation::Country("se".into()),
                RelayLocation::City("se".into(), "got".into()),
            ]
        );
        assert!(RelayLocation::Country("se".into()).expand().is_empty());
    }

    #[test]
    fn same_components_at_different_levels_are_different_locations() {
        let city = RelayLocation::City("se".into(), "se".into());
        let country = RelayLocation::Country("se".into());
        assert_ne!(city, country);
        assert!(country.contains(&city));
        assert!(!city.contains(&country));
    }

    #[test]
    fn loose_comparison_treats_two_absent_locations_as_equal() {
        let country = RelayLocation::Country("se".into());
        assert!(compare_loose(None, None));
        assert!(!compare_loose(Some(&country), None));
        assert!(compare_loose(Some(&country), Some(&country.clone())));
    }

    #[test]
    fn special_and_relay_selections_never_match() {
        let relay = LocationSelection::Relay(RelayLocation::Country("se".into()));
        let special = LocationSelection::Special(SpecialLocation::ClosestToExit);
        assert!(!compare_selection_loose(Some(&relay), Some(&special)));
        assert!(compare_selection_loose(Some(&special), Some(&special.clone())));
    }

    #[test]
    fn hostnames_sort_numerically() {
        let mut hosts = vec!["se10-wireguard", "se2-wireguard", "se1-wireguard", "al3"];
        hosts.sort_by(|lhs, rhs| compare_hostnames(lhs, rhs));
        assert_eq!(
            hosts,
            vec!["al3", "se1-wireguard", "se2-wireguard", "se10-wireguard"]
        );
    }

    #[test]
    fn key_joins_components() {
        assert_eq!(hostname("se-got-wg-001").key(), "se-got-se-got-wg-001");
    }
}
