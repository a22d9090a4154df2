use std::collections::BTreeSet;

use crate::{
    daemon::types::*,
    location::{
        LocationSelection, LocationType, RelayLocation, SpecialLocation, compare_hostnames,
        compare_loose, compare_names,
    },
    settings::SettingsChange,
};

pub const MIN_SEARCH_LENGTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisabledReason {
    Entry,
    Exit,
    Inactive,
}

impl DisabledReason {
    fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Entry => Some("Entry"),
            Self::Exit => Some("Exit"),
            Self::Inactive => None,
        }
    }
}

/// One row of the country, city and relay tree.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationNode {
    pub location: RelayLocation,
    pub name: String,
    pub active: bool,
    pub disabled_reason: Option<DisabledReason>,
    pub selected: bool,
    pub expanded: bool,
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    pub fn disabled(&self) -> bool {
        self.disabled_reason.is_some()
    }

    /// `Gothenburg (Entry)` when the node is blocked by the other hop.
    pub fn label(&self) -> String {
        match self.disabled_reason.and_then(|reason| reason.suffix()) {
            Some(suffix) => format!("{} ({suffix})", self.name),
            None => self.name.clone(),
        }
    }

    pub fn find(&self, location: &RelayLocation) -> Option<&LocationNode> {
        if &self.location == location {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(location))
    }
}

pub fn find_node<'a>(tree: &'a [LocationNode], location: &RelayLocation) -> Option<&'a LocationNode> {
    tree.iter().find_map(|node| node.find(location))
}

/// Relays of the right kind for the list being shown.
pub fn endpoint_type(location_type: LocationType, settings: &Settings) -> EndpointType {
    match (settings.tunnel_protocol(), location_type) {
        (TunnelProtocol::Wireguard, _) => EndpointType::Wireguard,
        (TunnelProtocol::Openvpn, LocationType::Exit) => EndpointType::Openvpn,
        (TunnelProtocol::Openvpn, LocationType::Entry) => EndpointType::Bridge,
    }
}

fn ownership_and_providers(location_type: LocationType, settings: &Settings) -> (Ownership, Vec<String>) {
    if location_type == LocationType::Entry && settings.tunnel_protocol() == TunnelProtocol::Openvpn
    {
        let normal = &settings.bridge_settings.normal;
        return (normal.ownership, normal.providers.clone());
    }
    settings
        .normal_relay_settings()
        .map(|relay_settings| (relay_settings.ownership, relay_settings.providers.clone()))
        .unwrap_or_default()
}

fn daita_only(location_type: LocationType, settings: &Settings) -> bool {
    settings.tunnel_protocol() == TunnelProtocol::Wireguard
        && settings.daita_enabled()
        && !settings.daita_direct_only()
        && (location_type == LocationType::Entry || !settings.multihop_enabled())
}

fn retain_relays(relay_list: &RelayList, keep: impl Fn(&Relay) -> bool) -> RelayList {
    let countries = relay_list
        .countries
        .iter()
        .filter_map(|country| {
            let cities: Vec<RelayListCity> = country
                .cities
                .iter()
                .filter_map(|city| {
                    let relays: Vec<Relay> =
                        city.relays.iter().filter(|relay| keep(relay)).cloned().collect();
                    (!relays.is_empty()).then(|| RelayListCity {
                        relays,
                        ..city.clone()
                    })
                })
                .collect();
            (!cities.is_empty()).then(|| RelayListCountry {
                cities,
                ..country.clone()
            })
        })
        .collect();
    RelayList {
        countries,
        wireguard: relay_list.wireguard.clone(),
    }
}

/// Applies endpoint type, ownership, provider and DAITA filters, in that order.
pub fn filter_relay_list(
    relay_list: &RelayList,
    location_type: LocationType,
    settings: &Settings,
) -> RelayList {
    let endpoint = endpoint_type(location_type, settings);
    let (ownership, providers) = ownership_and_providers(location_type, settings);
    let daita_only = daita_only(location_type, settings);
    retain_relays(relay_list, |relay| {
        relay.endpoint_type == endpoint
            && ownership.accepts(relay.owned)
            && (providers.is_empty() || providers.contains(&relay.provider))
            && (!daita_only || relay.daita)
    })
}

fn matches_search(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(term)
}

fn effective_search_term(search_term: &str) -> Option<String> {
    let term = search_term.trim().to_lowercase();
    (term.chars().count() >= MIN_SEARCH_LENGTH).then_some(term)
}

/// A matching country or city keeps all of its children; a matching relay keeps its
/// ancestors.
pub fn search_relay_list(relay_list: &RelayList, search_term: &str) -> RelayList {
    let Some(term) = effective_search_term(search_term) else {
        return relay_list.clone();
    };
    let countries = relay_list
        .countries
        .iter()
        .filter_map(|country| {
            if matches_search(&country.name, &term) {
                return Some(country.clone());
            }
            let cities: Vec<RelayListCity> = country
                .cities
                .iter()
                .filter_map(|city| {
                    if matches_search(&city.name, &term) {
                        return Some(city.clone());
                    }
                    let relays: Vec<Relay> = city
                        .relays
                        .iter()
                        .filter(|relay| matches_search(&relay.hostname, &term))
                        .cloned()
                        .collect();
                    (!relays.is_empty()).then(|| RelayListCity {
                        relays,
                        ..city.clone()
                    })
                })
                .collect();
            (!cities.is_empty()).then(|| RelayListCountry {
                cities,
                ..country.clone()
            })
        })
        .collect();
    RelayList {
        countries,
        wireguard: relay_list.wireguard.clone(),
    }
}

/// Countries and cities that hold a match below them, so search results are visible.
pub fn search_expansions(relay_list: &RelayList, search_term: &str) -> Option<Vec<RelayLocation>> {
    let term = effective_search_term(search_term)?;
    let mut expanded = Vec::new();
    for country in &relay_list.countries {
        let mut country_has_match = false;
        for city in &country.cities {
            let city_matches = matches_search(&city.name, &term);
            let relay_matches = city
                .relays
                .iter()
                .any(|relay| matches_search(&relay.hostname, &term));
            if relay_matches {
                expanded.push(RelayLocation::City(country.code.clone(), city.code.clone()));
            }
            country_has_match |= city_matches || relay_matches;
        }
        if country_has_match {
            expanded.push(RelayLocation::Country(country.code.clone()));
        }
    }
    Some(expanded)
}

/// The location picked for the other hop, which can't be picked for this one.
pub fn disabled_location(
    location_type: LocationType,
    settings: &Settings,
) -> Option<(RelayLocation, DisabledReason)> {
    let relay_settings = settings.normal_relay_settings()?;
    if relay_settings.tunnel_protocol != TunnelProtocol::Wireguard
        || !relay_settings.wireguard_constraints.use_multihop
    {
        return None;
    }
    match location_type {
        LocationType::Exit => relay_settings
            .wireguard_constraints
            .entry_location
            .lift()
            .map(|location| (location.clone(), DisabledReason::Entry)),
        LocationType::Entry => relay_settings
            .location
            .lift()
            .map(|location| (location.clone(), DisabledReason::Exit)),
    }
}

pub fn selected_location(location_type: LocationType, settings: &Settings) -> Option<LocationSelection> {
    let relay_settings = settings.normal_relay_settings()?;
    match (location_type, relay_settings.tunnel_protocol) {
        (LocationType::Exit, _) => relay_settings
            .location
            .lift()
            .cloned()
            .map(LocationSelection::Relay),
        (LocationType::Entry, TunnelProtocol::Wireguard) => relay_settings
            .wireguard_constraints
            .entry_location
            .lift()
            .cloned()
            .map(LocationSelection::Relay),
        (LocationType::Entry, TunnelProtocol::Openvpn) => {
            let bridge = &settings.bridge_settings;
            if bridge.bridge_type == BridgeType::Custom {
                return Some(LocationSelection::Special(SpecialLocation::CustomBridge));
            }
            Some(match bridge.normal.location.lift() {
                Some(location) => LocationSelection::Relay(location.clone()),
                None => LocationSelection::Special(SpecialLocation::ClosestToExit),
            })
        }
    }
}

/// Special rows shown above the tree; only the bridge list has them.
pub fn special_locations(location_type: LocationType, settings: &Settings) -> Vec<SpecialLocation> {
    if location_type != LocationType::Entry || settings.tunnel_protocol() != TunnelProtocol::Openvpn {
        return Vec::new();
    }
    let mut specials = vec![SpecialLocation::ClosestToExit];
    if settings.bridge_settings.custom.is_some() {
        specials.push(SpecialLocation::CustomBridge);
    }
    specials
}

/// Ancestors of the current selection, so it is visible when the list opens.
pub fn initial_expansion(selected: Option<&LocationSelection>) -> Vec<RelayLocation> {
    match selected {
        Some(LocationSelection::Relay(location)) => location.expand(),
        _ => Vec::new(),
    }
}

pub fn toggle_expansion(expanded: &mut Vec<RelayLocation>, location: &RelayLocation) {
    if let Some(index) = expanded.iter().position(|candidate| candidate == location) {
        expanded.remove(index);
    } else {
        expanded.push(location.clone());
    }
}

fn reason_for(
    location: &RelayLocation,
    disabled: Option<&(RelayLocation, DisabledReason)>,
) -> Option<DisabledReason> {
    disabled
        .filter(|(disabled_location, _)| disabled_location == location)
        .map(|(_, reason)| *reason)
}

fn selected_relay(selected: Option<&LocationSelection>) -> Option<&RelayLocation> {
    match selected {
        Some(LocationSelection::Relay(location)) => Some(location),
        _ => None,
    }
}

pub struct TreeInput<'a> {
    pub selected: Option<&'a LocationSelection>,
    pub disabled: Option<&'a (RelayLocation, DisabledReason)>,
    pub expanded: &'a [RelayLocation],
}

/// Builds the sorted tree with disabled, selected and expanded flags resolved.
pub fn build_tree(relay_list: &RelayList, input: &TreeInput<'_>) -> Vec<LocationNode> {
    let selected = selected_relay(input.selected);
    let is_selected = |location: &RelayLocation| compare_loose(Some(location), selected);
    let is_expanded = |location: &RelayLocation| input.expanded.contains(location);

    let mut countries: Vec<LocationNode> = relay_list
        .countries
        .iter()
        .map(|country| {
            let country_location = RelayLocation::Country(country.code.clone());
            let country_active = country
                .cities
                .iter()
                .flat_map(|city| &city.relays)
                .any(|relay| relay.active);
            let country_reason = reason_for(&country_location, input.disabled)
                .or((!country_active).then_some(DisabledReason::Inactive));

            let mut cities: Vec<LocationNode> = country
                .cities
                .iter()
                .map(|city| {
                    let city_location =
                        RelayLocation::City(country.code.clone(), city.code.clone());
                    let city_active = city.relays.iter().any(|relay| relay.active);
                    let city_reason = country_reason
                        .or_else(|| reason_for(&city_location, input.disabled))
                        .or((!city_active).then_some(DisabledReason::Inactive));

                    let mut relays: Vec<LocationNode> = city
                        .relays
                        .iter()
                        .map(|relay| {
                            let relay_location = RelayLocation::Hostname(
                                country.code.clone(),
                                city.code.clone(),
                                relay.hostname.clone(),
                            );
                            let relay_reason = city_reason
                                .or_else(|| reason_for(&relay_location, input.disabled))
                                .or((!relay.active).then_some(DisabledReason::Inactive));
                            LocationNode {
                                selected: is_selected(&relay_location),
                                expanded: false,
                                location: relay_location,
                                name: relay.hostname.clone(),
                                active: relay.active,
                                disabled_reason: relay_reason,
                                children: Vec::new(),
                            }
                        })
                        .collect();
                    relays.sort_by(|lhs, rhs| compare_hostnames(&lhs.name, &rhs.name));

                    LocationNode {
                        selected: is_selected(&city_location),
                        expanded: is_expanded(&city_location),
                        location: city_location,
                        name: city.name.clone(),
                        active: city_active,
                        disabled_reason: city_reason,
                        children: relays,
                    }
                })
                .collect();
            cities.sort_by(|lhs, rhs| compare_names(&lhs.name, &rhs.name));

            LocationNode {
                selected: is_selected(&country_location),
                expanded: is_expanded(&country_location),
                location: country_location,
                name: country.name.clone(),
                active: country_active,
                disabled_reason: country_reason,
                children: cities,
            }
        })
        .collect();
    countries.sort_by(|lhs, rhs| compare_names(&lhs.name, &rhs.name));
    countries
}

/// Sorted provider names offered by the filter page.
pub fn available_providers(
    relay_list: &RelayList,
    location_type: LocationType,
    settings: &Settings,
    ownership: Ownership,
) -> Vec<String> {
    let endpoint = endpoint_type(location_type, settings);
    let providers: BTreeSet<String> = relay_list
        .countries
        .iter()
        .flat_map(|country| &country.cities)
        .flat_map(|city| &city.relays)
        .filter(|relay| relay.endpoint_type == endpoint && ownership.accepts(relay.owned))
        .map(|relay| relay.provider.clone())
        .collect();
    let mut providers: Vec<String> = providers.into_iter().collect();
    providers.sort_by(|lhs, rhs| compare_names(lhs, rhs));
    providers
}

/// The intent that stores a newly picked location.
pub fn selection_change(
    location_type: LocationType,
    settings: &Settings,
    selection: &LocationSelection,
) -> Option<SettingsChange> {
    let relay_settings = settings.normal_relay_settings()?;
    match (location_type, relay_settings.tunnel_protocol, selection) {
        (LocationType::Exit, _, LocationSelection::Relay(location)) => {
            Some(SettingsChange::RelaySettings(RelaySettingsUpdate {
                location: Some(Constraint::Only(location.clone())),
                ..Default::default()
            }))
        }
        (LocationType::Entry, TunnelProtocol::Wireguard, LocationSelection::Relay(location)) => {
            Some(SettingsChange::RelaySettings(RelaySettingsUpdate {
                wireguard_constraints: Some(WireguardConstraints {
                    entry_location: Constraint::Only(location.clone()),
                    ..relay_settings.wireguard_constraints.clone()
                }),
                ..Default::default()
            }))
        }
        (LocationType::Entry, TunnelProtocol::Openvpn, selection) => {
            let mut bridge_settings = settings.bridge_settings.clone();
            match selection {
                LocationSelection::Relay(location) => {
                    bridge_settings.bridge_type = BridgeType::Normal;
                    bridge_settings.normal.location = Constraint::Only(location.clone());
                }
                LocationSelection::Special(SpecialLocation::ClosestToExit) => {
                    bridge_settings.bridge_type = BridgeType::Normal;
                    bridge_settings.normal.location = Constraint::Any;
                }
                LocationSelection::Special(SpecialLocation::CustomBridge) => {
                    bridge_settings.bridge_type = BridgeType::Custom;
                }
            }
            Some(SettingsChange::BridgeSettings(bridge_settings))
        }
        _ => None,
    }
}

/// View state of one location list (entry or exit).
#[derive(Clone, Debug, Default)]
pub struct LocationList {
    user_expanded: Vec<RelayLocation>,
    search_term: String,
    search_expanded: Option<Vec<RelayLocation>>,
}

impl LocationList {
    pub fn new(selected: Option<&LocationSelection>) -> Self {
        Self {
            user_expanded: initial_expansion(selected),
            ..Default::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn expanded(&self) -> &[RelayLocation] {
        self.search_expanded
            .as_deref()
            .unwrap_or(&self.user_expanded)
    }

    /// An empty or too short term restores the user's own expansion set.
    pub fn set_search_term(&mut self, term: &str, filtered: &RelayList) {
        self.search_term = term.to_string();
        self.search_expanded = search_expansions(filtered, term);
    }

    pub fn toggle(&mut self, location: &RelayLocation) {
        match &mut self.search_expanded {
            Some(expanded) => toggle_expansion(expanded, location),
            None => toggle_expansion(&mut self.user_expanded, location),
        }
    }

    pub fn tree(
        &self,
        relay_list: &RelayList,
        location_type: LocationType,
        settings: &Settings,
    ) -> Vec<LocationNode> {
        let filtered = filter_relay_list(relay_list, location_type, settings);
        let searched = search_relay_list(&filtered, &self.search_term);
        let selected = selected_location(location_type, settings);
        let disabled = disabled_location(location_type, settings);
        build_tree(
            &searched,
            &TreeInput {
                selected: selected.as_ref(),
                disabled: disabled.as_ref(),
                expanded: self.expanded(),
            },
        )
    }
}

/// Returns the selection to report, or `None` when it is unchanged or not selectable.
pub fn select(
    current: Option<&LocationSelection>,
    candidate: LocationSelection,
    node_disabled: bool,
) -> Option<LocationSelection> {
    if node_disabled || crate::location::compare_selection_loose(current, Some(&candidate)) {
        return None;
    }
    Some(candidate)
}

/// Ownership and provider choice on the filter page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub ownership: Ownership,
    pub selected_providers: BTreeSet<String>,
    pub available: Vec<String>,
}

impl FilterState {
    /// Starts from the constraints the list is filtered by: the bridge settings for the
    /// OpenVPN entry list, the relay settings otherwise.
    pub fn for_location(relay_list: &RelayList, location_type: LocationType, settings: &Settings) -> Self {
        let (ownership, providers) = ownership_and_providers(location_type, settings);
        let available = available_providers(relay_list, location_type, settings, ownership);
        Self::new(ownership, &providers, available)
    }

    /// An empty provider list in the settings means every provider.
    pub fn new(ownership: Ownership, providers: &[String], available: Vec<String>) -> Self {
        let selected_providers = if providers.is_empty() {
            available.iter().cloned().collect()
        } else {
            providers.iter().cloned().collect()
        };
        Self {
            ownership,
            selected_providers,
            available,
        }
    }

    pub fn all_selected(&self) -> bool {
        self.available
            .iter()
            .all(|provider| self.selected_providers.contains(provider))
    }

    pub fn toggle_all(&mut self) {
        if self.all_selected() {
            self.selected_providers.clear();
        } else {
            self.selected_providers = self.available.iter().cloned().collect();
        }
    }

    pub fn toggle_provider(&mut self, provider: &str) {
        if !self.selected_providers.remove(provider) {
            self.selected_providers.insert(provider.to_string());
        }
    }

    pub fn can_apply(&self) -> bool {
        !self.selected_providers.is_empty()
    }

    pub fn apply(&self, location_type: LocationType, settings: &Settings) -> Result<SettingsChange, String> {
        if !self.can_apply() {
            return Err("Select at least one provider".into());
        }
        let providers = if self.all_selected() {
            Vec::new()
        } else {
            self.selected_providers.iter().cloned().collect()
        };
        if location_type == LocationType::Entry && settings.tunnel_protocol() == TunnelProtocol::Openvpn
        {
            let mut bridge_settings = settings.bridge_settings.clone();
            bridge_settings.normal.ownership = self.ownership;
            bridge_settings.normal.providers = providers;
            return Ok(SettingsChange::BridgeSettings(bridge_settings));
        }
        Ok(SettingsChange::RelaySettings(RelaySettingsUpdate {
            ownership: Some(self.ownership),
            providers: Some(providers),
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn relay(hostname: &str, active: bool, provider: &str, owned: bool) -> Relay {
        Relay {
            hostname: hostname.into(),
            provider: provider.into(),
            ipv4_addr_in: "10.0.0.1".into(),
            include_in_country: true,
            active,
            weight: 100,
            owned,
            endpoint_type: EndpointType::Wireguard,
            daita: hostname.contains("daita"),
        }
    }

    fn city(name: &str, code: &str, relays: Vec<Relay>) -> RelayListCity {
        RelayListCity {
            name: name.into(),
            code: code.into(),
            latitude: 0.0,
            longitude: 0.0,
            relays,
        }
    }

    fn relay_list() -> RelayList {
        RelayList {
            countries: vec![
                RelayListCountry {
                    name: "Sweden".into(),
                    code: "se".into(),
                    cities: vec![
                        city(
                            "Gothenburg",
                            "got",
                            vec![
                                relay("se10-wireguard", true, "31173", true),
                                relay("se2-wireguard", false, "31173", true),
                            ],
                        ),
                        city("Malmo", "mma", vec![relay("se5-wireguard", false, "M247", false)]),
                    ],
                },
                RelayListCountry {
                    name: "Albania".into(),
                    code: "al".into(),
                    cities: vec![city(
                        "Tirana",
                        "tia",
                        vec![relay("al1-daita", false, "iRegister", false)],
                    )],
                },
            ],
            wireguard: WireguardEndpointData::default(),
        }
    }

    fn multihop_settings(entry: RelayLocation, exit: RelayLocation) -> Settings {
        Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                location: Constraint::Only(exit),
                wireguard_constraints: WireguardConstraints {
                    use_multihop: true,
                    entry_location: Constraint::Only(entry),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn tree(list: &RelayList, settings: &Settings, location_type: LocationType) -> Vec<LocationNode> {
        LocationList::default().tree(list, location_type, settings)
    }

    #[test]
    fn countries_and_relays_are_sorted() {
        let nodes = tree(&relay_list(), &Settings::default(), LocationType::Exit);
        let names: Vec<_> = nodes.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["Albania", "Sweden"]);
        let gothenburg = &nodes[1].children[0];
        let hostnames: Vec<_> = gothenburg
            .children
            .iter()
            .map(|node| node.name.as_str())
            .collect();
        assert_eq!(hostnames, vec!["se2-wireguard", "se10-wireguard"]);
    }

    #[test]
    fn node_is_disabled_when_every_relay_is_inactive() {
        let nodes = tree(&relay_list(), &Settings::default(), LocationType::Exit);
        let albania = &nodes[0];
        assert!(!albania.active);
        assert_eq!(albania.disabled_reason, Some(DisabledReason::Inactive));
        assert_eq!(albania.children[0].disabled_reason, Some(DisabledReason::Inactive));

        let sweden = &nodes[1];
        assert!(sweden.active);
        assert!(!sweden.disabled());
        let malmo = find_node(&nodes, &RelayLocation::City("se".into(), "mma".into())).unwrap();
        assert!(malmo.disabled());
        let inactive_relay = find_node(
            &nodes,
            &RelayLocation::Hostname("se".into(), "got".into(), "se2-wireguard".into()),
        )
        .unwrap();
        assert_eq!(inactive_relay.disabled_reason, Some(DisabledReason::Inactive));
        assert_eq!(inactive_relay.label(), "se2-wireguard");
    }

    #[test]
    fn entry_location_is_disabled_in_exit_list_and_propagates_down() {
        let gothenburg = RelayLocation::City("se".into(), "got".into());
        let settings = multihop_settings(gothenburg.clone(), RelayLocation::Country("al".into()));
        let nodes = tree(&relay_list(), &settings, LocationType::Exit);
        let node = find_node(&nodes, &gothenburg).unwrap();
        assert_eq!(node.disabled_reason, Some(DisabledReason::Entry));
        assert_eq!(node.label(), "Gothenburg (Entry)");
        assert!(
            node.children
                .iter()
                .all(|relay| relay.disabled_reason == Some(DisabledReason::Entry))
        );
        let sweden = find_node(&nodes, &RelayLocation::Country("se".into())).unwrap();
        assert!(!sweden.disabled());
    }

    #[test]
    fn exit_location_is_disabled_in_entry_list() {
        let sweden = RelayLocation::Country("se".into());
        let settings = multihop_settings(RelayLocation::Country("al".into()), sweden.clone());
        let nodes = tree(&relay_list(), &settings, LocationType::Entry);
        assert_eq!(
            find_node(&nodes, &sweden).unwrap().label(),
            "Sweden (Exit)"
        );
    }

    #[test]
    fn toggling_expansion_leaves_siblings_and_ancestors_alone() {
        let sweden = RelayLocation::Country("se".into());
        let gothenburg = RelayLocation::City("se".into(), "got".into());
        let malmo = RelayLocation::City("se".into(), "mma".into());
        let mut expanded = vec![sweden.clone(), malmo.clone()];

        toggle_expansion(&mut expanded, &gothenburg);
        assert_eq!(expanded, vec![sweden.clone(), malmo.clone(), gothenburg.clone()]);
        toggle_expansion(&mut expanded, &gothenburg);
        assert_eq!(expanded, vec![sweden, malmo]);
    }

    #[test]
    fn search_keeps_ancestors_and_expands_matches() {
        let mut list = LocationList::default();
        let relays = relay_list();
        list.set_search_term("se10", &relays);
        let nodes = list.tree(&relays, LocationType::Exit, &Settings::default());
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children.len(), 1);
        assert_eq!(nodes[0].children[0].children.len(), 1);
        assert!(nodes[0].expanded);
        assert!(nodes[0].children[0].expanded);

        list.set_search_term("s", &relays);
        let nodes = list.tree(&relays, LocationType::Exit, &Settings::default());
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[1].expanded);
    }

    #[test]
    fn matching_city_keeps_all_relays() {
        let searched = search_relay_list(&relay_list(), "gothen");
        assert_eq!(searched.countries.len(), 1);
        assert_eq!(searched.countries[0].cities[0].relays.len(), 2);
    }

    #[test]
    fn selection_marks_node_and_expands_ancestors() {
        let hostname = RelayLocation::Hostname("se".into(), "got".into(), "se10-wireguard".into());
        let selection = LocationSelection::Relay(hostname.clone());
        let list = LocationList::new(Some(&selection));
        assert_eq!(
            list.expanded(),
            &[
                RelayLocation::Country("se".into()),
                RelayLocation::City("se".into(), "got".into())
            ]
        );
        let settings = Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                location: Constraint::Only(hostname.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let nodes = list.tree(&relay_list(), LocationType::Exit, &settings);
        assert!(find_node(&nodes, &hostname).unwrap().selected);
    }

    #[test]
    fn selecting_the_current_location_does_not_notify() {
        let sweden = LocationSelection::Relay(RelayLocation::Country("se".into()));
        assert_eq!(select(Some(&sweden), sweden.clone(), false), None);
        let albania = LocationSelection::Relay(RelayLocation::Country("al".into()));
        assert_eq!(select(Some(&sweden), albania.clone(), true), None);
        assert_eq!(select(Some(&sweden), albania.clone(), false), Some(albania));
    }

    #[test]
    fn ownership_and_daita_filters_apply() {
        let mut settings = Settings::default();
        settings.tunnel_options.wireguard.daita.enable_daita = true;
        let filtered = filter_relay_list(&relay_list(), LocationType::Exit, &settings);
        assert_eq!(filtered.countries.len(), 1);
        assert_eq!(filtered.countries[0].code, "al");

        let settings = Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                ownership: Ownership::MullvadOwned,
                ..Default::default()
            }),
            ..Default::default()
        };
        let filtered = filter_relay_list(&relay_list(), LocationType::Exit, &settings);
        assert_eq!(filtered.countries[0].cities.len(), 1);
    }

    #[test]
    fn providers_are_deduplicated_and_sorted() {
        let providers = available_providers(
            &relay_list(),
            LocationType::Exit,
            &Settings::default(),
            Ownership::Any,
        );
        assert_eq!(providers, vec!["31173", "iRegister", "M247"]);
    }

    #[test]
    fn filter_with_no_providers_is_refused() {
        let available = vec!["31173".to_string(), "M247".to_string()];
        let mut filter = FilterState::new(Ownership::Any, &[], available);
        assert!(filter.all_selected());
        filter.toggle_all();
        assert!(filter.apply(LocationType::Exit, &Settings::default()).is_err());

        filter.toggle_provider("M247");
        assert_eq!(
            filter.apply(LocationType::Exit, &Settings::default()),
            Ok(SettingsChange::RelaySettings(RelaySettingsUpdate {
                ownership: Some(Ownership::Any),
                providers: Some(vec!["M247".into()]),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn bridge_filter_starts_from_bridge_constraints() {
        let settings = Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                tunnel_protocol: TunnelProtocol::Openvpn,
                ownership: Ownership::MullvadOwned,
                providers: vec!["31173".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut list = relay_list();
        let mut bridge = relay("se-br-001", true, "M247", false);
        bridge.endpoint_type = EndpointType::Bridge;
        list.countries[1].cities[0].relays.push(bridge);

        let filter = FilterState::for_location(&list, LocationType::Entry, &settings);
        assert_eq!(filter.ownership, Ownership::Any);
        assert_eq!(filter.available, vec!["M247".to_string()]);
        assert!(filter.all_selected());
        assert_eq!(
            filter.apply(LocationType::Entry, &settings),
            Ok(SettingsChange::BridgeSettings(settings.bridge_settings.clone()))
        );

        let exit = FilterState::for_location(&list, LocationType::Exit, &settings);
        assert_eq!(exit.ownership, Ownership::MullvadOwned);
    }

    #[test]
    fn openvpn_entry_selection_updates_bridge_settings() {
        let settings = Settings {
            relay_settings: RelaySettings::Normal(NormalRelaySettings {
                tunnel_protocol: TunnelProtocol::Openvpn,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            selected_location(LocationType::Entry, &settings),
            Some(LocationSelection::Special(SpecialLocation::ClosestToExit))
        );
        let change = selection_change(
            LocationType::Entry,
            &settings,
            &LocationSelection::Relay(RelayLocation::Country("se".into())),
        );
        let Some(SettingsChange::BridgeSettings(bridge)) = change else {
            panic!("expected bridge settings");
        };
        assert_eq!(bridge.normal.location, Constraint::Only(RelayLocation::Country("se".into())));
    }
}
