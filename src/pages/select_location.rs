use gpui::{AnyElement, Context, MouseButton, SharedString, div, prelude::*, px, rgb};

use super::{form_column, page, selector};
use crate::{
    app::{InputField, VpnApp},
    components::*,
    connection::{ButtonStyle, TunnelCommand},
    daemon::types::{BridgeState, Ownership, TunnelProtocol},
    location::{LocationSelection, LocationType},
    location_list::{
        FilterState, LocationList, LocationNode, MIN_SEARCH_LENGTH, available_providers,
        filter_relay_list, select, selected_location, selection_change, special_locations,
    },
    navigation::Route,
    theme::*,
};

impl VpnApp {
    fn location_list(&self) -> &LocationList {
        match self.location_type {
            LocationType::Entry => &self.entry_locations,
            LocationType::Exit => &self.exit_locations,
        }
    }

    fn location_list_mut(&mut self) -> &mut LocationList {
        match self.location_type {
            LocationType::Entry => &mut self.entry_locations,
            LocationType::Exit => &mut self.exit_locations,
        }
    }

    pub(crate) fn set_location_search(&mut self, text: &str) {
        let filtered = filter_relay_list(&self.store.relay_list, self.location_type, &self.store.settings);
        self.location_list_mut().set_search_term(text, &filtered);
    }

    fn set_location_type(&mut self, location_type: LocationType, context: &mut Context<Self>) {
        self.location_type = location_type;
        let text = self.input_text(InputField::LocationSearch, context);
        self.set_location_search(&text);
        context.notify();
    }

    /// Picking an entry moves on to the exit list; picking an exit connects and closes
    /// the page.
    fn select_location(
        &mut self,
        candidate: LocationSelection,
        disabled: bool,
        context: &mut Context<Self>,
    ) {
        let settings = self.store.settings.clone();
        let location_type = self.location_type;
        let current = selected_location(location_type, &settings);
        let change = select(current.as_ref(), candidate, disabled)
            .and_then(|selection| selection_change(location_type, &settings, &selection));

        match location_type {
            LocationType::Entry => {
                if let Some(change) = change {
                    self.submit_change(change, context);
                }
                if !disabled {
                    self.set_location_type(LocationType::Exit, context);
                }
            }
            LocationType::Exit => {
                if disabled {
                    return;
                }
                self.run_daemon(
                    "select-location",
                    context,
                    move |daemon| {
                        if let Some(change) = change {
                            change.apply(daemon)?;
                        }
                        TunnelCommand::Connect.run(daemon)
                    },
                    |this, result, _| {
                        if let Err(error) = result {
                            log::error!("[location] failed to connect to the new location: {error}");
                            this.error_dialog = Some(error.user_message());
                        }
                    },
                );
                self.pop(context);
            }
        }
    }

    fn apply_filter(&mut self, context: &mut Context<Self>) {
        let Some(filter) = &self.filter else {
            return;
        };
        match filter.apply(self.location_type, &self.store.settings) {
            Ok(change) => {
                self.submit_change(change, context);
                self.pop(context);
            }
            Err(error) => self.error_dialog = Some(error),
        }
    }

    fn clear_filter(&mut self, context: &mut Context<Self>) {
        let cleared = FilterState::new(Ownership::Any, &[], Vec::new());
        if let Ok(change) = cleared.apply(self.location_type, &self.store.settings) {
            self.submit_change(change, context);
        }
    }

    fn set_filter_ownership(&mut self, ownership: Ownership, context: &mut Context<Self>) {
        let available = available_providers(
            &self.store.relay_list,
            self.location_type,
            &self.store.settings,
            ownership,
        );
        if let Some(filter) = &mut self.filter {
            filter.ownership = ownership;
            filter
                .selected_providers
                .retain(|provider| available.contains(provider));
            filter.available = available;
        }
        context.notify();
    }

    pub(crate) fn render_select_location(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let location_type = self.location_type;
        let show_tabs = match settings.tunnel_protocol() {
            TunnelProtocol::Wireguard => settings.multihop_enabled(),
            TunnelProtocol::Openvpn => settings.bridge_state == BridgeState::On,
        };
        let list = self.location_list();
        let search_term = list.search_term().to_string();
        let tree = list.tree(&self.store.relay_list, location_type, &settings);
        let current = selected_location(location_type, &settings);
        let filter_summary = filter_summary(&settings, location_type);

        let specials = special_locations(location_type, &settings)
            .into_iter()
            .map(|special| {
                let candidate = LocationSelection::Special(special);
                let selected = current.as_ref() == Some(&candidate);
                cell(SharedString::from(format!("special-{special:?}")), 0, false)
                    .when(selected, |element| element.bg(rgb(COLOR_GREEN)))
                    .child(cell_label(special.label()))
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(move |this, _, _, context| {
                            this.select_location(candidate.clone(), false, context)
                        }),
                    )
            })
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        self.render_location_nodes(&tree, 0, &mut rows, context);
        let no_results = tree.is_empty() && search_term.chars().count() >= MIN_SEARCH_LENGTH;

        page()
            .child(
                div()
                    .flex()
                    .flex_row()
                    .items_center()
                    .pr(px(PADDING_PAGE))
                    .child(div().flex_1().child(page_title("Select location")))
                    .child(link("location-filter", "Filter").on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.push(Route::Filter, context)),
                    )),
            )
            .when(show_tabs, |element| {
                element.child(
                    div()
                        .flex()
                        .flex_row()
                        .gap(px(GAP_SMALL))
                        .px(px(PADDING_PAGE))
                        .child(location_tab(
                            "location-tab-entry",
                            "Entry",
                            location_type == LocationType::Entry,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.set_location_type(LocationType::Entry, context)
                            }),
                        ))
                        .child(location_tab(
                            "location-tab-exit",
                            "Exit",
                            location_type == LocationType::Exit,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.set_location_type(LocationType::Exit, context)
                            }),
                        )),
                )
            })
            .when_some(filter_summary, |element, summary| {
                element.child(
                    div()
                        .flex()
                        .flex_row()
                        .items_center()
                        .gap(px(GAP_SMALL))
                        .px(px(PADDING_PAGE))
                        .pt(px(GAP_SMALL))
                        .child(label(format!("Filtered: {summary}")))
                        .child(link("location-filter-clear", "✕").on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.clear_filter(context)),
                        )),
                )
            })
            .child(form_column().child(self.inputs.get(InputField::LocationSearch).clone()))
            .children(specials)
            .when(no_results, |element| {
                element.child(paragraph(format!(
                    "No result for \"{search_term}\", please try a different search."
                )))
            })
            .children(rows)
    }

    fn render_location_nodes(
        &self,
        nodes: &[LocationNode],
        depth: usize,
        rows: &mut Vec<AnyElement>,
        context: &Context<Self>,
    ) {
        for node in nodes {
            let key = node.location.key();
            let disabled = node.disabled();
            let candidate = LocationSelection::Relay(node.location.clone());
            let location = node.location.clone();
            rows.push(
                cell(SharedString::from(format!("location-{key}")), depth, disabled)
                    .when(node.selected, |element| element.bg(rgb(COLOR_GREEN)))
                    .child(status_dot(if node.active { COLOR_GREEN } else { COLOR_RED }))
                    .child(cell_label(node.label()))
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(move |this, _, _, context| {
                            this.select_location(candidate.clone(), disabled, context)
                        }),
                    )
                    .when(!node.children.is_empty(), |element| {
                        element.child(
                            div()
                                .id(SharedString::from(format!("location-expand-{key}")))
                                .px(px(GAP_SMALL))
                                .cursor_pointer()
                                .child(expand_chevron(node.expanded))
                                .on_mouse_up(
                                    MouseButton::Left,
                                    context.listener(move |this, _, _, context| {
                                        context.stop_propagation();
                                        this.location_list_mut().toggle(&location);
                                        context.notify();
                                    }),
                                ),
                        )
                    })
                    .into_any_element(),
            );
            if node.expanded {
                self.render_location_nodes(&node.children, depth + 1, rows, context);
            }
        }
    }

    pub(crate) fn render_filter(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let Some(filter) = self.filter.clone() else {
            return page().child(spinner("Loading providers..."));
        };
        let all_selected = filter.all_selected();
        let providers = filter.available.iter().map(|provider| {
            let checked = filter.selected_providers.contains(provider);
            let name = provider.clone();
            cell(SharedString::from(format!("provider-{provider}")), 1, false)
                .child(checkbox(checked))
                .child(cell_label(provider.clone()))
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(move |this, _, _, context| {
                        if let Some(filter) = &mut this.filter {
                            filter.toggle_provider(&name);
                        }
                        context.notify();
                    }),
                )
        });

        page()
            .child(page_title("Filter"))
            .child(section_header("Ownership"))
            .child(selector(
                "ownership",
                [Ownership::Any, Ownership::MullvadOwned, Ownership::Rented]
                    .into_iter()
                    .map(|ownership| (ownership, ownership.label().to_string(), false))
                    .collect(),
                &filter.ownership,
                context,
                |this, ownership, context| this.set_filter_ownership(ownership, context),
            ))
            .child(section_header("Providers"))
            .child(
                cell("provider-all", 1, false)
                    .child(checkbox(all_selected))
                    .child(cell_label("All providers"))
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| {
                            if let Some(filter) = &mut this.filter {
                                filter.toggle_all();
                            }
                            context.notify();
                        }),
                    ),
            )
            .children(providers)
            .child(
                button_column().child(
                    button_action(
                        "filter-apply",
                        "Apply",
                        ButtonStyle::Success,
                        !filter.can_apply(),
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.apply_filter(context)),
                    ),
                ),
            )
    }
}

fn location_tab(id: &'static str, text: &'static str, active: bool) -> gpui::Stateful<gpui::Div> {
    button_action(
        id,
        text,
        if active {
            ButtonStyle::Success
        } else {
            ButtonStyle::Neutral
        },
        false,
        None,
    )
    .flex_1()
}

/// Short description of an active ownership or provider filter, if any.
fn filter_summary(
    settings: &crate::daemon::types::Settings,
    location_type: LocationType,
) -> Option<String> {
    let (ownership, providers) = if location_type == LocationType::Entry
        && settings.tunnel_protocol() == TunnelProtocol::Openvpn
    {
        let normal = &settings.bridge_settings.normal;
        (normal.ownership, normal.providers.len())
    } else {
        let relay_settings = settings.normal_relay_settings()?;
        (relay_settings.ownership, relay_settings.providers.len())
    };
    let mut parts = Vec::new();
    if ownership != Ownership::Any {
        parts.push(ownership.label().to_string());
    }
    match providers {
        0 => {}
        1 => parts.push("1 provider".to_string()),
        count => parts.push(format!("{count} providers")),
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::types::{RelaySettings, Settings};
    use pretty_assertions::assert_eq;

    #[test]
    fn unfiltered_settings_have_no_summary() {
        assert_eq!(filter_summary(&Settings::default(), LocationType::Exit), None);
    }

    #[test]
    fn summary_lists_ownership_and_provider_count() {
        let mut settings = Settings::default();
        if let RelaySettings::Normal(relay_settings) = &mut settings.relay_settings {
            relay_settings.ownership = Ownership::Rented;
            relay_settings.providers = vec!["31173".into(), "M247".into()];
        }
        assert_eq!(
            filter_summary(&settings, LocationType::Exit),
            Some("Rented, 2 providers".to_string())
        );
    }
}
