use chrono::Utc;
use gpui::{Context, Div, MouseButton, SharedString, div, prelude::*, px, rgb};

use super::{form_column, page, selector};
use crate::{
    account,
    app::{InputField, Quit, VpnApp},
    components::*,
    connection::ButtonStyle,
    daemon::types::*,
    gui_settings::LOCALES,
    navigation::Route,
    notifications::{BETA_DOWNLOAD_URL, DOWNLOAD_URL},
    settings::{
        Feature, SettingsChange, custom_dns, daita, feature_available, import,
        openvpn::{self, port_options},
        preferences::{
            DAEMON_PREFERENCES, INTERFACE_PREFERENCES, Preference, beta_program_locked, set_locale,
        },
        relay_settings_or_default, unavailable_footer,
        vpn::{self, DnsBlocker},
        wireguard::{self, PORT_PRESETS, UDP2TCP_PORTS, format_ranges, quantum_resistant_label},
    },
    theme::*,
};

const OBFUSCATION_TYPES: [ObfuscationType; 4] = [
    ObfuscationType::Auto,
    ObfuscationType::Off,
    ObfuscationType::Udp2Tcp,
    ObfuscationType::Shadowsocks,
];

impl VpnApp {
    fn set_preference(&mut self, preference: Preference, value: bool, context: &mut Context<Self>) {
        match preference.set(value, &mut self.gui_settings) {
            Some(change) => self.apply_change(change, context),
            None => self.save_gui_settings(context),
        }
    }

    fn preference_toggle(&self, preference: Preference, context: &Context<Self>) -> Div {
        let value = preference.value(&self.store.settings, &self.gui_settings);
        let locked = preference == Preference::ShowBetaReleases
            && beta_program_locked(&self.store.version.current);
        div()
            .flex()
            .flex_col()
            .child(toggle(
                preference.label(),
                preference.label(),
                value || locked,
                locked,
                context.listener(move |this, _, _, context| {
                    this.set_preference(preference, !value, context)
                }),
            ))
            .children(preference.description().map(cell_footer))
    }

    pub(crate) fn import_text(&mut self, context: &mut Context<Self>) {
        if !self.import_form.can_import_text() {
            return;
        }
        let mut form = self.import_form.clone();
        self.run_daemon(
            "import",
            context,
            move |daemon| {
                form.import_text(daemon);
                form.status
            },
            |this, status, _| this.import_form.status = status,
        );
    }

    fn import_file(&mut self, context: &mut Context<Self>) {
        let mut form = self.import_form.clone();
        self.run_daemon(
            "import",
            context,
            move |daemon| {
                let path = import::pick_file()?;
                form.import_file(daemon, &path);
                form.status
            },
            |this, status, _| {
                if status.is_some() {
                    this.import_form.status = status;
                }
            },
        );
    }

    // Pages

    pub(crate) fn render_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let logged_in = self.store.account.account_number().is_some();
        let connected_to_daemon = self.store.connected_to_daemon;
        let time_left = self
            .store
            .account
            .expiry
            .map(|expiry| account::remaining_time_text(expiry, Utc::now()));
        let tunnel_up = !matches!(
            self.store.tunnel_state,
            TunnelState::Disconnected { .. }
        );
        let version = &self.store.version;
        let upgrade = version.info.suggested_upgrade.clone();
        let upgrade_url = if version.info.suggested_is_beta {
            BETA_DOWNLOAD_URL
        } else {
            DOWNLOAD_URL
        };
        let version_text = if version.current.is_empty() {
            version.gui.clone()
        } else {
            version.current.clone()
        };

        page()
            .child(page_title("Settings"))
            .when(logged_in, |element| {
                element
                    .child(
                        navigation_cell("settings-account", "Account", time_left).on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.push(Route::Account, context)),
                        ),
                    )
                    .child(div().h(px(GAP_LARGE)))
            })
            .child(
                navigation_cell("settings-interface", "User interface settings", None).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| {
                        this.push(Route::UserInterfaceSettings, context)
                    }),
                ),
            )
            .when(logged_in && connected_to_daemon, |element| {
                element
                    .child(
                        navigation_cell("settings-vpn", "VPN settings", None).on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.push(Route::VpnSettings, context)),
                        ),
                    )
                    .child(
                        navigation_cell("settings-split-tunneling", "Split tunneling", None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| {
                                    this.push(Route::SplitTunneling, context)
                                }),
                            ),
                    )
            })
            .when(connected_to_daemon, |element| {
                element.child(
                    navigation_cell("settings-api-access", "API access", None).on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.push(Route::ApiAccessMethods, context)),
                    ),
                )
            })
            .child(div().h(px(GAP_LARGE)))
            .child(
                navigation_cell("settings-support", "Report a problem", None).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::Support, context)),
                ),
            )
            .child(
                cell("settings-version", 0, false)
                    .child(cell_label("App version"))
                    .when(upgrade.is_some(), |element| element.child(status_dot(COLOR_RED)))
                    .child(label(version_text))
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(move |this, _, _, context| {
                            this.open_url(upgrade_url, false, context)
                        }),
                    ),
            )
            .when_some(upgrade, |element, upgrade| {
                element.child(cell_footer(format!(
                    "Update available. Install version {upgrade} to stay up to date."
                )))
            })
            .when(connected_to_daemon, |element| {
                element.child(self.preference_toggle(Preference::ShowBetaReleases, context))
            })
            .child(
                button_column()
                    .when(tunnel_up, |element| {
                        element.child(
                            button_action(
                                "settings-disconnect-quit",
                                "Disconnect & quit",
                                ButtonStyle::Destructive,
                                false,
                                None,
                            )
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.disconnect_and_quit(context)),
                            ),
                        )
                    })
                    .child(
                        button_action(
                            "settings-quit",
                            "Quit",
                            ButtonStyle::Destructive,
                            false,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, window, context| this.quit(&Quit, window, context)),
                        ),
                    ),
            )
    }

    pub(crate) fn render_user_interface_settings(
        &mut self,
        context: &mut Context<Self>,
    ) -> impl IntoElement {
        let current_locale = self.gui_settings.preferred_locale.clone();
        let locales = LOCALES.iter().map(|(code, name)| {
            let code = *code;
            selector_option(
                SharedString::from(format!("locale-{code}")),
                *name,
                code == current_locale,
                false,
            )
            .on_mouse_up(
                MouseButton::Left,
                context.listener(move |this, _, _, context| {
                    if set_locale(&mut this.gui_settings, code) {
                        log::info!("[settings] language set to {code}");
                        this.save_gui_settings(context);
                    }
                }),
            )
        })
        .collect::<Vec<_>>();

        page()
            .child(page_title("User interface settings"))
            .children(
                INTERFACE_PREFERENCES
                    .iter()
                    .map(|preference| self.preference_toggle(*preference, context))
                    .collect::<Vec<_>>(),
            )
            .child(section_header("Language"))
            .children(locales)
    }

    pub(crate) fn render_vpn_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let dns_available = vpn::dns_blockers_available(&settings);
        let blocker_count = vpn::enabled_blocker_count(&settings);
        let blockers = DnsBlocker::ALL.map(|blocker| {
            let enabled = blocker.is_enabled(&settings.tunnel_options.dns.default_options);
            toggle(
                blocker.label(),
                blocker.label(),
                enabled,
                !dns_available,
                context.listener(move |this, _, _, context| {
                    let change = vpn::set_dns_blocker(&this.store.settings, blocker, !enabled);
                    this.apply_change(change, context)
                }),
            )
            .pl(px(PADDING_CELL + INDENT))
        });
        let ipv6 = settings.tunnel_options.generic.enable_ipv6;
        let lockdown = settings.block_when_disconnected;
        let protocol = settings.tunnel_protocol();
        let openvpn_footer = vpn::openvpn_footer(&settings);

        page()
            .child(page_title("VPN settings"))
            .children(
                DAEMON_PREFERENCES
                    .iter()
                    .map(|preference| self.preference_toggle(*preference, context))
                    .collect::<Vec<_>>(),
            )
            .child(section_header(if blocker_count > 0 {
                format!("DNS content blockers ({blocker_count})")
            } else {
                "DNS content blockers".to_string()
            }))
            .children(blockers)
            .when(!dns_available, |element| {
                element.child(cell_footer(
                    "Disable \"Use custom DNS server\" below to activate these settings.",
                ))
            })
            .child(div().h(px(GAP_LARGE)))
            .child(toggle(
                "settings-ipv6",
                "In-tunnel IPv6",
                ipv6,
                self.blocking.is_blocked("enable-ipv6"),
                context.listener(move |this, _, _, context| {
                    this.apply_change(SettingsChange::EnableIpv6(!ipv6), context)
                }),
            ))
            .child(cell_footer(
                "When this feature is enabled, IPv6 can be used alongside IPv4 in the VPN tunnel to communicate with internet services.",
            ))
            .child(toggle(
                "settings-lockdown",
                "Lockdown mode",
                lockdown,
                self.blocking.is_blocked("block-when-disconnected"),
                context.listener(move |this, _, _, context| {
                    this.apply_change(SettingsChange::BlockWhenDisconnected(!lockdown), context)
                }),
            ))
            .child(cell_footer(
                "The app always blocks traffic while connecting and reconnecting. With lockdown mode on, traffic also stays blocked while disconnected.",
            ))
            .child(section_header("Tunnel protocol"))
            .child(selector(
                "tunnel-protocol",
                vec![
                    (TunnelProtocol::Wireguard, TunnelProtocol::Wireguard.label().to_string(), false),
                    (
                        TunnelProtocol::Openvpn,
                        TunnelProtocol::Openvpn.label().to_string(),
                        openvpn_footer.is_some() && protocol != TunnelProtocol::Openvpn,
                    ),
                ],
                &protocol,
                context,
                |this, protocol, context| {
                    this.apply_change(vpn::set_tunnel_protocol(protocol), context)
                },
            ))
            .children(openvpn_footer.map(cell_footer))
            .child(div().h(px(GAP_LARGE)))
            .child(
                navigation_cell("settings-wireguard", "WireGuard settings", None).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::WireguardSettings, context)),
                ),
            )
            .child(
                navigation_cell("settings-openvpn", "OpenVPN settings", None).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::OpenVpnSettings, context)),
                ),
            )
            .child(div().h(px(GAP_LARGE)))
            .child(self.render_custom_dns(&settings, context))
            .child(div().h(px(GAP_LARGE)))
            .child(
                navigation_cell("settings-import", "Server IP override", None).on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::SettingsImport, context)),
                ),
            )
    }

    fn render_custom_dns(&self, settings: &Settings, context: &Context<Self>) -> Div {
        let form = &self.custom_dns;
        let available = custom_dns::feature_available(settings);
        let enabled = form.is_enabled(settings);
        let expanded = form.list_expanded(settings);
        let addresses = settings.tunnel_options.dns.custom_options.addresses.clone();

        let rows = addresses.into_iter().map(|address| {
            let editing = form.editing.as_deref() == Some(address.as_str());
            let id = SharedString::from(format!("dns-{address}"));
            if editing {
                return div()
                    .flex()
                    .flex_col()
                    .px(px(PADDING_CELL + INDENT))
                    .py(px(GAP_EXTRA_SMALL))
                    .bg(rgb(CELL_NESTED))
                    .child(self.inputs.get(InputField::DnsEdit).clone())
                    .children(form.edit_error.clone().map(error_text))
                    .into_any_element();
            }
            let edit_address = address.clone();
            cell(id, 1, false)
                .child(cell_label(address.clone()).on_mouse_up(
                    MouseButton::Left,
                    context.listener(move |this, _, _, context| {
                        this.custom_dns.start_editing(&edit_address);
                        this.set_input_text(InputField::DnsEdit, &edit_address, context);
                        context.notify();
                    }),
                ))
                .child(
                    div()
                        .id(SharedString::from(format!("dns-remove-{address}")))
                        .cursor_pointer()
                        .text_color(rgb(TEXT_DIM))
                        .hover(|style| style.text_color(rgb(COLOR_RED)))
                        .child("✕")
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                let settings = this.store.settings.clone();
                                let change = this.custom_dns.remove(&settings, &address);
                                this.apply_change(change, context)
                            }),
                        ),
                )
                .into_any_element()
        });

        div()
            .flex()
            .flex_col()
            .child(toggle(
                "custom-dns",
                "Use custom DNS server",
                enabled,
                !available,
                context.listener(move |this, _, _, context| {
                    let settings = this.store.settings.clone();
                    if let Some(change) = this.custom_dns.toggle(&settings, !enabled) {
                        this.apply_change(change, context);
                    }
                    context.notify();
                }),
            ))
            .when(expanded, |element| {
                element
                    .children(rows)
                    .when(form.input_visible, |element| {
                        element.child(
                            div()
                                .flex()
                                .flex_col()
                                .px(px(PADDING_CELL + INDENT))
                                .py(px(GAP_EXTRA_SMALL))
                                .bg(rgb(CELL_NESTED))
                                .child(self.inputs.get(InputField::DnsAddress).clone())
                                .children(form.input_error.clone().map(error_text)),
                        )
                    })
                    .when(!form.input_visible, |element| {
                        element.child(
                            cell("dns-add", 1, false)
                                .child(cell_label("Add a server"))
                                .child(div().text_color(rgb(TEXT_DIM)).child("+"))
                                .on_mouse_up(
                                    MouseButton::Left,
                                    context.listener(|this, _, _, context| {
                                        this.custom_dns.show_input();
                                        this.set_input_text(InputField::DnsAddress, "", context);
                                        context.notify();
                                    }),
                                ),
                        )
                    })
            })
            .child(cell_footer(custom_dns::footer(settings)))
    }

    pub(crate) fn render_wireguard_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let relay_list = self.store.relay_list.clone();
        let relay_settings = relay_settings_or_default(&settings);
        let constraints = relay_settings.wireguard_constraints.clone();
        let form = self.wireguard_form.clone();

        let custom_port = constraints
            .port
            .lift()
            .filter(|port| !PORT_PRESETS.contains(*port))
            .copied();
        let mut port_choices = vec![(Constraint::Any, "Automatic".to_string(), false)];
        port_choices.extend(
            PORT_PRESETS
                .iter()
                .map(|port| (Constraint::Only(*port), port.to_string(), false)),
        );
        self.inputs.get(InputField::WireguardPort).update(context, |input, _| {
            input.invalid = form.custom_port_error.is_some();
        });
        self.inputs.get(InputField::Mtu).update(context, |input, _| {
            input.invalid = !form.mtu.is_valid();
        });

        let obfuscation_available = feature_available(Feature::Obfuscation, &settings);
        let obfuscation = settings.obfuscation_settings.clone();
        self.inputs.get(InputField::ShadowsocksPort).update(context, |input, _| {
            input.invalid = form.shadowsocks_port_error.is_some();
            input.disabled = !obfuscation_available;
        });
        let quantum_available = feature_available(Feature::QuantumResistance, &settings);
        let quantum = settings.tunnel_options.wireguard.quantum_resistant;
        let multihop = settings.multihop_enabled();
        let daita = settings.daita_enabled();

        page()
            .child(page_title("WireGuard settings"))
            .child(section_header("Port"))
            .child(selector(
                "wireguard-port",
                port_choices,
                &constraints.port,
                context,
                |this, port, context| {
                    let change = wireguard::set_port(&this.store.settings, port);
                    this.apply_change(change, context)
                },
            ))
            .child(
                cell("wireguard-port-custom", 1, false)
                    .child(
                        div()
                            .w(px(INDENT))
                            .text_color(rgb(COLOR_GREEN))
                            .when(custom_port.is_some(), |element| element.child("✓")),
                    )
                    .child(cell_label("Custom"))
                    .child(div().w(px(80.0)).child(self.inputs.get(InputField::WireguardPort).clone())),
            )
            .children(form.custom_port_error.clone().map(|error| form_column().child(error_text(error))))
            .child(cell_footer(format!(
                "The automatic setting will randomly choose from the valid port ranges shown below. Valid ranges: {}",
                format_ranges(&relay_list.wireguard.port_ranges)
            )))
            .child(section_header("Obfuscation"))
            .child(selector(
                "obfuscation",
                OBFUSCATION_TYPES
                    .iter()
                    .map(|kind| (*kind, kind.label().to_string(), !obfuscation_available))
                    .collect(),
                &obfuscation.selected,
                context,
                |this, selected, context| {
                    let change = wireguard::set_obfuscation(&this.store.settings, selected);
                    this.apply_change(change, context)
                },
            ))
            .when(obfuscation.selected == ObfuscationType::Udp2Tcp, |element| {
                let mut choices = vec![(Constraint::Any, "Automatic".to_string(), false)];
                choices.extend(
                    UDP2TCP_PORTS
                        .iter()
                        .map(|port| (Constraint::Only(*port), port.to_string(), false)),
                );
                element
                    .child(section_header("UDP-over-TCP port"))
                    .child(selector(
                        "udp2tcp-port",
                        choices,
                        &obfuscation.udp2tcp_port,
                        context,
                        |this, port, context| {
                            let change = wireguard::set_udp2tcp_port(&this.store.settings, port);
                            this.apply_change(change, context)
                        },
                    ))
            })
            .when(obfuscation.selected == ObfuscationType::Shadowsocks, |element| {
                element
                    .child(section_header("Shadowsocks port"))
                    .child(selector(
                        "shadowsocks-port",
                        vec![(Constraint::Any, "Automatic".to_string(), false)],
                        &obfuscation.shadowsocks_port,
                        context,
                        |this, port, context| {
                            let change = wireguard::set_shadowsocks_port(&this.store.settings, port);
                            this.apply_change(change, context)
                        },
                    ))
                    .child(
                        form_column()
                            .child(field("Custom", self.inputs.get(InputField::ShadowsocksPort)))
                            .children(form.shadowsocks_port_error.clone().map(error_text)),
                    )
                    .child(cell_footer(format!(
                        "Valid ranges: {}",
                        format_ranges(&relay_list.wireguard.shadowsocks_port_ranges)
                    )))
            })
            .children(unavailable_footer(Feature::Obfuscation, &settings).map(cell_footer))
            .child(section_header("Quantum-resistant tunnel"))
            .child(selector(
                "quantum-resistant",
                [None, Some(true), Some(false)]
                    .into_iter()
                    .map(|value| (value, quantum_resistant_label(value).to_string(), !quantum_available))
                    .collect(),
                &quantum,
                context,
                |this, value, context| {
                    this.apply_change(wireguard::set_quantum_resistant(value), context)
                },
            ))
            .children(unavailable_footer(Feature::QuantumResistance, &settings).map(cell_footer))
            .child(section_header("IP version"))
            .child(selector(
                "ip-version",
                vec![
                    (Constraint::Any, "Automatic".to_string(), false),
                    (Constraint::Only(IpVersion::Ipv4), "IPv4".to_string(), false),
                    (Constraint::Only(IpVersion::Ipv6), "IPv6".to_string(), false),
                ],
                &constraints.ip_version,
                context,
                |this, ip_version, context| {
                    let change = wireguard::set_ip_version(&this.store.settings, ip_version);
                    this.apply_change(change, context)
                },
            ))
            .child(div().h(px(GAP_LARGE)))
            .child(
                navigation_cell(
                    "wireguard-multihop",
                    "Multihop",
                    Some(on_off(multihop).to_string()),
                )
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.push(Route::MultihopSettings, context)),
                ),
            )
            .child(
                navigation_cell("wireguard-daita", "DAITA", Some(on_off(daita).to_string()))
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.push(Route::DaitaSettings, context)),
                    ),
            )
            .child(section_header("MTU"))
            .child(form_column().child(self.inputs.get(InputField::Mtu).clone()))
            .child(cell_footer(form.mtu.footer()))
    }

    pub(crate) fn render_openvpn_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let relay_settings = relay_settings_or_default(&settings);
        let constraints = relay_settings.openvpn_constraints.clone();
        let bridge_available = feature_available(Feature::BridgeMode, &settings);
        let mssfix = self.openvpn_form.mssfix.clone();
        self.inputs.get(InputField::Mssfix).update(context, |input, _| {
            input.invalid = !mssfix.is_valid();
        });

        let ports: Vec<(Constraint<u16>, String, bool)> = port_options(&settings)
            .into_iter()
            .map(|port| {
                let text = match port.lift() {
                    Some(port) => port.to_string(),
                    None => "Automatic".to_string(),
                };
                (port, text, false)
            })
            .collect();
        let port_title = constraints
            .protocol
            .lift()
            .map(|protocol| format!("{} port", protocol.label()));

        page()
            .child(page_title("OpenVPN settings"))
            .child(section_header("Transport protocol"))
            .child(selector(
                "transport-protocol",
                vec![
                    (Constraint::Any, "Automatic".to_string(), false),
                    (
                        Constraint::Only(TransportProtocol::Udp),
                        TransportProtocol::Udp.label().to_string(),
                        false,
                    ),
                    (
                        Constraint::Only(TransportProtocol::Tcp),
                        TransportProtocol::Tcp.label().to_string(),
                        false,
                    ),
                ],
                &constraints.protocol,
                context,
                |this, protocol, context| {
                    this.apply_change(openvpn::set_transport_protocol(protocol), context)
                },
            ))
            .when_some(port_title, |element, title| {
                element.child(section_header(title)).child(selector(
                    "openvpn-port",
                    ports,
                    &constraints.port,
                    context,
                    |this, port, context| {
                        let change = openvpn::set_port(&this.store.settings, port);
                        this.apply_change(change, context)
                    },
                ))
            })
            .child(section_header("Bridge mode"))
            .child(selector(
                "bridge-mode",
                [BridgeState::Auto, BridgeState::On, BridgeState::Off]
                    .into_iter()
                    .map(|state| {
                        let disabled = !bridge_available && state == BridgeState::On;
                        (state, state.label().to_string(), disabled)
                    })
                    .collect(),
                &settings.bridge_state,
                context,
                |this, state, context| {
                    this.apply_change(openvpn::set_bridge_state(state), context)
                },
            ))
            .child(cell_footer(
                unavailable_footer(Feature::BridgeMode, &settings)
                    .unwrap_or("This allows access to the VPN in censored networks by routing traffic through an intermediate bridge server."),
            ))
            .child(section_header("Mssfix"))
            .child(form_column().child(self.inputs.get(InputField::Mssfix).clone()))
            .child(cell_footer(format!(
                "Change OpenVPN MSS value. {}",
                mssfix.footer()
            )))
    }

    pub(crate) fn render_daita_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let available = feature_available(Feature::Daita, &settings);
        let enabled = settings.daita_enabled();
        let smart_routing = daita::smart_routing_enabled(&settings);
        let smart_routing_editable = daita::smart_routing_editable(&settings);
        let [first, second] = daita::description();

        page()
            .child(page_title("DAITA"))
            .child(paragraph(first))
            .child(div().h(px(GAP_SMALL)))
            .child(paragraph(second))
            .child(div().h(px(GAP_LARGE)))
            .child(toggle(
                "daita-enable",
                "Enable",
                enabled,
                !available || self.blocking.is_blocked("enable-daita"),
                context.listener(move |this, _, _, context| {
                    this.apply_change(daita::set_enabled(!enabled), context)
                }),
            ))
            .child(toggle(
                "daita-smart-routing",
                "Smart routing",
                smart_routing,
                !smart_routing_editable,
                context.listener(move |this, _, _, context| {
                    this.apply_change(daita::set_smart_routing(!smart_routing), context)
                }),
            ))
            .child(cell_footer(
                unavailable_footer(Feature::Daita, &settings).unwrap_or(
                    "Smart routing makes it possible to use DAITA with any server by automatically picking an entry server that supports it.",
                ),
            ))
    }

    pub(crate) fn render_multihop_settings(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let settings = self.store.settings.clone();
        let available = feature_available(Feature::Multihop, &settings);
        let enabled = settings.multihop_enabled();

        page()
            .child(page_title("Multihop"))
            .child(paragraph(
                "Multihop routes your traffic into one WireGuard server and out another, making it harder to trace.",
            ))
            .child(div().h(px(GAP_LARGE)))
            .child(toggle(
                "multihop-enable",
                "Enable",
                enabled,
                !available || self.blocking.is_blocked("relay-settings"),
                context.listener(move |this, _, _, context| {
                    let change = wireguard::set_multihop(&this.store.settings, !enabled);
                    this.apply_change(change, context)
                }),
            ))
            .children(unavailable_footer(Feature::Multihop, &settings).map(cell_footer))
    }

    pub(crate) fn render_settings_import(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let busy = self.blocking.is_blocked("import");
        let can_import = self.import_form.can_import_text();
        let status = self.import_form.status.clone();
        self.inputs.get(InputField::ImportText).update(context, |input, _| {
            input.disabled = busy;
            input.invalid = status.as_ref().is_some_and(|status| !status.is_success());
        });

        page()
            .child(page_title("Server IP override"))
            .child(paragraph(
                "Import files or text with new IP addresses for the servers in the Select location view.",
            ))
            .child(
                form_column()
                    .child(field("Paste settings", self.inputs.get(InputField::ImportText)))
                    .when_some(status, |element, status| {
                        element.child(
                            div()
                                .flex()
                                .flex_col()
                                .gap(px(GAP_EXTRA_SMALL))
                                .child(
                                    div()
                                        .text_size(px(TEXT_SIZE_SMALL))
                                        .font_weight(gpui::FontWeight::BOLD)
                                        .text_color(rgb(if status.is_success() {
                                            COLOR_GREEN
                                        } else {
                                            COLOR_RED
                                        }))
                                        .child(status.title()),
                                )
                                .child(label(status.detail().to_string())),
                        )
                    }),
            )
            .child(
                button_column()
                    .child(
                        button_action(
                            "import-text",
                            "Import via text",
                            ButtonStyle::Success,
                            busy || !can_import,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.import_text(context)),
                        ),
                    )
                    .child(
                        button_action("import-file", "Import file", ButtonStyle::Neutral, busy, None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.import_file(context)),
                            ),
                    ),
            )
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "On" } else { "Off" }
}
