use crate::{
    account::{TooManyDevices, capitalize_device_name},
    connection::ButtonStyle,
    navigation::Route,
    notifications::{TroubleshootButton, TroubleshootInfo},
    problem_report::{self, ProblemReport, SendState},
    settings::{
        ConfirmationGate,
        api_access::{self, ApiAccessPage},
        custom_dns::CustomDnsForm,
        split_tunneling::SplitTunnelingForm,
    },
    store::AppStore,
};

/// What pressing a dialog button does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogResponse {
    Dismiss,
    ConfirmSetting,
    CancelSetting,
    ConfirmCustomDns,
    AbortCustomDns,
    RemoveDevice,
    KeepDevice,
    RemoveAccessMethod,
    KeepAccessMethod,
    SaveAccessMethodAnyway,
    KeepEditingAccessMethod,
    LaunchApplication,
    CancelLaunch,
    DismissLaunchError,
    SendWithoutEmail,
    CancelSend,
    UpgradeApp,
    AcknowledgeOutdated,
    Troubleshoot(TroubleshootButton),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogButton {
    pub label: String,
    pub style: ButtonStyle,
    pub response: DialogResponse,
}

impl DialogButton {
    fn new(label: impl Into<String>, style: ButtonStyle, response: DialogResponse) -> Self {
        Self {
            label: label.into(),
            style,
            response,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogContent {
    pub message: String,
    pub details: Vec<String>,
    pub buttons: Vec<DialogButton>,
    /// Response used when the dialog is closed with Escape.
    pub cancel: DialogResponse,
}

/// View state that can put a modal dialog on screen.
pub struct DialogSources<'a> {
    pub route: &'a Route,
    pub store: &'a AppStore,
    pub error: Option<&'a str>,
    pub troubleshoot: Option<&'a TroubleshootInfo>,
    pub confirmation_gate: &'a ConfirmationGate,
    pub custom_dns: &'a CustomDnsForm,
    pub too_many_devices: Option<&'a TooManyDevices>,
    pub api_access: &'a ApiAccessPage,
    pub split_tunneling: &'a SplitTunnelingForm,
    pub problem_report: &'a ProblemReport,
}

/// At most one dialog is shown. Failures win over confirmations, which win over the
/// page's own prompts.
pub fn active_dialog(sources: &DialogSources<'_>) -> Option<DialogContent> {
    if let Some(message) = sources.error {
        return Some(DialogContent {
            message: message.to_string(),
            details: Vec::new(),
            buttons: vec![DialogButton::new("Got it!", ButtonStyle::Neutral, DialogResponse::Dismiss)],
            cancel: DialogResponse::Dismiss,
        });
    }
    if let Some(info) = sources.troubleshoot {
        return Some(troubleshoot_dialog(info));
    }
    if let Some(confirmation) = sources.confirmation_gate.pending() {
        return Some(DialogContent {
            message: confirmation.message().to_string(),
            details: Vec::new(),
            buttons: vec![
                DialogButton::new(
                    confirmation.confirm_label(),
                    ButtonStyle::Destructive,
                    DialogResponse::ConfirmSetting,
                ),
                DialogButton::new("Back", ButtonStyle::Neutral, DialogResponse::CancelSetting),
            ],
            cancel: DialogResponse::CancelSetting,
        });
    }
    route_dialog(sources)
}

fn troubleshoot_dialog(info: &TroubleshootInfo) -> DialogContent {
    let mut buttons: Vec<DialogButton> = info
        .buttons
        .iter()
        .map(|button| {
            DialogButton::new(
                button.label(),
                ButtonStyle::Neutral,
                DialogResponse::Troubleshoot(*button),
            )
        })
        .collect();
    buttons.push(DialogButton::new("Back", ButtonStyle::Neutral, DialogResponse::Dismiss));
    DialogContent {
        message: info.details.clone(),
        details: info.steps.iter().map(|step| format!("• {step}")).collect(),
        buttons,
        cancel: DialogResponse::Dismiss,
    }
}

fn route_dialog(sources: &DialogSources<'_>) -> Option<DialogContent> {
    match sources.route {
        Route::VpnSettings => {
            let message = sources.custom_dns.confirmation_message()?;
            Some(DialogContent {
                message: message.to_string(),
                details: Vec::new(),
                buttons: vec![
                    DialogButton::new(
                        "Add anyway",
                        ButtonStyle::Destructive,
                        DialogResponse::ConfirmCustomDns,
                    ),
                    DialogButton::new("Back", ButtonStyle::Neutral, DialogResponse::AbortCustomDns),
                ],
                cancel: DialogResponse::AbortCustomDns,
            })
        }
        Route::TooManyDevices => {
            let device = sources.too_many_devices?.confirm_removal.as_ref()?;
            Some(DialogContent {
                message: format!(
                    "Are you sure you want to log {} out?",
                    capitalize_device_name(&device.name)
                ),
                details: Vec::new(),
                buttons: vec![
                    DialogButton::new(
                        "Yes, log out device",
                        ButtonStyle::Destructive,
                        DialogResponse::RemoveDevice,
                    ),
                    DialogButton::new("Back", ButtonStyle::Neutral, DialogResponse::KeepDevice),
                ],
                cancel: DialogResponse::KeepDevice,
            })
        }
        Route::ApiAccessMethods => {
            let method = sources.api_access.remove_confirmation.as_ref()?;
            let in_use = api_access::is_in_use(method, sources.store.current_access_method.as_ref());
            Some(DialogContent {
                message: api_access::remove_title(method),
                details: api_access::remove_message(in_use)
                    .map(str::to_string)
                    .into_iter()
                    .collect(),
                buttons: vec![
                    DialogButton::new(
                        "Delete",
                        ButtonStyle::Destructive,
                        DialogResponse::RemoveAccessMethod,
                    ),
                    DialogButton::new(
                        "Cancel",
                        ButtonStyle::Neutral,
                        DialogResponse::KeepAccessMethod,
                    ),
                ],
                cancel: DialogResponse::KeepAccessMethod,
            })
        }
        Route::EditApiAccessMethod(_) if sources.api_access.save_unreachable => {
            Some(DialogContent {
                message: "API unreachable, save anyway?".into(),
                details: vec![
                    "The app could not reach the API through this method. You can still save it, but it will not be used until it becomes reachable.".into(),
                ],
                buttons: vec![
                    DialogButton::new(
                        "Save anyway",
                        ButtonStyle::Destructive,
                        DialogResponse::SaveAccessMethodAnyway,
                    ),
                    DialogButton::new(
                        "Back",
                        ButtonStyle::Neutral,
                        DialogResponse::KeepEditingAccessMethod,
                    ),
                ],
                cancel: DialogResponse::KeepEditingAccessMethod,
            })
        }
        Route::SplitTunneling => split_tunneling_dialog(sources.split_tunneling),
        Route::Support => support_dialog(sources),
        _ => None,
    }
}

fn split_tunneling_dialog(form: &SplitTunnelingForm) -> Option<DialogContent> {
    if let Some(error) = &form.launch_error {
        return Some(DialogContent {
            message: error.clone(),
            details: Vec::new(),
            buttons: vec![DialogButton::new(
                "Close",
                ButtonStyle::Neutral,
                DialogResponse::DismissLaunchError,
            )],
            cancel: DialogResponse::DismissLaunchError,
        });
    }
    let warning = form.launch_warning.as_ref()?;
    let mut buttons = Vec::new();
    if warning.can_launch() {
        buttons.push(DialogButton::new(
            "Launch",
            ButtonStyle::Success,
            DialogResponse::LaunchApplication,
        ));
    }
    buttons.push(DialogButton::new("Cancel", ButtonStyle::Neutral, DialogResponse::CancelLaunch));
    Some(DialogContent {
        message: warning.message(),
        details: Vec::new(),
        buttons,
        cancel: DialogResponse::CancelLaunch,
    })
}

fn support_dialog(sources: &DialogSources<'_>) -> Option<DialogContent> {
    let report = sources.problem_report;
    if report.state == SendState::Confirm {
        return Some(DialogContent {
            message: problem_report::NO_EMAIL_WARNING.into(),
            details: Vec::new(),
            buttons: vec![
                DialogButton::new(
                    "Send anyway",
                    ButtonStyle::Destructive,
                    DialogResponse::SendWithoutEmail,
                ),
                DialogButton::new("Back", ButtonStyle::Neutral, DialogResponse::CancelSend),
            ],
            cancel: DialogResponse::CancelSend,
        });
    }
    if report.show_outdated_warning(&sources.store.version) {
        return Some(DialogContent {
            message: problem_report::OUTDATED_WARNING.into(),
            details: Vec::new(),
            buttons: vec![
                DialogButton::new("Upgrade app", ButtonStyle::Success, DialogResponse::UpgradeApp),
                DialogButton::new(
                    "Continue anyway",
                    ButtonStyle::Destructive,
                    DialogResponse::AcknowledgeOutdated,
                ),
            ],
            cancel: DialogResponse::AcknowledgeOutdated,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        daemon::types::{AppVersionInfo, Settings},
        settings::SettingsChange,
    };
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: AppStore,
        gate: ConfirmationGate,
        custom_dns: CustomDnsForm,
        api_access: ApiAccessPage,
        split_tunneling: SplitTunnelingForm,
        problem_report: ProblemReport,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = AppStore::new("2025.3");
            store.version.info = AppVersionInfo {
                supported: true,
                suggested_upgrade: None,
                suggested_is_beta: false,
            };
            Self {
                store,
                gate: ConfirmationGate::default(),
                custom_dns: CustomDnsForm::default(),
                api_access: ApiAccessPage::default(),
                split_tunneling: SplitTunnelingForm::default(),
                problem_report: ProblemReport::default(),
            }
        }

        fn dialog(&self, route: &Route, error: Option<&str>) -> Option<DialogContent> {
            active_dialog(&DialogSources {
                route,
                store: &self.store,
                error,
                troubleshoot: None,
                confirmation_gate: &self.gate,
                custom_dns: &self.custom_dns,
                too_many_devices: None,
                api_access: &self.api_access,
                split_tunneling: &self.split_tunneling,
                problem_report: &self.problem_report,
            })
        }
    }

    #[test]
    fn nothing_is_shown_by_default() {
        let fixture = Fixture::new();
        assert_eq!(fixture.dialog(&Route::Main, None), None);
        assert_eq!(fixture.dialog(&Route::Support, None), None);
    }

    #[test]
    fn errors_take_precedence_over_confirmations() {
        let mut fixture = Fixture::new();
        let parked = fixture
            .gate
            .request(SettingsChange::BlockWhenDisconnected(true), &Settings::default());
        assert_eq!(parked, None);

        let dialog = fixture.dialog(&Route::VpnSettings, Some("Failed")).unwrap();
        assert_eq!(dialog.message, "Failed");
        assert_eq!(dialog.cancel, DialogResponse::Dismiss);

        let dialog = fixture.dialog(&Route::VpnSettings, None).unwrap();
        assert_eq!(dialog.cancel, DialogResponse::CancelSetting);
        assert_eq!(dialog.buttons[0].label, "Enable anyway");
    }

    #[test]
    fn public_dns_address_asks_before_adding() {
        let mut fixture = Fixture::new();
        fixture.custom_dns.set_input("8.8.8.8");
        assert_eq!(fixture.custom_dns.submit(&Settings::default()), None);

        let dialog = fixture.dialog(&Route::VpnSettings, None).unwrap();
        assert_eq!(dialog.buttons[0].response, DialogResponse::ConfirmCustomDns);
        assert_eq!(fixture.dialog(&Route::Main, None), None);
    }

    #[test]
    fn empty_email_confirmation_and_outdated_warning() {
        let mut fixture = Fixture::new();
        fixture.problem_report.state = SendState::Confirm;
        let dialog = fixture.dialog(&Route::Support, None).unwrap();
        assert_eq!(dialog.message, problem_report::NO_EMAIL_WARNING);

        fixture.problem_report.state = SendState::Initial;
        fixture.store.version.info.supported = false;
        let dialog = fixture.dialog(&Route::Support, None).unwrap();
        assert_eq!(dialog.cancel, DialogResponse::AcknowledgeOutdated);
    }
}
