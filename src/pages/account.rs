use chrono::Utc;
use gpui::{Context, MouseButton, div, prelude::*, px, rgb};

use super::{form_column, page};
use crate::{
    account::{
        self, RecoveryAction, VoucherState, added_time_text, capitalize_device_name,
        format_account_number, format_expiry_date, normalize_voucher, recovery_action,
        voucher_state_for,
    },
    app::{InputField, VpnApp},
    components::*,
    connection::{ButtonStyle, TunnelCommand},
    navigation::Route,
    notifications::ACCOUNT_URL,
    settings::SettingsChange,
    store::StoreAction,
    theme::*,
};

impl VpnApp {
    fn logout(&mut self, context: &mut Context<Self>) {
        log::info!("[account] logging out");
        self.run_daemon(
            "logout",
            context,
            |daemon| daemon.logout(),
            |this, result, _| {
                if let Err(error) = result {
                    log::error!("[account] failed to log out: {error}");
                    this.error_dialog = Some(error.user_message());
                }
            },
        );
    }

    pub(crate) fn submit_voucher(&mut self, context: &mut Context<Self>) {
        let code = normalize_voucher(&self.input_text(InputField::Voucher, context));
        if code.is_empty() || self.voucher == VoucherState::Submitting {
            return;
        }
        self.voucher = VoucherState::Submitting;
        self.run_daemon(
            "voucher",
            context,
            move |daemon| daemon.submit_voucher(&code),
            |this, result, context| {
                this.voucher = voucher_state_for(result);
                if let VoucherState::Success { new_expiry, .. } = this.voucher {
                    this.dispatch(StoreAction::AccountExpiry(Some(new_expiry)), context);
                }
            },
        );
    }

    /// After redeeming from the out-of-time page the user lands on the confirmation page,
    /// otherwise back where the voucher page was opened.
    fn leave_voucher(&mut self, context: &mut Context<Self>) {
        let succeeded = matches!(self.voucher, VoucherState::Success { .. });
        if succeeded && self.history.contains(&Route::ExpiredAccount) {
            self.reset(Route::TimeAdded, context);
        } else {
            self.pop(context);
        }
    }

    fn run_recovery_action(&mut self, action: RecoveryAction, context: &mut Context<Self>) {
        match action {
            RecoveryAction::OpenBrowser => self.open_url(ACCOUNT_URL, true, context),
            RecoveryAction::DisableBlockWhenDisconnected => {
                self.apply_change(SettingsChange::BlockWhenDisconnected(false), context)
            }
            RecoveryAction::Disconnect => {
                self.run_tunnel_command(TunnelCommand::Disconnect, context)
            }
        }
    }

    pub(crate) fn render_account(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let account_slice = &self.store.account;
        let account_number = account_slice
            .account_number()
            .map(format_account_number)
            .unwrap_or_default();
        let device_name = account_slice
            .device_name()
            .map(capitalize_device_name)
            .unwrap_or_default();
        let now = Utc::now();
        let (paid_until, expired) = match account_slice.expiry {
            Some(expiry) => (format_expiry_date(expiry), account::has_expired(expiry, now)),
            None => (String::new(), false),
        };
        let busy = self.blocking.is_blocked("logout");

        page()
            .child(page_title("Account"))
            .child(
                form_column()
                    .child(account_row("Device name", device_name))
                    .child(account_row("Account number", account_number))
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .gap(px(GAP_EXTRA_SMALL))
                            .child(label("Paid until"))
                            .child(
                                div()
                                    .text_size(px(TEXT_SIZE_MEDIUM))
                                    .text_color(rgb(if expired { COLOR_RED } else { TEXT_WHITE }))
                                    .child(if expired {
                                        "OUT OF TIME".to_string()
                                    } else {
                                        paid_until
                                    }),
                            ),
                    ),
            )
            .child(
                button_column()
                    .child(
                        button_action(
                            "account-buy",
                            "Buy more credit",
                            ButtonStyle::Success,
                            false,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.open_url(ACCOUNT_URL, true, context)
                            }),
                        ),
                    )
                    .child(
                        button_action(
                            "account-voucher",
                            "Redeem voucher",
                            ButtonStyle::Success,
                            false,
                            None,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.push(Route::RedeemVoucher, context)
                            }),
                        ),
                    )
                    .child(
                        button_action("account-logout", "Log out", ButtonStyle::Destructive, busy, None)
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.logout(context)),
                            ),
                    ),
            )
    }

    pub(crate) fn render_expired_account(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let action = recovery_action(
            &self.store.tunnel_state,
            self.store.settings.block_when_disconnected,
        );
        let blocked = action != RecoveryAction::OpenBrowser;

        page()
            .pt(px(GAP_LARGE * 2.0))
            .child(page_title("Out of time"))
            .child(paragraph(
                "You have no more VPN time left on this account. Either buy credit on our website or redeem a voucher.",
            ))
            .when(blocked, |element| {
                element.child(paragraph(
                    "Your internet is currently blocked. To be able to buy credit, you first need to unblock it.",
                ))
            })
            .child(
                button_column()
                    .child(
                        button_action(
                            "expired-recovery",
                            action.label(),
                            if blocked {
                                ButtonStyle::Destructive
                            } else {
                                ButtonStyle::Success
                            },
                            false,
                            Some(&self.primary_focus_handle),
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(move |this, _, _, context| {
                                this.run_recovery_action(action, context)
                            }),
                        ),
                    )
                    .child(
                        button_action(
                            "expired-voucher",
                            "Redeem voucher",
                            ButtonStyle::Success,
                            false,
                            None,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.push(Route::RedeemVoucher, context)
                            }),
                        ),
                    ),
            )
    }

    pub(crate) fn render_redeem_voucher(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let state = self.voucher.clone();
        let submitting = state == VoucherState::Submitting;
        let code = normalize_voucher(&self.input_text(InputField::Voucher, context));
        self.inputs.get(InputField::Voucher).update(context, |input, _| {
            input.invalid = matches!(state, VoucherState::Failure(_));
            input.disabled = submitting || matches!(state, VoucherState::Success { .. });
        });

        let status = match &state {
            VoucherState::Idle => None,
            VoucherState::Submitting => Some(spinner("Verifying voucher...").into_any_element()),
            VoucherState::Success { seconds_added, .. } => Some(
                div()
                    .flex()
                    .flex_col()
                    .gap(px(GAP_EXTRA_SMALL))
                    .text_color(rgb(COLOR_GREEN))
                    .child("Voucher was successfully redeemed.")
                    .child(label(added_time_text(*seconds_added)))
                    .into_any_element(),
            ),
            VoucherState::Failure(message) => Some(error_text(message.clone()).into_any_element()),
        };
        let done = matches!(state, VoucherState::Success { .. });

        page()
            .child(page_title("Redeem voucher"))
            .child(paragraph("Enter voucher code"))
            .child(
                form_column()
                    .child(self.inputs.get(InputField::Voucher).clone())
                    .children(status),
            )
            .child(
                button_column()
                    .when(!done, |element| {
                        element.child(
                            button_action(
                                "voucher-redeem",
                                "Redeem",
                                ButtonStyle::Success,
                                submitting || code.is_empty(),
                                Some(&self.primary_focus_handle),
                            )
                            .on_mouse_up(
                                MouseButton::Left,
                                context.listener(|this, _, _, context| this.submit_voucher(context)),
                            ),
                        )
                    })
                    .child(
                        button_action(
                            "voucher-leave",
                            if done { "Next" } else { "Cancel" },
                            if done { ButtonStyle::Success } else { ButtonStyle::Neutral },
                            submitting,
                            None,
                        )
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| this.leave_voucher(context)),
                        ),
                    ),
            )
    }

    pub(crate) fn render_time_added(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let now = Utc::now();
        let detail = match &self.voucher {
            VoucherState::Success { seconds_added, .. } => added_time_text(*seconds_added),
            _ => self
                .store
                .account
                .expiry
                .map(|expiry| {
                    format!(
                        "You have {} left on this account.",
                        account::remaining_duration_text(expiry, now)
                    )
                })
                .unwrap_or_default(),
        };

        page()
            .pt(px(GAP_LARGE * 2.0))
            .child(page_title("Time was added"))
            .child(paragraph(detail))
            .child(
                button_column().child(
                    button_action(
                        "time-added-next",
                        "Next",
                        ButtonStyle::Success,
                        false,
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| {
                            this.voucher = VoucherState::Idle;
                            this.reset(Route::Main, context)
                        }),
                    ),
                ),
            )
    }
}

fn account_row(title: &'static str, value: String) -> impl IntoElement {
    div()
        .flex()
        .flex_col()
        .gap(px(GAP_EXTRA_SMALL))
        .child(label(title))
        .child(
            div()
                .text_size(px(TEXT_SIZE_MEDIUM))
                .text_color(rgb(TEXT_WHITE))
                .child(value),
        )
}
