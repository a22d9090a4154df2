use gpui::{Context, MouseButton, div, prelude::*, px, rgb};

use super::{form_column, page};
use crate::{
    app::{InputField, VpnApp},
    components::*,
    connection::ButtonStyle,
    problem_report::{self, FAILED_DETAIL, HEADER, SendState, SendStep, collect_log},
    theme::*,
};

impl VpnApp {
    /// Account numbers the daemon strips from the collected log.
    fn numbers_to_redact(&self) -> Vec<String> {
        let account = &self.store.account;
        account
            .account_number()
            .map(str::to_string)
            .into_iter()
            .chain(account.account_history.clone())
            .collect()
    }

    /// Collects the log in the background as soon as the page opens so sending is quick.
    pub(crate) fn collect_problem_report(&mut self, context: &mut Context<Self>) {
        if self.problem_report.report_path.is_some() {
            return;
        }
        let to_redact = self.numbers_to_redact();
        self.spawn_daemon(
            "collect-problem-report",
            context,
            move |daemon| collect_log(daemon, &to_redact),
            |this, report_path, _| {
                if this.problem_report.report_path.is_none() {
                    this.problem_report.report_path = report_path;
                }
            },
        );
    }

    pub(crate) fn send_problem_report(&mut self, context: &mut Context<Self>) {
        match self.problem_report.on_send() {
            SendStep::Ignore | SendStep::AskForConfirmation => {
                context.notify();
            }
            SendStep::Send => {
                let report = self.problem_report.clone();
                let to_redact = self.numbers_to_redact();
                log::info!("[problem-report] sending report");
                self.run_daemon(
                    "send-problem-report",
                    context,
                    move |daemon| {
                        problem_report::send(
                            daemon,
                            &report.email,
                            &report.message,
                            report.report_path,
                            &to_redact,
                        )
                    },
                    |this, (report_path, result), context| {
                        this.problem_report.report_path = report_path;
                        let sent = result.is_ok();
                        this.problem_report.finish(result);
                        if sent {
                            this.set_input_text(InputField::Message, "", context);
                        }
                    },
                );
            }
        }
    }

    fn view_log(&mut self, context: &mut Context<Self>) {
        match self.problem_report.report_path.clone() {
            Some(path) => self.open_url(&path, false, context),
            None => self.collect_problem_report(context),
        }
    }

    pub(crate) fn render_support(&mut self, context: &mut Context<Self>) -> impl IntoElement {
        let report = self.problem_report.clone();
        let editable = matches!(report.state, SendState::Initial | SendState::Confirm);
        for field in [InputField::Email, InputField::Message] {
            self.inputs.get(field).update(context, |input, _| input.disabled = !editable);
        }

        let body = match &report.state {
            SendState::Initial | SendState::Confirm => form_column()
                .child(self.inputs.get(InputField::Email).clone())
                .child(self.inputs.get(InputField::Message).clone()),
            SendState::Sending => form_column()
                .child(status_title("Sending...", TEXT_WHITE))
                .child(spinner("Sending problem report")),
            SendState::Success => form_column()
                .child(status_title("Sent", COLOR_GREEN))
                .child(label("Thanks! We will look into this."))
                .children(report.reach_back_message().map(label)),
            SendState::Failed(error) => form_column()
                .child(status_title("Failed to send", COLOR_RED))
                .child(label(FAILED_DETAIL))
                .child(error_text(error.clone())),
        };

        let buttons = match &report.state {
            SendState::Initial | SendState::Confirm => button_column()
                .child(
                    button_action(
                        "support-view-logs",
                        "View app logs",
                        ButtonStyle::Neutral,
                        self.blocking.is_blocked("collect-problem-report"),
                        None,
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.view_log(context)),
                    ),
                )
                .child(
                    button_action(
                        "support-send",
                        "Send",
                        ButtonStyle::Success,
                        !report.validate(),
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.send_problem_report(context)),
                    ),
                ),
            SendState::Sending | SendState::Success => button_column(),
            SendState::Failed(_) => button_column()
                .child(
                    button_action("support-edit", "Edit message", ButtonStyle::Neutral, false, None)
                        .on_mouse_up(
                            MouseButton::Left,
                            context.listener(|this, _, _, context| {
                                this.problem_report.edit_message();
                                context.notify();
                            }),
                        ),
                )
                .child(
                    button_action(
                        "support-retry",
                        "Try again",
                        ButtonStyle::Success,
                        false,
                        Some(&self.primary_focus_handle),
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| this.send_problem_report(context)),
                    ),
                ),
        };

        page()
            .child(page_title("Report a problem"))
            .when(report.shows_header(), |element| element.child(paragraph(HEADER)))
            .child(body)
            .child(buttons)
    }
}

fn status_title(text: &'static str, color: u32) -> gpui::Div {
    div()
        .text_size(px(TEXT_SIZE_LARGE))
        .font_weight(gpui::FontWeight::BOLD)
        .text_color(rgb(color))
        .child(text)
}
