use crate::{
    daemon::{Daemon, DaemonError},
    store::VersionSlice,
};

pub const HEADER: &str = "To help you more effectively, your app’s log file will be attached to this message. Your data will remain secure and private, as it is anonymised before being sent over an encrypted channel.";
pub const MESSAGE_PLACEHOLDER: &str = "To assist you better, please write in English or Swedish and include which country you are connecting from.";
pub const NO_EMAIL_WARNING: &str = "You are about to send the problem report without a way for us to get back to you. If you want an answer to your report you will have to enter an email address.";
pub const OUTDATED_WARNING: &str = "You are using an old version of the app. Please upgrade and see if the problem still exists before sending a report.";
pub const FAILED_DETAIL: &str = "If you exit the form and try again later, the information you already entered will still be here.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SendState {
    #[default]
    Initial,
    /// Waiting for the user to accept sending without an email address.
    Confirm,
    Sending,
    Success,
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendStep {
    Ignore,
    AskForConfirmation,
    Send,
}

/// Problem report form. Lives as long as the app so drafts survive leaving the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemReport {
    pub email: String,
    pub message: String,
    pub state: SendState,
    /// Path of the collected log, reused for every send attempt.
    pub report_path: Option<String>,
    pub outdated_acknowledged: bool,
}

impl ProblemReport {
    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    pub fn validate(&self) -> bool {
        !self.message.trim().is_empty()
    }

    pub fn shows_header(&self) -> bool {
        matches!(self.state, SendState::Initial | SendState::Confirm)
    }

    /// Advances the send flow. An empty email asks for confirmation once.
    pub fn on_send(&mut self) -> SendStep {
        if !self.validate() {
            return SendStep::Ignore;
        }
        match self.state {
            SendState::Initial if self.email.trim().is_empty() => {
                self.state = SendState::Confirm;
                SendStep::AskForConfirmation
            }
            SendState::Initial | SendState::Confirm | SendState::Failed(_) => {
                self.state = SendState::Sending;
                SendStep::Send
            }
            SendState::Sending | SendState::Success => SendStep::Ignore,
        }
    }

    pub fn cancel_confirmation(&mut self) {
        if self.state == SendState::Confirm {
            self.state = SendState::Initial;
        }
    }

    pub fn edit_message(&mut self) {
        self.state = SendState::Initial;
    }

    pub fn finish(&mut self, result: Result<(), DaemonError>) {
        match result {
            Ok(()) => {
                self.state = SendState::Success;
                self.message.clear();
                self.report_path = None;
            }
            Err(error) => {
                log::warn!("[problem-report] failed to send report: {error}");
                self.state = SendState::Failed(error.user_message());
            }
        }
    }

    /// Leaving after a successful send starts over with an empty form.
    pub fn leave(&mut self) {
        if matches!(self.state, SendState::Success | SendState::Sending) {
            return;
        }
        self.state = SendState::Initial;
    }

    /// Starts over once a sent report has been seen. The email is kept for the success
    /// page and dropped here.
    pub fn reset_after_success(&mut self) -> bool {
        if self.state != SendState::Success {
            return false;
        }
        self.state = SendState::Initial;
        self.email.clear();
        true
    }

    pub fn reach_back_message(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty()).then(|| format!("If needed we will contact you at {email}"))
    }

    pub fn show_outdated_warning(&self, version: &VersionSlice) -> bool {
        !self.outdated_acknowledged && is_outdated(version)
    }

    pub fn acknowledge_outdated(&mut self) {
        self.outdated_acknowledged = true;
    }
}

pub fn is_outdated(version: &VersionSlice) -> bool {
    !version.info.supported || version.info.suggested_upgrade.is_some()
}

/// Collects the log, redacting the account numbers. A failure leaves the report without
/// an attachment.
pub fn collect_log(daemon: &dyn Daemon, to_redact: &[String]) -> Option<String> {
    match daemon.collect_problem_report(to_redact) {
        Ok(path) => {
            log::info!("[problem-report] collected log at {path}");
            Some(path)
        }
        Err(error) => {
            // TODO: handle error by showing a dialog once log collection failures are reported to the user.
            log::warn!("[problem-report] failed to collect log: {error}");
            None
        }
    }
}

/// Sends the report, collecting the log first when it hasn't been collected yet.
pub fn send(
    daemon: &dyn Daemon,
    email: &str,
    message: &str,
    report_path: Option<String>,
    to_redact: &[String],
) -> (Option<String>, Result<(), DaemonError>) {
    let report_path = report_path.or_else(|| collect_log(daemon, to_redact));
    let result = daemon.send_problem_report(email.trim(), message, report_path.as_deref());
    (report_path, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{testing::RecordingDaemon, types::AppVersionInfo};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_email_asks_for_confirmation_first() {
        let mut report = ProblemReport::default();
        assert_eq!(report.on_send(), SendStep::Ignore);

        report.set_message("The app does not connect");
        assert_eq!(report.on_send(), SendStep::AskForConfirmation);
        assert_eq!(report.state, SendState::Confirm);
        assert_eq!(report.on_send(), SendStep::Send);
        assert_eq!(report.state, SendState::Sending);
    }

    #[test]
    fn drafts_survive_failure_and_clear_on_success() {
        let mut report = ProblemReport {
            email: "user@example.com".into(),
            message: "Slow".into(),
            ..Default::default()
        };
        assert_eq!(report.on_send(), SendStep::Send);
        report.finish(Err(DaemonError::Communication));
        assert_eq!(
            report.state,
            SendState::Failed("Unable to reach the VPN service".into())
        );
        assert_eq!(report.message, "Slow");

        assert_eq!(report.on_send(), SendStep::Send);
        assert_eq!(
            report.reach_back_message().as_deref(),
            Some("If needed we will contact you at user@example.com")
        );
        report.finish(Ok(()));
        assert_eq!(report.state, SendState::Success);
        assert_eq!(report.message, "");
        assert!(report.reach_back_message().is_some());

        assert!(report.reset_after_success());
        assert_eq!(report.state, SendState::Initial);
        assert_eq!(report.email, "");
    }

    #[test]
    fn report_is_sent_without_log_when_collection_fails() {
        let daemon = RecordingDaemon::failing(DaemonError::Communication);
        let (path, result) = send(&daemon, " a@b.c ", "hello", None, &["1234".into()]);
        assert_eq!(path, None);
        assert!(result.is_err());
        assert_eq!(daemon.calls().len(), 2);
    }

    #[test]
    fn collected_log_is_reused() {
        let daemon = RecordingDaemon::default();
        let (path, result) = send(&daemon, "", "hello", Some("/tmp/report".into()), &[]);
        assert_eq!(path.as_deref(), Some("/tmp/report"));
        assert!(result.is_ok());
        assert_eq!(daemon.calls(), vec!["send_problem_report(, hello, Some(\"/tmp/report\"))"]);
    }

    #[test]
    fn outdated_versions_warn_once() {
        let version = VersionSlice {
            info: AppVersionInfo {
                supported: true,
                suggested_upgrade: Some("2025.4".into()),
                suggested_is_beta: false,
            },
            ..Default::default()
        };
        let mut report = ProblemReport::default();
        assert!(report.show_outdated_warning(&version));
        report.acknowledge_outdated();
        assert!(!report.show_outdated_warning(&version));
    }
}
