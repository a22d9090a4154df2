use chrono::{DateTime, Duration, Utc};

use crate::{
    daemon::{
        DaemonError,
        types::{Device, TunnelState, VoucherResponse},
    },
    navigation::Route,
};

pub const MIN_ACCOUNT_NUMBER_LENGTH: usize = 10;
pub const DEVICE_LIMIT: usize = 5;
const CLOSE_TO_EXPIRY_DAYS: i64 = 3;

/// Keeps only the digits of typed or pasted account numbers.
pub fn normalize_account_number(input: &str) -> String {
    input
        .chars()
        .filter(|character| character.is_ascii_digit())
        .collect()
}

pub fn is_valid_account_number(account_number: &str) -> bool {
    account_number.len() >= MIN_ACCOUNT_NUMBER_LENGTH
        && account_number
            .chars()
            .all(|character| character.is_ascii_digit())
}

/// `1234567890123456` becomes `1234 5678 9012 3456`.
pub fn format_account_number(account_number: &str) -> String {
    let digits: Vec<char> = account_number.chars().collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoginState {
    #[default]
    Idle,
    LoggingIn,
    CreatingAccount,
    Failed(String),
    Ok,
}

impl LoginState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::LoggingIn | Self::CreatingAccount)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Idle => "Login",
            Self::LoggingIn => "Logging in...",
            Self::CreatingAccount => "Creating account...",
            Self::Failed(_) => "Login failed",
            Self::Ok => "Logged in",
        }
    }
}

/// What the login page does with a failed login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginFailure {
    Message(String),
    Navigate(Route),
}

pub fn login_failure(error: &DaemonError) -> LoginFailure {
    match error {
        DaemonError::TooManyDevices => LoginFailure::Navigate(Route::TooManyDevices),
        DaemonError::InvalidAccount => LoginFailure::Message("Invalid account number".into()),
        DaemonError::Communication | DaemonError::TimedOut(_) | DaemonError::Transport(_) => {
            LoginFailure::Message("Failed to connect to server, please try again".into())
        }
        other => LoginFailure::Message(other.user_message()),
    }
}

pub fn has_expired(expiry: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiry <= now
}

pub fn close_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    !has_expired(expiry, now) && expiry - now < Duration::days(CLOSE_TO_EXPIRY_DAYS)
}

/// Remaining time in whole days, as shown on the account page.
pub fn remaining_time_text(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if has_expired(expiry, now) {
        return "expired".into();
    }
    match (expiry - now).num_days() {
        0 => "less than a day left".into(),
        1 => "1 day left".into(),
        days => format!("{days} days left"),
    }
}

/// Remaining time with hour precision for the last day, as shown in notifications.
pub fn remaining_duration_text(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if has_expired(expiry, now) {
        return "expired".into();
    }
    let remaining = expiry - now;
    if remaining.num_days() >= 1 {
        return remaining_time_text(expiry, now);
    }
    match remaining.num_hours() {
        0 => "less than an hour left".into(),
        1 => "1 hour left".into(),
        hours => format!("{hours} hours left"),
    }
}

pub fn format_expiry_date(expiry: DateTime<Utc>) -> String {
    expiry
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

// Voucher redemption

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VoucherState {
    #[default]
    Idle,
    Submitting,
    Success {
        new_expiry: DateTime<Utc>,
        seconds_added: u64,
    },
    Failure(String),
}

/// Vouchers are typed in groups separated by dashes or spaces; the daemon wants them
/// upper case without separators.
pub fn normalize_voucher(code: &str) -> String {
    code.chars()
        .filter(|character| !matches!(character, '-' | ' '))
        .map(|character| character.to_ascii_uppercase())
        .collect()
}

pub fn voucher_state_for(result: Result<VoucherResponse, DaemonError>) -> VoucherState {
    match result {
        Ok(VoucherResponse::Success {
            new_expiry,
            seconds_added,
        }) => VoucherState::Success {
            new_expiry,
            seconds_added,
        },
        Ok(VoucherResponse::Invalid) => VoucherState::Failure("Voucher code is invalid.".into()),
        Ok(VoucherResponse::AlreadyUsed) => {
            VoucherState::Failure("Voucher code has already been used.".into())
        }
        Ok(VoucherResponse::Error) => {
            VoucherState::Failure("An error occurred, please try again.".into())
        }
        Err(error) => {
            log::error!("[voucher] failed to submit voucher: {error}");
            VoucherState::Failure(error.user_message())
        }
    }
}

pub fn added_time_text(seconds_added: u64) -> String {
    let days = seconds_added / (24 * 60 * 60);
    match days {
        0 => "less than a day was added to your account".into(),
        1 => "1 day was added to your account".into(),
        days => format!("{days} days were added to your account"),
    }
}

// Devices

/// "happy seal" becomes "Happy Seal".
pub fn capitalize_device_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut characters = word.chars();
            match characters.next() {
                Some(first) => first.to_uppercase().chain(characters).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn sort_devices(devices: &mut [Device]) {
    devices.sort_by(|lhs, rhs| {
        lhs.created
            .cmp(&rhs.created)
            .then_with(|| lhs.name.cmp(&rhs.name))
    });
}

/// State of the page shown when logging in would exceed the device limit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TooManyDevices {
    pub account_number: String,
    pub devices: Vec<Device>,
    pub confirm_removal: Option<Device>,
    pub removing: Option<String>,
    pub error: Option<String>,
}

impl TooManyDevices {
    pub fn new(account_number: String) -> Self {
        Self {
            account_number,
            ..Default::default()
        }
    }

    pub fn set_devices(&mut self, mut devices: Vec<Device>) {
        sort_devices(&mut devices);
        self.devices = devices;
        self.removing = None;
    }

    pub fn can_continue(&self) -> bool {
        self.devices.len() < DEVICE_LIMIT
    }

    pub fn request_removal(&mut self, device_id: &str) {
        self.confirm_removal = self
            .devices
            .iter()
            .find(|device| device.id == device_id)
            .cloned();
    }

    pub fn cancel_removal(&mut self) {
        self.confirm_removal = None;
    }

    /// Returns the device to remove once the user has confirmed.
    pub fn confirm(&mut self) -> Option<Device> {
        let device = self.confirm_removal.take()?;
        self.removing = Some(device.id.clone());
        Some(device)
    }

    pub fn removal_failed(&mut self, error: &DaemonError) {
        log::error!("[devices] failed to remove device: {error}");
        self.removing = None;
        self.error = Some(format!("Failed to remove device: {}", error.user_message()));
    }
}

// Expired account

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    OpenBrowser,
    DisableBlockWhenDisconnected,
    Disconnect,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenBrowser => "Buy more credit",
            Self::DisableBlockWhenDisconnected => "Disable lockdown mode",
            Self::Disconnect => "Disconnect",
        }
    }
}

/// The internet stays blocked while the tunnel is up or lockdown mode is active, so the
/// user has to lift the block before a browser can reach the payment page.
pub fn recovery_action(tunnel_state: &TunnelState, block_when_disconnected: bool) -> RecoveryAction {
    match tunnel_state {
        TunnelState::Connected { .. } | TunnelState::Connecting { .. } => {
            RecoveryAction::Disconnect
        }
        TunnelState::Disconnected { .. } if block_when_disconnected => {
            RecoveryAction::DisableBlockWhenDisconnected
        }
        TunnelState::Error(_) => RecoveryAction::Disconnect,
        _ => RecoveryAction::OpenBrowser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn device(id: &str, day: u32) -> Device {
        Device {
            id: id.into(),
            name: format!("device {id}"),
            created: at(day, 0),
        }
    }

    #[test]
    fn account_numbers_are_grouped_and_validated() {
        let number = normalize_account_number("1234 5678-9012 3456");
        assert_eq!(number, "1234567890123456");
        assert!(is_valid_account_number(&number));
        assert!(!is_valid_account_number("123456789"));
        assert_eq!(format_account_number(&number), "1234 5678 9012 3456");
        assert_eq!(format_account_number("123456"), "1234 56");
    }

    #[test]
    fn too_many_devices_error_navigates() {
        assert_eq!(
            login_failure(&DaemonError::TooManyDevices),
            LoginFailure::Navigate(Route::TooManyDevices)
        );
        assert_eq!(
            login_failure(&DaemonError::InvalidAccount),
            LoginFailure::Message("Invalid account number".into())
        );
    }

    #[test]
    fn expiry_texts() {
        let now = at(10, 12);
        assert_eq!(remaining_time_text(at(10, 11), now), "expired");
        assert_eq!(remaining_time_text(at(10, 20), now), "less than a day left");
        assert_eq!(remaining_time_text(at(11, 13), now), "1 day left");
        assert_eq!(remaining_time_text(at(20, 12), now), "10 days left");
        assert_eq!(remaining_duration_text(at(10, 17), now), "5 hours left");
    }

    #[test]
    fn close_to_expiry_is_under_three_days() {
        let now = at(10, 12);
        assert!(close_to_expiry(at(12, 12), now));
        assert!(!close_to_expiry(at(13, 12), now));
        assert!(!close_to_expiry(at(9, 12), now));
    }

    #[test]
    fn voucher_codes_are_normalized() {
        assert_eq!(normalize_voucher("abcd-efgh ijkl"), "ABCDEFGHIJKL");
    }

    #[test]
    fn voucher_responses_map_to_messages() {
        assert_eq!(
            voucher_state_for(Ok(VoucherResponse::AlreadyUsed)),
            VoucherState::Failure("Voucher code has already been used.".into())
        );
        assert_eq!(
            voucher_state_for(Ok(VoucherResponse::Success {
                new_expiry: at(20, 0),
                seconds_added: 2_592_000,
            })),
            VoucherState::Success {
                new_expiry: at(20, 0),
                seconds_added: 2_592_000,
            }
        );
        assert_eq!(added_time_text(2_592_000), "30 days were added to your account");
    }

    #[test]
    fn devices_are_listed_oldest_first_and_limit_applies() {
        let mut page = TooManyDevices::new("1234567890".into());
        page.set_devices(vec![
            device("c", 3),
            device("a", 1),
            device("e", 5),
            device("b", 2),
            device("d", 4),
        ]);
        let ids: Vec<_> = page.devices.iter().map(|device| device.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert!(!page.can_continue());

        page.request_removal("c");
        let removed = page.confirm().unwrap();
        assert_eq!(removed.id, "c");
        assert_eq!(page.removing.as_deref(), Some("c"));
    }

    #[test]
    fn device_names_are_capitalized() {
        assert_eq!(capitalize_device_name("happy seal"), "Happy Seal");
    }

    #[test]
    fn recovery_depends_on_blocking_state() {
        let disconnected = TunnelState::Disconnected { location: None };
        assert_eq!(
            recovery_action(&disconnected, false),
            RecoveryAction::OpenBrowser
        );
        assert_eq!(
            recovery_action(&disconnected, true),
            RecoveryAction::DisableBlockWhenDisconnected
        );
        let connecting = TunnelState::Connecting {
            details: None,
            feature_indicators: Vec::new(),
        };
        assert_eq!(recovery_action(&connecting, false), RecoveryAction::Disconnect);
    }
}
