use std::{fs, path::Path};

use crate::{daemon::Daemon, system};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportStatus {
    Successful,
    Failed(String),
}

impl ImportStatus {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Successful => "IMPORT SUCCESSFUL",
            Self::Failed(_) => "IMPORT FAILED",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Successful => "Settings were imported and are now active.",
            Self::Failed(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Successful)
    }
}

/// Settings import page: pasted text or a JSON file, one status line at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportForm {
    pub text: String,
    pub status: Option<ImportStatus>,
}

impl ImportForm {
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn can_import_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn import_text(&mut self, daemon: &dyn Daemon) -> &ImportStatus {
        let text = self.text.clone();
        self.status.insert(import(daemon, &text))
    }

    pub fn import_file(&mut self, daemon: &dyn Daemon, path: &Path) -> &ImportStatus {
        let status = match fs::read_to_string(path) {
            Ok(text) => import(daemon, &text),
            Err(error) => {
                log::warn!("[import] failed to read {}: {error}", path.display());
                ImportStatus::Failed(format!("Unable to read {}", path.display()))
            }
        };
        self.status.insert(status)
    }

    /// Leaving the page forgets the last result.
    pub fn leave(&mut self) {
        self.status = None;
    }
}

pub fn import(daemon: &dyn Daemon, text: &str) -> ImportStatus {
    if text.trim().is_empty() {
        return ImportStatus::Failed("Nothing to import".into());
    }
    match daemon.import_settings(text) {
        Ok(()) => {
            log::info!("[import] imported {} bytes of settings", text.len());
            ImportStatus::Successful
        }
        Err(error) => {
            log::warn!("[import] import rejected: {error}");
            ImportStatus::Failed(error.user_message())
        }
    }
}

pub fn pick_file() -> Option<std::path::PathBuf> {
    system::open_file_dialog("Import settings", "JSON", "*.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{DaemonError, testing::RecordingDaemon};
    use pretty_assertions::assert_eq;

    #[test]
    fn pasted_text_is_sent_to_the_service() {
        let daemon = RecordingDaemon::default();
        let mut form = ImportForm::default();
        assert!(!form.can_import_text());
        form.set_text(r#"{"relay_overrides": []}"#);
        assert!(form.can_import_text());
        assert_eq!(form.import_text(&daemon), &ImportStatus::Successful);
        assert_eq!(daemon.calls(), vec!["import_settings(23 bytes)"]);

        form.leave();
        assert_eq!(form.status, None);
    }

    #[test]
    fn service_error_is_reported() {
        let daemon = RecordingDaemon::failing(DaemonError::Remote {
            code: -32603,
            message: "Invalid JSON".into(),
        });
        let mut form = ImportForm::default();
        form.set_text("{");
        let status = form.import_text(&daemon).clone();
        assert_eq!(status, ImportStatus::Failed("Invalid JSON".into()));
        assert_eq!(status.title(), "IMPORT FAILED");
    }

    #[test]
    fn file_contents_are_imported() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("settings.json");
        fs::write(&path, "{}").unwrap();

        let daemon = RecordingDaemon::default();
        let mut form = ImportForm::default();
        assert!(form.import_file(&daemon, &path).is_success());

        let missing = directory.path().join("missing.json");
        assert!(!form.import_file(&daemon, &missing).is_success());
        assert_eq!(daemon.calls(), vec!["import_settings(2 bytes)"]);
    }
}
