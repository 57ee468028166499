pub const NO_FILE_MESSAGE: &str = "Please upload an image first!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: "Success!".to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Submitting,
    ResultReady,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload<F> {
    pub file: F,
    pub preview_url: String,
}

/// Identifies one submission. Only the latest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// State of the image upload form, generic over the platform's file handle.
#[derive(Debug)]
pub struct UploadForm<F> {
    upload: Option<Upload<F>>,
    result: Option<String>,
    loading: bool,
    generation: u64,
}

impl<F> Default for UploadForm<F> {
    fn default() -> Self {
        Self {
            upload: None,
            result: None,
            loading: false,
            generation: 0,
        }
    }
}

impl<F> UploadForm<F> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Submitting
        } else if self.result.is_some() {
            Phase::ResultReady
        } else if self.upload.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    pub fn file(&self) -> Option<&F> {
        self.upload.as_ref().map(|upload| &upload.file)
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.upload.as_ref().map(|upload| upload.preview_url.as_str())
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replaces the selected file, dropping any previous result and abandoning an in-flight
    /// submission. Returns the replaced upload so its preview can be released.
    pub fn select_file(&mut self, file: F, preview_url: String) -> Option<Upload<F>> {
        self.invalidate();
        self.result = None;
        self.upload.replace(Upload { file, preview_url })
    }

    pub fn submit(&mut self) -> Result<Ticket, Notification> {
        if self.upload.is_none() {
            return Err(Notification::error(NO_FILE_MESSAGE));
        }
        self.invalidate();
        self.loading = true;
        Ok(Ticket(self.generation))
    }

    /// Applies the outcome of the submission identified by `ticket`. Outcomes of superseded
    /// submissions are ignored and produce no notification.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, String>,
    ) -> Option<Notification> {
        if ticket.0 != self.generation || !self.loading {
            return None;
        }
        self.loading = false;
        match outcome {
            Ok(prediction) => {
                self.result = Some(prediction);
                Some(Notification::success("Image processed successfully."))
            }
            Err(message) => Some(Notification::error(message)),
        }
    }

    /// Invalidates every outstanding ticket, for when the owner of the form goes away.
    pub fn teardown(&mut self) -> Option<Upload<F>> {
        self.invalidate();
        self.result = None;
        self.upload.take()
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::prediction::{interpret, GENERIC_ERROR_MESSAGE};

    fn form_with_file() -> UploadForm<&'static str> {
        let mut form = UploadForm::default();
        form.select_file("field.png", "blob:1".to_string());
        form
    }

    #[test]
    fn starts_idle() {
        let form = UploadForm::<&str>::default();
        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.preview_url(), None);
    }

    #[test]
    fn submit_without_file_only_notifies() {
        let mut form = UploadForm::<&str>::default();
        assert_eq!(form.submit(), Err(Notification::error(NO_FILE_MESSAGE)));
        assert!(!form.is_loading());
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn successful_prediction_is_shown() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();
        assert_eq!(form.phase(), Phase::Submitting);

        let note = form.complete(ticket, interpret(true, r#"{"prediction":"Forest"}"#));

        assert_eq!(note.map(|n| n.level), Some(Level::Success));
        assert_eq!(form.result(), Some("Forest"));
        assert!(!form.is_loading());
        assert_eq!(form.phase(), Phase::ResultReady);
    }

    #[test]
    fn failure_reports_server_message_and_keeps_result() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();
        form.complete(ticket, Ok("Forest".to_string()));

        let ticket = form.submit().unwrap();
        let note = form.complete(ticket, interpret(false, r#"{"error":"Invalid image"}"#));

        assert_eq!(note, Some(Notification::error("Invalid image")));
        assert_eq!(form.result(), Some("Forest"));
        assert!(!form.is_loading());
    }

    #[test]
    fn failure_without_body_uses_generic_message() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();
        let note = form.complete(ticket, interpret(false, ""));
        assert_eq!(note, Some(Notification::error(GENERIC_ERROR_MESSAGE)));
    }

    #[test]
    fn selecting_file_clears_result_and_returns_old_preview() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();
        form.complete(ticket, Ok("Forest".to_string()));

        let replaced = form.select_file("river.png", "blob:2".to_string());

        assert_eq!(
            replaced,
            Some(Upload {
                file: "field.png",
                preview_url: "blob:1".to_string(),
            })
        );
        assert_eq!(form.result(), None);
        assert_eq!(form.file(), Some(&"river.png"));
        assert_eq!(form.phase(), Phase::FileSelected);
    }

    #[test]
    fn outcome_after_new_file_is_discarded() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();
        form.select_file("river.png", "blob:2".to_string());

        assert_eq!(form.complete(ticket, Ok("Forest".to_string())), None);
        assert_eq!(form.result(), None);
        assert_eq!(form.phase(), Phase::FileSelected);
    }

    #[test]
    fn only_latest_submission_completes() {
        let mut form = form_with_file();
        let first = form.submit().unwrap();
        let second = form.submit().unwrap();

        assert_eq!(form.complete(first, Ok("Forest".to_string())), None);
        assert!(form.is_loading());
        assert!(form.complete(second, Ok("River".to_string())).is_some());
        assert_eq!(form.result(), Some("River"));
    }

    #[test]
    fn teardown_discards_in_flight_outcome() {
        let mut form = form_with_file();
        let ticket = form.submit().unwrap();

        let upload = form.teardown();

        assert_eq!(upload.map(|u| u.preview_url), Some("blob:1".to_string()));
        assert_eq!(form.complete(ticket, Err("late".to_string())), None);
        assert_eq!(form.phase(), Phase::Idle);
    }
}
