use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::clipboard::Clipboard;
use crate::models::pix::{DepositRequest, EulenDeposit, EulenDepositStatus, EulenEnvelope};

pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);
pub const NO_DEPOSIT_ID: &str =
    "No deposit ID available. Please create a deposit first or enter a custom deposit ID.";
pub const COPY_FAILED: &str = "Copy failed. Please manually copy the code above.";

/// Lifecycle of one UI action. A new submission always restarts from `Loading`.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> ActionState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ActionState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            ActionState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepositCreated {
    pub deposit: EulenDeposit,
    pub received_at: DateTime<Utc>,
}

impl DepositCreated {
    pub fn from_envelope(envelope: EulenEnvelope<EulenDeposit>) -> Self {
        Self {
            deposit: envelope.response.unwrap_or_default(),
            received_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepositChecked {
    pub status: EulenDepositStatus,
    pub received_at: DateTime<Utc>,
}

impl DepositChecked {
    pub fn from_envelope(envelope: EulenEnvelope<EulenDepositStatus>) -> Self {
        Self {
            status: envelope.response.unwrap_or_default(),
            received_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusBadge {
    Sent,
    Pending,
    Other(String),
}

impl StatusBadge {
    pub fn from_status(status: &str) -> Self {
        match status {
            "depix_sent" => StatusBadge::Sent,
            "pending" => StatusBadge::Pending,
            other => StatusBadge::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    NothingToCopy,
    Failed,
}

/// Everything the deposit panel shows. Owned by the event loop; every
/// transition happens through a method so the view never mutates state.
#[derive(Debug)]
pub struct DepositController {
    amount_in_reais: f64,
    creation: ActionState<DepositCreated>,
    status: ActionState<DepositChecked>,
    deposit_id: Option<String>,
    editing_id: bool,
    draft_id: String,
    copied_until: Option<Instant>,
    alert: Option<String>,
}

impl Default for DepositController {
    fn default() -> Self {
        Self {
            amount_in_reais: 1.0,
            creation: ActionState::Idle,
            status: ActionState::Idle,
            deposit_id: None,
            editing_id: false,
            draft_id: String::new(),
            copied_until: None,
            alert: None,
        }
    }
}

impl DepositController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount_in_reais(&self) -> f64 {
        self.amount_in_reais
    }

    /// Non-numeric input counts as zero, which the proxy then turns into its
    /// default amount.
    pub fn set_amount(&mut self, input: &str) {
        self.amount_in_reais = input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .unwrap_or(0.0);
    }

    /// Halves round toward positive infinity, so -0.125 reais is -12 cents.
    pub fn amount_in_cents(&self) -> i64 {
        let cents = self.amount_in_reais * 100.0;
        let floor = cents.floor();
        let rounded = if cents - floor >= 0.5 { floor + 1.0 } else { floor };
        rounded as i64
    }

    pub fn creation(&self) -> &ActionState<DepositCreated> {
        &self.creation
    }

    pub fn status(&self) -> &ActionState<DepositChecked> {
        &self.status
    }

    pub fn deposit_id(&self) -> Option<&str> {
        self.deposit_id.as_deref()
    }

    pub fn is_editing_id(&self) -> bool {
        self.editing_id
    }

    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn can_create(&self) -> bool {
        !self.creation.is_loading()
    }

    pub fn can_check_status(&self) -> bool {
        !self.status.is_loading() && self.deposit_id.is_some()
    }

    /// Starts a creation. Returns `None` while a previous one is in flight.
    pub fn begin_deposit(&mut self) -> Option<DepositRequest> {
        if !self.can_create() {
            return None;
        }

        self.creation = ActionState::Loading;
        self.deposit_id = None;
        self.status = ActionState::Idle;
        self.copied_until = None;

        Some(DepositRequest::new(self.amount_in_cents()))
    }

    pub fn finish_deposit(&mut self, result: Result<DepositCreated, String>) {
        match result {
            Ok(created) => {
                if let Some(id) = created.deposit.id.as_ref().filter(|id| !id.is_empty()) {
                    log::info!("Deposit ID extracted: {}", id);
                    self.deposit_id = Some(id.clone());
                }
                self.creation = ActionState::Success(created);
            }
            Err(message) => self.creation = ActionState::Error(message),
        }
    }

    pub fn begin_edit_id(&mut self) {
        self.draft_id = self.deposit_id.clone().unwrap_or_default();
        self.editing_id = true;
    }

    pub fn set_draft_id(&mut self, text: &str) {
        self.draft_id = text.to_string();
    }

    /// Commits the draft as the active id. Blank drafts are refused and keep
    /// the editor open.
    pub fn save_draft_id(&mut self) -> bool {
        let draft = self.draft_id.trim();
        if draft.is_empty() {
            return false;
        }

        self.deposit_id = Some(draft.to_string());
        self.editing_id = false;
        true
    }

    pub fn cancel_edit_id(&mut self) {
        self.editing_id = false;
        self.draft_id.clear();
    }

    /// Starts a status check and hands back the id to query. Without an
    /// active id the status action fails right away.
    pub fn begin_status_check(&mut self) -> Option<String> {
        if self.status.is_loading() {
            return None;
        }

        let Some(id) = self.deposit_id.clone() else {
            self.status = ActionState::Error(NO_DEPOSIT_ID.to_string());
            return None;
        };

        self.status = ActionState::Loading;
        Some(id)
    }

    pub fn finish_status_check(&mut self, result: Result<DepositChecked, String>) {
        self.status = match result {
            Ok(checked) => ActionState::Success(checked),
            Err(message) => ActionState::Error(message),
        };
    }

    pub fn badge(&self) -> Option<StatusBadge> {
        self.status
            .success()
            .and_then(|checked| checked.status.status.as_deref())
            .map(StatusBadge::from_status)
    }

    pub fn copy_code(&self) -> Option<&str> {
        self.creation
            .success()
            .and_then(|created| created.deposit.qr_copy_paste.as_deref())
    }

    pub fn qr_image_url(&self) -> Option<&str> {
        self.creation
            .success()
            .and_then(|created| created.deposit.qr_image_url.as_deref())
    }

    /// Copies the payment code. A total clipboard failure raises the alert,
    /// which stays until acknowledged.
    pub fn copy_to_clipboard(&mut self, clipboard: &dyn Clipboard, now: Instant) -> CopyOutcome {
        let Some(code) = self.copy_code().map(str::to_string) else {
            return CopyOutcome::NothingToCopy;
        };

        match clipboard.write_text(&code) {
            Ok(()) => {
                self.copied_until = Some(now + COPY_FEEDBACK);
                CopyOutcome::Copied
            }
            Err(e) => {
                log::error!("Failed to copy to clipboard: {}", e);
                self.alert = Some(COPY_FAILED.to_string());
                CopyOutcome::Failed
            }
        }
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    pub fn expire_copy_feedback(&mut self, now: Instant) {
        if !self.is_copied(now) {
            self.copied_until = None;
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use crate::ui::clipboard::ClipboardError;

    fn created(id: Option<&str>, code: Option<&str>) -> DepositCreated {
        DepositCreated {
            deposit: EulenDeposit {
                id: id.map(str::to_string),
                qr_copy_paste: code.map(str::to_string),
                qr_image_url: Some("https://depix.eulen.app/qr/1.png".to_string()),
            },
            received_at: Utc::now(),
        }
    }

    fn checked(status: &str) -> DepositChecked {
        DepositChecked {
            status: EulenDepositStatus {
                status: Some(status.to_string()),
                ..Default::default()
            },
            received_at: Utc::now(),
        }
    }

    struct RecordingClipboard {
        fail: bool,
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable("no clipboard".to_string()));
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn amounts_round_to_nearest_cent() {
        let mut controller = DepositController::new();
        assert_eq!(controller.amount_in_cents(), 100);

        for (input, cents) in [("12.34", 1234), ("0.01", 1), ("1.005", 100), ("19.999", 2000)] {
            controller.set_amount(input);
            assert_eq!(controller.amount_in_cents(), cents, "input {input}");
        }
    }

    #[test]
    fn half_cents_round_up() {
        let mut controller = DepositController::new();

        for (input, cents) in [("0.125", 13), ("-0.125", -12), ("-0.375", -37), ("-0.5", -50)] {
            controller.set_amount(input);
            assert_eq!(controller.amount_in_cents(), cents, "input {input}");
        }
    }

    #[test]
    fn non_numeric_amount_counts_as_zero() {
        let mut controller = DepositController::new();

        controller.set_amount("abc");
        assert_eq!(controller.amount_in_cents(), 0);

        controller.set_amount("");
        assert_eq!(controller.amount_in_cents(), 0);

        controller.set_amount("inf");
        assert_eq!(controller.amount_in_cents(), 0);
    }

    #[test]
    fn creation_is_refused_while_loading() {
        let mut controller = DepositController::new();
        controller.set_amount("5");

        let request = controller.begin_deposit().unwrap();
        assert_eq!(request, DepositRequest::new(500));
        assert!(controller.creation().is_loading());
        assert_eq!(controller.begin_deposit(), None);

        controller.finish_deposit(Ok(created(Some("dep-1"), Some("000201"))));
        assert!(controller.begin_deposit().is_some());
    }

    #[test]
    fn new_submission_clears_previous_results() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(created(Some("dep-1"), None)));
        controller.begin_status_check();
        controller.finish_status_check(Ok(checked("pending")));

        controller.begin_deposit();

        assert_eq!(controller.deposit_id(), None);
        assert_eq!(controller.status(), &ActionState::Idle);
        assert_eq!(controller.badge(), None);
    }

    #[test]
    fn successful_creation_without_id_keeps_none() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(created(None, Some("000201"))));

        assert_eq!(controller.deposit_id(), None);
        assert_eq!(controller.copy_code(), Some("000201"));
        assert!(!controller.can_check_status());
    }

    #[test]
    fn creation_error_is_scoped_to_creation() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Err("Depix API request failed".to_string()));

        assert_eq!(controller.creation().error(), Some("Depix API request failed"));
        assert_eq!(controller.status().error(), None);
    }

    #[test]
    fn manual_id_overrides_fetched_id() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(created(Some("dep-1"), None)));

        controller.begin_edit_id();
        assert_eq!(controller.draft_id(), "dep-1");
        controller.set_draft_id("  manual-7  ");
        assert!(controller.save_draft_id());

        assert!(!controller.is_editing_id());
        assert_eq!(controller.deposit_id(), Some("manual-7"));
        assert_eq!(controller.begin_status_check().as_deref(), Some("manual-7"));
    }

    #[test]
    fn blank_draft_is_not_saved() {
        let mut controller = DepositController::new();
        controller.begin_edit_id();
        controller.set_draft_id("   ");

        assert!(!controller.save_draft_id());
        assert!(controller.is_editing_id());
        assert_eq!(controller.deposit_id(), None);

        controller.cancel_edit_id();
        assert!(!controller.is_editing_id());
        assert_eq!(controller.draft_id(), "");
    }

    #[test]
    fn status_check_needs_an_id() {
        let mut controller = DepositController::new();

        assert_eq!(controller.begin_status_check(), None);
        assert_eq!(controller.status().error(), Some(NO_DEPOSIT_ID));
    }

    #[test]
    fn status_check_is_refused_while_loading() {
        let mut controller = DepositController::new();
        controller.begin_edit_id();
        controller.set_draft_id("dep-1");
        controller.save_draft_id();

        assert!(controller.begin_status_check().is_some());
        assert!(!controller.can_check_status());
        assert_eq!(controller.begin_status_check(), None);
    }

    #[test]
    fn badge_follows_provider_status() {
        let mut controller = DepositController::new();
        controller.begin_edit_id();
        controller.set_draft_id("dep-1");
        controller.save_draft_id();

        for (status, badge) in [
            ("depix_sent", StatusBadge::Sent),
            ("pending", StatusBadge::Pending),
            ("expired", StatusBadge::Other("expired".to_string())),
        ] {
            controller.begin_status_check();
            controller.finish_status_check(Ok(checked(status)));
            assert_eq!(controller.badge(), Some(badge));
        }
    }

    #[test]
    fn repeated_checks_render_same_badge() {
        let mut controller = DepositController::new();
        controller.begin_edit_id();
        controller.set_draft_id("dep-1");
        controller.save_draft_id();

        controller.begin_status_check();
        controller.finish_status_check(Ok(checked("pending")));
        let first = controller.badge();
        controller.begin_status_check();
        controller.finish_status_check(Ok(checked("pending")));

        assert_eq!(controller.badge(), first);
    }

    #[test]
    fn copied_flag_expires_after_two_seconds() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(created(Some("dep-1"), Some("000201"))));
        let clipboard = RecordingClipboard {
            fail: false,
            copied: RefCell::new(Vec::new()),
        };
        let now = Instant::now();

        assert_eq!(controller.copy_to_clipboard(&clipboard, now), CopyOutcome::Copied);
        assert_eq!(clipboard.copied.borrow().as_slice(), ["000201"]);
        assert!(controller.is_copied(now + Duration::from_millis(1999)));

        controller.expire_copy_feedback(now + COPY_FEEDBACK);
        assert!(!controller.is_copied(now + COPY_FEEDBACK));
    }

    #[test]
    fn clipboard_failure_raises_alert() {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(created(Some("dep-1"), Some("000201"))));
        let clipboard = RecordingClipboard {
            fail: true,
            copied: RefCell::new(Vec::new()),
        };

        let outcome = controller.copy_to_clipboard(&clipboard, Instant::now());

        assert_eq!(outcome, CopyOutcome::Failed);
        assert_eq!(controller.alert(), Some(COPY_FAILED));
        controller.dismiss_alert();
        assert_eq!(controller.alert(), None);
    }

    #[test]
    fn nothing_to_copy_without_code() {
        let mut controller = DepositController::new();
        let clipboard = RecordingClipboard {
            fail: false,
            copied: RefCell::new(Vec::new()),
        };

        assert_eq!(
            controller.copy_to_clipboard(&clipboard, Instant::now()),
            CopyOutcome::NothingToCopy
        );
    }
}
