use std::fmt;
use std::time::Instant;

use super::state::{ActionState, DepositController, StatusBadge};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Waiting,
    Neutral,
}

impl Tone {
    fn color(self) -> &'static str {
        match self {
            Tone::Success => GREEN,
            Tone::Waiting => YELLOW,
            Tone::Neutral => DIM,
        }
    }
}

impl StatusBadge {
    pub fn tone(&self) -> Tone {
        match self {
            StatusBadge::Sent => Tone::Success,
            StatusBadge::Pending => Tone::Waiting,
            StatusBadge::Other(_) => Tone::Neutral,
        }
    }

    pub fn label(&self) -> String {
        match self {
            StatusBadge::Sent => {
                "✅ Success! Your deposit has been sent successfully via Depix.".to_string()
            }
            StatusBadge::Pending => {
                "⏳ Waiting. Your deposit is pending and waiting to be processed.".to_string()
            }
            StatusBadge::Other(status) => format!("ℹ️ Status: {}", status),
        }
    }
}

fn button(label: &str, enabled: bool, loading: bool) -> String {
    match (enabled, loading) {
        (_, true) => format!("{DIM}[ … {label} ]{RESET}"),
        (true, false) => format!("{BOLD}[ {label} ]{RESET}"),
        (false, false) => format!("{DIM}[ {label} ]{RESET}"),
    }
}

/// Text rendering of the deposit panel. `now` only decides whether the copy
/// button still shows its "Copied!" feedback.
pub struct Panel<'a> {
    controller: &'a DepositController,
    now: Instant,
}

impl<'a> Panel<'a> {
    pub fn new(controller: &'a DepositController, now: Instant) -> Self {
        Self { controller, now }
    }
}

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controller = self.controller;

        writeln!(f, "{BOLD}Depix API Integration{RESET}")?;
        writeln!(f, "{DIM}Test the Depix API integration{RESET}")?;
        writeln!(f)?;
        writeln!(f, "Amount (in reais): {:.2}", controller.amount_in_reais())?;
        writeln!(
            f,
            "{}",
            button(
                "Call Depix API",
                controller.can_create(),
                controller.creation().is_loading()
            )
        )?;
        writeln!(f)?;

        if controller.is_editing_id() {
            writeln!(f, "Deposit ID: > {}_", controller.draft_id())?;
            writeln!(
                f,
                "{} {}",
                button("Save", !controller.draft_id().trim().is_empty(), false),
                button("Cancel", true, false)
            )?;
        } else if let Some(id) = controller.deposit_id() {
            writeln!(f, "Deposit ID: {BOLD}{id}{RESET} {}", button("Edit", true, false))?;
        } else {
            writeln!(f, "{}", button("Enter Custom Deposit ID", true, false))?;
        }

        if controller.deposit_id().is_some() || controller.is_editing_id() {
            writeln!(
                f,
                "{}",
                button(
                    "Check Deposit Status",
                    controller.can_check_status(),
                    controller.status().is_loading()
                )
            )?;
        }

        if let Some(error) = controller.creation().error() {
            writeln!(f)?;
            writeln!(f, "{RED}{error}{RESET}")?;
        }

        if let Some(error) = controller.status().error() {
            writeln!(f)?;
            writeln!(f, "{RED}Status Check Error: {error}{RESET}")?;
        }

        if let ActionState::Success(created) = controller.creation() {
            if let Some(url) = controller.qr_image_url() {
                writeln!(f)?;
                writeln!(f, "QR Code Image")?;
                writeln!(f, "  {url}")?;
            }

            if let Some(code) = controller.copy_code() {
                let copied = controller.is_copied(self.now);
                let label = if copied {
                    "Copied!"
                } else {
                    "Copy Code to Clipboard"
                };

                writeln!(f)?;
                writeln!(f, "QR Copy Paste Code")?;
                writeln!(f, "  {code}")?;
                writeln!(f, "{}", button(label, !copied, false))?;
            }

            writeln!(
                f,
                "{DIM}Received {}{RESET}",
                created.received_at.to_rfc3339()
            )?;
        }

        if let Some(badge) = controller.badge() {
            writeln!(f)?;
            writeln!(f, "Deposit Status")?;
            writeln!(f, "  {}{}{RESET}", badge.tone().color(), badge.label())?;
            if let ActionState::Success(checked) = controller.status() {
                writeln!(
                    f,
                    "{DIM}Checked {}{RESET}",
                    checked.received_at.to_rfc3339()
                )?;
            }
        }

        if let Some(alert) = controller.alert() {
            writeln!(f)?;
            writeln!(f, "{RED}{BOLD}! {alert}{RESET}")?;
            writeln!(f, "{DIM}Press Enter to continue.{RESET}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::models::pix::{EulenDeposit, EulenDepositStatus};
    use crate::ui::clipboard::{Clipboard, ClipboardError};
    use crate::ui::state::{DepositChecked, DepositCreated};

    fn with_deposit(code: Option<&str>) -> DepositController {
        let mut controller = DepositController::new();
        controller.begin_deposit();
        controller.finish_deposit(Ok(DepositCreated {
            deposit: EulenDeposit {
                id: Some("dep-1".to_string()),
                qr_copy_paste: code.map(str::to_string),
                qr_image_url: Some("https://qr/1.png".to_string()),
            },
            received_at: Utc::now(),
        }));
        controller
    }

    fn check(controller: &mut DepositController, status: &str) {
        controller.begin_status_check();
        controller.finish_status_check(Ok(DepositChecked {
            status: EulenDepositStatus {
                status: Some(status.to_string()),
                ..Default::default()
            },
            received_at: Utc::now(),
        }));
    }

    #[test]
    fn idle_panel_offers_custom_id() {
        let out = Panel::new(&DepositController::new(), Instant::now()).to_string();

        assert!(out.contains("Amount (in reais): 1.00"));
        assert!(out.contains("Enter Custom Deposit ID"));
        assert!(!out.contains("Check Deposit Status"));
    }

    #[test]
    fn created_deposit_shows_artifacts() {
        let out = Panel::new(&with_deposit(Some("000201PIX")), Instant::now()).to_string();

        assert!(out.contains("Deposit ID: "));
        assert!(out.contains("dep-1"));
        assert!(out.contains("https://qr/1.png"));
        assert!(out.contains("000201PIX"));
        assert!(out.contains("Copy Code to Clipboard"));
        assert!(out.contains("Check Deposit Status"));
    }

    #[test]
    fn missing_code_hides_copy_button() {
        let out = Panel::new(&with_deposit(None), Instant::now()).to_string();

        assert!(!out.contains("QR Copy Paste Code"));
        assert!(!out.contains("Copy Code to Clipboard"));
    }

    #[test]
    fn badges_render_with_tone() {
        let mut controller = with_deposit(None);

        check(&mut controller, "depix_sent");
        let sent = Panel::new(&controller, Instant::now()).to_string();
        assert!(sent.contains(&format!("{GREEN}✅ Success!")));

        check(&mut controller, "pending");
        let pending = Panel::new(&controller, Instant::now()).to_string();
        assert!(pending.contains(&format!("{YELLOW}⏳ Waiting")));

        check(&mut controller, "under_review");
        let other = Panel::new(&controller, Instant::now()).to_string();
        assert!(other.contains(&format!("{DIM}ℹ️ Status: under_review")));
    }

    #[test]
    fn errors_are_scoped_per_action() {
        let mut controller = DepositController::new();
        controller.begin_status_check();
        let out = Panel::new(&controller, Instant::now()).to_string();

        assert!(out.contains("Status Check Error: No deposit ID available."));

        controller.begin_deposit();
        controller.finish_deposit(Err("Depix API request failed".to_string()));
        let out = Panel::new(&controller, Instant::now()).to_string();

        assert!(out.contains(&format!("{RED}Depix API request failed")));
    }

    #[test]
    fn copy_failure_shows_alert() {
        struct Broken;

        impl Clipboard for Broken {
            fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
                Err(ClipboardError::Unavailable("none".to_string()))
            }
        }

        let mut controller = with_deposit(Some("000201PIX"));
        controller.copy_to_clipboard(&Broken, Instant::now());

        let out = Panel::new(&controller, Instant::now()).to_string();

        assert!(out.contains("! Copy failed. Please manually copy the code above."));
        assert!(out.ends_with(&format!("{DIM}Press Enter to continue.{RESET}\n")));
    }

    #[test]
    fn editor_shows_draft() {
        let mut controller = DepositController::new();
        controller.begin_edit_id();
        controller.set_draft_id("abc");

        let out = Panel::new(&controller, Instant::now()).to_string();

        assert!(out.contains("Deposit ID: > abc_"));
        assert!(out.contains("Save"));
        assert!(out.contains("Cancel"));
    }
}
