use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use super::client::DepositGateway;
use super::clipboard::Clipboard;
use super::state::{CopyOutcome, DepositChecked, DepositController, DepositCreated, COPY_FEEDBACK};
use super::view;
use crate::models::pix::DepositRequest;

const CLEAR: &str = "\x1b[2J\x1b[H";

const HELP: &str = "\
Commands:
  amount <reais>   set the deposit amount
  create           call the Depix API
  edit             edit the deposit ID
  id <text>        type into the deposit ID editor
  save | cancel    commit or discard the edited ID
  status           check the deposit status
  copy             copy the payment code
  help             show this text
  quit             leave";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Amount(String),
    Create,
    Edit,
    Id(String),
    Save,
    Cancel,
    Status,
    Copy,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "amount" => Command::Amount(rest.to_string()),
            "create" => Command::Create,
            "edit" => Command::Edit,
            "id" => Command::Id(rest.to_string()),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "status" => Command::Status,
            "copy" => Command::Copy,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Work the event loop has to start after a command was applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    CreateDeposit(DepositRequest),
    CheckStatus(String),
    ExpireCopyFeedback,
}

#[derive(Debug)]
pub enum Event {
    Deposit(Result<DepositCreated, String>),
    Status(Result<DepositChecked, String>),
    CopyFeedbackExpired,
}

#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue(Option<Job>),
    Quit,
}

pub struct Console<C> {
    controller: DepositController,
    clipboard: C,
    notice: Option<String>,
}

impl<C: Clipboard> Console<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            controller: DepositController::new(),
            clipboard,
            notice: None,
        }
    }

    pub fn controller(&self) -> &DepositController {
        &self.controller
    }

    pub fn into_controller(self) -> DepositController {
        self.controller
    }

    pub fn handle_line(&mut self, line: &str, now: Instant) -> Flow {
        self.notice = None;

        // A pending alert swallows the next line, whatever it is.
        if self.controller.alert().is_some() {
            self.controller.dismiss_alert();
            return Flow::Continue(None);
        }

        let job = match Command::parse(line) {
            Command::Amount(value) => {
                self.controller.set_amount(&value);
                None
            }
            Command::Create => match self.controller.begin_deposit() {
                Some(request) => Some(Job::CreateDeposit(request)),
                None => {
                    self.notice = Some("A deposit request is already running.".to_string());
                    None
                }
            },
            Command::Edit => {
                self.controller.begin_edit_id();
                None
            }
            Command::Id(text) => {
                if !self.controller.is_editing_id() {
                    self.controller.begin_edit_id();
                }
                self.controller.set_draft_id(&text);
                None
            }
            Command::Save => {
                if !self.controller.is_editing_id() || !self.controller.save_draft_id() {
                    self.notice = Some("Enter a deposit ID first.".to_string());
                }
                None
            }
            Command::Cancel => {
                self.controller.cancel_edit_id();
                None
            }
            Command::Status => self.controller.begin_status_check().map(Job::CheckStatus),
            Command::Copy => match self.controller.copy_to_clipboard(&self.clipboard, now) {
                CopyOutcome::Copied => Some(Job::ExpireCopyFeedback),
                CopyOutcome::NothingToCopy => {
                    self.notice = Some("There is no payment code to copy yet.".to_string());
                    None
                }
                CopyOutcome::Failed => None,
            },
            Command::Help => {
                self.notice = Some(HELP.to_string());
                None
            }
            Command::Quit => return Flow::Quit,
            Command::Empty => None,
            Command::Unknown(line) => {
                self.notice = Some(format!("Unknown command: {line}. Type help."));
                None
            }
        };

        Flow::Continue(job)
    }

    pub fn apply(&mut self, event: Event, now: Instant) {
        match event {
            Event::Deposit(result) => self.controller.finish_deposit(result),
            Event::Status(result) => self.controller.finish_status_check(result),
            Event::CopyFeedbackExpired => self.controller.expire_copy_feedback(now),
        }
    }

    pub fn render(&self, now: Instant) -> String {
        let mut out = view::Panel::new(&self.controller, now).to_string();
        if let Some(notice) = &self.notice {
            out.push('\n');
            out.push_str(notice);
            out.push('\n');
        }
        out
    }
}

fn spawn_job(job: Job, gateway: &Arc<dyn DepositGateway>, events: &mpsc::Sender<Event>) {
    let gateway = gateway.clone();
    let events = events.clone();

    tokio::spawn(async move {
        let event = match job {
            Job::CreateDeposit(request) => {
                log::info!("Creating deposit: {:?}", request);
                Event::Deposit(gateway.create_deposit(request).await)
            }
            Job::CheckStatus(id) => {
                log::info!("Checking deposit status for {}", id);
                Event::Status(gateway.deposit_status(&id).await)
            }
            Job::ExpireCopyFeedback => {
                tokio::time::sleep(COPY_FEEDBACK).await;
                Event::CopyFeedbackExpired
            }
        };

        if events.send(event).await.is_err() {
            log::debug!("Console closed before the job finished.");
        }
    });
}

fn draw<C: Clipboard>(console: &Console<C>, out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "{CLEAR}{}\n> ", console.render(Instant::now()))?;
    out.flush()
}

/// Drives the console until `quit` or the input closes. Finished jobs are
/// applied before any pending input line.
pub async fn run<C: Clipboard>(
    mut console: Console<C>,
    gateway: Arc<dyn DepositGateway>,
    mut input: mpsc::Receiver<String>,
    mut out: impl Write,
) -> Result<DepositController, anyhow::Error> {
    let (events_tx, mut events_rx) = mpsc::channel(32);

    draw(&console, &mut out)?;

    loop {
        tokio::select! {
            biased;

            Some(event) = events_rx.recv() => {
                console.apply(event, Instant::now());
            }
            line = input.recv() => {
                let Some(line) = line else { break };

                match console.handle_line(&line, Instant::now()) {
                    Flow::Quit => break,
                    Flow::Continue(Some(job)) => spawn_job(job, &gateway, &events_tx),
                    Flow::Continue(None) => {}
                }
            }
        }

        draw(&console, &mut out)?;
    }

    Ok(console.into_controller())
}
