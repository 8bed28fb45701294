//! Async owner of an `ExamController`.
//!
//! One task receives commands, drives the one-second countdown and holds at
//! most one pending delayed navigation. A newer navigation request replaces
//! the pending one. Dropping every `ExamHandle`, a shutdown command or an
//! exit command stops the task, and any pending navigation with it.

use std::pin::Pin;
use std::time::Duration;

use prep_core::model::{CompletedAttempt, ExamSession, ExamView, NavigationIntent};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep};

use crate::config::ExamConfig;
use crate::exam_service::ExamController;

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamCommand {
    SetDelayEnabled(bool),
    SetExtendedTime(bool),
    Start,
    SelectAnswer(usize),
    ToggleMark,
    Navigate(NavigationIntent),
    JumpTo(usize),
    RequestSubmit,
    CancelSubmit,
    /// Confirms a pending submit request.
    Submit,
    Restart,
    ExitAndSave,
    ExitWithoutSave,
    Shutdown,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSnapshot {
    pub session: ExamSession,
    pub awaiting_confirmation: bool,
    pub pending_navigation: Option<NavigationIntent>,
    pub last_attempt: Option<CompletedAttempt>,
    pub closed: bool,
}

impl ExamSnapshot {
    fn capture(
        controller: &ExamController,
        pending_navigation: Option<NavigationIntent>,
        closed: bool,
    ) -> Self {
        Self {
            session: controller.session().clone(),
            awaiting_confirmation: controller.awaiting_confirmation(),
            pending_navigation,
            last_attempt: controller.session().result().cloned(),
            closed,
        }
    }
}

struct PendingNavigation {
    intent: NavigationIntent,
    timer: Pin<Box<Sleep>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitMode {
    Save,
    Discard,
}

enum Event {
    Command(Option<ExamCommand>),
    Tick,
    NavigationDue,
}

/// Command side of a running driver.
#[derive(Clone)]
pub struct ExamHandle {
    commands: mpsc::Sender<ExamCommand>,
    snapshots: watch::Receiver<ExamSnapshot>,
}

impl ExamHandle {
    /// Queue a command. Returns `false` once the driver has stopped.
    pub async fn send(&self, command: ExamCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Queue a command without waiting for buffer space.
    pub fn try_send(&self, command: ExamCommand) -> bool {
        self.commands.try_send(command).is_ok()
    }

    #[must_use]
    pub fn snapshot(&self) -> ExamSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ExamSnapshot> {
        self.snapshots.clone()
    }
}

pub struct ExamDriver {
    controller: ExamController,
    navigation_delay: Duration,
    tick_interval: Duration,
    commands: mpsc::Receiver<ExamCommand>,
    snapshots: watch::Sender<ExamSnapshot>,
    pending: Option<PendingNavigation>,
    ticker: Option<Interval>,
    exit: Option<ExitMode>,
}

impl ExamDriver {
    /// Spawn the driver task for `controller`.
    #[must_use]
    pub fn spawn(controller: ExamController, config: &ExamConfig) -> (ExamHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) =
            watch::channel(ExamSnapshot::capture(&controller, None, false));
        let driver = Self {
            controller,
            navigation_delay: config.navigation_delay(),
            tick_interval: config.tick_interval(),
            commands: command_rx,
            snapshots: snapshot_tx,
            pending: None,
            ticker: None,
            exit: None,
        };
        let handle = ExamHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        let task = tokio::spawn(driver.run());
        (handle, task)
    }

    async fn run(mut self) {
        loop {
            let ticking = self.ticker.is_some();
            let waiting = self.pending.is_some();
            let event = tokio::select! {
                cmd = self.commands.recv() => Event::Command(cmd),
                () = next_tick(&mut self.ticker), if ticking => Event::Tick,
                () = navigation_due(&mut self.pending), if waiting => Event::NavigationDue,
            };

            match event {
                Event::Command(None | Some(ExamCommand::Shutdown)) => break,
                Event::Command(Some(command)) => self.apply(command),
                Event::Tick => {
                    self.controller.tick();
                }
                Event::NavigationDue => {
                    if let Some(pending) = self.pending.take() {
                        self.controller.navigate(pending.intent);
                    }
                }
            }

            if self.controller.session().view() == ExamView::Results {
                self.ticker = None;
                self.pending = None;
            }
            self.publish();
            if self.exit.is_some() {
                break;
            }
        }

        let slot = self.controller.slot().clone();
        match self.exit {
            Some(ExitMode::Save) => self.controller.exit_and_save().wait().await,
            Some(ExitMode::Discard) => self.controller.exit_without_save().wait().await,
            None => self.controller.flush().await,
        }
        tracing::debug!(slot = %slot, "exam driver stopped");
    }

    fn publish(&self) {
        self.snapshots.send_replace(ExamSnapshot::capture(
            &self.controller,
            self.pending.as_ref().map(|p| p.intent),
            self.exit.is_some(),
        ));
    }

    fn apply(&mut self, command: ExamCommand) {
        match command {
            ExamCommand::SetDelayEnabled(enabled) => {
                self.controller.set_delay_enabled(enabled);
            }
            ExamCommand::SetExtendedTime(enabled) => {
                self.controller.set_extended_time(enabled);
            }
            ExamCommand::Start => {
                if self.controller.start() {
                    // interval_at panics on a zero period
                    let period = self.tick_interval.max(Duration::from_millis(1));
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
                    self.ticker = Some(ticker);
                }
            }
            ExamCommand::SelectAnswer(choice) => {
                self.controller.select_answer(choice);
            }
            ExamCommand::ToggleMark => {
                self.controller.toggle_mark();
            }
            ExamCommand::Navigate(intent) => self.request_navigation(intent),
            ExamCommand::JumpTo(index) => {
                self.pending = None;
                self.controller.jump_to(index);
            }
            ExamCommand::RequestSubmit => {
                self.controller.request_submit();
            }
            ExamCommand::CancelSubmit => self.controller.cancel_submit(),
            ExamCommand::Submit => {
                if let Err(err) = self.controller.submit() {
                    tracing::debug!(error = %err, "submit ignored");
                }
            }
            ExamCommand::Restart => {
                if !self.controller.restart() {
                    tracing::debug!(attempts_left = self.controller.attempts_left(), "restart ignored");
                }
            }
            ExamCommand::ExitAndSave => self.close(ExitMode::Save),
            ExamCommand::ExitWithoutSave => self.close(ExitMode::Discard),
            // handled by the loop
            ExamCommand::Shutdown => {}
        }
    }

    fn request_navigation(&mut self, intent: NavigationIntent) {
        let delay_enabled = self.controller.session().settings().delay_enabled;
        if !delay_enabled || self.navigation_delay.is_zero() {
            self.pending = None;
            self.controller.navigate(intent);
            return;
        }
        self.pending = Some(PendingNavigation {
            intent,
            timer: Box::pin(sleep(self.navigation_delay)),
        });
    }

    fn close(&mut self, mode: ExitMode) {
        self.pending = None;
        self.ticker = None;
        self.exit = Some(mode);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn navigation_due(pending: &mut Option<PendingNavigation>) {
    match pending {
        Some(pending) => pending.timer.as_mut().await,
        None => std::future::pending::<()>().await,
    }
}
