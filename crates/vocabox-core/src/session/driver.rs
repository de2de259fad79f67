//! Async session driver
//!
//! Runs a [`StudySession`] inside one tokio task. The task multiplexes:
//! - user commands from an mpsc channel
//! - a 1-second ticker feeding study time
//! - a sleep until the next break or feedback deadline
//!
//! Leaving (or dropping every command sender) ends the task, which stops
//! both timers with it. Snapshots for the UI go out on a watch channel.

use std::time::Duration as StdDuration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::controller::{SessionSummary, StudySession};
use crate::model::VocabularyItem;
use crate::practice::{Answer, Exercise};
use crate::schedule::Rating;

/// Command channel depth
const COMMAND_BUFFER: usize = 32;

/// User input forwarded to the session task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Flip,
    Rate(Rating),
    SkipBreak,
    Answer(Answer),
    Pronounce,
    ResetWord(String),
    Leave,
}

/// What the UI needs to render the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: &'static str,
    pub index: usize,
    pub queue_len: usize,
    pub current_word: Option<VocabularyItem>,
    pub exercise: Option<Exercise>,
    pub last_answer: Option<bool>,
    /// Entries waiting for practice
    pub pending: usize,
    pub break_remaining_secs: Option<i64>,
    pub finished: bool,
}

impl SessionSnapshot {
    pub fn of(session: &StudySession) -> Self {
        let phase = session.phase();
        Self {
            phase: phase.name(),
            index: phase.index(),
            queue_len: session.queue().len(),
            current_word: session.current_word().cloned(),
            exercise: session.current_exercise().cloned(),
            last_answer: session.last_answer(),
            pending: phase.batch().len(),
            break_remaining_secs: session.break_remaining().map(|d| d.num_seconds()),
            finished: phase.is_finished(),
        }
    }
}

/// Handle to a running session task
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Forward a command. `false` once the session has ended.
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that sees every future snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the session to finish on its own
    pub async fn join(self) -> Result<SessionSummary, JoinError> {
        let SessionHandle { commands, task, .. } = self;
        let summary = task.await;
        drop(commands);
        summary
    }

    /// Abandon the session and wait for the task to stop
    pub async fn leave(self) -> Result<SessionSummary, JoinError> {
        let SessionHandle { commands, task, .. } = self;
        // task may already be gone; the summary is still there
        let _ = commands.send(SessionCommand::Leave).await;
        drop(commands);
        task.await
    }
}

/// Move a session onto its own task
pub fn spawn_session(session: StudySession) -> SessionHandle {
    let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::of(&session));
    let task = tokio::spawn(run(session, receiver, snapshot_tx));
    SessionHandle {
        commands,
        snapshots,
        task,
    }
}

async fn run(
    mut session: StudySession,
    mut commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> SessionSummary {
    let mut ticker = tokio::time::interval(StdDuration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    while !session.is_finished() {
        let deadline = session
            .time_until_deadline()
            .map(|remaining| Instant::now() + remaining.to_std().unwrap_or_default());

        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::Leave) | None => {
                    session.leave();
                }
                Some(command) => apply_command(&mut session, command),
            },
            _ = ticker.tick() => {
                session.record_elapsed_second();
                session.poll();
            }
            _ = wait_until(deadline) => session.poll(),
        }

        snapshots.send_replace(SessionSnapshot::of(&session));
    }

    debug!(session = %session.id(), "Session task exiting");
    session.summary()
}

fn apply_command(session: &mut StudySession, command: SessionCommand) {
    match command {
        SessionCommand::Flip => session.flip(),
        SessionCommand::Rate(rating) => session.rate(rating),
        SessionCommand::SkipBreak => session.skip_break(),
        SessionCommand::Answer(answer) => {
            session.submit_answer(&answer);
        }
        SessionCommand::Pronounce => session.pronounce(),
        SessionCommand::ResetWord(word_id) => session.reset_word(&word_id),
        SessionCommand::Leave => {
            session.leave();
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
