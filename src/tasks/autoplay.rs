use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::events::ViewerCommand;

/// Running auto-advance timer. Dropping it cancels the timer task.
pub struct AutoAdvance {
    _guard: DropGuard,
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Start a timer on a child of `parent` that requests the next slide every
/// `interval`. The first request is sent one full interval after start.
pub fn spawn(
    interval: Duration,
    commands: Sender<ViewerCommand>,
    parent: &CancellationToken,
) -> AutoAdvance {
    let token = parent.child_token();
    let handle = tokio::spawn(run(interval, commands, token.clone()));
    AutoAdvance {
        _guard: token.drop_guard(),
        handle,
    }
}

pub async fn run(interval: Duration, commands: Sender<ViewerCommand>, cancel: CancellationToken) {
    let interval = interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                debug!("auto-advance tick");
                if commands.send(ViewerCommand::AdvanceSlide).await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("auto-advance stopped");
}
