//! Two-phase keep-alive watchdog.
//!
//! After `idle` of silence the timer asks for a PING; if nothing arrives
//! within `wait` after that, it reports a timeout and stops. Any inbound
//! activity re-arms the idle phase. Only one deadline is ever armed.
//!
//! The timer does not spawn anything: the connection task polls
//! [`CyclingPingTimer::next_signal`] inside its `select!` loop.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Output of [`CyclingPingTimer::next_signal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PingTimerSignal {
    /// The idle phase expired; send a PING.
    WantPing,
    /// No activity during the wait phase; the connection is dead.
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Stopped,
    Idle { deadline: Instant },
    AwaitingPong { deadline: Instant },
}

/// Idle/ping-wait watchdog owned by one connection.
#[derive(Debug)]
pub struct CyclingPingTimer {
    idle: Duration,
    wait: Duration,
    state: TimerState,
}

impl CyclingPingTimer {
    pub fn new(idle: Duration, wait: Duration) -> Self {
        CyclingPingTimer {
            idle,
            wait,
            state: TimerState::Stopped,
        }
    }

    /// Arm the idle phase. No-op when already running.
    pub fn start(&mut self) {
        if self.state == TimerState::Stopped {
            self.arm_idle();
        }
    }

    /// Disarm everything. Idempotent.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Restart the idle phase after inbound activity. No-op when stopped.
    pub fn notify_of_activity(&mut self) {
        if self.state != TimerState::Stopped {
            self.arm_idle();
        }
    }

    pub fn is_running(&self) -> bool {
        self.state != TimerState::Stopped
    }

    /// Whether a PING is outstanding.
    pub fn is_awaiting_pong(&self) -> bool {
        matches!(self.state, TimerState::AwaitingPong { .. })
    }

    fn arm_idle(&mut self) {
        self.state = TimerState::Idle {
            deadline: Instant::now() + self.idle,
        };
    }

    /// Wait for the armed deadline and advance the state machine.
    ///
    /// Pending forever while stopped. Cancel-safe: state only changes once
    /// the deadline has passed.
    pub async fn next_signal(&mut self) -> PingTimerSignal {
        match self.state {
            TimerState::Stopped => std::future::pending().await,
            TimerState::Idle { deadline } => {
                sleep_until(deadline).await;
                self.state = TimerState::AwaitingPong {
                    deadline: Instant::now() + self.wait,
                };
                PingTimerSignal::WantPing
            }
            TimerState::AwaitingPong { deadline } => {
                sleep_until(deadline).await;
                self.state = TimerState::Stopped;
                PingTimerSignal::Timeout
            }
        }
    }
}
