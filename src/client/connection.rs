//! Connection lifecycle: connect, register, pump lines, reconnect.
//!
//! One task runs [`run`] per connected client. Each socket attempt gets its
//! own transport, ping timer and generation id; the protocol state and the
//! send strategy live across attempts.

use std::future;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ClientOptions;
use crate::encode::OutboundCommand;
use crate::error::{ClientError, ProtocolError, TransportError};
use crate::event::Event;
use crate::message::Message;
use crate::ping::{CyclingPingTimer, PingTimerSignal};
use crate::queue::{self, SendStrategy};
use crate::transport::Transport;

use super::dispatch::Action;
use super::Shared;

/// Commands from the caller handle to the connection task.
#[derive(Debug)]
pub(crate) enum Control {
    /// Execute actions computed against the current state.
    Actions(Vec<Action>),
    /// Send QUIT and stop for good; `done` fires once the socket is closed.
    Disconnect {
        message: String,
        done: oneshot::Sender<()>,
    },
    /// Drop the socket without QUIT; the reconnect policy applies.
    End,
}

/// How one socket attempt ended.
#[derive(Debug)]
enum Outcome {
    /// The caller asked to disconnect.
    Requested,
    /// The socket went away; the reconnect policy applies.
    Dropped,
    /// Unrecoverable; the run ends with this error.
    Fatal(ClientError),
}

/// Drive the client until it is disconnected or gives up.
pub(crate) async fn run(
    shared: Arc<Shared>,
    mut control: mpsc::UnboundedReceiver<Control>,
) -> Result<(), ClientError> {
    let options = shared.state.lock().options().clone();
    let mut sender = queue::strategy_for(&options);
    let mut attempt: u32 = 0;

    loop {
        let generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut conn = Connection {
            shared: &shared,
            options: &options,
            sender: sender.as_mut(),
            generation,
        };
        match conn.run_once(&mut control).await {
            Outcome::Requested => return Ok(()),
            Outcome::Fatal(err) => return Err(err),
            Outcome::Dropped => {}
        }

        if let Some(cap) = options.retry_count {
            if attempt >= cap {
                warn!(retry_count = cap, "giving up on reconnecting");
                shared.bus.emit(&Event::Abort { retry_count: cap });
                return Ok(());
            }
        }
        attempt += 1;

        info!(
            attempt,
            delay_ms = options.retry_delay_ms,
            "reconnecting after delay"
        );
        if !wait_for_retry(&options, &mut control).await {
            return Ok(());
        }
    }
}

/// Sleep for the retry delay. Returns `false` when the caller disconnected meanwhile.
async fn wait_for_retry(
    options: &ClientOptions,
    control: &mut mpsc::UnboundedReceiver<Control>,
) -> bool {
    let delay = time::sleep(options.retry_delay());
    tokio::pin!(delay);

    loop {
        tokio::select! {
            _ = &mut delay => return true,
            cmd = control.recv() => match cmd {
                Some(Control::Disconnect { done, .. }) => {
                    info!("disconnect requested, cancelling reconnect");
                    let _ = done.send(());
                    return false;
                }
                Some(Control::Actions(actions)) => {
                    debug!(count = actions.len(), "dropping actions while disconnected");
                }
                Some(Control::End) => {}
                None => return false,
            },
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

struct Connection<'a> {
    shared: &'a Shared,
    options: &'a ClientOptions,
    sender: &'a mut dyn SendStrategy,
    generation: u64,
}

impl Connection<'_> {
    async fn run_once(&mut self, control: &mut mpsc::UnboundedReceiver<Control>) -> Outcome {
        let registration = {
            let mut state = self.shared.state.lock();
            state.reset();
            state.registration()
        };
        let dropped = self.sender.clear();
        if dropped > 0 {
            debug!(dropped, "discarding lines queued for the previous connection");
        }

        info!(
            server = %self.options.server,
            port = self.options.port,
            generation = self.generation,
            "connecting"
        );
        let mut transport = match Transport::connect(self.options).await {
            Ok(transport) => transport,
            Err(err) => return self.connect_failed(err),
        };

        let mut timer = CyclingPingTimer::new(self.options.ping_idle(), self.options.ping_timeout());
        let mut ping_counter: u64 = 0;
        let mut interval = self.sender.interval().map(|period| {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        for cmd in registration {
            if let Err(outcome) = self.submit(&mut transport, cmd).await {
                return outcome;
            }
        }
        timer.start();
        self.shared.bus.emit(&Event::Connect);

        loop {
            tokio::select! {
                line = transport.read_line() => {
                    let line = match line {
                        Some(Ok(line)) => line,
                        Some(Err(err)) => {
                            warn!(generation = self.generation, "read failed: {}", err);
                            self.shared.bus.emit(&Event::NetError(err.to_string()));
                            return Outcome::Dropped;
                        }
                        None => {
                            info!(generation = self.generation, "connection closed by server");
                            return Outcome::Dropped;
                        }
                    };
                    timer.notify_of_activity();
                    if self.options.debug {
                        debug!(generation = self.generation, "<< {}", line);
                    }

                    let msg = match Message::parse(&line, self.options.strip_colors) {
                        Ok(msg) => msg,
                        Err(source) => return Outcome::Fatal(ClientError::Parse { line, source }),
                    };
                    self.shared.bus.emit(&Event::Raw(msg.clone()));

                    let actions = self.shared.state.lock().handle(&msg);
                    if let Err(outcome) = self.execute(&mut transport, actions).await {
                        return outcome;
                    }
                }
                cmd = control.recv() => match cmd {
                    Some(Control::Actions(actions)) => {
                        if let Err(outcome) = self.execute(&mut transport, actions).await {
                            return outcome;
                        }
                    }
                    Some(Control::Disconnect { message, done }) => {
                        self.quit(&mut transport, &message).await;
                        let _ = done.send(());
                        return Outcome::Requested;
                    }
                    Some(Control::End) => {
                        info!(generation = self.generation, "connection ended by caller");
                        let _ = transport.close().await;
                        return Outcome::Dropped;
                    }
                    None => {
                        self.quit(&mut transport, "").await;
                        return Outcome::Requested;
                    }
                },
                signal = timer.next_signal() => match signal {
                    PingTimerSignal::WantPing => {
                        ping_counter += 1;
                        let ping = OutboundCommand::new("PING", [ping_counter.to_string()]);
                        if let Err(outcome) = self.submit(&mut transport, ping).await {
                            return outcome;
                        }
                    }
                    PingTimerSignal::Timeout => {
                        warn!(generation = self.generation, "ping timeout");
                        let _ = transport.close().await;
                        return Outcome::Dropped;
                    }
                },
                _ = next_tick(&mut interval) => {
                    if let Some(line) = self.sender.next_due() {
                        if let Err(outcome) = self.write(&mut transport, line).await {
                            return outcome;
                        }
                    }
                }
            }
        }
    }

    fn connect_failed(&self, err: TransportError) -> Outcome {
        warn!(server = %self.options.server, "connection failed: {}", err);
        self.shared.bus.emit(&Event::NetError(err.to_string()));
        match err {
            TransportError::Io(_) => Outcome::Dropped,
            err => Outcome::Fatal(err.into()),
        }
    }

    /// Run dispatcher actions in order: sends go through the strategy,
    /// events are published.
    async fn execute(
        &mut self,
        transport: &mut Transport,
        actions: Vec<Action>,
    ) -> Result<(), Outcome> {
        for action in actions {
            match action {
                Action::Send(cmd) => self.submit(transport, cmd).await?,
                Action::Emit(event) => self.shared.bus.emit(&event),
            }
        }
        Ok(())
    }

    async fn submit(&mut self, transport: &mut Transport, cmd: OutboundCommand) -> Result<(), Outcome> {
        match self.sender.submit(cmd.to_line()) {
            Some(line) => self.write(transport, line).await,
            None => Ok(()),
        }
    }

    /// Write one line. Only socket failures end the connection; a line the
    /// codec refuses is dropped on its own.
    async fn write(&mut self, transport: &mut Transport, line: String) -> Result<(), Outcome> {
        if self.options.debug {
            debug!(generation = self.generation, ">> {}", line);
        }
        match transport.write_line(line).await {
            Ok(()) => Ok(()),
            Err(ProtocolError::Io(err)) => {
                warn!(generation = self.generation, "write failed: {}", err);
                self.shared.bus.emit(&Event::NetError(err.to_string()));
                Err(Outcome::Dropped)
            }
            Err(err) => {
                warn!(generation = self.generation, "dropping outbound line: {}", err);
                Ok(())
            }
        }
    }

    /// Graceful close: queued lines are discarded and QUIT is written directly.
    async fn quit(&mut self, transport: &mut Transport, message: &str) {
        let dropped = self.sender.clear();
        if dropped > 0 {
            debug!(dropped, "discarding queued lines on disconnect");
        }
        let args = Some(message).filter(|m| !m.is_empty());
        let quit = OutboundCommand::new("QUIT", args).to_line();
        if let Err(err) = transport.write_line(quit).await {
            debug!("failed to send QUIT: {}", err);
        }
        if let Err(err) = transport.close().await {
            debug!("failed to close connection: {}", err);
        }
        info!(generation = self.generation, "disconnected");
    }
}
