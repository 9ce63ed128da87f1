//! Connection supervision.
//!
//! Drives link establishment, the registration handshake, keepalive, and
//! exponential-backoff reconnection across two nested failure domains: the
//! network link and the protocol session. A single task owns the socket, the
//! framer, and the display handle, so no locking is involved anywhere.

use std::io;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use ircboard_proto::{Framer, ParsedMessage, ProtocolError};

use crate::backoff::Backoff;
use crate::config::{Config, ConfigError};
use crate::display::Panel;
use crate::router::{Action, Router};

/// Socket connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle yield between read attempts once the line queue is drained. Keeps
/// latency low without busy-spinning.
const IDLE_YIELD: Duration = Duration::from_millis(1);

/// Link and registration lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link; connect attempts run under the link backoff.
    Disconnected,
    /// Socket connected, registration burst not yet sent.
    LinkUp,
    /// Registration burst sent, waiting for confirmation or rejection.
    AwaitingRegistration,
    /// Channel join confirmed.
    Registered,
    /// Unrecoverable configuration error. Terminal.
    Faulted,
}

/// Orchestrates the connection lifecycle around a [`Router`] and a display
/// [`Panel`].
pub struct Supervisor<P> {
    config: Config,
    router: Router,
    panel: P,
    state: ConnectionState,
    link_backoff: Backoff,
    registration_backoff: Backoff,
}

impl<P: Panel> Supervisor<P> {
    /// Create a supervisor from validated-or-not configuration. Validation
    /// happens on [`Supervisor::run`] entry so a bad configuration surfaces
    /// through the `Faulted` path exactly once.
    pub fn new(config: Config, panel: P) -> Self {
        let router = Router::new(config.irc.nick.clone(), config.irc.chan.clone());
        let link_backoff = Backoff::new(
            Duration::from_millis(config.retry.link_floor_ms),
            Duration::from_millis(config.retry.link_ceiling_ms),
        );
        let registration_backoff = Backoff::new(
            Duration::from_millis(config.retry.registration_floor_ms),
            Duration::from_millis(config.retry.registration_ceiling_ms),
        );
        Self {
            config,
            router,
            panel,
            state: ConnectionState::Disconnected,
            link_backoff,
            registration_backoff,
        }
    }

    /// Run the connection cycle forever. Returns only for an unrecoverable
    /// configuration error.
    pub async fn run(&mut self) -> Result<(), ConfigError> {
        if let Err(e) = self.config.validate() {
            self.state = ConnectionState::Faulted;
            self.panel.set_status("config error");
            return Err(e);
        }

        loop {
            self.panel.set_status("IRC connect...");
            let stream = match self.connect().await {
                Ok(stream) => stream,
                Err(e) => {
                    let delay = self.link_backoff.next_delay();
                    warn!(error = %e, delay_ms = delay.as_millis() as u64, "connect failed");
                    self.panel.set_status("link down");
                    sleep(delay).await;
                    continue;
                }
            };
            self.state = ConnectionState::LinkUp;
            // A successful link-up (not a successful registration) resets the
            // link timer; consecutive connect failures keep doubling.
            self.link_backoff.reset();
            info!(
                host = %self.config.server.host,
                port = self.config.server.port,
                "link established"
            );

            let err = self.session(stream).await;
            warn!(error = %err, "link lost");
            self.state = ConnectionState::Disconnected;
            self.panel.set_status("link down");
        }
    }

    async fn connect(&self) -> io::Result<TcpStream> {
        let addr = (self.config.server.host.as_str(), self.config.server.port);
        match timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "connect timed out",
            )),
        }
    }

    /// Run one protocol session to link failure. Only link-level errors
    /// escape; everything else is absorbed as state transitions or dropped
    /// input.
    async fn session(&mut self, stream: TcpStream) -> ProtocolError {
        let (read_half, mut write_half) = stream.into_split();
        let mut framer = Framer::new(read_half);

        if let Err(e) = self.register(&mut write_half).await {
            return e;
        }

        loop {
            // Drain every line already buffered before yielding.
            loop {
                let line = match framer.poll().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return e,
                };
                debug!(raw = %line, "received");
                let msg: ParsedMessage = match line.parse() {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!(error = %e, "dropping malformed line");
                        continue;
                    }
                };
                // Dispatch only happens with the registration burst in flight
                // or confirmed.
                debug_assert!(matches!(
                    self.state,
                    ConnectionState::AwaitingRegistration | ConnectionState::Registered
                ));
                let action = self.router.dispatch(&msg, &mut self.panel);
                if let Err(e) = self.apply(action, &mut write_half).await {
                    return e;
                }
            }
            sleep(IDLE_YIELD).await;
        }
    }

    /// Send the registration burst: identity declaration then channel join.
    async fn register(&mut self, writer: &mut OwnedWriteHalf) -> Result<(), ProtocolError> {
        self.state = ConnectionState::AwaitingRegistration;
        let burst = format!(
            "NICK {0}\r\nUSER {0} 0 * :{0}\r\nJOIN {1}\r\n",
            self.config.irc.nick, self.config.irc.chan
        );
        writer.write_all(burst.as_bytes()).await?;
        debug!(nick = %self.config.irc.nick, chan = %self.config.irc.chan, "registration sent");
        Ok(())
    }

    /// Execute a router action. Backoff sleeps happen only here and in the
    /// link retry path, never per-line.
    async fn apply(
        &mut self,
        action: Action,
        writer: &mut OwnedWriteHalf,
    ) -> Result<(), ProtocolError> {
        match action {
            Action::None => {}
            Action::Pong(params) => {
                let reply = format!("PONG {params}\r\n");
                writer.write_all(reply.as_bytes()).await?;
                debug!(params = %params, "pong sent");
            }
            Action::RetryRegistration => {
                let delay = self.registration_backoff.next_delay();
                info!(delay_ms = delay.as_millis() as u64, "nick rejected, re-registering");
                sleep(delay).await;
                self.register(writer).await?;
            }
            Action::ConfirmRegistration => {
                self.state = ConnectionState::Registered;
                // Successful registration resets only the registration timer.
                self.registration_backoff.reset();
                info!(chan = %self.config.irc.chan, "registered");
            }
        }
        Ok(())
    }
}
