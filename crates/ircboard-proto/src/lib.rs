//! # ircboard-proto
//!
//! Protocol core for the ircboard appliance: byte-stream framing and line
//! parsing for a line-oriented IRC-style text protocol.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ircboard_proto::{Framer, ParsedMessage};
//!
//! # async fn run(stream: tokio::net::TcpStream) -> ircboard_proto::Result<()> {
//! let (read_half, _write_half) = stream.into_split();
//! let mut framer = Framer::new(read_half);
//!
//! // Drain all currently available lines before idling.
//! while let Some(line) = framer.poll().await? {
//!     match line.parse::<ParsedMessage>() {
//!         Ok(msg) => println!("{} {}", msg.command, msg.params),
//!         Err(_) => continue, // malformed lines are dropped
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod framer;
pub mod message;

pub use error::{MessageParseError, ProtocolError, Result};
pub use framer::Framer;
pub use message::ParsedMessage;
