//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server endpoint and a spawned bot process for
//! exercising the full connection lifecycle over a real socket.

use std::process::{Child, Command, Stdio};

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};

/// A scripted server endpoint the bot connects to.
pub struct ScriptedServer {
    listener: TcpListener,
    port: u16,
}

impl ScriptedServer {
    /// Bind on an ephemeral local port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    /// Bind on a specific local port, e.g. to resume listening after the
    /// previous listener was dropped. Reuses the address so lingering
    /// connections from the earlier listener do not block the bind.
    pub async fn rebind(port: u16) -> anyhow::Result<Self> {
        let socket = tokio::net::TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(std::net::SocketAddr::from(([127, 0, 0, 1], port)))?;
        let listener = socket.listen(16)?;
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _addr) = timeout(Duration::from_secs(10), self.listener.accept())
            .await
            .context("timed out waiting for the bot to connect")??;
        let (read_half, write_half) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }
}

/// One accepted connection from the bot.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ServerConn {
    /// Receive one CRLF-terminated line, stripped of its terminator.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(10), self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for a line from the bot")??;
        if n == 0 {
            bail!("bot closed the connection");
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Send one line, appending CRLF.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await?;
        Ok(())
    }

    /// Read and check the three-line registration burst.
    pub async fn expect_registration_burst(&mut self, nick: &str, chan: &str) -> anyhow::Result<()> {
        let line = self.recv_line().await?;
        assert_eq!(line, format!("NICK {nick}"));
        let line = self.recv_line().await?;
        assert_eq!(line, format!("USER {nick} 0 * :{nick}"));
        let line = self.recv_line().await?;
        assert_eq!(line, format!("JOIN {chan}"));
        Ok(())
    }
}

/// A spawned ircboard process pointed at a scripted server.
pub struct BotProcess {
    child: Child,
    _config_dir: tempfile::TempDir,
}

impl BotProcess {
    /// Spawn the bot against `port` with fast retry timing for tests.
    pub fn spawn(port: u16, nick: &str, chan: &str) -> anyhow::Result<Self> {
        let config_dir = tempfile::tempdir()?;
        let config_path = config_dir.path().join("config.toml");
        let config = format!(
            r#"
[server]
host = "127.0.0.1"
port = {port}

[irc]
nick = "{nick}"
chan = "{chan}"

[retry]
link_floor_ms = 50
link_ceiling_ms = 400
registration_floor_ms = 50
registration_ceiling_ms = 400
"#
        );
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_ircboard"))
            .arg(&config_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self {
            child,
            _config_dir: config_dir,
        })
    }
}

impl Drop for BotProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
