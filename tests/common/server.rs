//! Scripted IRC server over an in-memory duplex pipe.

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, Lines,
};
use tokio::time::timeout;

use super::STEP_TIMEOUT;

pub const SERVER_NAME: &str = "irc.test";

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// The server end of a client connection.
pub struct FakeServer {
    lines: Lines<BufReader<BoxedRead>>,
    writer: BoxedWrite,
}

#[allow(dead_code)]
impl FakeServer {
    /// A connected pair: the stream to hand to the client, and the server.
    pub fn pair() -> (DuplexStream, Self) {
        let (client, server) = tokio::io::duplex(16 * 1024);
        (client, Self::from_stream(server))
    }

    /// Serve over an accepted socket.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, writer) = tokio::io::split(stream);
        Self {
            lines: BufReader::new(Box::new(read) as BoxedRead).lines(),
            writer: Box::new(writer),
        }
    }

    /// Send one line, adding CRLF.
    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .expect("write to client failed");
    }

    /// Next line from the client, without its terminator.
    pub async fn recv(&mut self) -> String {
        timeout(STEP_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read from client failed")
            .expect("client closed the connection")
    }

    /// Assert the next line from the client.
    pub async fn expect(&mut self, line: &str) {
        assert_eq!(self.recv().await, line);
    }

    /// `true` once the client has closed its side.
    pub async fn is_closed(&mut self) -> bool {
        matches!(
            timeout(STEP_TIMEOUT, self.lines.next_line()).await,
            Ok(Ok(None)) | Ok(Err(_))
        )
    }

    /// Read USER and NICK, then accept the registration.
    pub async fn accept_registration(&mut self, nick: &str) {
        let user = self.recv().await;
        assert!(user.starts_with("USER "), "expected USER, got {user:?}");
        self.expect(&format!("NICK {nick}")).await;
        self.welcome(nick).await;
    }

    /// Send 001 through 004 for `nick`.
    pub async fn welcome(&mut self, nick: &str) {
        self.send(&format!(":{SERVER_NAME} 001 {nick} :Welcome to the test network {nick}"))
            .await;
        self.send(&format!(":{SERVER_NAME} 002 {nick} :Your host is {SERVER_NAME}"))
            .await;
        self.send(&format!(":{SERVER_NAME} 003 {nick} :This server was created today"))
            .await;
        self.send(&format!(":{SERVER_NAME} 004 {nick} {SERVER_NAME} test-1.0 iow ov"))
            .await;
    }
}
