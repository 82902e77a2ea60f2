//! Socket setup: TCP, optional TLS, and line framing.

use azmate_proto::LineCodec;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use super::{tls, BoxedRead, BoxedWrite, LineSink, LineStream};
use crate::config::{ConnectionConfig, ServerConfig};
use crate::error::ConnectError;

/// Open a connection to `server`, upgrading to TLS when configured.
pub(crate) async fn open(server: &ServerConfig) -> Result<(BoxedRead, BoxedWrite), ConnectError> {
    let tcp = TcpStream::connect((server.address.as_str(), server.port)).await?;
    if let Err(e) = tcp.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }
    info!(server = %server.address, port = server.port, tls = server.tls, "socket connected");

    if server.tls {
        let stream = tls::upgrade_to_tls(tcp, &server.address, server.verify_tls).await?;
        Ok(split(stream))
    } else {
        Ok(split(tcp))
    }
}

/// Split any bidirectional stream into boxed halves.
pub(crate) fn split<S>(stream: S) -> (BoxedRead, BoxedWrite)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read, write) = tokio::io::split(stream);
    (Box::new(read), Box::new(write))
}

/// Frame both halves with the configured charset and line ending.
pub(crate) fn frame(
    read: BoxedRead,
    write: BoxedWrite,
    connection: &ConnectionConfig,
) -> Result<(LineStream, LineSink), ConnectError> {
    let incoming = LineCodec::new(&connection.charset)?;
    let outgoing =
        LineCodec::new(&connection.charset)?.with_line_ending(connection.line_ending.clone());
    Ok((
        FramedRead::new(read, incoming),
        FramedWrite::new(write, outgoing),
    ))
}
