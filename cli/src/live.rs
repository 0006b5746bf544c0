use std::collections::VecDeque;

use anyhow::{bail, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use common::{StreamAction, StreamClient, StreamEvent};

/// What a live connection reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Text(String),
    Error(String),
    Closed,
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    type Conn: Connection;

    async fn connect(&mut self, url: &Url) -> Result<Self::Conn>;
}

#[allow(async_fn_in_trait)]
pub trait Connection {
    async fn next_event(&mut self) -> TransportEvent;

    async fn close(&mut self);
}

/// Where accepted messages end up.
pub trait StatusSink {
    fn append_log(&mut self, line: &str);

    fn set_state(&mut self, state: &str);
}

pub struct WsTransport;

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for WsTransport {
    type Conn = WsConnection;

    async fn connect(&mut self, url: &Url) -> Result<WsConnection> {
        log::debug!("connecting to {}", url);
        let (stream, _) = connect_async(url.as_str()).await?;
        Ok(WsConnection { stream })
    }
}

impl Connection for WsConnection {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Text(text),
                Some(Ok(Message::Close(_))) | None => return TransportEvent::Closed,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return TransportEvent::Error(e.to_string()),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            log::debug!("closing stream: {}", e);
        }
    }
}

/// Prints the status log and state changes to stdout.
#[derive(Default)]
pub struct TerminalSink;

impl StatusSink for TerminalSink {
    fn append_log(&mut self, line: &str) {
        println!("{}", line);
    }

    fn set_state(&mut self, state: &str) {
        println!("== state: {} ==", state);
    }
}

/// Runs the stream client until it navigates away and returns the
/// completion URL. In view mode this only ends when the caller drops it.
pub async fn run_stream<T, S>(client: &mut StreamClient, transport: &mut T, sink: &mut S) -> Result<Url>
where
    T: Transport,
    S: StatusSink,
{
    let mut pending: VecDeque<StreamAction> = client.start().into();
    let mut conn: Option<T::Conn> = None;

    loop {
        while let Some(action) = pending.pop_front() {
            match action {
                StreamAction::Connect(url) => match transport.connect(&url).await {
                    Ok(c) => {
                        conn = Some(c);
                        pending.extend(client.handle(StreamEvent::Opened));
                    }
                    Err(e) => {
                        log::warn!("connecting to {}: {}", url, e);
                        pending.extend(client.handle(StreamEvent::Error));
                    }
                },
                StreamAction::AppendLog(line) => sink.append_log(&line),
                StreamAction::SetState(state) => sink.set_state(&state),
                StreamAction::Close => {
                    if let Some(mut c) = conn.take() {
                        c.close().await;
                    }
                    pending.extend(client.handle(StreamEvent::Closed));
                }
                StreamAction::ScheduleReconnect(delay) => {
                    tokio::time::sleep(delay).await;
                    pending.extend(client.handle(StreamEvent::ReconnectDue));
                }
                StreamAction::Navigate(url) => return Ok(url),
            }
        }

        let Some(c) = conn.as_mut() else {
            bail!("stream client has no connection and nothing to do");
        };
        let next = c.next_event().await;
        let event = match next {
            TransportEvent::Text(text) => StreamEvent::Message(text),
            TransportEvent::Error(e) => {
                log::warn!("stream error: {}", e);
                StreamEvent::Error
            }
            TransportEvent::Closed => {
                conn = None;
                StreamEvent::Closed
            }
        };
        pending.extend(client.handle(event));
    }
}
