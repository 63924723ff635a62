//! Delivery of updated collection snapshots over time. Polling and SSE
//! push are interchangeable behind [`ChangeSource`]; the cache adopts
//! whatever snapshots arrive and does not care which mechanism produced
//! them.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use tracing::warn;

use super::transport::SyncTransport;
use crate::error::{Error, Result};
use crate::models::Task;

/// A lazy, restartable sequence of collection snapshots. `None` means
/// the source is exhausted for now; calling `next` again may
/// re-establish it.
#[async_trait]
pub trait ChangeSource: Send {
    async fn next(&mut self) -> Option<Vec<Task>>;
}

/// Re-fetches through the transport on a fixed interval, typically
/// [`Config::poll_interval`](crate::config::Config::poll_interval).
/// Simple and robust to connection drops: a failed fetch is logged and
/// the next tick retries naturally.
pub struct PollingSource<T: SyncTransport> {
    transport: T,
    interval: tokio::time::Interval,
}

impl<T: SyncTransport> PollingSource<T> {
    pub fn new(transport: T, period: Duration) -> Self {
        Self {
            transport,
            interval: tokio::time::interval(period),
        }
    }
}

#[async_trait]
impl<T: SyncTransport> ChangeSource for PollingSource<T> {
    async fn next(&mut self) -> Option<Vec<Task>> {
        loop {
            self.interval.tick().await;
            match self.transport.fetch().await {
                Ok(tasks) => return Some(tasks),
                Err(err) => {
                    warn!(error = %err, "poll fetch failed, retrying next tick");
                }
            }
        }
    }
}

/// Consumes the server's SSE resource; every event body is a full
/// collection. Lower latency than polling, at the cost of a long-lived
/// connection. The first snapshot arrives immediately on connect.
pub struct PushSource {
    http: reqwest::Client,
    url: String,
    conn: Option<PushConn>,
}

struct PushConn {
    stream: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    frames: FrameBuffer,
}

impl PushSource {
    /// `url` is the updates resource, e.g. from
    /// [`HttpTransport::updates_url`](super::transport::HttpTransport::updates_url).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            conn: None,
        }
    }

    // Associated fn over owned values: the subscribe future must not
    // capture `&self`, or `next` stops being a `Send` future.
    async fn connect(http: reqwest::Client, url: String) -> Result<PushConn> {
        let resp = http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Server {
                status: resp.status().as_u16(),
                detail: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(PushConn {
            stream: Box::pin(resp.bytes_stream()),
            frames: FrameBuffer::default(),
        })
    }
}

#[async_trait]
impl ChangeSource for PushSource {
    async fn next(&mut self) -> Option<Vec<Task>> {
        if self.conn.is_none() {
            match Self::connect(self.http.clone(), self.url.clone()).await {
                Ok(conn) => self.conn = Some(conn),
                Err(err) => {
                    warn!(error = %err, "push subscribe failed");
                    return None;
                }
            }
        }

        loop {
            let Some(conn) = self.conn.as_mut() else {
                return None;
            };

            if let Some(payload) = conn.frames.take_event() {
                match serde_json::from_str::<Vec<Task>>(&payload) {
                    Ok(tasks) => return Some(tasks),
                    Err(err) => {
                        warn!(error = %err, "discarding unparseable push event");
                        continue;
                    }
                }
            }

            match conn.stream.next().await {
                Some(Ok(chunk)) => conn.frames.feed(&chunk),
                Some(Err(err)) => {
                    warn!(error = %err, "push stream error, dropping connection");
                    break;
                }
                None => break,
            }
        }

        // The next call re-subscribes from scratch.
        self.conn = None;
        None
    }
}

/// Minimal SSE frame parser: accumulates bytes, yields the joined
/// `data:` lines of each complete (blank-line terminated) event.
/// Comment and keep-alive frames are swallowed.
///
/// Accumulation stays at the byte level: a network chunk can end in the
/// middle of a multi-byte character, so decoding happens only once a
/// complete frame is delimited.
#[derive(Default)]
struct FrameBuffer {
    buffer: Vec<u8>,
}

impl FrameBuffer {
    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    fn take_event(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let frame = String::from_utf8_lossy(&frame);
            let data: Vec<String> = frame
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest).to_string())
                .collect();
            if !data.is_empty() {
                return Some(data.join("\n"));
            }
        }
    }
}
