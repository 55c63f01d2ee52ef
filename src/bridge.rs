//! Outbound run events and the sinks that carry them to a host.
//!
//! Posting is fire-and-forget: a sink never reports failure back to the
//! engine, it logs and moves on.

use std::io::Write;
use std::sync::mpsc::Sender;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogState {
    Correct,
    Wrong,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub state: LogState,
    /// Symbol label, or `-` for the finishing entry.
    pub item: String,
    #[serde(rename = "positionInTime")]
    pub elapsed_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgePayload {
    pub log: LogEntry,
    pub time: f64,
    pub errors: u32,
}

/// Envelope understood by the host application embedding the exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub activity: &'static str,
    #[serde(rename = "dataNE")]
    pub data: BridgePayload,
}

impl BridgeMessage {
    pub fn new(log: LogEntry, time: f64, errors: u32) -> Self {
        Self {
            kind: "NeuroExercises",
            activity: "TMT",
            data: BridgePayload { log, time, errors },
        }
    }
}

pub trait EventSink {
    fn post(&mut self, message: &BridgeMessage);
}

/// Writes each message as one JSON document per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn post(&mut self, message: &BridgeMessage) {
        let result = serde_json::to_writer(&mut self.writer, message)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.writer))
            .and_then(|_| self.writer.flush());
        if let Err(err) = result {
            tracing::warn!(%err, "bridge write failed, dropping message");
        }
    }
}

/// Forwards messages to a channel; a hung-up receiver is ignored.
pub struct ChannelSink {
    tx: Sender<BridgeMessage>,
}

impl ChannelSink {
    pub fn new(tx: Sender<BridgeMessage>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn post(&mut self, message: &BridgeMessage) {
        if self.tx.send(message.clone()).is_err() {
            tracing::debug!("bridge receiver gone, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn entry(state: LogState, item: &str) -> LogEntry {
        LogEntry {
            state,
            item: item.to_string(),
            elapsed_time: 1.25,
        }
    }

    #[test]
    fn message_matches_host_envelope() {
        let msg = BridgeMessage::new(entry(LogState::Correct, "3"), 1.25, 2);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "NeuroExercises",
                "activity": "TMT",
                "dataNE": {
                    "log": { "state": "CORRECT", "item": "3", "positionInTime": 1.25 },
                    "time": 1.25,
                    "errors": 2
                }
            })
        );
    }

    #[test]
    fn log_state_displays_uppercase() {
        assert_eq!(LogState::Finished.to_string(), "FINISHED");
        assert_eq!(LogState::Wrong.to_string(), "WRONG");
    }

    #[test]
    fn json_lines_sink_writes_one_line_per_message() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.post(&BridgeMessage::new(entry(LogState::Correct, "1"), 0.5, 0));
        sink.post(&BridgeMessage::new(entry(LogState::Wrong, "B"), 0.9, 1));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"WRONG\""));
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink::new(tx);
        sink.post(&BridgeMessage::new(entry(LogState::Correct, "1"), 0.1, 0));
        assert_eq!(rx.recv().unwrap().data.log.item, "1");

        drop(rx);
        sink.post(&BridgeMessage::new(entry(LogState::Finished, "-"), 0.2, 0));
    }
}
