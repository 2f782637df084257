use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use insim_state::packet::{Packet, Request};
use insim_state::tracker::{StateEvent, StateView};
use insim_state::{Clock, Connection, ErrorKind, TrackerConfig, Transport};

/// One line of a recorded session.
#[derive(Debug, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum LogEntry {
    /// The link came up.
    Ready {
        #[serde(default)]
        at_ms: u64,
    },
    /// The link went down.
    Lost {
        #[serde(default)]
        at_ms: u64,
    },
    Packet {
        #[serde(default)]
        at_ms: u64,
        packet: Packet,
    },
}

impl LogEntry {
    fn at_ms(&self) -> u64 {
        match self {
            LogEntry::Ready { at_ms } | LogEntry::Lost { at_ms } | LogEntry::Packet { at_ms, .. } => {
                *at_ms
            }
        }
    }
}

/// Clock driven by the timestamps in the log.
pub struct ReplayClock {
    start: Instant,
    offset: Duration,
}

impl ReplayClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Duration::ZERO,
        }
    }

    pub fn advance_to(&mut self, at_ms: u64) {
        let at = Duration::from_millis(at_ms);
        // Logs are written in arrival order; never run the clock backwards.
        if at > self.offset {
            self.offset = at;
        }
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> Instant {
        self.start + self.offset
    }
}

/// Collects the requests the tracker would have sent to the host.
#[derive(Default)]
pub struct CapturedRequests {
    pending: Vec<Request>,
    sent: usize,
}

impl CapturedRequests {
    /// Requests captured since the last call.
    pub fn take(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.pending)
    }

    /// Requests captured over the whole replay.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Transport for CapturedRequests {
    fn send(&mut self, request: &Request) -> Result<(), ErrorKind> {
        self.pending.push(request.clone());
        self.sent += 1;
        Ok(())
    }
}

pub fn parse_entry(line: &str) -> Result<LogEntry, ErrorKind> {
    Ok(serde_json::from_str(line)?)
}

/// Feed every entry of `input` through a fresh connection. Events and
/// outbound requests are written to `out` as JSON lines as they happen.
pub fn replay<R: BufRead>(
    input: R,
    config: TrackerConfig,
    out: &mut dyn Write,
    snapshot: bool,
) -> anyhow::Result<Connection<CapturedRequests, ReplayClock>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut connection =
        Connection::with_clock(CapturedRequests::default(), ReplayClock::new(), config);
    let sink = Rc::clone(&events);
    connection.subscribe(Box::new(move |_: &dyn StateView, event: &StateEvent| {
        sink.borrow_mut().push(event.clone());
    }));

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read packet log")?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_entry(&line).with_context(|| format!("line {}", index + 1))?;
        let at_ms = entry.at_ms();
        connection.clock_mut().advance_to(at_ms);

        match entry {
            LogEntry::Ready { .. } => connection.connected(),
            LogEntry::Lost { .. } => {
                if snapshot {
                    write_snapshot(&connection, out)?;
                }
                connection.disconnected();
            }
            LogEntry::Packet { packet, .. } => connection.handle_packet(&packet),
        }

        for event in events.borrow_mut().drain(..) {
            serde_json::to_writer(&mut *out, &serde_json::json!({ "at_ms": at_ms, "event": event }))?;
            writeln!(out)?;
        }
        for request in connection.transport_mut().take() {
            debug!(?request, "probe");
            serde_json::to_writer(&mut *out, &serde_json::json!({ "at_ms": at_ms, "sent": request }))?;
            writeln!(out)?;
        }
    }

    if snapshot {
        write_snapshot(&connection, out)?;
    }
    Ok(connection)
}

fn write_snapshot(
    connection: &Connection<CapturedRequests, ReplayClock>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if let Some(state) = connection.state() {
        serde_json::to_writer(&mut *out, &serde_json::json!({ "snapshot": state }))?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = r#"
{"entry":"ready","at_ms":0}
{"entry":"packet","at_ms":10,"packet":{"type":"new_connection","ucid":0,"fields":[["uname",""],["admin",true]]}}
{"entry":"packet","at_ms":20,"packet":{"type":"new_connection","ucid":3,"fields":[["uname","pit_crew"],["pname","^2Crew"]]}}
{"entry":"packet","at_ms":30,"packet":{"type":"new_player","plid":7,"ucid":3,"fields":[["cname","UF1"]]}}
{"entry":"packet","at_ms":40,"packet":{"type":"lap","plid":8,"fields":[["ltime",70000]]}}
{"entry":"packet","at_ms":50,"packet":{"type":"message","ucid":3,"plid":7,"text":"hi"}}
"#;

    fn output_lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn replays_a_recorded_session() {
        let mut out = Vec::new();
        let connection =
            replay(SESSION.as_bytes(), TrackerConfig::default(), &mut out, false).unwrap();

        let state = connection.state().unwrap();
        assert_eq!(state.player_by_ucid(insim_state::types::Ucid(3)).unwrap().cname(), "UF1");

        let lines = output_lines(&out);
        let names: Vec<&str> = lines
            .iter()
            .filter_map(|line| line["event"]["event"].as_str())
            .collect();
        assert_eq!(
            names,
            [
                "state-ready",
                "connection-new",
                "connection-new",
                "player-new",
                "desync-signal"
            ]
        );
        let sent: Vec<&str> = lines
            .iter()
            .filter_map(|line| line["sent"]["kind"].as_str())
            .collect();
        assert_eq!(sent, ["ISM", "NCN", "NPL", "SST"]);
        assert_eq!(connection.transport().sent(), 4);
    }

    #[test]
    fn snapshot_is_written_at_the_end() {
        let mut out = Vec::new();
        replay(SESSION.as_bytes(), TrackerConfig::default(), &mut out, true).unwrap();
        let lines = output_lines(&out);
        let last = lines.last().unwrap();
        assert!(last["snapshot"]["connections"].is_object());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let mut out = Vec::new();
        let err = replay(
            "{\"entry\":\"ready\"}\nnot json\n".as_bytes(),
            TrackerConfig::default(),
            &mut out,
            false,
        )
        .err()
        .expect("replay should fail");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = ReplayClock::new();
        clock.advance_to(500);
        let later = clock.now();
        clock.advance_to(100);
        assert_eq!(clock.now(), later);
    }
}
