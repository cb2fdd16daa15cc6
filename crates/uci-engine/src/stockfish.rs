//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::process::Stdio;
use std::time::Duration;

use puzzle_core::SearchBudget;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace period for `bestmove` after a `stop`
const STOP_GRACE: Duration = Duration::from_millis(500);

/// A single PV line from analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PvLine {
    /// Principal variation moves
    pub pv: Vec<String>,
    /// Centipawn score (side to move)
    pub cp: Option<i32>,
    /// Mate in N (positive = side to move mates)
    pub mate: Option<i32>,
}

/// Everything one `go` produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Lines indexed by multipv rank, best first
    pub lines: Vec<PvLine>,
    /// `None` when the engine reports `(none)`, i.e. no legal moves
    pub best_move: Option<String>,
}

/// Accumulates `info` lines until `bestmove` arrives
#[derive(Debug)]
struct SearchCollector {
    analysis: Analysis,
}

impl SearchCollector {
    fn new(multipv: u32) -> Self {
        Self {
            analysis: Analysis {
                lines: vec![PvLine::default(); multipv.max(1) as usize],
                best_move: None,
            },
        }
    }

    /// Feed one output line; returns true once the search is finished
    fn feed(&mut self, line: &str) -> bool {
        if line.starts_with("info") && line.contains(" score ") {
            let idx = parse_multipv_index(line).unwrap_or(1).saturating_sub(1) as usize;
            if let Some(entry) = self.analysis.lines.get_mut(idx) {
                if let Some(cp) = parse_cp(line) {
                    entry.cp = Some(cp);
                    entry.mate = None;
                }
                if let Some(mate) = parse_mate(line) {
                    entry.mate = Some(mate);
                    entry.cp = None;
                }
                let pv = parse_pv(line);
                if !pv.is_empty() {
                    entry.pv = pv;
                }
            }
            false
        } else if line.starts_with("bestmove") {
            self.analysis.best_move = line
                .split_whitespace()
                .nth(1)
                .filter(|mv| *mv != "(none)")
                .map(String::from);
            true
        } else {
            false
        }
    }

    fn finish(self) -> Analysis {
        self.analysis
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    search_timeout: Duration,
}

impl StockfishEngine {
    /// Spawn the engine process and run the UCI handshake
    pub async fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", config.path)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdout not captured".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            search_timeout: config.timeout(),
        };

        match timeout(HANDSHAKE_TIMEOUT, engine.handshake(config)).await {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::Timeout(HANDSHAKE_TIMEOUT.as_millis() as u64)),
        }

        Ok(engine)
    }

    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("setoption name Threads value {}", config.threads)).await?;
        self.send(&format!("setoption name Hash value {}", config.hash_mb)).await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Io(format!("write failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Io(format!("flush failed: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| EngineError::Io(format!("read failed: {e}")))?;
        if read == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = trimmed.as_str(), "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Search a position within the configured time bound.
    ///
    /// `multipv` above 1 is reset to 1 once the search completes.
    pub async fn analyse(
        &mut self,
        fen: &str,
        budget: SearchBudget,
        multipv: u32,
    ) -> Result<Analysis, EngineError> {
        let multipv = multipv.max(1);
        if multipv > 1 {
            self.send(&format!("setoption name MultiPV value {multipv}")).await?;
        }
        self.send(&format!("position fen {fen}")).await?;
        self.send(&go_command(budget)).await?;

        let mut collector = SearchCollector::new(multipv);
        let outcome = timeout(self.search_timeout, self.collect(&mut collector)).await;

        let result = match outcome {
            Ok(Ok(())) => Ok(collector.finish()),
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                let limit = self.search_timeout.as_millis() as u64;
                warn!(fen, limit_ms = limit, "Search timed out, stopping engine");
                self.send("stop").await?;
                // Drain up to `bestmove` so the next search starts clean
                let mut drain = SearchCollector::new(multipv);
                match timeout(STOP_GRACE, self.collect(&mut drain)).await {
                    Ok(Ok(())) => Err(EngineError::Timeout(limit)),
                    Ok(Err(e)) => return Err(e),
                    Err(_) => return Err(EngineError::Protocol("no bestmove after stop".into())),
                }
            }
        };

        if multipv > 1 {
            self.send("setoption name MultiPV value 1").await?;
        }
        result
    }

    async fn collect(&mut self, collector: &mut SearchCollector) -> Result<(), EngineError> {
        loop {
            let line = self.read_line().await?;
            if collector.feed(&line) {
                return Ok(());
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.process.start_kill();
    }
}

fn go_command(budget: SearchBudget) -> String {
    match budget {
        SearchBudget::Depth(depth) => format!("go depth {depth}"),
        SearchBudget::Nodes(nodes) => format!("go nodes {nodes}"),
    }
}

/// Value following `keyword` in an info line
fn parse_after<T: std::str::FromStr>(line: &str, keyword: &str) -> Option<T> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == keyword {
            return parts.next()?.parse().ok();
        }
    }
    None
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_after(line, "mate")
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    parse_after(line, "multipv")
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(String::from)
        .collect()
}
