//! Exported strategy tables.
//!
//! A `StrategyTable` maps information-set keys to the average strategy and
//! visit count learned for them. It can be written and read in three
//! formats:
//!
//! ```text
//! text     # comment lines
//!          InfoSet: P2:[P0:P][P1:P]AKs Pot:1.40 Visits: 812
//!          Strategy: 0.0123 0.9877
//!
//! binary   "STRAT" | version u32 | count u32
//!          per entry: key_len u32 | key | visits u64 | len u32 | f64 * len
//!          (little-endian)
//!
//! json     serde representation of the table
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::storage::RegretTable;
use crate::error::{Result, SolverError};

/// Leading bytes of a binary strategy file.
pub const BINARY_MAGIC: &[u8; 5] = b"STRAT";

/// Binary format version.
pub const BINARY_VERSION: u32 = 1;

const MAX_KEY_LEN: u32 = 1 << 16;
const MAX_ACTIONS: u32 = 1 << 10;

/// Learned policy for one information set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    /// Times the information set was visited during training.
    pub visits: u64,
    /// Probability of each action.
    pub probabilities: Vec<f64>,
}

/// Visit statistics over a table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableStats {
    /// Number of entries.
    pub entries: usize,
    /// Sum of visits.
    pub total_visits: u64,
    /// Largest visit count.
    pub max_visits: u64,
    /// Smallest visit count.
    pub min_visits: u64,
    /// Mean visits per entry.
    pub average_visits: f64,
}

/// Information-set key to learned policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    entries: FxHashMap<String, StrategyEntry>,
}

impl StrategyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Average strategies and visit counts of every node.
    pub fn from_regret_table(table: &RegretTable) -> Self {
        let entries = table
            .iter()
            .map(|(key, node)| {
                (
                    key.clone(),
                    StrategyEntry {
                        visits: node.visit_count(),
                        probabilities: node.average_strategy(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: String, entry: StrategyEntry) {
        self.entries.insert(key, entry);
    }

    /// Entry for `key`.
    pub fn get(&self, key: &str) -> Option<&StrategyEntry> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StrategyEntry)> {
        self.entries.iter()
    }

    /// Entries from most to least visited, ties by key.
    pub fn sorted_by_visits(&self) -> Vec<(&String, &StrategyEntry)> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.1.visits.cmp(&a.1.visits).then_with(|| a.0.cmp(b.0)));
        sorted
    }

    /// Entries whose key contains `pattern`, sorted by key.
    pub fn find(&self, pattern: &str) -> Vec<(&String, &StrategyEntry)> {
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found
    }

    /// Visit statistics.
    pub fn stats(&self) -> TableStats {
        if self.entries.is_empty() {
            return TableStats::default();
        }
        let visits = self.entries.values().map(|e| e.visits);
        let total_visits: u64 = visits.clone().sum();
        TableStats {
            entries: self.entries.len(),
            total_visits,
            max_visits: visits.clone().max().unwrap_or(0),
            min_visits: visits.min().unwrap_or(0),
            average_visits: total_visits as f64 / self.entries.len() as f64,
        }
    }

    /// Write text records, most visited first.
    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "# All-or-Fold strategy table")?;
        writeln!(writer, "# entries: {}", self.entries.len())?;
        for (key, entry) in self.sorted_by_visits() {
            writeln!(writer, "InfoSet: {} Visits: {}", key, entry.visits)?;
            let probs: Vec<String> = entry.probabilities.iter().map(|p| p.to_string()).collect();
            writeln!(writer, "Strategy: {}", probs.join(" "))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read text records.
    ///
    /// Blank and `#` lines are ignored. A malformed record is skipped with a
    /// warning; only I/O failures are errors.
    pub fn read_text<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut pending: Option<(String, u64)> = None;

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("InfoSet: ") {
                if let Some((key, _)) = pending.take() {
                    log::warn!("line {}: info set {} has no strategy", number + 1, key);
                }
                pending = parse_header(rest);
                if pending.is_none() {
                    log::warn!("line {}: malformed info set record", number + 1);
                }
            } else if let Some(rest) = line.strip_prefix("Strategy: ") {
                let Some((key, visits)) = pending.take() else {
                    log::warn!("line {}: strategy without info set", number + 1);
                    continue;
                };
                match parse_probabilities(rest) {
                    Some(probabilities) => table.insert(
                        key,
                        StrategyEntry {
                            visits,
                            probabilities,
                        },
                    ),
                    None => log::warn!("line {}: malformed strategy for {}", number + 1, key),
                }
            } else {
                log::warn!("line {}: unrecognised record", number + 1);
            }
        }

        if let Some((key, _)) = pending {
            log::warn!("info set {} has no strategy", key);
        }
        Ok(table)
    }

    /// Write the binary format.
    pub fn write_binary<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(BINARY_MAGIC)?;
        writer.write_u32::<LittleEndian>(BINARY_VERSION)?;
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;

        for (key, entry) in self.sorted_by_visits() {
            writer.write_u32::<LittleEndian>(key.len() as u32)?;
            writer.write_all(key.as_bytes())?;
            writer.write_u64::<LittleEndian>(entry.visits)?;
            writer.write_u32::<LittleEndian>(entry.probabilities.len() as u32)?;
            for &p in &entry.probabilities {
                writer.write_f64::<LittleEndian>(p)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Read the binary format.
    pub fn read_binary<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 5];
        reader.read_exact(&mut magic)?;
        if &magic != BINARY_MAGIC {
            return Err(SolverError::Format("not a strategy file".into()));
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version != BINARY_VERSION {
            return Err(SolverError::Format(format!(
                "unsupported strategy file version {}",
                version
            )));
        }

        let count = reader.read_u32::<LittleEndian>()?;
        let mut table = Self::new();
        for _ in 0..count {
            let key_len = reader.read_u32::<LittleEndian>()?;
            if key_len > MAX_KEY_LEN {
                return Err(SolverError::Format(format!("key length {}", key_len)));
            }
            let mut key = vec![0u8; key_len as usize];
            reader.read_exact(&mut key)?;
            let key = String::from_utf8(key)
                .map_err(|e| SolverError::Format(format!("key is not utf-8: {}", e)))?;

            let visits = reader.read_u64::<LittleEndian>()?;
            let len = reader.read_u32::<LittleEndian>()?;
            if len > MAX_ACTIONS {
                return Err(SolverError::Format(format!("strategy length {}", len)));
            }
            let mut probabilities = Vec::with_capacity(len as usize);
            for _ in 0..len {
                probabilities.push(reader.read_f64::<LittleEndian>()?);
            }

            table.insert(
                key,
                StrategyEntry {
                    visits,
                    probabilities,
                },
            );
        }
        Ok(table)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write text records to `path`.
    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_text(BufWriter::new(File::create(path)?))
    }

    /// Read text records from `path`.
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_text(BufReader::new(File::open(path)?))
    }

    /// Write the binary format to `path`.
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_binary(BufWriter::new(File::create(path)?))
    }

    /// Read the binary format from `path`.
    pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_binary(BufReader::new(File::open(path)?))
    }
}

/// `<key> Visits: <n>`; keys may contain spaces.
fn parse_header(rest: &str) -> Option<(String, u64)> {
    let split = rest.rfind(" Visits: ")?;
    let key = rest[..split].trim();
    let visits = rest[split + " Visits: ".len()..].trim().parse().ok()?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), visits))
}

fn parse_probabilities(rest: &str) -> Option<Vec<f64>> {
    let probabilities: Vec<f64> = rest
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if probabilities.is_empty() {
        None
    } else {
        Some(probabilities)
    }
}
