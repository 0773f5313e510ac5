//! Snapshot format and file lifecycle for `AutocompleteIndex`.
//!
//! Layout: `TSUG` magic, version byte, CRC32 of the body (LE), then a
//! bincode body holding the frequency table and the trie flattened in
//! pre-order. Every node record names its parent's position, which always
//! precedes it, so both directions run without recursion.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::AutocompleteIndex;
use crate::frequency::FrequencyTable;
use crate::trie::{NodeId, TrieNode, TrieStore, ROOT};

const MAGIC: &[u8; 4] = b"TSUG";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 4 + 1 + 4; // magic + version + crc32

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected TSUG)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

impl PersistError {
    /// Damaged file contents, as opposed to an environment failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PersistError::InvalidHeader
                | PersistError::InvalidMagic
                | PersistError::UnsupportedVersion(_)
                | PersistError::ChecksumMismatch
                | PersistError::Deserialize(_)
                | PersistError::Corrupt(_)
        )
    }
}

/// What to do when a snapshot exists but cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Start from an empty index and report what was lost.
    #[default]
    Lenient,
    /// Return the error and leave the current index untouched.
    Strict,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { phrases: usize },
    /// No file at the path.
    Missing,
    /// Zero-length file.
    Empty,
    /// The file was unreadable or corrupt; the index is now empty.
    Recovered(PersistError),
}

#[derive(Serialize, Deserialize)]
struct SnapshotData {
    frequencies: Vec<FrequencyRecord>,
    nodes: Vec<NodeRecord>,
}

#[derive(Serialize, Deserialize)]
struct FrequencyRecord {
    phrase: String,
    frequency: u64,
}

#[derive(Serialize, Deserialize)]
struct NodeRecord {
    /// Position of the parent record; ignored for the root.
    parent: u32,
    edge: char,
    terminal: bool,
    frequency: u64,
    indexed_key: Option<String>,
    canonical_phrase: Option<String>,
}

impl AutocompleteIndex {
    /// Serialize to bytes (TSUG format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        let body = bincode::serialize(&self.to_data()).map_err(PersistError::Serialize)?;
        let crc = crc32fast::hash(&body);

        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Deserialize from bytes (TSUG format).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < 5 {
            return Err(PersistError::InvalidHeader);
        }
        if &bytes[..4] != MAGIC {
            return Err(PersistError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(PersistError::UnsupportedVersion(bytes[4]));
        }
        if bytes.len() < HEADER_SIZE {
            return Err(PersistError::InvalidHeader);
        }

        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[5..HEADER_SIZE]);
        let body = &bytes[HEADER_SIZE..];
        if crc32fast::hash(body) != u32::from_le_bytes(crc) {
            return Err(PersistError::ChecksumMismatch);
        }

        let data: SnapshotData = bincode::deserialize(body).map_err(PersistError::Deserialize)?;
        Self::from_data(data)
    }

    /// Atomic write: write to `<path>.tmp` then rename.
    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        let bytes = self.to_bytes()?;
        let tmp = tmp_path(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(&bytes)?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!(path = %path.display(), bytes = bytes.len(), "saved index snapshot");
        Ok(())
    }

    /// Replace the contents of this index with the snapshot at `path`.
    ///
    /// A missing or zero-length file leaves an empty index. Anything else
    /// that goes wrong is handled according to `policy`.
    pub fn load_from(
        &mut self,
        path: &Path,
        policy: LoadPolicy,
    ) -> Result<LoadOutcome, PersistError> {
        let loaded = match fs::read(path) {
            Ok(bytes) if bytes.is_empty() => {
                info!(path = %path.display(), "index snapshot is empty");
                self.clear();
                return Ok(LoadOutcome::Empty);
            }
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no index snapshot found");
                self.clear();
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => Err(PersistError::Io(e)),
        };

        match loaded {
            Ok(index) => {
                self.trie = index.trie;
                self.frequencies = index.frequencies;
                self.cache.invalidate();
                let phrases = self.frequencies.len();
                info!(path = %path.display(), phrases, "loaded index snapshot");
                Ok(LoadOutcome::Loaded { phrases })
            }
            Err(e) if policy == LoadPolicy::Lenient => {
                warn!(path = %path.display(), error = %e, "discarding unusable index snapshot");
                self.clear();
                Ok(LoadOutcome::Recovered(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Open from file, starting empty when there is nothing usable (under
    /// `LoadPolicy::Lenient`).
    pub fn open(path: &Path, policy: LoadPolicy) -> Result<(Self, LoadOutcome), PersistError> {
        let mut index = Self::new();
        let outcome = index.load_from(path, policy)?;
        Ok((index, outcome))
    }

    fn to_data(&self) -> SnapshotData {
        let mut frequencies: Vec<FrequencyRecord> = self
            .frequencies
            .iter()
            .map(|(phrase, frequency)| FrequencyRecord {
                phrase: phrase.to_string(),
                frequency,
            })
            .collect();
        frequencies.sort_by(|a, b| a.phrase.cmp(&b.phrase));

        let trie = &self.trie;
        let mut nodes = Vec::with_capacity(trie.node_count());
        // (node, parent position, edge)
        let mut stack: Vec<(NodeId, u32, char)> = vec![(ROOT, 0, '\0')];
        while let Some((id, parent, edge)) = stack.pop() {
            let position = nodes.len() as u32;
            let node = trie.node(id);
            nodes.push(NodeRecord {
                parent,
                edge,
                terminal: node.is_terminal(),
                frequency: node.frequency(),
                indexed_key: node.indexed_key().map(str::to_string),
                canonical_phrase: node.canonical_phrase().map(str::to_string),
            });
            stack.extend(node.children().rev().map(|(c, child)| (child, position, c)));
        }

        SnapshotData { frequencies, nodes }
    }

    fn from_data(data: SnapshotData) -> Result<Self, PersistError> {
        if data.nodes.is_empty() {
            return Err(PersistError::Corrupt("no root node".into()));
        }

        let mut nodes: Vec<TrieNode> = Vec::with_capacity(data.nodes.len());
        for (position, rec) in data.nodes.into_iter().enumerate() {
            if rec.terminal != rec.canonical_phrase.is_some() {
                return Err(PersistError::Corrupt(format!(
                    "node {position}: terminal flag disagrees with canonical phrase"
                )));
            }
            if position > 0 {
                let parent = rec.parent as usize;
                if parent >= position {
                    return Err(PersistError::Corrupt(format!(
                        "node {position}: parent {parent} does not precede it"
                    )));
                }
                let edges = &mut nodes[parent].children;
                if edges.insert(rec.edge, position as NodeId).is_some() {
                    return Err(PersistError::Corrupt(format!(
                        "node {parent}: duplicate edge {:?}",
                        rec.edge
                    )));
                }
            }
            nodes.push(TrieNode {
                children: Default::default(),
                frequency: rec.frequency,
                indexed_key: rec.indexed_key,
                canonical_phrase: rec.canonical_phrase,
            });
        }

        let frequencies: FrequencyTable = data
            .frequencies
            .into_iter()
            .map(|r| (r.phrase, r.frequency))
            .collect();

        Ok(Self::from_parts(TrieStore::from_nodes(nodes), frequencies))
    }
}

/// Sibling of `path` with `.tmp` appended, never `path` itself.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
