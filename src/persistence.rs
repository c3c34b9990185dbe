//! Self-describing binary persistence container: a magic-tagged header, a
//! `trees` chunk, and an optional `mutations` chunk, each independently
//! checksummed and optionally byte-shuffled and DEFLATE-compressed.
//!
//! Framing realizes the abstract "typed named datasets with group-scoped
//! string attributes and per-chunk checksums" container as concrete
//! `bincode`-encoded structs (see the crate-level design notes).

use crate::error::{CoalseqError, Result};
use crate::ids::{Locus, NodeId, Time};
use crate::provenance::{parameters_json, Environment};
use crate::record::{CoalescenceRecord, Mutation};
use crate::record_store::RecordStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::{Read, Write};
use std::path::Path;

const MAGIC: &[u8; 8] = b"COALSEQ1";
const FORMAT_VERSION: [u32; 2] = [1, 0];
const SHUFFLE_ELEM_SIZE: usize = 8;

#[derive(Serialize, Deserialize)]
struct Header {
    format_version: [u32; 2],
    sample_size: u32,
    num_loci: u32,
}

#[derive(Serialize, Deserialize)]
struct TreesPayload {
    left: Vec<u32>,
    right: Vec<u32>,
    node: Vec<u32>,
    children: Vec<[u32; 2]>,
    time: Vec<f64>,
    environment: String,
    parameters: String,
}

#[derive(Serialize, Deserialize)]
struct MutationsPayload {
    node: Vec<u32>,
    position: Vec<f64>,
    environment: String,
    parameters: String,
}

#[derive(Serialize, Deserialize)]
struct Chunk {
    bytes: Vec<u8>,
    crc32: u32,
    shuffled: bool,
    compressed: bool,
}

impl Chunk {
    fn encode<T: Serialize>(payload: &T, compress: bool) -> Result<Self> {
        let raw = bincode::serialize(payload)
            .map_err(|e| CoalseqError::FileFormat(format!("encode failed: {e}")))?;
        let crc32 = crc32fast::hash(&raw);

        let bytes = if compress {
            shuffle(&raw, SHUFFLE_ELEM_SIZE)
        } else {
            raw
        };
        let bytes = if compress { deflate(&bytes)? } else { bytes };

        Ok(Chunk {
            bytes,
            crc32,
            shuffled: compress,
            compressed: compress,
        })
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        let mut bytes = self.bytes.clone();
        if self.compressed {
            bytes = inflate(&bytes)?;
        }
        if self.shuffled {
            bytes = unshuffle(&bytes, SHUFFLE_ELEM_SIZE);
        }
        if crc32fast::hash(&bytes) != self.crc32 {
            return Err(CoalseqError::FileFormat(
                "checksum mismatch on decode".into(),
            ));
        }
        bincode::deserialize(&bytes)
            .map_err(|e| CoalseqError::FileFormat(format!("decode failed: {e}")))
    }
}

/// Groups bytes by their position modulo `elem_size`, the way HDF5's
/// shuffle filter regroups same-significance bytes across fixed-width
/// array elements so DEFLATE sees longer runs. The tail that doesn't
/// divide evenly is left in place.
fn shuffle(buf: &[u8], elem_size: usize) -> Vec<u8> {
    let n = buf.len() / elem_size;
    let mut out = Vec::with_capacity(buf.len());
    for byte_pos in 0..elem_size {
        for i in 0..n {
            out.push(buf[i * elem_size + byte_pos]);
        }
    }
    out.extend_from_slice(&buf[n * elem_size..]);
    out
}

fn unshuffle(buf: &[u8], elem_size: usize) -> Vec<u8> {
    let tail_len = (buf.len()) % elem_size.max(1);
    let body_len = buf.len() - tail_len;
    let n = body_len / elem_size;
    let mut out = vec![0u8; body_len];
    for byte_pos in 0..elem_size {
        for i in 0..n {
            out[i * elem_size + byte_pos] = buf[byte_pos * n + i];
        }
    }
    out.extend_from_slice(&buf[body_len..]);
    out
}

fn deflate(buf: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(buf)?;
    enc.finish().map_err(CoalseqError::Io)
}

fn inflate(buf: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::DeflateDecoder;
    let mut dec = DeflateDecoder::new(buf);
    let mut out = Vec::new();
    dec.read_to_end(&mut out)?;
    Ok(out)
}

/// Writes `store` to `path` atomically: the file is built in a temporary
/// sibling, flushed, and renamed into place so a reader never observes a
/// partially written container.
pub fn dump(store: &RecordStore, path: impl AsRef<Path>, compress: bool) -> Result<()> {
    let path = path.as_ref();
    let environment = Environment::current().to_json_string();
    let parameters = parameters_json(
        "dump",
        json!({
            "sample_size": store.get_sample_size(),
            "num_loci": store.get_num_loci(),
        }),
    );

    let n = store.get_num_records();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut node = Vec::with_capacity(n);
    let mut children = Vec::with_capacity(n);
    let mut time = Vec::with_capacity(n);
    for i in 0..n {
        let r = store.get_record(i, crate::record::RecordOrder::Time)?;
        left.push(r.left.0);
        right.push(r.right.0);
        node.push(r.node.0);
        children.push([r.children[0].0, r.children[1].0]);
        time.push(r.time.0);
    }

    let trees_payload = TreesPayload {
        left,
        right,
        node,
        children,
        time,
        environment: environment.clone(),
        parameters,
    };
    let trees_chunk = Chunk::encode(&trees_payload, compress)?;

    let mutations_chunk = if store.get_num_mutations() > 0 {
        let muts = store.mutations();
        let mutations_parameters = match store.mutation_provenance() {
            Some((seed, rate)) => {
                parameters_json("generate_mutations", json!({ "seed": seed, "rate": rate }))
            }
            None => parameters_json("generate_mutations", json!({})),
        };
        let mutations_payload = MutationsPayload {
            node: muts.iter().map(|m| m.node.0).collect(),
            position: muts.iter().map(|m| m.position).collect(),
            environment,
            parameters: mutations_parameters,
        };
        Some(Chunk::encode(&mutations_payload, compress)?)
    } else {
        None
    };

    let header = Header {
        format_version: FORMAT_VERSION,
        sample_size: store.get_sample_size(),
        num_loci: store.get_num_loci(),
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(d) => tempfile::NamedTempFile::new_in(d)?,
        None => tempfile::NamedTempFile::new()?,
    };
    {
        let w = tmp.as_file_mut();
        w.write_all(MAGIC)?;
        bincode::serialize_into(&mut *w, &header)
            .map_err(|e| CoalseqError::FileFormat(format!("header encode failed: {e}")))?;
        bincode::serialize_into(&mut *w, &trees_chunk)
            .map_err(|e| CoalseqError::FileFormat(format!("trees encode failed: {e}")))?;
        w.write_all(&[mutations_chunk.is_some() as u8])?;
        if let Some(mc) = &mutations_chunk {
            bincode::serialize_into(&mut *w, mc)
                .map_err(|e| CoalseqError::FileFormat(format!("mutations encode failed: {e}")))?;
        }
        w.sync_all()?;
    }
    tmp.persist(path).map_err(|e| CoalseqError::Io(e.error))?;
    log::debug!("dumped tree sequence to {}", path.display());
    Ok(())
}

/// Loads a record store from `path`, rejecting a major-version mismatch
/// and revalidating column shapes and invariants as it rebuilds the two
/// sort-order permutations.
pub fn load(path: impl AsRef<Path>) -> Result<RecordStore> {
    let path = path.as_ref();
    let mut f = std::fs::File::open(path)?;

    let mut magic = [0u8; 8];
    f.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(CoalseqError::FileFormat("bad magic bytes".into()));
    }

    let header: Header = bincode::deserialize_from(&mut f)
        .map_err(|e| CoalseqError::FileFormat(format!("header decode failed: {e}")))?;
    if header.format_version[0] != FORMAT_VERSION[0] {
        return Err(CoalseqError::UnsupportedFileVersion(format!(
            "file major version {} unsupported by reader major version {}",
            header.format_version[0], FORMAT_VERSION[0]
        )));
    }

    let trees_chunk: Chunk = bincode::deserialize_from(&mut f)
        .map_err(|e| CoalseqError::FileFormat(format!("trees chunk decode failed: {e}")))?;
    let trees: TreesPayload = trees_chunk.decode()?;
    let n = trees.left.len();
    if trees.right.len() != n
        || trees.node.len() != n
        || trees.children.len() != n
        || trees.time.len() != n
    {
        return Err(CoalseqError::FileFormat(
            "trees column length mismatch".into(),
        ));
    }

    let mut mutations_present = [0u8; 1];
    f.read_exact(&mut mutations_present)?;
    let mutations = if mutations_present[0] == 1 {
        let mc: Chunk = bincode::deserialize_from(&mut f)
            .map_err(|e| CoalseqError::FileFormat(format!("mutations chunk decode failed: {e}")))?;
        let payload: MutationsPayload = mc.decode()?;
        if payload.node.len() != payload.position.len() {
            return Err(CoalseqError::FileFormat(
                "mutations column length mismatch".into(),
            ));
        }
        Some(payload)
    } else {
        None
    };

    let records: Vec<CoalescenceRecord> = (0..n)
        .map(|i| CoalescenceRecord {
            left: Locus(trees.left[i]),
            right: Locus(trees.right[i]),
            node: NodeId(trees.node[i]),
            children: [NodeId(trees.children[i][0]), NodeId(trees.children[i][1])],
            time: Time(trees.time[i]),
        })
        .collect();

    let mut store = RecordStore::new(records, header.sample_size, header.num_loci)?;
    if let Some(payload) = mutations {
        let muts: Vec<Mutation> = payload
            .node
            .into_iter()
            .zip(payload.position)
            .map(|(node, position)| Mutation { position, node: NodeId(node) })
            .collect();
        store.set_mutations(muts)?;
    }
    log::debug!("loaded tree sequence from {}", path.display());
    Ok(store)
}
