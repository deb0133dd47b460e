//! Parallel tree construction.
//!
//! Construction runs in two phases on a worker pool that lives for exactly
//! one call:
//!
//! 1. **Leaves**: one hashing job per input element, placed by slot, then the
//!    leaf level is padded according to the [`PaddingPolicy`].
//! 2. **Reduction**: while more than one node remains, even out the level,
//!    hash each adjacent pair into the left slot, wait for the whole level,
//!    then compact the surviving slots to the front of the array.
//!
//! Pairing is order-sensitive, so compaction keeps the left-to-right order of
//! every subtree.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{MerkleTree, Node, NodeId};
use crate::config::{PaddingPolicy, TreeConfig};
use crate::error::{HashingError, MerkleError, Result};
use crate::hash::{HashAlgorithm, HasherPool, Keccak256Algorithm};
use crate::worker::{WorkerJob, WorkerPool};

/// Build a Merkle tree over `data` with Keccak256 and the default settings.
///
/// Fails with [`MerkleError::EmptyInput`] when `data` is empty and with
/// [`MerkleError::Hashing`] when any hashing job fails.
///
/// Blocks the calling thread; call it from `spawn_blocking` when inside an
/// async runtime.
///
/// ```
/// let tree = fastmerkle::generate_merkle_tree(&["Lazar", "Vuksan"]).unwrap();
/// assert_eq!(
///     alloy_primitives::hex::encode(tree.root_hash()),
///     "2997f58b4810eb8d4e779f69e51ab80dc85d1a962a5036d02b21f485e1557c35"
/// );
/// ```
pub fn generate_merkle_tree<D: AsRef<[u8]>>(data: &[D]) -> Result<MerkleTree> {
    TreeBuilder::default().build(data)
}

/// Reusable tree constructor.
///
/// Holds the hash-state pool, which is shared by every construction this
/// builder runs, and the settings for the per-call worker pool. A builder can
/// be shared between threads and used for concurrent constructions.
#[derive(Debug)]
pub struct TreeBuilder<A: HashAlgorithm = Keccak256Algorithm> {
    hashers: Arc<HasherPool<A>>,
    config: TreeConfig,
}

impl Default for TreeBuilder<Keccak256Algorithm> {
    fn default() -> Self {
        Self::new(Keccak256Algorithm::new())
    }
}

impl<A: HashAlgorithm> TreeBuilder<A> {
    /// Create a builder using `algorithm` and the default settings
    pub fn new(algorithm: A) -> Self {
        Self::with_config(algorithm, TreeConfig::default())
    }

    /// Create a builder using `algorithm` and `config`
    pub fn with_config(algorithm: A, config: TreeConfig) -> Self {
        Self {
            hashers: Arc::new(HasherPool::with_capacity(algorithm, config.workers())),
            config,
        }
    }

    /// The construction settings
    #[inline]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The shared hash-state pool
    #[inline]
    pub fn hashers(&self) -> &HasherPool<A> {
        &self.hashers
    }

    /// Build a Merkle tree over `data`.
    ///
    /// Either returns a complete tree or an error; no partial tree is ever
    /// produced. The worker pool is torn down before this returns.
    pub fn build<D: AsRef<[u8]>>(&self, data: &[D]) -> Result<MerkleTree> {
        if data.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let padding = self.config.padding();
        debug!(
            inputs = data.len(),
            workers = self.config.workers(),
            queue_capacity = self.config.queue_capacity(),
            ?padding,
            "generating merkle tree"
        );

        let mut workers = WorkerPool::start(
            Arc::clone(&self.hashers),
            self.config.workers(),
            self.config.queue_capacity(),
        )
        .map_err(MerkleError::WorkerSpawn)?;

        let leaf_width = padded_leaf_width(data.len(), padding);
        let mut nodes = Vec::with_capacity(2 * leaf_width + usize::BITS as usize);

        let mut level = build_leaves(&mut workers, &mut nodes, data, padding)?;
        let height = reduce_levels(&mut workers, &mut nodes, &mut level)?;
        drop(workers);

        let tree = MerkleTree::from_parts(nodes, level[0], data.len(), leaf_width, height);
        debug!(height, nodes = tree.node_count(), "merkle tree generated");
        Ok(tree)
    }
}

/// Width of the leaf level once padding has been applied.
const fn padded_leaf_width(inputs: usize, padding: PaddingPolicy) -> usize {
    match padding {
        PaddingPolicy::DuplicateLastPerLevel => inputs + (inputs & 1),
        PaddingPolicy::NextPowerOfTwo => inputs.next_power_of_two(),
    }
}

/// Hash every input element into a leaf and pad the leaf level.
fn build_leaves<D: AsRef<[u8]>>(
    workers: &mut WorkerPool,
    nodes: &mut Vec<Node>,
    data: &[D],
    padding: PaddingPolicy,
) -> std::result::Result<Vec<NodeId>, HashingError> {
    let mut hashes = vec![Bytes::new(); data.len()];
    workers.run_batch(
        data.iter()
            .enumerate()
            .map(|(slot, item)| WorkerJob::leaf(slot, Bytes::copy_from_slice(item.as_ref()))),
        |slot, hash| hashes[slot] = hash,
    )?;

    let mut level = Vec::with_capacity(padded_leaf_width(data.len(), padding));
    for hash in hashes {
        level.push(push_node(nodes, Node::leaf(hash)));
    }

    match padding {
        PaddingPolicy::DuplicateLastPerLevel => {
            duplicate_last_if_odd(nodes, &mut level);
        }
        PaddingPolicy::NextPowerOfTwo => {
            // Every extra slot copies the last original leaf
            let last = level[level.len() - 1];
            let target = level.len().next_power_of_two();
            while level.len() < target {
                let copy = Node::duplicate(&nodes[last.0], last);
                level.push(push_node(nodes, copy));
            }
        }
    }

    trace!(width = level.len(), inputs = data.len(), "leaf level built");
    Ok(level)
}

/// Reduce `level` to a single root, returning the number of levels reduced.
fn reduce_levels(
    workers: &mut WorkerPool,
    nodes: &mut Vec<Node>,
    level: &mut Vec<NodeId>,
) -> std::result::Result<usize, HashingError> {
    let mut height = 0;

    while level.len() > 1 {
        let duplicated = duplicate_last_if_odd(nodes, level);
        let width = level.len();
        trace!(height, width, duplicated, "reducing level");

        let jobs: Vec<WorkerJob> = level
            .chunks_exact(2)
            .enumerate()
            .map(|(pair, ids)| {
                WorkerJob::pair(
                    pair * 2,
                    nodes[ids[0].0].hash.clone(),
                    nodes[ids[1].0].hash.clone(),
                )
            })
            .collect();

        // Returns once all width / 2 parents exist
        workers.run_batch(jobs, |slot, hash| {
            let (left, right) = (level[slot], level[slot + 1]);
            let parent = push_node(nodes, Node::internal(hash, left, right));
            nodes[left.0].parent = Some(parent);
            nodes[right.0].parent = Some(parent);
            level[slot] = parent;
        })?;

        compact(level);
        height += 1;
    }

    Ok(height)
}

/// Append a copy of the last node when `level` has an odd length.
fn duplicate_last_if_odd(nodes: &mut Vec<Node>, level: &mut Vec<NodeId>) -> bool {
    if level.len().is_multiple_of(2) {
        return false;
    }
    let last = level[level.len() - 1];
    let copy = Node::duplicate(&nodes[last.0], last);
    level.push(push_node(nodes, copy));
    true
}

/// Move the parents stored in even slots to the front, preserving order,
/// and drop the second half.
fn compact(level: &mut Vec<NodeId>) {
    let half = level.len() / 2;
    for i in 0..half {
        level[i] = level[2 * i];
    }
    level.truncate(half);
}

fn push_node(nodes: &mut Vec<Node>, node: Node) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(node);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_compact_preserves_order() {
        let mut level = ids(&[10, 1, 11, 3, 12, 5, 13, 7]);
        compact(&mut level);
        assert_eq!(level, ids(&[10, 11, 12, 13]));

        let mut level = ids(&[4, 9]);
        compact(&mut level);
        assert_eq!(level, ids(&[4]));
    }

    #[test]
    fn test_duplicate_last_if_odd() {
        let mut nodes = vec![
            Node::leaf(Bytes::from_static(b"a")),
            Node::leaf(Bytes::from_static(b"b")),
            Node::leaf(Bytes::from_static(b"c")),
        ];
        let mut level = ids(&[0, 1, 2]);

        assert!(duplicate_last_if_odd(&mut nodes, &mut level));
        assert_eq!(level, ids(&[0, 1, 2, 3]));
        assert_eq!(nodes[3].hash(), nodes[2].hash());
        assert_eq!(nodes[3].duplicate_of(), Some(NodeId(2)));
        assert!(nodes[3].parent().is_none());

        assert!(!duplicate_last_if_odd(&mut nodes, &mut level));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn test_padded_leaf_width() {
        use PaddingPolicy::*;

        assert_eq!(padded_leaf_width(1, DuplicateLastPerLevel), 2);
        assert_eq!(padded_leaf_width(6, DuplicateLastPerLevel), 6);
        assert_eq!(padded_leaf_width(7, DuplicateLastPerLevel), 8);
        assert_eq!(padded_leaf_width(1, NextPowerOfTwo), 1);
        assert_eq!(padded_leaf_width(5, NextPowerOfTwo), 8);
        assert_eq!(padded_leaf_width(1025, NextPowerOfTwo), 2048);
    }
}
