//! Cooperative round-robin scheduler
//!
//! Runs every block on the calling thread, one `work()` call per block per
//! pass, in the order the blocks were added. Blocks never wait for data or
//! capacity, so a pass always returns; the scheduler keeps making passes
//! until the graph reaches a fixed point.
//!
//! ## Stop conditions
//!
//! 1. **Idle**: a whole pass moved no elements, or every block reports
//!    `should_stop()`.
//! 2. **Pass limit**: `with_max_passes()` was set and reached. Needed for
//!    graphs with a looping source, which never go idle on their own.
//! 3. **Fatal error**: the first `WorkError` ends the run immediately and is
//!    returned tagged with the failing block's name.

use super::errors::FatalError;
use super::node::ProcessNode;
use tracing::{debug, error, info, trace};

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Idle,
    PassLimit,
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Number of passes over the block list
    pub passes: usize,
    /// Elements moved, summed over all blocks and passes
    pub items: usize,
    pub reason: StopReason,
}

/// Single-threaded driver for a set of blocks
pub struct Scheduler {
    nodes: Vec<Box<dyn ProcessNode>>,
    max_passes: Option<usize>,
}

impl Scheduler {
    /// Create an empty scheduler with no pass limit
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            max_passes: None,
        }
    }

    /// Stop after at most `passes` passes
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Add a block. Blocks run in insertion order within a pass.
    pub fn add_process<N: ProcessNode + 'static>(&mut self, node: N) {
        debug!("Adding process node: {}", node.name());
        self.nodes.push(Box::new(node));
    }

    /// Run one pass: call `work()` once on every block that has not stopped.
    /// Returns the number of elements moved.
    pub fn step(&mut self) -> Result<usize, FatalError> {
        let mut moved = 0;
        for node in &mut self.nodes {
            if node.should_stop() {
                continue;
            }
            match node.work() {
                Ok(n) => {
                    trace!("[{}] moved {} items", node.name(), n);
                    moved += n;
                }
                Err(e) => {
                    error!("[{}] Work error: {}", node.name(), e);
                    return Err(FatalError::new(node.name(), e));
                }
            }
        }
        Ok(moved)
    }

    /// Make passes until the blocks go idle or the pass limit is hit
    pub fn run(&mut self) -> Result<RunStats, FatalError> {
        info!("Running {} nodes", self.nodes.len());

        let mut passes = 0;
        let mut items = 0;
        let reason = loop {
            if self.max_passes.is_some_and(|max| passes >= max) {
                break StopReason::PassLimit;
            }
            if self.nodes.iter().all(|node| node.should_stop()) {
                break StopReason::Idle;
            }

            let moved = self.step()?;
            passes += 1;
            items += moved;
            if moved == 0 {
                break StopReason::Idle;
            }
        };

        info!(
            "Run finished after {} passes ({:?}). Moved {} items.",
            passes, reason, items
        );
        Ok(RunStats {
            passes,
            items,
            reason,
        })
    }

    /// Get the number of blocks
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the names of all blocks in run order
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.name().to_string()).collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
