//! BIP9 version bits deployment state tracking.
//!
//! Each [`Deployment`] moves through the [`ThresholdState`]s at window
//! boundaries: heights that are multiples of the miner confirmation window.
//! The state at a boundary depends on the state at the previous boundary, the
//! median time past of the block before the boundary, and the number of
//! blocks in the previous window that signaled for the deployment.
//!
//! Every block in a window has the state of the window's first block.
//!
//! [`Deployment`]: devault_chain::parameters::Deployment

use std::{
    collections::HashMap,
    fmt,
    sync::{PoisonError, RwLock},
};

use chrono::{DateTime, Utc};

use devault_chain::{
    block,
    chain_view::ChainView,
    parameters::{ChainParameters, DeploymentPos, VERSIONBITS_TOP_BITS},
};

use crate::error::ContextError;


/// The BIP9 state of a deployment, at a block height.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ThresholdState {
    /// The first state of every deployment. Also the state of every block
    /// before the first window boundary.
    Defined,

    /// Miners can signal for the deployment.
    Started,

    /// Enough blocks signaled in a window. The deployment activates at the
    /// next boundary.
    LockedIn,

    /// The deployment's rules apply. Final state.
    Active,

    /// The deployment timed out before it locked in. Final state.
    Failed,
}

impl ThresholdState {
    /// Returns `true` if this state never changes.
    pub fn is_final(&self) -> bool {
        matches!(self, ThresholdState::Active | ThresholdState::Failed)
    }

    /// Returns `true` if block templates should signal for a deployment in
    /// this state.
    pub fn should_signal(&self) -> bool {
        matches!(self, ThresholdState::Started | ThresholdState::LockedIn)
    }
}

impl fmt::Display for ThresholdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThresholdState::Defined => "defined",
            ThresholdState::Started => "started",
            ThresholdState::LockedIn => "locked_in",
            ThresholdState::Active => "active",
            ThresholdState::Failed => "failed",
        })
    }
}

/// Signaling progress in the window containing a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SignalingStatistics {
    /// The number of blocks in each window.
    pub period: u32,

    /// The number of signaling blocks needed to lock in.
    pub threshold: u32,

    /// The number of blocks in the window before the block.
    pub elapsed: u32,

    /// The number of those blocks that signaled.
    pub count: u32,

    /// `true` if the rest of the window can still reach the threshold.
    pub possible: bool,
}

/// Computes and caches BIP9 deployment states for one chain history.
///
/// States are cached by deployment and window boundary height. Cached states
/// are never invalidated, so a tracker must only be used with views of a
/// single chain, and with the parameters it was created with. Results never
/// depend on what is already cached.
///
/// Trackers can be shared between threads. Readers share the cache, and
/// writers only hold it long enough to insert a state.
#[derive(Debug)]
pub struct DeploymentTracker<'p> {
    /// The consensus parameters of the chain.
    params: &'p ChainParameters,

    /// Deployment states at window boundaries.
    cache: RwLock<HashMap<(DeploymentPos, block::Height), ThresholdState>>,
}

impl<'p> DeploymentTracker<'p> {
    /// Returns a new tracker with an empty cache.
    pub fn new(params: &'p ChainParameters) -> Self {
        DeploymentTracker {
            params,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the parameters this tracker uses.
    pub fn params(&self) -> &'p ChainParameters {
        self.params
    }

    /// Returns the state of `deployment` for the block at `height`.
    ///
    /// `view` must contain every header below the window boundary at or
    /// before `height`, back to genesis, unless those states are already
    /// cached.
    #[tracing::instrument(skip(self, view))]
    pub fn state<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        height: block::Height,
    ) -> Result<ThresholdState, ContextError>
    where
        V: ChainView + ?Sized,
    {
        self.state_at_boundary(view, deployment, self.window_start(height))
    }

    /// Returns `true` if `deployment` is active for the block at `height`.
    pub fn is_active<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        height: block::Height,
    ) -> Result<bool, ContextError>
    where
        V: ChainView + ?Sized,
    {
        Ok(self.state(view, deployment, height)? == ThresholdState::Active)
    }

    /// Returns the first height where `deployment` had the state it has for
    /// the block at `height`.
    ///
    /// Always a window boundary. Returns the genesis height for deployments
    /// that are still defined.
    pub fn state_since_height<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        height: block::Height,
    ) -> Result<block::Height, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let window = self.params.miner_confirmation_window();
        let mut since = self.window_start(height);
        let state = self.state_at_boundary(view, deployment, since)?;

        if state == ThresholdState::Defined {
            return Ok(block::Height::MIN);
        }

        while since.0 >= window {
            let previous = block::Height(since.0 - window);

            if self.state_at_boundary(view, deployment, previous)? != state {
                break;
            }

            since = previous;
        }

        Ok(since)
    }

    /// Returns the signaling progress for `deployment` in the window
    /// containing the block at `height`.
    ///
    /// Counts the blocks from the start of the window up to, but not
    /// including, `height`.
    pub fn statistics<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        height: block::Height,
    ) -> Result<SignalingStatistics, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let period = self.params.miner_confirmation_window();
        let threshold = self.params.rule_change_activation_threshold();
        let window_start = self.window_start(height);

        let elapsed = height.0 - window_start.0;
        let count = self.count_signaling(view, deployment, window_start, height)?;
        let possible = period - elapsed >= threshold.saturating_sub(count);

        Ok(SignalingStatistics {
            period,
            threshold,
            elapsed,
            count,
            possible,
        })
    }

    /// Returns the block version a miner should use for the block at
    /// `height`.
    ///
    /// Sets the version bits marker, and the bit of every deployment that is
    /// started or locked in.
    pub fn compute_block_version<V>(
        &self,
        view: &V,
        height: block::Height,
    ) -> Result<u32, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let mut version = VERSIONBITS_TOP_BITS;

        for (pos, deployment) in self.params.deployments() {
            if self.state(view, pos, height)?.should_signal() {
                version |= deployment.mask();
            }
        }

        Ok(version)
    }

    /// Returns the window boundary at or before `height`.
    fn window_start(&self, height: block::Height) -> block::Height {
        let window = self.params.miner_confirmation_window();
        block::Height(height.0 - height.0 % window)
    }

    /// Returns the state of `deployment` at the window `boundary`, computing
    /// and caching any missing states back to the last cached boundary.
    fn state_at_boundary<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        boundary: block::Height,
    ) -> Result<ThresholdState, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let window = self.params.miner_confirmation_window();

        // Walk back to a known state
        let mut uncached = Vec::new();
        let mut current = boundary;
        let mut state = loop {
            if current == block::Height::MIN {
                break ThresholdState::Defined;
            }

            if let Some(state) = self.cached(deployment, current) {
                break state;
            }

            uncached.push(current);
            current = block::Height(current.0 - window);
        };

        // Then compute forward, caching each new state
        for boundary in uncached.into_iter().rev() {
            let next = self.next_state(view, deployment, boundary, state)?;

            if next != state {
                tracing::debug!(
                    %deployment,
                    ?boundary,
                    from = %state,
                    to = %next,
                    "deployment state transition",
                );
            }

            self.cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((deployment, boundary), next);
            state = next;
        }

        Ok(state)
    }

    /// Returns the cached state of `deployment` at `boundary`, if any.
    fn cached(&self, deployment: DeploymentPos, boundary: block::Height) -> Option<ThresholdState> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(deployment, boundary))
            .copied()
    }

    /// Returns the state of `deployment` at `boundary`, given its `previous`
    /// state at the boundary before.
    fn next_state<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        boundary: block::Height,
        previous: ThresholdState,
    ) -> Result<ThresholdState, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let params = self.params.deployment(deployment);

        let next = match previous {
            ThresholdState::Defined => {
                let median_time_past = self.boundary_median_time_past(view, boundary)?;

                if median_time_past.timestamp() >= params.timeout {
                    ThresholdState::Failed
                } else if median_time_past.timestamp() >= params.start_time {
                    ThresholdState::Started
                } else {
                    ThresholdState::Defined
                }
            }
            ThresholdState::Started => {
                let median_time_past = self.boundary_median_time_past(view, boundary)?;

                if median_time_past.timestamp() >= params.timeout {
                    ThresholdState::Failed
                } else {
                    let window = self.params.miner_confirmation_window();
                    let window_start = block::Height(boundary.0 - window);
                    let count = self.count_signaling(view, deployment, window_start, boundary)?;

                    if count >= self.params.rule_change_activation_threshold() {
                        ThresholdState::LockedIn
                    } else {
                        ThresholdState::Started
                    }
                }
            }
            ThresholdState::LockedIn => ThresholdState::Active,
            ThresholdState::Active | ThresholdState::Failed => previous,
        };

        Ok(next)
    }

    /// Returns the median time past of the block before `boundary`.
    fn boundary_median_time_past<V>(
        &self,
        view: &V,
        boundary: block::Height,
    ) -> Result<DateTime<Utc>, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let last = block::Height(boundary.0 - 1);

        view.median_time_past(last)
            .ok_or(ContextError::MissingAncestor(last))
    }

    /// Returns the number of blocks in `start..end` that signal for
    /// `deployment`.
    fn count_signaling<V>(
        &self,
        view: &V,
        deployment: DeploymentPos,
        start: block::Height,
        end: block::Height,
    ) -> Result<u32, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let params = self.params.deployment(deployment);

        (start.0..end.0).map(block::Height).try_fold(0u32, |count, height| {
            let header = view
                .header(height)
                .ok_or(ContextError::MissingAncestor(height))?;

            Ok(count + u32::from(params.is_signaled_by(header.version)))
        })
    }
}
