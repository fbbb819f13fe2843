//! Configuration for topology repair.
//!
//! All parameters have defaults matching the reference behaviour of the
//! repair pass; presets and `with_*` builders adjust them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RepairError, RepairResult};

/// How a boundary loop is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillStrategy {
    /// Triangle fan from the loop's first vertex.
    ///
    /// Convexity is not checked: concave or strongly non-planar loops can
    /// receive a self-intersecting cover.
    #[default]
    Fan,
    /// Ear clipping in the loop's best-fit plane, falling back to a fan for
    /// whatever remains when no ear is found.
    EarClipping,
    /// A single polygon face spanning the whole loop.
    Polygon,
}

impl FillStrategy {
    /// Human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::EarClipping => "ear-clipping",
            Self::Polygon => "polygon",
        }
    }
}

/// How the closest cross-component vertex pair is searched.
///
/// Both searches select the same pair; they differ only in cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PairSearch {
    /// Every vertex pair is measured. O(V²).
    BruteForce,
    /// Vertices are sorted along X and pairs further apart in X than the
    /// best distance so far are skipped.
    #[default]
    SweepAndPrune,
}

/// Parameters for hole filling.
///
/// # Example
///
/// ```
/// use mesh_mend::{FillStrategy, HoleFillParams};
///
/// let params = HoleFillParams::default()
///     .with_strategy(FillStrategy::EarClipping)
///     .with_max_hole_edges(64);
/// assert_eq!(params.max_hole_edges, Some(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HoleFillParams {
    /// Cover construction.
    ///
    /// Default: [`FillStrategy::Fan`]
    pub strategy: FillStrategy,

    /// Loops with more edges than this are reported and left open.
    ///
    /// Default: `None` (no limit)
    pub max_hole_edges: Option<usize>,
}

impl HoleFillParams {
    /// Set the cover construction.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: FillStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Limit the size of holes that get filled.
    #[must_use]
    pub const fn with_max_hole_edges(mut self, max_edges: usize) -> Self {
        self.max_hole_edges = Some(max_edges);
        self
    }
}

/// Parameters for connectivity repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeParams {
    /// Nearest-pair search.
    ///
    /// Default: [`PairSearch::SweepAndPrune`]
    pub search: PairSearch,
}

/// Parameters for a full topology repair pass.
///
/// # Example
///
/// ```
/// use mesh_mend::{PairSearch, TopologyRepairParams};
///
/// // Defaults: fill holes and bridge components
/// let params = TopologyRepairParams::default();
/// assert!(params.fill_holes && params.bridge_components);
///
/// // Check only
/// let params = TopologyRepairParams::analysis_only();
/// assert!(!params.fill_holes && !params.bridge_components);
///
/// // Reference search
/// let params = TopologyRepairParams::default().with_pair_search(PairSearch::BruteForce);
/// assert_eq!(params.bridge.search, PairSearch::BruteForce);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopologyRepairParams {
    /// Whether open boundaries are filled.
    ///
    /// Default: `true`
    pub fill_holes: bool,

    /// Whether a bridging edge is inserted when the mesh has several components.
    ///
    /// Default: `true`
    pub bridge_components: bool,

    /// Hole filling parameters.
    pub hole_fill: HoleFillParams,

    /// Connectivity repair parameters.
    pub bridge: BridgeParams,
}

impl Default for TopologyRepairParams {
    fn default() -> Self {
        Self {
            fill_holes: true,
            bridge_components: true,
            hole_fill: HoleFillParams::default(),
            bridge: BridgeParams::default(),
        }
    }
}

impl TopologyRepairParams {
    /// Fan covers and exhaustive pair search.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            hole_fill: HoleFillParams {
                strategy: FillStrategy::Fan,
                max_hole_edges: None,
            },
            bridge: BridgeParams {
                search: PairSearch::BruteForce,
            },
            ..Self::default()
        }
    }

    /// Run the checks and report, without mutating the mesh.
    #[must_use]
    pub fn analysis_only() -> Self {
        Self {
            fill_holes: false,
            bridge_components: false,
            ..Self::default()
        }
    }

    /// Enable or disable hole filling.
    #[must_use]
    pub const fn with_fill_holes(mut self, enabled: bool) -> Self {
        self.fill_holes = enabled;
        self
    }

    /// Enable or disable component bridging.
    #[must_use]
    pub const fn with_bridge_components(mut self, enabled: bool) -> Self {
        self.bridge_components = enabled;
        self
    }

    /// Set the hole cover construction.
    #[must_use]
    pub const fn with_fill_strategy(mut self, strategy: FillStrategy) -> Self {
        self.hole_fill.strategy = strategy;
        self
    }

    /// Limit the size of holes that get filled.
    #[must_use]
    pub const fn with_max_hole_edges(mut self, max_edges: usize) -> Self {
        self.hole_fill.max_hole_edges = Some(max_edges);
        self
    }

    /// Set the nearest-pair search.
    #[must_use]
    pub const fn with_pair_search(mut self, search: PairSearch) -> Self {
        self.bridge.search = search;
        self
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::InvalidParams`] if `max_hole_edges` is below 3,
    /// which no loop can satisfy.
    pub fn validate(&self) -> RepairResult<()> {
        match self.hole_fill.max_hole_edges {
            Some(limit) if limit < 3 => Err(RepairError::InvalidParams {
                reason: format!("max_hole_edges must be at least 3, got {limit}"),
            }),
            _ => Ok(()),
        }
    }
}
