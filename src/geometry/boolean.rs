// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean combination of spatial partitions

use super::partition::SpatialPartition;
use crate::budget::WorkBudget;
use crate::error::CsgResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl BooleanOp {
    /// Operation selected by a command-line flag letter (either case)
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag.to_ascii_uppercase() {
            'U' => Some(Self::Union),
            'D' => Some(Self::Difference),
            'I' => Some(Self::Intersection),
            _ => None,
        }
    }

    /// Membership of a cell given its membership in each operand
    pub fn apply(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Difference => in_a && !in_b,
            Self::Intersection => in_a && in_b,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Difference => "difference",
            Self::Intersection => "intersection",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Combine two partitions with default limits
pub fn combine(a: SpatialPartition, b: SpatialPartition, op: BooleanOp) -> CsgResult<SpatialPartition> {
    combine_with(a, b, op, &WorkBudget::unlimited())
}

/// Combine two partitions
///
/// Each tree clips the other's fragments; complementing a tree (flipping
/// every plane) turns "keep outside" into "keep inside". Coincident
/// fragments are routed by orientation, so a face shared by both operands
/// survives once and faces where the operands touch cancel out.
pub fn combine_with(
    a: SpatialPartition,
    b: SpatialPartition,
    op: BooleanOp,
    budget: &WorkBudget,
) -> CsgResult<SpatialPartition> {
    budget.check()?;
    let splitter = a.splitter();

    match (a.is_empty(), b.is_empty()) {
        (true, _) => {
            debug!(%op, "Left operand is empty");
            return Ok(match op {
                BooleanOp::Union => b,
                BooleanOp::Difference | BooleanOp::Intersection => SpatialPartition::empty(),
            });
        }
        (false, true) => {
            debug!(%op, "Right operand is empty");
            return Ok(match op {
                BooleanOp::Union | BooleanOp::Difference => a,
                BooleanOp::Intersection => SpatialPartition::empty(),
            });
        }
        (false, false) => {}
    }

    let separated = match (a.bounds(), b.bounds()) {
        (Some(ba), Some(bb)) => ba.is_separated_from(bb),
        _ => false,
    };
    if separated {
        debug!(%op, "Operand bounds are separated, skipping clipping");
        return Ok(match op {
            BooleanOp::Union => {
                let mut fragments = a.into_fragments();
                fragments.extend(b.into_fragments());
                SpatialPartition::from_fragments(fragments, splitter)
            }
            BooleanOp::Difference => a,
            BooleanOp::Intersection => SpatialPartition::empty(),
        });
    }

    let mut ta = a.into_tree(budget)?;
    let mut tb = b.into_tree(budget)?;

    match op {
        BooleanOp::Union => {
            ta.clip_to(&tb, budget)?;
            tb.clip_to(&ta, budget)?;
            tb.invert();
            tb.clip_to(&ta, budget)?;
            tb.invert();
            ta.build(tb.into_polygons(), splitter, budget)?;
        }
        BooleanOp::Difference => {
            ta.invert();
            ta.clip_to(&tb, budget)?;
            tb.clip_to(&ta, budget)?;
            tb.invert();
            tb.clip_to(&ta, budget)?;
            tb.invert();
            ta.build(tb.into_polygons(), splitter, budget)?;
            ta.invert();
        }
        BooleanOp::Intersection => {
            ta.invert();
            tb.clip_to(&ta, budget)?;
            tb.invert();
            ta.clip_to(&tb, budget)?;
            tb.clip_to(&ta, budget)?;
            ta.build(tb.into_polygons(), splitter, budget)?;
            ta.invert();
        }
    }

    let fragments = ta.into_polygons();
    debug!(%op, fragments = fragments.len(), "Combined partitions");
    Ok(SpatialPartition::from_fragments(fragments, splitter))
}
