// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-request combination pipeline
//!
//! Each stage is its own type and every transition consumes the previous
//! stage, so a request moves strictly forward:
//!
//! `Unvalidated -> Validated -> Partitioned -> Combined -> Extracted -> Triangulated`
//!
//! A failing transition returns the error instead of the next stage.

use crate::budget::{CancelToken, WorkBudget};
use crate::config::CsgConfig;
use crate::error::{CsgError, CsgResult};
use crate::geometry::{
    build_partitions, combine_with, extract_boundary_with, triangulate, validate, BooleanOp, Mesh,
    SpatialPartition,
};
use crate::tracing_ext::{log_mesh_stats, OperationTimer};
use std::time::Duration;
use tracing::{error, info};

/// Input mesh with the name used in diagnostics
#[derive(Debug, Clone)]
pub struct Operand {
    pub label: String,
    pub mesh: Mesh,
}

impl Operand {
    pub fn new(label: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            label: label.into(),
            mesh,
        }
    }

    pub fn left(mesh: Mesh) -> Self {
        Self::new("left operand", mesh)
    }

    pub fn right(mesh: Mesh) -> Self {
        Self::new("right operand", mesh)
    }
}

/// Name of a pipeline stage
pub trait Stage {
    const NAME: &'static str;
}

pub struct Unvalidated {
    left: Operand,
    right: Operand,
}

pub struct Validated {
    left: Operand,
    right: Operand,
}

pub struct Partitioned {
    left: SpatialPartition,
    right: SpatialPartition,
}

pub struct Combined {
    result: SpatialPartition,
}

pub struct Extracted {
    mesh: Mesh,
}

pub struct Triangulated {
    mesh: Mesh,
}

impl Stage for Unvalidated {
    const NAME: &'static str = "unvalidated";
}
impl Stage for Validated {
    const NAME: &'static str = "validated";
}
impl Stage for Partitioned {
    const NAME: &'static str = "partitioned";
}
impl Stage for Combined {
    const NAME: &'static str = "combined";
}
impl Stage for Extracted {
    const NAME: &'static str = "extracted";
}
impl Stage for Triangulated {
    const NAME: &'static str = "triangulated";
}

/// Duration of one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: &'static str,
    pub elapsed: Duration,
}

/// Finished request
#[derive(Debug, Clone)]
pub struct CombineOutcome {
    pub op: BooleanOp,
    /// Triangulated closed result; empty when the solids do not overlap as required
    pub mesh: Mesh,
    pub timings: Vec<StageTiming>,
    pub fragments_created: usize,
}

impl CombineOutcome {
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|t| t.elapsed).sum()
    }
}

/// Request-wide settings carried from stage to stage
struct Context {
    op: BooleanOp,
    config: CsgConfig,
    cancel: CancelToken,
    budget: WorkBudget,
    timings: Vec<StageTiming>,
}

impl Context {
    fn record<T: Stage>(mut self, timer: OperationTimer, state: T) -> Pipeline<T> {
        self.timings.push(StageTiming {
            stage: T::NAME,
            elapsed: timer.elapsed(),
        });
        Pipeline { ctx: self, state }
    }
}

pub struct Pipeline<S> {
    ctx: Context,
    state: S,
}

impl<S: Stage> Pipeline<S> {
    pub fn stage(&self) -> &'static str {
        S::NAME
    }

    pub fn op(&self) -> BooleanOp {
        self.ctx.op
    }

    pub fn timings(&self) -> &[StageTiming] {
        &self.ctx.timings
    }
}

impl Pipeline<Unvalidated> {
    pub fn new(op: BooleanOp, left: Operand, right: Operand) -> Self {
        let config = CsgConfig::default();
        let cancel = CancelToken::new();
        Self {
            ctx: Context {
                op,
                budget: WorkBudget::new(cancel.clone(), config.max_fragments),
                config,
                cancel,
                timings: Vec::new(),
            },
            state: Unvalidated { left, right },
        }
    }

    pub fn with_config(mut self, config: CsgConfig) -> Self {
        self.ctx.budget = WorkBudget::new(self.ctx.cancel.clone(), config.max_fragments);
        self.ctx.config = config;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.ctx.budget = WorkBudget::new(cancel.clone(), self.ctx.config.max_fragments);
        self.ctx.cancel = cancel;
        self
    }

    /// Reject operands that are not closed 2-manifolds
    pub fn validate(self) -> CsgResult<Pipeline<Validated>> {
        let timer = OperationTimer::new("validate");
        let Pipeline { ctx, state } = self;
        ctx.budget.check()?;

        for operand in [&state.left, &state.right] {
            let report = validate(&operand.mesh);
            if !report.is_manifold() {
                error!(operand = %operand.label, "{report}");
                return Err(CsgError::not_manifold(operand.label.clone(), report));
            }
            log_mesh_stats(&operand.mesh, &operand.label);
        }

        let Unvalidated { left, right } = state;
        Ok(ctx.record(timer, Validated { left, right }))
    }

    /// Run every stage
    pub fn run(self) -> CsgResult<CombineOutcome> {
        info!(op = %self.ctx.op, "Starting combination");
        self.validate()?
            .partition()?
            .combine()?
            .extract()?
            .triangulate()?
            .finish()
    }
}

impl Pipeline<Validated> {
    /// Build both partitions
    pub fn partition(self) -> CsgResult<Pipeline<Partitioned>> {
        let timer = OperationTimer::new("partition");
        let Pipeline { ctx, state } = self;
        let (left, right) = build_partitions(&state.left.mesh, &state.right.mesh, &ctx.config, &ctx.budget)?;
        Ok(ctx.record(timer, Partitioned { left, right }))
    }
}

impl Pipeline<Partitioned> {
    pub fn combine(self) -> CsgResult<Pipeline<Combined>> {
        let timer = OperationTimer::new("combine");
        let Pipeline { ctx, state } = self;
        let result = combine_with(state.left, state.right, ctx.op, &ctx.budget)?;
        Ok(ctx.record(timer, Combined { result }))
    }
}

impl Pipeline<Combined> {
    /// Turn the result into a validated polygon mesh
    pub fn extract(self) -> CsgResult<Pipeline<Extracted>> {
        let timer = OperationTimer::new("extract");
        let Pipeline { ctx, state } = self;
        let mesh = extract_boundary_with(&state.result, &ctx.config)?;
        Ok(ctx.record(timer, Extracted { mesh }))
    }

    /// Result partition, e.g. for point queries
    pub fn partition(&self) -> &SpatialPartition {
        &self.state.result
    }
}

impl Pipeline<Extracted> {
    pub fn triangulate(self) -> CsgResult<Pipeline<Triangulated>> {
        let timer = OperationTimer::new("triangulate");
        let Pipeline { ctx, state } = self;
        let mesh = triangulate(&state.mesh)?;
        Ok(ctx.record(timer, Triangulated { mesh }))
    }

    pub fn mesh(&self) -> &Mesh {
        &self.state.mesh
    }
}

impl Pipeline<Triangulated> {
    /// Check the output invariant and hand back the result
    pub fn finish(self) -> CsgResult<CombineOutcome> {
        let Pipeline { ctx, state } = self;
        let report = validate(&state.mesh);
        if !report.is_manifold() {
            return Err(CsgError::DegenerateCombination {
                reason: format!("triangulated result: {}", report.violation().unwrap_or("invalid")),
            });
        }

        info!(
            op = %ctx.op,
            vertices = state.mesh.vertex_count(),
            triangles = state.mesh.face_count(),
            fragments = ctx.budget.fragments_created(),
            "Combination finished"
        );
        Ok(CombineOutcome {
            op: ctx.op,
            mesh: state.mesh,
            fragments_created: ctx.budget.fragments_created(),
            timings: ctx.timings,
        })
    }
}

/// Combine two meshes with default settings
pub fn combine_meshes(op: BooleanOp, left: &Mesh, right: &Mesh) -> CsgResult<Mesh> {
    combine_meshes_with(op, left, right, &CsgConfig::default())
}

pub fn combine_meshes_with(op: BooleanOp, left: &Mesh, right: &Mesh, config: &CsgConfig) -> CsgResult<Mesh> {
    Pipeline::new(op, Operand::left(left.clone()), Operand::right(right.clone()))
        .with_config(config.clone())
        .run()
        .map(|outcome| outcome.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::scalar;
    use crate::geometry::{is_manifold, Location, Point, Primitive};

    #[test]
    fn test_stages_advance_in_order() {
        let pipeline = Pipeline::new(
            BooleanOp::Union,
            Operand::left(Primitive::cuboid([0, 0, 0], [2, 2, 2]).to_mesh()),
            Operand::right(Primitive::cuboid([1, 1, 1], [3, 3, 3]).to_mesh()),
        );
        assert_eq!(pipeline.stage(), "unvalidated");

        let combined = pipeline.validate().unwrap().partition().unwrap().combine().unwrap();
        assert_eq!(combined.stage(), "combined");
        assert_eq!(
            combined.partition().classify(&Point::from_integers(1, 1, 1)),
            Location::Inside
        );

        let extracted = combined.extract().unwrap();
        assert!(is_manifold(extracted.mesh()));
        let outcome = extracted.triangulate().unwrap().finish().unwrap();
        assert_eq!(outcome.timings.len(), 5);
        assert_eq!(outcome.mesh.signed_volume(), scalar(15));
        assert!(outcome.mesh.is_triangulated());
    }

    #[test]
    fn test_open_operand_rejected_before_partitioning() {
        let pipeline = Pipeline::new(
            BooleanOp::Difference,
            Operand::left(Primitive::unit_cube().to_mesh()),
            Operand::new("lid.obj", Primitive::open_box().to_mesh()),
        );
        match pipeline.validate() {
            Err(CsgError::NotManifold { operand, report }) => {
                assert_eq!(operand, "lid.obj");
                assert_eq!(report.boundary_edges, 4);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("open box accepted"),
        }
    }

    #[test]
    fn test_cancelled_request() {
        let token = CancelToken::new();
        token.cancel();
        let result = Pipeline::new(
            BooleanOp::Union,
            Operand::left(Primitive::unit_cube().to_mesh()),
            Operand::right(Primitive::regular_tetrahedron().to_mesh()),
        )
        .with_cancel_token(token)
        .run();
        assert!(matches!(result, Err(CsgError::Cancelled)));
    }

    #[test]
    fn test_fragment_limit() {
        let config = CsgConfig {
            max_fragments: Some(4),
            ..Default::default()
        };
        let result = combine_meshes_with(
            BooleanOp::Union,
            &Primitive::unit_cube().to_mesh(),
            &Primitive::cuboid([0, 0, 0], [2, 2, 2]).to_mesh(),
            &config,
        );
        assert!(matches!(result, Err(CsgError::ResourceLimit { limit: 4 })));
    }
}
