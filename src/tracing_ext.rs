// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tracing helpers for pipeline stages
//!
//! Set `RUST_LOG=polycsg=debug` for per-stage counts.

use crate::geometry::Mesh;
use std::time::{Duration, Instant};
use tracing::span::EnteredSpan;
use tracing::{debug, info};

/// Enters a `csg_stage` span and logs the stage duration when dropped
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    _span: EnteredSpan,
}

impl OperationTimer {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("csg_stage", stage = name).entered();
        debug!(target: "polycsg::timing", stage = name, "Starting stage");
        Self {
            name,
            start: Instant::now(),
            _span: span,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "polycsg::timing",
            stage = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Stage completed"
        );
    }
}

/// Log mesh counts at debug level
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    match mesh.bounding_box() {
        Some(bbox) => {
            let size = bbox.size();
            debug!(
                context,
                vertices = mesh.vertex_count(),
                faces = mesh.face_count(),
                size_x = size.x,
                size_y = size.y,
                size_z = size.z,
                "Mesh stats"
            );
        }
        None => debug!(context, "Mesh is empty"),
    }
}
