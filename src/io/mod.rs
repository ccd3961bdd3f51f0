// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - reading and writing OBJ and OFF meshes

mod exporter;
mod format;
mod importer;
mod obj;
mod off;

pub use exporter::{encode_mesh, write_mesh};
pub use format::{check_formats, MeshFormat, SyntaxError};
pub use importer::{parse_mesh, read_mesh};
pub use obj::{parse_obj, write_obj};
pub use off::{parse_off, write_off};
