// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exit status and output of the command-line tools

use polycsg::geometry::exact::scalar;
use polycsg::{read_mesh, write_mesh, Primitive};
use std::process::Command;

fn csg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_csg"))
}

fn check_manifold() -> Command {
    Command::new(env!("CARGO_BIN_EXE_check-manifold"))
}

#[test]
fn test_csg_union_writes_result() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (a, b, out) = (dir.path().join("a.obj"), dir.path().join("b.obj"), dir.path().join("out.obj"));
    write_mesh(&Primitive::unit_cube().to_mesh(), &a)?;
    write_mesh(&Primitive::cuboid([1, 0, 0], [2, 1, 1]).to_mesh(), &b)?;

    let output = csg().arg("-u").arg(&a).arg(&b).arg(&out).output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("write result to obj file:"), "{stdout}");
    assert_eq!(read_mesh(&out)?.signed_volume(), scalar(2));
    Ok(())
}

#[test]
fn test_csg_requires_operation_and_three_paths() {
    let output = csg().args(["a.obj", "b.obj", "c.obj"]).output().unwrap();
    assert!(!output.status.success());

    let output = csg().args(["-D", "a.obj", "b.obj"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_csg_rejects_open_operand() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (a, b, out) = (dir.path().join("a.off"), dir.path().join("lid.off"), dir.path().join("out.off"));
    write_mesh(&Primitive::unit_cube().to_mesh(), &a)?;
    write_mesh(&Primitive::open_box().to_mesh(), &b)?;

    let output = csg().arg("-D").arg(&a).arg(&b).arg(&out).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a 2-manifold polyhedron!"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn test_check_manifold_verdicts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let closed = dir.path().join("cube.obj");
    let open = dir.path().join("open.obj");
    write_mesh(&Primitive::unit_cube().to_mesh(), &closed)?;
    write_mesh(&Primitive::open_box().to_mesh(), &open)?;

    let output = check_manifold().arg(&closed).output()?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is a 2-manifold polyhedron!"));

    // a negative verdict is still a successful run
    let output = check_manifold().arg(&open).output()?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is not a 2-manifold polyhedron!"));

    let output = check_manifold().arg(&open).args(["--format", "json"]).output()?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["manifold"], false);
    assert_eq!(value["report"]["boundary_edges"], 4);
    Ok(())
}

#[test]
fn test_check_manifold_unsupported_extension_fails() {
    let output = check_manifold().arg("mesh.stl").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
