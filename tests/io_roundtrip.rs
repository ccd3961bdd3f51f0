// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File-to-file combination through OBJ and OFF

use polycsg::geometry::exact::scalar;
use polycsg::io::{parse_obj, parse_off, write_obj, write_off};
use polycsg::{
    combine_files, is_manifold, read_mesh, write_mesh, BooleanOp, CancelToken, CsgConfig, CsgError, MeshFormat,
    Primitive,
};
use std::fs;

#[test]
fn test_union_of_obj_and_off_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let left = dir.path().join("left.obj");
    let right = dir.path().join("right.OFF");
    let output = dir.path().join("union.off");
    write_mesh(&Primitive::cuboid([0, 0, 0], [2, 2, 2]).to_mesh(), &left)?;
    write_mesh(&Primitive::cuboid([1, 1, 1], [3, 3, 3]).to_mesh(), &right)?;

    let report = combine_files(BooleanOp::Union, &left, &right, &output, &CsgConfig::default(), CancelToken::new())?;
    assert_eq!(report.written.as_deref(), Some(output.as_path()));

    let written = read_mesh(&output)?;
    assert!(is_manifold(&written));
    assert!(written.is_triangulated());
    assert_eq!(written.signed_volume(), scalar(15));
    assert_eq!(written, report.outcome.mesh);
    Ok(())
}

#[test]
fn test_empty_result_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let left = dir.path().join("a.obj");
    let right = dir.path().join("b.obj");
    let output = dir.path().join("out.obj");
    write_mesh(&Primitive::unit_cube().to_mesh(), &left)?;
    write_mesh(&Primitive::cuboid([5, 5, 5], [6, 6, 6]).to_mesh(), &right)?;

    let report = combine_files(
        BooleanOp::Intersection,
        &left,
        &right,
        &output,
        &CsgConfig::default().sequential(),
        CancelToken::new(),
    )?;
    assert!(report.outcome.is_empty());
    assert!(report.written.is_none());
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_non_manifold_file_names_the_path() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let left = dir.path().join("cube.obj");
    let right = dir.path().join("lid.off");
    let output = dir.path().join("out.obj");
    write_mesh(&Primitive::unit_cube().to_mesh(), &left)?;
    write_mesh(&Primitive::open_box().to_mesh(), &right)?;

    let err = combine_files(BooleanOp::Difference, &left, &right, &output, &CsgConfig::default(), CancelToken::new())
        .unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, CsgError::NotManifold { .. }));
    assert!(message.contains("lid.off is not a 2-manifold polyhedron!"), "{message}");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_formats_checked_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let result = combine_files(
        BooleanOp::Union,
        &dir.path().join("missing.obj"),
        &dir.path().join("missing.txt"),
        &dir.path().join("out.obj"),
        &CsgConfig::default(),
        CancelToken::new(),
    );
    assert!(matches!(result, Err(CsgError::UnsupportedFormat { .. })));
}

#[test]
fn test_missing_input_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let result = combine_files(
        BooleanOp::Union,
        &dir.path().join("missing.obj"),
        &dir.path().join("missing.off"),
        &dir.path().join("out.obj"),
        &CsgConfig::default(),
        CancelToken::new(),
    );
    assert!(matches!(result, Err(CsgError::InputUnreadable { .. })));
}

#[test]
fn test_malformed_file_reports_line() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.obj");
    fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n")?;

    match read_mesh(&path) {
        Err(CsgError::Parse { format, line, path: reported, .. }) => {
            assert_eq!(format, MeshFormat::Obj);
            assert_eq!(line, 4);
            assert_eq!(reported, path);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_text_round_trip_between_formats() {
    let mesh = Primitive::octahedron([1, -2, 3], 2).to_mesh();

    let mut obj = Vec::new();
    write_obj(&mesh, &mut obj).unwrap();
    let from_obj = parse_obj(std::str::from_utf8(&obj).unwrap()).unwrap();

    let mut off = Vec::new();
    write_off(&from_obj, &mut off).unwrap();
    let from_off = parse_off(std::str::from_utf8(&off).unwrap()).unwrap();

    assert_eq!(from_off, mesh);
}

#[test]
fn test_decimal_coordinates_survive_combination() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let left = dir.path().join("half.obj");
    let right = dir.path().join("cube.obj");
    let output = dir.path().join("out.obj");
    // cube [0, 0.5]^3
    let half: String = Primitive::unit_cube()
        .to_mesh()
        .positions_f64()
        .iter()
        .map(|p| format!("v {} {} {}\n", p.x * 0.5, p.y * 0.5, p.z * 0.5))
        .collect();
    let faces = "f 1 3 4 2\nf 5 6 8 7\nf 1 2 6 5\nf 3 7 8 4\nf 1 5 7 3\nf 2 4 8 6\n";
    fs::write(&left, format!("{half}{faces}"))?;
    write_mesh(&Primitive::unit_cube().to_mesh(), &right)?;

    let report = combine_files(BooleanOp::Difference, &right, &left, &output, &CsgConfig::default(), CancelToken::new())?;
    assert_eq!(report.outcome.mesh.signed_volume(), scalar(7) / scalar(8));
    assert!(fs::read_to_string(&output)?.contains("v 0.5 "));
    Ok(())
}
