// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polycsg::geometry::{build_partition, triangulate};
use polycsg::io::{parse_obj, write_obj};
use polycsg::{combine_meshes, combine_meshes_with, validate, BooleanOp, CsgConfig, Primitive};

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for segments in [16u32, 64] {
        let mesh = Primitive::cylinder(10.0, 5.0, segments).to_mesh();
        group.bench_with_input(BenchmarkId::new("cylinder", segments), &mesh, |b, mesh| {
            b.iter(|| validate(black_box(mesh)));
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    let cube = Primitive::cuboid([0, 0, 0], [10, 10, 10]).to_mesh();
    group.bench_function("cube", |b| {
        b.iter(|| build_partition(black_box(&cube)).unwrap());
    });

    let cylinder = Primitive::cylinder(10.0, 5.0, 32).to_mesh();
    group.bench_function("cylinder_32", |b| {
        b.iter(|| build_partition(black_box(&cylinder)).unwrap());
    });

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");

    let cube1 = Primitive::cuboid([0, 0, 0], [10, 10, 10]).to_mesh();
    let cube2 = Primitive::cuboid([5, 5, 5], [15, 15, 15]).to_mesh();

    for op in [BooleanOp::Union, BooleanOp::Difference, BooleanOp::Intersection] {
        group.bench_with_input(BenchmarkId::new("cubes", op), &op, |b, &op| {
            b.iter(|| combine_meshes(op, black_box(&cube1), black_box(&cube2)).unwrap());
        });
    }

    let octahedron = Primitive::octahedron([10, 10, 10], 6).to_mesh();
    let sequential = CsgConfig::default().sequential();
    group.bench_function("cube_minus_octahedron_sequential", |b| {
        b.iter(|| {
            combine_meshes_with(BooleanOp::Difference, black_box(&cube1), black_box(&octahedron), &sequential).unwrap()
        });
    });

    group.finish();
}

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("io");

    let mesh = triangulate(&Primitive::cylinder(10.0, 5.0, 64).to_mesh()).unwrap();
    let mut buffer = Vec::new();
    write_obj(&mesh, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    group.bench_function("parse_obj", |b| {
        b.iter(|| parse_obj(black_box(&text)).unwrap());
    });
    group.bench_function("write_obj", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(text.len());
            write_obj(black_box(&mesh), &mut out).unwrap();
            out
        });
    });

    group.finish();
}

criterion_group!(benches, bench_validate, bench_partition, bench_boolean_ops, bench_io);
criterion_main!(benches);
