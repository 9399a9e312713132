use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use viewfinder_image::{Image, ImageSize};
use viewfinder_imgproc::{
    interpolation::InterpolationMode,
    quad::Quadrilateral2D,
    rectify::{rectify_quadrilateral, CropStrictness, RectifyOptions},
    warp::{get_perspective_transform, warp_perspective},
};

fn bench_warp_perspective(c: &mut Criterion) {
    let mut group = c.benchmark_group("WarpPerspective");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size: ImageSize = [*width, *height].into();
        let image = Image::<f32, 4>::from_size_val(image_size, 1.0).unwrap();
        let output = Image::<f32, 4>::from_size_val(image_size, 0.0).unwrap();

        let (w, h) = (*width as f64, *height as f64);
        let src = [
            [0.1 * w, 0.2 * h],
            [0.9 * w, 0.1 * h],
            [0.8 * w, 0.9 * h],
            [0.2 * w, 0.7 * h],
        ];
        let dst = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];
        let m = get_perspective_transform(&src, &dst).unwrap();

        group.bench_with_input(
            BenchmarkId::new("par_rows", &parameter_string),
            &(&image, &output, m),
            |b, i| {
                let (src, mut dst, m) = (i.0.clone(), i.1.clone(), i.2);
                b.iter(|| {
                    warp_perspective(
                        black_box(&src),
                        black_box(&mut dst),
                        black_box(&m),
                        black_box(InterpolationMode::Bilinear),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_rectify(c: &mut Criterion) {
    let mut group = c.benchmark_group("RectifyQuadrilateral");

    let image_size = ImageSize {
        width: 1920,
        height: 1080,
    };
    let image = Image::<u8, 4>::from_size_val(image_size, 255).unwrap();
    let target = ImageSize {
        width: 1920,
        height: 1080,
    };

    let inside = Quadrilateral2D {
        top_left: [694.0, 224.0],
        top_right: [1098.0, 185.0],
        bottom_left: [686.0, 317.0],
        bottom_right: [1119.0, 409.0],
    };
    let outside = Quadrilateral2D {
        top_left: [-100.0, -100.0],
        top_right: [2000.0, -185.0],
        bottom_left: [-233.0, 1200.0],
        bottom_right: [2200.0, 1670.0],
    };

    for (name, quad, strictness) in [
        ("inside_strict", inside, CropStrictness::Strict),
        ("extended_loose", outside, CropStrictness::Loose),
    ] {
        group.bench_with_input(BenchmarkId::new(name, "1920x1080"), &quad, |b, quad| {
            b.iter(|| {
                rectify_quadrilateral(
                    black_box(&image),
                    black_box(quad),
                    black_box(strictness),
                    black_box(target),
                    black_box(&RectifyOptions::default()),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_warp_perspective, bench_rectify);
criterion_main!(benches);
