use beam_profile_core::{evaluate, DetectorGeometry, IntensityGrid};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point2;

fn gaussian_grid(pixels: usize, sigma: f64) -> IntensityGrid {
    let c = (pixels / 2) as f64;
    let data = (0..pixels * pixels)
        .map(|i| {
            let dx = (i % pixels) as f64 - c;
            let dy = (i / pixels) as f64 - c;
            (-0.5 * (dx * dx + dy * dy) / (sigma * sigma)).exp()
        })
        .collect();
    IntensityGrid {
        width: pixels,
        height: pixels,
        data,
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for pixels in [101usize, 1001] {
        let geometry = DetectorGeometry {
            x_half_width: 5.0,
            y_half_width: 5.0,
            x_pixels: pixels,
            y_pixels: pixels,
        };
        let grid = gaussian_grid(pixels, pixels as f64 / 20.0);
        let centroid = Point2::new(0.0, 0.0);
        group.bench_function(format!("{pixels}x{pixels}"), |b| {
            b.iter(|| evaluate(black_box(&geometry), &grid.view(), black_box(&centroid)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
