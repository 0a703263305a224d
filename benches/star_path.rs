// benches/star_path.rs

use camino::Utf8Path;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skypath::search::SearchParams;
use skypath::skypath::SkyPath;
use skypath::target::CelestialTarget;

fn prepare() -> SkyPath {
    SkyPath::de406().unwrap_or_else(|_| SkyPath::keplerian()).with_catalog_file(
        Utf8Path::new("tests/data/hip_main_sample.dat"),
        Some(Utf8Path::new("tests/data/hip_names.csv")),
    )
}

/// Rising/setting star, circumpolar star and a planet.
fn bench_star_path(c: &mut Criterion) {
    let sky = prepare();
    let cases = [
        ("vega_beijing", CelestialTarget::Catalog(91262), 39.9, 116.4, "Asia/Shanghai"),
        ("polaris_london", CelestialTarget::Catalog(11767), 51.5, -0.1, "Europe/London"),
        ("mars_paris", CelestialTarget::Planet("mars".into()), 48.85, 2.35, "Europe/Paris"),
    ];

    let mut group = c.benchmark_group("compute_star_path");
    for (label, target, lat, lng, tz) in &cases {
        group.bench_function(*label, |b| {
            b.iter(|| {
                sky.compute_star_path(black_box(target), *lat, *lng, 2024, 3, 15, tz)
                    .expect("star path")
            })
        });
    }
    group.finish();
}

/// Same request with a coarser grid and sparser trajectory.
fn bench_star_path_coarse(c: &mut Criterion) {
    let params = SearchParams::builder()
        .rise_set_step_days(0.04)
        .twilight_step_days(0.04)
        .trajectory_points_per_day(25.0)
        .build()
        .expect("params");
    let sky = prepare().with_params(params);
    let vega = CelestialTarget::Catalog(91262);

    c.bench_function("compute_star_path/coarse", |b| {
        b.iter(|| {
            sky.compute_star_path(black_box(&vega), 39.9, 116.4, 2024, 3, 15, "Asia/Shanghai")
                .expect("star path")
        })
    });
}

criterion_group!(benches, bench_star_path, bench_star_path_coarse);
criterion_main!(benches);
