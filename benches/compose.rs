use bauhaus_poster::poster::render::render_composition;
use bauhaus_poster::poster::{compose, BlendMode, ComposerConfig, PaletteCatalogue, SeededRng};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_compose(c: &mut Criterion) {
    let palettes = PaletteCatalogue::builtin();
    let config = ComposerConfig::default();
    let mut rng = SeededRng::new(0);

    c.bench_function("compose_1920x1080", |b| {
        b.iter(|| {
            compose(
                &mut rng,
                12345,
                (1920, 1080),
                palettes.palette_at(0),
                "BAUHAUS",
                &config,
            )
        })
    });

    let composition = compose(
        &mut rng,
        12345,
        (1920, 1080),
        palettes.palette_at(0),
        "BAUHAUS",
        &config,
    );
    if let Some(composition) = composition {
        c.bench_function("render_1920x1080", |b| {
            b.iter(|| render_composition(&composition, |_| 1.0, BlendMode::Normal))
        });
    }
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
