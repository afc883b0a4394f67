use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use transit_linemap::config::LayoutConfig;
use transit_linemap::fonts::FontBook;
use transit_linemap::ir::{Line, Rgb};
use transit_linemap::layout::compute_placement;
use transit_linemap::render::render_svg;
use transit_linemap::text_metrics::{FontMeasurer, HeuristicMeasurer, TextMeasure};

fn synthetic_line(stations: usize) -> Line {
    Line {
        system: "Bench Transit".to_string(),
        id: "Core".to_string(),
        name: format!("Line {stations}"),
        years: "2001-2026".to_string(),
        color: Rgb::new(0x15, 0x65, 0xC0),
        stations: (0..stations)
            .map(|i| format!("Station {} {}", i, "Avenue".repeat(i % 3)))
            .collect(),
    }
}

fn font_measurer() -> Option<FontMeasurer> {
    let book = FontBook::system();
    FontMeasurer::new(&book, &["ArialMT"])
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    let fonts = font_measurer();
    for stations in [2usize, 12, 40] {
        let line = synthetic_line(stations);
        group.bench_with_input(
            BenchmarkId::new("heuristic", stations),
            &line,
            |b, data| {
                b.iter(|| {
                    let result = compute_placement(black_box(data), &config, &HeuristicMeasurer)
                        .expect("layout failed");
                    black_box(result.canvas_height());
                });
            },
        );
        if let Some(measurer) = &fonts {
            group.bench_with_input(BenchmarkId::new("fonts", stations), &line, |b, data| {
                b.iter(|| {
                    let result = compute_placement(black_box(data), &config, measurer)
                        .expect("layout failed");
                    black_box(result.canvas_height());
                });
            });
        }
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = LayoutConfig::default();
    let measurer: Box<dyn TextMeasure> = match font_measurer() {
        Some(measurer) => Box::new(measurer),
        None => Box::new(HeuristicMeasurer),
    };
    for stations in [2usize, 12, 40] {
        let line = synthetic_line(stations);
        group.bench_with_input(BenchmarkId::from_parameter(stations), &line, |b, data| {
            b.iter(|| {
                let result = compute_placement(black_box(data), &config, measurer.as_ref())
                    .expect("layout failed");
                let svg = render_svg(&result, data, &config, measurer.as_ref());
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_end_to_end
);
criterion_main!(benches);
