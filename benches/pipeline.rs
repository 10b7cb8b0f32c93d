use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use genogram_layout::config::{Config, EngineKind};
use genogram_layout::generation::resolve;
use genogram_layout::input::parse_str;
use genogram_layout::{Gender, GenogramData, Person, Relationship, build_diagram, normalize};
use std::hint::black_box;

/// A couple per generation with `children` kids each; every kid but the
/// first marries in a partner and continues the line.
fn synthetic_tree(generations: usize, children: usize) -> GenogramData {
    let mut people = vec![
        Person::new("g0-a").with_gender(Gender::Male),
        Person::new("g0-b").with_gender(Gender::Female),
    ];
    let mut relationships = vec![Relationship::couple("c-g0", "g0-a", "g0-b")];
    let mut couples = vec![("g0-a".to_string(), "g0-b".to_string())];
    let mut next_id = 0usize;

    for depth in 1..=generations {
        let mut next_couples = Vec::new();
        for (a, b) in &couples {
            for child in 0..children {
                let kid = format!("g{depth}-k{next_id}");
                next_id += 1;
                people.push(Person::new(kid.clone()));
                relationships.push(Relationship::parent_child(format!("p-{kid}-a"), &kid, a));
                relationships.push(Relationship::parent_child(format!("p-{kid}-b"), &kid, b));
                if child == 0 {
                    continue;
                }
                let spouse = format!("{kid}-s");
                people.push(Person::new(spouse.clone()));
                relationships.push(Relationship::couple(format!("c-{kid}"), &kid, &spouse));
                next_couples.push((kid, spouse));
            }
        }
        couples = next_couples;
    }
    GenogramData::new(people, relationships)
}

fn document(data: &GenogramData) -> String {
    serde_json::to_string(data).expect("serialize failed")
}

const SIZES: [(usize, usize); 3] = [(2, 2), (4, 3), (5, 3)];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (depth, kids) in SIZES {
        let text = document(&synthetic_tree(depth, kids));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}x{kids}")),
            &text,
            |b, text| {
                b.iter(|| black_box(parse_str(black_box(text)).expect("parse failed")));
            },
        );
    }
    group.finish();
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("generations");
    let config = Config::default();
    for (depth, kids) in SIZES {
        let data = synthetic_tree(depth, kids);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}x{kids}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let people = black_box(&data.people);
                    let map = resolve(people, &data.relationships, &config.generation);
                    black_box(map.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let config = Config::default();
    for (depth, kids) in SIZES {
        let data = synthetic_tree(depth, kids);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}x{kids}")),
            &data,
            |b, data| {
                b.iter(|| black_box(normalize(black_box(data), &config)));
            },
        );
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.sample_size(20);
    for engine in [EngineKind::Dagre, EngineKind::Rows] {
        let mut config = Config::default();
        config.layout.engine = engine;
        for (depth, kids) in SIZES {
            let data = synthetic_tree(depth, kids);
            group.bench_with_input(
                BenchmarkId::new(format!("{engine:?}"), format!("{depth}x{kids}")),
                &data,
                |b, data| {
                    b.iter(|| black_box(build_diagram(black_box(data), &config)));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_generations, bench_normalize, bench_layout
);
criterion_main!(benches);
