use basins::{aggregate, parse_grid, resolve_flow, run, synth, Grid, ResolveOptions};

fn main() {
    divan::main();
}

const SAMPLE_INPUT: &str = "3\n5 4 5\n5 5 5\n1 5 9";

fn staircase(size: usize) -> Grid {
    synth::staircase(size).unwrap()
}

fn scattered(size: usize) -> Grid {
    synth::scattered(size, size * size / 2 + 1).unwrap()
}

#[divan::bench]
fn process_sample() {
    basins::process(divan::black_box(SAMPLE_INPUT)).unwrap();
}

#[divan::bench(args = [100, 500, 1000])]
fn parse(bencher: divan::Bencher, size: usize) {
    let text = staircase(size).to_string();
    bencher.bench(|| parse_grid(divan::black_box(&text)).unwrap());
}

#[divan::bench(args = [500, 1000, 2000])]
fn resolve_parallel(bencher: divan::Bencher, size: usize) {
    let grid = scattered(size);
    bencher.bench(|| resolve_flow(divan::black_box(&grid), &ResolveOptions::default()).unwrap());
}

#[divan::bench(args = [500, 1000, 2000])]
fn resolve_sequential(bencher: divan::Bencher, size: usize) {
    let grid = scattered(size);
    let options = ResolveOptions {
        parallel: false,
        ..Default::default()
    };
    bencher.bench(|| resolve_flow(divan::black_box(&grid), &options).unwrap());
}

#[divan::bench(args = [500, 1000, 2000])]
fn aggregate_scattered(bencher: divan::Bencher, size: usize) {
    let flow = resolve_flow(&scattered(size), &ResolveOptions::default()).unwrap();
    bencher.bench(|| aggregate(divan::black_box(&flow)).unwrap());
}

#[divan::bench(args = [500, 1000, 2000])]
fn aggregate_staircase(bencher: divan::Bencher, size: usize) {
    let flow = resolve_flow(&staircase(size), &ResolveOptions::default()).unwrap();
    bencher.bench(|| aggregate(divan::black_box(&flow)).unwrap());
}

// Largest allowed map, one basin with chains up to 2 * (S - 1) long
#[divan::bench(sample_count = 3, sample_size = 1)]
fn run_staircase_max() {
    let grid = staircase(5000);
    let analysis = run(divan::black_box(&grid), &ResolveOptions::default()).unwrap();
    assert_eq!(vec![25_000_000], analysis.report.sizes());
}
