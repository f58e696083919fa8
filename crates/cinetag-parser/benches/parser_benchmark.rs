//! Benchmarks for cinetag-parser.
//!
//! Run with: cargo bench -p cinetag-parser

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cinetag_parser::{parse, Parser, ParserConfig};

const MOVIE_SAMPLES: &[&str] = &[
    "A.Mulher.no.Jardim.2025.1080p.BluRay.DUAL.5.1.mkv",
    "As.Marvels.2023.1080p.BluRay.EAC3.AAC.DUAL.5.1.mkv",
    "Inception.2010.2160p.UHD.BluRay.x265.HDR.DTS-HD.MA.5.1-RELEASE.mkv",
    "Interstellar.2014.IMAX.2160p.UHD.BluRay.REMUX.HDR.HEVC.TrueHD.7.1.Atmos-FGT.mkv",
];

const SERIES_SAMPLES: &[&str] = &[
    "Ironheart.S01E01.1080p.WEB-DL.DUAL.5.1.mkv",
    "The.Mandalorian.S02E05.1080p.WEB.H264-FLX.mkv",
    "Stranger.Things.S04E09.Chapter.Nine.2160p.NF.WEB-DL.DDP5.1.Atmos.DV.HDR.H.265-FLUX.mkv",
    "House.of.the.Dragon.S01E10.The.Black.Queen.1080p.HMAX.WEB-DL.DDP5.1.H.264-CMRG.mp4",
];

const UNSTRUCTURED_SAMPLES: &[&str] = &[
    "home video.mp4",
    "Some Random Clip Without Any Markers At All.mov",
    "....avi",
];

fn bench_parse_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_single");

    group.bench_function("movie", |b| {
        b.iter(|| parse(black_box(MOVIE_SAMPLES[0])))
    });

    group.bench_function("series", |b| {
        b.iter(|| parse(black_box(SERIES_SAMPLES[0])))
    });

    group.bench_function("unstructured", |b| {
        b.iter(|| parse(black_box(UNSTRUCTURED_SAMPLES[0])))
    });

    group.finish();
}

fn bench_parse_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_batch");

    for (name, samples) in [
        ("movies", MOVIE_SAMPLES),
        ("series", SERIES_SAMPLES),
        ("unstructured", UNSTRUCTURED_SAMPLES),
    ] {
        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), samples, |b, samples| {
            b.iter(|| {
                for sample in samples.iter() {
                    black_box(parse(black_box(sample)));
                }
            })
        });
    }

    group.finish();
}

fn bench_custom_delimiter(c: &mut Criterion) {
    let parser = Parser::new(ParserConfig { delimiter: '_' });

    c.bench_function("parse_underscore_delimited", |b| {
        b.iter(|| parser.parse(black_box("Breaking_Bad_S05E14_Ozymandias_720p_BluRay.mkv")))
    });
}

criterion_group!(
    benches,
    bench_parse_single,
    bench_parse_batch,
    bench_custom_delimiter
);
criterion_main!(benches);
