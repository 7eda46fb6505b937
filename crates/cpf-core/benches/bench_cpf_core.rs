use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cpf_core::abbreviations::{abbreviate, expand, PhraseMap};
use cpf_core::{AbbreviationOverrides, AbbreviationTable};

fn bench_abbreviation_lookup(c: &mut Criterion) {
    let words = ["module", "Configuration", "WordPress", "pull request", "unknownword"];
    c.bench_function("abbreviate_builtin_5_words", |b| {
        b.iter(|| {
            for w in &words {
                black_box(abbreviate(black_box(w), None));
            }
        })
    });

    let tokens = ["mod", "cfg", "wp", "pr", "zzz"];
    c.bench_function("expand_builtin_5_tokens", |b| {
        b.iter(|| {
            for t in &tokens {
                black_box(expand(black_box(t), None));
            }
        })
    });
}

fn bench_override_merge(c: &mut Criterion) {
    let custom: PhraseMap = (0..200)
        .map(|i| (format!("phrase number {i}"), format!("p{i}")))
        .collect();
    let overrides = AbbreviationOverrides::from_encode(custom);
    c.bench_function("merge_200_overrides", |b| {
        b.iter(|| black_box(AbbreviationTable::builtin().with_overrides(black_box(&overrides))))
    });
}

criterion_group!(benches, bench_abbreviation_lookup, bench_override_merge);
criterion_main!(benches);
