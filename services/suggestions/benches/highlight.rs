use criterion::{black_box, criterion_group, criterion_main, Criterion};
use suggestions::{find_match, highlight_matches, HighlightOptions, Suggestion, SuggestionType, ADDRESS_STOPWORDS};

const VALUES: &[&str] = &[
    "г Москва, ул Тверская, д 7",
    "Московская обл, г Мытищи, ул Мира, д 10",
    "г Санкт-Петербург, пр-кт Невский, д 28",
    "Респ Татарстан, г Казань, ул Баумана, д 1",
];

fn bench_highlight(c: &mut Criterion) {
    let options = HighlightOptions::with_stopwords(ADDRESS_STOPWORDS);
    c.bench_function("highlight_address", |b| {
        b.iter(|| {
            for value in VALUES {
                black_box(highlight_matches(value, black_box("моск тверская 7"), &options));
            }
        })
    });

    let party = HighlightOptions::default().max_length(50);
    c.bench_function("highlight_long_words", |b| {
        b.iter(|| {
            black_box(highlight_matches(
                "ОБЩЕСТВО С ОГРАНИЧЕННОЙ ОТВЕТСТВЕННОСТЬЮ \"САНКТ-ПЕТЕРБУРГСКАЯ ТОРГОВАЯ КОМПАНИЯ\"",
                black_box("санкт торг"),
                &party,
            ))
        })
    });
}

fn bench_match(c: &mut Criterion) {
    let suggestions: Vec<Suggestion> = VALUES.iter().map(|value| Suggestion::new(value)).collect();
    let matchers = SuggestionType::Address.matchers();
    c.bench_function("find_match_address", |b| {
        b.iter(|| black_box(find_match(&matchers, black_box("москва тверская 7"), &suggestions)))
    });
}

criterion_group!(benches, bench_highlight, bench_match);
criterion_main!(benches);
