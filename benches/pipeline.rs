use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use xg_terminal::extract::{NoopSink, extract_match_payload};
use xg_terminal::match_table::Side;
use xg_terminal::normalize::normalize_payload;

// A full league season embedded the way the stats site embeds it.
fn synthetic_team_page(matches: usize) -> String {
    let mut records = Vec::with_capacity(matches);
    for i in 0..matches {
        records.push(format!(
            concat!(
                r#"{{\x22id\x22:\x22{id}\x22,\x22isResult\x22:true,\x22side\x22:\x22{side}\x22,"#,
                r#"\x22h\x22:{{\x22title\x22:\x22Arsenal\x22}},\x22a\x22:{{\x22title\x22:\x22Chelsea\x22}},"#,
                r#"\x22goals\x22:{{\x22h\x22:\x22{gh}\x22,\x22a\x22:\x22{ga}\x22}},"#,
                r#"\x22xG\x22:{{\x22h\x22:\x22{xh}.{xf}\x22,\x22a\x22:\x220.9\x22}},"#,
                r#"\x22datetime\x22:\x222024-08-{day:02} 15:00:00\x22}}"#,
            ),
            id = 26000 + i,
            side = if i % 2 == 0 { "h" } else { "a" },
            gh = i % 4,
            ga = (i + 1) % 3,
            xh = i % 3,
            xf = i % 10,
            day = (i % 28) + 1,
        ));
    }
    format!(
        "<html><body><script>var datesData = JSON.parse('[{}]');</script></body></html>",
        records.join(",")
    )
}

fn bench_extract(c: &mut Criterion) {
    let page = synthetic_team_page(38);
    c.bench_function("extract_match_payload", |b| {
        b.iter(|| {
            let payload = extract_match_payload(black_box(&page), &NoopSink).unwrap();
            black_box(payload);
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let page = synthetic_team_page(38);
    let payload = extract_match_payload(&page, &NoopSink).unwrap();
    c.bench_function("normalize_payload", |b| {
        b.iter(|| {
            let rows = normalize_payload(black_box(&payload), Side::H);
            black_box(rows.len());
        })
    });
}

criterion_group!(benches, bench_extract, bench_normalize);
criterion_main!(benches);
