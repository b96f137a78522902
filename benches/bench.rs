// Criterion benchmarks for Job Scout

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use job_scout::core::scoring::score_listing;
use job_scout::core::Matcher;
use job_scout::models::{Criteria, Listing};

const SKILLS: [&str; 8] = ["Python", "SQL", "Docker", "AWS", "Kafka", "Airflow", "Spark", "dbt"];

fn create_listing(id: usize) -> Listing {
    let skills: Vec<&str> = SKILLS.iter().copied().take(id % SKILLS.len() + 1).collect();
    Listing {
        id: format!("li-{}", id),
        title: if id % 2 == 0 { "Senior Data Engineer" } else { "Backend Developer" }.to_string(),
        company: format!("Company {}", id % 17),
        location: if id % 3 == 0 { "Remote" } else { "Berlin, Germany" }.to_string(),
        url: format!("https://example.com/jobs/{}", id),
        description: format!(
            "We are looking for an engineer with {} experience. Competitive salary.",
            skills.join(", ")
        ),
        experience_level: "Mid-Senior level".to_string(),
        job_type: "Full-time".to_string(),
        posted_date: "2024-05-01".to_string(),
    }
}

fn create_criteria() -> Criteria {
    Criteria {
        skills: SKILLS.iter().map(|s| s.to_string()).collect(),
        keywords: vec!["data engineer".to_string(), "platform".to_string()],
        companies: vec![],
        location: Some("Remote".to_string()),
        experience_level: Some("Senior".to_string()),
        job_type: Some("Full-time".to_string()),
        match_threshold: 70.0,
    }
}

fn bench_score_listing(c: &mut Criterion) {
    let criteria = create_criteria();
    let listing = create_listing(7);

    c.bench_function("score_listing", |b| {
        b.iter(|| score_listing(black_box(&listing), black_box(&criteria)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::new(create_criteria());

    let mut group = c.benchmark_group("matching");

    for listing_count in [10, 50, 100, 500, 1000].iter() {
        let listings: Vec<Listing> = (0..*listing_count).map(create_listing).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", listing_count),
            listing_count,
            |b, _| {
                b.iter(|| matcher.find_matches(black_box(listings.clone())));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_score_listing, bench_matching);

criterion_main!(benches);
