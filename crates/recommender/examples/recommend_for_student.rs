//! Example: Recommend courses for a seeded student
//!
//! Run with: cargo run --package recommender --example recommend_for_student [email]
//!
//! Loads the bundled catalog, looks up the student (lina@edulearn.dev by
//! default), and prints their subscriptions followed by the recommendations
//! with their scores and shared tags.

use anyhow::Context;
use catalog::CatalogIndex;
use recommender::{CandidateSource, Recommender, RecommenderConfig};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== EduLearn Recommendation Example ===\n");

    let start = Instant::now();
    let data_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json");
    let index = CatalogIndex::load_from_file(&data_path)?;
    println!("Loaded catalog in {:?}", start.elapsed());
    let counts = index.counts();
    println!(
        "  {} courses, {} tags, {} subscriptions\n",
        counts.courses, counts.tags, counts.subscriptions
    );

    let email = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lina@edulearn.dev".to_string());
    let student = index
        .get_user_by_email(&email)
        .with_context(|| format!("no user with email {email}"))?;

    println!("Target student: {} (id {})", student.email, student.id);
    for sub in index.student_subscriptions(student.id) {
        if let Some(course) = index.get_course(sub.course_id) {
            println!("  subscribed: {} [{}]", course.title, course.category);
        }
    }
    println!();

    let engine = Recommender::new(RecommenderConfig::default())?;
    let start = Instant::now();
    let candidates = engine.recommend(&index, student.id)?;
    println!("Recommended {} courses in {:?}", candidates.len(), start.elapsed());

    for (rank, candidate) in candidates.iter().enumerate() {
        let Some(course) = index.get_course(candidate.course_id) else {
            continue;
        };
        match candidate.source {
            CandidateSource::CategoryMatch => println!(
                "  {}. {} [{}] score={} shared={:?}",
                rank + 1,
                course.title,
                course.category,
                candidate.score,
                candidate.metadata.shared_tags
            ),
            CandidateSource::Backfill => println!(
                "  {}. {} [{}] (backfill)",
                rank + 1,
                course.title,
                course.category
            ),
        }
    }

    Ok(())
}
