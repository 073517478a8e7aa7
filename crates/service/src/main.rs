//! Smoke-test harness for the EduLearn service.
//!
//! Loads the catalog, registers a new student, subscribes them to a course
//! and prints their recommendations next to those of a seeded student.
//!
//! Usage: cargo run --package service [config.toml]

use anyhow::{Context, Result};
use tracing::info;

use catalog::Role;
use service::{EduLearnService, RegisterRequest, ServiceConfig, init_logger};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger(false);
    info!("Starting EduLearn service smoke test");

    let config = match std::env::args().nth(1) {
        Some(path) => ServiceConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => ServiceConfig::default(),
    };

    let service = EduLearnService::from_config(&config)
        .await
        .context("Failed to start service")?;
    let counts = service.counts().await;
    info!(
        "Catalog ready: {} users, {} courses, {} subscriptions",
        counts.users, counts.courses, counts.subscriptions
    );

    // A brand new student with a single subscription
    let user = service
        .register(RegisterRequest {
            email: "smoke.test@edulearn.dev".to_string(),
            role: Role::Student,
            full_name: "Smoke Test".to_string(),
            profile_image: None,
            bio: None,
            specialization: None,
        })
        .await?;
    let actor = service.resolve_actor(Some(user.id)).await;

    let first_course = service
        .list_courses(Some("ai"))
        .await
        .into_iter()
        .next()
        .context("Catalog has no ai courses")?;
    let response = service.subscribe(&actor, first_course.id).await?;
    info!("{} ({})", response.detail, first_course.title);

    match service.recommended_courses(&actor).await {
        Ok(recommendations) => {
            info!("Received {} recommendations:", recommendations.len());
            for (i, rec) in recommendations.iter().enumerate() {
                info!(
                    "{}. {} [{}] - Score: {} ({:?})",
                    i + 1,
                    rec.course.title,
                    rec.course.category,
                    rec.score,
                    rec.source
                );
            }
        }
        Err(e) => info!("Recommendation failed with status {}: {}", e.status_code(), e),
    }

    // A student with nothing to go on gets a 404, not a crash
    let fresh = service
        .register(RegisterRequest {
            email: "no.subs@edulearn.dev".to_string(),
            role: Role::Student,
            full_name: "No Subscriptions".to_string(),
            profile_image: None,
            bio: None,
            specialization: None,
        })
        .await?;
    let fresh_actor = service.resolve_actor(Some(fresh.id)).await;
    if let Err(e) = service.recommended_courses(&fresh_actor).await {
        info!("Student without subscriptions: {} ({})", e.status_code(), e);
    }

    info!("Smoke test finished");
    Ok(())
}
