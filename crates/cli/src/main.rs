use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use access::Actor;
use catalog::{CourseId, Role, TagId, UserId};
use service::{
    CourseView, EduLearnService, RecommendedCourse, ServiceConfig, UserView, init_logger,
};

/// EduLearn - course catalog and recommendation engine
#[derive(Parser)]
#[command(name = "edulearn")]
#[command(about = "Course catalog and tag-based course recommendations", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "EDULEARN_CONFIG")]
    config: Option<PathBuf>,

    /// JSON catalog seed file (overrides the config)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend courses for a student
    Recommend {
        /// Student id or email
        #[arg(long)]
        student: String,

        /// Show why each course was picked
        #[arg(long)]
        explain: bool,
    },

    /// List courses, optionally in one category
    Courses {
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a student's profile and subscriptions
    Student {
        /// Student id or email
        #[arg(long)]
        student: String,
    },

    /// Search courses by title or description
    Search {
        /// Case-insensitive substring to look for
        #[arg(long)]
        query: String,
    },

    /// List the lessons of a course
    Lessons {
        #[arg(long)]
        course: CourseId,

        /// Read as this student (enforces the subscription check)
        #[arg(long)]
        student: Option<String>,
    },

    /// Run concurrent recommendation requests and report latencies
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "200")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "16")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(data) = cli.data {
        config.catalog_path = data;
    }

    println!("Loading catalog from {}...", config.catalog_path.display());
    let start = Instant::now();
    let service = EduLearnService::from_config(&config)
        .await
        .context("Failed to load catalog")?;
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend { student, explain } => {
            handle_recommend(&service, &student, explain).await?
        }
        Commands::Courses { category } => handle_courses(&service, category.as_deref()).await?,
        Commands::Student { student } => handle_student(&service, &student).await?,
        Commands::Search { query } => handle_search(&service, &query).await?,
        Commands::Lessons { course, student } => {
            handle_lessons(&service, course, student.as_deref()).await?
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(service, requests, concurrent).await?,
    }

    Ok(())
}

/// Resolve `42` or `sam@edulearn.dev` to a user
async fn find_user(service: &EduLearnService, student: &str) -> Result<UserView> {
    let user = match student.parse::<UserId>() {
        Ok(id) => service.get_user(id).await,
        Err(_) => service.get_user_by_email(student).await,
    };
    user.map_err(|_| anyhow!("User {} not found", student))
}

async fn student_actor(service: &EduLearnService, student: &str) -> Result<(UserView, Actor)> {
    let user = find_user(service, student).await?;
    if user.role != Role::Student {
        bail!("{} is an {}, not a student", user.email, user.role);
    }
    let actor = service.resolve_actor(Some(user.id)).await;
    Ok((user, actor))
}

async fn tag_names(service: &EduLearnService) -> HashMap<TagId, String> {
    service
        .list_tags()
        .await
        .into_iter()
        .map(|tag| (tag.id, tag.name))
        .collect()
}

/// Handle the 'recommend' command
async fn handle_recommend(service: &EduLearnService, student: &str, explain: bool) -> Result<()> {
    let (user, actor) = student_actor(service, student).await?;

    let recommendations = match service.recommended_courses(&actor).await {
        Ok(recommendations) => recommendations,
        Err(e) if e.status_code() == 404 => {
            println!(
                "{} {} has no subscriptions yet; subscribe to a course first.",
                "!".yellow(),
                user.full_name
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}",
        format!("Recommended courses for {} <{}>:", user.full_name, user.email)
            .bold()
            .blue()
    );
    print_recommendations(&recommendations, explain);
    Ok(())
}

/// Handle the 'courses' command
async fn handle_courses(service: &EduLearnService, category: Option<&str>) -> Result<()> {
    let courses = service.list_courses(category).await;
    let tags = tag_names(service).await;

    let header = match category {
        Some(category) => format!("Courses in '{}' ({}):", category, courses.len()),
        None => format!("All courses ({}):", courses.len()),
    };
    println!("{}", header.bold().blue());
    for course in &courses {
        print_course_line(course, &tags);
    }
    Ok(())
}

/// Handle the 'student' command
async fn handle_student(service: &EduLearnService, student: &str) -> Result<()> {
    let (user, actor) = student_actor(service, student).await?;
    let courses = service.my_courses(&actor).await?;
    let tags = tag_names(service).await;

    println!("{}", format!("Student #{}", user.id).bold().blue());
    println!("{}Name: {}", "• ".green(), user.full_name);
    println!("{}Email: {}", "• ".green(), user.email);
    println!(
        "{}Joined: {}",
        "• ".green(),
        user.joined_at.format("%Y-%m-%d")
    );
    println!("{}Subscriptions: {}", "• ".cyan(), courses.len());
    for course in &courses {
        print_course_line(course, &tags);
    }

    // Category spread of the subscriptions drives the recommendations
    let mut categories: HashMap<&str, usize> = HashMap::new();
    for course in &courses {
        *categories.entry(course.category.as_str()).or_default() += 1;
    }
    let mut categories: Vec<_> = categories.into_iter().collect();
    categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if !categories.is_empty() {
        println!("Categories:");
        for (category, count) in categories {
            println!("  - {}: {} course(s)", category, count);
        }
    }
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(service: &EduLearnService, query: &str) -> Result<()> {
    let needle = query.to_lowercase();
    let tags = tag_names(service).await;

    // 0 = exact title, 1 = title contains, 2 = description contains
    let mut matches: Vec<(u8, CourseView)> = service
        .list_courses(None)
        .await
        .into_iter()
        .filter_map(|course| {
            let title = course.title.to_lowercase();
            let rank = if title == needle {
                0
            } else if title.contains(&needle) {
                1
            } else if course.description.to_lowercase().contains(&needle) {
                2
            } else {
                return None;
            };
            Some((rank, course))
        })
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  (no courses found)");
    }
    for (_, course) in matches.iter().take(20) {
        print_course_line(course, &tags);
    }
    Ok(())
}

/// Handle the 'lessons' command
async fn handle_lessons(
    service: &EduLearnService,
    course_id: CourseId,
    student: Option<&str>,
) -> Result<()> {
    let course = service.get_course(course_id).await?;
    let lessons = match student {
        Some(student) => {
            let (_, actor) = student_actor(service, student).await?;
            service.my_course_lessons(&actor, course_id).await?
        }
        None => service.list_lessons(Some(course_id)).await,
    };

    println!("{}", format!("Lessons of '{}':", course.title).bold().blue());
    if lessons.is_empty() {
        println!("  (no lessons yet)");
    }
    for lesson in &lessons {
        println!(
            "{}. {}",
            lesson.lesson_number.to_string().green(),
            lesson.title
        );
        if !lesson.content.is_empty() {
            println!("   {}", lesson.content.dimmed());
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: EduLearnService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("requests and concurrent must both be at least 1");
    }

    // Students are the only callers recommendations serve
    let counts = service.counts().await;
    let mut students: Vec<Actor> = Vec::new();
    for id in 1..=counts.users as UserId {
        if let Ok(user) = service.get_user(id).await
            && user.role == Role::Student
        {
            students.push(service.resolve_actor(Some(id)).await);
        }
    }
    if students.is_empty() {
        bail!("Catalog has no students to benchmark with");
    }
    tracing::info!(
        "Benchmarking {} requests across {} students",
        requests,
        students.len()
    );

    let service = Arc::new(service);
    let semaphore = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let actor = students[rand::random_range(0..students.len())];
        let service = Arc::clone(&service);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            let outcome = service.recommended_courses(&actor).await;
            Ok::<_, anyhow::Error>((start.elapsed(), outcome.err().map(|e| e.status_code())))
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut failures: HashMap<u16, usize> = HashMap::new();
    for handle in handles {
        let (elapsed, status) = handle.await??;
        timings.push(elapsed);
        if let Some(status) = status {
            *failures.entry(status).or_default() += 1;
        }
    }
    let wall_time = wall_clock.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| {
        let index = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[index]
    };

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / wall_time.as_secs_f64()
    );
    if failures.is_empty() {
        println!("{} All requests succeeded", "✓".green());
    } else {
        let mut failures: Vec<_> = failures.into_iter().collect();
        failures.sort();
        for (status, count) in failures {
            println!("{} {} request(s) answered {}", "!".yellow(), count, status);
        }
    }

    Ok(())
}

fn print_course_line(course: &CourseView, tags: &HashMap<TagId, String>) {
    let tag_list = course
        .tags
        .iter()
        .filter_map(|id| tags.get(id).map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}: {} [{}] ({})",
        course.id.to_string().green(),
        course.title,
        course.category.cyan(),
        tag_list
    );
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[RecommendedCourse], explain: bool) {
    if recommendations.is_empty() {
        println!("  (the catalog has nothing left to recommend)");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {}",
            (i + 1).to_string().green(),
            rec.course.title,
            rec.course.category.cyan(),
            rec.score
        );
        if explain {
            match rec.matched_with {
                Some(seed) if rec.shared_tags.is_empty() => {
                    println!("   Same category as course #{}, no shared tags", seed)
                }
                Some(seed) => println!(
                    "   Shares {} with course #{}",
                    rec.shared_tags.join(", "),
                    seed
                ),
                None => println!("   Backfill: picked to fill the list"),
            }
        }
    }
}
