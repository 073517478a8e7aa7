//! Loading seed files from disk end to end.

use catalog::{CatalogError, CatalogIndex, Role};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const SEED: &str = r#"{
    "tags": ["Python", "Backend", "DSA"],
    "users": [
        { "email": "grace@example.com", "role": "educator", "full_name": "Grace Hopper", "bio": "Compilers" },
        { "email": "sam@example.com", "role": "student", "full_name": "Sam Student" }
    ],
    "courses": [
        { "title": "Learn Python Programming", "category": "programming", "tags": ["Python", "Backend"], "created_by": "grace@example.com" },
        { "title": "Data Structures and Algorithms", "category": "programming", "tags": ["DSA", "Problem Solving"] },
        { "title": "Cybersecurity Basics", "category": "security", "tags": ["Cybersecurity", "Hacking"] }
    ],
    "lessons": [
        { "course": "Learn Python Programming", "title": "Variables", "content": "x = 1", "lesson_number": 2 },
        { "course": "Learn Python Programming", "title": "Installing Python", "content": "...", "lesson_number": 1 }
    ],
    "subscriptions": [
        { "student": "sam@example.com", "course": "Learn Python Programming" }
    ]
}"#;

fn write_seed(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_every_section() {
    let file = write_seed(SEED);
    let index = CatalogIndex::load_from_file(file.path()).unwrap();

    let counts = index.counts();
    assert_eq!(counts.users, 2);
    assert_eq!(counts.courses, 3);
    assert_eq!(counts.lessons, 2);
    assert_eq!(counts.subscriptions, 1);
    // "Problem Solving", "Cybersecurity" and "Hacking" were created on the fly
    assert_eq!(counts.tags, 6);

    let grace = index.get_user_by_email("grace@example.com").unwrap();
    assert_eq!(grace.role, Role::Educator);
    assert_eq!(index.get_educator(grace.id).unwrap().bio, "Compilers");

    let python = index.get_course(1).unwrap();
    assert_eq!(python.created_by, Some(grace.id));
    assert_eq!(
        python.description,
        "This course covers learn python programming with practical examples."
    );

    let lesson_titles: Vec<&str> = index
        .course_lessons(python.id)
        .iter()
        .map(|l| l.title.as_str())
        .collect();
    assert_eq!(lesson_titles, vec!["Installing Python", "Variables"]);

    let sam = index.get_user_by_email("sam@example.com").unwrap();
    assert!(index.is_subscribed(sam.id, python.id));
}

#[test]
fn missing_file_is_reported() {
    let result = CatalogIndex::load_from_file(Path::new("does/not/exist.json"));
    assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
}

#[test]
fn unknown_course_reference_fails() {
    let file = write_seed(
        r#"{
            "users": [{ "email": "sam@example.com", "role": "student", "full_name": "Sam" }],
            "subscriptions": [{ "student": "sam@example.com", "course": "Nope" }]
        }"#,
    );
    let result = CatalogIndex::load_from_file(file.path());
    assert!(matches!(result, Err(CatalogError::UnknownName { .. })));
}

#[test]
fn empty_category_fails() {
    let file = write_seed(r#"{ "courses": [{ "title": "Nowhere", "category": "" }] }"#);
    let result = CatalogIndex::load_from_file(file.path());
    assert!(matches!(result, Err(CatalogError::InvalidValue { .. })));
}

#[test]
fn bundled_seed_file_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json");
    let index = CatalogIndex::load_from_file(&path).unwrap();
    assert!(index.counts().courses >= 40);
    index.validate().unwrap();
}
