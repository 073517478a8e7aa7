//! Core domain types for the EduLearn catalog.
//!
//! This module defines the entities stored by the platform (users and their
//! role profiles, tags, courses, lessons, subscriptions) and `CatalogIndex`,
//! the in-memory store that owns them. Mutations live in `index.rs`; this
//! file keeps the types and the read-only lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (students and educators share one id space)
pub type UserId = u32;

/// Unique identifier for a course
pub type CourseId = u32;

/// Unique identifier for a lesson
pub type LessonId = u32;

/// Unique identifier for a tag
pub type TagId = u32;

/// Unique identifier for a subscription row
pub type SubscriptionId = u32;

/// Maximum length of a tag name
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Maximum length of a course category label
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum length of course and lesson titles, and of full names
pub const MAX_TITLE_LEN: usize = 255;

// =============================================================================
// Users
// =============================================================================

/// Account role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Educator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Educator => write!(f, "educator"),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Normalized email, unique across the catalog
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub is_staff: bool,
    pub joined_at: DateTime<Utc>,
}

/// Profile attached to every student account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub profile_image: Option<String>,
}

/// Profile attached to every educator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducatorProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub bio: String,
    pub specialization: Option<String>,
    pub profile_image: Option<String>,
}

// =============================================================================
// Courses
// =============================================================================

/// A free-form label used for similarity scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A learning unit with a category and tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    /// Coarse subject grouping, never empty
    pub category: String,
    pub tags: BTreeSet<TagId>,
    /// Educator who created the course, if still known
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub course_image: Option<String>,
}

/// A single lesson inside a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: CourseId,
    pub title: String,
    pub content: String,
    pub lesson_number: u32,
    pub created_at: DateTime<Utc>,
}

/// A student's enrollment link to a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub subscribed_at: DateTime<Utc>,
}

// =============================================================================
// Inputs
// =============================================================================

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Educators only
    #[serde(default)]
    pub bio: Option<String>,
    /// Educators only
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

/// Payload for creating a course. Tags are referenced by id and must exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub course_image: Option<String>,
}

/// Partial update of a course; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub course_image: Option<String>,
}

/// Payload for creating a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLesson {
    pub course_id: CourseId,
    pub title: String,
    pub content: String,
    pub lesson_number: u32,
}

/// Partial update of a lesson; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonUpdate {
    pub course_id: Option<CourseId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub lesson_number: Option<u32>,
}

/// Row counts, mostly for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogCounts {
    pub users: usize,
    pub tags: usize,
    pub courses: usize,
    pub lessons: usize,
    pub subscriptions: usize,
}

// =============================================================================
// CatalogIndex - the in-memory store
// =============================================================================

/// Monotonic id counters, one per entity
#[derive(Debug, Clone)]
pub(crate) struct IdSequences {
    pub(crate) user: u32,
    pub(crate) tag: u32,
    pub(crate) course: u32,
    pub(crate) lesson: u32,
    pub(crate) subscription: u32,
}

impl Default for IdSequences {
    fn default() -> Self {
        Self {
            user: 1,
            tag: 1,
            course: 1,
            lesson: 1,
            subscription: 1,
        }
    }
}

/// Main data structure that holds every entity and the secondary indices.
///
/// Primary stores are keyed by id. Secondary indices (category, email, tag
/// name, lessons per course, subscriptions per student) are maintained by
/// every mutation so lookups never scan the primary stores.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    // Primary data stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) students: HashMap<UserId, StudentProfile>,
    pub(crate) educators: HashMap<UserId, EducatorProfile>,
    pub(crate) tags: HashMap<TagId, Tag>,
    pub(crate) courses: HashMap<CourseId, Course>,
    pub(crate) lessons: HashMap<LessonId, Lesson>,
    pub(crate) subscriptions: HashMap<SubscriptionId, Subscription>,

    // Secondary indices
    pub(crate) users_by_email: HashMap<String, UserId>,
    pub(crate) tags_by_name: HashMap<String, TagId>,
    /// Courses grouped by category label
    pub(crate) category_index: HashMap<String, BTreeSet<CourseId>>,
    pub(crate) course_lessons: HashMap<CourseId, Vec<LessonId>>,
    pub(crate) student_subscriptions: HashMap<UserId, Vec<SubscriptionId>>,
    pub(crate) subscription_pairs: HashSet<(UserId, CourseId)>,

    pub(crate) next_ids: IdSequences,
}

impl CatalogIndex {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a user by email; the lookup key is normalized the same way
    /// registration normalizes it
    pub fn get_user_by_email(&self, email: &str) -> Option<&User> {
        let normalized = normalize_email(email);
        self.users_by_email
            .get(&normalized)
            .and_then(|id| self.users.get(id))
    }

    pub fn get_student(&self, user_id: UserId) -> Option<&StudentProfile> {
        self.students.get(&user_id)
    }

    pub fn get_educator(&self, user_id: UserId) -> Option<&EducatorProfile> {
        self.educators.get(&user_id)
    }

    /// All users, ordered by id
    pub fn users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub fn get_tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// Exact-name tag lookup (names are stored trimmed)
    pub fn get_tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags_by_name
            .get(name.trim())
            .and_then(|id| self.tags.get(id))
    }

    /// All tags, ordered by id
    pub fn tags(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by_key(|t| t.id);
        tags
    }

    pub fn get_course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    /// All courses, ordered by id
    pub fn courses(&self) -> Vec<&Course> {
        let mut courses: Vec<&Course> = self.courses.values().collect();
        courses.sort_by_key(|c| c.id);
        courses
    }

    /// All course ids in ascending order
    pub fn all_course_ids(&self) -> Vec<CourseId> {
        let mut ids: Vec<CourseId> = self.courses.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Course ids sharing a category, ascending
    pub fn courses_in_category<'a>(
        &'a self,
        category: &str,
    ) -> impl Iterator<Item = CourseId> + use<'a> {
        self.category_index
            .get(category)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Distinct category labels, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.category_index.keys().map(String::as_str).collect();
        categories.sort_unstable();
        categories
    }

    /// Tag names of a course. Empty if the course doesn't exist.
    pub fn course_tag_names(&self, course_id: CourseId) -> BTreeSet<String> {
        self.courses
            .get(&course_id)
            .map(|course| {
                course
                    .tags
                    .iter()
                    .filter_map(|tag_id| self.tags.get(tag_id))
                    .map(|tag| tag.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.get(&id)
    }

    /// Lessons of a course ordered by lesson number, then id
    pub fn course_lessons(&self, course_id: CourseId) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self
            .course_lessons
            .get(&course_id)
            .map(|ids| ids.iter().filter_map(|id| self.lessons.get(id)).collect())
            .unwrap_or_default();
        lessons.sort_by_key(|l| (l.lesson_number, l.id));
        lessons
    }

    /// Every lesson, ordered by course, lesson number, then id
    pub fn lessons(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.values().collect();
        lessons.sort_by_key(|l| (l.course_id, l.lesson_number, l.id));
        lessons
    }

    /// Subscriptions of a student, oldest first
    pub fn student_subscriptions(&self, student_id: UserId) -> Vec<&Subscription> {
        let mut subs: Vec<&Subscription> = self
            .student_subscriptions
            .get(&student_id)
            .map(|ids| ids.iter().filter_map(|id| self.subscriptions.get(id)).collect())
            .unwrap_or_default();
        subs.sort_by_key(|s| s.id);
        subs
    }

    pub fn is_subscribed(&self, student_id: UserId, course_id: CourseId) -> bool {
        self.subscription_pairs.contains(&(student_id, course_id))
    }

    /// Row counts for debugging/validation
    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            users: self.users.len(),
            tags: self.tags.len(),
            courses: self.courses.len(),
            lessons: self.lessons.len(),
            subscriptions: self.subscriptions.len(),
        }
    }
}

/// Lower-cases the domain part of an email and trims surrounding whitespace.
/// The local part is case-sensitive and kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
