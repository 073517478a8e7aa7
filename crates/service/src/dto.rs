//! Request and response shapes for service operations.
//!
//! Views are plain serializable snapshots built while a catalog read lock is
//! held; callers never see references into the catalog.

use catalog::{
    CatalogIndex, Course, CourseId, Lesson, NewUser, Role, TagId, User, UserId,
};
use chrono::{DateTime, Utc};
use recommender::{Candidate, CandidateSource};
use serde::{Deserialize, Serialize};

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            email: req.email,
            role: req.role,
            full_name: req.full_name,
            profile_image: req.profile_image,
            bio: req.bio,
            specialization: req.specialization,
            is_staff: false,
        }
    }
}

/// A user with the profile matching their role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl UserView {
    pub fn from_catalog(catalog: &CatalogIndex, user: &User) -> Self {
        let mut view = UserView {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            full_name: String::new(),
            profile_image: None,
            bio: None,
            specialization: None,
            joined_at: user.joined_at,
        };
        match user.role {
            Role::Student => {
                if let Some(profile) = catalog.get_student(user.id) {
                    view.full_name = profile.full_name.clone();
                    view.profile_image = profile.profile_image.clone();
                }
            }
            Role::Educator => {
                if let Some(profile) = catalog.get_educator(user.id) {
                    view.full_name = profile.full_name.clone();
                    view.profile_image = profile.profile_image.clone();
                    view.bio = Some(profile.bio.clone());
                    view.specialization = profile.specialization.clone();
                }
            }
        }
        view
    }
}

/// A course with its tag ids and ordered lessons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseView {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<TagId>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub course_image: Option<String>,
    pub lessons: Vec<Lesson>,
}

impl CourseView {
    pub fn from_catalog(catalog: &CatalogIndex, course: &Course) -> Self {
        CourseView {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            tags: course.tags.iter().copied().collect(),
            created_by: course.created_by,
            created_at: course.created_at,
            course_image: course.course_image.clone(),
            lessons: catalog
                .course_lessons(course.id)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

/// One recommendation, with enough context to explain it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCourse {
    pub course: CourseView,
    pub score: u32,
    pub source: CandidateSource,
    /// Subscribed course this one was matched against
    pub matched_with: Option<CourseId>,
    pub shared_tags: Vec<String>,
}

impl RecommendedCourse {
    /// `None` when the course vanished between scoring and rendering
    pub fn from_candidate(catalog: &CatalogIndex, candidate: Candidate) -> Option<Self> {
        let course = catalog.get_course(candidate.course_id)?;
        Some(RecommendedCourse {
            course: CourseView::from_catalog(catalog, course),
            score: candidate.score,
            source: candidate.source,
            matched_with: candidate.metadata.seed_course,
            shared_tags: candidate.metadata.shared_tags,
        })
    }
}

/// Acknowledgement for a new subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub detail: String,
    pub subscription_id: u32,
}
