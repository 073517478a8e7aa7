//! # EduLearn Service
//!
//! Every operation follows the same steps:
//! 1. Lock the catalog (read for queries, write for mutations)
//! 2. Run the operation's policy chain against the locked catalog
//! 3. Perform the query or mutation and render views
//!
//! Authorization and mutation happen under the same guard, so a check can
//! never go stale before the write it protects.
//!
//! Recommendations are CPU-bound: they run on the blocking pool against a
//! read guard, and the whole call is bounded by the configured timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use access::policies::{
    Authenticated, CourseOwner, EducatorOrReadOnly, StudentOnly, SubscribedToCourse,
};
use access::{AccessRequest, Actor, Grant, PolicyChain};
use catalog::{
    CatalogCounts, CatalogIndex, CourseId, CourseUpdate, Lesson, LessonId, LessonUpdate,
    NewCourse, NewLesson, Subscription, Tag, UserId,
};
use recommender::Recommender;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::ServiceConfig;
use crate::dto::{CourseView, RecommendedCourse, RegisterRequest, SubscribeResponse, UserView};
use crate::error::{Result, ServiceError};

/// The policy chain guarding each group of operations
struct Policies {
    course_write: PolicyChain,
    tag_write: PolicyChain,
    subscribe: PolicyChain,
    subscriptions: PolicyChain,
    student_area: PolicyChain,
    course_lessons: PolicyChain,
    recommend: PolicyChain,
}

impl Policies {
    fn new() -> Self {
        Self {
            course_write: PolicyChain::new()
                .add_policy(EducatorOrReadOnly)
                .add_policy(CourseOwner),
            tag_write: PolicyChain::new().add_policy(Authenticated),
            subscribe: PolicyChain::new()
                .add_policy(Authenticated)
                .add_policy(StudentOnly::new("Only students can subscribe to courses.")),
            subscriptions: PolicyChain::new().add_policy(Authenticated),
            student_area: PolicyChain::new()
                .add_policy(Authenticated)
                .add_policy(StudentOnly::new("Only students can access this.")),
            course_lessons: PolicyChain::new()
                .add_policy(Authenticated)
                .add_policy(StudentOnly::new("Only students can access lessons."))
                .add_policy(SubscribedToCourse),
            recommend: PolicyChain::new()
                .add_policy(Authenticated)
                .add_policy(StudentOnly::new("Only students can get recommendations.")),
        }
    }
}

/// Entry point for every EduLearn operation
#[derive(Clone)]
pub struct EduLearnService {
    catalog: Arc<RwLock<CatalogIndex>>,
    recommender: Arc<Recommender>,
    recommend_timeout_ms: u64,
    policies: Arc<Policies>,
}

impl EduLearnService {
    /// Wrap an already-loaded catalog
    pub fn new(catalog: CatalogIndex, config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let recommender = Recommender::new(config.recommendation.clone())?;
        Ok(Self {
            catalog: Arc::new(RwLock::new(catalog)),
            recommender: Arc::new(recommender),
            recommend_timeout_ms: config.recommend_timeout_ms,
            policies: Arc::new(Policies::new()),
        })
    }

    /// Load the catalog named in `config` and build the service
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let start_time = Instant::now();
        let path = config.catalog_path.clone();
        let catalog = tokio::task::spawn_blocking(move || CatalogIndex::load_from_file(&path))
            .await
            .map_err(|e| ServiceError::Internal(format!("catalog loader panicked: {e}")))??;
        info!(
            "Loaded catalog from {} in {:.2?}",
            config.catalog_path.display(),
            start_time.elapsed()
        );
        Self::new(catalog, config)
    }

    pub fn recommend_timeout(&self) -> Duration {
        Duration::from_millis(self.recommend_timeout_ms)
    }

    pub async fn counts(&self) -> CatalogCounts {
        self.catalog.read().await.counts()
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Create an account and its role profile. Open to anyone.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserView> {
        let mut catalog = self.catalog.write().await;
        let user_id = catalog.register_user(request.into())?;
        let user = catalog
            .get_user(user_id)
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        info!("Registered user {}", user_id);
        Ok(UserView::from_catalog(&catalog, user))
    }

    /// Actor for an already-authenticated user id; unknown ids are anonymous
    pub async fn resolve_actor(&self, user_id: Option<UserId>) -> Actor {
        let Some(user_id) = user_id else {
            return Actor::Anonymous;
        };
        let catalog = self.catalog.read().await;
        match catalog.get_user(user_id) {
            Some(user) => Actor::from_user(user),
            None => {
                warn!("Unknown user id {} treated as anonymous", user_id);
                Actor::Anonymous
            }
        }
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserView> {
        let catalog = self.catalog.read().await;
        let user = catalog
            .get_user(user_id)
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        Ok(UserView::from_catalog(&catalog, user))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserView> {
        let catalog = self.catalog.read().await;
        let user = catalog
            .get_user_by_email(email)
            .ok_or_else(|| ServiceError::not_found("User", email))?;
        Ok(UserView::from_catalog(&catalog, user))
    }

    // ------------------------------------------------------------------
    // Courses
    // ------------------------------------------------------------------

    /// All courses, optionally restricted to one category. Open to anyone.
    pub async fn list_courses(&self, category: Option<&str>) -> Vec<CourseView> {
        let catalog = self.catalog.read().await;
        match category {
            Some(category) => catalog
                .courses_in_category(category)
                .filter_map(|id| catalog.get_course(id))
                .map(|course| CourseView::from_catalog(&catalog, course))
                .collect(),
            None => catalog
                .courses()
                .into_iter()
                .map(|course| CourseView::from_catalog(&catalog, course))
                .collect(),
        }
    }

    pub async fn get_course(&self, course_id: CourseId) -> Result<CourseView> {
        let catalog = self.catalog.read().await;
        let course = catalog
            .get_course(course_id)
            .ok_or_else(|| ServiceError::not_found("Course", course_id))?;
        Ok(CourseView::from_catalog(&catalog, course))
    }

    /// Educators only; the caller is recorded as the creator
    #[instrument(skip(self, new_course), fields(title = %new_course.title))]
    pub async fn create_course(&self, actor: &Actor, new_course: NewCourse) -> Result<CourseView> {
        let mut catalog = self.catalog.write().await;
        let grant = self
            .policies
            .course_write
            .authorize(actor, &AccessRequest::write(), &catalog)?;

        let course_id = catalog.create_course(new_course, grant.user_id())?;
        info!("Course {} created by {}", course_id, actor);
        course_view(&catalog, course_id)
    }

    /// Creator or staff only
    #[instrument(skip(self, update))]
    pub async fn update_course(
        &self,
        actor: &Actor,
        course_id: CourseId,
        update: CourseUpdate,
    ) -> Result<CourseView> {
        let mut catalog = self.catalog.write().await;
        self.policies.course_write.authorize(
            actor,
            &AccessRequest::write().on_course(course_id),
            &catalog,
        )?;

        catalog.update_course(course_id, update)?;
        course_view(&catalog, course_id)
    }

    /// Creator or staff only; drops the course's lessons and subscriptions
    #[instrument(skip(self))]
    pub async fn delete_course(&self, actor: &Actor, course_id: CourseId) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        self.policies.course_write.authorize(
            actor,
            &AccessRequest::write().on_course(course_id),
            &catalog,
        )?;

        let course = catalog.delete_course(course_id)?;
        info!("Course {} ({}) deleted by {}", course.id, course.title, actor);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lessons
    // ------------------------------------------------------------------

    /// Lessons of one course (ordered) or of every course. Open to anyone.
    pub async fn list_lessons(&self, course_id: Option<CourseId>) -> Vec<Lesson> {
        let catalog = self.catalog.read().await;
        match course_id {
            Some(course_id) => catalog
                .course_lessons(course_id)
                .into_iter()
                .cloned()
                .collect(),
            None => catalog.lessons().into_iter().cloned().collect(),
        }
    }

    pub async fn get_lesson(&self, lesson_id: LessonId) -> Result<Lesson> {
        let catalog = self.catalog.read().await;
        catalog
            .get_lesson(lesson_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Lesson", lesson_id))
    }

    /// Educator owning the target course
    #[instrument(skip(self, new_lesson), fields(course_id = new_lesson.course_id))]
    pub async fn create_lesson(&self, actor: &Actor, new_lesson: NewLesson) -> Result<Lesson> {
        let mut catalog = self.catalog.write().await;
        self.policies.course_write.authorize(
            actor,
            &AccessRequest::write().on_course(new_lesson.course_id),
            &catalog,
        )?;

        let lesson_id = catalog.add_lesson(new_lesson)?;
        lesson(&catalog, lesson_id)
    }

    /// Educator owning the lesson's course, and the destination course when
    /// the lesson moves
    #[instrument(skip(self, update))]
    pub async fn update_lesson(
        &self,
        actor: &Actor,
        lesson_id: LessonId,
        update: LessonUpdate,
    ) -> Result<Lesson> {
        let mut catalog = self.catalog.write().await;
        let current_course = lesson(&catalog, lesson_id)?.course_id;
        self.authorize_lesson_write(actor, current_course, &catalog)?;
        if let Some(target) = update.course_id.filter(|&id| id != current_course) {
            self.authorize_lesson_write(actor, target, &catalog)?;
        }

        catalog.update_lesson(lesson_id, update)?;
        lesson(&catalog, lesson_id)
    }

    #[instrument(skip(self))]
    pub async fn delete_lesson(&self, actor: &Actor, lesson_id: LessonId) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        let course_id = lesson(&catalog, lesson_id)?.course_id;
        self.authorize_lesson_write(actor, course_id, &catalog)?;

        catalog.delete_lesson(lesson_id)?;
        Ok(())
    }

    fn authorize_lesson_write(
        &self,
        actor: &Actor,
        course_id: CourseId,
        catalog: &CatalogIndex,
    ) -> Result<Grant> {
        Ok(self.policies.course_write.authorize(
            actor,
            &AccessRequest::write().on_course(course_id),
            catalog,
        )?)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub async fn list_tags(&self) -> Vec<Tag> {
        let catalog = self.catalog.read().await;
        catalog.tags().into_iter().cloned().collect()
    }

    /// Any authenticated user
    #[instrument(skip(self))]
    pub async fn create_tag(&self, actor: &Actor, name: &str) -> Result<Tag> {
        let mut catalog = self.catalog.write().await;
        self.policies
            .tag_write
            .authorize(actor, &AccessRequest::write(), &catalog)?;

        let tag_id = catalog.create_tag(name)?;
        catalog
            .get_tag(tag_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Tag", tag_id))
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Students only. Unknown course is 404, a repeat subscription 400.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, actor: &Actor, course_id: CourseId) -> Result<SubscribeResponse> {
        let mut catalog = self.catalog.write().await;
        let grant = self.policies.subscribe.authorize(
            actor,
            &AccessRequest::write().on_course(course_id),
            &catalog,
        )?;
        if catalog.get_course(course_id).is_none() {
            return Err(ServiceError::not_found("Course", course_id));
        }

        let student_id = student_of(&grant)?;
        let subscription_id = catalog.subscribe(student_id, course_id)?;
        info!("Student {} subscribed to course {}", student_id, course_id);
        Ok(SubscribeResponse {
            detail: "Subscribed successfully.".to_string(),
            subscription_id,
        })
    }

    /// The caller's own subscriptions; empty for non-students
    pub async fn list_subscriptions(&self, actor: &Actor) -> Result<Vec<Subscription>> {
        let catalog = self.catalog.read().await;
        let grant = self
            .policies
            .subscriptions
            .authorize(actor, &AccessRequest::read(), &catalog)?;

        if !grant.actor().is_student() {
            return Ok(Vec::new());
        }
        let student_id = student_of(&grant)?;
        Ok(catalog
            .student_subscriptions(student_id)
            .into_iter()
            .copied()
            .collect())
    }

    /// Courses the calling student subscribes to, in subscription order
    pub async fn my_courses(&self, actor: &Actor) -> Result<Vec<CourseView>> {
        let catalog = self.catalog.read().await;
        let grant = self
            .policies
            .student_area
            .authorize(actor, &AccessRequest::read(), &catalog)?;

        let student_id = student_of(&grant)?;
        Ok(catalog
            .student_subscriptions(student_id)
            .into_iter()
            .filter_map(|sub| catalog.get_course(sub.course_id))
            .map(|course| CourseView::from_catalog(&catalog, course))
            .collect())
    }

    /// Ordered lessons of a course the calling student subscribes to
    pub async fn my_course_lessons(&self, actor: &Actor, course_id: CourseId) -> Result<Vec<Lesson>> {
        let catalog = self.catalog.read().await;
        self.policies.course_lessons.authorize(
            actor,
            &AccessRequest::read().on_course(course_id),
            &catalog,
        )?;

        Ok(catalog
            .course_lessons(course_id)
            .into_iter()
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Recommendations
    // ------------------------------------------------------------------

    /// Up to `max_results` courses for the calling student.
    ///
    /// The whole call is bounded by the configured budget, lock wait and
    /// authorization included, and fails with `Timeout` (504) when it runs
    /// out. Scoring runs on the blocking pool against an owned read guard
    /// taken inside the budget, so a call that timed out while waiting never
    /// holds the lock.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn recommended_courses(&self, actor: &Actor) -> Result<Vec<RecommendedCourse>> {
        let start_time = Instant::now();

        let work = async {
            let catalog = Arc::clone(&self.catalog).read_owned().await;
            let grant = self
                .policies
                .recommend
                .authorize(actor, &AccessRequest::read(), &catalog)?;
            let student_id = student_of(&grant)?;

            let recommender = Arc::clone(&self.recommender);
            let recommendations =
                tokio::task::spawn_blocking(move || -> Result<Vec<RecommendedCourse>> {
                    let candidates = recommender.recommend(&*catalog, student_id)?;
                    Ok(candidates
                        .into_iter()
                        .filter_map(|c| RecommendedCourse::from_candidate(&catalog, c))
                        .collect())
                })
                .await
                .map_err(|e| {
                    ServiceError::Internal(format!("recommendation task failed: {e}"))
                })??;
            Ok::<_, ServiceError>((student_id, recommendations))
        };

        let (student_id, recommendations) =
            match tokio::time::timeout(self.recommend_timeout(), work).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        "Recommendation for {} exceeded {} ms",
                        actor, self.recommend_timeout_ms
                    );
                    return Err(ServiceError::Timeout {
                        timeout_ms: self.recommend_timeout_ms,
                    });
                }
            };

        info!(
            "Served {} recommendations to student {} in {:.2?}",
            recommendations.len(),
            student_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }
}

fn course_view(catalog: &CatalogIndex, course_id: CourseId) -> Result<CourseView> {
    let course = catalog
        .get_course(course_id)
        .ok_or_else(|| ServiceError::not_found("Course", course_id))?;
    Ok(CourseView::from_catalog(catalog, course))
}

fn lesson(catalog: &CatalogIndex, lesson_id: LessonId) -> Result<Lesson> {
    catalog
        .get_lesson(lesson_id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found("Lesson", lesson_id))
}

/// Student chains always require authentication, so a grant without a user
/// means the chain was misconfigured
fn student_of(grant: &Grant) -> Result<UserId> {
    grant
        .user_id()
        .ok_or_else(|| ServiceError::Internal("grant carries no user".to_string()))
}
