//! CatalogIndex building, mutation and validation.
//!
//! Every mutation validates its input before touching any store, then keeps
//! the secondary indices in step with the primary ones. Bulk loading from a
//! seed file goes through the same mutations.

use crate::error::{CatalogError, Result};
use crate::parser::{self, SeedFile};
use crate::types::*;
use chrono::Utc;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};

impl CatalogIndex {
    /// Load a catalog from a JSON seed file
    ///
    /// Steps:
    /// 1. Parse the seed file
    /// 2. Insert tags, users, courses, lessons and subscriptions in that order
    /// 3. Validate data integrity
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog seed from {:?}", path);
        let seed = parser::parse_seed_file(path)?;
        let index = Self::from_seed(seed)?;

        let counts = index.counts();
        info!(
            "Loaded {} users, {} tags, {} courses, {} lessons, {} subscriptions",
            counts.users, counts.tags, counts.courses, counts.lessons, counts.subscriptions
        );
        Ok(index)
    }

    /// Build a catalog from an already-parsed seed.
    ///
    /// Seed rows reference each other by name (tag names, user emails, course
    /// titles). A course title that appears twice resolves to the first one.
    /// Tags named by a course but not declared up front are created.
    pub fn from_seed(seed: SeedFile) -> Result<Self> {
        let mut index = CatalogIndex::new();

        for name in &seed.tags {
            index.tag_id_or_insert(name)?;
        }

        for user in seed.users {
            index.register_user(user)?;
        }

        let mut course_ids_by_title: HashMap<String, CourseId> = HashMap::new();
        for course in seed.courses {
            let created_by = match &course.created_by {
                Some(email) => Some(
                    index
                        .get_user_by_email(email)
                        .map(|u| u.id)
                        .ok_or_else(|| CatalogError::UnknownName {
                            entity: "user".to_string(),
                            name: email.clone(),
                        })?,
                ),
                None => None,
            };

            let mut tag_ids = Vec::with_capacity(course.tags.len());
            for name in &course.tags {
                tag_ids.push(index.tag_id_or_insert(name)?);
            }

            let description = course
                .description
                .unwrap_or_else(|| default_description(&course.title));
            let title = course.title.clone();
            let id = index.create_course(
                NewCourse {
                    title: course.title,
                    description,
                    category: course.category,
                    tags: tag_ids,
                    course_image: course.course_image,
                },
                created_by,
            )?;
            course_ids_by_title.entry(title).or_insert(id);
        }

        let resolve_course = |title: &str| -> Result<CourseId> {
            course_ids_by_title
                .get(title)
                .copied()
                .ok_or_else(|| CatalogError::UnknownName {
                    entity: "course".to_string(),
                    name: title.to_string(),
                })
        };

        for lesson in seed.lessons {
            let course_id = resolve_course(&lesson.course)?;
            index.add_lesson(NewLesson {
                course_id,
                title: lesson.title,
                content: lesson.content,
                lesson_number: lesson.lesson_number,
            })?;
        }

        for sub in seed.subscriptions {
            let course_id = resolve_course(&sub.course)?;
            let student_id = index
                .get_user_by_email(&sub.student)
                .map(|u| u.id)
                .ok_or_else(|| CatalogError::UnknownName {
                    entity: "user".to_string(),
                    name: sub.student.clone(),
                })?;
            index.subscribe(student_id, course_id)?;
        }

        index.validate()?;
        Ok(index)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a user and create the profile matching their role
    #[instrument(skip(self, new_user), fields(role = %new_user.role))]
    pub fn register_user(&mut self, new_user: NewUser) -> Result<UserId> {
        let email = validate_email(&new_user.email)?;
        if self.users_by_email.contains_key(&email) {
            return Err(CatalogError::DuplicateEmail { email });
        }
        let full_name = required_text("full_name", &new_user.full_name, MAX_TITLE_LEN)?;

        let id = self.next_ids.user;
        self.next_ids.user += 1;

        match new_user.role {
            Role::Student => {
                self.students.insert(
                    id,
                    StudentProfile {
                        user_id: id,
                        full_name,
                        profile_image: new_user.profile_image,
                    },
                );
            }
            Role::Educator => {
                self.educators.insert(
                    id,
                    EducatorProfile {
                        user_id: id,
                        full_name,
                        bio: new_user.bio.unwrap_or_default(),
                        specialization: new_user.specialization,
                        profile_image: new_user.profile_image,
                    },
                );
            }
        }

        self.users_by_email.insert(email.clone(), id);
        self.users.insert(
            id,
            User {
                id,
                email,
                role: new_user.role,
                is_active: true,
                is_staff: new_user.is_staff,
                joined_at: Utc::now(),
            },
        );

        debug!("Registered user {}", id);
        Ok(id)
    }

    /// Activate or deactivate an account. Inactive accounts keep their data.
    pub fn set_user_active(&mut self, user_id: UserId, active: bool) -> Result<()> {
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| CatalogError::missing("User", user_id))?;
        user.is_active = active;
        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Create a tag. Names are trimmed and must be unique.
    pub fn create_tag(&mut self, name: &str) -> Result<TagId> {
        let name = required_text("tag", name, MAX_TAG_NAME_LEN)?;
        if self.tags_by_name.contains_key(&name) {
            return Err(CatalogError::DuplicateTag { name });
        }

        let id = self.next_ids.tag;
        self.next_ids.tag += 1;
        self.tags_by_name.insert(name.clone(), id);
        self.tags.insert(id, Tag { id, name });
        Ok(id)
    }

    /// Get-or-create by name, used by the seed loader
    pub(crate) fn tag_id_or_insert(&mut self, name: &str) -> Result<TagId> {
        match self.tags_by_name.get(name.trim()) {
            Some(&id) => Ok(id),
            None => self.create_tag(name),
        }
    }

    // =========================================================================
    // Courses
    // =========================================================================

    /// Create a course. `created_by`, when given, must be an educator.
    #[instrument(skip(self, new_course), fields(category = %new_course.category))]
    pub fn create_course(
        &mut self,
        new_course: NewCourse,
        created_by: Option<UserId>,
    ) -> Result<CourseId> {
        let title = required_text("title", &new_course.title, MAX_TITLE_LEN)?;
        let category = required_text("category", &new_course.category, MAX_CATEGORY_LEN)?;
        let tags = self.resolve_tag_ids(&new_course.tags)?;
        if let Some(educator_id) = created_by {
            if !self.educators.contains_key(&educator_id) {
                return Err(CatalogError::missing("Educator", educator_id));
            }
        }

        let id = self.next_ids.course;
        self.next_ids.course += 1;

        self.category_index
            .entry(category.clone())
            .or_default()
            .insert(id);
        self.courses.insert(
            id,
            Course {
                id,
                title,
                description: new_course.description,
                category,
                tags,
                created_by,
                created_at: Utc::now(),
                course_image: new_course.course_image,
            },
        );

        debug!("Created course {}", id);
        Ok(id)
    }

    /// Apply a partial update. Validation happens before any field changes.
    pub fn update_course(&mut self, course_id: CourseId, update: CourseUpdate) -> Result<()> {
        if !self.courses.contains_key(&course_id) {
            return Err(CatalogError::missing("Course", course_id));
        }

        let title = update
            .title
            .as_deref()
            .map(|t| required_text("title", t, MAX_TITLE_LEN))
            .transpose()?;
        let category = update
            .category
            .as_deref()
            .map(|c| required_text("category", c, MAX_CATEGORY_LEN))
            .transpose()?;
        let tags = update
            .tags
            .as_deref()
            .map(|ids| self.resolve_tag_ids(ids))
            .transpose()?;

        let Some(course) = self.courses.get_mut(&course_id) else {
            return Err(CatalogError::missing("Course", course_id));
        };

        if let Some(title) = title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(tags) = tags {
            course.tags = tags;
        }
        if let Some(image) = update.course_image {
            course.course_image = Some(image);
        }
        if let Some(category) = category {
            if category != course.category {
                let old = std::mem::replace(&mut course.category, category.clone());
                remove_from_category(&mut self.category_index, &old, course_id);
                self.category_index
                    .entry(category)
                    .or_default()
                    .insert(course_id);
            }
        }
        Ok(())
    }

    /// Delete a course together with its lessons and subscriptions
    #[instrument(skip(self))]
    pub fn delete_course(&mut self, course_id: CourseId) -> Result<Course> {
        let course = self
            .courses
            .remove(&course_id)
            .ok_or_else(|| CatalogError::missing("Course", course_id))?;
        remove_from_category(&mut self.category_index, &course.category, course_id);

        if let Some(lesson_ids) = self.course_lessons.remove(&course_id) {
            for id in lesson_ids {
                self.lessons.remove(&id);
            }
        }

        let dropped: Vec<Subscription> = self
            .subscriptions
            .values()
            .filter(|s| s.course_id == course_id)
            .copied()
            .collect();
        for sub in &dropped {
            self.subscriptions.remove(&sub.id);
            self.subscription_pairs.remove(&(sub.student_id, sub.course_id));
            if let Some(ids) = self.student_subscriptions.get_mut(&sub.student_id) {
                ids.retain(|id| *id != sub.id);
            }
        }

        debug!(
            "Deleted course {} ({} subscriptions dropped)",
            course_id,
            dropped.len()
        );
        Ok(course)
    }

    fn resolve_tag_ids(&self, ids: &[TagId]) -> Result<BTreeSet<TagId>> {
        ids.iter()
            .map(|id| {
                if self.tags.contains_key(id) {
                    Ok(*id)
                } else {
                    Err(CatalogError::missing("Tag", *id))
                }
            })
            .collect()
    }

    // =========================================================================
    // Lessons
    // =========================================================================

    pub fn add_lesson(&mut self, new_lesson: NewLesson) -> Result<LessonId> {
        if !self.courses.contains_key(&new_lesson.course_id) {
            return Err(CatalogError::missing("Course", new_lesson.course_id));
        }
        let title = required_text("title", &new_lesson.title, MAX_TITLE_LEN)?;

        let id = self.next_ids.lesson;
        self.next_ids.lesson += 1;

        self.course_lessons
            .entry(new_lesson.course_id)
            .or_default()
            .push(id);
        self.lessons.insert(
            id,
            Lesson {
                id,
                course_id: new_lesson.course_id,
                title,
                content: new_lesson.content,
                lesson_number: new_lesson.lesson_number,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    /// Apply a partial update; moving a lesson to another course is allowed
    pub fn update_lesson(&mut self, lesson_id: LessonId, update: LessonUpdate) -> Result<()> {
        if !self.lessons.contains_key(&lesson_id) {
            return Err(CatalogError::missing("Lesson", lesson_id));
        }
        if let Some(course_id) = update.course_id {
            if !self.courses.contains_key(&course_id) {
                return Err(CatalogError::missing("Course", course_id));
            }
        }
        let title = update
            .title
            .as_deref()
            .map(|t| required_text("title", t, MAX_TITLE_LEN))
            .transpose()?;

        let Some(lesson) = self.lessons.get_mut(&lesson_id) else {
            return Err(CatalogError::missing("Lesson", lesson_id));
        };
        if let Some(title) = title {
            lesson.title = title;
        }
        if let Some(content) = update.content {
            lesson.content = content;
        }
        if let Some(number) = update.lesson_number {
            lesson.lesson_number = number;
        }
        if let Some(course_id) = update.course_id {
            if course_id != lesson.course_id {
                let old = std::mem::replace(&mut lesson.course_id, course_id);
                if let Some(ids) = self.course_lessons.get_mut(&old) {
                    ids.retain(|id| *id != lesson_id);
                }
                self.course_lessons.entry(course_id).or_default().push(lesson_id);
            }
        }
        Ok(())
    }

    pub fn delete_lesson(&mut self, lesson_id: LessonId) -> Result<Lesson> {
        let lesson = self
            .lessons
            .remove(&lesson_id)
            .ok_or_else(|| CatalogError::missing("Lesson", lesson_id))?;
        if let Some(ids) = self.course_lessons.get_mut(&lesson.course_id) {
            ids.retain(|id| *id != lesson_id);
        }
        Ok(lesson)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Subscribe a student to a course. Subscriptions are never mutated.
    #[instrument(skip(self))]
    pub fn subscribe(&mut self, student_id: UserId, course_id: CourseId) -> Result<SubscriptionId> {
        if !self.students.contains_key(&student_id) {
            return Err(CatalogError::missing("Student", student_id));
        }
        if !self.courses.contains_key(&course_id) {
            return Err(CatalogError::missing("Course", course_id));
        }
        if !self.subscription_pairs.insert((student_id, course_id)) {
            return Err(CatalogError::AlreadySubscribed {
                student_id,
                course_id,
            });
        }

        let id = self.next_ids.subscription;
        self.next_ids.subscription += 1;
        self.student_subscriptions
            .entry(student_id)
            .or_default()
            .push(id);
        self.subscriptions.insert(
            id,
            Subscription {
                id,
                student_id,
                course_id,
                subscribed_at: Utc::now(),
            },
        );
        Ok(id)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate data integrity
    ///
    /// Check that:
    /// - every course has a non-empty category and only existing tags
    /// - every lesson belongs to an existing course
    /// - every subscription references an existing student and course
    pub fn validate(&self) -> Result<()> {
        self.courses.par_iter().try_for_each(|(&id, course)| {
            if course.category.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "course {} has an empty category",
                    id
                )));
            }
            match course.tags.iter().find(|t| !self.tags.contains_key(*t)) {
                Some(&tag_id) => Err(CatalogError::missing("Tag", tag_id)),
                None => Ok(()),
            }
        })?;

        self.lessons.par_iter().try_for_each(|(_, lesson)| {
            if self.courses.contains_key(&lesson.course_id) {
                Ok(())
            } else {
                Err(CatalogError::missing("Course", lesson.course_id))
            }
        })?;

        for sub in self.subscriptions.values() {
            if !self.students.contains_key(&sub.student_id) {
                return Err(CatalogError::missing("Student", sub.student_id));
            }
            if !self.courses.contains_key(&sub.course_id) {
                return Err(CatalogError::missing("Course", sub.course_id));
            }
        }
        if self.subscription_pairs.len() != self.subscriptions.len() {
            return Err(CatalogError::ValidationError(
                "duplicate (student, course) subscription pair".to_string(),
            ));
        }
        Ok(())
    }
}

fn remove_from_category(
    category_index: &mut HashMap<String, BTreeSet<CourseId>>,
    category: &str,
    course_id: CourseId,
) {
    if let Some(ids) = category_index.get_mut(category) {
        ids.remove(&course_id);
        if ids.is_empty() {
            category_index.remove(category);
        }
    }
}

/// Description used for seed courses that don't carry one
fn default_description(title: &str) -> String {
    format!(
        "This course covers {} with practical examples.",
        title.to_lowercase()
    )
}

/// Trim and check a required text field against its maximum length
fn required_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_len {
        return Err(CatalogError::invalid(field, value));
    }
    Ok(trimmed.to_string())
}

/// Normalize an email and check its basic shape: one `@`, non-empty local
/// part, a dotted domain and no whitespace
fn validate_email(email: &str) -> Result<String> {
    let normalized = normalize_email(email);
    let valid = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !normalized.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(normalized)
    } else {
        Err(CatalogError::invalid("email", email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            role: Role::Student,
            full_name: "Test Student".to_string(),
            profile_image: None,
            bio: None,
            specialization: None,
            is_staff: false,
        }
    }

    fn course(title: &str, category: &str, tags: Vec<TagId>) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
            tags,
            course_image: None,
        }
    }

    #[test]
    fn test_register_normalizes_email_domain() {
        let mut index = CatalogIndex::new();
        let id = index.register_user(student("Ada@Example.COM")).unwrap();

        assert_eq!(index.get_user(id).unwrap().email, "Ada@example.com");
        assert!(index.get_user_by_email("Ada@EXAMPLE.com").is_some());
        assert!(index.get_student(id).is_some());
        assert!(index.get_educator(id).is_none());
    }

    #[test]
    fn test_register_rejects_duplicate_and_malformed_email() {
        let mut index = CatalogIndex::new();
        index.register_user(student("ada@example.com")).unwrap();

        let dup = index.register_user(student("ada@EXAMPLE.com"));
        assert!(matches!(dup, Err(CatalogError::DuplicateEmail { .. })));

        for bad in ["", "no-at-sign", "@example.com", "ada@localhost", "a b@example.com"] {
            assert!(
                index.register_user(student(bad)).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_course_requires_category_and_known_tags() {
        let mut index = CatalogIndex::new();
        let python = index.create_tag("Python").unwrap();

        let empty = index.create_course(course("Intro", "  ", vec![python]), None);
        assert!(matches!(empty, Err(CatalogError::InvalidValue { .. })));

        let unknown = index.create_course(course("Intro", "programming", vec![99]), None);
        assert!(matches!(unknown, Err(CatalogError::MissingReference { .. })));

        let id = index
            .create_course(course("Intro", "programming", vec![python]), None)
            .unwrap();
        assert_eq!(index.courses_in_category("programming").collect::<Vec<_>>(), vec![id]);
        assert_eq!(index.counts().courses, 1);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut index = CatalogIndex::new();
        index.create_tag("Python").unwrap();
        assert!(matches!(
            index.create_tag(" Python "),
            Err(CatalogError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn test_update_course_moves_category_index() {
        let mut index = CatalogIndex::new();
        let id = index
            .create_course(course("Intro", "programming", vec![]), None)
            .unwrap();

        index
            .update_course(
                id,
                CourseUpdate {
                    category: Some("web".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(index.courses_in_category("programming").count(), 0);
        assert_eq!(index.courses_in_category("web").collect::<Vec<_>>(), vec![id]);
        assert_eq!(index.categories(), vec!["web"]);
    }

    #[test]
    fn test_subscribe_is_unique_per_pair() {
        let mut index = CatalogIndex::new();
        let s = index.register_user(student("s@example.com")).unwrap();
        let c = index.create_course(course("Intro", "ai", vec![]), None).unwrap();

        index.subscribe(s, c).unwrap();
        assert!(index.is_subscribed(s, c));
        assert!(matches!(
            index.subscribe(s, c),
            Err(CatalogError::AlreadySubscribed { .. })
        ));
        assert_eq!(index.student_subscriptions(s).len(), 1);
    }

    #[test]
    fn test_lessons_ordered_by_number() {
        let mut index = CatalogIndex::new();
        let c = index.create_course(course("Intro", "ai", vec![]), None).unwrap();
        for (title, number) in [("Third", 3), ("First", 1), ("Second", 2)] {
            index
                .add_lesson(NewLesson {
                    course_id: c,
                    title: title.to_string(),
                    content: String::new(),
                    lesson_number: number,
                })
                .unwrap();
        }

        let titles: Vec<&str> = index
            .course_lessons(c)
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_delete_course_cascades() {
        let mut index = CatalogIndex::new();
        let s = index.register_user(student("s@example.com")).unwrap();
        let c = index.create_course(course("Intro", "ai", vec![]), None).unwrap();
        index
            .add_lesson(NewLesson {
                course_id: c,
                title: "One".to_string(),
                content: String::new(),
                lesson_number: 1,
            })
            .unwrap();
        index.subscribe(s, c).unwrap();

        index.delete_course(c).unwrap();

        assert!(index.get_course(c).is_none());
        assert!(index.course_lessons(c).is_empty());
        assert!(!index.is_subscribed(s, c));
        assert!(index.student_subscriptions(s).is_empty());
        assert!(index.categories().is_empty());
        index.validate().unwrap();
    }
}
