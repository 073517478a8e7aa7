//! Catalog lookup capability used by the engine.
//!
//! The engine never touches `CatalogIndex` directly; it asks for exactly the
//! three queries it needs. `CatalogIndex` implements them in memory, and tests
//! plug in failing lookups to exercise error propagation.

use crate::types::{BackfillOrder, CourseRecord};
use catalog::{CatalogError, CatalogIndex, CourseId, UserId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

pub trait CatalogLookup: Send + Sync {
    /// Courses the student is subscribed to
    fn subscribed_courses(&self, student_id: UserId) -> catalog::Result<Vec<CourseRecord>>;

    /// Courses in `category` not listed in `excluded`, ascending by id
    fn find_same_category_excluding(
        &self,
        category: &str,
        excluded: &HashSet<CourseId>,
    ) -> catalog::Result<Vec<CourseRecord>>;

    /// Up to `n` course ids from the whole catalog not listed in `excluded`,
    /// picked according to `order`
    fn random_sample_excluding(
        &self,
        excluded: &HashSet<CourseId>,
        n: usize,
        order: BackfillOrder,
    ) -> catalog::Result<Vec<CourseId>>;
}

fn course_record(index: &CatalogIndex, id: CourseId) -> catalog::Result<CourseRecord> {
    let course = index.get_course(id).ok_or_else(|| CatalogError::MissingReference {
        entity: "Course".to_string(),
        id,
    })?;
    Ok(CourseRecord {
        id,
        category: course.category.clone(),
        tags: index.course_tag_names(id),
    })
}

impl CatalogLookup for CatalogIndex {
    fn subscribed_courses(&self, student_id: UserId) -> catalog::Result<Vec<CourseRecord>> {
        self.student_subscriptions(student_id)
            .iter()
            .map(|sub| course_record(self, sub.course_id))
            .collect()
    }

    fn find_same_category_excluding(
        &self,
        category: &str,
        excluded: &HashSet<CourseId>,
    ) -> catalog::Result<Vec<CourseRecord>> {
        self.courses_in_category(category)
            .filter(|id| !excluded.contains(id))
            .map(|id| course_record(self, id))
            .collect()
    }

    fn random_sample_excluding(
        &self,
        excluded: &HashSet<CourseId>,
        n: usize,
        order: BackfillOrder,
    ) -> catalog::Result<Vec<CourseId>> {
        // all_course_ids() is sorted, so the seeded shuffle starts from a
        // stable permutation regardless of HashMap iteration order
        let mut pool: Vec<CourseId> = self
            .all_course_ids()
            .into_iter()
            .filter(|id| !excluded.contains(id))
            .collect();

        if let BackfillOrder::Seeded(seed) = order {
            let mut rng = StdRng::seed_from_u64(seed);
            pool.shuffle(&mut rng);
        }
        pool.truncate(n);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::NewCourse;

    fn create_test_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        let python = index.create_tag("Python").unwrap();
        for (title, category) in [
            ("Learn Python", "programming"),
            ("Intro to ML", "ai"),
            ("DSA", "programming"),
            ("React", "web"),
            ("Java", "programming"),
        ] {
            index
                .create_course(
                    NewCourse {
                        title: title.to_string(),
                        description: String::new(),
                        category: category.to_string(),
                        tags: vec![python],
                        course_image: None,
                    },
                    None,
                )
                .unwrap();
        }
        index
    }

    #[test]
    fn test_find_same_category_excluding() {
        let index = create_test_index();
        let excluded: HashSet<CourseId> = [1].into_iter().collect();

        let records = index
            .find_same_category_excluding("programming", &excluded)
            .unwrap();
        let ids: Vec<CourseId> = records.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![3, 5]);
        assert!(records.iter().all(|r| r.category == "programming"));
        assert!(records[0].tags.contains("Python"));
    }

    #[test]
    fn test_ascending_sample() {
        let index = create_test_index();
        let excluded: HashSet<CourseId> = [1, 2].into_iter().collect();

        let ids = index
            .random_sample_excluding(&excluded, 2, BackfillOrder::Ascending)
            .unwrap();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_seeded_sample_is_reproducible() {
        let index = create_test_index();
        let excluded: HashSet<CourseId> = [1].into_iter().collect();

        let first = index
            .random_sample_excluding(&excluded, 3, BackfillOrder::Seeded(7))
            .unwrap();
        let second = index
            .random_sample_excluding(&excluded, 3, BackfillOrder::Seeded(7))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(!first.contains(&1));
    }

    #[test]
    fn test_sample_exhausts_catalog() {
        let index = create_test_index();
        let excluded: HashSet<CourseId> = [1, 2, 3, 4].into_iter().collect();

        let ids = index
            .random_sample_excluding(&excluded, 10, BackfillOrder::Seeded(1))
            .unwrap();
        assert_eq!(ids, vec![5]);
    }
}
