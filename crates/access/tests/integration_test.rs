//! Integration tests for access control.
//!
//! These tests run full policy chains against the bundled seed catalog,
//! the way the service composes them.

use access::policies::*;
use access::{AccessError, AccessRequest, Actor, PolicyChain};
use catalog::CatalogIndex;
use std::path::Path;

fn load_seed() -> anyhow::Result<CatalogIndex> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json");
    Ok(CatalogIndex::load_from_file(&path)?)
}

fn actor(catalog: &CatalogIndex, email: &str) -> Actor {
    Actor::from_user(catalog.get_user_by_email(email).expect("seeded user"))
}

fn course_id(catalog: &CatalogIndex, title: &str) -> u32 {
    catalog
        .courses()
        .into_iter()
        .find(|c| c.title == title)
        .map(|c| c.id)
        .expect("seeded course")
}

#[test]
fn test_course_lessons_chain() -> anyhow::Result<()> {
    let catalog = load_seed()?;
    let chain = PolicyChain::new()
        .add_policy(Authenticated)
        .add_policy(StudentOnly::new("Only students can access lessons."))
        .add_policy(SubscribedToCourse);

    let python = course_id(&catalog, "Learn Python Programming");
    let request = AccessRequest::read().on_course(python);

    let sam = actor(&catalog, "sam@edulearn.dev");
    let grant = chain.authorize(&sam, &request, &catalog)?;
    assert_eq!(grant.user_id(), sam.user_id());

    let lina = actor(&catalog, "lina@edulearn.dev");
    assert!(matches!(
        chain.authorize(&lina, &request, &catalog),
        Err(AccessError::Forbidden { .. })
    ));

    let grace = actor(&catalog, "grace@edulearn.dev");
    let err = chain.authorize(&grace, &request, &catalog).unwrap_err();
    assert_eq!(err.to_string(), "Only students can access lessons.");

    assert_eq!(
        chain.authorize(&Actor::Anonymous, &request, &catalog),
        Err(AccessError::Unauthenticated)
    );
    Ok(())
}

#[test]
fn test_course_write_chain() -> anyhow::Result<()> {
    let catalog = load_seed()?;
    let chain = PolicyChain::new()
        .add_policy(EducatorOrReadOnly)
        .add_policy(CourseOwner);

    let python = course_id(&catalog, "Learn Python Programming");
    let write = AccessRequest::write().on_course(python);

    // grace created the programming courses; alan did not
    assert!(chain.authorize(&actor(&catalog, "grace@edulearn.dev"), &write, &catalog).is_ok());
    assert!(matches!(
        chain.authorize(&actor(&catalog, "alan@edulearn.dev"), &write, &catalog),
        Err(AccessError::Forbidden { .. })
    ));
    assert!(matches!(
        chain.authorize(&actor(&catalog, "sam@edulearn.dev"), &write, &catalog),
        Err(AccessError::Forbidden { .. })
    ));

    // Anyone may read
    let read = AccessRequest::read().on_course(python);
    assert!(chain.authorize(&Actor::Anonymous, &read, &catalog).is_ok());
    Ok(())
}

#[test]
fn test_deactivated_student_is_anonymous() -> anyhow::Result<()> {
    let mut catalog = load_seed()?;
    let sam_id = catalog
        .get_user_by_email("sam@edulearn.dev")
        .map(|u| u.id)
        .expect("seeded user");
    catalog.set_user_active(sam_id, false)?;

    let sam = actor(&catalog, "sam@edulearn.dev");
    assert_eq!(sam, Actor::Anonymous);

    let chain = PolicyChain::new().add_policy(Authenticated);
    assert_eq!(
        chain.authorize(&sam, &AccessRequest::read(), &catalog),
        Err(AccessError::Unauthenticated)
    );
    Ok(())
}
