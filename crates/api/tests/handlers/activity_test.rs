use std::collections::HashSet;

use scoutplan_api::handlers::activity::ensure_categories_exist;
use scoutplan_core::errors::PlanError;
use uuid::Uuid;

#[test]
fn test_known_categories_pass() {
    let games = Uuid::new_v4();
    let outdoors = Uuid::new_v4();
    let known = HashSet::from([games, outdoors]);

    assert!(ensure_categories_exist(&[games, outdoors], &known).is_ok());
    assert!(ensure_categories_exist(&[], &HashSet::new()).is_ok());
}

#[test]
fn test_unknown_category_is_a_validation_error() {
    let games = Uuid::new_v4();
    let unknown = Uuid::new_v4();
    let known = HashSet::from([games]);

    match ensure_categories_exist(&[games, unknown], &known) {
        Err(PlanError::Validation(message)) => assert!(message.contains(&unknown.to_string())),
        other => panic!("expected validation error, got {:?}", other),
    }
}
