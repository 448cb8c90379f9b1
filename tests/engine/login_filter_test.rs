//! Login selector filter tests.

use secret_friend::engine::eligible_login_users;
use secret_friend::participant::Participant;

#[test]
fn login_filter_excludes_participants_who_drew() {
    let group = vec![
        Participant::new(1, "Ana"),
        Participant::drawn(2, "Bob", "Ana"),
        Participant::new(3, "Cid"),
    ];
    let names: Vec<&str> = eligible_login_users(&group)
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ana", "Cid"]);
}

#[test]
fn login_filter_never_includes_drawn() {
    let group = vec![
        Participant::drawn(1, "Ana", "Bob"),
        Participant::drawn(2, "Bob", "Cid"),
        Participant::drawn(3, "Cid", "Ana"),
    ];
    assert!(eligible_login_users(&group).is_empty());
}

#[test]
fn login_filter_empty_group() {
    assert!(eligible_login_users(&[]).is_empty());
}
