use tempfile::{TempDir, tempdir};

use gradus_config::AlertConfig;
use gradus_core::{Actor, Role, Thesis, User};
use gradus_store::{SqliteStore, Store};

use crate::{AssignThesisRequest, NewUserRequest, ThesisService};

pub(crate) fn service() -> (TempDir, ThesisService<SqliteStore>) {
    let temp = tempdir().expect("tempdir");
    let store = SqliteStore::open(temp.path()).expect("open store");
    (temp, ThesisService::new(store, AlertConfig::default()))
}

pub(crate) fn new_user(name: &str, email: &str, role: Role) -> NewUserRequest {
    NewUserRequest {
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        program: "Computer Science".to_owned(),
        cohort: "2024".to_owned(),
        avatar: None,
        hidden_from_ranking: false,
    }
}

pub(crate) fn actor_for(user: &User) -> Actor {
    Actor {
        user_id: user.id.clone(),
        role: user.role,
    }
}

// Advisor "advisor@uni.edu" supervising "student@uni.edu" with the default
// chapter template in place.
pub(crate) fn assigned_thesis(service: &ThesisService<SqliteStore>) -> (Actor, Actor, Thesis) {
    let advisor = service
        .create_user(new_user("Advisor One", "advisor@uni.edu", Role::Advisor))
        .expect("create advisor");
    let student = service
        .create_user(new_user("Student One", "student@uni.edu", Role::Student))
        .expect("create student");

    let advisor_actor = actor_for(&advisor);
    let thesis = service
        .assign_thesis(
            &advisor_actor,
            AssignThesisRequest {
                student_email: "student@uni.edu".to_owned(),
                title: "Compiler Optimization Study".to_owned(),
            },
        )
        .expect("assign thesis");

    (advisor_actor, actor_for(&student), thesis)
}

// Sets the five template chapters to [100, 80, 60, 30, 0]; the rollup lands
// on 54.
pub(crate) fn fill_default_chapters(
    service: &ThesisService<SqliteStore>,
    student: &Actor,
    thesis_id: &str,
) {
    let chapters = service.store().list_chapters(thesis_id).expect("chapters");
    for (chapter, pct) in chapters.iter().zip([100u8, 80, 60, 30, 0]) {
        service
            .update_chapter_percentage(student, &chapter.id, pct)
            .expect("update chapter percentage");
    }
}
