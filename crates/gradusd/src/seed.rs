use std::path::Path;

use anyhow::{Context, Result, bail};

use gradus_core::{Actor, DAY_MS, Role, User, now_millis};
use gradus_service::{
    AssignThesisRequest, CommentCreateRequest, MilestoneCreateRequest, NewUserRequest,
    ThesisService,
};
use gradus_store::{SqliteStore, Store};

const DEMO_ADVISOR_EMAIL: &str = "advisor1@gradus.local";

// A small cohort with one fully fleshed-out thesis, enough to exercise the
// roster, the ranking, and the activity views.
pub fn run(data_root: &Path) -> Result<()> {
    let config = gradus_config::ensure_config(data_root)
        .context("failed to prepare the data directory")?;
    let store = SqliteStore::open(data_root).context("failed to open the store")?;
    let service = ThesisService::new(store, config.alerts);

    if service
        .store()
        .get_user_by_email(DEMO_ADVISOR_EMAIL)?
        .is_some()
    {
        bail!("demo data already present; remove the .gradus directory to reseed");
    }

    let advisor1 = create_user(
        &service,
        "Dr. Maria Gonzalez",
        DEMO_ADVISOR_EMAIL,
        Role::Advisor,
        "PhD in Computer Science",
        "Faculty",
    )?;
    create_user(
        &service,
        "Dr. Carlos Ramirez",
        "advisor2@gradus.local",
        Role::Advisor,
        "MSc in Software Engineering",
        "Faculty",
    )?;
    let ana = create_user(
        &service,
        "Ana Martinez",
        "ana@gradus.local",
        Role::Student,
        "MSc in Computer Science",
        "2024-1",
    )?;
    create_user(
        &service,
        "Luis Hernandez",
        "luis@gradus.local",
        Role::Student,
        "MSc in Computer Science",
        "2024-1",
    )?;
    create_user(
        &service,
        "Carmen Silva",
        "carmen@gradus.local",
        Role::Student,
        "MSc in Software Engineering",
        "2024-2",
    )?;

    let advisor = actor(&advisor1);
    let student = actor(&ana);

    let thesis = service.assign_thesis(
        &advisor,
        AssignThesisRequest {
            student_email: ana.email.clone(),
            title: "Machine Learning for Financial Fraud Detection".to_owned(),
        },
    )?;

    let chapters = service.store().list_chapters(&thesis.id)?;
    for (chapter, pct) in chapters.iter().zip([100u8, 80, 60, 30, 0]) {
        service.update_chapter_percentage(&student, &chapter.id, pct)?;
    }
    service.approve_chapter(&advisor, &chapters[0].id)?;

    for (chapter_index, body) in [
        (
            1,
            "Excellent literature review. Consider adding more references on neural networks.",
        ),
        (
            1,
            "The detection algorithms section is very thorough. Good work!",
        ),
        (
            2,
            "The methodology is well structured. Make sure to detail the cross-validation process.",
        ),
    ] {
        service.create_comment(
            &advisor,
            CommentCreateRequest {
                chapter_id: chapters[chapter_index].id.clone(),
                body: body.to_owned(),
            },
        )?;
    }

    let now = now_millis();
    let planned: [(&str, &str, i64, Option<usize>); 4] = [
        (
            "Complete data analysis",
            "Finish the statistical analysis of the experimental results",
            now + DAY_MS,
            Some(3),
        ),
        (
            "Methodology review with the advisor",
            "Meeting to validate the methodological approach",
            now + 5 * DAY_MS,
            Some(2),
        ),
        (
            "Draft preliminary conclusions",
            "First version of the conclusions based on current results",
            now + 7 * DAY_MS,
            Some(4),
        ),
        (
            "Progress presentation",
            "Present the current results to the academic committee",
            now + 30 * DAY_MS,
            None,
        ),
    ];
    for (title, description, due_at, chapter) in planned {
        service.create_milestone(
            &advisor,
            MilestoneCreateRequest {
                thesis_id: thesis.id.clone(),
                title: title.to_owned(),
                description: Some(description.to_owned()),
                due_at,
                chapter_id: chapter.map(|index| chapters[index].id.clone()),
            },
        )?;
    }

    let approved_intro = service.create_milestone(
        &advisor,
        MilestoneCreateRequest {
            thesis_id: thesis.id.clone(),
            title: "Introduction approved".to_owned(),
            description: Some("Introduction chapter reviewed and approved".to_owned()),
            due_at: now - 30 * DAY_MS,
            chapter_id: Some(chapters[0].id.clone()),
        },
    )?;
    service.toggle_milestone(&student, &approved_intro.id)?;

    tracing::info!(thesis_id = %thesis.id, "demo cohort seeded");
    tracing::info!(advisor_id = %advisor1.id, student_id = %ana.id, "demo identities");

    Ok(())
}

fn create_user(
    service: &ThesisService<SqliteStore>,
    name: &str,
    email: &str,
    role: Role,
    program: &str,
    cohort: &str,
) -> Result<User> {
    let user = service.create_user(NewUserRequest {
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        program: program.to_owned(),
        cohort: cohort.to_owned(),
        avatar: None,
        hidden_from_ranking: false,
    })?;
    tracing::info!(email = %user.email, role = user.role.as_str(), "seeded user");
    Ok(user)
}

fn actor(user: &User) -> Actor {
    Actor {
        user_id: user.id.clone(),
        role: user.role,
    }
}
