//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};

use cadre_core::{
  activity::{AbroadDetail, AbroadPatch, ActivityPatch, NewStudentActivity},
  catalog::{LookupKind, NewField},
  course::{
    CoursePatch, EnrollmentPatch, Grade, NewCourse, NewEnrollment,
    NewGradSchoolActivity,
  },
  error::{EntityKind, Error},
  letter::LetterParent,
  link::{NewAffiliation, NewSupervision, PairLink},
  patch::Patch,
  person::{
    NewPerson, NewPersonRole, NewPhdStudent, NewPostdoc, NewResearcher,
    PostdocPatch, RoleKind,
  },
  project::{NewProject, NewProjectMember, ProjectMemberPatch, ProjectStatus},
  query::{CourseFilter, PersonRoleFilter, ProjectFilter, TermFilter},
  store::{
    ActivityStore, CatalogStore, CourseStore, LetterStore, LinkStore,
    PeopleStore, ProjectStore,
  },
  term::Season,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn person(s: &SqliteStore, first: &str, last: &str, email: &str) -> i64 {
  s.create_person(NewPerson {
    first_name: first.into(),
    last_name:  last.into(),
    email:      email.into(),
  })
  .await
  .unwrap()
  .id
}

async fn role(s: &SqliteStore, person_id: i64, kind: RoleKind) -> i64 {
  s.create_person_role(NewPersonRole {
    person_id,
    kind,
    start_date: None,
    end_date: None,
    notes: None,
  })
  .await
  .unwrap()
  .id
}

fn new_phd(person_role_id: i64) -> NewPhdStudent {
  NewPhdStudent {
    person_role_id,
    cohort_number: None,
    is_affiliated: false,
    department: None,
    discipline: None,
    project_title: None,
    planned_defense_date: None,
    is_graduated: false,
    current_title: None,
    current_organization: None,
    link: None,
    notes: None,
  }
}

fn new_postdoc(person_role_id: i64) -> NewPostdoc {
  NewPostdoc {
    person_role_id,
    cohort_number: None,
    department: None,
    discipline: None,
    project_title: None,
    is_incoming: false,
    is_graduated: false,
    current_title_id: None,
    current_title_other: None,
    current_institution_id: None,
    current_institution_other: None,
    link: None,
    notes: None,
  }
}

/// Creates a person, a PhD-student role and its detail record.
async fn phd_student(s: &SqliteStore, email: &str) -> i64 {
  let person_id = person(s, "Grace", "Hopper", email).await;
  let role_id = role(s, person_id, RoleKind::PhdStudent).await;
  s.create_phd_student(new_phd(role_id)).await.unwrap().id
}

async fn grad_school_activity(s: &SqliteStore, name: &str, year: i32) -> i64 {
  let type_id = s
    .create_lookup(LookupKind::GradSchoolActivityType, name.into())
    .await
    .unwrap()
    .id;
  s.create_grad_school_activity(NewGradSchoolActivity {
    activity_type_id: type_id,
    description: None,
    year,
  })
  .await
  .unwrap()
  .id
}

fn term_course(title: &str, course_term_id: i64) -> NewCourse {
  NewCourse {
    title:                   title.into(),
    course_term_id:          Some(course_term_id),
    grad_school_activity_id: None,
    credit_points:           None,
    notes:                   None,
  }
}

fn activity_course(title: &str, grad_school_activity_id: i64) -> NewCourse {
  NewCourse {
    title:                   title.into(),
    course_term_id:          None,
    grad_school_activity_id: Some(grad_school_activity_id),
    credit_points:           None,
    notes:                   None,
  }
}

fn new_project(call_type_id: i64, number: &str) -> NewProject {
  NewProject {
    call_type_id,
    title: "Untangling Knots".into(),
    project_number: number.into(),
    final_report_submitted: false,
    is_extended: false,
    start_date: None,
    end_date: None,
    notes: None,
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_names_are_unique_per_kind() {
  let s = store().await;
  s.create_lookup(LookupKind::Institution, "Uppsala University".into())
    .await
    .unwrap();

  let err = s
    .create_lookup(LookupKind::Institution, "Uppsala University".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  // The same name under another kind is fine.
  s.create_lookup(LookupKind::Branch, "Uppsala University".into())
    .await
    .unwrap();
}

#[tokio::test]
async fn field_requires_existing_branch() {
  let s = store().await;
  let err = s
    .create_field(NewField {
      name:      "Topology".into(),
      branch_id: 99,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound {
    kind: EntityKind::Branch,
    ..
  }));
}

// ─── Term sequencer ──────────────────────────────────────────────────────────

#[tokio::test]
async fn term_sequencer_cycles_seasons() {
  let s = store().await;
  let mut produced = Vec::new();
  for _ in 0..4 {
    let term = s.next_course_term().await.unwrap();
    assert!(term.is_active);
    produced.push((term.season, term.year));
  }
  assert_eq!(produced, vec![
    (Season::Spring, 2019),
    (Season::Summer, 2019),
    (Season::Fall, 2019),
    (Season::Spring, 2020),
  ]);
}

#[tokio::test]
async fn only_the_latest_term_can_be_deleted() {
  let s = store().await;
  let first = s.next_course_term().await.unwrap();
  let second = s.next_course_term().await.unwrap();

  let err = s.delete_course_term(first.id).await.unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));

  s.delete_course_term(second.id).await.unwrap();
  // With the newest gone, the first term is deletable again.
  s.delete_course_term(first.id).await.unwrap();
  assert!(s.list_course_terms(TermFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn referenced_term_cannot_be_deleted() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  s.create_course(term_course("Scientific Writing", term.id))
    .await
    .unwrap();

  let err = s.delete_course_term(term.id).await.unwrap_err();
  assert!(matches!(err, Error::HasDependents {
    kind: EntityKind::CourseTerm,
    ..
  }));
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_email_is_unique() {
  let s = store().await;
  person(&s, "Ada", "Lovelace", "ada@example.org").await;

  let err = s
    .create_person(NewPerson {
      first_name: "Adelaide".into(),
      last_name:  "Lovelace".into(),
      email:      "ada@example.org".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));
}

#[tokio::test]
async fn role_activity_derives_from_end_date() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;

  let ended = s
    .create_person_role(NewPersonRole {
      person_id,
      kind: RoleKind::Researcher,
      start_date: None,
      end_date: Some(Utc::now() - Duration::days(30)),
      notes: None,
    })
    .await
    .unwrap();
  assert!(!ended.is_active);

  let open = s
    .create_person_role(NewPersonRole {
      person_id,
      kind: RoleKind::Researcher,
      start_date: None,
      end_date: None,
      notes: None,
    })
    .await
    .unwrap();
  assert!(open.is_active);

  let active = s
    .list_person_roles(PersonRoleFilter {
      is_active: Some(true),
      ..PersonRoleFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, open.id);
}

#[tokio::test]
async fn detail_record_requires_matching_role_kind() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let researcher_role = role(&s, person_id, RoleKind::Researcher).await;

  let err = s
    .create_phd_student(new_phd(researcher_role))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));
}

#[tokio::test]
async fn one_detail_record_per_role() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let role_id = role(&s, person_id, RoleKind::PhdStudent).await;
  s.create_phd_student(new_phd(role_id)).await.unwrap();

  let err = s.create_phd_student(new_phd(role_id)).await.unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));
}

#[tokio::test]
async fn person_with_roles_cannot_be_deleted() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Researcher).await;

  let err = s.delete_person(person_id).await.unwrap_err();
  assert!(matches!(err, Error::HasDependents {
    kind: EntityKind::Person,
    ..
  }));

  s.delete_person_role(role_id).await.unwrap();
  s.delete_person(person_id).await.unwrap();
}

#[tokio::test]
async fn postdoc_patch_distinguishes_clear_from_keep() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Postdoc).await;
  let postdoc = s
    .create_postdoc(NewPostdoc {
      department: Some("Mathematics".into()),
      current_title_other: Some("Lecturer".into()),
      ..new_postdoc(role_id)
    })
    .await
    .unwrap();

  let updated = s
    .update_postdoc(postdoc.id, PostdocPatch {
      current_title_other: Patch::Clear,
      current_institution_other: Patch::Set("Analytical Engines Ltd".into()),
      ..PostdocPatch::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.current_title_other, None);
  assert_eq!(
    updated.current_institution_other.as_deref(),
    Some("Analytical Engines Ltd")
  );
  // Fields the patch omitted stay put.
  assert_eq!(updated.department.as_deref(), Some("Mathematics"));
}

#[tokio::test]
async fn supervision_rejects_self_and_duplicates() {
  let s = store().await;
  let supervisor = person(&s, "Alan", "Turing", "alan@example.org").await;
  let student = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let supervisor_role = role(&s, supervisor, RoleKind::Researcher).await;
  let student_role = role(&s, student, RoleKind::PhdStudent).await;

  let err = s
    .add_supervision(NewSupervision {
      supervisor_role_id: supervisor_role,
      student_role_id:    supervisor_role,
      is_main:            false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));

  s.add_supervision(NewSupervision {
    supervisor_role_id: supervisor_role,
    student_role_id:    student_role,
    is_main:            true,
  })
  .await
  .unwrap();

  let err = s
    .add_supervision(NewSupervision {
      supervisor_role_id: supervisor_role,
      student_role_id:    student_role,
      is_main:            false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));
}

#[tokio::test]
async fn affiliation_dates_must_be_ordered() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Researcher).await;
  let institution = s
    .create_lookup(LookupKind::Institution, "Uppsala University".into())
    .await
    .unwrap();

  let now = Utc::now();
  let err = s
    .add_affiliation(role_id, NewAffiliation {
      institution_id: institution.id,
      start_date:     Some(now),
      end_date:       Some(now - Duration::days(1)),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));

  s.add_affiliation(role_id, NewAffiliation {
    institution_id: institution.id,
    start_date:     Some(now - Duration::days(365)),
    end_date:       None,
  })
  .await
  .unwrap();

  // The institution is now referenced and cannot be deleted.
  let err = s
    .delete_lookup(LookupKind::Institution, institution.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::HasDependents {
    kind: EntityKind::Institution,
    ..
  }));
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn course_needs_exactly_one_anchor() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  let activity = grad_school_activity(&s, "Summer School", 2019).await;

  let err = s
    .create_course(NewCourse {
      title:                   "Ethics".into(),
      course_term_id:          Some(term.id),
      grad_school_activity_id: Some(activity),
      credit_points:           None,
      notes:                   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));

  let err = s
    .create_course(NewCourse {
      title:                   "Ethics".into(),
      course_term_id:          None,
      grad_school_activity_id: None,
      credit_points:           None,
      notes:                   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));
}

#[tokio::test]
async fn course_titles_are_unique_per_anchor() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  let activity = grad_school_activity(&s, "Summer School", 2019).await;
  s.create_course(term_course("Ethics", term.id)).await.unwrap();

  let err = s
    .create_course(term_course("Ethics", term.id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  // The same title under a different anchor is a different course.
  s.create_course(activity_course("Ethics", activity))
    .await
    .unwrap();
}

#[tokio::test]
async fn courses_list_newest_first_across_anchor_kinds() {
  let s = store().await;
  let spring19 = s.next_course_term().await.unwrap();
  let _summer19 = s.next_course_term().await.unwrap();
  let fall19 = s.next_course_term().await.unwrap();
  let spring20 = s.next_course_term().await.unwrap();
  let activity19 = grad_school_activity(&s, "Winter Retreat", 2019).await;

  let a = s
    .create_course(term_course("Spring Seminar", spring19.id))
    .await
    .unwrap();
  let b = s
    .create_course(activity_course("Retreat Workshop", activity19))
    .await
    .unwrap();
  let c = s
    .create_course(term_course("Fall Seminar", fall19.id))
    .await
    .unwrap();
  let d = s
    .create_course(term_course("Next Spring Seminar", spring20.id))
    .await
    .unwrap();

  let listed = s.list_courses(CourseFilter::default()).await.unwrap();
  let ids = listed.iter().map(|course| course.id).collect::<Vec<_>>();
  // 2020 first, then fall 2019; the activity course ranks with spring of
  // its year and ties break on id.
  assert_eq!(ids, vec![d.id, c.id, a.id, b.id]);
}

#[tokio::test]
async fn course_update_can_switch_anchors() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  let activity = grad_school_activity(&s, "Summer School", 2019).await;
  let course = s.create_course(term_course("Ethics", term.id)).await.unwrap();

  // Setting the other anchor without clearing the first breaks the XOR.
  let err = s
    .update_course(course.id, CoursePatch {
      grad_school_activity_id: Patch::Set(activity),
      ..CoursePatch::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));

  let updated = s
    .update_course(course.id, CoursePatch {
      course_term_id: Patch::Clear,
      grad_school_activity_id: Patch::Set(activity),
      ..CoursePatch::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.course_term_id, None);
  assert_eq!(updated.grad_school_activity_id, Some(activity));
}

#[tokio::test]
async fn enrollment_lifecycle() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  let course = s.create_course(term_course("Ethics", term.id)).await.unwrap();
  let student = phd_student(&s, "grace@example.org").await;

  let enrollment = s
    .enroll_student(course.id, NewEnrollment {
      phd_student_id: student,
      is_completed:   false,
      grade:          None,
    })
    .await
    .unwrap();
  assert!(!enrollment.is_completed);

  let err = s
    .enroll_student(course.id, NewEnrollment {
      phd_student_id: student,
      is_completed:   false,
      grade:          None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  let updated = s
    .update_enrollment(course.id, student, EnrollmentPatch {
      is_completed: Some(true),
      grade:        Patch::Set(Grade::Pass),
    })
    .await
    .unwrap();
  assert!(updated.is_completed);
  assert_eq!(updated.grade, Some(Grade::Pass));

  s.withdraw_student(course.id, student).await.unwrap();
  let err = s.withdraw_student(course.id, student).await.unwrap_err();
  assert!(matches!(err, Error::NotFound {
    kind: EntityKind::Enrollment,
    ..
  }));
}

// ─── Student activities ──────────────────────────────────────────────────────

#[tokio::test]
async fn abroad_activity_backfills_its_own_id() {
  let s = store().await;
  let student = phd_student(&s, "grace@example.org").await;

  let activity = s
    .create_student_activity(
      student,
      NewStudentActivity::Abroad(AbroadDetail {
        city: Some("Uppsala".into()),
        country: Some("Sweden".into()),
        ..AbroadDetail::default()
      }),
    )
    .await
    .unwrap();
  assert_eq!(activity.activity_id, activity.id);

  let fetched = s
    .get_student_activity(activity.id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.activity_id, fetched.id);
  assert_eq!(fetched.detail, activity.detail);
}

#[tokio::test]
async fn grad_school_registration_is_unique_per_activity() {
  let s = store().await;
  let student = phd_student(&s, "grace@example.org").await;
  let activity = grad_school_activity(&s, "Summer School", 2021).await;

  s.create_student_activity(student, NewStudentActivity::GradSchool {
    grad_school_activity_id: activity,
    is_completed:            false,
    grade:                   None,
  })
  .await
  .unwrap();

  let err = s
    .create_student_activity(student, NewStudentActivity::GradSchool {
      grad_school_activity_id: activity,
      is_completed:            true,
      grade:                   Some(Grade::Pass),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));
}

#[tokio::test]
async fn activity_patch_kind_must_match_stored_kind() {
  let s = store().await;
  let student = phd_student(&s, "grace@example.org").await;
  let activity = grad_school_activity(&s, "Summer School", 2021).await;
  let registration = s
    .create_student_activity(student, NewStudentActivity::GradSchool {
      grad_school_activity_id: activity,
      is_completed:            false,
      grade:                   None,
    })
    .await
    .unwrap();

  let err = s
    .update_student_activity(
      registration.id,
      ActivityPatch::Abroad(AbroadPatch::default()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_numbers_are_unique_and_status_derives() {
  let s = store().await;
  let call_type = s
    .create_lookup(LookupKind::ProjectCallType, "Open Call".into())
    .await
    .unwrap();

  let ended = s
    .create_project(NewProject {
      end_date: Some(Utc::now() - Duration::days(90)),
      ..new_project(call_type.id, "P-001")
    })
    .await
    .unwrap();
  assert_eq!(ended.status, ProjectStatus::AwaitingReport);

  let err = s
    .create_project(new_project(call_type.id, "P-001"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  let open = s
    .create_project(new_project(call_type.id, "P-002"))
    .await
    .unwrap();
  assert_eq!(open.status, ProjectStatus::Ongoing);

  let ongoing = s
    .list_projects(ProjectFilter {
      status: Some(ProjectStatus::Ongoing),
      ..ProjectFilter::default()
    })
    .await
    .unwrap();
  assert_eq!(ongoing.len(), 1);
  assert_eq!(ongoing[0].id, open.id);
}

#[tokio::test]
async fn project_membership_lifecycle() {
  let s = store().await;
  let call_type = s
    .create_lookup(LookupKind::ProjectCallType, "Open Call".into())
    .await
    .unwrap();
  let project = s
    .create_project(new_project(call_type.id, "P-001"))
    .await
    .unwrap();
  let person_id = person(&s, "Alan", "Turing", "alan@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Researcher).await;

  let member = s
    .add_project_member(project.id, NewProjectMember {
      person_role_id:            role_id,
      is_principal_investigator: true,
      is_contact_person:         false,
      is_active:                 true,
    })
    .await
    .unwrap();
  assert!(member.is_principal_investigator);

  let err = s
    .add_project_member(project.id, NewProjectMember {
      person_role_id:            role_id,
      is_principal_investigator: false,
      is_contact_person:         false,
      is_active:                 true,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  let updated = s
    .update_project_member(project.id, role_id, ProjectMemberPatch {
      is_contact_person: Some(true),
      ..ProjectMemberPatch::default()
    })
    .await
    .unwrap();
  assert!(updated.is_contact_person);

  s.remove_project_member(project.id, role_id).await.unwrap();
  assert!(s.list_project_members(project.id).await.unwrap().is_empty());
}

// ─── Decision letters ────────────────────────────────────────────────────────

#[tokio::test]
async fn letters_resolve_parents_by_kind_and_id() {
  let s = store().await;
  let person_id = person(&s, "Ada", "Lovelace", "ada@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Researcher).await;
  let call_type = s
    .create_lookup(LookupKind::ProjectCallType, "Open Call".into())
    .await
    .unwrap();
  let project = s
    .create_project(new_project(call_type.id, "P-001"))
    .await
    .unwrap();

  s.add_letter(LetterParent::PersonRole(role_id), "letters/role.pdf".into())
    .await
    .unwrap();
  s.add_letter(LetterParent::Project(project.id), "letters/project.pdf".into())
    .await
    .unwrap();

  // Ids collide across kinds; listings must filter on the pair.
  let role_letters = s
    .list_letters(LetterParent::PersonRole(role_id))
    .await
    .unwrap();
  assert_eq!(role_letters.len(), 1);
  assert_eq!(role_letters[0].link, "letters/role.pdf");

  let err = s
    .add_letter(LetterParent::Course(1), "letters/nope.pdf".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound {
    kind: EntityKind::Course,
    ..
  }));
}

// ─── Pair links ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pair_links_attach_once_and_detach_cleanly() {
  let s = store().await;
  let term = s.next_course_term().await.unwrap();
  let course = s.create_course(term_course("Ethics", term.id)).await.unwrap();
  let institution = s
    .create_lookup(LookupKind::Institution, "Uppsala University".into())
    .await
    .unwrap();

  s.attach(PairLink::CourseInstitution, course.id, institution.id)
    .await
    .unwrap();
  let err = s
    .attach(PairLink::CourseInstitution, course.id, institution.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate(_)));

  let linked = s.course_institutions(course.id).await.unwrap();
  assert_eq!(linked.len(), 1);
  assert_eq!(linked[0].name, "Uppsala University");

  s.detach(PairLink::CourseInstitution, course.id, institution.id)
    .await
    .unwrap();
  let err = s
    .detach(PairLink::CourseInstitution, course.id, institution.id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));

  // Detached pairs can be attached again.
  s.attach(PairLink::CourseInstitution, course.id, institution.id)
    .await
    .unwrap();
}

#[tokio::test]
async fn researcher_detail_needs_existing_titles() {
  let s = store().await;
  let person_id = person(&s, "Alan", "Turing", "alan@example.org").await;
  let role_id = role(&s, person_id, RoleKind::Researcher).await;

  let err = s
    .create_researcher(NewResearcher {
      person_role_id:    role_id,
      title_id:          Some(404),
      original_title_id: None,
      link:              None,
      notes:             None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound {
    kind: EntityKind::ResearcherTitle,
    ..
  }));
}
