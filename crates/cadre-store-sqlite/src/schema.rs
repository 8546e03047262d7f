//! SQL schema for the cadre SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` marks the
//! schema revision; future migrations will be gated on it.
//!
//! The UNIQUE/CHECK/FK constraints declared here are the real correctness
//! guarantee for every natural key. The app-level pre-checks in `store/`
//! exist only to produce friendlier errors; two requests racing the same key
//! are settled by these constraints, and the loser surfaces as a generic
//! conflict.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Catalog lookups ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS institutions (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS researcher_titles (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS branches (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS project_call_types (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS grad_school_activity_types (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS fields (
    id         INTEGER PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE,
    branch_id  INTEGER NOT NULL REFERENCES branches(id)
);

-- ── People ──────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS people (
    id          INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS person_roles (
    id          INTEGER PRIMARY KEY,
    person_id   INTEGER NOT NULL REFERENCES people(id),
    kind        TEXT NOT NULL,    -- 'researcher' | 'phd_student' | 'postdoc'
    start_date  TEXT NOT NULL,    -- ISO 8601 UTC
    end_date    TEXT,             -- NULL = open engagement; never stores is_active
    notes       TEXT
);

CREATE TABLE IF NOT EXISTS researchers (
    id                 INTEGER PRIMARY KEY,
    person_role_id     INTEGER NOT NULL UNIQUE REFERENCES person_roles(id),
    title_id           INTEGER REFERENCES researcher_titles(id),
    original_title_id  INTEGER REFERENCES researcher_titles(id),
    link               TEXT,
    notes              TEXT
);

CREATE TABLE IF NOT EXISTS phd_students (
    id                    INTEGER PRIMARY KEY,
    person_role_id        INTEGER NOT NULL UNIQUE REFERENCES person_roles(id),
    cohort_number         INTEGER,
    is_affiliated         INTEGER NOT NULL DEFAULT 0,
    department            TEXT,
    discipline            TEXT,
    project_title         TEXT,
    planned_defense_date  TEXT,
    is_graduated          INTEGER NOT NULL DEFAULT 0,
    current_title         TEXT,
    current_organization  TEXT,
    link                  TEXT,
    notes                 TEXT
);

CREATE TABLE IF NOT EXISTS postdocs (
    id                         INTEGER PRIMARY KEY,
    person_role_id             INTEGER NOT NULL UNIQUE REFERENCES person_roles(id),
    cohort_number              INTEGER,
    department                 TEXT,
    discipline                 TEXT,
    project_title              TEXT,
    is_incoming                INTEGER NOT NULL DEFAULT 0,
    is_graduated               INTEGER NOT NULL DEFAULT 0,
    current_title_id           INTEGER REFERENCES researcher_titles(id),
    current_title_other        TEXT,
    current_institution_id     INTEGER REFERENCES institutions(id),
    current_institution_other  TEXT,
    link                       TEXT,
    notes                      TEXT
);

CREATE TABLE IF NOT EXISTS affiliations (
    id              INTEGER PRIMARY KEY,
    person_role_id  INTEGER NOT NULL REFERENCES person_roles(id),
    institution_id  INTEGER NOT NULL REFERENCES institutions(id),
    start_date      TEXT,
    end_date        TEXT,
    -- repeat stints are allowed; only the date order is constrained
    CHECK (start_date IS NULL OR end_date IS NULL OR end_date >= start_date)
);

CREATE TABLE IF NOT EXISTS supervisions (
    id                  INTEGER PRIMARY KEY,
    supervisor_role_id  INTEGER NOT NULL REFERENCES person_roles(id),
    student_role_id     INTEGER NOT NULL REFERENCES person_roles(id),
    is_main             INTEGER NOT NULL DEFAULT 0,
    UNIQUE (supervisor_role_id, student_role_id)
);

-- ── Terms, activities, courses ──────────────────────────────────────────

CREATE TABLE IF NOT EXISTS course_terms (
    id         INTEGER PRIMARY KEY,
    season     TEXT NOT NULL,     -- 'spring' | 'summer' | 'fall' | legacy 'winter'
    year       INTEGER NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 1,
    UNIQUE (season, year)
);

CREATE TABLE IF NOT EXISTS grad_school_activities (
    id                INTEGER PRIMARY KEY,
    activity_type_id  INTEGER NOT NULL REFERENCES grad_school_activity_types(id),
    description       TEXT,
    year              INTEGER,    -- nullable for legacy rows only
    UNIQUE (activity_type_id, description, year)
);

CREATE TABLE IF NOT EXISTS courses (
    id                       INTEGER PRIMARY KEY,
    title                    TEXT NOT NULL,
    course_term_id           INTEGER REFERENCES course_terms(id),
    grad_school_activity_id  INTEGER REFERENCES grad_school_activities(id),
    credit_points            REAL,
    notes                    TEXT,
    -- exactly one temporal anchor
    CHECK ((course_term_id IS NULL) != (grad_school_activity_id IS NULL))
);

CREATE TABLE IF NOT EXISTS enrollments (
    id              INTEGER PRIMARY KEY,
    phd_student_id  INTEGER NOT NULL REFERENCES phd_students(id),
    course_id       INTEGER NOT NULL REFERENCES courses(id),
    is_completed    INTEGER NOT NULL DEFAULT 0,
    grade           TEXT,          -- 'pass' | 'fail'
    UNIQUE (phd_student_id, course_id)
);

CREATE TABLE IF NOT EXISTS course_teachers (
    course_id       INTEGER NOT NULL REFERENCES courses(id),
    person_role_id  INTEGER NOT NULL REFERENCES person_roles(id),
    PRIMARY KEY (course_id, person_role_id)
);

CREATE TABLE IF NOT EXISTS course_institutions (
    course_id       INTEGER NOT NULL REFERENCES courses(id),
    institution_id  INTEGER NOT NULL REFERENCES institutions(id),
    PRIMARY KEY (course_id, institution_id)
);

-- ── Student activities ──────────────────────────────────────────────────

-- One base row per activity; the variant payload is JSON keyed by `kind`.
-- `activity_id` is the referenced grad_school_activities id for the
-- grad_school variant and the row's own id for the abroad variant
-- (back-filled after insert, so transiently NULL inside the transaction).
CREATE TABLE IF NOT EXISTS student_activities (
    id              INTEGER PRIMARY KEY,
    phd_student_id  INTEGER NOT NULL REFERENCES phd_students(id),
    kind            TEXT NOT NULL,    -- 'grad_school' | 'abroad'
    activity_id     INTEGER,
    detail_json     TEXT NOT NULL,
    UNIQUE (phd_student_id, kind, activity_id)
);

-- ── Projects ────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS projects (
    id                      INTEGER PRIMARY KEY,
    call_type_id            INTEGER NOT NULL REFERENCES project_call_types(id),
    title                   TEXT NOT NULL,
    project_number          TEXT NOT NULL UNIQUE,
    final_report_submitted  INTEGER NOT NULL DEFAULT 0,
    is_extended             INTEGER NOT NULL DEFAULT 0,
    start_date              TEXT,
    end_date                TEXT,
    notes                   TEXT
);

CREATE TABLE IF NOT EXISTS project_members (
    id              INTEGER PRIMARY KEY,
    project_id      INTEGER NOT NULL REFERENCES projects(id),
    person_role_id  INTEGER NOT NULL REFERENCES person_roles(id),
    is_principal_investigator  INTEGER NOT NULL DEFAULT 0,
    is_contact_person          INTEGER NOT NULL DEFAULT 0,
    is_active                  INTEGER NOT NULL DEFAULT 1,
    UNIQUE (project_id, person_role_id)
);

CREATE TABLE IF NOT EXISTS project_fields (
    project_id  INTEGER NOT NULL REFERENCES projects(id),
    field_id    INTEGER NOT NULL REFERENCES fields(id),
    PRIMARY KEY (project_id, field_id)
);

CREATE TABLE IF NOT EXISTS role_fields (
    person_role_id  INTEGER NOT NULL REFERENCES person_roles(id),
    field_id        INTEGER NOT NULL REFERENCES fields(id),
    PRIMARY KEY (person_role_id, field_id)
);

CREATE TABLE IF NOT EXISTS research_output_reports (
    id          INTEGER PRIMARY KEY,
    project_id  INTEGER NOT NULL REFERENCES projects(id),
    link        TEXT NOT NULL
);

-- ── Decision letters ────────────────────────────────────────────────────

-- Polymorphic parent: no FK is possible for the pair, so the app resolves
-- it through LetterParent. parent_id alone is never unique across kinds.
CREATE TABLE IF NOT EXISTS decision_letters (
    id           INTEGER PRIMARY KEY,
    parent_kind  TEXT NOT NULL,    -- 'person_role' | 'project' | 'course'
    parent_id    INTEGER NOT NULL,
    link         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS person_roles_person_idx   ON person_roles(person_id);
CREATE INDEX IF NOT EXISTS affiliations_role_idx     ON affiliations(person_role_id);
CREATE INDEX IF NOT EXISTS enrollments_course_idx    ON enrollments(course_id);
CREATE INDEX IF NOT EXISTS activities_student_idx    ON student_activities(phd_student_id);
CREATE INDEX IF NOT EXISTS letters_parent_idx        ON decision_letters(parent_kind, parent_id);
CREATE INDEX IF NOT EXISTS project_members_role_idx  ON project_members(person_role_id);

PRAGMA user_version = 1;
";
