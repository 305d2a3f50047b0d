use crate::api::ApiError;
use crate::errors::AppError;
use crate::models::{
    AttendanceForm, AttendancePayload, AttendanceStatus, Credentials, MarkForm, MarkPayload,
    ReportForm, Role, Session, Student, StudentPayload, TeacherForm, TeacherPayload,
};
use crate::sections::Section;
use crate::state::AppState;
use crate::ui::{self, Flash};
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub section: Option<String>,
    pub edit: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

fn login_redirect() -> Response {
    Redirect::to("/").into_response()
}

/// The uniform 401 policy: storage clear bundled with navigation to login.
async fn expire_session(state: &AppState) -> Result<Response, AppError> {
    state.sessions.clear().await?;
    Ok(login_redirect())
}

fn flash_redirect(section: Section, flash: Flash) -> Response {
    let mut target = format!("/dashboard?section={}", section.slug());
    if let Some(notice) = &flash.notice {
        target.push_str(&format!("&notice={}", urlencoding::encode(notice)));
    }
    if let Some(error) = &flash.error {
        target.push_str(&format!("&error={}", urlencoding::encode(error)));
    }
    Redirect::to(&target).into_response()
}

// ---- login ----

pub async fn login_page(State(state): State<AppState>) -> Result<Response, AppError> {
    // An existing session is only trusted once the backend accepts it.
    if let Some(session) = state.sessions.get().await {
        match state.api.dashboard(&session.token).await {
            Ok(_) => return Ok(Redirect::to("/dashboard").into_response()),
            Err(err) => {
                warn!("stored session failed validation: {err}");
                state.sessions.clear().await?;
            }
        }
    }
    Ok(Html(ui::render_login()).into_response())
}

pub async fn login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, AppError> {
    match state.api.login(&credentials).await {
        Ok(login) => {
            state.sessions.set(login.token, login.user).await?;
            Ok(Html(ui::render_login_success(&login.message)).into_response())
        }
        Err(err) => Ok(Html(ui::render_login_error(&credentials.email, &err.user_message()))
            .into_response()),
    }
}

pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(session) = state.sessions.get().await {
        // Best effort; the local session is torn down either way.
        if let Err(err) = state.api.logout(&session.token).await {
            warn!("backend logout failed: {err}");
        }
    }
    state.sessions.clear().await?;
    Ok(login_redirect())
}

// ---- dashboard ----

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let section = Section::resolve(query.section.as_deref(), session.user.role);
    let edit = query.edit.as_deref().and_then(|id| id.parse::<i64>().ok());

    let body = match section_body(&state, &session, section, edit).await {
        Ok(body) => body,
        Err(ApiError::Unauthorized) => return expire_session(&state).await,
        Err(err) => ui::render_section_error(&err.user_message()),
    };

    let flash = Flash {
        notice: query.notice,
        error: query.error,
    };
    let clock = ui::format_clock(Local::now());
    Ok(Html(ui::render_dashboard(&session.user, section, &clock, &flash, &body)).into_response())
}

/// Loads exactly the data the visible section needs and renders it.
async fn section_body(
    state: &AppState,
    session: &Session,
    section: Section,
    edit: Option<i64>,
) -> Result<String, ApiError> {
    let token = &session.token;
    match section {
        Section::Home => {
            let stats = state.api.dashboard(token).await?;
            Ok(ui::render_home(&session.user, &stats))
        }
        Section::Teachers => {
            let teachers = state.api.teachers(token).await?;
            let editing = edit.and_then(|id| teachers.iter().find(|teacher| teacher.id == id));
            Ok(ui::render_teachers(&teachers, editing))
        }
        Section::Students => {
            let students = state.api.students(token).await?;
            let editing = edit.and_then(|id| students.iter().find(|student| student.id == id));
            Ok(ui::render_students(&students, editing))
        }
        Section::Marks => {
            let students = state.api.students(token).await?;
            Ok(ui::render_marks_form(&students))
        }
        Section::Attendance => {
            let students = state.api.students(token).await?;
            let today = Local::now().date_naive().to_string();
            Ok(ui::render_attendance_form(&students, &today))
        }
        Section::MyMarks => {
            let marks = match own_student(state, session).await? {
                Some(student) => state.api.marks(token, student.id).await?,
                None => Vec::new(),
            };
            Ok(ui::render_my_marks(&marks))
        }
        Section::MyAttendance => {
            let records = match own_student(state, session).await? {
                Some(student) => state.api.attendance(token, student.id).await?,
                None => Vec::new(),
            };
            Ok(ui::render_my_attendance(&records))
        }
    }
}

/// The API has no self-lookup; the signed-in student's record is found by
/// matching the roster against the session user.
async fn own_student(state: &AppState, session: &Session) -> Result<Option<Student>, ApiError> {
    let students = state.api.students(&session.token).await?;
    Ok(students
        .into_iter()
        .find(|student| student.user_id == session.user.id))
}

// ---- CRUD ----
//
// Uniform shape: validate, call the API client, then redirect back to the
// owning section with a notice or the server-provided error. The redirect
// render re-fetches every table and dropdown that could have gone stale.

async fn finish_mutation(
    state: &AppState,
    section: Section,
    outcome: Result<String, ApiError>,
) -> Result<Response, AppError> {
    match outcome {
        Ok(notice) => Ok(flash_redirect(section, Flash::notice(notice))),
        Err(ApiError::Unauthorized) => expire_session(state).await,
        Err(err) => Ok(flash_redirect(section, Flash::error(err.user_message()))),
    }
}

pub async fn teacher_add(
    State(state): State<AppState>,
    Form(form): Form<TeacherForm>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let Some(payload) = teacher_payload(form) else {
        return Ok(flash_redirect(Section::Teachers, Flash::error("All fields are required")));
    };
    let outcome = state
        .api
        .create_teacher(&session.token, &payload)
        .await
        .map(|teacher| format!("Teacher \"{}\" added successfully!", teacher.name));
    finish_mutation(&state, Section::Teachers, outcome).await
}

pub async fn teacher_update(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Form(form): Form<TeacherForm>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let Some(payload) = teacher_payload(form) else {
        return Ok(flash_redirect(Section::Teachers, Flash::error("All fields are required")));
    };
    let outcome = state
        .api
        .update_teacher(&session.token, teacher_id, &payload)
        .await
        .map(|()| "Teacher updated successfully!".to_string());
    finish_mutation(&state, Section::Teachers, outcome).await
}

pub async fn teacher_delete(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let outcome = state
        .api
        .delete_teacher(&session.token, teacher_id)
        .await
        .map(|()| "Teacher deleted successfully!".to_string());
    finish_mutation(&state, Section::Teachers, outcome).await
}

fn teacher_payload(form: TeacherForm) -> Option<TeacherPayload> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return None;
    }
    Some(TeacherPayload::new(
        name.to_string(),
        email.to_string(),
        form.password,
    ))
}

pub async fn student_add(
    State(state): State<AppState>,
    Form(form): Form<StudentPayload>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    if let Some(message) = student_form_error(&form) {
        return Ok(flash_redirect(Section::Students, Flash::error(message)));
    }
    let outcome = state
        .api
        .create_student(&session.token, &form)
        .await
        .map(|created| format!("Student \"{}\" added successfully!", created.student.name));
    finish_mutation(&state, Section::Students, outcome).await
}

pub async fn student_update(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Form(form): Form<StudentPayload>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    if let Some(message) = student_form_error(&form) {
        return Ok(flash_redirect(Section::Students, Flash::error(message)));
    }
    let outcome = state
        .api
        .update_student(&session.token, student_id, &form)
        .await
        .map(|()| "Student updated successfully!".to_string());
    finish_mutation(&state, Section::Students, outcome).await
}

pub async fn student_delete(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let outcome = state
        .api
        .delete_student(&session.token, student_id)
        .await
        .map(|()| "Student deleted successfully!".to_string());
    finish_mutation(&state, Section::Students, outcome).await
}

fn student_form_error(form: &StudentPayload) -> Option<&'static str> {
    if form.name.trim().is_empty()
        || form.email.trim().is_empty()
        || form.class_name.trim().is_empty()
        || form.roll_no.trim().is_empty()
        || form.password.is_empty()
    {
        return Some("All fields are required");
    }
    None
}

pub async fn mark_add(
    State(state): State<AppState>,
    Form(form): Form<MarkForm>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let Some(student_id) = parse_selection(&form.student_id) else {
        return Ok(flash_redirect(Section::Marks, Flash::error("Please select a student")));
    };
    let subject = form.subject.trim();
    if subject.is_empty() {
        return Ok(flash_redirect(Section::Marks, Flash::error("Subject is required")));
    }
    let Ok(marks) = form.marks.trim().parse::<f64>() else {
        return Ok(flash_redirect(Section::Marks, Flash::error("Marks must be a number")));
    };
    let payload = MarkPayload {
        student_id,
        subject: subject.to_string(),
        marks,
    };
    let outcome = state
        .api
        .create_mark(&session.token, &payload)
        .await
        .map(|_| "Marks added successfully!".to_string());
    finish_mutation(&state, Section::Marks, outcome).await
}

pub async fn attendance_add(
    State(state): State<AppState>,
    Form(form): Form<AttendanceForm>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let Some(student_id) = parse_selection(&form.student_id) else {
        return Ok(flash_redirect(Section::Attendance, Flash::error("Please select a student")));
    };
    let Ok(date) = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d") else {
        return Ok(flash_redirect(Section::Attendance, Flash::error("A valid date is required")));
    };
    let Some(status) = AttendanceStatus::parse(form.status.trim()) else {
        return Ok(flash_redirect(
            Section::Attendance,
            Flash::error("Status must be present or absent"),
        ));
    };
    let payload = AttendancePayload {
        student_id,
        date,
        status,
    };
    let outcome = state
        .api
        .create_attendance(&session.token, &payload)
        .await
        .map(|_| "Attendance recorded successfully!".to_string());
    finish_mutation(&state, Section::Attendance, outcome).await
}

fn parse_selection(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

// ---- AI report ----

pub async fn report_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    // A student picked on the dashboard rides over in the transient key and
    // is consumed here, surviving exactly one navigation.
    let preselected = match session.user.role {
        Role::Teacher => state.sessions.take_student().await?,
        Role::Student => None,
    };
    let body = match report_body(&state, &session, preselected).await {
        Ok(body) => body,
        Err(ApiError::Unauthorized) => return expire_session(&state).await,
        Err(err) => ui::render_report_error(&err.user_message()),
    };
    Ok(report_response(&session, body))
}

pub async fn report_preselect(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Response, AppError> {
    if !state.sessions.is_valid().await {
        return Ok(login_redirect());
    }
    state.sessions.stash_student(student_id).await?;
    Ok(Redirect::to("/report").into_response())
}

pub async fn report_generate(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Result<Response, AppError> {
    let Some(session) = state.sessions.get().await else {
        return Ok(login_redirect());
    };
    let selected = parse_selection(&form.student_id);
    let body = match report_generate_body(&state, &session, selected).await {
        Ok(body) => body,
        Err(ApiError::Unauthorized) => return expire_session(&state).await,
        Err(err) => ui::render_report_error(&err.user_message()),
    };
    Ok(report_response(&session, body))
}

async fn report_body(
    state: &AppState,
    session: &Session,
    preselected: Option<i64>,
) -> Result<String, ApiError> {
    let students = state.api.students(&session.token).await?;
    match session.user.role {
        Role::Teacher => match preselected {
            Some(student_id) => generate_body(state, session, &students, student_id).await,
            None => Ok(ui::render_report_picker(&students, None, None)),
        },
        Role::Student => {
            let own = students
                .iter()
                .find(|student| student.user_id == session.user.id);
            match own {
                Some(student) => generate_body(state, session, &students, student.id).await,
                None => Ok(ui::render_report_error("Student profile not found")),
            }
        }
    }
}

async fn report_generate_body(
    state: &AppState,
    session: &Session,
    selected: Option<i64>,
) -> Result<String, ApiError> {
    let students = state.api.students(&session.token).await?;
    match selected {
        Some(student_id) => generate_body(state, session, &students, student_id).await,
        None => Ok(ui::render_report_picker(
            &students,
            None,
            Some("Please select a student first"),
        )),
    }
}

async fn generate_body(
    state: &AppState,
    session: &Session,
    students: &[Student],
    student_id: i64,
) -> Result<String, ApiError> {
    let Some(student) = students.iter().find(|student| student.id == student_id) else {
        return Ok(ui::render_report_error("Student not found"));
    };
    let report = state.api.ai_report(&session.token, student_id).await?;
    if report.success {
        Ok(ui::render_report_result(student, &report))
    } else {
        let message = report
            .message
            .unwrap_or_else(|| "Failed to generate report".to_string());
        Ok(ui::render_report_error(&message))
    }
}

fn report_response(session: &Session, body: String) -> Response {
    let clock = ui::format_clock(Local::now());
    Html(ui::render_report_page(&session.user, &clock, &Flash::default(), &body)).into_response()
}
