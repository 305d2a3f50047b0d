use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }

    pub fn is_teacher(self) -> bool {
        matches!(self, Role::Teacher)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The authenticated identity cached client-side: token and user profile are
/// always stored and cleared together.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub user_id: i64,
    pub teacher_id: i64,
    pub class_name: String,
    pub roll_no: String,
    pub user: User,
}

impl Student {
    /// Option label used by every student-selection dropdown.
    pub fn select_label(&self) -> String {
        format!("{} ({} - {})", self.user.name, self.class_name, self.roll_no)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub marks: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "success",
            AttendanceStatus::Absent => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Aggregate payload of `GET /dashboard`. The `my_*` fields are only present
/// for teachers.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub total_teachers: i64,
    #[serde(default)]
    pub recent_marks: Vec<Mark>,
    #[serde(default)]
    pub recent_attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub my_students_count: Option<i64>,
    #[serde(default)]
    pub my_students: Vec<Student>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub message: String,
}

/// Rendered as-is; generated entirely by the backend AI collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct AiReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub weak_subjects: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub study_plan: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedStudent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub class_name: String,
    pub roll_no: String,
}

/// `POST /students` does not answer with the list row shape; it wraps the
/// created record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentResponse {
    pub message: String,
    pub student: CreatedStudent,
}

// ---- request payloads ----

#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TeacherPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl TeacherPayload {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password,
            role: Role::Teacher,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentPayload {
    pub name: String,
    pub email: String,
    pub class_name: String,
    pub roll_no: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MarkPayload {
    pub student_id: i64,
    pub subject: String,
    pub marks: f64,
}

#[derive(Debug, Serialize)]
pub struct AttendancePayload {
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

// ---- browser form bodies ----
//
// Selection and numeric fields arrive as strings so the handlers can reject
// bad input with a readable message instead of a 422 from the extractor.

#[derive(Debug, Deserialize)]
pub struct TeacherForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkForm {
    pub student_id: String,
    pub subject: String,
    pub marks: String,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceForm {
    pub student_id: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub student_id: String,
}
