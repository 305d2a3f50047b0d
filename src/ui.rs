use crate::grades::grade_for;
use crate::models::{AiReport, AttendanceRecord, DashboardStats, Mark, Student, User};
use crate::sections::Section;
use chrono::{DateTime, Local};

/// Flash messages carried across a redirect in query parameters.
#[derive(Debug, Default, Clone)]
pub struct Flash {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn html(&self) -> String {
        let mut out = String::new();
        if let Some(notice) = &self.notice {
            out.push_str(&format!(
                "<div class=\"message success\">{}</div>",
                escape_html(notice)
            ));
        }
        if let Some(error) = &self.error {
            out.push_str(&format!(
                "<div class=\"message error\">{}</div>",
                escape_html(error)
            ));
        }
        out
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Fixed-format header clock line, e.g. "Friday, August 7, 2026, 09:30 AM".
pub fn format_clock(now: DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y, %I:%M %p").to_string()
}

/// Renders a table body, substituting a single full-width placeholder row
/// when the list is empty.
fn table_rows<T>(items: &[T], colspan: usize, empty: &str, row: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return format!("<tr><td colspan=\"{colspan}\" class=\"text-center\">{empty}</td></tr>");
    }
    items.iter().map(row).collect()
}

fn student_options(students: &[Student], selected: Option<i64>) -> String {
    let mut out = String::from("<option value=\"\">Select Student</option>");
    for student in students {
        let flag = if selected == Some(student.id) { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{flag}>{}</option>",
            student.id,
            escape_html(&student.select_label())
        ));
    }
    out
}

// ---- login page ----

pub fn render_login() -> String {
    login_page("", "admin@school.com", "admin123", "")
}

pub fn render_login_error(email: &str, message: &str) -> String {
    let block = format!("<div class=\"message error\">{}</div>", escape_html(message));
    login_page(&block, email, "", "")
}

/// Success leaves the message on screen for a moment, then the page itself
/// navigates to the dashboard.
pub fn render_login_success(message: &str) -> String {
    let block = format!("<div class=\"message success\">{}</div>", escape_html(message));
    login_page(&block, "", "", "<meta http-equiv=\"refresh\" content=\"1;url=/dashboard\" />")
}

fn login_page(message_block: &str, email: &str, password: &str, head_extra: &str) -> String {
    LOGIN_HTML
        .replace("{{HEAD_EXTRA}}", head_extra)
        .replace("{{MESSAGE}}", message_block)
        .replace("{{EMAIL}}", &escape_html(email))
        .replace("{{PASSWORD}}", &escape_html(password))
}

// ---- dashboard sections ----

pub fn render_home(user: &User, stats: &DashboardStats) -> String {
    let mut cards = format!(
        "<div class=\"stat\"><span class=\"label\">Total Students</span>\
         <span class=\"value\">{}</span></div>\
         <div class=\"stat\"><span class=\"label\">Total Teachers</span>\
         <span class=\"value\">{}</span></div>",
        stats.total_students, stats.total_teachers
    );
    if user.role.is_teacher() {
        cards.push_str(&format!(
            "<div class=\"stat\"><span class=\"label\">My Students</span>\
             <span class=\"value\">{}</span></div>",
            stats.my_students_count.unwrap_or(0)
        ));
    }

    let marks_rows = table_rows(&stats.recent_marks, 3, "No marks data available", |mark| {
        format!(
            "<tr><td>Student {}</td><td>{}</td><td><strong>{}</strong></td></tr>",
            mark.student_id,
            escape_html(&mark.subject),
            mark.marks
        )
    });
    let attendance_rows = table_rows(
        &stats.recent_attendance,
        3,
        "No attendance data available",
        |record| {
            format!(
                "<tr><td>Student {}</td><td>{}</td><td><span class=\"{}\">{}</span></td></tr>",
                record.student_id,
                record.date.format("%b %-d, %Y"),
                record.status.css_class(),
                record.status.as_str()
            )
        },
    );

    format!(
        "<h2>Welcome back, {}!</h2>\
         <div class=\"panel\">{cards}</div>\
         <h3>Recent Marks</h3>\
         <table><thead><tr><th>Student</th><th>Subject</th><th>Marks</th></tr></thead>\
         <tbody>{marks_rows}</tbody></table>\
         <h3>Recent Attendance</h3>\
         <table><thead><tr><th>Student</th><th>Date</th><th>Status</th></tr></thead>\
         <tbody>{attendance_rows}</tbody></table>",
        escape_html(&user.name)
    )
}

pub fn render_teachers(teachers: &[User], edit: Option<&User>) -> String {
    let form = match edit {
        Some(teacher) => format!(
            "<h3>Edit Teacher</h3>\
             <form method=\"post\" action=\"/teachers/{id}/update\">\
             <input type=\"text\" name=\"name\" value=\"{name}\" required />\
             <input type=\"email\" name=\"email\" value=\"{email}\" required />\
             <input type=\"password\" name=\"password\" placeholder=\"New password\" required />\
             <button type=\"submit\">Update Teacher</button>\
             <a class=\"cancel\" href=\"/dashboard?section=teachers\">Cancel</a>\
             </form>",
            id = teacher.id,
            name = escape_html(&teacher.name),
            email = escape_html(&teacher.email)
        ),
        None => "<h3>Add Teacher</h3>\
             <form method=\"post\" action=\"/teachers\">\
             <input type=\"text\" name=\"name\" placeholder=\"Full name\" required />\
             <input type=\"email\" name=\"email\" placeholder=\"Email\" required />\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" required />\
             <button type=\"submit\">Add Teacher</button>\
             </form>"
            .to_string(),
    };

    let rows = table_rows(teachers, 4, "No teachers found", |teacher| {
        format!(
            "<tr><td>{id}</td><td>{name}</td><td>{email}</td><td>\
             <a class=\"btn-sm\" href=\"/dashboard?section=teachers&amp;edit={id}\">Edit</a>\
             <form class=\"inline\" method=\"post\" action=\"/teachers/{id}/delete\" \
             onsubmit=\"return confirm('Are you sure you want to delete this teacher?')\">\
             <button class=\"btn-sm danger\" type=\"submit\">Delete</button></form>\
             </td></tr>",
            id = teacher.id,
            name = escape_html(&teacher.name),
            email = escape_html(&teacher.email)
        )
    });

    format!(
        "{form}\
         <table><thead><tr><th>ID</th><th>Name</th><th>Email</th><th>Actions</th></tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

pub fn render_students(students: &[Student], edit: Option<&Student>) -> String {
    let form = match edit {
        Some(student) => format!(
            "<h3>Edit Student</h3>\
             <form method=\"post\" action=\"/students/{id}/update\">\
             <input type=\"text\" name=\"name\" value=\"{name}\" required />\
             <input type=\"email\" name=\"email\" value=\"{email}\" required />\
             <input type=\"text\" name=\"class_name\" value=\"{class}\" required />\
             <input type=\"text\" name=\"roll_no\" value=\"{roll}\" required />\
             <input type=\"password\" name=\"password\" placeholder=\"New password\" required />\
             <button type=\"submit\">Update Student</button>\
             <a class=\"cancel\" href=\"/dashboard?section=students\">Cancel</a>\
             </form>",
            id = student.id,
            name = escape_html(&student.user.name),
            email = escape_html(&student.user.email),
            class = escape_html(&student.class_name),
            roll = escape_html(&student.roll_no)
        ),
        None => "<h3>Add Student</h3>\
             <form method=\"post\" action=\"/students\">\
             <input type=\"text\" name=\"name\" placeholder=\"Full name\" required />\
             <input type=\"email\" name=\"email\" placeholder=\"Email\" required />\
             <input type=\"text\" name=\"class_name\" placeholder=\"Class\" required />\
             <input type=\"text\" name=\"roll_no\" placeholder=\"Roll no\" required />\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" required />\
             <button type=\"submit\">Add Student</button>\
             </form>"
            .to_string(),
    };

    let rows = table_rows(students, 5, "No students found", |student| {
        format!(
            "<tr><td>{id}</td><td>{name}</td><td>{class}</td><td>{roll}</td><td>\
             <a class=\"btn-sm\" href=\"/dashboard?section=students&amp;edit={id}\">Edit</a>\
             <a class=\"btn-sm\" href=\"/report/for/{id}\">Report</a>\
             <form class=\"inline\" method=\"post\" action=\"/students/{id}/delete\" \
             onsubmit=\"return confirm('Are you sure you want to delete this student?')\">\
             <button class=\"btn-sm danger\" type=\"submit\">Delete</button></form>\
             </td></tr>",
            id = student.id,
            name = escape_html(&student.user.name),
            class = escape_html(&student.class_name),
            roll = escape_html(&student.roll_no)
        )
    });

    format!(
        "{form}\
         <table><thead><tr><th>ID</th><th>Name</th><th>Class</th><th>Roll No</th>\
         <th>Actions</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

pub fn render_marks_form(students: &[Student]) -> String {
    format!(
        "<h3>Add Marks</h3>\
         <form method=\"post\" action=\"/marks\">\
         <select name=\"student_id\" required>{options}</select>\
         <input type=\"text\" name=\"subject\" placeholder=\"Subject\" required />\
         <input type=\"number\" name=\"marks\" placeholder=\"Marks\" min=\"0\" max=\"100\" \
         step=\"0.5\" required />\
         <button type=\"submit\">Save Marks</button>\
         </form>",
        options = student_options(students, None)
    )
}

pub fn render_attendance_form(students: &[Student], today: &str) -> String {
    format!(
        "<h3>Add Attendance</h3>\
         <form method=\"post\" action=\"/attendance\">\
         <select name=\"student_id\" required>{options}</select>\
         <input type=\"date\" name=\"date\" value=\"{today}\" required />\
         <select name=\"status\" required>\
         <option value=\"present\">Present</option>\
         <option value=\"absent\">Absent</option>\
         </select>\
         <button type=\"submit\">Save Attendance</button>\
         </form>",
        options = student_options(students, None)
    )
}

pub fn render_my_marks(marks: &[Mark]) -> String {
    let rows = table_rows(marks, 3, "No marks data available", |mark| {
        let grade = grade_for(mark.marks);
        format!(
            "<tr><td>{}</td><td><strong>{}</strong></td>\
             <td><span class=\"{}\">{}</span></td></tr>",
            escape_html(&mark.subject),
            mark.marks,
            grade.css_class,
            grade.letter
        )
    });

    format!(
        "<table><thead><tr><th>Subject</th><th>Marks</th><th>Grade</th></tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

pub fn render_my_attendance(records: &[AttendanceRecord]) -> String {
    let rows = table_rows(records, 2, "No attendance data available", |record| {
        format!(
            "<tr><td>{}</td><td><span class=\"{}\">{}</span></td></tr>",
            record.date.format("%b %-d, %Y"),
            record.status.css_class(),
            record.status.as_str()
        )
    });

    format!(
        "<table><thead><tr><th>Date</th><th>Status</th></tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

/// In-page failure block shown when a section's loader fails; the rest of the
/// page chrome stays usable.
pub fn render_section_error(message: &str) -> String {
    format!("<div class=\"message error\">{}</div>", escape_html(message))
}

// ---- report page bodies ----

pub fn render_report_picker(students: &[Student], selected: Option<i64>, error: Option<&str>) -> String {
    let error_block = error
        .map(|message| format!("<div class=\"message error\">{}</div>", escape_html(message)))
        .unwrap_or_default();
    format!(
        "{error_block}<h3>Generate Student Report</h3>\
         <form id=\"generate-form\" method=\"post\" action=\"/report/generate\">\
         <select name=\"student_id\">{options}</select>\
         <button type=\"submit\">Generate Report</button>\
         </form>\
         <div id=\"report-loading\" class=\"loading\" hidden>Generating AI report...</div>",
        options = student_options(students, selected)
    )
}

pub fn render_report_result(student: &Student, report: &AiReport) -> String {
    let weak_subjects = list_items(&report.weak_subjects, "No weak subjects identified");
    let tips = list_items(&report.tips, "No specific tips available");
    let study_plan = paragraph_or(&report.study_plan, "Study plan not available");
    let summary = paragraph_or(&report.summary, "Summary not available");

    format!(
        "<div class=\"message success\">AI report generated successfully!</div>\
         <div class=\"report-student\"><h3>{name}</h3>\
         <p>{class} &bull; Roll No: {roll}</p></div>\
         <h3>Weak Subjects</h3><ul>{weak_subjects}</ul>\
         <h3>Improvement Tips</h3><ul>{tips}</ul>\
         <h3>Study Plan</h3>{study_plan}\
         <h3>Summary</h3>{summary}",
        name = escape_html(&student.user.name),
        class = escape_html(&student.class_name),
        roll = escape_html(&student.roll_no)
    )
}

pub fn render_report_error(message: &str) -> String {
    format!("<div class=\"message error\">{}</div>", escape_html(message))
}

fn list_items(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("<li>{empty}</li>");
    }
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

fn paragraph_or(text: &str, empty: &str) -> String {
    if text.trim().is_empty() {
        format!("<p>{empty}</p>")
    } else {
        format!("<p>{}</p>", escape_html(text))
    }
}

// ---- page shells ----

pub fn render_dashboard(
    user: &User,
    section: Section,
    clock: &str,
    flash: &Flash,
    body: &str,
) -> String {
    shell(
        "School Management System",
        user,
        &menu_html(user, Some(section), false),
        section.title(),
        clock,
        flash,
        body,
    )
}

pub fn render_report_page(user: &User, clock: &str, flash: &Flash, body: &str) -> String {
    shell(
        "AI Student Report",
        user,
        &menu_html(user, None, true),
        "AI Student Report",
        clock,
        flash,
        body,
    )
}

fn menu_html(user: &User, active: Option<Section>, report_active: bool) -> String {
    let mut out = String::new();
    for section in Section::menu(user.role) {
        let class = if active == Some(*section) { "menu-link active" } else { "menu-link" };
        out.push_str(&format!(
            "<a class=\"{class}\" href=\"/dashboard?section={}\">{}</a>",
            section.slug(),
            section.title()
        ));
    }
    let class = if report_active { "menu-link active" } else { "menu-link" };
    out.push_str(&format!("<a class=\"{class}\" href=\"/report\">AI Report</a>"));
    out
}

fn shell(
    title: &str,
    user: &User,
    menu: &str,
    section_title: &str,
    clock: &str,
    flash: &Flash,
    body: &str,
) -> String {
    SHELL_HTML
        .replace("{{TITLE}}", title)
        .replace("{{MENU}}", menu)
        .replace("{{USER_NAME}}", &escape_html(&user.name))
        .replace("{{USER_ROLE}}", user.role.label())
        .replace("{{DATETIME}}", &escape_html(clock))
        .replace("{{SECTION_TITLE}}", section_title)
        .replace("{{FLASH}}", &flash.html())
        .replace("{{CONTENT}}", body)
}

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>School Management System - Login</title>
  {{HEAD_EXTRA}}
  <style>
    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, #eef3fb, #dbe7f7);
      color: #22303f;
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
    }
    .card {
      width: min(380px, 92vw);
      background: white;
      border-radius: 14px;
      box-shadow: 0 18px 44px rgba(34, 48, 63, 0.16);
      padding: 32px;
      display: grid;
      gap: 14px;
    }
    h1 { margin: 0; font-size: 1.5rem; }
    .subtitle { margin: 0; color: #5d6b7a; font-size: 0.95rem; }
    input {
      width: 100%;
      box-sizing: border-box;
      padding: 10px 12px;
      border: 1px solid #c8d4e1;
      border-radius: 8px;
      font-size: 1rem;
    }
    button {
      width: 100%;
      border: none;
      border-radius: 8px;
      padding: 12px;
      font-size: 1rem;
      font-weight: 600;
      color: white;
      background: #2f6fcb;
      cursor: pointer;
    }
    button:disabled { opacity: 0.6; }
    .message { border-radius: 8px; padding: 10px 12px; font-size: 0.95rem; }
    .message.success { background: #e4f5e9; color: #246b3d; }
    .message.error { background: #fde8e4; color: #a43225; }
  </style>
</head>
<body>
  <main class="card">
    <h1>School Management System</h1>
    <p class="subtitle">Sign in to continue</p>
    {{MESSAGE}}
    <form id="login-form" method="post" action="/login">
      <input type="email" name="email" placeholder="Email" value="{{EMAIL}}" required />
      <input type="password" name="password" placeholder="Password" value="{{PASSWORD}}" required />
      <button type="submit">Login</button>
    </form>
  </main>
  <script>
    document.getElementById('login-form').addEventListener('submit', (event) => {
      const button = event.target.querySelector('button[type="submit"]');
      button.disabled = true;
      button.textContent = 'Logging in...';
    });
  </script>
</body>
</html>
"#;

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --ink: #22303f;
      --muted: #5d6b7a;
      --accent: #2f6fcb;
      --danger: #c63b2b;
      --line: #dce5ee;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      min-height: 100vh;
      background: #f2f5f9;
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: 220px 1fr;
    }
    .sidebar {
      background: #1f2d3d;
      color: #dbe4ee;
      padding: 24px 14px;
      display: flex;
      flex-direction: column;
      gap: 6px;
    }
    .sidebar h1 { font-size: 1.05rem; margin: 0 8px 14px; }
    .menu-link {
      color: inherit;
      text-decoration: none;
      padding: 9px 12px;
      border-radius: 8px;
      font-size: 0.95rem;
    }
    .menu-link.active, .menu-link:hover { background: rgba(255, 255, 255, 0.12); }
    .logout-form { margin-top: auto; }
    .logout-form button {
      width: 100%;
      border: none;
      border-radius: 8px;
      padding: 10px;
      background: rgba(255, 255, 255, 0.12);
      color: inherit;
      cursor: pointer;
    }
    .main { padding: 22px 28px; }
    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: baseline;
      gap: 8px;
      border-bottom: 1px solid var(--line);
      padding-bottom: 12px;
    }
    header .who { font-weight: 600; }
    header .who span { color: var(--muted); font-weight: 400; margin-left: 6px; }
    header .clock { color: var(--muted); font-size: 0.9rem; }
    h2 { margin: 18px 0 8px; }
    h3 { margin: 18px 0 8px; }
    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }
    .stat {
      background: white;
      border: 1px solid var(--line);
      border-radius: 10px;
      padding: 14px;
    }
    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: var(--muted);
    }
    .stat .value { display: block; font-size: 1.5rem; font-weight: 600; }
    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border: 1px solid var(--line);
      border-radius: 10px;
      overflow: hidden;
    }
    th, td { text-align: left; padding: 9px 12px; border-bottom: 1px solid var(--line); }
    th { background: #f7fafd; font-size: 0.85rem; color: var(--muted); }
    .text-center { text-align: center; color: var(--muted); }
    form { margin: 10px 0 18px; display: flex; flex-wrap: wrap; gap: 8px; }
    form.inline { display: inline; margin: 0; }
    input, select {
      padding: 8px 10px;
      border: 1px solid #c8d4e1;
      border-radius: 8px;
      font-size: 0.95rem;
    }
    button {
      border: none;
      border-radius: 8px;
      padding: 9px 14px;
      font-size: 0.95rem;
      font-weight: 600;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }
    button:disabled { opacity: 0.6; }
    .btn-sm {
      display: inline-block;
      margin-right: 4px;
      padding: 4px 9px;
      border-radius: 6px;
      background: #eaf1fa;
      color: var(--accent);
      font-size: 0.85rem;
      text-decoration: none;
      border: none;
      cursor: pointer;
    }
    .btn-sm.danger { background: #fdeae6; color: var(--danger); }
    .cancel { align-self: center; color: var(--muted); }
    .message { border-radius: 8px; padding: 10px 12px; margin: 12px 0; font-size: 0.95rem; }
    .message.success { background: #e4f5e9; color: #246b3d; }
    .message.error { background: #fde8e4; color: #a43225; }
    .success { color: #246b3d; font-weight: 600; }
    .info { color: var(--accent); font-weight: 600; }
    .warning { color: #a3660a; font-weight: 600; }
    .error { color: var(--danger); font-weight: 600; }
    .loading { color: var(--muted); margin: 12px 0; }
    .report-student p { color: var(--muted); margin-top: 2px; }
  </style>
</head>
<body>
  <nav class="sidebar">
    <h1>School Portal</h1>
    {{MENU}}
    <form class="logout-form" method="post" action="/logout">
      <button type="submit">Logout</button>
    </form>
  </nav>
  <div class="main">
    <header>
      <div class="who">{{USER_NAME}}<span>{{USER_ROLE}}</span></div>
      <div class="clock" id="current-datetime">{{DATETIME}}</div>
    </header>
    {{FLASH}}
    <section class="dashboard-section" data-section="{{SECTION_TITLE}}">
      {{CONTENT}}
    </section>
  </div>
  <script>
    const updateDateTime = () => {
      const options = {
        weekday: 'long', year: 'numeric', month: 'long', day: 'numeric',
        hour: '2-digit', minute: '2-digit'
      };
      document.getElementById('current-datetime').textContent =
        new Date().toLocaleDateString('en-US', options);
    };
    setInterval(updateDateTime, 60000);

    document.querySelectorAll('form').forEach((form) => {
      form.addEventListener('submit', () => {
        const button = form.querySelector('button[type="submit"]');
        if (button) {
          button.disabled = true;
        }
        const loading = document.getElementById('report-loading');
        if (loading && form.id === 'generate-form') {
          loading.hidden = false;
        }
      });
    });
  </script>
</body>
</html>
"#;
