use crate::models::Role;

/// One named, mutually-exclusive panel within the dashboard view. Exactly one
/// section is rendered per request; switching sections is a navigation that
/// also runs the target section's data loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Teachers,
    Students,
    Marks,
    Attendance,
    MyMarks,
    MyAttendance,
}

const TEACHER_MENU: &[Section] = &[
    Section::Home,
    Section::Teachers,
    Section::Students,
    Section::Marks,
    Section::Attendance,
];

const STUDENT_MENU: &[Section] = &[Section::Home, Section::MyMarks, Section::MyAttendance];

impl Section {
    pub fn slug(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Teachers => "teachers",
            Section::Students => "students",
            Section::Marks => "marks",
            Section::Attendance => "attendance",
            Section::MyMarks => "my-marks",
            Section::MyAttendance => "my-attendance",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "home" => Some(Section::Home),
            "teachers" => Some(Section::Teachers),
            "students" => Some(Section::Students),
            "marks" => Some(Section::Marks),
            "attendance" => Some(Section::Attendance),
            "my-marks" => Some(Section::MyMarks),
            "my-attendance" => Some(Section::MyAttendance),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Home => "Dashboard",
            Section::Teachers => "Manage Teachers",
            Section::Students => "Manage Students",
            Section::Marks => "Add Marks",
            Section::Attendance => "Add Attendance",
            Section::MyMarks => "My Marks",
            Section::MyAttendance => "My Attendance",
        }
    }

    pub fn menu(role: Role) -> &'static [Section] {
        match role {
            Role::Teacher => TEACHER_MENU,
            Role::Student => STUDENT_MENU,
        }
    }

    pub fn allowed(self, role: Role) -> bool {
        Self::menu(role).contains(&self)
    }

    /// Routes a requested slug to a section the role may see; anything
    /// unknown or disallowed lands on the home section.
    pub fn resolve(requested: Option<&str>, role: Role) -> Self {
        requested
            .and_then(Section::from_slug)
            .filter(|section| section.allowed(role))
            .unwrap_or(Section::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_slug_falls_back_to_home() {
        assert_eq!(Section::resolve(Some("nope"), Role::Teacher), Section::Home);
        assert_eq!(Section::resolve(None, Role::Student), Section::Home);
    }

    #[test]
    fn sections_are_role_gated() {
        assert_eq!(Section::resolve(Some("teachers"), Role::Teacher), Section::Teachers);
        // A student asking for a management section lands back home.
        assert_eq!(Section::resolve(Some("teachers"), Role::Student), Section::Home);
        assert_eq!(Section::resolve(Some("my-marks"), Role::Student), Section::MyMarks);
        assert_eq!(Section::resolve(Some("my-marks"), Role::Teacher), Section::Home);
    }

    #[test]
    fn slugs_roundtrip_for_every_menu_entry() {
        for role in [Role::Teacher, Role::Student] {
            for section in Section::menu(role) {
                assert_eq!(Section::from_slug(section.slug()), Some(*section));
                assert!(section.allowed(role));
            }
        }
    }
}
