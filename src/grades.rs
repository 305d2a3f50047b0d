/// Letter grade plus the styling class the tables attach to it. Computed for
/// rendering only; never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub letter: &'static str,
    pub css_class: &'static str,
}

pub fn grade_for(marks: f64) -> Grade {
    if marks >= 90.0 {
        Grade { letter: "A+", css_class: "success" }
    } else if marks >= 80.0 {
        Grade { letter: "A", css_class: "success" }
    } else if marks >= 70.0 {
        Grade { letter: "B", css_class: "info" }
    } else if marks >= 60.0 {
        Grade { letter: "C", css_class: "warning" }
    } else if marks >= 50.0 {
        Grade { letter: "D", css_class: "warning" }
    } else {
        Grade { letter: "F", css_class: "error" }
    }
}
