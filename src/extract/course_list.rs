//! Course-list extraction profile.
//!
//! The portal has rendered its course list under several different markups
//! over the years, so the profile is an ordered list of named selector
//! strategies: the first one that captures at least one anchor wins and the
//! rest are never consulted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::model::Course;

/// One named course-link selector, ordered most-specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseLinkStrategy {
    /// The "my courses" sidebar list.
    MyCourseList,
    /// Course overview boxes on the dashboard body.
    CourseBox,
    /// Bare course-name anchors.
    CourseNameAnchor,
    /// Last resort: any link into `/course/view.php?id=`.
    AnyCourseViewLink,
}

impl CourseLinkStrategy {
    /// Priority order. Stops at the first strategy yielding ≥1 anchor.
    pub const ORDERED: &'static [Self] = &[
        Self::MyCourseList,
        Self::CourseBox,
        Self::CourseNameAnchor,
        Self::AnyCourseViewLink,
    ];

    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::MyCourseList => "div.course_lists ul.my-course-lists > li a.course_link",
            Self::CourseBox => r#"div.coursebox a[href*="/course/view.php"]"#,
            Self::CourseNameAnchor => r#"a.coursename[href*="/course/view.php"]"#,
            Self::AnyCourseViewLink => r#"a[href*="/course/view.php?id="]"#,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MyCourseList => "my-course-list",
            Self::CourseBox => "course-box",
            Self::CourseNameAnchor => "course-name-anchor",
            Self::AnyCourseViewLink => "any-course-view-link",
        }
    }
}

/// An anchor captured by a course-link strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct AnchorCapture {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

static COURSE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=(\d+)").unwrap());

/// Pulls the numeric course id out of a portal course URL.
#[must_use]
pub fn course_id_from_url(url: &str) -> Option<String> {
    COURSE_ID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Converts captured anchors into id-unique courses, preserving first-seen
/// order. Anchors without an embedded id are ignored; a repeated id keeps
/// the first anchor's name and link, whatever its text said.
#[must_use]
pub fn dedupe_courses(anchors: &[AnchorCapture]) -> Vec<Course> {
    let mut courses: Vec<Course> = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let Some(id) = course_id_from_url(&anchor.href) else {
            continue;
        };
        if courses.iter().any(|c| c.id == id) {
            continue;
        }
        courses.push(Course {
            id,
            name: anchor.text.trim().to_string(),
            main_link: anchor.href.clone(),
        });
    }
    courses
}
