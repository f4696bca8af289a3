//! In-page capture scripts.
//!
//! Each script runs in the loaded page's context and returns plain
//! JSON-serializable data. Scripts only *capture* DOM structure; all
//! interpretation (column matching, classification, date handling) happens
//! in Rust so it can be tested against fixture captures.

/// Placeholder substituted with a CSS selector by [`course_links_script`].
const SELECTOR_TOKEN: &str = "__SELECTOR__";

const COURSE_LINKS_TEMPLATE: &str = r#"
    (() => {
        const anchors = Array.from(document.querySelectorAll('__SELECTOR__'));
        return anchors.map(a => ({
            href: a.href,
            text: (a.textContent || '').trim()
        }));
    })()
"#;

/// Builds the anchor-capture script for one course-link selector strategy.
#[must_use]
pub fn course_links_script(selector: &str) -> String {
    COURSE_LINKS_TEMPLATE.replace(SELECTOR_TOKEN, selector)
}

/// Captures every table on the page: header texts plus per-cell text, link
/// target, and link text. Header cells follow the portal's mixed markup
/// (`thead th`, or the first row's `th`/`td`).
pub const TABLES_SCRIPT: &str = r#"
    (() => {
        return Array.from(document.querySelectorAll('table')).map(table => {
            const headerCells = table.querySelectorAll('thead th, tr:first-child th, tr:first-child td');
            const headers = Array.from(headerCells).map(c => (c.textContent || '').trim());

            let rows = Array.from(table.querySelectorAll('tbody tr'));
            if (rows.length === 0) {
                rows = Array.from(table.querySelectorAll('tr'));
            }

            const captured = rows.map(row =>
                Array.from(row.querySelectorAll('td')).map(cell => {
                    const link = cell.querySelector('a[href]');
                    return {
                        text: (cell.textContent || '').trim(),
                        href: link ? link.href : null,
                        linkText: link ? (link.textContent || '').trim() : null
                    };
                })
            );

            return { headers: headers, rows: captured };
        });
    })()
"#;

/// Captures the VOD activity entries on a course page. The viewing period
/// lives in a `displayoptions` block as `start ~ end`.
pub const VOD_LIST_SCRIPT: &str = r#"
    (() => {
        const entries = [];
        document.querySelectorAll('li.activity.vod.modtype_vod').forEach(item => {
            const link = item.querySelector('.activityinstance a[href]');
            const title = item.querySelector('.activityinstance .instancename');
            const period = item.querySelector('.displayoptions .text-ubstrap');
            if (title) {
                entries.push({
                    title: (title.textContent || '').trim(),
                    url: link ? link.href : null,
                    period: period ? (period.textContent || '').trim() : null
                });
            }
        });
        return entries;
    })()
"#;

/// Captures assignment activities embedded in the course content outline.
/// Their due dates only appear as free text ("... 까지" / "until ..."), so
/// the whole list-item text is captured for the Rust side to scan.
pub const OUTLINE_ASSIGNMENTS_SCRIPT: &str = r#"
    (() => {
        const entries = [];
        document.querySelectorAll('li.activity.assign').forEach(item => {
            const link = item.querySelector('.activityinstance a[href]');
            const title = item.querySelector('.activityinstance .instancename');
            if (title) {
                entries.push({
                    title: (title.textContent || '').trim(),
                    url: link ? link.href : null,
                    text: (item.textContent || '').trim()
                });
            }
        });
        return entries;
    })()
"#;

/// Captures the dashboard timeline and todo widgets, the degraded source
/// used only under the dashboard-fallback policy.
pub const DASHBOARD_SCRIPT: &str = r#"
    (() => {
        const entries = [];

        document.querySelectorAll('.block_timeline .timeline-event-list li').forEach(item => {
            const link = item.querySelector('a[href]');
            const title = item.querySelector('.event-name') || item.querySelector('.timeline-event-title');
            const time = item.querySelector('.event-time') || item.querySelector('.timeline-event-time');
            const course = item.querySelector('.event-course') || item.querySelector('.timeline-event-course');
            if (link && title) {
                entries.push({
                    title: (title.textContent || '').trim(),
                    courseName: course ? (course.textContent || '').trim() : null,
                    url: link.href,
                    dueText: time ? (time.textContent || '').trim() : null
                });
            }
        });

        document.querySelectorAll('.block_todo li.todo-item').forEach(item => {
            const link = item.querySelector('a[href]');
            const title = item.querySelector('.todo-name');
            if (link && title) {
                entries.push({
                    title: (title.textContent || '').trim(),
                    courseName: null,
                    url: link.href,
                    dueText: null
                });
            }
        });

        return entries;
    })()
"#;

/// Builds the credential-injection script for the auto-login flow. Returns
/// `true` when a login form was present and submitted, `false` otherwise.
/// Credentials are embedded as JSON string literals so quoting in either
/// field cannot break out of the script.
#[must_use]
pub fn login_script(username: &str, password: &str) -> String {
    let username = serde_json::to_string(username).unwrap_or_else(|_| "\"\"".to_string());
    let password = serde_json::to_string(password).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"
    (() => {{
        const usernameField = document.querySelector('input[name="username"], input#username');
        const passwordField = document.querySelector('input[name="password"], input#password');
        const loginButton = document.querySelector('button[type="submit"], input[type="submit"]');

        if (!usernameField || !passwordField) {{
            return false;
        }}

        usernameField.value = {username};
        passwordField.value = {password};

        if (loginButton) {{
            loginButton.click();
        }} else {{
            const form = usernameField.closest('form');
            if (!form) {{
                return false;
            }}
            form.submit();
        }}
        return true;
    }})()
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_links_script_substitutes_selector() {
        let script = course_links_script("a.course_link");
        assert!(script.contains("querySelectorAll('a.course_link')"));
        assert!(!script.contains(SELECTOR_TOKEN));
    }

    #[test]
    fn login_script_escapes_credentials() {
        let script = login_script("student", r#"pa'ss"word\"#);
        assert!(script.contains(r#"usernameField.value = "student";"#));
        // The password lands as one JSON string literal, quotes intact.
        assert!(script.contains(r#"passwordField.value = "pa'ss\"word\\";"#));
    }
}
