//! UI utilities for consistent terminal output formatting.

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Format an error and its causes as an error box.
///
/// ```text
/// ============================================================
/// Error: list keys
/// ============================================================
///
///   caused by: could not find type uint32
/// ```
pub fn format_error(err: &anyhow::Error) -> String {
    let separator = "=".repeat(ERROR_BOX_WIDTH);
    let mut text = format!("{separator}\nError: {err}\n{separator}\n");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        text.push('\n');
        for cause in causes {
            text.push_str(&format!("  caused by: {cause}\n"));
        }
    }
    text
}

/// Print an error box to stderr.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("\n{}", format_error(err));
}
