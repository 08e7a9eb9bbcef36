use tokio::process::Command;

/// `sh -c <script>`.
pub fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

/// A shell script that prints `lines` to stdout, one per line, via `printf`.
///
/// Each line is passed as a separate argument so no quoting of the content is
/// needed.
pub fn print_lines(lines: &[String]) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(r#"for l in "$@"; do printf '%s\n' "$l"; done"#)
        .arg("print_lines");
    cmd.args(lines);
    cmd
}
