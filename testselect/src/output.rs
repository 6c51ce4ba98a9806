use std::io::Write;
use std::path::Path;

use testselect_core::TestPlan;

/// One name per line, each newline-terminated. An empty plan renders as an empty string.
pub fn render_test_list(plan: &TestPlan) -> String {
    plan.lines()
        .into_iter()
        .map(|name| format!("{name}\n"))
        .collect()
}

/// Writes the rendered plan through a temp file in the target directory so readers never
/// observe a half-written list. The result is mode 0644 on unix.
pub fn write_test_list(path: &Path, plan: &TestPlan) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(render_test_list(plan).as_bytes())?;
    tmp.flush()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
