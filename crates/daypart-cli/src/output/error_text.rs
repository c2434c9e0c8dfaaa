use daypart_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "The command could not finish.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    if let Some(path) = error
        .data
        .as_ref()
        .and_then(|data| data.get("source_path"))
        .and_then(Value::as_str)
    {
        lines.push(format!("  Source:   {path}"));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Rerun with --verbose and check the log on stderr.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use daypart_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_standard_error_layout() {
        let error = ClientError::invalid_argument_for_command("Invalid `start` date `x`.", Some("report"));

        let rendered = render_error(&error);
        assert!(rendered.starts_with("The command could not finish."));
        assert!(rendered.contains("  Error:    invalid_argument"));
        assert!(rendered.contains("  Details:  Invalid `start` date `x`."));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. Run `daypart report --help` for usage."));
        assert!(!rendered.contains("Source:"));
    }

    #[test]
    fn archive_errors_name_the_source() {
        let error = ClientError::archive_unreadable(Path::new("/data/export.zip"), "truncated");
        let rendered = render_error(&error);
        assert!(rendered.contains("  Source:   /data/export.zip"));
        assert!(rendered.contains("  2. Re-download"));
    }
}
