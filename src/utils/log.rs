// src/utils/log.rs

//! Multi-line log helpers on top of the `log` facade.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for line in summary_lines(items) {
        log::info!("{line}");
    }
}

fn summary_lines(items: &[(&str, String)]) -> Vec<String> {
    items
        .iter()
        .map(|(key, value)| format!("    {key}: {value}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_are_indented() {
        let lines = summary_lines(&[("Queued", "2 priority".to_string())]);
        assert_eq!(lines, vec!["    Queued: 2 priority".to_string()]);
    }
}
