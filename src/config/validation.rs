use std::time::Duration;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.seasons.start > config.seasons.end {
        errors.push(format!(
            "seasons: start {} is after end {}",
            config.seasons.start, config.seasons.end
        ));
    }

    if config.weeks.start > config.weeks.end {
        errors.push(format!(
            "weeks: start {} is after end {}",
            config.weeks.start, config.weeks.end
        ));
    }

    if let Err(e) = humantime::parse_duration(&config.request_delay) {
        errors.push(format!(
            "request_delay: invalid duration '{}' - {}",
            config.request_delay, e
        ));
    }

    check_template(&mut errors, "sources.rankings", &config.sources.rankings, true);
    check_template(&mut errors, "sources.results", &config.sources.results, true);

    if config.sources.conferences.is_empty() {
        errors.push("sources.conferences: at least one URL is required".to_string());
    }
    for (i, url) in config.sources.conferences.iter().enumerate() {
        check_template(&mut errors, &format!("sources.conferences[{}]", i), url, false);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_template(errors: &mut Vec<String>, field: &str, template: &str, per_week: bool) {
    if !template.contains("{year}") {
        errors.push(format!("{}: '{}' is missing {{year}}", field, template));
    }
    if per_week && !template.contains("{week}") {
        errors.push(format!("{}: '{}' is missing {{week}}", field, template));
    }
}

/// Parsed request delay. Only call after `validate_config` passed.
pub fn request_delay(config: &Config) -> Duration {
    humantime::parse_duration(&config.request_delay).unwrap_or(Duration::from_millis(500))
}
