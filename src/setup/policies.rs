//! Monitoring, scheduling, and retention configuration.

use crate::config::{MonitoringConfig, RetentionConfig, SchedulingConfig};
use crate::error::{Result, SetupError};
use crate::utils::cron;
use crate::utils::prompt::Prompter;

/// Prompt for alerting toggles and their endpoints.
pub fn configure_monitoring(prompter: &dyn Prompter) -> Result<MonitoringConfig> {
    let enable_prometheus = prompter.confirm("Enable Prometheus metrics export?", false)?;

    let enable_email_alerts = prompter.confirm("Enable email alerts?", false)?;
    let (alert_email, smtp_server, smtp_port) = if enable_email_alerts {
        let alert_email = prompter.input("Alert email address", None)?;
        let smtp_server = prompter.input("SMTP server", None)?;
        let smtp_port = parse_number::<u16>(&prompter.input("SMTP port", Some("587"))?)?;
        (alert_email, smtp_server, smtp_port)
    } else {
        (String::new(), String::new(), 0)
    };

    let enable_slack_alerts = prompter.confirm("Enable Slack alerts?", false)?;
    let slack_webhook = if enable_slack_alerts {
        prompter.input("Slack webhook URL", None)?
    } else {
        String::new()
    };

    Ok(MonitoringConfig {
        enable_prometheus,
        enable_email_alerts,
        enable_slack_alerts,
        alert_email,
        smtp_server,
        smtp_port,
        slack_webhook,
    })
}

/// Prompt for the cron schedule and retention counts.
///
/// The schedule must be valid cron syntax before the generator runs, and
/// at least one retention count must be positive.
pub fn configure_scheduling(prompter: &dyn Prompter) -> Result<(SchedulingConfig, RetentionConfig)> {
    let cron_schedule = prompter.input("Cron schedule for backups", Some("0 2 * * *"))?;
    if !cron::validate_cron_schedule(&cron_schedule) {
        return Err(SetupError::validation(format!(
            "invalid cron expression: {cron_schedule}"
        )));
    }

    let hourly = parse_number::<u32>(&prompter.input("Hourly backups to retain", Some("0"))?)?;
    let daily = parse_number::<u32>(&prompter.input("Daily backups to retain", Some("7"))?)?;
    let weekly = parse_number::<u32>(&prompter.input("Weekly backups to retain", Some("4"))?)?;
    let monthly = parse_number::<u32>(&prompter.input("Monthly backups to retain", Some("6"))?)?;

    let retention = RetentionConfig {
        hourly,
        daily,
        weekly,
        monthly,
    };
    if !retention.any_retained() {
        return Err(SetupError::validation(
            "at least one retention count must be positive",
        ));
    }

    Ok((SchedulingConfig { cron_schedule }, retention))
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| SetupError::validation(format!("invalid number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::prompt::scripted::{Answer, ScriptedPrompter};

    #[test]
    fn test_monitoring_all_disabled() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Confirm(false),
            Answer::Confirm(false),
            Answer::Confirm(false),
        ]);

        let monitoring = configure_monitoring(&prompter).unwrap();
        assert!(!monitoring.enable_prometheus);
        assert!(!monitoring.enable_email_alerts);
        assert!(!monitoring.enable_slack_alerts);
        assert!(monitoring.alert_email.is_empty());
        assert_eq!(monitoring.smtp_port, 0);
    }

    #[test]
    fn test_monitoring_email_collects_endpoints() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Confirm(true),
            Answer::Confirm(true),
            Answer::Input("ops@example.com".into()),
            Answer::Input("smtp.example.com".into()),
            Answer::Input(String::new()),
            Answer::Confirm(false),
        ]);

        let monitoring = configure_monitoring(&prompter).unwrap();
        assert!(monitoring.enable_prometheus);
        assert!(monitoring.enable_email_alerts);
        assert_eq!(monitoring.alert_email, "ops@example.com");
        assert_eq!(monitoring.smtp_server, "smtp.example.com");
        assert_eq!(monitoring.smtp_port, 587);
    }

    #[test]
    fn test_scheduling_defaults() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(String::new()),
            Answer::Input(String::new()),
            Answer::Input(String::new()),
            Answer::Input(String::new()),
            Answer::Input(String::new()),
        ]);

        let (scheduling, retention) = configure_scheduling(&prompter).unwrap();
        assert_eq!(scheduling.cron_schedule, "0 2 * * *");
        assert_eq!(retention.hourly, 0);
        assert_eq!(retention.daily, 7);
        assert_eq!(retention.weekly, 4);
        assert_eq!(retention.monthly, 6);
    }

    #[test]
    fn test_invalid_cron_rejected() {
        let prompter = ScriptedPrompter::new(vec![Answer::Input("every day at 2am".into())]);
        let err = configure_scheduling(&prompter).unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }

    #[test]
    fn test_all_zero_retention_rejected() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(String::new()),
            Answer::Input("0".into()),
            Answer::Input("0".into()),
            Answer::Input("0".into()),
            Answer::Input("0".into()),
        ]);

        let err = configure_scheduling(&prompter).unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }
}
