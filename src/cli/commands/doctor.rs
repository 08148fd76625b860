//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::source::SourceKind;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Murmur Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Sources").bold());
    for kind in SourceKind::all() {
        let enabled = settings.search.sources.contains(kind);
        let check = check_credential(
            &format!("{} ({})", kind.label(), settings.credential_env(*kind)),
            settings.credential_env(*kind),
            credential_hint(*kind),
            enabled,
        );
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Models").bold());
    let summarizer = check_credential(
        &format!("Summarizer ({})", settings.summarizer.api_key_env),
        &settings.summarizer.api_key_env,
        "Create a key at https://aistudio.google.com/apikey",
        true,
    );
    summarizer.print();
    checks.push(summarizer);

    if settings.agent.api_key_env != settings.summarizer.api_key_env {
        let agent = check_credential(
            &format!("Agent ({})", settings.agent.api_key_env),
            &settings.agent.api_key_env,
            "Only needed for 'murmur agent'",
            false,
        );
        agent.print();
        checks.push(agent);
    }
    Output::kv("Summary model", &format!("{} ({} mode)", settings.summarizer.model, settings.summarizer.mode));
    Output::kv("Agent model", &settings.agent.model);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(config_path),
        check_settings(settings),
        check_prompts(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running a report.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Murmur is ready to use.");
    }

    Ok(())
}

/// Check a credential variable. Missing keys are errors only when `required`.
fn check_credential(name: &str, var: &str, hint: &str, required: bool) -> CheckResult {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            CheckResult::ok(name, &format!("configured ({})", mask(value.trim())))
        }
        Ok(_) if required => CheckResult::error(name, "empty", hint),
        Err(_) if required => CheckResult::error(name, "not set", hint),
        _ => CheckResult::warning(name, "not set (source disabled)", hint),
    }
}

fn credential_hint(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Twitter => "Get a key at https://twitterapi.io",
        SourceKind::Youtube => "Get a token at https://console.apify.com/settings/integrations",
        SourceKind::Linkedin => "Get a key at https://dashboard.exa.ai",
    }
}

/// Show the first and last few characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: murmur config init (or murmur config edit)",
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    if let Err(e) = settings.validate() {
        return CheckResult::error("Settings", &e.to_string(), "Fix the value in the config file");
    }
    if settings.search.sources.is_empty() {
        return CheckResult::warning(
            "Settings",
            "no sources enabled",
            "Set search.sources or pass --sources to 'murmur report'",
        );
    }
    let report_path = settings.report_path(None);
    let message = format!(
        "{} source(s), {} day lookback, report to {}",
        settings.search.sources.len(),
        settings.search.lookback_days,
        report_path.display()
    );
    match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => CheckResult::warning(
            "Settings",
            &message,
            "The report directory does not exist and will not be created",
        ),
        _ => CheckResult::ok("Settings", &message),
    }
}

fn check_prompts(settings: &Settings) -> CheckResult {
    match Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    ) {
        Ok(_) => match &settings.prompts.custom_dir {
            Some(dir) => CheckResult::ok("Prompts", &format!("custom ({})", dir)),
            None => CheckResult::ok("Prompts", "built-in"),
        },
        Err(e) => CheckResult::error("Prompts", &e.to_string(), "Fix the prompt TOML files"),
    }
}
