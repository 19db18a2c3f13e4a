use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use nginx_cache_purger::cli::args::{Cli, Commands, CompletionShell, ConfigAction, OutputFormat};
use nginx_cache_purger::cli::output::{self, CacheStatus};
use nginx_cache_purger::common::config::Config;
use nginx_cache_purger::common::{logging, permissions, safety};
use nginx_cache_purger::notice::{FileNoticeStore, NoticeSink};
use nginx_cache_purger::purge::{self, ExecutionContext, PurgeEngine, PurgeResult};
use nginx_cache_purger::triggers::{
    purge_action, ActionRequest, ManualTrigger, TriggerEvent, TriggerRegistry,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _log_guard = logging::init(cli.verbose);

    match cli.command {
        Commands::Purge {
            ref referer,
            ref session,
        } => cmd_purge(&cli, referer.clone(), session),

        Commands::Fire { ref event, batch } => cmd_fire(&cli, event, batch),

        Commands::Events => cmd_events(&cli),

        Commands::Notice { ref session } => cmd_notice(&cli, session),

        Commands::Status => cmd_status(&cli),

        Commands::Config { ref action } => cmd_config(&cli, action),

        Commands::Completions { ref shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                CompletionShell::Bash => clap_complete::Shell::Bash,
                CompletionShell::Zsh => clap_complete::Shell::Zsh,
                CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "nginx-cache-purger", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Config with the --cache-path override applied on top
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(path) = &cli.cache_path {
        config.cache_path = path.clone();
    }
    Ok(config)
}

fn spinner(cli: &Cli, message: &str) -> Result<Option<ProgressBar>> {
    if cli.quiet || !matches!(cli.format, OutputFormat::Human) {
        return Ok(None);
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(Some(pb))
}

fn print_result(cli: &Cli, result: &PurgeResult, config: &Config) -> Result<()> {
    match cli.format {
        OutputFormat::Human => output::print_purge_result(result, &config.cache_path),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::purge_result_json(result))?)
        }
        OutputFormat::Quiet => println!("{}", output::purge_result_quiet(result)),
    }
    Ok(())
}

// ─── Purge ────────────────────────────────────────────────────────────────────

fn cmd_purge(cli: &Cli, referer: Option<String>, session: &str) -> Result<()> {
    let config = load_config(cli)?;
    let engine = PurgeEngine::from_config(&config, ExecutionContext::Request);
    let notices = FileNoticeStore::default_location();
    let trigger = ManualTrigger::new(
        purge_action(engine),
        &notices,
        config.default_landing.clone(),
        config.notice_ttl_secs,
    );

    let request = ActionRequest {
        session: session.to_string(),
        referer,
    };

    let pb = spinner(cli, "Purging NGINX cache...")?;
    let (result, redirect) = trigger.handle_with_result(&request);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match cli.format {
        OutputFormat::Human => {
            output::print_purge_result(&result, &config.cache_path);
            output::print_redirect(&redirect);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "result": output::purge_result_json(&result),
                "redirect": {
                    "location": redirect.location,
                    "status": redirect.status,
                },
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            println!(
                "{}  {}",
                output::purge_result_quiet(&result),
                redirect.location
            );
        }
    }

    // The route ends here: nothing runs after the redirect
    Ok(())
}

// ─── Fire ─────────────────────────────────────────────────────────────────────

fn cmd_fire(cli: &Cli, event: &str, batch: bool) -> Result<()> {
    let event: TriggerEvent = event.parse()?;
    let config = load_config(cli)?;
    let context = ExecutionContext::from_batch_flag(batch);
    let engine = PurgeEngine::from_config(&config, context);
    let registry = TriggerRegistry::with_default_events(purge_action(engine));

    let pb = spinner(cli, &format!("Purging NGINX cache ({})...", event))?;
    let result = registry.dispatch(event);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match result {
        Some(result) => print_result(cli, &result, &config),
        None => {
            if !cli.quiet {
                println!("  {} '{}' is not bound to a purge", "ℹ️", event);
            }
            Ok(())
        }
    }
}

// ─── Events ───────────────────────────────────────────────────────────────────

fn cmd_events(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let engine = PurgeEngine::from_config(&config, ExecutionContext::Request);
    let registry = TriggerRegistry::with_default_events(purge_action(engine));
    let events: Vec<TriggerEvent> = registry.events().collect();

    match cli.format {
        OutputFormat::Human => output::print_events(&events),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::events_json(&events))?)
        }
        OutputFormat::Quiet => {
            for event in &events {
                println!("{}", event);
            }
        }
    }
    Ok(())
}

// ─── Notice ───────────────────────────────────────────────────────────────────

fn cmd_notice(cli: &Cli, session: &str) -> Result<()> {
    let notices = FileNoticeStore::default_location();
    let notice = notices.take(session)?;

    match cli.format {
        OutputFormat::Human => output::print_notice(notice.as_ref()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notice)?),
        OutputFormat::Quiet => {
            if let Some(n) = notice {
                println!("{}", n.message);
            }
        }
    }
    Ok(())
}

// ─── Status ───────────────────────────────────────────────────────────────────

fn cmd_status(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let path = config.cache_path.as_path();
    let exists = path.is_dir();

    let status = CacheStatus {
        path,
        exists,
        writable: permissions::can_write_dir(path),
        protected: safety::is_protected(path),
        usage: exists.then(|| purge::cache_usage(path)),
    };

    match cli.format {
        OutputFormat::Human => output::print_status(&status),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::status_json(&status))?)
        }
        OutputFormat::Quiet => {
            let usage = status.usage.clone().unwrap_or_default();
            println!("{}  {}  {}", path.display(), usage.files, usage.bytes);
        }
    }
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            if !Config::config_path().exists() {
                Config::default().save()?;
            }
            println!(
                "  {} Initialized at {}",
                "✓".green(),
                Config::data_dir().display()
            );
            println!("  Created: config.toml, logs/, notices/, locks/");
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(cli)?;
            println!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to render config")?
            );
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
            Ok(())
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_file()?;
            config.set(key, value)?;
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, value);
            Ok(())
        }
    }
}
