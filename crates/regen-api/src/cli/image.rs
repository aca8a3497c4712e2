//! Image CLI commands: request, resolve, prompt.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use regen_core::orchestrator::{ImageRequestOrchestrator, ResolutionClient};
use regen_core::prompt::build_prompt;
use regen_core::retry::RetryPolicy;
use regen_infra::http_client::HttpResolutionClient;
use regen_types::image::{ImageRequestContext, ResolvedImage, SourceKind, is_inline_payload};

use crate::cli::ContextArgs;
use crate::state::AppState;

/// Run the full client flow once and record the result.
///
/// Prints the first pool entry when every attempt failed.
pub async fn request_image(
    state: &AppState,
    args: &ContextArgs,
    endpoint: Option<String>,
    local: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let context = args.to_context();
    let show_spinner = !json && !quiet;

    let identifier = if local {
        run_orchestrator(state, state.resolver.clone(), &context, show_spinner).await?
    } else {
        let endpoint = endpoint.unwrap_or_else(|| state.config.orchestrator.endpoint.clone());
        // One resolution may spend a full timeout on generation and another on ranking
        let timeout = Duration::from_secs(state.config.image.request_timeout_secs * 2);
        let client = HttpResolutionClient::new(endpoint, timeout)?;
        run_orchestrator(state, client, &context, show_spinner).await?
    };

    let fell_back = identifier.is_none();
    let identifier =
        identifier.unwrap_or_else(|| state.resolver.pool().primary().to_string());

    if json {
        println!(
            "{}",
            serde_json::json!({
                "imageUrl": identifier,
                "fallback": fell_back,
                "used": state.used_images.len(),
            })
        );
        return Ok(());
    }

    if fell_back {
        eprintln!(
            "  {} Resolution failed after {} attempts, using default background",
            style("!").yellow().bold(),
            state.config.orchestrator.max_attempts
        );
    }
    println!("{}", display_identifier(&identifier));
    Ok(())
}

async fn run_orchestrator<C: ResolutionClient>(
    state: &AppState,
    client: C,
    context: &ImageRequestContext,
    show_spinner: bool,
) -> Result<Option<String>> {
    let orchestrator = ImageRequestOrchestrator::new(client, state.used_images.clone())
        .with_retry_policy(RetryPolicy::new(state.config.orchestrator.max_attempts))
        .serialized(state.config.orchestrator.serialize_requests);

    let spinner = if show_spinner {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Resolving image...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let identifier = orchestrator.request_image(context).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    Ok(identifier)
}

/// Resolve in-process without recording anything.
pub async fn resolve_image(
    state: &AppState,
    args: &ContextArgs,
    exclude: &[String],
    unique: bool,
    json: bool,
) -> Result<()> {
    let context = args.to_context();

    let resolved = if unique {
        let used = state.used_images.exclusion_set();
        let rounds = u32::try_from(state.resolver.pool().len()).unwrap_or(u32::MAX);
        state.resolver.resolve_unique(&context, &used, rounds).await
    } else {
        state.resolver.resolve(&context, exclude).await
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    print_resolved(&resolved);
    Ok(())
}

/// Print the prompt for a context.
pub fn show_prompt(args: &ContextArgs, json: bool) -> Result<()> {
    let prompt = build_prompt(&args.to_context());
    if json {
        println!("{}", serde_json::json!({ "prompt": prompt }));
    } else {
        println!("{prompt}");
    }
    Ok(())
}

fn print_resolved(resolved: &ResolvedImage) {
    let source = match resolved.source {
        SourceKind::Generated => style("generated").magenta(),
        SourceKind::PoolSelected => style("pool").cyan(),
    };
    println!(
        "  {} {} ({})",
        style("✓").green().bold(),
        display_identifier(&resolved.identifier),
        source
    );
}

/// Inline payloads are summarized; everything else prints as-is.
fn display_identifier(identifier: &str) -> String {
    if !is_inline_payload(identifier) {
        return identifier.to_string();
    }
    let header = identifier.split(',').next().unwrap_or("data:");
    format!("{header},... ({} chars)", identifier.len())
}
