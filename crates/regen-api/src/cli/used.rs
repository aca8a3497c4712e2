//! Used image list CLI commands: list, clear.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use regen_types::image::is_inline_payload;

use crate::state::AppState;

/// List recorded identifiers, oldest first.
pub fn list_used(state: &AppState, json: bool) -> Result<()> {
    let entries = state.used_images.snapshot();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "backend": state.used_images.backend(),
                "capacity": state.config.store.capacity,
                "entries": entries,
            })
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        println!(
            "  {} No images recorded yet. Request one with: {}",
            style("i").blue().bold(),
            style("regen request").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Identifier").fg(Color::White),
    ]);

    for (i, entry) in entries.iter().enumerate() {
        let cell = if is_inline_payload(entry) {
            Cell::new(format!("(inline image, {} chars)", entry.len())).fg(Color::DarkGrey)
        } else {
            Cell::new(entry).fg(Color::Cyan)
        };
        table.add_row(vec![Cell::new(i + 1), cell]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} of {} slots used ({} backend)",
        style(entries.len()).bold(),
        state.config.store.capacity,
        state.used_images.backend()
    );
    println!();

    Ok(())
}

/// Forget every recorded identifier.
pub async fn clear_used(state: &AppState, force: bool, json: bool) -> Result<()> {
    let count = state.used_images.len();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Forget {} recorded image{}?",
                style(count).red().bold(),
                if count == 1 { "" } else { "s" }
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.used_images.clear().await;

    if json {
        println!("{}", serde_json::json!({"cleared": count}));
    } else {
        println!(
            "  {} Cleared {} recorded image{}",
            style("✓").green().bold(),
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
