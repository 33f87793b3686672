use anyhow::Result;
use ansi_term::Colour;

use crate::{
    checklist::{
        catalog::{Availability, BlockCatalog},
        saver::DailyLogSaver,
        sheet::DaySheet,
    },
    storage::log_storage::LogStorage,
    utils::percentage::Percentage,
};

const PROGRESS_WIDTH: usize = 20;

/// Command to process `toggle`. Every key is flipped on today's sheet and the sheet is saved once
/// at the end. Nothing is saved if any of the keys can't be toggled.
pub async fn process_toggle_command<S: LogStorage>(
    saver: &DailyLogSaver<S>,
    user: &str,
    catalog: &BlockCatalog,
    keys: &[String],
    force: bool,
) -> Result<()> {
    let mut sheet = saver.load_today(user, catalog).await?;
    let hour = saver.hour();
    for key in keys {
        let done = if force {
            sheet.force_toggle(key)?
        } else {
            sheet.toggle(key, hour)?
        };
        println!("{}\t{}", mark(done), key);
    }
    let saved = saver.save(user, &sheet).await?;
    println!(
        "Progress saved for {}: {}/{} ({}%)",
        saved.date, saved.completed_count, saved.total_blocks, saved.score
    );
    Ok(())
}

pub async fn print_today<S: LogStorage>(
    saver: &DailyLogSaver<S>,
    user: &str,
    catalog: &BlockCatalog,
) -> Result<()> {
    let sheet = saver.load_today(user, catalog).await?;
    println!("{}", saver.today_key());
    print_sheet(&sheet, saver.hour());
    println!();
    println!(
        "{} {} ({}/{})",
        progress_bar(sheet.progress(), PROGRESS_WIDTH),
        sheet.progress(),
        sheet.completed(),
        sheet.total()
    );
    Ok(())
}

fn print_sheet(sheet: &DaySheet, hour: u32) {
    for block in sheet.catalog().blocks() {
        println!(
            "{}\t{}\t{}",
            mark(sheet.is_done(&block.key)),
            block.label(),
            describe_window(block.window.map(|v| v.to_string()), block.availability(hour))
        );
    }
}

pub fn print_blocks(catalog: &BlockCatalog, hour: u32) {
    for block in catalog.blocks() {
        println!(
            "{}\t{}\t{}",
            block.key,
            block.label(),
            describe_window(block.window.map(|v| v.to_string()), block.availability(hour))
        );
    }
}

fn mark(done: bool) -> String {
    if done {
        Colour::Green.paint("[x]").to_string()
    } else {
        "[ ]".to_string()
    }
}

fn describe_window(window: Option<String>, availability: Availability) -> String {
    match (window, availability) {
        (None, _) => "any time".to_string(),
        (Some(window), Availability::Open) => window,
        (Some(window), locked) => format!("{window} ({})", Colour::Yellow.paint(locked.to_string())),
    }
}

/// Text rendition of the progress ring, `[#####---------------]`.
pub fn progress_bar(progress: Percentage, width: usize) -> String {
    let filled = (*progress as usize * width + 50) / 100;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
