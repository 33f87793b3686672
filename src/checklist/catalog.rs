use std::{collections::HashSet, fmt::Display, io::ErrorKind, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CATALOG_FILE: &str = "catalog.json";

/// Hours of the day, `[start_hour, end_hour)` in local time, during which a block can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Open,
    NotYetOpen,
    Closed,
}

impl TimeWindow {
    pub fn new_opt(start_hour: u32, end_hour: u32) -> Option<Self> {
        if start_hour < end_hour && end_hour <= 24 {
            Some(Self {
                start_hour,
                end_hour,
            })
        } else {
            None
        }
    }

    pub fn availability(&self, hour: u32) -> Availability {
        if hour < self.start_hour {
            Availability::NotYetOpen
        } else if hour >= self.end_hour {
            Availability::Closed
        } else {
            Availability::Open
        }
    }
}

fn format_hour(hour: u32) -> String {
    let period = if (12..24).contains(&hour) { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        v => v,
    };
    format!("{display_hour}:00 {period}")
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            format_hour(self.start_hour),
            format_hour(self.end_hour)
        )
    }
}

impl Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Open => write!(f, "open"),
            Availability::NotYetOpen => write!(f, "not available yet"),
            Availability::Closed => write!(f, "time window closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub window: Option<TimeWindow>,
}

impl BlockDefinition {
    pub fn new(key: &str, window: Option<TimeWindow>) -> Self {
        Self {
            key: key.into(),
            label: None,
            window,
        }
    }

    /// Label to show for the block. Falls back to a label derived from the key.
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| label_from_key(&self.key))
    }

    /// Blocks without a window are always open.
    pub fn availability(&self, hour: u32) -> Availability {
        self.window
            .map_or(Availability::Open, |window| window.availability(hour))
    }
}

/// Turns a camelCase key into a title, `morningPrayer` becomes `Morning Prayer`.
pub fn label_from_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (index, c) in key.chars().enumerate() {
        if index == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.push(c);
        } else {
            label.push(c);
        }
    }
    label
}

/// Ordered list of blocks the user tracks every day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCatalog {
    blocks: Vec<BlockDefinition>,
}

impl Default for BlockCatalog {
    fn default() -> Self {
        let window = |start, end| TimeWindow::new_opt(start, end);
        Self {
            blocks: vec![
                BlockDefinition::new("morningPrayer", window(5, 7)),
                BlockDefinition::new("workout", window(6, 9)),
                BlockDefinition::new("deepWork", window(9, 12)),
                BlockDefinition::new("reading", window(17, 19)),
                BlockDefinition::new("journaling", window(20, 22)),
                BlockDefinition::new("meditation", None),
            ],
        }
    }
}

impl BlockCatalog {
    pub fn new(blocks: Vec<BlockDefinition>) -> Result<Self> {
        let mut keys = HashSet::new();
        for block in &blocks {
            if block.key.is_empty() {
                bail!("Block keys can't be empty");
            }
            if !keys.insert(block.key.as_str()) {
                bail!("Block {:?} is defined more than once", block.key);
            }
            if let Some(window) = block.window {
                if TimeWindow::new_opt(window.start_hour, window.end_hour).is_none() {
                    bail!(
                        "Block {:?} has an illegal window {}-{}",
                        block.key,
                        window.start_hour,
                        window.end_hour
                    );
                }
            }
        }
        Ok(Self { blocks })
    }

    /// Reads `catalog.json` from the application directory, or uses the default catalog when the
    /// file doesn't exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CATALOG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No catalog at {path:?}, using default");
                return Ok(Self::default());
            }
            Err(e) => Err(e)?,
        };
        let blocks = serde_json::from_str::<Vec<BlockDefinition>>(&content)
            .with_context(|| format!("Failed to parse catalog {path:?}"))?;
        Self::new(blocks)
    }

    pub fn blocks(&self) -> &[BlockDefinition] {
        &self.blocks
    }

    pub fn get(&self, key: &str) -> Option<&BlockDefinition> {
        self.blocks.iter().find(|v| v.key == key)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
