use std::fmt::Display;

use crate::{
    storage::entities::{BlockValue, Blocks, DailyLogEntity},
    utils::percentage::Percentage,
};

use super::catalog::{Availability, BlockCatalog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    UnknownBlock(String),
    Locked {
        key: String,
        availability: Availability,
    },
}

impl Display for ToggleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToggleError::UnknownBlock(key) => write!(f, "There is no block named {key:?}"),
            ToggleError::Locked { key, availability } => {
                write!(f, "Block {key:?} can't be changed: {availability}")
            }
        }
    }
}

impl std::error::Error for ToggleError {}

/// Toggle state of every block for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySheet {
    catalog: BlockCatalog,
    states: Vec<bool>,
    /// Stored blocks that are not part of the catalog anymore. They are written back untouched.
    extra: Blocks,
}

impl DaySheet {
    pub fn new(catalog: &BlockCatalog) -> Self {
        Self {
            catalog: catalog.clone(),
            states: vec![false; catalog.len()],
            extra: Blocks::new(),
        }
    }

    /// Restores a sheet from a saved log.
    pub fn from_entity(catalog: &BlockCatalog, entity: &DailyLogEntity) -> Self {
        let mut sheet = Self::new(catalog);
        for (key, value) in &entity.blocks {
            match catalog.blocks().iter().position(|v| &v.key == key) {
                Some(index) => sheet.states[index] = value.is_done(),
                None => {
                    sheet.extra.insert(key.clone(), value.clone());
                }
            }
        }
        sheet
    }

    /// Flips a block if its window is open at `hour`. Returns the new state.
    pub fn toggle(&mut self, key: &str, hour: u32) -> Result<bool, ToggleError> {
        let index = self.index_of(key)?;
        let availability = self.catalog.blocks()[index].availability(hour);
        if availability != Availability::Open {
            return Err(ToggleError::Locked {
                key: key.into(),
                availability,
            });
        }
        Ok(self.flip(index))
    }

    /// Flips a block regardless of its window.
    pub fn force_toggle(&mut self, key: &str) -> Result<bool, ToggleError> {
        let index = self.index_of(key)?;
        Ok(self.flip(index))
    }

    fn index_of(&self, key: &str) -> Result<usize, ToggleError> {
        self.catalog
            .blocks()
            .iter()
            .position(|v| v.key == key)
            .ok_or_else(|| ToggleError::UnknownBlock(key.into()))
    }

    fn flip(&mut self, index: usize) -> bool {
        self.states[index] = !self.states[index];
        self.states[index]
    }

    pub fn is_done(&self, key: &str) -> bool {
        self.index_of(key).is_ok_and(|index| self.states[index])
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Completed catalog blocks.
    pub fn completed(&self) -> u32 {
        self.states.iter().filter(|v| **v).count() as u32
    }

    pub fn total(&self) -> u32 {
        self.states.len() as u32
    }

    pub fn progress(&self) -> Percentage {
        Percentage::of(self.completed(), self.total())
    }

    /// Flattens the sheet into the blocks mapping that gets stored.
    pub fn to_blocks(&self) -> Blocks {
        let mut blocks = self.extra.clone();
        for (block, state) in self.catalog.blocks().iter().zip(&self.states) {
            blocks.insert(block.key.clone(), BlockValue::Leaf(*state));
        }
        blocks
    }
}
