//! The daily checklist: which blocks exist ([catalog]), what was toggled today ([sheet]), and
//! how a day ends up in storage ([saver]).

pub mod catalog;
pub mod saver;
pub mod sheet;
