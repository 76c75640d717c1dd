//! Interactive shelf board
//!
//! A three-column terminal view of the library using ratatui. Books are
//! relocated with the keyboard; every relocation is saved immediately.

mod app;
mod event;
mod ui;
mod view;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::app::Context;
use app::App;
use event::EventHandler;

/// Launch the board
pub fn run(ctx: &Context) -> Result<()> {
    let store = ctx.home.open_store()?;
    let mut app = App::new(store);

    let mut terminal = ui::init_terminal()?;
    let event_handler = EventHandler::new(250);

    // Restore the terminal even if the loop panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    let restore_result = ui::restore_terminal();

    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("Board panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("Board panicked: {}", s))
            } else {
                Err(anyhow!("Board panicked with unknown error"))
            }
        }
    }
}
