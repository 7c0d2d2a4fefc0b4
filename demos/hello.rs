//! Hello Example - A framed window with a label, a check box and buttons
//!
//! This example demonstrates:
//! - Creating a frame and docking panels into it
//! - Grid and flow layouts
//! - Action and item listeners
//! - Closing the last window to leave the event loop
//!
//! Logs go to `hello.log`; set `RUST_LOG=cellwin=debug` to see more.
//!
//! Run with: cargo run --example hello

use std::fs::File;
use std::sync::Mutex;

use cellwin::{
    Button, CheckBox, CrosstermTerminal, Edge, FlowAlignment, FlowLayout, GridCell, GridLayout,
    ItemState, Label, Toolkit, ToolkitConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> cellwin::Result<()> {
    let log = File::create("hello.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let mut toolkit = Toolkit::new(CrosstermTerminal::new()?, ToolkitConfig::default())?;

    let frame = toolkit.create_frame("Hello", None)?;
    let tree = toolkit.tree_mut();

    let status = tree.create_widget(Label::new("Press a button"));
    tree.add(frame, status, Edge::Top)?;

    let options = tree.create_panel_with(GridLayout::new());
    let verbose = tree.create_widget(CheckBox::new("Verbose", false));
    let shout = tree.create_widget(CheckBox::new("Shout", true));
    tree.add(options, verbose, GridCell::at(0, 0))?;
    tree.add(options, shout, GridCell::at(0, 1))?;
    tree.add(frame, options, Edge::Center)?;

    let buttons = tree.create_panel_with(FlowLayout::new(FlowAlignment::Right));
    let greet = tree.create_widget(Button::new("Greet").with_command("greet"));
    let quit = tree.create_widget(Button::new("Quit"));
    tree.add_child(buttons, greet)?;
    tree.add_child(buttons, quit)?;
    tree.add(frame, buttons, Edge::Bottom)?;

    tree.add_action_listener(greet, move |toolkit, event| {
        let shouting = toolkit
            .tree()
            .widget::<CheckBox>(shout)
            .is_some_and(CheckBox::is_checked);
        let text = if shouting { "HELLO!" } else { "hello" };
        toolkit
            .tree_mut()
            .update_widget::<Label, _>(status, |label| label.set_text(text));
        tracing::info!(command = %event.command, text, "greeted");
    })?;

    tree.add_item_listener(verbose, |_, event| {
        let level = match event.state {
            ItemState::Selected => "verbose",
            ItemState::Deselected => "quiet",
        };
        tracing::info!(level, "verbosity changed");
    })?;

    tree.add_action_listener(quit, move |toolkit, _| {
        if let Err(err) = toolkit.hide(frame) {
            tracing::error!(%err, "could not close the frame");
        }
    })?;

    toolkit.pack(frame)?;
    toolkit.set_location_relative_to(frame, None)?;
    toolkit.show(frame)?;
    toolkit.run()
}
