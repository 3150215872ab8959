//! Demonstration binary for the flagline dispatcher.
//!
//! Wires a dispatcher with the built-in `help`/`version` commands and a
//! small command set showing direct, store-backed, pattern-validated, and
//! duration flags. Run with no arguments for the instruction display.

use std::rc::Rc;
use std::thread;

use flagline_core::{
    Action, BoolStore, Command, Context, Dispatcher, ErrorHandling, ExitStatus, FlagSet, IntStore,
    PatternValue, TextStore, parse_duration,
};
use flagline_store::MemoryStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn greet_command(store: &Rc<MemoryStore>) -> Command {
    let mut flags = FlagSet::new("greet", ErrorHandling::Continue);
    flags.text_store(store, "name", "greet.name", "world", "Who to greet.");
    flags.bool_store(store, "shout", "greet.shout", false, "Shout the greeting.");
    flags.int_store(store, "repeat", "greet.repeat", 1, "How many times to greet.");
    flags.pattern_flag(
        "color",
        &["^(red|green|blue)$"],
        PatternValue::match_any(),
        "Accent color (red, green, or blue).",
    );

    let state = Rc::clone(store);
    Command::new(
        "",
        "greet",
        "Print a greeting.",
        1,
        false,
        Some(Action::run(move |_ctx, _args| {
            let mut line = format!("hello, {}", state.to_text("greet.name"));
            if state.to_bool("greet.shout") {
                line = line.to_uppercase();
            }
            for _ in 0..state.to_int("greet.repeat").max(1) {
                println!("{line}");
            }
            ExitStatus::Success
        })),
        flags,
    )
}

fn pause_command(store: &Rc<MemoryStore>) -> Command {
    let mut flags = FlagSet::new("pause", ErrorHandling::Continue);
    flags.text_store(
        store,
        "for",
        "pause.for",
        "1s",
        "How long to pause, e.g. 500ms or 2s.",
    );

    let state = Rc::clone(store);
    Command::new(
        "",
        "pause",
        "Pause for a while, then report.",
        2,
        false,
        Some(Action::run(move |_ctx, _args| {
            let text = state.to_text("pause.for");
            let span = match parse_duration(&text) {
                Ok(span) => span,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitStatus::UsageError;
                }
            };
            debug!(?span, "pausing");
            thread::sleep(span);
            println!("paused for {text}");
            ExitStatus::Success
        })),
        flags,
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let store = Rc::new(MemoryStore::new());
    let mut dispatcher = Dispatcher::new("flagline-demo");
    dispatcher
        .add_builtin("help", &[])
        .add_builtin(
            "version",
            &[env!("CARGO_PKG_NAME"), PACKAGE_VERSION, "dev", "unreleased"],
        )
        .set_group("demo", 1, vec![greet_command(&store), pause_command(&store)]);

    let arguments: Vec<String> = std::env::args().collect();
    let mut ctx = Context::new();
    let outcome = dispatcher.execute(&mut ctx, &arguments);
    std::process::exit(match outcome {
        0 => 0,
        -1 => 1,
        _ => 2,
    });
}
