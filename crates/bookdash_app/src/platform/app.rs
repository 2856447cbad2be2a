use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use bookdash_client::ClientSettings;
use bookdash_core::{update, AppState, Msg, ResultRowKind};
use dash_logging::dash_info;

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::render;

/// Everything the main loop reacts to: terminal input or channel outcomes.
enum Input {
    Line(String),
    Msg(Msg),
    Eof,
}

pub fn run_app() -> anyhow::Result<()> {
    // Terminal output is the UI, so logs go to the file only.
    logging::initialize(LogDestination::File);

    let settings = client_settings_from_env();
    dash_info!("bookdash starting against {}", settings.channel.base_url);

    let (input_tx, input_rx) = mpsc::channel::<Input>();

    // Channel events become core messages through the effect runner; a small
    // forwarder folds them into the single input stream.
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(settings, msg_tx)?;
    let forward_tx = input_tx.clone();
    thread::spawn(move || {
        while let Ok(msg) = msg_rx.recv() {
            if forward_tx.send(Input::Msg(msg)).is_err() {
                break;
            }
        }
    });

    spawn_stdin_reader(input_tx);

    print_banner();

    let mut state = AppState::new();
    while let Ok(input) = input_rx.recv() {
        let msg = match input {
            Input::Eof => break,
            Input::Msg(msg) => msg,
            Input::Line(line) => match parse_line(&state, line.trim()) {
                Command::Quit => break,
                Command::Dispatch(msg) => msg,
                Command::Nothing => continue,
            },
        };
        state = dispatch(state, msg, &runner);
    }

    dash_info!("bookdash exiting");
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.enqueue(effects);
    if state.consume_dirty() {
        for line in render::render(&state.view()) {
            println!("{line}");
        }
    }
    state
}

enum Command {
    Quit,
    Dispatch(Msg),
    Nothing,
}

fn parse_line(state: &AppState, line: &str) -> Command {
    match line {
        "" => Command::Nothing,
        "/quit" | "/q" => Command::Quit,
        "/pause" => Command::Dispatch(Msg::PauseClicked),
        "/resume" => Command::Dispatch(Msg::ResumeClicked),
        "/retry" => Command::Dispatch(Msg::RetryClicked),
        "/save" => Command::Dispatch(Msg::SaveClicked),
        _ => {
            if let Some(rest) = line.strip_prefix("/pick ") {
                return pick_result(state, rest);
            }
            if line.starts_with('/') {
                println!("unknown command: {line}");
                return Command::Nothing;
            }
            Command::Dispatch(Msg::Submitted(line.to_string()))
        }
    }
}

fn pick_result(state: &AppState, index_text: &str) -> Command {
    let Ok(index) = index_text.trim().parse::<usize>() else {
        println!("usage: /pick <number>");
        return Command::Nothing;
    };
    let rows = state.view().search.rows;
    let Some(row) = index.checked_sub(1).and_then(|i| rows.get(i).cloned()) else {
        println!("no result #{index}");
        return Command::Nothing;
    };
    match row.kind {
        ResultRowKind::Verify => {
            println!("result #{index} needs manual verification: open {} in a browser", row.url);
            Command::Nothing
        }
        ResultRowKind::Download => Command::Dispatch(Msg::ResultPicked { url: row.url }),
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = input_tx.send(Input::Eof);
    });
}

fn client_settings_from_env() -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(base_url) = std::env::var("BOOKDASH_SERVER") {
        if !base_url.trim().is_empty() {
            settings.channel.base_url = base_url.trim().to_string();
        }
    }
    settings
}

fn print_banner() {
    println!("bookdash - paste a book URL to download, or type a keyword to search.");
    println!("commands: /pause /resume /retry /save /pick <n> /quit");
}
