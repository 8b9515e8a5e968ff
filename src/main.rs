// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Music panel player.
//!
//! A line-oriented terminal driver for the playlist and playback controller,
//! playing local files through MPV.
//!
//! It uses an event-driven architecture where:
//!
//! * An **Input Thread** reads commands from standard input.
//! * The **MPV Worker** reports playback callbacks from the media sink.
//! * The **Main Thread** applies input, sink callbacks and controller
//!   notifications one at a time, in arrival order.
//!
//! All three sources are funnelled into a single `std::sync::mpsc` channel, so
//! no two mutations of the playback state ever overlap.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use anyhow::{Context, Result, bail};
use clap::Parser;

use panelplay::{
    PlaybackState, PlayerNotification, SinkEvent, Transport, TransportOptions,
    config::{self, AppConfig},
    player::mpv::MpvSink,
    provision::{FileProvider, expand_sources},
    util::format::{format_progress, format_time},
};

type AppTransport = Transport<FileProvider, MpvSink, Sender<PlayerNotification>>;

const HELP: &str = "commands: add <path> | rm <n> | play <n> | toggle | next | prev | \
                    seek <0-1> | vol <0-1> | stop | clear | list | quit";

#[derive(Parser, Debug)]
#[command(name = "panelplay")]
#[command(about = "Play a playlist of local audio files", long_about = None)]
struct Args {
    /// Files or directories to add to the playlist
    paths: Vec<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Do not start playing when tracks are added
    #[arg(long)]
    no_autoplay: bool,
}

#[derive(Debug)]
enum AppEvent {
    Input(String),
    Sink(SinkEvent),
    Player(PlayerNotification),
    ExitApplication,
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, builds the transport, adds
/// the tracks named on the command line and in the configuration, then hands
/// control to the event loop.
fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = config::load_config();

    let (event_tx, event_rx) = mpsc::channel();
    let (sink_tx, sink_rx) = mpsc::channel();
    let (notification_tx, notification_rx) = mpsc::channel();

    forward(sink_rx, event_tx.clone(), AppEvent::Sink);
    forward(notification_rx, event_tx.clone(), AppEvent::Player);
    spawn_input_reader(event_tx);

    let mut options = TransportOptions::from(&config);
    if args.no_autoplay {
        options.autoplay = false;
    }

    let mut transport = Transport::new(
        FileProvider::new(),
        MpvSink::new(sink_tx),
        notification_tx,
        options,
    );

    let paths: Vec<PathBuf> = config
        .media_dirs
        .iter()
        .map(PathBuf::from)
        .chain(args.paths)
        .collect();
    add_paths(&mut transport, &config, paths);

    println!("{}", HELP);

    process_events(&mut transport, &mut config, event_rx).context("Application error occurred")
}

/// Re-sends everything received on `rx` as application events.
fn forward<T: Send + 'static>(rx: Receiver<T>, tx: Sender<AppEvent>, wrap: fn(T) -> AppEvent) {
    thread::spawn(move || {
        for item in rx {
            if tx.send(wrap(item)).is_err() {
                break;
            }
        }
    });
}

/// Spawns a thread translating lines of standard input into events. End of
/// input exits the application.
fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::ExitApplication);
    });
}

/// Runs the main loop until the user quits or every event source is gone.
fn process_events(
    transport: &mut AppTransport,
    config: &mut AppConfig,
    event_rx: Receiver<AppEvent>,
) -> Result<()> {
    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Input(line) => match process_input(transport, config, &line) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("{:#}", e),
            },
            AppEvent::Sink(event) => transport.handle_sink_event(event),
            AppEvent::Player(notification) => render_notification(transport, notification)?,
            AppEvent::ExitApplication => break,
        }
    }

    transport.stop();

    Ok(())
}

/// Maps one line of input to a transport operation. Returns `false` when the
/// user asked to quit.
fn process_input(transport: &mut AppTransport, config: &mut AppConfig, line: &str) -> Result<bool> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(true);
    };
    let argument = words.collect::<Vec<_>>().join(" ");

    match command {
        "add" | "a" => add_paths(transport, config, [PathBuf::from(argument)]),
        "rm" | "remove" => {
            let removed = transport.remove_track(parse_position(&argument)?)?;
            println!("Removed {}", removed.display_name);
        }
        "play" => transport.play_at(parse_position(&argument)?)?,
        "toggle" | "p" => transport.toggle_play_pause()?,
        "next" | "n" => transport.next()?,
        "prev" | "b" => transport.prev()?,
        "seek" => transport.seek(parse_fraction(&argument)?),
        "vol" | "volume" => {
            transport.set_volume(parse_fraction(&argument)?);
            config.volume = transport.volume();
            if let Err(e) = config::save_config(config) {
                log::warn!("Failed to save volume: {}", e);
            }
        }
        "stop" | "s" => transport.stop(),
        "clear" | "c" => transport.clear_all(),
        "list" | "l" => print_playlist(transport),
        "quit" | "q" => return Ok(false),
        _ => println!("{}", HELP),
    }

    Ok(true)
}

fn add_paths<I>(transport: &mut AppTransport, config: &AppConfig, paths: I)
where
    I: IntoIterator<Item = PathBuf>,
{
    let report = transport.add_tracks(expand_sources(paths, &config.extensions));

    for error in &report.failed {
        eprintln!("{}", error);
    }
    if !report.added.is_empty() {
        print_playlist(transport);
    }
}

/// Positions are shown and entered counting from 1.
fn parse_position(argument: &str) -> Result<usize> {
    let position: usize = argument
        .parse()
        .with_context(|| format!("Not a track number: '{}'", argument))?;

    match position.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("Track numbers start at 1"),
    }
}

fn parse_fraction(argument: &str) -> Result<f64> {
    argument
        .parse()
        .with_context(|| format!("Not a number: '{}'", argument))
}

fn print_playlist(transport: &AppTransport) {
    let current = transport.current_index();

    for (index, track) in transport.tracks().iter().enumerate() {
        let marker = if Some(index) == current { '>' } else { ' ' };
        let duration = track
            .duration
            .map(|d| format!(" ({})", format_time(d.as_secs_f64())))
            .unwrap_or_default();
        println!("{} {:>3}. {}{}", marker, index + 1, track.display_name, duration);
    }
}

fn render_notification(transport: &AppTransport, notification: PlayerNotification) -> Result<()> {
    let mut stdout = io::stdout();

    match notification {
        PlayerNotification::StateChanged { state, current } => {
            let label = match state {
                PlaybackState::Idle => "stopped",
                PlaybackState::Loading => "loading",
                PlaybackState::Playing => "playing",
                PlaybackState::Paused => "paused",
                PlaybackState::Errored => "error",
            };
            writeln!(stdout, "\n[{}] {}", label, transport.track_label(current))?;
        }
        PlayerNotification::Progress { progress, .. } => {
            write!(stdout, "\r{}   ", format_progress(&progress))?;
            stdout.flush()?;
        }
        PlayerNotification::Failed(error) => eprintln!("\n{}", error),
    }

    Ok(())
}
