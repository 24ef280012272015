use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use maxiplay::api::{audios, auth, favorites, history, playlists};
use maxiplay::config::AppConfig;
use maxiplay::constants::SKIP_STEP_SECS;
use maxiplay::models::{Category, Track};
use maxiplay::services::{NotificationKind, Notifications, Session};
use maxiplay::state::SharedPlayerState;
use maxiplay::utils::formatting::format_millis;
use maxiplay::utils::{AudioController, RodioEngine};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "MaxiPlay";

#[derive(Parser)]
#[command(name = "maxiplay", version, about = "MaxiPlay command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    SignIn { email: String, password: String },
    /// Create an account; a verification code is sent by email
    SignUp {
        name: String,
        email: String,
        password: String,
    },
    /// Verify an email address with the code received
    Verify {
        user_id: String,
        /// One-time code; omit together with --resend to request a new one
        otp: Option<String>,
        #[arg(long)]
        resend: bool,
    },
    /// Show the signed-in profile
    Whoami,
    LogOut {
        /// Revoke every session of this account
        #[arg(long)]
        all: bool,
    },
    /// Latest uploads
    Latest,
    Favorites,
    History,
    Playlists,
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        about: String,
        #[arg(long, default_value = "Others")]
        category: Category,
        #[arg(long)]
        poster: Option<PathBuf>,
    },
    /// Play a list of tracks; type p/n/b/f/r/q + Enter to control playback
    Play {
        /// Play favorites instead of the latest uploads
        #[arg(long)]
        favorites: bool,
        /// Play the tracks of this playlist
        #[arg(long, conflicts_with = "favorites")]
        playlist: Option<String>,
        /// The playlist is one of your private playlists
        #[arg(long, requires = "playlist")]
        private: bool,
        /// Index in the list to start from
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long, default_value_t = 1.0)]
        rate: f32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .filter_module("rustls", log::LevelFilter::Warn)
        .init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    let cli = Cli::parse();
    let config = AppConfig::load();
    log::debug!("[Main] API at {}", config.api_url);

    let mut session = Session::open(&config).context("failed to open session")?;

    match cli.command {
        Command::SignIn { email, password } => {
            let profile = session.sign_in(&email, &password).await?;
            println!("Signed in as {} <{}>", profile.name, profile.email);
        }
        Command::SignUp {
            name,
            email,
            password,
        } => {
            let user = auth::sign_up(session.client(), &name, &email, &password).await?;
            println!("Account created. Verify with: maxiplay verify {} <code>", user.id);
        }
        Command::Verify {
            user_id,
            otp,
            resend,
        } => {
            if resend {
                auth::re_verify_email(session.client(), &user_id).await?;
                println!("A new code was sent");
            }
            if let Some(otp) = otp {
                let message = auth::verify_email(session.client(), &user_id, &otp).await?;
                println!("{}", message);
            } else if !resend {
                bail!("either a code or --resend is required");
            }
        }
        Command::Whoami => match session.restore().await? {
            Some(profile) => println!(
                "{} <{}>{} - {} followers, {} following",
                profile.name,
                profile.email,
                if profile.verified { "" } else { " (unverified)" },
                profile.followers,
                profile.followings
            ),
            None => println!("Not signed in"),
        },
        Command::LogOut { all } => {
            if let Err(e) = session.log_out(all).await {
                log::warn!("[Main] Server log out failed: {}", e);
            }
            println!("Signed out");
        }
        Command::Latest => print_tracks(&audios::fetch_latest_uploads(session.client()).await?),
        Command::Favorites => print_tracks(&favorites::fetch_favorites(session.client()).await?),
        Command::History => {
            for day in history::fetch_histories(session.client()).await? {
                println!("{}", day.date);
                for entry in day.audios {
                    println!("  {}  {}", entry.id, entry.title);
                }
            }
        }
        Command::Playlists => {
            for list in playlists::fetch_own_playlists(session.client()).await? {
                println!(
                    "{}  {} ({}, {} items)",
                    list.id, list.title, list.visibility, list.items_count
                );
            }
        }
        Command::Upload {
            file,
            title,
            about,
            category,
            poster,
        } => {
            let upload = audios::AudioUpload {
                title,
                about,
                category,
                file,
                poster,
            };
            audios::upload_audio(session.client(), &upload, |percent| {
                eprint!("\rUploading... {:>3}%", percent);
            })
            .await?;
            eprintln!();
            println!("Upload complete");
        }
        Command::Play {
            favorites: use_favorites,
            playlist,
            private,
            index,
            rate,
        } => {
            let tracks = if let Some(id) = playlist {
                playlists::fetch_playlist_audios(session.client(), &id, private)
                    .await?
                    .audios
            } else if use_favorites {
                favorites::fetch_favorites(session.client()).await?
            } else {
                audios::fetch_latest_uploads(session.client()).await?
            };
            play(tracks, index, rate).await?;
        }
    }

    Ok(())
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("Nothing here yet");
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{:>3}. {} - {} [{}]", i, track.title, track.owner.name, track.category);
    }
}

async fn play(tracks: Vec<Track>, index: usize, rate: f32) -> anyhow::Result<()> {
    let Some(first) = tracks.get(index).cloned() else {
        bail!("no track at index {} ({} available)", index, tracks.len());
    };

    let notifications = Notifications::new();
    let audio = AudioController::spawn(RodioEngine::new, SharedPlayerState::new(), notifications.clone());
    audio.set_rate(rate);
    audio.press(first, tracks.clone());

    let input = spawn_stdin_reader();
    let mut last_line = String::new();

    loop {
        match input.try_recv() {
            Ok(cmd) => match cmd.trim() {
                "p" => audio.toggle_play_pause(),
                "n" => audio.next(),
                "b" => audio.previous(),
                "f" => audio.skip(SKIP_STEP_SECS),
                "r" => audio.skip(-SKIP_STEP_SECS),
                "q" => break,
                other => eprintln!("unknown command {:?} (p/n/b/f/r/q)", other),
            },
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {}
        }

        for note in notifications.drain() {
            match note.kind {
                NotificationKind::Error => eprintln!("\nerror: {}", note.message),
                NotificationKind::Success => eprintln!("\n{}", note.message),
            }
        }

        if !audio.is_running() {
            bail!("audio output stopped");
        }

        let state = audio.snapshot();
        if let Some(track) = &state.on_going_audio {
            let line = format!(
                "{} {} - {}  {} / {}",
                if state.is_playing { ">" } else { "||" },
                track.title,
                track.owner.name,
                format_millis(state.position_ms),
                format_millis(state.duration_ms)
            );
            if line != last_line {
                eprint!("\r{:<80}", line);
                last_line = line;
            }

            if state.list_finished {
                eprintln!();
                println!("End of list");
                break;
            }
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    audio.stop();
    Ok(())
}

/// Lines typed on stdin, read on a separate thread
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
