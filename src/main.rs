// Defensive programming lints - prevent panics and unsafe patterns
#![deny(clippy::indexing_slicing)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::fallible_impl_from)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::fn_params_excessive_bools)]
// Idiomatic Rust lints
#![warn(clippy::needless_return)]
#![warn(clippy::let_and_return)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::explicit_iter_loop)]

mod agents;
mod app;
mod config;
mod logging;
mod prompt;
mod services;
mod storage;
mod ui;

use agents::ModelGateway;
use app::chat::controller::{CHAT_CONNECTION_DISRUPTED, ChatController};
use app::{App, AppMode, ChatRole, HOROSCOPE_FAILED, UserProfile, VisionState};
use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use services::vision;
use std::{io, time::Duration};
use storage::ProfileStore;

fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let config = config::Config::load()?;
    let log_path = logging::init(&config)?;
    tracing::info!(log = %log_path.display(), version = env!("CARGO_PKG_VERSION"), "astroguide starting");

    // Check for command-line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        return handle_cli_args(&args, &config);
    }

    let mut app = App::init(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn handle_cli_args(args: &[String], config: &config::Config) -> Result<()> {
    let cmd = args
        .get(1)
        .ok_or_else(|| color_eyre::eyre::eyre!("No command provided"))?;
    let program_name = args.first().map_or("astroguide", String::as_str);

    match cmd.as_str() {
        "--help" | "-h" => print_help(program_name),
        "--version" | "-v" => println!("AstroGuide v{}", env!("CARGO_PKG_VERSION")),
        "profile" => {
            let profile = require_profile(config)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        "horoscope" => {
            let profile = require_profile(config)?;
            let gateway = ModelGateway::new(&config.gemini)?;
            match gateway.generate_daily_horoscope(&profile) {
                Ok(horoscope) => println!("{}", serde_json::to_string_pretty(&horoscope)?),
                Err(error) => {
                    tracing::error!(error = %error, "horoscope command failed");
                    eprintln!("{}", HOROSCOPE_FAILED);
                    std::process::exit(1);
                }
            }
        }
        "face" => {
            let Some(path) = args.get(2).and_then(|raw| vision::parse_image_path(raw)) else {
                eprintln!("Usage: {} face <image-path>", program_name);
                std::process::exit(1);
            };
            let gateway = ModelGateway::new(&config.gemini)?;
            let analysis = vision::read_image(&path)
                .and_then(|image_bytes| gateway.analyze_face(&image_bytes));
            match analysis {
                Ok(text) => println!("{}", text),
                Err(error) => {
                    tracing::error!(error = %error, "face command failed");
                    eprintln!("{}", vision::FACE_ANALYSIS_FAILED);
                    std::process::exit(1);
                }
            }
        }
        "ask" => {
            let question = args.get(2..).map(|words| words.join(" ")).unwrap_or_default();
            if question.trim().is_empty() {
                eprintln!("Usage: {} ask <question>", program_name);
                std::process::exit(1);
            }
            let profile = require_profile(config)?;
            let gateway = ModelGateway::new(&config.gemini)?;
            let mut session = gateway.start_chat_session(&profile);
            let controller = ChatController::open(profile).run_round(&question, &mut session);

            let mut failed = false;
            for message in controller.transcript().iter().skip(1) {
                let speaker = match message.role {
                    ChatRole::User => "你",
                    ChatRole::Model => "命理師",
                };
                println!("[{} {}] {}", message.display_time(), speaker, message.text);
                failed = message.role == ChatRole::Model && message.text == CHAT_CONNECTION_DISRUPTED;
            }
            if failed {
                std::process::exit(1);
            }
        }
        cmd_str => {
            eprintln!("Unknown command: {}", cmd_str);
            eprintln!("Run with --help for available commands.");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Loads the saved profile or exits with a hint to create one
fn require_profile(config: &config::Config) -> Result<UserProfile> {
    let store = ProfileStore::open(&config.data_dir()?);
    match store.load() {
        Some(profile) => Ok(profile),
        None => {
            eprintln!("No saved profile. Run without arguments to set one up.");
            std::process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    println!("AstroGuide - astrology consultant for the terminal");
    println!();
    println!("Usage: {} [command]", program_name);
    println!();
    println!("Commands:");
    println!("  horoscope      - Print today's horoscope for the saved profile as JSON");
    println!("  face <path>    - Analyze a face photo (JPEG, PNG, WebP, GIF)");
    println!("  ask <question> - Ask the consultant one question");
    println!("  profile        - Print the saved profile");
    println!("  --help         - Show this help");
    println!("  --version      - Show version");
    println!();
    println!("Run without arguments to start interactive mode.");
    println!("The Gemini API key is read from config.toml, GEMINI_API_KEY or API_KEY.");
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.check_app_events();
        tick_loading_animation(app);
        app.clear_expired_status_toast();

        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        // Poll for events with a timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle KeyPress events to avoid duplicate handling
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.should_quit = true;
                        continue;
                    }

                    match app.mode {
                        AppMode::Home => handle_home_mode(app, key.code),
                        AppMode::Daily => handle_daily_mode(app, key.code),
                        AppMode::Chat => handle_chat_mode(app, key.code),
                        AppMode::Vision => handle_vision_mode(app, key.code),
                        AppMode::Profile => handle_profile_mode(app, key.code),
                        AppMode::Help => handle_help_mode(app, key.code),
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Paste(paste) => handle_paste(app, &paste),
                Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

fn tick_loading_animation(app: &mut App) {
    use std::time::Instant;
    if !app.is_loading() {
        app.loading_frame = 0;
        app.last_loading_tick = None;
        return;
    }

    let now = Instant::now();
    let should_tick = app
        .last_loading_tick
        .is_none_or(|last_tick| now.duration_since(last_tick) >= Duration::from_millis(200));

    if should_tick {
        app.loading_frame = app.loading_frame.wrapping_add(1);
        app.last_loading_tick = Some(now);
    }
}

/// Number keys jump straight to a navigation tab
fn navigate_by_digit(app: &mut App, digit: char) {
    if let Some(target) = AppMode::from_digit(digit) {
        app.navigate(target);
    }
}

fn handle_home_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('p') => app.navigate(AppMode::Profile),
        KeyCode::Char('?') => app.open_help(),
        KeyCode::Char(digit) => navigate_by_digit(app, digit),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Esc
        | KeyCode::Enter
        | KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_daily_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.navigate(AppMode::Home),
        KeyCode::Char('r') => app.retry_horoscope(),
        KeyCode::Char(digit) => navigate_by_digit(app, digit),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Enter
        | KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_chat_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.navigate(AppMode::Home),
        KeyCode::Enter => app.send_chat_message(),
        KeyCode::Char(character) => app.add_chat_input_char(character),
        KeyCode::Backspace => app.remove_chat_input_char(),
        KeyCode::Delete => app.chat_input.delete_char(),
        KeyCode::Left => app.chat_input.move_left(),
        KeyCode::Right => app.chat_input.move_right(),
        KeyCode::Home => app.chat_input.move_to_start(),
        KeyCode::End => app.chat_input.move_to_end(),
        KeyCode::Up => app.scroll_chat_up_lines(3),
        KeyCode::Down => app.scroll_chat_down_lines(3),
        KeyCode::PageUp => app.scroll_chat_up_page(),
        KeyCode::PageDown => app.scroll_chat_down_page(),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_vision_mode(app: &mut App, key_code: KeyCode) {
    let editing = app.vision == VisionState::Idle;
    match key_code {
        KeyCode::Esc => app.navigate(AppMode::Home),
        KeyCode::Enter if editing => app.start_face_analysis(),
        KeyCode::Char(character) if editing => app.add_vision_input_char(character),
        KeyCode::Backspace if editing => app.remove_vision_input_char(),
        KeyCode::Left if editing => app.vision_input.move_left(),
        KeyCode::Right if editing => app.vision_input.move_right(),
        KeyCode::Char('r') => {
            if matches!(app.vision, VisionState::Done(_) | VisionState::Failed) {
                app.reset_vision();
            }
        }
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Enter
        | KeyCode::Char(_)
        | KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_profile_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc => app.navigate(AppMode::Home),
        KeyCode::Enter => app.save_profile_form(),
        KeyCode::Tab | KeyCode::Down => app.profile_form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.profile_form.previous_field(),
        KeyCode::Char(character) => app.add_profile_char(character),
        KeyCode::Backspace => app.remove_profile_char(),
        KeyCode::Left => {
            if let Some(input) = app.profile_form.focused_input_mut() {
                input.move_left();
            }
        }
        KeyCode::Right => {
            if let Some(input) = app.profile_form.focused_input_mut() {
                input.move_right();
            }
        }
        KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_help_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_help(),
        KeyCode::Char(digit) => navigate_by_digit(app, digit),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: event::MouseEvent) {
    if app.mode != AppMode::Chat {
        return;
    }

    match mouse.kind {
        event::MouseEventKind::ScrollUp => app.scroll_chat_up_lines(3),
        event::MouseEventKind::ScrollDown => app.scroll_chat_down_lines(3),
        event::MouseEventKind::ScrollLeft
        | event::MouseEventKind::ScrollRight
        | event::MouseEventKind::Down(_)
        | event::MouseEventKind::Up(_)
        | event::MouseEventKind::Drag(_)
        | event::MouseEventKind::Moved => {}
    }
}

fn handle_paste(app: &mut App, paste: &str) {
    let text = paste.replace(['\n', '\r'], "");
    if text.is_empty() {
        return;
    }

    match app.mode {
        AppMode::Chat => text.chars().for_each(|character| app.add_chat_input_char(character)),
        AppMode::Vision => {
            if app.vision == VisionState::Idle {
                app.paste_vision_path(&text);
            }
        }
        AppMode::Profile => text.chars().for_each(|character| app.add_profile_char(character)),
        AppMode::Home | AppMode::Daily | AppMode::Help => {}
    }
}
