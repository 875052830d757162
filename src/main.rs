mod animation;
mod app;
mod cli;
mod controller;
mod logging;
mod settings;
mod speedtest;
mod ui;

use anyhow::Result;
use app::{poll_event, App, AppAction};
use clap::Parser;
use cli::Cli;
use controller::TestController;
use crossterm::event::Event;
use ratatui::DefaultTerminal;
use settings::Settings;
use speedtest::HttpSpeedTest;
use std::time::Instant;
use tracing::{info, warn};
use ui::{draw_ui, image::DecorativeImage};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Cli::parse().into_settings()?;
    logging::init(&settings.log_file, settings.verbose)?;
    info!("starting with servers {:?}", settings.servers);

    let backend = HttpSpeedTest::new(&settings)?;
    let image = load_image(&settings);

    let mut terminal = ratatui::init();
    terminal.clear()?;

    let result = run_app(&mut terminal, App::new(image), TestController::new(backend), &settings).await;

    ratatui::restore();
    result
}

fn load_image(settings: &Settings) -> Option<DecorativeImage> {
    let path = settings.image_path.as_ref()?;
    match DecorativeImage::load(path, settings.image_width, settings.image_height) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("skipping image panel: {:#}", e);
            None
        }
    }
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    mut app: App,
    mut controller: TestController<HttpSpeedTest>,
    settings: &Settings,
) -> Result<()> {
    let tick_rate = settings.tick_rate();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| draw_ui(frame, &app))?;

        // Handle test updates
        while let Some(event) = controller.poll() {
            app.handle_event(event);
        }

        // Handle input
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if let Some(Event::Key(key)) = poll_event(timeout)? {
            match app.handle_key_event(key) {
                Some(AppAction::Quit) => break,
                Some(AppAction::StartTest) => {
                    controller.start(&mut app);
                }
                None => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}
