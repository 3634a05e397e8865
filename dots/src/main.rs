use std::error::Error;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use engine::app::{AppConfig, AppContext, AppHandler, PointerEvent, run_app};
use engine::graphics::Renderer2d;
use tracing_subscriber::EnvFilter;
use winit::event::VirtualKeyCode;

use dots::config::ClientConfig;
use dots::geometry::{BoardGeometry, GridDims};
use dots::session::{BoardSession, SessionUpdate};
use dots::sync::{HttpAuthority, Ticket};
use dots::worker::SyncWorker;

const WINDOW_TITLE: &str = "Dots and Boxes";

// Window footprint until the first snapshot tells us the real grid.
const PLACEHOLDER_GRID: GridDims = GridDims::new(3, 3);

#[derive(Debug, Parser)]
#[command(name = "dots")]
#[command(about = "Dots and boxes board client for a remote game authority")]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long, env = "DOTS_CONFIG")]
    config: Option<PathBuf>,
    /// Base url of the game authority, e.g. http://127.0.0.1:5000
    #[arg(long, env = "DOTS_AUTHORITY_URL")]
    authority: Option<String>,
    #[arg(long, env = "DOTS_GAME_ID")]
    game_id: Option<String>,
    #[arg(long)]
    cell_size: Option<u32>,
}

impl Cli {
    fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_file(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.authority {
            config.authority_url = url.clone();
        }
        if let Some(game_id) = &self.game_id {
            config.game_id = game_id.clone();
        }
        if let Some(cell_size) = self.cell_size {
            config.layout.cell_size = cell_size;
        }
        config.validate()?;
        Ok(config)
    }
}

struct DotsApp {
    session: BoardSession,
    worker: SyncWorker,
}

impl DotsApp {
    fn submit(&mut self, ticket: Ticket, ctx: &mut AppContext) {
        if let Err(err) = self.worker.submit(ticket) {
            tracing::error!(error = %err, "sync worker unavailable");
            ctx.request_exit();
        }
    }

    fn apply(&mut self, update: SessionUpdate, ctx: &mut AppContext) {
        match update {
            SessionUpdate::Ignored => {}
            SessionUpdate::Snapshot { resized } => {
                if resized {
                    if let Some(geometry) = self.session.geometry() {
                        if let Err(err) = ctx.resize_surface(geometry.surface_size()) {
                            tracing::warn!(error = %err, "surface resize failed");
                        }
                    }
                }
                if let Some(projection) = self.session.projection() {
                    ctx.set_title(&projection.title_line());
                }
                ctx.request_redraw();
            }
            SessionUpdate::FollowUp(ticket) => self.submit(ticket, ctx),
            SessionUpdate::MoveRejected(_) => ctx.request_redraw(),
            SessionUpdate::Failed(err) => {
                tracing::error!(error = %err, "lost the game authority, exiting");
                ctx.request_exit();
            }
        }
    }
}

impl AppHandler for DotsApp {
    fn init(&mut self, ctx: &mut AppContext) -> Result<(), Box<dyn Error>> {
        let ticket = self.session.begin_load();
        self.worker.submit(ticket)?;
        ctx.set_title(&format!("{WINDOW_TITLE} | loading"));
        Ok(())
    }

    fn on_pointer(&mut self, event: PointerEvent, ctx: &mut AppContext) {
        match event {
            PointerEvent::Moved { x, y } => {
                if self.session.pointer_moved(x, y) {
                    ctx.request_redraw();
                }
            }
            PointerEvent::Left => {
                if self.session.pointer_left() {
                    ctx.request_redraw();
                }
            }
            PointerEvent::Clicked { x, y } => {
                let had_rejection = self.session.rejected().is_some();
                if let Some(ticket) = self.session.clicked(x, y) {
                    self.submit(ticket, ctx);
                }
                if had_rejection {
                    ctx.request_redraw();
                }
            }
        }
    }

    fn on_key(&mut self, key: VirtualKeyCode, ctx: &mut AppContext) {
        match key {
            VirtualKeyCode::R => {
                let ticket = self.session.begin_reset();
                self.submit(ticket, ctx);
                ctx.set_title(&format!("{WINDOW_TITLE} | resetting"));
                ctx.request_redraw();
            }
            VirtualKeyCode::Escape => ctx.request_exit(),
            _ => {}
        }
    }

    fn on_idle(&mut self, ctx: &mut AppContext) {
        loop {
            match self.worker.try_completion() {
                Ok(Some(completion)) => {
                    let update = self.session.complete(completion);
                    self.apply(update, ctx);
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(error = %err, "sync worker unavailable");
                    ctx.request_exit();
                    break;
                }
            }
        }
    }

    fn render(&mut self, gfx: &mut dyn Renderer2d) {
        self.session.render(gfx);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().resolve()?;
    let authority = HttpAuthority::new(&config.authority_url, &config.game_id)
        .context("configuring game authority client")?;
    tracing::info!(url = authority.game_url(), "using game authority");
    let worker = SyncWorker::start(authority).context("starting sync worker")?;

    let app = DotsApp {
        session: BoardSession::new(config.layout),
        worker,
    };
    let app_config = AppConfig {
        title: WINDOW_TITLE.to_string(),
        surface_size: BoardGeometry::new(PLACEHOLDER_GRID, config.layout).surface_size(),
        vsync: Some(true),
        idle_interval: config.poll_interval(),
    };
    run_app(app_config, app).map_err(|e| anyhow!("window loop failed: {e}"))
}
