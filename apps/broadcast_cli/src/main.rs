use anyhow::{Context, Result};
use clap::Parser;
use peer_grid::{GridLayout, Rect, Tile};
use rtc_engine::{simulated::SimulatedEngineFactory, StaticPermissions};
use session_core::{load_settings, SessionConfig, SessionController};
use shared::domain::ClientRole;

#[derive(Parser, Debug)]
#[command(about = "Runs a scripted broadcast session against the simulated engine")]
struct Args {
    #[arg(long)]
    app_id: Option<String>,
    #[arg(long)]
    channel: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    audience: bool,
    #[arg(long)]
    deny_permissions: bool,
    /// Remote broadcasters that join after the local user.
    #[arg(long, default_value_t = 2)]
    peers: u32,
    /// Flip the role once while in the channel.
    #[arg(long)]
    toggle: bool,
    /// Print each layout as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[arg(long, default_value_t = 360.0)]
    width: f32,
    #[arg(long, default_value_t = 640.0)]
    height: f32,
}

impl Args {
    fn config(&self) -> SessionConfig {
        let mut config = load_settings();
        if let Some(app_id) = &self.app_id {
            config.app_id = app_id.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel_name = channel.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if self.audience {
            config.initial_role = ClientRole::Audience;
        }
        config
    }
}

/// One observation of the screen after a scripted step.
struct Step {
    label: String,
    layout: GridLayout,
}

async fn run_script(args: &Args, config: SessionConfig) -> Result<Vec<Step>> {
    let factory = SimulatedEngineFactory::new();
    let permissions = if args.deny_permissions {
        StaticPermissions::denied()
    } else {
        StaticPermissions::granted()
    };
    let mut controller = SessionController::new();
    let mut steps = Vec::new();
    let mut observe = |label: &str, controller: &SessionController| {
        steps.push(Step {
            label: label.to_string(),
            layout: peer_grid::layout(&controller.snapshot()),
        });
    };

    controller
        .initialize(config, factory.as_ref(), &permissions)
        .await
        .context("failed to initialize session")?;
    observe("initialized", &controller);

    controller.join_channel().await?;
    controller.pump_events().await;
    observe("joined", &controller);

    let engine = factory
        .latest()
        .context("simulated engine was not created")?;
    for uid in 1..=args.peers {
        engine.peer_joined(uid);
        controller.pump_events().await;
        observe(&format!("peer {uid} joined"), &controller);
    }

    if args.toggle {
        controller.toggle_role().await?;
        controller.pump_events().await;
        observe("role toggled", &controller);
    }

    if args.peers > 0 {
        engine.peer_left(1);
        controller.pump_events().await;
        observe("peer 1 left", &controller);
    }

    controller.leave_channel().await?;
    controller.pump_events().await;
    observe("left", &controller);

    controller.shutdown();
    Ok(steps)
}

fn print_text(step: &Step, viewport: Rect) {
    println!("== {} ==", step.label);
    println!("{}", step.layout.status_line);
    let Some(video) = &step.layout.video else {
        println!("  (no video area)");
        return;
    };
    println!(
        "  arrangement: {:?}, hidden peers: {}",
        video.arrangement, video.hidden_peers
    );
    for (tile, frame) in video.frames(viewport) {
        let name = match tile {
            Tile::LocalPreview => "local preview".to_string(),
            Tile::Remote(remote) => format!("peer {} (slot {})", remote.peer_id, remote.slot),
            Tile::NoBroadcasterPlaceholder => peer_grid::NO_BROADCASTER_TEXT.to_string(),
        };
        println!(
            "  {name:<28} x={:.0} y={:.0} w={:.0} h={:.0}",
            frame.x, frame.y, frame.width, frame.height
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let config = args.config();
    tracing::info!(channel = %config.channel_name, role = %config.initial_role, "running scripted session");

    let steps = run_script(&args, config).await?;
    let viewport = Rect::new(0.0, 0.0, args.width, args.height);
    for step in &steps {
        if args.json {
            println!(
                "{}",
                serde_json::to_string(&serde_json::json!({
                    "step": step.label,
                    "layout": step.layout,
                }))?
            );
        } else {
            print_text(step, viewport);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peer_grid::Arrangement;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["broadcast_cli"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn config() -> SessionConfig {
        SessionConfig {
            app_id: "demo-app".into(),
            ..SessionConfig::default()
        }
    }

    #[tokio::test]
    async fn scripted_session_walks_through_the_grid() {
        let steps = run_script(&args(&["--peers", "3"]), config())
            .await
            .expect("script");

        let labels: Vec<&str> = steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "initialized",
                "joined",
                "peer 1 joined",
                "peer 2 joined",
                "peer 3 joined",
                "peer 1 left",
                "left"
            ]
        );
        assert!(steps[0].layout.video.is_none());
        let three = steps[4].layout.video.as_ref().expect("video");
        assert_eq!(three.arrangement, Arrangement::OneOverTwo);
        assert!(three.local_preview);
        assert!(steps[6].layout.video.is_none());
    }

    #[tokio::test]
    async fn toggling_to_audience_drops_the_local_preview() {
        let steps = run_script(&args(&["--peers", "1", "--toggle"]), config())
            .await
            .expect("script");

        let toggled = steps
            .iter()
            .find(|s| s.label == "role toggled")
            .expect("toggle step");
        assert_eq!(toggled.layout.status_line, "You're the audience");
        let video = toggled.layout.video.as_ref().expect("video");
        assert!(!video.local_preview);
    }

    #[tokio::test]
    async fn invalid_app_id_fails_the_script() {
        let mut bad = config();
        bad.app_id = "<App ID>".into();
        assert!(run_script(&args(&[]), bad).await.is_err());
    }
}
