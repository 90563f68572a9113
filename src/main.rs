//! Broomsticks headless runner
//!
//! Plays a computer-vs-computer session, either paced by the scheduler thread
//! or fast-forwarded, and reports the result.
//!
//! Example:
//!   RUST_LOG=info broomsticks --set player_count=4 --seed 42 --fast --json

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    runner::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core is driven by an embedding renderer on the web
}

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::PathBuf;
    use std::thread;

    use anyhow::{Context, Result};
    use clap::Parser;

    use broomsticks::Settings;
    use broomsticks::scheduler::Scheduler;
    use broomsticks::sim::{Command, Frame, Session, SessionPhase, tick};

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Run a headless Broomsticks match", long_about = None)]
    struct Args {
        /// JSON settings file; missing keys keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override a setting, e.g. `--set black_balls=3` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        overrides: Vec<(String, String)>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many ticks even if nobody has won
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u64,
        /// Skip the real-time scheduler and tick as fast as possible
        #[arg(long)]
        fast: bool,
        /// Print the final frame as JSON
        #[arg(long)]
        json: bool,
    }

    fn parse_key_value(s: &str) -> Result<(String, String), String> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
        Ok((key.trim().to_string(), value.trim().to_string()))
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        let mut settings = match &args.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        for (key, value) in &args.overrides {
            settings
                .set_param(key, value)
                .with_context(|| format!("apply --set {key}={value}"))?;
        }
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }
        // Nobody is at the keyboard
        settings.human_players = 0;

        let session = Session::new(settings).context("invalid settings")?;
        log::info!(
            "Broomsticks starting: {} players, seed {}",
            session.settings().player_count,
            session.settings().seed
        );

        let frame = if args.fast {
            run_fast(session, args.max_ticks)
        } else {
            run_paced(session, args.max_ticks)?
        };

        match frame.winner {
            Some(side) => log::info!(
                "{side:?} side wins {} to {} after {} ticks",
                frame.scores[0],
                frame.scores[1],
                frame.tick
            ),
            None => log::info!(
                "No winner after {} ticks, score {} to {}",
                frame.tick,
                frame.scores[0],
                frame.scores[1]
            ),
        }

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&frame).context("serialize frame")?
            );
        }
        Ok(())
    }

    fn run_fast(mut session: Session, max_ticks: u64) -> Frame {
        tick(&mut session, &[Command::Start]);
        while session.phase() == SessionPhase::Playing && session.play_ticks() < max_ticks {
            tick(&mut session, &[]);
        }
        session.frame()
    }

    fn run_paced(session: Session, max_ticks: u64) -> Result<Frame> {
        let poll = session.settings().tick_interval();
        let mut last_scores = [0, 0];
        let handle = Scheduler::spawn(session, move |frame: &Frame| {
            if frame.scores != last_scores {
                last_scores = frame.scores;
                log::debug!("Score now {} to {}", frame.scores[0], frame.scores[1]);
            }
        })
        .context("spawn simulation thread")?;

        handle.send(Command::Start);
        loop {
            let frame = handle.frame();
            if frame.phase == SessionPhase::GameOver || frame.tick >= max_ticks {
                break;
            }
            if !handle.is_running() {
                anyhow::bail!("simulation thread exited unexpectedly");
            }
            thread::sleep(poll);
        }

        let session = handle.stop().context("simulation thread panicked")?;
        Ok(session.frame())
    }
}
