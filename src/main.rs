//! Fork Duel headless runner
//!
//! Plays a match without a renderer. Usage: `fork-duel [classic|bonus|config.json]`.
//! Every stdin line is a burst of key presses (`q` fires Green, `p` fires Red
//! in the built-in levels), followed by two seconds of simulated frames.

use std::io::BufRead;

use clap::Parser;
use glam::Vec2;

use fork_duel::clock::ManualClock;
use fork_duel::config::{ConfigError, Level, MatchConfig};
use fork_duel::controller::MatchController;
use fork_duel::host::{BodyHandle, World};
use fork_duel::sim::{PlayerId, detect_overlaps};

/// Simulated display refresh
const FRAME_DT: f64 = 1.0 / 60.0;
/// Frames simulated after each input line
const FRAMES_PER_LINE: u32 = 120;

/// Headless Fork Duel match driven from stdin
#[derive(Parser, Debug)]
#[command(name = "fork-duel", version, about)]
struct Args {
    /// Built-in level name (classic, bonus) or path to a JSON match config
    level_or_config: Option<String>,
}

/// World that logs what a renderer would draw
#[derive(Debug, Default)]
struct LogWorld {
    scores: Vec<i32>,
    message: Option<String>,
}

impl World for LogWorld {
    fn set_body_position(&mut self, body: BodyHandle, pos: Vec2) {
        log::trace!("{:?} -> ({:.1}, {:.1})", body, pos.x, pos.y);
    }

    fn set_body_rotation(&mut self, body: BodyHandle, theta: f32) {
        log::trace!("{:?} rotation {:.2}", body, theta);
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        log::debug!("{:?} removed", body);
    }

    fn refresh_static_group(&mut self) {}

    fn render_score(&mut self, player: PlayerId, score: i32) {
        if self.scores.len() <= player.0 {
            self.scores.resize(player.0 + 1, 0);
        }
        self.scores[player.0] = score;
    }

    fn render_message(&mut self, text: &str) {
        if self.message.as_deref() != Some(text) {
            log::info!("{}", text);
            self.message = Some(text.to_string());
        }
    }
}

fn load_config(level_or_config: Option<&str>) -> Result<MatchConfig, ConfigError> {
    match level_or_config {
        None => Ok(Level::Classic.config()),
        Some(arg) => match Level::from_str(arg) {
            Some(level) => {
                log::info!("Playing level {}", level.as_str());
                Ok(level.config())
            }
            None => MatchConfig::load(arg),
        },
    }
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let config = load_config(args.level_or_config.as_deref())?;
    let keys: Vec<String> = config
        .forks
        .iter()
        .map(|f| format!("{}={}", f.fire_key, f.name))
        .collect();

    let clock = ManualClock::new(0.0);
    let mut controller = MatchController::new(&config, LogWorld::default(), clock.clone())?;
    log::info!("Fork Duel (headless) starting, keys: {}", keys.join(", "));

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        for key in line.chars().filter(|c| !c.is_whitespace()) {
            controller.on_key_down(key);
        }

        for _ in 0..FRAMES_PER_LINE {
            clock.advance(FRAME_DT);
            controller.on_frame(FRAME_DT);
            for (player, target) in detect_overlaps(controller.state()) {
                controller.on_overlap(player, target);
            }
        }

        let scores = &controller.world().scores;
        println!(
            "{} | targets left: {}",
            scores
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" : "),
            controller.state().registry.active_count()
        );
        if controller.is_game_ended() {
            break;
        }
    }

    match &controller.world().message {
        Some(message) => println!("{}", message),
        None => println!("Match abandoned"),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("fork-duel: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_help_is_not_a_config_path() {
        let err = Args::try_parse_from(["fork-duel", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = Args::try_parse_from(["fork-duel", "--turbo"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_positional_level_or_config() {
        let args = Args::try_parse_from(["fork-duel"]).unwrap();
        assert!(args.level_or_config.is_none());

        let args = Args::try_parse_from(["fork-duel", "bonus"]).unwrap();
        let config = load_config(args.level_or_config.as_deref()).unwrap();
        assert_eq!(config.end_policy, fork_duel::EndPolicy::Mercy);

        let args = Args::try_parse_from(["fork-duel", "missing.json"]).unwrap();
        assert!(matches!(
            load_config(args.level_or_config.as_deref()),
            Err(ConfigError::Io(_))
        ));
    }
}
