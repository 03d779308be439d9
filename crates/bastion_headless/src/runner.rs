//! Headless game runner implementation.
//!
//! Reads protocol commands line by line, applies them to one simulation and
//! writes one or more responses per command. Every applied input is recorded
//! so an interactive session can be saved as a replay.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use bastion_core::replay::{Replay, ReplayStep};
use bastion_core::simulation::{Command as CoreCommand, Simulation};
use tracing::{debug, info, warn};

use crate::protocol::{Command, Response, StateReport};
use crate::scenario::{Scenario, ScenarioError};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every tick command (vs only on query).
    pub auto_state_output: bool,
    /// Save the session as a replay here on exit.
    pub replay_path: Option<PathBuf>,
}

/// Headless runner for controller-driven gameplay.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    sim: Simulation,
    replay: Replay,
    should_quit: bool,
}

impl HeadlessRunner {
    /// Create a runner for a scenario.
    pub fn new(scenario: &Scenario, config: HeadlessConfig) -> Result<Self, ScenarioError> {
        let sim = scenario.build_simulation(scenario.seed)?;
        let replay = Replay::new(scenario.name.as_str(), scenario.seed, &sim);
        Ok(Self {
            config,
            sim,
            replay,
            should_quit: false,
        })
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Whether a `quit` command was received.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Everything applied so far.
    #[must_use]
    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Apply one command and produce its responses.
    pub fn handle(&mut self, cmd: &Command) -> Vec<Response> {
        let name = cmd.name();
        let mut responses = Vec::new();

        match cmd {
            Command::WorldTick { count } => {
                for _ in 0..*count {
                    self.sim.advance_world_tick();
                    self.replay.record(ReplayStep::WorldTick);
                }
                self.after_ticks(name, &mut responses);
            }
            Command::ForgeTick { count } => {
                for _ in 0..*count {
                    self.sim.advance_forge_tick();
                    self.replay.record(ReplayStep::ForgeTick);
                }
                self.after_ticks(name, &mut responses);
            }
            Command::Tick { count } => {
                for _ in 0..*count {
                    self.sim.advance_world_tick();
                    self.replay.record(ReplayStep::WorldTick);
                    self.sim.advance_forge_tick();
                    self.replay.record(ReplayStep::ForgeTick);
                }
                self.after_ticks(name, &mut responses);
            }
            Command::Query => responses.push(self.state_response()),
            Command::Stats { recipe } => match self.sim.effective_stats(recipe) {
                Some(stats) => responses.push(Response::Stats {
                    recipe: recipe.clone(),
                    stats,
                }),
                None => responses.push(Response::error(
                    format!("Unknown recipe id: {recipe}"),
                    Some(name),
                )),
            },
            Command::Hash => responses.push(Response::StateHash {
                tick: self.sim.state().tick,
                hash: self.sim.state_hash(),
            }),
            Command::Quit => {
                self.should_quit = true;
                responses.push(Response::ack(name));
            }
            action => {
                if let Some(core) = action.to_core() {
                    responses.push(self.apply_action(name, core));
                }
            }
        }
        responses
    }

    fn apply_action(&mut self, name: &str, command: CoreCommand) -> Response {
        // Unknown ids would panic inside the engines.
        if let Err(e) = self.sim.check_ids(&command) {
            return Response::error(e.to_string(), Some(name));
        }
        let outcome = self.sim.execute(&command);
        self.replay.record(ReplayStep::Command(command));
        match outcome {
            Ok(effect) => {
                debug!(cmd = name, ?effect, "Command applied");
                Response::ack(name)
            }
            Err(reason) => Response::rejected(name, &reason),
        }
    }

    fn after_ticks(&self, name: &str, responses: &mut Vec<Response>) {
        responses.push(Response::ack(name));
        if self.config.auto_state_output {
            responses.push(self.state_response());
        }
    }

    fn state_response(&self) -> Response {
        Response::State(Box::new(StateReport::capture(&self.sim)))
    }

    /// Run the protocol loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(&mut output, &Response::ready(self.sim.state().tick))?;

        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let responses = match Command::from_json(trimmed) {
                Ok(cmd) => self.handle(&cmd),
                Err(e) => {
                    warn!(error = %e, "Invalid command");
                    vec![Response::error(format!("Invalid command: {e}"), None)]
                }
            };
            for response in &responses {
                write_response(&mut output, response)?;
            }
            if self.should_quit {
                break;
            }
        }

        self.finish()?;
        write_response(&mut output, &Response::Bye)
    }

    /// Run against the process's stdin and stdout.
    pub fn run_stdio(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.replay.finalize(&self.sim);
        if let Some(path) = &self.config.replay_path {
            self.replay.save(path).map_err(io::Error::other)?;
            info!(
                path = %path.display(),
                commands = self.replay.command_count(),
                "Session replay saved"
            );
        }
        Ok(())
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> HeadlessRunner {
        HeadlessRunner::new(&Scenario::default(), HeadlessConfig::default()).unwrap()
    }

    #[test]
    fn test_ticks_advance_both_clocks() {
        let mut runner = runner();
        let responses = runner.handle(&Command::Tick { count: 5 });
        assert_eq!(responses, vec![Response::ack("tick")]);
        assert_eq!(runner.simulation().state().tick, 5);
        assert_eq!(runner.simulation().forge_ticks(), 5);
    }

    #[test]
    fn test_auto_state_output() {
        let config = HeadlessConfig {
            auto_state_output: true,
            ..HeadlessConfig::default()
        };
        let mut runner = HeadlessRunner::new(&Scenario::default(), config).unwrap();
        let responses = runner.handle(&Command::WorldTick { count: 1 });
        assert_eq!(responses.len(), 2);
        assert!(matches!(&responses[1], Response::State(state) if state.tick == 1));
    }

    #[test]
    fn test_unknown_id_is_an_error_not_a_panic() {
        let mut runner = runner();
        let responses = runner.handle(&Command::Travel {
            region: "R99".to_string(),
        });
        assert!(matches!(
            &responses[0],
            Response::Error { cmd: Some(cmd), .. } if cmd == "travel"
        ));
        assert_eq!(runner.replay().command_count(), 0);
    }

    #[test]
    fn test_rejection_is_reported() {
        let mut runner = runner();
        let responses = runner.handle(&Command::Prestige);
        assert!(matches!(
            &responses[0],
            Response::Rejected { reason, .. } if reason == "not_eligible"
        ));
    }

    #[test]
    fn test_stats_for_unknown_recipe() {
        let mut runner = runner();
        let responses = runner.handle(&Command::Stats {
            recipe: "RCP42".to_string(),
        });
        assert!(matches!(&responses[0], Response::Error { .. }));
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut runner = runner();
        let input = "{\"cmd\":\"quit\"}\n{\"cmd\":\"tick\",\"count\":10}\n";
        let mut output = Vec::new();
        runner.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(r#""type":"ready""#));
        assert!(lines[2].contains(r#""type":"bye""#));
        assert_eq!(runner.simulation().state().tick, 0);
    }
}
