//! Train command - Train an agent offline and save it

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    agents::AgentSelector,
    app::{AppBuilder, AppConfig},
    cli::output::print_training_summary,
    pipeline::ProgressObserver,
    ports::AgentRepository,
    training::{TrainingMethod, TrainingRequest},
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent and save it")]
pub struct TrainArgs {
    /// Agent type (q=Q-Learning, s=SARSA, v=Value Iteration, p=Policy Iteration)
    #[arg(long, short = 'a', default_value = "q")]
    pub agent: AgentSelector,

    /// Save file for the agent (defaults to one under `agents.directory`)
    #[arg(long, short = 'p')]
    pub path: Option<PathBuf>,

    /// Continue from the saved agent instead of starting fresh
    #[arg(long, short = 'l')]
    pub load: bool,

    /// Number of games against the teacher
    #[arg(long, short = 't', conflicts_with = "self_play")]
    pub teacher_episodes: Option<u64>,

    /// Number of self-play games
    #[arg(long)]
    pub self_play: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl TrainArgs {
    /// Teacher training unless self-play was asked for; the episode count
    /// falls back to `training.default_episodes`.
    pub fn request(&self) -> TrainingRequest {
        let (method, episodes) = match self.self_play {
            Some(episodes) => (TrainingMethod::SelfPlay, Some(episodes)),
            None => (TrainingMethod::Teacher, self.teacher_episodes),
        };
        TrainingRequest {
            agent_type: self.agent,
            method,
            episodes,
            load_existing: self.load,
        }
    }
}

pub fn execute(args: TrainArgs, mut config: AppConfig) -> Result<()> {
    if let Some(seed) = args.seed {
        config.training.seed = Some(seed);
    }
    let mut repository = MsgPackRepository::new(config.agents.directory.clone());
    if let Some(path) = &args.path {
        repository = repository.with_path(args.agent, path.clone());
    }
    if !args.load && repository.exists(args.agent) {
        println!(
            "An agent is already saved at {}; it will be overwritten.",
            repository.describe(args.agent)
        );
    }

    let app = AppBuilder::new()
        .with_config(config)
        .with_repository(repository)
        .build();
    let request = args.request();
    if !args.agent.is_tabular() {
        println!("Computing optimal policy for '{}'...", args.agent);
    }

    let summary = app
        .trainer()
        .train_with(&request, vec![Box::new(ProgressObserver::new())])?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_training_summary(&summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TrainArgs,
    }

    fn parse(argv: &[&str]) -> TrainArgs {
        Harness::try_parse_from(std::iter::once("train").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults_to_teacher_training_of_q() {
        let request = parse(&[]).request();
        assert_eq!(request.agent_type, AgentSelector::QLearning);
        assert_eq!(request.method, TrainingMethod::Teacher);
        assert_eq!(request.episodes, None);
        assert!(!request.load_existing);
    }

    #[test]
    fn test_self_play_flag() {
        let request = parse(&["-a", "s", "--self-play", "500", "-l"]).request();
        assert_eq!(request.agent_type, AgentSelector::Sarsa);
        assert_eq!(request.method, TrainingMethod::SelfPlay);
        assert_eq!(request.episodes, Some(500));
        assert!(request.load_existing);
    }

    #[test]
    fn test_teacher_and_self_play_conflict() {
        let result = Harness::try_parse_from(["train", "-t", "10", "--self-play", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_agent_rejected() {
        assert!(Harness::try_parse_from(["train", "-a", "x"]).is_err());
    }
}
