//! Application configuration
//!
//! Loaded from an optional TOML file; every field has a default, so an empty
//! file (or none at all) gives a working server:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [agents]
//! directory = "agents"
//! alpha = 0.5
//! gamma = 0.9
//! epsilon = 0.1
//! epsilon_decay = 0.0
//!
//! [training]
//! default_episodes = 1000
//! progress_every = 1.0
//! teacher_level = 0.9
//! ```

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    Result, agents::AgentFactory, error::Error, q_learning::TdParams, training::TrainerSettings,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the WebSocket and rewards endpoint listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Where agents are saved and how fresh ones are built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentsConfig {
    pub directory: PathBuf,
    /// Learning rate of the TD agents
    pub alpha: f64,
    /// Discount factor, shared by the TD agents and the planners
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        let td = TdParams::default();
        Self {
            directory: PathBuf::from("agents"),
            alpha: td.alpha,
            gamma: td.gamma,
            epsilon: td.epsilon,
            epsilon_decay: td.epsilon_decay,
        }
    }
}

impl AgentsConfig {
    pub fn factory(&self) -> AgentFactory {
        AgentFactory {
            td: TdParams {
                alpha: self.alpha,
                gamma: self.gamma,
                epsilon: self.epsilon,
                epsilon_decay: self.epsilon_decay,
            },
            gamma: self.gamma,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub agents: AgentsConfig,
    pub training: TrainerSettings,
}

impl AppConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config file {}", path.display()),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Config from `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| Error::InvalidConfiguration {
                message: format!("server.bind '{}': {e}", self.server.bind),
            })
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        let agents = &self.agents;
        check("agents.alpha", agents.alpha, |v| v > 0.0 && v <= 1.0)?;
        check("agents.gamma", agents.gamma, |v| (0.0..1.0).contains(&v))?;
        check("agents.epsilon", agents.epsilon, |v| (0.0..=1.0).contains(&v))?;
        check("agents.epsilon_decay", agents.epsilon_decay, |v| {
            (0.0..1.0).contains(&v)
        })?;

        let training = &self.training;
        if training.default_episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "training.default_episodes must be positive".to_string(),
            });
        }
        check("training.progress_every", training.progress_every, |v| {
            v > 0.0 && v <= 100.0
        })?;
        check("training.teacher_level", training.teacher_level, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        Ok(())
    }
}

fn check(name: &str, value: f64, valid: impl Fn(f64) -> bool) -> Result<()> {
    if valid(value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("{name} = {value} is out of range"),
        })
    }
}
