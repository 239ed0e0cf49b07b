//! MessagePack implementation of the agent repository.
//!
//! Each agent type lives in its own `{stem}_agent.msgpack` file under the
//! configured agent directory, written with rmp_serde.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind as IoErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{
    Result,
    agents::{AgentSelector, SavedAgent},
    error::Error,
    ports::AgentRepository,
};

/// MessagePack-based agent repository.
///
/// # Examples
///
/// ```no_run
/// use tictactoe_live::adapters::MsgPackRepository;
/// use tictactoe_live::agents::AgentSelector;
/// use tictactoe_live::ports::AgentRepository;
///
/// let repo = MsgPackRepository::new("agents");
/// assert!(repo.path_for(AgentSelector::Sarsa).ends_with("sarsa_agent.msgpack"));
/// let saved = repo.load(AgentSelector::Sarsa)?;
/// # Ok::<(), tictactoe_live::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MsgPackRepository {
    directory: PathBuf,
    overrides: HashMap<AgentSelector, PathBuf>,
}

impl MsgPackRepository {
    /// Create a repository rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            overrides: HashMap::new(),
        }
    }

    /// Store `selector`'s agent at an explicit path instead of the default.
    pub fn with_path(mut self, selector: AgentSelector, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(selector, path.into());
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File used for `selector`'s agent
    pub fn path_for(&self, selector: AgentSelector) -> PathBuf {
        self.overrides.get(&selector).cloned().unwrap_or_else(|| {
            self.directory
                .join(format!("{}_agent.msgpack", selector.file_stem()))
        })
    }
}

impl AgentRepository for MsgPackRepository {
    fn save(&self, agent: &SavedAgent) -> Result<()> {
        let path = self.path_for(agent.selector);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create agent directory {parent:?}"),
                source,
            })?;
        }

        // Write next to the target and rename so readers never see a partial file
        let staging = path.with_extension("msgpack.tmp");
        let file = File::create(&staging).map_err(|source| Error::Io {
            operation: format!("create file {staging:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write(&mut writer, agent).map_err(|e| Error::SerializationContext {
            operation: "serialize agent to MessagePack".to_string(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("write file {staging:?}"),
            source,
        })?;
        drop(writer);

        fs::rename(&staging, &path).map_err(|source| Error::Io {
            operation: format!("move {staging:?} to {path:?}"),
            source,
        })?;

        tracing::debug!(agent = %agent.selector, path = %path.display(), "saved agent");
        Ok(())
    }

    fn load(&self, selector: AgentSelector) -> Result<Option<SavedAgent>> {
        let path = self.path_for(selector);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                });
            }
        };

        let saved = rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: format!("deserialize agent from {path:?}"),
                message: e.to_string(),
            }
        })?;
        Ok(Some(saved))
    }

    fn exists(&self, selector: AgentSelector) -> bool {
        self.path_for(selector).is_file()
    }

    fn describe(&self, selector: AgentSelector) -> String {
        self.path_for(selector).display().to_string()
    }
}
