use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Address, Byte};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ready,
    Running,
    Halted,
    Faulted,
}

/// Final (or intermediate) observable state of a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: Status,
    pub cycles: u64,
    pub program_counter: Address,
    pub flags: Byte,
    pub registers: Vec<Byte>,
    pub memory: Vec<Byte>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

pub fn write(path: impl AsRef<Path>, snapshot: &Snapshot) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    fs::write(path, json)
}

/// Writes `snapshot` to a timestamped file below `./dumps` and returns its path.
pub fn dump(filename_root: &str, snapshot: &Snapshot) -> io::Result<PathBuf> {
    fs::create_dir_all("./dumps")?;
    let now: DateTime<Local> = Local::now();
    let filename = PathBuf::from(format!(
        "./dumps/{}_{}.json",
        filename_root,
        now.format("%Y-%m-%d_%H-%M-%S%.3f")
    ));
    write(&filename, snapshot)?;
    Ok(filename)
}
