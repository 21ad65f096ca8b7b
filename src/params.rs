//! Small JSON config files written next to a run's output.
//!
//! [`GridParams`] holds the global lattice size and the number of compute
//! units along each axis; [`ComputeUnitParams`] holds one compute unit's
//! origin in global grid coordinates.  Every key is required on read.
//!
//! ```json
//! { "x": 44, "y": 44, "z": 44, "ngx": 1, "ngy": 1, "ngz": 1 }
//! { "i0": 0, "j0": 44, "k0": 0 }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::atomic::write_atomic;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Malformed params file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Global lattice extent and compute-unit counts per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridParams {
    pub x: u64,
    pub y: u64,
    pub z: u64,
    pub ngx: i64,
    pub ngy: i64,
    pub ngz: i64,
}

/// Origin of one compute unit in global grid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputeUnitParams {
    pub i0: u64,
    pub j0: u64,
    pub k0: u64,
}

impl ComputeUnitParams {
    pub fn new(i0: u64, j0: u64, k0: u64) -> Self {
        Self { i0, j0, k0 }
    }
}

/// Shared file codec for the params types.
pub trait JsonParams: Serialize + DeserializeOwned {
    fn from_json(bytes: &[u8]) -> Result<Self, ParamsError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        Self::from_json(&fs::read(path)?)
    }

    fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ParamsError> {
        write_atomic(path.as_ref(), &self.to_json()?)?;
        Ok(())
    }
}

impl JsonParams for GridParams {}
impl JsonParams for ComputeUnitParams {}
