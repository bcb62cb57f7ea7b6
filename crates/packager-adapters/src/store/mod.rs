//! Record file stores.

mod json;
mod memory;

pub use json::{DEFAULT_RECORD_PATH, JsonConfigStore};
pub use memory::MemoryConfigStore;

use packager_core::{application::ApplicationError, domain::ConfigRecord, error::PackagerResult};
use std::path::Path;

fn encode(path: &Path, record: &ConfigRecord) -> PackagerResult<Vec<u8>> {
    record
        .to_json_pretty()
        .map(String::into_bytes)
        .map_err(|e| write_error(path, e.to_string()).into())
}

fn decode(path: &Path, bytes: &[u8]) -> PackagerResult<ConfigRecord> {
    let raw = std::str::from_utf8(bytes).map_err(|e| read_error(path, e.to_string()))?;
    ConfigRecord::from_json(raw).map_err(|e| read_error(path, e.to_string()).into())
}

fn read_error(path: &Path, reason: String) -> ApplicationError {
    ApplicationError::StoreRead {
        path: path.to_path_buf(),
        reason,
    }
}

fn write_error(path: &Path, reason: String) -> ApplicationError {
    ApplicationError::StoreWrite {
        path: path.to_path_buf(),
        reason,
        rolled_back: false,
    }
}
