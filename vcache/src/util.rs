use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;

/// Fixtures shipped with the crate, used by the tests and benchmarks
pub const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");

/// Paths making up one fixture: a hierarchy, a trace to replay on it, and the expected statistics
#[derive(Debug, Clone)]
pub struct TestCasePaths {
    pub config: PathBuf,
    pub trace: PathBuf,
    pub output: PathBuf,
}

/// Finds every fixture under `root`
///
/// Expected outputs live in `root/outputs` and are named `output-<trace>-<config>.json`. The trace
/// is then `root/traces/<trace>.out` and the config `root/configs/<config>.json`. Cases come back
/// sorted by output file name
pub fn get_configs(root: impl AsRef<Path>) -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let root = root.as_ref();
    let output_pattern = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut file_names = Vec::new();
    for entry in fs::read_dir(root.join("outputs"))? {
        let file_name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            file_names.push(file_name);
        }
    }
    file_names.sort();
    let mut out = Vec::new();
    for file_name in file_names {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name")?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace file from the output file name")?.as_str();
        let config = tokens.name("config").ok_or("Couldn't get the config file from the output file name")?.as_str();
        out.push(TestCasePaths {
            config: root.join("configs").join(format!("{config}.json")),
            trace: root.join("traces").join(format!("{trace}.out")),
            output: root.join("outputs").join(&file_name),
        });
    }
    Ok(out)
}
