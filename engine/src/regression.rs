use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::surface::SurfaceSize;

/// Environment flag helper: accepts `1/true/yes/on` (case-insensitive).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// If set, regression tests may update golden files in-place.
pub fn update_goldens_enabled() -> bool {
    env_flag("DOTS_UPDATE_GOLDENS")
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[macro_export]
macro_rules! regression_golden_path {
    ($name:expr) => {{
        let base = $crate::regression::sanitize_filename($name);
        ::std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{base}.json"))
    }};
}

pub fn rgba_sha256_hex(rgba: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rgba);
    hex::encode(hasher.finalize())
}

/// Renders every state into a fresh buffer of `size` and returns one hash per state.
pub fn render_frame_hashes<'s, S: 's, Render>(
    states: impl IntoIterator<Item = &'s S>,
    size: SurfaceSize,
    mut render: Render,
) -> Vec<String>
where
    Render: FnMut(&S, &mut [u8], SurfaceSize),
{
    let mut buf = vec![0u8; size.rgba_len()];
    states
        .into_iter()
        .map(|state| {
            buf.fill(0);
            render(state, &mut buf, size);
            rgba_sha256_hex(&buf)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameHashGolden {
    pub version: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub hash_alg: String,
    /// One hash per rendered state.
    pub hashes: Vec<String>,
}

impl FrameHashGolden {
    pub fn new(name: impl Into<String>, size: SurfaceSize, hashes: Vec<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            width: size.width,
            height: size.height,
            hash_alg: "sha256".to_string(),
            hashes,
        }
    }
}

pub fn load_golden_json(path: impl AsRef<Path>) -> io::Result<FrameHashGolden> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed parsing golden json {}: {e}", path.display()),
        )
    })
}

pub fn save_golden_json(path: impl AsRef<Path>, golden: &FrameHashGolden) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, golden).map_err(io::Error::other)?;
    writer.flush()
}

pub fn assert_or_update_golden_json(
    path: impl AsRef<Path>,
    golden: &FrameHashGolden,
    update: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let exists = path.exists();

    if update || !exists {
        save_golden_json(path, golden)?;
        let verb = if exists { "updated" } else { "wrote" };
        eprintln!("{verb} golden: {}", path.display());
        return Ok(());
    }

    let expected = load_golden_json(path)?;
    if expected.version != golden.version
        || expected.hash_alg != golden.hash_alg
        || expected.width != golden.width
        || expected.height != golden.height
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "golden metadata mismatch at {}:\nexpected: v{} alg={} {}x{}\nactual:   v{} alg={} {}x{}\n(hint: set DOTS_UPDATE_GOLDENS=1 to rewrite)",
                path.display(),
                expected.version,
                expected.hash_alg,
                expected.width,
                expected.height,
                golden.version,
                golden.hash_alg,
                golden.width,
                golden.height
            ),
        ));
    }

    if expected.hashes.len() != golden.hashes.len() {
        return Err(io::Error::other(format!(
            "golden frame count mismatch at {}: expected {} hashes, got {}\n(hint: set DOTS_UPDATE_GOLDENS=1 to rewrite)",
            path.display(),
            expected.hashes.len(),
            golden.hashes.len()
        )));
    }

    for (i, (a, b)) in expected.hashes.iter().zip(golden.hashes.iter()).enumerate() {
        if a != b {
            return Err(io::Error::other(format!(
                "golden mismatch at {} (frame {i}):\nexpected: {a}\nactual:   {b}\n(hint: set DOTS_UPDATE_GOLDENS=1 to rewrite)",
                path.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_replaces_path_characters() {
        assert_eq!(sanitize_filename("board/3x3 hover"), "board_3x3_hover");
    }

    #[test]
    fn identical_frames_hash_identically() {
        let states = [1u8, 1u8, 2u8];
        let hashes = render_frame_hashes(&states, SurfaceSize::new(2, 2), |v, buf, _| {
            buf.fill(*v);
        });
        assert_eq!(hashes.len(), 3);
        assert_eq!(hashes[0], hashes[1]);
        assert_ne!(hashes[1], hashes[2]);
        assert_eq!(hashes[0].len(), 64);
    }

    #[test]
    fn golden_is_written_when_missing_then_compared() {
        let dir = std::env::temp_dir().join(format!(
            "dots_engine_golden_{}",
            std::process::id()
        ));
        let path = dir.join("scenario.json");
        let _ = fs::remove_file(&path);

        let size = SurfaceSize::new(1, 1);
        let golden = FrameHashGolden::new("scenario", size, vec!["aa".into(), "bb".into()]);
        assert_or_update_golden_json(&path, &golden, false).expect("first run writes golden");
        assert_or_update_golden_json(&path, &golden, false).expect("second run matches");

        let drifted = FrameHashGolden::new("scenario", size, vec!["aa".into(), "cc".into()]);
        let err = assert_or_update_golden_json(&path, &drifted, false).unwrap_err();
        assert!(err.to_string().contains("frame 1"));

        let _ = fs::remove_dir_all(dir);
    }
}
