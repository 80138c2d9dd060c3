//! Stand-in `astah-command` scripts for tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;

/// Writes `Class Diagram.png` and `Sequence.png` for the source, each
/// holding the sheet name and the source text, and appends one line to
/// `calls.log` next to the source.
const FAKE_TOOL: &str = r#"#!/bin/sh
src="$4"
out="$6"
stem=$(basename "$src" .asta)
mkdir -p "$out/$stem"
printf 'Class Diagram:%s' "$(cat "$src")" > "$out/$stem/Class Diagram.png"
printf 'Sequence:%s' "$(cat "$src")" > "$out/$stem/Sequence.png"
echo "$src" >> "$(dirname "$src")/calls.log"
"#;

const FAILING_TOOL: &str = "#!/bin/sh\necho 'license expired' >&2\nexit 3\n";

struct Tools {
    _dir: TempDir,
    fake: PathBuf,
    failing: PathBuf,
}

fn tools() -> &'static Tools {
    static TOOLS: OnceLock<Tools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let fake = install(dir.path(), "astah-command.sh", FAKE_TOOL);
        let failing = install(dir.path(), "astah-broken.sh", FAILING_TOOL);
        Tools {
            _dir: dir,
            fake,
            failing,
        }
    })
}

fn install(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub(crate) fn fake_tool() -> &'static Path {
    &tools().fake
}

pub(crate) fn failing_tool() -> &'static Path {
    &tools().failing
}

/// How many times the fake tool ran for sources in `dir`.
pub(crate) fn call_count(dir: &Path) -> usize {
    fs::read_to_string(dir.join("calls.log")).map_or(0, |log| log.lines().count())
}
