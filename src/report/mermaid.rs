// src/report/mermaid.rs

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

const MERMAID_FENCE: &str = "```mermaid";
const FENCE: &str = "```";

/// Remove every "```mermaid" marker, then every remaining "```".
pub fn strip_code_fences(content: &str) -> String {
    content.replace(MERMAID_FENCE, "").replace(FENCE, "")
}

/// Strip Markdown code fences from `<doc_dir>/<stem>.md` in place.
///
/// Returns `false` when the capture tool produced no such file.
pub fn post_process_mermaid_md(fs: &dyn FileSystem, doc_dir: &Path, stem: &str) -> Result<bool> {
    let path = doc_dir.join(format!("{stem}.md"));
    if !fs.is_file(&path) {
        debug!(file = ?path, "no mermaid output to post-process");
        return Ok(false);
    }

    let content = fs.read_to_string(&path)?;
    let stripped = strip_code_fences(&content);
    fs.write(&path, stripped.as_bytes())
        .with_context(|| format!("rewriting {path:?}"))?;

    debug!(file = ?path, "stripped code fences");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use proptest::prelude::*;

    #[test]
    fn strips_mermaid_block_markers() {
        let input = "```mermaid\nflowchart LR\n  /talker --> /chatter\n```\n";
        assert_eq!(strip_code_fences(input), "\nflowchart LR\n  /talker --> /chatter\n\n");
    }

    #[test]
    fn rewrites_file_in_place() {
        let fs = MockFileSystem::new();
        fs.add_file("/doc/demo/talker/io_graph.md", "```mermaid\ngraph\n```");

        let done = post_process_mermaid_md(&fs, Path::new("/doc/demo/talker"), "io_graph").unwrap();
        assert!(done);
        assert_eq!(
            fs.file_content("/doc/demo/talker/io_graph.md").as_deref(),
            Some("\ngraph\n")
        );
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let fs = MockFileSystem::new();
        let done = post_process_mermaid_md(&fs, Path::new("/doc/demo/talker"), "io_graph").unwrap();
        assert!(!done);
        assert!(!fs.exists(Path::new("/doc/demo/talker/io_graph.md")));
    }

    proptest! {
        #[test]
        fn output_never_contains_a_fence(input in "[a-z`\\n ]{0,64}") {
            let out = strip_code_fences(&input);
            prop_assert!(!out.contains(FENCE));
        }

        #[test]
        fn text_without_backticks_is_untouched(input in "[a-zA-Z0-9 >\\-\\n/]{0,64}") {
            prop_assert_eq!(strip_code_fences(&input), input);
        }
    }
}
