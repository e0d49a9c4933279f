//! file: core/src/batch.rs
//! description: converts every PHP file under a directory into a TAC listing.
//!
//! The output tree mirrors the input tree under `<dir><suffix>` (`src` ->
//! `src_TAC`). Each file is lowered independently on the rayon pool; a file
//! that fails to parse or lower gets its error text written in place of the
//! listing and never stops the run.

use glob::{glob, Pattern};
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::generate_ast_with_depth_limit;
use crate::config::BatchOptions;
use crate::ir::lower::lower_script;
use crate::reports::{BatchReport, FileReport, FileStatus};
use crate::script::Script;

/// `<dir><suffix>`, ignoring trailing separators on `dir`.
pub fn output_root_for(dir: &Path, suffix: &str) -> PathBuf {
    let raw = dir.to_string_lossy();
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let base = if trimmed.is_empty() { raw.as_ref() } else { trimmed };
    PathBuf::from(format!("{}{}", base, suffix))
}

/// Every `.php` file below `dir`, sorted.
pub fn find_php_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let pattern = format!("{}/**/*.php", Pattern::escape(&dir.to_string_lossy()));
    let paths = glob(&pattern).map_err(|e| format!("glob error: {}", e))?;
    let mut files: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
    files.sort();
    Ok(files)
}

/// Text written for one file: the listing, or the error line.
enum Converted {
    Listing { text: String, instructions: usize },
    Failed { text: String, status: FileStatus, message: String },
}

fn convert_script(script: &Script, options: &BatchOptions) -> Converted {
    let ast = match generate_ast_with_depth_limit(script, options.lower.max_depth) {
        Ok(ast) => ast,
        Err(e) => {
            let message = e.message();
            return Converted::Failed {
                text: format!("Parse Error: {}", message),
                status: FileStatus::ParseError,
                message,
            };
        }
    };
    match lower_script(&ast, &options.lower) {
        Ok(listing) => {
            let body = listing.render();
            let text = if options.wrap_php_tags { format!("<?php\n{}\n?>", body) } else { body };
            Converted::Listing { text, instructions: listing.len() }
        }
        Err(e) => {
            let message = e.to_string();
            Converted::Failed {
                text: format!("Lowering Error: {}", message),
                status: FileStatus::LoweringError,
                message,
            }
        }
    }
}

fn write_output(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}

/// Reads, lowers and writes one file. Never fails; every outcome ends up
/// in the returned report.
pub fn convert_file(input: &Path, root: &Path, output_root: &Path, options: &BatchOptions) -> FileReport {
    let relative = input.strip_prefix(root).unwrap_or(input);
    let output = output_root.join(relative);
    info!("converting {}", input.display());

    let script = match Script::new(input.to_path_buf()) {
        Ok(script) => script,
        Err(e) => {
            warn!("{}", e);
            return FileReport::failed(input, None, FileStatus::IoError, e.message());
        }
    };

    let (text, report) = match convert_script(&script, options) {
        Converted::Listing { text, instructions } => (text, FileReport::ok(input, &output, instructions)),
        Converted::Failed { text, status, message } => {
            warn!("{}: {}", input.display(), text);
            (text, FileReport::failed(input, Some(&output), status, message))
        }
    };

    if let Err(e) = write_output(&output, &text) {
        warn!("could not write {}: {}", output.display(), e);
        return FileReport::failed(input, None, FileStatus::IoError, format!("write error: {}", e));
    }
    report
}

pub fn convert_directory(dir: &Path, options: &BatchOptions) -> Result<BatchReport, String> {
    convert_directory_with(dir, options, |_| {})
}

/// Like `convert_directory`, calling `on_file` as each file finishes.
pub fn convert_directory_with<F>(dir: &Path, options: &BatchOptions, on_file: F) -> Result<BatchReport, String>
where
    F: Fn(&FileReport) + Sync,
{
    if !dir.is_dir() {
        return Err(format!("not a directory: {}", dir.display()));
    }
    let output_root = output_root_for(dir, &options.output_suffix);
    let files = find_php_files(dir)?;
    info!("found {} php files under {}", files.len(), dir.display());

    let mut report = BatchReport::new(dir, &output_root);
    // Workers get a stack sized for the nesting limit; the global pool's
    // default is too small for deep files.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .stack_size(options.lower.stack_size())
        .thread_name(|i| format!("phptac-worker-{}", i))
        .build()
        .map_err(|e| format!("thread pool error: {}", e))?;
    let results = pool.install(|| {
        files
            .par_iter()
            .map(|input| {
                let file = convert_file(input, dir, &output_root, options);
                on_file(&file);
                file
            })
            .collect::<Vec<_>>()
    });
    report.finish(results);
    info!(
        "converted {} of {} files into {}",
        report.succeeded(),
        report.total(),
        output_root.display()
    );
    Ok(report)
}

/// Runs `work` on a scoped thread with `stack_size` bytes of stack. Used
/// by callers that parse or lower outside the batch pool.
pub fn run_with_stack<T, F>(stack_size: usize, work: F) -> Result<T, String>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("phptac-main".into())
            .stack_size(stack_size)
            .spawn_scoped(scope, work)
            .map_err(|e| format!("could not start worker thread: {}", e))?;
        handle.join().map_err(|_| "worker thread panicked".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_root_appends_suffix() {
        assert_eq!(output_root_for(Path::new("src"), "_TAC"), PathBuf::from("src_TAC"));
        assert_eq!(output_root_for(Path::new("a/src/"), "_TAC"), PathBuf::from("a/src_TAC"));
    }

    #[test]
    fn listing_is_wrapped_in_php_tags() {
        let script = Script::from_source("a.php", "<?php echo 1;");
        match convert_script(&script, &BatchOptions::default()) {
            Converted::Listing { text, instructions } => {
                assert_eq!(text, "<?php\necho 1;\n?>");
                assert_eq!(instructions, 1);
            }
            Converted::Failed { text, .. } => panic!("unexpected failure: {}", text),
        }
    }

    #[test]
    fn run_with_stack_returns_the_result() {
        let value = run_with_stack(4 * 1024 * 1024, || 6 * 7).unwrap();
        assert_eq!(value, 42);
    }
}
