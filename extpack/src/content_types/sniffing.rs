//! Per-file content sniffing with a majority vote per extension.

use std::process::Stdio;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{
    builtin_content_type, BoxFuture, ContentTypeError, ContentTypeResolver, ContentTypeResult,
    DefaultEntry, OCTET_STREAM,
};
use crate::package::{extension_of, FileSet, FileSource};

/// Determines a content type from the bytes of a file.
pub trait ContentSniffer: Send + Sync {
    /// Probe a file source.
    ///
    /// Returns `Ok(None)` when the probe ran but produced no usable content
    /// type. Errors abort resolution.
    fn sniff<'a>(&'a self, source: &'a FileSource)
        -> BoxFuture<'a, ContentTypeResult<Option<String>>>;
}

/// Sniffs with the `file` utility: `file --mime-type -b <path>`.
///
/// Inline content is piped through stdin. Generated parts have no bytes yet
/// and are never probed.
#[derive(Debug, Clone)]
pub struct FileCommand {
    command: String,
}

impl FileCommand {
    /// Create a sniffer running the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn run(&self, source: &FileSource) -> ContentTypeResult<Option<String>> {
        let mut command = Command::new(&self.command);
        command.arg("--mime-type").arg("-b");

        let stdin_content = match source {
            FileSource::Path(path) => {
                command.arg(path).stdin(Stdio::null());
                None
            }
            FileSource::Inline(content) => {
                command.arg("-").stdin(Stdio::piped());
                Some(content.as_bytes())
            }
            FileSource::Generated => return Ok(None),
        };

        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        if let (Some(content), Some(mut stdin)) = (stdin_content, child.stdin.take()) {
            // The probe may stop reading early once it has seen enough bytes.
            match stdin.write_all(content).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(self.spawn_error(e)),
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() && looks_like_mime_type(&stdout) {
            return Ok(Some(stdout));
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            return Err(ContentTypeError::Command {
                command: self.command.clone(),
                message: stderr,
            });
        }

        Ok(None)
    }

    fn spawn_error(&self, source: std::io::Error) -> ContentTypeError {
        ContentTypeError::Spawn {
            command: self.command.clone(),
            source,
        }
    }
}

impl ContentSniffer for FileCommand {
    fn sniff<'a>(
        &'a self,
        source: &'a FileSource,
    ) -> BoxFuture<'a, ContentTypeResult<Option<String>>> {
        Box::pin(self.run(source))
    }
}

fn looks_like_mime_type(s: &str) -> bool {
    s.contains('/') && !s.contains(char::is_whitespace)
}

/// Observed content types per extension, in observation order.
///
/// The winner for an extension is the type with the most files; ties go to
/// the type observed first.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTally {
    observations: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl ExtensionTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `part_name` with `extension` was observed as `content_type`.
    pub fn record(&mut self, extension: &str, content_type: &str, part_name: &str) {
        self.observations
            .entry(extension.to_string())
            .or_default()
            .entry(content_type.to_string())
            .or_default()
            .push(part_name.to_string());
    }

    /// Majority content type of an extension.
    pub fn winner(&self, extension: &str) -> Option<&str> {
        self.observations.get(extension).and_then(majority)
    }

    /// One default per extension, in first-observed order.
    pub fn defaults(&self) -> Vec<DefaultEntry> {
        self.observations
            .iter()
            .filter_map(|(ext, types)| majority(types).map(|winner| DefaultEntry::new(ext, winner)))
            .collect()
    }

    /// Files whose observed type differs from their extension's winner.
    pub fn dissenters(&self) -> Vec<(&str, &str)> {
        let mut dissenters = Vec::new();
        for types in self.observations.values() {
            let Some(winner) = majority(types) else {
                continue;
            };
            for (content_type, parts) in types {
                if content_type != winner {
                    dissenters.extend(parts.iter().map(|p| (p.as_str(), content_type.as_str())));
                }
            }
        }
        dissenters
    }
}

fn majority(types: &IndexMap<String, Vec<String>>) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (content_type, parts) in types {
        match best {
            Some((_, count)) if parts.len() <= count => {}
            _ => best = Some((content_type.as_str(), parts.len())),
        }
    }
    best.map(|(content_type, _)| content_type)
}

/// How the type of one file is observed.
enum Observation {
    Table(&'static str),
    Sniff(FileSource),
}

struct Planned {
    part_name: String,
    extension: Option<String>,
    observation: Observation,
}

/// Resolves by probing every file and voting per extension.
///
/// The majority type of an extension becomes its default; files that were
/// observed as something else keep their own content type.
pub struct SniffingResolver<S> {
    sniffer: S,
}

impl<S: ContentSniffer> SniffingResolver<S> {
    /// Create a resolver backed by a sniffer.
    pub fn new(sniffer: S) -> Self {
        Self { sniffer }
    }

    async fn resolve_files(&self, files: &mut FileSet) -> ContentTypeResult<Vec<DefaultEntry>> {
        let plan: Vec<Planned> = files
            .iter()
            .filter(|file| file.content_type.is_none())
            .map(|file| {
                let extension = extension_of(&file.part_name);
                let observation = match extension.as_deref().and_then(builtin_content_type) {
                    Some(content_type) => Observation::Table(content_type),
                    None => Observation::Sniff(file.source.clone()),
                };
                Planned {
                    part_name: file.part_name.clone(),
                    extension,
                    observation,
                }
            })
            .collect();

        let probes = plan.iter().filter_map(|planned| match &planned.observation {
            Observation::Sniff(source) => Some(self.sniffer.sniff(source)),
            Observation::Table(_) => None,
        });
        let mut results = join_all(probes).await.into_iter();

        let mut tally = ExtensionTally::new();
        for planned in &plan {
            let observed = match &planned.observation {
                Observation::Table(content_type) => content_type.to_string(),
                Observation::Sniff(_) => match results.next() {
                    Some(Ok(Some(content_type))) => content_type,
                    Some(Ok(None)) | None => {
                        warn!(
                            part_name = %planned.part_name,
                            "Could not determine content type, using {}", OCTET_STREAM
                        );
                        set_content_type(files, &planned.part_name, OCTET_STREAM);
                        continue;
                    }
                    Some(Err(e)) => {
                        return Err(ContentTypeError::Sniff {
                            part_name: planned.part_name.clone(),
                            reason: e.to_string(),
                        })
                    }
                },
            };

            match &planned.extension {
                Some(ext) => tally.record(ext, &observed, &planned.part_name),
                None => set_content_type(files, &planned.part_name, &observed),
            }
        }

        for (part_name, content_type) in tally.dissenters() {
            debug!(part_name, content_type, "File differs from its extension default");
            set_content_type(files, part_name, content_type);
        }

        let defaults = tally.defaults();
        for default in &defaults {
            debug!(
                extension = %default.extension,
                content_type = %default.content_type,
                "Resolved extension by majority"
            );
        }
        Ok(defaults)
    }
}

fn set_content_type(files: &mut FileSet, part_name: &str, content_type: &str) {
    if let Some(file) = files.get_mut(part_name) {
        file.content_type = Some(content_type.to_string());
    }
}

impl<S: ContentSniffer> ContentTypeResolver for SniffingResolver<S> {
    fn resolve<'a>(
        &'a self,
        files: &'a mut FileSet,
    ) -> BoxFuture<'a, ContentTypeResult<Vec<DefaultEntry>>> {
        Box::pin(self.resolve_files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::FileDeclaration;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sniffer answering from a table keyed by file name.
    #[derive(Default)]
    struct FakeSniffer {
        answers: HashMap<String, Result<Option<String>, String>>,
        calls: AtomicUsize,
    }

    impl FakeSniffer {
        fn answer(mut self, name: &str, content_type: &str) -> Self {
            self.answers
                .insert(name.to_string(), Ok(Some(content_type.to_string())));
            self
        }

        fn unknown(mut self, name: &str) -> Self {
            self.answers.insert(name.to_string(), Ok(None));
            self
        }

        fn failing(mut self, name: &str) -> Self {
            self.answers
                .insert(name.to_string(), Err("unreadable".to_string()));
            self
        }
    }

    impl ContentSniffer for FakeSniffer {
        fn sniff<'a>(
            &'a self,
            source: &'a FileSource,
        ) -> BoxFuture<'a, ContentTypeResult<Option<String>>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let name = match source {
                    FileSource::Path(path) => path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    FileSource::Inline(content) => content.clone(),
                    FileSource::Generated => return Ok(None),
                };
                match self.answers.get(&name) {
                    Some(Ok(answer)) => Ok(answer.clone()),
                    Some(Err(message)) => Err(ContentTypeError::Command {
                        command: "fake".to_string(),
                        message: message.clone(),
                    }),
                    None => Ok(None),
                }
            })
        }
    }

    fn file_set(paths: &[&str]) -> FileSet {
        let mut files = FileSet::new();
        for path in paths {
            files
                .register(FileDeclaration::from_path(*path), Path::new("/ext"))
                .unwrap();
        }
        files
    }

    #[tokio::test]
    async fn test_majority_vote_with_single_dissenter() {
        let sniffer = FakeSniffer::default()
            .answer("a.x", "type1")
            .answer("b.x", "type1")
            .answer("c.x", "type2");
        let resolver = SniffingResolver::new(sniffer);
        let mut files = file_set(&["a.x", "b.x", "c.x"]);

        let defaults = resolver.resolve(&mut files).await.unwrap();

        assert_eq!(defaults, vec![DefaultEntry::new(".x", "type1")]);
        let overridden: Vec<(&str, &str)> = files
            .iter()
            .filter_map(|f| f.content_type.as_deref().map(|t| (f.part_name.as_str(), t)))
            .collect();
        assert_eq!(overridden, vec![("/c.x", "type2")]);
    }

    #[tokio::test]
    async fn test_tie_goes_to_first_observed_type() {
        let sniffer = FakeSniffer::default()
            .answer("a.y", "text/first")
            .answer("b.y", "text/second");
        let resolver = SniffingResolver::new(sniffer);
        let mut files = file_set(&["a.y", "b.y"]);

        let defaults = resolver.resolve(&mut files).await.unwrap();

        assert_eq!(defaults, vec![DefaultEntry::new(".y", "text/first")]);
        assert_eq!(
            files.get("/b.y").unwrap().content_type.as_deref(),
            Some("text/second")
        );
        assert!(files.get("/a.y").unwrap().content_type.is_none());
    }

    #[tokio::test]
    async fn test_builtin_extensions_are_not_sniffed() {
        let resolver = SniffingResolver::new(FakeSniffer::default());
        let mut files = file_set(&["a.png", "b.md"]);

        let defaults = resolver.resolve(&mut files).await.unwrap();

        assert_eq!(
            defaults,
            vec![
                DefaultEntry::new(".png", "image/png"),
                DefaultEntry::new(".md", "text/markdown"),
            ]
        );
        assert_eq!(resolver.sniffer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extensionless_and_unknown_files() {
        let sniffer = FakeSniffer::default()
            .answer("LICENSE", "text/plain")
            .unknown("blob.q");
        let resolver = SniffingResolver::new(sniffer);
        let mut files = file_set(&["LICENSE", "blob.q"]);

        let defaults = resolver.resolve(&mut files).await.unwrap();

        assert!(defaults.is_empty());
        assert_eq!(
            files.get("/LICENSE").unwrap().content_type.as_deref(),
            Some("text/plain")
        );
        assert_eq!(
            files.get("/blob.q").unwrap().content_type.as_deref(),
            Some(OCTET_STREAM)
        );
    }

    #[tokio::test]
    async fn test_probe_error_is_fatal() {
        let sniffer = FakeSniffer::default()
            .answer("a.z", "text/z")
            .failing("b.z");
        let resolver = SniffingResolver::new(sniffer);
        let mut files = file_set(&["a.z", "b.z"]);

        let err = resolver.resolve(&mut files).await.unwrap_err();

        match err {
            ContentTypeError::Sniff { part_name, reason } => {
                assert_eq!(part_name, "/b.z");
                assert!(reason.contains("unreadable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = ExtensionTally::new();
        tally.record(".a", "t1", "/1.a");
        tally.record(".a", "t2", "/2.a");
        tally.record(".a", "t2", "/3.a");
        tally.record(".b", "t3", "/1.b");

        assert_eq!(tally.winner(".a"), Some("t2"));
        assert_eq!(tally.winner(".b"), Some("t3"));
        assert_eq!(tally.winner(".c"), None);
        assert_eq!(tally.dissenters(), vec![("/1.a", "t1")]);
    }

    #[tokio::test]
    async fn test_file_command_generated_part_is_not_probed() {
        let sniffer = FileCommand::new("definitely-not-a-real-command-xyz");
        assert_eq!(sniffer.sniff(&FileSource::Generated).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_command_missing_binary() {
        let sniffer = FileCommand::new("definitely-not-a-real-command-xyz");
        let err = sniffer
            .sniff(&FileSource::Path(PathBuf::from("/tmp/x")))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentTypeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_command_non_mime_output_is_unknown() {
        // `echo` prints its arguments, which is not a MIME type.
        let sniffer = FileCommand::new("echo");
        let result = sniffer
            .sniff(&FileSource::Path(PathBuf::from("/tmp/x")))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_command_stderr_is_an_error() {
        // `ls` rejects `--mime-type` on stderr.
        let sniffer = FileCommand::new("ls");
        let err = sniffer
            .sniff(&FileSource::Path(PathBuf::from("/tmp/x")))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentTypeError::Command { .. }));
    }

    #[test]
    fn test_looks_like_mime_type() {
        assert!(looks_like_mime_type("image/png"));
        assert!(!looks_like_mime_type("--mime-type -b /tmp/x"));
        assert!(!looks_like_mime_type("data"));
    }
}
