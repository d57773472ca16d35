//! Handing downloaded attachments to viewer programs
//!
//! Each media kind has its own viewer settings. `reverse` flips the file
//! order first (some viewers show their arguments back to front), `single`
//! chooses one invocation per file over one invocation for all files, and
//! `terminal` decides whether the viewer takes over Tusk's terminal.

use std::path::Path;

use crate::config::{MediaConfig, ViewerConfig};
use crate::error::Result;
use crate::launch::{self, LaunchMode, LaunchRequest, Launcher, split_command};

/// Kinds of attachments with their own viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still images
    Image,
    /// Video and animated GIFs
    Video,
    /// Audio
    Audio,
}

impl MediaKind {
    /// All kinds
    pub const fn all() -> &'static [Self] {
        &[Self::Image, Self::Video, Self::Audio]
    }

    /// Lowercase name, as used in the config file
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Plan the launches that open `files` as `kind`
pub fn dispatch<P: AsRef<Path>>(
    files: &[P],
    kind: MediaKind,
    media: &MediaConfig,
) -> Result<Vec<LaunchRequest>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    plan(files, media.viewer(kind))
}

fn plan<P: AsRef<Path>>(files: &[P], viewer: &ViewerConfig) -> Result<Vec<LaunchRequest>> {
    let (program, fixed) = split_command(&viewer.viewer)?;
    let mode = LaunchMode::from_terminal(viewer.terminal);

    let mut names: Vec<String> = files
        .iter()
        .map(|f| f.as_ref().to_string_lossy().into_owned())
        .collect();
    if viewer.reverse {
        names.reverse();
    }

    let requests = if viewer.single {
        names
            .into_iter()
            .map(|name| LaunchRequest::new(&program, &fixed, [name], mode))
            .collect()
    } else {
        vec![LaunchRequest::new(&program, &fixed, names, mode)]
    };
    Ok(requests)
}

/// Plan and run the launches for `files`
pub fn open_media<L: Launcher, P: AsRef<Path>>(
    launcher: &mut L,
    files: &[P],
    kind: MediaKind,
    media: &MediaConfig,
) -> Result<()> {
    let requests = dispatch(files, kind, media)?;
    tracing::debug!("Opening {} {kind} file(s) with {} launch(es)", files.len(), requests.len());
    launch::execute(launcher, &requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::tests::RecordingLauncher;

    fn media_with(kind: MediaKind, viewer: ViewerConfig) -> MediaConfig {
        let mut media = MediaConfig::default();
        match kind {
            MediaKind::Image => media.image = viewer,
            MediaKind::Video => media.video = viewer,
            MediaKind::Audio => media.audio = viewer,
        }
        media
    }

    fn viewer(single: bool, reverse: bool, terminal: bool) -> ViewerConfig {
        ViewerConfig {
            viewer: "imv -f".to_string(),
            terminal,
            single,
            reverse,
        }
    }

    const FILES: [&str; 3] = ["a", "b", "c"];

    #[test]
    fn test_single_opens_each_file() {
        let media = media_with(MediaKind::Image, viewer(true, false, false));
        let requests = dispatch(&FILES, MediaKind::Image, &media).unwrap();
        assert_eq!(requests.len(), 3);
        for (req, file) in requests.iter().zip(FILES) {
            assert_eq!(req.program, "imv");
            assert_eq!(req.args, vec!["-f", file]);
            assert_eq!(req.mode, LaunchMode::Background);
        }
    }

    #[test]
    fn test_batch_opens_all_files_at_once() {
        let media = media_with(MediaKind::Video, viewer(false, false, false));
        let requests = dispatch(&FILES, MediaKind::Video, &media).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].args, vec!["-f", "a", "b", "c"]);
    }

    #[test]
    fn test_reverse_order() {
        let media = media_with(MediaKind::Audio, viewer(false, true, false));
        let requests = dispatch(&FILES, MediaKind::Audio, &media).unwrap();
        assert_eq!(requests[0].args, vec!["-f", "c", "b", "a"]);

        let media = media_with(MediaKind::Audio, viewer(true, true, false));
        let requests = dispatch(&FILES, MediaKind::Audio, &media).unwrap();
        let order: Vec<_> = requests.iter().map(|r| r.args[1].as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_terminal_viewer_runs_in_foreground() {
        let media = media_with(MediaKind::Image, viewer(true, false, true));
        let requests = dispatch(&FILES, MediaKind::Image, &media).unwrap();
        assert!(requests.iter().all(LaunchRequest::is_foreground));
    }

    #[test]
    fn test_kinds_use_their_own_settings() {
        let media = media_with(MediaKind::Image, viewer(false, true, true));
        // Video still has the defaults
        let requests = dispatch(&FILES, MediaKind::Video, &media).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].program, "xdg-open");
        assert_eq!(requests[0].mode, LaunchMode::Background);
    }

    #[test]
    fn test_empty_is_noop() {
        let media = MediaConfig::default();
        let files: [&str; 0] = [];
        assert!(dispatch(&files, MediaKind::Image, &media).unwrap().is_empty());

        let mut launcher = RecordingLauncher::default();
        open_media(&mut launcher, &files, MediaKind::Image, &media).unwrap();
        assert!(launcher.calls.is_empty());
    }

    #[test]
    fn test_open_media_runs_terminal_viewers_in_order() {
        let media = media_with(MediaKind::Image, viewer(true, true, true));
        let mut launcher = RecordingLauncher::default();
        open_media(&mut launcher, &FILES, MediaKind::Image, &media).unwrap();
        let order: Vec<_> = launcher.calls.iter().map(|(_, args)| args.as_str()).collect();
        assert_eq!(order, vec!["-f c", "-f b", "-f a"]);
        assert!(launcher.calls.iter().all(|(mode, _)| *mode == LaunchMode::Foreground));
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = MediaKind::all().iter().map(MediaKind::name).collect();
        assert_eq!(names, vec!["image", "video", "audio"]);
        assert_eq!(MediaKind::Audio.to_string(), "audio");
    }
}
