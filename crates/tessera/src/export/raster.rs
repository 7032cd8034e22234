//! PNG export.
//!
//! A scene is serialized to SVG on the calling thread; parsing, rendering
//! with `resvg` and encoding happen on a worker thread. The caller gets an
//! [`ExportHandle`] it can poll from an event loop or block on.
//!
//! The image is always composited onto an opaque background, scaled so its
//! width matches the requested [`ExportTier`], and written as
//! `<sanitized title>.png` into the target directory.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        Arc, OnceLock,
        mpsc::{self, Receiver, TryRecvError},
    },
    thread,
};

use log::{debug, error, info};

use tessera_core::color::Color;

use crate::{config::ExportConfig, export, export::svg, render::Scene};

/// Output resolution class.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportTier {
    Small,
    #[default]
    Medium,
    Large,
}

impl ExportTier {
    /// Target pixel width of this tier.
    pub fn width(self, config: &ExportConfig) -> u32 {
        match self {
            Self::Small => config.small_width(),
            Self::Medium => config.medium_width(),
            Self::Large => config.large_width(),
        }
    }
}

impl FromStr for ExportTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(format!("unknown tier `{s}`, expected small, medium or large")),
        }
    }
}

impl Display for ExportTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        write!(f, "{s}")
    }
}

/// A PNG written by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl ExportedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Pending result of a background export.
#[derive(Debug)]
pub struct ExportHandle {
    receiver: Receiver<Result<ExportedImage, export::Error>>,
}

impl ExportHandle {
    /// Returns the result if the export has finished, without blocking.
    ///
    /// Yields `Some` at most once.
    pub fn poll(&self) -> Option<Result<ExportedImage, export::Error>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_stopped())),
        }
    }

    /// Blocks until the export finishes.
    pub fn wait(self) -> Result<ExportedImage, export::Error> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_stopped()))
    }
}

fn worker_stopped() -> export::Error {
    export::Error::Render("export worker stopped without a result".to_string())
}

/// Starts raster exports on worker threads.
#[derive(Debug, Clone)]
pub struct ExportService {
    config: ExportConfig,
}

impl ExportService {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Exports `scene` as `<title>.png` into `directory`.
    ///
    /// The scene is snapshotted before this returns; later view changes do
    /// not affect the image.
    pub fn export(
        &self,
        scene: &Scene,
        title: &str,
        tier: ExportTier,
        directory: &Path,
    ) -> ExportHandle {
        let svg = svg::to_svg_string(scene);
        let background = scene.background();
        let target_width = tier.width(&self.config);
        let path = directory.join(format!("{}.png", sanitize_file_name(title)));
        info!(path = path.display().to_string(), tier:?, target_width; "Starting PNG export");

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result =
                render_png(&svg, background, target_width).and_then(|(png, width, height)| {
                    std::fs::write(&path, png).map_err(|err| {
                        error!(path = path.display().to_string(), err:err; "Failed to write PNG");
                        export::Error::Io(err)
                    })?;
                    Ok(ExportedImage {
                        path,
                        width,
                        height,
                    })
                });
            // Receiver may be gone if the caller dropped the handle
            let _ = tx.send(result);
        });

        ExportHandle { receiver: rx }
    }
}

/// Renders SVG text to PNG bytes `target_width` pixels wide on an opaque
/// `background`.
///
/// Returns the encoded image with its pixel size.
pub fn render_png(
    svg: &str,
    background: Color,
    target_width: u32,
) -> Result<(Vec<u8>, u32, u32), export::Error> {
    let mut opts = usvg::Options::default();
    opts.fontdb = system_fonts();

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|err| export::Error::Render(format!("SVG parsing error: {err}")))?;
    let size = tree.size();
    if target_width == 0 || size.width() <= 0.0 {
        return Err(export::Error::Render(format!(
            "cannot scale {}x{} to width {target_width}",
            size.width(),
            size.height()
        )));
    }

    let scale = target_width as f32 / size.width();
    let height = ((size.height() * scale).ceil() as u32).max(1);
    let mut pixmap = tiny_skia::Pixmap::new(target_width, height).ok_or_else(|| {
        export::Error::Render(format!("failed to allocate {target_width}x{height} pixmap"))
    })?;

    let [r, g, b, _] = background.to_rgba8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!(width = target_width, height, scale; "Scene rasterized");

    let png = pixmap
        .encode_png()
        .map_err(|err| export::Error::Render(format!("PNG encoding error: {err}")))?;
    Ok((png, target_width, height))
}

fn system_fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    Arc::clone(FONTS.get_or_init(|| {
        info!("Loading system fonts");
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    }))
}

/// File stem for a diagram title: alphanumeric characters only, or
/// `diagram` when nothing is left.
pub fn sanitize_file_name(title: &str) -> String {
    let name: String = title.chars().filter(|c| c.is_alphanumeric()).collect();
    if name.is_empty() {
        "diagram".to_string()
    } else {
        name
    }
}
