//! Schematic floor-plan rendering and artifact storage.
//!
//! Rooms are shelf-packed onto a canvas whose width follows the square root of
//! the total room area, drawn as filled rectangles, and written as PNG under a
//! content-derived name so identical layouts share one file.

use anyhow::{Context, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use url::Url;

use super::config::BlueprintConfig;
use super::layout::room_dimensions;
use super::PlanError;
use crate::domain::Room;

/// Sub-directory of the static root holding rendered blueprints.
pub const BLUEPRINT_DIR: &str = "blueprints";

const EPSILON: f64 = 1e-9;
const WALL_PX: u32 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const WALL: Rgb<u8> = Rgb([40, 44, 52]);
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([222, 235, 247]),
    Rgb([229, 245, 224]),
    Rgb([254, 237, 222]),
    Rgb([239, 237, 245]),
    Rgb([255, 247, 188]),
    Rgb([253, 224, 221]),
];

/// Position of one room on the canvas, in feet from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub name: String,
    pub x_ft: f64,
    pub y_ft: f64,
    pub width_ft: f64,
    pub length_ft: f64,
}

impl Placement {
    fn overlaps(&self, other: &Placement) -> bool {
        self.x_ft + self.width_ft > other.x_ft + EPSILON
            && other.x_ft + other.width_ft > self.x_ft + EPSILON
            && self.y_ft + self.length_ft > other.y_ft + EPSILON
            && other.y_ft + other.length_ft > self.y_ft + EPSILON
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    pub canvas_width_ft: f64,
    pub canvas_length_ft: f64,
    pub placements: Vec<Placement>,
    /// Rooms without a drawable area, left off the drawing.
    pub skipped: Vec<String>,
}

impl Packing {
    pub fn has_overlaps(&self) -> bool {
        self.placements
            .iter()
            .enumerate()
            .any(|(i, a)| self.placements[i + 1..].iter().any(|b| a.overlaps(b)))
    }

    pub fn fits_canvas(&self) -> bool {
        self.placements.iter().all(|p| {
            p.x_ft >= 0.0
                && p.y_ft >= 0.0
                && p.x_ft + p.width_ft <= self.canvas_width_ft + EPSILON
                && p.y_ft + p.length_ft <= self.canvas_length_ft + EPSILON
        })
    }
}

/// Shelf-pack rooms: tallest first, left to right, a new shelf whenever the
/// next room would cross the canvas width.
pub fn pack_rooms(rooms: &[Room], aspect_ratio: f64) -> Result<Packing, PlanError> {
    let mut drawable = Vec::with_capacity(rooms.len());
    let mut skipped = Vec::new();

    for room in rooms {
        let (width, length) = room_dimensions(room.area_sqft as f64, aspect_ratio);
        if room.area_sqft == 0 || !(width.is_finite() && length.is_finite() && width > 0.0) {
            tracing::debug!(room = %room.name, "Skipping room without drawable area");
            skipped.push(room.name.clone());
            continue;
        }
        drawable.push((room, width, length));
    }

    if drawable.is_empty() {
        return Err(PlanError::RenderFailure(
            "no room has a drawable area".to_string(),
        ));
    }

    drawable.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.name.cmp(&b.0.name)));

    let total_area: f64 = drawable.iter().map(|(r, _, _)| r.area_sqft as f64).sum();
    let widest = drawable.iter().map(|(_, w, _)| *w).fold(0.0, f64::max);
    let canvas_width_ft = total_area.sqrt().max(widest);

    let mut placements = Vec::with_capacity(drawable.len());
    let (mut x, mut y, mut shelf) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (room, width, length) in drawable {
        if x > 0.0 && x + width > canvas_width_ft + EPSILON {
            y += shelf;
            x = 0.0;
            shelf = 0.0;
        }
        placements.push(Placement {
            name: room.name.clone(),
            x_ft: x,
            y_ft: y,
            width_ft: width,
            length_ft: length,
        });
        x += width;
        shelf = shelf.max(length);
    }

    let packing = Packing {
        canvas_width_ft,
        canvas_length_ft: y + shelf,
        placements,
        skipped,
    };
    debug_assert!(packing.fits_canvas() && !packing.has_overlaps());
    Ok(packing)
}

/// Draw a packing as filled, outlined rectangles inside the plot outline.
pub fn render(packing: &Packing, cfg: &BlueprintConfig) -> RgbImage {
    let longest = packing.canvas_width_ft.max(packing.canvas_length_ft).max(1.0);
    let scale = cfg.pixels_per_foot.min(cfg.max_canvas_px as f64 / longest);
    let margin = cfg.margin_px;

    let inner_w = ((packing.canvas_width_ft * scale).ceil() as u32).max(1);
    let inner_h = ((packing.canvas_length_ft * scale).ceil() as u32).max(1);
    let mut img = RgbImage::from_pixel(inner_w + 2 * margin, inner_h + 2 * margin, BACKGROUND);

    let to_px = |ft: f64| margin + (ft * scale).round() as u32;

    for (i, p) in packing.placements.iter().enumerate() {
        let x0 = to_px(p.x_ft);
        let y0 = to_px(p.y_ft);
        let x1 = to_px(p.x_ft + p.width_ft).max(x0 + 1);
        let y1 = to_px(p.y_ft + p.length_ft).max(y0 + 1);
        fill_rect(&mut img, x0, y0, x1, y1, PALETTE[i % PALETTE.len()]);
        outline_rect(&mut img, x0, y0, x1, y1, WALL_PX);
    }
    outline_rect(&mut img, margin, margin, margin + inner_w, margin + inner_h, WALL_PX + 1);

    img
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    for y in y0.min(h)..y1.min(h) {
        for x in x0.min(w)..x1.min(w) {
            img.put_pixel(x, y, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, thickness: u32) {
    let t = thickness.min((x1 - x0).max(1)).min((y1 - y0).max(1));
    fill_rect(img, x0, y0, x1, y0 + t, WALL);
    fill_rect(img, x0, y1.saturating_sub(t), x1, y1, WALL);
    fill_rect(img, x0, y0, x0 + t, y1, WALL);
    fill_rect(img, x1.saturating_sub(t), y0, x1, y1, WALL);
}

/// Content-derived identifier of a room-area mapping and the drawing settings
/// it is rendered with.
pub fn artifact_id(rooms: &[Room], aspect_ratio: f64, config: &BlueprintConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"blueprint-v2\n");
    hasher.update(
        format!(
            "aspect={};ppf={};max={};margin={}\n",
            aspect_ratio, config.pixels_per_foot, config.max_canvas_px, config.margin_px
        )
        .as_bytes(),
    );
    for room in rooms {
        hasher.update(room.name.as_bytes());
        hasher.update(b"=");
        hasher.update(room.area_sqft.to_string().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(&hasher.finalize()[..16])
}

/// A rendered blueprint on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintArtifact {
    pub id: String,
    pub path: PathBuf,
    pub url: String,
    pub skipped_rooms: Vec<String>,
}

/// Write-only store for rendered blueprints under the static root.
#[derive(Debug, Clone)]
pub struct BlueprintStore {
    dir: PathBuf,
    base_url: Url,
    config: BlueprintConfig,
    aspect_ratio: f64,
}

impl BlueprintStore {
    /// `static_dir` is served at `<public_base_url>/static`.
    pub fn new(
        static_dir: &Path,
        public_base_url: &Url,
        config: BlueprintConfig,
        aspect_ratio: f64,
    ) -> Result<Self> {
        let dir = static_dir.join(BLUEPRINT_DIR);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create blueprint directory {}", dir.display()))?;

        let mut root = public_base_url.clone();
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let base_url = root
            .join(&format!("static/{}/", BLUEPRINT_DIR))
            .context("Invalid public base URL")?;

        tracing::info!(dir = %dir.display(), base_url = %base_url, "Blueprint store ready");

        Ok(Self {
            dir,
            base_url,
            config,
            aspect_ratio,
        })
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether new artifacts can currently be written.
    pub async fn is_writable(&self) -> bool {
        tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }

    /// Render `rooms` and store the image, reusing an identical earlier render.
    ///
    /// Blocking; run it off the async executor.
    pub fn generate(&self, rooms: &[Room]) -> Result<BlueprintArtifact, PlanError> {
        let packing = pack_rooms(rooms, self.aspect_ratio)?;
        let id = artifact_id(rooms, self.aspect_ratio, &self.config);
        let file_name = format!("{}.png", id);
        let path = self.dir.join(&file_name);

        if path.is_file() {
            tracing::debug!(id = %id, "Reusing rendered blueprint");
        } else {
            let image = render(&packing, &self.config);
            self.write_atomically(&path, &image)?;
            tracing::debug!(id = %id, path = %path.display(), "Rendered blueprint");
        }

        let url = self
            .base_url
            .join(&file_name)
            .map_err(|e| PlanError::RenderFailure(format!("invalid artifact URL: {}", e)))?;

        Ok(BlueprintArtifact {
            id,
            path,
            url: url.to_string(),
            skipped_rooms: packing.skipped,
        })
    }

    /// Encode to PNG and move into place with a rename so readers and
    /// concurrent writers never see a partial file.
    fn write_atomically(&self, path: &Path, image: &RgbImage) -> Result<(), PlanError> {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut png, ImageOutputFormat::Png)
            .map_err(|e| PlanError::RenderFailure(format!("PNG encoding failed: {}", e)))?;

        let storage_err = |e: std::io::Error| PlanError::RenderFailure(format!("storage: {}", e));
        std::fs::create_dir_all(&self.dir).map_err(storage_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(storage_err)?;
        tmp.write_all(png.get_ref()).map_err(storage_err)?;
        tmp.persist(path).map_err(|e| storage_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParsedAttributes;
    use crate::planner::config::LayoutConfig;
    use crate::planner::layout;

    fn room(name: &str, area_sqft: u32) -> Room {
        Room {
            name: name.to_string(),
            area_sqft,
            width_ft: 0.0,
            length_ft: 0.0,
        }
    }

    fn store(dir: &Path) -> BlueprintStore {
        let base = Url::parse("http://127.0.0.1:8000").unwrap();
        BlueprintStore::new(dir, &base, BlueprintConfig::default(), 1.2).unwrap()
    }

    #[test]
    fn generated_layouts_never_overlap() {
        let cfg = LayoutConfig::default();
        for plot in (50..=12_000).step_by(211) {
            for (floors, bedrooms) in [(None, None), (Some(2), Some(5)), (Some(3), Some(1))] {
                let attrs = ParsedAttributes {
                    plot_size_sqft: Some(plot),
                    floors,
                    bedrooms,
                    ..Default::default()
                };
                let layout = layout::build(&attrs, &cfg).unwrap();
                let packing = pack_rooms(&layout.rooms, cfg.room_aspect_ratio).unwrap();
                assert!(!packing.has_overlaps(), "plot {}", plot);
                assert!(packing.fits_canvas(), "plot {}", plot);
                assert_eq!(
                    packing.placements.len() + packing.skipped.len(),
                    layout.rooms.len()
                );
            }
        }
    }

    #[test]
    fn uneven_rooms_never_overlap() {
        let rooms = vec![
            room("hall", 900),
            room("closet", 4),
            room("pantry", 12),
            room("garage", 400),
            room("study", 81),
            room("porch", 33),
        ];
        let packing = pack_rooms(&rooms, 1.2).unwrap();
        assert!(!packing.has_overlaps());
        assert!(packing.fits_canvas());
        assert!(packing.canvas_width_ft * packing.canvas_length_ft >= 1430.0);
    }

    #[test]
    fn packing_is_deterministic() {
        let rooms = vec![room("a", 100), room("b", 100), room("c", 50)];
        assert_eq!(pack_rooms(&rooms, 1.2).unwrap(), pack_rooms(&rooms, 1.2).unwrap());
    }

    #[test]
    fn zero_area_rooms_are_skipped() {
        let rooms = vec![room("living_room", 1), room("kitchen", 0)];
        let packing = pack_rooms(&rooms, 1.2).unwrap();
        assert_eq!(packing.placements.len(), 1);
        assert_eq!(packing.skipped, vec!["kitchen".to_string()]);
    }

    #[test]
    fn nothing_drawable_is_a_render_failure() {
        let rooms = vec![room("kitchen", 0)];
        assert!(matches!(
            pack_rooms(&rooms, 1.2),
            Err(PlanError::RenderFailure(_))
        ));
        assert!(matches!(pack_rooms(&[], 1.2), Err(PlanError::RenderFailure(_))));
    }

    #[test]
    fn render_respects_canvas_cap() {
        let packing = pack_rooms(&[room("warehouse", 1_000_000)], 1.2).unwrap();
        let cfg = BlueprintConfig::default();
        let img = render(&packing, &cfg);
        let (w, h) = img.dimensions();
        assert!(w <= cfg.max_canvas_px + 2 * cfg.margin_px + 1);
        assert!(h <= cfg.max_canvas_px + 2 * cfg.margin_px + 1);
    }

    #[test]
    fn artifact_id_depends_on_rooms() {
        let cfg = BlueprintConfig::default();
        let a = vec![room("kitchen", 100), room("bedroom_1", 120)];
        let b = vec![room("kitchen", 101), room("bedroom_1", 120)];
        assert_eq!(artifact_id(&a, 1.2, &cfg), artifact_id(&a.clone(), 1.2, &cfg));
        assert_ne!(artifact_id(&a, 1.2, &cfg), artifact_id(&b, 1.2, &cfg));
        assert_eq!(artifact_id(&a, 1.2, &cfg).len(), 32);
    }

    #[test]
    fn artifact_id_depends_on_drawing_settings() {
        let cfg = BlueprintConfig::default();
        let rooms = vec![room("kitchen", 100), room("bedroom_1", 120)];
        let id = artifact_id(&rooms, 1.2, &cfg);

        assert_ne!(id, artifact_id(&rooms, 1.5, &cfg));
        let finer = BlueprintConfig {
            pixels_per_foot: 12.0,
            ..cfg.clone()
        };
        assert_ne!(id, artifact_id(&rooms, 1.2, &finer));
    }

    #[test]
    fn changed_settings_render_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = Url::parse("http://127.0.0.1:8000").unwrap();
        let rooms = vec![room("living_room", 200), room("kitchen", 90)];

        let first = store(dir.path()).generate(&rooms).unwrap();
        let wider = BlueprintStore::new(dir.path(), &base, BlueprintConfig::default(), 1.6)
            .unwrap()
            .generate(&rooms)
            .unwrap();

        assert_ne!(first.id, wider.id);
        assert!(first.path.is_file());
        assert!(wider.path.is_file());
    }

    #[tokio::test]
    async fn fresh_store_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).is_writable().await);
    }

    #[test]
    fn store_writes_png_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let rooms = vec![room("living_room", 200), room("kitchen", 90)];

        let artifact = store.generate(&rooms).unwrap();
        assert!(artifact.path.is_file());
        assert_eq!(
            artifact.url,
            format!("http://127.0.0.1:8000/static/blueprints/{}.png", artifact.id)
        );
        let (w, h) = image::image_dimensions(&artifact.path).unwrap();
        assert!(w > 0 && h > 0);

        let again = store.generate(&rooms).unwrap();
        assert_eq!(again, artifact);
    }

    #[test]
    fn base_url_path_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let base = Url::parse("https://example.com/buildwise").unwrap();
        let store = BlueprintStore::new(dir.path(), &base, BlueprintConfig::default(), 1.2).unwrap();
        let artifact = store.generate(&[room("hall", 100)]).unwrap();
        assert!(artifact
            .url
            .starts_with("https://example.com/buildwise/static/blueprints/"));
    }

    #[test]
    fn concurrent_writers_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let shared = vec![room("hall", 300), room("kitchen", 100)];

        let artifacts: Vec<BlueprintArtifact> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8u32)
                .map(|i| {
                    let store = store.clone();
                    let rooms = if i % 2 == 0 {
                        shared.clone()
                    } else {
                        vec![room("hall", 300 + i), room("kitchen", 100)]
                    };
                    s.spawn(move || store.generate(&rooms).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for artifact in &artifacts {
            assert!(artifact.path.is_file());
            image::image_dimensions(&artifact.path).unwrap();
        }
        let shared_ids: Vec<&str> = artifacts
            .iter()
            .step_by(2)
            .map(|a| a.id.as_str())
            .collect();
        assert!(shared_ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 5);
    }
}
