use std::{
    collections::BTreeSet,
    error::Error,
    ops::Range,
    path::{Path, PathBuf},
};

use plotters::{coord::Shift, prelude::*};
use tracing::{info, warn};

use crate::{
    date::RunDate,
    error::{Result, SnapshotError},
    model::WeatherTable,
};

/// Fixed so charts from different days can be compared side by side.
pub const Y_RANGE: Range<f64> = 0.0..40.0;

/// 10x6 inches at 300 DPI.
pub const CANVAS: (u32, u32) = (3000, 1800);

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// Families tried in order when no chart font is configured.
pub const JAPANESE_FAMILIES: [&str; 10] = [
    "Noto Sans CJK JP",
    "Noto Sans JP",
    "Source Han Sans JP",
    "IPAexGothic",
    "IPAGothic",
    "TakaoGothic",
    "VL Gothic",
    "Hiragino Sans",
    "Yu Gothic",
    "Meiryo",
];

/// Unassigned codepoint; every font draws it with its missing-glyph placeholder.
const MISSING_GLYPH: char = '\u{10FFFD}';
const GLYPH_CANVAS: (u32, u32) = (96, 96);

/// Title and axis text for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLabels {
    title_prefix: &'static str,
    title_suffix: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
}

impl ChartLabels {
    pub const JAPANESE: Self = Self {
        title_prefix: "",
        title_suffix: "の都市別気温",
        x_axis: "都市名",
        y_axis: "気温(℃)",
    };

    pub const ENGLISH: Self = Self {
        title_prefix: "Temperature by city, ",
        title_suffix: "",
        x_axis: "City",
        y_axis: "Temperature (°C)",
    };

    pub fn title(&self, date: &str) -> String {
        format!("{}{date}{}", self.title_prefix, self.title_suffix)
    }

    /// Every character the fixed text can draw, dates included.
    fn glyphs(&self) -> String {
        [
            self.title_prefix,
            self.title_suffix,
            self.x_axis,
            self.y_axis,
            "0123456789/",
        ]
        .concat()
    }
}

/// Font family together with the labels it can actually draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typeface {
    pub family: String,
    pub labels: ChartLabels,
}

impl Typeface {
    /// Pick a family that draws the Japanese labels.
    ///
    /// A configured family must cover them or this is a render error.
    /// Without one, the first covering family from [`JAPANESE_FAMILIES`] wins,
    /// falling back to `sans-serif` with English labels.
    pub fn resolve(configured: Option<&str>) -> Result<Self> {
        let japanese = ChartLabels::JAPANESE.glyphs();

        if let Some(family) = configured {
            if !covers(family, &japanese) {
                return Err(SnapshotError::Render(format!(
                    "font family '{family}' has no glyphs for the Japanese chart labels"
                )));
            }
            return Ok(Self {
                family: family.to_string(),
                labels: ChartLabels::JAPANESE,
            });
        }

        if let Some(family) = JAPANESE_FAMILIES.iter().find(|f| covers(f, &japanese)) {
            info!(family, "Using Japanese chart font");
            return Ok(Self {
                family: family.to_string(),
                labels: ChartLabels::JAPANESE,
            });
        }

        warn!("No Japanese font found; chart labels fall back to English");
        Ok(Self {
            family: "sans-serif".to_string(),
            labels: ChartLabels::ENGLISH,
        })
    }
}

/// True if `family` draws every non-blank character of `text` with a real glyph.
pub fn covers(family: &str, text: &str) -> bool {
    let Ok(missing) = rasterize(family, MISSING_GLYPH) else {
        return false;
    };

    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .all(|ch| rasterize(family, ch).is_ok_and(|pixels| pixels != missing))
}

fn rasterize(family: &str, ch: char) -> Result<Vec<u8>, Box<dyn Error>> {
    let (w, h) = GLYPH_CANVAS;
    let mut pixels = vec![255u8; (w * h * 3) as usize];
    {
        let area = BitMapBackend::with_buffer(&mut pixels, GLYPH_CANVAS).into_drawing_area();
        let style = TextStyle::from((family, 64.0).into_font());
        area.draw_text(&ch.to_string(), &style, (8, 8))?;
        area.present()?;
    }
    Ok(pixels)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub height: f64,
}

/// Layout of the temperature chart, one bar per table row.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    /// Display form of the run date, shown in the title.
    pub date: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Fails on an empty table rather than drawing a chart with no bars.
    pub fn from_table(table: &WeatherTable, date: &RunDate) -> Result<Self> {
        if table.is_empty() {
            return Err(SnapshotError::Render(
                "weather table has no rows to chart".to_string(),
            ));
        }

        let bars = table
            .city_names()
            .zip(table.temperatures())
            .map(|(label, height)| Bar {
                label: label.to_string(),
                height,
            })
            .collect();

        Ok(Self {
            date: date.display(),
            bars,
        })
    }

    pub fn title(&self, labels: &ChartLabels) -> String {
        labels.title(&self.date)
    }

    pub fn y_range(&self) -> Range<f64> {
        Y_RANGE
    }

    /// Render to a PNG at `path`, replacing any existing file.
    pub fn render_png(&self, path: &Path, typeface: &Typeface) -> Result<PathBuf> {
        info!(
            path = %path.display(),
            bars = self.bars.len(),
            font = %typeface.family,
            "Rendering chart"
        );

        let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
        self.draw(&root, typeface)
            .and_then(|()| root.present().map_err(Into::into))
            .map_err(|e| SnapshotError::Chart {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(path.to_path_buf())
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, typeface: &Typeface) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let font = typeface.family.as_str();
        root.fill(&WHITE)?;

        let n = self.bars.len();
        let y = self.y_range();

        let mut chart = ChartBuilder::on(root)
            .caption(self.title(&typeface.labels), (font, 64))
            .margin(40)
            .x_label_area_size(300)
            .y_label_area_size(140)
            .build_cartesian_2d((0..n).into_segmented(), y.clone())?;

        let label_for = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => self
                .bars
                .get(*i)
                .map(|b| b.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_for)
            .x_label_style((font, 40.0).into_font().transform(FontTransform::Rotate90))
            .y_label_style((font, 40))
            .x_desc(typeface.labels.x_axis)
            .y_desc(typeface.labels.y_axis)
            .axis_desc_style((font, 48))
            .draw()?;

        // Values outside the fixed axis are clipped, as a fixed ylim would.
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(30)
                .data(
                    self.bars
                        .iter()
                        .enumerate()
                        .map(|(i, bar)| (i, bar.height.clamp(y.start, y.end))),
                ),
        )?;

        Ok(())
    }
}
